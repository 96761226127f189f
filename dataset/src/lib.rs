//! Dataset crate: the UK price-paid table the assistant answers questions about.
//!
//! ## Modules
//!
//! - [`error`] – DatasetError
//! - [`models`] – PricePaidRow (CSV), PropertySale, QueryResult
//! - [`property_repo`] – PropertyRepository: schema, CSV bootstrap, read-only queries
//! - [`sql_guard`] – single read-only statement check
//! - [`sql_tool`] – SqlQueryTool, the `run_sql_query` function tool
//! - [`sqlite_pool`] – SqlitePoolManager (writable and read-only pools)

mod error;
mod models;
mod property_repo;
mod sql_guard;
mod sql_tool;
mod sqlite_pool;

pub use error::DatasetError;
pub use models::{parse_sale_date, ColumnMeta, PricePaidRow, PropertySale, QueryResult};
pub use property_repo::{parse_price_paid_csv, PropertyRepository, DEFAULT_BOOTSTRAP_LIMIT};
pub use sql_guard::ensure_read_only;
pub use sql_tool::{SqlQueryTool, SQL_TOOL_NAME};
pub use sqlite_pool::SqlitePoolManager;
