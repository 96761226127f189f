//! Property repository: schema, CSV bootstrap and read-only queries over `property_prices`.

use std::io::Read;
use std::path::PathBuf;

use sqlx::sqlite::{SqliteRow, SqliteValueRef};
use sqlx::{Column, Row, TypeInfo, ValueRef};
use tracing::{info, instrument, warn};

use crate::error::DatasetError;
use crate::models::{ColumnMeta, PricePaidRow, PropertySale, QueryResult};
use crate::sql_guard::ensure_read_only;
use crate::sqlite_pool::SqlitePoolManager;

/// Row cap for `init-db` when none is given.
pub const DEFAULT_BOOTSTRAP_LIMIT: usize = 20_000;

const INSERT_BATCH: usize = 500;

/// Parses a price-paid CSV (header row required), keeping at most `limit` rows.
pub fn parse_price_paid_csv<R: Read>(reader: R, limit: usize) -> Result<Vec<PropertySale>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut sales = Vec::new();
    for record in csv_reader.deserialize::<PricePaidRow>().take(limit) {
        sales.push(PropertySale::try_from(record?)?);
    }
    Ok(sales)
}

/// Access to the `property_prices` table.
///
/// Writes go through the writable pool (bootstrap only); model queries go
/// through a separate read-only pool.
#[derive(Clone)]
pub struct PropertyRepository {
    writer: SqlitePoolManager,
    reader: SqlitePoolManager,
}

impl PropertyRepository {
    /// Opens (or creates) the dataset file and ensures the schema exists.
    pub async fn open(path: &str) -> Result<Self, DatasetError> {
        let writer = SqlitePoolManager::new(path).await?;
        Self::init(&writer).await?;
        let reader = SqlitePoolManager::read_only(path).await?;
        Ok(Self { writer, reader })
    }

    async fn init(writer: &SqlitePoolManager) -> Result<(), DatasetError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS property_prices (
                price INTEGER NOT NULL,
                date TEXT NOT NULL,
                post_code TEXT NOT NULL,
                property_type TEXT NOT NULL,
                is_new TEXT NOT NULL,
                duration TEXT NOT NULL,
                street TEXT NOT NULL,
                locality TEXT NOT NULL,
                town TEXT NOT NULL,
                district TEXT NOT NULL,
                county TEXT NOT NULL
            )
            "#,
        )
        .execute(writer.pool())
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_property_prices_post_code ON property_prices(post_code)")
            .execute(writer.pool())
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_property_prices_town ON property_prices(town)")
            .execute(writer.pool())
            .await?;
        Ok(())
    }

    pub async fn count(&self) -> Result<usize, DatasetError> {
        let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM property_prices")
            .fetch_one(self.reader.pool())
            .await?;
        Ok(n as usize)
    }

    /// Inserts `sales` unless the table already has rows. Returns the number inserted.
    #[instrument(skip(self, sales), fields(rows = sales.len()))]
    pub async fn bootstrap(&self, sales: &[PropertySale]) -> Result<usize, DatasetError> {
        let existing = self.count().await?;
        if existing > 0 {
            info!(existing, "property_prices already populated, skipping bootstrap");
            return Ok(0);
        }

        let mut tx = self.writer.pool().begin().await?;
        for batch in sales.chunks(INSERT_BATCH) {
            for sale in batch {
                sqlx::query(
                    r#"
                    INSERT INTO property_prices
                        (price, date, post_code, property_type, is_new, duration, street, locality, town, district, county)
                    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(sale.price)
                .bind(sale.date.format("%Y-%m-%d").to_string())
                .bind(&sale.post_code)
                .bind(&sale.property_type)
                .bind(&sale.is_new)
                .bind(&sale.duration)
                .bind(&sale.street)
                .bind(&sale.locality)
                .bind(&sale.town)
                .bind(&sale.district)
                .bind(&sale.county)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;

        info!(inserted = sales.len(), "step: dataset bootstrap done");
        Ok(sales.len())
    }

    /// Reads up to `limit` rows from the CSV at `csv_path` and bootstraps the table.
    pub async fn bootstrap_from_csv(&self, csv_path: &str, limit: usize) -> Result<usize, DatasetError> {
        let path = PathBuf::from(csv_path);
        info!(csv_path = %path.display(), limit, "Loading price-paid CSV");
        let sales = tokio::task::spawn_blocking(move || {
            let file = std::fs::File::open(&path)?;
            parse_price_paid_csv(file, limit)
        })
        .await
        .map_err(|e| DatasetError::Io(e.to_string()))??;
        self.bootstrap(&sales).await
    }

    /// Runs one read-only `SELECT`/`WITH` statement on the read-only pool.
    #[instrument(skip(self))]
    pub async fn run_sql_query(&self, query: &str) -> Result<QueryResult, DatasetError> {
        let statement = ensure_read_only(query)?;
        let rows = sqlx::query(statement).fetch_all(self.reader.pool()).await?;
        let result = rows_to_result(&rows)?;
        info!(rows = result.rows, "step: dataset query done");
        Ok(result)
    }

    pub async fn close(&self) {
        self.reader.close().await;
        self.writer.close().await;
    }
}

fn value_to_json(value: SqliteValueRef<'_>, row: &SqliteRow, index: usize) -> Result<serde_json::Value, DatasetError> {
    if value.is_null() {
        return Ok(serde_json::Value::Null);
    }
    let json = match value.type_info().name() {
        "INTEGER" | "BOOLEAN" => serde_json::Value::from(row.try_get::<i64, _>(index)?),
        "REAL" => serde_json::Value::from(row.try_get::<f64, _>(index)?),
        "BLOB" => {
            let bytes: Vec<u8> = row.try_get(index)?;
            serde_json::Value::from(bytes.iter().map(|b| format!("{:02x}", b)).collect::<String>())
        }
        _ => serde_json::Value::from(row.try_get::<String, _>(index)?),
    };
    Ok(json)
}

/// Builds `{meta, data, rows}`. Expression columns have no declared type, so their
/// type is taken from the first non-null value.
fn rows_to_result(rows: &[SqliteRow]) -> Result<QueryResult, DatasetError> {
    let mut meta: Vec<ColumnMeta> = rows
        .first()
        .map(|row| {
            row.columns()
                .iter()
                .map(|c| ColumnMeta {
                    name: c.name().to_string(),
                    type_name: c.type_info().name().to_string(),
                })
                .collect()
        })
        .unwrap_or_default();

    let mut data = Vec::with_capacity(rows.len());
    for row in rows {
        let mut object = serde_json::Map::new();
        for (i, column) in row.columns().iter().enumerate() {
            let raw = row.try_get_raw(i)?;
            if !raw.is_null() && meta[i].type_name == "NULL" {
                meta[i].type_name = raw.type_info().name().to_string();
            }
            let value = value_to_json(raw, row, i)?;
            object.insert(column.name().to_string(), value);
        }
        data.push(object);
    }

    if data.is_empty() {
        warn!("query returned no rows");
    }
    Ok(QueryResult {
        rows: data.len(),
        meta,
        data,
    })
}
