//! `run_sql_query` function tool exposed to the model.

use async_trait::async_trait;
use llm_client::{ToolDefinition, ToolExecutor};
use serde::Deserialize;
use tracing::warn;

use crate::property_repo::PropertyRepository;

pub const SQL_TOOL_NAME: &str = "run_sql_query";

const SQL_TOOL_DESCRIPTION: &str = "Executes a read-only SQL query (SQLite dialect) against the UK property price database \
and returns the results as JSON. Use it to find average prices, trends or specific sales. \
Table property_prices(price INTEGER, date TEXT 'YYYY-MM-DD', post_code TEXT, property_type TEXT, \
is_new TEXT, duration TEXT, street TEXT, locality TEXT, town TEXT, district TEXT, county TEXT). \
Example: SELECT avg(price) FROM property_prices WHERE town = 'LEEDS'";

#[derive(Debug, Deserialize)]
struct SqlToolArgs {
    query: String,
}

/// Runs model-written queries on the read-only dataset pool.
///
/// Every failure, including malformed arguments, is returned to the model as
/// `Error executing query: ...`.
#[derive(Clone)]
pub struct SqlQueryTool {
    repo: PropertyRepository,
}

impl SqlQueryTool {
    pub fn new(repo: PropertyRepository) -> Self {
        Self { repo }
    }

    /// Runs `query` and renders the JSON result or the error text.
    pub async fn run(&self, query: &str) -> String {
        match self.repo.run_sql_query(query).await {
            Ok(result) => serde_json::to_string(&result)
                .unwrap_or_else(|e| format!("Error executing query: {}", e)),
            Err(e) => {
                warn!(error = %e, "run_sql_query failed");
                format!("Error executing query: {}", e)
            }
        }
    }
}

#[async_trait]
impl ToolExecutor for SqlQueryTool {
    fn definitions(&self) -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: SQL_TOOL_NAME.to_string(),
            description: SQL_TOOL_DESCRIPTION.to_string(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The SQL query to execute, e.g. SELECT avg(price) FROM property_prices"
                    }
                },
                "required": ["query"]
            }),
        }]
    }

    async fn execute(&self, name: &str, arguments: &str) -> String {
        if name != SQL_TOOL_NAME {
            return format!("Error executing query: unknown tool {}", name);
        }
        match serde_json::from_str::<SqlToolArgs>(arguments) {
            Ok(args) => self.run(&args.query).await,
            Err(e) => format!("Error executing query: invalid arguments: {}", e),
        }
    }
}
