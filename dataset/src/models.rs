//! Dataset records and query results.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;

/// One row of the UK price-paid CSV, as published (header row required).
#[derive(Debug, Clone, Deserialize)]
pub struct PricePaidRow {
    pub uuid: String,
    pub price: i64,
    pub date: String,
    pub post_code: String,
    pub property_type: String,
    pub is_new: String,
    pub duration: String,
    pub street: String,
    pub locality: String,
    pub town: String,
    pub district: String,
    pub county: String,
    pub category: String,
    pub status: String,
}

/// A property sale as stored in `property_prices`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PropertySale {
    pub price: i64,
    pub date: NaiveDate,
    pub post_code: String,
    pub property_type: String,
    pub is_new: String,
    pub duration: String,
    pub street: String,
    pub locality: String,
    pub town: String,
    pub district: String,
    pub county: String,
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]`, `YYYY-MM-DDTHH:MM:SS` and `DD/MM/YYYY`.
pub fn parse_sale_date(raw: &str) -> Result<NaiveDate, DatasetError> {
    let raw = raw.trim();
    let date_part = raw.split(|c| c == ' ' || c == 'T').next().unwrap_or(raw);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(date_part, "%d/%m/%Y"))
        .map_err(|_| DatasetError::Csv(format!("Unrecognised date: {}", raw)))
}

impl TryFrom<PricePaidRow> for PropertySale {
    type Error = DatasetError;

    fn try_from(row: PricePaidRow) -> Result<Self, Self::Error> {
        Ok(Self {
            price: row.price,
            date: parse_sale_date(&row.date)?,
            post_code: row.post_code,
            property_type: row.property_type,
            is_new: row.is_new,
            duration: row.duration,
            street: row.street,
            locality: row.locality,
            town: row.town,
            district: row.district,
            county: row.county,
        })
    }
}

/// Column name and storage type of a query result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// Query result as returned to the model: `{meta, data, rows}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub meta: Vec<ColumnMeta>,
    pub data: Vec<serde_json::Map<String, serde_json::Value>>,
    pub rows: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sale_date_formats() {
        let d = NaiveDate::from_ymd_opt(2019, 6, 14).unwrap();
        assert_eq!(parse_sale_date("2019-06-14").unwrap(), d);
        assert_eq!(parse_sale_date("2019-06-14 00:00").unwrap(), d);
        assert_eq!(parse_sale_date("2019-06-14T00:00:00").unwrap(), d);
        assert_eq!(parse_sale_date("14/06/2019").unwrap(), d);
        assert!(parse_sale_date("June 2019").is_err());
    }

    #[test]
    fn test_query_result_json_shape() {
        let mut row = serde_json::Map::new();
        row.insert("town".into(), serde_json::json!("LEEDS"));
        let result = QueryResult {
            meta: vec![ColumnMeta {
                name: "town".into(),
                type_name: "TEXT".into(),
            }],
            data: vec![row],
            rows: 1,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "meta": [{"name": "town", "type": "TEXT"}],
                "data": [{"town": "LEEDS"}],
                "rows": 1
            })
        );
    }
}
