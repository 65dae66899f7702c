use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

pub const DEBIT: &str = "Debit";
pub const CREDIT: &str = "Credit";

/// One statement row after loading and categorization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transaction {
    pub date: Option<NaiveDate>,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub txn_type: String,
    pub description: String,
    pub category: String,
    /// Columns beyond the four required ones, keyed by header.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Transaction {
    pub fn is_debit(&self) -> bool {
        self.txn_type == DEBIT
    }

    pub fn is_credit(&self) -> bool {
        self.txn_type == CREDIT
    }

    /// Render a named column the way it appears in an export.
    pub fn field(&self, column: &str) -> String {
        match column {
            "Date" => self
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            "Amount" => self.amount.map(|a| a.to_string()).unwrap_or_default(),
            "Type" => self.txn_type.clone(),
            "Description" => self.description.clone(),
            "Category" => self.category.clone(),
            other => self.extra.get(other).cloned().unwrap_or_default(),
        }
    }
}

/// A loaded statement: the source header order plus its rows.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub source: String,
    /// Trimmed source headers in file order, without any `Category` column.
    pub columns: Vec<String>,
    pub transactions: Vec<Transaction>,
}

impl Dataset {
    /// Columns of the exported table: source columns followed by `Category`.
    pub fn export_columns(&self) -> Vec<String> {
        let mut cols = self.columns.clone();
        cols.push("Category".to_string());
        cols
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn() -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 3, 5),
            amount: Some(-12.5),
            txn_type: "Debit".to_string(),
            description: "Zomato order".to_string(),
            category: "Food".to_string(),
            extra: BTreeMap::from([("Notes".to_string(), "late dinner".to_string())]),
        }
    }

    #[test]
    fn test_field_rendering() {
        let t = txn();
        assert_eq!(t.field("Date"), "2024-03-05");
        assert_eq!(t.field("Amount"), "-12.5");
        assert_eq!(t.field("Notes"), "late dinner");
        assert_eq!(t.field("Unknown"), "");
    }

    #[test]
    fn test_missing_values_render_empty() {
        let mut t = txn();
        t.date = None;
        t.amount = None;
        assert_eq!(t.field("Date"), "");
        assert_eq!(t.field("Amount"), "");
    }

    #[test]
    fn test_export_columns_append_category() {
        let ds = Dataset {
            source: "x.csv".to_string(),
            columns: vec!["Date".into(), "Amount".into(), "Type".into(), "Description".into()],
            transactions: vec![],
        };
        assert_eq!(ds.export_columns().last().map(String::as_str), Some("Category"));
        assert!(ds.is_empty());
    }
}
