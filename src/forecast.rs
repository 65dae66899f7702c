//! Next-month expense prediction.
//!
//! Debit totals are grouped by calendar month number (1-12, years are not
//! distinguished) and an ordinary least-squares line is fitted through
//! `(month, total)`. The prediction is the line's value at the month after the
//! latest one seen.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::Serialize;

use crate::models::Transaction;

pub const MIN_MONTHS: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyExpense {
    pub month: u32,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub history: Vec<MonthlyExpense>,
    pub slope: f64,
    pub intercept: f64,
    pub next_month: u32,
    pub predicted: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Forecast {
    Predicted(Prediction),
    InsufficientData { months: usize },
}

impl Forecast {
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            Self::Predicted(p) => Some(p),
            Self::InsufficientData { .. } => None,
        }
    }
}

/// Debit totals keyed by month number. A month with dated debits is present
/// even if all of its amounts are missing.
pub fn monthly_debits(rows: &[&Transaction]) -> Vec<MonthlyExpense> {
    let mut months: BTreeMap<u32, f64> = BTreeMap::new();
    for t in rows.iter().filter(|t| t.is_debit()) {
        if let Some(date) = t.date {
            *months.entry(date.month()).or_default() += t.amount.unwrap_or(0.0);
        }
    }
    months
        .into_iter()
        .map(|(month, total)| MonthlyExpense { month, total })
        .collect()
}

/// Least-squares `(slope, intercept)`. `None` when x has no spread.
pub fn fit_line(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
    if sxx == 0.0 {
        return None;
    }
    let sxy: f64 = points
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}

pub fn forecast(rows: &[&Transaction]) -> Forecast {
    let history = monthly_debits(rows);
    if history.len() < MIN_MONTHS {
        return Forecast::InsufficientData {
            months: history.len(),
        };
    }
    let points: Vec<(f64, f64)> = history
        .iter()
        .map(|m| (f64::from(m.month), m.total))
        .collect();
    let Some((slope, intercept)) = fit_line(&points) else {
        return Forecast::InsufficientData {
            months: history.len(),
        };
    };
    let next_month = history.iter().map(|m| m.month).max().unwrap_or(0) + 1;
    let predicted = slope * f64::from(next_month) + intercept;
    tracing::debug!(slope, intercept, next_month, predicted, "Fitted expense trend");
    Forecast::Predicted(Prediction {
        history,
        slope,
        intercept,
        next_month,
        predicted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn debit(y: i32, m: u32, amount: Option<f64>) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(y, m, 10),
            amount,
            txn_type: "Debit".to_string(),
            description: String::new(),
            category: "Other".to_string(),
            extra: Default::default(),
        }
    }

    fn credit(y: i32, m: u32, amount: f64) -> Transaction {
        Transaction {
            txn_type: "Credit".to_string(),
            ..debit(y, m, Some(amount))
        }
    }

    fn run(data: &[Transaction]) -> Forecast {
        let rows: Vec<&Transaction> = data.iter().collect();
        forecast(&rows)
    }

    #[test]
    fn test_perfect_line() {
        let data = vec![
            debit(2024, 1, Some(1000.0)),
            debit(2024, 2, Some(1500.0)),
            debit(2024, 2, Some(500.0)),
            debit(2024, 3, Some(3000.0)),
        ];
        let f = run(&data);
        let p = f.prediction().expect("prediction");
        assert_eq!(p.next_month, 4);
        assert!((p.slope - 1000.0).abs() < 1e-9);
        assert!((p.intercept - 0.0).abs() < 1e-9);
        assert!((p.predicted - 4000.0).abs() < 1e-9);
        assert_eq!(p.history.len(), 3);
    }

    #[test]
    fn test_single_month_is_insufficient() {
        let data = vec![debit(2024, 5, Some(10.0)), debit(2024, 5, Some(20.0))];
        assert_eq!(run(&data), Forecast::InsufficientData { months: 1 });
        assert_eq!(run(&[]), Forecast::InsufficientData { months: 0 });
    }

    #[test]
    fn test_credits_and_undated_ignored() {
        let mut undated = debit(2024, 1, Some(99.0));
        undated.date = None;
        let data = vec![
            debit(2024, 1, Some(100.0)),
            credit(2024, 2, 5000.0),
            undated,
        ];
        assert_eq!(run(&data), Forecast::InsufficientData { months: 1 });
    }

    #[test]
    fn test_month_numbers_collide_across_years() {
        let data = vec![
            debit(2023, 1, Some(100.0)),
            debit(2024, 1, Some(100.0)),
            debit(2024, 2, Some(300.0)),
        ];
        let rows: Vec<&Transaction> = data.iter().collect();
        let history = monthly_debits(&rows);
        assert_eq!(
            history,
            vec![
                MonthlyExpense { month: 1, total: 200.0 },
                MonthlyExpense { month: 2, total: 300.0 },
            ]
        );
    }

    #[test]
    fn test_month_with_missing_amounts_still_counts() {
        let data = vec![debit(2024, 3, Some(600.0)), debit(2024, 4, None)];
        let p = run(&data).prediction().cloned().expect("prediction");
        assert_eq!(p.history[1].total, 0.0);
        assert_eq!(p.next_month, 5);
        assert!((p.predicted - -600.0).abs() < 1e-9);
    }

    #[test]
    fn test_december_predicts_month_thirteen() {
        let data = vec![debit(2024, 11, Some(100.0)), debit(2024, 12, Some(200.0))];
        let p = run(&data).prediction().cloned().expect("prediction");
        assert_eq!(p.next_month, 13);
        assert!((p.predicted - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_line_degenerate() {
        assert_eq!(fit_line(&[(1.0, 2.0)]), None);
        assert_eq!(fit_line(&[(3.0, 1.0), (3.0, 5.0)]), None);
        let (m, b) = fit_line(&[(0.0, 1.0), (2.0, 5.0)]).unwrap();
        assert!((m - 2.0).abs() < 1e-12 && (b - 1.0).abs() < 1e-12);
    }
}
