use std::collections::BTreeMap;

use serde::Serialize;

use crate::filter::month_label;
use crate::models::Transaction;

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub entries: usize,
    pub total_amount: f64,
    pub categories_shown: usize,
}

pub fn summary(rows: &[&Transaction]) -> Summary {
    let mut categories: Vec<&str> = rows.iter().map(|t| t.category.as_str()).collect();
    categories.sort_unstable();
    categories.dedup();
    Summary {
        entries: rows.len(),
        total_amount: rows.iter().filter_map(|t| t.amount).sum(),
        categories_shown: categories.len(),
    }
}

// ---------------------------------------------------------------------------
// Expense breakdown
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub name: String,
    pub total: f64,
    pub count: usize,
    pub pct: f64,
}

/// Debit totals per category, largest first.
pub fn category_breakdown(rows: &[&Transaction]) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for t in rows.iter().filter(|t| t.is_debit()) {
        let entry = totals.entry(t.category.as_str()).or_default();
        entry.0 += t.amount.unwrap_or(0.0);
        entry.1 += 1;
    }
    let grand_total: f64 = totals.values().map(|(t, _)| t).sum();
    let mut items: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(name, (total, count))| CategoryTotal {
            name: name.to_string(),
            total,
            count,
            pct: if grand_total != 0.0 { total / grand_total * 100.0 } else { 0.0 },
        })
        .collect();
    items.sort_by(|a, b| b.total.total_cmp(&a.total));
    items
}

// ---------------------------------------------------------------------------
// Monthly trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotal {
    /// Calendar month, `YYYY-MM`.
    pub month: String,
    pub total: f64,
}

/// Sum of all amounts per calendar month, oldest first. Undated rows are skipped.
pub fn monthly_trend(rows: &[&Transaction]) -> Vec<MonthTotal> {
    let mut months: BTreeMap<String, f64> = BTreeMap::new();
    for t in rows {
        if let Some(date) = t.date {
            *months.entry(month_label(date)).or_default() += t.amount.unwrap_or(0.0);
        }
    }
    months
        .into_iter()
        .map(|(month, total)| MonthTotal { month, total })
        .collect()
}

// ---------------------------------------------------------------------------
// Insights
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Overspending,
    LowSavings,
    Healthy,
}

impl Verdict {
    pub fn from_savings(savings: f64, low_threshold: f64) -> Self {
        if savings < 0.0 {
            Self::Overspending
        } else if savings < low_threshold {
            Self::LowSavings
        } else {
            Self::Healthy
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Self::Overspending => {
                "You're spending more than you earn. Time to review recurring expenses!"
            }
            Self::LowSavings => "Low savings: cut down on Food & Entertainment.",
            Self::Healthy => "Good job! You are saving a healthy amount.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insights {
    pub total_income: f64,
    pub total_expenses: f64,
    pub savings: f64,
    pub verdict: Verdict,
    pub advice: &'static str,
    pub top_categories: Vec<CategoryTotal>,
}

pub const TOP_CATEGORIES: usize = 5;

pub fn insights(rows: &[&Transaction], low_savings_threshold: f64) -> Insights {
    let total_income: f64 = rows
        .iter()
        .filter(|t| t.is_credit())
        .filter_map(|t| t.amount)
        .sum();
    let total_expenses: f64 = rows
        .iter()
        .filter(|t| t.is_debit())
        .filter_map(|t| t.amount)
        .sum();
    let savings = total_income - total_expenses;
    let verdict = Verdict::from_savings(savings, low_savings_threshold);
    let mut top_categories = category_breakdown(rows);
    top_categories.truncate(TOP_CATEGORIES);
    Insights {
        total_income,
        total_expenses,
        savings,
        verdict,
        advice: verdict.advice(),
        top_categories,
    }
}
