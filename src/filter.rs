use chrono::{Datelike, NaiveDate};
use regex::{Regex, RegexBuilder};

use crate::error::{FintrackError, Result};
use crate::models::{Dataset, Transaction};

/// Row predicates of the dashboard sidebar. Unset fields accept every row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// `None` selects all categories; an empty list selects none.
    pub categories: Option<Vec<String>>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub search: Option<String>,
}

impl Filter {
    pub fn is_empty(&self) -> bool {
        self == &Filter::default()
    }

    pub fn with_month(mut self, year: i32, month: u32) -> Result<Self> {
        let (from, to) = month_bounds(year, month)
            .ok_or_else(|| FintrackError::InvalidDate(format!("{year:04}-{month:02}")))?;
        self.from = Some(from);
        self.to = Some(to);
        Ok(self)
    }

    /// Fill each unset date bound with the span of the category-selected rows,
    /// the range the dashboard date inputs show by default. Undated rows then
    /// fall outside the view just as they do after submitting that range.
    pub fn with_default_range(mut self, dataset: &Dataset) -> Self {
        if self.from.is_some() && self.to.is_some() {
            return self;
        }
        let category_only = Filter {
            categories: self.categories.clone(),
            ..Filter::default()
        };
        if let Some((lo, hi)) = date_bounds(&category_only.apply(dataset)) {
            self.from = self.from.or(Some(lo));
            self.to = self.to.or(Some(hi));
        }
        self
    }

    /// Keep the rows that satisfy every set predicate.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a Transaction> {
        let columns = dataset.export_columns();
        let search = self
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(search_regex);
        dataset
            .transactions
            .iter()
            .filter(|t| self.matches_category(t))
            .filter(|t| self.matches_dates(t))
            .filter(|t| match &search {
                Some(Some(re)) => columns.iter().any(|c| re.is_match(&t.field(c))),
                Some(None) => false,
                None => true,
            })
            .collect()
    }

    fn matches_category(&self, txn: &Transaction) -> bool {
        match &self.categories {
            Some(selected) => selected.iter().any(|c| c == &txn.category),
            None => true,
        }
    }

    fn matches_dates(&self, txn: &Transaction) -> bool {
        if self.from.is_none() && self.to.is_none() {
            return true;
        }
        let Some(date) = txn.date else {
            return false;
        };
        self.from.map_or(true, |f| date >= f) && self.to.map_or(true, |t| date <= t)
    }

    /// Short human description for report headers.
    pub fn describe(&self) -> String {
        if self.is_empty() {
            return "all transactions".to_string();
        }
        let mut parts = Vec::new();
        if let Some(cats) = &self.categories {
            parts.push(format!("categories: {}", cats.join(", ")));
        }
        match (self.from, self.to) {
            (Some(f), Some(t)) => parts.push(format!("{f} to {t}")),
            (Some(f), None) => parts.push(format!("from {f}")),
            (None, Some(t)) => parts.push(format!("until {t}")),
            (None, None) => {}
        }
        if let Some(s) = self.search.as_deref().filter(|s| !s.is_empty()) {
            parts.push(format!("search: \"{s}\""));
        }
        if parts.is_empty() {
            return "all transactions".to_string();
        }
        parts.join("; ")
    }
}

/// Case-insensitive pattern; falls back to a literal match when the pattern is invalid.
fn search_regex(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .or_else(|_| {
            RegexBuilder::new(&regex::escape(pattern))
                .case_insensitive(true)
                .build()
        })
        .ok()
}

pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Earliest and latest dates among the rows, if any row has a date.
pub fn date_bounds(rows: &[&Transaction]) -> Option<(NaiveDate, NaiveDate)> {
    let dates = rows.iter().filter_map(|t| t.date);
    let (min, max) = dates.fold((None, None), |(lo, hi): (Option<NaiveDate>, Option<NaiveDate>), d| {
        (
            Some(lo.map_or(d, |l| l.min(d))),
            Some(hi.map_or(d, |h| h.max(d))),
        )
    });
    Some((min?, max?))
}

/// Distinct categories present in the rows, in first-seen order.
pub fn categories_present(rows: &[&Transaction]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for t in rows {
        if !seen.contains(&t.category) {
            seen.push(t.category.clone());
        }
    }
    seen
}

pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| FintrackError::InvalidDate(raw.to_string()))
}

/// "2024-03" -> (2024, 3)
pub fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let invalid = || FintrackError::InvalidDate(format!("{raw} (expected YYYY-MM)"));
    let (y, m) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    if month == 0 || month > 12 {
        return Err(invalid());
    }
    Ok((year, month))
}

pub fn month_label(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}
