use serde::{Deserialize, Serialize};

use crate::models::Dataset;

pub const OTHER: &str = "Other";

/// A category and the keywords that select it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    fn matches(&self, desc_lower: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| !k.is_empty() && desc_lower.contains(&k.to_lowercase()))
    }
}

/// Ordered keyword table. Earlier rules take precedence.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

const BUILTIN: &[(&str, &[&str])] = &[
    ("Food", &["Dominos", "Zomato", "Pizza", "Restaurant", "Cafe"]),
    ("Shopping", &["Amazon", "Flipkart", "Myntra", "Shopping"]),
    ("Bills", &["Electricity", "Internet", "Insurance", "Bill", "DTH"]),
    ("Travel", &["Uber", "Ola", "Flight", "Train", "Bus", "Taxi"]),
    ("Groceries", &["Grocery", "Supermarket", "Big Bazaar", "DMart"]),
    ("Rent", &["Rent"]),
    ("Entertainment", &["Movie", "Netflix", "Spotify", "BookMyShow"]),
    ("Income", &["Salary", "Freelance", "Credit", "Transfer"]),
    ("Healthcare", &["Clinic", "Hospital", "Pharmacy", "Doctor"]),
];

impl CategoryTable {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn builtin() -> Self {
        let rules = BUILTIN
            .iter()
            .map(|(name, keys)| CategoryRule {
                name: name.to_string(),
                keywords: keys.iter().map(|k| k.to_string()).collect(),
            })
            .collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Category names in declaration order, followed by "Other".
    pub fn categories(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.iter().map(|r| r.name.as_str()).collect();
        if !names.contains(&OTHER) {
            names.push(OTHER);
        }
        names
    }

    pub fn categorize(&self, description: &str) -> &str {
        let desc_lower = description.to_lowercase();
        self.rules
            .iter()
            .find(|r| r.matches(&desc_lower))
            .map(|r| r.name.as_str())
            .unwrap_or(OTHER)
    }
}

pub struct CategorizeResult {
    pub categorized: usize,
    pub other: usize,
}

pub fn categorize_dataset(dataset: &mut Dataset, table: &CategoryTable) -> CategorizeResult {
    let mut categorized = 0usize;
    let mut other = 0usize;
    for txn in &mut dataset.transactions {
        let category = table.categorize(&txn.description);
        if category == OTHER {
            other += 1;
        } else {
            categorized += 1;
        }
        txn.category = category.to_string();
    }
    CategorizeResult { categorized, other }
}
