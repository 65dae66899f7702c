pub mod categories;
pub mod export;
pub mod init;
pub mod report;
pub mod serve;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::error::Result;
use crate::filter::{parse_day, parse_month, Filter};
use crate::loader::load_categorized;
use crate::models::{Dataset, Transaction};
use crate::settings::{load_settings, Settings};

#[derive(Parser)]
#[command(
    name = "fintrack",
    version,
    about = "Track, analyze, and predict your expenses from bank statements."
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summary metrics: entries, total amount, categories shown.
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List transactions in the filtered view.
    Transactions {
        #[command(flatten)]
        filters: FilterArgs,
        /// Show at most this many rows
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Expense breakdown by category and monthly trend.
    Analytics {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Income, expenses, net savings, and top spending categories.
    Insights {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Predict next month's expenses with a linear trend.
    Forecast {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Export the filtered view to XLSX or CSV.
    Export {
        #[command(flatten)]
        filters: FilterArgs,
        /// Output path; the extension selects the format
        #[arg(long, short, default_value = crate::export::DOWNLOAD_NAME)]
        output: PathBuf,
    },
    /// Show the category keyword table.
    Categories,
    /// Write a settings file with the defaults, including the category table.
    Init {
        /// Overwrite an existing settings file
        #[arg(long)]
        force: bool,
    },
    /// Start the browser dashboard.
    Serve {
        /// Statement to load at startup (default: fallback spreadsheet)
        #[arg(long, short)]
        file: Option<PathBuf>,
        /// Address to bind (default from settings)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (default from settings)
        #[arg(long, short)]
        port: Option<u16>,
    },
    /// Generate shell completions.
    Completions {
        shell: clap_complete::Shell,
    },
}

/// Source file and filter flags shared by the report commands.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Statement file (CSV or XLSX)
    #[arg(long, short)]
    pub file: Option<PathBuf>,
    /// Only include this category (repeatable)
    #[arg(long = "category", short = 'c')]
    pub categories: Vec<String>,
    /// Start date: YYYY-MM-DD
    #[arg(long = "from")]
    pub from_date: Option<String>,
    /// End date: YYYY-MM-DD
    #[arg(long = "to")]
    pub to_date: Option<String>,
    /// Calendar month: YYYY-MM (overrides --from/--to)
    #[arg(long)]
    pub month: Option<String>,
    /// Case-insensitive pattern matched against every column
    #[arg(long, short)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> Result<Filter> {
        let filter = Filter {
            categories: if self.categories.is_empty() {
                None
            } else {
                Some(self.categories.clone())
            },
            from: self.from_date.as_deref().map(parse_day).transpose()?,
            to: self.to_date.as_deref().map(parse_day).transpose()?,
            search: self.search.clone(),
        };
        match &self.month {
            Some(m) => {
                let (year, month) = parse_month(m)?;
                filter.with_month(year, month)
            }
            None => Ok(filter),
        }
    }
}

/// A loaded, categorized statement plus the filter to view it through.
pub(crate) struct Session {
    pub settings: Settings,
    pub dataset: Dataset,
    pub filter: Filter,
}

impl Session {
    pub fn open(args: &FilterArgs) -> Result<Self> {
        let settings = load_settings();
        let filter = args.to_filter()?;
        let dataset = load_categorized(args.file.as_deref(), &settings, &settings.category_table())?;
        Ok(Self {
            settings,
            dataset,
            filter,
        })
    }

    pub fn rows(&self) -> Vec<&Transaction> {
        self.filter.apply(&self.dataset)
    }

    pub fn symbol(&self) -> &str {
        &self.settings.currency_symbol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filter_args_to_filter() {
        let args = FilterArgs {
            categories: vec!["Food".into()],
            from_date: Some("2024-01-01".into()),
            search: Some("pizza".into()),
            ..FilterArgs::default()
        };
        let f = args.to_filter().unwrap();
        assert_eq!(f.categories, Some(vec!["Food".to_string()]));
        assert_eq!(f.from, chrono::NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(f.to, None);
    }

    #[test]
    fn test_month_overrides_range() {
        let args = FilterArgs {
            from_date: Some("2020-01-01".into()),
            month: Some("2024-02".into()),
            ..FilterArgs::default()
        };
        let f = args.to_filter().unwrap();
        assert_eq!(f.from, chrono::NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(f.to, chrono::NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn test_bad_dates_rejected() {
        let args = FilterArgs {
            to_date: Some("31/01/2024".into()),
            ..FilterArgs::default()
        };
        assert!(args.to_filter().is_err());
    }

    #[test]
    fn test_parse_repeated_categories() {
        let cli = Cli::try_parse_from([
            "fintrack", "summary", "-c", "Food", "--category", "Rent", "--month", "2024-01",
        ])
        .unwrap();
        match cli.command {
            Commands::Summary { filters } => {
                assert_eq!(filters.categories, vec!["Food", "Rent"]);
                assert_eq!(filters.month.as_deref(), Some("2024-01"));
            }
            _ => panic!("expected summary"),
        }
    }
}
