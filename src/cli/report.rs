use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::cli::{FilterArgs, Session};
use crate::error::Result;
use crate::fmt::{money, money_whole};
use crate::forecast::{self, Forecast};
use crate::reports::{self, Verdict};

fn heading(title: &str, session: &Session) {
    println!(
        "{} ({}, {})",
        title.bold(),
        session.dataset.source,
        session.filter.describe()
    );
}

pub fn summary(args: &FilterArgs) -> Result<()> {
    let session = Session::open(args)?;
    let rows = session.rows();
    let s = reports::summary(&rows);

    heading("Summary Metrics", &session);
    println!("Total Entries:     {}", s.entries);
    println!("Total Amount:      {}", money(s.total_amount, session.symbol()));
    println!("Categories Shown:  {}", s.categories_shown);
    Ok(())
}

pub fn transactions(args: &FilterArgs, limit: Option<usize>) -> Result<()> {
    let session = Session::open(args)?;
    let rows = session.rows();
    let columns = session.dataset.export_columns();

    let mut table = Table::new();
    table.set_header(columns.clone());
    for t in rows.iter().take(limit.unwrap_or(usize::MAX)) {
        table.add_row(columns.iter().map(|c| match c.as_str() {
            "Amount" => Cell::new(t.amount.map(|a| money(a, session.symbol())).unwrap_or_default()),
            _ => Cell::new(t.field(c)),
        }));
    }

    heading("Transactions", &session);
    println!("{table}");
    if let Some(n) = limit.filter(|n| *n < rows.len()) {
        println!("Showing {n} of {} rows", rows.len());
    }
    Ok(())
}

pub fn analytics(args: &FilterArgs) -> Result<()> {
    let session = Session::open(args)?;
    let rows = session.rows();
    let symbol = session.symbol();

    heading("Expense Breakdown", &session);
    let breakdown = reports::category_breakdown(&rows);
    if breakdown.is_empty() {
        println!("No debit transactions in the current selection.");
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Category", "Amount", "%", "Count"]);
        for item in &breakdown {
            table.add_row(vec![
                Cell::new(&item.name),
                Cell::new(money(item.total, symbol)),
                Cell::new(format!("{:.1}%", item.pct)),
                Cell::new(item.count),
            ]);
        }
        println!("{table}");
    }

    let trend = reports::monthly_trend(&rows);
    if !trend.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Month", "Amount"]);
        for m in &trend {
            table.add_row(vec![Cell::new(&m.month), Cell::new(money(m.total, symbol))]);
        }
        println!("\nMonthly Spending Trend\n{table}");
    }
    Ok(())
}

pub fn insights(args: &FilterArgs) -> Result<()> {
    let session = Session::open(args)?;
    let rows = session.rows();
    let symbol = session.symbol();
    let ins = reports::insights(&rows, session.settings.low_savings_threshold);

    heading("Financial Insights", &session);
    let mut table = Table::new();
    table.set_header(vec!["Total Income", "Total Expenses", "Net Savings"]);
    table.add_row(vec![
        Cell::new(money_whole(ins.total_income, symbol)),
        Cell::new(money_whole(ins.total_expenses, symbol)),
        Cell::new(money_whole(ins.savings, symbol)),
    ]);
    println!("{table}");

    let advice = match ins.verdict {
        Verdict::Overspending => ins.advice.red().bold(),
        Verdict::LowSavings => ins.advice.yellow(),
        Verdict::Healthy => ins.advice.green(),
    };
    println!("{advice}");

    if !ins.top_categories.is_empty() {
        let mut top = Table::new();
        top.set_header(vec!["Category", "Amount"]);
        for item in &ins.top_categories {
            top.add_row(vec![Cell::new(&item.name), Cell::new(money(item.total, symbol))]);
        }
        println!("\nTop {} Spending Categories\n{top}", reports::TOP_CATEGORIES);
    }
    Ok(())
}

pub fn forecast(args: &FilterArgs) -> Result<()> {
    let session = Session::open(args)?;
    let rows = session.rows();
    let symbol = session.symbol();

    heading("Expense Prediction (Next Month)", &session);
    match forecast::forecast(&rows) {
        Forecast::Predicted(p) => {
            let mut table = Table::new();
            table.set_header(vec!["Month", "Expenses"]);
            for m in &p.history {
                table.add_row(vec![Cell::new(m.month), Cell::new(money(m.total, symbol))]);
            }
            table.add_row(vec![
                Cell::new(format!("{} (predicted)", p.next_month).bold()),
                Cell::new(money(p.predicted, symbol).bold()),
            ]);
            println!("{table}");
            println!(
                "Predicted Expenses for Month {}: {}",
                p.next_month,
                money_whole(p.predicted, symbol)
            );
        }
        Forecast::InsufficientData { months } => {
            println!(
                "Not enough months of data for prediction ({months} found). \
                 Upload at least {} months of data.",
                forecast::MIN_MONTHS
            );
        }
    }
    Ok(())
}
