use std::fmt::Write;

use crate::charts::{self, escape};
use crate::filter::{categories_present, Filter};
use crate::fmt::{money, money_whole};
use crate::forecast;
use crate::loader::NO_DATA_MESSAGE;
use crate::models::{Dataset, Transaction};
use crate::reports::{self, Verdict};
use crate::settings::Settings;

const TITLE: &str = "FinTrack - Personal Finance & Expense Analyzer";

const STYLE: &str = "\
body{font-family:sans-serif;margin:0;color:#222;background:#fafafa}\
header{padding:16px 24px;background:#262730;color:#fff}\
header p{margin:4px 0 0;color:#ccc}\
.layout{display:flex;align-items:flex-start}\
aside{width:260px;padding:16px 24px;background:#f0f2f6;min-height:100vh;box-sizing:border-box}\
main{flex:1;padding:16px 24px;min-width:0}\
.metrics{display:flex;gap:16px}\
.metric{flex:1;background:#fff;border:1px solid #e5e5e5;padding:12px;border-radius:6px}\
.metric .label{color:#666;font-size:13px}.metric .value{font-size:24px;margin-top:4px}\
nav a{margin-right:16px}\
table{border-collapse:collapse;width:100%;background:#fff;font-size:13px}\
th,td{border:1px solid #e5e5e5;padding:4px 8px;text-align:left}\
.scroll{max-height:420px;overflow:auto}\
.notice{padding:12px;border-radius:6px;margin:12px 0}\
.error{background:#fde2e1}.warning{background:#fff4d6}.success{background:#dff5e3}.info{background:#e1effe}\
section{margin-top:28px}";

fn head(out: &mut String) {
    let _ = write!(
        out,
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{TITLE}</title>\
         <style>{STYLE}</style></head><body><header><h1>{TITLE}</h1>\
         <p>Take control of your money: track, analyze, and predict your expenses in a few clicks!</p>\
         </header>"
    );
}

fn upload_form(out: &mut String) {
    out.push_str(
        "<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\
         <p><b>Upload your bank statement (CSV/Excel)</b></p>\
         <input type=\"file\" name=\"file\" accept=\".csv,.xlsx\" required> \
         <button type=\"submit\">Upload</button></form>",
    );
}

fn notice(out: &mut String, kind: &str, message: &str) {
    let _ = write!(out, "<div class=\"notice {kind}\">{}</div>", escape(message));
}

/// Page shown when no statement is loaded.
pub fn render_empty() -> String {
    let mut out = String::new();
    head(&mut out);
    out.push_str("<main>");
    upload_form(&mut out);
    notice(&mut out, "warning", NO_DATA_MESSAGE);
    out.push_str("</main></body></html>");
    out
}

fn sidebar(out: &mut String, dataset: &Dataset, filter: &Filter) {
    let all: Vec<&Transaction> = dataset.transactions.iter().collect();
    out.push_str("<aside><h3>Filters</h3><form method=\"get\" action=\"/\">");
    out.push_str("<input type=\"hidden\" name=\"cats\" value=\"1\"><p><b>Select Categories</b></p>");
    for cat in categories_present(&all) {
        let checked = match &filter.categories {
            Some(selected) if !selected.contains(&cat) => "",
            _ => " checked",
        };
        let cat = escape(&cat);
        let _ = write!(
            out,
            "<label><input type=\"checkbox\" name=\"category\" value=\"{cat}\"{checked}> {cat}</label><br>"
        );
    }
    let from = filter.from.map(|d| d.to_string()).unwrap_or_default();
    let to = filter.to.map(|d| d.to_string()).unwrap_or_default();
    let _ = write!(
        out,
        "<p><b>Select Date Range</b></p>\
         <input type=\"date\" name=\"from\" value=\"{from}\"> to \
         <input type=\"date\" name=\"to\" value=\"{to}\">\
         <p><b>Search Description/Notes</b></p>\
         <input type=\"text\" name=\"q\" value=\"{}\">\
         <p><button type=\"submit\">Apply</button> <a href=\"/\">Reset</a></p></form>",
        escape(filter.search.as_deref().unwrap_or(""))
    );
    out.push_str("<hr>");
    upload_form(out);
    out.push_str("</aside>");
}

fn metric(out: &mut String, label: &str, value: &str) {
    let _ = write!(
        out,
        "<div class=\"metric\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>",
        escape(label),
        escape(value)
    );
}

fn transactions_table(out: &mut String, columns: &[String], rows: &[&Transaction], symbol: &str) {
    out.push_str("<div class=\"scroll\"><table><tr>");
    for c in columns {
        let _ = write!(out, "<th>{}</th>", escape(c));
    }
    out.push_str("</tr>");
    for t in rows {
        out.push_str("<tr>");
        for c in columns {
            let value = match c.as_str() {
                "Amount" => t.amount.map(|a| money(a, symbol)).unwrap_or_default(),
                _ => t.field(c),
            };
            let _ = write!(out, "<td>{}</td>", escape(&value));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table></div>");
}

/// Full dashboard over the filtered view. The date inputs show the filter's
/// range, so callers pass a filter whose unset bounds are already defaulted.
pub fn render(settings: &Settings, dataset: &Dataset, filter: &Filter, raw_query: Option<&str>) -> String {
    let symbol = settings.currency_symbol.as_str();
    let rows = filter.apply(dataset);

    let mut out = String::new();
    head(&mut out);
    out.push_str("<div class=\"layout\">");
    sidebar(&mut out, dataset, filter);
    out.push_str("<main>");

    let _ = write!(out, "<p>Source: <code>{}</code></p>", escape(&dataset.source));
    if dataset.is_empty() {
        notice(&mut out, "info", "The loaded statement has no transactions.");
    }
    let summary = reports::summary(&rows);
    out.push_str("<h2>Summary Metrics</h2><div class=\"metrics\">");
    metric(&mut out, "Total Entries", &summary.entries.to_string());
    metric(&mut out, "Total Amount", &money(summary.total_amount, symbol));
    metric(&mut out, "Categories Shown", &summary.categories_shown.to_string());
    out.push_str("</div>");

    let query = escape(raw_query.unwrap_or(""));
    let _ = write!(
        out,
        "<p><a href=\"/export.xlsx?{query}\" download>Download Filtered Data as Excel</a> \
         &middot; <a href=\"/export.csv?{query}\" download>CSV</a></p>\
         <nav><a href=\"#transactions\">Transactions</a><a href=\"#analytics\">Analytics</a>\
         <a href=\"#insights\">Insights</a><a href=\"#predictions\">Predictions</a></nav>"
    );

    out.push_str("<section id=\"transactions\"><h2>Transactions</h2>");
    transactions_table(&mut out, &dataset.export_columns(), &rows, symbol);
    out.push_str("</section>");

    let breakdown = reports::category_breakdown(&rows);
    let bars: Vec<(String, f64)> = breakdown.iter().map(|c| (c.name.clone(), c.total)).collect();
    out.push_str("<section id=\"analytics\"><h2>Expense Breakdown</h2>");
    out.push_str(&charts::bar_chart("Expenses by Category", &bars, symbol));
    out.push_str(&charts::donut_chart("Category-wise Expense Distribution", &bars));
    out.push_str("<h2>Monthly Spending Trend</h2>");
    let trend: Vec<(String, f64)> = reports::monthly_trend(&rows)
        .into_iter()
        .map(|m| (m.month, m.total))
        .collect();
    out.push_str(&charts::line_chart("Monthly Transactions Trend", &trend, symbol));
    out.push_str("</section>");

    let ins = reports::insights(&rows, settings.low_savings_threshold);
    out.push_str("<section id=\"insights\"><h2>Financial Insights</h2><div class=\"metrics\">");
    metric(&mut out, "Total Income", &money_whole(ins.total_income, symbol));
    metric(&mut out, "Total Expenses", &money_whole(ins.total_expenses, symbol));
    metric(&mut out, "Net Savings", &money_whole(ins.savings, symbol));
    out.push_str("</div>");
    let kind = match ins.verdict {
        Verdict::Overspending => "error",
        Verdict::LowSavings => "warning",
        Verdict::Healthy => "success",
    };
    notice(&mut out, kind, ins.advice);
    let _ = write!(out, "<h3>Top {} Spending Categories</h3><table><tr><th>Category</th><th>Amount</th></tr>", reports::TOP_CATEGORIES);
    for c in &ins.top_categories {
        let _ = write!(
            out,
            "<tr><td>{}</td><td>{}</td></tr>",
            escape(&c.name),
            escape(&money(c.total, symbol))
        );
    }
    out.push_str("</table></section>");

    out.push_str("<section id=\"predictions\"><h2>Expense Prediction (Next Month)</h2>");
    match forecast::forecast(&rows).prediction() {
        Some(p) => {
            let _ = write!(
                out,
                "<p>Predicted Expenses for Month {}: <b>{}</b></p>",
                p.next_month,
                escape(&money_whole(p.predicted, symbol))
            );
            out.push_str(&charts::forecast_chart(p, symbol));
        }
        None => notice(
            &mut out,
            "info",
            "Not enough months of data for prediction. Upload at least 2 months of data.",
        ),
    }
    out.push_str("</section></main></div></body></html>");
    out
}
