use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STATEMENT: &str = "\
Date,Amount,Type,Description,Notes
2024-01-01,50000,Credit,Salary January,
2024-01-03,15000,Debit,Rent January,
2024-01-12,640,Debit,Zomato dinner,
2024-02-01,50000,Credit,Salary February,
2024-02-03,15000,Debit,Rent February,
2024-02-20,2300,Debit,Amazon shopping,
2024-03-05,900,Debit,Uber airport,
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("statement.csv"), STATEMENT).unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> std::path::PathBuf {
        self.dir.path().join(name)
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("fintrack").unwrap();
        cmd.current_dir(self.dir.path())
            .env("FINTRACK_CONFIG", self.path("settings.json"))
            .env_remove("RUST_LOG");
        cmd
    }

    fn statement(&self) -> String {
        self.path("statement.csv").display().to_string()
    }
}

fn read(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap()
}

#[test]
fn summary_reports_filtered_totals() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["summary", "--file", &fx.statement(), "-c", "Rent", "-c", "Food"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Entries:     3"))
        .stdout(predicate::str::contains("30,640.00"))
        .stdout(predicate::str::contains("Categories Shown:  2"));
}

#[test]
fn insights_flags_healthy_savings() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["insights", "--file", &fx.statement()])
        .assert()
        .success()
        .stdout(predicate::str::contains("66,160"))
        .stdout(predicate::str::contains("Top 5 Spending Categories"));
}

#[test]
fn forecast_predicts_next_month() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["forecast", "--file", &fx.statement()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Predicted Expenses for Month 4"));
}

#[test]
fn forecast_needs_two_months() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["forecast", "--file", &fx.statement(), "--month", "2024-02"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not enough months of data"));
}

#[test]
fn export_csv_appends_category_column() {
    let fx = Fixture::new();
    let out = fx.path("rent.csv");
    fx.cmd()
        .args(["export", "--file", &fx.statement(), "--search", "rent", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 2 rows"));

    let text = read(&out);
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("Date,Amount,Type,Description,Notes,Category"));
    assert!(lines.all(|l| l.ends_with(",Rent")));
}

#[test]
fn categories_lists_builtin_table() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("categories")
        .assert()
        .success()
        .stdout(predicate::str::contains("built-in"))
        .stdout(predicate::str::contains("Zomato"))
        .stdout(predicate::str::contains("Other"));
}

#[test]
fn init_writes_settings_once() {
    let fx = Fixture::new();
    fx.cmd().arg("init").assert().success();
    assert!(read(&fx.path("settings.json")).contains("\"categories\""));

    fx.cmd()
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
    fx.cmd().args(["init", "--force"]).assert().success();
}

#[test]
fn missing_statement_shows_upload_message() {
    let fx = Fixture::new();
    fx.cmd()
        .arg("summary")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Please upload a dataset"));
}

#[test]
fn fallback_file_from_settings_is_used() {
    let fx = Fixture::new();
    std::fs::write(
        fx.path("settings.json"),
        format!(r#"{{"fallback_file": {:?}}}"#, fx.statement()),
    )
    .unwrap();
    fx.cmd()
        .arg("summary")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total Entries:     7"));
}

#[test]
fn invalid_date_is_rejected() {
    let fx = Fixture::new();
    fx.cmd()
        .args(["summary", "--file", &fx.statement(), "--from", "03/01/2024"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid date"));
}

#[test]
fn unsupported_extension_is_rejected() {
    let fx = Fixture::new();
    std::fs::write(fx.path("notes.txt"), "hello").unwrap();
    fx.cmd()
        .args(["summary", "--file"])
        .arg(fx.path("notes.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported file format"));
}
