use comfy_table::{Cell, Table};

use crate::categorizer::OTHER;
use crate::error::Result;
use crate::settings::{load_settings, settings_path};

pub fn list() -> Result<()> {
    let settings = load_settings();
    let table = settings.category_table();

    let mut out = Table::new();
    out.set_header(vec!["#", "Category", "Keywords"]);
    for (i, rule) in table.rules().iter().enumerate() {
        out.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&rule.name),
            Cell::new(rule.keywords.join(", ")),
        ]);
    }
    out.add_row(vec![Cell::new(""), Cell::new(OTHER), Cell::new("(no keyword matched)")]);

    let origin = if settings.categories.is_some() {
        format!("from {}", settings_path().display())
    } else {
        "built-in".to_string()
    };
    println!("Category keywords ({origin}); first match wins\n{out}");
    Ok(())
}
