use std::path::Path;

use crate::cli::{FilterArgs, Session};
use crate::error::Result;
use crate::export::write_file;

pub fn run(args: &FilterArgs, output: &Path) -> Result<()> {
    let session = Session::open(args)?;
    let rows = session.rows();
    write_file(output, &session.dataset.export_columns(), &rows)?;
    println!("Wrote {} rows to {}", rows.len(), output.display());
    Ok(())
}
