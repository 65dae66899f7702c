use crate::error::{FintrackError, Result};
use crate::settings::{save_settings, settings_path, Settings};

pub fn run(force: bool) -> Result<()> {
    let path = settings_path();
    if path.exists() && !force {
        return Err(FintrackError::Settings(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    let defaults = Settings::default();
    let settings = Settings {
        categories: Some(defaults.category_table().rules().to_vec()),
        ..defaults
    };
    let written = save_settings(&settings)?;
    println!("Wrote {}", written.display());
    println!("Edit the `categories` list to change how transactions are tagged.");
    Ok(())
}
