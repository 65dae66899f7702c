use std::path::PathBuf;

use crate::error::Result;
use crate::settings::load_settings;
use crate::web::{self, AppState};

pub async fn run(file: Option<PathBuf>, host: Option<String>, port: Option<u16>) -> Result<()> {
    let settings = load_settings();
    let host = host.unwrap_or_else(|| settings.host.clone());
    let port = port.unwrap_or(settings.port);
    let state = AppState::load(settings, file.as_deref())?;
    println!("FinTrack dashboard: http://{host}:{port}");
    web::serve(state, &host, port).await
}
