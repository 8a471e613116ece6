use anyhow::Context;
use std::path::{Path, PathBuf};

use shelftag_core::{AppConfig, LabelProfile};

pub const CONFIG_FILE: &str = "config.toml";

/// Read `config.toml` from the data directory, falling back to the built-in
/// profiles when the file does not exist.
pub fn load(data_dir: &Path) -> anyhow::Result<AppConfig> {
    let path = data_dir.join(CONFIG_FILE);
    match std::fs::read_to_string(&path) {
        Ok(content) => AppConfig::from_toml(&content)
            .with_context(|| format!("Invalid config file {}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("No config at {}, using built-in profiles", path.display());
            Ok(AppConfig::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

pub fn database_path(data_dir: &Path, profile: &LabelProfile) -> PathBuf {
    if profile.database.is_absolute() {
        profile.database.clone()
    } else {
        data_dir.join(&profile.database)
    }
}
