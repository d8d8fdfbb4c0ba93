//! Config Command
//!
//! Usage:
//!   agriai config show [-f toml|json|yaml]
//!   agriai config path
//!   agriai config init [-g] [--force]

use crate::cli::ui;
use crate::config::{ConfigFormat, ConfigLoader};
use crate::types::Result;

/// Print the merged configuration. Secrets are never printed.
pub fn show(format: ConfigFormat) -> Result<()> {
    ConfigLoader::show_config(format)
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let existed = if global {
        ConfigLoader::global_config_path().is_some_and(|p| p.exists())
    } else {
        ConfigLoader::project_config_path().exists()
    };

    let path = ConfigLoader::init(global, force)?;
    if existed && !force {
        ui::warning(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ));
    } else {
        ui::success(format!("Wrote {}", path.display()));
    }
    Ok(())
}
