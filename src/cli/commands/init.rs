//! Init Command
//!
//! Create the project config (if missing) and the SQLite schema.

use crate::cli::ui;
use crate::config::ConfigLoader;
use crate::storage::Database;
use crate::types::Result;

pub fn run() -> Result<()> {
    let config_path = ConfigLoader::init(false, false)?;
    let config = ConfigLoader::load()?;
    config.validate()?;

    let db = Database::open(&config.database.path)?;
    db.initialize()?;

    ui::success("Initialized AgriAI");
    ui::detail("Config", config_path.display());
    ui::detail("Database", config.database.path.display());
    println!();
    println!("Next: set GEMINI_API_KEY (or OPENAI_API_KEY) and OPENWEATHER_API_KEY,");
    println!("then run 'agriai serve'.");
    Ok(())
}
