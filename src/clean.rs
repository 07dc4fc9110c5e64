use colored::*;
use std::fs;

use crate::config::Config;

pub fn clean(config: &Config) -> Result<(), String> {
    if !config.cache_file.exists() {
        println!("{} Nothing to clean", "✨".cyan());
        return Ok(());
    }

    fs::remove_file(&config.cache_file)
        .map_err(|e| format!("Failed to remove cache file: {}", e))?;

    println!("{} Removed cache:", "🧹".green());
    println!("  {} {}", "✓".green(), config.cache_file.display());

    Ok(())
}
