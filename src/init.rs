use colored::*;
use std::{fs, path::PathBuf};

pub fn init_config(force: bool) -> Result<(), String> {
    let config_path = PathBuf::from("doxq.toml");

    if config_path.exists() && !force {
        return Err("doxq.toml already exists. Use --force to overwrite.".to_string());
    }

    let template = r#"# doxq Configuration File

# Doxygen output to search: the HTML root, its parent, or the search/
# directory itself
# Defaults to "." (current directory)
docs_dir = "."

# Location of the parsed-index cache
cache_file = "./.doxq-cache.json.gz"

# Maximum results printed per query
limit = 25

# Section searched when none is named, for one-shot queries and bare
# shell terms alike
# Omit to search the "all" section (what the browser widget does)
# default_section = "functions"

# Syntax-highlight C++ signatures in query output
highlight = true
"#;

    fs::write(&config_path, template).map_err(|e| format!("Failed to create doxq.toml: {}", e))?;

    println!("{} Created doxq.toml", "✅".green());
    println!("\n{}", "Configuration file created with defaults:".cyan());
    println!("  {} docs_dir = \".\"", "•".blue());
    println!("  {} cache_file = \"./.doxq-cache.json.gz\"", "•".blue());
    println!("  {} limit = 25", "•".blue());
    println!("  {} highlight = true", "•".blue());
    println!(
        "\n{}",
        "Edit doxq.toml to point docs_dir at your generated documentation.".cyan()
    );

    Ok(())
}
