use colored::*;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    #[serde(default = "default_cache_file")]
    pub cache_file: PathBuf,
    #[serde(default = "default_limit")]
    pub limit: usize,
    #[serde(default)]
    pub default_section: Option<String>,
    #[serde(default = "default_highlight")]
    pub highlight: bool,
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("./.doxq-cache.json.gz")
}

fn default_limit() -> usize {
    25
}

fn default_highlight() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            docs_dir: default_docs_dir(),
            cache_file: default_cache_file(),
            limit: default_limit(),
            default_section: None,
            highlight: default_highlight(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let config_path = PathBuf::from("doxq.toml");

        if config_path.exists() {
            match fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => {
                        return config;
                    }
                    Err(e) => {
                        eprintln!("{} Failed to parse doxq.toml: {}", "⚠️".yellow(), e);
                        eprintln!("   Using default configuration");
                    }
                },
                Err(e) => {
                    eprintln!("{} Failed to read doxq.toml: {}", "⚠️".yellow(), e);
                    eprintln!("   Using default configuration");
                }
            }
        }

        Config::default()
    }
}
