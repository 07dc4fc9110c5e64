use colored::*;
use std::time::Instant;

use crate::cache::{CachedIndex, compute_fingerprint, load_cache, needs_reparse, save_cache};
use crate::config::Config;
use doxq::index::{SearchIndex, loader};

#[derive(Debug)]
pub struct LoadContext {
    pub config: Config,
    pub verbose: bool,
    pub force: bool,
}

/// Locate the search directory, then produce the index from cache when the
/// fragment files are unchanged, or by parsing them otherwise.
pub fn obtain_index(ctx: &LoadContext) -> Result<SearchIndex, String> {
    let start = Instant::now();
    let search_dir = loader::locate_search_dir(&ctx.config.docs_dir).ok_or_else(|| {
        format!(
            "No Doxygen search index under {} (tried search/, html/search/, and the directory itself)",
            ctx.config.docs_dir.display()
        )
    })?;

    if ctx.verbose {
        println!("{} Search directory: {}", "📚".cyan(), search_dir.display());
    }

    let sources = loader::read_sources(&search_dir).map_err(|e| e.to_string())?;
    if sources.is_empty() {
        return Err(format!(
            "No search index fragments found in {}",
            search_dir.display()
        ));
    }

    let fingerprint = compute_fingerprint(&sources);
    let current = load_cache(&ctx.config.cache_file)
        .filter(|cached| !needs_reparse(Some(cached), &fingerprint, ctx.force));

    let data = match current {
        Some(cached) => {
            if ctx.verbose {
                println!(
                    "  {} Using cached index ({} files unchanged)",
                    "✓".green(),
                    sources.len()
                );
            }
            cached.data
        }
        None => {
            if ctx.verbose {
                println!(
                    "  {} Parsing {} fragment files...",
                    "🔄".cyan(),
                    sources.len()
                );
            }
            let section_table =
                loader::read_section_table(&search_dir).map_err(|e| e.to_string())?;
            let data = loader::parse_sources(&sources, section_table).map_err(|e| e.to_string())?;
            let cache = CachedIndex { fingerprint, data };
            save_cache(&ctx.config.cache_file, &cache);
            cache.data
        }
    };

    let index = SearchIndex::build(data);
    if ctx.verbose {
        println!(
            "{} Indexed {} entries ({} links) in {:?}",
            "📊".cyan(),
            index.data.entry_count(),
            index.data.target_count(),
            start.elapsed()
        );
    }

    Ok(index)
}
