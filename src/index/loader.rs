//! Discovery and loading of a generated `search/` directory.

use super::parser::{self, ParseError};
use super::types::{Fragment, SearchData, Section, SectionTable};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SECTION_TABLE_FILE: &str = "searchdata.js";

#[derive(Debug)]
pub enum LoadError {
    Io { path: PathBuf, source: io::Error },
    Parse { file: String, source: ParseError },
    NoFragments { dir: PathBuf },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            LoadError::Parse { file, source } => write!(f, "{}: {}", file, source),
            LoadError::NoFragments { dir } => {
                write!(f, "no search index fragments found in {}", dir.display())
            }
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            LoadError::Parse { source, .. } => Some(source),
            LoadError::NoFragments { .. } => None,
        }
    }
}

/// One fragment file read from disk, not yet parsed.
#[derive(Debug, Clone)]
pub struct FragmentSource {
    pub file_name: String,
    pub section: Section,
    pub bucket: u32,
    pub text: String,
}

/// Split a `<section>_<hex>.js` file name into its section and bucket.
/// Anything else (`search.js`, `searchdata.js`, CSS, images) yields `None`.
pub fn fragment_file_name(name: &str) -> Option<(Section, u32)> {
    let stem = name.strip_suffix(".js")?;
    let (prefix, hex) = stem.rsplit_once('_')?;
    let section = Section::from_prefix(prefix)?;
    let bucket = u32::from_str_radix(hex, 16).ok()?;
    Some((section, bucket))
}

fn is_search_dir(dir: &Path) -> bool {
    if dir.join(SECTION_TABLE_FILE).is_file() {
        return true;
    }
    let Ok(read) = fs::read_dir(dir) else {
        return false;
    };
    read.filter_map(|e| e.ok())
        .any(|e| fragment_file_name(&e.file_name().to_string_lossy()).is_some())
}

/// Find the `search/` directory for a documentation tree. Accepts the
/// HTML root (containing `search/`), the Doxygen output root (containing
/// `html/search/`), or the search directory itself.
pub fn locate_search_dir(docs_dir: &Path) -> Option<PathBuf> {
    for candidate in [
        docs_dir.join("search"),
        docs_dir.join("html").join("search"),
        docs_dir.to_path_buf(),
    ] {
        if candidate.is_dir() && is_search_dir(&candidate) {
            return Some(candidate);
        }
    }
    None
}

/// Read every fragment file in the directory, ordered by section and
/// bucket. Files shaped like fragments but with an unknown section prefix
/// are skipped with a warning.
pub fn read_sources(search_dir: &Path) -> Result<Vec<FragmentSource>, LoadError> {
    let read = fs::read_dir(search_dir).map_err(|e| LoadError::Io {
        path: search_dir.to_path_buf(),
        source: e,
    })?;

    let mut sources = Vec::new();
    for dir_entry in read {
        let dir_entry = dir_entry.map_err(|e| LoadError::Io {
            path: search_dir.to_path_buf(),
            source: e,
        })?;
        let file_name = dir_entry.file_name().to_string_lossy().to_string();

        let Some((section, bucket)) = fragment_file_name(&file_name) else {
            if looks_like_fragment(&file_name) {
                eprintln!("⚠️  Skipping index file with unknown section: {}", file_name);
            }
            continue;
        };

        let path = dir_entry.path();
        let text = fs::read_to_string(&path).map_err(|e| LoadError::Io { path, source: e })?;
        sources.push(FragmentSource {
            file_name,
            section,
            bucket,
            text,
        });
    }

    sources.sort_by(|a, b| (a.section, a.bucket).cmp(&(b.section, b.bucket)));
    Ok(sources)
}

/// `<something>_<hex>.js` with a prefix we do not know (Doxygen emits
/// extra sections for other languages).
fn looks_like_fragment(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".js") else {
        return false;
    };
    match stem.rsplit_once('_') {
        Some((prefix, hex)) => {
            !prefix.is_empty() && u32::from_str_radix(hex, 16).is_ok()
        }
        None => false,
    }
}

/// Read and parse `searchdata.js` if the directory has one.
pub fn read_section_table(search_dir: &Path) -> Result<Option<SectionTable>, LoadError> {
    let path = search_dir.join(SECTION_TABLE_FILE);
    if !path.is_file() {
        return Ok(None);
    }
    let text = fs::read_to_string(&path).map_err(|e| LoadError::Io {
        path: path.clone(),
        source: e,
    })?;
    let table = parser::parse_section_table(&text).map_err(|e| LoadError::Parse {
        file: SECTION_TABLE_FILE.to_string(),
        source: e,
    })?;
    Ok(Some(table))
}

/// Parse already-read sources into the raw search data.
pub fn parse_sources(
    sources: &[FragmentSource],
    section_table: Option<SectionTable>,
) -> Result<SearchData, LoadError> {
    let mut fragments = Vec::with_capacity(sources.len());
    for source in sources {
        let entries = parser::parse_fragment(&source.text).map_err(|e| LoadError::Parse {
            file: source.file_name.clone(),
            source: e,
        })?;
        fragments.push(Fragment {
            section: source.section,
            bucket: source.bucket,
            file_name: source.file_name.clone(),
            entries,
        });
    }
    Ok(SearchData {
        fragments,
        section_table,
    })
}

/// Load a whole search directory: enumerate, read, and parse everything.
pub fn load_dir(search_dir: &Path) -> Result<SearchData, LoadError> {
    let sources = read_sources(search_dir)?;
    if sources.is_empty() {
        return Err(LoadError::NoFragments {
            dir: search_dir.to_path_buf(),
        });
    }
    let section_table = read_section_table(search_dir)?;
    parse_sources(&sources, section_table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::types::{SearchIndex, containing_scope, normalize_key};

    fn corpus_root() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/aitoolbox")
    }

    fn corpus_index() -> SearchIndex {
        let dir = locate_search_dir(&corpus_root()).unwrap();
        SearchIndex::build(load_dir(&dir).unwrap())
    }

    #[test]
    fn test_fragment_file_name() {
        assert_eq!(
            fragment_file_name("functions_b.js"),
            Some((Section::Functions, 0xb))
        );
        assert_eq!(fragment_file_name("all_0.js"), Some((Section::All, 0)));
        assert_eq!(
            fragment_file_name("classes_10.js"),
            Some((Section::Classes, 0x10))
        );
        assert_eq!(fragment_file_name("search.js"), None);
        assert_eq!(fragment_file_name("searchdata.js"), None);
        assert_eq!(fragment_file_name("nomatches.html"), None);
        // Sections this tool does not know about.
        assert_eq!(fragment_file_name("properties_0.js"), None);
    }

    #[test]
    fn test_locate_search_dir() {
        let root = corpus_root();
        let from_root = locate_search_dir(&root).unwrap();
        assert!(from_root.ends_with("search"));

        let direct = locate_search_dir(&from_root).unwrap();
        assert_eq!(direct, from_root);

        let not_docs = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
        assert!(locate_search_dir(&not_docs).is_none());
    }

    #[test]
    fn test_directory_without_section_table() {
        let dir =
            std::env::temp_dir().join(format!("doxq-loader-notable-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("all_0.js"),
            "var searchData=\n[\n  ['aitoolbox',['AIToolbox',['../namespaceAIToolbox.html',1,'AIToolbox']]]\n];\n",
        )
        .unwrap();

        // No searchdata.js is a soft miss, not an error.
        assert!(read_section_table(&dir).unwrap().is_none());

        // The fragment alone is enough to recognize the directory.
        assert_eq!(locate_search_dir(&dir), Some(dir.clone()));

        let data = load_dir(&dir).unwrap();
        assert!(data.section_table.is_none());
        assert_eq!(data.entry_count(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_corpus() {
        let dir = locate_search_dir(&corpus_root()).unwrap();
        let data = load_dir(&dir).unwrap();

        assert_eq!(data.fragments.len(), 16);
        assert_eq!(data.entry_count(), 48);
        assert_eq!(data.target_count(), 66);

        // Fragments arrive ordered by section, then bucket.
        assert_eq!(data.fragments[0].file_name, "all_0.js");
        assert_eq!(data.fragments.last().unwrap().file_name, "functions_0.js");

        let table = data.section_table.unwrap();
        assert_eq!(table.rows.len(), 5);
        assert_eq!(table.rows[0].name, "all");
        assert_eq!(table.rows[0].buckets, "acfmpst");
        assert_eq!(table.rows[4].name, "functions");
        assert_eq!(table.rows[4].buckets, "m");
    }

    #[test]
    fn test_corpus_keys_are_normalized_display_names() {
        let dir = locate_search_dir(&corpus_root()).unwrap();
        let data = load_dir(&dir).unwrap();

        for (fragment, entry) in data.entries() {
            assert_eq!(
                entry.key,
                normalize_key(&entry.display),
                "bad key in {}",
                fragment.file_name
            );
        }
    }

    #[test]
    fn test_corpus_entries_have_targets() {
        let dir = locate_search_dir(&corpus_root()).unwrap();
        let data = load_dir(&dir).unwrap();

        for (fragment, entry) in data.entries() {
            assert!(
                !entry.targets.is_empty(),
                "entry '{}' in {} has no targets",
                entry.key,
                fragment.file_name
            );
        }
    }

    #[test]
    fn test_corpus_fragments_are_sorted_by_key() {
        let dir = locate_search_dir(&corpus_root()).unwrap();
        let data = load_dir(&dir).unwrap();

        for fragment in &data.fragments {
            for pair in fragment.entries.windows(2) {
                assert!(
                    pair[0].key <= pair[1].key,
                    "{} is not sorted: '{}' > '{}'",
                    fragment.file_name,
                    pair[0].key,
                    pair[1].key
                );
            }
        }
    }

    #[test]
    fn test_query_model_covers_both_model_classes() {
        let index = corpus_index();

        let hits = index.query("model", None);
        let keys: Vec<&str> = hits.iter().map(|h| h.entry.key.as_str()).collect();
        assert_eq!(keys, vec!["model", "sparsemodel"]);

        let model = hits[0].entry;
        let mdp = model
            .targets
            .iter()
            .filter(|t| t.scope.starts_with("AIToolbox::MDP::Model"))
            .count();
        let pomdp = model
            .targets
            .iter()
            .filter(|t| t.scope.starts_with("AIToolbox::POMDP::Model"))
            .count();
        assert!(mdp >= 3, "expected the MDP constructor overloads, got {}", mdp);
        assert!(
            pomdp >= 3,
            "expected the POMDP constructor overloads, got {}",
            pomdp
        );
    }

    #[test]
    fn test_query_mcts_is_a_single_entry() {
        let index = corpus_index();

        let hits = index.query("mcts", None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.display, "MCTS");
    }

    #[test]
    fn test_query_absent_term_is_empty() {
        let index = corpus_index();
        assert!(index.query("zzzznotfound", None).is_empty());
    }

    #[test]
    fn test_corpus_scopes_resolve_to_containers() {
        let index = corpus_index();

        let hits = index.query("makefromtrusteddata", None);
        assert_eq!(hits.len(), 1);
        let scopes: Vec<&str> = hits[0]
            .entry
            .targets
            .iter()
            .map(|t| containing_scope(&hits[0].entry.display, &t.scope))
            .collect();
        assert_eq!(
            scopes,
            vec!["AIToolbox::MDP::Model", "AIToolbox::MDP::SparseModel"]
        );
    }
}
