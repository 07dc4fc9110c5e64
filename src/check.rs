//! Structural checks over an on-disk search directory

use colored::*;
use lazy_static::lazy_static;
use regex::Regex;
use terminal_size::{Width, terminal_size};

use crate::load::LoadContext;
use doxq::index::{Entry, Section, SectionTable, loader, normalize_key, parse_fragment};

lazy_static! {
    // Relative page link with an optional anchor, as the generator writes
    // them. Subdirectory layouts nest pages under short hex directories.
    static ref LOCAL_URL: Regex = Regex::new(
        r"^(\.\./)*([A-Za-z0-9_.+-]+/)*[A-Za-z0-9_.+-]+\.x?html(#[A-Za-z0-9_.:-]+)?$"
    )
    .unwrap();
}

#[derive(Debug)]
struct Finding {
    is_error: bool,
    message: String,
}

impl Finding {
    fn error(message: String) -> Self {
        Finding {
            is_error: true,
            message,
        }
    }

    fn warning(message: String) -> Self {
        Finding {
            is_error: false,
            message,
        }
    }
}

/// Get the current terminal width, defaulting to 80 if unable to detect
fn get_terminal_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        w as usize
    } else {
        80 // Default fallback width
    }
}

/// Create a separator line that fits the terminal width
fn separator(width: usize) -> String {
    "─".repeat(width.min(120)) // Cap at 120 for very wide terminals
}

/// Validate every fragment file and the section table, reporting findings
/// per file. Always reads from disk; the cache plays no part here.
pub fn run_check(ctx: &LoadContext) -> Result<(), String> {
    let search_dir = loader::locate_search_dir(&ctx.config.docs_dir).ok_or_else(|| {
        format!(
            "No Doxygen search index under {} (tried search/, html/search/, and the directory itself)",
            ctx.config.docs_dir.display()
        )
    })?;

    println!("{} Checking {}\n", "🔍".cyan(), search_dir.display());

    let sources = loader::read_sources(&search_dir).map_err(|e| e.to_string())?;
    if sources.is_empty() {
        return Err(format!(
            "No search index fragments found in {}",
            search_dir.display()
        ));
    }

    let mut errors = 0;
    let mut warnings = 0;
    let mut entry_total = 0;
    let mut target_total = 0;
    let mut present = Vec::new();

    for source in &sources {
        let findings = match parse_fragment(&source.text) {
            Ok(entries) => {
                entry_total += entries.len();
                target_total += entries.iter().map(|e| e.targets.len()).sum::<usize>();
                present.push((source.section, source.bucket));
                check_entries(&entries)
            }
            Err(e) => vec![Finding::error(format!("parse error: {}", e))],
        };
        report_file(&source.file_name, &findings);
        errors += findings.iter().filter(|f| f.is_error).count();
        warnings += findings.iter().filter(|f| !f.is_error).count();
    }

    match loader::read_section_table(&search_dir) {
        Ok(Some(table)) => {
            let findings = check_coverage(&table, &present);
            report_file(loader::SECTION_TABLE_FILE, &findings);
            errors += findings.iter().filter(|f| f.is_error).count();
            warnings += findings.iter().filter(|f| !f.is_error).count();
        }
        Ok(None) => {
            println!(
                "  {} {} is missing; the browser widget needs it",
                "⚠️".yellow(),
                loader::SECTION_TABLE_FILE
            );
            warnings += 1;
        }
        Err(e) => {
            println!("  {} {}", "❌".red(), e);
            errors += 1;
        }
    }

    let sep_width = get_terminal_width().saturating_sub(2).max(40);
    println!("\n{}", separator(sep_width).cyan());
    println!(
        "{} {} fragment file(s) checked: {} entries, {} links",
        "📊".cyan(),
        sources.len(),
        entry_total,
        target_total
    );

    if errors > 0 {
        return Err(format!("{} error(s), {} warning(s)", errors, warnings));
    }
    if warnings > 0 {
        println!("{} {} warning(s), no errors", "⚠️".yellow(), warnings);
    } else {
        println!("{} No problems found", "✅".green());
    }
    Ok(())
}

fn report_file(name: &str, findings: &[Finding]) {
    if findings.is_empty() {
        println!("  {} {}", "✓".green(), name);
        return;
    }

    let has_errors = findings.iter().any(|f| f.is_error);
    let mark = if has_errors {
        "❌".red()
    } else {
        "⚠️".yellow()
    };
    println!("  {} {}", mark, name);
    for finding in findings {
        let bullet = if finding.is_error {
            "•".red()
        } else {
            "•".yellow()
        };
        println!("     {} {}", bullet, finding.message);
    }
}

/// Per-fragment checks: keys normalized, sorted, distinct; local URLs
/// shaped like relative page links.
fn check_entries(entries: &[Entry]) -> Vec<Finding> {
    let mut findings = Vec::new();

    if entries.is_empty() {
        findings.push(Finding::warning("file has no entries".to_string()));
        return findings;
    }

    for entry in entries {
        let expected = normalize_key(&entry.display);
        if entry.key != expected {
            findings.push(Finding::error(format!(
                "key '{}' does not match display name '{}' (expected '{}')",
                entry.key, entry.display, expected
            )));
        }

        for target in &entry.targets {
            if target.local && !LOCAL_URL.is_match(&target.url) {
                findings.push(Finding::error(format!(
                    "entry '{}' has a malformed target URL: {}",
                    entry.key, target.url
                )));
            }
        }
    }

    for pair in entries.windows(2) {
        if pair[0].key > pair[1].key {
            findings.push(Finding::error(format!(
                "entries out of order: '{}' comes before '{}'",
                pair[0].key, pair[1].key
            )));
        } else if pair[0].key == pair[1].key {
            findings.push(Finding::error(format!("duplicate key '{}'", pair[0].key)));
        }
    }

    let mut initials: Vec<char> = entries
        .iter()
        .filter_map(|e| e.key.chars().next())
        .collect();
    initials.sort_unstable();
    initials.dedup();
    if initials.len() > 1 {
        findings.push(Finding::warning(format!(
            "keys start with mixed characters ({}), expected a single bucket letter",
            initials.iter().collect::<String>()
        )));
    }

    findings
}

/// Cross-check the section table against the fragment files actually found:
/// every advertised bucket should exist, and every file should be advertised.
fn check_coverage(table: &SectionTable, present: &[(Section, u32)]) -> Vec<Finding> {
    let mut findings = Vec::new();

    for row in &table.rows {
        let Some(section) = Section::from_prefix(&row.name) else {
            findings.push(Finding::warning(format!(
                "searchdata.js lists unknown section '{}'",
                row.name
            )));
            continue;
        };

        for (bucket, ch) in row.buckets.chars().enumerate() {
            let bucket = bucket as u32;
            if !present.iter().any(|&(s, b)| s == section && b == bucket) {
                findings.push(Finding::warning(format!(
                    "searchdata.js lists bucket '{}' for {} but {}_{:x}.js is missing",
                    ch,
                    row.name,
                    section.prefix(),
                    bucket
                )));
            }
        }
    }

    for &(section, bucket) in present {
        let covered = table.rows.iter().any(|row| {
            Section::from_prefix(&row.name) == Some(section)
                && (bucket as usize) < row.buckets.chars().count()
        });
        if !covered {
            findings.push(Finding::error(format!(
                "{}_{:x}.js is not reflected in searchdata.js",
                section.prefix(),
                bucket
            )));
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use doxq::index::{SectionRow, Target};
    use std::fs;
    use std::path::Path;

    fn entry(key: &str, display: &str, url: &str) -> Entry {
        Entry {
            key: key.to_string(),
            display: display.to_string(),
            targets: vec![Target {
                url: url.to_string(),
                local: true,
                scope: String::new(),
            }],
        }
    }

    #[test]
    fn test_clean_corpus_has_no_findings() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/aitoolbox");
        let dir = loader::locate_search_dir(&root).unwrap();
        let sources = loader::read_sources(&dir).unwrap();

        let mut present = Vec::new();
        for source in &sources {
            let entries = parse_fragment(&source.text).unwrap();
            present.push((source.section, source.bucket));
            let findings = check_entries(&entries);
            assert!(findings.is_empty(), "{}: {:?}", source.file_name, findings);
        }

        let table = loader::read_section_table(&dir).unwrap().unwrap();
        let findings = check_coverage(&table, &present);
        assert!(findings.is_empty(), "{:?}", findings);
    }

    #[test]
    fn test_missing_section_table_is_a_warning() {
        let dir =
            std::env::temp_dir().join(format!("doxq-check-notable-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("all_0.js"),
            "var searchData=\n[\n  ['aitoolbox',['AIToolbox',['../namespaceAIToolbox.html',1,'AIToolbox']]]\n];\n",
        )
        .unwrap();

        let ctx = LoadContext {
            config: Config {
                docs_dir: dir.clone(),
                ..Config::default()
            },
            verbose: false,
            force: false,
        };
        let result = run_check(&ctx);
        let _ = fs::remove_dir_all(&dir);

        // Fragments without a searchdata.js warn but do not fail the check
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_out_of_order_keys() {
        let entries = vec![
            entry("merge", "merge", "../a.html"),
            entry("match", "match", "../b.html"),
        ];
        let findings = check_entries(&entries);
        assert!(findings.iter().any(|f| f.is_error && f.message.contains("out of order")));
    }

    #[test]
    fn test_duplicate_keys() {
        let entries = vec![
            entry("match", "match", "../a.html"),
            entry("match", "match", "../b.html"),
        ];
        let findings = check_entries(&entries);
        assert!(findings.iter().any(|f| f.is_error && f.message.contains("duplicate key")));
    }

    #[test]
    fn test_key_must_match_display() {
        let entries = vec![entry("model", "MCTS", "../a.html")];
        let findings = check_entries(&entries);
        assert!(
            findings
                .iter()
                .any(|f| f.is_error && f.message.contains("expected 'mcts'"))
        );
    }

    #[test]
    fn test_url_shape() {
        let good = vec![entry(
            "model",
            "Model",
            "../classAIToolbox_1_1MDP_1_1Model.html#af001e34af54054d72f5d6a9283667592",
        )];
        assert!(check_entries(&good).is_empty());

        // Subdirectory layouts nest pages a couple of levels down
        let nested = vec![entry(
            "model",
            "Model",
            "../d0/d12/classAIToolbox_1_1MDP_1_1Model.html#af001e34",
        )];
        assert!(check_entries(&nested).is_empty());

        let bad = vec![entry("model", "Model", "javascript:alert(1)")];
        let findings = check_entries(&bad);
        assert!(findings.iter().any(|f| f.is_error && f.message.contains("malformed target URL")));

        // External links are exempt from the shape check
        let mut external = entry("model", "Model", "http://example.com/Model");
        external.targets[0].local = false;
        assert!(check_entries(&[external]).is_empty());
    }

    #[test]
    fn test_mixed_initials_warn() {
        let entries = vec![
            entry("match", "match", "../a.html"),
            entry("tiger", "tiger", "../b.html"),
        ];
        let findings = check_entries(&entries);
        assert!(
            findings
                .iter()
                .any(|f| !f.is_error && f.message.contains("mixed characters (mt)"))
        );
    }

    #[test]
    fn test_empty_file_warns() {
        let findings = check_entries(&[]);
        assert!(findings.iter().any(|f| !f.is_error && f.message.contains("no entries")));
    }

    #[test]
    fn test_coverage_both_directions() {
        let table = SectionTable {
            rows: vec![SectionRow {
                name: "classes".to_string(),
                buckets: "ms".to_string(),
            }],
        };

        // Advertised bucket 's' (index 1) has no file
        let findings = check_coverage(&table, &[(Section::Classes, 0)]);
        assert!(
            findings
                .iter()
                .any(|f| !f.is_error && f.message.contains("classes_1.js is missing"))
        );

        // A file nothing advertises
        let findings = check_coverage(&table, &[(Section::Classes, 0), (Section::Files, 0)]);
        assert!(
            findings
                .iter()
                .any(|f| f.is_error && f.message.contains("files_0.js is not reflected"))
        );
    }

    #[test]
    fn test_unknown_section_row_warns() {
        let table = SectionTable {
            rows: vec![SectionRow {
                name: "properties".to_string(),
                buckets: "a".to_string(),
            }],
        };
        let findings = check_coverage(&table, &[]);
        assert!(
            findings
                .iter()
                .any(|f| !f.is_error && f.message.contains("unknown section 'properties'"))
        );
    }
}
