//! Query commands: one-shot lookups and the interactive explorer

use colored::*;
use std::io::{self, Write};

use crate::load::{LoadContext, obtain_index};
use crate::syntax::highlight_cpp_code;
use doxq::index::{Entry, Hit, SearchIndex, Section, Target, containing_scope};

/// Run a single query and print the results.
pub fn run_query(
    ctx: &LoadContext,
    term: &str,
    section: Option<&str>,
    limit: Option<usize>,
    exact: bool,
) -> Result<(), String> {
    let index = obtain_index(ctx)?;
    let section = resolve_section(ctx, section)?;
    let limit = limit.unwrap_or(ctx.config.limit);

    let hits = if exact {
        index.get_exact(term, section)
    } else {
        index.query(term, section)
    };

    if hits.is_empty() {
        let suggestions = suggest_displays(&index, term);
        if suggestions.is_empty() {
            return Err(format!("No matches for '{}'", term));
        }
        println!(
            "{} No matches for '{}'. Did you mean one of these?\n",
            "ℹ️".blue(),
            term
        );
        for display in &suggestions {
            println!("  {} {}", "•".cyan(), display.green());
        }
        return Ok(());
    }

    print_hits(
        &hits,
        term,
        &section_label(&index, section),
        limit,
        ctx.config.highlight,
    );
    Ok(())
}

/// Interactive explorer: load once, query until quit.
pub fn run_shell(ctx: &LoadContext) -> Result<(), String> {
    let index = obtain_index(ctx)?;
    // Bare terms honor the configured default, same as the one-shot path.
    let default_section = resolve_section(ctx, None)?;

    println!("{}", "╔═══════════════════════════════════════════╗".cyan());
    println!("{}", "║   Doxygen Search Index Explorer           ║".cyan());
    println!("{}", "╚═══════════════════════════════════════════╝".cyan());
    println!();
    print_shell_help();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", "doxq>".blue().bold());
        stdout.flush().unwrap();

        let mut input = String::new();
        let read = stdin.read_line(&mut input).map_err(|e| e.to_string())?;
        if read == 0 {
            println!("\nGoodbye! 👋");
            break;
        }

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let parts: Vec<&str> = input.split_whitespace().collect();

        match parts[0] {
            "quit" | "exit" | "q" => {
                println!("Goodbye! 👋");
                break;
            }
            "help" | "?" => print_shell_help(),
            "sections" => {
                println!();
                for (section, count) in index.sections() {
                    println!(
                        "  {} {} ({} entries)",
                        "•".cyan(),
                        section.to_string().green(),
                        count
                    );
                }
            }
            "stats" => {
                println!(
                    "\n{} {} fragment file(s), {} entries, {} links, {} distinct keys",
                    "📊".cyan(),
                    index.data.fragments.len(),
                    index.data.entry_count(),
                    index.data.target_count(),
                    index.key_count()
                );
            }
            "sec" => {
                if parts.len() < 3 {
                    println!("{} Usage: sec <section> <term>", "⚠️".yellow());
                    continue;
                }
                match parse_section(parts[1]) {
                    Ok(section) => {
                        let term = parts[2..].join(" ");
                        shell_query(&index, ctx, &term, Some(section));
                    }
                    Err(e) => println!("{} {}", "⚠️".yellow(), e),
                }
            }
            _ => {
                shell_query(&index, ctx, input, default_section);
            }
        }
        println!();
    }

    Ok(())
}

fn print_shell_help() {
    println!("Commands:");
    println!(
        "  {}                  - Search (default scope)",
        "<term>".green()
    );
    println!(
        "  {} <section> <term>    - Search one section",
        "sec".green()
    );
    println!(
        "  {}                - List sections with entry counts",
        "sections".green()
    );
    println!("  {}                   - Index totals", "stats".green());
    println!("  {}                    - Exit", "quit".green());
    println!();
}

fn shell_query(index: &SearchIndex, ctx: &LoadContext, term: &str, section: Option<Section>) {
    let hits = index.query(term, section);
    if hits.is_empty() {
        let suggestions = suggest_displays(index, term);
        if suggestions.is_empty() {
            println!("{} No matches for '{}'", "ℹ️".blue(), term);
        } else {
            println!(
                "{} No matches for '{}'. Did you mean one of these?\n",
                "ℹ️".blue(),
                term
            );
            for display in &suggestions {
                println!("  {} {}", "•".cyan(), display.green());
            }
        }
        return;
    }

    print_hits(
        &hits,
        term,
        &section_label(index, section),
        ctx.config.limit,
        ctx.config.highlight,
    );
}

/// What the result header should call the searched scope.
fn section_label(index: &SearchIndex, section: Option<Section>) -> String {
    match section {
        Some(section) => section.to_string(),
        None => {
            if index.sections().iter().any(|(s, _)| *s == Section::All) {
                Section::All.to_string()
            } else {
                "every section".to_string()
            }
        }
    }
}

fn parse_section(name: &str) -> Result<Section, String> {
    Section::from_prefix(&name.to_lowercase()).ok_or_else(|| {
        let known: Vec<&str> = Section::ALL.iter().map(|s| s.prefix()).collect();
        format!("Unknown section '{}' (known: {})", name, known.join(", "))
    })
}

/// CLI flag wins; otherwise the config default, ignored with a warning if
/// it names an unknown section.
fn resolve_section(ctx: &LoadContext, flag: Option<&str>) -> Result<Option<Section>, String> {
    if let Some(name) = flag {
        return parse_section(name).map(Some);
    }
    if let Some(name) = &ctx.config.default_section {
        match parse_section(name) {
            Ok(section) => return Ok(Some(section)),
            Err(_) => {
                eprintln!(
                    "{} Unknown default_section '{}' in doxq.toml, ignoring",
                    "⚠️".yellow(),
                    name
                );
            }
        }
    }
    Ok(None)
}

fn print_hits(hits: &[Hit], term: &str, label: &str, limit: usize, highlight: bool) {
    println!(
        "\n{} {} result(s) for '{}' in {}:\n",
        "🔍".cyan(),
        hits.len(),
        term,
        label
    );

    let shown = hits.len().min(limit);
    for hit in &hits[..shown] {
        display_hit(hit, highlight);
    }
    if hits.len() > limit {
        println!("  ... and {} more", hits.len() - limit);
    }

    let links: usize = hits.iter().map(|h| h.entry.targets.len()).sum();
    println!(
        "\n{} Total: {} match(es), {} link(s)",
        "✓".green(),
        hits.len(),
        links
    );
}

/// One result: the display name, then its targets grouped by scope.
fn display_hit(hit: &Hit, highlight: bool) {
    let entry = hit.entry;
    let link_note = if entry.targets.len() > 1 {
        format!(" ({} links)", entry.targets.len())
    } else {
        String::new()
    };

    println!(
        "  {} {}{} {}",
        "▸".cyan(),
        entry.display.yellow().bold(),
        link_note.dimmed(),
        format!("[{}]", hit.section).blue()
    );

    let groups = group_targets(entry);
    for (idx, group) in groups.iter().enumerate() {
        let is_last = idx == groups.len() - 1;
        let branch = if is_last { "  └─" } else { "  ├─" };
        let cont = if is_last { "     " } else { "  │  " };

        // File pages carry no scope; show the link itself
        if group.scope.is_empty() {
            println!("{} {}", branch.cyan(), group.targets[0].url.dimmed());
            continue;
        }

        println!("{} {}", branch.cyan(), group.scope.green());
        for target in &group.targets {
            println!(
                "{}   {}",
                cont.cyan(),
                target_detail(group.scope, target, highlight)
            );
        }
    }
    println!();
}

struct ScopeGroup<'a> {
    scope: &'a str,
    targets: Vec<&'a Target>,
}

/// Group an entry's targets by containing scope, keeping first-seen order.
/// Scopeless targets each stand alone.
fn group_targets(entry: &Entry) -> Vec<ScopeGroup<'_>> {
    let mut groups: Vec<ScopeGroup> = Vec::new();
    for target in &entry.targets {
        let scope = containing_scope(&entry.display, &target.scope);
        let existing = groups
            .iter_mut()
            .find(|g| !scope.is_empty() && g.scope == scope);
        match existing {
            Some(group) => group.targets.push(target),
            None => groups.push(ScopeGroup {
                scope,
                targets: vec![target],
            }),
        }
    }
    groups
}

/// The per-target line under a scope header: the member signature when the
/// scope label carries one, else the link itself.
fn target_detail(group_scope: &str, target: &Target, highlight: bool) -> String {
    let member = target
        .scope
        .strip_prefix(group_scope)
        .and_then(|rest| rest.strip_prefix("::"))
        .unwrap_or("");

    if member.is_empty() {
        target.url.dimmed().to_string()
    } else if highlight {
        highlight_cpp_code(member)
    } else {
        member.to_string()
    }
}

/// Suggestions for a near-miss query, closest display names first.
fn suggest_displays(index: &SearchIndex, term: &str) -> Vec<String> {
    let needle = term.to_lowercase();
    let mut scored: Vec<(usize, &str)> = index
        .keys()
        .map(|key| (edit_distance(&needle, key), key))
        .filter(|(dist, _)| *dist <= 2)
        .collect();

    // Closest first; ties alphabetical so the order is stable
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    scored
        .into_iter()
        .take(5)
        .filter_map(|(_, key)| index.display_of(key))
        .map(|display| display.to_string())
        .collect()
}

/// Calculate simple edit distance between two strings (Levenshtein distance)
fn edit_distance(s1: &str, s2: &str) -> usize {
    let len1 = s1.chars().count();
    let len2 = s2.chars().count();
    let mut matrix = vec![vec![0; len2 + 1]; len1 + 1];

    for i in 0..=len1 {
        matrix[i][0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    let s1_chars: Vec<char> = s1.chars().collect();
    let s2_chars: Vec<char> = s2.chars().collect();

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if s1_chars[i - 1] == s2_chars[j - 1] {
                0
            } else {
                1
            };
            matrix[i][j] = std::cmp::min(
                std::cmp::min(matrix[i - 1][j] + 1, matrix[i][j - 1] + 1),
                matrix[i - 1][j - 1] + cost,
            );
        }
    }

    matrix[len1][len2]
}
