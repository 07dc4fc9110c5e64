use colored::*;

use crate::load::{LoadContext, obtain_index};
use doxq::index::{SearchData, Section};

/// Print index totals, a per-section breakdown, and the most overloaded
/// display names.
pub fn run_stats(ctx: &LoadContext) -> Result<(), String> {
    let index = obtain_index(ctx)?;
    let data = &index.data;

    println!("\n{} Index overview\n", "📊".cyan());
    println!(
        "  {} fragment file(s), {} entries, {} links, {} distinct keys",
        data.fragments.len(),
        data.entry_count(),
        data.target_count(),
        index.key_count()
    );
    match &data.section_table {
        Some(table) => println!("  searchdata.js: {} section row(s)", table.rows.len()),
        None => println!("  {} searchdata.js missing", "⚠️".yellow()),
    }
    println!();

    println!("  {}", "Per section:".bold());
    for (section, entries, targets) in section_breakdown(data) {
        println!(
            "    {} {} {} entries, {} links",
            "•".cyan(),
            format!("{:<12}", section.to_string()).green(),
            entries,
            targets
        );
    }

    let sections = index.default_sections();
    let mut overloaded: Vec<(&str, usize)> = Vec::new();
    for fragment in &data.fragments {
        if !sections.contains(&fragment.section) {
            continue;
        }
        for entry in &fragment.entries {
            if entry.targets.len() > 1 {
                overloaded.push((entry.display.as_str(), entry.targets.len()));
            }
        }
    }
    overloaded.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    if !overloaded.is_empty() {
        println!();
        println!("  {}", "Most overloaded names:".bold());
        for (display, links) in overloaded.iter().take(5) {
            println!("    {} {} ({} links)", "•".cyan(), display.yellow(), links);
        }
    }

    Ok(())
}

fn section_breakdown(data: &SearchData) -> Vec<(Section, usize, usize)> {
    let mut rows: Vec<(Section, usize, usize)> = Vec::new();
    for fragment in &data.fragments {
        let pos = match rows.iter().position(|(s, _, _)| *s == fragment.section) {
            Some(pos) => pos,
            None => {
                rows.push((fragment.section, 0, 0));
                rows.len() - 1
            }
        };
        rows[pos].1 += fragment.entries.len();
        rows[pos].2 += fragment
            .entries
            .iter()
            .map(|e| e.targets.len())
            .sum::<usize>();
    }
    rows
}
