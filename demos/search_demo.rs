//! Example demonstrating the search index API
//!
//! This example loads the bundled test index and walks through the lookup
//! operations the library offers.
//!
//! Run with: cargo run --example search_demo

use doxq::index::{SearchIndex, Section, containing_scope, loader, normalize_key};
use std::path::Path;

fn main() {
    println!("=== Doxygen Search Index Demo ===\n");

    // Load the small AIToolbox index shipped with the repository
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata/aitoolbox");
    let dir = loader::locate_search_dir(&root).expect("test index present");
    let data = loader::load_dir(&dir).expect("test index parses");
    let index = SearchIndex::build(data);

    // Example 1: Substring query, the way the browser widget matches
    println!("1️⃣  Searching for 'model':");
    let hits = index.query("model", None);
    println!("   ✓ Found {} matches", hits.len());
    for hit in &hits {
        println!(
            "      • {} ({} links)",
            hit.entry.display,
            hit.entry.targets.len()
        );
    }
    println!();

    // Example 2: Restrict the query to one section
    println!("2️⃣  Searching for 'model' among classes only:");
    let hits = index.query("model", Some(Section::Classes));
    for hit in &hits {
        println!("      • {} [{}]", hit.entry.display, hit.section);
    }
    println!();

    // Example 3: Exact lookup by display name
    println!("3️⃣  Exact lookup of 'CliffProblem.hpp':");
    println!(
        "   ✓ Key form: {}",
        normalize_key("CliffProblem.hpp")
    );
    for hit in index.get_exact("CliffProblem.hpp", None) {
        println!("      • {} -> {}", hit.entry.display, hit.entry.targets[0].url);
    }
    println!();

    // Example 4: Overloads grouped by the scope that declares them
    println!("4️⃣  Where do the 'Model' constructors live?");
    if let Some(hit) = index.query("model", None).first() {
        for target in &hit.entry.targets {
            println!(
                "      • {}  ({})",
                containing_scope(&hit.entry.display, &target.scope),
                target.url
            );
        }
    }
    println!();

    // Example 5: Statistics
    println!("5️⃣  Index statistics:");
    println!("   ✓ Fragment files: {}", index.data.fragments.len());
    println!("   ✓ Entries: {}", index.data.entry_count());
    println!("   ✓ Links: {}", index.data.target_count());
    println!("   ✓ Distinct keys: {}", index.key_count());
    for (section, count) in index.sections() {
        println!("      • {}: {} entries", section, count);
    }

    println!("\n=== Demo Complete ===");
}
