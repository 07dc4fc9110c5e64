use colored::*;
use std::collections::BTreeMap;

use crate::load::{LoadContext, obtain_index};
use doxq::index::{SearchIndex, containing_scope};

/// One node of the scope tree. `entries` counts index entries whose
/// containing scope is exactly this node.
#[derive(Debug, Default)]
struct ScopeNode {
    entries: usize,
    children: BTreeMap<String, ScopeNode>,
}

fn insert_scope(root: &mut ScopeNode, path: &str) {
    let mut node = root;
    for part in path.split("::") {
        node = node.children.entry(part.to_string()).or_default();
    }
    node.entries += 1;
}

fn find_scope<'a>(root: &'a ScopeNode, path: &str) -> Option<&'a ScopeNode> {
    let mut node = root;
    for part in path.split("::") {
        node = node.children.get(part)?;
    }
    Some(node)
}

fn build_scope_tree(index: &SearchIndex) -> ScopeNode {
    // Walking `all` plus the per-kind sections would count entries twice
    let sections = index.default_sections();
    let mut root = ScopeNode::default();

    for fragment in &index.data.fragments {
        if !sections.contains(&fragment.section) {
            continue;
        }
        for entry in &fragment.entries {
            // Each entry counts once per distinct containing scope
            let mut seen: Vec<&str> = Vec::new();
            for target in &entry.targets {
                let scope = containing_scope(&entry.display, &target.scope);
                if scope.is_empty() || seen.contains(&scope) {
                    continue;
                }
                seen.push(scope);
                insert_scope(&mut root, scope);
            }
        }
    }

    root
}

fn print_scope(name: &str, node: &ScopeNode, indent: usize) {
    let count = if node.entries > 0 {
        format!(" ({} entries)", node.entries)
    } else {
        String::new()
    };

    if indent == 0 {
        println!("{} {}{}", "📦".cyan(), name.bold().green(), count.dimmed());
    } else {
        println!(
            "{}{} {}{}",
            "  ".repeat(indent),
            "└─".blue(),
            name.green(),
            count.dimmed()
        );
    }

    for (child, child_node) in &node.children {
        print_scope(child, child_node, indent + 1);
    }
}

/// Print the scopes the index refers to (namespaces, classes, file pages)
/// as a tree, optionally narrowed to one scope path.
pub fn run_tree(ctx: &LoadContext, prefix: Option<&str>) -> Result<(), String> {
    let index = obtain_index(ctx)?;
    let root = build_scope_tree(&index);

    println!("{} Scope tree:\n", "📊".cyan());

    match prefix {
        Some(prefix) => {
            let node =
                find_scope(&root, prefix).ok_or_else(|| format!("No scope matching '{}'", prefix))?;
            print_scope(prefix, node, 0);
        }
        None => {
            if root.children.is_empty() {
                println!("  (no scoped entries)");
            }
            for (name, node) in &root.children {
                print_scope(name, node, 0);
            }
        }
    }

    Ok(())
}
