use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// The per-kind indexes Doxygen splits its search data into.
///
/// Variant order matches the declaration order Doxygen uses in
/// `searchdata.js`, which is also the order fragment files are merged in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Section {
    All,
    Classes,
    Namespaces,
    Files,
    Functions,
    Variables,
    Typedefs,
    Enums,
    EnumValues,
    Related,
    Defines,
    Groups,
    Pages,
}

impl Section {
    pub const ALL: [Section; 13] = [
        Section::All,
        Section::Classes,
        Section::Namespaces,
        Section::Files,
        Section::Functions,
        Section::Variables,
        Section::Typedefs,
        Section::Enums,
        Section::EnumValues,
        Section::Related,
        Section::Defines,
        Section::Groups,
        Section::Pages,
    ];

    /// The file-name prefix used for this section's fragment files
    /// (`functions` in `functions_b.js`).
    pub fn prefix(&self) -> &'static str {
        match self {
            Section::All => "all",
            Section::Classes => "classes",
            Section::Namespaces => "namespaces",
            Section::Files => "files",
            Section::Functions => "functions",
            Section::Variables => "variables",
            Section::Typedefs => "typedefs",
            Section::Enums => "enums",
            Section::EnumValues => "enumvalues",
            Section::Related => "related",
            Section::Defines => "defines",
            Section::Groups => "groups",
            Section::Pages => "pages",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Section> {
        Section::ALL.iter().copied().find(|s| s.prefix() == prefix)
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One hyperlink target of an index entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    /// Relative URL into the generated HTML, including the anchor.
    pub url: String,
    /// The numeric flag each target carries: `1` when the link opens inside
    /// the documentation frame, `0` when it points at an external tag file.
    pub local: bool,
    /// Containing-scope description shown next to the link. Empty for
    /// file and page entries, as Doxygen emits them.
    pub scope: String,
}

/// One search index record: a normalized key, the label shown to the user,
/// and one target per overload or declaration site sharing that label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub key: String,
    pub display: String,
    pub targets: Vec<Target>,
}

/// One parsed `<section>_<hex>.js` file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fragment {
    pub section: Section,
    /// Bucket index from the file-name suffix (one first-character bucket
    /// per file).
    pub bucket: u32,
    pub file_name: String,
    pub entries: Vec<Entry>,
}

/// One row of the `searchdata.js` section table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionRow {
    /// Section name as declared (`all`, `classes`, ...).
    pub name: String,
    /// The first characters that have a fragment file, in bucket order.
    pub buckets: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectionTable {
    pub rows: Vec<SectionRow>,
}

/// Raw parse result for a whole `search/` directory. Static once produced:
/// a documentation rebuild replaces it, nothing mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchData {
    pub fragments: Vec<Fragment>,
    pub section_table: Option<SectionTable>,
}

impl SearchData {
    /// All entries across all fragments, in table order.
    pub fn entries(&self) -> impl Iterator<Item = (&Fragment, &Entry)> {
        self.fragments
            .iter()
            .flat_map(|f| f.entries.iter().map(move |e| (f, e)))
    }

    pub fn entry_count(&self) -> usize {
        self.fragments.iter().map(|f| f.entries.len()).sum()
    }

    pub fn target_count(&self) -> usize {
        self.fragments
            .iter()
            .flat_map(|f| &f.entries)
            .map(|e| e.targets.len())
            .sum()
    }
}

/// A single query match, borrowing the entry it refers to.
#[derive(Debug, Clone, Copy)]
pub struct Hit<'a> {
    pub section: Section,
    pub entry: &'a Entry,
}

/// Lookup structure built over [`SearchData`].
///
/// Entry positions are kept per section in original table order, plus an
/// exact-key map for direct lookups. Never persisted; always rebuilt.
#[derive(Debug)]
pub struct SearchIndex {
    /// Sections in load order, each with its entry locations
    /// (fragment index, entry index) in table order.
    sections: Vec<(Section, Vec<(usize, usize)>)>,
    /// Key -> locations, across all sections.
    exact: HashMap<String, Vec<(usize, usize)>>,
    /// The raw data this index was built from.
    pub data: SearchData,
}

impl SearchIndex {
    /// Build the lookup maps from parsed data.
    pub fn build(data: SearchData) -> Self {
        let mut sections: Vec<(Section, Vec<(usize, usize)>)> = Vec::new();
        let mut exact: HashMap<String, Vec<(usize, usize)>> = HashMap::new();

        for (frag_idx, fragment) in data.fragments.iter().enumerate() {
            let pos = match sections.iter().position(|(s, _)| *s == fragment.section) {
                Some(pos) => pos,
                None => {
                    sections.push((fragment.section, Vec::new()));
                    sections.len() - 1
                }
            };

            for (entry_idx, entry) in fragment.entries.iter().enumerate() {
                sections[pos].1.push((frag_idx, entry_idx));
                exact
                    .entry(entry.key.clone())
                    .or_insert_with(Vec::new)
                    .push((frag_idx, entry_idx));
            }
        }

        SearchIndex {
            sections,
            exact,
            data,
        }
    }

    fn entry_at(&self, loc: (usize, usize)) -> &Entry {
        &self.data.fragments[loc.0].entries[loc.1]
    }

    /// The sections to scan for a query: the requested one, else `all` when
    /// present (what the browser widget searches by default), else every
    /// section in load order.
    fn selected(&self, section: Option<Section>) -> Vec<&(Section, Vec<(usize, usize)>)> {
        match section {
            Some(wanted) => self.sections.iter().filter(|(s, _)| *s == wanted).collect(),
            None => {
                if let Some(all) = self.sections.iter().find(|(s, _)| *s == Section::All) {
                    vec![all]
                } else {
                    self.sections.iter().collect()
                }
            }
        }
    }

    /// All entries whose key contains `term` (lowercased) as a substring,
    /// preserving the table's original relative order. An empty term
    /// matches nothing.
    pub fn query(&self, term: &str, section: Option<Section>) -> Vec<Hit<'_>> {
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits = Vec::new();
        for (sec, locs) in self.selected(section) {
            for &loc in locs {
                let entry = self.entry_at(loc);
                if entry.key.contains(&needle) {
                    hits.push(Hit {
                        section: *sec,
                        entry,
                    });
                }
            }
        }
        hits
    }

    /// Exact lookup by normalized key. `term` may be the display form
    /// (`CliffProblem.hpp`); it is normalized before the lookup.
    pub fn get_exact(&self, term: &str, section: Option<Section>) -> Vec<Hit<'_>> {
        let key = normalize_key(term);
        let Some(locs) = self.exact.get(&key) else {
            return Vec::new();
        };

        locs.iter()
            .map(|&loc| Hit {
                section: self.data.fragments[loc.0].section,
                entry: self.entry_at(loc),
            })
            .filter(|hit| section.is_none() || section == Some(hit.section))
            .collect()
    }

    /// The sections a sectionless operation works over: `all` alone when
    /// present, else every section in load order. Mirrors what a query
    /// without a section filter searches.
    pub fn default_sections(&self) -> Vec<Section> {
        self.selected(None).iter().map(|(s, _)| *s).collect()
    }

    /// Sections present in the index, in load order, with entry counts.
    pub fn sections(&self) -> Vec<(Section, usize)> {
        self.sections
            .iter()
            .map(|(s, locs)| (*s, locs.len()))
            .collect()
    }

    /// Distinct keys across all sections, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.exact.keys().map(|k| k.as_str())
    }

    /// Display form recorded for a key, if present.
    pub fn display_of(&self, key: &str) -> Option<&str> {
        self.exact
            .get(key)
            .and_then(|locs| locs.first())
            .map(|&loc| self.entry_at(loc).display.as_str())
    }

    /// Distinct keys across all sections.
    pub fn key_count(&self) -> usize {
        self.exact.len()
    }
}

/// Normalize a display name into its lookup key, the way the index
/// generator does: ASCII alphanumerics are lowercased, every other
/// character becomes `_` plus the two-digit hex of each of its UTF-8
/// bytes (`.` -> `_2e`, `~` -> `_7e`).
pub fn normalize_key(display: &str) -> String {
    let mut key = String::with_capacity(display.len());
    for c in display.chars() {
        if c.is_ascii_alphanumeric() {
            key.push(c.to_ascii_lowercase());
        } else {
            let mut buf = [0u8; 4];
            for byte in c.encode_utf8(&mut buf).bytes() {
                key.push_str(&format!("_{:02x}", byte));
            }
        }
    }
    key
}

/// The scope an entry's target lives in. Scope labels carry the full
/// qualified target (`AIToolbox::MDP::Model::makeFromTrustedData()`); the
/// member tail is stripped when it restates the display name, leaving the
/// container. Labels without `::` (file scopes) are returned whole.
pub fn containing_scope<'a>(display: &str, scope: &'a str) -> &'a str {
    let Some(pos) = scope.rfind("::") else {
        return scope;
    };
    let tail = &scope[pos + 2..];
    let is_member = tail
        .strip_prefix(display)
        .map(|rest| rest.is_empty() || rest.starts_with('(') || rest.starts_with('<'))
        .unwrap_or(false);
    if is_member { &scope[..pos] } else { scope }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(url: &str, scope: &str) -> Target {
        Target {
            url: url.to_string(),
            local: true,
            scope: scope.to_string(),
        }
    }

    fn entry(display: &str, scopes: &[&str]) -> Entry {
        Entry {
            key: normalize_key(display),
            display: display.to_string(),
            targets: scopes
                .iter()
                .map(|s| target("../page.html#abc123", s))
                .collect(),
        }
    }

    fn sample_index() -> SearchIndex {
        let fragments = vec![
            Fragment {
                section: Section::All,
                bucket: 0,
                file_name: "all_0.js".to_string(),
                entries: vec![
                    entry("MCTS", &["AIToolbox::MDP::MCTS"]),
                    entry("merge", &["AIToolbox::FactoredMDP"]),
                    entry("Model", &["AIToolbox::MDP::Model", "AIToolbox::POMDP::Model"]),
                ],
            },
            Fragment {
                section: Section::All,
                bucket: 1,
                file_name: "all_1.js".to_string(),
                entries: vec![entry("SparseModel", &["AIToolbox::MDP::SparseModel"])],
            },
            Fragment {
                section: Section::Classes,
                bucket: 0,
                file_name: "classes_0.js".to_string(),
                entries: vec![entry("Model", &["AIToolbox::MDP::Model"])],
            },
        ];
        SearchIndex::build(SearchData {
            fragments,
            section_table: None,
        })
    }

    #[test]
    fn test_normalize_plain_identifiers() {
        assert_eq!(normalize_key("MCTS"), "mcts");
        assert_eq!(normalize_key("makeCliffProblem"), "makecliffproblem");
        assert_eq!(normalize_key("model"), "model");
    }

    #[test]
    fn test_normalize_escapes_non_alphanumerics() {
        assert_eq!(normalize_key("CliffProblem.hpp"), "cliffproblem_2ehpp");
        assert_eq!(normalize_key("operator*="), "operator_2a_3d");
        assert_eq!(normalize_key("~Model"), "_7emodel");
    }

    #[test]
    fn test_query_matches_substring_in_order() {
        let index = sample_index();

        let hits = index.query("model", None);
        let keys: Vec<&str> = hits.iter().map(|h| h.entry.key.as_str()).collect();
        // Table order: the 'm' bucket before the 's' bucket.
        assert_eq!(keys, vec!["model", "sparsemodel"]);
    }

    #[test]
    fn test_query_defaults_to_all_section() {
        let index = sample_index();

        // 'model' exists in both all and classes; the default scan only
        // covers all, so the classes duplicate must not appear.
        let hits = index.query("model", None);
        assert!(hits.iter().all(|h| h.section == Section::All));
    }

    #[test]
    fn test_query_section_filter() {
        let index = sample_index();

        let hits = index.query("model", Some(Section::Classes));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].entry.targets.len(), 1);
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let index = sample_index();
        assert_eq!(index.query("Model", None).len(), 2);
        assert_eq!(index.query("MCTS", None).len(), 1);
    }

    #[test]
    fn test_query_no_match_is_empty() {
        let index = sample_index();
        assert!(index.query("zzzznotfound", None).is_empty());
        assert!(index.query("", None).is_empty());
    }

    #[test]
    fn test_exact_lookup_normalizes_its_argument() {
        let index = sample_index();

        // Without a section filter, every occurrence of the key is returned.
        let hits = index.get_exact("Model", None);
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.entry.display == "Model"));

        let classes = index.get_exact("model", Some(Section::Classes));
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].section, Section::Classes);

        // Substring keys must not satisfy an exact lookup.
        assert!(index.get_exact("odel", None).is_empty());
    }

    #[test]
    fn test_sections_report_counts_in_load_order() {
        let index = sample_index();
        let sections = index.sections();
        assert_eq!(sections, vec![(Section::All, 4), (Section::Classes, 1)]);
    }

    #[test]
    fn test_section_prefix_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_prefix(section.prefix()), Some(section));
        }
        assert_eq!(Section::from_prefix("properties"), None);
    }

    #[test]
    fn test_containing_scope_strips_member_tail() {
        assert_eq!(
            containing_scope(
                "makeFromTrustedData",
                "AIToolbox::MDP::Model::makeFromTrustedData()"
            ),
            "AIToolbox::MDP::Model"
        );
        assert_eq!(
            containing_scope(
                "Model",
                "AIToolbox::MDP::Model::Model(size_t s, size_t a, double discount=1.0)"
            ),
            "AIToolbox::MDP::Model"
        );
        assert_eq!(
            containing_scope("MCTS", "AIToolbox::MDP::MCTS"),
            "AIToolbox::MDP"
        );
    }

    #[test]
    fn test_containing_scope_keeps_enclosing_namespace() {
        // Free function: the scope label is the namespace, not the member.
        assert_eq!(
            containing_scope("makeQFunction", "AIToolbox::MDP"),
            "AIToolbox::MDP"
        );
        // A member whose name merely starts with the display name stays whole.
        assert_eq!(
            containing_scope("Model", "AIToolbox::MDP::Model2"),
            "AIToolbox::MDP::Model2"
        );
    }

    #[test]
    fn test_containing_scope_file_labels() {
        assert_eq!(
            containing_scope("makeCliffProblem", "CliffProblem.hpp"),
            "CliffProblem.hpp"
        );
        assert_eq!(containing_scope("MainPage", ""), "");
    }
}
