//! Doxygen search index module
//!
//! This module loads the client-side search index that Doxygen writes next
//! to its HTML output (the `search/` directory full of small `.js` files)
//! and turns it into something a terminal can query.
//!
//! # Usage
//!
//! ```no_run
//! use doxq::index::{loader, SearchIndex};
//!
//! // Find and load the search directory of a generated doc tree
//! let dir = loader::locate_search_dir("./docs/html".as_ref()).unwrap();
//! let data = loader::load_dir(&dir).unwrap();
//!
//! // Build the queryable index and look something up
//! let index = SearchIndex::build(data);
//! for hit in index.query("model", None) {
//!     println!("{} ({})", hit.entry.display, hit.section);
//! }
//! ```

pub mod loader;
pub mod parser;
mod types;

pub use loader::{FragmentSource, LoadError, load_dir, locate_search_dir};
pub use parser::{ParseError, parse_fragment, parse_section_table, unescape_html};
pub use types::{
    Entry, Fragment, Hit, SearchData, SearchIndex, Section, SectionRow, SectionTable, Target,
    containing_scope, normalize_key,
};
