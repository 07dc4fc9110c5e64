//! doxq - Doxygen search index, queried from the terminal
//!
//! Parses the `search/` fragment files of a Doxygen HTML tree into a
//! queryable in-memory index.

pub mod index;

// Re-export commonly used types
pub use index::{Entry, SearchData, SearchIndex, Section, Target};
