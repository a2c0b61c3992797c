//! HTML parser module for tree construction.

/// Tree builder implementation.
pub mod tree_builder;

pub use tree_builder::{HTMLParser, ParseIssue, print_tree};
