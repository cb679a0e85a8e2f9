//! Newick phylogenetic trees
//!
//! Gene-family dumps carry one Newick tree per family, labelled by protein
//! ID. This module parses those trees into an arena-backed [`NewickTree`],
//! prunes them down to a leaf set while keeping branch lengths, writes them
//! back out, and annotates nodes with NHX features.
//!
//! # Grammar
//! ```text
//! tree    := subtree ';'
//! subtree := '(' subtree (',' subtree)* ')' label? (':' length)? comment*
//!          | label? (':' length)? comment*
//! label   := unquoted | "'" (any | "''")* "'"
//! comment := '[' ... ']'          ("[&&NHX:k=v:...]" becomes node features)
//! ```

mod parser;
mod tree;

pub use tree::{NewickTree, Node, NodeId};

/// Feature key written by [`NewickTree::annotate_leaf_counts`]
pub const LEAF_COUNT_FEATURE: &str = "numGenes";

/// Result type for tree operations
pub type Result<T> = std::result::Result<T, NewickError>;

/// Errors raised while reading or pruning a Newick tree
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NewickError {
    #[error("Tree string is empty")]
    Empty,

    #[error("Unexpected character '{ch}' at byte {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("Tree ended before the closing parenthesis")]
    UnexpectedEnd,

    #[error("Tree is missing the ';' terminator")]
    MissingTerminator,

    #[error("Unexpected input after ';' at byte {pos}")]
    TrailingInput { pos: usize },

    #[error("Invalid branch length '{text}' at byte {pos}")]
    InvalidBranchLength { text: String, pos: usize },

    #[error("Unterminated quoted label starting at byte {pos}")]
    UnterminatedQuote { pos: usize },

    #[error("Unterminated comment starting at byte {pos}")]
    UnterminatedComment { pos: usize },

    #[error("Tree nesting deeper than {max} levels")]
    TooDeep { max: usize },

    #[error("Leaves not found in tree: {}", .0.join(", "))]
    MissingLeaves(Vec<String>),

    #[error("Cannot prune a tree down to an empty leaf set")]
    EmptyLeafSet,
}
