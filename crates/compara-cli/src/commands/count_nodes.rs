//! `compara count-nodes` command implementation
//!
//! Writes the tree back as NHX with the number of descendant genes on
//! every node.

use crate::error::{CliError, Result};
use crate::OutputFormat;
use colored::Colorize;
use compara_ingest::newick::{NewickTree, LEAF_COUNT_FEATURE};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const DEFAULT_OUTPUT: &str = "nodeGeneCount_NHX.tree";

#[derive(Debug, Clone, Serialize)]
pub struct CountNodesSummary {
    pub nodes: usize,
    pub genes: usize,
    pub output: PathBuf,
}

/// Annotate the first tree of a Newick file
pub fn annotate(input: &Path) -> Result<NewickTree> {
    let content = super::read_input(input)?;
    let line = content
        .lines()
        .next()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or_else(|| CliError::config(format!("'{}' has no tree on its first line", input.display())))?;

    let mut tree = NewickTree::parse(line)?;
    tree.annotate_leaf_counts();
    Ok(tree)
}

/// Run the count-nodes command
pub fn run(input: PathBuf, output: PathBuf, format: OutputFormat) -> Result<()> {
    let tree = annotate(&input)?;
    debug!("Tree outline:\n{}", tree.outline());

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output, format!("{}\n", tree.to_newick()))?;

    let summary = CountNodesSummary {
        nodes: tree.len(),
        genes: tree.leaves().len(),
        output,
    };
    info!(
        nodes = summary.nodes,
        genes = summary.genes,
        feature = LEAF_COUNT_FEATURE,
        "Wrote annotated tree"
    );

    super::report(format, &summary, |s| {
        println!("{}", "Node gene counts written".green().bold());
        println!("  Nodes:  {}", s.nodes);
        println!("  Genes:  {}", s.genes);
        println!("  Output: {}", s.output.display());
    })
}
