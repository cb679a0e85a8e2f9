//! Arena-backed tree, pruning and writing

use std::collections::HashSet;
use std::fmt::Write as _;

use super::parser::NewickParser;
use super::{NewickError, Result, LEAF_COUNT_FEATURE};

/// Index of a node inside its [`NewickTree`]
pub type NodeId = usize;

/// A single tree vertex
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Leaf label, or internal label (usually a support value)
    pub name: Option<String>,
    /// Branch length to the parent
    pub length: Option<f64>,
    pub children: Vec<NodeId>,
    /// NHX key/value annotations, written back as `[&&NHX:k=v:...]`
    pub features: Vec<(String, String)>,
}

impl Node {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn set_feature(&mut self, key: &str, value: String) {
        match self.features.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.features.push((key.to_string(), value)),
        }
    }
}

/// A rooted Newick tree
///
/// Nodes live in one vector. Every child has a smaller index than its
/// parent, so ascending index order is a valid post-order traversal and the
/// root is always the last node.
#[derive(Debug, Clone, PartialEq)]
pub struct NewickTree {
    nodes: Vec<Node>,
    root: NodeId,
}

impl NewickTree {
    /// Parse a single `;`-terminated tree
    pub fn parse(input: &str) -> Result<Self> {
        NewickParser::new(input).parse()
    }

    pub(crate) fn from_parts(nodes: Vec<Node>, root: NodeId) -> Self {
        Self { nodes, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaf ids in left-to-right order
    pub fn leaves(&self) -> Vec<NodeId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.is_leaf() {
                leaves.push(id);
            } else {
                stack.extend(node.children.iter().rev());
            }
        }

        leaves
    }

    /// Leaf labels in left-to-right order; unnamed leaves are skipped
    pub fn leaf_names(&self) -> Vec<&str> {
        self.leaves()
            .into_iter()
            .filter_map(|id| self.nodes[id].name.as_deref())
            .collect()
    }

    /// Number of leaves under every node, indexed by node id
    pub fn leaf_counts(&self) -> Vec<usize> {
        let mut counts = vec![0usize; self.nodes.len()];
        for (id, node) in self.nodes.iter().enumerate() {
            counts[id] = if node.is_leaf() {
                1
            } else {
                node.children.iter().map(|&c| counts[c]).sum()
            };
        }
        counts
    }

    /// Keep only the named leaves and the ancestors joining them
    ///
    /// Internal nodes left with a single child are removed and their branch
    /// length is added to that child, so root-to-leaf distances are
    /// unchanged. The root keeps its own branch length. Every requested name
    /// must be a leaf label, otherwise the tree does not match the table it
    /// was exported with.
    pub fn prune<S: AsRef<str>>(&self, keep: &[S]) -> Result<NewickTree> {
        let wanted: HashSet<&str> = keep.iter().map(AsRef::as_ref).collect();
        if wanted.is_empty() {
            return Err(NewickError::EmptyLeafSet);
        }

        let present: HashSet<&str> = self.leaf_names().into_iter().collect();
        let mut missing: Vec<String> = wanted
            .iter()
            .filter(|name| !present.contains(*name))
            .map(|name| name.to_string())
            .collect();
        if !missing.is_empty() {
            missing.sort();
            return Err(NewickError::MissingLeaves(missing));
        }

        // Children sit below their parent in the arena, so one ascending
        // pass sees every child's replacement before the parent.
        let mut remap: Vec<Option<NodeId>> = vec![None; self.nodes.len()];
        let mut pruned: Vec<Node> = Vec::new();

        for (id, node) in self.nodes.iter().enumerate() {
            if node.is_leaf() {
                if node.name.as_deref().is_some_and(|n| wanted.contains(n)) {
                    pruned.push(node.clone());
                    remap[id] = Some(pruned.len() - 1);
                }
                continue;
            }

            let kept: Vec<NodeId> = node.children.iter().filter_map(|&c| remap[c]).collect();
            remap[id] = match kept.as_slice() {
                [] => None,
                [only] => {
                    let child = &mut pruned[*only];
                    child.length = add_lengths(child.length, node.length);
                    Some(*only)
                },
                _ => {
                    pruned.push(Node {
                        name: node.name.clone(),
                        length: node.length,
                        children: kept,
                        features: node.features.clone(),
                    });
                    Some(pruned.len() - 1)
                },
            };
        }

        let root = remap[self.root].ok_or(NewickError::EmptyLeafSet)?;
        pruned[root].length = self.nodes[self.root].length;

        Ok(NewickTree {
            nodes: pruned,
            root,
        })
    }

    /// Record the number of descendant leaves on every node
    pub fn annotate_leaf_counts(&mut self) {
        let counts = self.leaf_counts();
        for (node, count) in self.nodes.iter_mut().zip(counts) {
            node.set_feature(LEAF_COUNT_FEATURE, count.to_string());
        }
    }

    /// Serialize back to a `;`-terminated Newick string
    pub fn to_newick(&self) -> String {
        let mut out = String::new();
        self.write_node(self.root, &mut out);
        out.push(';');
        out
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let node = &self.nodes[id];

        if !node.is_leaf() {
            out.push('(');
            for (i, &child) in node.children.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                self.write_node(child, out);
            }
            out.push(')');
        }

        if let Some(name) = &node.name {
            write_label(name, out);
        }
        if let Some(length) = node.length {
            let _ = write!(out, ":{}", length);
        }
        if !node.features.is_empty() {
            out.push_str("[&&NHX");
            for (key, value) in &node.features {
                let _ = write!(out, ":{}={}", key, value);
            }
            out.push(']');
        }
    }

    /// Indented one-node-per-line rendering, for logs
    pub fn outline(&self) -> String {
        let mut out = String::new();
        let mut stack = vec![(self.root, 0usize)];

        while let Some((id, depth)) = stack.pop() {
            let node = &self.nodes[id];
            let label = match (&node.name, node.is_leaf()) {
                (Some(name), _) => name.as_str(),
                (None, true) => "?",
                (None, false) => "+",
            };
            let _ = writeln!(out, "{}{}", "  ".repeat(depth), label);
            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }

        out
    }
}

impl std::str::FromStr for NewickTree {
    type Err = NewickError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for NewickTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_newick())
    }
}

fn add_lengths(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x + y),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

fn write_label(name: &str, out: &mut String) {
    let needs_quotes = name
        .chars()
        .any(|c| c.is_whitespace() || "(),:;[]'".contains(c));

    if needs_quotes {
        out.push('\'');
        out.push_str(&name.replace('\'', "''"));
        out.push('\'');
    } else {
        out.push_str(name);
    }
}
