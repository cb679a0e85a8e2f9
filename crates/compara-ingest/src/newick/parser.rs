//! Recursive-descent Newick reader

use super::tree::{NewickTree, Node, NodeId};
use super::{NewickError, Result};

/// Maximum nesting accepted before giving up
pub(crate) const MAX_DEPTH: usize = 4096;

pub(crate) struct NewickParser<'a> {
    input: &'a str,
    pos: usize,
    nodes: Vec<Node>,
}

impl<'a> NewickParser<'a> {
    pub(crate) fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            nodes: Vec::new(),
        }
    }

    pub(crate) fn parse(mut self) -> Result<NewickTree> {
        self.skip_whitespace();
        if self.peek().is_none() {
            return Err(NewickError::Empty);
        }

        let root = self.subtree(0)?;
        self.skip_whitespace();

        match self.bump() {
            Some(';') => {},
            Some(ch) => {
                return Err(NewickError::UnexpectedChar {
                    ch,
                    pos: self.pos - ch.len_utf8(),
                })
            },
            None => return Err(NewickError::MissingTerminator),
        }

        self.skip_whitespace();
        if self.peek().is_some() {
            return Err(NewickError::TrailingInput { pos: self.pos });
        }

        Ok(NewickTree::from_parts(self.nodes, root))
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    fn subtree(&mut self, depth: usize) -> Result<NodeId> {
        if depth > MAX_DEPTH {
            return Err(NewickError::TooDeep { max: MAX_DEPTH });
        }

        self.skip_whitespace();
        let mut children = Vec::new();

        if self.peek() == Some('(') {
            self.bump();
            loop {
                children.push(self.subtree(depth + 1)?);
                self.skip_whitespace();
                match self.bump() {
                    Some(',') => continue,
                    Some(')') => break,
                    Some(ch) => {
                        return Err(NewickError::UnexpectedChar {
                            ch,
                            pos: self.pos - ch.len_utf8(),
                        })
                    },
                    None => return Err(NewickError::UnexpectedEnd),
                }
            }
        }

        self.skip_whitespace();
        let name = self.label()?;
        let mut features = Vec::new();
        self.comments(&mut features)?;

        let length = if self.peek() == Some(':') {
            self.bump();
            self.skip_whitespace();
            Some(self.branch_length()?)
        } else {
            None
        };
        self.comments(&mut features)?;

        // Children are always pushed before their parent.
        self.nodes.push(Node {
            name,
            length,
            children,
            features,
        });
        Ok(self.nodes.len() - 1)
    }

    fn label(&mut self) -> Result<Option<String>> {
        if self.peek() == Some('\'') {
            return self.quoted_label().map(Some);
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || "(),:;[]".contains(c) {
                break;
            }
            self.bump();
        }

        let text = &self.input[start..self.pos];
        Ok((!text.is_empty()).then(|| text.to_string()))
    }

    fn quoted_label(&mut self) -> Result<String> {
        let start = self.pos;
        self.bump();
        let mut label = String::new();

        loop {
            match self.bump() {
                Some('\'') if self.peek() == Some('\'') => {
                    self.bump();
                    label.push('\'');
                },
                Some('\'') => return Ok(label),
                Some(c) => label.push(c),
                None => return Err(NewickError::UnterminatedQuote { pos: start }),
            }
        }
    }

    fn branch_length(&mut self) -> Result<f64> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || "(),:;[]".contains(c) {
                break;
            }
            self.bump();
        }

        let text = &self.input[start..self.pos];
        text.parse::<f64>()
            .map_err(|_| NewickError::InvalidBranchLength {
                text: text.to_string(),
                pos: start,
            })
    }

    /// Skip bracketed comments, collecting NHX key/value pairs
    fn comments(&mut self, features: &mut Vec<(String, String)>) -> Result<()> {
        loop {
            self.skip_whitespace();
            if self.peek() != Some('[') {
                return Ok(());
            }

            let start = self.pos;
            self.bump();
            let body_start = self.pos;
            let end = self.input[body_start..]
                .find(']')
                .map(|offset| body_start + offset)
                .ok_or(NewickError::UnterminatedComment { pos: start })?;
            let body = &self.input[body_start..end];
            self.pos = end + 1;

            if let Some(nhx) = body.strip_prefix("&&NHX") {
                features.extend(
                    nhx.split(':')
                        .filter_map(|pair| pair.split_once('='))
                        .map(|(k, v)| (k.to_string(), v.to_string())),
                );
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<NewickTree> {
        NewickParser::new(input).parse()
    }

    #[test]
    fn test_parse_lengths_and_internal_labels() {
        let tree = parse("((A:0.1,B:0.2)90:0.05,C:0.3);").unwrap();
        assert_eq!(tree.leaf_names(), vec!["A", "B", "C"]);

        let root = tree.node(tree.root());
        assert_eq!(root.children.len(), 2);
        let inner = tree.node(root.children[0]);
        assert_eq!(inner.name.as_deref(), Some("90"));
        assert_eq!(inner.length, Some(0.05));
    }

    #[test]
    fn test_children_precede_parents() {
        let tree = parse("((A,B),(C,(D,E)));").unwrap();
        for id in 0..tree.len() {
            for &child in &tree.node(id).children {
                assert!(child < id);
            }
        }
        assert_eq!(tree.root(), tree.len() - 1);
    }

    #[test]
    fn test_quoted_labels_and_comments() {
        let tree = parse("('Homo sapiens':1,'it''s'[a comment]:2)[&&NHX:S=x:D=N];").unwrap();
        assert_eq!(tree.leaf_names(), vec!["Homo sapiens", "it's"]);
        let root = tree.node(tree.root());
        assert_eq!(
            root.features,
            vec![
                ("S".to_string(), "x".to_string()),
                ("D".to_string(), "N".to_string())
            ]
        );
    }

    #[test]
    fn test_whitespace_and_trailing_newline_are_accepted() {
        let tree = parse(" ( A : 1 , B : 2 ) ;\n").unwrap();
        assert_eq!(tree.leaf_names(), vec!["A", "B"]);
    }

    #[test]
    fn test_malformed_inputs() {
        assert_eq!(parse("").unwrap_err(), NewickError::Empty);
        assert_eq!(parse("(A,B)").unwrap_err(), NewickError::MissingTerminator);
        assert_eq!(parse("(A,B;").unwrap_err(), NewickError::UnexpectedChar { ch: ';', pos: 4 });
        assert_eq!(parse("(A,B").unwrap_err(), NewickError::UnexpectedEnd);
        assert_eq!(parse("(A,B);C").unwrap_err(), NewickError::TrailingInput { pos: 6 });
        assert!(matches!(
            parse("(A:x1,B);").unwrap_err(),
            NewickError::InvalidBranchLength { .. }
        ));
        assert!(matches!(parse("('A,B);").unwrap_err(), NewickError::UnterminatedQuote { .. }));
        assert!(matches!(parse("(A[x,B);").unwrap_err(), NewickError::UnterminatedComment { .. }));
    }

    #[test]
    fn test_nesting_limit() {
        // Debug builds need a larger stack than the default test thread.
        let handle = std::thread::Builder::new()
            .stack_size(256 * 1024 * 1024)
            .spawn(|| {
                let deep = format!("{}A{};", "(".repeat(MAX_DEPTH + 2), ")".repeat(MAX_DEPTH + 2));
                parse(&deep).unwrap_err()
            })
            .unwrap();
        assert_eq!(handle.join().unwrap(), NewickError::TooDeep { max: MAX_DEPTH });
    }
}
