//! Purpose: Boundary between the harness and the parser being measured.
//! Exports: `SyntaxNode`, `SourceParser`, `PythonParser`.
//! Role: Turns source text into an owned, serializable syntax tree.
//! Invariants: The harness never inspects grammar details; it only calls `SourceParser::parse`.
//! Invariants: A tree containing error or missing nodes is a syntax error, never a partial result.
use std::path::Path;

use serde::{Deserialize, Serialize};
use tree_sitter::{Node, Parser, TreeCursor};

use crate::core::error::{Error, ErrorKind};

/// Owned syntax tree node, detached from the parser's buffers.
///
/// Positions are zero-based `[row, column]` pairs as reported by the parser.
/// Only named leaves carry `text`; anonymous tokens are identified by `kind`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxNode {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub field: Option<String>,
    pub named: bool,
    pub start: [usize; 2],
    pub end: [usize; 2],
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SyntaxNode::node_count).sum::<usize>()
    }
}

pub trait SourceParser {
    /// Parses `source`; `filename` is used for diagnostics only.
    fn parse(&mut self, source: &str, filename: &Path) -> Result<SyntaxNode, Error>;
}

pub struct PythonParser {
    parser: Parser,
}

impl PythonParser {
    pub fn new() -> Result<Self, Error> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to load python grammar")
                    .with_source(err)
            })?;
        Ok(Self { parser })
    }
}

impl SourceParser for PythonParser {
    fn parse(&mut self, source: &str, filename: &Path) -> Result<SyntaxNode, Error> {
        let tree = self.parser.parse(source, None).ok_or_else(|| {
            Error::new(ErrorKind::Internal)
                .with_message("parser returned no tree")
                .with_path(filename)
        })?;
        let root = tree.root_node();
        if root.has_error() {
            let mut err = Error::new(ErrorKind::Syntax)
                .with_message("invalid syntax")
                .with_path(filename);
            if let Some(bad) = first_error_node(root) {
                let point = bad.start_position();
                err = err.with_position(point.row + 1, point.column + 1);
                if bad.is_missing() {
                    err = err.with_message(format!("invalid syntax: missing `{}`", bad.kind()));
                }
            }
            return Err(err);
        }
        let mut cursor = root.walk();
        Ok(convert(&mut cursor, source.as_bytes()))
    }
}

fn convert(cursor: &mut TreeCursor<'_>, source: &[u8]) -> SyntaxNode {
    let node = cursor.node();
    let field = cursor.field_name().map(str::to_string);
    let mut children = Vec::new();
    if cursor.goto_first_child() {
        loop {
            children.push(convert(cursor, source));
            if !cursor.goto_next_sibling() {
                break;
            }
        }
        cursor.goto_parent();
    }
    let text = if node.is_named() && node.child_count() == 0 {
        node.utf8_text(source).ok().map(str::to_string)
    } else {
        None
    };
    let start = node.start_position();
    let end = node.end_position();
    SyntaxNode {
        kind: node.kind().to_string(),
        field,
        named: node.is_named(),
        start: [start.row, start.column],
        end: [end.row, end.column],
        text,
        children,
    }
}

fn first_error_node(root: Node<'_>) -> Option<Node<'_>> {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node.is_error() || node.is_missing() {
            return Some(node);
        }
        if !node.has_error() {
            continue;
        }
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        // Reverse so the leftmost child is visited first.
        stack.extend(children.into_iter().rev());
    }
    None
}
