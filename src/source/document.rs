/*!
 * Parsed source document.
 *
 * A `SourceDocument` pairs the immutable input text with its tree-sitter
 * syntax tree. Stages never mutate it; they produce new text values instead.
 *
 * The Python grammar accepts some layouts the interpreter refuses: an
 * unexpected indent parses as a plain statement and a missing indent leaves an
 * empty block. Those are checked separately after parsing and reported as
 * syntax errors too.
 */

use tree_sitter::{Node, Parser, Tree};

use crate::errors::ParseError;

/// Immutable script text plus its syntax tree
pub struct SourceDocument {
    text: String,
    tree: Tree,
}

impl std::fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceDocument")
            .field("bytes", &self.text.len())
            .field("root", &self.tree.root_node().kind())
            .finish()
    }
}

impl SourceDocument {
    /// Parse a Python script, rejecting anything with syntax or indentation errors
    pub fn parse(text: impl Into<String>) -> Result<Self, ParseError> {
        let text = text.into();

        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| ParseError::ParserInit(e.to_string()))?;

        let tree = parser
            .parse(&text, None)
            .ok_or_else(|| ParseError::ParserInit("parser returned no tree".to_string()))?;

        let root = tree.root_node();
        if root.has_error() {
            let (line, column) = first_error_position(root).unwrap_or((1, 1));
            return Err(ParseError::Syntax { line, column });
        }

        if let Some((line, column)) = first_indentation_error(root) {
            return Err(ParseError::Syntax { line, column });
        }

        Ok(Self { text, tree })
    }

    /// The original text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Root of the syntax tree
    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Source text covered by a node
    pub fn node_text(&self, node: Node<'_>) -> &str {
        node.utf8_text(self.text.as_bytes()).unwrap_or("")
    }
}

/// 1-based position of the first ERROR or MISSING node, depth first
fn first_error_position(node: Node<'_>) -> Option<(usize, usize)> {
    if node.is_error() || node.is_missing() {
        let point = node.start_position();
        return Some((point.row + 1, point.column + 1));
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.has_error() || child.is_missing() {
            if let Some(position) = first_error_position(child) {
                return Some(position);
            }
        }
    }

    None
}

/// Statements of `node` that begin a line; `a = 1; b = 2` counts once
fn leading_statements<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut leading = Vec::new();
    let mut previous_end = None;

    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor).filter(|c| c.kind() != "comment") {
        if previous_end != Some(child.start_position().row) {
            leading.push(child);
        }
        previous_end = Some(child.end_position().row);
    }

    leading
}

fn one_based(node: Node<'_>) -> (usize, usize) {
    let point = node.start_position();
    (point.row + 1, point.column + 1)
}

/// 1-based position of the first statement whose indentation Python rejects.
///
/// Top-level statements start at column 0. A block opened on its own line is
/// indented deeper than its header and all of its statements share one
/// column. A block with no statement at all means the body was not indented.
fn first_indentation_error(root: Node<'_>) -> Option<(usize, usize)> {
    if let Some(stray) = leading_statements(root).into_iter().find(|s| s.start_position().column != 0) {
        return Some(one_based(stray));
    }

    let mut pending = vec![root];
    while let Some(node) = pending.pop() {
        if node.kind() == "block" {
            let body = leading_statements(node);
            let Some(first) = body.first() else {
                let end = node.end_position();
                return Some((end.row + 1, 1));
            };

            let header_row = node
                .prev_sibling()
                .map(|colon| colon.end_position().row)
                .unwrap_or_else(|| node.start_position().row);

            // `if x: a = 1` keeps its body on the header line
            if first.start_position().row > header_row {
                let header_column = node.parent().map(|p| p.start_position().column).unwrap_or(0);
                let column = first.start_position().column;
                if column <= header_column {
                    return Some(one_based(*first));
                }
                if let Some(stray) = body.iter().find(|s| s.start_position().column != column) {
                    return Some(one_based(*stray));
                }
            }
        }

        let mut cursor = node.walk();
        pending.extend(node.named_children(&mut cursor));
    }

    None
}
