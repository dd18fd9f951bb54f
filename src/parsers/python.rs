//! Python syntax trees via tree-sitter
//!
//! Thin helpers over `tree-sitter-python` shared by the manifest reader and
//! the model definition parser.

use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

/// Node kinds of the tree-sitter-python grammar used by the parsers
pub(crate) mod node_kinds {
    pub const MODULE: &str = "module";
    pub const COMMENT: &str = "comment";
    pub const EXPRESSION_STATEMENT: &str = "expression_statement";
    pub const EXPRESSION_LIST: &str = "expression_list";
    pub const ASSIGNMENT: &str = "assignment";

    pub const CLASS_DEFINITION: &str = "class_definition";
    pub const FUNCTION_DEFINITION: &str = "function_definition";
    pub const DECORATED_DEFINITION: &str = "decorated_definition";

    pub const CALL: &str = "call";
    pub const ATTRIBUTE: &str = "attribute";
    pub const ARGUMENT_LIST: &str = "argument_list";
    pub const KEYWORD_ARGUMENT: &str = "keyword_argument";
    pub const IDENTIFIER: &str = "identifier";

    pub const STRING: &str = "string";
    pub const CONCATENATED_STRING: &str = "concatenated_string";
    pub const INTEGER: &str = "integer";
    pub const FLOAT: &str = "float";
    pub const TRUE: &str = "true";
    pub const FALSE: &str = "false";
    pub const NONE: &str = "none";
    pub const LIST: &str = "list";
    pub const TUPLE: &str = "tuple";
    pub const SET: &str = "set";
    pub const DICTIONARY: &str = "dictionary";
    pub const PAIR: &str = "pair";
    pub const PARENTHESIZED_EXPRESSION: &str = "parenthesized_expression";
    pub const UNARY_OPERATOR: &str = "unary_operator";
}

/// Error raised when text cannot be parsed or is not of the expected shape
#[derive(Debug, Clone, PartialEq, Error)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    pub fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    /// Error located at the start of `node`
    pub fn at(node: &Node, message: impl Into<String>) -> Self {
        Self::new(node_line(node), message)
    }
}

/// Parse Python source into a syntax tree; any error or missing node fails the parse
pub fn parse_python(source: &str) -> Result<Tree, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|err| SyntaxError::new(0, err.to_string()))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| SyntaxError::new(0, "parser produced no tree"))?;

    let root = tree.root_node();
    if root.has_error() {
        let line = first_error(&root).map(|node| node_line(&node)).unwrap_or(1);
        return Err(SyntaxError::new(line, "invalid syntax"));
    }
    Ok(tree)
}

/// Drop a leading byte-order mark, which the grammar does not accept
pub fn strip_bom(source: &str) -> &str {
    source.strip_prefix('\u{feff}').unwrap_or(source)
}

fn first_error<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children
        .iter()
        .filter(|child| child.has_error())
        .find_map(|child| first_error(child))
}

/// Source text covered by `node`
pub fn node_text<'s>(node: &Node, source: &'s str) -> &'s str {
    source.get(node.byte_range()).unwrap_or_default()
}

/// 1-based line where `node` starts
pub fn node_line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// Named children of `node`, comments excluded
pub fn named_children<'t>(node: &Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    let children = node
        .named_children(&mut cursor)
        .filter(|child| child.kind() != node_kinds::COMMENT)
        .collect();
    children
}

/// Whether `node` has an anonymous child token `token`, such as a trailing comma
pub fn has_token(node: &Node, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|child| !child.is_named() && child.kind() == token);
    found
}
