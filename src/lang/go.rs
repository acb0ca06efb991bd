//! Go function extraction with tree-sitter.

use std::fs;
use std::path::Path;

use tracing::debug;
use tree_sitter::{Language, Node, Parser, Tree};

use crate::core::errors::{CoverError, Result};
use crate::detectors::coverage::types::{FunctionExtent, SourcePosition};

/// Declaration kinds that produce a function extent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Function,
    Method,
}

impl DeclarationKind {
    /// Map a tree-sitter node kind; everything else is not a declaration we track.
    pub fn from_node_kind(kind: &str) -> Option<Self> {
        match kind {
            "function_declaration" => Some(DeclarationKind::Function),
            "method_declaration" => Some(DeclarationKind::Method),
            _ => None,
        }
    }
}

/// Create a parser loaded with the Go grammar
pub fn create_go_parser() -> Result<Parser> {
    let language: Language = tree_sitter_go::LANGUAGE.into();
    let mut parser = Parser::new();
    parser
        .set_language(&language)
        .map_err(|e| {
            CoverError::source_parse(
                "<tree-sitter-go>",
                format!("Failed to set parser language: {e}"),
            )
        })?;
    Ok(parser)
}

/// Extracts the extents of top-level function and method declarations.
///
/// Positions are 1-based lines and 1-based byte columns, the units of the Go
/// coverage profile. A span starts at the `func` keyword (doc comments are
/// separate nodes) and ends one byte past the closing brace.
pub struct GoFunctionExtractor {
    parser: Parser,
}

impl GoFunctionExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            parser: create_go_parser()?,
        })
    }

    /// Read and parse `path`
    pub fn extract_file(&mut self, path: &Path) -> Result<Vec<FunctionExtent>> {
        let source = fs::read_to_string(path).map_err(|err| {
            CoverError::io(format!("Failed to read source file {}", path.display()), err)
        })?;
        self.extract_source(&source, path)
    }

    /// Parse in-memory source; `file_path` is used for error reporting only.
    pub fn extract_source(
        &mut self,
        source: &str,
        file_path: &Path,
    ) -> Result<Vec<FunctionExtent>> {
        let tree = self.parse_tree(source, file_path)?;
        let root = tree.root_node();

        if root.has_error() {
            return Err(syntax_error(root, file_path));
        }

        let mut extents = Vec::new();
        let mut methods = 0usize;
        let mut cursor = root.walk();
        for node in root.named_children(&mut cursor) {
            let Some(kind) = DeclarationKind::from_node_kind(node.kind()) else {
                continue;
            };
            if kind == DeclarationKind::Method {
                methods += 1;
            }
            extents.push(Self::node_to_extent(node, source, file_path)?);
        }

        debug!(
            "Found {} functions and {} methods in {}",
            extents.len() - methods,
            methods,
            file_path.display()
        );
        Ok(extents)
    }

    fn parse_tree(&mut self, source: &str, file_path: &Path) -> Result<Tree> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| CoverError::source_parse(file_path, "Failed to parse Go source"))
    }

    fn node_to_extent(node: Node, source: &str, file_path: &Path) -> Result<FunctionExtent> {
        let name_node = node.child_by_field_name("name").ok_or_else(|| {
            CoverError::source_parse_with_location(
                file_path,
                format!("{} without a name", node.kind()),
                Some(node.start_position().row + 1),
                Some(node.start_position().column + 1),
            )
        })?;
        let name = name_node
            .utf8_text(source.as_bytes())
            .map_err(|e| CoverError::source_parse(file_path, e.to_string()))?
            .to_string();

        Ok(FunctionExtent::new(
            name,
            to_position(node.start_position()),
            to_position(node.end_position()),
        ))
    }
}

fn to_position(point: tree_sitter::Point) -> SourcePosition {
    SourcePosition::new(point.row + 1, point.column + 1)
}

/// Build a parse error pointing at the first error or missing node.
fn syntax_error(root: Node, file_path: &Path) -> CoverError {
    match first_error_node(root) {
        Some(node) => {
            let position = to_position(node.start_position());
            let message = if node.is_missing() {
                format!("missing {}", node.kind())
            } else {
                "syntax error".to_string()
            };
            CoverError::source_parse_with_location(
                file_path,
                message,
                Some(position.line),
                Some(position.column),
            )
        }
        None => CoverError::source_parse(file_path, "syntax error"),
    }
}

fn first_error_node<'tree>(node: Node<'tree>) -> Option<Node<'tree>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error_node)
}

#[cfg(test)]
#[path = "go_tests.rs"]
mod tests;
