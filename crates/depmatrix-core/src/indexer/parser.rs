//! Import declaration extraction from Python source files.
//!
//! Only top-level `from X import a, b` statements are reported. Bare
//! `import X` statements do not produce declarations.

use std::path::Path;

use crate::errors::{DepMatrixError, DepMatrixResult};

/// One `from X import ...` statement as written in the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawImport {
    /// Dotted module path after the leading dots, e.g. `util` in `from ..util import x`.
    pub module: String,
    /// Number of leading dots; 0 for an absolute import.
    pub level: usize,
    /// Imported names in source order; aliases record the original name.
    pub names: Vec<String>,
}

/// Produces the ordered import declarations of a file.
pub trait StatementExtractor: Send + Sync {
    fn extract_imports(&self, path: &Path) -> DepMatrixResult<Vec<RawImport>>;
}

impl<F> StatementExtractor for F
where
    F: Fn(&Path) -> DepMatrixResult<Vec<RawImport>> + Send + Sync,
{
    fn extract_imports(&self, path: &Path) -> DepMatrixResult<Vec<RawImport>> {
        self(path)
    }
}

/// Tree-sitter backed extractor for Python files.
#[derive(Clone, Copy, Debug, Default)]
pub struct PythonImportExtractor;

impl StatementExtractor for PythonImportExtractor {
    fn extract_imports(&self, path: &Path) -> DepMatrixResult<Vec<RawImport>> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            DepMatrixError::Parse(format!("Failed to read {}: {e}", path.display()))
        })?;
        parse_imports(&source)
            .map_err(|e| DepMatrixError::Parse(format!("{}: {e}", path.display())))
    }
}

fn node_text<'a>(node: tree_sitter::Node<'_>, source: &'a [u8]) -> DepMatrixResult<&'a str> {
    node.utf8_text(source)
        .map_err(|e| DepMatrixError::Parse(format!("Invalid UTF-8 in source: {e}")))
}

/// Split the `module_name` node of a statement into (level, dotted suffix).
fn module_reference(
    node: tree_sitter::Node<'_>,
    source: &[u8],
) -> DepMatrixResult<(usize, String)> {
    if node.kind() != "relative_import" {
        return Ok((0, node_text(node, source)?.to_string()));
    }
    let mut level = 0;
    let mut module = String::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "import_prefix" => level = node_text(child, source)?.matches('.').count(),
            "dotted_name" => module = node_text(child, source)?.to_string(),
            _ => {}
        }
    }
    Ok((level, module))
}

fn imported_names(node: tree_sitter::Node<'_>, source: &[u8]) -> DepMatrixResult<Vec<String>> {
    let mut names = Vec::new();
    let mut cursor = node.walk();
    for child in node.children_by_field_name("name", &mut cursor) {
        let name = match child.kind() {
            "aliased_import" => match child.child_by_field_name("name") {
                Some(original) => node_text(original, source)?,
                None => continue,
            },
            _ => node_text(child, source)?,
        };
        names.push(name.to_string());
    }
    let mut cursor = node.walk();
    if node
        .named_children(&mut cursor)
        .any(|c| c.kind() == "wildcard_import")
    {
        names.push("*".to_string());
    }
    Ok(names)
}

/// Parse Python source text and return its top-level `from ... import` statements.
///
/// Statements without a module (`from . import x`) are skipped.
pub fn parse_imports(source: &str) -> DepMatrixResult<Vec<RawImport>> {
    let mut parser = tree_sitter::Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| DepMatrixError::Parse(format!("Failed to set language: {e}")))?;

    let tree = parser
        .parse(source.as_bytes(), None)
        .ok_or_else(|| DepMatrixError::Parse("Failed to parse source".to_string()))?;

    let bytes = source.as_bytes();
    let root = tree.root_node();
    let mut imports = Vec::new();
    let mut cursor = root.walk();
    for statement in root.named_children(&mut cursor) {
        if statement.kind() != "import_from_statement" {
            continue;
        }
        let module_node = match statement.child_by_field_name("module_name") {
            Some(n) => n,
            None => continue,
        };
        let (level, module) = module_reference(module_node, bytes)?;
        if module.is_empty() {
            continue;
        }
        imports.push(RawImport {
            module,
            level,
            names: imported_names(statement, bytes)?,
        });
    }
    Ok(imports)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_from_import() {
        let imports = parse_imports("from app.util import helper, other\n").unwrap();
        assert_eq!(
            imports,
            vec![RawImport {
                module: "app.util".to_string(),
                level: 0,
                names: vec!["helper".to_string(), "other".to_string()],
            }]
        );
    }

    #[test]
    fn test_relative_levels() {
        let src = "\
from .sibling import a
from ..parent.mod import b
";
        let imports = parse_imports(src).unwrap();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].module, "sibling");
        assert_eq!(imports[0].level, 1);
        assert_eq!(imports[1].module, "parent.mod");
        assert_eq!(imports[1].level, 2);
    }

    #[test]
    fn test_alias_records_original_name() {
        let imports = parse_imports("from app.util import helper as h\n").unwrap();
        assert_eq!(imports[0].names, vec!["helper".to_string()]);
    }

    #[test]
    fn test_parenthesized_and_wildcard() {
        let src = "\
from app.util import (
    one,
    two,
)
from app.core import *
";
        let imports = parse_imports(src).unwrap();
        assert_eq!(imports[0].names, vec!["one".to_string(), "two".to_string()]);
        assert_eq!(imports[1].names, vec!["*".to_string()]);
    }

    #[test]
    fn test_skips_bare_and_moduleless_and_nested_imports() {
        let src = "\
import os
from . import sibling
def f():
    from app.inner import hidden
from app.kept import shown
";
        let imports = parse_imports(src).unwrap();
        assert_eq!(imports.len(), 1);
        assert_eq!(imports[0].module, "app.kept");
    }

    #[test]
    fn test_extractor_reports_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.py");
        let err = PythonImportExtractor.extract_imports(&missing).unwrap_err();
        assert!(matches!(err, DepMatrixError::Parse(_)));
    }
}
