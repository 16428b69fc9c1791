//! Import resolution from raw `from ... import` declarations to inventory modules.

use indexmap::IndexMap;

use crate::errors::{DepMatrixError, DepMatrixResult};
use crate::indexer::parser::RawImport;
use crate::models::{ImportEdge, ImportRecord, Module, PackageGroups};

/// Memoized test of whether a dotted name lies inside the scanned packages.
///
/// Owned by one session and never shared.
#[derive(Clone, Debug, Default)]
pub struct Containment {
    packages: Vec<String>,
    cache: IndexMap<String, bool>,
}

impl Containment {
    pub fn new(groups: &PackageGroups) -> Self {
        Self::from_packages(groups.packages())
    }

    /// Containment over an explicit package list, e.g. only the resolved ones.
    pub fn from_packages<I, S>(packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            packages: packages.into_iter().map(Into::into).collect(),
            cache: IndexMap::new(),
        }
    }

    pub fn contains(&mut self, module: &str) -> bool {
        if let Some(&known) = self.cache.get(module) {
            return known;
        }
        let inside = self.packages.iter().any(|package| {
            module == package
                || module
                    .strip_prefix(package.as_str())
                    .map(|rest| rest.starts_with('.'))
                    .unwrap_or(false)
        });
        self.cache.insert(module.to_string(), inside);
        inside
    }

    pub fn cache(&self) -> &IndexMap<String, bool> {
        &self.cache
    }
}

/// Rewrite a declaration to an absolute dotted name.
///
/// A relative declaration strips one trailing segment of the importer's name
/// per level before appending the declared module.
pub fn absolute_module_name(importer: &str, import: &RawImport) -> String {
    if import.level == 0 {
        return import.module.clone();
    }
    let mut base = importer;
    for _ in 0..import.level {
        base = match base.rsplit_once('.') {
            Some((head, _)) => head,
            None => base,
        };
    }
    format!("{base}.{}", import.module)
}

/// Keep the contained declarations of one module, merged per target name.
pub fn collect_declarations(
    importer: &str,
    imports: &[RawImport],
    containment: &mut Containment,
) -> IndexMap<String, ImportRecord> {
    let mut merged: IndexMap<String, ImportRecord> = IndexMap::new();
    for import in imports {
        if import.module.is_empty() {
            continue;
        }
        let target = absolute_module_name(importer, import);
        if !containment.contains(&target) {
            continue;
        }
        merged
            .entry(target.clone())
            .and_modify(|record| record.names.extend(import.names.iter().cloned()))
            .or_insert_with(|| ImportRecord {
                importer: importer.to_string(),
                target,
                names: import.names.clone(),
            });
    }
    merged
}

/// Find the inventory index of an imported module name.
///
/// Tiers, first hit wins and earliest index breaks ties:
/// 1. exact module name;
/// 2. the package initializer `<target>.__init__`;
/// 3. a module whose name is a dotted prefix of the target (attribute or
///    sub-module imported from it);
/// 4. a module nested under the target (directories without an initializer).
pub fn module_index(modules: &[Module], target: &str) -> Option<usize> {
    let initializer = format!("{target}.__init__");
    let nested_prefix = format!("{target}.");
    modules
        .iter()
        .position(|m| m.name == target)
        .or_else(|| modules.iter().position(|m| m.name == initializer))
        .or_else(|| {
            modules.iter().position(|m| {
                target
                    .strip_prefix(m.name.as_str())
                    .map(|rest| rest.starts_with('.'))
                    .unwrap_or(false)
            })
        })
        .or_else(|| {
            modules
                .iter()
                .position(|m| m.name.starts_with(&nested_prefix))
        })
}

/// Build the edges of one importing module.
pub fn resolve_imports(
    source_index: usize,
    modules: &[Module],
    imports: &[RawImport],
    containment: &mut Containment,
) -> DepMatrixResult<Vec<ImportEdge>> {
    let source = &modules[source_index];
    let declarations = collect_declarations(&source.name, imports, containment);
    let mut edges = Vec::with_capacity(declarations.len());
    for (target, record) in declarations {
        let target_index = module_index(modules, &target).ok_or_else(|| {
            DepMatrixError::Resolution(format!(
                "Contained import {target:?} from {:?} matches no discovered module",
                source.name
            ))
        })?;
        edges.push(ImportEdge {
            source_name: source.name.clone(),
            source_index,
            target_name: modules[target_index].name.clone(),
            target_index,
            cardinal: record.names.len(),
            imports: vec![record],
        });
    }
    Ok(edges)
}
