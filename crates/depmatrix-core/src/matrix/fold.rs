//! One-level bottom-up folding of a matrix.

use indexmap::map::Entry;
use indexmap::IndexMap;

use crate::models::{ImportEdge, Matrix, Module};

/// The first `depth` dot-segments of a module name.
pub fn collapsed_name(name: &str, depth: usize) -> Vec<String> {
    name.split('.').take(depth).map(str::to_string).collect()
}

/// Collapse the matrix of depth `depth + 1` into the matrix of depth `depth`.
///
/// Modules sharing a collapsed name merge in first-seen order. Edges are
/// remapped through the same mapping and merged per (source, target) pair,
/// summing cardinals and concatenating import records. Edges whose endpoints
/// collapse into the same module are kept as self-loops.
pub fn fold_matrix(finer: &Matrix, depth: usize) -> Matrix {
    let mut seen: IndexMap<Vec<String>, usize> = IndexMap::new();
    let mut modules: Vec<Module> = Vec::new();
    let mut remap: Vec<usize> = Vec::with_capacity(finer.modules.len());

    for module in &finer.modules {
        let key = collapsed_name(&module.name, depth);
        let index = match seen.entry(key) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => {
                let index = modules.len();
                modules.push(Module {
                    name: entry.key().join("."),
                    path: None,
                    group_index: module.group_index,
                    group_name: module.group_name.clone(),
                });
                entry.insert(index);
                index
            }
        };
        remap.push(index);
    }

    let mut merged: IndexMap<(usize, usize), ImportEdge> = IndexMap::new();
    for edge in &finer.imports {
        let source_index = remap[edge.source_index];
        let target_index = remap[edge.target_index];
        match merged.entry((source_index, target_index)) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(edge),
            Entry::Vacant(entry) => {
                entry.insert(ImportEdge {
                    source_name: modules[source_index].name.clone(),
                    source_index,
                    target_name: modules[target_index].name.clone(),
                    target_index,
                    imports: edge.imports.clone(),
                    cardinal: edge.cardinal,
                });
            }
        }
    }

    Matrix::new(modules, merged.into_values().collect())
}
