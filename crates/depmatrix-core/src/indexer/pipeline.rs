//! Per-module import extraction with Rayon-based parallelism.

use rayon::prelude::*;
use tracing::debug;

use crate::errors::DepMatrixResult;
use crate::indexer::imports::{resolve_imports, Containment};
use crate::indexer::parser::{RawImport, StatementExtractor};
use crate::models::{ImportEdge, Module};

/// Whether per-module extraction may run on the Rayon pool.
pub fn parallel_extraction_enabled() -> bool {
    match std::env::var("DEPMATRIX_PARALLEL") {
        Ok(val) => {
            let v = val.trim().to_lowercase();
            !matches!(v.as_str(), "0" | "false" | "no" | "off")
        }
        Err(_) => true,
    }
}

fn extract_module(
    extractor: &dyn StatementExtractor,
    module: &Module,
) -> DepMatrixResult<Vec<RawImport>> {
    match &module.path {
        Some(path) => extractor.extract_imports(path),
        None => Ok(Vec::new()),
    }
}

/// Extract the raw declarations of every module, in inventory order.
///
/// Results line up with `modules` whether or not the work is parallel.
pub fn extract_all(
    extractor: &dyn StatementExtractor,
    modules: &[Module],
    parallel: bool,
) -> DepMatrixResult<Vec<Vec<RawImport>>> {
    if parallel {
        modules
            .par_iter()
            .map(|m| extract_module(extractor, m))
            .collect()
    } else {
        modules
            .iter()
            .map(|m| extract_module(extractor, m))
            .collect()
    }
}

/// Extract and resolve the edges of the whole inventory, ordered by source index.
pub fn build_edges(
    extractor: &dyn StatementExtractor,
    modules: &[Module],
    containment: &mut Containment,
    parallel: bool,
) -> DepMatrixResult<Vec<ImportEdge>> {
    let extracted = extract_all(extractor, modules, parallel)?;
    let mut edges = Vec::new();
    for (source_index, imports) in extracted.iter().enumerate() {
        let module_edges = resolve_imports(source_index, modules, imports, containment)?;
        debug!(
            "{}: {} declarations, {} edges",
            modules[source_index].name,
            imports.len(),
            module_edges.len()
        );
        edges.extend(module_edges);
    }
    Ok(edges)
}
