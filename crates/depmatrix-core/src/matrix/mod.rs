//! Dependency matrix session: discovery, resolution, and multi-depth matrices.
//!
//! A [`DependencyMatrix`] runs a fixed pipeline. [`DependencyMatrix::build_modules`]
//! discovers the module inventory, [`DependencyMatrix::build_imports`] resolves
//! import edges between those modules, and [`DependencyMatrix::build_matrices`]
//! folds the finest matrix into one matrix per depth. Each stage runs once;
//! calling it again, or before its predecessor, does nothing.

pub mod fold;
pub mod projection;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::errors::DepMatrixResult;
use crate::indexer::filesystem::{discover_modules, max_depth, PathResolver, SearchPathResolver};
use crate::indexer::imports::Containment;
use crate::indexer::parser::{PythonImportExtractor, StatementExtractor};
use crate::indexer::pipeline::{build_edges, parallel_extraction_enabled};
use crate::models::{BuildStage, ImportEdge, Matrix, Module, PackageGroups};

use self::fold::fold_matrix;
use self::projection::{empty_document, project, MatrixOptions};

pub struct DependencyMatrix {
    groups: PackageGroups,
    resolver: Box<dyn PathResolver>,
    extractor: Box<dyn StatementExtractor>,
    parallel: bool,
    modules: Vec<Module>,
    imports: Vec<ImportEdge>,
    max_depth: usize,
    matrices: Vec<Matrix>,
    containment: Containment,
    stage: BuildStage,
}

/// Whole-session export document. The path resolver is not part of it.
#[derive(Serialize)]
struct SessionSnapshot<'a> {
    packages: Vec<&'a [String]>,
    groups: Vec<&'a str>,
    modules: &'a [Module],
    imports: &'a [ImportEdge],
    max_depth: usize,
    matrices: &'a [Matrix],
    inside: &'a IndexMap<String, bool>,
    stage: BuildStage,
    modules_are_built: bool,
    imports_are_built: bool,
    matrices_are_built: bool,
}

impl DependencyMatrix {
    /// A session using `DEPMATRIX_PATH` search roots and the tree-sitter extractor.
    pub fn new(groups: PackageGroups) -> Self {
        Self::with_collaborators(groups, SearchPathResolver::from_env(), PythonImportExtractor)
    }

    pub fn with_collaborators(
        groups: PackageGroups,
        resolver: impl PathResolver + 'static,
        extractor: impl StatementExtractor + 'static,
    ) -> Self {
        let containment = Containment::new(&groups);
        Self {
            groups,
            resolver: Box::new(resolver),
            extractor: Box::new(extractor),
            parallel: parallel_extraction_enabled(),
            modules: Vec::new(),
            imports: Vec::new(),
            max_depth: 0,
            matrices: Vec::new(),
            containment,
            stage: BuildStage::Empty,
        }
    }

    /// Override the `DEPMATRIX_PARALLEL` setting for this session.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run every remaining stage in order.
    pub fn build(&mut self) -> DepMatrixResult<&mut Self> {
        self.build_modules();
        self.build_imports()?;
        self.build_matrices();
        Ok(self)
    }

    /// Discover every module of every package and compute the maximum depth.
    ///
    /// Containment is narrowed to the packages that resolved.
    pub fn build_modules(&mut self) -> &mut Self {
        if self.stage >= BuildStage::ModulesBuilt {
            return self;
        }
        let discovery = discover_modules(&self.groups, self.resolver.as_ref());
        // Unresolved packages have no modules an import could land on.
        self.containment = Containment::from_packages(discovery.resolved);
        self.modules = discovery.modules;
        self.max_depth = max_depth(&self.modules);
        self.stage = BuildStage::ModulesBuilt;
        info!(
            "Discovered {} modules, max depth {}",
            self.modules.len(),
            self.max_depth
        );
        self
    }

    /// Resolve the import edges of the finest matrix.
    ///
    /// A contained import that matches no module is an error; the session then
    /// stays in its previous stage.
    pub fn build_imports(&mut self) -> DepMatrixResult<&mut Self> {
        if self.stage != BuildStage::ModulesBuilt {
            return Ok(self);
        }
        let edges = build_edges(
            self.extractor.as_ref(),
            &self.modules,
            &mut self.containment,
            self.parallel,
        )?;
        info!("Resolved {} import edges", edges.len());
        self.imports = edges;
        self.stage = BuildStage::ImportsBuilt;
        Ok(self)
    }

    /// Build one matrix per depth, from the finest up to depth 1.
    pub fn build_matrices(&mut self) -> &mut Self {
        if self.stage != BuildStage::ImportsBuilt {
            return self;
        }
        let mut levels = Vec::with_capacity(self.max_depth);
        if self.max_depth > 0 {
            let mut current = Matrix::new(self.modules.clone(), self.imports.clone());
            for depth in (1..self.max_depth).rev() {
                let coarser = fold_matrix(&current, depth);
                levels.push(std::mem::replace(&mut current, coarser));
            }
            levels.push(current);
            levels.reverse();
        }
        self.matrices = levels;
        self.stage = BuildStage::MatricesBuilt;
        info!("Built {} matrices", self.matrices.len());
        self
    }

    pub fn groups(&self) -> &PackageGroups {
        &self.groups
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn imports(&self) -> &[ImportEdge] {
        &self.imports
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// All matrices, index 0 holding depth 1.
    pub fn matrices(&self) -> &[Matrix] {
        &self.matrices
    }

    pub fn stage(&self) -> BuildStage {
        self.stage
    }

    /// Whether a dotted name lies inside the scanned packages.
    pub fn contains(&mut self, module: &str) -> bool {
        self.containment.contains(module)
    }

    pub fn containment_cache(&self) -> &IndexMap<String, bool> {
        self.containment.cache()
    }

    /// Position in `matrices` serving a requested depth.
    ///
    /// 0 and anything above the maximum depth select the finest matrix;
    /// negative values select depth 1.
    fn matrix_slot(&self, depth: i64) -> Option<usize> {
        if self.matrices.is_empty() {
            return None;
        }
        let finest = self.matrices.len() - 1;
        let slot = if depth == 0 || depth > self.max_depth as i64 {
            finest
        } else if depth < 0 {
            0
        } else {
            (depth - 1) as usize
        };
        Some(slot.min(finest))
    }

    /// A copy of the matrix for `depth`, or `None` before matrices are built.
    pub fn get_matrix(&self, depth: i64) -> Option<Matrix> {
        self.matrix_slot(depth).map(|slot| self.matrices[slot].clone())
    }

    /// The projected matrix for `depth` as a document.
    pub fn matrix_document(&self, depth: i64, options: &MatrixOptions) -> DepMatrixResult<Value> {
        match self.matrix_slot(depth) {
            Some(slot) => project(&self.matrices[slot], options),
            None => Ok(empty_document()),
        }
    }

    /// The projected matrix for `depth` as JSON text.
    pub fn matrix_to_json(&self, depth: i64, options: &MatrixOptions) -> DepMatrixResult<String> {
        Ok(serde_json::to_string(&self.matrix_document(depth, options)?)?)
    }

    /// The whole session state as JSON text.
    pub fn to_json(&self) -> DepMatrixResult<String> {
        let snapshot = SessionSnapshot {
            packages: self
                .groups
                .groups()
                .iter()
                .map(|g| g.packages.as_slice())
                .collect(),
            groups: self.groups.labels(),
            modules: &self.modules,
            imports: &self.imports,
            max_depth: self.max_depth,
            matrices: &self.matrices,
            inside: self.containment.cache(),
            stage: self.stage,
            modules_are_built: self.stage >= BuildStage::ModulesBuilt,
            imports_are_built: self.stage >= BuildStage::ImportsBuilt,
            matrices_are_built: self.stage >= BuildStage::MatricesBuilt,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }
}
