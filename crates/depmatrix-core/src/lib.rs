//! Dependency matrix core library.
//!
//! Discovers the modules of one or more Python packages, resolves the
//! `from X import Y` relationships between them, and folds the resulting
//! module-to-module graph into one matrix per name depth, from whole packages
//! (depth 1) down to individual files. With the `python` feature the crate is
//! also built as a Python extension module (`_depmatrix_core`).

pub mod errors;
pub mod indexer;
pub mod matrix;
pub mod models;

#[cfg(feature = "python")]
pub mod python;

pub use errors::{DepMatrixError, DepMatrixResult};
pub use matrix::projection::MatrixOptions;
pub use matrix::DependencyMatrix;
pub use models::{BuildStage, ImportEdge, ImportRecord, Matrix, Module, PackageGroups};

#[cfg(feature = "python")]
use pyo3::prelude::*;

// ---------------------------------------------------------------------------
// Top-level Python module: _depmatrix_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn _depmatrix_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::PyDependencyMatrix>()?;
    Ok(())
}
