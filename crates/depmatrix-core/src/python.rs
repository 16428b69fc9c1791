//! Python bindings for the dependency matrix session.

use std::collections::HashMap;
use std::path::PathBuf;

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::indexer::filesystem::SearchPathResolver;
use crate::indexer::parser::PythonImportExtractor;
use crate::matrix::projection::MatrixOptions;
use crate::matrix::DependencyMatrix;
use crate::models::PackageGroups;

/// Accept a package name, a list of names, or a mapping of label to names.
fn package_groups(packages: &Bound<'_, PyAny>) -> PyResult<PackageGroups> {
    if let Ok(name) = packages.extract::<String>() {
        return Ok(PackageGroups::from_single_package(name));
    }
    if let Ok(mapping) = packages.downcast::<PyDict>() {
        let mut labeled: Vec<(String, Vec<String>)> = Vec::with_capacity(mapping.len());
        for (label, names) in mapping.iter() {
            labeled.push((label.extract()?, names.extract()?));
        }
        return Ok(PackageGroups::from_labeled_groups(labeled));
    }
    Ok(PackageGroups::from_package_list(
        packages.extract::<Vec<String>>()?,
    ))
}

#[pyclass(name = "DependencyMatrix")]
pub struct PyDependencyMatrix {
    inner: DependencyMatrix,
}

#[pymethods]
impl PyDependencyMatrix {
    #[new]
    #[pyo3(signature = (packages, path=None))]
    fn new(packages: &Bound<'_, PyAny>, path: Option<Vec<PathBuf>>) -> PyResult<Self> {
        let groups = package_groups(packages)?;
        let resolver = match path {
            Some(roots) => SearchPathResolver::new(roots),
            None => SearchPathResolver::from_env(),
        };
        Ok(Self {
            inner: DependencyMatrix::with_collaborators(groups, resolver, PythonImportExtractor),
        })
    }

    fn build(mut slf: PyRefMut<'_, Self>) -> PyResult<PyRefMut<'_, Self>> {
        slf.inner.build()?;
        Ok(slf)
    }

    fn build_modules(mut slf: PyRefMut<'_, Self>) -> PyRefMut<'_, Self> {
        slf.inner.build_modules();
        slf
    }

    fn build_imports(mut slf: PyRefMut<'_, Self>) -> PyResult<PyRefMut<'_, Self>> {
        slf.inner.build_imports()?;
        Ok(slf)
    }

    fn build_matrices(mut slf: PyRefMut<'_, Self>) -> PyRefMut<'_, Self> {
        slf.inner.build_matrices();
        slf
    }

    #[getter]
    fn max_depth(&self) -> usize {
        self.inner.max_depth()
    }

    fn contains(&mut self, module: &str) -> bool {
        self.inner.contains(module)
    }

    /// JSON text of the unprojected matrix at `depth`.
    fn get_matrix_json(&self, depth: i64) -> PyResult<String> {
        Ok(self.inner.matrix_to_json(depth, &MatrixOptions::default())?)
    }

    #[pyo3(signature = (depth, options=None))]
    fn matrix_to_json(
        &self,
        depth: i64,
        options: Option<HashMap<String, bool>>,
    ) -> PyResult<String> {
        let options = options
            .map(|flags| MatrixOptions::from_flags(&flags))
            .unwrap_or_default();
        Ok(self.inner.matrix_to_json(depth, &options)?)
    }

    fn to_json(&self) -> PyResult<String> {
        Ok(self.inner.to_json()?)
    }

    fn __repr__(&self) -> String {
        format!(
            "DependencyMatrix(packages={:?}, modules={}, max_depth={}, stage={:?})",
            self.inner.groups().packages().collect::<Vec<_>>(),
            self.inner.modules().len(),
            self.inner.max_depth(),
            self.inner.stage(),
        )
    }
}
