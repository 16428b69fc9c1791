//! Error types for the dependency matrix library.

/// Top-level error enum for the dependency matrix library.
#[derive(Debug, thiserror::Error)]
pub enum DepMatrixError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Resolution error: {0}")]
    Resolution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(feature = "python")]
impl From<DepMatrixError> for pyo3::PyErr {
    fn from(err: DepMatrixError) -> pyo3::PyErr {
        use pyo3::exceptions::{PyIOError, PyRuntimeError, PyValueError};

        match &err {
            DepMatrixError::Resolution(_) => PyRuntimeError::new_err(err.to_string()),
            DepMatrixError::Parse(_) => PyValueError::new_err(err.to_string()),
            DepMatrixError::Io(_) => PyIOError::new_err(err.to_string()),
            DepMatrixError::Json(_) => PyValueError::new_err(err.to_string()),
        }
    }
}

pub type DepMatrixResult<T> = Result<T, DepMatrixError>;
