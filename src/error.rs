#[cfg(feature = "python")]
use pyo3::exceptions::{PyRuntimeError, PyValueError};
#[cfg(feature = "python")]
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExplorerError {
    #[error("InvalidInput: {0}")]
    InvalidInput(String),

    #[error("Unknown region: {0}")]
    UnknownRegion(String),

    #[error("Invalid selection: year {year} outside [{min}, {max}]")]
    InvalidSelection { year: i32, min: i32, max: i32 },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExplorerError>;

impl ExplorerError {
    /// Errors caused by a bad user selection rather than bad data or I/O.
    pub fn is_selection_error(&self) -> bool {
        matches!(
            self,
            ExplorerError::UnknownRegion(_) | ExplorerError::InvalidSelection { .. }
        )
    }
}

#[cfg(feature = "python")]
impl From<ExplorerError> for PyErr {
    fn from(err: ExplorerError) -> PyErr {
        if err.is_selection_error() {
            PyValueError::new_err(err.to_string())
        } else {
            PyRuntimeError::new_err(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_errors_are_classified() {
        assert!(ExplorerError::UnknownRegion("mars".into()).is_selection_error());
        assert!(ExplorerError::InvalidSelection {
            year: 1900,
            min: 1960,
            max: 2018
        }
        .is_selection_error());
        assert!(!ExplorerError::InvalidInput("empty".into()).is_selection_error());
    }

    #[test]
    fn invalid_selection_message_names_the_range() {
        let err = ExplorerError::InvalidSelection {
            year: 1900,
            min: 1960,
            max: 2018,
        };
        assert_eq!(
            err.to_string(),
            "Invalid selection: year 1900 outside [1960, 2018]"
        );
    }
}
