//! Error taxonomy shared by the data pipeline and the census lookup.
//!
//! The HTTP layer folds all of these into `server::ApiError`, which is the
//! only error type that ever reaches a client.

use std::path::PathBuf;
use thiserror::Error;

/// A row builder could not turn raw fields into its output type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FactoryFailure {
    pub message: String,
    pub row: Vec<String>,
}

impl FactoryFailure {
    pub fn new(message: impl Into<String>, row: Vec<String>) -> Self {
        Self {
            message: message.into(),
            row,
        }
    }
}

/// Failure while turning a source into a table.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Opening or reading the source failed
    #[error("error loading file: {}", display_path(.path))]
    Datasource {
        path: Option<PathBuf>,
        #[source]
        source: csv::Error,
    },

    /// The row builder rejected a record. Nothing from the parse is kept.
    #[error("line {line}: {failure}")]
    Factory {
        line: u64,
        #[source]
        failure: FactoryFailure,
    },
}

impl ParseError {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            ParseError::Datasource { path, .. } => path.as_ref(),
            ParseError::Factory { .. } => None,
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<stream>".to_string())
}

/// Search could not run. A search that simply finds nothing is not an error,
/// see `SearchOutcome::NoMatch`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("No files are loaded")]
    NoDataLoaded,

    #[error("bad argument '{argument}': {reason}")]
    BadRequest { argument: String, reason: String },
}

impl SearchError {
    pub fn bad_request(argument: impl Into<String>, reason: impl Into<String>) -> Self {
        SearchError::BadRequest {
            argument: argument.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a state/county broadband lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BroadbandError {
    #[error("no state named '{0}'")]
    StateNotFound(String),

    #[error("no county named '{0}'")]
    CountyNotFound(String),

    /// Transport failure, timeout, non-success status or a payload we could
    /// not read.
    #[error("census datasource error: {0}")]
    Datasource(String),
}

impl From<reqwest::Error> for BroadbandError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BroadbandError::Datasource(format!("request timed out: {}", err))
        } else {
            BroadbandError::Datasource(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_datasource_message_names_path() {
        let source = csv::Error::from(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = ParseError::Datasource {
            path: Some(PathBuf::from("data/missing.csv")),
            source,
        };
        assert_eq!(err.to_string(), "error loading file: data/missing.csv");
        assert_eq!(err.path(), Some(&PathBuf::from("data/missing.csv")));
    }

    #[test]
    fn test_factory_message_has_line() {
        let err = ParseError::Factory {
            line: 3,
            failure: FactoryFailure::new("expected 5 fields, found 2", vec!["a".into(), "b".into()]),
        };
        assert_eq!(err.to_string(), "line 3: expected 5 fields, found 2");
        assert!(err.path().is_none());
    }
}
