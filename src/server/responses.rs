use crate::error::{BroadbandError, ParseError, SearchError};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{error, warn};

/// Everything a handler can fail with. Each variant renders as an HTTP 200
/// JSON body tagged `type: "error"`.
#[derive(Debug, Error)]
pub enum ApiError {
    /// `/loadcsv` without `filepath`
    #[error("missing argument '{0}'")]
    MissingArgument(&'static str),

    /// `/searchcsv` without `search` or `header`
    #[error("missing parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("bad argument '{argument}': {message}")]
    BadRequest { argument: String, message: String },

    /// The source file could not be read
    #[error("{0}")]
    Datasource(String),

    /// The row builder rejected a record
    #[error("{0}")]
    Factory(String),

    #[error("No files are loaded")]
    NoDataLoaded,

    #[error("no match found for '{needle}'")]
    NoMatchFound {
        needle: String,
        specifier: Option<String>,
    },

    #[error(transparent)]
    Broadband(#[from] BroadbandError),
}

impl ApiError {
    pub fn bad_request(argument: impl Into<String>, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            argument: argument.into(),
            message: message.into(),
        }
    }

    /// The JSON body sent to the client
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        body.insert("type".into(), json!("error"));

        match self {
            ApiError::MissingArgument(argument) => {
                body.insert("error_type".into(), json!("missing_argument"));
                body.insert("missing_argument".into(), json!(argument));
            }
            ApiError::MissingParameter(argument) => {
                body.insert("error_type".into(), json!("missing_parameter"));
                body.insert("error_arg".into(), json!(argument));
            }
            ApiError::BadRequest { argument, message } => {
                body.insert("error_type".into(), json!("bad_request"));
                body.insert("error_arg".into(), json!(argument));
                body.insert("message".into(), json!(message));
            }
            ApiError::Datasource(message) => {
                body.insert("response_type".into(), json!(message));
            }
            ApiError::Factory(message) => {
                body.insert("error_type".into(), json!("error_factory"));
                body.insert("message".into(), json!(message));
            }
            ApiError::NoDataLoaded => {
                body.insert("error_type".into(), json!("No files are loaded"));
            }
            ApiError::NoMatchFound { needle, specifier } => {
                body.insert("error_type".into(), json!("no match found"));
                body.insert("search_word".into(), json!(needle));
                if let Some(specifier) = specifier {
                    body.insert("specifier".into(), json!(specifier));
                }
            }
            ApiError::Broadband(BroadbandError::StateNotFound(state)) => {
                body.insert("error_type".into(), json!("error_bad_request"));
                body.insert("no_state".into(), json!(state));
            }
            ApiError::Broadband(BroadbandError::CountyNotFound(county)) => {
                body.insert("error_type".into(), json!("error_bad_request"));
                body.insert("no_county".into(), json!(county));
            }
            ApiError::Broadband(BroadbandError::Datasource(message)) => {
                body.insert("error_type".into(), json!("error_datasource"));
                body.insert("message".into(), json!(message));
            }
        }

        Value::Object(body)
    }
}

impl From<ParseError> for ApiError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Datasource { .. } => ApiError::Datasource(err.to_string()),
            ParseError::Factory { .. } => ApiError::Factory(err.to_string()),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::NoDataLoaded => ApiError::NoDataLoaded,
            SearchError::BadRequest { argument, reason } => ApiError::BadRequest {
                argument,
                message: reason,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Datasource(_) | ApiError::Broadband(BroadbandError::Datasource(_)) => {
                error!("Request failed: {}", self)
            }
            _ => warn!("Request rejected: {}", self),
        }

        (StatusCode::OK, Json(self.body())).into_response()
    }
}

/// Success body: `result: "success"` plus the given fields
pub fn success(fields: Value) -> Json<Value> {
    let mut body = Map::new();
    body.insert("result".into(), json!("success"));
    if let Value::Object(fields) = fields {
        body.extend(fields);
    }
    Json(Value::Object(body))
}

/// `true`/`false` in any case
pub fn parse_bool(argument: &str, raw: &str) -> Result<bool, ApiError> {
    if raw.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ApiError::bad_request(
            argument,
            format!("expected true or false, got '{}'", raw),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FactoryFailure;
    use std::path::PathBuf;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("header", "true").unwrap());
        assert!(parse_bool("header", "TRUE").unwrap());
        assert!(!parse_bool("header", "False").unwrap());
        assert!(matches!(
            parse_bool("header", "yes"),
            Err(ApiError::BadRequest { .. })
        ));
    }

    #[test]
    fn test_datasource_body() {
        let err: ApiError = ParseError::Datasource {
            path: Some(PathBuf::from("data/nope.csv")),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into(),
        }
        .into();
        assert_eq!(
            err.body(),
            json!({"type": "error", "response_type": "error loading file: data/nope.csv"})
        );
    }

    #[test]
    fn test_factory_body() {
        let err: ApiError = ParseError::Factory {
            line: 2,
            failure: FactoryFailure::new("expected 5 fields, found 1", vec!["x".into()]),
        }
        .into();
        assert_eq!(
            err.body(),
            json!({
                "type": "error",
                "error_type": "error_factory",
                "message": "line 2: expected 5 fields, found 1"
            })
        );
    }

    #[test]
    fn test_no_match_omits_missing_specifier() {
        let err = ApiError::NoMatchFound {
            needle: "NOTHERE".into(),
            specifier: None,
        };
        assert_eq!(
            err.body(),
            json!({"type": "error", "error_type": "no match found", "search_word": "NOTHERE"})
        );

        let err = ApiError::NoMatchFound {
            needle: "NOTHERE".into(),
            specifier: Some("ind:1".into()),
        };
        assert_eq!(err.body()["specifier"], "ind:1");
    }

    #[test]
    fn test_broadband_bodies() {
        let state = ApiError::from(BroadbandError::StateNotFound("Rhade Island".into()));
        assert_eq!(
            state.body(),
            json!({"type": "error", "error_type": "error_bad_request", "no_state": "Rhade Island"})
        );

        let county = ApiError::from(BroadbandError::CountyNotFound("Pravidence".into()));
        assert_eq!(county.body()["no_county"], "Pravidence");

        let upstream = ApiError::from(BroadbandError::Datasource("timed out".into()));
        assert_eq!(upstream.body()["error_type"], "error_datasource");
    }

    #[test]
    fn test_search_error_conversion() {
        assert!(matches!(
            ApiError::from(SearchError::NoDataLoaded),
            ApiError::NoDataLoaded
        ));
        let err = ApiError::from(SearchError::bad_request("narrow", "no header"));
        assert_eq!(
            err.body(),
            json!({"type": "error", "error_type": "bad_request", "error_arg": "narrow", "message": "no header"})
        );
    }

    #[test]
    fn test_success_merges_fields() {
        let Json(body) = success(json!({"loaded": "a.csv"}));
        assert_eq!(body, json!({"result": "success", "loaded": "a.csv"}));
    }
}
