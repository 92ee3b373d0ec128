use crate::data::{CsvParser, IdentityBuilder, SearchEngine, SearchOutcome, SearchQuery};
use crate::server::responses::{parse_bool, success, ApiError};
use crate::server::AppState;
use axum::extract::{Query, State};
use axum::Json;
use chrono::Local;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;
use tracing::info;

const DEFAULT_LOG_COUNT: usize = 100;

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
pub struct LoadParams {
    pub filepath: Option<String>,
    pub header: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub header: Option<String>,
    pub narrow: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BroadbandParams {
    pub state: Option<String>,
    pub county: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LogsParams {
    pub count: Option<String>,
}

/// `/loadcsv?filepath=..&header=..`
///
/// Replaces the dataset only when the whole file parses.
pub async fn load_csv(State(state): State<AppState>, Query(params): Query<LoadParams>) -> ApiResult {
    let filepath = params
        .filepath
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingArgument("filepath"))?;

    let has_header = match params.header.as_deref() {
        Some(raw) => parse_bool("header", raw)?,
        None => false,
    };

    info!("Loading {} (header: {})", filepath, has_header);

    let path = PathBuf::from(&filepath);
    let table = tokio::task::spawn_blocking(move || {
        CsvParser::new(has_header).parse_file(&path, &IdentityBuilder)
    })
    .await
    .map_err(|e| ApiError::Datasource(format!("error loading file: {} ({})", filepath, e)))??;

    state.dataset.replace(table);

    Ok(success(json!({ "loaded": filepath })))
}

/// `/viewcsv`: the loaded table, header first
pub async fn view_csv(State(state): State<AppState>) -> ApiResult {
    let table = state.dataset.snapshot().ok_or(ApiError::NoDataLoaded)?;
    Ok(success(json!({ "viewData": table.to_records() })))
}

/// `/searchcsv?search=..&header=..&narrow=..`
pub async fn search_csv(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult {
    if !state.dataset.is_loaded() {
        return Err(ApiError::NoDataLoaded);
    }

    let needle = params.search.ok_or(ApiError::MissingParameter("search"))?;
    let header = params.header.ok_or(ApiError::MissingParameter("header"))?;
    let has_header = parse_bool("header", &header)?;

    let query = SearchQuery::new(needle, has_header).with_specifier(params.narrow.as_deref())?;

    info!(
        "Searching for '{}' (header: {}, narrow: {:?})",
        query.needle, query.has_header, query.specifier
    );

    match SearchEngine::search(&state.dataset, &query)? {
        SearchOutcome::Found(rows) => Ok(success(json!({ "view_data": rows }))),
        SearchOutcome::NoMatch { needle, specifier } => {
            Err(ApiError::NoMatchFound { needle, specifier })
        }
    }
}

/// `/broadband?state=..&county=..`
pub async fn broadband(
    State(state): State<AppState>,
    Query(params): Query<BroadbandParams>,
) -> ApiResult {
    let state_name = required(params.state, "state")?;
    let county_name = required(params.county, "county")?;

    let result = state.broadband.lookup(&state_name, &county_name).await?;

    Ok(success(json!({
        "state": result.state,
        "county": result.county,
        "broadband_access": result.broadband_access,
        "timestamp": Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
    })))
}

/// `/logs?count=..`: newest entries of the in-memory log, oldest first
pub async fn logs(State(state): State<AppState>, Query(params): Query<LogsParams>) -> ApiResult {
    let count = match params.count.as_deref() {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| ApiError::bad_request("count", format!("'{}' is not a count", raw)))?,
        None => DEFAULT_LOG_COUNT,
    };

    Ok(success(json!({ "logs": state.logs.get_recent(count) })))
}

fn required(value: Option<String>, argument: &'static str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request(argument, format!("missing {}", argument)))
}
