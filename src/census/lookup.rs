use crate::census::client::{CensusSource, CensusTable};
use crate::error::BroadbandError;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BroadbandResult {
    pub state: String,
    pub county: String,
    pub broadband_access: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Place {
    name: String,
    code: String,
}

/// Broadband percentage for a state/county pair, looked up by name.
///
/// Names match case-insensitively against the Census reference tables. The
/// state table never changes, so it is fetched once per lookup instance.
pub struct BroadbandLookup {
    source: Arc<dyn CensusSource>,
    variable: String,
    states: OnceCell<Vec<Place>>,
}

impl BroadbandLookup {
    pub fn new(source: Arc<dyn CensusSource>, variable: impl Into<String>) -> Self {
        Self {
            source,
            variable: variable.into(),
            states: OnceCell::new(),
        }
    }

    pub async fn lookup(&self, state: &str, county: &str) -> Result<BroadbandResult, BroadbandError> {
        info!("Broadband lookup: state='{}' county='{}'", state, county);

        let state_place = self.resolve_state(state).await?;
        let county_place = self.resolve_county(&state_place.code, county).await?;

        debug!(
            "Resolved {} -> {}, {} -> {}",
            state_place.name, state_place.code, county_place.name, county_place.code
        );

        let table = self
            .source
            .statistic_table(&state_place.code, &county_place.code)
            .await?;
        let broadband_access = self.statistic_value(&table)?;

        Ok(BroadbandResult {
            state: state_place.name,
            county: county_place.name,
            broadband_access,
        })
    }

    async fn resolve_state(&self, name: &str) -> Result<Place, BroadbandError> {
        let states = self
            .states
            .get_or_try_init(|| async {
                let table = self.source.state_table().await?;
                let states = parse_states(table);
                info!("Cached {} Census states", states.len());
                Ok::<_, BroadbandError>(states)
            })
            .await?;

        states
            .iter()
            .find(|place| place.name.eq_ignore_ascii_case(name.trim()))
            .cloned()
            .ok_or_else(|| BroadbandError::StateNotFound(name.to_string()))
    }

    async fn resolve_county(&self, state_code: &str, name: &str) -> Result<Place, BroadbandError> {
        let table = self.source.county_table(state_code).await?;

        parse_counties(table)
            .into_iter()
            .find(|place| place.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| BroadbandError::CountyNotFound(name.to_string()))
    }

    fn statistic_value(&self, table: &CensusTable) -> Result<String, BroadbandError> {
        let (header, rows) = table
            .split_first()
            .ok_or_else(|| BroadbandError::Datasource("empty statistic response".to_string()))?;

        let column = header
            .iter()
            .position(|h| h == &self.variable)
            .ok_or_else(|| {
                BroadbandError::Datasource(format!("response has no {} column", self.variable))
            })?;

        rows.first()
            .and_then(|row| row.get(column))
            .cloned()
            .ok_or_else(|| BroadbandError::Datasource(format!("no {} value returned", self.variable)))
    }
}

/// Skips the header row; rows are `NAME,state`
fn parse_states(table: CensusTable) -> Vec<Place> {
    table
        .into_iter()
        .skip(1)
        .filter_map(|row| {
            let mut cells = row.into_iter();
            let name = cells.next()?;
            let code = cells.next()?;
            Some(Place { name, code })
        })
        .collect()
}

/// Skips the header row; rows are `"<county>, <state>",state,county`
fn parse_counties(table: CensusTable) -> Vec<Place> {
    table
        .into_iter()
        .skip(1)
        .filter_map(|row| {
            let full_name = row.first()?;
            let code = row.get(2)?;
            let name = full_name.split(',').next()?.trim().to_string();
            Some(Place {
                name,
                code: code.clone(),
            })
        })
        .collect()
}
