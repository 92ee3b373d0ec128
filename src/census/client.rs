use crate::config::CensusConfig;
use crate::error::BroadbandError;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// A Census response: a header row followed by data rows
pub type CensusTable = Vec<Vec<String>>;

/// The three Census queries the broadband lookup needs
#[async_trait]
pub trait CensusSource: Send + Sync {
    /// `NAME,state` for every state
    async fn state_table(&self) -> Result<CensusTable, BroadbandError>;

    /// `NAME,state,county` for every county of one state
    async fn county_table(&self, state_code: &str) -> Result<CensusTable, BroadbandError>;

    /// `NAME,<variable>,state,county` for one county
    async fn statistic_table(
        &self,
        state_code: &str,
        county_code: &str,
    ) -> Result<CensusTable, BroadbandError>;
}

/// HTTP client for api.census.gov
#[derive(Clone)]
pub struct CensusClient {
    config: CensusConfig,
    client: reqwest::Client,
}

impl CensusClient {
    pub fn new(config: CensusConfig) -> Result<Self, BroadbandError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self { config, client })
    }

    async fn get_table(
        &self,
        dataset: &str,
        query: &[(&str, String)],
    ) -> Result<CensusTable, BroadbandError> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            dataset.trim_matches('/')
        );

        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key)]);
        }

        debug!("Census request: {} {:?}", url, query);

        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(BroadbandError::Datasource(format!(
                "Census API returned {}: {}",
                status,
                error_text.trim()
            )));
        }

        let raw: Vec<Vec<Value>> = response.json().await.map_err(|e| {
            BroadbandError::Datasource(format!("unexpected Census payload: {}", e))
        })?;

        Ok(raw
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }
}

/// Census cells are strings, but missing estimates come back as `null`
fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[async_trait]
impl CensusSource for CensusClient {
    async fn state_table(&self) -> Result<CensusTable, BroadbandError> {
        self.get_table(
            &self.config.geography_dataset,
            &[
                ("get", "NAME".to_string()),
                ("for", "state:*".to_string()),
            ],
        )
        .await
    }

    async fn county_table(&self, state_code: &str) -> Result<CensusTable, BroadbandError> {
        self.get_table(
            &self.config.geography_dataset,
            &[
                ("get", "NAME".to_string()),
                ("for", "county:*".to_string()),
                ("in", format!("state:{}", state_code)),
            ],
        )
        .await
    }

    async fn statistic_table(
        &self,
        state_code: &str,
        county_code: &str,
    ) -> Result<CensusTable, BroadbandError> {
        self.get_table(
            &self.config.statistic_dataset,
            &[
                ("get", format!("NAME,{}", self.config.statistic_variable)),
                ("for", format!("county:{}", county_code)),
                ("in", format!("state:{}", state_code)),
            ],
        )
        .await
    }
}
