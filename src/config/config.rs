use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub census: CensusConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind
    pub host: String,

    pub port: u16,

    /// Answer CORS preflight requests from any origin
    pub cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CensusConfig {
    /// Root of the Census data API
    pub base_url: String,

    /// Sent as `key=`; `CENSUS_API_KEY` in the environment takes precedence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Per-request timeout, covering connect and body
    pub timeout_secs: u64,

    /// Dataset holding the state and county name tables
    pub geography_dataset: String,

    /// Dataset holding the broadband statistic
    pub statistic_dataset: String,

    /// Variable holding the broadband percentage
    pub statistic_variable: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub filter: String,

    /// Entries kept in memory for `/logs`
    pub buffer_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3232,
            cors: true,
        }
    }
}

impl Default for CensusConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.census.gov/data".to_string(),
            api_key: None,
            timeout_secs: 10,
            geography_dataset: "2010/dec/sf1".to_string(),
            statistic_dataset: "2021/acs/acs1/subject/variables".to_string(),
            statistic_variable: "S2802_C03_001E".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            buffer_size: 1000,
        }
    }
}

impl CensusConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load config from `path`, or from the default location when `None`.
    /// A missing file at the default location is created with defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::get_config_path()?,
        };

        if !config_path.exists() {
            if path.is_some() {
                return Err(anyhow::anyhow!(
                    "Config file not found: {}",
                    config_path.display()
                ));
            }
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&config_path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        Ok(config)
    }

    /// Environment overrides (`CENSUS_API_KEY`), applied after `.env` is read
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("CENSUS_API_KEY") {
            if !key.trim().is_empty() {
                self.census.api_key = Some(key);
            }
        }
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(config_path, contents)?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("csv-server").join("config.toml"))
    }

    /// Default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# csv-server configuration
# Location: ~/.config/csv-server/config.toml (Linux)
#           ~/Library/Application Support/csv-server/config.toml (macOS)
#           %APPDATA%\csv-server\config.toml (Windows)

[server]
host = "127.0.0.1"
port = 3232

# Allow browser clients from any origin
cors = true

[census]
base_url = "https://api.census.gov/data"

# API key, optional for low request volumes.
# CENSUS_API_KEY (environment or .env) overrides this value.
# api_key = "..."

# Seconds before a Census request is abandoned
timeout_secs = 10

# State/county name tables
geography_dataset = "2010/dec/sf1"

# Broadband statistic
statistic_dataset = "2021/acs/acs1/subject/variables"
statistic_variable = "S2802_C03_001E"

[logging]
# tracing EnvFilter directive; RUST_LOG overrides it
filter = "info"

# Number of log lines kept for the /logs endpoint
buffer_size = 1000
"#
        .to_string()
    }
}
