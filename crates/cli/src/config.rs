//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub content_hub: ContentHubConfig,

    #[serde(default)]
    pub linkedin: LinkedInConfig,

    #[serde(default)]
    pub trigger: TriggerConfig,

    #[serde(default)]
    pub dedupe: DedupeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub log_format: String,

    #[serde(default = "default_true")]
    pub dry_run: bool,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentHubConfig {
    /// Base URL of the content hub, e.g. `https://hub.example.com`
    #[serde(default)]
    pub host: String,

    #[serde(default)]
    pub client_id: String,

    #[serde(default = "default_client_secret_env")]
    pub client_secret_env: String,

    #[serde(default)]
    pub username: String,

    #[serde(default = "default_password_env")]
    pub password_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkedInConfig {
    #[serde(default = "default_linkedin_base_url")]
    pub base_url: String,

    /// Member id or full `urn:li:person:...` URN of the post author
    #[serde(default)]
    pub person_id: String,

    #[serde(default = "default_linkedin_token_env")]
    pub token_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    #[serde(default = "default_function_name")]
    pub function_name: String,

    #[serde(default = "default_binding")]
    pub binding: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupeConfig {
    #[serde(default)]
    pub enabled: bool,

    /// `sqlite` or `memory`
    #[serde(default = "default_dedupe_backend")]
    pub backend: String,

    #[serde(default = "default_dedupe_db_path")]
    pub db_path: PathBuf,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_true() -> bool {
    true
}

fn default_request_timeout() -> u64 {
    30
}

fn default_client_secret_env() -> String {
    "CONTENT_HUB_CLIENT_SECRET".to_string()
}

fn default_password_env() -> String {
    "CONTENT_HUB_PASSWORD".to_string()
}

fn default_linkedin_base_url() -> String {
    linkedin_connector_adapters::linkedin::DEFAULT_BASE_URL.to_string()
}

fn default_linkedin_token_env() -> String {
    "LINKEDIN_ACCESS_TOKEN".to_string()
}

fn default_function_name() -> String {
    "PostCmpContentToLinkedIn".to_string()
}

fn default_binding() -> String {
    "mySbMsg".to_string()
}

fn default_port() -> u16 {
    7071
}

fn default_dedupe_backend() -> String {
    "sqlite".to_string()
}

fn default_dedupe_db_path() -> PathBuf {
    PathBuf::from("./deliveries.sqlite")
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            dry_run: default_true(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Default for ContentHubConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            client_id: String::new(),
            client_secret_env: default_client_secret_env(),
            username: String::new(),
            password_env: default_password_env(),
        }
    }
}

impl Default for LinkedInConfig {
    fn default() -> Self {
        Self {
            base_url: default_linkedin_base_url(),
            person_id: String::new(),
            token_env: default_linkedin_token_env(),
        }
    }
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            function_name: default_function_name(),
            binding: default_binding(),
            port: default_port(),
        }
    }
}

impl Default for DedupeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            backend: default_dedupe_backend(),
            db_path: default_dedupe_db_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        // Try default config path if none specified
        let default_path = PathBuf::from("./config.toml");
        let path = config_path.unwrap_or(&default_path);

        if path.exists() {
            builder = builder.add_source(config::File::from(path));
        } else if config_path.is_some() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        builder = builder.add_source(
            config::Environment::with_prefix("LINKEDIN_CONNECTOR")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Generate example configuration as TOML string
    pub fn example_toml() -> String {
        r#"# linkedin-connector configuration

[general]
log_level = "info"
log_format = "pretty"  # pretty, json
# Set to false to actually publish
dry_run = true
request_timeout_secs = 30

[content_hub]
host = "https://hub.example.com"
client_id = "LinkedInConnector"
client_secret_env = "CONTENT_HUB_CLIENT_SECRET"
username = "connector-user"
password_env = "CONTENT_HUB_PASSWORD"

[linkedin]
base_url = "https://api.linkedin.com"
# Member id or urn:li:person:... URN
person_id = "your-member-id"
token_env = "LINKEDIN_ACCESS_TOKEN"

[trigger]
function_name = "PostCmpContentToLinkedIn"
binding = "mySbMsg"
# FUNCTIONS_CUSTOMHANDLER_PORT takes precedence when set
port = 7071

[dedupe]
enabled = false
backend = "sqlite"  # sqlite, memory
db_path = "./deliveries.sqlite"
"#
        .to_string()
    }
}
