use dotenvy::dotenv;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_API_URL: &str = "https://api.hubapi.com";
pub const DEFAULT_PROPERTY_OBJECT_TYPE: &str = "p_properties";
pub const DEFAULT_CONFERENCE_OBJECT_TYPE: &str = "2-20107961";
pub const DEFAULT_LOCATION_OBJECT_TYPE: &str = "2-16842375";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("PRIVATE_APP_ACCESS_TOKEN is not set")]
    MissingCredential,

    #[error("invalid environment: {0}")]
    Env(#[from] envy::Error),
}

/// Raw environment, before validation
#[derive(Debug, Deserialize)]
struct Env {
    private_app_access_token: Option<String>,
    #[serde(default = "default_api_url")]
    hubspot_api_url: String,
    #[serde(default = "default_property_object_type")]
    property_object_type: String,
    #[serde(default = "default_conference_object_type")]
    conference_object_type: String,
    #[serde(default = "default_location_object_type")]
    location_object_type: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_property_object_type() -> String {
    DEFAULT_PROPERTY_OBJECT_TYPE.to_string()
}

fn default_conference_object_type() -> String {
    DEFAULT_CONFERENCE_OBJECT_TYPE.to_string()
}

fn default_location_object_type() -> String {
    DEFAULT_LOCATION_OBJECT_TYPE.to_string()
}

/// Configuration for the application
#[derive(Clone)]
pub struct Config {
    access_token: String,
    /// Base URL of the CRM REST API
    pub api_url: String,
    /// Object type holding real estate "property" records
    pub property_object_type: String,
    /// Object type holding conference records
    pub conference_object_type: String,
    /// Object type holding location records that invoices get associated with
    pub location_object_type: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_token", &"<redacted>")
            .field("api_url", &self.api_url)
            .field("property_object_type", &self.property_object_type)
            .field("conference_object_type", &self.conference_object_type)
            .field("location_object_type", &self.location_object_type)
            .finish()
    }
}

impl Config {
    /// Build a config from an explicit token, with default endpoints
    pub fn new(access_token: impl Into<String>) -> Result<Self, ConfigError> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(ConfigError::MissingCredential);
        }

        Ok(Self {
            access_token,
            api_url: default_api_url(),
            property_object_type: default_property_object_type(),
            conference_object_type: default_conference_object_type(),
            location_object_type: default_location_object_type(),
        })
    }

    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first if one exists.
    pub fn load() -> Result<Self, ConfigError> {
        dotenv().ok();

        let env = envy::from_env::<Env>()?;
        Self::from_env(env)
    }

    fn from_env(env: Env) -> Result<Self, ConfigError> {
        let mut config = Self::new(env.private_app_access_token.unwrap_or_default())?;
        config.api_url = env.hubspot_api_url.trim_end_matches('/').to_string();
        config.property_object_type = env.property_object_type;
        config.conference_object_type = env.conference_object_type;
        config.location_object_type = env.location_object_type;
        Ok(config)
    }

    /// Bearer token for the CRM API
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}
