// Runtime configuration: secrets and addresses come from the environment,
// search parameters are fixed for this version of the alert.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use crate::search::{CabinClass, PassengerType};

pub const DUFFEL_BASE_URL: &str = "https://api.duffel.com";
pub const DUFFEL_API_VERSION: &str = "v2";
pub const POSTMARK_BASE_URL: &str = "https://api.postmarkapp.com";

pub const DEFAULT_CACHE_PATH: &str = "data/duffel_response.json";
pub const DEFAULT_TEMPLATE_PATH: &str = "templates/email_template.html";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}; set it in config/.env or the environment")]
    MissingVariable(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}

// Credentials for the offer-search API
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub access_token: String,
    pub api_version: String,
}

// Credentials and addresses for the email API
#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub base_url: String,
    pub server_token: String,
    pub sender: String,
    pub recipient: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub search: SearchConfig,
    pub email: EmailConfig,
    /// Where the raw search response is written; `None` disables the cache.
    pub cache_path: Option<PathBuf>,
    pub template_path: PathBuf,
}

impl Config {
    // Load `config/.env` then `.env` (both optional) and read the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenv::from_path("config/.env").ok();
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    // Build the config from any key lookup, so tests need not touch the
    // process environment
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::MissingVariable(name))
        };
        let optional = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let access_token = required("DUFFEL_API_KEY")?;
        let server_token = required("POSTMARK_API_TOKEN")?;
        let sender = required("SENDER_EMAIL")?;
        let recipient = required("RECEIVER_EMAIL")?;

        for (name, address) in [("SENDER_EMAIL", &sender), ("RECEIVER_EMAIL", &recipient)] {
            if !address.contains('@') {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("'{}' is not an email address", address),
                });
            }
        }

        let cache_path = optional("FLIGHT_CACHE_PATH", DEFAULT_CACHE_PATH);

        Ok(Config {
            search: SearchConfig {
                base_url: optional("DUFFEL_BASE_URL", DUFFEL_BASE_URL),
                access_token,
                api_version: DUFFEL_API_VERSION.to_string(),
            },
            email: EmailConfig {
                base_url: optional("POSTMARK_BASE_URL", POSTMARK_BASE_URL),
                server_token,
                sender,
                recipient,
            },
            cache_path: (!cache_path.trim().is_empty()).then(|| PathBuf::from(cache_path)),
            template_path: PathBuf::from(optional("EMAIL_TEMPLATE_PATH", DEFAULT_TEMPLATE_PATH)),
        })
    }
}

// Fixed search parameters for this alert
#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub passengers: Vec<PassengerType>,
    pub cabin_class: CabinClass,
    pub max_price: f64,
    pub top_n: usize,
    pub max_results: usize,
    pub excluded_carrier: Option<String>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            origin: "LAX".to_string(),
            destination: "GLA".to_string(),
            departure_date: "2024-12-01".to_string(),
            return_date: Some("2024-12-08".to_string()),
            passengers: vec![PassengerType::Adult],
            cabin_class: CabinClass::Economy,
            max_price: 600.0,
            top_n: 5,
            max_results: 5,
            excluded_carrier: Some("Duffel Airways".to_string()),
        }
    }
}
