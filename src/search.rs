// Flight search client: builds the offer request and sends it to the
// offer-search API in a single call.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, SearchConfig, SearchSettings};

#[derive(Error, Debug)]
pub enum SearchError {
    // Transport failures, rejected requests and undecodable bodies all land
    // here; callers only need to know the response is unusable.
    #[error("Invalid response from flight search: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassengerType {
    Adult,
    Child,
    InfantWithoutSeat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchSlice {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Passenger {
    #[serde(rename = "type")]
    pub passenger_type: PassengerType,
}

// Body of one offer request. Built once per run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(skip)]
    pub origin: String,
    #[serde(skip)]
    pub destination: String,
    pub slices: Vec<SearchSlice>,
    pub passengers: Vec<Passenger>,
    pub cabin_class: CabinClass,
}

impl SearchRequest {
    // Outbound slice, plus the mirrored return slice when a return date is set
    pub fn from_settings(settings: &SearchSettings) -> Self {
        let mut slices = vec![SearchSlice {
            origin: settings.origin.clone(),
            destination: settings.destination.clone(),
            departure_date: settings.departure_date.clone(),
        }];
        if let Some(return_date) = &settings.return_date {
            slices.push(SearchSlice {
                origin: settings.destination.clone(),
                destination: settings.origin.clone(),
                departure_date: return_date.clone(),
            });
        }

        SearchRequest {
            origin: settings.origin.clone(),
            destination: settings.destination.clone(),
            slices,
            passengers: settings
                .passengers
                .iter()
                .map(|&passenger_type| Passenger { passenger_type })
                .collect(),
            cabin_class: settings.cabin_class,
        }
    }

    // Request envelope expected by the API
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::json!({ "data": self })
    }
}

// Departure dates for the `days` days after `today`, formatted YYYY-MM-DD
pub fn upcoming_departure_dates(today: NaiveDate, days: u32) -> Vec<String> {
    (1..=i64::from(days))
        .map(|offset| (today + Duration::days(offset)).format("%Y-%m-%d").to_string())
        .collect()
}

#[async_trait]
pub trait FlightSearchApi: Send + Sync {
    // Send one search and return the decoded response body
    async fn search(&self, request: &SearchRequest) -> Result<serde_json::Value, SearchError>;
}

pub struct DuffelClient {
    config: SearchConfig,
    http: reqwest::Client,
}

impl DuffelClient {
    pub fn new(config: SearchConfig) -> Result<Self, ConfigError> {
        if config.access_token.trim().is_empty() {
            return Err(ConfigError::MissingVariable("DUFFEL_API_KEY"));
        }
        Ok(Self {
            config,
            http: reqwest::Client::new(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/air/offer_requests",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn headers(&self) -> Result<HeaderMap, SearchError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.config.access_token))
            .map_err(|e| SearchError::InvalidResponse(format!("bad credential header: {}", e)))?;
        let version = HeaderValue::from_str(&self.config.api_version)
            .map_err(|e| SearchError::InvalidResponse(format!("bad version header: {}", e)))?;

        headers.insert(AUTHORIZATION, bearer);
        headers.insert("duffel-version", version);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }
}

#[async_trait]
impl FlightSearchApi for DuffelClient {
    async fn search(&self, request: &SearchRequest) -> Result<serde_json::Value, SearchError> {
        info!(
            origin = %request.origin,
            destination = %request.destination,
            slices = request.slices.len(),
            "Fetching flight data"
        );

        let response = self
            .http
            .post(self.endpoint())
            .headers(self.headers()?)
            .json(&request.to_body())
            .send()
            .await
            .map_err(|e| SearchError::InvalidResponse(format!("network error: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            // Error bodies are not always JSON (gateway pages), keep the status regardless
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|body| {
                    body.pointer("/errors/0/message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| error_snippet(&text));
            return Err(SearchError::InvalidResponse(format!(
                "{} - {}",
                status.as_u16(),
                message
            )));
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            SearchError::InvalidResponse(format!("{} - undecodable body: {}", status.as_u16(), e))
        })?;

        debug!(status = status.as_u16(), "Flight search responded");
        Ok(body)
    }
}

// First line of a non-JSON error body, cut short for the log
fn error_snippet(text: &str) -> String {
    let line = text.lines().map(str::trim).find(|l| !l.is_empty());
    match line {
        Some(line) => line.chars().take(120).collect(),
        None => "no error message".to_string(),
    }
}
