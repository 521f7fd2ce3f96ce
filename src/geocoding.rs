//! # Geocoding Module
//!
//! Client for the DeQua address API. A lookup is a single best-effort
//! request: every failure collapses into [`AddressResult::NotFound`] and the
//! underlying reason is only logged.

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// `ResponseCode` value reported by the API for a successful lookup
pub const RESPONSE_CODE_OK: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of an address lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AddressResult {
    Found(Coordinates),
    NotFound,
}

/// Reasons a lookup did not produce coordinates
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("API reported response code {0}")]
    ResponseCode(i64),
    #[error("response has no coordinates")]
    MissingData,
}

/// Anything that can turn a free-text address into coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn lookup(&self, address: &str) -> AddressResult;
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    #[serde(rename = "ResponseCode")]
    response_code: i64,
    #[serde(rename = "ResponseData")]
    response_data: Option<ResponseData>,
}

#[derive(Debug, Deserialize)]
struct ResponseData {
    latitude: f64,
    longitude: f64,
}

/// HTTP client for `GET /api/address`
pub struct DequaClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl DequaClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }

    /// Perform the request and decode the payload
    pub async fn request(&self, address: &str) -> Result<Coordinates, LookupError> {
        let response = self
            .http
            .get(&self.endpoint)
            .bearer_auth(&self.token)
            .form(&[("address", address)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status));
        }

        let body: AddressResponse = response.json().await?;
        if body.response_code != RESPONSE_CODE_OK {
            return Err(LookupError::ResponseCode(body.response_code));
        }

        let data = body.response_data.ok_or(LookupError::MissingData)?;
        Ok(Coordinates {
            latitude: data.latitude,
            longitude: data.longitude,
        })
    }
}

#[async_trait]
impl Geocoder for DequaClient {
    async fn lookup(&self, address: &str) -> AddressResult {
        debug!(address, "Looking up address");

        match self.request(address).await {
            Ok(coordinates) => {
                info!(
                    address,
                    latitude = coordinates.latitude,
                    longitude = coordinates.longitude,
                    "Address found"
                );
                AddressResult::Found(coordinates)
            }
            Err(e) => {
                warn!(address, error = %e, "Address lookup failed");
                AddressResult::NotFound
            }
        }
    }
}

/// Link that opens `address` on the DeQua website
pub fn map_url(base_url: &str, address: &str) -> anyhow::Result<Url> {
    let url = Url::parse(&format!(
        "{}?partenza={}",
        base_url,
        urlencoding::encode(address)
    ))?;
    Ok(url)
}
