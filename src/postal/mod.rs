//! Postal code lookup used to autofill district and state at registration.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_POSTAL_API_URL: &str = "https://api.postalpincode.in";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostalPlace {
    pub district: String,
    pub state: String,
    pub country: String,
}

#[async_trait]
pub trait PostalLookup: Send + Sync {
    /// Resolves a 6 digit postal code to a place.
    /// Returns Ok(None) when the code is unknown to the upstream service.
    async fn lookup(&self, postal_code: &str) -> Result<Option<PostalPlace>>;
}

#[derive(Deserialize)]
struct PincodeResponse {
    #[serde(rename = "Status")]
    status: String,
    #[serde(rename = "PostOffice")]
    post_offices: Option<Vec<PostOffice>>,
}

#[derive(Deserialize)]
struct PostOffice {
    #[serde(rename = "District")]
    district: String,
    #[serde(rename = "State")]
    state: String,
    #[serde(rename = "Country")]
    country: String,
}

fn parse_pincode_response(responses: Vec<PincodeResponse>) -> Option<PostalPlace> {
    let response = responses.into_iter().next()?;
    if response.status != "Success" {
        return None;
    }
    let office = response.post_offices?.into_iter().next()?;
    Some(PostalPlace {
        district: office.district,
        state: office.state,
        country: office.country,
    })
}

/// Client for the postalpincode.in API.
pub struct HttpPostalClient {
    client: reqwest::Client,
    base_url: String,
}

impl HttpPostalClient {
    pub fn new(base_url: String, timeout_sec: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = base_url.trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl PostalLookup for HttpPostalClient {
    async fn lookup(&self, postal_code: &str) -> Result<Option<PostalPlace>> {
        let url = format!("{}/pincode/{}", self.base_url, postal_code);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to connect to postal lookup service")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Postal lookup for {} failed with status: {}",
                postal_code,
                response.status()
            );
        }

        let responses: Vec<PincodeResponse> = response
            .json()
            .await
            .context("Failed to parse postal lookup response")?;

        Ok(parse_pincode_response(responses))
    }
}

/// No-op lookup for deployments without network access and for tests.
pub struct NoOpPostalLookup;

#[async_trait]
impl PostalLookup for NoOpPostalLookup {
    async fn lookup(&self, _postal_code: &str) -> Result<Option<PostalPlace>> {
        Ok(None)
    }
}
