use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, info};

use crate::constants::{HTTP_TIMEOUT_SECS, USER_AGENT};
use crate::model::{decode_earthquakes, decode_fault_lines, EarthquakeFeature, FaultLineFeature};
use crate::settings::Settings;

/// Where the two GeoJSON feeds live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedConfig {
    pub earthquake_url: String,
    pub fault_lines_url: String,
}

impl From<&Settings> for FeedConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            earthquake_url: settings.earthquake_url.clone(),
            fault_lines_url: settings.fault_lines_url.clone(),
        }
    }
}

/// Decoded contents of both feeds from one fetch round
#[derive(Debug, Clone)]
pub struct FeedData {
    pub earthquakes: Vec<EarthquakeFeature>,
    pub fault_lines: Vec<FaultLineFeature>,
}

// Thin wrapper around a shared reqwest client
#[derive(Clone)]
pub struct FeedClient {
    client: reqwest::Client,
}

impl FeedClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", url))?;
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body from {}", url))?;
        Ok(body.to_vec())
    }

    pub async fn fetch_earthquakes(&self, url: &str) -> Result<Vec<EarthquakeFeature>> {
        let body = self.get_bytes(url).await?;
        decode_earthquakes(&body)
    }

    pub async fn fetch_fault_lines(&self, url: &str) -> Result<Vec<FaultLineFeature>> {
        let body = self.get_bytes(url).await?;
        decode_fault_lines(&body)
    }

    /// Fetches both feeds concurrently. Either failing fails the round.
    pub async fn fetch_all(&self, config: &FeedConfig) -> Result<FeedData> {
        let (earthquakes, fault_lines) = tokio::try_join!(
            self.fetch_earthquakes(&config.earthquake_url),
            self.fetch_fault_lines(&config.fault_lines_url)
        )?;

        info!(
            "🌐 Fetched {} earthquakes and {} fault lines",
            earthquakes.len(),
            fault_lines.len()
        );
        Ok(FeedData {
            earthquakes,
            fault_lines,
        })
    }
}
