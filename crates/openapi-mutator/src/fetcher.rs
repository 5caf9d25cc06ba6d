//! Downloading the source document

use std::time::Duration;

use tracing::{debug, info};
use url::Url;

use crate::error::{Result, UpdateError};

const ACCEPT: &str = "application/yaml, application/json, text/yaml";

/// HTTP client for the source document
pub struct SpecFetcher {
    client: reqwest::Client,
}

impl SpecFetcher {
    /// Create a fetcher whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| UpdateError::FetchError(e.to_string()))?;

        Ok(Self { client })
    }

    /// Fetch the raw document text. Any non-2xx status is an error.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        let parsed = Url::parse(url).map_err(|e| UpdateError::InvalidUrl(format!("{url}: {e}")))?;

        info!("Downloading OpenAPI spec from {}", url);

        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .send()
            .await
            .map_err(|e| UpdateError::FetchError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpdateError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let content = response
            .text()
            .await
            .map_err(|e| UpdateError::FetchError(e.to_string()))?;

        debug!("Downloaded {} bytes", content.len());
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_rejects_invalid_url() {
        let fetcher = SpecFetcher::new(Duration::from_secs(1)).unwrap();

        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert!(matches!(err, UpdateError::InvalidUrl(_)));
        assert_eq!(err.exit_code(), 1);
    }
}
