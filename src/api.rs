use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::models::ProviderResponse;
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::debug;

const LOOKUP_PATH: &str = "api/v2/country,city";

/// HTTP client for the IP geolocation provider.
///
/// Holds the opaque API credential and issues
/// `GET <base>/api/v2/country,city?apiKey=..[&ipAddress=..]`.
#[derive(Clone)]
pub struct GeoProvider {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl GeoProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(ProviderError::Transport)?;

        let endpoint = format!("{}/{}", config.base_url.trim_end_matches('/'), LOOKUP_PATH);
        let endpoint = Url::parse(&endpoint).map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            api_key: config.api_key.clone(),
        })
    }

    /// Looks up `address`, or the caller's own address when `None`.
    ///
    /// Any non-2xx status is an error; the body is only decoded on success.
    pub async fn lookup(&self, address: Option<&str>) -> Result<ProviderResponse, ProviderError> {
        if self.api_key.trim().is_empty() {
            return Err(ProviderError::MissingApiKey);
        }

        let mut request = self
            .client
            .get(self.endpoint.clone())
            .query(&[("apiKey", self.api_key.as_str())]);
        if let Some(address) = address {
            request = request.query(&[("ipAddress", address)]);
        }

        debug!("Requesting geolocation for {}", address.unwrap_or("<own address>"));

        let res = request.send().await.map_err(ProviderError::Transport)?;
        let status = res.status();
        if !status.is_success() {
            return Err(ProviderError::Status(status));
        }

        res.json::<ProviderResponse>()
            .await
            .map_err(ProviderError::Decode)
    }
}
