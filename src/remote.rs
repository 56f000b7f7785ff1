//! HTTP client for the remote JSON bin.
//!
//! Each call is a single request: no retries and no timeouts beyond the
//! transport defaults. Failures are returned to the caller unchanged.
use log::{debug, error, info, trace};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Client, RequestBuilder, Response, StatusCode,
};

use crate::{
    BinEnvelope, BinMetadata, BinPayload, Config, FetchOutcome, Quote, QuoteError, Result,
};

const BIN_NAME_HEADER: &str = "X-Bin-Name";

/// Stateless client for one bin API endpoint.
#[derive(Clone)]
pub struct BinClient {
    client: Client,
    base_url: String,
    access_key_header: String,
    access_key: Option<String>,
    bin_name: Option<String>,
}

impl BinClient {
    pub fn new(config: &Config) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_key_header: config.access_key_header.clone(),
            access_key: config.access_key.clone(),
            bin_name: config.bin_name.clone(),
        }
    }

    /// Whether an access key is available to authorize requests.
    pub fn has_access_key(&self) -> bool {
        self.access_key.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET {base}/{bin}/latest`. A 404 is reported as [`FetchOutcome::NotFound`].
    pub async fn fetch_latest(&self, bin_id: &str) -> Result<FetchOutcome> {
        let url = format!("{}/{}/latest", self.base_url, bin_id);
        debug!("Fetching bin {}", bin_id);

        let response = self.authorized(self.client.get(&url))?.send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            info!("Bin {} does not exist yet", bin_id);
            return Ok(FetchOutcome::NotFound);
        }

        let envelope = Self::read_envelope(response).await?;
        let quotes = envelope.record.map(|record| record.quotes).unwrap_or_default();
        debug!("Fetched {} quotes from bin {}", quotes.len(), bin_id);
        Ok(FetchOutcome::Found(quotes))
    }

    /// `PUT {base}/{bin}` with the full collection.
    pub async fn replace(&self, bin_id: &str, quotes: &[Quote]) -> Result<BinMetadata> {
        let url = format!("{}/{}", self.base_url, bin_id);
        debug!("Replacing bin {} with {} quotes", bin_id, quotes.len());

        let response = self
            .authorized(self.client.put(&url))?
            .json(&BinPayload { quotes })
            .send()
            .await?;

        let envelope = Self::read_envelope(response).await?;
        Ok(envelope.metadata.unwrap_or_default())
    }

    /// `POST {base}` creating a new bin. The returned metadata always carries the new id.
    pub async fn create(&self, quotes: &[Quote]) -> Result<BinMetadata> {
        debug!("Creating new bin with {} quotes", quotes.len());

        let mut request = self.authorized(self.client.post(&self.base_url))?;
        if let Some(name) = &self.bin_name {
            request = request.header(BIN_NAME_HEADER, name);
        }

        let response = request.json(&BinPayload { quotes }).send().await?;
        let metadata = Self::read_envelope(response).await?.metadata.unwrap_or_default();

        match metadata.id.as_deref() {
            Some(id) if !id.is_empty() => {
                info!("Created bin {}", id);
                Ok(metadata)
            }
            _ => Err(QuoteError::MalformedResponse {
                message: "create response did not include a bin id".to_string(),
            }),
        }
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let access_key = self
            .access_key
            .as_deref()
            .ok_or_else(|| QuoteError::ConfigurationMissing {
                setting: "access key".to_string(),
            })?;

        let name = HeaderName::from_bytes(self.access_key_header.as_bytes()).map_err(|e| {
            QuoteError::ConfigError {
                message: format!("invalid access key header name: {}", e),
            }
        })?;
        let value = HeaderValue::from_str(access_key).map_err(|e| QuoteError::ConfigError {
            message: format!("invalid access key: {}", e),
        })?;
        headers.insert(name, value);
        Ok(headers)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(request.headers(self.headers()?))
    }

    /// Maps non-success statuses to [`QuoteError::RemoteFailure`] and parses the envelope.
    async fn read_envelope(response: Response) -> Result<BinEnvelope> {
        let status = response.status();
        let body = response.text().await?;
        trace!("Remote store responded {} with {} bytes", status, body.len());

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|value| {
                    value
                        .get("message")
                        .and_then(|m| m.as_str())
                        .map(str::to_string)
                })
                .or_else(|| status.canonical_reason().map(str::to_string))
                .unwrap_or_else(|| "unknown error".to_string());
            error!("Remote store returned {}: {}", status, message);
            return Err(QuoteError::RemoteFailure {
                status: status.as_u16(),
                message,
            });
        }

        if body.trim().is_empty() {
            return Ok(BinEnvelope::default());
        }
        serde_json::from_str(&body).map_err(|e| QuoteError::MalformedResponse {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_with_key(key: Option<&str>) -> BinClient {
        BinClient::new(&Config {
            base_url: "http://localhost:1/b/".to_string(),
            access_key: key.map(str::to_string),
            ..Config::default()
        })
    }

    #[test]
    fn test_base_url_is_trimmed() {
        assert_eq!(client_with_key(None).base_url(), "http://localhost:1/b");
    }

    #[test]
    fn test_headers_carry_access_key() {
        let headers = client_with_key(Some("k")).headers().unwrap();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get("x-access-key").unwrap(), "k");
    }

    #[test]
    fn test_headers_require_access_key() {
        assert!(matches!(
            client_with_key(None).headers(),
            Err(QuoteError::ConfigurationMissing { .. })
        ));
    }
}
