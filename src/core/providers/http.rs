use std::time::Duration;
use tracing::debug;

use crate::error::{LookupError, NetworkError};

/// Shared HTTP client for every provider
///
/// Cloning is cheap; all clones share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, NetworkError> {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("lexget-cli v{}", version);

        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// GET `url` and return the body as text, bounded by `timeout` end to end
    pub async fn get_text(
        &self,
        word: &str,
        url: &str,
        timeout: Duration,
    ) -> Result<String, LookupError> {
        debug!("GET {} (timeout {:?})", url, timeout);

        let classify = |err: reqwest::Error| {
            if err.is_timeout() {
                LookupError::Timeout {
                    word: word.to_string(),
                    after: timeout,
                }
            } else {
                LookupError::Network(NetworkError::Http(err))
            }
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        if !status.is_success() {
            return Err(NetworkError::Status {
                status,
                url: url.to_string(),
            }
            .into());
        }

        response.text().await.map_err(classify)
    }
}
