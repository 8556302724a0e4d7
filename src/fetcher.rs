use crate::types::{FetchConfig, PipelineError, Result};
use backoff::{backoff::Backoff, exponential::ExponentialBackoff};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// HTTP retrieval for feed documents. Transient failures (transport errors,
/// HTTP 5xx) are retried with exponential backoff; other non-2xx statuses
/// fail immediately.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, config }
    }

    /// Retrieve one feed document as text.
    pub async fn fetch(&self, url: &str) -> Result<String> {
        debug!("Fetching feed: {}", url);

        let mut backoff: ExponentialBackoff<backoff::SystemClock> = ExponentialBackoff {
            current_interval: Duration::from_millis(self.config.retry_delay_ms),
            initial_interval: Duration::from_millis(self.config.retry_delay_ms),
            max_interval: Duration::from_millis(self.config.retry_delay_ms * 8),
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match self.client.get(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        let body = response.text().await?;
                        debug!("Fetched {} ({} bytes)", url, body.len());
                        return Ok(body);
                    }

                    let err = PipelineError::HttpStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    };
                    // Client errors won't get better on retry.
                    if !status.is_server_error() {
                        return Err(err);
                    }
                    last_error = Some(err);
                }
                Err(e) => {
                    last_error = Some(PipelineError::Http(e));
                }
            }

            if attempt < self.config.max_retries {
                if let Some(delay) = backoff.next_backoff() {
                    warn!("Attempt {} failed for {}, retrying in {:?}", attempt + 1, url, delay);
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| PipelineError::General(format!("fetch failed for {}", url))))
    }
}
