use log::{debug, warn};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::FetchConfig;
use crate::error::ChefError;

/// Gateway statuses worth another attempt
const RETRY_STATUSES: &[u16] = &[502, 503, 504, 522, 524];

pub struct RequestFetcher {
    client: Client,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl RequestFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, ChefError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            retry_attempts: config.retry_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// GET `url` and return the body, retrying gateway errors with a delay
    /// that grows with each attempt
    pub async fn fetch(&self, url: &str) -> Result<String, ChefError> {
        let mut attempt = 1;
        loop {
            debug!(
                "Fetching {} (attempt {}/{})",
                url, attempt, self.retry_attempts
            );
            let response = self.client.get(url).send().await?;
            let status = response.status();

            if status.is_success() {
                return Ok(response.text().await?);
            }
            if !is_retryable(status) || attempt >= self.retry_attempts {
                return Err(ChefError::Extraction(format!(
                    "{} returned status {}",
                    url, status
                )));
            }

            warn!("{} returned {}, retrying", url, status);
            sleep(self.retry_delay * attempt).await;
            attempt += 1;
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    RETRY_STATUSES.contains(&status.as_u16())
}
