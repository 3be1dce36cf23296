use crate::error::Result;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36";

/// A completed HTTP exchange as seen by the pipeline.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    pub body: String,
    /// URL after redirects; relative links on the page resolve against it.
    pub final_url: String,
}

impl FetchResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Thin wrapper over a pooled reqwest client.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs((timeout_secs / 2).max(1)))
            .pool_max_idle_per_host(50)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Duration::from_secs(60))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    pub async fn fetch(&self, url: &str, headers: &[(&str, &str)]) -> Result<FetchResponse> {
        debug!("Fetching {}", url);

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        let body = response.text().await?;

        Ok(FetchResponse {
            status,
            body,
            final_url,
        })
    }

    /// Fetch and keep only successful responses.
    ///
    /// Transport errors and non-2xx statuses are logged and collapse to
    /// `None`, which every pipeline stage treats like missing markup.
    pub async fn fetch_ok(&self, url: &str, headers: &[(&str, &str)]) -> Option<FetchResponse> {
        match self.fetch(url, headers).await {
            Ok(response) if response.is_success() => Some(response),
            Ok(response) => {
                warn!("{} returned status {}", url, response.status);
                None
            }
            Err(e) => {
                warn!("Fetch error for {}: {}", url, e);
                None
            }
        }
    }
}
