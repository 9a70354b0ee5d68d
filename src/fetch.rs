//! Page fetching
//!
//! One GET per page with a desktop browser user agent. Certificate checks stay
//! on unless the caller opts out for this client.

use crate::error::FetchError;
use clap::Args;
use std::time::Duration;
use tracing::debug;

pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    /// Skip TLS certificate validation
    pub accept_invalid_certs: bool,
    /// Whole-request timeout; the client default when `None`
    pub timeout: Option<Duration>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: BROWSER_USER_AGENT.to_string(),
            accept_invalid_certs: false,
            timeout: None,
        }
    }
}

#[derive(Args, Debug, Default)]
pub struct FetchArgs {
    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl FetchArgs {
    pub fn config(&self) -> FetchConfig {
        FetchConfig {
            accept_invalid_certs: self.insecure,
            timeout: self.timeout.map(Duration::from_secs),
            ..FetchConfig::default()
        }
    }
}

/// Accept only absolute http(s) URLs
pub fn parse_url(value: &str) -> Result<String, String> {
    let url = url::Url::parse(value).map_err(|e| format!("invalid URL: {}", e))?;
    match url.scheme() {
        "http" | "https" => Ok(value.to_string()),
        scheme => Err(format!("unsupported scheme: {}", scheme)),
    }
}

pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Fetch `url` and return the body. Any non-2xx status is an error.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        debug!(url, "fetching page");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        debug!(url, bytes = body.len(), "fetched page");
        Ok(body)
    }
}
