//! Random quote client.
//!
//! One `GET {base_url}random` per call, no retry. The service answers
//! with a JSON array of `{q, a}` objects; only the first one is used.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::FetchError;
use crate::quote::{Quote, WireQuote};

const RANDOM_PATH: &str = "random";

/// Anything that can produce a random quote.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_random_quote(&self) -> Result<Quote, FetchError>;
}

pub struct QuoteClient {
    endpoint: Url,
    client: Client,
}

impl QuoteClient {
    pub fn new(config: &ApiConfig) -> Result<Self, FetchError> {
        let endpoint = random_endpoint(&config.base_url)?;

        let mut builder = Client::builder()
            .user_agent(concat!("quotify-rs/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl QuoteSource for QuoteClient {
    async fn fetch_random_quote(&self) -> Result<Quote, FetchError> {
        debug!("GET {}", self.endpoint);

        let quotes: Vec<WireQuote> = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let first = quotes.into_iter().next().ok_or(FetchError::Empty)?;
        Ok(first.into())
    }
}

/// Resolve the relative `random` path against the base URL. A missing
/// trailing slash would make `join` replace the last path segment.
fn random_endpoint(base_url: &str) -> Result<Url, FetchError> {
    let mut base = base_url.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    Url::parse(&base)
        .and_then(|b| b.join(RANDOM_PATH))
        .map_err(|e| FetchError::Network(format!("invalid base URL '{base_url}': {e}")))
}
