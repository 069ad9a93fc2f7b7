//! Where country data comes from.
//!
//! [`CountrySource`] is the fetch capability the service depends on.
//! [`HttpSource`] is the production implementation: one GET against the
//! configured upstream per call, no retries, no caching.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use tracing::{debug, error};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{Error, FetchError};

/// Fetches the raw upstream payload.
///
/// Implementations are shared by every in-flight request, so they must be
/// `Send + Sync`, and the returned future must be `Send` to run on the
/// multi-threaded runtime.
pub trait CountrySource: Send + Sync + 'static {
    fn fetch(&self) -> impl Future<Output = Result<Bytes, FetchError>> + Send;
}

/// Fetches the country list over HTTP.
///
/// Holds a single [`reqwest::Client`]; its connection pool is reused across
/// all requests.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    /// Builds the outbound client from configuration.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::new(builder.build()?, config.url.clone()))
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl CountrySource for HttpSource {
    async fn fetch(&self) -> Result<Bytes, FetchError> {
        let response = self.client.get(self.url.clone()).send().await.map_err(|e| {
            error!(url = %self.url, error = %e, "upstream request failed");
            FetchError::from(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %self.url, %status, "upstream returned an error status");
            return Err(FetchError::Status { status });
        }

        let body = response.bytes().await.map_err(|e| {
            error!(url = %self.url, error = %e, "reading upstream body failed");
            FetchError::from(e)
        })?;
        debug!(bytes = body.len(), "fetched upstream payload");
        Ok(body)
    }
}
