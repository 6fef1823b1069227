//! Text-over-HTTP fetching behind a trait seam
//!
//! The resolution pipeline only ever needs "the text body of a URL". Keeping
//! that behind `TextFetcher` lets tests substitute canned responses and keeps
//! the reqwest/tokio plumbing in one place.

use std::time::Duration;

use thiserror::Error;

/// Timeout applied to every catalog and schema request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Trait for fetching the text content of a URL.
///
/// Implementations follow redirects and apply their own request timeout.
/// Callers treat any error as "content unavailable" and degrade; no fetch
/// failure propagates out of the pipeline.
pub trait TextFetcher: Send + Sync {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}

/// `TextFetcher` backed by reqwest.
///
/// Each call spins up a current-thread runtime and blocks on the request,
/// matching the pipeline's synchronous, call-scoped model. Resolutions are
/// infrequent enough that per-call runtime construction is not a concern.
pub struct HttpTextFetcher;

impl TextFetcher for HttpTextFetcher {
    fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        rt.block_on(async {
            let client = reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()?;

            let response = client.get(url).send().await?;
            if !response.status().is_success() {
                return Err(FetchError::Status(response.status()));
            }

            Ok(response.text().await?)
        })
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::collections::HashMap;

    /// Fetcher serving canned bodies keyed by URL substring.
    pub struct StaticFetcher {
        responses: HashMap<String, String>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self {
                responses: HashMap::new(),
            }
        }

        pub fn with(mut self, url_fragment: &str, body: &str) -> Self {
            self.responses
                .insert(url_fragment.to_string(), body.to_string());
            self
        }
    }

    impl TextFetcher for StaticFetcher {
        fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
            self.responses
                .iter()
                .find(|(fragment, _)| url.contains(fragment.as_str()))
                .map(|(_, body)| body.clone())
                .ok_or(FetchError::Status(reqwest::StatusCode::NOT_FOUND))
        }
    }

    /// Fetcher that fails every request, for transport-failure paths.
    pub struct FailingFetcher;

    impl TextFetcher for FailingFetcher {
        fn fetch_text(&self, _url: &str) -> Result<String, FetchError> {
            Err(FetchError::Status(
                reqwest::StatusCode::SERVICE_UNAVAILABLE,
            ))
        }
    }
}
