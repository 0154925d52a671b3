use std::time::Duration;

use anyhow::Result;
use url::Url;

use super::types::Outcome;

/// Longest response body kept in a failure record, in characters
pub const BODY_SNIPPET_CHARS: usize = 512;

/// Performs one probe against an endpoint and classifies the outcome.
///
/// Implementations never return errors: every failure is an [`Outcome`].
#[async_trait::async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, endpoint: &Url) -> Outcome;
}

/// HTTP GET prober backed by a shared connection pool
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: reqwest::Client,
}

impl HttpProber {
    /// Build a prober whose requests give up after `probe_timeout`
    pub fn new(probe_timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(probe_timeout)
            .user_agent(concat!("uptimed/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    /// Wrap an already configured client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Prober for HttpProber {
    async fn probe(&self, endpoint: &Url) -> Outcome {
        let response = match self.client.get(endpoint.clone()).send().await {
            Ok(response) => response,
            Err(e) => return Outcome::transport_failure(classify_transport_error(&e)),
        };

        let status = response.status();
        if status.is_success() {
            return Outcome::Success;
        }

        match response.text().await {
            Ok(body) => Outcome::http_failure(status.as_u16(), snippet(&body)),
            Err(e) => Outcome::transport_failure(format!("could not read response body: {e}")),
        }
    }
}

fn classify_transport_error(error: &reqwest::Error) -> String {
    let kind = if error.is_timeout() {
        "timed out"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };

    // reqwest hides the interesting part (DNS, refused, reset) in the source chain
    let mut detail = error.to_string();
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }

    format!("{kind}: {detail}")
}

fn snippet(body: &str) -> String {
    match body.char_indices().nth(BODY_SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &body[..cut]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_keeps_short_bodies() {
        assert_eq!(snippet("service unavailable"), "service unavailable");
        assert_eq!(snippet(""), "");
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let body = "é".repeat(BODY_SNIPPET_CHARS + 10);
        let cut = snippet(&body);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), BODY_SNIPPET_CHARS + 3);
    }
}
