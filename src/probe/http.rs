//! HTTP probe: one bare GET per tick, bounded by a timeout.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use tracing::debug;

use super::ProbeSource;
use crate::data::ProbeOutcome;

/// Default probe timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes an endpoint with a plain GET.
///
/// Any HTTP response at all counts as reachable: an auth challenge from
/// the endpoint still proves the device behind it is powered. Only a
/// transport failure (timeout, DNS, refused connection) is a negative
/// outcome.
#[derive(Debug, Clone)]
pub struct HttpProbe {
    client: Client,
    url: String,
    description: String,
}

impl HttpProbe {
    /// Create a probe for `url` with the given per-request timeout.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let url = url.into();
        let description = format!("http: {url}");
        // Timeout failures surface as request errors, which map to
        // unreachable below; builder errors cannot occur for these options.
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            client,
            url,
            description,
        }
    }
}

#[async_trait]
impl ProbeSource for HttpProbe {
    async fn check(&mut self) -> ProbeOutcome {
        let reachable = match self.client.get(&self.url).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "probe answered");
                true
            }
            Err(e) => {
                debug!("probe failed: {e}");
                false
            }
        };
        ProbeOutcome {
            reachable,
            checked_at: Utc::now(),
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_description() {
        let probe = HttpProbe::new("http://192.0.2.1/", DEFAULT_TIMEOUT);
        assert_eq!(probe.description(), "http: http://192.0.2.1/");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_negative_outcome() {
        // TEST-NET-1 address with a tiny timeout: the request cannot
        // succeed, and must come back as data rather than an error.
        let mut probe = HttpProbe::new("http://192.0.2.1:9/", Duration::from_millis(50));
        let outcome = probe.check().await;
        assert!(!outcome.reachable);
    }
}
