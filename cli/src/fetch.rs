//! One-shot HTTP fetch of the published `latest.json` export.

use std::time::Duration;

use rally_stats_discovery::load::{LATEST_RESOURCE, LoadError, parse_document};
use reqwest::Url;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use serde_json::Value;
use tracing::{debug, info};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Resolves `latest.json` against `base` the way a relative link is
/// resolved: `https://host/app/` and `https://host/app/index.html` both
/// yield `https://host/app/latest.json`.
pub fn latest_url(base: &str) -> Result<Url, LoadError> {
    let network = |detail: String| LoadError::Network {
        url: base.to_string(),
        detail,
    };
    let base = Url::parse(base).map_err(|err| network(format!("invalid URL: {err}")))?;
    base.join(LATEST_RESOURCE)
        .map_err(|err| network(format!("cannot resolve {LATEST_RESOURCE}: {err}")))
}

/// GETs `latest.json` with cache bypass and parses the body.
///
/// No retries: any failure is terminal and reported to the caller.
pub fn fetch_latest(base: &str) -> Result<Value, LoadError> {
    let url = latest_url(base)?;
    let network = |err: reqwest::Error| LoadError::Network {
        url: url.to_string(),
        detail: err.to_string(),
    };

    let client = reqwest::blocking::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .map_err(network)?;

    info!(url = %url, "Fetching latest export");
    let response = client
        .get(url.clone())
        .header(CACHE_CONTROL, "no-cache")
        .header(PRAGMA, "no-cache")
        .send()
        .map_err(network)?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Http {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().map_err(network)?;
    debug!(url = %url, bytes = body.len(), "Fetched latest export");
    parse_document(&body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_url_resolves_against_directory() {
        let url = latest_url("https://scores.example.org/app/").unwrap();
        assert_eq!(url.as_str(), "https://scores.example.org/app/latest.json");
    }

    #[test]
    fn test_latest_url_replaces_page_name() {
        let url = latest_url("https://scores.example.org/app/index.html").unwrap();
        assert_eq!(url.as_str(), "https://scores.example.org/app/latest.json");
    }

    #[test]
    fn test_latest_url_rejects_garbage() {
        let err = latest_url("not a url").unwrap_err();
        assert!(matches!(err, LoadError::Network { .. }));
        assert!(err.to_string().contains("invalid URL"));
    }

    /// A localhost port nothing listens on: bound, read back, released.
    fn closed_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_fetch_from_unreachable_host_is_network_error() {
        let base = format!("http://127.0.0.1:{}/", closed_port());
        let err = fetch_latest(&base).unwrap_err();
        assert!(matches!(err, LoadError::Network { .. }));
        assert!(err.to_string().contains(&format!("{base}latest.json")));
    }
}
