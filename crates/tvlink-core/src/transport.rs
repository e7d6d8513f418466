//! HTTP transport configuration
//!
//! IPTV panels are picky about request headers, so every load carries a
//! fixed header set plus the caller's user agent and referer.

use crate::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// User agent sent when the caller does not provide one
pub const DEFAULT_USER_AGENT: &str = "IPTVSmartersPro";

/// Transport settings the engine uses to fetch media
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// User agent used when the intent carries none
    pub default_user_agent: String,
    /// Headers sent with every request, in order
    pub base_headers: Vec<(String, String)>,
    /// Connect timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Follow http <-> https redirects
    pub allow_cross_protocol_redirects: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            default_user_agent: DEFAULT_USER_AGENT.to_string(),
            base_headers: vec![
                ("Connection".to_string(), "keep-alive".to_string()),
                ("Accept".to_string(), "*/*".to_string()),
                (
                    "Accept-Language".to_string(),
                    "ar-SA,ar;q=0.9,en-US;q=0.8,en;q=0.7".to_string(),
                ),
                ("Icy-MetaData".to_string(), "1".to_string()),
            ],
            connect_timeout_ms: 15_000,
            read_timeout_ms: 15_000,
            allow_cross_protocol_redirects: true,
        }
    }
}

impl TransportConfig {
    /// Resolve the request settings for one load
    pub fn for_request(&self, user_agent: Option<&str>, referer: Option<&str>) -> RequestProfile {
        let mut headers = self.base_headers.clone();
        if let Some(referer) = referer.filter(|r| !r.is_empty()) {
            headers.push(("Referer".to_string(), referer.to_string()));
        }

        RequestProfile {
            user_agent: user_agent.unwrap_or(&self.default_user_agent).to_string(),
            headers,
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            read_timeout: Duration::from_millis(self.read_timeout_ms),
            allow_cross_protocol_redirects: self.allow_cross_protocol_redirects,
        }
    }
}

/// Fully resolved transport settings for a single source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestProfile {
    pub user_agent: String,
    pub headers: Vec<(String, String)>,
    #[serde(with = "duration_ms")]
    pub connect_timeout: Duration,
    #[serde(with = "duration_ms")]
    pub read_timeout: Duration,
    pub allow_cross_protocol_redirects: bool,
}

impl RequestProfile {
    /// Look up a header value (case-insensitive name)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Headers as a `reqwest` header map
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (name, value) in &self.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| crate::Error::InvalidConfig(format!("header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| crate::Error::InvalidConfig(format!("header value {value}: {e}")))?;
            map.insert(name, value);
        }
        Ok(map)
    }

    /// Build an HTTP client that sends requests the way the engine would
    pub fn build_client(&self) -> Result<Client> {
        // reqwest follows scheme-changing redirects by default
        let redirect = if self.allow_cross_protocol_redirects {
            reqwest::redirect::Policy::limited(10)
        } else {
            reqwest::redirect::Policy::custom(|attempt| {
                let same_scheme = attempt
                    .previous()
                    .last()
                    .map(|prev| prev.scheme() == attempt.url().scheme())
                    .unwrap_or(true);
                if same_scheme && attempt.previous().len() < 10 {
                    attempt.follow()
                } else {
                    attempt.stop()
                }
            })
        };

        debug!(user_agent = %self.user_agent, headers = self.headers.len(), "Building HTTP client");

        let client = Client::builder()
            .user_agent(self.user_agent.clone())
            .default_headers(self.header_map()?)
            .connect_timeout(self.connect_timeout)
            .read_timeout(self.read_timeout)
            .redirect(redirect)
            .build()?;
        Ok(client)
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_user_agent() {
        let profile = TransportConfig::default().for_request(None, None);
        assert_eq!(profile.user_agent, "IPTVSmartersPro");
        assert_eq!(profile.connect_timeout, Duration::from_millis(15_000));
        assert_eq!(profile.read_timeout, Duration::from_millis(15_000));
        assert!(profile.allow_cross_protocol_redirects);
    }

    #[test]
    fn test_fixed_headers() {
        let profile = TransportConfig::default().for_request(Some("VLC/3.0"), None);
        assert_eq!(profile.user_agent, "VLC/3.0");
        assert_eq!(profile.header("connection"), Some("keep-alive"));
        assert_eq!(profile.header("Accept"), Some("*/*"));
        assert_eq!(
            profile.header("Accept-Language"),
            Some("ar-SA,ar;q=0.9,en-US;q=0.8,en;q=0.7")
        );
        assert_eq!(profile.header("Icy-MetaData"), Some("1"));
        assert_eq!(profile.header("Referer"), None);
    }

    #[test]
    fn test_referer_only_when_non_empty() {
        let config = TransportConfig::default();
        assert_eq!(config.for_request(None, Some("")).header("Referer"), None);
        assert_eq!(
            config.for_request(None, Some("https://panel.example/")).header("Referer"),
            Some("https://panel.example/")
        );
    }

    #[test]
    fn test_header_map() {
        let profile = TransportConfig::default().for_request(None, Some("https://a.example/"));
        let map = profile.header_map().unwrap();
        assert_eq!(map.len(), 5);
        assert_eq!(map.get("icy-metadata").unwrap(), "1");
    }

    #[test]
    fn test_build_client() {
        let profile = TransportConfig::default().for_request(None, None);
        assert!(profile.build_client().is_ok());
    }
}
