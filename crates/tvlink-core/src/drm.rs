//! DRM - key material resolution
//!
//! A play request carries at most one piece of key material. It is either:
//! - a license server URL (anything starting with `http`), or
//! - an inline clear-key, `keyId:keyValue` or a bare key value.
//!
//! Inline keys are turned into a clear-key license document the engine can
//! load locally, so no license round-trip happens:
//!
//! ```text
//! "abc123:deadbeef"
//!        │
//!        ├── kid  hex "abc123"   ─► base64url "q8Ej"
//!        └── key  hex "deadbeef" ─► base64url "3q2-7w"
//!
//! {"keys":[{"kty":"oct","k":"3q2-7w","kid":"q8Ej"}],"type":"temporary"}
//! ```

use crate::error::DrmError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

/// System id the engine uses for the clear-key scheme
pub const CLEARKEY_SYSTEM_ID: Uuid = Uuid::from_u128(0xe2719d58_a985_b3c9_781a_b030af78d30e);

/// DRM part of a play request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrmDescriptor {
    /// License server URL or inline key
    pub key: String,
}

impl DrmDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Resolve the descriptor into an engine configuration
    pub fn resolve(&self) -> Result<Option<DrmConfig>, DrmError> {
        resolve_drm(&self.key)
    }

    /// Canonical form used to decide whether two descriptors describe the
    /// same protection
    pub fn normalized(&self) -> String {
        let material = self.key.trim();
        if material.starts_with("http") {
            return material.to_string();
        }
        material
            .split(':')
            .map(|part| {
                let clean = strip_separators(part);
                if is_hex(&clean) {
                    clean.to_ascii_lowercase()
                } else {
                    clean
                }
            })
            .collect::<Vec<_>>()
            .join(":")
    }
}

impl PartialEq for DrmDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl Eq for DrmDescriptor {}

/// DRM configuration handed to the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DrmConfig {
    /// Keys are fetched from a license server
    LicenseServer {
        license_url: Url,
        multi_session: bool,
        /// Use `license_url` even when the stream references another server
        force_default_license_url: bool,
    },
    /// Keys are supplied inline
    ClearKey {
        multi_session: bool,
        license: ClearKeyLicense,
    },
}

impl DrmConfig {
    /// DRM scheme the engine should instantiate
    pub fn system_id(&self) -> Uuid {
        CLEARKEY_SYSTEM_ID
    }

    pub fn is_license_server(&self) -> bool {
        matches!(self, DrmConfig::LicenseServer { .. })
    }
}

/// Clear-key license document (JSON Web Key set)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClearKeyLicense {
    pub keys: Vec<JsonWebKey>,
    #[serde(rename = "type")]
    pub license_type: String,
}

/// Single symmetric key entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonWebKey {
    pub kty: String,
    /// Key value, base64url without padding
    pub k: String,
    /// Key id, base64url without padding
    pub kid: String,
}

impl ClearKeyLicense {
    /// License holding one temporary key
    pub fn single(key: &[u8], key_id: &[u8]) -> Self {
        Self {
            keys: vec![JsonWebKey {
                kty: "oct".to_string(),
                k: URL_SAFE_NO_PAD.encode(key),
                kid: URL_SAFE_NO_PAD.encode(key_id),
            }],
            license_type: "temporary".to_string(),
        }
    }

    pub fn to_json(&self) -> Result<String, DrmError> {
        serde_json::to_string(self).map_err(|e| DrmError::Encode(e.to_string()))
    }

    /// Document bytes as the engine's local license callback expects them
    pub fn to_bytes(&self) -> Result<Vec<u8>, DrmError> {
        self.to_json().map(String::into_bytes)
    }
}

/// Turn raw key material into a DRM configuration.
///
/// Empty material means the stream is not protected.
pub fn resolve_drm(key_material: &str) -> Result<Option<DrmConfig>, DrmError> {
    let material = key_material.trim();
    if material.is_empty() {
        return Ok(None);
    }

    if material.starts_with("http") {
        let license_url =
            Url::parse(material).map_err(|e| DrmError::InvalidLicenseUrl(e.to_string()))?;
        return Ok(Some(DrmConfig::LicenseServer {
            license_url,
            multi_session: true,
            force_default_license_url: true,
        }));
    }

    // Fields past the second `:` are ignored
    let mut parts = material.split(':');
    let (key_id, key) = match (parts.next(), parts.next()) {
        (Some(key_id), Some(key)) => (key_id, key),
        (Some(key), None) => ("", key),
        _ => ("", ""),
    };

    let key = decode_component("key", key)?;
    if key.is_empty() {
        return Err(DrmError::EmptyKey);
    }
    let key_id = decode_component("kid", key_id)?;

    Ok(Some(DrmConfig::ClearKey {
        multi_session: true,
        license: ClearKeyLicense::single(&key, &key_id),
    }))
}

/// Hex components are decoded, anything else is taken as raw bytes.
///
/// Digits are read in pairs; a trailing odd digit becomes a byte of its own.
fn decode_component(field: &'static str, raw: &str) -> Result<Vec<u8>, DrmError> {
    let clean = strip_separators(raw);
    if !is_hex(&clean) {
        return Ok(clean.into_bytes());
    }

    let malformed = |reason: String| DrmError::MalformedHex { field, reason };
    let paired = clean.len() - clean.len() % 2;
    let mut bytes = hex::decode(&clean[..paired]).map_err(|e| malformed(e.to_string()))?;
    if paired < clean.len() {
        let last = u8::from_str_radix(&clean[paired..], 16).map_err(|e| malformed(e.to_string()))?;
        bytes.push(last);
    }
    Ok(bytes)
}

fn strip_separators(raw: &str) -> String {
    raw.trim().chars().filter(|c| *c != ' ' && *c != '-').collect()
}

fn is_hex(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clear_key(config: Option<DrmConfig>) -> JsonWebKey {
        match config {
            Some(DrmConfig::ClearKey { license, .. }) => license.keys[0].clone(),
            other => panic!("expected clear-key config, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_material_is_unprotected() {
        assert_eq!(resolve_drm("").unwrap(), None);
        assert_eq!(resolve_drm("   ").unwrap(), None);
    }

    #[test]
    fn test_license_server() {
        let config = resolve_drm("http://lic.example/license").unwrap().unwrap();
        match config {
            DrmConfig::LicenseServer {
                license_url,
                multi_session,
                force_default_license_url,
            } => {
                assert_eq!(license_url.as_str(), "http://lic.example/license");
                assert!(multi_session);
                assert!(force_default_license_url);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_invalid_license_url() {
        assert!(matches!(
            resolve_drm("httpnotaurl"),
            Err(DrmError::InvalidLicenseUrl(_))
        ));
    }

    #[test]
    fn test_hex_key_pair() {
        let jwk = clear_key(resolve_drm("abc123:deadbeef").unwrap());
        assert_eq!(jwk.kty, "oct");
        assert_eq!(jwk.kid, "q8Ej");
        assert_eq!(jwk.k, "3q2-7w");
    }

    #[test]
    fn test_bare_key_has_empty_kid() {
        let jwk = clear_key(resolve_drm("deadbeef").unwrap());
        assert_eq!(jwk.kid, "");
        assert_eq!(jwk.k, "3q2-7w");
    }

    #[test]
    fn test_raw_key_bytes() {
        let jwk = clear_key(resolve_drm("mykey").unwrap());
        assert_eq!(jwk.k, "bXlrZXk");
    }

    #[test]
    fn test_uuid_style_key_id() {
        let jwk = clear_key(
            resolve_drm("01234567-89ab-cdef-0123-456789abcdef:deadbeef").unwrap(),
        );
        assert_eq!(jwk.kid, "ASNFZ4mrze8BI0VniavN7w");
    }

    #[test]
    fn test_odd_length_hex_keeps_last_digit() {
        // ab, 0c
        let jwk = clear_key(resolve_drm("abc").unwrap());
        assert_eq!(jwk.k, "qww");
        let jwk = clear_key(resolve_drm("f:deadbeef").unwrap());
        assert_eq!(jwk.kid, "Dw");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let jwk = clear_key(resolve_drm("a1:b2:c3").unwrap());
        assert_eq!(jwk.kid, "oQ");
        assert_eq!(jwk.k, "sg");
        assert_eq!(resolve_drm("abc123:deadbeef:ff"), resolve_drm("abc123:deadbeef"));
    }

    #[test]
    fn test_malformed_material() {
        assert_eq!(resolve_drm("abcd:"), Err(DrmError::EmptyKey));
        assert_eq!(resolve_drm(":"), Err(DrmError::EmptyKey));
    }

    #[test]
    fn test_license_document() {
        let license = ClearKeyLicense::single(&[0xde, 0xad, 0xbe, 0xef], &[0xab, 0xc1, 0x23]);
        assert_eq!(
            license.to_json().unwrap(),
            r#"{"keys":[{"kty":"oct","k":"3q2-7w","kid":"q8Ej"}],"type":"temporary"}"#
        );
    }

    #[test]
    fn test_normalized_equality() {
        assert_eq!(
            DrmDescriptor::new("ABC123:DEADBEEF"),
            DrmDescriptor::new(" abc123 : dead-beef ")
        );
        assert_ne!(DrmDescriptor::new("abc123:deadbeef"), DrmDescriptor::new("abc123:deadbeee"));
        assert_ne!(
            DrmDescriptor::new("https://lic.example/A"),
            DrmDescriptor::new("https://lic.example/a")
        );
    }
}
