//! Method-call bridge between the UI layer and the controller
//!
//! The UI talks to the player with named method calls carrying a JSON
//! argument map, and gets exactly one response per call. Responses only
//! acknowledge that a command was accepted; playback progress is reported
//! through [`PlayerEvent`](crate::PlayerEvent)s.

use crate::{
    drm::DrmDescriptor,
    intent::PlaybackIntent,
    quality::Quality,
    session::{SessionController, SubmitOutcome},
    types::ResizeMode,
    Error, Result,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Incoming method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Acknowledgement for a method call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MethodResponse {
    Success {
        result: Value,
    },
    Error {
        code: String,
        message: String,
    },
    NotImplemented,
}

impl MethodResponse {
    pub fn ok() -> Self {
        MethodResponse::Success { result: Value::Null }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MethodResponse::Success { .. })
    }

    /// Error code, if this is an error response
    pub fn error_code(&self) -> Option<&str> {
        match self {
            MethodResponse::Error { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<Error> for MethodResponse {
    fn from(err: Error) -> Self {
        match err {
            Error::NotImplemented(_) => MethodResponse::NotImplemented,
            other => MethodResponse::Error {
                code: other.error_code().to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Arguments of a `play` call
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayArguments {
    pub url: Option<String>,
    /// DRM map; only the `key` entry is read
    pub drm_data: Option<HashMap<String, String>>,
    pub quality: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

impl PlayArguments {
    /// Build the intent these arguments describe
    pub fn into_intent(self) -> Result<PlaybackIntent> {
        let url = self.url.ok_or(Error::UrlNull)?;

        let drm = self
            .drm_data
            .and_then(|mut data| data.remove("key"))
            .filter(|key| !key.trim().is_empty())
            .map(DrmDescriptor::new);

        Ok(PlaybackIntent {
            source_url: url,
            drm,
            user_agent: self.user_agent,
            referer: self.referer,
            preferred_quality: self
                .quality
                .as_deref()
                .map(|label| Quality::from_label(Some(label))),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct ResizeArguments {
    mode: Option<i64>,
}

/// Dispatches method calls onto a [`SessionController`]
pub struct PlayerBridge {
    controller: Arc<SessionController>,
}

impl PlayerBridge {
    pub fn new(controller: Arc<SessionController>) -> Self {
        Self { controller }
    }

    pub fn controller(&self) -> &Arc<SessionController> {
        &self.controller
    }

    /// Start playback from the parameters the view was created with.
    ///
    /// Nothing happens when they carry no `url`.
    pub async fn apply_creation_params(&self, params: &Value) -> Result<Option<SubmitOutcome>> {
        let mut args: PlayArguments = parse_arguments(params)?;
        if args.url.is_none() {
            debug!("Created without url, waiting for play");
            return Ok(None);
        }
        // The initial load never carries a quality preference
        args.quality = None;
        let outcome = self.controller.submit(args.into_intent()?).await?;
        Ok(Some(outcome))
    }

    /// Handle one call. Never fails: every error becomes a response.
    pub async fn handle(&self, call: MethodCall) -> MethodResponse {
        debug!(method = %call.method, "Method call");
        match self.dispatch(&call).await {
            Ok(()) => MethodResponse::ok(),
            Err(err) => {
                if !matches!(err, Error::NotImplemented(_)) {
                    warn!(method = %call.method, code = err.error_code(), error = %err, "Method call failed");
                }
                err.into()
            }
        }
    }

    async fn dispatch(&self, call: &MethodCall) -> Result<()> {
        match call.method.as_str() {
            "play" => {
                let args: PlayArguments = parse_arguments(&call.arguments)?;
                let intent = args.into_intent()?;
                let outcome = self.controller.submit(intent).await?;
                info!(?outcome, "Play accepted");
                Ok(())
            }
            "pause" => self.controller.pause().await,
            "resume" => self.controller.resume().await,
            "setResizeMode" => {
                let args: ResizeArguments = parse_arguments(&call.arguments)?;
                let mode = ResizeMode::from_code(args.mode.unwrap_or(0));
                self.controller.set_resize_mode(mode).await
            }
            "dispose" => self.controller.dispose().await,
            other => Err(Error::NotImplemented(other.to_string())),
        }
    }
}

/// Missing or null arguments read as an empty map
fn parse_arguments<T: DeserializeOwned + Default>(arguments: &Value) -> Result<T> {
    if arguments.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(arguments.clone())
        .map_err(|e| Error::invalid_argument("arguments", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_play_arguments_to_intent() {
        let args: PlayArguments = serde_json::from_value(json!({
            "url": "https://x.com/a.m3u8",
            "drmData": {"key": "abc123:deadbeef"},
            "quality": "720p",
            "userAgent": "VLC",
            "referer": "https://panel/"
        }))
        .unwrap();
        let intent = args.into_intent().unwrap();

        assert_eq!(intent.source_url, "https://x.com/a.m3u8");
        assert_eq!(intent.drm, Some(DrmDescriptor::new("abc123:deadbeef")));
        assert_eq!(intent.preferred_quality, Some(Quality::Height(720)));
        assert_eq!(intent.user_agent.as_deref(), Some("VLC"));
        assert_eq!(intent.referer.as_deref(), Some("https://panel/"));
    }

    #[test]
    fn test_missing_url() {
        let err = PlayArguments::default().into_intent().unwrap_err();
        assert_eq!(err.error_code(), "URL_NULL");
    }

    #[test]
    fn test_empty_drm_key_is_no_drm() {
        let args = PlayArguments {
            url: Some("u".to_string()),
            drm_data: Some(HashMap::from([("key".to_string(), "".to_string())])),
            ..Default::default()
        };
        assert_eq!(args.into_intent().unwrap().drm, None);
    }

    #[test]
    fn test_response_wire_format() {
        let json = serde_json::to_value(MethodResponse::from(Error::UrlNull)).unwrap();
        assert_eq!(
            json,
            json!({"status": "error", "code": "URL_NULL", "message": "URL is null"})
        );
        assert_eq!(
            MethodResponse::from(Error::NotImplemented("seek".to_string())),
            MethodResponse::NotImplemented
        );
    }

    #[test]
    fn test_null_arguments_are_empty() {
        let args: PlayArguments = parse_arguments(&Value::Null).unwrap();
        assert!(args.url.is_none());
        assert!(parse_arguments::<PlayArguments>(&json!({"url": 5})).is_err());
    }
}
