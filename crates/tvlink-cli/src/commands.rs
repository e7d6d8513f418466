//! CLI command implementations

use crate::engine::SimulatedEngine;
use crate::output::{emit, json_line};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tvlink_core::{
    infer_container, resolve_drm, ContainerHint, DrmConfig, EngineEvent, MediaSource, MethodCall,
    MethodResponse, PlayArguments, PlayerBridge, PlayerConfig, SessionController,
};

/// Per-request transport overrides
#[derive(Debug, Clone, Default, clap::Args)]
pub struct RequestArgs {
    /// User-Agent sent with every request
    #[arg(long)]
    pub user_agent: Option<String>,

    /// Referer header
    #[arg(long)]
    pub referer: Option<String>,
}

/// Show the media source a play request would load
pub fn inspect(
    config: &PlayerConfig,
    url: &str,
    request: &RequestArgs,
    drm: Option<String>,
    quality: Option<String>,
    format: &str,
) -> anyhow::Result<()> {
    let args = PlayArguments {
        url: Some(url.to_string()),
        drm_data: drm.map(|key| [("key".to_string(), key)].into_iter().collect()),
        quality,
        user_agent: request.user_agent.clone(),
        referer: request.referer.clone(),
    };
    let intent = args.into_intent()?;

    let drm = match intent.drm.as_ref().map(|d| d.resolve()).transpose() {
        Ok(resolved) => resolved.flatten(),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed DRM key material");
            None
        }
    };
    let source = MediaSource::from_intent(&intent, drm, config);
    let constraint = intent.quality().constraint();

    let report = json!({
        "source": source,
        "quality": intent.quality().to_string(),
        "constraint": constraint,
    });

    emit(&report, format, |_| {
        println!("Media source:");
        println!("  URI: {}", source.uri);
        println!(
            "  Container: {}",
            source
                .container
                .map(|c| c.to_string())
                .unwrap_or_else(|| "auto-detect".to_string())
        );
        println!("  User-Agent: {}", source.transport.user_agent);
        for (name, value) in &source.transport.headers {
            println!("  {}: {}", name, value);
        }
        println!(
            "  Timeouts: connect {:?}, read {:?}",
            source.transport.connect_timeout, source.transport.read_timeout
        );
        println!("  DRM: {}", describe_drm(source.drm.as_ref()));
        println!(
            "  Live: target offset {}ms, speed {:.2}..{:.2}",
            source.live.target_offset_ms,
            source.live.min_playback_speed,
            source.live.max_playback_speed
        );
        println!(
            "  Buffer: {}..{}ms, start after {}ms, rebuffer {}ms",
            source.load_control.min_buffer_ms,
            source.load_control.max_buffer_ms,
            source.load_control.buffer_for_playback_ms,
            source.load_control.buffer_for_playback_after_rebuffer_ms
        );
        println!("  Quality: {}", intent.quality());
        if let Some(c) = constraint {
            println!("  Track limit: {}x{}", c.max_width, c.max_height);
        }
    })
}

fn describe_drm(drm: Option<&DrmConfig>) -> String {
    match drm {
        None => "none".to_string(),
        Some(DrmConfig::LicenseServer { license_url, .. }) => format!("license server {}", license_url),
        Some(DrmConfig::ClearKey { license, .. }) => format!("clear key ({} key)", license.keys.len()),
    }
}

/// Resolve DRM key material
pub fn drm(key: &str, format: &str) -> anyhow::Result<()> {
    let config = resolve_drm(key)?;

    emit(&config, format, |config| match config {
        None => println!("No DRM"),
        Some(config) => {
            println!("System: {}", config.system_id());
            match config {
                DrmConfig::LicenseServer { license_url, .. } => {
                    println!("License server: {}", license_url);
                }
                DrmConfig::ClearKey { license, .. } => {
                    for key in &license.keys {
                        println!("  kid: {}", key.kid);
                        println!("  k:   {}", key.k);
                    }
                    if let Ok(doc) = license.to_json() {
                        println!("License: {}", doc);
                    }
                }
            }
        }
    })
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    url: String,
    final_url: String,
    status: u16,
    content_type: Option<String>,
    url_hint: Option<ContainerHint>,
    sniffed: Option<ContainerHint>,
}

/// Look at the first bytes of a response
fn sniff_container(body: &[u8]) -> Option<ContainerHint> {
    let text = String::from_utf8_lossy(&body[..body.len().min(512)]);
    let text = text.trim_start_matches('\u{feff}').trim_start();
    if text.starts_with("#EXTM3U") {
        Some(ContainerHint::Hls)
    } else if text.contains("<MPD") {
        Some(ContainerHint::Dash)
    } else if body.first() == Some(&0x47) && (body.len() < 189 || body[188] == 0x47) {
        Some(ContainerHint::TransportStream)
    } else {
        None
    }
}

/// Fetch the start of a stream with the player's transport settings
pub async fn probe(
    config: &PlayerConfig,
    url: &str,
    request: &RequestArgs,
    format: &str,
) -> anyhow::Result<()> {
    let profile = config
        .transport
        .for_request(request.user_agent.as_deref(), request.referer.as_deref());
    let client = profile.build_client()?;

    info!(url, user_agent = %profile.user_agent, "Probing stream");
    let mut response = client.get(url).send().await?;

    let status = response.status();
    let final_url = response.url().to_string();
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let first = response.chunk().await?.unwrap_or_default();
    debug!(bytes = first.len(), "Read first chunk");

    let report = ProbeReport {
        url: url.to_string(),
        final_url,
        status: status.as_u16(),
        content_type,
        url_hint: infer_container(url),
        sniffed: sniff_container(&first),
    };

    emit(&report, format, |r| {
        println!("Probe: {}", r.url);
        if r.final_url != r.url {
            println!("  Redirected to: {}", r.final_url);
        }
        println!("  Status: {}", r.status);
        println!("  Content-Type: {}", r.content_type.as_deref().unwrap_or("-"));
        println!(
            "  URL hint: {}",
            r.url_hint.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string())
        );
        println!(
            "  Detected: {}",
            r.sniffed.map(|c| c.to_string()).unwrap_or_else(|| "unknown".to_string())
        );
    })
}

/// One line of session input
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SessionInput {
    /// Simulate an engine callback
    Inject { inject: EngineEvent },
    Call(MethodCall),
}

#[derive(Debug, Serialize)]
struct SessionResponse<'a> {
    method: &'a str,
    response: MethodResponse,
}

/// Run a session reading JSON lines from stdin.
///
/// Responses and UI events are written to stdout, one JSON document per line.
pub async fn session(config: PlayerConfig, url: Option<String>) -> anyhow::Result<()> {
    config.validate()?;

    let (engine_tx, mut engine_rx) = mpsc::unbounded_channel();
    let (ui_tx, mut ui_rx) = mpsc::unbounded_channel();
    let controller = Arc::new(SessionController::new(
        Arc::new(SimulatedEngine::new(engine_tx.clone())),
        config,
        ui_tx,
    ));
    let bridge = PlayerBridge::new(controller.clone());

    if let Some(url) = url {
        let outcome = bridge.apply_creation_params(&json!({ "url": url })).await?;
        info!(?outcome, "Applied creation parameters");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                match serde_json::from_str::<SessionInput>(line) {
                    Ok(SessionInput::Inject { inject }) => {
                        // Queue behind callbacks the engine already raised
                        let _ = engine_tx.send(inject);
                    }
                    Ok(SessionInput::Call(call)) => {
                        let method = call.method.clone();
                        let response = bridge.handle(call).await;
                        json_line(&SessionResponse { method: &method, response })?;
                    }
                    Err(e) => warn!(error = %e, "Unreadable input line"),
                }
            }
            Some(event) = engine_rx.recv() => {
                controller.handle_engine_event(event).await;
            }
            Some(event) = ui_rx.recv() => {
                json_line(&event)?;
            }
        }
    }

    info!("Input closed, disposing session");
    controller.dispose().await?;
    while let Ok(event) = engine_rx.try_recv() {
        controller.handle_engine_event(event).await;
    }
    while let Ok(event) = ui_rx.try_recv() {
        json_line(&event)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tvlink_core::EngineState;

    #[test]
    fn test_sniff_hls() {
        assert_eq!(sniff_container(b"#EXTM3U\n#EXT-X-VERSION:3\n"), Some(ContainerHint::Hls));
    }

    #[test]
    fn test_sniff_dash() {
        let body = br#"<?xml version="1.0"?><MPD xmlns="urn:mpeg:dash:schema:mpd:2011">"#;
        assert_eq!(sniff_container(body), Some(ContainerHint::Dash));
    }

    #[test]
    fn test_sniff_ts() {
        let mut body = vec![0u8; 376];
        body[0] = 0x47;
        body[188] = 0x47;
        assert_eq!(sniff_container(&body), Some(ContainerHint::TransportStream));
        assert_eq!(sniff_container(b"hello"), None);
    }

    #[test]
    fn test_session_input_parsing() {
        let call: SessionInput =
            serde_json::from_str(r#"{"method":"play","arguments":{"url":"http://x/a.m3u8"}}"#)
                .unwrap();
        assert!(matches!(call, SessionInput::Call(c) if c.method == "play"));

        let bare: SessionInput = serde_json::from_str(r#"{"method":"pause"}"#).unwrap();
        assert!(matches!(bare, SessionInput::Call(_)));

        let inject: SessionInput =
            serde_json::from_str(r#"{"inject":{"StateChanged":"Ended"}}"#).unwrap();
        assert!(matches!(
            inject,
            SessionInput::Inject { inject: EngineEvent::StateChanged(EngineState::Ended) }
        ));
    }
}
