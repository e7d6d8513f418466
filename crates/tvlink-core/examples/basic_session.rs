//! Basic session example
//!
//! Drives a controller with a logging engine and prints the UI events.
//!
//! Run with: cargo run -p tvlink-core --example basic_session

use serde_json::json;
use std::sync::Arc;
use tokio::sync::mpsc;
use tvlink_core::{
    EngineErrorCode, EngineEvent, EngineState, MediaSource, MethodCall, PlaybackError,
    PlayerBridge, PlayerConfig, PlayerEngine, ResizeMode, Result, SessionController,
    TrackFormat, TrackGroup, TrackType, VideoSizeConstraint,
};

struct PrintEngine;

impl PlayerEngine for PrintEngine {
    fn load(&self, source: &MediaSource) -> Result<()> {
        println!("engine: load {} ({:?})", source.uri, source.mime_type());
        Ok(())
    }
    fn prepare(&self) -> Result<()> {
        println!("engine: prepare");
        Ok(())
    }
    fn seek_to_default_position(&self) -> Result<()> {
        println!("engine: seek to live edge");
        Ok(())
    }
    fn play(&self) -> Result<()> {
        println!("engine: play");
        Ok(())
    }
    fn pause(&self) -> Result<()> {
        println!("engine: pause");
        Ok(())
    }
    fn set_video_size_constraint(&self, constraint: Option<VideoSizeConstraint>) -> Result<()> {
        println!("engine: constraint {:?}", constraint);
        Ok(())
    }
    fn set_resize_mode(&self, mode: ResizeMode) -> Result<()> {
        println!("engine: resize {:?}", mode);
        Ok(())
    }
    fn release(&self) {
        println!("engine: release");
    }
}

#[tokio::main]
async fn main() {
    tvlink_core::init();

    let (tx, mut events) = mpsc::unbounded_channel();
    let controller = Arc::new(SessionController::new(
        Arc::new(PrintEngine),
        PlayerConfig::default(),
        tx,
    ));
    let bridge = PlayerBridge::new(controller.clone());

    let response = bridge
        .handle(MethodCall::new(
            "play",
            json!({
                "url": "http://panel.example.com/live/user/pass/1.m3u8",
                "drmData": {"key": "abc123:deadbeef"}
            }),
        ))
        .await;
    println!("play -> {:?}", response);

    controller
        .handle_engine_event(EngineEvent::TracksChanged(vec![TrackGroup::new(
            TrackType::Video,
            vec![TrackFormat::video(1920, 1080), TrackFormat::video(1280, 720)],
        )]))
        .await;
    controller
        .handle_engine_event(EngineEvent::StateChanged(EngineState::Ready))
        .await;

    // Same source, new quality: no reload
    bridge
        .handle(MethodCall::new(
            "play",
            json!({
                "url": "http://panel.example.com/live/user/pass/1.m3u8",
                "drmData": {"key": "abc123:deadbeef"},
                "quality": "720p"
            }),
        ))
        .await;

    controller
        .handle_engine_event(EngineEvent::Error(PlaybackError::new(
            EngineErrorCode::BEHIND_LIVE_WINDOW,
            "Behind live window",
        )))
        .await;

    bridge.handle(MethodCall::new("dispose", json!(null))).await;

    while let Some(event) = events.recv().await {
        println!("ui <- {}", serde_json::to_string(&event).unwrap_or_default());
    }
}
