//! Simulated engine for scripted sessions
//!
//! Behaves like a well-connected player: every load or prepare goes through
//! buffering to ready and announces a fixed quality ladder. Callbacks are
//! queued on a channel the session loop feeds back into the controller.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tvlink_core::{
    EngineEvent, EngineState, MediaSource, PlayerEngine, ResizeMode, Result, TrackFormat,
    TrackGroup, TrackType, VideoSizeConstraint,
};

const LADDER: [(u32, u32); 4] = [(1920, 1080), (1280, 720), (854, 480), (640, 360)];

pub struct SimulatedEngine {
    callbacks: mpsc::UnboundedSender<EngineEvent>,
    released: AtomicBool,
}

impl SimulatedEngine {
    pub fn new(callbacks: mpsc::UnboundedSender<EngineEvent>) -> Self {
        Self {
            callbacks,
            released: AtomicBool::new(false),
        }
    }

    fn callback(&self, event: EngineEvent) {
        if self.released.load(Ordering::SeqCst) {
            return;
        }
        let _ = self.callbacks.send(event);
    }

    fn start_buffering(&self) {
        self.callback(EngineEvent::StateChanged(EngineState::Buffering));
        self.callback(EngineEvent::StateChanged(EngineState::Ready));
    }
}

impl PlayerEngine for SimulatedEngine {
    fn load(&self, source: &MediaSource) -> Result<()> {
        info!(
            uri = %source.uri,
            mime = source.mime_type().unwrap_or("auto"),
            drm = source.drm.is_some(),
            "Simulated load"
        );
        self.start_buffering();
        let formats = LADDER
            .iter()
            .map(|(w, h)| TrackFormat::video(*w, *h))
            .collect();
        self.callback(EngineEvent::TracksChanged(vec![TrackGroup::new(
            TrackType::Video,
            formats,
        )]));
        Ok(())
    }

    fn prepare(&self) -> Result<()> {
        debug!("Simulated prepare");
        self.start_buffering();
        Ok(())
    }

    fn seek_to_default_position(&self) -> Result<()> {
        debug!("Simulated seek to live edge");
        Ok(())
    }

    fn play(&self) -> Result<()> {
        debug!("Simulated play");
        Ok(())
    }

    fn pause(&self) -> Result<()> {
        debug!("Simulated pause");
        Ok(())
    }

    fn set_video_size_constraint(&self, constraint: Option<VideoSizeConstraint>) -> Result<()> {
        info!(?constraint, "Simulated track selection");
        Ok(())
    }

    fn set_resize_mode(&self, mode: ResizeMode) -> Result<()> {
        debug!(?mode, "Simulated resize");
        Ok(())
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
        info!("Simulated engine released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_reports_ladder() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let engine = SimulatedEngine::new(tx);
        let intent = tvlink_core::PlaybackIntent::new("https://x.com/a.m3u8");
        let source = MediaSource::from_intent(&intent, None, &Default::default());

        engine.load(&source).unwrap();

        assert_eq!(rx.try_recv().unwrap(), EngineEvent::StateChanged(EngineState::Buffering));
        assert_eq!(rx.try_recv().unwrap(), EngineEvent::StateChanged(EngineState::Ready));
        match rx.try_recv().unwrap() {
            EngineEvent::TracksChanged(groups) => assert_eq!(groups[0].formats.len(), 4),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_no_callbacks_after_release() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let engine = SimulatedEngine::new(tx);
        engine.release();
        engine.prepare().unwrap();
        assert!(rx.try_recv().is_err());
    }
}
