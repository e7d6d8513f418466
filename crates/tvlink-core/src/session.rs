//! Session controller - owns the current playback intent
//!
//! Decides, for every play request:
//! - whether it only changes quality (hot-swap on the live session), or
//! - whether the engine source must be rebuilt (full reload)
//!
//! and turns engine callbacks into UI events, recovering silently from the
//! transient errors live streams produce.
//!
//! Commands and engine callbacks may arrive from different threads. Every
//! entry point takes the state lock for its whole duration, so each one
//! observes and replaces `current`/`engine_state` atomically.

use crate::{
    engine::{EngineEvent, PlayerEngine},
    events::{available_qualities, EventSink, PlayerEvent},
    intent::PlaybackIntent,
    quality::Quality,
    source::MediaSource,
    types::*,
    Error, Result,
};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, instrument, warn};

/// What a submitted intent turned into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Same source on a live session: only the quality constraint changed
    QualityUpdate,
    /// The engine source was rebuilt
    Reload(SessionId),
}

struct ControllerState {
    /// Last intent that caused a full reload
    current: Option<Arc<PlaybackIntent>>,
    /// Mirror of the engine lifecycle
    engine_state: EngineState,
    /// Id of the source currently loaded
    session_id: Option<SessionId>,
    events: EventSink,
    disposed: bool,
}

impl ControllerState {
    fn ensure_live(&self) -> Result<()> {
        if self.disposed {
            return Err(Error::Disposed);
        }
        Ok(())
    }
}

/// Controller mediating between UI commands and the media engine
pub struct SessionController {
    engine: Arc<dyn PlayerEngine>,
    config: PlayerConfig,
    state: Mutex<ControllerState>,
}

impl SessionController {
    /// Create a controller; UI events are pushed into `events`
    pub fn new(
        engine: Arc<dyn PlayerEngine>,
        config: PlayerConfig,
        events: mpsc::UnboundedSender<PlayerEvent>,
    ) -> Self {
        Self {
            engine,
            config,
            state: Mutex::new(ControllerState {
                current: None,
                engine_state: EngineState::Idle,
                session_id: None,
                events: EventSink::new(events),
                disposed: false,
            }),
        }
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Intent currently loaded in the engine
    pub async fn current(&self) -> Option<Arc<PlaybackIntent>> {
        self.state.lock().await.current.clone()
    }

    /// Last engine state reported
    pub async fn engine_state(&self) -> EngineState {
        self.state.lock().await.engine_state
    }

    pub async fn session_id(&self) -> Option<SessionId> {
        self.state.lock().await.session_id
    }

    pub async fn is_disposed(&self) -> bool {
        self.state.lock().await.disposed
    }

    /// Make `intent` the one being played.
    ///
    /// Returns as soon as the engine has been told what to do; loading
    /// progress arrives later through [`handle_engine_event`](Self::handle_engine_event).
    #[instrument(skip(self, intent), fields(url = %intent.source_url))]
    pub async fn submit(&self, intent: PlaybackIntent) -> Result<SubmitOutcome> {
        let mut state = self.state.lock().await;
        state.ensure_live()?;

        if let Some(current) = &state.current {
            if current.same_source(&intent) {
                if state.engine_state.is_active() {
                    info!(quality = %intent.quality(), "Same source on live session, changing quality only");
                    self.install_quality(intent.quality());
                    return Ok(SubmitOutcome::QualityUpdate);
                }
                info!(state = %state.engine_state, "Same source but engine is not active, reloading");
            }
        }

        let drm = match &intent.drm {
            Some(descriptor) => match descriptor.resolve() {
                Ok(config) => config,
                Err(e) => {
                    warn!(error = %e, "DRM setup failed, playing without DRM");
                    None
                }
            },
            None => None,
        };

        let source = MediaSource::from_intent(&intent, drm, &self.config);
        info!(
            container = ?source.container,
            drm = source.drm.is_some(),
            user_agent = %source.transport.user_agent,
            quality = %intent.quality(),
            "Loading source"
        );

        self.engine.load(&source)?;
        self.install_quality(intent.quality());

        let session_id = SessionId::new();
        state.current = Some(Arc::new(intent));
        state.session_id = Some(session_id);
        // The engine starts buffering as soon as the source is prepared
        state.engine_state = EngineState::Buffering;

        info!(session_id = %session_id, "Source loaded");
        Ok(SubmitOutcome::Reload(session_id))
    }

    /// Change the quality constraint without touching the source
    pub async fn apply_quality(&self, quality: Quality) -> Result<()> {
        let state = self.state.lock().await;
        state.ensure_live()?;
        self.install_quality(quality);
        Ok(())
    }

    /// Failure leaves the previous constraint in place, and so does a
    /// label that could not be read
    fn install_quality(&self, quality: Quality) {
        if !quality.is_recognised() {
            debug!("Quality label not understood, constraint unchanged");
            return;
        }
        match self.engine.set_video_size_constraint(quality.constraint()) {
            Ok(()) => debug!(quality = %quality, "Quality constraint applied"),
            Err(e) => warn!(quality = %quality, error = %e, "Failed to apply quality"),
        }
    }

    #[instrument(skip(self))]
    pub async fn pause(&self) -> Result<()> {
        let state = self.state.lock().await;
        state.ensure_live()?;
        self.engine.pause()
    }

    #[instrument(skip(self))]
    pub async fn resume(&self) -> Result<()> {
        let state = self.state.lock().await;
        state.ensure_live()?;
        self.engine.play()
    }

    #[instrument(skip(self))]
    pub async fn set_resize_mode(&self, mode: ResizeMode) -> Result<()> {
        let state = self.state.lock().await;
        state.ensure_live()?;
        self.engine.set_resize_mode(mode)
    }

    /// Release the engine and detach the UI channel.
    ///
    /// Safe to call more than once; later calls do nothing. Every other
    /// command fails with [`Error::Disposed`] afterwards.
    #[instrument(skip(self))]
    pub async fn dispose(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        if state.disposed {
            debug!("Already disposed");
            return Ok(());
        }

        self.engine.release();
        state.events.detach();
        state.current = None;
        state.session_id = None;
        state.engine_state = EngineState::Idle;
        state.disposed = true;

        info!("Player disposed");
        Ok(())
    }

    /// Feed an engine callback into the controller
    pub async fn handle_engine_event(&self, event: EngineEvent) {
        let mut state = self.state.lock().await;
        if state.disposed {
            debug!(?event, "Engine event after dispose ignored");
            return;
        }

        match event {
            EngineEvent::TracksChanged(groups) => {
                let qualities = available_qualities(&groups);
                debug!(?qualities, "Tracks changed");
                state.events.emit(PlayerEvent::TracksChanged { qualities });
            }
            EngineEvent::StateChanged(new_state) => {
                debug!(from = %state.engine_state, to = %new_state, "Engine state changed");
                state.engine_state = new_state;
                state.events.emit(PlayerEvent::PlaybackState {
                    state: new_state.code(),
                });
            }
            EngineEvent::Error(err) => self.handle_playback_error(&state, err),
            EngineEvent::ControlsVisibilityChanged(is_visible) => {
                state.events.emit(PlayerEvent::ControlsVisibilityChange { is_visible });
            }
        }
    }

    /// Transient errors are recovered by jumping back to the live edge;
    /// everything else ends the session from the UI's point of view
    fn handle_playback_error(&self, state: &ControllerState, err: PlaybackError) {
        let session_id = state.session_id.map(|id| id.to_string()).unwrap_or_default();

        if err.code.is_recoverable() {
            info!(
                session_id = %session_id,
                code = %err.code,
                message = %err.message,
                "Recoverable error, repositioning to live edge"
            );
            let retried = self
                .engine
                .seek_to_default_position()
                .and_then(|_| self.engine.prepare());
            match retried {
                Ok(()) => return,
                Err(e) => error!(error = %e, "Recovery failed, reporting original error"),
            }
        } else {
            warn!(session_id = %session_id, code = %err.code, message = %err.message, "Playback error");
        }

        state.events.emit(PlayerEvent::Error {
            message: err.message,
            code: err.code.0,
        });
    }
}
