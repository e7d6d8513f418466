//! tvlink Core - Playback session controller
//!
//! This crate sits between a UI layer and a native media engine:
//! - Change detection: reload the source, or only swap quality on a live session
//! - DRM key material resolution (license server or inline clear-key)
//! - HTTP transport headers/timeouts and live-edge buffering tuning
//! - Recovery from transient live-stream errors
//! - Engine callbacks projected into UI events
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          tvlink Core                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │   UI method calls                              UI events        │
//! │         │                                          ▲            │
//! │  ┌──────┴───────┐                          ┌───────┴──────┐     │
//! │  │    Player    │                          │    Event     │     │
//! │  │    Bridge    │                          │    Sink      │     │
//! │  └──────┬───────┘                          └───────┬──────┘     │
//! │         │                                          │            │
//! │         └──────────────┐          ┌────────────────┘            │
//! │                   ┌────┴──────────┴────┐                        │
//! │                   │      Session       │                        │
//! │                   │     Controller     │                        │
//! │                   └────┬──────────┬────┘                        │
//! │                        │          ▲                             │
//! │  ┌──────────────┐      │          │       ┌──────────────┐      │
//! │  │ DRM / Source │──────┤          │       │ Engine events│      │
//! │  │  Transport   │      ▼          │       └──────────────┘      │
//! │  └──────────────┘   PlayerEngine ─┘                             │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod types;
pub mod buffer;
pub mod transport;
pub mod drm;
pub mod source;
pub mod quality;
pub mod intent;
pub mod engine;
pub mod events;
pub mod session;
pub mod bridge;

pub use error::{DrmError, Error, Result};
pub use types::*;
pub use buffer::{LiveConfig, LoadControlConfig};
pub use transport::{RequestProfile, TransportConfig};
pub use drm::{resolve_drm, ClearKeyLicense, DrmConfig, DrmDescriptor};
pub use source::{infer_container, ContainerHint, MediaSource};
pub use quality::{Quality, VideoSizeConstraint};
pub use intent::PlaybackIntent;
pub use engine::{EngineEvent, PlayerEngine};
pub use events::{available_qualities, PlayerEvent};
pub use session::{SessionController, SubmitOutcome};
pub use bridge::{MethodCall, MethodResponse, PlayArguments, PlayerBridge};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library with default configuration
pub fn init() {
    tracing::info!(version = VERSION, "tvlink Core initialized");
}
