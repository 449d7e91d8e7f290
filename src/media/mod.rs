// MoodReel Playback Surfaces
// Copyright (c) 2026 Xing_The_Creator | MoodReel

pub mod ffplay;
pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::oneshot;

pub use ffplay::FfplaySurface;
pub use memory::{MemorySurface, SurfaceProbe};

/// One-shot event from a surface. A dropped sender means the event never fires.
pub type Signal = oneshot::Receiver<()>;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("no source set on {0}")]
    NoSource(String),

    #[error("player could not start: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("playback refused: {0}")]
    Refused(String),
}

/// A playback slot. The controller owns two of these and swaps their roles.
#[async_trait]
pub trait VideoSurface: Send {
    fn name(&self) -> &str;

    fn source(&self) -> Option<&str>;

    fn set_source(&mut self, src: &str);

    /// Start preloading the current source. The returned signal fires once
    /// the clip can play through without stalling.
    fn load(&mut self) -> Signal;

    async fn play(&mut self) -> Result<(), PlaybackError>;

    fn pause(&mut self);

    /// Visual active marker.
    fn set_active(&mut self, active: bool);

    /// Fires once when the playback started by the last `play` reaches its end.
    fn ended(&mut self) -> Signal;
}

/// A signal that has already fired.
pub(crate) fn fired() -> Signal {
    let (tx, rx) = oneshot::channel();
    let _ = tx.send(());
    rx
}
