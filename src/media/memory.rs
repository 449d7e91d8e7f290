// MoodReel In-Memory Surface
// Copyright (c) 2026 Xing_The_Creator | MoodReel
//
// A surface with no real decoder behind it. Used for headless sessions
// (clips "play" for a fixed simulated length) and for driving the
// controller step by step in tests through a `SurfaceProbe`.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::oneshot;
use tracing::debug;

use super::{PlaybackError, Signal, VideoSurface};

/// Everything observable about a surface, copied out for assertions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceLog {
    pub source: Option<String>,
    pub loads: usize,
    pub plays: usize,
    pub pauses: usize,
    pub active: bool,
    pub playing: bool,
}

#[derive(Default)]
struct Shared {
    log: SurfaceLog,
    ready_tx: Option<oneshot::Sender<()>>,
    ended_tx: Option<oneshot::Sender<()>>,
    fail_play: bool,
    generation: u64,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct MemorySurface {
    name: String,
    source: Option<String>,
    shared: Arc<Mutex<Shared>>,
    manual_ready: bool,
    clip_length: Option<Duration>,
}

impl MemorySurface {
    /// Ready fires as soon as a clip is loaded; ended only fires through the probe.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            source: None,
            shared: Arc::new(Mutex::new(Shared::default())),
            manual_ready: false,
            clip_length: None,
        }
    }

    /// Ready must be fired through the probe.
    pub fn manual(name: &str) -> Self {
        Self {
            manual_ready: true,
            ..Self::new(name)
        }
    }

    /// Every clip "ends" after `length` of playback.
    pub fn timed(name: &str, length: Duration) -> Self {
        Self {
            clip_length: Some(length),
            ..Self::new(name)
        }
    }

    pub fn probe(&self) -> SurfaceProbe {
        SurfaceProbe {
            shared: self.shared.clone(),
        }
    }
}

#[async_trait]
impl VideoSurface for MemorySurface {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_source(&mut self, src: &str) {
        self.source = Some(src.to_string());
        lock(&self.shared).log.source = Some(src.to_string());
    }

    fn load(&mut self) -> Signal {
        let (tx, rx) = oneshot::channel();
        let mut shared = lock(&self.shared);
        shared.log.loads += 1;
        shared.log.playing = false;
        shared.generation += 1;
        if self.manual_ready {
            shared.ready_tx = Some(tx);
        } else {
            let _ = tx.send(());
        }
        rx
    }

    async fn play(&mut self) -> Result<(), PlaybackError> {
        let Some(src) = self.source.clone() else {
            return Err(PlaybackError::NoSource(self.name.clone()));
        };

        let generation = {
            let mut shared = lock(&self.shared);
            if shared.fail_play {
                return Err(PlaybackError::Refused(format!("{} refused {}", self.name, src)));
            }
            shared.log.plays += 1;
            shared.log.playing = true;
            shared.generation += 1;
            shared.generation
        };
        debug!("[SURFACE] {} playing {}", self.name, src);

        if let Some(length) = self.clip_length {
            let shared = self.shared.clone();
            tokio::spawn(async move {
                tokio::time::sleep(length).await;
                let mut shared = lock(&shared);
                if shared.generation != generation {
                    return;
                }
                shared.log.playing = false;
                if let Some(tx) = shared.ended_tx.take() {
                    let _ = tx.send(());
                }
            });
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut shared = lock(&self.shared);
        shared.log.pauses += 1;
        shared.log.playing = false;
        shared.generation += 1;
    }

    fn set_active(&mut self, active: bool) {
        lock(&self.shared).log.active = active;
    }

    fn ended(&mut self) -> Signal {
        let (tx, rx) = oneshot::channel();
        lock(&self.shared).ended_tx = Some(tx);
        rx
    }
}

/// Test-side handle onto a `MemorySurface` the controller owns.
#[derive(Clone)]
pub struct SurfaceProbe {
    shared: Arc<Mutex<Shared>>,
}

impl SurfaceProbe {
    pub fn log(&self) -> SurfaceLog {
        lock(&self.shared).log.clone()
    }

    /// Returns false when no load is waiting.
    pub fn fire_ready(&self) -> bool {
        match lock(&self.shared).ready_tx.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Simulates a clip that could not be loaded.
    pub fn drop_ready(&self) {
        lock(&self.shared).ready_tx.take();
    }

    /// Returns false when no ended listener is armed.
    pub fn fire_ended(&self) -> bool {
        let mut shared = lock(&self.shared);
        shared.log.playing = false;
        match shared.ended_tx.take() {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Simulates a player that dies without reporting the end of its clip.
    pub fn drop_ended(&self) {
        let mut shared = lock(&self.shared);
        shared.log.playing = false;
        shared.ended_tx.take();
    }

    pub fn fail_play(&self, fail: bool) {
        lock(&self.shared).fail_play = fail;
    }
}
