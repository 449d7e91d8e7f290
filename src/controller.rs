// MoodReel Video Transition Controller
// Copyright (c) 2026 Xing_The_Creator | MoodReel
//
// Two playback surfaces, one visible. A new clip is preloaded on the hidden
// surface and only swapped in once it reports it can play through, so the
// viewer never sees a loading frame. Every clip funnels back into the
// neutral loop when it ends.

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::media::{Signal, VideoSurface};
use crate::state::{Phase, PlaybackSnapshot};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoCommand {
    PlayNeutral,
    PlaySpecific(String),
}

/// What a request or a surface signal did to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The requested clip is already on screen.
    Unchanged,
    /// The requested clip is already preloading.
    AlreadyPending,
    /// The active clip restarted on its surface.
    Replayed,
    /// The on-screen clip was requested again; the pending preload was dropped.
    Cancelled {
        src: String,
    },
    Preloading {
        src: String,
        /// Pending preload dropped in favour of this one.
        superseded: Option<String>,
    },
    Swapped {
        slot: usize,
        src: String,
    },
    /// The hidden surface could not load the clip; the active clip keeps its role.
    PreloadFailed {
        src: String,
    },
    /// The active surface dropped its end-of-playback signal; treated as
    /// the clip having ended.
    EndLost,
}

#[derive(Debug, Error)]
#[error("video controller has stopped")]
pub struct ControllerStopped;

enum SurfaceSignal {
    Ready(bool),
    Ended(bool),
}

struct PendingTransition {
    slot: usize,
    src: String,
    ready: Signal,
}

pub struct VideoTransitionController<S: VideoSurface> {
    surfaces: [S; 2],
    active: usize,
    neutral: String,
    phase: Phase,
    pending: Option<PendingTransition>,
    ended: Option<Signal>,
    snapshot: watch::Sender<PlaybackSnapshot>,
}

impl<S: VideoSurface> VideoTransitionController<S> {
    /// `surfaces[0]` starts as the active surface.
    pub fn new(surfaces: [S; 2], neutral: &str) -> Self {
        let (snapshot, _) = watch::channel(PlaybackSnapshot::default());
        Self {
            surfaces,
            active: 0,
            neutral: neutral.to_string(),
            phase: Phase::Idle,
            pending: None,
            ended: None,
            snapshot,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn active_slot(&self) -> usize {
        self.active
    }

    pub fn active_source(&self) -> Option<&str> {
        self.surfaces[self.active].source()
    }

    pub fn neutral(&self) -> &str {
        &self.neutral
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot.subscribe()
    }

    fn inactive(&self) -> usize {
        1 - self.active
    }

    fn is_neutral_active(&self) -> bool {
        self.active_source() == Some(self.neutral.as_str())
    }

    fn settled_phase(&self) -> Phase {
        match self.active_source() {
            None => Phase::Idle,
            Some(src) if src == self.neutral => Phase::NeutralLooping,
            Some(_) => Phase::PlayingOverride,
        }
    }

    fn publish(&self) {
        self.snapshot.send_replace(PlaybackSnapshot {
            phase: self.phase,
            active_slot: self.active,
            active_source: self.active_source().map(str::to_string),
            pending_source: self.pending.as_ref().map(|p| p.src.clone()),
        });
    }

    /// Put the neutral clip on the active surface and start the loop.
    pub async fn start(&mut self) {
        let neutral = self.neutral.clone();
        let surface = &mut self.surfaces[self.active];
        surface.set_source(&neutral);
        // Nothing is on screen yet, so there is no outgoing clip to protect.
        let _ready = surface.load();
        if let Err(e) = surface.play().await {
            error!("[CONTROLLER] Initial neutral playback failed: {}", e);
        }
        surface.set_active(true);
        self.ended = Some(surface.ended());
        self.phase = Phase::NeutralLooping;
        info!("[CONTROLLER] Neutral loop started on {}", surface.name());
        self.publish();
    }

    pub async fn play_neutral_video(&mut self) -> TransitionOutcome {
        if self.is_neutral_active() {
            return self.keep_active().await;
        }
        let neutral = self.neutral.clone();
        self.begin_transition(&neutral)
    }

    pub async fn play_specific_video(&mut self, src: &str) -> TransitionOutcome {
        if self.active_source() == Some(src) {
            return self.keep_active().await;
        }
        self.begin_transition(src)
    }

    pub async fn dispatch(&mut self, command: VideoCommand) -> TransitionOutcome {
        match command {
            VideoCommand::PlayNeutral => self.play_neutral_video().await,
            VideoCommand::PlaySpecific(src) => self.play_specific_video(&src).await,
        }
    }

    fn begin_transition(&mut self, src: &str) -> TransitionOutcome {
        if self.pending.as_ref().is_some_and(|p| p.src == src) {
            return TransitionOutcome::AlreadyPending;
        }

        let superseded = self.pending.take().map(|p| p.src);
        if let Some(old) = &superseded {
            debug!("[CONTROLLER] Dropping pending preload of {}", old);
        }

        let slot = self.inactive();
        let surface = &mut self.surfaces[slot];
        surface.set_source(src);
        let ready = surface.load();
        debug!("[CONTROLLER] Preloading {} on {}", src, surface.name());

        self.pending = Some(PendingTransition {
            slot,
            src: src.to_string(),
            ready,
        });
        self.phase = Phase::Transitioning;
        self.publish();

        TransitionOutcome::Preloading {
            src: src.to_string(),
            superseded,
        }
    }

    /// The requested clip is the one on screen: drop whatever was about to
    /// replace it, and restart it if it already finished.
    async fn keep_active(&mut self) -> TransitionOutcome {
        let outcome = match self.pending.take() {
            Some(pending) => {
                debug!("[CONTROLLER] Dropping pending preload of {}", pending.src);
                self.phase = self.settled_phase();
                self.publish();
                TransitionOutcome::Cancelled { src: pending.src }
            }
            None => TransitionOutcome::Unchanged,
        };
        if self.ended.is_none() {
            return self.replay_active().await;
        }
        outcome
    }

    async fn replay_active(&mut self) -> TransitionOutcome {
        let surface = &mut self.surfaces[self.active];
        if let Err(e) = surface.play().await {
            error!("[CONTROLLER] Replay on {} failed: {}", surface.name(), e);
        }
        self.ended = Some(surface.ended());
        self.phase = self.settled_phase();
        self.publish();
        TransitionOutcome::Replayed
    }

    async fn finish_transition(&mut self, pending: PendingTransition) -> TransitionOutcome {
        let PendingTransition { slot, src, .. } = pending;
        let outgoing = self.active;

        self.surfaces[outgoing].pause();
        if let Err(e) = self.surfaces[slot].play().await {
            error!("[CONTROLLER] Playback of {} failed: {}", src, e);
        }
        self.surfaces[outgoing].set_active(false);
        self.surfaces[slot].set_active(true);
        self.active = slot;
        self.ended = Some(self.surfaces[slot].ended());
        self.phase = self.settled_phase();

        info!(
            "[CONTROLLER] Now playing {} on {} ({})",
            src,
            self.surfaces[slot].name(),
            self.phase
        );
        self.publish();
        TransitionOutcome::Swapped { slot, src }
    }

    async fn on_clip_ended(&mut self) -> TransitionOutcome {
        if self.pending.is_some() {
            // The pending swap arms a fresh listener.
            return TransitionOutcome::Unchanged;
        }
        if self.is_neutral_active() {
            return self.replay_active().await;
        }
        let neutral = self.neutral.clone();
        self.begin_transition(&neutral)
    }

    async fn next_signal(&mut self) -> Option<SurfaceSignal> {
        let Self { pending, ended, .. } = self;
        match (pending.as_mut(), ended.as_mut()) {
            (None, None) => None,
            (Some(p), None) => Some(SurfaceSignal::Ready((&mut p.ready).await.is_ok())),
            (None, Some(e)) => Some(SurfaceSignal::Ended(e.await.is_ok())),
            (Some(p), Some(e)) => Some(tokio::select! {
                r = &mut p.ready => SurfaceSignal::Ready(r.is_ok()),
                r = e => SurfaceSignal::Ended(r.is_ok()),
            }),
        }
    }

    /// Wait for the next ready/ended signal and react to it. Returns `None`
    /// when there is nothing to wait for.
    pub async fn step(&mut self) -> Option<TransitionOutcome> {
        let signal = self.next_signal().await?;
        let outcome = match signal {
            SurfaceSignal::Ready(true) => match self.pending.take() {
                Some(pending) => self.finish_transition(pending).await,
                None => TransitionOutcome::Unchanged,
            },
            SurfaceSignal::Ready(false) => {
                let src = self.pending.take().map(|p| p.src).unwrap_or_default();
                warn!("[CONTROLLER] Preload of {} never became ready", src);
                self.phase = self.settled_phase();
                self.publish();
                if self.ended.is_none() {
                    // The active clip finished while waiting on this swap.
                    let next = self.on_clip_ended().await;
                    debug!("[CONTROLLER] Resuming after failed preload -> {:?}", next);
                }
                TransitionOutcome::PreloadFailed { src }
            }
            SurfaceSignal::Ended(true) => {
                self.ended = None;
                self.on_clip_ended().await
            }
            SurfaceSignal::Ended(false) => {
                self.ended = None;
                warn!(
                    "[CONTROLLER] {} lost its end-of-playback signal",
                    self.surfaces[self.active].name()
                );
                let next = self.on_clip_ended().await;
                debug!("[CONTROLLER] Resuming after lost end -> {:?}", next);
                TransitionOutcome::EndLost
            }
        };
        Some(outcome)
    }

    /// Actor loop: serve commands and surface signals until every handle is dropped.
    pub async fn run(mut self, mut commands: mpsc::Receiver<VideoCommand>) {
        info!("[CONTROLLER] Transition loop started.");
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(command) => {
                        let outcome = self.dispatch(command).await;
                        debug!("[CONTROLLER] Request -> {:?}", outcome);
                    }
                    None => break,
                },
                Some(outcome) = self.step() => {
                    debug!("[CONTROLLER] Signal -> {:?}", outcome);
                }
            }
        }
        info!("[CONTROLLER] Transition loop stopped.");
    }
}

impl<S: VideoSurface + 'static> VideoTransitionController<S> {
    /// Start the neutral loop and move the controller into its own task.
    pub async fn spawn(mut self) -> (ControllerHandle, JoinHandle<()>) {
        self.start().await;
        let (tx, rx) = mpsc::channel(32);
        let handle = ControllerHandle {
            tx,
            snapshot: self.subscribe(),
        };
        (handle, tokio::spawn(self.run(rx)))
    }
}

/// Cloneable front door to a running controller.
#[derive(Clone)]
pub struct ControllerHandle {
    tx: mpsc::Sender<VideoCommand>,
    snapshot: watch::Receiver<PlaybackSnapshot>,
}

impl ControllerHandle {
    pub async fn send(&self, command: VideoCommand) -> Result<(), ControllerStopped> {
        self.tx.send(command).await.map_err(|_| ControllerStopped)
    }

    pub async fn play_neutral(&self) -> Result<(), ControllerStopped> {
        self.send(VideoCommand::PlayNeutral).await
    }

    pub async fn play_specific(&self, src: &str) -> Result<(), ControllerStopped> {
        self.send(VideoCommand::PlaySpecific(src.to_string())).await
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot.clone()
    }
}
