use serde::Serialize;

/// Where the two-surface controller currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    /// Nothing started yet.
    Idle,
    NeutralLooping,
    /// A clip is preloading on the inactive surface.
    Transitioning,
    /// A positive/negative clip is on screen; it returns to neutral when it ends.
    PlayingOverride,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::NeutralLooping => write!(f, "neutral loop"),
            Phase::Transitioning => write!(f, "transitioning"),
            Phase::PlayingOverride => write!(f, "override"),
        }
    }
}

/// Published after every change the controller makes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub phase: Phase,
    /// Index into the controller's two surfaces.
    pub active_slot: usize,
    pub active_source: Option<String>,
    /// Source preloading on the inactive surface, if any.
    pub pending_source: Option<String>,
}

impl Default for PlaybackSnapshot {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            active_slot: 0,
            active_source: None,
            pending_source: None,
        }
    }
}
