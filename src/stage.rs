// MoodReel Stage
// Copyright (c) 2026 Xing_The_Creator | MoodReel
//
// Glue between the input line, the favorability updater and the running
// video controller.

use rand::rngs::StdRng;
use rand::Rng;

use crate::clips::VideoSelection;
use crate::controller::{ControllerHandle, ControllerStopped};
use crate::favorability::{Analysis, Favorability, FavorabilityUpdater};

/// Shown while a classification is in flight.
pub const ANALYZING: &str = "Analyzing...";

const BAR_CELLS: usize = 20;

/// What the page shows after one submission.
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    /// Result line: the emotion summary or a failure message.
    pub message: String,
    pub favorability: Favorability,
    pub analysis: Option<Analysis>,
}

impl StageReport {
    pub fn render(&self) -> String {
        format!(
            "{}\nFavorability {}",
            self.message,
            self.favorability.render_bar(BAR_CELLS)
        )
    }
}

pub struct Stage<R = StdRng> {
    updater: FavorabilityUpdater<R>,
    controller: ControllerHandle,
}

impl<R: Rng> Stage<R> {
    pub fn new(updater: FavorabilityUpdater<R>, controller: ControllerHandle) -> Self {
        Self {
            updater,
            controller,
        }
    }

    pub fn favorability(&self) -> Favorability {
        self.updater.favorability()
    }

    pub fn controller(&self) -> &ControllerHandle {
        &self.controller
    }

    /// `Ok(None)` for empty input. Classifier failures become a report with
    /// the failure message; only a stopped controller is an error.
    pub async fn submit(&mut self, text: &str) -> Result<Option<StageReport>, ControllerStopped> {
        match self.updater.analyze(text).await {
            Ok(None) => Ok(None),
            Ok(Some(analysis)) => {
                match analysis.selection {
                    VideoSelection::Neutral => self.controller.play_neutral().await?,
                    _ => self.controller.play_specific(&analysis.clip).await?,
                }
                Ok(Some(StageReport {
                    message: analysis.summary(),
                    favorability: analysis.favorability,
                    analysis: Some(analysis),
                }))
            }
            Err(e) => Ok(Some(StageReport {
                message: e.to_string(),
                favorability: self.updater.favorability(),
                analysis: None,
            })),
        }
    }
}
