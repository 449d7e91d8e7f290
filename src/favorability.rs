// MoodReel Favorability Updater
// Copyright (c) 2026 Xing_The_Creator | MoodReel
//
// Turns one line of user text into a favorability change and a clip choice.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

use crate::clips::{ClipLibrary, VideoSelection};
use crate::sentiment::{Classifier, ClassifierLoader, SentimentError, SentimentLabel};

pub const INITIAL_FAVORABILITY: u8 = 65;
pub const FAVORABILITY_STEP: i32 = 5;

/// Always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Favorability(u8);

impl Favorability {
    pub const MIN: u8 = 0;
    pub const MAX: u8 = 100;

    pub fn new(value: i32) -> Self {
        Self(value.clamp(Self::MIN as i32, Self::MAX as i32) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn apply(self, delta: i32) -> Self {
        Self::new(self.0 as i32 + delta)
    }

    /// CSS width of the favorability bar.
    pub fn width(self) -> String {
        format!("{}%", self.0)
    }

    /// Proportional text bar, `cells` wide.
    pub fn render_bar(self, cells: usize) -> String {
        let filled = cells * self.0 as usize / Self::MAX as usize;
        format!(
            "[{}{}] {}",
            "#".repeat(filled),
            "-".repeat(cells - filled),
            self.width()
        )
    }
}

impl Default for Favorability {
    fn default() -> Self {
        Self(INITIAL_FAVORABILITY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub delta: i32,
    pub selection: VideoSelection,
}

/// POSITIVE: +5 and a random positive clip. NEGATIVE: -5 and the negative
/// clip. Anything else: no change, back to the neutral loop.
pub fn decide<R: Rng>(label: &SentimentLabel, positive_clips: usize, rng: &mut R) -> Decision {
    match label {
        SentimentLabel::Positive if positive_clips > 0 => Decision {
            delta: FAVORABILITY_STEP,
            selection: VideoSelection::Positive(rng.gen_range(0..positive_clips)),
        },
        SentimentLabel::Positive => Decision {
            delta: FAVORABILITY_STEP,
            selection: VideoSelection::Neutral,
        },
        SentimentLabel::Negative => Decision {
            delta: -FAVORABILITY_STEP,
            selection: VideoSelection::Negative,
        },
        SentimentLabel::Other(_) => Decision {
            delta: 0,
            selection: VideoSelection::Neutral,
        },
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub label: SentimentLabel,
    pub score: f32,
    pub delta: i32,
    pub favorability: Favorability,
    pub selection: VideoSelection,
    pub clip: String,
}

impl Analysis {
    pub fn summary(&self) -> String {
        format!("Emotion: {}, score: {:.2}", self.label, self.score)
    }
}

/// The display text of each variant is what the user sees.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Sorry, the sentiment model failed to load.")]
    ModelLoad(#[source] SentimentError),

    #[error("An error occurred during analysis.")]
    Classification(#[source] SentimentError),
}

pub struct FavorabilityUpdater<R = StdRng> {
    loader: Arc<dyn ClassifierLoader>,
    classifier: Option<Arc<dyn Classifier>>,
    favorability: Favorability,
    clips: ClipLibrary,
    rng: R,
}

impl FavorabilityUpdater<StdRng> {
    pub fn new(loader: Arc<dyn ClassifierLoader>, clips: ClipLibrary) -> Self {
        Self::with_rng(loader, clips, StdRng::from_entropy())
    }
}

impl<R: Rng> FavorabilityUpdater<R> {
    pub fn with_rng(loader: Arc<dyn ClassifierLoader>, clips: ClipLibrary, rng: R) -> Self {
        Self {
            loader,
            classifier: None,
            favorability: Favorability::default(),
            clips,
            rng,
        }
    }

    pub fn favorability(&self) -> Favorability {
        self.favorability
    }

    pub fn set_favorability(&mut self, favorability: Favorability) {
        self.favorability = favorability;
    }

    pub fn clips(&self) -> &ClipLibrary {
        &self.clips
    }

    pub fn is_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    async fn classifier(&mut self) -> Result<Arc<dyn Classifier>, AnalysisError> {
        if let Some(classifier) = &self.classifier {
            return Ok(classifier.clone());
        }
        match self.loader.load().await {
            Ok(classifier) => {
                info!("[SENTIMENT] Classifier '{}' ready", classifier.name());
                self.classifier = Some(classifier.clone());
                Ok(classifier)
            }
            Err(e) => {
                error!("[SENTIMENT] Model load failed: {}", e);
                Err(AnalysisError::ModelLoad(e))
            }
        }
    }

    /// `Ok(None)` for empty input: nothing is classified and nothing changes.
    pub async fn analyze(&mut self, text: &str) -> Result<Option<Analysis>, AnalysisError> {
        if text.is_empty() {
            return Ok(None);
        }

        let classifier = self.classifier().await?;
        let ranked = classifier.classify(text).await.map_err(|e| {
            error!("[SENTIMENT] Analysis failed: {}", e);
            AnalysisError::Classification(e)
        })?;
        let top = ranked
            .into_iter()
            .next()
            .ok_or(AnalysisError::Classification(SentimentError::Empty))?;

        let label = SentimentLabel::parse(&top.label);
        let decision = decide(&label, self.clips.positive.len(), &mut self.rng);
        self.favorability = self.favorability.apply(decision.delta);
        let clip = self.clips.resolve(decision.selection).to_string();

        info!(
            "[SENTIMENT] {} ({:.2}) -> favorability {} ({:+})",
            label,
            top.score,
            self.favorability.value(),
            decision.delta
        );

        Ok(Some(Analysis {
            label,
            score: top.score,
            delta: decision.delta,
            favorability: self.favorability,
            selection: decision.selection,
            clip,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_favorability_clamps() {
        assert_eq!(Favorability::new(-20).value(), 0);
        assert_eq!(Favorability::new(140).value(), 100);
        assert_eq!(Favorability::new(0).apply(-5).value(), 0);
        assert_eq!(Favorability::new(98).apply(5).value(), 100);
        assert_eq!(Favorability::default().value(), 65);
    }

    #[test]
    fn test_any_delta_sequence_stays_in_bounds() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut favorability = Favorability::default();
        for _ in 0..2_000 {
            let delta = *[-5, 0, 5].get(rng.gen_range(0..3)).unwrap();
            favorability = favorability.apply(delta);
            assert!(favorability.value() <= Favorability::MAX);
        }
    }

    #[test]
    fn test_bar_is_proportional() {
        assert_eq!(Favorability::new(70).width(), "70%");
        assert_eq!(Favorability::new(50).render_bar(10), "[#####-----] 50%");
        assert_eq!(Favorability::new(0).render_bar(4), "[----] 0%");
        assert_eq!(Favorability::new(100).render_bar(4), "[####] 100%");
    }

    #[test]
    fn test_decision_table() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let decision = decide(&SentimentLabel::Positive, 4, &mut rng);
            assert_eq!(decision.delta, 5);
            assert!(matches!(decision.selection, VideoSelection::Positive(i) if i < 4));
        }
        assert_eq!(
            decide(&SentimentLabel::Negative, 4, &mut rng),
            Decision {
                delta: -5,
                selection: VideoSelection::Negative
            }
        );
        assert_eq!(
            decide(&SentimentLabel::Other("NEUTRAL".into()), 4, &mut rng),
            Decision {
                delta: 0,
                selection: VideoSelection::Neutral
            }
        );
    }

    #[test]
    fn test_summary_rounds_score() {
        let analysis = Analysis {
            label: SentimentLabel::Positive,
            score: 0.98765,
            delta: 5,
            favorability: Favorability::new(70),
            selection: VideoSelection::Positive(0),
            clip: "p.mp4".to_string(),
        };
        assert_eq!(analysis.summary(), "Emotion: POSITIVE, score: 0.99");
    }
}
