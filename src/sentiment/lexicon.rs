// MoodReel Lexicon Classifier
// Copyright (c) 2026 Xing_The_Creator | MoodReel
//
// Offline fallback when no inference endpoint is configured. Counts words
// from two small lexicons; a negator flips the polarity of a hit that
// follows within a few words in the same clause.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use super::{rank, Classifier, ClassifierLoader, SentimentError, SentimentScore};

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "brilliant", "cool", "cute", "delighted",
    "enjoy", "excellent", "fantastic", "fun", "glad", "good", "great", "happy", "kind",
    "like", "love", "lovely", "nice", "perfect", "pretty", "smart", "sweet", "thank",
    "thanks", "wonderful", "wow", "yay",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "annoying", "awful", "bad", "boring", "disappointed", "dislike", "dumb",
    "hate", "horrible", "hurt", "lame", "mad", "mean", "nasty", "sad", "sick", "sorry",
    "stupid", "terrible", "tired", "ugly", "upset", "useless", "worst", "wrong",
];

const NEGATORS: &[&str] = &["not", "no", "never", "dont", "don't", "isnt", "isn't", "wasnt", "wasn't"];

/// Words a negator reaches past itself.
const NEGATION_WINDOW: usize = 3;

const CLAUSE_BREAKS: &[char] = &[',', '.', ';', ':', '!', '?'];

pub struct LexiconClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self {
            positive: POSITIVE_WORDS.iter().copied().collect(),
            negative: NEGATIVE_WORDS.iter().copied().collect(),
        }
    }
}

impl LexiconClassifier {
    /// (positive hits, negative hits)
    fn count(&self, text: &str) -> (u32, u32) {
        let lower = text.to_lowercase();
        let mut positive = 0;
        let mut negative = 0;

        for clause in lower.split(CLAUSE_BREAKS) {
            let mut negate = 0;
            for word in clause
                .split(|c: char| !(c.is_alphanumeric() || c == '\''))
                .filter(|w| !w.is_empty())
            {
                if NEGATORS.contains(&word) {
                    negate = NEGATION_WINDOW;
                    continue;
                }
                let hit = if self.positive.contains(word) {
                    Some(true)
                } else if self.negative.contains(word) {
                    Some(false)
                } else {
                    None
                };
                match hit {
                    Some(is_positive) => {
                        if is_positive != (negate > 0) {
                            positive += 1;
                        } else {
                            negative += 1;
                        }
                        negate = 0;
                    }
                    None => negate = negate.saturating_sub(1),
                }
            }
        }
        (positive, negative)
    }
}

#[async_trait]
impl Classifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<SentimentScore>, SentimentError> {
        let (positive, negative) = self.count(text);
        if positive == negative {
            return Ok(vec![SentimentScore::new("NEUTRAL", 1.0)]);
        }

        let total = (positive + negative) as f32;
        let lead = positive.abs_diff(negative) as f32;
        let top = 0.5 + 0.5 * lead / total;
        let (winner, loser) = if positive > negative {
            ("POSITIVE", "NEGATIVE")
        } else {
            ("NEGATIVE", "POSITIVE")
        };

        Ok(rank(vec![
            SentimentScore::new(winner, top),
            SentimentScore::new(loser, 1.0 - top),
        ]))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}

pub struct LexiconLoader;

#[async_trait]
impl ClassifierLoader for LexiconLoader {
    async fn load(&self) -> Result<Arc<dyn Classifier>, SentimentError> {
        info!("[SENTIMENT] No inference endpoint configured, using the offline lexicon.");
        Ok(Arc::new(LexiconClassifier::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn top(text: &str) -> SentimentScore {
        LexiconClassifier::default()
            .classify(text)
            .await
            .unwrap()
            .remove(0)
    }

    #[tokio::test]
    async fn test_positive_text() {
        let result = top("I love this, you are wonderful!").await;
        assert_eq!(result.label, "POSITIVE");
        assert_eq!(result.score, 1.0);
    }

    #[tokio::test]
    async fn test_negative_text() {
        assert_eq!(top("This is terrible and boring").await.label, "NEGATIVE");
    }

    #[tokio::test]
    async fn test_negation_flips_polarity() {
        assert_eq!(top("that was not good").await.label, "NEGATIVE");
        assert_eq!(top("I'm not sad at all").await.label, "POSITIVE");
        assert_eq!(top("not really that good").await.label, "NEGATIVE");
    }

    #[tokio::test]
    async fn test_negation_fades_with_distance_and_clauses() {
        assert_eq!(top("no idea why, but great").await.label, "POSITIVE");
        assert_eq!(
            top("never expected the ending to feel this great").await.label,
            "POSITIVE"
        );
    }

    #[tokio::test]
    async fn test_no_signal_is_neutral() {
        assert_eq!(top("the train leaves at noon").await.label, "NEUTRAL");
        assert_eq!(top("good but bad").await.label, "NEUTRAL");
    }

    #[tokio::test]
    async fn test_mixed_text_scores_below_one() {
        let result = top("great, great, but awful").await;
        assert_eq!(result.label, "POSITIVE");
        assert!(result.score > 0.5 && result.score < 1.0);
    }
}
