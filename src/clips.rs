// MoodReel Clip Library
// Copyright (c) 2026 Xing_The_Creator | MoodReel

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Which clip a classification asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VideoSelection {
    Neutral,
    /// Index into the positive clip set.
    Positive(usize),
    Negative,
}

#[derive(Debug, Error)]
pub enum ClipError {
    #[error("could not read clip library: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid clip library: {0}")]
    Json(#[from] serde_json::Error),

    #[error("clip library needs at least one positive clip")]
    NoPositiveClips,

    #[error("empty path for the {0} clip")]
    EmptyPath(&'static str),
}

/// Paths are relative to the site/media root, exactly as the page requests them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipLibrary {
    pub neutral: String,
    pub positive: Vec<String>,
    pub negative: String,
}

impl Default for ClipLibrary {
    fn default() -> Self {
        Self {
            neutral: "视频资源/3D 建模图片制作.mp4".to_string(),
            positive: vec![
                "视频资源/jimeng-2025-07-16-1043-笑着优雅的左右摇晃，过一会儿手扶着下巴，保持微笑.mp4"
                    .to_string(),
                "视频资源/jimeng-2025-07-16-4437-比耶，然后微笑着优雅的左右摇晃.mp4".to_string(),
                "视频资源/生成加油视频.mp4".to_string(),
                "视频资源/生成跳舞视频.mp4".to_string(),
            ],
            negative: "视频资源/负面/jimeng-2025-07-16-9418-双手叉腰，嘴巴一直在嘟囔，表情微微生气.mp4"
                .to_string(),
        }
    }
}

impl ClipLibrary {
    pub fn from_json_str(raw: &str) -> Result<Self, ClipError> {
        let library: Self = serde_json::from_str(raw)?;
        library.validate()?;
        Ok(library)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ClipError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ClipError> {
        if self.positive.is_empty() {
            return Err(ClipError::NoPositiveClips);
        }
        if self.neutral.trim().is_empty() {
            return Err(ClipError::EmptyPath("neutral"));
        }
        if self.negative.trim().is_empty() {
            return Err(ClipError::EmptyPath("negative"));
        }
        if self.positive.iter().any(|p| p.trim().is_empty()) {
            return Err(ClipError::EmptyPath("positive"));
        }
        Ok(())
    }

    pub fn resolve(&self, selection: VideoSelection) -> &str {
        match selection {
            VideoSelection::Neutral => &self.neutral,
            VideoSelection::Negative => &self.negative,
            VideoSelection::Positive(i) => self
                .positive
                .get(i)
                .map(String::as_str)
                .unwrap_or(&self.neutral),
        }
    }

    pub fn all(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.neutral.as_str())
            .chain(self.positive.iter().map(String::as_str))
            .chain(std::iter::once(self.negative.as_str()))
    }

    /// Clips that do not exist under `root`.
    pub fn missing_under(&self, root: &Path) -> Vec<PathBuf> {
        self.all()
            .map(|clip| root.join(clip))
            .filter(|path| !path.is_file())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_library_is_valid() {
        let library = ClipLibrary::default();
        assert!(library.validate().is_ok());
        assert_eq!(library.positive.len(), 4);
        assert_eq!(library.all().count(), 6);
    }

    #[test]
    fn test_resolve_selection() {
        let library = ClipLibrary::default();
        assert_eq!(library.resolve(VideoSelection::Neutral), library.neutral);
        assert_eq!(library.resolve(VideoSelection::Negative), library.negative);
        assert_eq!(library.resolve(VideoSelection::Positive(2)), library.positive[2]);
        assert_eq!(library.resolve(VideoSelection::Positive(99)), library.neutral);
    }

    #[test]
    fn test_json_without_positive_clips_is_rejected() {
        let raw = r#"{"neutral": "n.mp4", "positive": [], "negative": "x.mp4"}"#;
        assert!(matches!(
            ClipLibrary::from_json_str(raw),
            Err(ClipError::NoPositiveClips)
        ));
    }

    #[test]
    fn test_json_library_loads() {
        let raw = r#"{"neutral": "n.mp4", "positive": ["p1.mp4", "p2.mp4"], "negative": "x.mp4"}"#;
        let library = ClipLibrary::from_json_str(raw).unwrap();
        assert_eq!(library.positive, vec!["p1.mp4", "p2.mp4"]);
    }

    #[test]
    fn test_missing_clips_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("n.mp4"), b"").unwrap();
        let library = ClipLibrary {
            neutral: "n.mp4".to_string(),
            positive: vec!["p.mp4".to_string()],
            negative: "x.mp4".to_string(),
        };
        let missing = library.missing_under(dir.path());
        assert_eq!(missing.len(), 2);
        assert!(missing.contains(&dir.path().join("p.mp4")));
    }
}
