// MoodReel ffplay Surface
// Copyright (c) 2026 Xing_The_Creator | MoodReel
//
// Real playback on a desktop: clips are probed with ffprobe during preload
// and played in an ffplay window.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::{fired, PlaybackError, Signal, VideoSurface};

#[derive(Default)]
struct EndSlot {
    tx: Option<oneshot::Sender<()>>,
    finished: bool,
}

pub struct FfplaySurface {
    name: String,
    media_root: PathBuf,
    source: Option<String>,
    stop_tx: Option<oneshot::Sender<()>>,
    end: Arc<Mutex<EndSlot>>,
}

impl FfplaySurface {
    pub fn new(name: &str, media_root: &Path) -> Self {
        Self {
            name: name.to_string(),
            media_root: media_root.to_path_buf(),
            source: None,
            stop_tx: None,
            end: Arc::new(Mutex::new(EndSlot::default())),
        }
    }

    fn resolve(&self, src: &str) -> PathBuf {
        self.media_root.join(src)
    }

    fn stop_player(&mut self) {
        if let Some(stop) = self.stop_tx.take() {
            let _ = stop.send(());
        }
    }
}

/// Keeps a relative path that starts with `-` from being read as an option.
pub fn safe_arg_path(path: &Path) -> PathBuf {
    if path.is_relative() && path.to_string_lossy().starts_with('-') {
        Path::new(".").join(path)
    } else {
        path.to_path_buf()
    }
}

/// Clip duration in seconds, or an error if ffprobe cannot read the file.
pub async fn probe_duration(path: &Path) -> Result<f64, String> {
    let output = tokio::time::timeout(
        Duration::from_secs(10),
        Command::new("ffprobe")
            .kill_on_drop(true)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(safe_arg_path(path))
            .output(),
    )
    .await
    .map_err(|_| "ffprobe timed out".to_string())?
    .map_err(|e| format!("ffprobe failed to start: {}", e))?;

    if !output.status.success() {
        return Err(String::from_utf8_lossy(&output.stderr).trim().to_string());
    }

    String::from_utf8_lossy(&output.stdout)
        .trim()
        .parse::<f64>()
        .map_err(|_| "unreadable duration".to_string())
}

#[async_trait]
impl VideoSurface for FfplaySurface {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    fn set_source(&mut self, src: &str) {
        self.source = Some(src.to_string());
    }

    fn load(&mut self) -> Signal {
        let (tx, rx) = oneshot::channel();
        let Some(src) = self.source.clone() else {
            return rx;
        };
        let path = self.resolve(&src);
        let name = self.name.clone();

        tokio::spawn(async move {
            match probe_duration(&path).await {
                Ok(secs) if secs > 0.0 => {
                    debug!("[SURFACE] {} preloaded {:?} ({:.1}s)", name, path, secs);
                    let _ = tx.send(());
                }
                Ok(_) => warn!("[SURFACE] {} preload of {:?} found an empty clip", name, path),
                Err(e) => warn!("[SURFACE] {} preload of {:?} failed: {}", name, path, e),
            }
        });
        rx
    }

    async fn play(&mut self) -> Result<(), PlaybackError> {
        let src = self
            .source
            .clone()
            .ok_or_else(|| PlaybackError::NoSource(self.name.clone()))?;
        self.stop_player();

        let path = self.resolve(&src);
        let mut child = Command::new("ffplay")
            .arg("-autoexit")
            .arg("-loglevel")
            .arg("error")
            .arg("-window_title")
            .arg(&self.name)
            .arg(safe_arg_path(&path))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        info!("[SURFACE] {} playing {:?}", self.name, path);

        if let Ok(mut end) = self.end.lock() {
            end.finished = false;
        }

        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        self.stop_tx = Some(stop_tx);
        let end = self.end.clone();
        let name = self.name.clone();

        tokio::spawn(async move {
            tokio::select! {
                status = child.wait() => match status {
                    Ok(status) if status.success() => {
                        if let Ok(mut end) = end.lock() {
                            match end.tx.take() {
                                Some(tx) => {
                                    let _ = tx.send(());
                                }
                                None => end.finished = true,
                            }
                        }
                    }
                    failed => {
                        match failed {
                            Ok(status) => warn!("[SURFACE] {} player exited with {}", name, status),
                            Err(e) => warn!("[SURFACE] {} lost its player: {}", name, e),
                        }
                        // Dropping the sender reports the end as lost.
                        if let Ok(mut end) = end.lock() {
                            if end.tx.take().is_none() {
                                end.finished = true;
                            }
                        }
                    }
                },
                _ = stop_rx => {
                    let _ = child.kill().await;
                }
            }
        });
        Ok(())
    }

    fn pause(&mut self) {
        self.stop_player();
        if let Ok(mut end) = self.end.lock() {
            end.finished = false;
        }
    }

    fn set_active(&mut self, active: bool) {
        debug!("[SURFACE] {} active={}", self.name, active);
    }

    fn ended(&mut self) -> Signal {
        let (tx, rx) = oneshot::channel();
        match self.end.lock() {
            Ok(mut end) if end.finished => {
                end.finished = false;
                fired()
            }
            Ok(mut end) => {
                end.tx = Some(tx);
                rx
            }
            Err(_) => rx,
        }
    }
}
