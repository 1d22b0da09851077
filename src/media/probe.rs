// src/media/probe.rs - Container duration probe (ffprobe)

use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;

/// Measures a media file's duration in seconds.
///
/// Implementations never fail past this boundary: `0.0` means
/// "unusable media" and is the only error signal callers see.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn duration(&self, path: &Path) -> f64;
}

/// ffprobe-backed probe. Asks for the container-level duration only.
pub struct Ffprobe;

#[async_trait]
impl MediaProbe for Ffprobe {
    async fn duration(&self, path: &Path) -> f64 {
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
            ])
            .arg(path)
            .output()
            .await;

        let output = match output {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("ffprobe could not be spawned: {}", e);
                return 0.0;
            }
        };

        if !output.status.success() {
            tracing::warn!("ffprobe exited with {} for {}", output.status, path.display());
            return 0.0;
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        match stdout.trim().parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds >= 0.0 => seconds,
            _ => {
                tracing::warn!("ffprobe output was not a duration: {:?}", stdout.trim());
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Whether or not ffprobe is installed, a missing or garbage file
    // must come back as 0.0 rather than an error.

    #[tokio::test]
    async fn test_missing_file_is_zero() {
        let d = Ffprobe.duration(Path::new("/nonexistent/clip.mp4")).await;
        assert_eq!(d, 0.0);
    }

    #[tokio::test]
    async fn test_garbage_file_is_zero() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("garbage.mp4");
        tokio::fs::write(&path, b"not a video at all").await.unwrap();
        let d = Ffprobe.duration(&path).await;
        assert_eq!(d, 0.0);
    }
}
