// src/media/files.rs - Per-chat working files
//
// Every chat gets its own directory under the media base dir. File
// names carry unix seconds so successive uploads within one session
// do not collide; the stamp gives no ordering guarantee.

use std::path::{Path, PathBuf};

use chrono::Utc;

pub struct MediaDirs {
    base: PathBuf,
}

impl MediaDirs {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn chat_dir(&self, chat_id: &str) -> PathBuf {
        self.base.join(chat_id)
    }

    /// Create the chat's working directory if absent. Idempotent.
    pub async fn ensure_chat_dir(&self, chat_id: &str) -> std::io::Result<PathBuf> {
        let dir = self.chat_dir(chat_id);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Recursively remove the chat's directory and everything in it.
    /// Best-effort: failures are logged, never propagated.
    pub async fn cleanup(&self, chat_id: &str) {
        let dir = self.chat_dir(chat_id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => tracing::debug!("Removed working dir {}", dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::error!("Cleanup of {} failed: {}", dir.display(), e),
        }
    }

    /// Remove a single file, e.g. a download that failed the duration
    /// probe. Best-effort.
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = tokio::fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!("Could not remove {}: {}", path.display(), e);
            }
        }
    }

    pub fn input_video_path(&self, chat_id: &str) -> PathBuf {
        self.chat_dir(chat_id)
            .join(format!("input_{}.mp4", Utc::now().timestamp()))
    }

    pub fn tts_audio_path(&self, chat_id: &str) -> PathBuf {
        self.chat_dir(chat_id)
            .join(format!("tts_{}.mp3", Utc::now().timestamp()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_chat_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = MediaDirs::new(tmp.path());
        let first = dirs.ensure_chat_dir("42").await.unwrap();
        let second = dirs.ensure_chat_dir("42").await.unwrap();
        assert_eq!(first, second);
        assert!(first.is_dir());
    }

    #[tokio::test]
    async fn test_cleanup_removes_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = MediaDirs::new(tmp.path());
        let dir = dirs.ensure_chat_dir("42").await.unwrap();
        tokio::fs::write(dir.join("input_1.mp4"), b"x").await.unwrap();
        dirs.cleanup("42").await;
        assert!(!dir.exists());
    }

    #[tokio::test]
    async fn test_cleanup_of_absent_dir_is_quiet() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = MediaDirs::new(tmp.path());
        dirs.cleanup("nobody").await;
    }

    #[tokio::test]
    async fn test_discard_absent_file_is_quiet() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = MediaDirs::new(tmp.path());
        dirs.discard(&tmp.path().join("gone.mp4")).await;
    }

    #[test]
    fn test_path_layout() {
        let dirs = MediaDirs::new("/base");
        let video = dirs.input_video_path("42");
        let audio = dirs.tts_audio_path("42");

        assert_eq!(video.parent().unwrap(), Path::new("/base/42"));
        let name = video.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("input_") && name.ends_with(".mp4"));

        let name = audio.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("tts_") && name.ends_with(".mp3"));
    }
}
