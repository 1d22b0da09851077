// src/bot/mod.rs - Conversation state machine
//
// Walks a chat through upload video -> pick voice -> send text, keeping
// the session and its working files in step. Everything a user can get
// wrong is answered conversationally; nothing in here is fatal.

pub mod reaper;
pub mod session;
pub mod voices;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::infra::errors::VoxoverError;
use crate::media::files::MediaDirs;
use crate::media::probe::MediaProbe;
use session::{ChatGate, Session, SessionState, SessionStore};

/// Largest attachment we will download (50 MiB).
pub const MAX_VIDEO_BYTES: u64 = 50 * 1024 * 1024;

/// Longest text we will hand to the synthesizer.
pub const MAX_TEXT_CHARS: usize = 5000;

/// Outbound messaging surface the state machine talks through.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), VoxoverError>;

    /// Present the voice menu as an inline keyboard, one button per
    /// catalog entry.
    async fn send_voice_menu(&self, chat_id: &str, title: &str) -> Result<(), VoxoverError>;

    /// Acknowledge a menu tap and replace the menu message with `text`.
    async fn confirm_choice(
        &self,
        chat_id: &str,
        callback_id: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), VoxoverError>;

    /// Fetch the attachment behind `file_id` into `dest`.
    async fn download_file(&self, file_id: &str, dest: &Path) -> Result<(), VoxoverError>;
}

/// Speech synthesis surface. Provider errors come back as `Err`, with
/// the underlying cause already logged at the adapter.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        language: &str,
        out: &Path,
    ) -> Result<(), VoxoverError>;
}

/// One event routed out of a platform update.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    Start,
    Help,
    Voices,
    Cancel,
    Video {
        file_id: String,
        file_size: u64,
    },
    VoiceChosen {
        callback_id: String,
        message_id: i64,
        name: String,
    },
    Text(String),
}

/// User-facing reply texts.
pub mod replies {
    pub const WELCOME: &str =
        "🎬 Welcome to Voice Generator Bot!\n\nSend me a video file (max 50MB) to begin.";
    pub const HELP: &str =
        "Use /start to begin.\nSend a video, choose a voice, then text → get AI voice video.";
    pub const NEED_START: &str = "⚠️ Send /start first.";
    pub const VIDEO_REJECTED: &str = "⚠️ Invalid or too large video.";
    pub const DOWNLOADING: &str = "⏳ Downloading video...";
    pub const VIDEO_FAILED: &str = "❌ Could not process video.";
    pub const CHOOSE_VOICE: &str = "Select a voice:";
    pub const SESSION_EXPIRED: &str = "⚠️ Session expired. /start again.";
    pub const UNKNOWN_VOICE: &str = "⚠️ That voice is not on the menu. /voices lists the options.";
    pub const NEED_START_TEXT: &str = "Send /start to begin.";
    pub const TEXT_TOO_LONG: &str = "❌ Text too long.";
    pub const GENERATING: &str = "🎤 Generating voice...";
    pub const SYNTHESIS_FAILED: &str = "❌ Voice generation failed.";
    pub const VOICE_READY: &str = "✅ Voice ready!";
    pub const CANCELLED: &str = "❌ Cancelled. Send /start to restart.";
}

pub struct Conversation {
    sessions: SessionStore,
    gate: ChatGate,
    dirs: MediaDirs,
    messenger: Arc<dyn Messenger>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    probe: Arc<dyn MediaProbe>,
}

impl Conversation {
    pub fn new(
        messenger: Arc<dyn Messenger>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        probe: Arc<dyn MediaProbe>,
        dirs: MediaDirs,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            gate: ChatGate::new(),
            dirs,
            messenger,
            synthesizer,
            probe,
        }
    }

    /// Entry point for the transport layer. Events for the same chat
    /// are handled strictly one at a time.
    pub async fn dispatch(&self, chat_id: &str, event: ChatEvent) {
        let lock = self.gate.lock_for(chat_id);
        let _serialized = lock.lock().await;
        if let Err(e) = self.handle(chat_id, event).await {
            tracing::error!("Event handling for chat {} failed: {}", chat_id, e);
        }
    }

    /// Current session snapshot for a chat.
    pub fn session(&self, chat_id: &str) -> Option<Session> {
        self.sessions.get(chat_id)
    }

    /// Chats idle longer than `ttl`. Used by the reaper.
    pub fn idle_chats(&self, ttl: chrono::Duration) -> Vec<String> {
        self.sessions.idle_chats(ttl)
    }

    /// Drop an idle session and its files. Used by the reaper.
    pub async fn expire(&self, chat_id: &str) {
        let lock = self.gate.lock_for(chat_id);
        let _serialized = lock.lock().await;
        if self.sessions.delete(chat_id).is_some() {
            self.dirs.cleanup(chat_id).await;
            tracing::info!("Expired idle session for chat {}", chat_id);
        }
    }

    async fn handle(&self, chat_id: &str, event: ChatEvent) -> Result<(), VoxoverError> {
        match event {
            ChatEvent::Start => self.handle_start(chat_id).await,
            ChatEvent::Help => self.messenger.send_text(chat_id, replies::HELP).await,
            ChatEvent::Voices => self.handle_voices(chat_id).await,
            ChatEvent::Cancel => self.handle_cancel(chat_id).await,
            ChatEvent::Video { file_id, file_size } => {
                self.handle_video(chat_id, &file_id, file_size).await
            }
            ChatEvent::VoiceChosen {
                callback_id,
                message_id,
                name,
            } => {
                self.handle_voice_chosen(chat_id, &callback_id, message_id, &name)
                    .await
            }
            ChatEvent::Text(text) => self.handle_text(chat_id, &text).await,
        }
    }

    async fn handle_start(&self, chat_id: &str) -> Result<(), VoxoverError> {
        // A restart abandons whatever the previous session downloaded;
        // release those files before the new session takes the dir over.
        if self.sessions.get(chat_id).is_some() {
            self.dirs.cleanup(chat_id).await;
        }
        self.sessions.create(chat_id);
        self.dirs.ensure_chat_dir(chat_id).await?;
        self.messenger.send_text(chat_id, replies::WELCOME).await
    }

    async fn handle_voices(&self, chat_id: &str) -> Result<(), VoxoverError> {
        let names = voices::display_names().join(", ");
        self.messenger
            .send_text(chat_id, &format!("🎤 Voices:\n{names}"))
            .await
    }

    async fn handle_cancel(&self, chat_id: &str) -> Result<(), VoxoverError> {
        if self.sessions.delete(chat_id).is_some() {
            self.dirs.cleanup(chat_id).await;
        }
        self.messenger.send_text(chat_id, replies::CANCELLED).await
    }

    async fn handle_video(
        &self,
        chat_id: &str,
        file_id: &str,
        file_size: u64,
    ) -> Result<(), VoxoverError> {
        match self.sessions.get(chat_id) {
            Some(session) if session.state == SessionState::AwaitingVideo => {}
            _ => return self.messenger.send_text(chat_id, replies::NEED_START).await,
        }

        // Size gate runs before any download happens.
        if file_size > MAX_VIDEO_BYTES {
            return self
                .messenger
                .send_text(chat_id, replies::VIDEO_REJECTED)
                .await;
        }

        self.messenger.send_text(chat_id, replies::DOWNLOADING).await?;
        self.dirs.ensure_chat_dir(chat_id).await?;
        let video_path = self.dirs.input_video_path(chat_id);

        if let Err(e) = self.messenger.download_file(file_id, &video_path).await {
            tracing::error!("Video download for chat {} failed: {}", chat_id, e);
            return self
                .messenger
                .send_text(chat_id, replies::VIDEO_FAILED)
                .await;
        }

        let duration = self.probe.duration(&video_path).await;
        if duration == 0.0 {
            // Unusable container; the download is not kept around.
            self.dirs.discard(&video_path).await;
            return self
                .messenger
                .send_text(chat_id, replies::VIDEO_FAILED)
                .await;
        }

        self.sessions.update(chat_id, |session| {
            session.video_path = Some(video_path.clone());
            session.video_duration = duration;
            session.state = SessionState::ChoosingVoice;
        });
        self.messenger
            .send_voice_menu(chat_id, replies::CHOOSE_VOICE)
            .await
    }

    async fn handle_voice_chosen(
        &self,
        chat_id: &str,
        callback_id: &str,
        message_id: i64,
        name: &str,
    ) -> Result<(), VoxoverError> {
        // Only session existence gates a menu tap; any state accepts it.
        if self.sessions.get(chat_id).is_none() {
            return self
                .messenger
                .confirm_choice(chat_id, callback_id, message_id, replies::SESSION_EXPIRED)
                .await;
        }

        let Some(voice_id) = voices::voice_id(name) else {
            return self
                .messenger
                .confirm_choice(chat_id, callback_id, message_id, replies::UNKNOWN_VOICE)
                .await;
        };
        let language = voices::language_for(name);

        // Voice and language always change together.
        self.sessions.update(chat_id, |session| {
            session.selected_voice = Some(voice_id.to_string());
            session.language = language.to_string();
            session.state = SessionState::AwaitingText;
        });

        let text = format!("✅ Voice selected: {name}. Now send me the text.");
        self.messenger
            .confirm_choice(chat_id, callback_id, message_id, &text)
            .await
    }

    async fn handle_text(&self, chat_id: &str, text: &str) -> Result<(), VoxoverError> {
        let session = match self.sessions.get(chat_id) {
            Some(session) if session.state == SessionState::AwaitingText => session,
            _ => {
                return self
                    .messenger
                    .send_text(chat_id, replies::NEED_START_TEXT)
                    .await
            }
        };

        if text.chars().count() > MAX_TEXT_CHARS {
            return self
                .messenger
                .send_text(chat_id, replies::TEXT_TOO_LONG)
                .await;
        }

        // AwaitingText is only reachable through a voice choice.
        let Some(voice_id) = session.selected_voice else {
            return self
                .messenger
                .send_text(chat_id, replies::NEED_START_TEXT)
                .await;
        };

        self.messenger.send_text(chat_id, replies::GENERATING).await?;
        let audio_path = self.dirs.tts_audio_path(chat_id);

        if let Err(e) = self
            .synthesizer
            .synthesize(text, &voice_id, &session.language, &audio_path)
            .await
        {
            // The user may retry by resending the text.
            tracing::error!("Synthesis for chat {} failed: {}", chat_id, e);
            return self
                .messenger
                .send_text(chat_id, replies::SYNTHESIS_FAILED)
                .await;
        }

        tracing::info!(
            "Voice track ready for chat {}: {}",
            chat_id,
            audio_path.display()
        );
        self.messenger.send_text(chat_id, replies::VOICE_READY).await
    }
}
