// src/telegram/mod.rs - Telegram Bot API client and update routing
//
// Hand-rolled over reqwest (https://core.telegram.org/bots/api).

pub mod types;

use std::path::Path;

use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::io::AsyncWriteExt;

use crate::bot::{voices, ChatEvent, Messenger};
use crate::infra::errors::VoxoverError;
use types::{ApiResponse, File, InlineKeyboardButton, InlineKeyboardMarkup, Update};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

pub struct TelegramClient {
    client: reqwest::Client,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(bot_token: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            bot_token,
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!("{TELEGRAM_API_BASE}/bot{}/{method}", self.bot_token)
    }

    fn file_url(&self, file_path: &str) -> String {
        format!("{TELEGRAM_API_BASE}/file/bot{}/{file_path}", self.bot_token)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        body: serde_json::Value,
    ) -> Result<T, VoxoverError> {
        let resp: ApiResponse<T> = self
            .client
            .post(self.api_url(method))
            .json(&body)
            .send()
            .await
            .map_err(|e| VoxoverError::Telegram(format!("{method}: {e}")))?
            .json()
            .await
            .map_err(|e| VoxoverError::Telegram(format!("{method}: {e}")))?;

        if !resp.ok {
            return Err(VoxoverError::Telegram(format!(
                "{method} failed: {}",
                resp.description.unwrap_or_else(|| "unknown".into())
            )));
        }
        resp.result
            .ok_or_else(|| VoxoverError::Telegram(format!("{method}: empty result")))
    }

    /// Validate the bot token by calling getMe.
    pub async fn validate(&self) -> Result<String, VoxoverError> {
        #[derive(Deserialize)]
        struct BotUser {
            username: Option<String>,
            first_name: Option<String>,
        }

        let me: BotUser = self.call("getMe", serde_json::json!({})).await?;
        Ok(format!(
            "@{}",
            me.username
                .unwrap_or_else(|| me.first_name.unwrap_or_default())
        ))
    }

    /// One long-poll round: updates after `offset`, blocking up to
    /// `timeout_secs` server-side.
    pub async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, VoxoverError> {
        self.call(
            "getUpdates",
            serde_json::json!({ "offset": offset, "timeout": timeout_secs }),
        )
        .await
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), VoxoverError> {
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                serde_json::json!({ "chat_id": chat_id, "text": text }),
            )
            .await?;
        Ok(())
    }

    async fn send_voice_menu(&self, chat_id: &str, title: &str) -> Result<(), VoxoverError> {
        let keyboard = InlineKeyboardMarkup {
            inline_keyboard: voices::VOICES
                .iter()
                .map(|(name, _)| {
                    vec![InlineKeyboardButton {
                        text: voices::display_name(name),
                        callback_data: format!("voice_{name}"),
                    }]
                })
                .collect(),
        };
        let _: serde_json::Value = self
            .call(
                "sendMessage",
                serde_json::json!({
                    "chat_id": chat_id,
                    "text": title,
                    "reply_markup": keyboard,
                }),
            )
            .await?;
        Ok(())
    }

    async fn confirm_choice(
        &self,
        chat_id: &str,
        callback_id: &str,
        message_id: i64,
        text: &str,
    ) -> Result<(), VoxoverError> {
        // Stop the client-side spinner first, then replace the menu.
        let _: serde_json::Value = self
            .call(
                "answerCallbackQuery",
                serde_json::json!({ "callback_query_id": callback_id }),
            )
            .await?;
        let _: serde_json::Value = self
            .call(
                "editMessageText",
                serde_json::json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                    "text": text,
                }),
            )
            .await?;
        Ok(())
    }

    async fn download_file(&self, file_id: &str, dest: &Path) -> Result<(), VoxoverError> {
        let file: File = self
            .call("getFile", serde_json::json!({ "file_id": file_id }))
            .await?;
        let Some(file_path) = file.file_path else {
            return Err(VoxoverError::Telegram("getFile returned no file_path".into()));
        };

        let resp = self
            .client
            .get(self.file_url(&file_path))
            .send()
            .await?
            .error_for_status()?;

        let mut out = tokio::fs::File::create(dest).await?;
        let mut stream = resp.bytes_stream();
        while let Some(chunk) = stream.next().await {
            out.write_all(&chunk?).await?;
        }
        out.flush().await?;
        Ok(())
    }
}

/// Classify a platform update into a chat event.
///
/// Returns `None` for updates this bot does not handle (edits, channel
/// posts, stickers, unknown commands, and so on).
pub fn route_update(update: &Update) -> Option<(String, ChatEvent)> {
    if let Some(query) = &update.callback_query {
        let message = query.message.as_ref()?;
        let name = query.data.as_deref()?.strip_prefix("voice_")?.to_string();
        return Some((
            message.chat.id.to_string(),
            ChatEvent::VoiceChosen {
                callback_id: query.id.clone(),
                message_id: message.message_id,
                name,
            },
        ));
    }

    let message = update.message.as_ref()?;
    let chat_id = message.chat.id.to_string();

    if let Some(video) = &message.video {
        return Some((
            chat_id,
            ChatEvent::Video {
                file_id: video.file_id.clone(),
                file_size: video.file_size.unwrap_or(0),
            },
        ));
    }
    if let Some(document) = &message.document {
        return Some((
            chat_id,
            ChatEvent::Video {
                file_id: document.file_id.clone(),
                file_size: document.file_size.unwrap_or(0),
            },
        ));
    }

    let text = message.text.as_deref()?.trim();
    let event = match text {
        "/start" => ChatEvent::Start,
        "/help" => ChatEvent::Help,
        "/voices" => ChatEvent::Voices,
        "/cancel" => ChatEvent::Cancel,
        _ if text.starts_with('/') => return None,
        _ => ChatEvent::Text(text.to_string()),
    };
    Some((chat_id, event))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_api_url_embeds_token_and_method() {
        let client = TelegramClient::new("123:abc".into());
        assert_eq!(
            client.api_url("sendMessage"),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
        assert_eq!(
            client.file_url("videos/file_7.mp4"),
            "https://api.telegram.org/file/bot123:abc/videos/file_7.mp4"
        );
    }

    #[test]
    fn test_route_commands() {
        for (text, expected) in [
            ("/start", "Start"),
            ("/help", "Help"),
            ("/voices", "Voices"),
            ("/cancel", "Cancel"),
        ] {
            let u = update(serde_json::json!({
                "update_id": 1,
                "message": { "message_id": 10, "chat": { "id": 42 }, "text": text }
            }));
            let (chat_id, event) = route_update(&u).unwrap();
            assert_eq!(chat_id, "42");
            assert_eq!(format!("{event:?}"), expected);
        }
    }

    #[test]
    fn test_route_unknown_command_is_ignored() {
        let u = update(serde_json::json!({
            "update_id": 1,
            "message": { "message_id": 10, "chat": { "id": 42 }, "text": "/selfdestruct" }
        }));
        assert!(route_update(&u).is_none());
    }

    #[test]
    fn test_route_plain_text_is_trimmed() {
        let u = update(serde_json::json!({
            "update_id": 1,
            "message": { "message_id": 10, "chat": { "id": 42 }, "text": "  Hello world  " }
        }));
        let (_, event) = route_update(&u).unwrap();
        match event {
            ChatEvent::Text(text) => assert_eq!(text, "Hello world"),
            other => panic!("expected text event, got {other:?}"),
        }
    }

    #[test]
    fn test_route_video_and_document() {
        let u = update(serde_json::json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "chat": { "id": 42 },
                "video": { "file_id": "vid-1", "file_size": 1024 }
            }
        }));
        match route_update(&u).unwrap().1 {
            ChatEvent::Video { file_id, file_size } => {
                assert_eq!(file_id, "vid-1");
                assert_eq!(file_size, 1024);
            }
            other => panic!("expected video event, got {other:?}"),
        }

        let u = update(serde_json::json!({
            "update_id": 2,
            "message": {
                "message_id": 11,
                "chat": { "id": 42 },
                "document": { "file_id": "doc-1" }
            }
        }));
        match route_update(&u).unwrap().1 {
            ChatEvent::Video { file_id, file_size } => {
                assert_eq!(file_id, "doc-1");
                assert_eq!(file_size, 0);
            }
            other => panic!("expected video event, got {other:?}"),
        }
    }

    #[test]
    fn test_route_voice_callback() {
        let u = update(serde_json::json!({
            "update_id": 1,
            "callback_query": {
                "id": "cb-9",
                "data": "voice_adam",
                "message": { "message_id": 77, "chat": { "id": 42 } }
            }
        }));
        match route_update(&u).unwrap().1 {
            ChatEvent::VoiceChosen {
                callback_id,
                message_id,
                name,
            } => {
                assert_eq!(callback_id, "cb-9");
                assert_eq!(message_id, 77);
                assert_eq!(name, "adam");
            }
            other => panic!("expected voice event, got {other:?}"),
        }
    }

    #[test]
    fn test_route_foreign_callback_is_ignored() {
        let u = update(serde_json::json!({
            "update_id": 1,
            "callback_query": {
                "id": "cb-9",
                "data": "page_2",
                "message": { "message_id": 77, "chat": { "id": 42 } }
            }
        }));
        assert!(route_update(&u).is_none());
    }

    #[test]
    fn test_route_empty_update_is_ignored() {
        let u = update(serde_json::json!({ "update_id": 1 }));
        assert!(route_update(&u).is_none());
    }

    #[test]
    fn test_voice_menu_keyboard_shape() {
        let keyboard = InlineKeyboardMarkup {
            inline_keyboard: voices::VOICES
                .iter()
                .map(|(name, _)| {
                    vec![InlineKeyboardButton {
                        text: voices::display_name(name),
                        callback_data: format!("voice_{name}"),
                    }]
                })
                .collect(),
        };
        let value = serde_json::to_value(&keyboard).unwrap();
        let rows = value["inline_keyboard"].as_array().unwrap();
        assert_eq!(rows.len(), voices::VOICES.len());
        assert_eq!(rows[0][0]["text"], "Rachel");
        assert_eq!(rows[0][0]["callback_data"], "voice_rachel");
    }
}
