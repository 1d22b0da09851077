// src/tts/mod.rs - ElevenLabs speech synthesis adapter

use std::path::Path;

use async_trait::async_trait;

use crate::bot::SpeechSynthesizer;
use crate::infra::errors::VoxoverError;

const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io";

// Provider-side parameters are fixed for every request; none of this
// is user-configurable.
const MODEL_ID: &str = "eleven_multilingual_v2";
const STABILITY: f64 = 0.3;
const SIMILARITY_BOOST: f64 = 0.9;
const STYLE: f64 = 0.4;
const USE_SPEAKER_BOOST: bool = true;

pub struct ElevenLabsClient {
    client: reqwest::Client,
    api_key: String,
}

impl ElevenLabsClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
        }
    }

    fn tts_url(&self, voice_id: &str) -> String {
        format!("{ELEVENLABS_API_BASE}/v1/text-to-speech/{voice_id}")
    }
}

fn request_body(text: &str, language: &str) -> serde_json::Value {
    serde_json::json!({
        "text": text,
        "model_id": MODEL_ID,
        "language_code": language,
        "voice_settings": {
            "stability": STABILITY,
            "similarity_boost": SIMILARITY_BOOST,
            "style": STYLE,
            "use_speaker_boost": USE_SPEAKER_BOOST,
        },
    })
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        language: &str,
        out: &Path,
    ) -> Result<(), VoxoverError> {
        let response = self
            .client
            .post(self.tts_url(voice_id))
            .header("xi-api-key", &self.api_key)
            .header("accept", "audio/mpeg")
            .json(&request_body(text, language))
            .send()
            .await
            .map_err(|e| VoxoverError::Synthesis(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            tracing::error!(
                "ElevenLabs returned HTTP {}: {}",
                status.as_u16(),
                truncate(&detail, 200)
            );
            return Err(VoxoverError::Synthesis(format!("HTTP {status}")));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| VoxoverError::Synthesis(format!("body read failed: {e}")))?;
        tokio::fs::write(out, &audio).await?;

        tracing::debug!("Wrote {} bytes of speech to {}", audio.len(), out.display());
        Ok(())
    }
}

/// Truncate an error body for logging (UTF-8 safe).
fn truncate(s: &str, max_len: usize) -> &str {
    if s.len() <= max_len {
        s
    } else {
        let mut end = max_len;
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        &s[..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tts_url() {
        let client = ElevenLabsClient::new("key".into());
        assert_eq!(
            client.tts_url("pVnrL6sighQX7hVz89cp"),
            "https://api.elevenlabs.io/v1/text-to-speech/pVnrL6sighQX7hVz89cp"
        );
    }

    #[test]
    fn test_request_body_carries_fixed_settings() {
        let body = request_body("Hello world", "en");
        assert_eq!(body["text"], "Hello world");
        assert_eq!(body["model_id"], "eleven_multilingual_v2");
        assert_eq!(body["language_code"], "en");
        assert_eq!(body["voice_settings"]["stability"], 0.3);
        assert_eq!(body["voice_settings"]["similarity_boost"], 0.9);
        assert_eq!(body["voice_settings"]["style"], 0.4);
        assert_eq!(body["voice_settings"]["use_speaker_boost"], true);
    }

    #[test]
    fn test_truncate_is_boundary_safe() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 5), "hello");
        assert_eq!(truncate("café", 4), "caf");
    }
}
