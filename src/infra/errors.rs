// src/infra/errors.rs - Error types for Voxover

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VoxoverError {
    #[error("Telegram API error: {0}")]
    Telegram(String),

    #[error("Speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
