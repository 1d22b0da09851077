// src/cli.rs - CLI definition (clap derive)

use clap::{Parser, Subcommand};

use crate::bot::voices;
use crate::telegram::TelegramClient;

#[derive(Parser)]
#[command(name = "voxover", about = "Telegram voice-over bot", version)]
pub struct Cli {
    /// Config file path
    #[arg(long)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the webhook server
    Serve,
    /// Run against getUpdates long-polling (no public endpoint needed)
    Poll,
    /// List the voices on the menu
    Voices,
    /// Check credentials, ffprobe, and Telegram connectivity
    Doctor,
}

pub fn run_voices() {
    for (name, _) in voices::VOICES {
        println!("{}", voices::display_name(name));
    }
}

pub async fn run_doctor() -> anyhow::Result<()> {
    let mut healthy = true;

    for var in ["BOT_TOKEN", "ELEVEN_API_KEY"] {
        if std::env::var(var).is_ok() {
            println!("✓ {var} is set");
        } else {
            println!("✗ {var} is not set");
            healthy = false;
        }
    }

    match which::which("ffprobe") {
        Ok(path) => println!("✓ ffprobe at {}", path.display()),
        Err(_) => {
            println!("✗ ffprobe not found on PATH");
            healthy = false;
        }
    }

    if let Ok(token) = std::env::var("BOT_TOKEN") {
        match TelegramClient::new(token).validate().await {
            Ok(me) => println!("✓ Telegram token valid ({me})"),
            Err(e) => {
                println!("✗ Telegram token check failed: {e}");
                healthy = false;
            }
        }
    }

    if !healthy {
        anyhow::bail!("doctor found problems");
    }
    Ok(())
}
