// src/main.rs - Voxover entry point

use std::sync::Arc;

use clap::Parser;

use voxover::api::{self, ApiState};
use voxover::bot::{reaper, Conversation};
use voxover::cli::{self, Cli, Commands};
use voxover::infra::config::{Config, Secrets};
use voxover::infra::{logger, paths};
use voxover::media::files::MediaDirs;
use voxover::media::probe::Ffprobe;
use voxover::telegram::{route_update, TelegramClient};
use voxover::tts::ElevenLabsClient;

#[tokio::main]
async fn main() {
    // Respects RUST_LOG
    logger::init_logging("info");

    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    match cli.command {
        Commands::Serve => {
            let (conversation, _telegram) = bootstrap(&config).await?;
            reaper::spawn(conversation.clone(), config.sessions.clone());
            api::start_server(&config.server, ApiState { conversation }).await
        }
        Commands::Poll => {
            let (conversation, telegram) = bootstrap(&config).await?;
            reaper::spawn(conversation.clone(), config.sessions.clone());
            run_poll_loop(telegram, conversation).await
        }
        Commands::Voices => {
            cli::run_voices();
            Ok(())
        }
        Commands::Doctor => cli::run_doctor().await,
    }
}

async fn bootstrap(config: &Config) -> anyhow::Result<(Arc<Conversation>, Arc<TelegramClient>)> {
    let secrets = Secrets::from_env()?;
    paths::ensure_dirs().await?;

    let telegram = Arc::new(TelegramClient::new(secrets.bot_token));
    let synthesizer = Arc::new(ElevenLabsClient::new(secrets.eleven_api_key));
    let conversation = Arc::new(Conversation::new(
        telegram.clone(),
        synthesizer,
        Arc::new(Ffprobe),
        MediaDirs::new(config.media_base_dir()),
    ));

    Ok((conversation, telegram))
}

async fn run_poll_loop(
    telegram: Arc<TelegramClient>,
    conversation: Arc<Conversation>,
) -> anyhow::Result<()> {
    tracing::info!("Polling for updates");
    let mut offset = 0i64;

    loop {
        let updates = match telegram.get_updates(offset, 30).await {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!("getUpdates failed: {}", e);
                tokio::time::sleep(std::time::Duration::from_secs(3)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            if let Some((chat_id, event)) = route_update(&update) {
                let conversation = conversation.clone();
                tokio::spawn(async move {
                    conversation.dispatch(&chat_id, event).await;
                });
            }
        }
    }
}
