// src/bot/reaper.rs - Idle-session sweep
//
// Sessions never complete on their own; a chat that walks away would
// keep its session and working directory forever. This sweep bounds
// that.

use std::sync::Arc;
use std::time::Duration;

use crate::bot::Conversation;
use crate::infra::config::SessionsConfig;

/// Spawn the background task that drops sessions idle past the TTL,
/// together with their working directories.
pub fn spawn(
    conversation: Arc<Conversation>,
    config: SessionsConfig,
) -> tokio::task::JoinHandle<()> {
    let ttl = chrono::Duration::minutes(config.ttl_minutes as i64);
    let period = Duration::from_secs(config.reap_interval_secs.max(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let idle = conversation.idle_chats(ttl);
            if idle.is_empty() {
                continue;
            }
            tracing::debug!("Reaping {} idle session(s)", idle.len());
            for chat_id in idle {
                conversation.expire(&chat_id).await;
            }
        }
    })
}
