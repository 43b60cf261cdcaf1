use std::{collections::HashMap, sync::Arc, time::Duration};

use teloxide::{
    dispatching::Dispatcher,
    dptree,
    prelude::*,
    types::BotCommand,
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use pcasm_core::{
    assembly::AssemblyFlow,
    config::Config,
    engine::BuildEngine,
    messaging::{
        port::MessagingPort,
        throttled::{ThrottleConfig, ThrottledMessenger},
    },
    security::RateLimiter,
};

use crate::handlers;
use crate::TelegramMessenger;

/// Dialogues untouched this long are forgotten.
const DIALOGUE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
const HOUSEKEEPING_INTERVAL: Duration = Duration::from_secs(10 * 60);

#[derive(Clone)]
pub struct AppState {
    pub assembly: Arc<AssemblyFlow>,
    pub chat_locks: Arc<ChatLocks>,
}

/// Serializes update handling per chat.
#[derive(Default)]
pub struct ChatLocks {
    inner: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl ChatLocks {
    pub async fn lock_chat(&self, chat_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(chat_id)
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Drop locks nobody holds or waits on. Returns how many were removed.
    pub async fn prune(&self) -> usize {
        let mut map = self.inner.lock().await;
        let before = map.len();
        map.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - map.len()
    }
}

/// Periodically evict idle dialogues and unused chat locks.
fn spawn_housekeeping(state: Arc<AppState>) {
    tokio::spawn(async move {
        let mut tick = tokio::time::interval(HOUSEKEEPING_INTERVAL);
        tick.tick().await;
        loop {
            tick.tick().await;
            let dialogues = state.assembly.dialogues().evict_idle(DIALOGUE_TTL).await;
            let locks = state.chat_locks.prune().await;
            if dialogues > 0 || locks > 0 {
                debug!("Evicted {dialogues} idle dialogues and {locks} chat locks");
            }
        }
    });
}

/// Commands shown in the Telegram menu.
pub fn bot_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "Комманда запуска бота"),
        BotCommand::new("help", "Справка по использованию бота"),
        BotCommand::new("start_assembly", "Начать сборку пк"),
    ]
}

pub async fn run_polling(cfg: Arc<Config>, engine: Arc<dyn BuildEngine>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => info!("Bot started: @{}", me.username()),
        Err(e) => warn!("get_me failed: {e}"),
    }
    info!("Build engine: {:?}", cfg.engine);

    if let Err(e) = bot.set_my_commands(bot_commands()).await {
        warn!("Failed to register bot commands: {e}");
    }

    // Throttle outbound calls; the adapter itself still retries once on RetryAfter.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> = Arc::new(ThrottledMessenger::new(
        raw_messenger,
        ThrottleConfig::default(),
    ));

    let assembly = Arc::new(AssemblyFlow::new(
        engine,
        messenger,
        RateLimiter::new(
            cfg.rate_limit_enabled,
            cfg.rate_limit_requests,
            cfg.rate_limit_window,
        ),
    ));

    let state = Arc::new(AppState {
        assembly,
        chat_locks: Arc::new(ChatLocks::default()),
    });
    spawn_housekeeping(state.clone());

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_three_commands() {
        let names = bot_commands()
            .into_iter()
            .map(|c| c.command)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["start", "help", "start_assembly"]);
    }

    #[tokio::test]
    async fn chat_locks_are_reused_per_chat() {
        let locks = ChatLocks::default();
        let guard = locks.lock_chat(1).await;
        // A different chat is not blocked.
        let _other = locks.lock_chat(2).await;
        drop(guard);
        let _again = locks.lock_chat(1).await;
        assert_eq!(locks.inner.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn prune_keeps_held_locks() {
        let locks = ChatLocks::default();
        let held = locks.lock_chat(1).await;
        drop(locks.lock_chat(2).await);

        assert_eq!(locks.prune().await, 1);
        assert_eq!(locks.inner.lock().await.len(), 1);

        drop(held);
        assert_eq!(locks.prune().await, 1);
        assert!(locks.inner.lock().await.is_empty());
    }
}
