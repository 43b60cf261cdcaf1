//! Telegram update handlers: translate teloxide updates into core dialogue calls.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message, User},
};

use pcasm_core::domain::{Sender, UserId};

use crate::router::AppState;

mod callback;
mod commands;

pub(crate) fn sender_of(user: &User) -> Sender {
    Sender {
        user_id: UserId(user.id.0 as i64),
        username: user.username.clone(),
    }
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    callback::handle_callback(bot, q, state).await
}

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text() else {
        return Ok(());
    };

    let _guard = state.chat_locks.lock_chat(msg.chat.id.0).await;
    if text.starts_with('/') {
        return commands::handle_command(bot, &msg, sender_of(user), text, state.clone()).await;
    }

    let chat_id = pcasm_core::domain::ChatId(msg.chat.id.0);
    if let Err(e) = state.assembly.handle_text(chat_id, &sender_of(user)).await {
        tracing::error!("text handling failed: {e}");
    }
    Ok(())
}
