use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, error};

use pcasm_core::{
    domain::{ChatId, MessageId, MessageRef},
    messaging::types::CallbackQuery as CoreCallback,
};

use crate::router::AppState;

use super::sender_of;

/// Core view of a button press. Presses on messages the bot can no longer
/// see (inline mode, very old messages) are answered in the user's private chat.
pub(crate) fn to_core_callback(q: &CallbackQuery) -> Option<CoreCallback> {
    let data = q.data.clone().filter(|d| !d.is_empty())?;
    let sender = sender_of(&q.from);

    let (chat_id, message) = match q.message.as_ref() {
        Some(m) => {
            let chat_id = ChatId(m.chat.id.0);
            let msg = MessageRef {
                chat_id,
                message_id: MessageId(m.id.0),
            };
            (chat_id, Some(msg))
        }
        None => (ChatId(sender.user_id.0), None),
    };

    Some(CoreCallback {
        chat_id,
        sender,
        callback_id: q.id.clone(),
        data,
        message,
    })
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(cb) = to_core_callback(&q) else {
        debug!("callback {} without data", q.id);
        let _ = bot.answer_callback_query(q.id.clone()).await;
        return Ok(());
    };

    let _guard = state.chat_locks.lock_chat(cb.chat_id.0).await;
    if let Err(e) = state.assembly.handle_callback(&cb).await {
        error!("callback {} failed: {e}", cb.data);
    }
    Ok(())
}
