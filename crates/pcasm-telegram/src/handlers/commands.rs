use std::sync::Arc;

use teloxide::prelude::*;
use tracing::error;

use pcasm_core::{
    domain::{ChatId, Sender},
    messaging::types::Command,
};

use crate::router::AppState;

pub async fn handle_command(
    bot: Bot,
    msg: &Message,
    sender: Sender,
    text: &str,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let Some(cmd) = Command::parse(ChatId(msg.chat.id.0), sender, text) else {
        return Ok(());
    };

    if let Err(e) = state.assembly.handle_command(&cmd).await {
        error!("/{} failed: {e}", cmd.name);
        let _ = bot
            .send_message(msg.chat.id, "❌ Что-то пошло не так. Попробуйте еще раз.")
            .await;
    }
    Ok(())
}
