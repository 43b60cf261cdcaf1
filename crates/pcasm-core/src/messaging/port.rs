use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    messaging::types::{ChatAction, Document, InlineKeyboard},
    Result,
};

/// Outbound messenger port used by the assembly dialogue.
///
/// All text is Telegram-flavoured HTML; callers escape dynamic content.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;

    /// Replace the text of a message. `keyboard: None` removes any inline keyboard.
    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()>;

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef>;

    async fn send_document(&self, chat_id: ChatId, document: Document) -> Result<MessageRef>;

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()>;

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()>;
}
