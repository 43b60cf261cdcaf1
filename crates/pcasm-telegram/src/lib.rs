//! Telegram adapter (teloxide).
//!
//! Implements the `pcasm-core` MessagingPort over the Telegram Bot API and
//! wires the assembly dialogue into a long-polling dispatcher.

use async_trait::async_trait;

use teloxide::{
    prelude::*,
    types::{InlineKeyboardButton, InlineKeyboardMarkup, InputFile, ParseMode},
};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use pcasm_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::{
        port::MessagingPort,
        types::{ChatAction, Document, InlineKeyboard},
    },
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_msg_id(message_id: MessageId) -> teloxide::types::MessageId {
        teloxide::types::MessageId(message_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(teloxide::RequestError::RetryAfter(d)) if attempts < MAX_RETRIES => {
                    attempts += 1;
                    sleep(d).await;
                }
                Err(other) => return Err(Self::map_err(other)),
            }
        }
    }
}

pub(crate) fn to_markup(keyboard: InlineKeyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|b| InlineKeyboardButton::callback(b.label, b.callback_data))
                .collect()
        })
        .collect();
    InlineKeyboardMarkup::new(rows)
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn edit_html(
        &self,
        msg: MessageRef,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<()> {
        let markup = keyboard.map(to_markup);
        self.with_retry(|| {
            let req = self
                .bot
                .edit_message_text(
                    Self::tg_chat(msg.chat_id),
                    Self::tg_msg_id(msg.message_id),
                    html.to_string(),
                )
                .parse_mode(ParseMode::Html);
            match &markup {
                Some(m) => req.reply_markup(m.clone()),
                None => req,
            }
        })
        .await?;
        Ok(())
    }

    async fn send_inline_keyboard(
        &self,
        chat_id: ChatId,
        html: &str,
        keyboard: InlineKeyboard,
    ) -> Result<MessageRef> {
        let markup = to_markup(keyboard);
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
                    .reply_markup(markup.clone())
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_document(&self, chat_id: ChatId, document: Document) -> Result<MessageRef> {
        let file = InputFile::memory(document.bytes).file_name(document.file_name);
        let msg = self
            .with_retry(|| {
                let req = self.bot.send_document(Self::tg_chat(chat_id), file.clone());
                match &document.caption {
                    Some(c) => req.caption(c.clone()),
                    None => req,
                }
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }

    async fn send_chat_action(&self, chat_id: ChatId, action: ChatAction) -> Result<()> {
        let tg_action = match action {
            ChatAction::Typing => teloxide::types::ChatAction::Typing,
            ChatAction::UploadDocument => teloxide::types::ChatAction::UploadDocument,
        };
        self.with_retry(|| self.bot.send_chat_action(Self::tg_chat(chat_id), tg_action))
            .await?;
        Ok(())
    }

    async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<()> {
        self.with_retry(|| {
            let mut req = self.bot.answer_callback_query(callback_id.to_string());
            if let Some(t) = text {
                req = req.text(t.to_string());
            }
            if show_alert {
                req = req.show_alert(true);
            }
            req
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcasm_core::keyboards::price_keyboard;

    #[test]
    fn markup_keeps_rows_and_callback_data() {
        let markup = to_markup(price_keyboard());
        let sizes = markup
            .inline_keyboard
            .iter()
            .map(Vec::len)
            .collect::<Vec<_>>();
        assert_eq!(sizes, vec![2, 2, 2, 2, 1]);
        assert_eq!(markup.inline_keyboard[0][1].text, "$1500");
    }
}
