use crate::domain::{ChatId, MessageRef, Sender};

/// A slash command addressed to the bot.
#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub sender: Sender,
    pub name: String,
    pub args: String,
}

impl Command {
    /// Parse `/cmd@botname args` into a command. Returns `None` for non-commands.
    pub fn parse(chat_id: ChatId, sender: Sender, text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let mut parts = text.splitn(2, char::is_whitespace);
        let first = parts.next().unwrap_or("");
        let args = parts.next().unwrap_or("").trim().to_string();

        let name = first
            .trim_start_matches('/')
            .split('@')
            .next()
            .unwrap_or("")
            .to_lowercase();
        if name.is_empty() {
            return None;
        }

        Some(Self {
            chat_id,
            sender,
            name,
            args,
        })
    }
}

/// Inline button press.
#[derive(Clone, Debug)]
pub struct CallbackQuery {
    pub chat_id: ChatId,
    pub sender: Sender,
    pub callback_id: String,
    pub data: String,
    pub message: Option<MessageRef>,
}

/// Outgoing "chat action" (typing indicator, etc).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChatAction {
    Typing,
    UploadDocument,
}

/// Inline keyboard laid out in rows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// One button per row.
    pub fn one_per_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    /// Fill rows left to right, `per_row` buttons each (last row may be shorter).
    pub fn chunked(buttons: Vec<InlineButton>, per_row: usize) -> Self {
        let per_row = per_row.max(1);
        let mut rows: Vec<Vec<InlineButton>> = Vec::new();
        for b in buttons {
            match rows.last_mut() {
                Some(row) if row.len() < per_row => row.push(b),
                _ => rows.push(vec![b]),
            }
        }
        Self { rows }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &InlineButton> {
        self.rows.iter().flatten()
    }
}

/// An in-memory file to upload.
#[derive(Clone, Debug)]
pub struct Document {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub caption: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn sender() -> Sender {
        Sender {
            user_id: UserId(7),
            username: None,
        }
    }

    #[test]
    fn parses_commands_with_bot_suffix() {
        let cmd = Command::parse(ChatId(1), sender(), "/Start_Assembly@pc_bot now").unwrap();
        assert_eq!(cmd.name, "start_assembly");
        assert_eq!(cmd.args, "now");

        assert!(Command::parse(ChatId(1), sender(), "hello").is_none());
        assert!(Command::parse(ChatId(1), sender(), "/").is_none());
    }

    #[test]
    fn chunked_layout_fills_rows() {
        let buttons = (0..5)
            .map(|i| InlineButton::new(format!("b{i}"), format!("d{i}")))
            .collect::<Vec<_>>();
        let kb = InlineKeyboard::chunked(buttons, 2);
        let sizes = kb.rows.iter().map(|r| r.len()).collect::<Vec<_>>();
        assert_eq!(sizes, vec![2, 2, 1]);
        assert_eq!(kb.buttons().count(), 5);
    }
}
