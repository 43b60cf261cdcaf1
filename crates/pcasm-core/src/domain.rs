/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Telegram message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a Telegram message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// The person talking to the bot, as far as the dialogue needs to know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sender {
    pub user_id: UserId,
    pub username: Option<String>,
}

impl Sender {
    /// Name used in saved files: the Telegram username or `user_<id>`.
    pub fn display_name(&self) -> String {
        self.username
            .clone()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| format!("user_{}", self.user_id.0))
    }
}
