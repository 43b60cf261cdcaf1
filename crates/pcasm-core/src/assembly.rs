//! The assembly dialogue: commands and callbacks driving budget -> goal -> build.

use std::{sync::Arc, time::Duration};

use chrono::Local;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::{
    dialogue::{DialogueState, DialogueStore},
    domain::{ChatId, MessageRef, Sender},
    engine::{BuildEngine, BuildReport},
    formatting::escape_html,
    goals::Goal,
    keyboards::{goals_keyboard, price_keyboard, result_keyboard, CallbackAction},
    messaging::{
        port::MessagingPort,
        types::{CallbackQuery, ChatAction, Command, Document, InlineKeyboard},
    },
    report::{result_html, saved_file_name, saved_file_text, SAVED_SUFFIX},
    security::RateLimiter,
    Result,
};

pub const START_TEXT: &str = "👋 Привет! Я — Сборщик ПК 🤖
Помогаю подобрать оптимальную сборку компьютера под твой бюджет и задачи.

Вот что я умею:

🧩 Учитываю твой бюджет
🎯 Спрашиваю, для чего нужен ПК (игры, работа, монтаж и т.д.)
⚙️ Подбираю совместимые комплектующие
💡 Могу предложить готовую сборку с ценами и ссылками

Готов начать?

Напиши  /start_assembly. — и соберём твой идеальный ПК 💻
";

pub const HELP_TEXT: &str = "<b>Как пользоваться ботом</b>

/start_assembly - начать подбор конфигурации
1. Выберите бюджет в долларах.
2. Выберите назначение ПК.
3. Получите сборку и при желании сохраните её в файл.

/help - эта справка";

pub const PRICE_PROMPT: &str = "Выберите диапазон цен:";
pub const LOADING_TEXT: &str = "⏳ Подбираем конфигурацию компьютера...";
pub const UNKNOWN_HINT: &str =
    "Не понимаю 🤔 Напишите /start_assembly, чтобы подобрать ПК, или /help для справки.";
pub const USE_BUTTONS_HINT: &str = "Пожалуйста, выберите вариант с помощью кнопок выше.";
pub const NOT_FOUND_ALERT: &str = "Ошибка: конфигурация не найдена";
pub const SAVE_FAILED_TEXT: &str = "❌ Произошла ошибка при сохранении конфигурации.
Пожалуйста, попробуйте еще раз или обратитесь в поддержку.";
pub const SAVED_CAPTION: &str = "📋 Конфигурация вашего ПК сохранена в файл.";

const TYPING_INTERVAL: Duration = Duration::from_secs(4);

pub fn goal_prompt(price: u32) -> String {
    format!("Бюджет: ${price}.\n\nТеперь выберите назначение вашего ПК:")
}

pub fn build_error_text(err: &str) -> String {
    format!(
        "❌ Произошла ошибка при подборе конфигурации: {}\n\
         Пожалуйста, попробуйте еще раз или обратитесь в поддержку.",
        escape_html(err)
    )
}

/// Dialogue driver shared by all chats.
pub struct AssemblyFlow {
    engine: Arc<dyn BuildEngine>,
    messenger: Arc<dyn MessagingPort>,
    dialogues: DialogueStore,
    rate_limiter: Mutex<RateLimiter>,
}

impl AssemblyFlow {
    pub fn new(
        engine: Arc<dyn BuildEngine>,
        messenger: Arc<dyn MessagingPort>,
        rate_limiter: RateLimiter,
    ) -> Self {
        Self {
            engine,
            messenger,
            dialogues: DialogueStore::new(),
            rate_limiter: Mutex::new(rate_limiter),
        }
    }

    pub fn dialogues(&self) -> &DialogueStore {
        &self.dialogues
    }

    pub async fn handle_command(&self, cmd: &Command) -> Result<()> {
        info!(
            "Command /{} from {} in chat {}",
            cmd.name,
            cmd.sender.display_name(),
            cmd.chat_id.0
        );

        match cmd.name.as_str() {
            "start" => {
                self.messenger
                    .send_html(cmd.chat_id, &escape_html(START_TEXT))
                    .await?;
            }
            "help" => {
                self.messenger.send_html(cmd.chat_id, HELP_TEXT).await?;
            }
            "start_assembly" => {
                let user = cmd.sender.user_id;
                self.dialogues.clear(cmd.chat_id, user).await;
                self.dialogues
                    .set(cmd.chat_id, user, DialogueState::ChoosingPrice)
                    .await;
                self.messenger
                    .send_inline_keyboard(cmd.chat_id, PRICE_PROMPT, price_keyboard())
                    .await?;
            }
            _ => {
                self.messenger.send_html(cmd.chat_id, UNKNOWN_HINT).await?;
            }
        }
        Ok(())
    }

    /// Free text: the dialogue only reacts to buttons.
    pub async fn handle_text(&self, chat_id: ChatId, sender: &Sender) -> Result<()> {
        let hint = match self.dialogues.get(chat_id, sender.user_id).await {
            DialogueState::ChoosingPrice | DialogueState::ChoosingGoal { .. } => USE_BUTTONS_HINT,
            _ => UNKNOWN_HINT,
        };
        self.messenger.send_html(chat_id, hint).await?;
        Ok(())
    }

    pub async fn handle_callback(&self, cb: &CallbackQuery) -> Result<()> {
        let Some(action) = CallbackAction::parse(&cb.data) else {
            warn!("Unknown callback data: {}", cb.data);
            return self.answer(cb, None, false).await;
        };

        match action {
            CallbackAction::Price(price) => self.on_price(cb, price).await,
            CallbackAction::Goal(goal) => self.on_goal(cb, goal).await,
            CallbackAction::Restart => self.on_restart(cb).await,
            CallbackAction::SaveBuild => self.on_save(cb).await,
        }
    }

    async fn on_price(&self, cb: &CallbackQuery, price: u32) -> Result<()> {
        let user = cb.sender.user_id;
        if self.dialogues.get(cb.chat_id, user).await != DialogueState::ChoosingPrice {
            return self.answer(cb, None, false).await;
        }

        self.dialogues
            .set(cb.chat_id, user, DialogueState::ChoosingGoal { price })
            .await;
        self.answer(cb, Some(&format!("Вы выбрали ${price}")), false)
            .await?;
        self.present(cb.chat_id, cb.message, &goal_prompt(price), Some(goals_keyboard()))
            .await?;
        Ok(())
    }

    async fn on_goal(&self, cb: &CallbackQuery, goal: Goal) -> Result<()> {
        let user = cb.sender.user_id;
        let DialogueState::ChoosingGoal { price } = self.dialogues.get(cb.chat_id, user).await
        else {
            return self.answer(cb, None, false).await;
        };

        let (allowed, retry_after) = self.rate_limiter.lock().await.check(user);
        if !allowed {
            let secs = retry_after.unwrap_or_default().as_secs_f64().ceil();
            info!("Rate limited {} for {secs}s", cb.sender.display_name());
            let text = format!("⏳ Слишком много запросов. Попробуйте через {secs:.0} сек.");
            return self.answer(cb, Some(&text), true).await;
        }

        self.answer(cb, Some(&format!("Вы выбрали: {}", goal.display_name())), false)
            .await?;
        let target = self
            .present(cb.chat_id, cb.message, LOADING_TEXT, None)
            .await?;

        info!(
            "Building {goal} configuration for ${price} ({})",
            cb.sender.display_name()
        );
        let built = self.build_with_typing(cb.chat_id, price, goal).await;

        match built {
            Ok(report) => {
                let html = result_html(&report);
                self.present(cb.chat_id, Some(target), &html, Some(result_keyboard()))
                    .await?;
                self.dialogues
                    .set(
                        cb.chat_id,
                        user,
                        DialogueState::Built {
                            price,
                            goal,
                            report,
                            html,
                        },
                    )
                    .await;
            }
            Err(e) => {
                error!("Build failed for {goal} at ${price}: {e}");
                self.dialogues.clear(cb.chat_id, user).await;
                self.present(cb.chat_id, Some(target), &build_error_text(&e.to_string()), None)
                    .await?;
            }
        }
        Ok(())
    }

    async fn build_with_typing(&self, chat_id: ChatId, price: u32, goal: Goal) -> Result<BuildReport> {
        let (stop_tx, mut stop_rx) = tokio::sync::oneshot::channel::<()>();
        let messenger = Arc::clone(&self.messenger);
        let typing = tokio::spawn(async move {
            let mut tick = tokio::time::interval(TYPING_INTERVAL);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let _ = messenger.send_chat_action(chat_id, ChatAction::Typing).await;
                    }
                    _ = &mut stop_rx => break,
                }
            }
        });

        let result = self.engine.build(price, goal).await;

        let _ = stop_tx.send(());
        let _ = typing.await;
        result
    }

    async fn on_restart(&self, cb: &CallbackQuery) -> Result<()> {
        let user = cb.sender.user_id;
        self.dialogues.clear(cb.chat_id, user).await;
        self.dialogues
            .set(cb.chat_id, user, DialogueState::ChoosingPrice)
            .await;
        self.present(cb.chat_id, cb.message, PRICE_PROMPT, Some(price_keyboard()))
            .await?;
        self.answer(cb, Some("Начинаем подбор новой конфигурации"), false)
            .await
    }

    async fn on_save(&self, cb: &CallbackQuery) -> Result<()> {
        let user = cb.sender.user_id;
        let DialogueState::Built {
            price,
            goal,
            report,
            html,
        } = self.dialogues.get(cb.chat_id, user).await
        else {
            return self.answer(cb, Some(NOT_FOUND_ALERT), true).await;
        };

        self.answer(cb, Some("Сохраняем конфигурацию..."), false)
            .await?;

        match self.save_build(cb, &report, &html).await {
            Ok(html) => {
                self.dialogues
                    .set(
                        cb.chat_id,
                        user,
                        DialogueState::Built {
                            price,
                            goal,
                            report,
                            html,
                        },
                    )
                    .await;
            }
            Err(e) => {
                error!("Error saving build configuration: {e}");
                self.messenger.send_html(cb.chat_id, SAVE_FAILED_TEXT).await?;
            }
        }
        Ok(())
    }

    /// Sends the file and marks the result message; returns the updated HTML.
    async fn save_build(&self, cb: &CallbackQuery, report: &BuildReport, html: &str) -> Result<String> {
        let now = Local::now();
        let user_name = cb.sender.display_name();

        let document = Document {
            file_name: saved_file_name(&user_name, &now),
            bytes: saved_file_text(report, &user_name, &now).into_bytes(),
            caption: Some(SAVED_CAPTION.to_string()),
        };

        let _ = self
            .messenger
            .send_chat_action(cb.chat_id, ChatAction::UploadDocument)
            .await;
        self.messenger.send_document(cb.chat_id, document).await?;
        info!("Saved configuration for {user_name}");

        let updated = if html.ends_with(SAVED_SUFFIX) {
            html.to_string()
        } else {
            format!("{html}{SAVED_SUFFIX}")
        };
        if let Some(msg) = cb.message {
            self.messenger
                .edit_html(msg, &updated, Some(result_keyboard()))
                .await?;
        }
        Ok(updated)
    }

    /// Edit the callback's message when there is one, otherwise send a new message.
    async fn present(
        &self,
        chat_id: ChatId,
        target: Option<MessageRef>,
        html: &str,
        keyboard: Option<InlineKeyboard>,
    ) -> Result<MessageRef> {
        match (target, keyboard) {
            (Some(msg), keyboard) => {
                self.messenger.edit_html(msg, html, keyboard).await?;
                Ok(msg)
            }
            (None, Some(keyboard)) => {
                self.messenger
                    .send_inline_keyboard(chat_id, html, keyboard)
                    .await
            }
            (None, None) => self.messenger.send_html(chat_id, html).await,
        }
    }

    async fn answer(&self, cb: &CallbackQuery, text: Option<&str>, alert: bool) -> Result<()> {
        self.messenger
            .answer_callback_query(&cb.callback_id, text, alert)
            .await
    }
}
