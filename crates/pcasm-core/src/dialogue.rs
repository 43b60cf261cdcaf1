//! Per-user assembly dialogue state.

use std::{collections::HashMap, time::Duration};

use tokio::{sync::Mutex, time::Instant};

use crate::{
    domain::{ChatId, UserId},
    engine::BuildReport,
    goals::Goal,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DialogueState {
    #[default]
    Idle,
    ChoosingPrice,
    ChoosingGoal {
        price: u32,
    },
    Built {
        price: u32,
        goal: Goal,
        report: BuildReport,
        /// The result message as sent, so it can be re-rendered after saving.
        html: String,
    },
}

#[derive(Debug)]
struct Entry {
    state: DialogueState,
    touched: Instant,
}

/// Dialogue states keyed by `(chat, user)`.
///
/// Entries stay until the dialogue returns to `Idle` or [`DialogueStore::evict_idle`] drops them.
#[derive(Debug, Default)]
pub struct DialogueStore {
    states: Mutex<HashMap<(ChatId, UserId), Entry>>,
}

impl DialogueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, chat_id: ChatId, user_id: UserId) -> DialogueState {
        self.states
            .lock()
            .await
            .get(&(chat_id, user_id))
            .map(|e| e.state.clone())
            .unwrap_or_default()
    }

    pub async fn set(&self, chat_id: ChatId, user_id: UserId, state: DialogueState) {
        let mut states = self.states.lock().await;
        if state == DialogueState::Idle {
            states.remove(&(chat_id, user_id));
        } else {
            states.insert(
                (chat_id, user_id),
                Entry {
                    state,
                    touched: Instant::now(),
                },
            );
        }
    }

    pub async fn clear(&self, chat_id: ChatId, user_id: UserId) {
        self.states.lock().await.remove(&(chat_id, user_id));
    }

    /// Forget dialogues not updated for `max_idle`. Returns how many were dropped.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut states = self.states.lock().await;
        let before = states.len();
        states.retain(|_, e| e.touched.elapsed() < max_idle);
        before - states.len()
    }

    pub async fn active_count(&self) -> usize {
        self.states.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn states_are_per_chat_and_user() {
        let store = DialogueStore::new();
        let (chat, alice, bob) = (ChatId(1), UserId(10), UserId(20));

        store.set(chat, alice, DialogueState::ChoosingPrice).await;
        assert_eq!(store.get(chat, alice).await, DialogueState::ChoosingPrice);
        assert_eq!(store.get(chat, bob).await, DialogueState::Idle);
        assert_eq!(store.get(ChatId(2), alice).await, DialogueState::Idle);

        store
            .set(chat, alice, DialogueState::ChoosingGoal { price: 1500 })
            .await;
        assert_eq!(
            store.get(chat, alice).await,
            DialogueState::ChoosingGoal { price: 1500 }
        );

        store.clear(chat, alice).await;
        assert_eq!(store.get(chat, alice).await, DialogueState::Idle);
        assert_eq!(store.active_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_dialogues_are_evicted() {
        let store = DialogueStore::new();
        store
            .set(ChatId(1), UserId(1), DialogueState::ChoosingPrice)
            .await;
        tokio::time::advance(Duration::from_secs(50)).await;
        store
            .set(ChatId(2), UserId(2), DialogueState::ChoosingGoal { price: 2000 })
            .await;
        tokio::time::advance(Duration::from_secs(20)).await;

        assert_eq!(store.evict_idle(Duration::from_secs(60)).await, 1);
        assert_eq!(store.get(ChatId(1), UserId(1)).await, DialogueState::Idle);
        assert_eq!(
            store.get(ChatId(2), UserId(2)).await,
            DialogueState::ChoosingGoal { price: 2000 }
        );
        assert_eq!(store.active_count().await, 1);
    }
}
