//! Inline keyboards of the assembly dialogue and their callback data.

use crate::{
    goals::Goal,
    messaging::types::{InlineButton, InlineKeyboard},
};

/// Budgets offered on the price keyboard, in USD.
pub const PRICE_OPTIONS: [u32; 9] = [1000, 1500, 2000, 2500, 3000, 3500, 4000, 4500, 5000];

pub const CB_RESTART: &str = "restart";
pub const CB_SAVE_BUILD: &str = "save_build";

/// Decoded callback data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    Price(u32),
    Goal(Goal),
    Restart,
    SaveBuild,
}

impl CallbackAction {
    pub fn parse(data: &str) -> Option<Self> {
        match data {
            CB_RESTART => return Some(Self::Restart),
            CB_SAVE_BUILD => return Some(Self::SaveBuild),
            _ => {}
        }

        if let Some(raw) = data.strip_prefix("price_") {
            return raw.parse::<u32>().ok().filter(|p| *p > 0).map(Self::Price);
        }
        if let Some(key) = data.strip_prefix("goal_") {
            return Some(Self::Goal(Goal::from_key_or_universal(key)));
        }
        None
    }
}

pub fn price_keyboard() -> InlineKeyboard {
    let buttons = PRICE_OPTIONS
        .iter()
        .map(|p| InlineButton::new(format!("${p}"), format!("price_{p}")))
        .collect();
    InlineKeyboard::chunked(buttons, 2)
}

pub fn goals_keyboard() -> InlineKeyboard {
    let buttons = Goal::ALL
        .iter()
        .map(|g| InlineButton::new(g.button_label(), format!("goal_{}", g.key())))
        .collect();
    InlineKeyboard::one_per_row(buttons)
}

/// Shown under a finished build.
pub fn result_keyboard() -> InlineKeyboard {
    InlineKeyboard::new(vec![
        vec![InlineButton::new("💾 Сохранить в файл", CB_SAVE_BUILD)],
        vec![InlineButton::new("🔄 Подобрать заново", CB_RESTART)],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_keyboard_has_rows_of_two() {
        let kb = price_keyboard();
        let sizes = kb.rows.iter().map(Vec::len).collect::<Vec<_>>();
        assert_eq!(sizes, vec![2, 2, 2, 2, 1]);
        assert_eq!(kb.rows[0][0].label, "$1000");
        assert_eq!(kb.rows[4][0].callback_data, "price_5000");
    }

    #[test]
    fn goals_keyboard_is_one_per_row() {
        let kb = goals_keyboard();
        assert_eq!(kb.rows.len(), 6);
        assert_eq!(kb.rows[0][0].label, "🎮 Игры");
        assert_eq!(kb.rows[5][0].callback_data, "goal_universal");
    }

    #[test]
    fn parses_callback_data() {
        assert_eq!(CallbackAction::parse("price_1500"), Some(CallbackAction::Price(1500)));
        assert_eq!(CallbackAction::parse("price_abc"), None);
        assert_eq!(CallbackAction::parse("price_0"), None);
        assert_eq!(
            CallbackAction::parse("goal_video"),
            Some(CallbackAction::Goal(Goal::Video))
        );
        assert_eq!(
            CallbackAction::parse("goal_mining"),
            Some(CallbackAction::Goal(Goal::Universal))
        );
        assert_eq!(CallbackAction::parse("restart"), Some(CallbackAction::Restart));
        assert_eq!(CallbackAction::parse("save_build"), Some(CallbackAction::SaveBuild));
        assert_eq!(CallbackAction::parse("other"), None);
    }

    #[test]
    fn every_keyboard_button_parses() {
        for kb in [price_keyboard(), goals_keyboard(), result_keyboard()] {
            for b in kb.buttons() {
                assert!(CallbackAction::parse(&b.callback_data).is_some(), "{}", b.callback_data);
            }
        }
    }
}
