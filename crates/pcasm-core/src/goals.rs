//! Usage goals and the per-goal weight / budget tables.

use std::fmt;

use crate::catalog::Category;

/// What the PC is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Goal {
    Games,
    Office,
    Graphics,
    Video,
    Programming,
    Universal,
}

/// Share or weight per category.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryTable {
    pub cpu: f64,
    pub video_card: f64,
    pub memory: f64,
    pub storage: f64,
    pub motherboard: f64,
    pub power_supply: f64,
    pub case: f64,
}

impl CategoryTable {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::Cpu => self.cpu,
            Category::VideoCard => self.video_card,
            Category::Memory => self.memory,
            Category::Storage => self.storage,
            Category::Motherboard => self.motherboard,
            Category::PowerSupply => self.power_supply,
            Category::Case => self.case,
        }
    }
}

const fn table(
    cpu: f64,
    video_card: f64,
    memory: f64,
    storage: f64,
    motherboard: f64,
    power_supply: f64,
    case: f64,
) -> CategoryTable {
    CategoryTable {
        cpu,
        video_card,
        memory,
        storage,
        motherboard,
        power_supply,
        case,
    }
}

impl Goal {
    pub const ALL: [Goal; 6] = [
        Goal::Games,
        Goal::Office,
        Goal::Graphics,
        Goal::Video,
        Goal::Programming,
        Goal::Universal,
    ];

    /// Key used in callback data (`goal_<key>`).
    pub fn key(self) -> &'static str {
        match self {
            Goal::Games => "games",
            Goal::Office => "office",
            Goal::Graphics => "graphics",
            Goal::Video => "video",
            Goal::Programming => "programming",
            Goal::Universal => "universal",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.key() == key)
    }

    /// Like [`Goal::from_key`], but unknown keys fall back to `Universal`.
    pub fn from_key_or_universal(key: &str) -> Self {
        Self::from_key(key).unwrap_or(Goal::Universal)
    }

    /// Name shown back to the user after selection.
    pub fn display_name(self) -> &'static str {
        match self {
            Goal::Games => "Игры",
            Goal::Office => "Офис и учеба",
            Goal::Graphics => "Работа с графикой и 3д",
            Goal::Video => "Видомонтаж и стримминг",
            Goal::Programming => "Программирование",
            Goal::Universal => "Универсальный пк",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            Goal::Games => "🎮 Игры",
            Goal::Office => "📚 Офис и учеба",
            Goal::Graphics => "🎨 Работа с графикой и 3д",
            Goal::Video => "🎬 Видомонтаж и стримминг",
            Goal::Programming => "💻 Программирование",
            Goal::Universal => "🔄 Универсальный пк",
        }
    }

    /// Adjective describing a finished build ("Игровой", ...).
    pub fn build_label(self) -> &'static str {
        match self {
            Goal::Games => "Игровой",
            Goal::Office => "Офисный",
            Goal::Graphics => "Для графики",
            Goal::Video => "Для видеомонтажа",
            Goal::Programming => "Для программирования",
            Goal::Universal => "Универсальный",
        }
    }

    /// How much each category matters for this goal.
    ///
    /// The market engine uses the same numbers as its budget split.
    pub fn weights(self) -> CategoryTable {
        match self {
            Goal::Games => table(0.20, 0.35, 0.10, 0.10, 0.10, 0.08, 0.07),
            Goal::Office => table(0.25, 0.10, 0.15, 0.20, 0.12, 0.08, 0.10),
            Goal::Graphics => table(0.25, 0.30, 0.15, 0.12, 0.08, 0.05, 0.05),
            Goal::Video => table(0.30, 0.25, 0.15, 0.15, 0.05, 0.05, 0.05),
            Goal::Programming => table(0.30, 0.10, 0.20, 0.15, 0.10, 0.08, 0.07),
            Goal::Universal => table(0.25, 0.20, 0.15, 0.15, 0.10, 0.08, 0.07),
        }
    }

    /// Recommended share of the total budget per category.
    pub fn budget_allocation(self) -> CategoryTable {
        match self {
            Goal::Games => table(0.20, 0.40, 0.10, 0.10, 0.10, 0.07, 0.03),
            Goal::Office => table(0.30, 0.10, 0.20, 0.20, 0.10, 0.05, 0.05),
            Goal::Graphics => table(0.25, 0.35, 0.15, 0.10, 0.05, 0.05, 0.05),
            Goal::Video => table(0.35, 0.25, 0.15, 0.10, 0.05, 0.05, 0.05),
            Goal::Programming => table(0.30, 0.15, 0.25, 0.15, 0.05, 0.05, 0.05),
            Goal::Universal => table(0.25, 0.25, 0.15, 0.15, 0.10, 0.05, 0.05),
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sum(t: CategoryTable) -> f64 {
        Category::ALL.iter().map(|c| t.get(*c)).sum()
    }

    #[test]
    fn tables_sum_to_one() {
        for goal in Goal::ALL {
            assert!((sum(goal.weights()) - 1.0).abs() < 1e-9, "{goal} weights");
            assert!(
                (sum(goal.budget_allocation()) - 1.0).abs() < 1e-9,
                "{goal} allocation"
            );
        }
    }

    #[test]
    fn unknown_keys_fall_back_to_universal() {
        assert_eq!(Goal::from_key("games"), Some(Goal::Games));
        assert_eq!(Goal::from_key("mining"), None);
        assert_eq!(Goal::from_key_or_universal("mining"), Goal::Universal);
    }

    #[test]
    fn games_prioritise_the_video_card() {
        let alloc = Goal::Games.budget_allocation();
        assert_eq!(alloc.get(Category::VideoCard), 0.40);
        assert_eq!(alloc.get(Category::Case), 0.03);
    }
}
