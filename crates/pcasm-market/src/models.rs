//! Market-side component models.

use std::fmt;

use pcasm_core::{catalog::Category, goals::Goal};

/// Component kinds the market adapter can look up.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ComponentKind {
    Cpu,
    Gpu,
    Ram,
    Storage,
    Motherboard,
    PowerSupply,
    Case,
}

impl ComponentKind {
    /// Order in which a build is assembled and displayed.
    pub const ALL: [ComponentKind; 7] = [
        ComponentKind::Cpu,
        ComponentKind::Gpu,
        ComponentKind::Ram,
        ComponentKind::Storage,
        ComponentKind::Motherboard,
        ComponentKind::PowerSupply,
        ComponentKind::Case,
    ];

    pub fn key(self) -> &'static str {
        match self {
            ComponentKind::Cpu => "cpu",
            ComponentKind::Gpu => "gpu",
            ComponentKind::Ram => "ram",
            ComponentKind::Storage => "storage",
            ComponentKind::Motherboard => "motherboard",
            ComponentKind::PowerSupply => "power_supply",
            ComponentKind::Case => "case",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key() == key)
    }

    /// Yandex Market category id.
    pub fn category_id(self) -> &'static str {
        match self {
            ComponentKind::Cpu => "91013",
            ComponentKind::Gpu => "91031",
            ComponentKind::Ram => "91033",
            ComponentKind::Storage => "91033",
            ComponentKind::Motherboard => "91020",
            ComponentKind::PowerSupply => "91028",
            ComponentKind::Case => "91008",
        }
    }

    /// Default search text.
    pub fn query(self) -> &'static str {
        match self {
            ComponentKind::Cpu => "процессор",
            ComponentKind::Gpu => "видеокарта",
            ComponentKind::Ram => "оперативная память",
            ComponentKind::Storage => "накопитель",
            ComponentKind::Motherboard => "материнская плата",
            ComponentKind::PowerSupply => "блок питания",
            ComponentKind::Case => "корпус для компьютера",
        }
    }

    /// Matching dataset category; shares its label and goal weights.
    pub fn category(self) -> Category {
        match self {
            ComponentKind::Cpu => Category::Cpu,
            ComponentKind::Gpu => Category::VideoCard,
            ComponentKind::Ram => Category::Memory,
            ComponentKind::Storage => Category::Storage,
            ComponentKind::Motherboard => Category::Motherboard,
            ComponentKind::PowerSupply => Category::PowerSupply,
            ComponentKind::Case => Category::Case,
        }
    }

    /// Share of the budget spent on this kind for `goal`.
    pub fn allocation(self, goal: Goal) -> f64 {
        goal.weights().get(self.category())
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Kind-specific specs; zero / empty means "unknown".
#[derive(Clone, Debug, PartialEq)]
pub enum ComponentSpecs {
    Cpu { cores: u32, frequency: f64 },
    Gpu { vram: u32 },
    Ram { capacity: u32, memory_type: String },
    Storage { capacity: u32, storage_type: String },
    Motherboard { socket: String, form_factor: String },
    PowerSupply { wattage: u32 },
    Case { form_factor: String },
}

impl ComponentSpecs {
    pub fn empty(kind: ComponentKind) -> Self {
        match kind {
            ComponentKind::Cpu => Self::Cpu {
                cores: 0,
                frequency: 0.0,
            },
            ComponentKind::Gpu => Self::Gpu { vram: 0 },
            ComponentKind::Ram => Self::Ram {
                capacity: 0,
                memory_type: String::new(),
            },
            ComponentKind::Storage => Self::Storage {
                capacity: 0,
                storage_type: String::new(),
            },
            ComponentKind::Motherboard => Self::Motherboard {
                socket: String::new(),
                form_factor: String::new(),
            },
            ComponentKind::PowerSupply => Self::PowerSupply { wattage: 0 },
            ComponentKind::Case => Self::Case {
                form_factor: String::new(),
            },
        }
    }

    /// Known specs as `(label, value)` lines.
    pub fn details(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        let mut num = |label: &str, value: u32, unit: &str| {
            if value > 0 {
                out.push((label.to_string(), format!("{value} {unit}")));
            }
        };
        match self {
            Self::Cpu { cores, .. } => num("Ядра", *cores, "шт"),
            Self::Gpu { vram } => num("Видеопамять", *vram, "GB"),
            Self::Ram { capacity, .. } => num("Объем", *capacity, "GB"),
            Self::Storage { capacity, .. } => num("Объем", *capacity, "GB"),
            Self::PowerSupply { wattage } => num("Мощность", *wattage, "W"),
            _ => {}
        }

        let mut text = |label: &str, value: &str| {
            if !value.is_empty() {
                out.push((label.to_string(), value.to_string()));
            }
        };
        match self {
            Self::Cpu { frequency, .. } if *frequency > 0.0 => {
                text("Частота", &format!("{frequency} GHz"));
            }
            Self::Ram { memory_type, .. } => text("Тип", memory_type),
            Self::Storage { storage_type, .. } => text("Тип", storage_type),
            Self::Motherboard {
                socket,
                form_factor,
            } => {
                text("Сокет", socket);
                text("Форм-фактор", form_factor);
            }
            Self::Case { form_factor } => text("Форм-фактор", form_factor),
            _ => {}
        }
        out
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MarketComponent {
    pub kind: ComponentKind,
    pub name: String,
    /// Price in RUB.
    pub price: f64,
    pub url: String,
    pub rating: f64,
    pub image_url: String,
    pub specs: ComponentSpecs,
}

/// One component per kind (where the market had one within budget).
#[derive(Clone, Debug, PartialEq)]
pub struct PcBuild {
    pub budget_usd: u32,
    pub budget_rub: u64,
    pub goal: Goal,
    pub components: Vec<MarketComponent>,
    usd_rub_rate: f64,
}

impl PcBuild {
    pub fn new(budget_rub: u64, goal: Goal, usd_rub_rate: f64) -> Self {
        let budget_usd = if usd_rub_rate > 0.0 {
            (budget_rub as f64 / usd_rub_rate) as u32
        } else {
            0
        };
        Self {
            budget_usd,
            budget_rub,
            goal,
            components: Vec::new(),
            usd_rub_rate,
        }
    }

    pub fn component(&self, kind: ComponentKind) -> Option<&MarketComponent> {
        self.components.iter().find(|c| c.kind == kind)
    }

    pub fn total_price_rub(&self) -> f64 {
        self.components.iter().map(|c| c.price).sum()
    }

    /// Rounded to cents.
    pub fn total_price_usd(&self) -> f64 {
        self.to_usd(self.total_price_rub())
    }

    pub fn to_usd(&self, rub: f64) -> f64 {
        pcasm_core::formatting::round_cents(pcasm_core::formatting::convert_rub_to_usd(
            rub,
            self.usd_rub_rate,
        ))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ComponentRecommendation {
    pub kind: ComponentKind,
    pub budget_usd: u32,
    pub goal: Goal,
    pub recommendations: Vec<MarketComponent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_share_goal_weights() {
        assert_eq!(ComponentKind::Gpu.allocation(Goal::Games), 0.35);
        assert_eq!(ComponentKind::Case.allocation(Goal::Office), 0.10);
        let total: f64 = ComponentKind::ALL
            .iter()
            .map(|k| k.allocation(Goal::Video))
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ram_and_storage_share_a_category_id() {
        assert_eq!(
            ComponentKind::Ram.category_id(),
            ComponentKind::Storage.category_id()
        );
        assert_eq!(ComponentKind::from_key("power_supply"), Some(ComponentKind::PowerSupply));
        assert_eq!(ComponentKind::from_key("fan"), None);
    }

    #[test]
    fn details_skip_unknown_values() {
        assert!(ComponentSpecs::empty(ComponentKind::Cpu).details().is_empty());

        let specs = ComponentSpecs::Cpu {
            cores: 12,
            frequency: 3.6,
        };
        assert_eq!(
            specs.details(),
            vec![
                ("Ядра".to_string(), "12 шт".to_string()),
                ("Частота".to_string(), "3.6 GHz".to_string()),
            ]
        );
    }

    #[test]
    fn build_totals() {
        let mut build = PcBuild::new(75_000, Goal::Games, 75.0);
        assert_eq!(build.budget_usd, 1000);
        for price in [25_000.0, 5_000.5] {
            build.components.push(MarketComponent {
                kind: ComponentKind::Cpu,
                name: "x".to_string(),
                price,
                url: String::new(),
                rating: 0.0,
                image_url: String::new(),
                specs: ComponentSpecs::empty(ComponentKind::Cpu),
            });
        }
        assert_eq!(build.total_price_rub(), 30_000.5);
        assert_eq!(build.total_price_usd(), 400.01);
    }
}
