//! Offline parts dataset (one JSON array per component category).

use std::{
    collections::BTreeMap,
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, warn};

use crate::{errors::Error, Result};

/// Component category of the parts dataset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Cpu,
    Memory,
    Motherboard,
    PowerSupply,
    Case,
    VideoCard,
    Storage,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Cpu,
        Category::Memory,
        Category::Motherboard,
        Category::PowerSupply,
        Category::Case,
        Category::VideoCard,
        Category::Storage,
    ];

    /// Categories a build cannot do without.
    pub const REQUIRED: [Category; 5] = [
        Category::Cpu,
        Category::Memory,
        Category::Motherboard,
        Category::PowerSupply,
        Category::Case,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Category::Cpu => "cpu",
            Category::Memory => "memory",
            Category::Motherboard => "motherboard",
            Category::PowerSupply => "power_supply",
            Category::Case => "case",
            Category::VideoCard => "video_card",
            Category::Storage => "storage",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.key() == key)
    }

    pub fn file_name(self) -> &'static str {
        match self {
            Category::Cpu => "cpu.json",
            Category::Memory => "memory.json",
            Category::Motherboard => "motherboard.json",
            Category::PowerSupply => "power-supply.json",
            Category::Case => "case.json",
            Category::VideoCard => "video-card.json",
            Category::Storage => "storage.json",
        }
    }

    pub fn label_ru(self) -> &'static str {
        match self {
            Category::Cpu => "Процессор",
            Category::Memory => "Оперативная память",
            Category::Motherboard => "Материнская плата",
            Category::PowerSupply => "Блок питания",
            Category::Case => "Корпус",
            Category::VideoCard => "Видеокарта",
            Category::Storage => "Накопитель",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// A single part from the dataset. Everything except name and price is kept
/// as raw JSON attributes, since every category has its own shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_price")]
    pub price: Option<f64>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Part {
    pub fn new(name: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            name: name.into(),
            price,
            attributes: Map::new(),
        }
    }

    /// Builder-style helper, mostly for tests and fixtures.
    pub fn with(mut self, key: &str, value: Value) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    /// Price if present and strictly positive.
    pub fn positive_price(&self) -> Option<f64> {
        self.price.filter(|p| p.is_finite() && *p > 0.0)
    }

    pub fn has(&self, key: &str) -> bool {
        self.attributes.get(key).is_some_and(|v| !v.is_null())
    }

    /// Numeric attribute; numeric strings are accepted, `null` counts as missing.
    pub fn number(&self, key: &str) -> Option<f64> {
        value_as_f64(self.attributes.get(key)?)
    }

    /// Textual attribute; non-string scalars are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.attributes.get(key)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn list(&self, key: &str) -> Option<&Vec<Value>> {
        self.attributes.get(key)?.as_array()
    }

    /// Numeric element `idx` of a list attribute such as `modules: [2, 16]`.
    pub fn list_number(&self, key: &str, idx: usize) -> Option<f64> {
        self.list(key)?.get(idx).and_then(value_as_f64)
    }
}

pub(crate) fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|n| n.is_finite())
}

fn deserialize_price<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(raw.as_ref().and_then(value_as_f64))
}

/// All parts, grouped by category.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    parts: BTreeMap<Category, Vec<Part>>,
}

impl Catalog {
    pub fn from_parts(parts: BTreeMap<Category, Vec<Part>>) -> Self {
        Self { parts }
    }

    /// Load every category file found in `dir`.
    ///
    /// Missing or broken files are logged and skipped; finding nothing at all is an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut parts = BTreeMap::new();

        for category in Category::ALL {
            let Some(path) = locate_category_file(dir, category) else {
                warn!("Component file for {category} not found");
                continue;
            };

            match read_parts(&path) {
                Ok(items) => {
                    info!("Loaded {} {category} components", items.len());
                    parts.insert(category, items);
                }
                Err(e) => error!("Error loading {}: {e}", path.display()),
            }
        }

        if parts.is_empty() {
            return Err(Error::Dataset {
                path: dir.to_path_buf(),
                reason: "no component files found".to_string(),
            });
        }

        Ok(Self { parts })
    }

    pub fn get(&self, category: Category) -> &[Part] {
        self.parts.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn categories(&self) -> impl Iterator<Item = (Category, &[Part])> {
        self.parts.iter().map(|(c, p)| (*c, p.as_slice()))
    }
}

/// Standard file name first, then the variant spelled with U+2011 (non-breaking hyphen).
fn locate_category_file(dir: &Path, category: Category) -> Option<PathBuf> {
    let standard = dir.join(category.file_name());
    if standard.exists() {
        return Some(standard);
    }
    let unicode = dir.join(category.file_name().replace('-', "\u{2011}"));
    if unicode.exists() {
        return Some(unicode);
    }
    None
}

fn read_parts(path: &Path) -> Result<Vec<Part>> {
    let txt = fs::read_to_string(path)?;
    Ok(serde_json::from_str::<Vec<Part>>(&txt)?)
}
