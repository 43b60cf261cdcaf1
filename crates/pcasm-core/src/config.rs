use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{errors::Error, Result};

pub const DEFAULT_MARKET_BASE_URL: &str = "https://api.market.yandex.ru/";
pub const DEFAULT_USD_RUB_RATE: f64 = 75.0;

/// Which backend assembles a configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineKind {
    /// Offline parts dataset + knapsack optimizer.
    Dataset,
    /// Yandex Market content API.
    Market,
}

impl EngineKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "dataset" => Some(Self::Dataset),
            "market" | "yandex_market" => Some(Self::Market),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MarketConfig {
    pub api_key: String,
    pub oauth_token: String,
    pub base_url: String,
    pub mock_mode: bool,
    pub timeout: Duration,
}

/// Typed configuration, read from the environment (and an optional `.env`).
#[derive(Clone, Debug)]
pub struct Config {
    pub telegram_bot_token: String,

    // Engines
    pub engine: EngineKind,
    pub component_data_dir: PathBuf,
    pub market: MarketConfig,
    pub usd_rub_rate: f64,

    // Rate limiting of build requests
    pub rate_limit_enabled: bool,
    pub rate_limit_requests: u32,
    pub rate_limit_window: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"));
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env in production, maps in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let telegram_bot_token = get("TELEGRAM_BOT_TOKEN").unwrap_or_default();
        if telegram_bot_token.trim().is_empty() {
            return Err(Error::Config(
                "TELEGRAM_BOT_TOKEN environment variable is required".to_string(),
            ));
        }

        let engine = match get("BUILD_ENGINE") {
            None => EngineKind::Dataset,
            Some(raw) => EngineKind::parse(&raw).ok_or_else(|| {
                Error::Config(format!(
                    "BUILD_ENGINE must be `dataset` or `market`, got `{raw}`"
                ))
            })?,
        };

        let component_data_dir = get("COMPONENT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data/json/"));

        let market = MarketConfig {
            api_key: get("YANDEX_MARKET_API_KEY").unwrap_or_default(),
            oauth_token: get("YANDEX_MARKET_OAUTH_TOKEN").unwrap_or_default(),
            base_url: get("YANDEX_MARKET_BASE_URL")
                .unwrap_or_else(|| DEFAULT_MARKET_BASE_URL.to_string()),
            mock_mode: get("YANDEX_MARKET_MOCK")
                .map(|s| parse_bool(&s))
                .unwrap_or(false),
            timeout: Duration::from_millis(
                get("MARKET_TIMEOUT_MS")
                    .and_then(|s| s.trim().parse::<u64>().ok())
                    .unwrap_or(10_000),
            ),
        };

        if engine == EngineKind::Market && !market.mock_mode {
            if market.api_key.is_empty() {
                return Err(Error::Config(
                    "YANDEX_MARKET_API_KEY is required for the market engine".to_string(),
                ));
            }
            if market.oauth_token.is_empty() {
                return Err(Error::Config(
                    "YANDEX_MARKET_OAUTH_TOKEN is required for the market engine".to_string(),
                ));
            }
        }

        let usd_rub_rate = get("USD_RUB_RATE")
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|r| *r > 0.0)
            .unwrap_or(DEFAULT_USD_RUB_RATE);

        let rate_limit_enabled = get("RATE_LIMIT_ENABLED")
            .map(|s| parse_bool(&s))
            .unwrap_or(true);
        let rate_limit_requests = get("RATE_LIMIT_REQUESTS")
            .and_then(|s| s.trim().parse::<u32>().ok())
            .unwrap_or(10);
        if rate_limit_enabled && rate_limit_requests == 0 {
            return Err(Error::Config(
                "RATE_LIMIT_REQUESTS must be at least 1 (or set RATE_LIMIT_ENABLED=false)"
                    .to_string(),
            ));
        }
        let rate_limit_window = Duration::from_secs(
            get("RATE_LIMIT_WINDOW")
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(60),
        );

        Ok(Self {
            telegram_bot_token,
            engine,
            component_data_dir,
            market,
            usd_rub_rate,
            rate_limit_enabled,
            rate_limit_requests,
            rate_limit_window,
        })
    }
}

fn load_dotenv_if_present(path: &Path) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_some() {
            continue; // do not override existing env
        }
        env::set_var(key, val);
    }
}

fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for raw in contents.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((k, v)) = line.split_once('=') else {
            continue;
        };

        let key = k.trim();
        if key.is_empty() {
            continue;
        }

        let mut val = v.trim().to_string();
        // Strip optional surrounding quotes.
        if val.len() >= 2
            && ((val.starts_with('"') && val.ends_with('"'))
                || (val.starts_with('\'') && val.ends_with('\'')))
        {
            val = val[1..val.len() - 1].to_string();
        }

        out.push((key.to_string(), val));
    }
    out
}

fn parse_bool(s: &str) -> bool {
    matches!(
        s.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn token_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn defaults_to_dataset_engine() {
        let cfg = Config::from_lookup(lookup(&[("TELEGRAM_BOT_TOKEN", "t")])).unwrap();
        assert_eq!(cfg.engine, EngineKind::Dataset);
        assert_eq!(cfg.component_data_dir, PathBuf::from("./data/json/"));
        assert_eq!(cfg.usd_rub_rate, DEFAULT_USD_RUB_RATE);
        assert_eq!(cfg.market.base_url, DEFAULT_MARKET_BASE_URL);
        assert!(cfg.rate_limit_enabled);
        assert_eq!(cfg.rate_limit_requests, 10);
    }

    #[test]
    fn market_engine_needs_credentials_unless_mocked() {
        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("BUILD_ENGINE", "market"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("YANDEX_MARKET_API_KEY"));

        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("BUILD_ENGINE", "market"),
            ("YANDEX_MARKET_MOCK", "yes"),
        ]))
        .unwrap();
        assert_eq!(cfg.engine, EngineKind::Market);
        assert!(cfg.market.mock_mode);
    }

    #[test]
    fn rejects_unknown_engine() {
        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("BUILD_ENGINE", "ortools"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn zero_request_budget_needs_the_limiter_off() {
        let err = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("RATE_LIMIT_REQUESTS", "0"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("RATE_LIMIT_REQUESTS"));

        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("RATE_LIMIT_REQUESTS", "0"),
            ("RATE_LIMIT_ENABLED", "false"),
        ]))
        .unwrap();
        assert!(!cfg.rate_limit_enabled);
    }

    #[test]
    fn ignores_non_positive_rate() {
        let cfg = Config::from_lookup(lookup(&[
            ("TELEGRAM_BOT_TOKEN", "t"),
            ("USD_RUB_RATE", "-3"),
        ]))
        .unwrap();
        assert_eq!(cfg.usd_rub_rate, DEFAULT_USD_RUB_RATE);
    }

    #[test]
    fn dotenv_parsing_strips_quotes_and_comments() {
        let parsed = parse_dotenv("# comment\nA=1\nB = \"two\"\n\nC='3'\nbroken\n=x\n");
        assert_eq!(
            parsed,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "two".to_string()),
                ("C".to_string(), "3".to_string()),
            ]
        );
    }
}
