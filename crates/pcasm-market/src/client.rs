//! Thin async client for the Yandex Market content API.

use std::sync::OnceLock;

use regex::Regex;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, error, info};

use pcasm_core::{config::MarketConfig, errors::Error, goals::Goal, Result};

use crate::{
    mock,
    models::{ComponentKind, ComponentSpecs, MarketComponent, PcBuild},
};

pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

#[derive(Clone, Debug)]
pub struct YandexMarketClient {
    api_key: String,
    oauth_token: String,
    base_url: Url,
    mock_mode: bool,
    http: reqwest::Client,
}

impl YandexMarketClient {
    pub fn new(cfg: &MarketConfig) -> Result<Self> {
        let base_url = Url::parse(&cfg.base_url)
            .map_err(|e| Error::Config(format!("invalid market base url {}: {e}", cfg.base_url)))?;
        let http = reqwest::Client::builder()
            .timeout(cfg.timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build error: {e}")))?;

        Ok(Self {
            api_key: cfg.api_key.clone(),
            oauth_token: cfg.oauth_token.clone(),
            base_url,
            mock_mode: cfg.mock_mode,
            http,
        })
    }

    pub fn is_mock(&self) -> bool {
        self.mock_mode
    }

    async fn get(&self, endpoint: &str, mut params: Vec<(String, String)>) -> Result<Value> {
        if self.mock_mode {
            debug!("mock request {endpoint} {params:?}");
            return Ok(mock::response(endpoint, &params));
        }

        let url = self
            .base_url
            .join(endpoint)
            .map_err(|e| Error::InvalidInput(format!("bad endpoint {endpoint}: {e}")))?;
        params.push(("api_key".to_string(), self.api_key.clone()));

        let resp = self
            .http
            .get(url.clone())
            .query(&params)
            .header("Authorization", format!("OAuth {}", self.oauth_token))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Connection error to {url}: {e}");
                if e.is_connect() {
                    let host = url.host_str().unwrap_or_default();
                    Error::External(format!(
                        "Cannot connect to host {host}: {e}. Check your internet connection \
                         or use mock mode (YANDEX_MARKET_MOCK=1) for testing."
                    ))
                } else {
                    Error::External(format!("market request error: {e}"))
                }
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("API error: {status}");
            return Err(Error::External(format!(
                "market api error: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }

        resp.json::<Value>()
            .await
            .map_err(|e| Error::External(format!("market json error: {e}")))
    }

    pub async fn search_components(
        &self,
        query: &str,
        category_id: Option<&str>,
        price_from: Option<u64>,
        price_to: Option<u64>,
        limit: u32,
    ) -> Result<Value> {
        let params = search_params(query, category_id, price_from, price_to, limit);
        self.get("v2/search", params).await
    }

    pub async fn get_component_details(&self, model_id: &str) -> Result<Value> {
        self.get(&format!("v2/models/{model_id}"), Vec::new()).await
    }

    /// Components of one kind priced within `[price_from, price_to]` RUB.
    ///
    /// `query` overrides the default search text (e.g. "ssd" for storage).
    pub async fn list_components(
        &self,
        kind: ComponentKind,
        price_from: Option<u64>,
        price_to: Option<u64>,
        query: Option<&str>,
    ) -> Result<Vec<MarketComponent>> {
        let text = query.unwrap_or(kind.query());
        let result = self
            .search_components(
                text,
                Some(kind.category_id()),
                price_from,
                price_to,
                DEFAULT_SEARCH_LIMIT,
            )
            .await?;

        Ok(result
            .get("models")
            .and_then(Value::as_array)
            .map(|models| {
                models
                    .iter()
                    .map(|m| component_from_response(m, kind))
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Cheapest-effort build: for each kind, the first offer within its share of the budget.
    pub async fn generate_pc_build(
        &self,
        budget_rub: u64,
        goal: Goal,
        usd_rub_rate: f64,
    ) -> Result<PcBuild> {
        let mut build = PcBuild::new(budget_rub, goal, usd_rub_rate);

        for kind in ComponentKind::ALL {
            let cap = (budget_rub as f64 * kind.allocation(goal)) as u64;
            let found = self
                .list_components(kind, None, Some(cap), None)
                .await
                .map_err(|e| {
                    error!("Error generating PC build: {e}");
                    e
                })?;
            match found.into_iter().next() {
                Some(c) => build.components.push(c),
                None => info!("No {kind} found under {cap} RUB"),
            }
        }

        Ok(build)
    }
}

/// Query string for `v2/search`; optional filters only when set.
pub fn search_params(
    query: &str,
    category_id: Option<&str>,
    price_from: Option<u64>,
    price_to: Option<u64>,
    limit: u32,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("text".to_string(), query.to_string()),
        ("limit".to_string(), limit.to_string()),
    ];
    if let Some(id) = category_id.filter(|id| !id.is_empty()) {
        params.push(("categoryId".to_string(), id.to_string()));
    }
    if let Some(from) = price_from {
        params.push(("priceFrom".to_string(), from.to_string()));
    }
    if let Some(to) = price_to {
        params.push(("priceTo".to_string(), to.to_string()));
    }
    params
}

fn leading_number(raw: &str) -> Option<f64> {
    static NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
    let re = NUMBER
        .get_or_init(|| Regex::new(r"^\s*(-?\d+(?:[.,]\d+)?)").ok())
        .as_ref()?;
    let m = re.captures(raw)?.get(1)?;
    m.as_str().replace(',', ".").parse().ok()
}

fn leading_int(raw: &str) -> Option<u32> {
    leading_number(raw)
        .filter(|n| *n >= 0.0)
        .map(|n| n.trunc() as u32)
}

fn json_f64(v: Option<&Value>) -> Option<f64> {
    match v? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_str(v: Option<&Value>) -> String {
    match v {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Map one API model into a component of `kind`.
pub fn component_from_response(data: &Value, kind: ComponentKind) -> MarketComponent {
    let image_url = data
        .get("photos")
        .and_then(Value::as_array)
        .and_then(|p| p.first())
        .map(|p| json_str(p.get("url")))
        .unwrap_or_default();

    let mut specs = ComponentSpecs::empty(kind);
    let items = data
        .get("specs")
        .and_then(|s| s.get("items"))
        .and_then(Value::as_array);
    for item in items.into_iter().flatten() {
        let name = json_str(item.get("name")).to_lowercase();
        let value = json_str(item.get("value"));
        apply_spec(&mut specs, &name, &value);
    }

    MarketComponent {
        kind,
        name: json_str(data.get("name")),
        price: json_f64(data.get("price").and_then(|p| p.get("value"))).unwrap_or(0.0),
        url: json_str(data.get("link")),
        rating: json_f64(data.get("rating")).unwrap_or(0.0),
        image_url,
        specs,
    }
}

fn apply_spec(specs: &mut ComponentSpecs, name: &str, value: &str) {
    match specs {
        ComponentSpecs::Gpu { vram } => {
            if ["видеопамяти", "видеопамять", "память", "vram"]
                .iter()
                .any(|k| name.contains(k))
            {
                if let Some(n) = leading_int(value) {
                    *vram = n;
                }
            }
        }
        ComponentSpecs::Cpu { cores, frequency } => {
            if name.contains("ядер") {
                if let Some(n) = leading_int(value) {
                    *cores = n;
                }
            } else if name.contains("частот") {
                if let Some(n) = leading_number(value) {
                    *frequency = n;
                }
            }
        }
        ComponentSpecs::Ram {
            capacity,
            memory_type,
        } => {
            if name.contains("объем") {
                if let Some(n) = leading_int(value) {
                    *capacity = n;
                }
            } else if name.contains("тип") {
                *memory_type = value.to_string();
            }
        }
        ComponentSpecs::Storage {
            capacity,
            storage_type,
        } => {
            if name.contains("объем") {
                if let Some(n) = leading_int(value) {
                    *capacity = n;
                }
            } else if name.contains("тип") {
                *storage_type = value.to_string();
            }
        }
        ComponentSpecs::Motherboard {
            socket,
            form_factor,
        } => {
            if name.contains("сокет") {
                *socket = value.to_string();
            } else if name.contains("форм-фактор") {
                *form_factor = value.to_string();
            }
        }
        ComponentSpecs::PowerSupply { wattage } => {
            if name.contains("мощность") {
                if let Some(n) = leading_int(value) {
                    *wattage = n;
                }
            }
        }
        ComponentSpecs::Case { form_factor } => {
            if name.contains("форм-фактор") {
                *form_factor = value.to_string();
            }
        }
    }
}
