//! Yandex Market adapter: HTTP client, mock responses and the market build engine.

pub mod client;
pub mod mock;
pub mod models;
pub mod service;

pub use client::YandexMarketClient;
pub use service::MarketAssembler;
