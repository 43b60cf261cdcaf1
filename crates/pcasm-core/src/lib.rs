//! Core domain + application logic for the PC assembler bot.
//!
//! This crate is intentionally framework-agnostic. Telegram and Yandex Market
//! live behind ports (traits) implemented in adapter crates.

pub mod assembly;
pub mod catalog;
pub mod config;
pub mod dialogue;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod formatting;
pub mod goals;
pub mod keyboards;
pub mod logging;
pub mod messaging;
pub mod optimizer;
pub mod report;
pub mod security;

pub use errors::{Error, OptimizeError, Result};
