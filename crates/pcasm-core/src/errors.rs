use std::path::PathBuf;

use crate::catalog::Category;

/// Core error type.
///
/// Adapter crates should map their specific errors into this type so the bot
/// core can handle failures consistently (user-facing message vs log only).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dataset error: {path}: {reason}")]
    Dataset { path: PathBuf, reason: String },

    #[error(transparent)]
    Optimize(#[from] OptimizeError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("external error: {0}")]
    External(String),
}

/// Reasons the build optimizer can fail to produce a configuration.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum OptimizeError {
    #[error("no valid components with price and utility values found")]
    NoValidComponents,

    #[error("missing components for categories: {}", join_categories(.0))]
    MissingCategories(Vec<Category>),

    #[error("no feasible build found with this budget")]
    Infeasible,
}

fn join_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| c.key())
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
