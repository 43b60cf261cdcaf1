//! Budget- and goal-driven build optimizer over the offline catalog.

mod filter;
pub mod scoring;
mod solver;

use std::{collections::BTreeMap, sync::Arc};

use tracing::{info, warn};

use crate::{
    catalog::{Catalog, Category, Part},
    errors::{Error, OptimizeError},
    goals::Goal,
    Result,
};

pub use filter::Candidate;

/// Budgets at or above this must spend at least [`MIN_SPEND_SHARE`] of it.
const MIN_SPEND_BUDGET: f64 = 1500.0;
const MIN_SPEND_SHARE: f64 = 0.8;

#[derive(Clone, Debug)]
pub struct SelectedComponent {
    pub category: Category,
    pub name: String,
    pub price: f64,
    pub utility: f64,
    /// Share of the total budget actually spent here, in percent.
    pub budget_percentage: f64,
    /// Share this goal recommends for the category, in percent.
    pub recommended_percentage: f64,
    pub part: Part,
}

#[derive(Clone, Debug)]
pub struct BuildPlan {
    pub goal: Goal,
    pub budget: f64,
    /// Sorted by category key.
    pub components: Vec<SelectedComponent>,
    pub total_price: f64,
    pub total_utility: f64,
    pub remaining_budget: f64,
}

impl BuildPlan {
    pub fn component(&self, category: Category) -> Option<&SelectedComponent> {
        self.components.iter().find(|c| c.category == category)
    }
}

/// Run [`plan_build`] on a blocking thread.
pub async fn optimize(catalog: Arc<Catalog>, budget: f64, goal: Goal) -> Result<BuildPlan> {
    tokio::task::spawn_blocking(move || plan_build(&catalog, budget, goal))
        .await
        .map_err(|e| Error::External(format!("optimizer task failed: {e}")))?
}

pub fn plan_build(catalog: &Catalog, budget: f64, goal: Goal) -> Result<BuildPlan> {
    if !budget.is_finite() || budget <= 0.0 {
        return Err(Error::InvalidInput(format!("budget must be positive, got {budget}")));
    }

    info!("Pre-filtering components based on {goal} build requirements...");
    let filtered = filter::prefilter(catalog, goal, budget);
    let candidates = filter::valid_candidates(filtered, goal, budget)?;

    let min_spend = if budget >= MIN_SPEND_BUDGET {
        budget * MIN_SPEND_SHARE
    } else {
        0.0
    };

    let selection = solver::solve(&candidates, budget, min_spend).ok_or_else(|| {
        warn!("No build costs between ${min_spend:.2} and ${budget:.2}");
        OptimizeError::Infeasible
    })?;

    Ok(assemble_plan(&candidates, &selection, budget, goal))
}

fn assemble_plan(
    candidates: &BTreeMap<Category, Vec<Candidate>>,
    selection: &solver::Selection,
    budget: f64,
    goal: Goal,
) -> BuildPlan {
    let allocation = goal.budget_allocation();

    let mut components = selection
        .iter()
        .map(|(category, idx)| {
            let c = &candidates[category][*idx];
            SelectedComponent {
                category: *category,
                name: c.part.name.clone(),
                price: c.price,
                utility: c.utility,
                budget_percentage: c.price / budget * 100.0,
                recommended_percentage: allocation.get(*category) * 100.0,
                part: c.part.clone(),
            }
        })
        .collect::<Vec<_>>();
    components.sort_by_key(|c| c.category.key());

    let total_price = components.iter().map(|c| c.price).sum::<f64>();
    let total_utility = components.iter().map(|c| c.utility).sum::<f64>();

    BuildPlan {
        goal,
        budget,
        components,
        total_price,
        total_utility,
        remaining_budget: budget - total_price,
    }
}
