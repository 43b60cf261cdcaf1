//! Narrowing the catalog down to candidates worth handing to the solver.

use std::collections::BTreeMap;

use tracing::{debug, info};

use super::scoring;
use crate::{
    catalog::{Catalog, Category, Part},
    errors::OptimizeError,
    goals::Goal,
};

const HIGH_END_KEEP: usize = 100;
const SPREAD_TARGET: usize = 900;
const MAX_PER_CATEGORY: usize = 1000;

/// A part that survived filtering, with its utility for this goal and budget.
#[derive(Clone, Debug)]
pub struct Candidate {
    pub part: Part,
    pub price: f64,
    pub utility: f64,
}

fn max_price_multiplier(budget: f64) -> f64 {
    if budget >= 2000.0 {
        3.0
    } else if budget >= 1000.0 {
        2.5
    } else {
        2.0
    }
}

fn by_price(a: &&Part, b: &&Part) -> std::cmp::Ordering {
    let pa = a.price.unwrap_or(0.0);
    let pb = b.price.unwrap_or(0.0);
    pa.total_cmp(&pb)
}

/// Price-based pre-filter; categories left empty are dropped.
pub fn prefilter<'a>(
    catalog: &'a Catalog,
    goal: Goal,
    budget: f64,
) -> BTreeMap<Category, Vec<&'a Part>> {
    let allocation = goal.budget_allocation();
    let multiplier = max_price_multiplier(budget);

    let mut out = BTreeMap::new();
    for (category, parts) in catalog.categories() {
        let max_price = allocation.get(category) * budget * multiplier;

        let mut items = parts
            .iter()
            .filter(|p| p.positive_price().is_some_and(|price| price <= max_price))
            .collect::<Vec<_>>();

        if budget >= 1500.0 && !items.is_empty() {
            items.sort_by(|a, b| by_price(b, a));
            let mut rest = items.split_off(items.len().min(HIGH_END_KEEP));
            if !rest.is_empty() {
                rest.sort_by(by_price);
                let step = (rest.len() / SPREAD_TARGET).max(1);
                items.extend(rest.into_iter().step_by(step));
            }
        }

        if items.len() > MAX_PER_CATEGORY {
            items.sort_by(by_price);
            items.truncate(MAX_PER_CATEGORY);
        }

        if !items.is_empty() {
            debug!("{category}: {} of {} parts within ${max_price:.2}", items.len(), parts.len());
            out.insert(category, items);
        }
    }
    out
}

/// Score the pre-filtered parts and check every required category is covered.
pub fn valid_candidates(
    filtered: BTreeMap<Category, Vec<&Part>>,
    goal: Goal,
    budget: f64,
) -> Result<BTreeMap<Category, Vec<Candidate>>, OptimizeError> {
    let mut valid = BTreeMap::new();

    for (category, parts) in filtered {
        let candidates = parts
            .into_iter()
            .filter_map(|part| {
                let price = part.positive_price()?;
                let utility = scoring::utility(part, category, goal, budget)?;
                (utility > 0.0).then(|| Candidate {
                    part: part.clone(),
                    price,
                    utility,
                })
            })
            .collect::<Vec<_>>();

        if !candidates.is_empty() {
            info!(
                "Found {} valid {category} components for {goal} build",
                candidates.len()
            );
            valid.insert(category, candidates);
        }
    }

    if valid.is_empty() {
        return Err(OptimizeError::NoValidComponents);
    }

    let missing = Category::REQUIRED
        .into_iter()
        .filter(|c| !valid.contains_key(c))
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(OptimizeError::MissingCategories(missing));
    }

    Ok(valid)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_with(category: Category, prices: impl IntoIterator<Item = f64>) -> Catalog {
        let parts = prices
            .into_iter()
            .enumerate()
            .map(|(i, p)| Part::new(format!("{category}-{i}"), Some(p)))
            .collect();
        Catalog::from_parts(BTreeMap::from([(category, parts)]))
    }

    #[test]
    fn drops_parts_above_the_category_cap() {
        // Games at 500: cpu allocation 0.2 -> 100, low budget multiplier 2 -> 200.
        let catalog = catalog_with(Category::Cpu, [50.0, 199.0, 200.0, 201.0, 0.0, -5.0]);
        let filtered = prefilter(&catalog, Goal::Games, 500.0);
        let prices = filtered[&Category::Cpu]
            .iter()
            .map(|p| p.price.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(prices, vec![50.0, 199.0, 200.0]);
    }

    #[test]
    fn empty_categories_are_dropped() {
        let catalog = catalog_with(Category::Case, [10_000.0]);
        assert!(prefilter(&catalog, Goal::Office, 1000.0).is_empty());
    }

    #[test]
    fn high_budgets_keep_the_expensive_end() {
        // Games at 2000: case allocation 0.03 -> 60, multiplier 3 -> 180.
        // 100 most expensive + every 2nd of the remaining 1800.
        let prices = (1..=1900).map(|i| f64::from(i) * 0.09);
        let catalog = catalog_with(Category::Case, prices);
        let filtered = prefilter(&catalog, Goal::Games, 2000.0);
        let kept = &filtered[&Category::Case];

        assert_eq!(kept.len(), 1000);
        let most_expensive = kept
            .iter()
            .filter_map(|p| p.price)
            .fold(f64::MIN, f64::max);
        assert!((most_expensive - 171.0).abs() < 1e-6);
    }

    #[test]
    fn caps_each_category_at_a_thousand_cheapest() {
        let prices = (1..=1500).map(|i| f64::from(i) * 0.1);
        let catalog = catalog_with(Category::Cpu, prices);
        // Games at 1000: cpu 0.2 -> 200 * 2.5 = 500, so nothing is filtered by price.
        let filtered = prefilter(&catalog, Goal::Games, 1000.0);
        let kept = &filtered[&Category::Cpu];
        assert_eq!(kept.len(), MAX_PER_CATEGORY);
        let last = kept.last().and_then(|p| p.price).unwrap();
        assert!((last - 100.0).abs() < 1e-6);
    }

    #[test]
    fn reports_missing_required_categories() {
        let catalog = catalog_with(Category::Cpu, [100.0]);
        let filtered = prefilter(&catalog, Goal::Games, 1000.0);
        let err = valid_candidates(filtered, Goal::Games, 1000.0).unwrap_err();
        assert_eq!(
            err,
            OptimizeError::MissingCategories(vec![
                Category::Memory,
                Category::Motherboard,
                Category::PowerSupply,
                Category::Case,
            ])
        );
    }

    #[test]
    fn nothing_left_is_no_valid_components() {
        let err = valid_candidates(BTreeMap::new(), Goal::Games, 1000.0).unwrap_err();
        assert_eq!(err, OptimizeError::NoValidComponents);
    }
}
