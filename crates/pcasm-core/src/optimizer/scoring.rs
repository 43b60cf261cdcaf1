//! Utility scores for individual parts.

use crate::{catalog::Category, catalog::Part, goals::Goal};

const BASE_UTILITY: f64 = 50.0;

/// Category-specific quality score, before goal and budget are considered.
///
/// `None` when the part has no usable price.
pub fn base_utility(part: &Part, category: Category) -> Option<f64> {
    part.positive_price()?;

    let score = match category {
        Category::Cpu => {
            let cores = part.number("core_count").unwrap_or(4.0);
            let clock = part
                .number("boost_clock")
                .or_else(|| part.number("core_clock"))
                .unwrap_or(3.0);
            BASE_UTILITY + cores * clock * 2.0
        }
        Category::VideoCard => {
            let memory = part.number("memory").unwrap_or(4.0);
            let clock = part
                .number("boost_clock")
                .or_else(|| part.number("core_clock"))
                .unwrap_or(1000.0);
            BASE_UTILITY + memory * 5.0 + clock / 100.0
        }
        Category::Memory => memory_utility(part),
        Category::Motherboard => {
            let form_factor = part.text("form_factor").unwrap_or_default();
            // Plain "ATX" also matches "Micro ATX"; the first match wins.
            let bonus = if form_factor.contains("ATX") {
                20.0
            } else if form_factor.contains("Micro ATX") {
                15.0
            } else if form_factor.contains("Mini ITX") {
                10.0
            } else {
                0.0
            };
            BASE_UTILITY + bonus
        }
        Category::PowerSupply => {
            let wattage = part.number("wattage").unwrap_or(500.0);
            let efficiency = part.text("efficiency").unwrap_or_default().to_lowercase();
            let bonus = [
                ("titanium", 30.0),
                ("platinum", 25.0),
                ("gold", 20.0),
                ("silver", 15.0),
                ("bronze", 10.0),
            ]
            .iter()
            .find(|(k, _)| efficiency.contains(k))
            .map(|(_, v)| *v)
            .unwrap_or(0.0);
            BASE_UTILITY + wattage / 20.0 + bonus
        }
        Category::Case => {
            let case_type = part.text("type").unwrap_or_default();
            let bonus = if case_type.contains("Full Tower") {
                20.0
            } else if case_type.contains("Mid Tower") {
                15.0
            } else if case_type.contains("Mini Tower") {
                10.0
            } else {
                0.0
            };
            BASE_UTILITY + bonus
        }
        Category::Storage => {
            let capacity = part.number("capacity").unwrap_or(500.0);
            let storage_type = part.text("type").unwrap_or_default().to_lowercase();
            let bonus = if storage_type.contains("ssd") {
                20.0
            } else if storage_type.contains("nvme") {
                30.0
            } else {
                0.0
            };
            BASE_UTILITY + capacity / 100.0 + bonus
        }
    };

    Some(score)
}

fn memory_utility(part: &Part) -> f64 {
    if !(part.has("modules") && part.has("speed")) {
        return BASE_UTILITY;
    }

    // `modules: [count, size_gb]`, `speed: [ddr_generation, mhz]`.
    let total_size = match part.list("modules") {
        Some(m) if m.len() >= 2 => {
            match (part.list_number("modules", 0), part.list_number("modules", 1)) {
                (Some(count), Some(size)) => count * size,
                _ => return BASE_UTILITY,
            }
        }
        _ => 8.0,
    };
    let speed = match part.list("speed") {
        Some(s) if s.len() >= 2 => match part.list_number("speed", 1) {
            Some(mhz) => mhz,
            None => return BASE_UTILITY,
        },
        _ => 3000.0,
    };

    BASE_UTILITY + total_size * 2.0 + speed / 100.0
}

/// How well the price sits against the category's share of the budget.
pub fn price_factor(price: f64, category_budget: f64, budget: f64) -> f64 {
    if budget >= 2000.0 {
        if price > category_budget * 2.0 {
            0.6
        } else if price > category_budget * 1.5 {
            0.8
        } else if price > category_budget {
            0.9
        } else if price >= category_budget * 0.7 {
            1.2
        } else if price >= category_budget * 0.4 {
            1.0
        } else {
            0.7
        }
    } else if budget >= 1000.0 {
        if price > category_budget * 1.5 {
            0.6
        } else if price > category_budget * 1.2 {
            0.8
        } else if price > category_budget {
            0.9
        } else if price >= category_budget * 0.6 {
            1.1
        } else if price >= category_budget * 0.3 {
            1.0
        } else {
            0.8
        }
    } else if price > category_budget * 1.2 {
        0.5
    } else if price > category_budget {
        0.7
    } else if price >= category_budget * 0.8 {
        1.0
    } else if price >= category_budget * 0.5 {
        0.9
    } else {
        0.8
    }
}

/// Goal- and budget-aware utility used as the knapsack objective.
///
/// `base * weight² * price_factor + price_bonus`; the bonus (budgets of 1500+)
/// nudges big budgets towards spending more.
pub fn utility(part: &Part, category: Category, goal: Goal, budget: f64) -> Option<f64> {
    let base = base_utility(part, category)?;
    let price = part.positive_price()?;

    let weight = goal.weights().get(category);
    let category_budget = goal.budget_allocation().get(category) * budget;

    let factor = price_factor(price, category_budget, budget);
    let bonus = if budget >= 1500.0 {
        (price / 100.0).min(category_budget / 50.0)
    } else {
        0.0
    };

    Some(base * weight * weight * factor + bonus)
}
