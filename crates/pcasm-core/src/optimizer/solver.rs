//! Multiple-choice knapsack: exactly one candidate per category, total price
//! within `[min_spend, budget]`, maximum total utility.
//!
//! Solved exactly on real prices by extending a frontier of partial builds one
//! category at a time. A partial build is dropped only when another one is at
//! least as good for every possible completion:
//! - a cheaper one with no less utility that already reaches `min_spend` with
//!   the cheapest remaining parts;
//! - a pricier one with no less utility that stays within `budget` even with
//!   the most expensive remaining parts;
//! - one with the same total price (to the cent) and no less utility.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::Category;

use super::filter::Candidate;

/// Tolerance for float sums of cent prices.
const EPS: f64 = 1e-6;

/// Index of the chosen candidate per category.
pub type Selection = BTreeMap<Category, usize>;

#[derive(Clone, Copy, Debug)]
struct State {
    price: f64,
    utility: f64,
    /// Index into the previous frontier.
    parent: usize,
    /// Candidate picked for this frontier's category.
    item: usize,
}

pub fn solve(
    candidates: &BTreeMap<Category, Vec<Candidate>>,
    budget: f64,
    min_spend: f64,
) -> Option<Selection> {
    if candidates.is_empty() || !budget.is_finite() || budget <= 0.0 {
        return None;
    }
    if candidates.values().any(Vec::is_empty) {
        return None;
    }
    let min_spend = min_spend.max(0.0);
    if min_spend > budget + EPS {
        return None;
    }

    let categories = candidates.keys().copied().collect::<Vec<_>>();
    let n = categories.len();

    // rest_min[k] / rest_max[k]: cheapest / priciest completion after category k.
    let mut rest_min = vec![0.0; n];
    let mut rest_max = vec![0.0; n];
    for k in (0..n.saturating_sub(1)).rev() {
        let items = &candidates[&categories[k + 1]];
        let lo = items.iter().map(|c| c.price).fold(f64::INFINITY, f64::min);
        let hi = items.iter().map(|c| c.price).fold(f64::NEG_INFINITY, f64::max);
        rest_min[k] = rest_min[k + 1] + lo;
        rest_max[k] = rest_max[k + 1] + hi;
    }

    let root = State {
        price: 0.0,
        utility: 0.0,
        parent: 0,
        item: 0,
    };
    // frontiers[0] holds the empty build; frontiers[k + 1] ends with categories[k].
    let mut frontiers: Vec<Vec<State>> = Vec::with_capacity(n + 1);
    frontiers.push(vec![root]);

    for (k, category) in categories.iter().enumerate() {
        let mut next = Vec::new();
        for (parent, state) in frontiers[k].iter().enumerate() {
            for (item, c) in candidates[category].iter().enumerate() {
                let price = state.price + c.price;
                if price + rest_min[k] > budget + EPS || price + rest_max[k] < min_spend - EPS {
                    continue;
                }
                next.push(State {
                    price,
                    utility: state.utility + c.utility,
                    parent,
                    item,
                });
            }
        }

        let pruned = prune(next, budget - rest_max[k], min_spend - rest_min[k]);
        if pruned.is_empty() {
            return None;
        }
        frontiers.push(pruned);
    }

    let last = frontiers.last()?;
    let (mut idx, _) = last
        .iter()
        .enumerate()
        .fold(None::<(usize, f64)>, |acc, (i, s)| match acc {
            Some((_, best)) if best >= s.utility => acc,
            _ => Some((i, s.utility)),
        })?;

    let mut selection = Selection::new();
    for k in (0..n).rev() {
        let state = frontiers[k + 1][idx];
        selection.insert(categories[k], state.item);
        idx = state.parent;
    }
    Some(selection)
}

/// Drop dominated partial builds.
///
/// `safe_below`: a partial build at or under this price fits the budget with any completion.
/// `safe_above`: a partial build at or over this price reaches the minimum with any completion.
fn prune(states: Vec<State>, safe_below: f64, safe_above: f64) -> Vec<State> {
    let mut by_cents: HashMap<i64, State> = HashMap::with_capacity(states.len());
    for s in states {
        let key = (s.price * 100.0).round() as i64;
        match by_cents.get(&key) {
            Some(kept) if kept.utility >= s.utility => {}
            _ => {
                by_cents.insert(key, s);
            }
        }
    }
    let mut sorted = by_cents.into_values().collect::<Vec<_>>();
    sorted.sort_by(|a, b| a.price.total_cmp(&b.price));

    let mut best_floor_safe = f64::NEG_INFINITY;
    let mut ascending = Vec::with_capacity(sorted.len());
    for s in sorted {
        let floor_safe = s.price >= safe_above - EPS;
        if floor_safe && s.utility <= best_floor_safe {
            continue;
        }
        if floor_safe {
            best_floor_safe = s.utility;
        }
        ascending.push(s);
    }

    let mut best_budget_safe = f64::NEG_INFINITY;
    let mut kept = Vec::with_capacity(ascending.len());
    for s in ascending.into_iter().rev() {
        if s.utility <= best_budget_safe {
            continue;
        }
        if s.price <= safe_below + EPS {
            best_budget_safe = s.utility;
        }
        kept.push(s);
    }
    kept.reverse();
    kept
}

pub fn selection_price(
    candidates: &BTreeMap<Category, Vec<Candidate>>,
    selection: &Selection,
) -> f64 {
    selection
        .iter()
        .map(|(c, i)| candidates[c][*i].price)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Part;

    fn cand(price: f64, utility: f64) -> Candidate {
        Candidate {
            part: Part::new(format!("{price}"), Some(price)),
            price,
            utility,
        }
    }

    fn table(rows: Vec<(Category, Vec<(f64, f64)>)>) -> BTreeMap<Category, Vec<Candidate>> {
        rows.into_iter()
            .map(|(c, items)| (c, items.into_iter().map(|(p, u)| cand(p, u)).collect()))
            .collect()
    }

    /// Best utility over every combination, for cross-checking.
    fn exhaustive(
        t: &BTreeMap<Category, Vec<Candidate>>,
        budget: f64,
        min_spend: f64,
    ) -> Option<f64> {
        let rows = t.values().collect::<Vec<_>>();
        let mut best: Option<f64> = None;
        let mut idx = vec![0usize; rows.len()];
        loop {
            let price = rows.iter().zip(&idx).map(|(r, i)| r[*i].price).sum::<f64>();
            let utility = rows.iter().zip(&idx).map(|(r, i)| r[*i].utility).sum::<f64>();
            if price <= budget + EPS && price >= min_spend - EPS {
                best = Some(best.map_or(utility, |b: f64| b.max(utility)));
            }

            let mut k = 0;
            loop {
                if k == rows.len() {
                    return best;
                }
                idx[k] += 1;
                if idx[k] < rows[k].len() {
                    break;
                }
                idx[k] = 0;
                k += 1;
            }
        }
    }

    fn utility_of(t: &BTreeMap<Category, Vec<Candidate>>, sel: &Selection) -> f64 {
        sel.iter().map(|(c, i)| t[c][*i].utility).sum()
    }

    #[test]
    fn picks_best_combination_within_budget() {
        let t = table(vec![
            (Category::Cpu, vec![(100.0, 10.0), (300.0, 30.0)]),
            (Category::Memory, vec![(50.0, 5.0), (250.0, 40.0)]),
        ]);
        // 300 + 250 > 500; best is 100 + 250 (50) over 300 + 50 (35).
        let sel = solve(&t, 500.0, 0.0).unwrap();
        assert_eq!(sel[&Category::Cpu], 0);
        assert_eq!(sel[&Category::Memory], 1);
        assert_eq!(selection_price(&t, &sel), 350.0);
    }

    #[test]
    fn one_part_from_every_category() {
        let t = table(vec![
            (Category::Cpu, vec![(10.0, 1.0)]),
            (Category::Case, vec![(10.0, 1.0)]),
            (Category::Storage, vec![(10.0, 1.0)]),
        ]);
        let sel = solve(&t, 100.0, 0.0).unwrap();
        assert_eq!(sel.len(), 3);
    }

    #[test]
    fn fractional_prices_can_fill_the_budget_exactly() {
        let t = table(vec![
            (Category::Cpu, vec![(49.6, 1.0), (50.4, 100.0)]),
            (Category::Case, vec![(49.6, 1.0)]),
        ]);
        let sel = solve(&t, 100.0, 0.0).unwrap();
        assert_eq!(sel[&Category::Cpu], 1);
        assert!((selection_price(&t, &sel) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn pricier_part_wins_when_the_total_lands_on_the_budget() {
        let t = table(vec![
            (Category::Cpu, vec![(300.0, 2.0), (400.5, 3.0)]),
            (Category::Memory, vec![(200.0, 1.0)]),
            (Category::Motherboard, vec![(200.0, 1.0)]),
            (Category::PowerSupply, vec![(99.5, 1.0)]),
            (Category::Case, vec![(100.0, 1.0)]),
        ]);
        let sel = solve(&t, 1000.0, 0.0).unwrap();
        assert_eq!(sel[&Category::Cpu], 1);
    }

    #[test]
    fn min_spend_forces_a_pricier_pick() {
        let t = table(vec![(Category::Cpu, vec![(100.0, 50.0), (900.0, 10.0)])]);
        let cheap = solve(&t, 1000.0, 0.0).unwrap();
        assert_eq!(cheap[&Category::Cpu], 0);

        let forced = solve(&t, 1000.0, 800.0).unwrap();
        assert_eq!(forced[&Category::Cpu], 1);
    }

    #[test]
    fn min_spend_is_met_on_real_prices() {
        // 499.9 has more utility but only 500 reaches the 1200 floor.
        let t = table(vec![
            (Category::Cpu, vec![(499.9, 10.0), (500.0, 9.0)]),
            (Category::Memory, vec![(300.0, 1.0)]),
            (Category::Motherboard, vec![(250.0, 1.0)]),
            (Category::PowerSupply, vec![(75.0, 1.0)]),
            (Category::Case, vec![(75.0, 1.0)]),
        ]);
        let sel = solve(&t, 1500.0, 1200.0).unwrap();
        assert_eq!(sel[&Category::Cpu], 1);
        assert!(selection_price(&t, &sel) >= 1200.0 - 1e-9);
    }

    #[test]
    fn matches_exhaustive_search() {
        // Deterministic pseudo-random tables, with and without a spending floor.
        let mut seed: u64 = 0x9e37_79b9_7f4a_7c15;
        let mut next = move |modulo: u64| {
            seed = seed
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (seed >> 33) % modulo
        };

        for round in 0..40 {
            let rows = Category::ALL[..4]
                .iter()
                .map(|c| {
                    let items = (0..(2 + next(5)))
                        .map(|_| (next(40_000) as f64 / 100.0 + 1.0, next(1000) as f64 / 10.0))
                        .collect::<Vec<_>>();
                    (*c, items)
                })
                .collect::<Vec<_>>();
            let t = table(rows);
            let budget = 400.0 + next(800) as f64;
            let min_spend = if round % 2 == 0 { 0.0 } else { budget * 0.8 };

            let expected = exhaustive(&t, budget, min_spend);
            let got = solve(&t, budget, min_spend);
            match (expected, got) {
                (None, None) => {}
                (Some(best), Some(sel)) => {
                    let price = selection_price(&t, &sel);
                    assert!(price <= budget + 1e-6, "round {round}: {price} > {budget}");
                    assert!(price >= min_spend - 1e-6, "round {round}: {price} < {min_spend}");
                    assert!(
                        (utility_of(&t, &sel) - best).abs() < 1e-9,
                        "round {round}: {} vs {best}",
                        utility_of(&t, &sel)
                    );
                }
                (expected, got) => panic!("round {round}: {expected:?} vs {got:?}"),
            }
        }
    }

    #[test]
    fn infeasible_when_nothing_fits() {
        let t = table(vec![
            (Category::Cpu, vec![(600.0, 1.0)]),
            (Category::Case, vec![(600.0, 1.0)]),
        ]);
        assert!(solve(&t, 1000.0, 0.0).is_none());
        assert!(solve(&t, 2000.0, 1990.0).is_none());
        assert!(solve(&BTreeMap::new(), 1000.0, 0.0).is_none());
    }
}
