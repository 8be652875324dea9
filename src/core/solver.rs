use log::{debug, trace};

use super::engine::simulate_to_target;
use super::types::{
    EngineConfig, OptimalDistribution, RemainderPolicy, StakeSearchIteration, StakeSearchResult,
};

// float noise, never a unit
const DUST_EPSILON: f64 = 1e-9;

pub fn find_optimal_stake(
    internal_rate: f64,
    periods: u32,
    config: &EngineConfig,
) -> StakeSearchResult {
    let target = config.balance_cap;
    let tolerance = config.search_tolerance;

    let mut iterations = Vec::new();
    let mut lo = config.min_unit;
    let mut hi = target;
    let mut accepted = None;
    let mut it = 0;
    while hi - lo > tolerance && it < config.max_search_iterations {
        it += 1;
        let mid = (lo + hi) * 0.5;
        let projected = simulate_to_target(mid, internal_rate, periods, target);
        iterations.push(StakeSearchIteration {
            iteration: it,
            lower_bound: lo,
            upper_bound: hi,
            candidate_value: mid,
            projected_balance: projected,
        });
        trace!("stake search #{it}: [{lo:.6}, {hi:.6}] mid {mid:.6} -> {projected:.6}");

        if (projected - target).abs() < tolerance {
            accepted = Some(mid);
            break;
        } else if projected < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    let converged = accepted.is_some() || hi - lo <= tolerance;
    let optimal_stake = accepted.unwrap_or((lo + hi) * 0.5);
    let projected_balance = simulate_to_target(optimal_stake, internal_rate, periods, target);
    debug!(
        "optimal stake {optimal_stake:.6} after {} iterations (converged: {converged}), projected {projected_balance:.6}",
        iterations.len()
    );

    StakeSearchResult {
        optimal_stake,
        projected_balance,
        iterations,
        converged,
    }
}

pub fn distribute_capital(
    total_capital: f64,
    unit_size: f64,
    config: &EngineConfig,
) -> OptimalDistribution {
    if total_capital < unit_size {
        return OptimalDistribution {
            unit_size: total_capital,
            unit_count: 1,
            remainder: 0.0,
            has_remainder: false,
            degenerate: true,
        };
    }

    let unit_count = (total_capital / unit_size).floor();
    let remainder = (total_capital - unit_count * unit_size).max(0.0);
    let has_remainder = match config.remainder_policy {
        RemainderPolicy::DropDust => remainder >= config.min_unit,
        RemainderPolicy::SimulateDust => remainder > DUST_EPSILON,
    };

    OptimalDistribution {
        unit_size,
        unit_count: unit_count as u64,
        remainder,
        has_remainder,
        degenerate: false,
    }
}
