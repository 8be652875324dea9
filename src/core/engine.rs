use log::debug;

use super::error::{EngineError, ensure_finite};
use super::solver::{distribute_capital, find_optimal_stake};
use super::types::{
    BalanceTrajectory, ChartPoint, ComparisonResult, EngineConfig, Improvement,
    OptimalDistribution, RateSplit, SimulationInput, StrategyResult,
};

#[derive(Debug)]
struct StandardOutcome {
    result: StrategyResult,
    period_rewards: Vec<f64>,
}

#[derive(Debug)]
struct OptimizedOutcome {
    result: StrategyResult,
    unit_trajectory: BalanceTrajectory,
    remainder_trajectory: Option<BalanceTrajectory>,
}

#[derive(Debug, Clone, Copy)]
struct StrategyTotals {
    compounding_rewards: f64,
    external_rewards: f64,
    total_costs: f64,
    deployed_capital: f64,
    initial_units: u64,
    units_created: u64,
}

pub fn split_rate(annual_rate_percent: f64, internal_weight: f64) -> RateSplit {
    let internal_rate = annual_rate_percent * internal_weight;
    RateSplit {
        internal_rate,
        external_rate: annual_rate_percent - internal_rate,
    }
}

// Fractional balance is discarded before the rate is applied.
pub fn compounding_reward(balance: f64, rate_percent: f64) -> f64 {
    balance.floor() * (rate_percent / 100.0)
}

pub fn simulate_growth(
    initial_balance: f64,
    rate_percent: f64,
    periods: u32,
    cap: f64,
) -> BalanceTrajectory {
    let mut balances = Vec::with_capacity(periods as usize + 1);
    let mut current = initial_balance.min(cap);
    balances.push(current);

    for _ in 0..periods {
        if current >= cap {
            balances.push(cap);
            continue;
        }
        current = (current + compounding_reward(current, rate_percent)).min(cap);
        balances.push(current);
    }

    BalanceTrajectory::new(balances)
}

// Unclamped: stops once `target` is reached so the overshoot stays visible.
pub fn simulate_to_target(
    initial_balance: f64,
    rate_percent: f64,
    periods: u32,
    target: f64,
) -> f64 {
    let mut balance = initial_balance;
    for _ in 0..periods {
        if balance >= target {
            return balance;
        }
        balance += compounding_reward(balance, rate_percent);
    }
    balance
}

pub fn external_rewards(capital: f64, external_rate_percent: f64, periods: u32) -> f64 {
    capital * (external_rate_percent / 100.0) * periods as f64
}

pub fn compare_strategies(
    input: &SimulationInput,
    config: &EngineConfig,
) -> Result<ComparisonResult, EngineError> {
    config.validate()?;
    input.validate()?;

    let rates = split_rate(input.annual_rate_percent, config.internal_weight);
    let search = find_optimal_stake(rates.internal_rate, input.periods, config);
    ensure_finite("optimal stake", search.optimal_stake)?;
    let distribution = distribute_capital(input.total_capital, search.optimal_stake, config);
    debug!(
        "distribution: {} x {:.4} remainder {:.4} (deployed as unit: {}, degenerate: {})",
        distribution.unit_count,
        distribution.unit_size,
        distribution.remainder,
        distribution.has_remainder,
        distribution.degenerate
    );

    let external = external_rewards(input.total_capital, rates.external_rate, input.periods);
    let standard = run_standard_strategy(input, rates, external, config);
    let optimized = run_optimized_strategy(input, rates, &distribution, external, config);

    for (label, result) in [
        ("standard", &standard.result),
        ("optimized", &optimized.result),
    ] {
        debug!(
            "{label}: rewards {:.6} costs {:.6} net {:.6} annualized {:.6}%",
            result.total_rewards, result.total_costs, result.net_total, result.annualized_rate
        );
        ensure_finite("net total", result.net_total)?;
        ensure_finite("annualized rate", result.annualized_rate)?;
        ensure_finite("total rate", result.total_rate)?;
    }

    let improvement = compute_improvement(&standard.result, &optimized.result);
    ensure_finite("reward delta", improvement.reward_delta)?;

    let series = build_chart_series(
        input.periods,
        &standard,
        &optimized,
        &distribution,
        config.balance_cap,
    );

    Ok(ComparisonResult {
        rates,
        distribution,
        standard: standard.result,
        optimized: optimized.result,
        improvement,
        standard_period_rewards: standard.period_rewards,
        unit_trajectory: optimized.unit_trajectory,
        remainder_trajectory: optimized.remainder_trajectory,
        series,
        search,
    })
}

fn run_standard_strategy(
    input: &SimulationInput,
    rates: RateSplit,
    external: f64,
    config: &EngineConfig,
) -> StandardOutcome {
    let initial_units = (input.total_capital / config.min_unit).floor() as u64;
    let per_unit = compounding_reward(config.min_unit, rates.internal_rate);
    let unit_price = config.min_unit + config.setup_cost;

    let mut active_units = initial_units;
    let mut units_created = 0u64;
    let mut period_rewards = Vec::with_capacity(input.periods as usize);
    for _ in 0..input.periods {
        let reward = active_units as f64 * per_unit;
        period_rewards.push(reward);

        let minted = (reward / unit_price).floor() as u64;
        active_units = active_units.saturating_add(minted);
        units_created = units_created.saturating_add(minted);
    }

    let totals = StrategyTotals {
        compounding_rewards: period_rewards.iter().sum(),
        external_rewards: external,
        total_costs: initial_units.saturating_add(units_created) as f64 * config.setup_cost,
        deployed_capital: initial_units as f64 * config.min_unit,
        initial_units,
        units_created,
    };

    StandardOutcome {
        result: summarize(totals, rates, input.periods),
        period_rewards,
    }
}

// Full-size units share one trajectory.
fn run_optimized_strategy(
    input: &SimulationInput,
    rates: RateSplit,
    distribution: &OptimalDistribution,
    external: f64,
    config: &EngineConfig,
) -> OptimizedOutcome {
    let unit_trajectory = simulate_growth(
        distribution.unit_size,
        rates.internal_rate,
        input.periods,
        config.balance_cap,
    );
    let remainder_trajectory = distribution.has_remainder.then(|| {
        simulate_growth(
            distribution.remainder,
            rates.internal_rate,
            input.periods,
            config.balance_cap,
        )
    });

    let compounding_rewards = distribution.unit_count as f64 * unit_trajectory.total_reward()
        + remainder_trajectory
            .as_ref()
            .map_or(0.0, BalanceTrajectory::total_reward);

    let totals = StrategyTotals {
        compounding_rewards,
        external_rewards: external,
        total_costs: distribution.simulated_units() as f64 * config.setup_cost,
        deployed_capital: distribution.deployed_capital(),
        initial_units: distribution.simulated_units(),
        units_created: 0,
    };

    OptimizedOutcome {
        result: summarize(totals, rates, input.periods),
        unit_trajectory,
        remainder_trajectory,
    }
}

fn summarize(totals: StrategyTotals, rates: RateSplit, periods: u32) -> StrategyResult {
    let net_total = totals.compounding_rewards - totals.total_costs + totals.external_rewards;
    let years = periods as f64;
    let base = totals.deployed_capital;

    let (annualized_rate, compounding_rate) = if base > 0.0 {
        (
            (net_total - base) / base / years * 100.0,
            (totals.compounding_rewards - totals.total_costs) / base / years * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    StrategyResult {
        total_rewards: totals.compounding_rewards,
        external_rewards: totals.external_rewards,
        total_costs: totals.total_costs,
        net_total,
        deployed_capital: base,
        initial_units: totals.initial_units,
        units_created: totals.units_created,
        annualized_rate,
        compounding_rate,
        total_rate: compounding_rate + rates.external_rate,
    }
}

fn compute_improvement(standard: &StrategyResult, optimized: &StrategyResult) -> Improvement {
    let reward_delta = optimized.net_total - standard.net_total;
    let reward_delta_percent = if standard.net_total != 0.0 {
        reward_delta / standard.net_total.abs() * 100.0
    } else {
        0.0
    };
    Improvement {
        reward_delta,
        reward_delta_percent,
        rate_delta: optimized.annualized_rate - standard.annualized_rate,
        total_rate_delta: optimized.total_rate - standard.total_rate,
    }
}

fn build_chart_series(
    periods: u32,
    standard: &StandardOutcome,
    optimized: &OptimizedOutcome,
    distribution: &OptimalDistribution,
    cap: f64,
) -> Vec<ChartPoint> {
    let unit_count = distribution.unit_count as f64;
    let cap_line = cap * unit_count;
    let mut cumulative_standard = 0.0;

    (0..=periods)
        .map(|period| {
            let idx = period as usize;
            if idx > 0 {
                cumulative_standard += standard.period_rewards[idx - 1];
            }
            let remainder_balance = optimized
                .remainder_trajectory
                .as_ref()
                .map_or(0.0, |t| t.balances()[idx]);
            ChartPoint {
                period,
                standard_balance: standard.result.deployed_capital + cumulative_standard,
                optimized_balance: unit_count * optimized.unit_trajectory.balances()[idx]
                    + remainder_balance,
                cap_line,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BALANCE_CAP, MAX_PERIODS, MAX_TOTAL_CAPITAL, RemainderPolicy};
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    fn sample_input() -> SimulationInput {
        SimulationInput {
            total_capital: 10_000.0,
            annual_rate_percent: 3.38,
            periods: 3,
        }
    }

    fn assert_trajectory_invariants(trajectory: &BalanceTrajectory, periods: u32, cap: f64) {
        let balances = trajectory.balances();
        assert_eq!(balances.len(), periods as usize + 1);
        for pair in balances.windows(2) {
            assert!(pair[1] >= pair[0], "trajectory decreased: {pair:?}");
        }
        for balance in balances {
            assert!(*balance <= cap, "balance {balance} above cap {cap}");
        }
    }

    #[test]
    fn split_rate_uses_fixed_weights_and_preserves_total() {
        let rates = split_rate(4.0, 0.825);
        assert_approx(rates.internal_rate, 3.3);
        assert_approx(rates.external_rate, 0.7);
        assert_approx(rates.internal_rate + rates.external_rate, 4.0);
    }

    #[test]
    fn oracle_floor_then_multiply_accrual_matches_hand_calculation() {
        // 100.5 -> floor 100 * 10% = 10 -> 110.5
        // 110.5 -> floor 110 * 10% = 11 -> 121.5
        let trajectory = simulate_growth(100.5, 10.0, 2, BALANCE_CAP);
        assert_eq!(trajectory.balances().len(), 3);
        assert_approx(trajectory.balances()[0], 100.5);
        assert_approx(trajectory.balances()[1], 110.5);
        assert_approx(trajectory.balances()[2], 121.5);
        assert_approx(trajectory.total_reward(), 21.0);
    }

    #[test]
    fn growth_saturates_at_cap_without_reporting_overflow() {
        let trajectory = simulate_growth(2000.0, 10.0, 3, BALANCE_CAP);
        assert_eq!(trajectory.balances(), &[2000.0, 2048.0, 2048.0, 2048.0]);
        let rewards = trajectory.period_rewards();
        assert_approx(rewards[0], 48.0);
        assert_approx(rewards[1], 0.0);
        assert_approx(rewards[2], 0.0);
    }

    #[test]
    fn balance_above_cap_is_held_at_cap_for_every_period() {
        let trajectory = simulate_growth(3_000.0, 2.7885, 5, BALANCE_CAP);
        assert_eq!(trajectory.balances().len(), 6);
        for balance in trajectory.balances() {
            assert_eq!(*balance, BALANCE_CAP);
        }
        assert_approx(trajectory.total_reward(), 0.0);
    }

    #[test]
    fn simulate_to_target_does_not_clamp_overshoot() {
        let projected = simulate_to_target(2000.0, 10.0, 3, BALANCE_CAP);
        assert_approx(projected, 2200.0);

        let below = simulate_to_target(100.0, 10.0, 1, BALANCE_CAP);
        assert_approx(below, 110.0);
    }

    #[test]
    fn oracle_standard_strategy_mints_units_from_rewards() {
        // 100 units at 10% earn 3.2 each.
        // period 1: 320.0 -> floor(320 / 32.002) = 9 new units -> 109 active
        // period 2: 348.8 -> floor(348.8 / 32.002) = 10 new units
        let input = SimulationInput {
            total_capital: 3_200.0,
            annual_rate_percent: 10.0,
            periods: 2,
        };
        let config = EngineConfig {
            internal_weight: 1.0,
            ..EngineConfig::default()
        };
        let rates = split_rate(input.annual_rate_percent, config.internal_weight);
        let outcome = run_standard_strategy(&input, rates, 0.0, &config);

        assert_eq!(outcome.result.initial_units, 100);
        assert_eq!(outcome.result.units_created, 19);
        assert_approx(outcome.period_rewards[0], 320.0);
        assert_approx(outcome.period_rewards[1], 348.8);
        assert_approx(outcome.result.total_rewards, 668.8);
        assert_approx(outcome.result.total_costs, 119.0 * 0.002);
        assert_approx(outcome.result.deployed_capital, 3_200.0);
    }

    #[test]
    fn scenario_optimized_beats_standard_for_reference_inputs() {
        let result = compare_strategies(&sample_input(), &EngineConfig::default())
            .expect("valid comparison");

        assert_eq!(result.standard.initial_units, 312);
        assert_approx(result.standard.deployed_capital, 9_984.0);

        let dist = result.distribution;
        assert!(dist.unit_size > 32.0 && dist.unit_size < 2048.0);
        assert!(!dist.degenerate);
        assert_approx(
            dist.unit_count as f64 * dist.unit_size + dist.remainder,
            10_000.0,
        );
        assert!(result.optimized.net_total > result.standard.net_total);
        assert!(result.improvement.reward_delta > 0.0);
        assert_approx(
            result.improvement.rate_delta,
            result.optimized.annualized_rate - result.standard.annualized_rate,
        );
    }

    #[test]
    fn scenario_minimum_capital_single_period_is_degenerate() {
        let input = SimulationInput {
            total_capital: 32.0,
            annual_rate_percent: 3.38,
            periods: 1,
        };
        let result =
            compare_strategies(&input, &EngineConfig::default()).expect("valid comparison");

        let dist = result.distribution;
        assert!(dist.degenerate);
        assert_eq!(dist.unit_count, 1);
        assert_approx(dist.unit_size, 32.0);
        assert_approx(dist.remainder, 0.0);
        assert!(!dist.has_remainder);
        assert!(result.remainder_trajectory.is_none());
    }

    #[test]
    fn scenario_zero_rate_yields_only_setup_costs() {
        let input = SimulationInput {
            total_capital: 10_000.0,
            annual_rate_percent: 0.0,
            periods: 3,
        };
        let result =
            compare_strategies(&input, &EngineConfig::default()).expect("valid comparison");

        for strategy in [&result.standard, &result.optimized] {
            assert_approx(strategy.total_rewards, 0.0);
            assert_approx(strategy.external_rewards, 0.0);
            assert_approx(strategy.net_total, -strategy.total_costs);
            assert!(strategy.annualized_rate < 0.0);
        }
        assert_eq!(result.standard.units_created, 0);
        assert_approx_tol(
            result.standard.annualized_rate,
            result.optimized.annualized_rate,
            0.01,
        );
        for value in result.standard_period_rewards {
            assert_approx(value, 0.0);
        }
    }

    #[test]
    fn external_rewards_are_identical_for_both_strategies() {
        let result = compare_strategies(&sample_input(), &EngineConfig::default())
            .expect("valid comparison");
        let expected = 10_000.0 * (3.38 * (1.0 - 0.825) / 100.0) * 3.0;
        assert_approx(result.standard.external_rewards, expected);
        assert_approx(result.optimized.external_rewards, expected);
    }

    #[test]
    fn optimized_costs_count_remainder_unit() {
        let result = compare_strategies(&sample_input(), &EngineConfig::default())
            .expect("valid comparison");
        let dist = result.distribution;
        assert!(dist.has_remainder);
        assert_eq!(dist.simulated_units(), dist.unit_count + 1);
        assert_approx(
            result.optimized.total_costs,
            (dist.unit_count + 1) as f64 * 0.002,
        );
        assert_approx(
            result.optimized.deployed_capital,
            dist.unit_count as f64 * dist.unit_size + dist.remainder,
        );
        assert!(result.remainder_trajectory.is_some());
    }

    #[test]
    fn simulate_dust_policy_deploys_small_remainder() {
        // Five full units of ~1885.85 leave ~10.76 of dust.
        let input = SimulationInput {
            total_capital: 9_440.0,
            annual_rate_percent: 3.38,
            periods: 3,
        };
        let dropped = compare_strategies(&input, &EngineConfig::default())
            .expect("valid comparison");
        assert_eq!(dropped.distribution.unit_count, 5);
        assert!(!dropped.distribution.has_remainder);
        assert_approx_tol(dropped.distribution.remainder, 10.756, 0.01);
        assert!(dropped.remainder_trajectory.is_none());
        assert_approx_tol(
            dropped.optimized.deployed_capital,
            9_440.0 - dropped.distribution.remainder,
            1e-6,
        );

        let config = EngineConfig {
            remainder_policy: RemainderPolicy::SimulateDust,
            ..EngineConfig::default()
        };
        let simulated = compare_strategies(&input, &config).expect("valid comparison");
        assert!(simulated.distribution.has_remainder);
        assert!(simulated.remainder_trajectory.is_some());
        assert_approx_tol(simulated.optimized.deployed_capital, 9_440.0, 1e-6);
        assert_approx(
            simulated.optimized.total_costs - dropped.optimized.total_costs,
            0.002,
        );
    }

    #[test]
    fn chart_series_spans_horizon_and_tracks_strategies() {
        let result = compare_strategies(&sample_input(), &EngineConfig::default())
            .expect("valid comparison");
        assert_eq!(result.series.len(), 4);

        let first = result.series[0];
        assert_eq!(first.period, 0);
        assert_approx(first.standard_balance, result.standard.deployed_capital);
        assert_approx_tol(
            first.optimized_balance,
            result.optimized.deployed_capital,
            1e-6,
        );
        let last = result.series[3];
        assert_approx_tol(
            last.standard_balance,
            result.standard.deployed_capital + result.standard.total_rewards,
            1e-6,
        );
        assert_approx_tol(
            last.optimized_balance,
            result.optimized.deployed_capital + result.optimized.total_rewards,
            1e-6,
        );
        for point in &result.series {
            assert_approx(
                point.cap_line,
                2048.0 * result.distribution.unit_count as f64,
            );
        }
    }

    #[test]
    fn capital_below_minimum_unit_deploys_nothing_in_standard_strategy() {
        let input = SimulationInput {
            total_capital: 20.0,
            annual_rate_percent: 3.38,
            periods: 2,
        };
        let result =
            compare_strategies(&input, &EngineConfig::default()).expect("valid comparison");
        assert_eq!(result.standard.initial_units, 0);
        assert_approx(result.standard.annualized_rate, 0.0);
        assert!(result.distribution.degenerate);
        assert_approx(result.distribution.unit_size, 20.0);
    }

    #[test]
    fn compare_rejects_invalid_input() {
        let config = EngineConfig::default();
        for input in [
            SimulationInput {
                total_capital: 0.0,
                ..sample_input()
            },
            SimulationInput {
                total_capital: f64::NAN,
                ..sample_input()
            },
            SimulationInput {
                annual_rate_percent: -1.0,
                ..sample_input()
            },
            SimulationInput {
                annual_rate_percent: f64::INFINITY,
                ..sample_input()
            },
            SimulationInput {
                periods: 0,
                ..sample_input()
            },
        ] {
            let err = compare_strategies(&input, &config).expect_err("must reject");
            assert!(matches!(err, EngineError::InvalidInput { .. }), "{err}");
        }
    }

    #[test]
    fn compare_rejects_horizon_beyond_max_periods() {
        let config = EngineConfig::default();
        let input = SimulationInput {
            annual_rate_percent: 0.0,
            periods: 20_000_000,
            ..sample_input()
        };
        let err = compare_strategies(&input, &config).expect_err("must reject");
        assert!(matches!(
            err,
            EngineError::InvalidInput {
                field: "periods",
                ..
            }
        ));

        let longest = SimulationInput {
            periods: MAX_PERIODS,
            ..sample_input()
        };
        let result = compare_strategies(&longest, &config).expect("valid comparison");
        assert_eq!(result.series.len(), MAX_PERIODS as usize + 1);
    }

    #[test]
    fn compare_rejects_capital_beyond_max_total() {
        let config = EngineConfig::default();
        let input = SimulationInput {
            total_capital: 1e23,
            ..sample_input()
        };
        let err = compare_strategies(&input, &config).expect_err("must reject");
        assert!(matches!(
            err,
            EngineError::InvalidInput {
                field: "total_capital",
                ..
            }
        ));

        let largest = SimulationInput {
            total_capital: MAX_TOTAL_CAPITAL,
            ..sample_input()
        };
        let result = compare_strategies(&largest, &config).expect("valid comparison");
        assert_approx_tol(
            result.series[0].optimized_balance,
            result.optimized.deployed_capital,
            1.0,
        );
        assert!(result.distribution.remainder >= 0.0);
        assert!(result.distribution.remainder <= result.distribution.unit_size + 1.0);
    }

    #[test]
    fn compare_rejects_invalid_config() {
        let config = EngineConfig {
            balance_cap: 16.0,
            ..EngineConfig::default()
        };
        let err = compare_strategies(&sample_input(), &config).expect_err("must reject");
        assert!(matches!(
            err,
            EngineError::InvalidConfig {
                field: "balance_cap",
                ..
            }
        ));
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_trajectory_is_monotone_and_capped(
            initial_centi in 100u32..400_000,
            rate_bp in 0u32..10_001,
            periods in 1u32..80
        ) {
            let initial = initial_centi as f64 / 100.0;
            let rate = rate_bp as f64 / 100.0;
            let trajectory = simulate_growth(initial, rate, periods, BALANCE_CAP);
            assert_trajectory_invariants(&trajectory, periods, BALANCE_CAP);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_larger_start_never_projects_lower(
            low_centi in 3_200u32..204_800,
            delta_centi in 0u32..50_000,
            rate_bp in 0u32..10_001,
            periods in 1u32..60
        ) {
            let low = low_centi as f64 / 100.0;
            let high = low + delta_centi as f64 / 100.0;
            let rate = rate_bp as f64 / 100.0;
            let low_projected = simulate_to_target(low, rate, periods, BALANCE_CAP);
            let high_projected = simulate_to_target(high, rate, periods, BALANCE_CAP);

            if low_projected >= BALANCE_CAP {
                prop_assert!(high_projected >= BALANCE_CAP);
            }
            if high_projected < BALANCE_CAP {
                prop_assert!(high_projected >= low_projected);
            }
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_comparison_is_deterministic(
            capital in 32u32..200_000,
            rate_bp in 0u32..2_001,
            periods in 1u32..40
        ) {
            let input = SimulationInput {
                total_capital: capital as f64,
                annual_rate_percent: rate_bp as f64 / 100.0,
                periods,
            };
            let config = EngineConfig::default();
            let first = compare_strategies(&input, &config).expect("valid comparison");
            let second = compare_strategies(&input, &config).expect("valid comparison");
            prop_assert_eq!(first, second);
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(24))]

        #[test]
        fn prop_results_are_finite_and_consistent(
            capital in 32u32..500_000,
            rate_bp in 1u32..5_001,
            periods in 1u32..60
        ) {
            let input = SimulationInput {
                total_capital: capital as f64,
                annual_rate_percent: rate_bp as f64 / 100.0,
                periods,
            };
            let result = compare_strategies(&input, &EngineConfig::default())
                .expect("valid comparison");
            prop_assert!(result.standard.initial_units > 0);

            prop_assert_eq!(result.series.len(), periods as usize + 1);
            prop_assert_eq!(result.standard_period_rewards.len(), periods as usize);
            assert_trajectory_invariants(&result.unit_trajectory, periods, BALANCE_CAP);
            for strategy in [&result.standard, &result.optimized] {
                prop_assert!(strategy.total_rewards >= 0.0);
                prop_assert!(strategy.total_costs >= 0.0);
                prop_assert!(strategy.net_total.is_finite());
                prop_assert!(strategy.annualized_rate.is_finite());
            }
        }
    }
}
