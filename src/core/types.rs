use serde::Serialize;

use super::error::EngineError;

pub const BALANCE_CAP: f64 = 2048.0;
pub const MIN_UNIT: f64 = 32.0;
pub const SETUP_COST: f64 = 0.002;
pub const INTERNAL_WEIGHT: f64 = 0.825;
pub const SEARCH_TOLERANCE: f64 = 1e-4;
pub const MAX_SEARCH_ITERATIONS: u32 = 64;
pub const MAX_PERIODS: u32 = 1_000;
pub const MAX_TOTAL_CAPITAL: f64 = 1e15;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemainderPolicy {
    DropDust,
    SimulateDust,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub balance_cap: f64,
    pub min_unit: f64,
    pub setup_cost: f64,
    pub internal_weight: f64,
    pub search_tolerance: f64,
    pub max_search_iterations: u32,
    pub remainder_policy: RemainderPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            balance_cap: BALANCE_CAP,
            min_unit: MIN_UNIT,
            setup_cost: SETUP_COST,
            internal_weight: INTERNAL_WEIGHT,
            search_tolerance: SEARCH_TOLERANCE,
            max_search_iterations: MAX_SEARCH_ITERATIONS,
            remainder_policy: RemainderPolicy::DropDust,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.min_unit.is_finite() || self.min_unit <= 0.0 {
            return Err(EngineError::invalid_config("min_unit", "must be > 0"));
        }
        if !self.balance_cap.is_finite() || self.balance_cap <= self.min_unit {
            return Err(EngineError::invalid_config(
                "balance_cap",
                "must be greater than min_unit",
            ));
        }
        if !self.setup_cost.is_finite() || self.setup_cost < 0.0 {
            return Err(EngineError::invalid_config("setup_cost", "must be >= 0"));
        }
        if !(0.0..=1.0).contains(&self.internal_weight) {
            return Err(EngineError::invalid_config(
                "internal_weight",
                "must be between 0 and 1",
            ));
        }
        if !self.search_tolerance.is_finite() || self.search_tolerance <= 0.0 {
            return Err(EngineError::invalid_config(
                "search_tolerance",
                "must be > 0",
            ));
        }
        if self.max_search_iterations == 0 {
            return Err(EngineError::invalid_config(
                "max_search_iterations",
                "must be > 0",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimulationInput {
    pub total_capital: f64,
    pub annual_rate_percent: f64,
    pub periods: u32,
}

impl SimulationInput {
    pub fn validate(&self) -> Result<(), EngineError> {
        if !self.total_capital.is_finite() || self.total_capital <= 0.0 {
            return Err(EngineError::invalid_input(
                "total_capital",
                "must be a finite value > 0",
            ));
        }
        if !self.annual_rate_percent.is_finite() {
            return Err(EngineError::invalid_input(
                "annual_rate_percent",
                "must be finite",
            ));
        }
        if self.annual_rate_percent < 0.0 {
            return Err(EngineError::invalid_input(
                "annual_rate_percent",
                "must be >= 0",
            ));
        }
        if self.total_capital > MAX_TOTAL_CAPITAL {
            return Err(EngineError::invalid_input(
                "total_capital",
                format!("must be <= {MAX_TOTAL_CAPITAL:e}"),
            ));
        }
        if self.periods == 0 {
            return Err(EngineError::invalid_input("periods", "must be >= 1"));
        }
        if self.periods > MAX_PERIODS {
            return Err(EngineError::invalid_input(
                "periods",
                format!("must be <= {MAX_PERIODS}"),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSplit {
    pub internal_rate: f64,
    pub external_rate: f64,
}

// Index 0 is the starting balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BalanceTrajectory {
    balances: Vec<f64>,
}

impl BalanceTrajectory {
    pub(crate) fn new(balances: Vec<f64>) -> Self {
        Self { balances }
    }

    pub fn balances(&self) -> &[f64] {
        &self.balances
    }

    pub fn initial(&self) -> f64 {
        self.balances.first().copied().unwrap_or(0.0)
    }

    pub fn terminal(&self) -> f64 {
        self.balances.last().copied().unwrap_or(0.0)
    }

    pub fn period_rewards(&self) -> Vec<f64> {
        self.balances.windows(2).map(|w| w[1] - w[0]).collect()
    }

    pub fn total_reward(&self) -> f64 {
        self.terminal() - self.initial()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalDistribution {
    pub unit_size: f64,
    pub unit_count: u64,
    // unit_count * unit_size + remainder == total_capital, dust included
    pub remainder: f64,
    pub has_remainder: bool,
    pub degenerate: bool,
}

impl OptimalDistribution {
    pub fn simulated_units(&self) -> u64 {
        self.unit_count + u64::from(self.has_remainder)
    }

    pub fn deployed_capital(&self) -> f64 {
        let extra = if self.has_remainder {
            self.remainder
        } else {
            0.0
        };
        self.unit_count as f64 * self.unit_size + extra
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResult {
    pub total_rewards: f64,
    pub external_rewards: f64,
    pub total_costs: f64,
    pub net_total: f64,
    pub deployed_capital: f64,
    pub initial_units: u64,
    pub units_created: u64,
    pub annualized_rate: f64,
    pub compounding_rate: f64,
    pub total_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Improvement {
    pub reward_delta: f64,
    pub reward_delta_percent: f64,
    pub rate_delta: f64,
    pub total_rate_delta: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub period: u32,
    pub standard_balance: f64,
    pub optimized_balance: f64,
    pub cap_line: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeSearchIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub projected_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeSearchResult {
    pub optimal_stake: f64,
    pub projected_balance: f64,
    pub iterations: Vec<StakeSearchIteration>,
    pub converged: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResult {
    pub rates: RateSplit,
    pub distribution: OptimalDistribution,
    pub standard: StrategyResult,
    pub optimized: StrategyResult,
    pub improvement: Improvement,
    pub standard_period_rewards: Vec<f64>,
    pub unit_trajectory: BalanceTrajectory,
    pub remainder_trajectory: Option<BalanceTrajectory>,
    pub series: Vec<ChartPoint>,
    pub search: StakeSearchResult,
}
