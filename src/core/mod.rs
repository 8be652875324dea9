mod engine;
mod error;
mod solver;
mod types;

pub use engine::{
    compare_strategies, compounding_reward, external_rewards, simulate_growth,
    simulate_to_target, split_rate,
};
pub use error::EngineError;
pub use solver::{distribute_capital, find_optimal_stake};
pub use types::{
    BALANCE_CAP, BalanceTrajectory, ChartPoint, ComparisonResult, EngineConfig, Improvement,
    INTERNAL_WEIGHT, MAX_PERIODS, MAX_SEARCH_ITERATIONS, MAX_TOTAL_CAPITAL, MIN_UNIT, OptimalDistribution, RateSplit,
    RemainderPolicy, SEARCH_TOLERANCE, SETUP_COST, SimulationInput, StakeSearchIteration,
    StakeSearchResult, StrategyResult,
};
