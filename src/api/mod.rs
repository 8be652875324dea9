use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    BALANCE_CAP, ComparisonResult, EngineConfig, EngineError, MAX_PERIODS, MAX_SEARCH_ITERATIONS,
    MAX_TOTAL_CAPITAL, MIN_UNIT,
    RemainderPolicy, SEARCH_TOLERANCE, SETUP_COST, SimulationInput, compare_strategies,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliRemainderPolicy {
    DropDust,
    SimulateDust,
}

impl From<CliRemainderPolicy> for RemainderPolicy {
    fn from(value: CliRemainderPolicy) -> Self {
        match value {
            CliRemainderPolicy::DropDust => RemainderPolicy::DropDust,
            CliRemainderPolicy::SimulateDust => RemainderPolicy::SimulateDust,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiRemainderPolicy {
    #[serde(alias = "dropDust", alias = "drop_dust", alias = "drop")]
    DropDust,
    #[serde(alias = "simulateDust", alias = "simulate_dust", alias = "simulate")]
    SimulateDust,
}

impl From<ApiRemainderPolicy> for CliRemainderPolicy {
    fn from(value: ApiRemainderPolicy) -> Self {
        match value {
            ApiRemainderPolicy::DropDust => CliRemainderPolicy::DropDust,
            ApiRemainderPolicy::SimulateDust => CliRemainderPolicy::SimulateDust,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    #[serde(alias = "totalEth")]
    total_capital: Option<f64>,
    #[serde(alias = "networkApr")]
    annual_rate: Option<f64>,
    #[serde(alias = "years")]
    periods: Option<i64>,

    balance_cap: Option<f64>,
    min_unit: Option<f64>,
    setup_cost: Option<f64>,
    internal_share: Option<f64>,
    search_tolerance: Option<f64>,
    max_search_iterations: Option<u32>,
    remainder_policy: Option<ApiRemainderPolicy>,
}

#[derive(Parser, Debug)]
#[command(
    name = "stake-optimizer",
    about = "Compare fixed-size validators against cap-optimized validator sizing"
)]
struct Cli {
    #[arg(long, help = "Total capital to stake")]
    total_capital: f64,
    #[arg(long, help = "Blended annual network rate in percent, e.g. 3.38")]
    annual_rate: f64,
    #[arg(long, help = "Number of compounding periods (years)")]
    periods: u32,
    #[arg(long, default_value_t = BALANCE_CAP, help = "Maximum balance of a single validator")]
    balance_cap: f64,
    #[arg(
        long,
        default_value_t = MIN_UNIT,
        help = "Minimum validator size; also the fixed size of standard validators"
    )]
    min_unit: f64,
    #[arg(long, default_value_t = SETUP_COST, help = "Setup cost paid per validator")]
    setup_cost: f64,
    #[arg(
        long,
        default_value_t = 82.5,
        help = "Share of the blended rate that compounds inside the validator, in percent"
    )]
    internal_share: f64,
    #[arg(
        long,
        default_value_t = SEARCH_TOLERANCE,
        help = "Interval width at which the stake search stops"
    )]
    search_tolerance: f64,
    #[arg(long, default_value_t = MAX_SEARCH_ITERATIONS)]
    max_search_iterations: u32,
    #[arg(
        long,
        value_enum,
        default_value_t = CliRemainderPolicy::DropDust,
        help = "Whether leftover capital below the minimum validator size is simulated"
    )]
    remainder_policy: CliRemainderPolicy,
    #[arg(long, help = "Pretty-print the JSON output")]
    pretty: bool,
}

#[derive(Debug)]
struct ApiRequest {
    input: SimulationInput,
    config: EngineConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    total_capital: f64,
    annual_rate: f64,
    periods: u32,
    remainder_policy: RemainderPolicy,
    #[serde(flatten)]
    result: ComparisonResult,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_request(cli: Cli) -> Result<ApiRequest, String> {
    if !cli.total_capital.is_finite() || cli.total_capital <= 0.0 {
        return Err("--total-capital must be > 0".to_string());
    }

    if cli.total_capital > MAX_TOTAL_CAPITAL {
        return Err(format!("--total-capital must be <= {MAX_TOTAL_CAPITAL:e}"));
    }

    if !cli.annual_rate.is_finite() {
        return Err("--annual-rate must be finite".to_string());
    }

    if cli.annual_rate < 0.0 {
        return Err("--annual-rate must be >= 0".to_string());
    }

    if cli.periods == 0 {
        return Err("--periods must be >= 1".to_string());
    }

    if cli.periods > MAX_PERIODS {
        return Err(format!("--periods must be <= {MAX_PERIODS}"));
    }

    if !cli.min_unit.is_finite() || cli.min_unit <= 0.0 {
        return Err("--min-unit must be > 0".to_string());
    }

    if !cli.balance_cap.is_finite() || cli.balance_cap <= cli.min_unit {
        return Err("--balance-cap must be > --min-unit".to_string());
    }

    if !cli.setup_cost.is_finite() || cli.setup_cost < 0.0 {
        return Err("--setup-cost must be >= 0".to_string());
    }

    if !(0.0..=100.0).contains(&cli.internal_share) {
        return Err("--internal-share must be between 0 and 100".to_string());
    }

    if !cli.search_tolerance.is_finite() || cli.search_tolerance <= 0.0 {
        return Err("--search-tolerance must be > 0".to_string());
    }

    if cli.max_search_iterations == 0 {
        return Err("--max-search-iterations must be > 0".to_string());
    }

    Ok(ApiRequest {
        input: SimulationInput {
            total_capital: cli.total_capital,
            annual_rate_percent: cli.annual_rate,
            periods: cli.periods,
        },
        config: EngineConfig {
            balance_cap: cli.balance_cap,
            min_unit: cli.min_unit,
            setup_cost: cli.setup_cost,
            internal_weight: cli.internal_share / 100.0,
            search_tolerance: cli.search_tolerance,
            max_search_iterations: cli.max_search_iterations,
            remainder_policy: cli.remainder_policy.into(),
        },
    })
}

fn run_request(request: &ApiRequest) -> Result<CompareResponse, EngineError> {
    let result = compare_strategies(&request.input, &request.config)?;
    Ok(CompareResponse {
        total_capital: request.input.total_capital,
        annual_rate: request.input.annual_rate_percent,
        periods: request.input.periods,
        remainder_policy: request.config.remainder_policy,
        result,
    })
}

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let cli = Cli::parse_from(args);
    let pretty = cli.pretty;
    let request = build_request(cli)?;
    let response = run_request(&request).map_err(|e| e.to_string())?;

    let json = if pretty {
        serde_json::to_string_pretty(&response)
    } else {
        serde_json::to_string(&response)
    };
    json.map_err(|e| format!("failed to serialize comparison: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/compare",
            get(compare_get_handler).post(compare_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("stake optimizer API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/compare");

    axum::serve(listener, app).await
}

async fn health_handler() -> impl IntoResponse {
    with_cache_control("ok")
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn compare_get_handler(Query(payload): Query<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_post_handler(Json(payload): Json<ComparePayload>) -> Response {
    compare_handler_impl(payload).await
}

async fn compare_handler_impl(payload: ComparePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => {
            warn!("rejected compare request: {msg}");
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
    };

    info!(
        "comparing {} capital at {}% over {} periods",
        request.input.total_capital, request.input.annual_rate_percent, request.input.periods
    );
    match run_request(&request) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            warn!("comparison failed: {err}");
            error_response(engine_error_status(&err), &err.to_string())
        }
    }
}

fn engine_error_status(err: &EngineError) -> StatusCode {
    match err {
        EngineError::InvalidInput { .. } | EngineError::InvalidConfig { .. } => {
            StatusCode::BAD_REQUEST
        }
        EngineError::NonFinite { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ComparePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ComparePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.total_capital {
        cli.total_capital = v;
    }
    if let Some(v) = payload.annual_rate {
        cli.annual_rate = v;
    }
    if let Some(v) = payload.periods {
        if v < 1 {
            return Err("--periods must be >= 1".to_string());
        }
        cli.periods = u32::try_from(v)
            .map_err(|_| format!("--periods must be <= {MAX_PERIODS}"))?;
    }

    if let Some(v) = payload.balance_cap {
        cli.balance_cap = v;
    }
    if let Some(v) = payload.min_unit {
        cli.min_unit = v;
    }
    if let Some(v) = payload.setup_cost {
        cli.setup_cost = v;
    }
    if let Some(v) = payload.internal_share {
        cli.internal_share = v;
    }
    if let Some(v) = payload.search_tolerance {
        cli.search_tolerance = v;
    }
    if let Some(v) = payload.max_search_iterations {
        cli.max_search_iterations = v;
    }
    if let Some(v) = payload.remainder_policy {
        cli.remainder_policy = v.into();
    }

    build_request(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        total_capital: 10_000.0,
        annual_rate: 3.38,
        periods: 3,
        balance_cap: BALANCE_CAP,
        min_unit: MIN_UNIT,
        setup_cost: SETUP_COST,
        internal_share: 82.5,
        search_tolerance: SEARCH_TOLERANCE,
        max_search_iterations: MAX_SEARCH_ITERATIONS,
        remainder_policy: CliRemainderPolicy::DropDust,
        pretty: false,
    }
}
