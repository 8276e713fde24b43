//! Python bindings used by the HTTP service layer.

use chrono::NaiveDate;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use rust_decimal::Decimal;

use crate::config::{IncentivePolicy, OptimizerConfig};
use crate::models::{
    Activity, OptimizationMode, OptimizationRequest, OptimizationResult, PenaltyType, Precedence,
    ScenarioParams, ScheduleEntry,
};
use crate::optimizer::optimize;

#[allow(clippy::too_many_arguments)]
fn scenario(
    indirect_cost: Decimal,
    penalty_type: &str,
    penalty_amount: Option<Decimal>,
    penalty_rate: Option<Decimal>,
    contract_amount: Decimal,
    contract_duration: Option<u32>,
    target_duration: Option<u32>,
    project_start: Option<NaiveDate>,
) -> PyResult<ScenarioParams> {
    let penalty_type: PenaltyType = penalty_type.parse().map_err(PyValueError::new_err)?;
    Ok(ScenarioParams {
        indirect_cost,
        penalty_type,
        penalty_amount,
        penalty_rate,
        contract_amount,
        contract_duration,
        target_duration,
        project_start,
    })
}

fn request(
    mode: OptimizationMode,
    activities: Vec<Activity>,
    precedences: Vec<(String, String)>,
    budget_constraint: Option<Decimal>,
    duration_constraint: Option<u32>,
    scenario: ScenarioParams,
) -> OptimizationRequest {
    OptimizationRequest {
        mode,
        budget_constraint,
        duration_constraint,
        scenario,
        activities,
        precedences: precedences.into_iter().map(Precedence::from).collect(),
    }
}

/// Validate and solve with the GIL released; request errors become ValueError.
fn run_request(
    py: Python<'_>,
    request: OptimizationRequest,
    config: Option<OptimizerConfig>,
) -> PyResult<OptimizationResult> {
    let config = config.unwrap_or_default();
    // The solve holds no Python objects, so other threads may run meanwhile
    match py.allow_threads(|| optimize(&request, &config)) {
        Ok(result) => Ok(result),
        Err(e) => Err(PyValueError::new_err(e.to_string())),
    }
}

/// Minimize project duration under a budget ceiling.
///
/// # Arguments
/// * `activities` - Activities of one project
/// * `precedences` - (successor_id, predecessor_id) pairs; unknown IDs are ignored
/// * `budget` - Ceiling on direct plus indirect cost
///
/// # Raises
/// * ValueError if `penalty_type` is not "fixed" or "rate"
/// * ValueError if the project is empty or an activity has invalid durations
#[pyfunction]
#[pyo3(name = "solve_budget_to_duration")]
#[pyo3(signature = (
    activities,
    precedences,
    budget,
    indirect_cost=Decimal::ZERO,
    penalty_type="rate",
    penalty_amount=None,
    penalty_rate=None,
    contract_amount=Decimal::ZERO,
    contract_duration=None,
    target_duration=None,
    project_start=None,
    config=None
))]
#[allow(clippy::too_many_arguments)]
fn py_solve_budget_to_duration(
    py: Python<'_>,
    activities: Vec<Activity>,
    precedences: Vec<(String, String)>,
    budget: Decimal,
    indirect_cost: Decimal,
    penalty_type: &str,
    penalty_amount: Option<Decimal>,
    penalty_rate: Option<Decimal>,
    contract_amount: Decimal,
    contract_duration: Option<u32>,
    target_duration: Option<u32>,
    project_start: Option<NaiveDate>,
    config: Option<OptimizerConfig>,
) -> PyResult<OptimizationResult> {
    let params = scenario(
        indirect_cost,
        penalty_type,
        penalty_amount,
        penalty_rate,
        contract_amount,
        contract_duration,
        target_duration,
        project_start,
    )?;
    let request = request(
        OptimizationMode::BudgetToDuration,
        activities,
        precedences,
        Some(budget),
        None,
        params,
    );
    run_request(py, request, config)
}

/// Minimize total cost for a fixed project duration.
///
/// # Raises
/// * ValueError if `penalty_type` is not "fixed" or "rate"
/// * ValueError if the project is empty or an activity has invalid durations
#[pyfunction]
#[pyo3(name = "solve_duration_to_cost")]
#[pyo3(signature = (
    activities,
    precedences,
    duration,
    indirect_cost=Decimal::ZERO,
    penalty_type="rate",
    penalty_amount=None,
    penalty_rate=None,
    contract_amount=Decimal::ZERO,
    contract_duration=None,
    target_duration=None,
    project_start=None,
    config=None
))]
#[allow(clippy::too_many_arguments)]
fn py_solve_duration_to_cost(
    py: Python<'_>,
    activities: Vec<Activity>,
    precedences: Vec<(String, String)>,
    duration: u32,
    indirect_cost: Decimal,
    penalty_type: &str,
    penalty_amount: Option<Decimal>,
    penalty_rate: Option<Decimal>,
    contract_amount: Decimal,
    contract_duration: Option<u32>,
    target_duration: Option<u32>,
    project_start: Option<NaiveDate>,
    config: Option<OptimizerConfig>,
) -> PyResult<OptimizationResult> {
    let params = scenario(
        indirect_cost,
        penalty_type,
        penalty_amount,
        penalty_rate,
        contract_amount,
        contract_duration,
        target_duration,
        project_start,
    )?;
    let request = request(
        OptimizationMode::DurationToCost,
        activities,
        precedences,
        None,
        Some(duration),
        params,
    );
    run_request(py, request, config)
}

/// The bidopt.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Data types
    m.add_class::<Activity>()?;
    m.add_class::<ScheduleEntry>()?;
    m.add_class::<OptimizationResult>()?;

    // Config types
    m.add_class::<OptimizerConfig>()?;
    m.add_class::<IncentivePolicy>()?;

    // Optimizer entry points
    m.add_function(wrap_pyfunction!(py_solve_budget_to_duration, m)?)?;
    m.add_function(wrap_pyfunction!(py_solve_duration_to_cost, m)?)?;

    Ok(())
}
