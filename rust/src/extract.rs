//! Turn a solver outcome into a schedule with a cost breakdown, or into a
//! failure descriptor with a diagnosis.

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;

use crate::bounds::{diagnose_budget, diagnose_duration};
use crate::config::IncentivePolicy;
use crate::incentives::assess;
use crate::milp::{Assignment, SolveOutcome};
use crate::models::{OptimizationResult, OptimizationStatus, ScenarioParams, ScheduleEntry};
use crate::network::ActivityNetwork;
use crate::{log_changes, log_debug};

/// The binding limit of the solved model, used to phrase infeasibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedLimit {
    Budget(Decimal),
    Duration(u32),
}

/// Build the final result for one solve.
pub fn extract(
    network: &ActivityNetwork,
    outcome: SolveOutcome,
    limit: RequestedLimit,
    params: &ScenarioParams,
    policy: &IncentivePolicy,
    calculation_time: f64,
    verbosity: u8,
) -> OptimizationResult {
    match outcome {
        SolveOutcome::Optimal(assignment) => extract_schedule(
            network,
            &assignment,
            params,
            policy,
            calculation_time,
            verbosity,
        ),
        SolveOutcome::Infeasible => {
            let message = match limit {
                RequestedLimit::Budget(budget) => {
                    diagnose_budget(network, budget, params.indirect_cost, verbosity)
                }
                RequestedLimit::Duration(duration) => {
                    diagnose_duration(network, duration, verbosity)
                }
            };
            log_changes!(verbosity, "{}", message);
            OptimizationResult::failure(OptimizationStatus::Infeasible, message, calculation_time)
        }
        SolveOutcome::Failed(status) => {
            log::warn!("MILP solve ended with status {}", status);
            OptimizationResult::failure(
                OptimizationStatus::Error,
                format!("Solver failed: {}", status),
                calculation_time,
            )
        }
    }
}

/// Offset `base` by a non-negative number of days.
fn calendar_day(base: Option<NaiveDate>, offset: i64) -> Option<NaiveDate> {
    let days = u64::try_from(offset).ok()?;
    base?.checked_add_days(Days::new(days))
}

fn extract_schedule(
    network: &ActivityNetwork,
    assignment: &Assignment,
    params: &ScenarioParams,
    policy: &IncentivePolicy,
    calculation_time: f64,
    verbosity: u8,
) -> OptimizationResult {
    let optimal_duration = assignment.duration.round() as i64;

    let schedules: Vec<ScheduleEntry> = network
        .activities()
        .iter()
        .enumerate()
        .map(|(idx, activity)| {
            // Integer variables come back as floats; round off solver noise
            let start_time = (assignment.starts[idx].round() as i64).max(0);
            let is_crashed = assignment.crashed[idx] > 0.5;
            let duration = activity.duration(is_crashed);
            let end_time = start_time + i64::from(duration);
            log_debug!(
                verbosity,
                "{}: start {} end {} crashed {}",
                activity.id,
                start_time,
                end_time,
                is_crashed
            );
            ScheduleEntry {
                activity_id: activity.id.clone(),
                activity_name: activity.name.clone(),
                start_time,
                end_time,
                duration,
                is_crashed,
                cost: activity.cost(is_crashed),
                start_date: calendar_day(params.project_start, start_time),
                end_date: calendar_day(params.project_start, end_time),
            }
        })
        .collect();

    let optimal_cost: Decimal = schedules.iter().map(|s| s.cost).sum();
    let indirect_cost = params.indirect_cost * Decimal::from(optimal_duration);
    let incentives = assess(optimal_duration, params, policy);
    let total_cost = optimal_cost + indirect_cost + incentives.net();

    log_changes!(
        verbosity,
        "Optimal duration {} days, direct cost {}, total cost {}",
        optimal_duration,
        optimal_cost,
        total_cost
    );

    OptimizationResult {
        status: OptimizationStatus::Success,
        optimal_duration: Some(optimal_duration),
        optimal_cost: Some(optimal_cost),
        indirect_cost: Some(indirect_cost),
        penalty_amount: Some(incentives.penalty_amount),
        bonus_amount: Some(incentives.bonus_amount),
        total_cost: Some(total_cost),
        calculation_time,
        schedules,
        error_message: None,
    }
}
