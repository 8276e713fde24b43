//! Entry points: build the model, solve it, and extract the result.

use rust_decimal::Decimal;
use std::time::Instant;
use thiserror::Error;

use crate::config::OptimizerConfig;
use crate::extract::{extract, RequestedLimit};
use crate::milp::{build_budget_model, build_duration_model, solve, CrashingModel};
use crate::models::{
    Activity, OptimizationMode, OptimizationRequest, OptimizationResult, Precedence,
    ScenarioParams,
};
use crate::network::ActivityNetwork;
use crate::{log_changes, log_checks};

/// Errors in a request, detected before any model is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Budget-to-duration mode requires a budget constraint")]
    MissingBudget,
    #[error("Duration-to-cost mode requires a duration constraint")]
    MissingDuration,
    #[error("Project has no activities")]
    EmptyProject,
    #[error("Invalid activity: {0}")]
    InvalidActivity(String),
}

/// Mode A: shortest duration whose direct plus indirect cost fits `budget`.
pub fn solve_budget_to_duration(
    activities: &[Activity],
    precedences: &[Precedence],
    budget: Decimal,
    params: &ScenarioParams,
    config: &OptimizerConfig,
) -> OptimizationResult {
    let started = Instant::now();
    let network = ActivityNetwork::new(activities, precedences);
    let model = build_budget_model(&network, budget, params, &config.incentives);
    run(
        &network,
        model,
        RequestedLimit::Budget(budget),
        params,
        config,
        started,
    )
}

/// Mode B: cheapest schedule finishing in exactly `duration` days.
pub fn solve_duration_to_cost(
    activities: &[Activity],
    precedences: &[Precedence],
    duration: u32,
    params: &ScenarioParams,
    config: &OptimizerConfig,
) -> OptimizationResult {
    let started = Instant::now();
    let network = ActivityNetwork::new(activities, precedences);
    let model = build_duration_model(&network, duration, params, &config.incentives);
    run(
        &network,
        model,
        RequestedLimit::Duration(duration),
        params,
        config,
        started,
    )
}

fn run(
    network: &ActivityNetwork,
    model: CrashingModel,
    limit: RequestedLimit,
    params: &ScenarioParams,
    config: &OptimizerConfig,
    started: Instant,
) -> OptimizationResult {
    let verbosity = config.verbosity;
    log_checks!(
        verbosity,
        "{:?} model: {} activities, {} variables, {} constraints",
        model.mode(),
        network.len(),
        model.variable_count(),
        model.constraint_count()
    );
    if model.has_penalty_days() || model.has_bonus_days() {
        log_checks!(
            verbosity,
            "Incentive terms: penalty days {}, bonus days {}",
            model.has_penalty_days(),
            model.has_bonus_days()
        );
    }

    let report = solve(model);
    log_changes!(
        verbosity,
        "Solve finished in {:.3}s",
        report.elapsed.as_secs_f64()
    );

    extract(
        network,
        report.outcome,
        limit,
        params,
        &config.incentives,
        started.elapsed().as_secs_f64(),
        verbosity,
    )
}

fn validate_activities(activities: &[Activity]) -> Result<(), RequestError> {
    if activities.is_empty() {
        return Err(RequestError::EmptyProject);
    }
    for a in activities {
        if a.normal_duration == 0 || a.crash_duration == 0 {
            return Err(RequestError::InvalidActivity(format!(
                "{}: durations must be positive",
                a.id
            )));
        }
        if a.crash_duration > a.normal_duration {
            return Err(RequestError::InvalidActivity(format!(
                "{}: crash duration {} exceeds normal duration {}",
                a.id, a.crash_duration, a.normal_duration
            )));
        }
    }
    Ok(())
}

/// Validate a service-layer request and dispatch it to the matching mode.
pub fn optimize(
    request: &OptimizationRequest,
    config: &OptimizerConfig,
) -> Result<OptimizationResult, RequestError> {
    validate_activities(&request.activities)?;

    let result = match request.mode {
        OptimizationMode::BudgetToDuration => {
            let budget = request.budget_constraint.ok_or(RequestError::MissingBudget)?;
            solve_budget_to_duration(
                &request.activities,
                &request.precedences,
                budget,
                &request.scenario,
                config,
            )
        }
        OptimizationMode::DurationToCost => {
            let duration = request
                .duration_constraint
                .ok_or(RequestError::MissingDuration)?;
            solve_duration_to_cost(
                &request.activities,
                &request.precedences,
                duration,
                &request.scenario,
                config,
            )
        }
    };
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{OptimizationStatus, PenaltyType, ScheduleEntry};
    use rust_decimal_macros::dec;

    fn chain_activities() -> Vec<Activity> {
        vec![
            Activity::new("a", "A", 5, dec!(100), 3, dec!(160)),
            Activity::new("b", "B", 4, dec!(80), 2, dec!(140)),
        ]
    }

    fn chain_precedences() -> Vec<Precedence> {
        vec![Precedence::new("b", "a")]
    }

    fn entry<'a>(result: &'a OptimizationResult, id: &str) -> &'a ScheduleEntry {
        result
            .schedules
            .iter()
            .find(|s| s.activity_id == id)
            .unwrap()
    }

    /// Checks that hold for every successful result.
    fn assert_consistent(result: &OptimizationResult, precedences: &[Precedence]) {
        assert!(result.is_success(), "{:?}", result.error_message);
        for s in &result.schedules {
            assert_eq!(s.end_time - s.start_time, i64::from(s.duration));
        }
        for p in precedences {
            assert!(entry(result, &p.successor).start_time >= entry(result, &p.predecessor).end_time);
        }
        let penalty = result.penalty_amount.unwrap();
        let bonus = result.bonus_amount.unwrap();
        assert!(penalty.is_zero() || bonus.is_zero());
        assert_eq!(
            result.total_cost.unwrap(),
            result.optimal_cost.unwrap() + result.indirect_cost.unwrap() + penalty - bonus
        );
    }

    #[test]
    fn test_budget_allows_crashing_everything() {
        let result = solve_budget_to_duration(
            &chain_activities(),
            &chain_precedences(),
            dec!(300),
            &ScenarioParams::default(),
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_duration, Some(5));
        assert_eq!(result.optimal_cost, Some(dec!(300)));
        assert!(result.schedules.iter().all(|s| s.is_crashed));
        assert_eq!((entry(&result, "a").start_time, entry(&result, "a").end_time), (0, 3));
        assert_eq!((entry(&result, "b").start_time, entry(&result, "b").end_time), (3, 5));
        let max_end = result.schedules.iter().map(|s| s.end_time).max();
        assert_eq!(max_end, result.optimal_duration);
    }

    #[test]
    fn test_budget_allows_one_crash() {
        let result = solve_budget_to_duration(
            &chain_activities(),
            &chain_precedences(),
            dec!(250),
            &ScenarioParams::default(),
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_duration, Some(7));
        assert_eq!(result.optimal_cost, Some(dec!(240)));
        assert_eq!(result.schedules.iter().filter(|s| s.is_crashed).count(), 1);
    }

    #[test]
    fn test_budget_below_min_cost_is_infeasible() {
        let result = solve_budget_to_duration(
            &chain_activities(),
            &chain_precedences(),
            dec!(100),
            &ScenarioParams::default(),
            &OptimizerConfig::default(),
        );

        assert_eq!(result.status, OptimizationStatus::Infeasible);
        assert!(result.schedules.is_empty());
        let message = result.error_message.unwrap();
        assert!(message.contains("180.00"), "{}", message);
        assert!(message.contains("100.00"), "{}", message);
        assert!(message.contains("80.00"), "{}", message);
    }

    #[test]
    fn test_indirect_cost_counts_against_budget() {
        let params = ScenarioParams {
            indirect_cost: dec!(50),
            ..Default::default()
        };
        // Normal: 180 + 9 * 50 = 630; both crashed: 300 + 5 * 50 = 550
        let result = solve_budget_to_duration(
            &chain_activities(),
            &chain_precedences(),
            dec!(600),
            &params,
            &OptimizerConfig::default(),
        );
        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_duration, Some(5));
        assert_eq!(result.indirect_cost, Some(dec!(250)));
        assert_eq!(result.total_cost, Some(dec!(550)));

        let too_small = solve_budget_to_duration(
            &chain_activities(),
            &chain_precedences(),
            dec!(500),
            &params,
            &OptimizerConfig::default(),
        );
        assert_eq!(too_small.status, OptimizationStatus::Infeasible);
        let message = too_small.error_message.unwrap();
        assert!(message.contains("630.00") && message.contains("130.00"), "{}", message);
    }

    #[test]
    fn test_fixed_duration_minimizes_cost() {
        let result = solve_duration_to_cost(
            &chain_activities(),
            &chain_precedences(),
            7,
            &ScenarioParams::default(),
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_duration, Some(7));
        assert_eq!(result.optimal_cost, Some(dec!(240)));
        assert_eq!(result.total_cost, Some(dec!(240)));
    }

    #[test]
    fn test_fixed_duration_is_exact_even_with_slack() {
        let result = solve_duration_to_cost(
            &chain_activities(),
            &chain_precedences(),
            12,
            &ScenarioParams::default(),
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_duration, Some(12));
        assert_eq!(result.optimal_cost, Some(dec!(180)));
        assert!(result.schedules.iter().all(|s| s.end_time <= 12));
    }

    #[test]
    fn test_duration_below_crash_bound_is_infeasible() {
        let result = solve_duration_to_cost(
            &chain_activities(),
            &chain_precedences(),
            4,
            &ScenarioParams::default(),
            &OptimizerConfig::default(),
        );

        assert_eq!(result.status, OptimizationStatus::Infeasible);
        let message = result.error_message.unwrap();
        assert!(message.contains("5 days"), "{}", message);
        assert!(message.contains("only 4 days"), "{}", message);
    }

    #[test]
    fn test_bonus_cap_conflict_gives_generic_diagnosis() {
        // Daily bonus 1000 / 100 * 5% = 0.5, capped at 10, so at most 20 bonus
        // days fit while finishing at day 5 against a target of 30 needs 25
        let params = ScenarioParams {
            contract_amount: dec!(1000),
            contract_duration: Some(100),
            target_duration: Some(30),
            ..Default::default()
        };
        let result = solve_duration_to_cost(
            &chain_activities(),
            &chain_precedences(),
            5,
            &params,
            &OptimizerConfig::default(),
        );

        assert_eq!(result.status, OptimizationStatus::Infeasible);
        let message = result.error_message.unwrap();
        assert!(message.contains("conflicts with other constraints"), "{}", message);
    }

    #[test]
    fn test_late_penalty_reported() {
        let params = ScenarioParams {
            penalty_type: PenaltyType::Fixed,
            penalty_amount: Some(dec!(10)),
            target_duration: Some(7),
            ..Default::default()
        };
        let result = solve_duration_to_cost(
            &chain_activities(),
            &chain_precedences(),
            9,
            &params,
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_cost, Some(dec!(180)));
        assert_eq!(result.penalty_amount, Some(dec!(20)));
        assert_eq!(result.bonus_amount, Some(Decimal::ZERO));
        assert_eq!(result.total_cost, Some(dec!(200)));
    }

    #[test]
    fn test_penalty_report_capped() {
        let params = ScenarioParams {
            penalty_type: PenaltyType::Rate,
            penalty_rate: Some(dec!(0.5)),
            contract_amount: dec!(100),
            target_duration: Some(7),
            ..Default::default()
        };
        let result = solve_duration_to_cost(
            &chain_activities(),
            &chain_precedences(),
            9,
            &params,
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.penalty_amount, Some(dec!(20)));
    }

    #[test]
    fn test_early_bonus_reported() {
        let params = ScenarioParams {
            contract_amount: dec!(10000),
            contract_duration: Some(20),
            target_duration: Some(7),
            ..Default::default()
        };
        let result = solve_duration_to_cost(
            &chain_activities(),
            &chain_precedences(),
            5,
            &params,
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_cost, Some(dec!(300)));
        assert_eq!(result.bonus_amount, Some(dec!(50)));
        assert_eq!(result.penalty_amount, Some(Decimal::ZERO));
        assert_eq!(result.total_cost, Some(dec!(250)));
    }

    #[test]
    fn test_budget_mode_late_penalty() {
        // Budget 250 allows one crash: T = 7 against a target of 5
        let params = ScenarioParams {
            penalty_type: PenaltyType::Fixed,
            penalty_amount: Some(dec!(10)),
            target_duration: Some(5),
            ..Default::default()
        };
        let result = solve_budget_to_duration(
            &chain_activities(),
            &chain_precedences(),
            dec!(250),
            &params,
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_duration, Some(7));
        assert_eq!(result.optimal_cost, Some(dec!(240)));
        assert_eq!(result.schedules.iter().filter(|s| s.is_crashed).count(), 1);
        assert_eq!(result.penalty_amount, Some(dec!(20)));
        assert_eq!(result.bonus_amount, Some(Decimal::ZERO));
        assert_eq!(result.total_cost, Some(dec!(260)));
        let max_end = result.schedules.iter().map(|s| s.end_time).max();
        assert_eq!(max_end, result.optimal_duration);
    }

    #[test]
    fn test_budget_mode_bonus_cap_holds_duration_up() {
        // Daily bonus 0.5 capped at 10 allows at most 20 early days, so the
        // duration variable cannot drop below 30 - 20 = 10 even though every
        // schedule finishes by day 9
        let params = ScenarioParams {
            contract_amount: dec!(1000),
            contract_duration: Some(100),
            target_duration: Some(30),
            ..Default::default()
        };
        let result = solve_budget_to_duration(
            &chain_activities(),
            &chain_precedences(),
            dec!(300),
            &params,
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_duration, Some(10));
        // 1000 * 20 / 100 * 5% = 10, exactly the 1% cap
        assert_eq!(result.bonus_amount, Some(dec!(10)));
        assert_eq!(result.penalty_amount, Some(Decimal::ZERO));

        let max_end = result.schedules.iter().map(|s| s.end_time).max().unwrap();
        assert!(max_end <= 9, "max end {}", max_end);
        assert!(max_end < result.optimal_duration.unwrap());
    }

    #[test]
    fn test_no_target_no_incentives() {
        let params = ScenarioParams {
            penalty_type: PenaltyType::Fixed,
            penalty_amount: Some(dec!(1000)),
            contract_amount: dec!(10000),
            contract_duration: Some(20),
            ..Default::default()
        };
        let result = solve_budget_to_duration(
            &chain_activities(),
            &chain_precedences(),
            dec!(250),
            &params,
            &OptimizerConfig::default(),
        );

        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.penalty_amount, Some(Decimal::ZERO));
        assert_eq!(result.bonus_amount, Some(Decimal::ZERO));
    }

    #[test]
    fn test_repeat_calls_match() {
        let run = || {
            solve_budget_to_duration(
                &chain_activities(),
                &chain_precedences(),
                dec!(300),
                &ScenarioParams::default(),
                &OptimizerConfig::default(),
            )
        };
        let (first, second) = (run(), run());
        assert_eq!(first.schedules, second.schedules);
        assert_eq!(first.optimal_duration, second.optimal_duration);
        assert_eq!(first.total_cost, second.total_cost);
    }

    #[test]
    fn test_unknown_predecessor_ignored() {
        let mut precedences = chain_precedences();
        precedences.push(Precedence::new("b", "ghost"));
        let result = solve_duration_to_cost(
            &chain_activities(),
            &precedences,
            9,
            &ScenarioParams::default(),
            &OptimizerConfig::default(),
        );
        assert_consistent(&result, &chain_precedences());
        assert_eq!(result.optimal_cost, Some(dec!(180)));
    }

    #[test]
    fn test_cyclic_precedence_does_not_hang() {
        let precedences = vec![Precedence::new("b", "a"), Precedence::new("a", "b")];
        let result = solve_duration_to_cost(
            &chain_activities(),
            &precedences,
            20,
            &ScenarioParams::default(),
            &OptimizerConfig::default(),
        );
        assert_eq!(result.status, OptimizationStatus::Infeasible);
        assert!(result.error_message.is_some());
    }

    fn request(mode: OptimizationMode) -> OptimizationRequest {
        OptimizationRequest {
            mode,
            budget_constraint: None,
            duration_constraint: None,
            scenario: ScenarioParams::default(),
            activities: chain_activities(),
            precedences: chain_precedences(),
        }
    }

    #[test]
    fn test_optimize_requires_matching_constraint() {
        let config = OptimizerConfig::default();
        let mut budget_req = request(OptimizationMode::BudgetToDuration);
        budget_req.duration_constraint = Some(7);
        assert_eq!(
            optimize(&budget_req, &config),
            Err(RequestError::MissingBudget)
        );

        let mut duration_req = request(OptimizationMode::DurationToCost);
        duration_req.budget_constraint = Some(dec!(300));
        assert_eq!(
            optimize(&duration_req, &config),
            Err(RequestError::MissingDuration)
        );
    }

    #[test]
    fn test_optimize_rejects_bad_activities() {
        let config = OptimizerConfig::default();
        let mut req = request(OptimizationMode::DurationToCost);
        req.duration_constraint = Some(7);
        req.activities.clear();
        assert_eq!(optimize(&req, &config), Err(RequestError::EmptyProject));

        req.activities = vec![Activity::new("a", "A", 3, dec!(100), 5, dec!(160))];
        assert!(matches!(
            optimize(&req, &config),
            Err(RequestError::InvalidActivity(_))
        ));
    }

    #[test]
    fn test_optimize_dispatches() {
        let mut req = request(OptimizationMode::DurationToCost);
        req.duration_constraint = Some(7);
        let result = optimize(&req, &OptimizerConfig::default()).unwrap();
        assert_eq!(result.optimal_duration, Some(7));
        assert_eq!(result.optimal_cost, Some(dec!(240)));
    }

    #[test]
    fn test_request_from_json() {
        let json = r#"{
            "mode": "budget_to_duration",
            "budget_constraint": "300",
            "duration_constraint": null,
            "activities": [
                {"id": "a", "name": "A", "normal_duration": 5, "normal_cost": "100",
                 "crash_duration": 3, "crash_cost": "160"},
                {"id": "b", "name": "B", "normal_duration": 4, "normal_cost": "80",
                 "crash_duration": 2, "crash_cost": "140"}
            ],
            "precedences": [{"successor": "b", "predecessor": "a"}]
        }"#;
        let req: OptimizationRequest = serde_json::from_str(json).unwrap();
        let result = optimize(&req, &OptimizerConfig::default()).unwrap();
        assert_eq!(result.optimal_duration, Some(5));

        let out = serde_json::to_value(&result).unwrap();
        assert_eq!(out["status"], "success");
    }
}
