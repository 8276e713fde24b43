//! MILP construction for both decision modes.

use good_lp::{constraint, variable, Constraint, Expression, ProblemVariables, Variable};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::config::IncentivePolicy;
use crate::models::{Activity, OptimizationMode, ScenarioParams};
use crate::network::ActivityNetwork;

/// A fully built model together with handles to the variables the result
/// extractor reads back.
pub struct CrashingModel {
    pub(crate) mode: OptimizationMode,
    pub(crate) variables: ProblemVariables,
    pub(crate) objective: Expression,
    pub(crate) constraints: Vec<Constraint>,
    /// Start time per activity index.
    pub(crate) starts: Vec<Variable>,
    /// Crash indicator per activity index (1 = crashed).
    pub(crate) crashed: Vec<Variable>,
    /// Total project duration.
    pub(crate) duration: Variable,
    pub(crate) penalty_days: Option<Variable>,
    pub(crate) bonus_days: Option<Variable>,
    variable_count: usize,
}

impl CrashingModel {
    pub fn mode(&self) -> OptimizationMode {
        self.mode
    }

    pub fn variable_count(&self) -> usize {
        self.variable_count
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    pub fn has_penalty_days(&self) -> bool {
        self.penalty_days.is_some()
    }

    pub fn has_bonus_days(&self) -> bool {
        self.bonus_days.is_some()
    }
}

/// How the total-duration variable is treated.
#[derive(Clone, Copy)]
enum Horizon {
    /// Free duration, direct plus indirect cost capped by a budget.
    Budget(Decimal),
    /// Duration pinned to an exact value.
    Fixed(u32),
}

/// Mode A: minimize duration under a budget ceiling.
///
/// The objective adds the day count to the money-valued penalty and bonus
/// terms without any unit scaling.
pub fn build_budget_model(
    network: &ActivityNetwork,
    budget: Decimal,
    params: &ScenarioParams,
    policy: &IncentivePolicy,
) -> CrashingModel {
    build(network, Horizon::Budget(budget), params, policy)
}

/// Mode B: minimize total cost for a fixed duration.
pub fn build_duration_model(
    network: &ActivityNetwork,
    duration: u32,
    params: &ScenarioParams,
    policy: &IncentivePolicy,
) -> CrashingModel {
    build(network, Horizon::Fixed(duration), params, policy)
}

fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// normal × (1 − y) + crash × y, written as normal + (crash − normal) × y.
fn blended_duration(activity: &Activity, crashed: Variable) -> Expression {
    let normal = f64::from(activity.normal_duration);
    let delta = f64::from(activity.crash_duration) - normal;
    Expression::from(normal) + delta * crashed
}

fn blended_cost(activity: &Activity, crashed: Variable) -> Expression {
    let normal = to_f64(activity.normal_cost);
    let delta = to_f64(activity.crash_cost) - normal;
    Expression::from(normal) + delta * crashed
}

fn build(
    network: &ActivityNetwork,
    horizon: Horizon,
    params: &ScenarioParams,
    policy: &IncentivePolicy,
) -> CrashingModel {
    let mut variables = ProblemVariables::new();
    let n = network.len();

    let starts: Vec<Variable> = (0..n)
        .map(|_| variables.add(variable().integer().min(0)))
        .collect();
    let crashed: Vec<Variable> = (0..n).map(|_| variables.add(variable().binary())).collect();
    let duration = match horizon {
        Horizon::Budget(_) => variables.add(variable().integer().min(0)),
        Horizon::Fixed(days) => {
            variables.add(variable().integer().min(f64::from(days)).max(f64::from(days)))
        }
    };
    let mut variable_count = 2 * n + 1;

    let mut constraints: Vec<Constraint> = Vec::new();

    // Precedence: a successor starts after its predecessor finishes
    for &(succ, pred) in network.edges() {
        let pred_end = blended_duration(network.activity(pred), crashed[pred]) + starts[pred];
        let succ_start = starts[succ];
        constraints.push(constraint!(succ_start >= pred_end));
    }

    // The project lasts at least until every activity finishes
    for (idx, activity) in network.activities().iter().enumerate() {
        let end = blended_duration(activity, crashed[idx]) + starts[idx];
        constraints.push(constraint!(duration >= end));
    }

    let indirect = to_f64(params.indirect_cost);
    let direct_cost: Expression = network
        .activities()
        .iter()
        .zip(&crashed)
        .map(|(activity, &y)| blended_cost(activity, y))
        .sum();

    if let Horizon::Budget(budget) = horizon {
        let spend = direct_cost.clone() + indirect * duration;
        let ceiling = to_f64(budget);
        constraints.push(constraint!(spend <= ceiling));
    }

    // Penalty and bonus linearization, both measured against the target duration
    let mut penalty_term = Expression::from(0.0);
    let mut bonus_term = Expression::from(0.0);
    let mut penalty_days = None;
    let mut bonus_days = None;

    if let Some(target) = params.target() {
        let target = f64::from(target);

        let late = variables.add(variable().integer().min(0));
        variable_count += 1;
        let overrun = Expression::from(duration) - target;
        constraints.push(constraint!(late >= overrun));
        let daily_penalty = params.daily_penalty().map_or(0.0, to_f64);
        penalty_term = daily_penalty * late;
        penalty_days = Some(late);

        let daily_bonus = policy.daily_bonus(params.contract_amount, params.contract_duration);
        if let Some(daily_bonus) = daily_bonus {
            let early = variables.add(variable().integer().min(0));
            variable_count += 1;
            let underrun = Expression::from(target) - duration;
            constraints.push(constraint!(early >= underrun));

            // The bonus ceiling is a hard constraint on the model
            let daily_bonus = to_f64(daily_bonus);
            let cap = to_f64(policy.bonus_cap(params.contract_amount));
            constraints.push(constraint!(daily_bonus * early <= cap));

            bonus_term = daily_bonus * early;
            bonus_days = Some(early);
        }
    }

    let objective = match horizon {
        Horizon::Budget(_) => Expression::from(duration) + penalty_term - bonus_term,
        Horizon::Fixed(_) => direct_cost + indirect * duration + penalty_term - bonus_term,
    };

    let mode = match horizon {
        Horizon::Budget(_) => OptimizationMode::BudgetToDuration,
        Horizon::Fixed(_) => OptimizationMode::DurationToCost,
    };

    CrashingModel {
        mode,
        variables,
        objective,
        constraints,
        starts,
        crashed,
        duration,
        penalty_days,
        bonus_days,
        variable_count,
    }
}
