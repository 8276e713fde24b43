//! Adapter between a built [`CrashingModel`] and the MILP backend.

use good_lp::{microlp, ResolutionError, Solution, SolverModel};
use std::time::{Duration, Instant};

use super::builder::CrashingModel;

/// Raw variable values of an optimal solution, indexed like the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub starts: Vec<f64>,
    pub crashed: Vec<f64>,
    pub duration: f64,
    pub penalty_days: Option<f64>,
    pub bonus_days: Option<f64>,
}

/// Terminal status of a single solve attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Optimal(Assignment),
    Infeasible,
    /// Any other terminal status, carrying the solver's status name.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    /// Wall-clock time spent inside the solver.
    pub elapsed: Duration,
}

/// Solve the model once with the pure-Rust backend, which prints nothing.
pub fn solve(model: CrashingModel) -> SolveReport {
    let CrashingModel {
        variables,
        objective,
        constraints,
        starts,
        crashed,
        duration,
        penalty_days,
        bonus_days,
        ..
    } = model;

    let started = Instant::now();
    let problem = constraints
        .into_iter()
        .fold(variables.minimise(objective).using(microlp), |problem, c| {
            problem.with(c)
        });

    let outcome = match problem.solve() {
        Ok(solution) => SolveOutcome::Optimal(Assignment {
            starts: starts.iter().map(|&v| solution.value(v)).collect(),
            crashed: crashed.iter().map(|&v| solution.value(v)).collect(),
            duration: solution.value(duration),
            penalty_days: penalty_days.map(|v| solution.value(v)),
            bonus_days: bonus_days.map(|v| solution.value(v)),
        }),
        Err(ResolutionError::Infeasible) => SolveOutcome::Infeasible,
        Err(ResolutionError::Unbounded) => SolveOutcome::Failed("Unbounded".to_string()),
        Err(other) => SolveOutcome::Failed(other.to_string()),
    };

    SolveReport {
        outcome,
        elapsed: started.elapsed(),
    }
}
