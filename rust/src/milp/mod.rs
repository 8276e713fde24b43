//! Mixed-integer model of the time–cost tradeoff and its solver adapter.
//!
//! Model construction is a pure function of the network and scenario; the
//! resulting [`CrashingModel`] is consumed by [`solve`], so each call owns its
//! variables and can run concurrently with others.

mod builder;
mod solver;

pub use builder::{build_budget_model, build_duration_model, CrashingModel};
pub use solver::{solve, Assignment, SolveOutcome, SolveReport};
