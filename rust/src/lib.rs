//! Time–cost tradeoff ("crashing") optimizer for construction project bids.
//!
//! Two decision modes are provided:
//! 1. Budget to duration: the shortest schedule whose cost fits a budget
//! 2. Duration to cost: the cheapest schedule finishing in a fixed duration
//!
//! Both modes price contractual late penalties and early-completion bonuses
//! against a target duration. Each call builds a fresh MILP, solves it, and
//! returns either a full schedule with cost breakdown or a diagnosis.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

pub mod logging;

pub mod bounds;
mod config;
pub mod extract;
pub mod incentives;
pub mod milp;
mod models;
pub mod network;
mod optimizer;
mod python;

pub use config::{IncentivePolicy, OptimizerConfig};
pub use models::{
    Activity, OptimizationMode, OptimizationRequest, OptimizationResult, OptimizationStatus,
    PenaltyType, Precedence, ScenarioParams, ScheduleEntry,
};
pub use network::{ActivityNetwork, TopoOrder};
pub use optimizer::{optimize, solve_budget_to_duration, solve_duration_to_cost, RequestError};
