//! Core data types for the crashing optimizer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use pyo3::prelude::*;

/// A project activity with its normal and crashed (accelerated) variants.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub name: String,
    /// Days when run at normal pace.
    #[pyo3(get, set)]
    pub normal_duration: u32,
    #[pyo3(get, set)]
    pub normal_cost: Decimal,
    /// Days when fully crashed; never more than `normal_duration`.
    #[pyo3(get, set)]
    pub crash_duration: u32,
    #[pyo3(get, set)]
    pub crash_cost: Decimal,
}

impl Activity {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        normal_duration: u32,
        normal_cost: Decimal,
        crash_duration: u32,
        crash_cost: Decimal,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            normal_duration,
            normal_cost,
            crash_duration,
            crash_cost,
        }
    }

    /// Whether crashing actually shortens this activity.
    pub fn can_crash(&self) -> bool {
        self.crash_duration < self.normal_duration
    }

    /// Extra cost per day saved by crashing, or zero if the activity cannot be crashed.
    ///
    /// Informational only: the model treats crashing as all-or-nothing.
    pub fn crash_slope(&self) -> Decimal {
        if self.can_crash() {
            (self.crash_cost - self.normal_cost)
                / Decimal::from(self.normal_duration - self.crash_duration)
        } else {
            Decimal::ZERO
        }
    }

    pub fn duration(&self, crashed: bool) -> u32 {
        if crashed {
            self.crash_duration
        } else {
            self.normal_duration
        }
    }

    pub fn cost(&self, crashed: bool) -> Decimal {
        if crashed {
            self.crash_cost
        } else {
            self.normal_cost
        }
    }
}

#[pymethods]
impl Activity {
    #[new]
    fn py_new(
        id: String,
        name: String,
        normal_duration: u32,
        normal_cost: Decimal,
        crash_duration: u32,
        crash_cost: Decimal,
    ) -> Self {
        Self::new(
            id,
            name,
            normal_duration,
            normal_cost,
            crash_duration,
            crash_cost,
        )
    }

    #[getter(crash_slope)]
    fn py_crash_slope(&self) -> Decimal {
        self.crash_slope()
    }

    fn __repr__(&self) -> String {
        format!(
            "Activity(id={:?}, normal={}d/{}, crash={}d/{})",
            self.id, self.normal_duration, self.normal_cost, self.crash_duration, self.crash_cost
        )
    }
}

/// Finish-to-start ordering: `successor` cannot start before `predecessor` finishes.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Precedence {
    pub successor: String,
    pub predecessor: String,
}

impl Precedence {
    pub fn new(successor: impl Into<String>, predecessor: impl Into<String>) -> Self {
        Self {
            successor: successor.into(),
            predecessor: predecessor.into(),
        }
    }
}

impl From<(String, String)> for Precedence {
    fn from((successor, predecessor): (String, String)) -> Self {
        Self {
            successor,
            predecessor,
        }
    }
}

/// How the late penalty is priced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PenaltyType {
    /// A fixed amount per day late.
    Fixed,
    /// A fraction of the contract amount per day late.
    #[default]
    Rate,
}

impl FromStr for PenaltyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fixed" => Ok(Self::Fixed),
            "rate" => Ok(Self::Rate),
            other => Err(format!("Unknown penalty type: {}", other)),
        }
    }
}

/// Economic parameters of one optimization call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Cost per day of project duration.
    pub indirect_cost: Decimal,
    pub penalty_type: PenaltyType,
    /// Daily penalty when `penalty_type` is fixed.
    pub penalty_amount: Option<Decimal>,
    /// Daily fraction of `contract_amount` when `penalty_type` is rate.
    pub penalty_rate: Option<Decimal>,
    pub contract_amount: Decimal,
    pub contract_duration: Option<u32>,
    /// Duration against which lateness and earliness are measured.
    pub target_duration: Option<u32>,
    /// Calendar anchor for day offsets in the schedule.
    pub project_start: Option<NaiveDate>,
}

impl ScenarioParams {
    /// Target duration, treating zero as unset.
    pub fn target(&self) -> Option<u32> {
        self.target_duration.filter(|&t| t > 0)
    }

    /// Late penalty per day before any cap, or `None` if no penalty applies.
    pub fn daily_penalty(&self) -> Option<Decimal> {
        match self.penalty_type {
            PenaltyType::Fixed => self.penalty_amount.filter(|a| !a.is_zero()),
            PenaltyType::Rate => match self.penalty_rate {
                Some(rate) if !rate.is_zero() && !self.contract_amount.is_zero() => {
                    Some(rate * self.contract_amount)
                }
                _ => None,
            },
        }
    }
}

/// One activity's slot in an optimized schedule.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    #[pyo3(get)]
    pub activity_id: String,
    #[pyo3(get)]
    pub activity_name: String,
    #[pyo3(get)]
    pub start_time: i64,
    #[pyo3(get)]
    pub end_time: i64,
    #[pyo3(get)]
    pub duration: u32,
    #[pyo3(get)]
    pub is_crashed: bool,
    #[pyo3(get)]
    pub cost: Decimal,
    #[pyo3(get)]
    pub start_date: Option<NaiveDate>,
    #[pyo3(get)]
    pub end_date: Option<NaiveDate>,
}

#[pymethods]
impl ScheduleEntry {
    fn __repr__(&self) -> String {
        format!(
            "ScheduleEntry(activity_id={:?}, start={}, end={}, crashed={})",
            self.activity_id, self.start_time, self.end_time, self.is_crashed
        )
    }
}

/// Terminal status of an optimization call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizationStatus {
    Success,
    Infeasible,
    Error,
}

impl OptimizationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Infeasible => "infeasible",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for OptimizationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two decision modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMode {
    /// Given a budget ceiling, minimize project duration.
    BudgetToDuration,
    /// Given a fixed duration, minimize total cost.
    DurationToCost,
}

impl FromStr for OptimizationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "budget_to_duration" => Ok(Self::BudgetToDuration),
            "duration_to_cost" => Ok(Self::DurationToCost),
            other => Err(format!("Unknown optimization mode: {}", other)),
        }
    }
}

/// A complete optimization request as received from the service layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationRequest {
    pub mode: OptimizationMode,
    pub budget_constraint: Option<Decimal>,
    pub duration_constraint: Option<u32>,
    #[serde(default)]
    pub scenario: ScenarioParams,
    pub activities: Vec<Activity>,
    #[serde(default)]
    pub precedences: Vec<Precedence>,
}

/// Outcome of one optimization call.
///
/// On success every optional figure is present and `schedules` holds one entry
/// per activity in input order. On failure only `error_message` is set.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
    pub status: OptimizationStatus,
    #[pyo3(get)]
    pub optimal_duration: Option<i64>,
    /// Sum of direct activity costs.
    #[pyo3(get)]
    pub optimal_cost: Option<Decimal>,
    /// Indirect cost accrued over the optimal duration.
    #[pyo3(get)]
    pub indirect_cost: Option<Decimal>,
    #[pyo3(get)]
    pub penalty_amount: Option<Decimal>,
    #[pyo3(get)]
    pub bonus_amount: Option<Decimal>,
    #[pyo3(get)]
    pub total_cost: Option<Decimal>,
    /// Wall-clock seconds spent building and solving the model.
    #[pyo3(get)]
    pub calculation_time: f64,
    #[pyo3(get)]
    pub schedules: Vec<ScheduleEntry>,
    #[pyo3(get)]
    pub error_message: Option<String>,
}

impl OptimizationResult {
    /// A failure descriptor carrying no schedule.
    pub fn failure(
        status: OptimizationStatus,
        error_message: String,
        calculation_time: f64,
    ) -> Self {
        Self {
            status,
            optimal_duration: None,
            optimal_cost: None,
            indirect_cost: None,
            penalty_amount: None,
            bonus_amount: None,
            total_cost: None,
            calculation_time,
            schedules: Vec::new(),
            error_message: Some(error_message),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == OptimizationStatus::Success
    }
}

#[pymethods]
impl OptimizationResult {
    #[getter(status)]
    fn py_status(&self) -> &'static str {
        self.status.as_str()
    }

    fn __repr__(&self) -> String {
        format!(
            "OptimizationResult(status={}, optimal_duration={:?}, total_cost={:?}, schedules={})",
            self.status,
            self.optimal_duration,
            self.total_cost,
            self.schedules.len()
        )
    }
}
