//! Configuration types for the optimizer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use pyo3::prelude::*;

/// Contractual constants for late penalties and early-completion bonuses.
///
/// The bonus cap is a hard constraint of the MILP; the penalty cap only
/// clamps the amount reported after solving.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IncentivePolicy {
    /// Share of the daily contract value paid per day finished early.
    #[pyo3(get, set)]
    pub daily_bonus_rate: Decimal,
    /// Bonus ceiling as a fraction of the contract amount.
    #[pyo3(get, set)]
    pub bonus_cap_ratio: Decimal,
    /// Penalty ceiling as a fraction of the contract amount.
    #[pyo3(get, set)]
    pub penalty_cap_ratio: Decimal,
}

impl Default for IncentivePolicy {
    fn default() -> Self {
        Self {
            daily_bonus_rate: Decimal::new(5, 2),
            bonus_cap_ratio: Decimal::new(1, 2),
            penalty_cap_ratio: Decimal::new(20, 2),
        }
    }
}

impl IncentivePolicy {
    /// Bonus earned per day of early completion, before the cap.
    ///
    /// Returns `None` unless both the contract amount and the contract
    /// duration are positive.
    pub fn daily_bonus(
        &self,
        contract_amount: Decimal,
        contract_duration: Option<u32>,
    ) -> Option<Decimal> {
        match contract_duration {
            Some(days) if days > 0 && contract_amount > Decimal::ZERO => {
                Some(contract_amount / Decimal::from(days) * self.daily_bonus_rate)
            }
            _ => None,
        }
    }

    pub fn bonus_cap(&self, contract_amount: Decimal) -> Decimal {
        contract_amount * self.bonus_cap_ratio
    }

    pub fn penalty_cap(&self, contract_amount: Decimal) -> Decimal {
        contract_amount * self.penalty_cap_ratio
    }
}

/// Per-call optimizer configuration.
#[pyclass]
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    #[pyo3(get, set)]
    pub verbosity: u8,
    /// Penalty and bonus constants.
    #[pyo3(get, set)]
    pub incentives: IncentivePolicy,
}

#[pymethods]
impl IncentivePolicy {
    #[new]
    #[pyo3(signature = (daily_bonus_rate=None, bonus_cap_ratio=None, penalty_cap_ratio=None))]
    fn py_new(
        daily_bonus_rate: Option<Decimal>,
        bonus_cap_ratio: Option<Decimal>,
        penalty_cap_ratio: Option<Decimal>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            daily_bonus_rate: daily_bonus_rate.unwrap_or(defaults.daily_bonus_rate),
            bonus_cap_ratio: bonus_cap_ratio.unwrap_or(defaults.bonus_cap_ratio),
            penalty_cap_ratio: penalty_cap_ratio.unwrap_or(defaults.penalty_cap_ratio),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "IncentivePolicy(daily_bonus_rate={}, bonus_cap_ratio={}, penalty_cap_ratio={})",
            self.daily_bonus_rate, self.bonus_cap_ratio, self.penalty_cap_ratio
        )
    }
}

#[pymethods]
impl OptimizerConfig {
    #[new]
    #[pyo3(signature = (verbosity=0, incentives=None))]
    fn py_new(verbosity: u8, incentives: Option<IncentivePolicy>) -> Self {
        Self {
            verbosity,
            incentives: incentives.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "OptimizerConfig(verbosity={}, incentives={:?})",
            self.verbosity, self.incentives
        )
    }
}
