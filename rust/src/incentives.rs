//! Monetary late-penalty and early-completion bonus for a solved duration.
//!
//! These amounts are re-derived from the optimal duration in exact decimal
//! arithmetic, independently of the day-scaled terms inside the MILP.

use rust_decimal::Decimal;

use crate::config::IncentivePolicy;
use crate::models::ScenarioParams;

/// Reported penalty and bonus. At most one of them is non-zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Incentives {
    pub penalty_amount: Decimal,
    pub bonus_amount: Decimal,
}

impl Incentives {
    /// Penalty minus bonus, the net adjustment to total cost.
    pub fn net(&self) -> Decimal {
        self.penalty_amount - self.bonus_amount
    }
}

/// Price lateness or earliness of `duration` against the scenario's target.
pub fn assess(duration: i64, params: &ScenarioParams, policy: &IncentivePolicy) -> Incentives {
    let Some(target) = params.target() else {
        return Incentives::default();
    };
    let target = i64::from(target);

    if duration > target {
        let overdue = Decimal::from(duration - target);
        let mut penalty = params
            .daily_penalty()
            .map_or(Decimal::ZERO, |daily| daily * overdue);

        if params.contract_amount > Decimal::ZERO {
            penalty = penalty.min(policy.penalty_cap(params.contract_amount));
        }
        Incentives {
            penalty_amount: penalty,
            bonus_amount: Decimal::ZERO,
        }
    } else if duration < target {
        let bonus = match params.contract_duration {
            Some(days) if days > 0 && params.contract_amount > Decimal::ZERO => {
                let early = Decimal::from(target - duration);
                let raw = params.contract_amount * early / Decimal::from(days)
                    * policy.daily_bonus_rate;
                raw.min(policy.bonus_cap(params.contract_amount))
            }
            _ => Decimal::ZERO,
        };
        Incentives {
            penalty_amount: Decimal::ZERO,
            bonus_amount: bonus,
        }
    } else {
        Incentives::default()
    }
}
