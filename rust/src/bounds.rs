//! Network-implied duration and cost bounds used to explain infeasible solves.
//!
//! The bounds come from a forward pass (earliest start propagation) over the
//! precedence graph with every activity at normal or at crash duration.

use rust_decimal::Decimal;

use crate::log_checks;
use crate::network::{ActivityNetwork, TopoOrder};

/// Which duration each activity contributes to a forward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pace {
    Normal,
    Crashed,
}

impl Pace {
    fn is_crashed(self) -> bool {
        matches!(self, Pace::Crashed)
    }
}

/// Earliest finish of the whole network with every activity at the given pace.
pub fn earliest_finish(network: &ActivityNetwork, pace: Pace) -> u64 {
    let starts = match network.topological_order() {
        TopoOrder::Ordered(order) => forward_pass(network, &order, pace),
        TopoOrder::CycleDetected => {
            log::warn!(
                "Precedence graph contains a cycle; treating revisited activities as starting at 0"
            );
            guarded_forward_pass(network, pace)
        }
    };

    network
        .activities()
        .iter()
        .zip(&starts)
        .map(|(act, &start)| start + u64::from(act.duration(pace.is_crashed())))
        .max()
        .unwrap_or(0)
}

/// Minimum total cost when nothing is crashed.
pub fn min_cost_bound(network: &ActivityNetwork, indirect_cost: Decimal) -> Decimal {
    let normal_duration = earliest_finish(network, Pace::Normal);
    let direct: Decimal = network.activities().iter().map(|a| a.normal_cost).sum();
    direct + indirect_cost * Decimal::from(normal_duration)
}

/// Earliest starts in topological order.
fn forward_pass(network: &ActivityNetwork, order: &[usize], pace: Pace) -> Vec<u64> {
    let mut starts = vec![0u64; network.len()];
    for &idx in order {
        starts[idx] = network
            .predecessors(idx)
            .iter()
            .map(|&p| starts[p] + u64::from(network.activity(p).duration(pace.is_crashed())))
            .max()
            .unwrap_or(0);
    }
    starts
}

#[derive(Clone, Copy)]
enum Mark {
    Unvisited,
    Visiting,
    Done(u64),
}

/// Depth-first earliest starts that terminate on cyclic input.
///
/// An activity reached again while its own start is still being computed
/// contributes a start of 0. The result is only meaningful for acyclic parts.
fn guarded_forward_pass(network: &ActivityNetwork, pace: Pace) -> Vec<u64> {
    fn visit(network: &ActivityNetwork, idx: usize, pace: Pace, marks: &mut [Mark]) -> u64 {
        match marks[idx] {
            Mark::Done(start) => return start,
            Mark::Visiting => return 0,
            Mark::Unvisited => {}
        }
        marks[idx] = Mark::Visiting;

        let mut start = 0;
        for &p in network.predecessors(idx) {
            let pred_start = visit(network, p, pace, marks);
            let pred_end = pred_start + u64::from(network.activity(p).duration(pace.is_crashed()));
            start = start.max(pred_end);
        }

        marks[idx] = Mark::Done(start);
        start
    }

    let mut marks = vec![Mark::Unvisited; network.len()];
    (0..network.len())
        .map(|idx| visit(network, idx, pace, &mut marks))
        .collect()
}

const INFEASIBLE_PREFIX: &str = "No feasible solution (infeasible). Reason: ";

/// Explain why a budget-to-duration model has no feasible point.
pub fn diagnose_budget(
    network: &ActivityNetwork,
    budget: Decimal,
    indirect_cost: Decimal,
    verbosity: u8,
) -> String {
    let min_cost = min_cost_bound(network, indirect_cost);
    log_checks!(
        verbosity,
        "Infeasible budget model: min cost bound {} vs budget {}",
        min_cost,
        budget
    );

    let reason = if min_cost > budget {
        format!(
            "budget is insufficient: even with no activity crashed the minimum cost is {:.2}, \
             but the budget is only {:.2} (shortfall: {:.2})",
            min_cost,
            budget,
            min_cost - budget
        )
    } else {
        "the budget constraint conflicts with other constraints and no feasible schedule exists"
            .to_string()
    };

    format!(
        "{}{}. Suggestion: increase the budget or adjust activity parameters.",
        INFEASIBLE_PREFIX, reason
    )
}

/// Explain why a duration-to-cost model has no feasible point.
pub fn diagnose_duration(network: &ActivityNetwork, duration: u32, verbosity: u8) -> String {
    let min_duration = earliest_finish(network, Pace::Crashed);
    log_checks!(
        verbosity,
        "Infeasible duration model: crash duration bound {} vs requested {}",
        min_duration,
        duration
    );

    let requested = u64::from(duration);
    let reason = if min_duration > requested {
        format!(
            "duration constraint is too tight: even with every activity crashed the shortest \
             duration is {} days, but the requested duration is only {} days (shortfall: {} days)",
            min_duration,
            duration,
            min_duration - requested
        )
    } else {
        "the duration constraint conflicts with other constraints and no feasible schedule exists"
            .to_string()
    };

    format!(
        "{}{}. Suggestion: relax the duration constraint or adjust activity parameters.",
        INFEASIBLE_PREFIX, reason
    )
}
