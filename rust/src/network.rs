//! Activity network: activities keyed by ID plus the precedence graph.
//!
//! Activity IDs are mapped to dense indices so the model builder and the
//! bound estimator can use plain vectors instead of string-keyed maps.

use rustc_hash::FxHashMap;
use std::collections::VecDeque;

use crate::models::{Activity, Precedence};

/// Result of checking the topological-order precondition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopoOrder {
    /// Activity indices ordered so every predecessor precedes its successors.
    Ordered(Vec<usize>),
    /// The precedence graph contains at least one cycle.
    CycleDetected,
}

/// Immutable per-project activity set and precedence graph.
#[derive(Debug, Clone)]
pub struct ActivityNetwork {
    activities: Vec<Activity>,
    index: FxHashMap<String, usize>,
    /// Predecessor indices for each activity index.
    predecessors: Vec<Vec<usize>>,
    /// Known edges as (successor, predecessor) index pairs, in input order.
    edges: Vec<(usize, usize)>,
    dropped_edges: usize,
}

impl ActivityNetwork {
    /// Build a network, silently dropping edges that reference unknown activities.
    ///
    /// A repeated activity ID keeps the position of its first occurrence and
    /// the data of its last.
    pub fn new(activities: &[Activity], precedences: &[Precedence]) -> Self {
        let mut index: FxHashMap<String, usize> =
            FxHashMap::with_capacity_and_hasher(activities.len(), Default::default());
        let mut stored: Vec<Activity> = Vec::with_capacity(activities.len());

        for activity in activities {
            match index.get(activity.id.as_str()) {
                Some(&idx) => stored[idx] = activity.clone(),
                None => {
                    index.insert(activity.id.clone(), stored.len());
                    stored.push(activity.clone());
                }
            }
        }

        let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); stored.len()];
        let mut edges = Vec::with_capacity(precedences.len());
        let mut dropped_edges = 0;

        for p in precedences {
            match (
                index.get(p.successor.as_str()),
                index.get(p.predecessor.as_str()),
            ) {
                (Some(&succ), Some(&pred)) => {
                    predecessors[succ].push(pred);
                    edges.push((succ, pred));
                }
                _ => dropped_edges += 1,
            }
        }

        if dropped_edges > 0 {
            log::warn!(
                "Ignoring {} precedence edge(s) that reference unknown activities",
                dropped_edges
            );
        }

        Self {
            activities: stored,
            index,
            predecessors,
            edges,
            dropped_edges,
        }
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    /// Activities in input order (first occurrence of each ID).
    pub fn activities(&self) -> &[Activity] {
        &self.activities
    }

    #[inline]
    pub fn activity(&self, idx: usize) -> &Activity {
        &self.activities[idx]
    }

    #[inline]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn get(&self, id: &str) -> Option<&Activity> {
        self.index_of(id).map(|idx| &self.activities[idx])
    }

    /// Predecessor indices of the activity at `idx`.
    #[inline]
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        &self.predecessors[idx]
    }

    /// Predecessor IDs of the activity with the given ID (empty if unknown).
    pub fn predecessors_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        let preds: &'a [usize] = match self.index_of(id) {
            Some(idx) => &self.predecessors[idx],
            None => &[],
        };
        preds.iter().map(move |&p| self.activities[p].id.as_str())
    }

    /// Known edges as (successor, predecessor) index pairs.
    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    /// Number of input edges dropped because an endpoint was unknown.
    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    /// Order activities so that predecessors come first (Kahn's algorithm).
    ///
    /// Ties are broken by input order, so the result is deterministic.
    pub fn topological_order(&self) -> TopoOrder {
        let n = self.len();
        let mut in_degree: Vec<usize> = self.predecessors.iter().map(Vec::len).collect();
        let mut successors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for &(succ, pred) in &self.edges {
            successors[pred].push(succ);
        }

        let mut queue: VecDeque<usize> = (0..n).filter(|&i| in_degree[i] == 0).collect();
        let mut order = Vec::with_capacity(n);

        while let Some(idx) = queue.pop_front() {
            order.push(idx);
            for &succ in &successors[idx] {
                in_degree[succ] -= 1;
                if in_degree[succ] == 0 {
                    queue.push_back(succ);
                }
            }
        }

        if order.len() != n {
            return TopoOrder::CycleDetected;
        }
        TopoOrder::Ordered(order)
    }
}
