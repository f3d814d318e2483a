//! A* search over a [`Graph`].
//!
//! Per-node bookkeeping (visit state, g, h, parent) lives in a table owned by [`AStar`],
//! keyed by [`NodeId`], and is reset for the whole node set at the start of every query.
//! The graph itself is only read, so it can be shared between searches.
//!
//! The frontier is a [`BinaryHeap`] without decrease-key: an improved node is simply pushed
//! again and the stale entry is skipped once the node is closed.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use slotmap::SecondaryMap;
use thiserror::Error;

use crate::config::SearchConfig;
use crate::graph::{Graph, NodeId};
use crate::heuristic::Heuristic;

/// Where a node stands in the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisitState {
    /// Not reached yet.
    #[default]
    Unvisited,
    /// Reached and waiting in the frontier.
    Open,
    /// Expanded. A closed node is never relaxed again.
    Closed,
}

/// The bookkeeping of a single node during a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchState {
    /// Where the node stands in the search.
    pub visit: VisitState,
    /// Cheapest known cost from the start.
    pub g: f64,
    /// Heuristic estimate of the remaining cost to the target.
    pub h: f64,
    /// The predecessor on the cheapest known path.
    pub parent: Option<NodeId>,
}

impl SearchState {
    const RESET: Self = Self {
        visit: VisitState::Unvisited,
        g: f64::INFINITY,
        h: 0.0,
        parent: None,
    };

    /// `g + h`, the priority of the node in the frontier.
    #[inline]
    pub fn f(&self) -> f64 {
        self.g + self.h
    }
}

/// The outcome of a search.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Path {
    /// The nodes from start to target, both inclusive. Empty if the target is unreachable.
    pub nodes: Vec<NodeId>,
    /// Sum of the edge weights along [`Self::nodes`].
    pub total_cost: f64,
    /// How many nodes were expanded to produce this result.
    pub expanded: usize,
}

impl Path {
    fn not_found(expanded: usize) -> Self {
        Self {
            nodes: Vec::new(),
            total_cost: f64::INFINITY,
            expanded,
        }
    }

    /// Whether the search failed to reach the target.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of waypoints.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}

/// Errors that abort a search. An unreachable target is not one of them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SearchError {
    /// The start or target node is not part of the searched graph.
    #[error("node {0:?} does not belong to the searched graph")]
    UnknownNode(NodeId),
    /// [`SearchConfig::max_expansions`] was reached before the target.
    #[error("search gave up after expanding {limit} nodes")]
    BudgetExhausted {
        /// The configured limit.
        limit: usize,
    },
}

/// Entry in the frontier (min-heap via reversed ordering).
#[derive(Debug)]
struct OpenEntry {
    node: NodeId,
    f: f64,
    /// Insertion counter, breaks ties in favor of the older entry.
    sequence: u64,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: the smallest f is the "greatest" entry.
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

/// A reusable A* searcher.
///
/// Keeping one around between queries reuses its allocations. The state of the last
/// search stays readable through [`AStar::state`] until the next query starts.
#[derive(Debug, Default)]
pub struct AStar {
    config: SearchConfig,
    states: SecondaryMap<NodeId, SearchState>,
    frontier: BinaryHeap<OpenEntry>,
    sequence: u64,
}

impl AStar {
    /// Creates a searcher with the given limits.
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// The limits applied to every query.
    #[inline]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// The bookkeeping of `node` as left by the last search.
    #[inline]
    pub fn state(&self, node: NodeId) -> Option<&SearchState> {
        self.states.get(node)
    }

    /// Finds the cheapest path from `start` to `target`.
    ///
    /// Blocked nodes are never entered. `start == target` yields the single-node path.
    /// If the frontier runs dry the returned [`Path`] is empty.
    pub fn find_path<T, H: Heuristic<T>>(
        &mut self,
        graph: &Graph<T, H>,
        start: NodeId,
        target: NodeId,
    ) -> Result<Path, SearchError> {
        for id in [start, target] {
            if !graph.contains(id) {
                return Err(SearchError::UnknownNode(id));
            }
        }
        self.reset(graph);

        let heuristic = graph.heuristic();
        let start_payload = graph.nodes[start].payload();
        let target_payload = graph.nodes[target].payload();

        self.states[start] = SearchState {
            visit: VisitState::Open,
            g: 0.0,
            h: heuristic.estimate(start_payload, target_payload, start_payload),
            parent: None,
        };
        self.push(start);

        let mut expanded = 0;
        while let Some(entry) = self.frontier.pop() {
            let current = entry.node;
            if self.states[current].visit == VisitState::Closed {
                // Stale duplicate of an already expanded node.
                continue;
            }
            self.states[current].visit = VisitState::Closed;
            if current == target {
                return Ok(self.reconstruct(start, target, expanded + 1));
            }
            // Reaching the target is always allowed, only expanding past a node costs budget.
            if let Some(limit) = self.config.max_expansions {
                if expanded >= limit {
                    tracing::debug!(limit, "search budget exhausted");
                    return Err(SearchError::BudgetExhausted { limit });
                }
            }
            expanded += 1;

            let current_g = self.states[current].g;
            for (edge, neighbor) in graph.neighbors(current) {
                if graph.nodes[neighbor].is_blocked()
                    || self.states[neighbor].visit == VisitState::Closed
                {
                    continue;
                }
                let candidate = current_g + graph.edge(edge).weight();
                if candidate < self.states[neighbor].g {
                    let payload = graph.nodes[neighbor].payload();
                    self.states[neighbor] = SearchState {
                        visit: VisitState::Open,
                        g: candidate,
                        h: heuristic.estimate(start_payload, target_payload, payload),
                        parent: Some(current),
                    };
                    self.push(neighbor);
                }
            }
        }

        tracing::trace!(expanded, "target unreachable");
        Ok(Path::not_found(expanded))
    }

    fn reset<T, H>(&mut self, graph: &Graph<T, H>) {
        self.states.clear();
        for &id in graph.node_ids() {
            self.states.insert(id, SearchState::RESET);
        }
        self.frontier.clear();
        self.sequence = 0;
    }

    fn push(&mut self, node: NodeId) {
        self.frontier.push(OpenEntry {
            node,
            f: self.states[node].f(),
            sequence: self.sequence,
        });
        self.sequence += 1;
    }

    fn reconstruct(&self, start: NodeId, target: NodeId, expanded: usize) -> Path {
        let mut nodes = vec![target];
        let mut current = target;
        while current != start {
            let Some(parent) = self.states[current].parent else {
                break;
            };
            nodes.push(parent);
            current = parent;
        }
        nodes.reverse();
        Path {
            nodes,
            total_cost: self.states[target].g,
            expanded,
        }
    }
}
