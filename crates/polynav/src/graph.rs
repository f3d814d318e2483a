//! A generic weighted, undirected graph.
//!
//! The graph only stores topology and payloads. Search bookkeeping lives in
//! [`AStar`](crate::AStar), so one graph can serve any number of searches.

use slotmap::SlotMap;
use thiserror::Error;

use crate::astar::{AStar, Path, SearchError};
use crate::heuristic::Heuristic;

slotmap::new_key_type! {
    /// Stable identifier of a node inside a [`Graph`]. Never reused while the graph lives.
    pub struct NodeId;
}

/// Index of an [`Edge`] inside a [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(usize);

impl EdgeId {
    /// The position of the edge in [`Graph::edges`].
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// A graph node: a payload, a persistent `blocked` flag and the incident edges.
#[derive(Debug, Clone, PartialEq)]
pub struct Node<T> {
    payload: T,
    blocked: bool,
    edges: Vec<EdgeId>,
}

impl<T> Node<T> {
    /// The value carried by this node.
    #[inline]
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Blocked nodes are never entered by a search.
    #[inline]
    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    /// All edges touching this node, in link order.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }
}

/// An undirected connection between two nodes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    a: NodeId,
    b: NodeId,
    weight: f64,
}

impl Edge {
    /// Both endpoints, in the order they were linked.
    #[inline]
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.a, self.b)
    }

    /// The traversal cost. Always finite and non-negative.
    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The endpoint on the other side of `node`, or `None` if `node` is not an endpoint.
    #[inline]
    pub fn opposite(&self, node: NodeId) -> Option<NodeId> {
        if node == self.a {
            Some(self.b)
        } else if node == self.b {
            Some(self.a)
        } else {
            None
        }
    }
}

/// Errors raised while editing a [`Graph`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// The node id was not created by this graph.
    #[error("node {0:?} does not belong to this graph")]
    UnknownNode(NodeId),
    /// Edge weights must be finite and non-negative.
    #[error("edge weight must be finite and non-negative, got {0}")]
    InvalidWeight(f64),
}

/// A weighted undirected graph whose nodes carry a `T`, searched with the heuristic `H`.
#[derive(Debug, Clone)]
pub struct Graph<T, H> {
    pub(crate) nodes: SlotMap<NodeId, Node<T>>,
    /// Node ids in creation order.
    order: Vec<NodeId>,
    edges: Vec<Edge>,
    heuristic: H,
}

impl<T, H> Graph<T, H> {
    /// Creates an empty graph that will be searched with `heuristic`.
    pub fn new(heuristic: H) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            order: Vec::new(),
            edges: Vec::new(),
            heuristic,
        }
    }

    /// Registers a new node. No deduplication is performed.
    pub fn add_node(&mut self, payload: T) -> NodeId {
        let id = self.nodes.insert(Node {
            payload,
            blocked: false,
            edges: Vec::new(),
        });
        self.order.push(id);
        id
    }

    /// Connects `a` and `b` with one undirected edge shared by both adjacency lists.
    ///
    /// Parallel edges are allowed; avoiding them is up to the caller.
    pub fn link(&mut self, a: NodeId, b: NodeId, weight: f64) -> Result<EdgeId, GraphError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(GraphError::InvalidWeight(weight));
        }
        for id in [a, b] {
            if !self.nodes.contains_key(id) {
                return Err(GraphError::UnknownNode(id));
            }
        }
        let edge_id = EdgeId(self.edges.len());
        self.edges.push(Edge { a, b, weight });
        self.nodes[a].edges.push(edge_id);
        if a != b {
            self.nodes[b].edges.push(edge_id);
        }
        Ok(edge_id)
    }

    /// Whether `id` belongs to this graph.
    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Returns the node with the given id.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&Node<T>> {
        self.nodes.get(id)
    }

    /// Returns the payload of the node with the given id.
    #[inline]
    pub fn payload(&self, id: NodeId) -> Option<&T> {
        self.nodes.get(id).map(|node| &node.payload)
    }

    /// Mutable access to a node's payload.
    ///
    /// Edge weights are fixed at link time and do not follow a moved payload.
    #[inline]
    pub fn payload_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.nodes.get_mut(id).map(|node| &mut node.payload)
    }

    /// Replaces a node's payload, returning the old one.
    pub fn set_payload(&mut self, id: NodeId, payload: T) -> Result<T, GraphError> {
        let node = self.nodes.get_mut(id).ok_or(GraphError::UnknownNode(id))?;
        Ok(std::mem::replace(&mut node.payload, payload))
    }

    /// Sets the persistent `blocked` flag of a node.
    pub fn set_blocked(&mut self, id: NodeId, blocked: bool) -> Result<(), GraphError> {
        let node = self.nodes.get_mut(id).ok_or(GraphError::UnknownNode(id))?;
        node.blocked = blocked;
        Ok(())
    }

    /// Whether the node is blocked. Unknown ids are reported as not blocked.
    #[inline]
    pub fn is_blocked(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|node| node.blocked)
    }

    /// Clears the `blocked` flag on every node.
    pub fn clear_blocked(&mut self) {
        for node in self.nodes.values_mut() {
            node.blocked = false;
        }
    }

    /// All node ids in creation order.
    #[inline]
    pub fn node_ids(&self) -> &[NodeId] {
        &self.order
    }

    /// All nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node<T>)> {
        self.order.iter().map(|&id| (id, &self.nodes[id]))
    }

    /// Number of registered nodes.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// All edges, indexed by [`EdgeId::index`].
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Number of edges.
    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns the edge with the given id.
    /// # Panics
    /// Panics if the id was not produced by this graph.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// The edges around `id` together with the node on their far side.
    /// Yields nothing for unknown ids.
    pub fn neighbors(&self, id: NodeId) -> impl Iterator<Item = (EdgeId, NodeId)> + '_ {
        self.nodes
            .get(id)
            .into_iter()
            .flat_map(|node| node.edges.iter())
            .map(move |&edge_id| {
                let edge = &self.edges[edge_id.0];
                (edge_id, edge.opposite(id).unwrap_or(id))
            })
    }

    /// The heuristic this graph is searched with.
    #[inline]
    pub fn heuristic(&self) -> &H {
        &self.heuristic
    }

    /// Sums the cheapest edge between each consecutive pair of `nodes`.
    /// Returns `None` if two consecutive nodes are not adjacent.
    pub fn path_cost(&self, nodes: &[NodeId]) -> Option<f64> {
        nodes.windows(2).try_fold(0.0, |total, pair| {
            self.neighbors(pair[0])
                .filter(|(_, other)| *other == pair[1])
                .map(|(edge, _)| self.edge(edge).weight)
                .min_by(f64::total_cmp)
                .map(|weight| total + weight)
        })
    }
}

impl<T, H: Heuristic<T>> Graph<T, H> {
    /// Runs a one-off A* search from `start` to `target` with an unbounded budget.
    ///
    /// An unreachable target yields an empty [`Path`], not an error.
    pub fn find_path(&self, start: NodeId, target: NodeId) -> Result<Path, SearchError> {
        AStar::default().find_path(self, start, target)
    }
}
