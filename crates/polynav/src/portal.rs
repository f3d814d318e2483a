//! The portal registry: one graph node per undirected mesh edge.

use std::collections::BTreeMap;

use crate::face::VertexId;
use crate::graph::{Graph, NodeId};

/// An undirected mesh edge, stored as a canonically ordered vertex pair.
///
/// `PortalKey::new(a, b) == PortalKey::new(b, a)` for all `a` and `b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct PortalKey {
    low: VertexId,
    high: VertexId,
}

impl PortalKey {
    /// Creates the key for the edge between `a` and `b`.
    #[inline]
    pub fn new(a: VertexId, b: VertexId) -> Self {
        Self {
            low: a.min(b),
            high: a.max(b),
        }
    }

    /// The two vertices, smaller id first.
    #[inline]
    pub fn vertices(self) -> (VertexId, VertexId) {
        (self.low, self.high)
    }
}

/// Maps every undirected mesh edge to its portal node.
///
/// Two faces sharing an edge get the same node back, which is what connects them in the graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PortalRegistry {
    portals: BTreeMap<PortalKey, NodeId>,
}

impl PortalRegistry {
    /// Looks up the portal of the edge between `a` and `b`, in either order.
    #[inline]
    pub fn get(&self, a: VertexId, b: VertexId) -> Option<NodeId> {
        self.portals.get(&PortalKey::new(a, b)).copied()
    }

    /// Returns the portal of the edge between `a` and `b`, creating it if needed.
    ///
    /// A new portal node gets the `placeholder` payload and is registered in `graph`.
    /// The returned flag tells whether the node was created by this call.
    pub fn get_or_create<T, H>(
        &mut self,
        graph: &mut Graph<T, H>,
        a: VertexId,
        b: VertexId,
        placeholder: impl FnOnce() -> T,
    ) -> (NodeId, bool) {
        let key = PortalKey::new(a, b);
        if let Some(&node) = self.portals.get(&key) {
            return (node, false);
        }
        let node = graph.add_node(placeholder());
        self.portals.insert(key, node);
        (node, true)
    }

    /// Number of distinct portals.
    #[inline]
    pub fn len(&self) -> usize {
        self.portals.len()
    }

    /// Whether no portal has been registered yet.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.portals.is_empty()
    }

    /// All portals, ordered by key.
    pub fn iter(&self) -> impl Iterator<Item = (PortalKey, NodeId)> + '_ {
        self.portals.iter().map(|(key, node)| (*key, *node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heuristic::Zero;

    #[test]
    fn key_is_symmetric() {
        let a = VertexId::new(3);
        let b = VertexId::new(7);
        assert_eq!(PortalKey::new(a, b), PortalKey::new(b, a));
        assert_eq!(PortalKey::new(b, a).vertices(), (a, b));
    }

    #[test]
    fn get_or_create_reuses_node_for_reversed_pair() {
        let mut graph = Graph::new(Zero);
        let mut registry = PortalRegistry::default();
        let a = VertexId::new(0);
        let b = VertexId::new(1);

        let (first, created) = registry.get_or_create(&mut graph, a, b, || 0);
        assert!(created);
        let (second, created) = registry.get_or_create(&mut graph, b, a, || 1);
        assert!(!created);
        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.payload(first), Some(&0));
        assert_eq!(registry.get(b, a), Some(first));
        assert_eq!(registry.len(), 1);
    }
}
