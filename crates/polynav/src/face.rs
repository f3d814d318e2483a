//! Faces: the polygonal cells of a navmesh.
//!
//! Every face owns one interior node, a waypoint placed inside the polygon, and refers to one
//! portal node per boundary edge. Portals of edges shared with a neighbor are the same node
//! for both faces.

use thiserror::Error;

use crate::graph::{Graph, NodeId};
use crate::math::{AREA_EPSILON, Aabb2d, Point, barycenter, midpoint, ring_contains, signed_area};
use crate::portal::PortalRegistry;

/// Index of a vertex in [`Navmesh::vertices`](crate::Navmesh::vertices), assigned in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexId(u32);

impl VertexId {
    /// Wraps a raw 0-based vertex index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The 0-based position of the vertex.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a face in [`Navmesh::faces`](crate::Navmesh::faces), assigned in load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct FaceId(u32);

impl FaceId {
    /// Wraps a raw 0-based face index.
    #[inline]
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    /// The 0-based position of the face.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Reasons a vertex ring cannot become a [`Face`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FaceError {
    /// A face needs at least three vertices.
    #[error("a face needs at least 3 vertices, got {count}")]
    TooFewVertices {
        /// The number of vertices that was given.
        count: usize,
    },
    /// The ring visits the same vertex twice.
    #[error("vertex {0:?} appears more than once in the face")]
    RepeatedVertex(VertexId),
    /// The ring refers to a vertex that does not exist.
    #[error("vertex {0:?} does not exist")]
    UnknownVertex(VertexId),
    /// A vertex of the ring has an infinite or NaN coordinate.
    #[error("vertex {0:?} has a non-finite position")]
    NonFiniteVertex(VertexId),
    /// The polygon has (almost) no area compared to its size.
    #[error("face is degenerate, signed area is {area}")]
    Degenerate {
        /// The signed area of the ring.
        area: f64,
    },
}

/// One polygonal cell of the navmesh.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    vertices: Vec<VertexId>,
    points: Vec<Point>,
    bounds: Aabb2d,
    interior_node: NodeId,
    portal_nodes: Vec<NodeId>,
}

impl Face {
    /// Builds a face from a ring of vertex ids.
    ///
    /// Creates the interior node at the barycenter, and fetches one portal node per boundary
    /// edge from `portals`. A portal created here gets its edge's midpoint as payload;
    /// a portal that already existed is left untouched.
    pub(crate) fn build<H>(
        ring: &[VertexId],
        vertices: &[Point],
        graph: &mut Graph<Point, H>,
        portals: &mut PortalRegistry,
    ) -> Result<Self, FaceError> {
        if ring.len() < 3 {
            return Err(FaceError::TooFewVertices { count: ring.len() });
        }
        for (i, id) in ring.iter().enumerate() {
            if ring[..i].contains(id) {
                return Err(FaceError::RepeatedVertex(*id));
            }
        }
        let points = ring
            .iter()
            .map(|id| match vertices.get(id.index()) {
                Some(point) if point.is_finite() => Ok(*point),
                Some(_) => Err(FaceError::NonFiniteVertex(*id)),
                None => Err(FaceError::UnknownVertex(*id)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        let bounds = Aabb2d::around(points[0], &points[1..]);
        let area = signed_area(&points);
        let extent = bounds.extent();
        if !(area.abs() > AREA_EPSILON * extent * extent) {
            return Err(FaceError::Degenerate { area });
        }

        let interior_node = graph.add_node(barycenter(&points));
        let mut portal_nodes = Vec::with_capacity(ring.len());
        for i in 0..ring.len() {
            let j = (i + 1) % ring.len();
            let (node, _) =
                portals.get_or_create(graph, ring[i], ring[j], || midpoint(points[i], points[j]));
            portal_nodes.push(node);
        }

        Ok(Self {
            vertices: ring.to_vec(),
            points,
            bounds,
            interior_node,
            portal_nodes,
        })
    }

    /// The boundary ring as vertex ids.
    #[inline]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// The boundary ring as points.
    #[inline]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The axis-aligned bounds of the boundary ring.
    #[inline]
    pub fn bounds(&self) -> Aabb2d {
        self.bounds
    }

    /// The node routing through the inside of this face.
    #[inline]
    pub fn interior_node(&self) -> NodeId {
        self.interior_node
    }

    /// One portal node per boundary edge; entry `i` belongs to the edge from vertex `i` to `i + 1`.
    #[inline]
    pub fn portal_nodes(&self) -> &[NodeId] {
        &self.portal_nodes
    }

    /// The arithmetic mean of the boundary points, the default interior waypoint.
    pub fn barycenter(&self) -> Point {
        barycenter(&self.points)
    }

    /// Even-odd containment test against the boundary ring.
    pub fn contains(&self, point: Point) -> bool {
        self.bounds.contains(point) && ring_contains(&self.points, point)
    }
}
