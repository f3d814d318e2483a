//! The navmesh: faces, their shared portals, and the graph connecting them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path as FsPath;

use thiserror::Error;

use crate::astar::{AStar, Path, SearchError};
use crate::config::{LoadConfig, SearchConfig};
use crate::face::{Face, FaceError, FaceId, VertexId};
use crate::graph::{Graph, GraphError, NodeId};
use crate::heuristic::Euclidean;
use crate::math::{Point, midpoint};
use crate::obj::{LoadError, Record, parse_record};
use crate::portal::PortalRegistry;

/// The graph a [`Navmesh`] is searched on: points as payloads, straight-line heuristic.
pub type NavGraph = Graph<Point, Euclidean>;

/// Errors of navmesh queries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The face id does not belong to this navmesh.
    #[error("face {0:?} does not exist")]
    UnknownFace(FaceId),
    /// The underlying graph search failed.
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// A polygonal walkable surface turned into a weighted graph.
///
/// Each face contributes an interior node. Each distinct boundary edge contributes one portal
/// node, shared by the faces on both sides. Interior nodes are linked to their face's portals
/// with the straight-line distance as weight, so a route alternates between face interiors
/// and the edges crossed to get from one face to the next.
#[derive(Debug, Clone)]
pub struct Navmesh {
    vertices: Vec<Point>,
    faces: Vec<Face>,
    portals: PortalRegistry,
    graph: NavGraph,
    search_config: SearchConfig,
}

impl Default for Navmesh {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            portals: PortalRegistry::default(),
            graph: Graph::new(Euclidean),
            search_config: SearchConfig::default(),
        }
    }
}

impl Navmesh {
    /// Creates an empty navmesh. Fill it with [`Self::add_vertex`] and [`Self::add_face`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a navmesh from a mesh file. See the [`obj`](crate::obj) module for the format.
    pub fn load(path: impl AsRef<FsPath>, config: &LoadConfig) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Io {
            path: path.to_owned(),
            source,
        })?;
        let navmesh = Self::from_reader(BufReader::new(file), config).map_err(|err| match err {
            LoadError::Read(source) => LoadError::Io {
                path: path.to_owned(),
                source,
            },
            other => other,
        })?;
        tracing::debug!(
            path = %path.display(),
            vertices = navmesh.vertices.len(),
            faces = navmesh.faces.len(),
            portals = navmesh.portals.len(),
            "loaded navmesh"
        );
        Ok(navmesh)
    }

    /// Reads a navmesh from any buffered reader.
    pub fn from_reader(reader: impl BufRead, config: &LoadConfig) -> Result<Self, LoadError> {
        let mut navmesh = Self::new();
        for (index, line) in reader.lines().enumerate() {
            let line_number = index + 1;
            let line = line?;
            match parse_record(&line, config, navmesh.vertices.len()) {
                Ok(Record::Vertex(point)) => {
                    navmesh.add_vertex(point);
                }
                Ok(Record::Face(ring)) => {
                    navmesh
                        .add_face(&ring)
                        .map_err(|err| err.at_line(line_number))?;
                }
                Ok(Record::Ignored) => {}
                Err(kind) => {
                    return Err(LoadError::Parse {
                        line: line_number,
                        kind,
                    });
                }
            }
        }
        Ok(navmesh)
    }

    /// Parses a navmesh from mesh text.
    pub fn from_obj_str(source: &str, config: &LoadConfig) -> Result<Self, LoadError> {
        Self::from_reader(source.as_bytes(), config)
    }

    /// Appends a vertex, already in navmesh coordinates.
    pub fn add_vertex(&mut self, point: Point) -> VertexId {
        let id = VertexId::new(self.vertices.len() as u32);
        self.vertices.push(point);
        id
    }

    /// Builds a face from a ring of existing vertices and links it into the graph.
    ///
    /// The face's interior node is linked to each of its portals, weighted by the distance
    /// between their current points. A rejected ring leaves the navmesh unchanged.
    pub fn add_face(&mut self, ring: &[VertexId]) -> Result<FaceId, AddFaceError> {
        let face = Face::build(ring, &self.vertices, &mut self.graph, &mut self.portals)?;
        let interior = face.interior_node();
        let interior_point = self.graph.payload(interior).copied().unwrap_or(Point::ZERO);
        for &portal in face.portal_nodes() {
            let portal_point = self.graph.payload(portal).copied().unwrap_or(Point::ZERO);
            self.graph
                .link(interior, portal, interior_point.distance(portal_point))?;
        }
        let id = FaceId::new(self.faces.len() as u32);
        self.faces.push(face);
        Ok(id)
    }

    /// Returns the portal node of the edge between `a` and `b`, creating it if needed.
    ///
    /// The pair is unordered: `(a, b)` and `(b, a)` always yield the same node. A newly created
    /// portal sits at the edge's midpoint, or at the origin if either vertex does not exist.
    pub fn get_or_create_portal(&mut self, a: VertexId, b: VertexId) -> NodeId {
        let placeholder = match (self.vertices.get(a.index()), self.vertices.get(b.index())) {
            (Some(&pa), Some(&pb)) => midpoint(pa, pb),
            _ => Point::ZERO,
        };
        self.portals
            .get_or_create(&mut self.graph, a, b, || placeholder)
            .0
    }

    /// The portal node of the edge between `a` and `b`, if any face uses that edge.
    #[inline]
    pub fn portal(&self, a: VertexId, b: VertexId) -> Option<NodeId> {
        self.portals.get(a, b)
    }

    /// The registry of all portals.
    #[inline]
    pub fn portals(&self) -> &PortalRegistry {
        &self.portals
    }

    /// All vertices in load order.
    #[inline]
    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// All faces in load order.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Ids of all faces in load order.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> {
        (0..self.faces.len() as u32).map(FaceId::new)
    }

    /// Number of faces.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of distinct boundary edges, each of which is one portal node.
    #[inline]
    pub fn portal_count(&self) -> usize {
        self.portals.len()
    }

    /// Returns the face with the given id.
    #[inline]
    pub fn face(&self, id: FaceId) -> Option<&Face> {
        self.faces.get(id.index())
    }

    /// The underlying graph, for inspection and visualization.
    #[inline]
    pub fn graph(&self) -> &NavGraph {
        &self.graph
    }

    /// The limits applied to path queries.
    #[inline]
    pub fn search_config(&self) -> &SearchConfig {
        &self.search_config
    }

    /// Replaces the limits applied to path queries.
    pub fn set_search_config(&mut self, config: SearchConfig) {
        self.search_config = config;
    }

    /// The current interior waypoint of a face.
    pub fn interior_point(&self, id: FaceId) -> Option<Point> {
        let face = self.face(id)?;
        self.graph.payload(face.interior_node()).copied()
    }

    /// The midpoints of a face's boundary edges, in boundary order.
    pub fn portal_points(&self, id: FaceId) -> Vec<Point> {
        self.face(id)
            .map(|face| {
                face.portal_nodes()
                    .iter()
                    .filter_map(|node| self.graph.payload(*node).copied())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Moves the interior waypoint of a face, e.g. to route through a picked location.
    ///
    /// Edge weights keep the values they got when the face was linked.
    pub fn set_interior_point(&mut self, id: FaceId, point: Point) -> Result<(), QueryError> {
        let face = self.face(id).ok_or(QueryError::UnknownFace(id))?;
        let node = face.interior_node();
        self.graph
            .set_payload(node, point)
            .map_err(|_| QueryError::UnknownFace(id))?;
        Ok(())
    }

    /// Moves the interior waypoint of a face back to its barycenter.
    pub fn reset_interior_point(&mut self, id: FaceId) -> Result<(), QueryError> {
        let face = self.face(id).ok_or(QueryError::UnknownFace(id))?;
        let barycenter = face.barycenter();
        self.set_interior_point(id, barycenter)
    }

    /// Sets the persistent `blocked` flag of a node. Blocked nodes are never routed through.
    pub fn set_blocked(&mut self, node: NodeId, blocked: bool) -> Result<(), GraphError> {
        self.graph.set_blocked(node, blocked)
    }

    /// Unblocks every node.
    pub fn clear_blocked(&mut self) {
        self.graph.clear_blocked();
    }

    /// The first face, in load order, whose boundary contains `point`.
    pub fn find_face_containing(&self, point: Point) -> Option<FaceId> {
        self.faces
            .iter()
            .position(|face| face.contains(point))
            .map(|index| FaceId::new(index as u32))
    }

    /// Runs A* between two nodes of this navmesh's graph.
    pub fn find_path(&self, start: NodeId, target: NodeId) -> Result<Path, SearchError> {
        self.find_path_with(&mut AStar::new(self.search_config), start, target)
    }

    /// Like [`Self::find_path`], reusing the allocations and limits of `search`.
    pub fn find_path_with(
        &self,
        search: &mut AStar,
        start: NodeId,
        target: NodeId,
    ) -> Result<Path, SearchError> {
        let path = search.find_path(&self.graph, start, target)?;
        tracing::trace!(
            ?start,
            ?target,
            waypoints = path.len(),
            expanded = path.expanded,
            "path query"
        );
        Ok(path)
    }

    /// Finds a route between the interior waypoints of two faces.
    ///
    /// Returns the waypoints from start to target, or an empty list if the faces are not connected.
    pub fn request_path(&self, start: FaceId, target: FaceId) -> Result<Vec<Point>, QueryError> {
        let start = self.face(start).ok_or(QueryError::UnknownFace(start))?;
        let target = self.face(target).ok_or(QueryError::UnknownFace(target))?;
        let path = self.find_path(start.interior_node(), target.interior_node())?;
        Ok(self.path_points(&path))
    }

    /// Resolves the nodes of a path to their current points.
    pub fn path_points(&self, path: &Path) -> Vec<Point> {
        path.nodes
            .iter()
            .filter_map(|node| self.graph.payload(*node).copied())
            .collect()
    }
}

/// Adding a face failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AddFaceError {
    /// The vertex ring is not a valid face.
    #[error(transparent)]
    Face(#[from] FaceError),
    /// Linking the face produced an invalid edge weight.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

impl AddFaceError {
    fn at_line(self, line: usize) -> LoadError {
        match self {
            Self::Face(source) => LoadError::InvalidFace { line, source },
            Self::Graph(source) => LoadError::Graph { line, source },
        }
    }
}
