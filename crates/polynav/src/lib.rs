#![doc = include_str!("../../../readme.md")]

mod astar;
mod config;
mod face;
mod graph;
mod heuristic;
pub mod math;
mod navmesh;
pub mod obj;
mod portal;
mod selection;

pub use astar::{AStar, Path, SearchError, SearchState, VisitState};
pub use config::{LoadConfig, SearchConfig, VertexPlane};
pub use face::{Face, FaceError, FaceId, VertexId};
pub use graph::{Edge, EdgeId, Graph, GraphError, Node, NodeId};
pub use heuristic::{Euclidean, Heuristic, Zero};
pub use math::{Aabb2d, Point, PointExt};
pub use navmesh::{AddFaceError, NavGraph, Navmesh, QueryError};
pub use obj::{LoadError, ParseErrorKind};
pub use portal::{PortalKey, PortalRegistry};
pub use selection::{Pick, Selection};
