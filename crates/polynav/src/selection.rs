//! Picking start and target locations on a navmesh.
//!
//! Selecting a face moves its interior waypoint to the picked location, so routes pass
//! through the exact point rather than the face's barycenter. When a face stops being
//! selected its waypoint goes back to the barycenter.

use crate::face::FaceId;
use crate::math::Point;
use crate::navmesh::{Navmesh, QueryError};

/// A face together with the location it was picked at.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Pick {
    /// The face containing [`Self::point`].
    pub face: FaceId,
    /// Where the face was picked.
    pub point: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Start,
    Target,
}

/// The current start and target of a route.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Selection {
    start: Option<Pick>,
    target: Option<Pick>,
}

impl Selection {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The picked start, if any.
    #[inline]
    pub fn start(&self) -> Option<Pick> {
        self.start
    }

    /// The picked target, if any.
    #[inline]
    pub fn target(&self) -> Option<Pick> {
        self.target
    }

    /// Picks the start at `point`.
    ///
    /// Returns the face that was hit, or `None` if `point` is off the mesh, in which case
    /// the selection is left as it was.
    pub fn select_start(&mut self, navmesh: &mut Navmesh, point: Point) -> Option<FaceId> {
        self.select(Role::Start, navmesh, point)
    }

    /// Picks the target at `point`. See [`Self::select_start`].
    pub fn select_target(&mut self, navmesh: &mut Navmesh, point: Point) -> Option<FaceId> {
        self.select(Role::Target, navmesh, point)
    }

    /// Deselects both ends and restores their faces' waypoints.
    pub fn clear(&mut self, navmesh: &mut Navmesh) {
        let picks = [self.start.take(), self.target.take()];
        for pick in picks.into_iter().flatten() {
            if let Err(err) = navmesh.reset_interior_point(pick.face) {
                tracing::warn!(%err, "could not restore deselected face");
            }
        }
    }

    /// The route from start to target.
    ///
    /// `Ok(None)` until both ends are picked. An empty route means the two faces are not
    /// connected.
    pub fn route(&self, navmesh: &Navmesh) -> Result<Option<Vec<Point>>, QueryError> {
        let (Some(start), Some(target)) = (self.start, self.target) else {
            return Ok(None);
        };
        navmesh.request_path(start.face, target.face).map(Some)
    }

    fn select(&mut self, role: Role, navmesh: &mut Navmesh, point: Point) -> Option<FaceId> {
        let face = navmesh.find_face_containing(point)?;
        let (slot, other) = match role {
            Role::Start => (&mut self.start, self.target),
            Role::Target => (&mut self.target, self.start),
        };
        let previous = slot.replace(Pick { face, point });
        if let Some(previous) = previous {
            if previous.face != face {
                let restored = match other {
                    Some(other) if other.face == previous.face => {
                        navmesh.set_interior_point(other.face, other.point)
                    }
                    _ => navmesh.reset_interior_point(previous.face),
                };
                if let Err(err) = restored {
                    tracing::warn!(%err, "could not restore deselected face");
                }
            }
        }
        if let Err(err) = navmesh.set_interior_point(face, point) {
            tracing::warn!(%err, "could not move interior point of picked face");
        }
        Some(face)
    }
}
