use glam::DVec2;

#[cfg(feature = "bevy_reflect")]
use bevy_reflect::prelude::*;

use crate::math::Point;

/// Which two fields of a `v` record become the 2D position of a vertex.
///
/// Mesh files are usually exported from 3D tools, where the walkable ground lies on the
/// xz-plane. [`VertexPlane::XZ`] therefore reads the first and third fields and ignores the
/// second one. This is the format contract of existing mesh files and stays the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
pub enum VertexPlane {
    /// `v <x> <ignored> <y>`
    #[default]
    XZ,
    /// `v <x> <y> [ignored]`
    XY,
}

impl VertexPlane {
    /// Picks the 2D coordinates out of the raw coordinate fields of a vertex record.
    /// Returns `None` if the record has too few fields for this plane.
    pub fn project(self, fields: &[f64]) -> Option<Point> {
        match self {
            Self::XZ => Some(DVec2::new(*fields.first()?, *fields.get(2)?)),
            Self::XY => Some(DVec2::new(*fields.first()?, *fields.get(1)?)),
        }
    }

    /// How many coordinate fields a vertex record needs for this plane.
    pub fn required_fields(self) -> usize {
        match self {
            Self::XZ => 3,
            Self::XY => 2,
        }
    }
}

/// How raw mesh coordinates are mapped onto the navmesh plane.
///
/// Every vertex is transformed as `raw * scale + translation`, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
#[cfg_attr(
    all(feature = "serialize", feature = "bevy_reflect"),
    reflect(Serialize, Deserialize)
)]
pub struct LoadConfig {
    /// Uniform scale applied to raw coordinates before translating. `[Limit: finite]`
    pub scale: f64,
    /// Offset added after scaling. `[Units: wu]`
    pub translation: Point,
    /// Which fields of a vertex record hold the 2D position.
    pub plane: VertexPlane,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            translation: DVec2::ZERO,
            plane: VertexPlane::default(),
        }
    }
}

impl LoadConfig {
    /// Sets the uniform scale.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Sets the translation applied after scaling.
    pub fn with_translation(mut self, translation: impl Into<Point>) -> Self {
        self.translation = translation.into();
        self
    }

    /// Sets which fields of a vertex record are read.
    pub fn with_plane(mut self, plane: VertexPlane) -> Self {
        self.plane = plane;
        self
    }

    /// Applies `raw * scale + translation`.
    #[inline]
    pub fn transform(&self, raw: Point) -> Point {
        raw * self.scale + self.translation
    }
}

/// Limits applied to every path query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "bevy_reflect", derive(Reflect))]
#[cfg_attr(
    all(feature = "serialize", feature = "bevy_reflect"),
    reflect(Serialize, Deserialize)
)]
pub struct SearchConfig {
    /// The maximum number of nodes a single search may expand before giving up.
    ///
    /// Popping the target never counts against the limit, so a query whose start is its
    /// target succeeds even with a limit of zero. `None` means unbounded. Interactive callers
    /// should set a limit, since the worst case of a search grows with the size of the whole mesh.
    pub max_expansions: Option<usize>,
}

impl SearchConfig {
    /// A config that gives up after `limit` expanded nodes.
    pub fn with_max_expansions(limit: usize) -> Self {
        Self {
            max_expansions: Some(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xz_plane_skips_second_field() {
        let fields = [1.0, 99.0, 2.0];
        assert_eq!(VertexPlane::XZ.project(&fields), Some(DVec2::new(1.0, 2.0)));
        assert_eq!(VertexPlane::XY.project(&fields), Some(DVec2::new(1.0, 99.0)));
        assert_eq!(VertexPlane::XZ.project(&fields[..2]), None);
    }

    #[test]
    fn transform_scales_then_translates() {
        let config = LoadConfig::default()
            .with_scale(50.0)
            .with_translation([230.0, 300.0]);
        assert_eq!(
            config.transform(DVec2::new(1.0, -2.0)),
            DVec2::new(280.0, 200.0)
        );
    }

    #[cfg(feature = "serialize")]
    #[test]
    fn load_config_round_trips_through_json() {
        let config = LoadConfig::default()
            .with_scale(2.0)
            .with_plane(VertexPlane::XY);
        let json = serde_json::to_string(&config).unwrap();
        let back: LoadConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
