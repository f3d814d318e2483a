//! Heuristics steering [`AStar`](crate::AStar).
//!
//! A heuristic estimates the remaining cost from the current node to the target.
//! It must be non-negative and must never overestimate the true remaining cost,
//! otherwise the returned paths are no longer guaranteed to be the cheapest ones.

use crate::math::Point;

/// Estimates the remaining cost of a search.
///
/// Any `Fn(&T, &T, &T) -> f64` closure taking `(start, target, current)` payloads is a heuristic.
pub trait Heuristic<T> {
    /// Estimated cost of getting from `current` to `target` in a search that began at `start`.
    fn estimate(&self, start: &T, target: &T, current: &T) -> f64;
}

impl<T, F> Heuristic<T> for F
where
    F: Fn(&T, &T, &T) -> f64,
{
    #[inline]
    fn estimate(&self, start: &T, target: &T, current: &T) -> f64 {
        self(start, target, current)
    }
}

/// Straight-line distance between the current node and the target.
///
/// Admissible whenever edge weights are at least the Euclidean length between their endpoints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Euclidean;

impl Heuristic<Point> for Euclidean {
    #[inline]
    fn estimate(&self, _start: &Point, target: &Point, current: &Point) -> f64 {
        current.distance(*target)
    }
}

/// Always estimates zero, which turns A* into Dijkstra's algorithm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Zero;

impl<T> Heuristic<T> for Zero {
    #[inline]
    fn estimate(&self, _start: &T, _target: &T, _current: &T) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euclidean_ignores_start() {
        let target = Point::new(3.0, 4.0);
        let estimate = Euclidean.estimate(&Point::new(100.0, 100.0), &target, &Point::ZERO);
        assert_eq!(estimate, 5.0);
    }

    #[test]
    fn closures_are_heuristics() {
        let manhattan = |_: &(i32, i32), target: &(i32, i32), current: &(i32, i32)| {
            ((target.0 - current.0).abs() + (target.1 - current.1).abs()) as f64
        };
        assert_eq!(manhattan.estimate(&(0, 0), &(2, 3), &(1, 1)), 3.0);
        assert_eq!(Zero.estimate(&(0, 0), &(2, 3), &(1, 1)), 0.0);
    }
}
