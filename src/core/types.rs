//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};

/// Stable handle of an agent inside the population arena
///
/// The population never shrinks during a run (death is a flag), so an id
/// handed out at spawn time stays valid for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(pub usize);

impl AgentId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// 2D position in map units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Offset by `distance` along `angle` (radians)
    pub fn polar_offset(&self, angle: f64, distance: f64) -> Self {
        Self {
            x: self.x + distance * angle.cos(),
            y: self.y + distance * angle.sin(),
        }
    }
}

/// Bounded map rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    pub width: f64,
    pub height: f64,
}

impl MapBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Clamp a position into `[0, width - 1] x [0, height - 1]`
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        Vec2 {
            x: pos.x.min(self.width - 1.0).max(0.0),
            y: pos.y.min(self.height - 1.0).max(0.0),
        }
    }

    /// Whether a position lies inside the playable area after a move
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x < self.width && pos.y >= 0.0 && pos.y < self.height
    }

    /// Spawn rule used by the factory: `(0, width] x (0, height]`
    pub fn accepts_spawn(&self, pos: Vec2) -> bool {
        pos.x > 0.0 && pos.x <= self.width && pos.y > 0.0 && pos.y <= self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_pythagorean() {
        let a = Vec2::new(0.0, 0.0);
        let b = Vec2::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
        assert_eq!(b.distance(&a), 5.0);
    }

    #[test]
    fn test_polar_offset_moves_by_distance() {
        let origin = Vec2::new(10.0, 10.0);
        let east = origin.polar_offset(0.0, 5.0);
        assert!((east.x - 15.0).abs() < 1e-9 && (east.y - 10.0).abs() < 1e-9);

        let moved = origin.polar_offset(2.0, 7.5);
        assert!((origin.distance(&moved) - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_keeps_inside() {
        let bounds = MapBounds::new(100.0, 100.0);
        let clamped = bounds.clamp(Vec2::new(-5.0, 250.0));
        assert_eq!(clamped, Vec2::new(0.0, 99.0));
        assert!(bounds.contains(clamped));
    }

    #[test]
    fn test_spawn_rule_excludes_origin_includes_edge() {
        let bounds = MapBounds::new(500.0, 500.0);
        assert!(!bounds.accepts_spawn(Vec2::new(0.0, 10.0)));
        assert!(bounds.accepts_spawn(Vec2::new(500.0, 500.0)));
        assert!(!bounds.accepts_spawn(Vec2::new(600.0, 50.0)));
    }
}
