//! Container bounds
//!
//! The open-topped box bodies are dropped into. Walls and floor are owned by
//! the physics provider; this only answers geometry questions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::tuning::GameTuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Container {
    pub center: Vec2,
    /// Inner width
    pub width: f32,
    /// Inner height
    pub height: f32,
}

impl Container {
    pub fn new(center: Vec2, width: f32, height: f32) -> Self {
        Self {
            center,
            width: width.abs(),
            height: height.abs(),
        }
    }

    pub fn from_tuning(tuning: &GameTuning) -> Self {
        let (x, y) = tuning.container_center;
        Self::new(Vec2::new(x, y), tuning.container_width, tuning.container_height)
    }

    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.center.y - self.height / 2.0
    }

    #[inline]
    pub fn top_y(&self) -> f32 {
        self.center.y + self.height / 2.0
    }

    #[inline]
    pub fn left_x(&self) -> f32 {
        self.center.x - self.width / 2.0
    }

    #[inline]
    pub fn right_x(&self) -> f32 {
        self.center.x + self.width / 2.0
    }

    /// Keep a circle of `radius` clear of the walls and floor
    ///
    /// The top is open, so Y is only clamped from below. A container
    /// narrower than the circle centers it horizontally.
    pub fn clamp_inside(&self, pos: Vec2, radius: f32) -> Vec2 {
        let min_x = self.left_x() + radius;
        let max_x = self.right_x() - radius;
        let x = if min_x > max_x {
            self.center.x
        } else {
            pos.x.clamp(min_x, max_x)
        };
        let y = pos.y.max(self.floor_y() + radius);
        Vec2::new(x, y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        let c = Container::new(Vec2::ZERO, 5.0, 7.5);
        assert_eq!(c.floor_y(), -3.75);
        assert_eq!(c.left_x(), -2.5);
        assert_eq!(c.right_x(), 2.5);
        assert_eq!(c.top_y(), 3.75);
    }

    #[test]
    fn test_clamp_pushes_out_of_corner() {
        let c = Container::new(Vec2::ZERO, 5.0, 7.5);
        let p = c.clamp_inside(Vec2::new(2.4, -3.7), 0.5);
        assert!((p.x - 2.0).abs() < 1e-6);
        assert!((p.y - -3.25).abs() < 1e-6);
    }

    #[test]
    fn test_clamp_leaves_interior_point() {
        let c = Container::new(Vec2::ZERO, 5.0, 7.5);
        let p = Vec2::new(0.3, 1.0);
        assert_eq!(c.clamp_inside(p, 0.4), p);
    }

    #[test]
    fn test_open_top_not_clamped() {
        let c = Container::new(Vec2::ZERO, 5.0, 7.5);
        let p = c.clamp_inside(Vec2::new(0.0, 10.0), 0.8);
        assert_eq!(p.y, 10.0);
    }

    #[test]
    fn test_narrow_container_centers() {
        let c = Container::new(Vec2::new(1.0, 0.0), 1.0, 4.0);
        let p = c.clamp_inside(Vec2::new(3.0, 0.0), 0.8);
        assert_eq!(p.x, 1.0);
    }
}
