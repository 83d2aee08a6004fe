//! Collision detection and response for circles in an open box
//!
//! Bodies are circles; the container is a floor plus two walls. Detection
//! returns the contact normal and penetration so the caller can push bodies
//! apart before they tunnel through each other or out of the box.

use glam::Vec2;

use super::container::Container;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point (if hit)
    pub point: Vec2,
    /// Contact normal (points from the obstacle toward the circle)
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check overlap between two circles
///
/// The normal points from `b` toward `a`. Coincident centers fall back to an
/// upward normal so the pair still separates.
pub fn circle_circle_collision(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32) -> CollisionResult {
    let delta = a_pos - b_pos;
    let dist_sq = delta.length_squared();
    let reach = a_radius + b_radius;

    if dist_sq >= reach * reach {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    let normal = if dist > 1e-6 { delta / dist } else { Vec2::Y };
    CollisionResult {
        hit: true,
        point: b_pos + normal * b_radius,
        normal,
        penetration: reach - dist,
    }
}

/// Whether two circles are touching within `slop`
#[inline]
pub fn circles_touch(a_pos: Vec2, a_radius: f32, b_pos: Vec2, b_radius: f32, slop: f32) -> bool {
    let reach = a_radius + b_radius + slop;
    (a_pos - b_pos).length_squared() <= reach * reach
}

/// Check a circle against the container floor and walls
///
/// Returns one result per surface hit (floor, left wall, right wall).
pub fn circle_container_collisions(pos: Vec2, radius: f32, container: &Container) -> Vec<CollisionResult> {
    let mut hits = Vec::new();

    let floor = container.floor_y();
    if pos.y - radius < floor {
        hits.push(CollisionResult {
            hit: true,
            point: Vec2::new(pos.x, floor),
            normal: Vec2::Y,
            penetration: floor - (pos.y - radius),
        });
    }

    let left = container.left_x();
    if pos.x - radius < left {
        hits.push(CollisionResult {
            hit: true,
            point: Vec2::new(left, pos.y),
            normal: Vec2::X,
            penetration: left - (pos.x - radius),
        });
    }

    let right = container.right_x();
    if pos.x + radius > right {
        hits.push(CollisionResult {
            hit: true,
            point: Vec2::new(right, pos.y),
            normal: Vec2::NEG_X,
            penetration: pos.x + radius - right,
        });
    }

    hits
}

/// Bounce off a static surface, keeping `restitution` of the normal speed
///
/// Velocity already leaving the surface is returned unchanged.
pub fn bounce_velocity(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    let vn = velocity.dot(normal);
    if vn >= 0.0 {
        return velocity;
    }
    velocity - (1.0 + restitution) * vn * normal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_circle_overlap() {
        let result = circle_circle_collision(Vec2::new(0.5, 0.0), 0.3, Vec2::ZERO, 0.3);
        assert!(result.hit);
        assert!((result.penetration - 0.1).abs() < 1e-5);
        assert!((result.normal - Vec2::X).length() < 1e-5);
    }

    #[test]
    fn test_circle_circle_miss() {
        let result = circle_circle_collision(Vec2::new(1.0, 0.0), 0.3, Vec2::ZERO, 0.3);
        assert!(!result.hit);
    }

    #[test]
    fn test_coincident_centers_separate_upward() {
        let result = circle_circle_collision(Vec2::ONE, 0.2, Vec2::ONE, 0.2);
        assert!(result.hit);
        assert_eq!(result.normal, Vec2::Y);
        assert!((result.penetration - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_touch_slop() {
        assert!(circles_touch(Vec2::new(0.605, 0.0), 0.3, Vec2::ZERO, 0.3, 0.01));
        assert!(!circles_touch(Vec2::new(0.62, 0.0), 0.3, Vec2::ZERO, 0.3, 0.01));
    }

    #[test]
    fn test_container_floor_and_wall() {
        let container = Container::new(Vec2::ZERO, 5.0, 7.5);
        let hits = circle_container_collisions(Vec2::new(-2.4, -3.7), 0.2, &container);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].normal, Vec2::Y);
        assert!((hits[0].penetration - 0.15).abs() < 1e-5);
        assert_eq!(hits[1].normal, Vec2::X);
        assert!((hits[1].penetration - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_container_open_top() {
        let container = Container::new(Vec2::ZERO, 5.0, 7.5);
        assert!(circle_container_collisions(Vec2::new(0.0, 9.0), 0.5, &container).is_empty());
    }

    #[test]
    fn test_bounce_damps_normal_component() {
        let v = bounce_velocity(Vec2::new(1.0, -4.0), Vec2::Y, 0.25);
        assert!((v.x - 1.0).abs() < 1e-6);
        assert!((v.y - 1.0).abs() < 1e-6);
        // Already separating
        let v = bounce_velocity(Vec2::new(0.0, 2.0), Vec2::Y, 0.25);
        assert_eq!(v, Vec2::new(0.0, 2.0));
    }
}
