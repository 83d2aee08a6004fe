//! Physics provider seam
//!
//! The game consumes a rigid-body simulation through `PhysicsProvider`.
//! `BoxPhysics` is a small circles-in-a-box provider used by the headless
//! runner and the tests; a real engine plugs in behind the same trait.

use std::collections::BTreeMap;

use glam::Vec2;

use super::body::{BodyId, BodyMode};
use super::collision::{bounce_velocity, circle_circle_collision, circle_container_collisions, circles_touch};
use super::container::Container;
use crate::tuning::GameTuning;

/// A contact reported by the provider, from the point of view of `body`
///
/// Providers may report each touching pair from both sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactPair {
    pub body: BodyId,
    pub other: BodyId,
}

impl ContactPair {
    pub fn new(body: BodyId, other: BodyId) -> Self {
        Self { body, other }
    }

    /// The same contact seen from the other participant
    pub fn flipped(self) -> Self {
        Self {
            body: self.other,
            other: self.body,
        }
    }
}

/// What the game needs from a rigid-body simulation
pub trait PhysicsProvider {
    /// Register a circle body
    fn add_body(&mut self, id: BodyId, pos: Vec2, radius: f32, mass: f32, mode: BodyMode);

    /// Remove a body; unknown ids are ignored
    fn remove_body(&mut self, id: BodyId);

    /// Remove every body
    fn clear(&mut self);

    fn position(&self, id: BodyId) -> Option<Vec2>;
    fn set_position(&mut self, id: BodyId, pos: Vec2);

    fn velocity(&self, id: BodyId) -> Option<Vec2>;
    fn set_velocity(&mut self, id: BodyId, vel: Vec2);

    /// Switch between kinematic and dynamic simulation
    fn set_mode(&mut self, id: BodyId, mode: BodyMode);

    /// Advance by `dt` scaled seconds, returning contacts seen this step
    fn step(&mut self, dt: f32) -> Vec<ContactPair>;

    /// Global time scale (0 = stopped)
    fn time_scale(&self) -> f32;
    fn set_time_scale(&mut self, scale: f32);

    /// Adopt new bounds and gravity (tuning changed)
    ///
    /// Providers that own their world setup may ignore this.
    fn reconfigure(&mut self, _container: Container, _gravity: f32) {}
}

/// Tunables for the bundled provider
#[derive(Debug, Clone)]
pub struct BoxPhysicsParams {
    pub gravity: Vec2,
    /// Body-body bounciness
    pub restitution: f32,
    /// Body-wall bounciness
    pub wall_restitution: f32,
    /// Position solver passes per step
    pub iterations: u32,
    /// Distance under which resting bodies still count as touching
    pub contact_slop: f32,
}

impl Default for BoxPhysicsParams {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            restitution: 0.1,
            wall_restitution: 0.2,
            iterations: 4,
            contact_slop: 0.01,
        }
    }
}

#[derive(Debug, Clone)]
struct SimBody {
    pos: Vec2,
    vel: Vec2,
    radius: f32,
    mass: f32,
    mode: BodyMode,
}

impl SimBody {
    fn inv_mass(&self) -> f32 {
        match self.mode {
            BodyMode::Kinematic => 0.0,
            BodyMode::Dynamic => 1.0 / self.mass.max(1e-3),
        }
    }
}

/// Circles in an open box: gravity, wall containment, pairwise separation
///
/// Kinematic bodies neither move nor collide. Every touching dynamic pair is
/// reported from both sides each step, like a two-sided collision callback.
#[derive(Debug, Clone)]
pub struct BoxPhysics {
    container: Container,
    params: BoxPhysicsParams,
    bodies: BTreeMap<BodyId, SimBody>,
    time_scale: f32,
}

impl BoxPhysics {
    pub fn new(container: Container, params: BoxPhysicsParams) -> Self {
        Self {
            container,
            params,
            bodies: BTreeMap::new(),
            time_scale: 1.0,
        }
    }

    /// Provider with zero gravity (bodies stay where they are put)
    pub fn weightless(container: Container) -> Self {
        Self::new(
            container,
            BoxPhysicsParams {
                gravity: Vec2::ZERO,
                ..Default::default()
            },
        )
    }

    /// Provider for the configured container and gravity
    pub fn from_tuning(tuning: &GameTuning) -> Self {
        Self::new(
            Container::from_tuning(tuning),
            BoxPhysicsParams {
                gravity: Vec2::new(0.0, tuning.gravity),
                ..Default::default()
            },
        )
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn contains(&self, id: BodyId) -> bool {
        self.bodies.contains_key(&id)
    }

    fn integrate(&mut self, dt: f32) {
        let gravity = self.params.gravity;
        for body in self.bodies.values_mut() {
            if body.mode == BodyMode::Dynamic {
                body.vel += gravity * dt;
                body.pos += body.vel * dt;
            }
        }
    }

    fn solve_pairs(&mut self) {
        let ids: Vec<BodyId> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.mode == BodyMode::Dynamic)
            .map(|(id, _)| *id)
            .collect();

        for (i, &a_id) in ids.iter().enumerate() {
            for &b_id in &ids[i + 1..] {
                let (a, b) = (&self.bodies[&a_id], &self.bodies[&b_id]);
                let hit = circle_circle_collision(a.pos, a.radius, b.pos, b.radius);
                if !hit.hit {
                    continue;
                }
                let (inv_a, inv_b) = (a.inv_mass(), b.inv_mass());
                let inv_sum = inv_a + inv_b;
                if inv_sum <= 0.0 {
                    continue;
                }
                let rel_vel = (a.vel - b.vel).dot(hit.normal);
                let impulse = if rel_vel < 0.0 {
                    -(1.0 + self.params.restitution) * rel_vel / inv_sum
                } else {
                    0.0
                };
                let correction = hit.normal * (hit.penetration / inv_sum);

                if let Some(a) = self.bodies.get_mut(&a_id) {
                    a.pos += correction * inv_a;
                    a.vel += hit.normal * impulse * inv_a;
                }
                if let Some(b) = self.bodies.get_mut(&b_id) {
                    b.pos -= correction * inv_b;
                    b.vel -= hit.normal * impulse * inv_b;
                }
            }
        }
    }

    fn solve_walls(&mut self) {
        let restitution = self.params.wall_restitution;
        for body in self.bodies.values_mut() {
            if body.mode != BodyMode::Dynamic {
                continue;
            }
            for hit in circle_container_collisions(body.pos, body.radius, &self.container) {
                body.pos += hit.normal * hit.penetration;
                body.vel = bounce_velocity(body.vel, hit.normal, restitution);
            }
        }
    }

    fn collect_contacts(&self) -> Vec<ContactPair> {
        let dynamic: Vec<(&BodyId, &SimBody)> = self
            .bodies
            .iter()
            .filter(|(_, b)| b.mode == BodyMode::Dynamic)
            .collect();

        let mut contacts = Vec::new();
        for (i, (a_id, a)) in dynamic.iter().enumerate() {
            for (b_id, b) in &dynamic[i + 1..] {
                if circles_touch(a.pos, a.radius, b.pos, b.radius, self.params.contact_slop) {
                    let pair = ContactPair::new(**a_id, **b_id);
                    contacts.push(pair);
                    contacts.push(pair.flipped());
                }
            }
        }
        contacts
    }
}

impl PhysicsProvider for BoxPhysics {
    fn add_body(&mut self, id: BodyId, pos: Vec2, radius: f32, mass: f32, mode: BodyMode) {
        self.bodies.insert(
            id,
            SimBody {
                pos,
                vel: Vec2::ZERO,
                radius,
                mass,
                mode,
            },
        );
    }

    fn remove_body(&mut self, id: BodyId) {
        self.bodies.remove(&id);
    }

    fn clear(&mut self) {
        self.bodies.clear();
    }

    fn position(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.pos)
    }

    fn set_position(&mut self, id: BodyId, pos: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.pos = pos;
        }
    }

    fn velocity(&self, id: BodyId) -> Option<Vec2> {
        self.bodies.get(&id).map(|b| b.vel)
    }

    fn set_velocity(&mut self, id: BodyId, vel: Vec2) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.vel = vel;
        }
    }

    fn set_mode(&mut self, id: BodyId, mode: BodyMode) {
        if let Some(body) = self.bodies.get_mut(&id) {
            body.mode = mode;
            if mode == BodyMode::Kinematic {
                body.vel = Vec2::ZERO;
            }
        }
    }

    fn step(&mut self, dt: f32) -> Vec<ContactPair> {
        let dt = dt * self.time_scale;
        if dt <= 0.0 {
            return Vec::new();
        }

        self.integrate(dt);
        for _ in 0..self.params.iterations.max(1) {
            self.solve_pairs();
            self.solve_walls();
        }
        self.collect_contacts()
    }

    fn time_scale(&self) -> f32 {
        self.time_scale
    }

    fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(0.0);
    }

    fn reconfigure(&mut self, container: Container, gravity: f32) {
        self.container = container;
        self.params.gravity = Vec2::new(0.0, gravity);
    }
}
