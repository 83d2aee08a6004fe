//! Pointer input
//!
//! The host samples its mouse/touch device once per frame into a
//! `PointerSample`; the simulation only ever sees world-space X plus edges.

use glam::Vec2;

/// One frame of pointer state
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    /// Pointer position in screen pixels (origin top-left, Y down)
    pub screen_pos: Option<Vec2>,
    /// Went down this frame
    pub pressed: bool,
    /// Went up this frame
    pub released: bool,
    /// Over a UI element rather than the playfield
    pub over_ui: bool,
}

/// Orthographic camera mapping between screen pixels and world units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenMapping {
    /// Viewport size in pixels
    pub screen_size: Vec2,
    /// World units visible vertically
    pub view_height: f32,
    /// World point at the viewport center
    pub view_center: Vec2,
}

impl ScreenMapping {
    pub fn new(screen_size: Vec2, view_height: f32, view_center: Vec2) -> Self {
        Self {
            screen_size,
            view_height,
            view_center,
        }
    }

    /// World units per pixel (0 for a degenerate viewport)
    pub fn units_per_pixel(&self) -> f32 {
        if self.screen_size.y <= 0.0 {
            0.0
        } else {
            self.view_height / self.screen_size.y
        }
    }

    /// Convert a screen position to world space
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        let scale = self.units_per_pixel();
        let offset = screen - self.screen_size / 2.0;
        // Negate Y (screen coords are flipped)
        Vec2::new(
            self.view_center.x + offset.x * scale,
            self.view_center.y - offset.y * scale,
        )
    }

    /// Convert a world position to screen space
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        let scale = self.units_per_pixel();
        if scale == 0.0 {
            return self.screen_size / 2.0;
        }
        let offset = world - self.view_center;
        Vec2::new(
            self.screen_size.x / 2.0 + offset.x / scale,
            self.screen_size.y / 2.0 - offset.y / scale,
        )
    }
}
