//! Platform abstraction layer
//!
//! Handles the host-facing edges of the simulation:
//! - Pointer samples and screen-to-world mapping
//! - Frame timing (fixed-step accumulator)

pub mod input;
pub mod time;

pub use input::{PointerSample, ScreenMapping};
pub use time::FrameClock;
