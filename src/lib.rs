//! Bounce Arena - discs bouncing inside a circular arena
//!
//! Core modules:
//! - `sim`: Deterministic simulation (kinematics, boundary collisions, splitting)
//! - `palette`: Colour palettes and rotating palette cycles
//! - `audio`: Best-effort collision sound dispatch over a fixed channel pool
//! - `render`: Renderer capability and headless implementation
//! - `runner`: Fixed-rate loop tying simulation, audio and rendering together
//! - `config`: Run configuration record and named presets

pub mod audio;
pub mod config;
pub mod palette;
pub mod render;
pub mod runner;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use palette::{PaletteCycle, Rgb};
pub use sim::{SimState, TickReport, tick};

use glam::Vec2;

/// Simulation constants shared by the presets
pub mod consts {
    /// Target tick rate (ticks per second)
    pub const TICK_RATE: u32 = 60;

    /// Default normal perturbation applied on every bounce (15 degrees)
    pub const BOUNCE_ANGLE: f32 = std::f32::consts::PI / 12.0;
    /// Heading offset of split children (2 degrees)
    pub const SPLIT_ANGLE: f32 = std::f32::consts::PI / 90.0;

    /// Ticks a disc must wait after a bounce before it may split again
    pub const SPLIT_COOLDOWN_TICKS: u32 = 1000;
    /// Population cap for the splitting variants
    pub const MAX_POPULATION: usize = 10_000;

    /// Radius growth per bounce for the growing variant
    pub const GROWTH_FACTOR: f32 = 1.05;

    /// Audio pool sizes
    pub const CHANNELS_SMALL: usize = 16;
    pub const CHANNELS_LARGE: usize = 128;
    /// Ticks a triggered sound keeps its channel busy
    pub const SOUND_TICKS: u32 = 30;

    /// Window geometry the circle-bouncer presets were tuned for
    pub const BOUNCER_SCREEN: (f32, f32) = (1500.0, 1300.0);
    pub const BOUNCER_ARENA_RADIUS: f32 = 550.0;

    /// Window geometry the scatter presets were tuned for
    pub const SCATTER_SCREEN: (f32, f32) = (2000.0, 1200.0);
    /// 1200 // 2.2, floored
    pub const SCATTER_ARENA_RADIUS: f32 = 545.0;
}

/// Rotate a unit vector by `angle` radians (counter-clockwise in a y-up frame)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Heading of a vector in radians
#[inline]
pub fn heading(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Vector with the given heading and magnitude
#[inline]
pub fn from_heading(angle: f32, magnitude: f32) -> Vec2 {
    Vec2::new(magnitude * angle.cos(), magnitude * angle.sin())
}

/// Smallest signed difference between two angles, in [-π, π)
#[inline]
pub fn angle_delta(a: f32, b: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    let d = (a - b).rem_euclid(TAU);
    if d >= PI { d - TAU } else { d }
}
