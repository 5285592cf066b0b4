//! Per-tick kinematics
//!
//! Forces update velocity first, then velocity moves the disc
//! (semi-implicit Euler). Reordering these changes every trajectory.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Arena, Disc};
use crate::config::SimConfig;

/// Distances below this are treated as "on top of the attractor"
const ATTRACTOR_EPSILON: f32 = 1e-4;

/// External force applied to every disc
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForceMode {
    /// Discs coast
    None,
    /// Constant downward pull of `gravity`
    #[default]
    Uniform,
    /// `gravity` toward the arena's horizontal midline from both halves
    /// (negative values push toward ceiling and floor instead)
    Midline,
    /// Inverse-square pull toward the arena center with a tangential spin,
    /// plus uniform `gravity`
    Attractor,
}

/// Gravity acceleration for a disc at `pos`
pub fn gravity_accel(mode: ForceMode, pos: Vec2, arena: &Arena, gravity: f32) -> Vec2 {
    match mode {
        ForceMode::None => Vec2::ZERO,
        ForceMode::Uniform | ForceMode::Attractor => Vec2::new(0.0, gravity),
        ForceMode::Midline => {
            // Screen space: smaller y is the upper half
            if pos.y < arena.center().y {
                Vec2::new(0.0, gravity)
            } else {
                Vec2::new(0.0, -gravity)
            }
        }
    }
}

/// Black-hole pull toward `attractor`
///
/// Zero inside `attractor_min_distance`. Past `attractor_max_distance` the
/// falloff is frozen at its value there, so distant discs still feel a pull.
pub fn attractor_accel(pos: Vec2, attractor: Vec2, config: &SimConfig) -> Vec2 {
    let to_center = attractor - pos;
    let distance = to_center.length();
    if distance <= config.attractor_min_distance.max(ATTRACTOR_EPSILON) {
        return Vec2::ZERO;
    }

    let direction = to_center / distance;
    let scale = distance.min(config.attractor_max_distance);
    let magnitude = config.attractor_strength / (scale * scale);

    let radial = direction * magnitude;
    let tangential = radial.perp() * config.spin_strength;
    radial + tangential
}

/// Advance one disc by one tick
pub fn integrate(disc: &mut Disc, arena: &Arena, config: &SimConfig) {
    disc.vel += gravity_accel(config.force_mode, disc.pos, arena, config.gravity);
    if config.force_mode == ForceMode::Attractor {
        disc.vel += attractor_accel(disc.pos, arena.center(), config);
    }
    disc.vel *= config.friction;

    disc.pos += disc.vel;

    if config.force_mode == ForceMode::Attractor && config.attractor_core_bounce {
        core_bounce(disc, arena.center(), config.attractor_min_distance);
    }
}

/// Keep a disc out of the attractor core
///
/// A disc overlapping the core is pushed out to touch it and its velocity
/// is reversed. Returns true if the disc was moved.
pub fn core_bounce(disc: &mut Disc, core_center: Vec2, core_radius: f32) -> bool {
    let offset = disc.pos - core_center;
    let distance = offset.length();
    if distance - disc.radius >= core_radius {
        return false;
    }

    let outward = offset.normalize_or_zero();
    if outward == Vec2::ZERO {
        // Dead center: no direction to push along, just turn around
        disc.vel = -disc.vel;
        return true;
    }
    disc.pos = core_center + outward * (core_radius + disc.radius);
    disc.vel = -disc.vel;
    true
}
