//! Arena boundary collision detection and response
//!
//! The interesting part of the whole toy: a disc that pokes out of the arena
//! is reflected about a slightly rotated normal, which is what turns plain
//! billiard bounces into spiralling, non-repeating patterns.

use glam::Vec2;

use super::state::{Arena, Disc};
use crate::config::SimConfig;
use crate::rotate;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the arena wall (if hit)
    pub point: Vec2,
    /// Unit normal from arena center through the disc center
    pub normal: Vec2,
    /// How far the disc pokes out of the arena
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

/// A resolved bounce
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounce {
    /// The disc was free to split before this bounce
    pub fresh: bool,
    /// Perturbed normal the velocity was reflected about
    pub normal: Vec2,
    /// Speed just before reflection
    pub impact_speed: f32,
    pub penetration: f32,
}

/// Check a disc against the arena wall
///
/// A disc sitting exactly on the arena center has no normal and is reported
/// as a miss.
pub fn arena_wall_collision(pos: Vec2, radius: f32, arena: &Arena) -> CollisionResult {
    let offset = pos - arena.center();
    let distance = offset.length();

    if distance + radius > arena.radius() {
        let normal = offset.normalize_or_zero();
        if normal == Vec2::ZERO {
            return CollisionResult::miss();
        }
        return CollisionResult {
            hit: true,
            point: arena.center() + normal * arena.radius(),
            normal,
            penetration: distance + radius - arena.radius(),
        };
    }

    CollisionResult::miss()
}

/// Rotate the wall normal by `angle`
///
/// Direction is the negated sign of `velocity × normal`; a zero cross
/// product rotates clockwise.
#[inline]
pub fn perturb_normal(normal: Vec2, velocity: Vec2, angle: f32) -> Vec2 {
    let direction = -velocity.perp_dot(normal).signum();
    rotate(normal, angle * direction)
}

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Pull a disc back so it touches the wall from inside
///
/// No-op for discs already inside, and for discs too large to fit.
/// Returns true if the disc was moved.
pub fn contain(disc: &mut Disc, arena: &Arena) -> bool {
    let limit = arena.radius() - disc.radius;
    if limit < 0.0 {
        return false;
    }
    let offset = disc.pos - arena.center();
    if offset.length() <= limit {
        return false;
    }
    let direction = offset.normalize_or_zero();
    disc.pos = arena.center() + direction * limit;
    true
}

/// Detect and resolve a wall collision for one disc
///
/// On a hit the velocity is reflected about the perturbed normal and scaled
/// by `restitution`, the disc is pushed back along that normal by the
/// penetration depth (then clamped inside if the rotation left it short),
/// and the split cooldown is armed. Returns `None` when nothing was hit.
pub fn resolve_boundary(disc: &mut Disc, arena: &Arena, config: &SimConfig) -> Option<Bounce> {
    let result = arena_wall_collision(disc.pos, disc.radius, arena);
    if !result.hit {
        return None;
    }

    let normal = perturb_normal(result.normal, disc.vel, config.bounce_angle);
    let impact_speed = disc.vel.length();

    disc.vel = reflect_velocity(disc.vel, normal) * config.restitution;
    // A disc wider than the arena cannot be made to fit; leave it where it is
    if disc.radius < arena.radius() {
        disc.pos -= normal * result.penetration;
        contain(disc, arena);
    }

    let fresh = disc.cooldown.arm(config.split_cooldown_ticks);

    log::trace!(
        "Disc {} hit wall at {:?} (depth {:.3}, speed {:.3})",
        disc.id,
        result.point,
        result.penetration,
        impact_speed
    );

    Some(Bounce {
        fresh,
        normal,
        impact_speed,
        penetration: result.penetration,
    })
}
