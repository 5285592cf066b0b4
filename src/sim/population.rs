//! What a bounce does to the population
//!
//! Exactly one policy is active per run: discs keep their size, grow in
//! place, or split into two children.

use serde::{Deserialize, Serialize};

use super::collision::contain;
use super::state::{Arena, Cooldown, Disc};
use crate::config::SimConfig;
use crate::palette::Rgb;
use crate::{from_heading, heading};

/// Population policy, chosen once per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BouncePolicy {
    /// Bounces leave the disc unchanged
    #[default]
    Static,
    /// Every bounce multiplies the radius by `growth_factor`
    Growing,
    /// A fresh bounce replaces the disc with two children
    Splitting {
        /// Children get half the parent's radius and speed
        shrink: bool,
    },
}

/// Why a bounced disc may or may not split
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCheck {
    Ready,
    /// Radius at or below `min_split_radius`; kept as a terminal disc
    Terminal,
    /// Speed at or below `min_split_speed`
    TooSlow,
}

/// Result of growing a disc
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    Grew,
    /// Radius reached the arena radius; disc was moved back to the center
    Reset,
    /// Already wider than the arena; held at the center without growing
    Oversized,
}

/// Grow a disc after a bounce
///
/// Once the radius reaches the arena radius the disc is teleported back to
/// the arena center with its radius unchanged. A disc that has already
/// overflowed stops growing, so its radius stays finite.
pub fn grow(disc: &mut Disc, arena: &Arena, factor: f32) -> Growth {
    if disc.radius >= arena.radius() {
        disc.pos = arena.center();
        return Growth::Oversized;
    }
    disc.radius *= factor;
    if disc.radius >= arena.radius() {
        disc.pos = arena.center();
        log::info!(
            "Disc {} outgrew the arena (r={:.1}), reset to center",
            disc.id,
            disc.radius
        );
        return Growth::Reset;
    }
    contain(disc, arena);
    Growth::Grew
}

/// Whether a freshly bounced disc qualifies for a split
pub fn split_check(disc: &Disc, config: &SimConfig) -> SplitCheck {
    if disc.radius <= config.min_split_radius {
        SplitCheck::Terminal
    } else if disc.speed() <= config.min_split_speed {
        SplitCheck::TooSlow
    } else {
        SplitCheck::Ready
    }
}

/// Two children of `parent`
///
/// Both start at the parent's position, fanned out by `±split_angle` around
/// the parent's heading, and begin in a full cooldown.
pub fn split(
    parent: &Disc,
    config: &SimConfig,
    ids: [u32; 2],
    color: Rgb,
    shrink: bool,
) -> [Disc; 2] {
    let scale = if shrink { 0.5 } else { 1.0 };
    let speed = parent.speed() * scale;
    let radius = parent.radius * scale;
    let base = heading(parent.vel);

    let child = |id: u32, offset: f32| {
        let vel = from_heading(base + offset, speed);
        let mut disc = Disc::new(id, parent.pos, vel, radius, color);
        disc.cooldown = if config.split_cooldown_ticks == 0 {
            Cooldown::Free
        } else {
            Cooldown::Cooling {
                remaining: config.split_cooldown_ticks,
            }
        };
        disc
    };

    [
        child(ids[0], -config.split_angle),
        child(ids[1], config.split_angle),
    ]
}

/// Whether one more disc fits under the cap
#[inline]
pub fn has_room(population: usize, max_population: usize) -> bool {
    population < max_population
}
