//! Simulation state and core entity types
//!
//! Everything a tick reads or writes lives in `SimState`; the tick function
//! takes it by `&mut` and never touches globals.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::config::{DiscSeed, SimConfig};
use crate::from_heading;
use crate::palette::{GradientCycle, PaletteCycle, Rgb};

/// The fixed circular boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    center: Vec2,
    radius: f32,
}

impl Arena {
    /// `None` unless `radius` is a positive number
    pub fn new(center: Vec2, radius: f32) -> Option<Self> {
        (radius.is_finite() && radius > 0.0).then_some(Self { center, radius })
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Whether a disc lies fully inside, within `eps`
    pub fn contains(&self, pos: Vec2, radius: f32, eps: f32) -> bool {
        pos.distance(self.center) + radius <= self.radius + eps
    }
}

/// Split gating after a bounce
///
/// `Free -> [bounce] -> Cooling(peak) -> [tick]* -> Free`. Only the
/// transition out of `Free` may split a disc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cooldown {
    #[default]
    Free,
    Cooling { remaining: u32 },
}

impl Cooldown {
    /// Enter `Cooling` on a bounce. Returns true only for a fresh bounce
    /// (the disc was `Free`).
    pub fn arm(&mut self, peak: u32) -> bool {
        // Bounces during cooldown do not extend it; the counter keeps
        // running down from the bounce that armed it.
        match *self {
            Cooldown::Free => {
                *self = if peak == 0 {
                    Cooldown::Free
                } else {
                    Cooldown::Cooling { remaining: peak }
                };
                true
            }
            Cooldown::Cooling { .. } => false,
        }
    }

    /// One tick passes
    pub fn tick_down(&mut self) {
        if let Cooldown::Cooling { remaining } = *self {
            *self = if remaining <= 1 {
                Cooldown::Free
            } else {
                Cooldown::Cooling {
                    remaining: remaining - 1,
                }
            };
        }
    }

    /// Ticks left before the disc may split again
    pub fn remaining(&self) -> u32 {
        match self {
            Cooldown::Free => 0,
            Cooldown::Cooling { remaining } => *remaining,
        }
    }

    pub fn is_free(&self) -> bool {
        matches!(self, Cooldown::Free)
    }
}

/// A simulated disc
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disc {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Rgb,
    pub cooldown: Cooldown,
}

impl Disc {
    pub fn new(id: u32, pos: Vec2, vel: Vec2, radius: f32, color: Rgb) -> Self {
        Self {
            id,
            pos,
            vel,
            radius,
            color,
            cooldown: Cooldown::Free,
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimState {
    pub arena: Arena,
    /// Live discs, sorted by id
    pub discs: Vec<Disc>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Colours handed to new discs
    pub palette: PaletteCycle,
    /// Per-tick recolouring, when enabled
    pub gradient: Option<GradientCycle>,
    next_id: u32,
}

impl SimState {
    /// Build the tick-0 state described by `config.seeds`
    ///
    /// Falls back to a unit arena if the configured radius is invalid;
    /// callers are expected to have run `SimConfig::validate`.
    pub fn new(config: &SimConfig) -> Self {
        let mut state = Self::empty(config);
        for seed in &config.seeds {
            state.spawn(*seed);
        }
        log::info!(
            "Simulation ready: arena r={}, {} disc(s), policy {:?}",
            state.arena.radius(),
            state.discs.len(),
            config.policy
        );
        state
    }

    /// `count` discs at seeded random positions and headings
    ///
    /// Radii and speeds follow the first configured seed (or 10 / 5 when
    /// there is none); positions are drawn uniformly over the arena area
    /// shrunk by the disc radius.
    pub fn scattered(config: &SimConfig, count: usize, seed: u64) -> Self {
        let mut state = Self::empty(config);
        let mut rng = Pcg32::seed_from_u64(seed);
        let (radius, speed) = config
            .seeds
            .first()
            .map(|s| (s.radius, s.vel.length()))
            .unwrap_or((10.0, 5.0));
        let reach = (state.arena.radius() - radius).max(0.0);
        let count = count.min(config.max_population);

        for _ in 0..count {
            let r = reach * rng.random::<f32>().sqrt();
            let theta = rng.random_range(0.0..std::f32::consts::TAU);
            let heading = rng.random_range(0.0..std::f32::consts::TAU);
            state.spawn(DiscSeed {
                pos: state.arena.center() + from_heading(theta, r),
                vel: from_heading(heading, speed),
                radius,
            });
        }
        log::info!("Scattered {} disc(s) with seed {}", state.discs.len(), seed);
        state
    }

    fn empty(config: &SimConfig) -> Self {
        let arena = Arena::new(config.arena_center, config.arena_radius).unwrap_or_else(|| {
            log::warn!(
                "Invalid arena radius {}, using a unit arena",
                config.arena_radius
            );
            Arena {
                center: config.arena_center,
                radius: 1.0,
            }
        });
        Self {
            arena,
            discs: Vec::new(),
            time_ticks: 0,
            palette: PaletteCycle::new(config.palette),
            gradient: config
                .color_shift_speed
                .map(|speed| GradientCycle::new(config.palette, speed)),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Add a disc with the next palette colour
    pub fn spawn(&mut self, seed: DiscSeed) -> u32 {
        let id = self.next_entity_id();
        let color = self.next_color();
        self.discs
            .push(Disc::new(id, seed.pos, seed.vel, seed.radius, color));
        id
    }

    /// Advance the palette rotation
    pub fn next_color(&mut self) -> Rgb {
        self.palette.next().unwrap_or(Rgb::WHITE)
    }

    pub fn population(&self) -> usize {
        self.discs.len()
    }

    /// Ensure discs are sorted by ID for deterministic iteration
    pub fn normalize_order(&mut self) {
        self.discs.sort_by_key(|d| d.id);
    }
}
