//! Run configuration
//!
//! Every parameter of a run lives in one `SimConfig` record. Named presets
//! reproduce the individual bouncer and scatter toys; a JSON document can
//! override any subset of fields.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::palette::PaletteKind;
use crate::sim::{BouncePolicy, ForceMode};

/// Configuration failures
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
}

/// Initial state of one disc
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscSeed {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

/// All parameters of a single run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    // === Arena ===
    pub arena_center: Vec2,
    pub arena_radius: f32,

    // === Kinematics ===
    pub force_mode: ForceMode,
    /// Vertical acceleration per tick (screen space, +y is down)
    pub gravity: f32,
    /// Velocity multiplier per tick (1.0 = no damping)
    pub friction: f32,
    pub attractor_strength: f32,
    /// No attraction inside this distance
    pub attractor_min_distance: f32,
    /// Falloff stops beyond this distance
    pub attractor_max_distance: f32,
    /// Tangential share of the attractor pull
    pub spin_strength: f32,
    /// Treat the attractor's minimum distance as a solid core
    pub attractor_core_bounce: bool,

    // === Bounce ===
    /// Normal perturbation in radians
    pub bounce_angle: f32,
    /// Velocity scale applied after each bounce (1.0 = elastic)
    pub restitution: f32,

    // === Population ===
    pub policy: BouncePolicy,
    pub growth_factor: f32,
    pub split_cooldown_ticks: u32,
    pub min_split_speed: f32,
    pub min_split_radius: f32,
    /// Heading offset of each split child in radians
    pub split_angle: f32,
    pub max_population: usize,

    // === Presentation ===
    pub palette: PaletteKind,
    /// Recolour discs along a palette gradient each tick (fraction of a step)
    pub color_shift_speed: Option<f32>,
    pub tick_rate: u32,
    pub channel_count: usize,
    /// Trail history kept by the renderer (0 = off)
    pub trail_length: usize,

    /// Discs present at tick 0
    pub seeds: Vec<DiscSeed>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Preset::Regular.config()
    }
}

impl SimConfig {
    /// Parse a (possibly partial) JSON document over the defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if !(self.arena_radius.is_finite() && self.arena_radius > 0.0) {
            return Err(invalid("arena_radius", "must be a positive number"));
        }
        if !(self.friction > 0.0 && self.friction <= 1.0) {
            return Err(invalid("friction", "must be in (0, 1]"));
        }
        if !(self.restitution > 0.0 && self.restitution <= 1.0) {
            return Err(invalid("restitution", "must be in (0, 1]"));
        }
        if !(self.growth_factor.is_finite() && self.growth_factor >= 1.0) {
            return Err(invalid("growth_factor", "must be >= 1"));
        }
        if self.max_population == 0 {
            return Err(invalid("max_population", "must be at least 1"));
        }
        for (field, value) in [
            ("min_split_speed", self.min_split_speed),
            ("min_split_radius", self.min_split_radius),
            ("attractor_min_distance", self.attractor_min_distance),
            ("attractor_strength", self.attractor_strength),
            ("bounce_angle", self.bounce_angle),
            ("split_angle", self.split_angle),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must be finite and non-negative"));
            }
        }
        if self.attractor_max_distance < self.attractor_min_distance {
            return Err(invalid(
                "attractor_max_distance",
                format!(
                    "{} is below attractor_min_distance {}",
                    self.attractor_max_distance, self.attractor_min_distance
                ),
            ));
        }
        if self.tick_rate == 0 {
            return Err(invalid("tick_rate", "must be at least 1"));
        }
        for (i, seed) in self.seeds.iter().enumerate() {
            if !(seed.radius > 0.0) {
                return Err(invalid("seeds", format!("disc {i} has non-positive radius")));
            }
        }
        if self.seeds.len() > self.max_population {
            return Err(invalid("seeds", "more initial discs than max_population"));
        }
        Ok(())
    }
}

/// The bouncer and scatter toys, one preset each
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Single disc, plain reflection, trail
    #[default]
    Regular,
    /// Single disc that grows on every bounce
    Lines,
    /// Single disc under gravity plus a spinning attractor, damped bounces
    Marimba,
    /// Splitting discs under weak gravity
    Scatter,
    /// Splitting discs pushed toward ceiling and floor
    Midline,
    /// Splitting discs around a central black hole
    Blackhole,
    /// Splitting discs that halve in size and speed
    Shrink,
}

impl Preset {
    pub const ALL: [Preset; 7] = [
        Preset::Regular,
        Preset::Lines,
        Preset::Marimba,
        Preset::Scatter,
        Preset::Midline,
        Preset::Blackhole,
        Preset::Shrink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Preset::Regular => "regular",
            Preset::Lines => "lines",
            Preset::Marimba => "marimba",
            Preset::Scatter => "scatter",
            Preset::Midline => "midline",
            Preset::Blackhole => "blackhole",
            Preset::Shrink => "shrink",
        }
    }

    pub fn from_name(s: &str) -> Result<Self, ConfigError> {
        match s.to_lowercase().as_str() {
            "regular" => Ok(Preset::Regular),
            "lines" | "growing" => Ok(Preset::Lines),
            "marimba" => Ok(Preset::Marimba),
            "scatter" | "bottomtop" => Ok(Preset::Scatter),
            "midline" => Ok(Preset::Midline),
            "blackhole" | "black_hole" => Ok(Preset::Blackhole),
            "shrink" | "split" => Ok(Preset::Shrink),
            other => Err(ConfigError::UnknownPreset(other.to_string())),
        }
    }

    /// Build the full configuration for this preset
    pub fn config(&self) -> SimConfig {
        match self {
            Preset::Regular => SimConfig {
                gravity: 0.6,
                trail_length: 3000,
                color_shift_speed: Some(0.03),
                seeds: vec![bouncer_seed(50.0, Vec2::new(10.0, 0.0))],
                ..bouncer_base()
            },
            Preset::Lines => SimConfig {
                policy: BouncePolicy::Growing,
                color_shift_speed: Some(0.015),
                channel_count: 64,
                ..bouncer_base()
            },
            Preset::Marimba => SimConfig {
                force_mode: ForceMode::Attractor,
                // force multiplier 1000 on a disc of mass 100
                attractor_strength: 100_000.0,
                attractor_min_distance: 50.0,
                attractor_max_distance: 200.0,
                spin_strength: 0.8,
                restitution: 0.7,
                color_shift_speed: Some(0.005),
                channel_count: CHANNELS_SMALL,
                ..bouncer_base()
            },
            Preset::Scatter => scatter_base(),
            Preset::Midline => SimConfig {
                force_mode: ForceMode::Midline,
                gravity: -0.1,
                palette: PaletteKind::Pastel,
                ..scatter_base()
            },
            Preset::Blackhole => {
                let center = scatter_center();
                SimConfig {
                    force_mode: ForceMode::Attractor,
                    gravity: 0.0,
                    // strength 15 scaled by the seed radius squared
                    attractor_strength: 15.0 * 10.0 * 10.0,
                    attractor_min_distance: 50.0,
                    attractor_max_distance: 1.0e6,
                    attractor_core_bounce: true,
                    seeds: vec![DiscSeed {
                        pos: center + Vec2::new(-100.0, 50.0),
                        vel: Vec2::new(3.0, -4.0),
                        radius: 10.0,
                    }],
                    ..scatter_base()
                }
            }
            Preset::Shrink => {
                let center = scatter_center();
                SimConfig {
                    policy: BouncePolicy::Splitting { shrink: true },
                    min_split_speed: 40.0,
                    min_split_radius: 5.0,
                    seeds: vec![DiscSeed {
                        pos: center + Vec2::new(0.0, 110.0),
                        vel: Vec2::new(3.0, -4.0),
                        radius: 100.0,
                    }],
                    ..scatter_base()
                }
            }
        }
    }
}

fn bouncer_center() -> Vec2 {
    Vec2::new(BOUNCER_SCREEN.0 / 2.0, BOUNCER_SCREEN.1 / 2.0)
}

fn scatter_center() -> Vec2 {
    Vec2::new(SCATTER_SCREEN.0 / 2.0, SCATTER_SCREEN.1 / 2.0)
}

/// Disc resting against the top of the bouncer arena
fn bouncer_seed(radius: f32, vel: Vec2) -> DiscSeed {
    DiscSeed {
        pos: bouncer_center() - Vec2::new(0.0, BOUNCER_ARENA_RADIUS - radius),
        vel,
        radius,
    }
}

fn bouncer_base() -> SimConfig {
    SimConfig {
        arena_center: bouncer_center(),
        arena_radius: BOUNCER_ARENA_RADIUS,
        force_mode: ForceMode::Uniform,
        gravity: 0.4,
        friction: 1.0,
        attractor_strength: 0.0,
        attractor_min_distance: 0.0,
        attractor_max_distance: 0.0,
        spin_strength: 0.0,
        attractor_core_bounce: false,
        bounce_angle: 0.0,
        restitution: 1.0,
        policy: BouncePolicy::Static,
        growth_factor: GROWTH_FACTOR,
        split_cooldown_ticks: SPLIT_COOLDOWN_TICKS,
        min_split_speed: 0.0,
        min_split_radius: 0.0,
        split_angle: SPLIT_ANGLE,
        max_population: 1,
        palette: PaletteKind::Bouncer,
        color_shift_speed: None,
        tick_rate: TICK_RATE,
        channel_count: CHANNELS_LARGE,
        trail_length: 0,
        seeds: vec![bouncer_seed(20.0, Vec2::new(5.0, 0.2))],
    }
}

fn scatter_base() -> SimConfig {
    let center = scatter_center();
    SimConfig {
        arena_center: center,
        arena_radius: SCATTER_ARENA_RADIUS,
        force_mode: ForceMode::Uniform,
        gravity: 0.06,
        bounce_angle: BOUNCE_ANGLE,
        policy: BouncePolicy::Splitting { shrink: false },
        max_population: MAX_POPULATION,
        palette: PaletteKind::Rainbow,
        channel_count: CHANNELS_LARGE,
        seeds: vec![DiscSeed {
            pos: center + Vec2::new(0.0, 50.0),
            vel: Vec2::new(3.0, -4.0),
            radius: 10.0,
        }],
        ..bouncer_base()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_presets_validate() {
        for preset in Preset::ALL {
            let config = preset.config();
            assert!(
                config.validate().is_ok(),
                "preset {} failed validation",
                preset.as_str()
            );
        }
    }

    #[test]
    fn test_preset_names_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(Preset::from_name(preset.as_str()).ok(), Some(preset));
        }
        assert!(matches!(
            Preset::from_name("pendulum"),
            Err(ConfigError::UnknownPreset(_))
        ));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{ "gravity": 0.25, "max_population": 42 }"#)
            .expect("partial config should parse");
        assert_eq!(config.gravity, 0.25);
        assert_eq!(config.max_population, 42);
        assert_eq!(config.arena_radius, SimConfig::default().arena_radius);
    }

    #[test]
    fn test_policy_json_shape() {
        let json = r#"{ "policy": { "splitting": { "shrink": true } }, "max_population": 10 }"#;
        let config = SimConfig::from_json(json).expect("policy should parse");
        assert_eq!(config.policy, BouncePolicy::Splitting { shrink: true });
    }

    #[test]
    fn test_rejects_bad_arena() {
        let err = SimConfig::from_json(r#"{ "arena_radius": -5.0 }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "arena_radius",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_inverted_attractor_range() {
        let config = SimConfig {
            attractor_min_distance: 100.0,
            attractor_max_distance: 50.0,
            ..Preset::Marimba.config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unparseable_json() {
        assert!(matches!(
            SimConfig::from_json("{ not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
