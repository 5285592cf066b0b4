//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by disc ID)
//! - No rendering or audio dependencies

pub mod collision;
pub mod forces;
pub mod population;
pub mod state;
pub mod tick;

pub use collision::{
    Bounce, CollisionResult, arena_wall_collision, perturb_normal, reflect_velocity,
    resolve_boundary,
};
pub use forces::{ForceMode, integrate};
pub use population::{BouncePolicy, Growth, SplitCheck};
pub use state::{Arena, Cooldown, Disc, SimState};
pub use tick::{CollisionEvent, TickReport, tick};
