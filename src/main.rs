//! Bounce Arena entry point
//!
//! Runs a headless simulation chosen through the environment:
//! - `BOUNCE_PRESET`: named preset (default `regular`)
//! - `BOUNCE_TICKS`: ticks to run (default 3600)
//! - `BOUNCE_REALTIME`: pace ticks at the configured tick rate

use bounce_arena::SimConfig;
use bounce_arena::audio::{AudioDispatcher, ChannelPool, SoundHandle, SoundSelector};
use bounce_arena::config::Preset;
use bounce_arena::render::HeadlessRenderer;
use bounce_arena::runner::{FramePacer, run};
use bounce_arena::sim::SimState;

const DEFAULT_TICKS: u64 = 3600;

/// Eight-note scale the melody presets step through
const MELODY_LEN: u32 = 8;

/// Simulation parameters only ever come from a named preset
fn select_preset(name: Option<&str>) -> Preset {
    match name {
        Some(name) => Preset::from_name(name).unwrap_or_else(|e| {
            log::warn!("{}, using regular", e);
            Preset::Regular
        }),
        None => Preset::Regular,
    }
}

fn load_config() -> SimConfig {
    let name = std::env::var("BOUNCE_PRESET").ok();
    let preset = select_preset(name.as_deref());
    log::info!("Using preset {}", preset.as_str());
    preset.config()
}

fn tick_limit() -> u64 {
    match std::env::var("BOUNCE_TICKS") {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            log::warn!("Invalid BOUNCE_TICKS '{}', using {}", value, DEFAULT_TICKS);
            DEFAULT_TICKS
        }),
        Err(_) => DEFAULT_TICKS,
    }
}

fn realtime() -> bool {
    match std::env::var("BOUNCE_REALTIME") {
        Ok(value) => match value.as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" | "" => false,
            other => {
                log::warn!("Invalid BOUNCE_REALTIME '{}', ignoring", other);
                false
            }
        },
        Err(_) => false,
    }
}

fn main() {
    env_logger::init();
    log::info!("Bounce Arena starting...");

    let config = load_config();

    let mut state = SimState::new(&config);
    let selector = if config.color_shift_speed.is_some() {
        SoundSelector::melody((0..MELODY_LEN).map(SoundHandle).collect())
    } else {
        SoundSelector::Single(SoundHandle(0))
    };
    let mut audio = AudioDispatcher::new(ChannelPool::new(config.channel_count), selector);
    let mut renderer = HeadlessRenderer::new();
    let pacer = realtime().then(|| FramePacer::new(config.tick_rate));

    let summary = run(
        &mut state,
        &config,
        &mut renderer,
        &mut audio,
        Some(tick_limit()),
        pacer,
    );

    log::info!(
        "Sounds: {} played, {} dropped; {} resets",
        summary.sounds_played,
        summary.sounds_dropped,
        summary.resets
    );
}
