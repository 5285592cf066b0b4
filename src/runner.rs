//! Fixed-rate main loop
//!
//! One iteration: poll input, tick, play sounds, draw, wait. A quit from
//! the input poll ends the loop before the next tick starts.

use std::time::{Duration, Instant};

use crate::audio::{AudioBackend, AudioDispatcher};
use crate::config::SimConfig;
use crate::render::{Control, Renderer, Trail, draw_frame};
use crate::sim::{SimState, tick};

/// Sleeps to hold a target tick rate
#[derive(Debug, Clone)]
pub struct FramePacer {
    frame: Duration,
    next: Instant,
}

impl FramePacer {
    pub fn new(tick_rate: u32) -> Self {
        let frame = Duration::from_secs_f64(1.0 / tick_rate.max(1) as f64);
        Self {
            frame,
            next: Instant::now() + frame,
        }
    }

    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Block until the next frame is due
    ///
    /// A loop that falls more than a frame behind resynchronises instead of
    /// rushing to catch up.
    pub fn wait(&mut self) {
        let now = Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
            self.next += self.frame;
        } else if now - self.next > self.frame {
            self.next = now + self.frame;
        } else {
            self.next += self.frame;
        }
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub collisions: usize,
    pub splits: usize,
    pub resets: usize,
    pub sounds_played: usize,
    pub sounds_dropped: usize,
    pub peak_population: usize,
    pub final_population: usize,
    /// The renderer asked to stop
    pub quit: bool,
}

/// Run until the renderer quits or `max_ticks` ticks have passed
pub fn run<R, B>(
    state: &mut SimState,
    config: &SimConfig,
    renderer: &mut R,
    audio: &mut AudioDispatcher<B>,
    max_ticks: Option<u64>,
    mut pacer: Option<FramePacer>,
) -> RunSummary
where
    R: Renderer + ?Sized,
    B: AudioBackend,
{
    let mut summary = RunSummary {
        peak_population: state.population(),
        ..RunSummary::default()
    };
    let mut trail = Trail::new(config.trail_length);

    log::info!(
        "Run starting: {} disc(s), limit {:?}, paced: {}",
        state.population(),
        max_ticks,
        pacer.is_some()
    );

    loop {
        if renderer.poll_input() == Control::Quit {
            summary.quit = true;
            break;
        }
        if max_ticks.is_some_and(|limit| summary.ticks >= limit) {
            break;
        }

        let report = tick(state, config);
        summary.ticks += 1;
        summary.collisions += report.events.len();
        summary.splits += report.consumed;
        summary.resets += report.resets;
        summary.peak_population = summary.peak_population.max(state.population());

        let sounds = audio.dispatch(&report.events);
        summary.sounds_played += sounds.played;
        summary.sounds_dropped += sounds.dropped;

        trail.record(state);
        draw_frame(renderer, state, &trail);

        if let Some(pacer) = pacer.as_mut() {
            pacer.wait();
        }
    }

    summary.final_population = state.population();
    log::info!(
        "Run finished after {} ticks: {} collisions, {} splits, population {} (peak {})",
        summary.ticks,
        summary.collisions,
        summary.splits,
        summary.final_population,
        summary.peak_population
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{ChannelPool, SoundHandle, SoundSelector};
    use crate::config::Preset;
    use crate::render::HeadlessRenderer;

    fn dispatcher(channels: usize) -> AudioDispatcher<ChannelPool> {
        AudioDispatcher::new(ChannelPool::new(channels), SoundSelector::Single(SoundHandle(0)))
    }

    #[test]
    fn test_tick_limit_stops_run() {
        let config = Preset::Lines.config();
        let mut state = SimState::new(&config);
        let mut renderer = HeadlessRenderer::new();
        let mut audio = dispatcher(config.channel_count);

        let summary = run(&mut state, &config, &mut renderer, &mut audio, Some(500), None);
        assert_eq!(summary.ticks, 500);
        assert_eq!(state.time_ticks, 500);
        assert_eq!(renderer.frames, 500);
        assert!(!summary.quit);
        assert!(summary.collisions > 0);
        assert_eq!(summary.sounds_played + summary.sounds_dropped, summary.collisions);
    }

    #[test]
    fn test_quit_ends_on_iteration_boundary() {
        let config = Preset::Regular.config();
        let mut state = SimState::new(&config);
        let mut renderer = HeadlessRenderer::quit_after(3);
        let mut audio = dispatcher(4);

        let summary = run(&mut state, &config, &mut renderer, &mut audio, None, None);
        assert!(summary.quit);
        assert_eq!(summary.ticks, 3);
        assert_eq!(state.time_ticks, 3);
    }

    #[test]
    fn test_splitting_run_tracks_population() {
        let config = SimConfig {
            split_cooldown_ticks: 20,
            max_population: 8,
            ..Preset::Scatter.config()
        };
        let mut state = SimState::new(&config);
        let mut renderer = HeadlessRenderer::new();
        let mut audio = dispatcher(2);

        let summary = run(&mut state, &config, &mut renderer, &mut audio, Some(3000), None);
        assert!(summary.splits > 0);
        assert!(summary.peak_population <= 8);
        assert_eq!(summary.final_population, state.population());
        assert_eq!(renderer.last_frame_discs, state.population());
    }

    #[test]
    fn test_pacer_frame_length() {
        let pacer = FramePacer::new(60);
        let micros = pacer.frame().as_micros();
        assert!((16_600..=16_700).contains(&micros));
    }
}
