//! Collision sounds
//!
//! Best effort only: each collision tries to grab an idle channel from a
//! fixed pool. When every channel is busy the sound is dropped on the spot.
//! Nothing is queued and nothing blocks the tick.

use std::collections::HashMap;

use crate::consts::SOUND_TICKS;
use crate::palette::Rgb;
use crate::sim::CollisionEvent;

/// Opaque handle to a pre-loaded sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SoundHandle(pub u32);

/// Playback device capability
pub trait AudioBackend {
    /// Any channel that is not currently playing
    fn idle_channel(&self) -> Option<usize>;

    /// Start `sound` on `channel`
    fn play(&mut self, channel: usize, sound: SoundHandle, volume: f32);

    /// Called once per tick after dispatch
    fn advance(&mut self) {}
}

/// Which sound a collision plays
#[derive(Debug, Clone)]
pub enum SoundSelector {
    /// Every collision plays the same sound
    Single(SoundHandle),
    /// A fixed sequence, one step per collision, wrapping at the end
    Melody { notes: Vec<SoundHandle>, cursor: usize },
    /// Keyed by the colliding disc's colour
    ByColor {
        sounds: HashMap<Rgb, SoundHandle>,
        fallback: Option<SoundHandle>,
    },
}

impl SoundSelector {
    pub fn melody(notes: Vec<SoundHandle>) -> Self {
        SoundSelector::Melody { notes, cursor: 0 }
    }

    /// Sound for the next collision
    ///
    /// The melody cursor moves on every call, so a dropped sound still uses
    /// up its note.
    pub fn select(&mut self, color: Rgb) -> Option<SoundHandle> {
        match self {
            SoundSelector::Single(sound) => Some(*sound),
            SoundSelector::Melody { notes, cursor } => {
                if notes.is_empty() {
                    return None;
                }
                let note = notes[*cursor % notes.len()];
                *cursor = (*cursor + 1) % notes.len();
                Some(note)
            }
            SoundSelector::ByColor { sounds, fallback } => {
                sounds.get(&color).copied().or(*fallback)
            }
        }
    }
}

/// Counters for one dispatch pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub played: usize,
    pub dropped: usize,
}

/// Routes collision events to an audio backend
pub struct AudioDispatcher<B: AudioBackend> {
    backend: B,
    selector: SoundSelector,
    master_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> AudioDispatcher<B> {
    pub fn new(backend: B, selector: SoundSelector) -> Self {
        Self {
            backend,
            selector,
            master_volume: 0.8,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Mute/unmute all audio
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.master_volume }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Play at most one sound per event
    pub fn dispatch(&mut self, events: &[CollisionEvent]) -> DispatchStats {
        let mut stats = DispatchStats::default();
        let volume = self.effective_volume();

        for event in events {
            let Some(sound) = self.selector.select(event.color) else {
                continue;
            };
            if volume <= 0.0 {
                continue;
            }
            match self.backend.idle_channel() {
                Some(channel) => {
                    self.backend.play(channel, sound, volume);
                    stats.played += 1;
                }
                None => {
                    log::trace!("No idle channel, dropped sound for disc {}", event.disc_id);
                    stats.dropped += 1;
                }
            }
        }

        self.backend.advance();
        stats
    }
}

/// In-memory channel pool
///
/// A channel stays busy for `sound_ticks` ticks after it is triggered.
#[derive(Debug, Clone)]
pub struct ChannelPool {
    busy: Vec<u32>,
    sound_ticks: u32,
    history: Vec<(usize, SoundHandle)>,
}

impl ChannelPool {
    pub fn new(channel_count: usize) -> Self {
        Self::with_sound_ticks(channel_count, SOUND_TICKS)
    }

    pub fn with_sound_ticks(channel_count: usize, sound_ticks: u32) -> Self {
        Self {
            busy: vec![0; channel_count],
            sound_ticks: sound_ticks.max(1),
            history: Vec::new(),
        }
    }

    pub fn channel_count(&self) -> usize {
        self.busy.len()
    }

    pub fn busy_channels(&self) -> usize {
        self.busy.iter().filter(|t| **t > 0).count()
    }

    /// Every (channel, sound) played so far
    pub fn history(&self) -> &[(usize, SoundHandle)] {
        &self.history
    }
}

impl AudioBackend for ChannelPool {
    fn idle_channel(&self) -> Option<usize> {
        self.busy.iter().position(|t| *t == 0)
    }

    fn play(&mut self, channel: usize, sound: SoundHandle, _volume: f32) {
        if let Some(slot) = self.busy.get_mut(channel) {
            *slot = self.sound_ticks;
            self.history.push((channel, sound));
        }
    }

    fn advance(&mut self) {
        for slot in &mut self.busy {
            *slot = slot.saturating_sub(1);
        }
    }
}
