//! Drawing capability
//!
//! The simulation never talks to a window directly. A `Renderer` gets the
//! arena outline, every disc, and a present call once per tick, and reports
//! whether the user asked to quit.

use std::collections::VecDeque;

use glam::Vec2;

use crate::palette::Rgb;
use crate::sim::{Arena, SimState};

/// Outcome of polling input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Window-side collaborator
pub trait Renderer {
    fn draw_arena(&mut self, arena: &Arena);
    fn draw_disc(&mut self, center: Vec2, radius: f32, color: Rgb);
    fn present(&mut self);
    /// Non-blocking
    fn poll_input(&mut self) -> Control;
}

/// A past disc position kept for drawing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub radius: f32,
    pub color: Rgb,
}

/// Bounded history of disc positions, oldest first
#[derive(Debug, Clone, Default)]
pub struct Trail {
    points: VecDeque<TrailPoint>,
    capacity: usize,
}

impl Trail {
    pub fn new(capacity: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(capacity.min(4096)),
            capacity,
        }
    }

    /// Record every disc of the current tick, evicting the oldest points
    pub fn record(&mut self, state: &SimState) {
        if self.capacity == 0 {
            return;
        }
        for disc in &state.discs {
            if self.points.len() == self.capacity {
                self.points.pop_front();
            }
            self.points.push_back(TrailPoint {
                pos: disc.pos,
                radius: disc.radius,
                color: disc.color,
            });
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrailPoint> {
        self.points.iter()
    }
}

/// Draw one frame: arena, trail, then live discs on top
pub fn draw_frame<R: Renderer + ?Sized>(renderer: &mut R, state: &SimState, trail: &Trail) {
    renderer.draw_arena(&state.arena);
    for point in trail.iter() {
        renderer.draw_disc(point.pos, point.radius, point.color);
    }
    for disc in &state.discs {
        renderer.draw_disc(disc.pos, disc.radius, disc.color);
    }
    renderer.present();
}

/// Renderer without a window
///
/// Counts draw calls and asks to quit after a fixed number of frames.
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    pub frames: u64,
    pub discs_drawn: u64,
    pub arenas_drawn: u64,
    /// Discs drawn in the last presented frame
    pub last_frame_discs: usize,
    pending_discs: usize,
    quit_after: Option<u64>,
}

impl HeadlessRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `Control::Quit` once `frames` frames have been presented
    pub fn quit_after(frames: u64) -> Self {
        Self {
            quit_after: Some(frames),
            ..Self::default()
        }
    }
}

impl Renderer for HeadlessRenderer {
    fn draw_arena(&mut self, _arena: &Arena) {
        self.arenas_drawn += 1;
    }

    fn draw_disc(&mut self, _center: Vec2, _radius: f32, _color: Rgb) {
        self.discs_drawn += 1;
        self.pending_discs += 1;
    }

    fn present(&mut self) {
        self.frames += 1;
        self.last_frame_discs = std::mem::take(&mut self.pending_discs);
    }

    fn poll_input(&mut self) -> Control {
        match self.quit_after {
            Some(limit) if self.frames >= limit => Control::Quit,
            _ => Control::Continue,
        }
    }
}
