//! Display colours for discs
//!
//! Colours carry no physical meaning. Discs take the next colour from a
//! rotating palette when they are created or split.

use serde::{Deserialize, Serialize};

/// An 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Linear blend toward `other` (`t` clamped to 0..=1)
    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

/// Named palettes used by the presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteKind {
    #[default]
    Rainbow,
    Pastel,
    /// Four-colour set of the single-disc bouncers
    Bouncer,
}

impl PaletteKind {
    pub fn colors(self) -> &'static [Rgb] {
        match self {
            PaletteKind::Rainbow => &RAINBOW,
            PaletteKind::Pastel => &PASTEL,
            PaletteKind::Bouncer => &BOUNCER,
        }
    }
}

const RAINBOW: [Rgb; 7] = [
    Rgb(255, 0, 0),
    Rgb(255, 127, 0),
    Rgb(255, 255, 0),
    Rgb(0, 255, 0),
    Rgb(0, 0, 255),
    Rgb(75, 0, 130),
    Rgb(143, 0, 255),
];

const PASTEL: [Rgb; 7] = [
    Rgb(255, 105, 180),
    Rgb(255, 179, 71),
    Rgb(255, 223, 186),
    Rgb(162, 211, 156),
    Rgb(130, 177, 255),
    Rgb(159, 122, 234),
    Rgb(234, 134, 133),
];

const BOUNCER: [Rgb; 4] = [
    Rgb(255, 0, 0),
    Rgb(0, 0, 255),
    Rgb(255, 0, 255),
    Rgb(255, 165, 0),
];

/// Infinite, restartable rotation through a palette
///
/// Serialises as `(kind, cursor)` so a snapshot resumes at the same colour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteCycle {
    kind: PaletteKind,
    cursor: usize,
}

impl PaletteCycle {
    pub fn new(kind: PaletteKind) -> Self {
        Self { kind, cursor: 0 }
    }

    /// Colour the next call to `next` will yield
    pub fn peek(&self) -> Rgb {
        let colors = self.kind.colors();
        colors[self.cursor % colors.len()]
    }

    /// Back to the first colour
    pub fn restart(&mut self) {
        self.cursor = 0;
    }

    pub fn kind(&self) -> PaletteKind {
        self.kind
    }
}

impl Iterator for PaletteCycle {
    type Item = Rgb;

    fn next(&mut self) -> Option<Rgb> {
        let color = self.peek();
        self.cursor = (self.cursor + 1) % self.kind.colors().len();
        Some(color)
    }
}

/// Smoothly interpolated walk around a palette
///
/// Advances by `speed` of a palette step per call, blending between
/// neighbouring colours.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientCycle {
    kind: PaletteKind,
    index: usize,
    t: f32,
    speed: f32,
}

impl GradientCycle {
    pub fn new(kind: PaletteKind, speed: f32) -> Self {
        Self {
            kind,
            index: 0,
            t: 0.0,
            speed: speed.clamp(0.0, 1.0),
        }
    }

    /// Current blended colour
    pub fn current(&self) -> Rgb {
        let colors = self.kind.colors();
        let from = colors[self.index % colors.len()];
        let to = colors[(self.index + 1) % colors.len()];
        from.lerp(to, self.t)
    }

    /// Step forward and return the new colour
    pub fn advance(&mut self) -> Rgb {
        self.t += self.speed;
        if self.t >= 1.0 {
            self.t -= 1.0;
            self.index = (self.index + 1) % self.kind.colors().len();
        }
        self.current()
    }
}
