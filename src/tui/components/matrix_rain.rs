//! # MatrixRain Component
//!
//! Falling glyphs behind the terminal window. One drop per column; each tick
//! every cell fades a little, each drop stamps a fresh glyph at its head and
//! moves down a row. Drops that have fallen past the bottom restart from the
//! top at random, so the columns drift out of step.
//!
//! Owns its RNG so tests can seed it.

use std::str::FromStr;

use log::warn;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier};
use ratatui::widgets::Widget;

use crate::core::config::{DEFAULT_RAIN_CHARSET, RainSettings};

/// Fraction of intensity a cell keeps per tick.
const DECAY: f32 = 0.95;
/// A drop past the bottom restarts when a uniform sample exceeds this.
const RESET_THRESHOLD: f64 = 0.975;
/// Cells dimmer than this are not drawn.
const VISIBLE_FLOOR: f32 = 0.05;
const FALLBACK_COLOR: Color = Color::Rgb(0x80, 0x00, 0x80);

#[derive(Debug, Clone, Copy, PartialEq)]
struct RainCell {
    glyph: char,
    intensity: f32,
}

impl Default for RainCell {
    fn default() -> Self {
        Self {
            glyph: ' ',
            intensity: 0.0,
        }
    }
}

pub struct MatrixRain {
    /// Head row of each column's drop.
    drops: Vec<u16>,
    /// Row-major, `width * height`.
    cells: Vec<RainCell>,
    width: u16,
    height: u16,
    charset: Vec<char>,
    color: Color,
    rng: StdRng,
}

impl MatrixRain {
    pub fn new(settings: &RainSettings, width: u16, height: u16) -> Self {
        Self::with_rng(settings, width, height, StdRng::from_entropy())
    }

    pub fn with_rng(settings: &RainSettings, width: u16, height: u16, rng: StdRng) -> Self {
        let mut charset: Vec<char> = settings.charset.chars().filter(|c| !c.is_control()).collect();
        if charset.is_empty() {
            charset = DEFAULT_RAIN_CHARSET.chars().collect();
        }

        let color = Color::from_str(&settings.color).unwrap_or_else(|_| {
            warn!("Unrecognised rain color {:?}, using default", settings.color);
            FALLBACK_COLOR
        });

        Self {
            drops: vec![0; width as usize],
            cells: vec![RainCell::default(); width as usize * height as usize],
            width,
            height,
            charset,
            color,
            rng,
        }
    }

    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    pub fn drops(&self) -> &[u16] {
        &self.drops
    }

    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Advance one frame.
    pub fn tick(&mut self) {
        for cell in &mut self.cells {
            cell.intensity *= DECAY;
        }

        for x in 0..self.width {
            let row = self.drops[x as usize];
            if row < self.height {
                let glyph = self.charset[self.rng.gen_range(0..self.charset.len())];
                let index = self.index(x, row);
                self.cells[index] = RainCell {
                    glyph,
                    intensity: 1.0,
                };
            }

            let drop = &mut self.drops[x as usize];
            if *drop >= self.height && self.rng.r#gen::<f64>() > RESET_THRESHOLD {
                *drop = 0;
            }
            *drop = drop.saturating_add(1);
        }
    }

    /// Rebuild the grid for a new size. Surviving columns keep their drops;
    /// the trail fades from scratch.
    pub fn resize(&mut self, width: u16, height: u16) {
        if (width, height) == (self.width, self.height) {
            return;
        }
        self.drops.resize(width as usize, 0);
        self.cells = vec![RainCell::default(); width as usize * height as usize];
        self.width = width;
        self.height = height;
    }

    fn shade(&self, intensity: f32) -> (Color, bool) {
        match self.color {
            Color::Rgb(r, g, b) => {
                let scale = |c: u8| (c as f32 * intensity).round() as u8;
                (Color::Rgb(scale(r), scale(g), scale(b)), false)
            }
            // Named colours can't be scaled, so dim the faint half instead
            other => (other, intensity < 0.5),
        }
    }
}

impl Widget for &MatrixRain {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let width = self.width.min(area.width);
        let height = self.height.min(area.height);
        for y in 0..height {
            for x in 0..width {
                let cell = self.cells[self.index(x, y)];
                if cell.intensity < VISIBLE_FLOOR {
                    continue;
                }
                let (color, dim) = self.shade(cell.intensity);
                if let Some(target) = buf.cell_mut((area.x + x, area.y + y)) {
                    target.set_char(cell.glyph).set_fg(color);
                    if dim {
                        target.modifier.insert(Modifier::DIM);
                    }
                }
            }
        }
    }
}
