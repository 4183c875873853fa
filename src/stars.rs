use std::f64::consts::TAU;

use crate::rng::RandomSource;
use crate::surface::DrawSurface;
use crate::viewport::SharedViewport;

pub const MIN_ALPHA: f64 = 0.3;

/// A fixed point of light. Position never changes after placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub phase: f64,
}

impl Star {
    /// `0.3 + 0.7·|sin(phase + tick·speed)|`, always within `[0.3, 1.0]`.
    pub fn alpha(&self, tick: u64, speed: f64) -> f64 {
        let a = MIN_ALPHA + (1.0 - MIN_ALPHA) * (self.phase + tick as f64 * speed).sin().abs();
        a.clamp(MIN_ALPHA, 1.0)
    }
}

/// Twinkling star layer.
pub struct ParticleField {
    stars: Vec<Star>,
    viewport: SharedViewport,
    color: String,
    speed: f64,
    tick: u64,
}

impl ParticleField {
    pub fn new(
        count: usize,
        viewport: SharedViewport,
        rng: &mut dyn RandomSource,
        color: impl Into<String>,
        speed: f64,
    ) -> Self {
        let size = viewport.get();
        let stars = (0..count)
            .map(|_| Star {
                x: rng.next_f64() * size.width(),
                y: rng.next_f64() * size.height(),
                radius: rng.next_f64() * 1.4 + 0.2,
                phase: rng.next_f64() * TAU,
            })
            .collect();
        Self {
            stars,
            viewport,
            color: color.into(),
            speed,
            tick: 0,
        }
    }

    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    pub fn viewport(&self) -> &SharedViewport {
        &self.viewport
    }

    /// Stars do not move; this only records the tick the next render uses.
    pub fn update(&mut self, tick: u64) {
        self.tick = tick;
    }

    pub fn alpha_of(&self, star: &Star) -> f64 {
        star.alpha(self.tick, self.speed)
    }

    pub fn render<S: DrawSurface>(&self, surface: &mut S) -> Result<(), S::Error> {
        for star in &self.stars {
            surface.fill_disc((star.x, star.y), star.radius, &self.color, self.alpha_of(star))?;
        }
        Ok(())
    }
}
