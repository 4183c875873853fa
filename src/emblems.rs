use std::f64::consts::TAU;

use crate::rng::RandomSource;
use crate::surface::DrawSurface;
use crate::viewport::SharedViewport;

const BACKING_W: f64 = 20.0;
const BACKING_H: f64 = 12.0;

/// A falling, spinning currency glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Emblem {
    pub x: f64,
    pub y: f64,
    pub vy: f64,
    pub rotation: f64,
    pub spin: f64,
    pub glyph: String,
}

/// How emblems are painted.
#[derive(Debug, Clone)]
pub struct EmblemStyle {
    pub backing_color: String,
    pub backing_alpha: f64,
    pub glyph_color: String,
    pub glyph_alpha: f64,
    pub font: String,
}

/// Recycling pool of falling emblems. The set is sized once; entities are
/// only ever repositioned.
pub struct EmblemPool {
    emblems: Vec<Emblem>,
    viewport: SharedViewport,
    wrap_margin: f64,
    style: EmblemStyle,
    rng: Box<dyn RandomSource>,
}

impl EmblemPool {
    pub fn new(
        count: usize,
        glyphs: &[String],
        viewport: SharedViewport,
        wrap_margin: f64,
        style: EmblemStyle,
        mut rng: Box<dyn RandomSource>,
    ) -> Self {
        let size = viewport.get();
        let emblems = if glyphs.is_empty() {
            log::warn!("emblem pool created without glyphs; pool left empty");
            Vec::new()
        } else {
            (0..count)
                .map(|_| Emblem {
                    x: rng.next_f64() * size.width(),
                    y: rng.next_f64() * size.height(),
                    vy: rng.next_f64() * 1.2 + 0.4,
                    rotation: rng.next_f64() * TAU,
                    spin: (rng.next_f64() - 0.5) * 0.03,
                    glyph: glyphs[rng.next_index(glyphs.len())].clone(),
                })
                .collect()
        };
        Self {
            emblems,
            viewport,
            wrap_margin: wrap_margin.max(1.0),
            style,
            rng,
        }
    }

    pub fn emblems(&self) -> &[Emblem] {
        &self.emblems
    }

    pub fn wrap_margin(&self) -> f64 {
        self.wrap_margin
    }

    /// Advances every emblem one step. Anything past the bottom bound is
    /// moved above the top at a fresh `x`; velocity and spin are kept.
    pub fn update(&mut self, _tick: u64) {
        let size = self.viewport.get();
        let bound = size.height() + self.wrap_margin;
        for e in &mut self.emblems {
            e.y += e.vy;
            e.rotation += e.spin;
            if e.y > bound {
                e.y = -self.wrap_margin;
                e.x = self.rng.next_f64() * size.width();
            }
        }
    }

    pub fn render<S: DrawSurface>(&self, surface: &mut S) -> Result<(), S::Error> {
        let st = &self.style;
        for e in &self.emblems {
            surface.save()?;
            surface.translate(e.x, e.y)?;
            surface.rotate(e.rotation)?;
            surface.fill_rect(
                (-BACKING_W / 2.0, -BACKING_H / 2.0),
                (BACKING_W, BACKING_H),
                &st.backing_color,
                st.backing_alpha,
            )?;
            surface.fill_text_centered(
                &e.glyph,
                (0.0, 0.0),
                &st.font,
                &st.glyph_color,
                st.glyph_alpha,
            )?;
            surface.restore()?;
        }
        Ok(())
    }
}
