use crate::config::SceneConfig;
use crate::emblems::{EmblemPool, EmblemStyle};
use crate::rng::RandomSource;
use crate::stars::ParticleField;
use crate::surface::{DrawSurface, LineStyle};
use crate::viewport::{SharedViewport, ViewportSize};

/// Owns the drawing surface and paints one frame at a time in a fixed order:
/// background, ground and lanes, stars, emblems.
pub struct SceneCompositor<S: DrawSurface> {
    surface: Option<S>,
    viewport: SharedViewport,
    pending_resize: Option<ViewportSize>,
    failed: bool,
    stars: ParticleField,
    emblems: EmblemPool,
    config: SceneConfig,
}

impl<S: DrawSurface> SceneCompositor<S> {
    /// `surface` may be `None` when no drawing context could be acquired; the
    /// compositor then renders nothing.
    pub fn new(
        surface: Option<S>,
        size: ViewportSize,
        config: SceneConfig,
        mut rng: Box<dyn RandomSource>,
    ) -> Self {
        let config = config.sanitized();
        let viewport = SharedViewport::new(size);
        let stars = ParticleField::new(
            config.star_count,
            viewport.clone(),
            &mut *rng,
            config.star_color.clone(),
            config.twinkle_speed,
        );
        let emblems = EmblemPool::new(
            config.emblem_count,
            &config.glyphs,
            viewport.clone(),
            config.wrap_margin,
            EmblemStyle {
                backing_color: config.backing_color.clone(),
                backing_alpha: config.backing_alpha,
                glyph_color: config.glyph_color.clone(),
                glyph_alpha: config.glyph_alpha,
                font: config.glyph_font.clone(),
            },
            rng,
        );
        if surface.is_none() {
            log::warn!("no drawing surface; scene will not render");
        }
        let mut compositor = Self {
            surface,
            viewport,
            pending_resize: None,
            failed: false,
            stars,
            emblems,
            config,
        };
        compositor.apply_resize(size);
        compositor
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport.get()
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn stars(&self) -> &ParticleField {
        &self.stars
    }

    pub fn emblems(&self) -> &EmblemPool {
        &self.emblems
    }

    /// Stages a new viewport. It is applied at the start of the next pass,
    /// never in the middle of one.
    pub fn resize(&mut self, size: ViewportSize) {
        self.pending_resize = Some(size);
    }

    /// Runs one full pass. `&mut self` keeps the surface exclusive for the
    /// whole pass.
    pub fn render_frame(&mut self, tick: u64) {
        if let Some(size) = self.pending_resize.take() {
            self.apply_resize(size);
        }
        if self.surface.is_none() {
            return;
        }

        self.stars.update(tick);
        self.emblems.update(tick);
        let result = match self.surface.as_mut() {
            Some(surface) => paint(
                surface,
                self.viewport.get(),
                &self.config,
                &self.stars,
                &self.emblems,
            ),
            None => Ok(()),
        };

        if let Err(err) = result {
            if !self.failed {
                log::warn!("frame {tick} abandoned: {err:?}");
            }
            self.failed = true;
        } else {
            log::trace!("frame {tick} rendered");
        }
    }

    fn apply_resize(&mut self, size: ViewportSize) {
        self.viewport.set(size);
        if let Some(surface) = self.surface.as_mut() {
            if let Err(err) = surface.resize(size) {
                log::warn!("surface resize to {size:?} failed: {err:?}");
            }
        }
    }
}

fn paint<S: DrawSurface>(
    surface: &mut S,
    size: ViewportSize,
    cfg: &SceneConfig,
    stars: &ParticleField,
    emblems: &EmblemPool,
) -> Result<(), S::Error> {
    let (w, h) = (size.width(), size.height());
    surface.clear(size)?;
    surface.fill_vertical_gradient(size, &cfg.gradient_top, &cfg.gradient_bottom)?;

    let ground_y = h * cfg.ground_ratio;
    surface.stroke_line(
        (0.0, ground_y),
        (w, ground_y),
        &LineStyle {
            color: cfg.ground_color.clone(),
            width: cfg.line_width,
            dash: None,
        },
    )?;

    let lane = LineStyle {
        color: cfg.lane_color.clone(),
        width: cfg.line_width,
        dash: Some(cfg.lane_dash),
    };
    for ratio in &cfg.lane_ratios {
        let x = w * ratio;
        surface.stroke_line((x, ground_y), (x, h), &lane)?;
    }

    stars.render(surface)?;
    emblems.render(surface)
}
