use std::convert::Infallible;

use crate::viewport::ViewportSize;

/// Stroke parameters for straight lines.
#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub width: f64,
    /// `[on, off]` dash pattern; `None` draws a solid line.
    pub dash: Option<[f64; 2]>,
}

/// The 2D drawing operations a render pass issues.
///
/// This is the seam between the scene logic and whatever presents pixels: a
/// browser canvas in production, a `RecordingSurface` in tests.
pub trait DrawSurface {
    type Error: std::fmt::Debug;

    /// Resizes the backing store. Callers only do this between passes.
    fn resize(&mut self, size: ViewportSize) -> Result<(), Self::Error>;

    fn clear(&mut self, size: ViewportSize) -> Result<(), Self::Error>;
    fn fill_vertical_gradient(
        &mut self,
        size: ViewportSize,
        top: &str,
        bottom: &str,
    ) -> Result<(), Self::Error>;
    fn stroke_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        style: &LineStyle,
    ) -> Result<(), Self::Error>;
    fn fill_disc(
        &mut self,
        center: (f64, f64),
        radius: f64,
        color: &str,
        alpha: f64,
    ) -> Result<(), Self::Error>;

    fn save(&mut self) -> Result<(), Self::Error>;
    fn translate(&mut self, x: f64, y: f64) -> Result<(), Self::Error>;
    fn rotate(&mut self, radians: f64) -> Result<(), Self::Error>;
    fn restore(&mut self) -> Result<(), Self::Error>;

    fn fill_rect(
        &mut self,
        origin: (f64, f64),
        extent: (f64, f64),
        color: &str,
        alpha: f64,
    ) -> Result<(), Self::Error>;
    /// Draws `text` centered horizontally and vertically on `at`.
    fn fill_text_centered(
        &mut self,
        text: &str,
        at: (f64, f64),
        font: &str,
        color: &str,
        alpha: f64,
    ) -> Result<(), Self::Error>;
}

/// One recorded call on a `RecordingSurface`.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Resize(ViewportSize),
    Clear(ViewportSize),
    Gradient {
        size: ViewportSize,
        top: String,
        bottom: String,
    },
    Line {
        from: (f64, f64),
        to: (f64, f64),
        style: LineStyle,
    },
    Disc {
        center: (f64, f64),
        radius: f64,
        color: String,
        alpha: f64,
    },
    Save,
    Translate(f64, f64),
    Rotate(f64),
    Restore,
    Rect {
        origin: (f64, f64),
        extent: (f64, f64),
        color: String,
        alpha: f64,
    },
    Text {
        text: String,
        at: (f64, f64),
        font: String,
        color: String,
        alpha: f64,
    },
}

/// Headless surface that records every operation for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    size: ViewportSize,
    ops: Vec<DrawOp>,
}

impl RecordingSurface {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size,
            ops: Vec::new(),
        }
    }

    pub fn size(&self) -> ViewportSize {
        self.size
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn take_ops(&mut self) -> Vec<DrawOp> {
        std::mem::take(&mut self.ops)
    }
}

impl DrawSurface for RecordingSurface {
    type Error = Infallible;

    fn resize(&mut self, size: ViewportSize) -> Result<(), Self::Error> {
        self.size = size;
        self.ops.push(DrawOp::Resize(size));
        Ok(())
    }

    fn clear(&mut self, size: ViewportSize) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Clear(size));
        Ok(())
    }

    fn fill_vertical_gradient(
        &mut self,
        size: ViewportSize,
        top: &str,
        bottom: &str,
    ) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Gradient {
            size,
            top: top.to_owned(),
            bottom: bottom.to_owned(),
        });
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        style: &LineStyle,
    ) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Line {
            from,
            to,
            style: style.clone(),
        });
        Ok(())
    }

    fn fill_disc(
        &mut self,
        center: (f64, f64),
        radius: f64,
        color: &str,
        alpha: f64,
    ) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Disc {
            center,
            radius,
            color: color.to_owned(),
            alpha,
        });
        Ok(())
    }

    fn save(&mut self) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Save);
        Ok(())
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Translate(x, y));
        Ok(())
    }

    fn rotate(&mut self, radians: f64) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Rotate(radians));
        Ok(())
    }

    fn restore(&mut self) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Restore);
        Ok(())
    }

    fn fill_rect(
        &mut self,
        origin: (f64, f64),
        extent: (f64, f64),
        color: &str,
        alpha: f64,
    ) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Rect {
            origin,
            extent,
            color: color.to_owned(),
            alpha,
        });
        Ok(())
    }

    fn fill_text_centered(
        &mut self,
        text: &str,
        at: (f64, f64),
        font: &str,
        color: &str,
        alpha: f64,
    ) -> Result<(), Self::Error> {
        self.ops.push(DrawOp::Text {
            text: text.to_owned(),
            at,
            font: font.to_owned(),
            color: color.to_owned(),
            alpha,
        });
        Ok(())
    }
}
