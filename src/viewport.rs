use std::cell::Cell;
use std::rc::Rc;

/// Pixel dimensions of the drawing surface.
///
/// Both axes are always at least 1; degenerate reports are clamped on the way
/// in so gradient and wrap-bound math never divides by zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    width: f64,
    height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: clamp_axis(width),
            height: clamp_axis(height),
        }
    }

    pub fn width(self) -> f64 {
        self.width
    }

    pub fn height(self) -> f64 {
        self.height
    }

    /// Integer pixel size for canvas backing stores.
    pub fn pixels(self) -> (u32, u32) {
        (self.width as u32, self.height as u32)
    }
}

impl Default for ViewportSize {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

fn clamp_axis(v: f64) -> f64 {
    if v.is_finite() && v >= 1.0 {
        v
    } else {
        1.0
    }
}

/// Shared read handle to the current viewport, written by the compositor
/// between render passes and read by the entity pools.
#[derive(Debug, Clone, Default)]
pub struct SharedViewport(Rc<Cell<ViewportSize>>);

impl SharedViewport {
    pub fn new(size: ViewportSize) -> Self {
        Self(Rc::new(Cell::new(size)))
    }

    pub fn get(&self) -> ViewportSize {
        self.0.get()
    }

    pub(crate) fn set(&self, size: ViewportSize) {
        self.0.set(size);
    }
}
