use std::cell::{Cell, RefCell};
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, CanvasRenderingContext2d, HtmlCanvasElement, Window};

use crate::backdrop::Backdrop;
use crate::compositor::SceneCompositor;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::rng::default_source;
use crate::surface::{DrawSurface, LineStyle};
use crate::timer::FrameLoop;
use crate::viewport::ViewportSize;

/// A `<canvas>` with its 2D context.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn from_canvas(canvas: HtmlCanvasElement) -> Result<Self, SceneError> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or(SceneError::ContextUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| SceneError::ContextUnavailable)?;
        Ok(Self { canvas, ctx })
    }

    pub fn by_id(window: &Window, id: &str) -> Result<Self, SceneError> {
        let document = window.document().ok_or(SceneError::NoDocument)?;
        let canvas = document
            .get_element_by_id(id)
            .ok_or_else(|| SceneError::CanvasNotFound(id.to_owned()))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| SceneError::CanvasNotFound(id.to_owned()))?;
        Self::from_canvas(canvas)
    }
}

impl DrawSurface for CanvasSurface {
    type Error = JsValue;

    fn resize(&mut self, size: ViewportSize) -> Result<(), JsValue> {
        let (w, h) = size.pixels();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        Ok(())
    }

    fn clear(&mut self, size: ViewportSize) -> Result<(), JsValue> {
        self.ctx.clear_rect(0.0, 0.0, size.width(), size.height());
        Ok(())
    }

    fn fill_vertical_gradient(
        &mut self,
        size: ViewportSize,
        top: &str,
        bottom: &str,
    ) -> Result<(), JsValue> {
        let g = self.ctx.create_linear_gradient(0.0, 0.0, 0.0, size.height());
        g.add_color_stop(0.0, top)?;
        g.add_color_stop(1.0, bottom)?;
        self.ctx.set_fill_style_canvas_gradient(&g);
        self.ctx.fill_rect(0.0, 0.0, size.width(), size.height());
        Ok(())
    }

    fn stroke_line(
        &mut self,
        from: (f64, f64),
        to: (f64, f64),
        style: &LineStyle,
    ) -> Result<(), JsValue> {
        let dash = js_sys::Array::new();
        if let Some([on, off]) = style.dash {
            dash.push(&on.into());
            dash.push(&off.into());
        }
        self.ctx.set_line_dash(&dash)?;
        self.ctx.set_stroke_style_str(&style.color);
        self.ctx.set_line_width(style.width);
        self.ctx.begin_path();
        self.ctx.move_to(from.0, from.1);
        self.ctx.line_to(to.0, to.1);
        self.ctx.stroke();
        Ok(())
    }

    fn fill_disc(
        &mut self,
        center: (f64, f64),
        radius: f64,
        color: &str,
        alpha: f64,
    ) -> Result<(), JsValue> {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_str(color);
        self.ctx.begin_path();
        self.ctx.arc(center.0, center.1, radius, 0.0, TAU)?;
        self.ctx.fill();
        self.ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn save(&mut self) -> Result<(), JsValue> {
        self.ctx.save();
        Ok(())
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.ctx.translate(x, y)
    }

    fn rotate(&mut self, radians: f64) -> Result<(), JsValue> {
        self.ctx.rotate(radians)
    }

    fn restore(&mut self) -> Result<(), JsValue> {
        self.ctx.restore();
        Ok(())
    }

    fn fill_rect(
        &mut self,
        origin: (f64, f64),
        extent: (f64, f64),
        color: &str,
        alpha: f64,
    ) -> Result<(), JsValue> {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(origin.0, origin.1, extent.0, extent.1);
        self.ctx.set_global_alpha(1.0);
        Ok(())
    }

    fn fill_text_centered(
        &mut self,
        text: &str,
        at: (f64, f64),
        font: &str,
        color: &str,
        alpha: f64,
    ) -> Result<(), JsValue> {
        self.ctx.set_global_alpha(alpha);
        self.ctx.set_fill_style_str(color);
        self.ctx.set_font(font);
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        self.ctx.fill_text(text, at.0, at.1)?;
        self.ctx.set_global_alpha(1.0);
        Ok(())
    }
}

struct LoopState {
    live: Cell<bool>,
    generation: Cell<u64>,
    in_frame: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    // `closure` holds the animation-frame closure so that it can keep calling
    // `request_animation_frame` on itself. A closure replaced or cancelled
    // while it is running is parked in `retired` until the next frame.
    closure: RefCell<Option<Closure<dyn FnMut()>>>,
    retired: RefCell<Vec<Closure<dyn FnMut()>>>,
}

impl LoopState {
    fn request(&self, window: &Window) {
        let closure = self.closure.borrow();
        let Some(closure) = closure.as_ref() else {
            return;
        };
        match window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            Ok(id) => self.raf_id.set(Some(id)),
            Err(err) => {
                log::warn!("request_animation_frame failed: {err:?}");
                self.live.set(false);
            }
        }
    }

    fn release(&self) {
        let old = self.closure.borrow_mut().take();
        if self.in_frame.get() {
            self.retired.borrow_mut().extend(old);
        }
    }
}

/// `requestAnimationFrame` loop.
pub struct AnimationFrameLoop {
    window: Window,
    state: Rc<LoopState>,
}

impl AnimationFrameLoop {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            state: Rc::new(LoopState {
                live: Cell::new(false),
                generation: Cell::new(0),
                in_frame: Cell::new(false),
                raf_id: Cell::new(None),
                closure: RefCell::new(None),
                retired: RefCell::new(Vec::new()),
            }),
        }
    }
}

impl FrameLoop for AnimationFrameLoop {
    fn begin(&mut self, mut on_frame: Box<dyn FnMut()>) {
        self.cancel();
        let generation = self.state.generation.get() + 1;
        self.state.generation.set(generation);
        let weak: Weak<LoopState> = Rc::downgrade(&self.state);
        let window = self.window.clone();
        let closure = Closure::wrap(Box::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            state.raf_id.set(None);
            // the running closure is never in `retired`
            state.retired.borrow_mut().clear();
            if !state.live.get() {
                return;
            }
            state.in_frame.set(true);
            on_frame();
            state.in_frame.set(false);
            // schedule next, unless `begin` installed a replacement meanwhile
            if state.live.get() && state.generation.get() == generation {
                state.request(&window);
            }
        }) as Box<dyn FnMut()>);
        *self.state.closure.borrow_mut() = Some(closure);
        self.state.live.set(true);
        self.state.request(&self.window);
    }

    fn cancel(&mut self) {
        self.state.live.set(false);
        if let Some(id) = self.state.raf_id.take() {
            let _ = self.window.cancel_animation_frame(id);
        }
        self.state.release();
    }
}

impl Drop for AnimationFrameLoop {
    fn drop(&mut self) {
        self.cancel();
        // Dropped from inside its own frame: the running closure cannot be
        // freed yet, so hand it to the JS GC.
        for closure in self.state.retired.borrow_mut().drain(..) {
            closure.forget();
        }
    }
}

pub(crate) fn window_viewport(window: &Window) -> ViewportSize {
    let w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    let h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(1.0);
    ViewportSize::new(w, h)
}

/// Window `resize` subscription, removed on drop.
struct ResizeListener {
    window: Window,
    closure: Closure<dyn FnMut()>,
}

impl ResizeListener {
    fn attach(
        window: &Window,
        mut on_resize: impl FnMut(ViewportSize) + 'static,
    ) -> Result<Self, JsValue> {
        let w = window.clone();
        let closure =
            Closure::wrap(Box::new(move || on_resize(window_viewport(&w))) as Box<dyn FnMut()>);
        window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
        Ok(Self {
            window: window.clone(),
            closure,
        })
    }
}

impl Drop for ResizeListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.closure.as_ref().unchecked_ref());
    }
}

type CanvasBackdrop = Backdrop<AnimationFrameLoop, CanvasSurface>;

/// Animated backdrop mounted on a page canvas.
#[wasm_bindgen]
pub struct BackdropHandle {
    backdrop: Rc<RefCell<CanvasBackdrop>>,
    listener: Option<ResizeListener>,
}

#[wasm_bindgen]
impl BackdropHandle {
    /// Mounts on the canvas with id `canvas_id`, sized to the window.
    /// `config_json` is an optional partial `SceneConfig`. A canvas that
    /// cannot be drawn on leaves the backdrop mounted but blank.
    #[wasm_bindgen(constructor)]
    pub fn mount(canvas_id: &str, config_json: Option<String>) -> Result<BackdropHandle, JsValue> {
        let config = match config_json {
            Some(json) => SceneConfig::from_json(&json)?,
            None => SceneConfig::default(),
        };
        let window = window().ok_or(SceneError::NoWindow)?;
        let size = window_viewport(&window);

        let surface = match CanvasSurface::by_id(&window, canvas_id) {
            Ok(surface) => Some(surface),
            Err(err) => {
                log::warn!("{err}; backdrop will not render");
                None
            }
        };
        let compositor = SceneCompositor::new(surface, size, config, default_source());
        let mut backdrop = Backdrop::new(AnimationFrameLoop::new(window.clone()), compositor);
        backdrop.init();
        let backdrop = Rc::new(RefCell::new(backdrop));

        let weak = Rc::downgrade(&backdrop);
        let listener = ResizeListener::attach(&window, move |size| {
            if let Some(backdrop) = weak.upgrade() {
                backdrop.borrow().resize(size);
            }
        })
        .map_err(|err| log::warn!("resize listener not attached: {err:?}"))
        .ok();

        Ok(BackdropHandle { backdrop, listener })
    }

    /// Detaches the resize listener and stops the render loop. Idempotent.
    pub fn dispose(&mut self) {
        self.listener.take();
        self.backdrop.borrow_mut().dispose();
    }

    #[wasm_bindgen(getter)]
    pub fn running(&self) -> bool {
        self.backdrop.borrow().is_running()
    }

    #[wasm_bindgen(getter)]
    pub fn frames(&self) -> f64 {
        self.backdrop.borrow().frames_rendered() as f64
    }
}
