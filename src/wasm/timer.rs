use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{window, Window};

use crate::config::RevealPacing;
use crate::error::SceneError;
use crate::reveal::{RevealEvent, TextRevealEngine};
use crate::timer::CadenceTimer;

struct IntervalState {
    in_tick: Cell<bool>,
    // Closures cancelled from inside their own tick are parked here until
    // the next tick or drop.
    retired: RefCell<Vec<Closure<dyn FnMut()>>>,
}

/// `setInterval` timer.
pub struct IntervalTimer {
    window: Window,
    handle: Option<i32>,
    closure: Option<Closure<dyn FnMut()>>,
    state: Rc<IntervalState>,
}

impl IntervalTimer {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            handle: None,
            closure: None,
            state: Rc::new(IntervalState {
                in_tick: Cell::new(false),
                retired: RefCell::new(Vec::new()),
            }),
        }
    }
}

impl CadenceTimer for IntervalTimer {
    fn start(&mut self, cadence_ms: u32, mut on_tick: Box<dyn FnMut()>) {
        self.cancel();
        if !self.state.in_tick.get() {
            self.state.retired.borrow_mut().clear();
        }
        let state = Rc::downgrade(&self.state);
        let closure = Closure::wrap(Box::new(move || {
            let Some(state) = state.upgrade() else {
                return;
            };
            state.retired.borrow_mut().clear();
            state.in_tick.set(true);
            on_tick();
            state.in_tick.set(false);
        }) as Box<dyn FnMut()>);
        let timeout = cadence_ms.min(i32::MAX as u32) as i32;
        match self.window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            timeout,
        ) {
            Ok(id) => {
                self.handle = Some(id);
                self.closure = Some(closure);
            }
            Err(err) => log::warn!("set_interval failed: {err:?}"),
        }
    }

    fn cancel(&mut self) {
        if let Some(id) = self.handle.take() {
            self.window.clear_interval_with_handle(id);
        }
        if let Some(closure) = self.closure.take() {
            if self.state.in_tick.get() {
                self.state.retired.borrow_mut().push(closure);
            }
        }
    }

    fn is_active(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.cancel();
        for closure in self.state.retired.borrow_mut().drain(..) {
            closure.forget();
        }
    }
}

/// Typewriter reveal for page overlays.
///
/// `on_change`, when given, is called as `on_change(prefix, false)` for every
/// prefix change (a restart reports `""`) and as `on_change(undefined, true)`
/// once the text is fully revealed.
#[wasm_bindgen]
pub struct TypewriterHandle {
    engine: TextRevealEngine<IntervalTimer>,
}

#[wasm_bindgen]
impl TypewriterHandle {
    #[wasm_bindgen(constructor)]
    pub fn new(on_change: Option<js_sys::Function>) -> Result<TypewriterHandle, JsValue> {
        let window = window().ok_or(SceneError::NoWindow)?;
        let mut engine = TextRevealEngine::new(IntervalTimer::new(window));
        if let Some(callback) = on_change {
            engine.set_listener(move |event| {
                let (prefix, revealed) = match event {
                    RevealEvent::Prefix(prefix) => (JsValue::from_str(prefix), JsValue::FALSE),
                    RevealEvent::Revealed => (JsValue::UNDEFINED, JsValue::TRUE),
                };
                if let Err(err) = callback.call2(&JsValue::NULL, &prefix, &revealed) {
                    log::warn!("reveal listener threw: {err:?}");
                }
            });
        }
        Ok(TypewriterHandle { engine })
    }

    #[wasm_bindgen(js_name = setText)]
    pub fn set_text(&mut self, text: &str, cadence_ms: u32) {
        self.engine.set_text(text, cadence_ms);
    }

    #[wasm_bindgen(js_name = currentPrefix)]
    pub fn current_prefix(&self) -> String {
        self.engine.current_prefix()
    }

    #[wasm_bindgen(js_name = isDone)]
    pub fn is_done(&self) -> bool {
        self.engine.is_done()
    }

    #[wasm_bindgen(js_name = cursorVisible)]
    pub fn cursor_visible(&self) -> bool {
        self.engine.cursor_visible()
    }

    pub fn dispose(&mut self) {
        self.engine.dispose();
    }
}

/// Default reveal pacing as JSON, for overlays that own the countdown.
#[wasm_bindgen(js_name = revealPacing)]
pub fn reveal_pacing() -> String {
    serde_json::to_string(&RevealPacing::default()).unwrap_or_default()
}

/// CSS animation shorthand for the countdown bar of the given pacing
/// (defaults when omitted).
#[wasm_bindgen(js_name = countdownAnimation)]
pub fn countdown_animation(pacing_json: Option<String>) -> Result<String, JsValue> {
    let pacing = match pacing_json {
        Some(json) => RevealPacing::from_json(&json)?,
        None => RevealPacing::default(),
    };
    Ok(pacing.countdown_animation())
}
