//! Scheduling backends.
//!
//! Both the frame loop and the cadence timer are "fire, run to completion,
//! reschedule" sources. The browser implementations live in `wasm::render`
//! and `wasm::timer`; the manual ones here are pumped by tests and headless
//! drivers.

use std::cell::RefCell;
use std::rc::Rc;

/// A repeating per-display-refresh callback source.
pub trait FrameLoop {
    /// Starts invoking `on_frame` once per refresh. Replaces any previous
    /// callback.
    fn begin(&mut self, on_frame: Box<dyn FnMut()>);
    /// Stops the loop. Safe to call when already stopped, including from
    /// inside `on_frame`.
    fn cancel(&mut self);
}

/// A fixed-interval repeating timer.
pub trait CadenceTimer {
    /// Starts ticking every `cadence_ms`. Replaces any live schedule.
    fn start(&mut self, cadence_ms: u32, on_tick: Box<dyn FnMut()>);
    /// Cancels the live schedule if any. Safe to call redundantly, including
    /// from inside `on_tick`.
    fn cancel(&mut self);
    fn is_active(&self) -> bool;
}

struct Slot {
    generation: u64,
    active: bool,
    cadence_ms: u32,
    callback: Option<Box<dyn FnMut()>>,
}

impl Slot {
    fn new() -> Self {
        Self {
            generation: 0,
            active: false,
            cadence_ms: 0,
            callback: None,
        }
    }

    fn install(&mut self, cadence_ms: u32, callback: Box<dyn FnMut()>) {
        self.generation += 1;
        self.active = true;
        self.cadence_ms = cadence_ms;
        self.callback = Some(callback);
    }

    fn clear(&mut self) {
        self.generation += 1;
        self.active = false;
        self.callback = None;
    }
}

/// Invokes the installed callback once. The callback is taken out of the slot
/// for the duration of the call so it may cancel or replace itself.
fn fire_slot(slot: &Rc<RefCell<Slot>>) -> bool {
    let (generation, mut callback) = {
        let mut s = slot.borrow_mut();
        if !s.active {
            return false;
        }
        match s.callback.take() {
            Some(cb) => (s.generation, cb),
            None => return false,
        }
    };
    callback();
    let mut s = slot.borrow_mut();
    if s.active && s.generation == generation && s.callback.is_none() {
        s.callback = Some(callback);
    }
    true
}

/// Frame loop driven by explicit `pump` calls.
#[derive(Clone)]
pub struct ManualFrameLoop {
    slot: Rc<RefCell<Slot>>,
}

impl ManualFrameLoop {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::new())),
        }
    }

    /// Simulates one display refresh. Returns whether a frame ran.
    pub fn pump(&self) -> bool {
        fire_slot(&self.slot)
    }

    pub fn is_running(&self) -> bool {
        self.slot.borrow().active
    }
}

impl Default for ManualFrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameLoop for ManualFrameLoop {
    fn begin(&mut self, on_frame: Box<dyn FnMut()>) {
        self.slot.borrow_mut().install(0, on_frame);
    }

    fn cancel(&mut self) {
        self.slot.borrow_mut().clear();
    }
}

/// Cadence timer driven by explicit `fire` calls. Clones share one schedule,
/// so a test can keep a clone while the engine owns another.
#[derive(Clone)]
pub struct ManualTimer {
    slot: Rc<RefCell<Slot>>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self {
            slot: Rc::new(RefCell::new(Slot::new())),
        }
    }

    /// Simulates one elapsed cadence interval. Returns whether a tick ran.
    pub fn fire(&self) -> bool {
        fire_slot(&self.slot)
    }

    /// Fires until the schedule is cancelled or `limit` ticks have run.
    pub fn run_until_idle(&self, limit: usize) -> usize {
        let mut ran = 0;
        while ran < limit && self.fire() {
            ran += 1;
        }
        ran
    }

    pub fn cadence_ms(&self) -> u32 {
        self.slot.borrow().cadence_ms
    }
}

impl Default for ManualTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl CadenceTimer for ManualTimer {
    fn start(&mut self, cadence_ms: u32, on_tick: Box<dyn FnMut()>) {
        self.slot.borrow_mut().install(cadence_ms, on_tick);
    }

    fn cancel(&mut self) {
        self.slot.borrow_mut().clear();
    }

    fn is_active(&self) -> bool {
        self.slot.borrow().active
    }
}
