use std::cell::Cell;
use std::rc::Rc;

use crate::timer::FrameLoop;
use crate::viewport::ViewportSize;

/// What a frame callback receives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// 1 for the first frame, counting up across restarts.
    pub index: u64,
    /// Viewport reported since the previous frame, if any. Delivered before
    /// the frame so it can be applied between passes.
    pub resized: Option<ViewportSize>,
}

#[derive(Default)]
struct State {
    running: Cell<bool>,
    ticks: Cell<u64>,
    pending: Cell<Option<ViewportSize>>,
}

/// Drives a repeating per-frame callback off a `FrameLoop`.
pub struct FrameScheduler<L: FrameLoop> {
    frames: L,
    state: Rc<State>,
}

impl<L: FrameLoop> FrameScheduler<L> {
    pub fn new(frames: L) -> Self {
        Self {
            frames,
            state: Rc::new(State::default()),
        }
    }

    /// Starts calling `callback` every frame, replacing any running callback.
    pub fn start(&mut self, mut callback: impl FnMut(FrameTick) + 'static) {
        if self.state.running.get() {
            self.frames.cancel();
        }
        self.state.running.set(true);
        let state = self.state.clone();
        self.frames.begin(Box::new(move || {
            // A frame the backend already queued can still arrive after stop.
            if !state.running.get() {
                return;
            }
            let index = state.ticks.get() + 1;
            state.ticks.set(index);
            callback(FrameTick {
                index,
                resized: state.pending.take(),
            });
        }));
        log::debug!("frame scheduler started");
    }

    /// Cancels the callback. Redundant calls are no-ops.
    pub fn stop(&mut self) {
        if !self.state.running.replace(false) {
            return;
        }
        self.frames.cancel();
        log::debug!("frame scheduler stopped after {} frames", self.state.ticks.get());
    }

    /// Records a new viewport size to hand to the next frame. Repeated reports
    /// between frames coalesce to the latest.
    pub fn on_resize(&self, size: ViewportSize) {
        self.state.pending.set(Some(size));
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }

    pub fn ticks(&self) -> u64 {
        self.state.ticks.get()
    }
}

impl<L: FrameLoop> Drop for FrameScheduler<L> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualFrameLoop;
    use std::cell::RefCell;

    #[test]
    fn ticks_are_numbered_from_one() {
        let frames = ManualFrameLoop::new();
        let mut sched = FrameScheduler::new(frames.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        sched.start(move |t| s.borrow_mut().push(t.index));
        frames.pump();
        frames.pump();
        frames.pump();
        assert_eq!(*seen.borrow(), vec![1, 2, 3]);
        assert_eq!(sched.ticks(), 3);
    }

    #[test]
    fn double_stop_is_harmless() {
        let frames = ManualFrameLoop::new();
        let mut sched = FrameScheduler::new(frames.clone());
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        sched.start(move |_| c.set(c.get() + 1));
        frames.pump();
        sched.stop();
        sched.stop();
        assert!(!sched.is_running());
        assert!(!frames.pump());
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn resize_is_delivered_once_with_the_next_frame() {
        let frames = ManualFrameLoop::new();
        let mut sched = FrameScheduler::new(frames.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        sched.start(move |t| s.borrow_mut().push(t.resized));
        sched.on_resize(ViewportSize::new(10.0, 10.0));
        sched.on_resize(ViewportSize::new(400.0, 300.0));
        frames.pump();
        frames.pump();
        assert_eq!(
            *seen.borrow(),
            vec![Some(ViewportSize::new(400.0, 300.0)), None]
        );
    }

    #[test]
    fn dropping_the_scheduler_stops_the_loop() {
        let frames = ManualFrameLoop::new();
        {
            let mut sched = FrameScheduler::new(frames.clone());
            sched.start(|_| {});
            assert!(frames.is_running());
        }
        assert!(!frames.is_running());
    }
}
