//! Typewriter reveal: a growing prefix of a source string, one character per
//! cadence tick.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use crate::timer::CadenceTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    Revealing,
    Done,
}

/// What a reveal listener is told.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEvent<'a> {
    /// The visible prefix changed. A restart reports `Prefix("")`.
    Prefix(&'a str),
    /// The whole text is visible; sent once per text, right after its last
    /// prefix.
    Revealed,
}

#[derive(Debug)]
enum Pending {
    Prefix(String),
    Revealed,
}

impl Pending {
    fn as_event(&self) -> RevealEvent<'_> {
        match self {
            Pending::Prefix(prefix) => RevealEvent::Prefix(prefix),
            Pending::Revealed => RevealEvent::Revealed,
        }
    }
}

type Listener = Box<dyn FnMut(RevealEvent<'_>)>;

struct Inner<T> {
    source: String,
    total: usize,
    revealed: usize,
    // Byte offset of the end of the revealed prefix.
    cut: usize,
    cadence_ms: u32,
    phase: RevealPhase,
    generation: u64,
    disposed: bool,
    timer: T,
    listener: Option<Listener>,
    pending: VecDeque<Pending>,
    notifying: bool,
}

impl<T: CadenceTimer> Inner<T> {
    fn prefix(&self) -> &str {
        &self.source[..self.cut]
    }

    /// Reveals one more character and queues the resulting events. Stale
    /// ticks and ticks past the end do nothing.
    fn advance(&mut self, generation: u64) {
        if self.disposed
            || generation != self.generation
            || self.phase != RevealPhase::Revealing
        {
            return;
        }
        let Some(next) = self.source[self.cut..].chars().next() else {
            return;
        };
        self.cut += next.len_utf8();
        self.revealed += 1;
        self.queue(Pending::Prefix(self.prefix().to_owned()));
        if self.revealed == self.total {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.phase = RevealPhase::Done;
        self.timer.cancel();
        self.queue(Pending::Revealed);
        log::debug!("reveal done ({} chars)", self.total);
    }

    fn queue(&mut self, event: Pending) {
        if self.listener.is_some() || self.notifying {
            self.pending.push_back(event);
        }
    }
}

/// Cadence-driven reveal state machine.
///
/// Each instance owns its timer; at most one schedule is live at a time.
/// Dropping or disposing the engine cancels it, and a tick that still arrives
/// afterwards finds nothing to mutate.
pub struct TextRevealEngine<T: CadenceTimer + 'static> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T: CadenceTimer + 'static> TextRevealEngine<T> {
    pub fn new(timer: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                source: String::new(),
                total: 0,
                revealed: 0,
                cut: 0,
                cadence_ms: 0,
                phase: RevealPhase::Idle,
                generation: 0,
                disposed: false,
                timer,
                listener: None,
                pending: VecDeque::new(),
                notifying: false,
            })),
        }
    }

    /// Registers a callback that receives every prefix change, including the
    /// reset to `""` on restart, and a `Revealed` event once a text is fully
    /// shown.
    pub fn set_listener(&mut self, listener: impl FnMut(RevealEvent<'_>) + 'static) {
        self.inner.borrow_mut().listener = Some(Box::new(listener));
    }

    /// Replaces the source text and restarts the reveal from nothing.
    ///
    /// Supplying the text and cadence that are already active is a no-op, so
    /// callers may re-submit on every re-render.
    pub fn set_text(&mut self, text: &str, cadence_ms: u32) {
        if self.restart(text, cadence_ms) {
            notify(&self.inner);
        }
    }

    /// Resets the state for `text`. Returns whether anything changed.
    fn restart(&mut self, text: &str, cadence_ms: u32) -> bool {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            log::debug!("set_text after dispose ignored");
            return false;
        }
        if inner.phase != RevealPhase::Idle
            && inner.source == text
            && inner.cadence_ms == cadence_ms
        {
            return false;
        }

        inner.timer.cancel();
        inner.generation += 1;
        inner.source = text.to_owned();
        inner.total = text.chars().count();
        inner.revealed = 0;
        inner.cut = 0;
        inner.cadence_ms = cadence_ms;
        inner.queue(Pending::Prefix(String::new()));

        if inner.total == 0 {
            log::debug!("empty reveal resolved immediately");
            inner.finish();
            return true;
        }

        inner.phase = RevealPhase::Revealing;
        let generation = inner.generation;
        let weak = Rc::downgrade(&self.inner);
        inner
            .timer
            .start(cadence_ms.max(1), Box::new(move || on_tick(&weak, generation)));
        log::debug!("revealing {} chars every {}ms", inner.total, cadence_ms.max(1));
        true
    }

    pub fn current_prefix(&self) -> String {
        self.inner.borrow().prefix().to_owned()
    }

    pub fn is_done(&self) -> bool {
        self.inner.borrow().phase == RevealPhase::Done
    }

    pub fn phase(&self) -> RevealPhase {
        self.inner.borrow().phase
    }

    /// Number of characters revealed so far.
    pub fn revealed_len(&self) -> usize {
        self.inner.borrow().revealed
    }

    pub fn source_text(&self) -> String {
        self.inner.borrow().source.clone()
    }

    /// Whether a trailing cursor should be drawn after the prefix.
    pub fn cursor_visible(&self) -> bool {
        self.inner.borrow().phase == RevealPhase::Revealing
    }

    /// Cancels the live timer and freezes the engine. Idempotent.
    pub fn dispose(&mut self) {
        let mut inner = self.inner.borrow_mut();
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        inner.generation += 1;
        inner.timer.cancel();
        inner.listener = None;
        inner.pending.clear();
        log::debug!("reveal engine disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.borrow().disposed
    }
}

impl<T: CadenceTimer + 'static> Drop for TextRevealEngine<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn on_tick<T: CadenceTimer>(weak: &Weak<RefCell<Inner<T>>>, generation: u64) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    inner.borrow_mut().advance(generation);
    notify(&inner);
}

/// Delivers queued events in order. The listener runs without the state
/// borrowed so it may read the engine or call `set_text`; events raised from
/// inside it are delivered by the outermost call.
fn notify<T: CadenceTimer>(inner: &RefCell<Inner<T>>) {
    {
        let mut state = inner.borrow_mut();
        if state.notifying {
            return;
        }
        state.notifying = true;
    }
    loop {
        let (event, mut listener) = {
            let mut state = inner.borrow_mut();
            let next = if state.listener.is_some() {
                state.pending.pop_front()
            } else {
                None
            };
            match next {
                Some(event) => (event, state.listener.take()),
                None => {
                    state.pending.clear();
                    state.notifying = false;
                    return;
                }
            }
        };
        if let Some(listener) = listener.as_mut() {
            listener(event.as_event());
        }
        let mut state = inner.borrow_mut();
        if state.listener.is_none() && !state.disposed {
            state.listener = listener;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualTimer;

    #[test]
    fn reveals_one_char_per_tick() {
        let timer = ManualTimer::new();
        let mut engine = TextRevealEngine::new(timer.clone());
        engine.set_text("HEY", 28);
        assert_eq!(timer.cadence_ms(), 28);
        assert_eq!(engine.current_prefix(), "");
        assert!(engine.cursor_visible());

        timer.fire();
        assert_eq!(engine.current_prefix(), "H");
        assert_eq!(engine.revealed_len(), 1);
        timer.fire();
        timer.fire();
        assert_eq!(engine.current_prefix(), "HEY");
        assert!(engine.is_done());
        assert!(!engine.cursor_visible());
        assert!(!timer.is_active());
    }

    #[test]
    fn multibyte_text_is_cut_on_char_boundaries() {
        let timer = ManualTimer::new();
        let mut engine = TextRevealEngine::new(timer.clone());
        engine.set_text("₹5€", 10);
        timer.fire();
        assert_eq!(engine.current_prefix(), "₹");
        timer.fire();
        assert_eq!(engine.current_prefix(), "₹5");
        timer.fire();
        assert_eq!(engine.current_prefix(), "₹5€");
        assert!(engine.is_done());
    }

    #[test]
    fn starts_idle() {
        let engine = TextRevealEngine::new(ManualTimer::new());
        assert_eq!(engine.phase(), RevealPhase::Idle);
        assert!(!engine.is_done());
    }

    #[test]
    fn resubmitting_same_text_does_not_restart() {
        let timer = ManualTimer::new();
        let mut engine = TextRevealEngine::new(timer.clone());
        engine.set_text("ABC", 22);
        timer.fire();
        engine.set_text("ABC", 22);
        assert_eq!(engine.current_prefix(), "A");
        engine.set_text("ABC", 40);
        assert_eq!(engine.current_prefix(), "");
        assert_eq!(timer.cadence_ms(), 40);
    }

    #[test]
    fn zero_cadence_is_clamped() {
        let timer = ManualTimer::new();
        let mut engine = TextRevealEngine::new(timer.clone());
        engine.set_text("A", 0);
        assert_eq!(timer.cadence_ms(), 1);
    }

    #[test]
    fn dispose_cancels_and_freezes() {
        let timer = ManualTimer::new();
        let mut engine = TextRevealEngine::new(timer.clone());
        engine.set_text("HELLO", 22);
        timer.fire();
        engine.dispose();
        engine.dispose();
        assert!(engine.is_disposed());
        assert!(!timer.is_active());
        assert!(!timer.fire());
        engine.set_text("AGAIN", 22);
        assert_eq!(engine.current_prefix(), "H");
        assert!(!timer.is_active());
    }

    #[test]
    fn dropping_the_engine_cancels_its_timer() {
        let timer = ManualTimer::new();
        {
            let mut engine = TextRevealEngine::new(timer.clone());
            engine.set_text("HELLO", 22);
            assert!(timer.is_active());
        }
        assert!(!timer.is_active());
        assert!(!timer.fire());
    }

    #[test]
    fn listener_receives_each_prefix() {
        let timer = ManualTimer::new();
        let mut engine = TextRevealEngine::new(timer.clone());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        engine.set_listener(move |event| {
            s.borrow_mut().push(match event {
                RevealEvent::Prefix(p) => p.to_owned(),
                RevealEvent::Revealed => "<revealed>".to_owned(),
            })
        });
        engine.set_text("OK", 5);
        timer.run_until_idle(10);
        assert_eq!(*seen.borrow(), ["", "O", "OK", "<revealed>"]);
        assert_eq!(engine.source_text(), "OK");
    }
}
