//! One-time registration of the overlay's keyframe animations.
//!
//! The global registry is append-only: once the stylesheet is in, it stays
//! for the life of the process.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

pub const STYLE_ID: &str = "__death_quip_styles__";

pub const KEYFRAMES_CSS: &str = r#"
@keyframes dq-slide-in {
  from { transform: translateY(-110%); opacity: 0; }
  to   { transform: translateY(0);     opacity: 1; }
}
@keyframes dq-blink {
  0%,100% { opacity: 1; }
  50%      { opacity: 0; }
}
@keyframes dq-shake {
  0%,100% { transform: translateX(0); }
  20%      { transform: translateX(-4px); }
  40%      { transform: translateX(4px); }
  60%      { transform: translateX(-3px); }
  80%      { transform: translateX(3px); }
}
@keyframes dq-countdown {
  from { width: 100%; }
  to   { width: 0%; }
}
.dq-blink  { animation: dq-blink  0.8s step-end infinite; }
.dq-shake  { animation: dq-shake  0.4s ease; }
"#;

/// Somewhere style definitions can be inserted, keyed by id.
pub trait StyleSheet {
    fn contains(&self, id: &str) -> bool;
    fn insert(&mut self, id: &str, css: &str);
}

/// In-memory sheet for headless use and tests.
#[derive(Debug, Default)]
pub struct MemoryStyleSheet {
    entries: BTreeMap<String, String>,
    inserts: usize,
}

impl MemoryStyleSheet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total insert calls, including ones that overwrote an id.
    pub fn insert_count(&self) -> usize {
        self.inserts
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }
}

impl StyleSheet for MemoryStyleSheet {
    fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    fn insert(&mut self, id: &str, css: &str) {
        self.inserts += 1;
        self.entries.insert(id.to_owned(), css.to_owned());
    }
}

/// Set-once guard around inserting `KEYFRAMES_CSS`.
#[derive(Debug, Default)]
pub struct StyleRegistry {
    registered: AtomicBool,
}

static GLOBAL: StyleRegistry = StyleRegistry::new();

impl StyleRegistry {
    pub const fn new() -> Self {
        Self {
            registered: AtomicBool::new(false),
        }
    }

    /// The process-wide registry.
    pub fn global() -> &'static StyleRegistry {
        &GLOBAL
    }

    /// Inserts the keyframes into `sheet` the first time it is called; every
    /// later call is a no-op. Returns whether this call did the insert.
    ///
    /// The compare-exchange makes check-then-insert atomic, so two callers
    /// racing on separate threads still register once.
    pub fn ensure_registered(&self, sheet: &mut dyn StyleSheet) -> bool {
        if self
            .registered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return false;
        }
        if sheet.contains(STYLE_ID) {
            log::debug!("styles `{STYLE_ID}` already present");
            return false;
        }
        sheet.insert(STYLE_ID, KEYFRAMES_CSS);
        log::debug!("styles `{STYLE_ID}` registered");
        true
    }

    pub fn is_registered(&self) -> bool {
        self.registered.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registers_exactly_once() {
        let registry = StyleRegistry::new();
        let mut sheet = MemoryStyleSheet::default();
        assert!(sheet.is_empty());
        assert!(registry.ensure_registered(&mut sheet));
        assert!(!sheet.is_empty());
        for _ in 0..50 {
            assert!(!registry.ensure_registered(&mut sheet));
        }
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.insert_count(), 1);
        assert!(registry.is_registered());
    }

    #[test]
    fn existing_sheet_entry_is_respected() {
        let registry = StyleRegistry::new();
        let mut sheet = MemoryStyleSheet::default();
        sheet.insert(STYLE_ID, "/* injected elsewhere */");
        assert!(!registry.ensure_registered(&mut sheet));
        assert_eq!(sheet.insert_count(), 1);
        assert_eq!(sheet.get(STYLE_ID), Some("/* injected elsewhere */"));
    }

    #[test]
    fn keyframes_cover_overlay_animations() {
        for name in ["dq-slide-in", "dq-blink", "dq-shake", "dq-countdown"] {
            assert!(KEYFRAMES_CSS.contains(&format!("@keyframes {name}")));
        }
    }

    #[test]
    fn concurrent_callers_register_once() {
        use std::sync::{Arc, Mutex};
        let registry = Arc::new(StyleRegistry::new());
        let sheet = Arc::new(Mutex::new(MemoryStyleSheet::default()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let sheet = sheet.clone();
                std::thread::spawn(move || {
                    let mut guard = sheet.lock().unwrap();
                    registry.ensure_registered(&mut *guard)
                })
            })
            .collect();
        let wins = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();
        assert_eq!(wins, 1);
        assert_eq!(sheet.lock().unwrap().insert_count(), 1);
    }
}
