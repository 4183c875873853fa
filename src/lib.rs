//! Frame-synchronised scene animation and typewriter text reveal for the
//! arcade runner's menu and game-over overlays.
//!
//! The core is platform independent and runs headless against
//! `RecordingSurface`, `ManualFrameLoop` and `ManualTimer`. The browser
//! bindings (canvas, `requestAnimationFrame`, `setInterval`, console logging)
//! are compiled only for wasm32.

pub mod backdrop;
pub mod compositor;
pub mod config;
pub mod emblems;
pub mod error;
pub mod reveal;
pub mod rng;
pub mod scheduler;
pub mod stars;
pub mod styles;
pub mod surface;
pub mod timer;
pub mod viewport;

pub use backdrop::Backdrop;
pub use compositor::SceneCompositor;
pub use config::{RevealPacing, SceneConfig};
pub use emblems::{Emblem, EmblemPool};
pub use error::SceneError;
pub use reveal::{RevealEvent, RevealPhase, TextRevealEngine};
pub use scheduler::{FrameScheduler, FrameTick};
pub use stars::{ParticleField, Star};
pub use styles::StyleRegistry;
pub use viewport::ViewportSize;

// Only compile wasm-specific code when targeting wasm32.

#[cfg(target_arch = "wasm32")]
mod wasm {
    use wasm_bindgen::prelude::*;

    mod logger;
    mod render;
    mod styles;
    mod timer;

    pub use render::{BackdropHandle, CanvasSurface};
    pub use styles::{ensure_styles, DocumentStyleSheet};
    pub use timer::{IntervalTimer, TypewriterHandle};

    #[wasm_bindgen(start)]
    pub fn main() {
        #[cfg(feature = "console_error_panic_hook")]
        console_error_panic_hook::set_once();
        logger::init(log::LevelFilter::Info);
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::{
    ensure_styles, BackdropHandle, CanvasSurface, DocumentStyleSheet, IntervalTimer,
    TypewriterHandle,
};
