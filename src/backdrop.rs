use std::cell::{Ref, RefCell};
use std::rc::Rc;

use crate::compositor::SceneCompositor;
use crate::scheduler::FrameScheduler;
use crate::surface::DrawSurface;
use crate::timer::FrameLoop;
use crate::viewport::ViewportSize;

/// The animated menu background: a frame scheduler driving a compositor.
///
/// `init` attaches the render loop, `dispose` tears it down. The frame
/// callback only holds a weak reference to the compositor, so nothing can
/// paint once the backdrop is gone.
pub struct Backdrop<L: FrameLoop, S: DrawSurface + 'static> {
    scheduler: FrameScheduler<L>,
    compositor: Rc<RefCell<SceneCompositor<S>>>,
    disposed: bool,
}

impl<L: FrameLoop, S: DrawSurface + 'static> Backdrop<L, S> {
    pub fn new(frames: L, compositor: SceneCompositor<S>) -> Self {
        Self {
            scheduler: FrameScheduler::new(frames),
            compositor: Rc::new(RefCell::new(compositor)),
            disposed: false,
        }
    }

    pub fn init(&mut self) {
        if self.disposed || self.scheduler.is_running() {
            return;
        }
        let compositor = Rc::downgrade(&self.compositor);
        self.scheduler.start(move |tick| {
            let Some(compositor) = compositor.upgrade() else {
                return;
            };
            let mut compositor = compositor.borrow_mut();
            if let Some(size) = tick.resized {
                compositor.resize(size);
            }
            compositor.render_frame(tick.index);
        });
        log::debug!("backdrop attached");
    }

    /// Reports a new viewport; it takes effect before the next frame.
    pub fn resize(&self, size: ViewportSize) {
        self.scheduler.on_resize(size);
    }

    /// Stops rendering for good. Idempotent.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.scheduler.stop();
        log::debug!("backdrop disposed");
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn frames_rendered(&self) -> u64 {
        self.scheduler.ticks()
    }

    pub fn compositor(&self) -> Ref<'_, SceneCompositor<S>> {
        self.compositor.borrow()
    }
}

impl<L: FrameLoop, S: DrawSurface + 'static> Drop for Backdrop<L, S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
