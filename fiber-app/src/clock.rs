//! `requestAnimationFrame` implementation of [`FrameClock`].

use std::cell::RefCell;
use std::rc::Rc;

use fiber_core::{FrameClock, FrameRequest};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::Window;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Schedules the installed callback on the browser's next repaint.
///
/// The callback receives the `DOMHighResTimeStamp` of the frame.
pub struct WebFrameClock {
    window: Window,
    callback: FrameCallback,
}

impl WebFrameClock {
    /// Create a clock with no callback installed.
    #[must_use]
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: Rc::new(RefCell::new(None)),
        }
    }

    /// Set the per-frame callback, replacing any previous one.
    pub fn install(&self, callback: impl FnMut(f64) + 'static) {
        *self.callback.borrow_mut() = Some(Closure::<dyn FnMut(f64)>::new(callback));
    }

    /// Whether a callback is installed.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.callback.borrow().is_some()
    }
}

impl FrameClock for WebFrameClock {
    fn request_frame(&mut self) -> Option<FrameRequest> {
        let slot = self.callback.borrow();
        let closure = slot.as_ref()?;
        match self
            .window
            .request_animation_frame(closure.as_ref().unchecked_ref())
        {
            Ok(id) => u64::try_from(id).ok().map(FrameRequest::new),
            Err(e) => {
                tracing::warn!("requestAnimationFrame failed: {e:?}");
                None
            }
        }
    }

    fn cancel_frame(&mut self, request: FrameRequest) {
        let Ok(id) = i32::try_from(request.raw()) else {
            return;
        };
        if let Err(e) = self.window.cancel_animation_frame(id) {
            tracing::warn!("cancelAnimationFrame failed: {e:?}");
        }
    }

    fn release(&mut self) {
        self.callback.borrow_mut().take();
    }
}
