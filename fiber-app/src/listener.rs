//! DOM event listeners that detach themselves.

use fiber_core::Subscription;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::EventTarget;

/// One handler registered for one or more events on a target.
///
/// Unsubscribing (or dropping) removes the handler from every event and
/// frees the JS closure.
pub struct EventListener {
    target: EventTarget,
    events: Vec<&'static str>,
    closure: Option<Closure<dyn FnMut()>>,
}

impl EventListener {
    /// Register `handler` for each of `events` on `target`.
    ///
    /// Events that fail to register are logged and skipped.
    pub fn listen(
        target: &EventTarget,
        events: &[&'static str],
        handler: impl FnMut() + 'static,
    ) -> Self {
        let closure = Closure::<dyn FnMut()>::new(handler);
        let mut registered = Vec::with_capacity(events.len());
        for &event in events {
            match target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            {
                Ok(()) => registered.push(event),
                Err(e) => tracing::warn!("Failed to listen for {event}: {e:?}"),
            }
        }
        Self {
            target: target.clone(),
            events: registered,
            closure: Some(closure),
        }
    }

    /// Whether the handler is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.closure.is_some()
    }
}

impl Subscription for EventListener {
    fn unsubscribe(&mut self) {
        let Some(closure) = self.closure.take() else {
            return;
        };
        for event in self.events.drain(..) {
            if let Err(e) = self
                .target
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            {
                tracing::warn!("Failed to remove {event} listener: {e:?}");
            }
        }
    }
}

impl Drop for EventListener {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
