//! # Fiber Background WASM Application
//!
//! Browser binding for the fiber network background. Mounts a
//! [`CanvasHost`] on a `<canvas>` element, drives it from
//! `requestAnimationFrame` and feeds the performance monitor with frame
//! timestamps and the Battery Status API.
//!
//! ## Usage
//!
//! Build for WASM:
//! ```bash
//! wasm-pack build --target web fiber-app
//! ```
//!
//! Then import in JavaScript:
//! ```javascript
//! import init, { FiberBackground } from './pkg/fiber_app.js';
//!
//! await init();
//! const background = new FiberBackground('hero-canvas', false);
//! // on unmount
//! background.dispose();
//! ```
//!
//! The constructor never throws. If the canvas or its context is missing the
//! object stays inert and the reason is logged.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod battery;
pub mod clock;
pub mod error;
pub mod listener;
pub mod surface;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use fiber_core::{CanvasHost, EngineConfig, HostState, PerformanceMonitor, Viewport};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{BatteryManager, HtmlCanvasElement, Window};

// `Navigator::get_battery` is no longer generated by web-sys; bind
// `navigator.getBattery()` directly with the same signature.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(extends = web_sys::Navigator)]
    type BatteryNavigator;

    #[wasm_bindgen(method, catch, js_name = getBattery)]
    fn get_battery(this: &BatteryNavigator) -> Result<wasm_bindgen_futures::js_sys::Promise, JsValue>;
}

trait NavigatorBatteryExt {
    fn get_battery(&self) -> Result<wasm_bindgen_futures::js_sys::Promise, JsValue>;
}

impl NavigatorBatteryExt for web_sys::Navigator {
    fn get_battery(&self) -> Result<wasm_bindgen_futures::js_sys::Promise, JsValue> {
        self.unchecked_ref::<BatteryNavigator>().get_battery()
    }
}

pub use battery::WebBattery;
pub use clock::WebFrameClock;
pub use error::{AppError, AppResult};
pub use listener::EventListener;
pub use surface::CanvasSurface;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init_wasm() {
    console_error_panic_hook::set_once();
    tracing::info!("Fiber background WASM initialized");
}

struct Engine {
    host: CanvasHost<CanvasSurface, WebFrameClock>,
    monitor: PerformanceMonitor,
}

impl Engine {
    fn frame(&mut self, timestamp_ms: f64) {
        self.monitor.record_frame(timestamp_ms);
        self.host.tick(timestamp_ms);
    }

    fn dispose(&mut self) {
        self.host.dispose();
        self.monitor.dispose();
    }
}

type EngineHandle = Rc<RefCell<Engine>>;

/// Animated fiber network drawn behind page content.
#[wasm_bindgen]
pub struct FiberBackground {
    engine: Option<EngineHandle>,
}

#[wasm_bindgen]
impl FiberBackground {
    /// Mount on the canvas with id `canvas_id` and start animating.
    ///
    /// `config_json` is an optional `EngineConfig` document.
    #[wasm_bindgen(constructor)]
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn new(canvas_id: &str, is_mobile: bool, config_json: Option<String>) -> FiberBackground {
        match mount(canvas_id, is_mobile, config_json.as_deref()) {
            Ok(engine) => Self {
                engine: Some(engine),
            },
            Err(e) => {
                tracing::warn!("Fiber background disabled: {e}");
                Self { engine: None }
            }
        }
    }

    /// Stop the animation and release every browser resource. Safe to call
    /// more than once.
    pub fn dispose(&mut self) {
        let Some(engine) = self.engine.take() else {
            return;
        };
        match engine.try_borrow_mut() {
            Ok(mut engine) => engine.dispose(),
            Err(_) => tracing::warn!("Dispose called during a frame; resources released on drop"),
        };
    }

    /// Current quality tier (`high`, `medium` or `low`).
    #[must_use]
    pub fn tier(&self) -> String {
        self.engine
            .as_ref()
            .and_then(|e| e.try_borrow().ok().map(|e| e.monitor.tier().to_string()))
            .unwrap_or_default()
    }

    /// Frames rendered so far.
    #[wasm_bindgen(js_name = frameCount)]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.engine
            .as_ref()
            .and_then(|e| e.try_borrow().ok().map(|e| e.host.frame_count()))
            .unwrap_or(0)
    }

    /// Whether the animation is running.
    #[wasm_bindgen(js_name = isRunning)]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.engine
            .as_ref()
            .and_then(|e| e.try_borrow().ok().map(|e| e.host.state() == HostState::Running))
            .unwrap_or(false)
    }
}

impl Drop for FiberBackground {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn mount(canvas_id: &str, is_mobile: bool, config_json: Option<&str>) -> AppResult<EngineHandle> {
    let window = web_sys::window().ok_or(AppError::NoWindow)?;
    let document = window.document().ok_or(AppError::NoDocument)?;
    let canvas = document
        .get_element_by_id(canvas_id)
        .ok_or_else(|| AppError::CanvasNotFound(canvas_id.to_string()))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| AppError::NotACanvas(canvas_id.to_string()))?;

    let config = match config_json {
        Some(json) => EngineConfig::from_json(json)?,
        None => EngineConfig::default(),
    };

    let viewport = window_viewport(&window);
    canvas.set_width(viewport.width);
    canvas.set_height(viewport.height);
    let surface = CanvasSurface::from_canvas(canvas)?;

    let monitor = PerformanceMonitor::new(config.monitor);
    let host = CanvasHost::new(
        config.host,
        WebFrameClock::new(window.clone()),
        monitor.handle(),
    );
    let engine = Rc::new(RefCell::new(Engine { host, monitor }));

    let weak = Rc::downgrade(&engine);
    engine.borrow().host.clock().install(move |timestamp_ms| {
        let Some(engine) = weak.upgrade() else {
            return;
        };
        if let Ok(mut engine) = engine.try_borrow_mut() {
            engine.frame(timestamp_ms);
        };
    });

    engine.borrow_mut().host.start(Some(surface), is_mobile)?;

    let resize = resize_listener(&window, Rc::downgrade(&engine));
    engine.borrow_mut().host.attach(Box::new(resize));

    request_battery(&window, Rc::downgrade(&engine));
    tracing::debug!(canvas_id, %viewport, is_mobile, "Fiber background mounted");
    Ok(engine)
}

fn resize_listener(window: &Window, engine: Weak<RefCell<Engine>>) -> EventListener {
    let target = window.clone();
    EventListener::listen(window, &["resize"], move || {
        let Some(engine) = engine.upgrade() else {
            return;
        };
        let viewport = window_viewport(&target);
        if let Ok(mut engine) = engine.try_borrow_mut() {
            engine.host.resize(viewport);
        };
    })
}

/// Resolve `navigator.getBattery()` and hand the manager to the monitor.
///
/// Browsers without the API leave the tier at its default.
fn request_battery(window: &Window, engine: Weak<RefCell<Engine>>) {
    let promise = match window.navigator().get_battery() {
        Ok(promise) => promise,
        Err(_) => {
            tracing::debug!("Battery Status API unavailable");
            return;
        }
    };

    wasm_bindgen_futures::spawn_local(async move {
        let manager = match JsFuture::from(promise).await {
            Ok(value) => match value.dyn_into::<BatteryManager>() {
                Ok(manager) => manager,
                Err(_) => return,
            },
            Err(e) => {
                tracing::debug!("getBattery rejected: {e:?}");
                return;
            }
        };

        let Some(engine) = engine.upgrade() else {
            return;
        };
        let Ok(mut engine) = engine.try_borrow_mut() else {
            return;
        };
        // Disposal may have happened while the promise was pending.
        if engine.host.state() == HostState::Running {
            engine.monitor.attach_battery(WebBattery::new(manager));
        }
    });
}

fn window_viewport(window: &Window) -> Viewport {
    let read = |value: Result<JsValue, JsValue>| value.ok().and_then(|v| v.as_f64());
    Viewport::new(
        to_px(read(window.inner_width())),
        to_px(read(window.inner_height())),
    )
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn to_px(value: Option<f64>) -> u32 {
    match value {
        Some(v) if v.is_finite() && v > 0.0 => v.min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_px() {
        assert_eq!(to_px(Some(1024.7)), 1024);
        assert_eq!(to_px(Some(-3.0)), 0);
        assert_eq!(to_px(Some(f64::NAN)), 0);
        assert_eq!(to_px(None), 0);
    }
}
