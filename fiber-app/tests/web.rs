//! Browser tests for the WASM binding.
//!
//! Run with `wasm-pack test --headless --chrome fiber-app`.

#![cfg(target_arch = "wasm32")]

use fiber_app::FiberBackground;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::HtmlCanvasElement;

wasm_bindgen_test_configure!(run_in_browser);

fn add_canvas(id: &str) -> HtmlCanvasElement {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .expect("document");
    let canvas = document
        .create_element("canvas")
        .expect("create")
        .dyn_into::<HtmlCanvasElement>()
        .expect("canvas");
    canvas.set_id(id);
    document.body().expect("body").append_child(&canvas).expect("append");
    canvas
}

#[wasm_bindgen_test]
fn test_missing_canvas_is_inert() {
    let mut background = FiberBackground::new("no-such-canvas", false, None);
    assert!(!background.is_running());
    assert_eq!(background.frame_count(), 0);
    assert_eq!(background.tier(), "");
    background.dispose();
}

#[wasm_bindgen_test]
fn test_mount_and_dispose() {
    let canvas = add_canvas("fiber-test-canvas");
    let mut background = FiberBackground::new("fiber-test-canvas", false, None);
    assert!(background.is_running());
    assert_eq!(background.tier(), "high");

    background.dispose();
    assert!(!background.is_running());
    background.dispose();
    canvas.remove();
}

#[wasm_bindgen_test]
fn test_bad_config_is_inert() {
    let canvas = add_canvas("fiber-bad-config");
    let background =
        FiberBackground::new("fiber-bad-config", true, Some("{\"host\": 5}".to_string()));
    assert!(!background.is_running());
    canvas.remove();
}
