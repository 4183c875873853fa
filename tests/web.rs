#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

use arcade_fx::styles::STYLE_ID;
use arcade_fx::{ensure_styles, BackdropHandle, TypewriterHandle};

wasm_bindgen_test_configure!(run_in_browser);

fn add_canvas(id: &str) {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document.create_element("canvas").unwrap();
    canvas.set_id(id);
    document.body().unwrap().append_child(&canvas).unwrap();
}

#[wasm_bindgen_test]
fn styles_are_injected_once() {
    ensure_styles().unwrap();
    ensure_styles().unwrap();
    let document = web_sys::window().unwrap().document().unwrap();
    let matches = document
        .query_selector_all(&format!("style#{STYLE_ID}"))
        .unwrap();
    assert_eq!(matches.length(), 1);
}

#[wasm_bindgen_test]
fn backdrop_sizes_canvas_to_window() {
    add_canvas("backdrop-test");
    let mut handle = BackdropHandle::mount("backdrop-test", None).unwrap();
    assert!(handle.running());

    let canvas = web_sys::window()
        .unwrap()
        .document()
        .unwrap()
        .get_element_by_id("backdrop-test")
        .unwrap()
        .dyn_into::<web_sys::HtmlCanvasElement>()
        .unwrap();
    assert!(canvas.width() > 0 && canvas.height() > 0);

    handle.dispose();
    handle.dispose();
    assert!(!handle.running());
}

#[wasm_bindgen_test]
fn missing_canvas_mounts_blank() {
    let mut handle = BackdropHandle::mount("no-such-canvas", None).unwrap();
    handle.dispose();
}

#[wasm_bindgen_test]
fn bad_config_is_rejected() {
    add_canvas("config-test");
    assert!(BackdropHandle::mount("config-test", Some("{\"stars\": 3}".into())).is_err());
}

#[wasm_bindgen_test]
fn empty_typewriter_text_is_done() {
    let mut typer = TypewriterHandle::new(None).unwrap();
    typer.set_text("", 22);
    assert!(typer.is_done());
    assert_eq!(typer.current_prefix(), "");
    typer.dispose();
}
