//! Browser smoke tests, run with `wasm-pack test --headless --firefox`

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::HtmlCanvasElement;
use vine_lattice::VineGarden;

wasm_bindgen_test_configure!(run_in_browser);

fn canvas(width: u32, height: u32) -> HtmlCanvasElement {
    let document = web_sys::window().unwrap().document().unwrap();
    let canvas = document
        .create_element("canvas")
        .unwrap()
        .dyn_into::<HtmlCanvasElement>()
        .unwrap();
    canvas.set_width(width);
    canvas.set_height(height);
    canvas
}

#[wasm_bindgen_test]
fn manual_struts_cap_at_five() {
    let mut garden = VineGarden::new(canvas(800, 600)).unwrap();
    assert_eq!(garden.stage(), "initial");

    for expected in 1..=5 {
        assert_eq!(garden.add_manual_strut(), expected);
    }
    assert_eq!(garden.add_manual_strut(), 5);
    assert_eq!(garden.stage(), "building");
    assert!(garden.is_animating());
}

#[wasm_bindgen_test]
fn full_build_starts_once() {
    let mut garden = VineGarden::new(canvas(400, 300)).unwrap();
    garden.build_full_lattice();
    garden.build_full_lattice();
    assert_eq!(garden.stage(), "building");
    assert_eq!(garden.tree_count(), 0);
    assert!(garden.stats_json().contains("\"stage\":\"building\""));
}

#[wasm_bindgen_test]
fn config_errors_surface_to_js() {
    assert!(VineGarden::with_config(canvas(100, 100), "grid:\n  cell_size: -1\n").is_err());
    assert!(VineGarden::with_config(canvas(100, 100), "grid:\n  cell_size: 20\n").is_ok());
}

#[wasm_bindgen_test]
fn resize_keeps_stage() {
    let mut garden = VineGarden::new(canvas(800, 600)).unwrap();
    garden.add_manual_strut();
    garden.on_resize(1024, 768);
    assert_eq!(garden.stage(), "building");
    assert_eq!(garden.manual_strut_count(), 1);
}

#[wasm_bindgen_test]
fn resize_restores_round_line_caps() {
    use vine_lattice::render::CanvasSurface;
    use web_sys::CanvasRenderingContext2d;

    let canvas = canvas(200, 100);
    let mut surface = CanvasSurface::new(&canvas).unwrap();
    let ctx = canvas
        .get_context("2d")
        .unwrap()
        .unwrap()
        .dyn_into::<CanvasRenderingContext2d>()
        .unwrap();
    assert_eq!(ctx.line_cap(), "round");

    // Setting the element size resets the context state
    canvas.set_width(400);
    assert_eq!(ctx.line_cap(), "butt");

    surface.resize(400.0, 100.0);
    assert_eq!(ctx.line_cap(), "round");
}
