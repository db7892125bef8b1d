use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

pub mod animation;
pub mod config;
pub mod growth;
pub mod lattice;
pub mod math;
pub mod particles;
pub mod render;
pub mod simulation;

pub use config::SimConfig;
pub use lattice::Stage;
pub use simulation::{Simulation, SimulationStats};

use animation::{FrameScheduler, LoopControl};
use render::{CanvasSurface, Renderer};

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // Fails only if a logger is already installed
    if log::set_logger(&CONSOLE_LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Info);
    }
}

fn clog(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

/// Forwards `log` records from the simulation to the browser console
struct ConsoleLogger;

static CONSOLE_LOGGER: ConsoleLogger = ConsoleLogger;

fn console_line(record: &log::Record) -> String {
    format!("[{}] {}: {}", record.level(), record.target(), record.args())
}

impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&console_line(record));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&line),
            log::Level::Warn => web_sys::console::warn_1(&line),
            _ => web_sys::console::log_1(&line),
        }
    }

    fn flush(&self) {}
}

/// Everything one frame touches
struct Garden {
    sim: Simulation,
    scheduler: FrameScheduler,
    renderer: Renderer,
    surface: CanvasSurface,
}

impl Garden {
    fn frame(&mut self, timestamp: f64) -> LoopControl {
        let dt = self.scheduler.delta(timestamp);
        self.sim.step(dt);
        self.renderer.draw(&self.sim, &mut self.surface);
        self.scheduler.settle(self.sim.should_continue())
    }

    fn redraw(&mut self) {
        self.renderer.draw(&self.sim, &mut self.surface);
    }
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

fn request_frame(callback: &FrameCallback) {
    let Some(window) = web_sys::window() else {
        return;
    };
    if let Some(cb) = callback.borrow().as_ref() {
        if let Err(e) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            clog(&format!("requestAnimationFrame failed: {:?}", e));
        }
    }
}

/// Lattice-and-vine garden bound to a canvas, exposed to JavaScript
#[wasm_bindgen]
pub struct VineGarden {
    garden: Rc<RefCell<Garden>>,
    callback: FrameCallback,
    canvas: HtmlCanvasElement,
}

#[wasm_bindgen]
impl VineGarden {
    /// Create a garden sized to the canvas
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement) -> Result<VineGarden, JsValue> {
        Self::build(canvas, SimConfig::default())
    }

    /// Create a garden with tunables overridden from YAML
    #[wasm_bindgen]
    pub fn with_config(canvas: HtmlCanvasElement, yaml: &str) -> Result<VineGarden, JsValue> {
        let config = SimConfig::from_yaml(yaml).map_err(|e| JsValue::from_str(&e))?;
        clog("vine garden: custom config loaded");
        Self::build(canvas, config)
    }

    fn build(canvas: HtmlCanvasElement, config: SimConfig) -> Result<VineGarden, JsValue> {
        let surface = CanvasSurface::new(&canvas).map_err(|e| JsValue::from_str(&e))?;
        let (width, height) = (canvas.width() as f32, canvas.height() as f32);
        let seed = (js_sys::Math::random() * u32::MAX as f64) as u64;

        let sim = Simulation::try_new(config, width, height)
            .map_err(|e| JsValue::from_str(&e))?
            .with_seed(seed);

        let garden = Rc::new(RefCell::new(Garden {
            sim,
            scheduler: FrameScheduler::new(config.scheduler),
            renderer: Renderer::default(),
            surface,
        }));

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let next = callback.clone();
        let loop_garden = garden.clone();
        *callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
            let control = loop_garden.borrow_mut().frame(timestamp);
            match control {
                LoopControl::Continue => request_frame(&next),
                LoopControl::Halt => clog("vine garden: idle"),
            }
        }));

        garden.borrow_mut().redraw();
        Ok(Self {
            garden,
            callback,
            canvas,
        })
    }

    fn wake(&self) {
        let woke = self.garden.borrow_mut().scheduler.wake();
        if woke {
            request_frame(&self.callback);
        }
    }

    /// Place the next hand-specified strut. Returns how many have been placed.
    #[wasm_bindgen]
    pub fn add_manual_strut(&mut self) -> u32 {
        let count = self.garden.borrow_mut().sim.add_manual_strut();
        self.wake();
        count
    }

    /// Build the whole lattice, then let the vines grow
    #[wasm_bindgen]
    pub fn build_full_lattice(&mut self) {
        let started = self.garden.borrow_mut().sim.build_full_lattice();
        if started {
            clog("vine garden: full build started");
            self.wake();
        }
    }

    /// Resize the canvas and recompute the lattice for future construction
    #[wasm_bindgen]
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);

        let mut garden = self.garden.borrow_mut();
        garden.sim.on_resize(width as f32, height as f32);
        garden.surface.resize(width as f32, height as f32);
        garden.redraw();
    }

    /// Drop all structures and return to the initial stage
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        let mut garden = self.garden.borrow_mut();
        garden.sim.reset();
        garden.redraw();
    }

    /// Roots grown from seeds so far
    #[wasm_bindgen]
    pub fn tree_count(&self) -> u32 {
        self.garden.borrow().sim.trees()
    }

    #[wasm_bindgen]
    pub fn manual_strut_count(&self) -> u32 {
        self.garden.borrow().sim.manual_count()
    }

    /// Current stage: "initial", "building" or "vine-growing"
    #[wasm_bindgen]
    pub fn stage(&self) -> String {
        self.garden.borrow().sim.stage().as_str().to_string()
    }

    /// Whether the frame loop is currently requesting frames
    #[wasm_bindgen]
    pub fn is_animating(&self) -> bool {
        self.garden.borrow().scheduler.is_running()
    }

    /// Counters as a JSON string
    #[wasm_bindgen]
    pub fn stats_json(&self) -> String {
        let stats = self.garden.borrow().sim.stats();
        format!(
            r#"{{"stage":"{}","struts":{},"segments":{},"flowering":{},"seedsAirborne":{},"seedsLanded":{},"pendingEvents":{},"trees":{}}}"#,
            stats.stage.as_str(),
            stats.struts,
            stats.segments,
            stats.flowering,
            stats.seeds_airborne,
            stats.seeds_landed,
            stats.pending_events,
            stats.trees
        )
    }
}
