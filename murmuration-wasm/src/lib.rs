use murmuration_core::{Boid, Flock, FlockConfig, Vec2, DEFAULT_BOID_COUNT};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement, MouseEvent};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

macro_rules! console_log {
    ($($t:tt)*) => (log(&format_args!($($t)*).to_string()))
}

/// Canvas host around the simulation core: owns the flock, steps it once
/// per animation frame and draws the resulting poses. Drawing reads only
/// the pose accessor, never the simulation internals.
#[wasm_bindgen]
pub struct FlockSimulation {
    flock: Flock,
    canvas: HtmlCanvasElement,
    context: CanvasRenderingContext2d,
}

#[wasm_bindgen]
impl FlockSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas_id: &str,
        width: f64,
        height: f64,
        boid_count: usize,
    ) -> Result<FlockSimulation, JsValue> {
        console_log!("Initializing flock of {} over {}x{}", boid_count, width, height);

        let window = web_sys::window().ok_or("no global window")?;
        let document = window.document().ok_or("no document")?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or("canvas not found")?
            .dyn_into::<HtmlCanvasElement>()?;

        canvas.set_width(width as u32);
        canvas.set_height(height as u32);

        let context = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into::<CanvasRenderingContext2d>()?;

        let flock = Flock::new(FlockConfig::sized(width, height), boid_count);

        Ok(FlockSimulation {
            flock,
            canvas,
            context,
        })
    }

    /// Standard simulation: 800x600, 100 boids
    pub fn with_defaults(canvas_id: &str) -> Result<FlockSimulation, JsValue> {
        Self::new(canvas_id, 800.0, 600.0, DEFAULT_BOID_COUNT)
    }

    /// Advance the simulation by one frame
    pub fn step(&mut self) {
        self.flock.step();
    }

    pub fn render(&self) -> Result<(), JsValue> {
        let width = self.canvas.width() as f64;
        let height = self.canvas.height() as f64;

        self.context.set_fill_style_str("#333333");
        self.context.fill_rect(0.0, 0.0, width, height);

        for pose in self.flock.poses() {
            self.context.save();
            self.context.translate(pose.x, pose.y)?;
            self.context.rotate(pose.heading)?;

            // Triangle pointing along the heading
            self.context.begin_path();
            self.context.move_to(10.0, 0.0);
            self.context.line_to(-10.0, -5.0);
            self.context.line_to(-10.0, 5.0);
            self.context.close_path();

            self.context.set_fill_style_str("rgb(200, 100, 100)");
            self.context.fill();

            self.context.restore();
        }

        Ok(())
    }

    /// Flattened `(x, y, heading)` triples, creation order, for hosts that
    /// draw on the JS side
    pub fn poses(&self) -> Vec<f64> {
        self.flock
            .poses()
            .iter()
            .flat_map(|pose| [pose.x, pose.y, pose.heading])
            .collect()
    }

    pub fn add_boid_at(&mut self, x: f64, y: f64) {
        let position = Vec2::new(x, y);
        let velocity = Vec2::new(
            (js_sys::Math::random() - 0.5) * 4.0,
            (js_sys::Math::random() - 0.5) * 4.0,
        );
        self.flock.add_boid(Boid::new(position, velocity));
        console_log!(
            "Added boid at ({}, {}). Total boids: {}",
            x,
            y,
            self.flock.len()
        );
    }

    pub fn handle_mouse_click(&mut self, event: MouseEvent) {
        let canvas_element: &Element = self.canvas.as_ref();
        let rect = canvas_element.get_bounding_client_rect();
        let x = event.client_x() as f64 - rect.left();
        let y = event.client_y() as f64 - rect.top();
        self.add_boid_at(x, y);
    }

    pub fn boid_count(&self) -> usize {
        self.flock.len()
    }
}
