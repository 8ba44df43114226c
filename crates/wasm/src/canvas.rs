//! Browser paint targets: a 2D canvas [`Surface`] and a WebGL2 [`FogPass`].

use std::f64::consts::TAU;

use fog_core::render::GlFogPass;
use fog_core::spotlight::SpotlightState;
use fog_core::surface::{GradientStop, RadialEllipse, Surface};
use fog_core::viewport::Viewport;
use fog_engine::FogPass;
use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// [`Surface`] over a `CanvasRenderingContext2d`.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement, ctx: CanvasRenderingContext2d) -> Self {
        Self { canvas, ctx }
    }

    fn try_fill(&self, e: &RadialEllipse, stops: &[GradientStop]) -> Result<(), JsValue> {
        let ctx = &self.ctx;
        ctx.save();
        ctx.translate(e.center.x, e.center.y)?;
        ctx.rotate(e.rotation)?;
        ctx.scale(1.0, e.flatten)?;
        let gradient = ctx.create_radial_gradient(0.0, 0.0, 0.0, 0.0, 0.0, e.radius)?;
        for stop in stops {
            gradient.add_color_stop(stop.offset as f32, &stop.color.to_css())?;
        }
        ctx.set_fill_style_canvas_gradient(&gradient);
        ctx.begin_path();
        ctx.arc(0.0, 0.0, e.radius, 0.0, TAU)?;
        ctx.fill();
        ctx.restore();
        Ok(())
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Viewport {
        Viewport::new(self.canvas.width(), self.canvas.height())
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
    }

    fn clear(&mut self) {
        let size = self.size().size();
        self.ctx.clear_rect(0.0, 0.0, size.x, size.y);
    }

    fn fill_radial_ellipse(&mut self, ellipse: &RadialEllipse, stops: &[GradientStop]) {
        if let Err(e) = self.try_fill(ellipse, stops) {
            // Leave the transform stack balanced for the next puff.
            self.ctx.restore();
            log::warn!("canvas fill failed: {e:?}");
        }
    }
}

/// [`GlFogPass`] bound to its canvas element, so resizing also resizes the
/// drawing buffer.
pub struct WebGlPass {
    canvas: HtmlCanvasElement,
    pass: GlFogPass,
}

impl WebGlPass {
    pub fn new(canvas: HtmlCanvasElement, pass: GlFogPass) -> Self {
        Self { canvas, pass }
    }
}

impl FogPass for WebGlPass {
    fn viewport(&self) -> Viewport {
        self.pass.viewport()
    }

    fn resize(&mut self, viewport: Viewport) {
        self.canvas.set_width(viewport.width);
        self.canvas.set_height(viewport.height);
        self.pass.resize(viewport);
    }

    fn clear(&mut self) {
        self.pass.clear();
    }

    fn draw(&mut self, time: f64, spot: &SpotlightState) {
        self.pass.draw(time, spot);
    }
}
