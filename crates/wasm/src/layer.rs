//! The `FogLayer` class exported to JavaScript.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use fog_core::config::{Backend, EngineConfig};
use fog_core::render::GlFogPass;
use fog_core::spotlight::SpotlightState;
use fog_core::viewport::Viewport;
use fog_engine::{
    AnimationDriver, FrameLoop, NoopRenderer, ParticleRenderer, Renderer, ShaderRenderer,
    SpotlightInput,
};
use glam::DVec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, WebGl2RenderingContext, Window};

use crate::canvas::{CanvasSurface, WebGlPass};
use crate::params::parse_params;
use crate::raf::{ArmedFrame, FrameCallback, RafScheduler};

struct State {
    frame_loop: FrameLoop<RafScheduler>,
    driver: AnimationDriver<Box<dyn Renderer>>,
    input: SpotlightInput,
}

/// Fog overlay bound to one canvas.
///
/// The canvas follows the window size: a `resize` listener queues the new
/// viewport, which is applied at the start of the next frame before anything
/// is drawn. Spotlight setters take effect on the next frame.
#[wasm_bindgen]
pub struct FogLayer {
    state: Rc<RefCell<State>>,
    input: SpotlightInput,
    window: Window,
    on_resize: Closure<dyn FnMut()>,
}

#[wasm_bindgen]
impl FogLayer {
    /// Builds the engine for `canvas`. Invalid params throw; a missing
    /// rendering context degrades to a layer that draws nothing.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, params_json: &str, seed: u32) -> Result<FogLayer, JsError> {
        crate::init_logging();
        let config = parse_params(params_json)?;
        let window = web_sys::window().ok_or_else(|| JsError::new("no window"))?;

        let viewport = window_viewport(&window)
            .unwrap_or_else(|| Viewport::new(canvas.width(), canvas.height()));
        let renderer = build_renderer(&canvas, &config);
        let input = SpotlightInput::new(SpotlightState::from_config(
            &config,
            viewport.size() / 2.0,
        ));
        let driver = AnimationDriver::new(config, renderer, viewport, u64::from(seed))?;

        let callback: FrameCallback = Rc::new(RefCell::new(None));
        let armed: ArmedFrame = Rc::new(Cell::new(None));
        let state = Rc::new(RefCell::new(State {
            frame_loop: FrameLoop::new(RafScheduler::new(
                window.clone(),
                callback.clone(),
                armed.clone(),
            )),
            driver,
            input: input.clone(),
        }));

        // Weak, so dropping the layer tears everything down.
        let weak = Rc::downgrade(&state);
        *callback.borrow_mut() = Some(Closure::wrap(Box::new(move |now_ms: f64| {
            let (Some(state), Some(handle)) = (weak.upgrade(), armed.take()) else {
                return;
            };
            let mut guard = state.borrow_mut();
            let State {
                frame_loop,
                driver,
                input,
            } = &mut *guard;
            let spot = input.snapshot();
            if let Err(e) = frame_loop.on_frame(handle, || {
                driver.tick(now_ms / 1000.0, spot);
            }) {
                log::warn!("frame loop halted: {e}");
            }
        }) as Box<dyn FnMut(f64)>));

        let on_resize = {
            let weak = Rc::downgrade(&state);
            let window = window.clone();
            Closure::wrap(Box::new(move || {
                let (Some(state), Some(viewport)) = (weak.upgrade(), window_viewport(&window))
                else {
                    return;
                };
                state.borrow_mut().driver.resize(viewport);
            }) as Box<dyn FnMut()>)
        };
        window
            .add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())
            .map_err(|e| JsError::new(&format!("addEventListener('resize'): {e:?}")))?;

        Ok(FogLayer {
            state,
            input,
            window,
            on_resize,
        })
    }

    /// Moves the spotlight center, in canvas pixels.
    #[wasm_bindgen(js_name = setSpotlight)]
    pub fn set_spotlight(&self, x: f64, y: f64) {
        self.input.move_to(DVec2::new(x, y));
    }

    #[wasm_bindgen(js_name = setActive)]
    pub fn set_active(&self, active: bool) {
        self.input.set_active(active);
    }

    #[wasm_bindgen(js_name = setRadius)]
    pub fn set_radius(&self, radius: f64) -> Result<(), JsError> {
        Ok(self.input.set_radius(radius)?)
    }

    /// Overrides the window-driven size until the next window resize.
    pub fn resize(&self, width: u32, height: u32) {
        self.state
            .borrow_mut()
            .driver
            .resize(Viewport::new(width, height));
    }

    pub fn start(&self) -> Result<(), JsError> {
        let mut state = self.state.borrow_mut();
        state.driver.reset_clock();
        Ok(state.frame_loop.start()?)
    }

    /// Cancels the pending frame before returning.
    pub fn stop(&self) {
        self.state.borrow_mut().frame_loop.stop();
    }

    #[wasm_bindgen(js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.state.borrow().frame_loop.is_running()
    }

    /// Name of the active renderer: "particle", "shader" or "noop".
    #[wasm_bindgen(getter)]
    pub fn renderer(&self) -> String {
        self.state.borrow().driver.renderer().name().to_string()
    }
}

impl Drop for FogLayer {
    fn drop(&mut self) {
        if let Err(e) = self
            .window
            .remove_event_listener_with_callback("resize", self.on_resize.as_ref().unchecked_ref())
        {
            log::warn!("removeEventListener('resize') failed: {e:?}");
        }
    }
}

/// Window inner size in CSS pixels, or `None` outside a sized window.
fn window_viewport(window: &Window) -> Option<Viewport> {
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(Viewport::new(width.max(0.0) as u32, height.max(0.0) as u32))
}

/// Picks the configured backend, or a no-op renderer when the canvas
/// cannot provide the needed context.
fn build_renderer(canvas: &HtmlCanvasElement, config: &EngineConfig) -> Box<dyn Renderer> {
    let viewport = Viewport::new(canvas.width(), canvas.height());
    let built = match config.backend {
        Backend::Particle => particle_renderer(canvas, config),
        Backend::Shader => shader_renderer(canvas, config),
    };
    built.unwrap_or_else(|reason| {
        log::warn!(
            "{} backend unavailable, drawing nothing: {reason}",
            config.backend.name()
        );
        Box::new(NoopRenderer::new(viewport))
    })
}

fn particle_renderer(
    canvas: &HtmlCanvasElement,
    config: &EngineConfig,
) -> Result<Box<dyn Renderer>, String> {
    let ctx = canvas
        .get_context("2d")
        .map_err(|e| format!("getContext('2d'): {e:?}"))?
        .ok_or("2d context not supported")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "2d context has unexpected type")?;
    let surface = CanvasSurface::new(canvas.clone(), ctx);
    Ok(Box::new(ParticleRenderer::new(surface, config)))
}

fn shader_renderer(
    canvas: &HtmlCanvasElement,
    config: &EngineConfig,
) -> Result<Box<dyn Renderer>, String> {
    let webgl = canvas
        .get_context("webgl2")
        .map_err(|e| format!("getContext('webgl2'): {e:?}"))?
        .ok_or("WebGL2 not supported")?
        .dyn_into::<WebGl2RenderingContext>()
        .map_err(|_| "webgl2 context has unexpected type")?;
    let gl = glow::Context::from_webgl2_context(webgl);
    let pass = GlFogPass::new(gl, config).map_err(|e| e.to_string())?;
    Ok(Box::new(ShaderRenderer::new(WebGlPass::new(
        canvas.clone(),
        pass,
    ))))
}
