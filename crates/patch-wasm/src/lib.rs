//! WASM bridge for Patchbay: exposes the patch engine to the workspace page.
//!
//! Compiled via `wasm-pack build --target web`. The page owns box dragging
//! and the module text inputs; it forwards pointer events, drag frames and
//! text edits here and repaints the two overlay canvases on request.

mod dom;
mod native;
mod render2d;

use dom::DomSurface;
use native::HostBridge;
use patch_core::id::BoxId;
use patch_editor::engine::PatchEngine;
use patch_editor::input::Modifiers;
use patch_render::canvas::WorkspaceConfig;
use patch_render::paint::DisplayList;
use render2d::Canvas2dLayer;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

/// The main WASM-facing workspace controller.
///
/// Holds the patch engine over the live DOM. All interaction from the page
/// goes through this struct.
#[wasm_bindgen]
pub struct PatchCanvas {
    engine: PatchEngine<DomSurface>,
    /// Display list generations last painted, to skip unchanged layers.
    painted_wires: Option<u64>,
    painted_preview: Option<u64>,
}

#[wasm_bindgen]
impl PatchCanvas {
    /// Attach to the workspace element `workspace_id`, take its laid-out size
    /// and announce it to the signal engine.
    #[wasm_bindgen(constructor)]
    pub fn new(workspace_id: &str) -> Result<PatchCanvas, JsValue> {
        console_error_panic_hook_setup();

        let surface = DomSurface::attach(workspace_id).map_err(|e| JsValue::from_str(&e))?;
        let config = *surface.config();
        if !HostBridge::is_connected() {
            web_sys::console::log_1(&"engine host not found, commands will be mocked".into());
        }
        let mut engine = PatchEngine::new(surface, config, Box::new(HostBridge));
        engine.mount();
        Ok(Self {
            engine,
            painted_wires: None,
            painted_preview: None,
        })
    }

    // ─── Boxes ───────────────────────────────────────────────────────────

    /// Place a box at `(x, y)`. Returns its id.
    pub fn add_box(&mut self, x: f32, y: f32) -> String {
        self.engine.add_box(Some((x, y))).as_str().to_string()
    }

    /// Place a box at the next spawn point. Returns its id.
    pub fn spawn_box(&mut self) -> String {
        self.engine.add_box(None).as_str().to_string()
    }

    pub fn remove_box(&mut self, id: &str) -> bool {
        match BoxId::lookup(id) {
            Some(id) => self.engine.remove_box(id),
            None => false,
        }
    }

    /// Feed the full text of a box's module input after an edit.
    /// Returns `true` if the field locked on a command.
    pub fn apply_module_text(&mut self, id: &str, text: &str) -> bool {
        match BoxId::lookup(id) {
            Some(id) => self.engine.apply_module_text(id, text),
            None => false,
        }
    }

    /// Text the module input should display for box `id`.
    pub fn field_text(&self, id: &str) -> Option<String> {
        let id = BoxId::lookup(id)?;
        self.engine.field(id).map(|f| f.text().to_string())
    }

    /// Whether box `id`'s module input is locked on a valid command.
    pub fn field_is_valid(&self, id: &str) -> bool {
        BoxId::lookup(id)
            .and_then(|id| self.engine.field(id))
            .is_some_and(|f| f.is_valid())
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Returns `true` if an overlay needs repainting.
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.engine.handle_pointer_down(x, y, mods)
    }

    pub fn handle_pointer_move(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.engine.handle_pointer_move(x, y, mods)
    }

    pub fn handle_pointer_up(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        self.engine.handle_pointer_up(x, y, mods)
    }

    // ─── Page-owned drags ────────────────────────────────────────────────

    /// A box container moved. Returns the number of wires drawn.
    pub fn on_drag(&mut self) -> usize {
        self.engine.drag_frame().drawn
    }

    /// A box drag ended. Returns the number of wires pruned.
    pub fn on_drag_end(&mut self) -> usize {
        self.engine.drag_end()
    }

    // ─── Rendering ───────────────────────────────────────────────────────

    /// Size an overlay canvas to the workspace. Call once per layer at mount.
    pub fn size_canvas(&self, canvas: &HtmlCanvasElement) {
        let config = self.engine.config();
        canvas.set_width(config.width.ceil() as u32);
        canvas.set_height(config.height.ceil() as u32);
    }

    pub fn width(&self) -> f32 {
        self.engine.config().width
    }

    pub fn height(&self) -> f32 {
        self.engine.config().height
    }

    /// Repaint the committed-wire canvas if its display list changed.
    pub fn render_wires(&mut self, ctx: &CanvasRenderingContext2d) {
        let config = *self.engine.config();
        paint_layer(ctx, &config, self.engine.wires_layer(), &mut self.painted_wires);
    }

    /// Repaint the preview canvas if its display list changed.
    pub fn render_preview(&mut self, ctx: &CanvasRenderingContext2d) {
        let config = *self.engine.config();
        paint_layer(
            ctx,
            &config,
            self.engine.preview_layer(),
            &mut self.painted_preview,
        );
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// All boxes as a JSON array.
    pub fn boxes_json(&self) -> String {
        serde_json::to_string(self.engine.graph().boxes()).unwrap_or_default()
    }

    /// All wires as a JSON array.
    pub fn wires_json(&self) -> String {
        serde_json::to_string(self.engine.graph().wires()).unwrap_or_default()
    }

    pub fn is_wiring(&self) -> bool {
        self.engine.wire_gesture() != patch_editor::wiring::WireGesture::Idle
    }

    /// Tell the signal engine to stop. Call on page unload.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }
}

fn paint_layer(
    ctx: &CanvasRenderingContext2d,
    config: &WorkspaceConfig,
    layer: &DisplayList,
    painted: &mut Option<u64>,
) {
    if *painted == Some(layer.generation()) {
        return;
    }
    layer.replay(&mut Canvas2dLayer::new(ctx, config));
    *painted = Some(layer.generation());
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Patchbay WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone helpers (no workspace needed) ────────────────────────────

/// The command token the module input would lock on, if any.
#[wasm_bindgen]
pub fn recognize_module(text: &str) -> Option<String> {
    patch_core::parser::recognize(text).map(str::to_string)
}
