//! Canvas2D overlay painting.
//!
//! The workspace stacks two `<canvas>` elements over the boxes: one for
//! committed wires and one for the in-progress preview. Each is sized to the
//! workspace once at mount and repainted by replaying a display list. A clear
//! always covers the canvas's own backing size.

use patch_render::canvas::WorkspaceConfig;
use patch_render::paint::{Line, OverlaySurface};
use web_sys::CanvasRenderingContext2d;

/// One overlay canvas as an [`OverlaySurface`].
pub struct Canvas2dLayer<'a> {
    ctx: &'a CanvasRenderingContext2d,
    width: f64,
    height: f64,
}

impl<'a> Canvas2dLayer<'a> {
    pub fn new(ctx: &'a CanvasRenderingContext2d, config: &WorkspaceConfig) -> Self {
        let [r, g, b, a] = config.line_color;
        ctx.set_stroke_style_str(&format!("rgba({r}, {g}, {b}, {})", a as f64 / 255.0));
        ctx.set_line_width(config.line_width as f64);
        Self {
            ctx,
            width: config.width as f64,
            height: config.height as f64,
        }
    }
}

/// Area to clear: the canvas backing store when known, else the workspace.
fn clear_extent(backing: Option<(u32, u32)>, workspace: (f64, f64)) -> (f64, f64) {
    match backing {
        Some((w, h)) => (w as f64, h as f64),
        None => workspace,
    }
}

impl OverlaySurface for Canvas2dLayer<'_> {
    fn clear(&mut self) {
        let backing = self.ctx.canvas().map(|c| (c.width(), c.height()));
        let (w, h) = clear_extent(backing, (self.width, self.height));
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    fn line(&mut self, line: Line) {
        self.ctx.begin_path();
        self.ctx.move_to(line.x1 as f64, line.y1 as f64);
        self.ctx.line_to(line.x2 as f64, line.y2 as f64);
        self.ctx.stroke();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_covers_larger_canvas() {
        assert_eq!(clear_extent(Some((1000, 1000)), (400.0, 300.0)), (1000.0, 1000.0));
    }

    #[test]
    fn clear_falls_back_to_workspace() {
        assert_eq!(clear_extent(None, (400.0, 300.0)), (400.0, 300.0));
    }
}
