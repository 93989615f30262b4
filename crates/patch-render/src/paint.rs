//! Overlay painting.
//!
//! Wires are drawn on two overlay layers: a persistent one for committed
//! wires and a transient one for the in-progress preview. Each layer is a
//! [`DisplayList`] that is cleared and rebuilt on every pass, then replayed
//! onto whatever the host paints with (a Vello scene here, a Canvas2D
//! context in the browser).

use crate::canvas::WorkspaceConfig;
use kurbo::{Affine, Line as KurboLine, Stroke as KurboStroke};
use peniko::Color;
use vello::Scene;

/// A straight overlay segment in workspace coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Line {
    pub fn new(from: (f32, f32), to: (f32, f32)) -> Self {
        Self {
            x1: from.0,
            y1: from.1,
            x2: to.0,
            y2: to.1,
        }
    }

    pub fn from(&self) -> (f32, f32) {
        (self.x1, self.y1)
    }

    pub fn to(&self) -> (f32, f32) {
        (self.x2, self.y2)
    }
}

/// Something overlay lines can be drawn onto.
pub trait OverlaySurface {
    /// Clear the whole surface.
    fn clear(&mut self);

    fn line(&mut self, line: Line);
}

// ─── Display list ────────────────────────────────────────────────────────

/// Retained contents of one overlay layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayList {
    lines: Vec<Line>,
    /// Bumped on every clear, so hosts can skip replaying an unchanged layer.
    generation: u64,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Clear `target` and draw every line of this layer onto it.
    pub fn replay<S: OverlaySurface + ?Sized>(&self, target: &mut S) {
        target.clear();
        for line in &self.lines {
            target.line(*line);
        }
    }
}

impl OverlaySurface for DisplayList {
    fn clear(&mut self) {
        self.lines.clear();
        self.generation += 1;
    }

    fn line(&mut self, line: Line) {
        self.lines.push(line);
    }
}

// ─── Vello ───────────────────────────────────────────────────────────────

/// Paints overlay lines into a Vello `Scene`. The host renders the scene
/// through its wgpu surface.
pub struct SceneOverlay {
    scene: Scene,
    stroke: KurboStroke,
    color: Color,
}

impl SceneOverlay {
    pub fn new(config: &WorkspaceConfig) -> Self {
        let [r, g, b, a] = config.line_color;
        Self {
            scene: Scene::new(),
            stroke: KurboStroke::new(config.line_width as f64),
            color: Color::from_rgba8(r, g, b, a),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl OverlaySurface for SceneOverlay {
    fn clear(&mut self) {
        self.scene.reset();
    }

    fn line(&mut self, line: Line) {
        log::trace!(
            "LINE ({}, {}) -> ({}, {})",
            line.x1,
            line.y1,
            line.x2,
            line.y2
        );
        let shape = KurboLine::new(
            (line.x1 as f64, line.y1 as f64),
            (line.x2 as f64, line.y2 as f64),
        );
        self.scene
            .stroke(&self.stroke, Affine::IDENTITY, self.color, None, &shape);
    }
}
