//! Rendering-surface seams and the native box layout.
//!
//! The graph logic never looks at pixels directly. It asks a
//! [`ConnectorLocator`] where a box's connector currently is, and which
//! connector (if any) sits under the pointer. A [`BoxSurface`] additionally
//! mounts/unmounts boxes and moves them when the host does not own layout
//! itself.

use crate::canvas::WorkspaceConfig;
use patch_core::id::BoxId;
use patch_core::model::{Bounds, PatchBox};
use std::collections::HashMap;

/// Resolves box ids to live connector rectangles.
pub trait ConnectorLocator {
    /// Current connector bounds, or `None` if the box is not rendered.
    fn resolve(&self, id: BoxId) -> Option<Bounds>;

    /// Topmost connector under `(x, y)`.
    fn connector_at(&self, x: f32, y: f32) -> Option<BoxId>;
}

/// A surface that hosts box containers.
///
/// Hosts that lay boxes out themselves (a DOM page with draggable
/// containers) keep the no-op defaults and only implement the locator.
pub trait BoxSurface: ConnectorLocator {
    fn mount(&mut self, _b: &PatchBox) {}

    fn unmount(&mut self, _id: BoxId) {}

    /// Topmost box whose body (excluding the connector) is under `(x, y)`.
    fn box_at(&self, _x: f32, _y: f32) -> Option<BoxId> {
        None
    }

    fn move_box(&mut self, _id: BoxId, _dx: f32, _dy: f32) {}
}

// ─── Native layout ───────────────────────────────────────────────────────

/// In-memory box layout: container bounds per box, connector square at the
/// container's top-left. Later mounts paint on top of earlier ones.
#[derive(Debug, Clone)]
pub struct BoxLayout {
    config: WorkspaceConfig,
    /// Mount order (last = topmost).
    order: Vec<BoxId>,
    bounds: HashMap<BoxId, Bounds>,
    spawned: usize,
}

impl BoxLayout {
    pub fn new(config: WorkspaceConfig) -> Self {
        Self {
            config,
            order: Vec::new(),
            bounds: HashMap::new(),
            spawned: 0,
        }
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Container bounds of a mounted box.
    pub fn box_bounds(&self, id: BoxId) -> Option<Bounds> {
        self.bounds.get(&id).copied()
    }

    pub fn is_mounted(&self, id: BoxId) -> bool {
        self.bounds.contains_key(&id)
    }

    fn connector_of(&self, b: &Bounds) -> Bounds {
        let size = self.config.connector_size;
        Bounds::new(b.x, b.y, size, size)
    }

    fn next_spawn_position(&mut self) -> (f32, f32) {
        let (ox, oy) = self.config.spawn_origin;
        let offset = self.spawned as f32 * self.config.spawn_step;
        self.spawned += 1;
        (ox + offset, oy + offset)
    }

    /// Walk mounted boxes front-to-back.
    fn topmost<F>(&self, mut pred: F) -> Option<BoxId>
    where
        F: FnMut(&Bounds) -> bool,
    {
        self.order
            .iter()
            .rev()
            .find(|id| self.bounds.get(*id).is_some_and(&mut pred))
            .copied()
    }
}

impl ConnectorLocator for BoxLayout {
    fn resolve(&self, id: BoxId) -> Option<Bounds> {
        self.bounds.get(&id).map(|b| self.connector_of(b))
    }

    fn connector_at(&self, x: f32, y: f32) -> Option<BoxId> {
        // The topmost *box* under the pointer decides; a connector hidden
        // under another box's body is not reachable.
        let hit = self.topmost(|b| b.contains(x, y))?;
        let bounds = self.bounds.get(&hit)?;
        self.connector_of(bounds).contains(x, y).then_some(hit)
    }
}

impl BoxSurface for BoxLayout {
    fn mount(&mut self, b: &PatchBox) {
        if self.is_mounted(b.id) {
            return;
        }
        let (x, y) = match b.position {
            Some(pos) => pos,
            None => self.next_spawn_position(),
        };
        self.bounds.insert(
            b.id,
            Bounds::new(x, y, self.config.box_width, self.config.box_height),
        );
        self.order.push(b.id);
        log::debug!("mount {} at ({x}, {y})", b.id);
    }

    fn unmount(&mut self, id: BoxId) {
        if self.bounds.remove(&id).is_some() {
            self.order.retain(|o| *o != id);
            log::debug!("unmount {id}");
        }
    }

    fn box_at(&self, x: f32, y: f32) -> Option<BoxId> {
        let hit = self.topmost(|b| b.contains(x, y))?;
        let bounds = self.bounds.get(&hit)?;
        // Connector presses start wires, not drags.
        (!self.connector_of(bounds).contains(x, y)).then_some(hit)
    }

    fn move_box(&mut self, id: BoxId, dx: f32, dy: f32) {
        if let Some(b) = self.bounds.get_mut(&id) {
            b.translate(dx, dy);
        }
    }
}
