//! Patch graph data model.
//!
//! A patch is two ordered collections: the boxes placed on the workspace and
//! the wires between their connectors. Screen positions are *not* stored for
//! wires; they are recomputed from live connector positions on every pass.
//!
//! Every mutation builds the next collection and swaps it in whole, then
//! records a [`GraphEvent`] so a rendering layer can react.

use crate::id::BoxId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

// ─── Boxes ───────────────────────────────────────────────────────────────

/// A placed module instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchBox {
    pub id: BoxId,
    /// Initial screen coordinate. Once mounted, the drag surface owns the
    /// authoritative position.
    pub position: Option<(f32, f32)>,
    /// Accepted command token (`sin`, `sq`, `out`, `4.2`, ...).
    pub module: Option<String>,
}

/// Caller-supplied attributes merged into a new box.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxAttrs {
    pub position: Option<(f32, f32)>,
    pub module: Option<String>,
}

impl BoxAttrs {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            position: Some((x, y)),
            module: None,
        }
    }
}

/// A committed module command for an existing box.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleUpdate {
    pub id: BoxId,
    pub module: String,
}

// ─── Wires ───────────────────────────────────────────────────────────────

/// Synthetic wire identity: endpoints plus a per-graph sequence number, so
/// duplicate wires between the same pair stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WireKey {
    pub start: BoxId,
    pub end: BoxId,
    pub seq: u64,
}

/// A connection between two box connectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wire {
    pub key: WireKey,
}

impl Wire {
    pub fn start(&self) -> BoxId {
        self.key.start
    }

    pub fn end(&self) -> BoxId {
        self.key.end
    }

    pub fn touches(&self, id: BoxId) -> bool {
        self.key.start == id || self.key.end == id
    }
}

// ─── Events ──────────────────────────────────────────────────────────────

/// A discrete, observable model change.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    BoxAdded(BoxId),
    BoxRemoved(BoxId),
    ModuleApplied { id: BoxId, module: String },
    WiresAdded(SmallVec<[WireKey; 2]>),
    WiresRemoved(SmallVec<[WireKey; 2]>),
}

// ─── Patch Graph ─────────────────────────────────────────────────────────

/// The patch: boxes and wires in insertion order.
#[derive(Debug, Clone, Default)]
pub struct PatchGraph {
    boxes: Vec<PatchBox>,
    wires: Vec<Wire>,
    next_wire_seq: u64,
    events: Vec<GraphEvent>,
}

impl PatchGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ─── Box operations ──────────────────────────────────────────────────

    /// Append a box with a freshly generated id merged with `attrs`.
    pub fn add_box(&mut self, attrs: BoxAttrs) -> BoxId {
        let id = BoxId::generate();
        let mut next = self.boxes.clone();
        next.push(PatchBox {
            id,
            position: attrs.position,
            module: attrs.module,
        });
        self.boxes = next;
        self.events.push(GraphEvent::BoxAdded(id));
        id
    }

    /// Remove a box. Wires referencing it are left in place; the render
    /// pass prunes them once their connector no longer resolves.
    /// Returns `false` if no such box exists.
    pub fn remove_box(&mut self, id: BoxId) -> bool {
        if !self.contains_box(id) {
            return false;
        }
        let next: Vec<PatchBox> = self.boxes.iter().filter(|b| b.id != id).cloned().collect();
        self.boxes = next;
        self.events.push(GraphEvent::BoxRemoved(id));
        true
    }

    /// Replace the module of the box matching `update.id` in place.
    /// A missing id leaves the collection untouched and returns `false`.
    pub fn apply_module(&mut self, update: ModuleUpdate) -> bool {
        let Some(pos) = self.boxes.iter().position(|b| b.id == update.id) else {
            log::warn!("apply_module: no box {}", update.id);
            return false;
        };
        let mut next = self.boxes.clone();
        let updated = PatchBox {
            module: Some(update.module.clone()),
            ..next[pos].clone()
        };
        next[pos] = updated;
        self.boxes = next;
        self.events.push(GraphEvent::ModuleApplied {
            id: update.id,
            module: update.module,
        });
        true
    }

    // ─── Wire operations ─────────────────────────────────────────────────

    /// Append one wire per `(start, end)` pair. No dedup and no endpoint
    /// validation happen here. Returns the keys of the new wires.
    pub fn set_wires<I>(&mut self, pairs: I) -> SmallVec<[WireKey; 2]>
    where
        I: IntoIterator<Item = (BoxId, BoxId)>,
    {
        let mut keys: SmallVec<[WireKey; 2]> = SmallVec::new();
        let mut next = self.wires.clone();
        for (start, end) in pairs {
            let key = WireKey {
                start,
                end,
                seq: self.next_wire_seq,
            };
            self.next_wire_seq += 1;
            next.push(Wire { key });
            keys.push(key);
        }
        if keys.is_empty() {
            return keys;
        }
        self.wires = next;
        self.events.push(GraphEvent::WiresAdded(keys.clone()));
        keys
    }

    /// Remove every wire whose key is listed in `keys`.
    /// Returns how many wires were removed; zero matches is a no-op.
    pub fn remove_wires(&mut self, keys: &[WireKey]) -> usize {
        if keys.is_empty() {
            return 0;
        }
        let (removed, kept): (Vec<Wire>, Vec<Wire>) =
            self.wires.iter().copied().partition(|w| keys.contains(&w.key));
        if removed.is_empty() {
            return 0;
        }
        self.wires = kept;
        self.events.push(GraphEvent::WiresRemoved(
            removed.iter().map(|w| w.key).collect(),
        ));
        removed.len()
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn boxes(&self) -> &[PatchBox] {
        &self.boxes
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub fn get_box(&self, id: BoxId) -> Option<&PatchBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn contains_box(&self, id: BoxId) -> bool {
        self.boxes.iter().any(|b| b.id == id)
    }

    /// Wires with `id` at either end, in insertion order.
    pub fn wires_touching(&self, id: BoxId) -> Vec<Wire> {
        self.wires.iter().filter(|w| w.touches(id)).copied().collect()
    }

    pub fn get_wire(&self, key: WireKey) -> Option<&Wire> {
        self.wires.iter().find(|w| w.key == key)
    }

    /// Events recorded since the last drain.
    pub fn pending_events(&self) -> &[GraphEvent] {
        &self.events
    }

    /// Take all events recorded since the last drain.
    pub fn drain_events(&mut self) -> Vec<GraphEvent> {
        std::mem::take(&mut self.events)
    }
}

// ─── Resolved positions ──────────────────────────────────────────────────

/// Screen-space bounding box of a rendered element (a box or its connector).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// The anchor committed wires attach to.
    pub fn top_left(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_box_merges_attrs() {
        let mut g = PatchGraph::new();
        let id = g.add_box(BoxAttrs::at(10.0, 20.0));
        let b = g.get_box(id).unwrap();
        assert_eq!(b.position, Some((10.0, 20.0)));
        assert_eq!(b.module, None);
        assert_eq!(g.drain_events(), vec![GraphEvent::BoxAdded(id)]);
    }

    #[test]
    fn remove_missing_box_is_noop() {
        let mut g = PatchGraph::new();
        let id = g.add_box(BoxAttrs::default());
        g.drain_events();
        assert!(!g.remove_box(BoxId::intern("no_such_box")));
        assert_eq!(g.boxes().len(), 1);
        assert!(g.drain_events().is_empty());
        assert!(g.remove_box(id));
        assert!(g.boxes().is_empty());
    }

    #[test]
    fn remove_box_keeps_wires() {
        let mut g = PatchGraph::new();
        let a = g.add_box(BoxAttrs::default());
        let b = g.add_box(BoxAttrs::default());
        g.set_wires([(a, b)]);
        g.remove_box(a);
        assert_eq!(g.wires().len(), 1);
        assert_eq!(g.wires_touching(a).len(), 1);
    }

    #[test]
    fn apply_module_replaces_in_place() {
        let mut g = PatchGraph::new();
        let a = g.add_box(BoxAttrs::at(1.0, 2.0));
        let b = g.add_box(BoxAttrs::default());
        assert!(g.apply_module(ModuleUpdate {
            id: a,
            module: "sin".into(),
        }));
        assert_eq!(g.boxes()[0].id, a);
        assert_eq!(g.boxes()[0].module.as_deref(), Some("sin"));
        assert_eq!(g.boxes()[0].position, Some((1.0, 2.0)));
        assert_eq!(g.boxes()[1].id, b);
    }

    #[test]
    fn apply_module_missing_id_is_noop() {
        let mut g = PatchGraph::new();
        g.add_box(BoxAttrs::default());
        g.drain_events();
        let before = g.boxes().to_vec();
        assert!(!g.apply_module(ModuleUpdate {
            id: BoxId::intern("ghost"),
            module: "out".into(),
        }));
        assert_eq!(g.boxes(), before.as_slice());
        assert!(g.drain_events().is_empty());
    }

    #[test]
    fn duplicate_wires_get_distinct_keys() {
        let mut g = PatchGraph::new();
        let a = g.add_box(BoxAttrs::default());
        let b = g.add_box(BoxAttrs::default());
        let k1 = g.set_wires([(a, b)]);
        let k2 = g.set_wires([(a, b)]);
        assert_eq!(g.wires().len(), 2);
        assert_ne!(k1[0], k2[0]);

        assert_eq!(g.remove_wires(&[k1[0]]), 1);
        assert_eq!(g.wires().len(), 1);
        assert_eq!(g.wires()[0].key, k2[0]);
    }

    #[test]
    fn remove_wires_empty_set_is_noop() {
        let mut g = PatchGraph::new();
        let a = g.add_box(BoxAttrs::default());
        let b = g.add_box(BoxAttrs::default());
        g.set_wires([(a, b), (b, a)]);
        g.drain_events();
        assert_eq!(g.remove_wires(&[]), 0);
        assert_eq!(g.wires().len(), 2);
        assert!(g.drain_events().is_empty());
    }

    #[test]
    fn remove_wires_ignores_unknown_keys() {
        let mut g = PatchGraph::new();
        let a = g.add_box(BoxAttrs::default());
        let b = g.add_box(BoxAttrs::default());
        g.set_wires([(a, b)]);
        let stranger = WireKey {
            start: a,
            end: b,
            seq: 999,
        };
        assert_eq!(g.remove_wires(&[stranger]), 0);
        assert_eq!(g.wires().len(), 1);
    }

    #[test]
    fn bounds_anchor_and_center() {
        let b = Bounds::new(10.0, 20.0, 8.0, 8.0);
        assert_eq!(b.top_left(), (10.0, 20.0));
        assert_eq!(b.center(), (14.0, 24.0));
        assert!(b.contains(18.0, 28.0));
        assert!(!b.contains(18.1, 28.0));
    }
}
