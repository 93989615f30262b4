//! Render synchronizer: patch graph + live connector positions → overlay.
//!
//! Every pass is a full clear-and-redraw. Wire screen coordinates are never
//! stored; they are recomputed from the locator each time, so a dragged box
//! drags its wires along and a removed box simply stops resolving.

use crate::paint::{Line, OverlaySurface};
use crate::surface::ConnectorLocator;
use patch_core::model::{PatchGraph, WireKey};
use smallvec::SmallVec;

/// Outcome of one wire pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Wires drawn this pass.
    pub drawn: usize,
    /// Wires skipped because an endpoint did not resolve.
    pub unresolved: SmallVec<[WireKey; 4]>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.unresolved.is_empty()
    }
}

/// Clear `layer` and draw every committed wire whose endpoints both resolve,
/// from the start connector's top-left to the end connector's top-left.
pub fn redraw_wires<L, S>(graph: &PatchGraph, locator: &L, layer: &mut S) -> SyncReport
where
    L: ConnectorLocator + ?Sized,
    S: OverlaySurface + ?Sized,
{
    layer.clear();
    let mut report = SyncReport::default();

    for wire in graph.wires() {
        let (Some(start), Some(end)) = (locator.resolve(wire.start()), locator.resolve(wire.end()))
        else {
            report.unresolved.push(wire.key);
            continue;
        };
        layer.line(Line::new(start.top_left(), end.top_left()));
        report.drawn += 1;
    }

    if !report.is_clean() {
        log::debug!("{} wire(s) unresolved this pass", report.unresolved.len());
    }
    report
}

/// Clear the transient layer and draw the in-progress wire.
pub fn redraw_preview<S>(layer: &mut S, from: (f32, f32), to: (f32, f32))
where
    S: OverlaySurface + ?Sized,
{
    layer.clear();
    layer.line(Line::new(from, to));
}

pub fn clear_layer<S>(layer: &mut S)
where
    S: OverlaySurface + ?Sized,
{
    layer.clear();
}
