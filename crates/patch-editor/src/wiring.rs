//! Connector interaction state machine.
//!
//! Drives wire creation from pointer gestures:
//!
//! | State           | Event                     | Next            | Actions                       |
//! |-----------------|---------------------------|-----------------|-------------------------------|
//! | `Idle`          | down on resolvable connector | `DraggingWire` | -                            |
//! | `Idle`          | anything else             | `Idle`          | -                             |
//! | `DraggingWire`  | move                      | `DraggingWire`  | `DrawPreview`                 |
//! | `DraggingWire`  | up on connector ≠ start   | `Idle`          | `Connect`, `ClearPreview`     |
//! | `DraggingWire`  | up on start / off connector | `Idle`        | `ClearPreview`                |
//!
//! The gesture state lives only inside [`WireTool`] and is reset at the end
//! of every gesture whatever the outcome.

use crate::input::InputEvent;
use patch_core::id::BoxId;
use patch_render::surface::ConnectorLocator;
use smallvec::{SmallVec, smallvec};

/// Transient gesture state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum WireGesture {
    #[default]
    Idle,
    DraggingWire {
        start: BoxId,
        /// Center of the start connector at the last event.
        anchor: (f32, f32),
        pointer: (f32, f32),
    },
}

/// What the engine should do in response to an event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireAction {
    /// Redraw the transient layer with a line from `from` to `to`.
    DrawPreview { from: (f32, f32), to: (f32, f32) },
    ClearPreview,
    /// Commit a wire and tell the engine about it.
    Connect { start: BoxId, end: BoxId },
}

pub type WireActions = SmallVec<[WireAction; 2]>;

#[derive(Debug, Default)]
pub struct WireTool {
    gesture: WireGesture,
}

impl WireTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gesture(&self) -> WireGesture {
        self.gesture
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.gesture, WireGesture::DraggingWire { .. })
    }

    /// Connector the current gesture started from.
    pub fn start(&self) -> Option<BoxId> {
        match self.gesture {
            WireGesture::DraggingWire { start, .. } => Some(start),
            WireGesture::Idle => None,
        }
    }

    /// Abort any gesture in progress. Returns `true` if one was aborted.
    pub fn cancel(&mut self) -> bool {
        let was_dragging = self.is_dragging();
        self.gesture = WireGesture::Idle;
        was_dragging
    }

    /// Handle one pointer event. `hit` is the connector under the pointer,
    /// as reported by the rendering surface.
    pub fn handle<L>(&mut self, event: &InputEvent, hit: Option<BoxId>, locator: &L) -> WireActions
    where
        L: ConnectorLocator + ?Sized,
    {
        match *event {
            InputEvent::PointerDown { x, y, .. } => {
                let Some(start) = hit else {
                    return smallvec![];
                };
                // The pressed connector must still resolve to a rendered
                // element, otherwise there is nothing to anchor the wire to.
                let Some(bounds) = locator.resolve(start) else {
                    log::debug!("wire: connector {start} does not resolve, gesture ignored");
                    return self.reset();
                };
                let restarted = self.is_dragging();
                self.gesture = WireGesture::DraggingWire {
                    start,
                    anchor: bounds.center(),
                    pointer: (x, y),
                };
                log::debug!("wire: start at {start}");
                if restarted {
                    smallvec![WireAction::ClearPreview]
                } else {
                    smallvec![]
                }
            }
            InputEvent::PointerMove { x, y, .. } => {
                let WireGesture::DraggingWire { start, .. } = self.gesture else {
                    return smallvec![];
                };
                // Re-read the anchor every move; the start box may be moving.
                let Some(bounds) = locator.resolve(start) else {
                    log::debug!("wire: start connector {start} vanished mid-gesture");
                    return self.reset();
                };
                let anchor = bounds.center();
                self.gesture = WireGesture::DraggingWire {
                    start,
                    anchor,
                    pointer: (x, y),
                };
                smallvec![WireAction::DrawPreview {
                    from: anchor,
                    to: (x, y),
                }]
            }
            InputEvent::PointerUp { .. } => {
                let WireGesture::DraggingWire { start, .. } = self.gesture else {
                    return smallvec![];
                };
                let mut actions = WireActions::new();
                match hit {
                    Some(end) if end != start => {
                        log::debug!("wire: connect {start} -> {end}");
                        actions.push(WireAction::Connect { start, end });
                    }
                    Some(_) => log::debug!("wire: released on start connector, no wire"),
                    None => log::debug!("wire: released off any connector, no wire"),
                }
                actions.push(WireAction::ClearPreview);
                self.gesture = WireGesture::Idle;
                actions
            }
        }
    }

    fn reset(&mut self) -> WireActions {
        if self.cancel() {
            smallvec![WireAction::ClearPreview]
        } else {
            smallvec![]
        }
    }
}
