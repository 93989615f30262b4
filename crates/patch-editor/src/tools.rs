//! Box drag tool.
//!
//! Moves a box when its body (not its connector) is pressed and dragged.
//! Only used when the rendering surface does not drag boxes itself.
//!
//! | Modifier  | Behavior                   |
//! |-----------|----------------------------|
//! | **Shift** | Constrain to dominant axis |

use crate::engine::PatchMutation;
use crate::input::InputEvent;
use patch_core::id::BoxId;

#[derive(Debug, Default)]
pub struct DragTool {
    /// Box being dragged, if any.
    dragging: Option<BoxId>,
    last_x: f32,
    last_y: f32,
}

impl DragTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dragging(&self) -> Option<BoxId> {
        self.dragging
    }

    pub fn cancel(&mut self) {
        self.dragging = None;
    }

    /// Handle an input event. `hit_box` is the box body under the pointer.
    pub fn handle(&mut self, event: &InputEvent, hit_box: Option<BoxId>) -> Vec<PatchMutation> {
        match *event {
            InputEvent::PointerDown { x, y, .. } => {
                self.dragging = hit_box;
                self.last_x = x;
                self.last_y = y;
                vec![]
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                let Some(id) = self.dragging else {
                    return vec![];
                };
                let mut dx = x - self.last_x;
                let mut dy = y - self.last_y;
                self.last_x = x;
                self.last_y = y;

                if modifiers.shift {
                    if dx.abs() > dy.abs() {
                        dy = 0.0;
                    } else {
                        dx = 0.0;
                    }
                }
                vec![PatchMutation::MoveBox { id, dx, dy }]
            }
            InputEvent::PointerUp { .. } => {
                self.dragging = None;
                vec![]
            }
        }
    }
}
