pub mod bridge;
pub mod engine;
pub mod field;
pub mod input;
pub mod tools;
pub mod wiring;

pub use bridge::{ChannelBridge, EngineBridge, LogBridge};
pub use engine::{PatchEngine, PatchMutation};
pub use field::{Accepted, ModuleField};
pub use input::{InputEvent, Modifiers};
pub use tools::DragTool;
pub use wiring::{WireAction, WireGesture, WireTool};
