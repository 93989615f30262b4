pub mod canvas;
pub mod paint;
pub mod surface;
pub mod sync;

pub use canvas::WorkspaceConfig;
pub use paint::{DisplayList, Line, OverlaySurface, SceneOverlay};
pub use surface::{BoxLayout, BoxSurface, ConnectorLocator};
pub use sync::{SyncReport, clear_layer, redraw_preview, redraw_wires};
