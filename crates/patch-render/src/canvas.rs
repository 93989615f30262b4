//! Workspace configuration.
//!
//! Overlay canvases are sized to the workspace once, at mount. Resizing the
//! workspace afterwards is not tracked.

/// Workspace and overlay geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkspaceConfig {
    pub width: f32,
    pub height: f32,
    /// Size of a box container.
    pub box_width: f32,
    pub box_height: f32,
    /// Side of the square connector at each box's top-left corner.
    pub connector_size: f32,
    /// Where the first box without an explicit position lands.
    pub spawn_origin: (f32, f32),
    /// Diagonal offset between successive unpositioned boxes.
    pub spawn_step: f32,
    /// Overlay stroke width.
    pub line_width: f32,
    /// Overlay stroke color, RGBA.
    pub line_color: [u8; 4],
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
            box_width: 120.0,
            box_height: 48.0,
            connector_size: 10.0,
            spawn_origin: (16.0, 56.0),
            spawn_step: 24.0,
            line_width: 1.0,
            line_color: [0, 0, 0, 255],
        }
    }
}

impl WorkspaceConfig {
    pub fn with_size(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }
}
