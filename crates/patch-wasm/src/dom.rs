//! DOM-backed box surface.
//!
//! Each box is a positioned container `div` holding a connector `div` that
//! carries the box id in `data-id`. The page's drag library owns container
//! positions after mount, so connector rectangles are always read back from
//! the live DOM. Coordinates are made relative to the workspace element.

use patch_core::id::BoxId;
use patch_core::model::{Bounds, PatchBox};
use patch_render::canvas::WorkspaceConfig;
use patch_render::surface::{BoxSurface, ConnectorLocator};
use web_sys::{Document, Element};

pub struct DomSurface {
    document: Document,
    workspace: Element,
    config: WorkspaceConfig,
    spawned: usize,
}

impl DomSurface {
    /// Attach to the workspace element with the given DOM id. The workspace
    /// size is read from the element's bounding box, once.
    pub fn attach(workspace_id: &str) -> Result<Self, String> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| "No document available".to_string())?;
        let workspace = document
            .get_element_by_id(workspace_id)
            .ok_or_else(|| format!("Workspace element #{workspace_id} not found"))?;
        let rect = workspace.get_bounding_client_rect();
        let config = workspace_config(rect.width(), rect.height())
            .map_err(|e| format!("Workspace element #{workspace_id}: {e}"))?;
        Ok(Self {
            document,
            workspace,
            config,
            spawned: 0,
        })
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    fn connector_element(&self, id: BoxId) -> Option<Element> {
        let selector = format!("[data-id=\"{}\"]", id.as_str());
        self.workspace.query_selector(&selector).ok().flatten()
    }

    fn container_element(&self, id: BoxId) -> Option<Element> {
        self.connector_element(id)?.parent_element()
    }

    fn origin(&self) -> (f32, f32) {
        let rect = self.workspace.get_bounding_client_rect();
        (rect.x() as f32, rect.y() as f32)
    }

    fn create_box(&mut self, b: &PatchBox) -> Result<(), String> {
        let (x, y) = b.position.unwrap_or_else(|| {
            let (ox, oy) = self.config.spawn_origin;
            let offset = self.spawned as f32 * self.config.spawn_step;
            self.spawned += 1;
            (ox + offset, oy + offset)
        });
        let container = self.create_div("patch-box")?;
        container
            .set_attribute(
                "style",
                &format!(
                    "position:absolute;left:{x}px;top:{y}px;width:{}px;height:{}px",
                    self.config.box_width, self.config.box_height
                ),
            )
            .map_err(|e| format!("Box style error: {e:?}"))?;

        let connector = self.create_div("patch-connector")?;
        connector
            .set_attribute("data-id", b.id.as_str())
            .map_err(|e| format!("Connector id error: {e:?}"))?;
        let size = self.config.connector_size;
        connector
            .set_attribute(
                "style",
                &format!("position:absolute;left:0;top:0;width:{size}px;height:{size}px"),
            )
            .map_err(|e| format!("Connector style error: {e:?}"))?;

        container
            .append_child(&connector)
            .map_err(|e| format!("Box mount error: {e:?}"))?;
        self.workspace
            .append_child(&container)
            .map_err(|e| format!("Box mount error: {e:?}"))?;
        Ok(())
    }

    fn create_div(&self, class: &str) -> Result<Element, String> {
        let el = self
            .document
            .create_element("div")
            .map_err(|e| format!("Element creation error: {e:?}"))?;
        el.set_class_name(class);
        Ok(el)
    }
}

/// Workspace geometry for a laid-out workspace of `width` x `height`.
fn workspace_config(width: f64, height: f64) -> Result<WorkspaceConfig, String> {
    if !(width > 0.0 && height > 0.0) {
        return Err(format!("no layout size ({width}x{height})"));
    }
    Ok(WorkspaceConfig::with_size(width as f32, height as f32))
}

impl ConnectorLocator for DomSurface {
    fn resolve(&self, id: BoxId) -> Option<Bounds> {
        let rect = self.connector_element(id)?.get_bounding_client_rect();
        let (ox, oy) = self.origin();
        Some(Bounds::new(
            rect.x() as f32 - ox,
            rect.y() as f32 - oy,
            rect.width() as f32,
            rect.height() as f32,
        ))
    }

    fn connector_at(&self, x: f32, y: f32) -> Option<BoxId> {
        let (ox, oy) = self.origin();
        let hit = self.document.element_from_point(x + ox, y + oy)?;
        // Only the connector itself carries the id; a press on the box
        // body or its text field never starts a wire.
        let name = hit.get_attribute("data-id")?;
        BoxId::lookup(&name)
    }
}

impl BoxSurface for DomSurface {
    fn mount(&mut self, b: &PatchBox) {
        if self.connector_element(b.id).is_some() {
            return;
        }
        if let Err(e) = self.create_box(b) {
            log::warn!("mount {}: {e}", b.id);
        }
    }

    fn unmount(&mut self, id: BoxId) {
        if let Some(container) = self.container_element(id) {
            container.remove();
        }
    }
}
