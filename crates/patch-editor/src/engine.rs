//! Patch engine: owns the graph, the rendering surface, both overlay layers,
//! the interaction tools and the engine bridge.
//!
//! Pointer events are routed by what sits under the pointer: a connector
//! feeds the [`WireTool`], a box body feeds the [`DragTool`]. Tools return
//! actions or [`PatchMutation`]s; the engine applies them to the graph and
//! forwards the matching commands to the bridge. It then drains the graph's
//! event log and reruns the render synchronizer accordingly.
//!
//! Two kinds of wire pass exist:
//!
//! - **frame**: full redraw of the wire layer; runs on every position change.
//! - **settle**: a frame pass that also prunes wires whose endpoints no longer
//!   resolve, telling the engine to disconnect each one. Runs on drag end and
//!   after a box is removed.

use crate::bridge::EngineBridge;
use crate::field::ModuleField;
use crate::input::{InputEvent, Modifiers};
use crate::tools::DragTool;
use crate::wiring::{WireAction, WireActions, WireGesture, WireTool};
use patch_core::command::EngineCommand;
use patch_core::id::BoxId;
use patch_core::model::{BoxAttrs, GraphEvent, ModuleUpdate, PatchGraph, WireKey};
use patch_core::parser::ModuleCommand;
use patch_render::canvas::WorkspaceConfig;
use patch_render::paint::DisplayList;
use patch_render::surface::{BoxLayout, BoxSurface};
use patch_render::sync::{SyncReport, clear_layer, redraw_preview, redraw_wires};
use smallvec::SmallVec;
use std::collections::HashMap;

/// A change to the patch, produced by interaction and applied by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchMutation {
    RemoveBox {
        id: BoxId,
    },
    ApplyModule {
        id: BoxId,
        token: String,
        command: ModuleCommand,
    },
    Connect {
        start: BoxId,
        end: BoxId,
    },
    RemoveWires {
        keys: SmallVec<[WireKey; 4]>,
    },
    MoveBox {
        id: BoxId,
        dx: f32,
        dy: f32,
    },
}

pub struct PatchEngine<S: BoxSurface = BoxLayout> {
    graph: PatchGraph,
    surface: S,
    config: WorkspaceConfig,
    /// Committed wires, rebuilt every pass.
    wires_layer: DisplayList,
    /// In-progress wire preview.
    preview_layer: DisplayList,
    wire_tool: WireTool,
    drag_tool: DragTool,
    fields: HashMap<BoxId, ModuleField>,
    bridge: Box<dyn EngineBridge>,
    mounted: bool,
}

impl PatchEngine<BoxLayout> {
    /// Engine over the native in-memory box layout.
    pub fn native(config: WorkspaceConfig, bridge: Box<dyn EngineBridge>) -> Self {
        Self::new(BoxLayout::new(config), config, bridge)
    }
}

impl<S: BoxSurface> PatchEngine<S> {
    pub fn new(surface: S, config: WorkspaceConfig, bridge: Box<dyn EngineBridge>) -> Self {
        Self {
            graph: PatchGraph::new(),
            surface,
            config,
            wires_layer: DisplayList::new(),
            preview_layer: DisplayList::new(),
            wire_tool: WireTool::new(),
            drag_tool: DragTool::new(),
            fields: HashMap::new(),
            bridge,
            mounted: false,
        }
    }

    // ─── Lifecycle ───────────────────────────────────────────────────────

    /// Announce the workspace to the signal engine and draw the first pass.
    /// Mounting twice is a no-op.
    pub fn mount(&mut self) -> bool {
        if self.mounted {
            return false;
        }
        self.mounted = true;
        log::debug!(
            "mount workspace {}x{}",
            self.config.width,
            self.config.height
        );
        self.bridge.invoke(&EngineCommand::init());
        self.frame_pass();
        true
    }

    /// Abort any gesture and tell the signal engine to stop.
    pub fn shutdown(&mut self) {
        self.wire_tool.cancel();
        self.drag_tool.cancel();
        clear_layer(&mut self.preview_layer);
        self.bridge.invoke(&EngineCommand::exit());
    }

    // ─── Boxes ───────────────────────────────────────────────────────────

    /// Place a new box. Without a position the surface picks a spawn point.
    pub fn add_box(&mut self, position: Option<(f32, f32)>) -> BoxId {
        let id = self.graph.add_box(BoxAttrs {
            position,
            module: None,
        });
        if let Some(b) = self.graph.get_box(id) {
            self.surface.mount(b);
        }
        self.fields.insert(id, ModuleField::new());
        self.react();
        id
    }

    /// Remove a box, cancel any gesture rooted at it and prune its wires.
    /// Returns `false` if no such box exists.
    pub fn remove_box(&mut self, id: BoxId) -> bool {
        self.apply_mutation(PatchMutation::RemoveBox { id })
    }

    /// Feed the full current text of a box's module field.
    ///
    /// Returns `true` when the text was accepted. Acceptance records the
    /// token on the box and sends exactly one module command.
    pub fn apply_module_text(&mut self, id: BoxId, text: &str) -> bool {
        let Some(field) = self.fields.get_mut(&id) else {
            log::warn!("apply_module_text: no box {id}");
            return false;
        };
        let Some(accepted) = field.input(text) else {
            return false;
        };
        self.apply_mutation(PatchMutation::ApplyModule {
            id,
            token: accepted.token,
            command: accepted.command,
        })
    }

    // ─── Pointer input ───────────────────────────────────────────────────

    /// Returns `true` if a layer changed and needs repainting.
    pub fn handle_pointer_down(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        let event = InputEvent::from_pointer_down(x, y, modifiers);
        if let Some(hit) = self.surface.connector_at(x, y) {
            self.drag_tool.cancel();
            let actions = self.wire_tool.handle(&event, Some(hit), &self.surface);
            return self.run_wire_actions(actions);
        }
        let hit_box = self.surface.box_at(x, y);
        self.drag_tool.handle(&event, hit_box);
        false
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        let event = InputEvent::from_pointer_move(x, y, modifiers);
        if self.wire_tool.is_dragging() {
            // Moves never commit, so no hit test.
            let actions = self.wire_tool.handle(&event, None, &self.surface);
            return self.run_wire_actions(actions);
        }
        let mutations = self.drag_tool.handle(&event, None);
        if mutations.is_empty() {
            return false;
        }
        for mutation in mutations {
            self.apply_mutation(mutation);
        }
        true
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32, modifiers: Modifiers) -> bool {
        let event = InputEvent::from_pointer_up(x, y, modifiers);
        if self.wire_tool.is_dragging() {
            let hit = self.surface.connector_at(x, y);
            let actions = self.wire_tool.handle(&event, hit, &self.surface);
            return self.run_wire_actions(actions);
        }
        if self.drag_tool.dragging().is_some() {
            self.drag_tool.handle(&event, None);
            self.settle_pass();
            return true;
        }
        false
    }

    /// A host-owned drag moved a box. Redraws wires without pruning.
    pub fn drag_frame(&mut self) -> SyncReport {
        self.frame_pass()
    }

    /// A host-owned drag ended. Redraws and prunes; returns how many wires
    /// were removed.
    pub fn drag_end(&mut self) -> usize {
        self.settle_pass()
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Apply one mutation, forward the engine command it implies and run
    /// the render pass the resulting graph events call for.
    /// Returns `true` if anything changed.
    pub fn apply_mutation(&mut self, mutation: PatchMutation) -> bool {
        let moved = matches!(mutation, PatchMutation::MoveBox { .. });
        let changed = self.apply(mutation);
        // Box positions live on the surface and record no graph event.
        if moved && changed {
            self.frame_pass();
        }
        self.react();
        changed
    }

    fn apply(&mut self, mutation: PatchMutation) -> bool {
        match mutation {
            PatchMutation::RemoveBox { id } => {
                if !self.graph.remove_box(id) {
                    return false;
                }
                if self.wire_tool.start() == Some(id) {
                    self.wire_tool.cancel();
                    clear_layer(&mut self.preview_layer);
                }
                if self.drag_tool.dragging() == Some(id) {
                    self.drag_tool.cancel();
                }
                self.surface.unmount(id);
                self.fields.remove(&id);
                self.bridge.invoke(&EngineCommand::remove_module(id));
                true
            }
            PatchMutation::ApplyModule { id, token, command } => {
                if !self.graph.apply_module(ModuleUpdate { id, module: token }) {
                    return false;
                }
                self.bridge.invoke(&command.to_engine(id));
                true
            }
            PatchMutation::Connect { start, end } => {
                if start == end {
                    return false;
                }
                self.graph.set_wires([(start, end)]);
                self.bridge.invoke(&EngineCommand::connect_wire(start, end));
                true
            }
            PatchMutation::RemoveWires { keys } => {
                // Wire identity is gone after removal; collect endpoints first.
                let pruned: SmallVec<[WireKey; 4]> = keys
                    .iter()
                    .filter(|k| self.graph.get_wire(**k).is_some())
                    .copied()
                    .collect();
                if self.graph.remove_wires(&pruned) == 0 {
                    return false;
                }
                for key in &pruned {
                    self.bridge
                        .invoke(&EngineCommand::disconnect_wire(key.start, key.end));
                }
                true
            }
            PatchMutation::MoveBox { id, dx, dy } => {
                self.surface.move_box(id, dx, dy);
                true
            }
        }
    }

    fn run_wire_actions(&mut self, actions: WireActions) -> bool {
        let mut repaint = false;
        for action in actions {
            match action {
                WireAction::DrawPreview { from, to } => {
                    redraw_preview(&mut self.preview_layer, from, to);
                    repaint = true;
                }
                WireAction::ClearPreview => {
                    clear_layer(&mut self.preview_layer);
                    repaint = true;
                }
                WireAction::Connect { start, end } => {
                    repaint |= self.apply_mutation(PatchMutation::Connect { start, end });
                }
            }
        }
        repaint
    }

    // ─── Passes ──────────────────────────────────────────────────────────

    /// Drain the graph's event log and run the pass it calls for: a settle
    /// pass when a box went away, a frame pass for any other change.
    fn react(&mut self) {
        let events = self.graph.drain_events();
        if events.is_empty() {
            return;
        }
        if events.iter().any(|e| matches!(e, GraphEvent::BoxRemoved(_))) {
            self.settle_pass();
        } else {
            self.frame_pass();
        }
    }

    fn frame_pass(&mut self) -> SyncReport {
        redraw_wires(&self.graph, &self.surface, &mut self.wires_layer)
    }

    fn settle_pass(&mut self) -> usize {
        let report = self.frame_pass();
        if report.is_clean() {
            return 0;
        }
        let count = report.unresolved.len();
        log::debug!("settle: pruning {count} wire(s)");
        self.apply(PatchMutation::RemoveWires {
            keys: report.unresolved,
        });
        // The layer already omits the pruned wires.
        self.graph.drain_events();
        count
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn graph(&self) -> &PatchGraph {
        &self.graph
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for hosts that move boxes themselves. Follow up with
    /// [`drag_frame`](Self::drag_frame) or [`drag_end`](Self::drag_end).
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn wires_layer(&self) -> &DisplayList {
        &self.wires_layer
    }

    pub fn preview_layer(&self) -> &DisplayList {
        &self.preview_layer
    }

    pub fn field(&self, id: BoxId) -> Option<&ModuleField> {
        self.fields.get(&id)
    }

    pub fn wire_gesture(&self) -> WireGesture {
        self.wire_tool.gesture()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patch_core::command::Route;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Bridge whose log stays readable after the engine takes ownership.
    #[derive(Clone, Default)]
    struct Shared(Rc<RefCell<Vec<EngineCommand>>>);

    impl EngineBridge for Shared {
        fn invoke(&mut self, command: &EngineCommand) {
            self.0.borrow_mut().push(command.clone());
        }
    }

    impl Shared {
        fn take(&self) -> Vec<EngineCommand> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    fn engine() -> (PatchEngine, Shared) {
        let sent = Shared::default();
        let mut engine = PatchEngine::native(WorkspaceConfig::default(), Box::new(sent.clone()));
        engine.mount();
        (engine, sent)
    }

    #[test]
    fn mount_sends_init_once() {
        let (mut engine, sent) = engine();
        assert!(!engine.mount());
        assert_eq!(sent.take(), vec![EngineCommand::init()]);
    }

    #[test]
    fn connector_gesture_commits_wire() {
        let (mut engine, sent) = engine();
        sent.take();
        let a = engine.add_box(Some((0.0, 0.0)));
        let b = engine.add_box(Some((300.0, 0.0)));

        engine.handle_pointer_down(5.0, 5.0, Modifiers::NONE);
        assert!(engine.handle_pointer_move(150.0, 40.0, Modifiers::NONE));
        assert_eq!(engine.preview_layer().lines().len(), 1);

        assert!(engine.handle_pointer_up(303.0, 3.0, Modifiers::NONE));
        assert!(engine.preview_layer().is_empty());
        assert_eq!(engine.graph().wires().len(), 1);
        assert_eq!(engine.wires_layer().lines().len(), 1);
        assert_eq!(sent.take(), vec![EngineCommand::connect_wire(a, b)]);
        assert_eq!(engine.wire_gesture(), WireGesture::Idle);
    }

    #[test]
    fn body_drag_moves_box_and_line() {
        let (mut engine, _) = engine();
        let a = engine.add_box(Some((0.0, 0.0)));
        let b = engine.add_box(Some((300.0, 0.0)));
        engine.apply_mutation(PatchMutation::Connect { start: a, end: b });

        // Body, not the connector square.
        engine.handle_pointer_down(60.0, 30.0, Modifiers::NONE);
        assert!(engine.handle_pointer_move(80.0, 50.0, Modifiers::NONE));
        assert_eq!(engine.wires_layer().lines()[0].from(), (20.0, 20.0));
        assert!(engine.handle_pointer_up(80.0, 50.0, Modifiers::NONE));
        assert_eq!(engine.graph().wires().len(), 1);
    }

    #[test]
    fn removing_gesture_root_cancels_gesture() {
        let (mut engine, sent) = engine();
        let a = engine.add_box(Some((0.0, 0.0)));
        engine.handle_pointer_down(5.0, 5.0, Modifiers::NONE);
        engine.handle_pointer_move(50.0, 50.0, Modifiers::NONE);
        sent.take();

        assert!(engine.remove_box(a));
        assert_eq!(engine.wire_gesture(), WireGesture::Idle);
        assert!(engine.preview_layer().is_empty());
        assert_eq!(sent.take(), vec![EngineCommand::remove_module(a)]);
        assert!(!engine.remove_box(a));
    }

    #[test]
    fn unknown_box_text_sends_nothing() {
        let (mut engine, sent) = engine();
        sent.take();
        let ghost = BoxId::intern("engine_ghost");
        assert!(!engine.apply_module_text(ghost, "sin"));
        assert!(sent.take().is_empty());
    }

    #[test]
    fn accepted_text_routes_as_module_command() {
        let (mut engine, sent) = engine();
        let a = engine.add_box(None);
        sent.take();
        assert!(engine.apply_module_text(a, "freq 4.2"));
        let cmds = sent.take();
        assert_eq!(cmds.len(), 1);
        match cmds[0].route() {
            Route::Module { kind, value, id } => {
                assert_eq!(kind, "freq");
                assert_eq!(value, "NaN");
                assert_eq!(id, a.as_str());
            }
            other => panic!("expected module route, got {other:?}"),
        }
        // Locked now.
        assert!(!engine.apply_module_text(a, "out"));
        assert_eq!(engine.field(a).map(|f| f.text()), Some("freq 4.2"));
    }

    #[test]
    fn remove_wires_with_stale_keys_is_noop() {
        let (mut engine, sent) = engine();
        let a = engine.add_box(Some((0.0, 0.0)));
        let b = engine.add_box(Some((300.0, 0.0)));
        engine.apply_mutation(PatchMutation::Connect { start: a, end: b });
        sent.take();
        let stale = WireKey {
            start: a,
            end: b,
            seq: 999,
        };
        let mut keys = SmallVec::new();
        keys.push(stale);
        assert!(!engine.apply_mutation(PatchMutation::RemoveWires { keys }));
        assert!(sent.take().is_empty());
        assert_eq!(engine.graph().wires().len(), 1);
    }

    #[test]
    fn shutdown_sends_exit() {
        let (mut engine, sent) = engine();
        sent.take();
        engine.shutdown();
        assert_eq!(sent.take(), vec![EngineCommand::exit()]);
    }

    #[test]
    fn event_log_is_drained_every_step() {
        let (mut engine, _) = engine();
        for _ in 0..1000 {
            let id = engine.add_box(None);
            engine.apply_module_text(id, "out");
            engine.remove_box(id);
        }
        let a = engine.add_box(Some((0.0, 0.0)));
        let b = engine.add_box(Some((300.0, 0.0)));
        engine.apply_mutation(PatchMutation::Connect { start: a, end: b });
        engine.remove_box(b);
        assert!(engine.graph().pending_events().is_empty());
    }

    #[test]
    fn remove_box_mutation_cancels_gesture_and_prunes() {
        let (mut engine, sent) = engine();
        let a = engine.add_box(Some((0.0, 0.0)));
        let b = engine.add_box(Some((300.0, 0.0)));
        engine.apply_mutation(PatchMutation::Connect { start: a, end: b });
        engine.handle_pointer_down(5.0, 5.0, Modifiers::NONE);
        engine.handle_pointer_move(50.0, 50.0, Modifiers::NONE);
        sent.take();

        assert!(engine.apply_mutation(PatchMutation::RemoveBox { id: a }));

        assert_eq!(engine.wire_gesture(), WireGesture::Idle);
        assert!(engine.preview_layer().is_empty());
        assert!(engine.graph().wires().is_empty());
        assert!(engine.wires_layer().is_empty());
        assert_eq!(
            sent.take(),
            vec![
                EngineCommand::remove_module(a),
                EngineCommand::disconnect_wire(a, b)
            ]
        );
    }

    #[test]
    fn wire_drag_moves_skip_hit_testing() {
        use patch_core::model::{Bounds, PatchBox};
        use patch_render::surface::ConnectorLocator;
        use std::cell::Cell;

        struct Counting {
            inner: BoxLayout,
            lookups: Cell<usize>,
        }

        impl ConnectorLocator for Counting {
            fn resolve(&self, id: BoxId) -> Option<Bounds> {
                self.inner.resolve(id)
            }

            fn connector_at(&self, x: f32, y: f32) -> Option<BoxId> {
                self.lookups.set(self.lookups.get() + 1);
                self.inner.connector_at(x, y)
            }
        }

        impl BoxSurface for Counting {
            fn mount(&mut self, b: &PatchBox) {
                self.inner.mount(b);
            }

            fn unmount(&mut self, id: BoxId) {
                self.inner.unmount(id);
            }
        }

        let surface = Counting {
            inner: BoxLayout::new(WorkspaceConfig::default()),
            lookups: Cell::new(0),
        };
        let mut engine = PatchEngine::new(
            surface,
            WorkspaceConfig::default(),
            Box::new(Shared::default()),
        );
        engine.add_box(Some((0.0, 0.0)));
        engine.add_box(Some((300.0, 0.0)));

        engine.handle_pointer_down(5.0, 5.0, Modifiers::NONE);
        for step in 0..10 {
            engine.handle_pointer_move(20.0 + step as f32 * 20.0, 10.0, Modifiers::NONE);
        }
        assert_eq!(engine.surface().lookups.get(), 1);
        engine.handle_pointer_up(303.0, 3.0, Modifiers::NONE);
        assert_eq!(engine.surface().lookups.get(), 2);
        assert_eq!(engine.graph().wires().len(), 1);
    }
}
