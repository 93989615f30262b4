//! Integration tests: patch graph model + module command parser.
//!
//! Exercises the public surface of `patch-core` the way the editor uses it:
//! boxes come and go, wires accumulate, module text is gated and applied.

use patch_core::*;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

// ─── Helpers ─────────────────────────────────────────────────────────────

/// Small deterministic generator so add/remove mixes are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

fn assert_unique_ids(graph: &PatchGraph) {
    let mut seen = HashSet::new();
    for b in graph.boxes() {
        assert!(seen.insert(b.id), "duplicate box id {:?}", b.id);
    }
}

// ─── Boxes ───────────────────────────────────────────────────────────────

#[test]
fn box_ids_stay_unique_under_add_remove_mix() {
    let mut graph = PatchGraph::new();
    let mut rng = Lcg(7);
    for _ in 0..500 {
        if rng.next() % 3 == 0 && !graph.boxes().is_empty() {
            let idx = (rng.next() as usize) % graph.boxes().len();
            let id = graph.boxes()[idx].id;
            assert!(graph.remove_box(id));
        } else {
            graph.add_box(BoxAttrs::at(rng.next() as f32, rng.next() as f32));
        }
        assert_unique_ids(&graph);
    }
}

#[test]
fn events_report_every_mutation_kind() {
    let mut graph = PatchGraph::new();
    let a = graph.add_box(BoxAttrs::default());
    let b = graph.add_box(BoxAttrs::default());
    graph.apply_module(ModuleUpdate {
        id: a,
        module: "sin".into(),
    });
    let keys = graph.set_wires([(a, b)]);
    graph.remove_wires(&keys);
    graph.remove_box(b);

    let events = graph.drain_events();
    assert_eq!(events.len(), 6);
    assert!(matches!(events[0], GraphEvent::BoxAdded(id) if id == a));
    assert!(matches!(events[2], GraphEvent::ModuleApplied { id, .. } if id == a));
    assert!(matches!(&events[3], GraphEvent::WiresAdded(k) if k.as_slice() == keys.as_slice()));
    assert!(matches!(&events[4], GraphEvent::WiresRemoved(k) if k.len() == 1));
    assert!(matches!(events[5], GraphEvent::BoxRemoved(id) if id == b));
    assert!(graph.drain_events().is_empty());
}

// ─── Wires ───────────────────────────────────────────────────────────────

#[test]
fn set_wires_appends_batches_in_order() {
    let mut graph = PatchGraph::new();
    let a = graph.add_box(BoxAttrs::default());
    let b = graph.add_box(BoxAttrs::default());
    let c = graph.add_box(BoxAttrs::default());
    graph.set_wires([(a, b), (b, c)]);
    graph.set_wires([(c, a)]);

    let pairs: Vec<(BoxId, BoxId)> = graph.wires().iter().map(|w| (w.start(), w.end())).collect();
    assert_eq!(pairs, vec![(a, b), (b, c), (c, a)]);
    assert_eq!(graph.wires_touching(b).len(), 2);
}

#[test]
fn remove_wires_by_key_leaves_twin_wire() {
    let mut graph = PatchGraph::new();
    let a = graph.add_box(BoxAttrs::default());
    let b = graph.add_box(BoxAttrs::default());
    let keys = graph.set_wires([(a, b), (a, b)]);
    assert_eq!(graph.remove_wires(&keys[..1]), 1);
    assert_eq!(graph.wires().len(), 1);
    assert!(graph.get_wire(keys[1]).is_some());
    assert!(graph.get_wire(keys[0]).is_none());
}

// ─── Module text ─────────────────────────────────────────────────────────

#[test]
fn accepted_text_flows_into_the_model() {
    let mut graph = PatchGraph::new();
    let id = graph.add_box(BoxAttrs::default());

    assert_eq!(recognize("bogus"), None);

    let token = recognize(" 4.2 ").expect("decimal should be accepted");
    assert_eq!(classify(token), ModuleCommand::Freq(4.2));
    assert!(graph.apply_module(ModuleUpdate {
        id,
        module: token.to_string(),
    }));
    assert_eq!(graph.get_box(id).unwrap().module.as_deref(), Some("4.2"));
}

#[test]
fn engine_commands_serialize_for_the_host() {
    let id = BoxId::intern("it_osc");
    let json = classify("square").to_engine(id).to_json();
    assert_eq!(
        json,
        r#"{"cmd":"module","type":"osc","value":"square","id":"it_osc"}"#
    );
    let back = EngineCommand::from_json(&json).unwrap();
    assert_eq!(
        back.route(),
        Route::Module {
            kind: "osc",
            value: "square",
            id: "it_osc"
        }
    );
}
