use std::cell::RefCell;
use std::rc::Rc;

use pollster::block_on;
use synapse_canvas::auth::{
	AuthProvider, AuthState, EDITOR_PATH, GateDecision, LOGIN_PATH, MemoryAuth, gate_decision, watch,
};
use synapse_canvas::components::graph_editor::{
	Action, EditorRuntime, EditorState, Graph, Key, LayoutParams, LinkKey, Modifiers, NodeId, ScreenPoint,
	Selection, Simulation,
};
use synapse_canvas::config::{AppConfig, EditorConfig};

/// Nodes 0, 1, 2 at fixed spots with links 0->1 and 1->2, viewed at scale 1.
fn chain() -> EditorRuntime {
	let mut graph = Graph::new();
	for (x, y) in [(300.0, 200.0), (800.0, 200.0), (800.0, 600.0)] {
		graph.add_node(x, y);
	}
	graph.add_or_toggle_edge(NodeId(0), NodeId(1)).unwrap();
	graph.add_or_toggle_edge(NodeId(1), NodeId(2)).unwrap();
	let config = EditorConfig::default();
	let layout = Simulation::new(config.layout, 1200.0, 800.0);
	EditorRuntime::from_parts(EditorState::with_graph(graph, config), layout)
}

fn handle(runtime: &EditorRuntime, id: u32) -> ScreenPoint {
	runtime.editor.node_screen_position(NodeId(id)).unwrap()
}

fn press(runtime: &mut EditorRuntime, at: ScreenPoint) {
	runtime.dispatch(Action::PointerDown {
		at,
		modifiers: Modifiers::default(),
	});
}

fn gesture(runtime: &mut EditorRuntime, path: &[ScreenPoint]) {
	let (first, rest) = path.split_first().unwrap();
	press(runtime, *first);
	for at in rest {
		runtime.dispatch(Action::PointerMove { at: *at });
	}
	runtime.dispatch(Action::PointerUp {
		at: *path.last().unwrap(),
	});
}

fn link_key(a: u32, b: u32) -> LinkKey {
	LinkKey::between(NodeId(a), NodeId(b)).unwrap()
}

#[test]
fn connecting_two_and_zero_adds_a_right_link_from_zero() {
	let mut rt = chain();
	let (from, to) = (handle(&rt, 0), handle(&rt, 2));
	gesture(&mut rt, &[from, ScreenPoint::new(550.0, 400.0), to]);

	assert_eq!(rt.editor.graph.link_count(), 3);
	let link = rt.editor.graph.link(link_key(0, 2)).expect("link 0-2");
	assert_eq!((link.source, link.target), (NodeId(0), NodeId(2)));
	assert!(link.right);
	assert!(!link.left);
	assert_eq!(rt.editor.selection, Selection::Link(link_key(0, 2)));
	assert_eq!(rt.scene.links.len(), 3);
	assert!(rt.layout.is_running(), "structural change restarts the layout");
}

#[test]
fn dragging_a_node_onto_itself_adds_nothing() {
	let mut rt = chain();
	let p = handle(&rt, 1);
	gesture(
		&mut rt,
		&[p, ScreenPoint::new(950.0, 350.0), ScreenPoint::new(p.x + 1.0, p.y + 1.0)],
	);
	assert_eq!(rt.editor.graph.link_count(), 2);
	assert_eq!(rt.editor.selection, Selection::Node(NodeId(1)));
}

#[test]
fn lower_id_is_source_for_every_pair_and_gesture_direction() {
	let mut graph = Graph::new();
	for i in 0..5 {
		graph.add_node(i as f64 * 10.0, 0.0);
	}
	for a in 0..5 {
		for b in (a + 1)..5 {
			for (from, to) in [(a, b), (b, a)] {
				let key = graph.add_or_toggle_edge(NodeId(from), NodeId(to)).unwrap();
				assert_eq!((key.source(), key.target()), (NodeId(a), NodeId(b)));
			}
			let link = graph.link(link_key(a, b)).unwrap();
			assert!(link.left && link.right, "both gestures share one record");
		}
	}
	assert_eq!(graph.link_count(), 10);
}

#[test]
fn repeating_a_connect_gesture_is_idempotent() {
	let mut rt = chain();
	for _ in 0..2 {
		let (from, to) = (handle(&rt, 0), handle(&rt, 1));
		gesture(&mut rt, &[from, ScreenPoint::new(500.0, 300.0), to]);
	}
	assert_eq!(rt.editor.graph.link_count(), 2);
	let link = rt.editor.graph.link(link_key(0, 1)).unwrap();
	assert!(link.right && !link.left);
}

#[test]
fn deleting_a_selected_node_cascades_and_clears_selection() {
	let mut rt = chain();
	let p = handle(&rt, 1);
	gesture(&mut rt, &[p]);
	assert_eq!(rt.editor.selection, Selection::Node(NodeId(1)));

	let incident = rt.editor.graph.degree(NodeId(1));
	let before = rt.editor.graph.link_count();
	rt.dispatch(Action::Key(Key::Delete));

	assert_eq!(rt.editor.graph.link_count(), before - incident);
	assert!(!rt.editor.graph.contains_node(NodeId(1)));
	assert_eq!(rt.editor.selection, Selection::None);
	assert_eq!(rt.scene.nodes.len(), 2);
	assert_eq!(rt.scene.links.len(), 0);
}

#[test]
fn deleting_a_selected_link_keeps_its_nodes() {
	let mut rt = chain();
	press(&mut rt, ScreenPoint::new(550.0, 200.0));
	rt.dispatch(Action::PointerUp {
		at: ScreenPoint::new(550.0, 200.0),
	});
	assert_eq!(rt.editor.selection, Selection::Link(link_key(0, 1)));

	rt.dispatch(Action::Key(Key::Delete));
	assert_eq!(rt.editor.graph.link_count(), 1);
	assert_eq!(rt.editor.graph.node_count(), 3);
}

#[test]
fn node_and_link_selection_exclude_each_other() {
	let mut rt = chain();
	let on_link = ScreenPoint::new(550.0, 200.0);
	gesture(&mut rt, &[on_link]);
	assert_eq!(rt.editor.selection, Selection::Link(link_key(0, 1)));

	let p = handle(&rt, 2);
	gesture(&mut rt, &[p]);
	assert_eq!(rt.editor.selection, Selection::Node(NodeId(2)));

	gesture(&mut rt, &[on_link]);
	assert_eq!(rt.editor.selection, Selection::Link(link_key(0, 1)));
	assert!(rt.scene.links.get(&link_key(0, 1)).unwrap().selected);
	assert!(rt.scene.nodes.values_mut().all(|visual| !visual.selected));
}

#[test]
fn raising_a_node_keeps_every_visual() {
	let mut rt = chain();
	let nodes_before = rt.scene.nodes.len();
	let p = handle(&rt, 0);
	press(&mut rt, p);
	assert_eq!(rt.editor.graph.node_ids().last(), Some(NodeId(0)));
	assert_eq!(rt.scene.nodes.len(), nodes_before);
	assert!(rt.scene.nodes.get(&NodeId(0)).is_some());
}

#[test]
fn zoom_is_clamped_to_quarter_and_one() {
	let mut rt = chain();
	let center = ScreenPoint::new(600.0, 400.0);
	for _ in 0..40 {
		rt.dispatch(Action::Wheel {
			at: center,
			delta_y: 120.0,
		});
	}
	assert_eq!(rt.editor.viewport.scale(), 0.25);
	for _ in 0..40 {
		rt.dispatch(Action::Wheel {
			at: center,
			delta_y: -120.0,
		});
	}
	assert_eq!(rt.editor.viewport.scale(), 1.0);
}

#[test]
fn context_menu_on_empty_canvas_adds_a_node_under_the_pointer() {
	let mut rt = chain();
	let at = ScreenPoint::new(200.0, 700.0);
	rt.dispatch(Action::ContextMenu { at });
	assert_eq!(rt.editor.graph.node_count(), 4);
	let node = rt.editor.graph.node(NodeId(3)).unwrap();
	assert_eq!((node.x, node.y), (200.0, 700.0));
	assert_eq!(rt.scene.nodes.len(), 4);
}

#[test]
fn layout_settles_then_wakes_on_structural_change() {
	let mut rt = chain();
	let mut frames = 0;
	while rt.frame(1.0 / 60.0) {
		frames += 1;
		assert!(frames < 10_000, "layout never settled");
	}
	rt.dispatch(Action::ContextMenu {
		at: ScreenPoint::new(5.0, 5.0),
	});
	assert!(rt.layout.is_running());
}

#[test]
fn repositioned_cards_stay_pinned_until_released() {
	let mut rt = chain();
	let card = ScreenPoint::new(220.0, 160.0);
	gesture(&mut rt, &[card, ScreenPoint::new(240.0, 180.0)]);
	let node = rt.editor.graph.node(NodeId(0)).unwrap();
	assert!(node.fixed);
	assert_eq!((node.x, node.y), (320.0, 220.0));

	while rt.frame(1.0 / 60.0) {}
	let node = rt.editor.graph.node(NodeId(0)).unwrap();
	assert_eq!((node.x, node.y), (320.0, 220.0));

	let p = handle(&rt, 0);
	gesture(&mut rt, &[p]);
	rt.dispatch(Action::Key(Key::Release));
	assert!(!rt.editor.graph.node(NodeId(0)).unwrap().fixed);
	assert!(rt.layout.is_running());
	rt.frame(1.0 / 60.0);
	let node = rt.editor.graph.node(NodeId(0)).unwrap();
	assert_ne!((node.x, node.y), (320.0, 220.0));
}

#[test]
fn overlay_swallows_delete_until_escape() {
	let mut rt = chain();
	let p = handle(&rt, 1);
	gesture(&mut rt, &[p]);
	let card = ScreenPoint::new(p.x - 80.0, p.y - 40.0);
	rt.dispatch(Action::DoubleClick { at: card });
	assert!(rt.editor.expanded.is_some());

	rt.dispatch(Action::RenameNode {
		node: NodeId(1),
		label: "amygdala".into(),
	});
	rt.dispatch(Action::Key(Key::Delete));
	assert!(rt.editor.graph.contains_node(NodeId(1)));
	assert_eq!(rt.editor.graph.node(NodeId(1)).unwrap().label, "amygdala");

	rt.dispatch(Action::Key(Key::Escape));
	assert!(rt.editor.expanded.is_none());
	rt.dispatch(Action::Key(Key::Delete));
	assert!(!rt.editor.graph.contains_node(NodeId(1)));
}

#[test]
fn sign_out_always_redirects_to_login() {
	let auth = MemoryAuth::signed_out().with_account("ada@example.com", "engine");
	let decisions = Rc::new(RefCell::new(Vec::new()));
	let sink = decisions.clone();
	let _subscription = watch(&auth, move |state: AuthState| {
		sink.borrow_mut().push(gate_decision(&state, EDITOR_PATH));
	});

	block_on(auth.sign_in("ada@example.com", "engine")).unwrap();
	block_on(auth.sign_out()).unwrap();
	assert_eq!(
		*decisions.borrow(),
		vec![
			GateDecision::Redirect(LOGIN_PATH),
			GateDecision::Stay,
			GateDecision::Redirect(LOGIN_PATH),
		]
	);
}

#[test]
fn page_config_overrides_only_what_it_names() {
	let config = AppConfig::from_json(r#"{ "editor": { "click_threshold": 8.0 } }"#).unwrap();
	assert_eq!(config.editor.click_threshold, 8.0);
	assert_eq!(config.editor.layout, LayoutParams::default());
	assert!(config.auth.enabled);
}
