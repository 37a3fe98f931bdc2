//! Retained visuals, keyed by entity id and diffed against the model on every pass.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Deserialize;

use super::model::Graph;
use super::types::{LinkKey, NodeId, Selection};

/// Outcome of one reconciliation pass.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileReport<K> {
	/// Keys that got a new visual, in model order.
	pub added: Vec<K>,
	/// Keys whose visual was dropped.
	pub removed: Vec<K>,
	/// Number of visuals kept and updated in place.
	pub retained: usize,
}

impl<K> ReconcileReport<K> {
	/// No visual was created or destroyed.
	pub fn is_noop(&self) -> bool {
		self.added.is_empty() && self.removed.is_empty()
	}
}

/// Id-indexed mapping from entity key to the visual it owns.
#[derive(Clone, Debug)]
pub struct VisualSet<K, V> {
	visuals: HashMap<K, V>,
}

impl<K, V> Default for VisualSet<K, V> {
	fn default() -> Self {
		Self {
			visuals: HashMap::new(),
		}
	}
}

impl<K: Copy + Eq + Hash, V> VisualSet<K, V> {
	/// Matches visuals to `keys`: creates missing ones, updates retained ones, drops the rest.
	pub fn reconcile<I, C, U>(&mut self, keys: I, mut create: C, mut update: U) -> ReconcileReport<K>
	where
		I: IntoIterator<Item = K>,
		C: FnMut(K) -> V,
		U: FnMut(K, &mut V),
	{
		let mut seen = HashMap::with_capacity(self.visuals.len());
		let mut added = Vec::new();
		let mut retained = 0;
		for key in keys {
			if seen.insert(key, ()).is_some() {
				continue;
			}
			match self.visuals.get_mut(&key) {
				Some(visual) => {
					update(key, visual);
					retained += 1;
				}
				None => {
					self.visuals.insert(key, create(key));
					added.push(key);
				}
			}
		}
		let removed: Vec<K> = self.visuals.keys().filter(|k| !seen.contains_key(k)).copied().collect();
		for key in &removed {
			self.visuals.remove(key);
		}
		ReconcileReport {
			added,
			removed,
			retained,
		}
	}

	/// Visual owned by `key`.
	pub fn get(&self, key: &K) -> Option<&V> {
		self.visuals.get(key)
	}

	/// Mutable visual owned by `key`.
	pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
		self.visuals.get_mut(key)
	}

	/// Every visual, in no particular order.
	pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
		self.visuals.values_mut()
	}

	/// Number of live visuals.
	pub fn len(&self) -> usize {
		self.visuals.len()
	}

	/// Whether no visual is live.
	pub fn is_empty(&self) -> bool {
		self.visuals.is_empty()
	}
}

/// Card geometry relative to the node position, which sits on the direction handle.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct CardGeometry {
	/// Left edge of the card relative to the handle.
	pub offset_x: f64,
	/// Top edge of the card relative to the handle.
	pub offset_y: f64,
	/// Card width.
	pub width: f64,
	/// Card height.
	pub height: f64,
	/// Rounding of card and marker corners.
	pub corner_radius: f64,
	/// How far the drop shadow extends past the card.
	pub shadow_spread: f64,
	/// Radius of the direction handle.
	pub handle_radius: f64,
	/// Width of the colored strip on the card's left edge.
	pub marker_width: f64,
	/// Characters per wrapped label line.
	pub label_columns: usize,
	/// Label lines drawn before truncation.
	pub label_rows: usize,
}

impl Default for CardGeometry {
	fn default() -> Self {
		Self {
			offset_x: -170.0,
			offset_y: -85.0,
			width: 186.0,
			height: 100.0,
			corner_radius: 5.0,
			shadow_spread: 4.0,
			handle_radius: 6.0,
			marker_width: 10.0,
			label_columns: 22,
			label_rows: 4,
		}
	}
}

impl CardGeometry {
	/// Card body in node-local coordinates.
	pub fn card_rect(&self) -> Rect {
		Rect {
			x: self.offset_x,
			y: self.offset_y,
			w: self.width,
			h: self.height,
			r: self.corner_radius,
		}
	}

	/// Direction handle, centered on the node position.
	pub fn handle_circle(&self) -> Circle {
		Circle {
			cx: 0.0,
			cy: 0.0,
			r: self.handle_radius,
		}
	}
}

/// Rounded rectangle in node-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
	/// Left edge.
	pub x: f64,
	/// Top edge.
	pub y: f64,
	/// Width.
	pub w: f64,
	/// Height.
	pub h: f64,
	/// Corner radius.
	pub r: f64,
}

impl Rect {
	/// Whether the point is inside the bounding box (corners included).
	pub fn contains(&self, x: f64, y: f64) -> bool {
		x >= self.x && x <= self.x + self.w && y >= self.y && y <= self.y + self.h
	}
}

/// Circle in node-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
	/// Center x.
	pub cx: f64,
	/// Center y.
	pub cy: f64,
	/// Radius.
	pub r: f64,
}

impl Circle {
	/// Whether the point lies on or inside the circle.
	pub fn contains(&self, x: f64, y: f64) -> bool {
		(x - self.cx).powi(2) + (y - self.cy).powi(2) <= self.r * self.r
	}
}

/// Visual subtree of one node, in node-local coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeVisual {
	/// Drop shadow behind the card.
	pub shadow: Rect,
	/// Card body.
	pub card: Rect,
	/// Accent strip on the card's left edge.
	pub marker: Rect,
	/// Soft shadow under the handle.
	pub handle_shadow: Circle,
	/// Direction handle.
	pub handle: Circle,
	/// Label the lines were wrapped from.
	pub label: String,
	/// Wrapped label text.
	pub label_lines: Vec<String>,
	/// Mirrors [`Node::reflexive`](super::types::Node::reflexive).
	pub reflexive: bool,
	/// Drawn with the selection outline.
	pub selected: bool,
	/// Current handle scale; eases toward `handle_scale_target`.
	pub handle_scale: f64,
	/// Scale the handle is easing toward.
	pub handle_scale_target: f64,
}

impl NodeVisual {
	/// Visual for an unselected, unlabeled node.
	pub fn new(geometry: &CardGeometry) -> Self {
		let g = geometry;
		Self {
			shadow: Rect {
				x: g.offset_x - g.shadow_spread,
				y: g.offset_y - g.shadow_spread,
				w: g.width + 2.0 * g.shadow_spread,
				h: g.height + 2.0 * g.shadow_spread,
				r: g.corner_radius + 3.0,
			},
			card: g.card_rect(),
			marker: Rect {
				x: g.offset_x,
				y: g.offset_y - 5.0,
				w: g.marker_width,
				h: g.height,
				r: g.corner_radius,
			},
			handle_shadow: Circle {
				cx: -1.0,
				cy: -1.0,
				r: g.handle_radius + 1.0,
			},
			handle: g.handle_circle(),
			label: String::new(),
			label_lines: Vec::new(),
			reflexive: false,
			selected: false,
			handle_scale: 1.0,
			handle_scale_target: 1.0,
		}
	}

	/// Re-wraps the label if it changed.
	pub fn set_label(&mut self, label: &str, geometry: &CardGeometry) {
		if self.label == label {
			return;
		}
		self.label = label.to_owned();
		self.label_lines = wrap_label(label, geometry.label_columns, geometry.label_rows);
	}

	/// Eases the handle scale toward its target. Returns whether it is still moving.
	pub fn animate(&mut self, dt: f64) -> bool {
		let delta = self.handle_scale_target - self.handle_scale;
		if delta.abs() < 0.001 {
			self.handle_scale = self.handle_scale_target;
			return false;
		}
		self.handle_scale += delta * (12.0 * dt).min(1.0);
		true
	}
}

/// Visual state of one link.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkVisual {
	/// Drawn dashed.
	pub selected: bool,
	/// Arrowhead at the source end.
	pub marker_start: bool,
	/// Arrowhead at the target end.
	pub marker_end: bool,
}

/// Retained visuals for the whole graph.
#[derive(Clone, Debug, Default)]
pub struct Scene {
	/// Card visuals by node id.
	pub nodes: VisualSet<NodeId, NodeVisual>,
	/// Link visuals by pair key.
	pub links: VisualSet<LinkKey, LinkVisual>,
}

impl Scene {
	/// Brings node and link visuals in line with the model and current selection.
	pub fn reconcile(
		&mut self,
		graph: &Graph,
		selection: Selection,
		geometry: &CardGeometry,
	) -> (ReconcileReport<LinkKey>, ReconcileReport<NodeId>) {
		let apply_link = |key: LinkKey, visual: &mut LinkVisual| {
			if let Some(link) = graph.link(key) {
				visual.selected = selection.is_link(key);
				visual.marker_start = link.left;
				visual.marker_end = link.right;
			}
		};
		let links = self.links.reconcile(
			graph.link_keys(),
			|key| {
				let mut visual = LinkVisual::default();
				apply_link(key, &mut visual);
				visual
			},
			apply_link,
		);

		let apply_node = |id: NodeId, visual: &mut NodeVisual| {
			if let Some(node) = graph.node(id) {
				visual.set_label(&node.label, geometry);
				visual.reflexive = node.reflexive;
				visual.selected = selection.is_node(id);
			}
		};
		let nodes = self.nodes.reconcile(
			graph.node_ids(),
			|id| {
				let mut visual = NodeVisual::new(geometry);
				apply_node(id, &mut visual);
				visual
			},
			apply_node,
		);

		if !links.is_noop() || !nodes.is_noop() {
			log::debug!(
				"reconciled: links +{} -{}, nodes +{} -{}",
				links.added.len(),
				links.removed.len(),
				nodes.added.len(),
				nodes.removed.len()
			);
		}
		(links, nodes)
	}
}

/// Greedy word wrap by character count, truncated to `rows` lines.
pub fn wrap_label(label: &str, columns: usize, rows: usize) -> Vec<String> {
	let columns = columns.max(1);
	let mut lines: Vec<String> = Vec::new();
	for paragraph in label.lines() {
		let mut line = String::new();
		for word in paragraph.split_whitespace() {
			let mut word = word;
			loop {
				let needed = if line.is_empty() { 0 } else { 1 };
				let word_len = word.chars().count();
				if line.chars().count() + needed + word_len <= columns {
					if needed == 1 {
						line.push(' ');
					}
					line.push_str(word);
					break;
				}
				if !line.is_empty() {
					lines.push(std::mem::take(&mut line));
					continue;
				}
				// a single word longer than a line is hard-split
				let split = word.char_indices().nth(columns).map_or(word.len(), |(i, _)| i);
				lines.push(word[..split].to_owned());
				word = &word[split..];
				if word.is_empty() {
					break;
				}
			}
		}
		lines.push(line);
	}
	while lines.last().is_some_and(|l| l.is_empty()) {
		lines.pop();
	}
	lines.truncate(rows);
	lines
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn reconcile_adds_retains_and_removes() {
		let mut set: VisualSet<u32, String> = VisualSet::default();
		let report = set.reconcile([1, 2, 3], |k| format!("v{k}"), |_, _| {});
		assert_eq!(report.added, vec![1, 2, 3]);
		assert_eq!(report.retained, 0);

		let report = set.reconcile([3, 4, 1], |k| format!("v{k}"), |_, _| {});
		assert_eq!(report.added, vec![4]);
		assert_eq!(report.removed, vec![2]);
		assert_eq!(report.retained, 2);
		assert_eq!(set.len(), 3);
		assert_eq!(set.get(&3).map(String::as_str), Some("v3"));
	}

	#[test]
	fn reordering_nodes_keeps_visuals() {
		let mut graph = Graph::seeded(0.0, 0.0);
		let geometry = CardGeometry::default();
		let mut scene = Scene::default();
		scene.reconcile(&graph, Selection::None, &geometry);
		scene.nodes.get_mut(&NodeId(0)).unwrap().handle_scale = 1.1;

		graph.raise_node(NodeId(0));
		graph.raise_node(NodeId(1));
		let (_, nodes) = scene.reconcile(&graph, Selection::None, &geometry);
		assert!(nodes.is_noop());
		assert_eq!(nodes.retained, 3);
		assert_eq!(scene.nodes.len(), 3);
		assert_eq!(scene.nodes.get(&NodeId(0)).unwrap().handle_scale, 1.1);
	}

	#[test]
	fn link_visuals_follow_flags_and_selection() {
		let mut graph = Graph::seeded(0.0, 0.0);
		let geometry = CardGeometry::default();
		let mut scene = Scene::default();
		let key = graph.add_or_toggle_edge(NodeId(1), NodeId(0)).unwrap();
		scene.reconcile(&graph, Selection::Link(key), &geometry);
		let visual = scene.links.get(&key).unwrap();
		assert!(visual.selected && visual.marker_start && visual.marker_end);

		graph.remove_node(NodeId(1));
		let (links, nodes) = scene.reconcile(&graph, Selection::None, &geometry);
		assert_eq!(links.removed.len(), 2);
		assert_eq!(nodes.removed, vec![NodeId(1)]);
		assert!(scene.links.is_empty());
	}

	#[test]
	fn labels_wrap_and_truncate() {
		assert_eq!(wrap_label("", 10, 4), Vec::<String>::new());
		assert_eq!(wrap_label("alpha beta gamma", 10, 4), vec!["alpha beta", "gamma"]);
		assert_eq!(wrap_label("abcdefghijkl", 5, 4), vec!["abcde", "fghij", "kl"]);
		assert_eq!(wrap_label("a\nb\nc\nd\ne", 10, 3), vec!["a", "b", "c"]);
	}

	#[test]
	fn card_and_handle_shapes_follow_geometry() {
		let geometry = CardGeometry {
			handle_radius: 10.0,
			..CardGeometry::default()
		};
		let card = geometry.card_rect();
		assert!(card.contains(-170.0, -85.0));
		assert!(card.contains(16.0, 15.0));
		assert!(!card.contains(17.0, 0.0));

		let handle = geometry.handle_circle();
		assert!(handle.contains(6.0, 8.0));
		assert!(!handle.contains(8.0, 8.0));
		assert_eq!(NodeVisual::new(&geometry).handle, handle);
	}
}
