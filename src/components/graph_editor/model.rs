//! Id-keyed graph store: nodes in draw order and at most one link per node pair.

use indexmap::IndexMap;

use super::types::{Direction, Link, LinkKey, Node, NodeId};

/// Why a connect gesture did not produce a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
	/// Both ends are the same node.
	#[error("cannot link node {0} to itself")]
	SelfLoop(NodeId),
	/// One end does not exist.
	#[error("node not found: {0}")]
	NodeNotFound(NodeId),
}

/// Nodes and links of the editor.
#[derive(Clone, Debug, Default)]
pub struct Graph {
	nodes: IndexMap<NodeId, Node>,
	links: IndexMap<LinkKey, Link>,
	last_node_id: Option<u32>,
}

impl Graph {
	/// Empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// Three nodes chained `0 -> 1 -> 2`, laid out on a small circle around `(cx, cy)`.
	pub fn seeded(cx: f64, cy: f64) -> Self {
		let mut graph = Self::new();
		let count = 3;
		for i in 0..count {
			let angle = (i as f64) * std::f64::consts::TAU / count as f64;
			graph.add_node(cx + 100.0 * angle.cos(), cy + 100.0 * angle.sin());
		}
		for (a, b) in [(0, 1), (1, 2)] {
			if let Some(key) = LinkKey::between(NodeId(a), NodeId(b)) {
				graph.links.insert(key, Link::new(key, Direction::Right));
			}
		}
		graph
	}

	/// Adds a node at `(x, y)` with the next unused id.
	pub fn add_node(&mut self, x: f64, y: f64) -> NodeId {
		let id = NodeId(self.last_node_id.map_or(0, |last| last + 1));
		self.last_node_id = Some(id.0);
		self.nodes.insert(id, Node::new(id, x, y));
		id
	}

	/// Connects `from` and `to`, or marks the existing link with the gesture's direction.
	///
	/// The lower id always becomes the link source; the direction flag records which way
	/// the gesture went. Flags are only ever set here, so repeating a gesture is a no-op.
	pub fn add_or_toggle_edge(&mut self, from: NodeId, to: NodeId) -> Result<LinkKey, ConnectError> {
		let key = LinkKey::between(from, to).ok_or(ConnectError::SelfLoop(from))?;
		for id in [from, to] {
			if !self.nodes.contains_key(&id) {
				return Err(ConnectError::NodeNotFound(id));
			}
		}
		let direction = Direction::of_gesture(from, to);
		self.links
			.entry(key)
			.and_modify(|link| link.set(direction))
			.or_insert_with(|| Link::new(key, direction));
		Ok(key)
	}

	/// Removes a node together with every link that references it.
	pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
		let node = self.nodes.shift_remove(&id)?;
		self.links.retain(|_, link| !link.touches(id));
		Some(node)
	}

	/// Removes one link; its nodes stay.
	pub fn remove_link(&mut self, key: LinkKey) -> Option<Link> {
		self.links.shift_remove(&key)
	}

	/// Moves a node to the end of the draw order. Ids are untouched.
	pub fn raise_node(&mut self, id: NodeId) -> bool {
		match self.nodes.shift_remove(&id) {
			Some(node) => {
				self.nodes.insert(id, node);
				true
			}
			None => false,
		}
	}

	/// Sets a node's label. Returns false if the node is gone.
	pub fn rename_node(&mut self, id: NodeId, label: impl Into<String>) -> bool {
		match self.nodes.get_mut(&id) {
			Some(node) => {
				node.label = label.into();
				true
			}
			None => false,
		}
	}

	/// Node by id.
	pub fn node(&self, id: NodeId) -> Option<&Node> {
		self.nodes.get(&id)
	}

	/// Mutable node by id.
	pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
		self.nodes.get_mut(&id)
	}

	/// Whether the id is live.
	pub fn contains_node(&self, id: NodeId) -> bool {
		self.nodes.contains_key(&id)
	}

	/// Nodes in draw order (last drawn on top).
	pub fn nodes(&self) -> impl DoubleEndedIterator<Item = &Node> + ExactSizeIterator {
		self.nodes.values()
	}

	/// Mutable nodes in draw order.
	pub fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
		self.nodes.values_mut()
	}

	/// Node ids in draw order.
	pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.nodes.keys().copied()
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Link by pair key.
	pub fn link(&self, key: LinkKey) -> Option<&Link> {
		self.links.get(&key)
	}

	/// Links in insertion order.
	pub fn links(&self) -> impl DoubleEndedIterator<Item = &Link> + ExactSizeIterator {
		self.links.values()
	}

	/// Link keys in insertion order.
	pub fn link_keys(&self) -> impl Iterator<Item = LinkKey> + '_ {
		self.links.keys().copied()
	}

	/// Number of links.
	pub fn link_count(&self) -> usize {
		self.links.len()
	}

	/// Links with `id` at either end.
	pub fn links_for_node(&self, id: NodeId) -> impl Iterator<Item = &Link> {
		self.links.values().filter(move |link| link.touches(id))
	}

	/// Number of links touching `id`.
	pub fn degree(&self, id: NodeId) -> usize {
		self.links_for_node(id).count()
	}

	/// Source and target positions of a link.
	pub fn link_endpoints(&self, link: &Link) -> Option<((f64, f64), (f64, f64))> {
		let source = self.nodes.get(&link.source)?;
		let target = self.nodes.get(&link.target)?;
		Some(((source.x, source.y), (target.x, target.y)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn chain() -> Graph {
		Graph::seeded(0.0, 0.0)
	}

	#[test]
	fn seed_chains_three_nodes_left_to_right() {
		let graph = chain();
		assert_eq!(graph.node_count(), 3);
		assert_eq!(graph.link_keys().collect::<Vec<_>>(), vec![
			LinkKey::between(NodeId(0), NodeId(1)).unwrap(),
			LinkKey::between(NodeId(1), NodeId(2)).unwrap(),
		]);
		assert!(graph.links().all(|link| link.right && !link.left));
	}

	#[test]
	fn ids_are_monotonic_and_not_reused() {
		let mut graph = chain();
		let id = graph.add_node(10.0, 10.0);
		assert_eq!(id, NodeId(3));
		graph.remove_node(id);
		assert_eq!(graph.add_node(0.0, 0.0), NodeId(4));
	}

	#[test]
	fn lower_id_is_always_the_source() {
		let mut graph = chain();
		let forward = graph.add_or_toggle_edge(NodeId(0), NodeId(2)).unwrap();
		assert_eq!((forward.source(), forward.target()), (NodeId(0), NodeId(2)));
		let link = graph.link(forward).unwrap();
		assert!(link.right && !link.left);

		let mut graph = chain();
		let backward = graph.add_or_toggle_edge(NodeId(2), NodeId(0)).unwrap();
		assert_eq!((backward.source(), backward.target()), (NodeId(0), NodeId(2)));
		let link = graph.link(backward).unwrap();
		assert!(link.left && !link.right);
	}

	#[test]
	fn repeating_a_gesture_is_idempotent() {
		let mut graph = chain();
		graph.add_or_toggle_edge(NodeId(0), NodeId(1)).unwrap();
		graph.add_or_toggle_edge(NodeId(0), NodeId(1)).unwrap();
		assert_eq!(graph.link_count(), 2);
		let link = graph.link(LinkKey::between(NodeId(0), NodeId(1)).unwrap()).unwrap();
		assert!(link.right);
		assert!(!link.left);
	}

	#[test]
	fn both_directions_share_one_link() {
		let mut graph = chain();
		graph.add_or_toggle_edge(NodeId(1), NodeId(0)).unwrap();
		assert_eq!(graph.link_count(), 2);
		let link = graph.link(LinkKey::between(NodeId(0), NodeId(1)).unwrap()).unwrap();
		assert!(link.left && link.right);
	}

	#[test]
	fn self_loops_and_unknown_nodes_are_rejected() {
		let mut graph = chain();
		assert_eq!(
			graph.add_or_toggle_edge(NodeId(1), NodeId(1)),
			Err(ConnectError::SelfLoop(NodeId(1)))
		);
		assert_eq!(
			graph.add_or_toggle_edge(NodeId(1), NodeId(9)),
			Err(ConnectError::NodeNotFound(NodeId(9)))
		);
		assert_eq!(graph.link_count(), 2);
	}

	#[test]
	fn removing_a_node_cascades_to_incident_links_only() {
		let mut graph = chain();
		let extra = graph.add_node(0.0, 0.0);
		graph.add_or_toggle_edge(NodeId(0), extra).unwrap();
		assert_eq!(graph.link_count(), 3);

		let incident = graph.degree(NodeId(1));
		let before = graph.link_count();
		assert!(graph.remove_node(NodeId(1)).is_some());
		assert_eq!(graph.link_count(), before - incident);
		assert!(graph.links().all(|l| graph.contains_node(l.source) && graph.contains_node(l.target)));
		assert!(graph.remove_node(NodeId(1)).is_none());
	}

	#[test]
	fn raising_a_node_reorders_without_changing_ids() {
		let mut graph = chain();
		assert!(graph.raise_node(NodeId(0)));
		let order: Vec<_> = graph.node_ids().collect();
		assert_eq!(order, vec![NodeId(1), NodeId(2), NodeId(0)]);
		assert!(!graph.raise_node(NodeId(42)));
	}

	#[test]
	fn rename_updates_the_label() {
		let mut graph = chain();
		assert!(graph.rename_node(NodeId(2), "hippocampus"));
		assert_eq!(graph.node(NodeId(2)).unwrap().label, "hippocampus");
		assert!(!graph.rename_node(NodeId(7), "nothing"));
	}
}
