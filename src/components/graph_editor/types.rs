//! Ids, nodes, links and the two coordinate spaces.

use std::fmt;

/// Stable node identity. Assigned monotonically and never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "n{}", self.0)
	}
}

/// A card on the canvas. Its position is the center of the direction handle.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Identity used by links, selection and visuals.
	pub id: NodeId,
	/// Graph-space position.
	pub x: f64,
	/// Graph-space position.
	pub y: f64,
	/// Layout velocity.
	pub vx: f64,
	/// Layout velocity.
	pub vy: f64,
	/// Pinned by direct manipulation; the layout leaves it in place.
	pub fixed: bool,
	/// Drawn with a ring around the handle. No gesture sets it.
	pub reflexive: bool,
	/// Free text shown on the card.
	pub label: String,
}

impl Node {
	/// Unpinned, unlabeled node at rest.
	pub fn new(id: NodeId, x: f64, y: f64) -> Self {
		Self {
			id,
			x,
			y,
			vx: 0.0,
			vy: 0.0,
			fixed: false,
			reflexive: false,
			label: String::new(),
		}
	}
}

/// Identity of a link: the unordered node pair, stored lower id first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LinkKey {
	source: NodeId,
	target: NodeId,
}

impl LinkKey {
	/// Orders the pair so that `source < target`. Returns `None` for a self pair.
	pub fn between(a: NodeId, b: NodeId) -> Option<Self> {
		match a.cmp(&b) {
			std::cmp::Ordering::Less => Some(Self {
				source: a,
				target: b,
			}),
			std::cmp::Ordering::Greater => Some(Self {
				source: b,
				target: a,
			}),
			std::cmp::Ordering::Equal => None,
		}
	}

	/// Lower id of the pair.
	pub fn source(&self) -> NodeId {
		self.source
	}

	/// Higher id of the pair.
	pub fn target(&self) -> NodeId {
		self.target
	}
}

impl fmt::Display for LinkKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}-{}", self.source, self.target)
	}
}

/// Arrow direction relative to the link's `source < target` orientation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
	/// target -> source
	Left,
	/// source -> target
	Right,
}

impl Direction {
	/// Direction of a gesture that started at `from` and ended at `to`.
	pub fn of_gesture(from: NodeId, to: NodeId) -> Self {
		if from < to { Self::Right } else { Self::Left }
	}
}

/// One record per connected pair; the flags say which arrowheads are drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
	/// Lower node id.
	pub source: NodeId,
	/// Higher node id.
	pub target: NodeId,
	/// Arrow toward the source.
	pub left: bool,
	/// Arrow toward the target.
	pub right: bool,
}

impl Link {
	/// Fresh link with only `direction` set.
	pub fn new(key: LinkKey, direction: Direction) -> Self {
		let mut link = Self {
			source: key.source(),
			target: key.target(),
			left: false,
			right: false,
		};
		link.set(direction);
		link
	}

	/// Store key of this link.
	pub fn key(&self) -> LinkKey {
		LinkKey {
			source: self.source,
			target: self.target,
		}
	}

	/// Raises the flag for `direction`. Flags are never lowered.
	pub fn set(&mut self, direction: Direction) {
		match direction {
			Direction::Left => self.left = true,
			Direction::Right => self.right = true,
		}
	}

	/// Whether `id` is one of the endpoints.
	pub fn touches(&self, id: NodeId) -> bool {
		self.source == id || self.target == id
	}
}

/// What is currently selected. At most one node or one link, never both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
	/// Nothing selected.
	#[default]
	None,
	/// A single node.
	Node(NodeId),
	/// A single link.
	Link(LinkKey),
}

impl Selection {
	/// Selected node, if any.
	pub fn node(&self) -> Option<NodeId> {
		match self {
			Self::Node(id) => Some(*id),
			_ => None,
		}
	}

	/// Selected link, if any.
	pub fn link(&self) -> Option<LinkKey> {
		match self {
			Self::Link(key) => Some(*key),
			_ => None,
		}
	}

	/// Whether `id` is the selected node.
	pub fn is_node(&self, id: NodeId) -> bool {
		self.node() == Some(id)
	}

	/// Whether `key` is the selected link.
	pub fn is_link(&self, key: LinkKey) -> bool {
		self.link() == Some(key)
	}
}

/// A point in screen (canvas pixel) space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScreenPoint {
	/// Pixels from the canvas left edge.
	pub x: f64,
	/// Pixels from the canvas top edge.
	pub y: f64,
}

impl ScreenPoint {
	/// Point at `(x, y)`.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	/// Euclidean distance in pixels.
	pub fn distance(self, other: Self) -> f64 {
		((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
	}
}

/// A point in graph space, after undoing the viewport transform.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GraphPoint {
	/// Horizontal graph coordinate.
	pub x: f64,
	/// Vertical graph coordinate.
	pub y: f64,
}

impl GraphPoint {
	/// Point at `(x, y)`.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Modifier keys held during a pointer event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
	/// Ctrl, or Cmd on macOS: hands the press to panning.
	pub ctrl: bool,
}
