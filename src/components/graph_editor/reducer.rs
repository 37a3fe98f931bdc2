//! Editor state and the reducer that drives it.
//!
//! Every DOM event is translated into an [`Action`]; [`EditorState::apply`] mutates the
//! state synchronously and reports a [`Change`] telling the host what to refresh.
//! Nothing here touches the DOM, so the whole interaction model runs under plain
//! `cargo test`.

use log::debug;

use super::model::Graph;
use super::reconcile::Circle;
use super::types::{GraphPoint, LinkKey, Modifiers, NodeId, ScreenPoint, Selection};
use super::viewport::Viewport;
use crate::config::EditorConfig;

/// Extra slack around the direction handle, in screen pixels.
const HANDLE_HIT_SLOP: f64 = 3.0;
/// Scale applied to a handle while it is the target of a connect gesture.
pub const HOVER_HANDLE_SCALE: f64 = 1.1;

/// An input event, already translated out of the DOM.
///
/// All pointer positions are canvas-relative screen pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
	/// Primary button pressed.
	PointerDown {
		/// Press position.
		at: ScreenPoint,
		/// Modifier keys held during the press.
		modifiers: Modifiers,
	},
	/// Pointer moved, pressed or not.
	PointerMove {
		/// New position.
		at: ScreenPoint,
	},
	/// Primary button released.
	PointerUp {
		/// Release position.
		at: ScreenPoint,
	},
	/// Pointer left the canvas; any gesture in progress is abandoned.
	PointerLeave,
	/// Secondary (context menu) press.
	ContextMenu {
		/// Press position.
		at: ScreenPoint,
	},
	/// Double click, opens the card overlay.
	DoubleClick {
		/// Click position.
		at: ScreenPoint,
	},
	/// Mouse wheel; only the vertical delta zooms.
	Wheel {
		/// Zoom anchor.
		at: ScreenPoint,
		/// `WheelEvent.deltaY`; positive zooms out.
		delta_y: f64,
	},
	/// Editor key pressed.
	Key(Key),
	/// Label edited in the overlay.
	RenameNode {
		/// Node being renamed.
		node: NodeId,
		/// Full new label.
		label: String,
	},
	/// Canvas resized.
	Resize {
		/// New width in pixels.
		width: f64,
		/// New height in pixels.
		height: f64,
	},
}

/// Keys the editor reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
	/// Delete or Backspace: remove the selection.
	Delete,
	/// Close the overlay.
	Escape,
	/// Unpin the selected node.
	Release,
}

impl Key {
	/// Maps a `KeyboardEvent.key` value to an editor key.
	pub fn from_key_name(name: &str) -> Option<Self> {
		match name {
			"Delete" | "Backspace" => Some(Self::Delete),
			"Escape" => Some(Self::Escape),
			"u" | "U" => Some(Self::Release),
			_ => None,
		}
	}
}

/// What the pointer is currently doing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Interaction {
	/// No button held.
	#[default]
	Idle,
	/// A node handle is pressed; the rubber-band starts at the node.
	NodeMouseDown {
		/// Pressed node.
		node: NodeId,
		/// Where the press happened, for the click threshold.
		origin: ScreenPoint,
	},
	/// The pressed handle has been dragged past the click threshold.
	Dragging {
		/// Node the link would start from.
		node: NodeId,
		/// Rubber-band end.
		pointer: GraphPoint,
	},
	/// A card is being moved; the node is pinned.
	Repositioning {
		/// Node being moved.
		node: NodeId,
		/// Pointer offset from the node position, x.
		grab_dx: f64,
		/// Pointer offset from the node position, y.
		grab_dy: f64,
	},
	/// Empty canvas dragged.
	Panning {
		/// Previous pointer position.
		last: ScreenPoint,
	},
}

/// What lies under a point, topmost first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitTarget {
	/// A node's direction handle.
	Handle(NodeId),
	/// A node's card body.
	Card(NodeId),
	/// Within tolerance of a link segment.
	Link(LinkKey),
	/// Nothing.
	Empty,
}

impl HitTarget {
	/// The node hit, if any.
	pub fn node(self) -> Option<NodeId> {
		match self {
			Self::Handle(id) | Self::Card(id) => Some(id),
			_ => None,
		}
	}
}

/// The node whose detail overlay is open, and where it was opened.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExpandedView {
	/// Node shown in the overlay.
	pub node: NodeId,
	/// Screen position of the card when the overlay opened.
	pub anchor: ScreenPoint,
}

/// What the layout should do after an action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutEffect {
	/// Leave it alone.
	#[default]
	None,
	/// Keep the simulation warm (node drag).
	Resume,
	/// Re-energize after a structural change.
	Restart,
}

/// Work the host must do after an action.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Change {
	/// Repaint the canvas.
	pub redraw: bool,
	/// Diff visuals against the model.
	pub reconcile: bool,
	/// Layout follow-up.
	pub layout: LayoutEffect,
}

impl Change {
	/// Nothing to do.
	pub const NONE: Self = Self {
		redraw: false,
		reconcile: false,
		layout: LayoutEffect::None,
	};
	/// Repaint only.
	pub const REDRAW: Self = Self {
		redraw: true,
		reconcile: false,
		layout: LayoutEffect::None,
	};
	/// Repaint and keep the layout running.
	pub const WARM: Self = Self {
		redraw: true,
		reconcile: false,
		layout: LayoutEffect::Resume,
	};
	/// Reconcile visuals and restart the layout.
	pub const REBUILD: Self = Self {
		redraw: true,
		reconcile: true,
		layout: LayoutEffect::Restart,
	};

	/// Whether the action had no effect.
	pub fn is_none(&self) -> bool {
		*self == Self::NONE
	}
}

/// Everything the editor knows apart from layout velocities and visuals.
#[derive(Clone, Debug)]
pub struct EditorState {
	/// The node/link model.
	pub graph: Graph,
	/// At most one node or link.
	pub selection: Selection,
	/// Pan and zoom.
	pub viewport: Viewport,
	/// Gesture in progress.
	pub interaction: Interaction,
	/// Open card overlay.
	pub expanded: Option<ExpandedView>,
	/// Node under the pointer while a connect gesture is in progress.
	pub connect_target: Option<NodeId>,
	/// Canvas width in pixels.
	pub width: f64,
	/// Canvas height in pixels.
	pub height: f64,
	config: EditorConfig,
}

impl EditorState {
	/// Fresh editor with the three seed nodes centered in a `width` x `height` canvas.
	pub fn new(config: EditorConfig, width: f64, height: f64) -> Self {
		let mut state = Self::with_graph(Graph::seeded(width / 2.0, height / 2.0), config);
		state.width = width;
		state.height = height;
		state
	}

	/// Editor over an existing graph, with a zero-sized canvas until the first resize.
	pub fn with_graph(graph: Graph, config: EditorConfig) -> Self {
		Self {
			graph,
			selection: Selection::None,
			viewport: Viewport::new(config.min_scale, config.max_scale),
			interaction: Interaction::Idle,
			expanded: None,
			connect_target: None,
			width: 0.0,
			height: 0.0,
			config,
		}
	}

	/// Settings the editor was built with.
	pub fn config(&self) -> &EditorConfig {
		&self.config
	}

	/// Screen position of a node's direction handle.
	pub fn node_screen_position(&self, id: NodeId) -> Option<ScreenPoint> {
		let node = self.graph.node(id)?;
		Some(self.viewport.graph_to_screen(GraphPoint::new(node.x, node.y)))
	}

	/// Rubber-band endpoints in graph space while a connect gesture is active.
	pub fn rubber_band(&self) -> Option<(GraphPoint, GraphPoint)> {
		let (node, end) = match &self.interaction {
			Interaction::NodeMouseDown { node, .. } => (*node, None),
			Interaction::Dragging { node, pointer } => (*node, Some(*pointer)),
			_ => return None,
		};
		let node = self.graph.node(node)?;
		let start = GraphPoint::new(node.x, node.y);
		Some((start, end.unwrap_or(start)))
	}

	/// What lies under `at`: handles and cards of the topmost node first, then links.
	pub fn hit_test(&self, at: ScreenPoint) -> HitTarget {
		let p = self.viewport.screen_to_graph(at);
		let card = self.config.card.card_rect();
		let handle = self.config.card.handle_circle();
		let handle = Circle {
			r: handle.r + HANDLE_HIT_SLOP / self.viewport.scale(),
			..handle
		};
		for node in self.graph.nodes().rev() {
			let (lx, ly) = (p.x - node.x, p.y - node.y);
			if handle.contains(lx, ly) {
				return HitTarget::Handle(node.id);
			}
			if card.contains(lx, ly) {
				return HitTarget::Card(node.id);
			}
		}
		let tolerance = self.config.link_hit_tolerance / self.viewport.scale();
		for link in self.graph.links().rev() {
			let Some((s, t)) = self.graph.link_endpoints(link) else {
				continue;
			};
			if distance_to_segment((p.x, p.y), s, t) <= tolerance {
				return HitTarget::Link(link.key());
			}
		}
		HitTarget::Empty
	}

	/// Applies one action and reports what the host has to refresh.
	pub fn apply(&mut self, action: Action) -> Change {
		let change = match action {
			Action::PointerDown { at, modifiers } => self.pointer_down(at, modifiers),
			Action::PointerMove { at } => self.pointer_move(at),
			Action::PointerUp { at } => self.pointer_up(at),
			Action::PointerLeave => self.cancel_gesture(),
			Action::ContextMenu { at } => self.context_menu(at),
			Action::DoubleClick { at } => self.double_click(at),
			Action::Wheel { at, delta_y } => {
				let factor = Viewport::wheel_factor(delta_y);
				if factor == 1.0 {
					Change::NONE
				} else {
					self.viewport.zoom_at(at, factor);
					Change::REDRAW
				}
			}
			Action::Key(key) => self.key(key),
			Action::RenameNode { node, label } => {
				if self.graph.rename_node(node, label) {
					Change::REBUILD
				} else {
					Change::NONE
				}
			}
			Action::Resize { width, height } => {
				self.width = width;
				self.height = height;
				Change::REDRAW
			}
		};
		self.prune_stale_references();
		change
	}

	fn pointer_down(&mut self, at: ScreenPoint, modifiers: Modifiers) -> Change {
		if self.interaction != Interaction::Idle {
			return Change::NONE;
		}
		let target = self.hit_test(at);
		if modifiers.ctrl {
			// ctrl hands the press to the pan/zoom gesture
			self.interaction = Interaction::Panning { last: at };
			return Change::NONE;
		}
		match target {
			HitTarget::Handle(node) => {
				self.graph.raise_node(node);
				self.interaction = Interaction::NodeMouseDown { node, origin: at };
				Change::REDRAW
			}
			HitTarget::Card(node) => {
				self.graph.raise_node(node);
				let p = self.viewport.screen_to_graph(at);
				let Some(n) = self.graph.node_mut(node) else {
					return Change::NONE;
				};
				n.fixed = true;
				self.interaction = Interaction::Repositioning {
					node,
					grab_dx: n.x - p.x,
					grab_dy: n.y - p.y,
				};
				Change::WARM
			}
			HitTarget::Link(key) => {
				self.toggle_link_selection(key);
				Change::REBUILD
			}
			HitTarget::Empty => {
				self.interaction = Interaction::Panning { last: at };
				Change::NONE
			}
		}
	}

	fn pointer_move(&mut self, at: ScreenPoint) -> Change {
		match self.interaction.clone() {
			Interaction::Idle => Change::NONE,
			Interaction::NodeMouseDown { node, origin } => {
				if at.distance(origin) <= self.config.click_threshold {
					return Change::NONE;
				}
				self.interaction = Interaction::Dragging {
					node,
					pointer: self.viewport.screen_to_graph(at),
				};
				self.update_connect_target(node, at);
				Change::REDRAW
			}
			Interaction::Dragging { node, .. } => {
				self.interaction = Interaction::Dragging {
					node,
					pointer: self.viewport.screen_to_graph(at),
				};
				self.update_connect_target(node, at);
				Change::REDRAW
			}
			Interaction::Repositioning {
				node,
				grab_dx,
				grab_dy,
			} => {
				let p = self.viewport.screen_to_graph(at);
				if let Some(n) = self.graph.node_mut(node) {
					n.x = p.x + grab_dx;
					n.y = p.y + grab_dy;
					n.vx = 0.0;
					n.vy = 0.0;
				}
				Change::WARM
			}
			Interaction::Panning { last } => {
				self.viewport.pan_by(at.x - last.x, at.y - last.y);
				self.interaction = Interaction::Panning { last: at };
				Change::REDRAW
			}
		}
	}

	fn pointer_up(&mut self, at: ScreenPoint) -> Change {
		let interaction = std::mem::take(&mut self.interaction);
		self.connect_target = None;
		match interaction {
			Interaction::Idle => Change::NONE,
			Interaction::Panning { .. } => Change::NONE,
			Interaction::Repositioning { node, .. } => {
				if self.config.release_on_drop {
					if let Some(n) = self.graph.node_mut(node) {
						n.fixed = false;
					}
				}
				Change::WARM
			}
			Interaction::NodeMouseDown { node, .. } => match self.hit_test(at).node() {
				Some(other) if other != node => self.connect(node, other),
				// short presses released anywhere count as clicks
				_ => self.toggle_node_selection(node),
			},
			Interaction::Dragging { node, .. } => match self.hit_test(at).node() {
				Some(other) if other == node => self.toggle_node_selection(node),
				Some(other) => self.connect(node, other),
				None => {
					debug!("connect gesture from {node} cancelled");
					Change::REDRAW
				}
			},
		}
	}

	fn context_menu(&mut self, at: ScreenPoint) -> Change {
		if self.interaction != Interaction::Idle || self.hit_test(at) != HitTarget::Empty {
			return Change::NONE;
		}
		let p = self.viewport.screen_to_graph(at);
		let id = self.graph.add_node(p.x, p.y);
		debug!("added node {id} at ({:.1}, {:.1})", p.x, p.y);
		Change::REBUILD
	}

	fn double_click(&mut self, at: ScreenPoint) -> Change {
		if self.expanded.take().is_some() {
			return Change::REDRAW;
		}
		match self.hit_test(at) {
			HitTarget::Card(node) => {
				self.expanded = Some(ExpandedView { node, anchor: at });
				Change::REDRAW
			}
			_ => Change::NONE,
		}
	}

	fn key(&mut self, key: Key) -> Change {
		if self.expanded.is_some() && key != Key::Escape {
			return Change::NONE;
		}
		match key {
			Key::Delete => self.delete_selection(),
			Key::Escape => {
				if self.expanded.take().is_some() {
					return Change::REDRAW;
				}
				if self.interaction != Interaction::Idle {
					return self.cancel_gesture();
				}
				if self.selection == Selection::None {
					return Change::NONE;
				}
				self.selection = Selection::None;
				Change::REBUILD
			}
			Key::Release => {
				let Some(n) = self.selection.node().and_then(|id| self.graph.node_mut(id)) else {
					return Change::NONE;
				};
				if !n.fixed {
					return Change::NONE;
				}
				n.fixed = false;
				Change::WARM
			}
		}
	}

	fn cancel_gesture(&mut self) -> Change {
		self.connect_target = None;
		match std::mem::take(&mut self.interaction) {
			Interaction::Idle => Change::NONE,
			_ => Change::REDRAW,
		}
	}

	fn connect(&mut self, from: NodeId, to: NodeId) -> Change {
		match self.graph.add_or_toggle_edge(from, to) {
			Ok(key) => {
				debug!("linked {from} -> {to} as {key}");
				self.selection = Selection::Link(key);
				Change::REBUILD
			}
			Err(err) => {
				debug!("ignored connect gesture: {err}");
				Change::REDRAW
			}
		}
	}

	fn toggle_node_selection(&mut self, node: NodeId) -> Change {
		self.selection = if self.selection.is_node(node) {
			Selection::None
		} else {
			Selection::Node(node)
		};
		Change::REBUILD
	}

	fn toggle_link_selection(&mut self, key: LinkKey) {
		self.selection = if self.selection.is_link(key) {
			Selection::None
		} else {
			Selection::Link(key)
		};
	}

	fn delete_selection(&mut self) -> Change {
		match self.selection {
			Selection::None => Change::NONE,
			Selection::Node(id) => {
				let removed = self.graph.remove_node(id).is_some();
				self.selection = Selection::None;
				if removed {
					debug!("removed node {id}");
				}
				Change::REBUILD
			}
			Selection::Link(key) => {
				self.graph.remove_link(key);
				self.selection = Selection::None;
				debug!("removed link {key}");
				Change::REBUILD
			}
		}
	}

	fn update_connect_target(&mut self, from: NodeId, at: ScreenPoint) {
		self.connect_target = self.hit_test(at).node().filter(|&id| id != from);
	}

	/// Drops selection, overlay and gesture references to entities that no longer exist.
	fn prune_stale_references(&mut self) {
		let stale_selection = match self.selection {
			Selection::None => false,
			Selection::Node(id) => !self.graph.contains_node(id),
			Selection::Link(key) => self.graph.link(key).is_none(),
		};
		if stale_selection {
			self.selection = Selection::None;
		}
		if self
			.expanded
			.is_some_and(|view| !self.graph.contains_node(view.node))
		{
			self.expanded = None;
		}
		let gesture_node = match &self.interaction {
			Interaction::NodeMouseDown { node, .. }
			| Interaction::Dragging { node, .. }
			| Interaction::Repositioning { node, .. } => Some(*node),
			_ => None,
		};
		if gesture_node.is_some_and(|id| !self.graph.contains_node(id)) {
			self.interaction = Interaction::Idle;
			self.connect_target = None;
		}
	}
}

/// Pure reducer form of [`EditorState::apply`].
pub fn reduce(mut state: EditorState, action: Action) -> (EditorState, Change) {
	let change = state.apply(action);
	(state, change)
}

fn distance_to_segment(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
	let (abx, aby) = (b.0 - a.0, b.1 - a.1);
	let len_sq = abx * abx + aby * aby;
	let t = if len_sq <= f64::EPSILON {
		0.0
	} else {
		(((p.0 - a.0) * abx + (p.1 - a.1) * aby) / len_sq).clamp(0.0, 1.0)
	};
	let (cx, cy) = (a.0 + abx * t, a.1 + aby * t);
	((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
