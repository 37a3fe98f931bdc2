use super::layout::Simulation;
use super::reconcile::Scene;
use super::reducer::{Action, Change, EditorState, HOVER_HANDLE_SCALE, LayoutEffect};
use crate::config::EditorConfig;

/// Everything the canvas needs between frames: the editor model, its layout and
/// the retained visuals.
pub struct EditorRuntime {
	/// Model, selection, viewport and gesture state.
	pub editor: EditorState,
	/// Force layout over `editor.graph`.
	pub layout: Simulation,
	/// Visuals kept in step with the model.
	pub scene: Scene,
	/// Seconds of animated time, drives the dash flow of the rubber-band.
	pub flow_time: f64,
}

impl EditorRuntime {
	/// Seeded editor on a `width` x `height` canvas.
	pub fn new(config: EditorConfig, width: f64, height: f64) -> Self {
		let layout = Simulation::new(config.layout, width, height);
		let editor = EditorState::new(config, width, height);
		Self::from_parts(editor, layout)
	}

	/// Wraps an existing editor and layout, building visuals for the current graph.
	pub fn from_parts(editor: EditorState, layout: Simulation) -> Self {
		let mut runtime = Self {
			editor,
			layout,
			scene: Scene::default(),
			flow_time: 0.0,
		};
		runtime.absorb(Change::REBUILD);
		runtime
	}

	/// Applies an action and carries out the reported [`Change`].
	pub fn dispatch(&mut self, action: Action) -> Change {
		if let Action::Resize { width, height } = action {
			self.layout.resize(width, height);
		}
		let change = self.editor.apply(action);
		self.absorb(change);
		change
	}

	fn absorb(&mut self, change: Change) {
		if change.reconcile {
			let config = self.editor.config();
			self.scene.reconcile(&self.editor.graph, self.editor.selection, &config.card);
		}
		match change.layout {
			LayoutEffect::None => {}
			LayoutEffect::Resume => self.layout.resume(),
			LayoutEffect::Restart => self.layout.restart(),
		}
	}

	/// Advances layout and handle animations by `dt` seconds.
	/// Returns whether another frame is needed.
	pub fn frame(&mut self, dt: f64) -> bool {
		let running = self.layout.tick(&mut self.editor.graph);
		let animating = self.animate_handles(dt);
		let gesture = self.editor.rubber_band().is_some();
		if gesture {
			self.flow_time += dt;
		}
		running || animating || gesture
	}

	/// Whether the layout or a rubber-band still wants frames.
	pub fn needs_frame(&self) -> bool {
		self.layout.is_running() || self.editor.rubber_band().is_some()
	}

	fn animate_handles(&mut self, dt: f64) -> bool {
		let target = self.editor.connect_target;
		let mut animating = false;
		for id in self.editor.graph.node_ids() {
			if let Some(visual) = self.scene.nodes.get_mut(&id) {
				visual.handle_scale_target = if target == Some(id) {
					HOVER_HANDLE_SCALE
				} else {
					1.0
				};
				animating |= visual.animate(dt);
			}
		}
		animating
	}
}
