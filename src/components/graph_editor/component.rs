use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::ev;
use leptos::html::Canvas;
use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent};

use super::reducer::{Action, EditorState, Key};
use super::render;
use super::state::EditorRuntime;
use super::types::{Modifiers, NodeId, ScreenPoint};
use crate::config::EditorConfig;
use crate::error::{Error, Result};

/// Longest step fed to the layout after the tab was hidden or the page stalled.
const MAX_FRAME_DT: f64 = 0.05;

type SharedRuntime = Rc<RefCell<Option<EditorRuntime>>>;

/// The expanded card shown above the blurred canvas.
#[derive(Clone, Debug, PartialEq)]
struct OverlayView {
	node: NodeId,
	x: f64,
	y: f64,
	label: String,
}

impl OverlayView {
	fn of(editor: &EditorState) -> Option<Self> {
		let expanded = editor.expanded?;
		let node = editor.graph.node(expanded.node)?;
		Some(Self {
			node: expanded.node,
			x: expanded.anchor.x,
			y: expanded.anchor.y,
			label: node.label.clone(),
		})
	}
}

/// Requests animation frames on demand. At most one frame is ever pending and
/// the loop stops once the runtime reports nothing left to animate.
#[derive(Clone, Default)]
struct FrameScheduler {
	pending: Rc<Cell<bool>>,
	last_timestamp: Rc<Cell<Option<f64>>>,
	callback: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>,
}

impl FrameScheduler {
	fn install(&self, runtime: SharedRuntime, ctx: CanvasRenderingContext2d) {
		let scheduler = self.clone();
		*self.callback.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			scheduler.pending.set(false);
			let dt = match scheduler.last_timestamp.replace(Some(timestamp)) {
				Some(previous) => ((timestamp - previous) / 1000.0).clamp(0.0, MAX_FRAME_DT),
				None => 1.0 / 60.0,
			};
			let more = match runtime.borrow_mut().as_mut() {
				Some(rt) => {
					let more = rt.frame(dt);
					render::render(rt, &ctx);
					more
				}
				None => false,
			};
			if more {
				scheduler.request();
			} else {
				scheduler.last_timestamp.set(None);
			}
		}));
	}

	fn request(&self) {
		if self.pending.replace(true) {
			return;
		}
		let requested = match (web_sys::window(), self.callback.borrow().as_ref()) {
			(Some(window), Some(cb)) => window.request_animation_frame(cb.as_ref().unchecked_ref()).is_ok(),
			_ => false,
		};
		if !requested {
			self.pending.set(false);
		}
	}
}

fn window_size() -> Result<(f64, f64)> {
	let window = web_sys::window().ok_or(Error::MissingWindow)?;
	Ok((
		window.inner_width()?.as_f64().unwrap_or(800.0),
		window.inner_height()?.as_f64().unwrap_or(600.0),
	))
}

fn pointer(canvas_ref: NodeRef<Canvas>, ev: &MouseEvent) -> Option<ScreenPoint> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some(ScreenPoint::new(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Keys typed into the card text area belong to the text area, except Escape.
fn typing_in_field(ev: &KeyboardEvent) -> bool {
	ev.target()
		.and_then(|target| target.dyn_into::<web_sys::Element>().ok())
		.is_some_and(|element| matches!(element.tag_name().as_str(), "TEXTAREA" | "INPUT"))
}

/// Canvas node/link editor.
#[component]
pub fn GraphEditor(
	#[prop(optional)] config: EditorConfig,
	#[prop(default = true)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<Canvas>::new();
	let runtime: SharedRuntime = Rc::new(RefCell::new(None));
	let frames = FrameScheduler::default();
	let overlay = RwSignal::new(None::<OverlayView>);

	let dispatch: Rc<dyn Fn(Action)> = {
		let (runtime, frames) = (runtime.clone(), frames.clone());
		Rc::new(move |action: Action| {
			let (change, needs_frame, view) = {
				let mut guard = runtime.borrow_mut();
				let Some(rt) = guard.as_mut() else {
					return;
				};
				let change = rt.dispatch(action);
				(change, rt.needs_frame(), OverlayView::of(&rt.editor))
			};
			if overlay.get_untracked() != view {
				overlay.set(view);
			}
			if change.redraw || needs_frame {
				frames.request();
			}
		})
	};

	let setup = {
		let (runtime, frames, dispatch) = (runtime.clone(), frames.clone(), dispatch.clone());
		move |canvas: HtmlCanvasElement| -> Result<()> {
			let (w, h) = if fullscreen {
				window_size()?
			} else {
				let parent = canvas.parent_element();
				(
					width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
					height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
				)
			};
			canvas.set_width(w as u32);
			canvas.set_height(h as u32);

			let ctx: CanvasRenderingContext2d = canvas
				.get_context("2d")?
				.ok_or(Error::CanvasContext)?
				.dyn_into()
				.map_err(|_| Error::CanvasContext)?;
			*runtime.borrow_mut() = Some(EditorRuntime::new(config.clone(), w, h));
			frames.install(runtime.clone(), ctx);
			debug!("editor mounted at {w}x{h}");

			if fullscreen {
				let dispatch = dispatch.clone();
				let handle = window_event_listener(ev::resize, move |_| {
					let Ok((nw, nh)) = window_size() else {
						return;
					};
					canvas.set_width(nw as u32);
					canvas.set_height(nh as u32);
					dispatch(Action::Resize {
						width: nw,
						height: nh,
					});
				});
				on_cleanup(move || handle.remove());
			}
			frames.request();
			Ok(())
		}
	};

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if let Err(err) = setup(canvas.into()) {
			error!("failed to start the editor: {err}");
		}
	});

	let keys = {
		let dispatch = dispatch.clone();
		window_event_listener(ev::keydown, move |ev: KeyboardEvent| {
			let Some(key) = Key::from_key_name(&ev.key()) else {
				return;
			};
			if key != Key::Escape && typing_in_field(&ev) {
				return;
			}
			if key == Key::Delete {
				// keep Backspace from navigating back
				ev.prevent_default();
			}
			dispatch(Action::Key(key));
		})
	};
	on_cleanup(move || keys.remove());

	let on_mousedown = {
		let dispatch = dispatch.clone();
		move |ev: MouseEvent| {
			if ev.button() != 0 {
				return;
			}
			if let Some(at) = pointer(canvas_ref, &ev) {
				let modifiers = Modifiers {
					ctrl: ev.ctrl_key() || ev.meta_key(),
				};
				dispatch(Action::PointerDown { at, modifiers });
			}
		}
	};

	let on_mousemove = {
		let dispatch = dispatch.clone();
		move |ev: MouseEvent| {
			if let Some(at) = pointer(canvas_ref, &ev) {
				dispatch(Action::PointerMove { at });
			}
		}
	};

	let on_mouseup = {
		let dispatch = dispatch.clone();
		move |ev: MouseEvent| {
			if let Some(at) = pointer(canvas_ref, &ev) {
				dispatch(Action::PointerUp { at });
			}
		}
	};

	let on_mouseleave = {
		let dispatch = dispatch.clone();
		move |_: MouseEvent| dispatch(Action::PointerLeave)
	};

	let on_contextmenu = {
		let dispatch = dispatch.clone();
		move |ev: MouseEvent| {
			ev.prevent_default();
			if let Some(at) = pointer(canvas_ref, &ev) {
				dispatch(Action::ContextMenu { at });
			}
		}
	};

	let on_dblclick = {
		let dispatch = dispatch.clone();
		move |ev: MouseEvent| {
			if let Some(at) = pointer(canvas_ref, &ev) {
				dispatch(Action::DoubleClick { at });
			}
		}
	};

	let on_wheel = {
		let dispatch = dispatch.clone();
		move |ev: WheelEvent| {
			ev.prevent_default();
			if let Some(at) = pointer(canvas_ref, &ev) {
				dispatch(Action::Wheel {
					at,
					delta_y: ev.delta_y(),
				});
			}
		}
	};

	let on_input = move |ev: ev::Event| {
		if let Some(view) = overlay.get_untracked() {
			dispatch(Action::RenameNode {
				node: view.node,
				label: event_target_value(&ev),
			});
		}
	};

	let expanded = move || overlay.with(Option::is_some);

	view! {
		<canvas
			node_ref=canvas_ref
			class=move || if expanded() { "graph-editor-canvas body-blurred" } else { "graph-editor-canvas" }
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:contextmenu=on_contextmenu
			on:dblclick=on_dblclick
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
		<div
			class=move || if expanded() { "full-node full-node-expanded" } else { "full-node" }
			style=move || {
				overlay
					.with(|view| view.as_ref().map(|v| (v.x, v.y)))
					.map(|(x, y)| format!("transform: translate({x}px, {y}px) scale(1);"))
					.unwrap_or_default()
			}
		>
			<textarea
				class="card-input"
				rows="4"
				spellcheck="false"
				prop:value=move || overlay.with(|view| view.as_ref().map(|v| v.label.clone()).unwrap_or_default())
				on:input=on_input
			/>
		</div>
	}
}
