use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::reconcile::{Circle, NodeVisual, Rect};
use super::state::EditorRuntime;
use super::types::GraphPoint;

const BACKGROUND: &str = "#eef1f6";
const ACCENT: &str = "#50E3C2";
const CARD_FILL: &str = "rgba(255, 255, 255, 1)";
const CARD_SHADOW: &str = "rgba(0, 17, 49, 0.1)";
const HANDLE_SHADOW: &str = "rgba(0, 0, 0, 0.07)";
const LABEL_COLOR: &str = "#2b2f3a";
/// Gap left between a node center and an arrowed link end.
const ARROW_PADDING: f64 = 32.0;
const ARROW_SIZE: f64 = 10.0;
const LINE_HEIGHT: f64 = 17.0;

pub fn render(runtime: &EditorRuntime, ctx: &CanvasRenderingContext2d) {
	let editor = &runtime.editor;
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, editor.width, editor.height);
	ctx.save();
	let _ = ctx.translate(editor.viewport.translate_x, editor.viewport.translate_y);
	let _ = ctx.scale(editor.viewport.scale(), editor.viewport.scale());
	draw_links(runtime, ctx);
	draw_drag_line(runtime, ctx);
	draw_nodes(runtime, ctx);
	ctx.restore();
}

fn draw_links(runtime: &EditorRuntime, ctx: &CanvasRenderingContext2d) {
	let graph = &runtime.editor.graph;
	ctx.set_line_width(3.0);
	for link in graph.links() {
		let Some(visual) = runtime.scene.links.get(&link.key()) else {
			continue;
		};
		let Some(((x1, y1), (x2, y2))) = graph.link_endpoints(link) else {
			continue;
		};
		let (dx, dy) = (x2 - x1, y2 - y1);
		let dist = (dx * dx + dy * dy).sqrt();
		if dist < 0.001 {
			continue;
		}
		let (ux, uy) = (dx / dist, dy / dist);
		let source_padding = if visual.marker_start { ARROW_PADDING } else { 0.0 };
		let target_padding = if visual.marker_end { ARROW_PADDING } else { 0.0 };
		let (sx, sy) = (x1 + ux * source_padding, y1 + uy * source_padding);
		let (tx, ty) = (x2 - ux * target_padding, y2 - uy * target_padding);

		if visual.selected {
			set_dash(ctx, &[10.0, 2.0]);
		}
		ctx.set_stroke_style_str(ACCENT);
		ctx.begin_path();
		ctx.move_to(sx, sy);
		ctx.line_to(tx, ty);
		ctx.stroke();
		set_dash(ctx, &[]);

		if visual.marker_end {
			draw_arrow(ctx, (tx, ty), (ux, uy));
		}
		if visual.marker_start {
			draw_arrow(ctx, (sx, sy), (-ux, -uy));
		}
	}
}

fn draw_drag_line(runtime: &EditorRuntime, ctx: &CanvasRenderingContext2d) {
	let Some((start, end)) = runtime.editor.rubber_band() else {
		return;
	};
	let GraphPoint { x: x1, y: y1 } = start;
	let GraphPoint { x: x2, y: y2 } = end;
	ctx.set_stroke_style_str(ACCENT);
	ctx.set_line_width(3.0);
	set_dash(ctx, &[8.0, 4.0]);
	ctx.set_line_dash_offset(-(runtime.flow_time * 30.0) % 12.0);
	ctx.begin_path();
	ctx.move_to(x1, y1);
	ctx.line_to(x2, y2);
	ctx.stroke();
	set_dash(ctx, &[]);

	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist > ARROW_SIZE {
		draw_arrow(ctx, (x2, y2), (dx / dist, dy / dist));
	}
}

fn draw_nodes(runtime: &EditorRuntime, ctx: &CanvasRenderingContext2d) {
	ctx.set_font("13px sans-serif");
	ctx.set_text_baseline("top");
	for node in runtime.editor.graph.nodes() {
		let Some(visual) = runtime.scene.nodes.get(&node.id) else {
			continue;
		};
		ctx.save();
		let _ = ctx.translate(node.x, node.y);
		draw_card(ctx, visual);
		ctx.restore();
	}
}

fn draw_card(ctx: &CanvasRenderingContext2d, visual: &NodeVisual) {
	rounded_rect(ctx, &visual.shadow);
	ctx.set_fill_style_str(CARD_SHADOW);
	ctx.fill();

	rounded_rect(ctx, &visual.card);
	ctx.set_fill_style_str(CARD_FILL);
	ctx.fill();
	if visual.selected {
		ctx.set_stroke_style_str(ACCENT);
		ctx.set_line_width(2.0);
		ctx.stroke();
	}

	rounded_rect(ctx, &visual.marker);
	ctx.set_fill_style_str(ACCENT);
	ctx.fill();

	ctx.set_fill_style_str(LABEL_COLOR);
	let (text_x, text_y) = (
		visual.card.x + visual.marker.w + 12.0,
		visual.card.y + 12.0,
	);
	for (row, line) in visual.label_lines.iter().enumerate() {
		let _ = ctx.fill_text(line, text_x, text_y + row as f64 * LINE_HEIGHT);
	}

	fill_circle(ctx, &visual.handle_shadow, HANDLE_SHADOW);
	let handle = Circle {
		r: visual.handle.r * visual.handle_scale,
		..visual.handle
	};
	fill_circle(ctx, &handle, ACCENT);
	if visual.reflexive {
		ctx.set_stroke_style_str("black");
		ctx.set_line_width(2.5);
		ctx.stroke();
	}
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, tip: (f64, f64), dir: (f64, f64)) {
	let (ux, uy) = dir;
	let (back_x, back_y) = (tip.0 - ux * ARROW_SIZE, tip.1 - uy * ARROW_SIZE);
	let (px, py) = (-uy * ARROW_SIZE * 0.5, ux * ARROW_SIZE * 0.5);
	ctx.set_fill_style_str(ACCENT);
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn fill_circle(ctx: &CanvasRenderingContext2d, circle: &Circle, color: &str) {
	ctx.begin_path();
	let _ = ctx.arc(circle.cx, circle.cy, circle.r, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(color);
	ctx.fill();
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, rect: &Rect) {
	let Rect { x, y, w, h, r } = *rect;
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn set_dash(ctx: &CanvasRenderingContext2d, segments: &[f64]) {
	let array = js_sys::Array::new();
	for segment in segments {
		array.push(&JsValue::from_f64(*segment));
	}
	let _ = ctx.set_line_dash(&array);
}
