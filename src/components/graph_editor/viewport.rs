//! Pan and zoom between screen and graph space.

use super::types::{GraphPoint, ScreenPoint};

/// Wheel step applied per notch, the same in both directions.
pub const ZOOM_STEP: f64 = 1.1;

/// Pan/zoom transform between screen space and graph space.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
	/// Screen offset of the graph origin.
	pub translate_x: f64,
	/// Screen offset of the graph origin.
	pub translate_y: f64,
	scale: f64,
	min_scale: f64,
	max_scale: f64,
}

impl Default for Viewport {
	fn default() -> Self {
		Self::new(0.25, 1.0)
	}
}

impl Viewport {
	/// Identity transform with the scale limited to `[min_scale, max_scale]`.
	pub fn new(min_scale: f64, max_scale: f64) -> Self {
		let (min_scale, max_scale) = if min_scale <= max_scale {
			(min_scale, max_scale)
		} else {
			(max_scale, min_scale)
		};
		Self {
			translate_x: 0.0,
			translate_y: 0.0,
			scale: 1.0_f64.clamp(min_scale, max_scale),
			min_scale,
			max_scale,
		}
	}

	/// Current zoom factor.
	pub fn scale(&self) -> f64 {
		self.scale
	}

	/// Sets the scale, clamped to the extent. Returns the applied value.
	pub fn set_scale(&mut self, scale: f64) -> f64 {
		self.scale = if scale.is_finite() {
			scale.clamp(self.min_scale, self.max_scale)
		} else {
			self.scale
		};
		self.scale
	}

	/// `(p - translate) / scale`.
	pub fn screen_to_graph(&self, p: ScreenPoint) -> GraphPoint {
		GraphPoint::new(
			(p.x - self.translate_x) / self.scale,
			(p.y - self.translate_y) / self.scale,
		)
	}

	/// Inverse of [`Self::screen_to_graph`].
	pub fn graph_to_screen(&self, p: GraphPoint) -> ScreenPoint {
		ScreenPoint::new(
			p.x * self.scale + self.translate_x,
			p.y * self.scale + self.translate_y,
		)
	}

	/// Shifts the view by a screen-space delta.
	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.translate_x += dx;
		self.translate_y += dy;
	}

	/// Multiplies the scale by `factor` while keeping the graph point under `anchor` fixed.
	pub fn zoom_at(&mut self, anchor: ScreenPoint, factor: f64) {
		let before = self.screen_to_graph(anchor);
		self.set_scale(self.scale * factor);
		self.translate_x = anchor.x - before.x * self.scale;
		self.translate_y = anchor.y - before.y * self.scale;
	}

	/// Zoom step for a wheel delta: positive deltas zoom out, negative zoom in.
	/// Purely horizontal scrolls report no vertical delta and leave the zoom alone.
	pub fn wheel_factor(delta_y: f64) -> f64 {
		if delta_y > 0.0 {
			1.0 / ZOOM_STEP
		} else if delta_y < 0.0 {
			ZOOM_STEP
		} else {
			1.0
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn scale_is_clamped_to_extent() {
		let mut viewport = Viewport::default();
		assert_eq!(viewport.set_scale(0.1), 0.25);
		assert_eq!(viewport.set_scale(3.0), 1.0);
		assert_eq!(viewport.set_scale(0.5), 0.5);
		assert_eq!(viewport.set_scale(f64::NAN), 0.5);
	}

	#[test]
	fn screen_to_graph_subtracts_translate_and_divides_by_scale() {
		let mut viewport = Viewport::default();
		viewport.pan_by(40.0, -20.0);
		viewport.set_scale(0.5);
		let p = viewport.screen_to_graph(ScreenPoint::new(140.0, 80.0));
		assert_eq!(p, GraphPoint::new(200.0, 200.0));
		assert_eq!(viewport.graph_to_screen(p), ScreenPoint::new(140.0, 80.0));
	}

	#[test]
	fn zoom_keeps_anchor_fixed() {
		let mut viewport = Viewport::default();
		let anchor = ScreenPoint::new(300.0, 120.0);
		let before = viewport.screen_to_graph(anchor);
		viewport.zoom_at(anchor, 0.5);
		let after = viewport.screen_to_graph(anchor);
		assert!((before.x - after.x).abs() < 1e-9);
		assert!((before.y - after.y).abs() < 1e-9);
		assert_eq!(viewport.scale(), 0.5);
	}

	#[test]
	fn repeated_zoom_never_leaves_extent() {
		let mut viewport = Viewport::default();
		for _ in 0..50 {
			viewport.zoom_at(ScreenPoint::default(), Viewport::wheel_factor(1.0));
		}
		assert_eq!(viewport.scale(), 0.25);
		for _ in 0..50 {
			viewport.zoom_at(ScreenPoint::default(), Viewport::wheel_factor(-1.0));
		}
		assert_eq!(viewport.scale(), 1.0);
	}

	#[test]
	fn horizontal_scroll_does_not_zoom() {
		let mut viewport = Viewport::default();
		viewport.set_scale(0.5);
		viewport.zoom_at(ScreenPoint::new(10.0, 10.0), Viewport::wheel_factor(0.0));
		assert_eq!(viewport.scale(), 0.5);
		assert_eq!(Viewport::wheel_factor(f64::NAN), 1.0);
	}
}
