use super::geometry::{Bounds, Point};

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;
/// Screen-space margin kept around fitted content.
pub const FIT_MARGIN: f64 = 40.0;
/// A filter fit never zooms in further than this multiple of the current zoom.
pub const FILTER_ZOOM_CAP: f64 = 1.5;

/// Maps graph space to screen space: `screen = graph * k + (x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

pub fn clamp_zoom(k: f64) -> f64 {
	k.clamp(MIN_ZOOM, MAX_ZOOM)
}

impl ViewTransform {
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		Point::new((sx - self.x) / self.k, (sy - self.y) / self.k)
	}

	pub fn graph_to_screen(&self, p: Point) -> (f64, f64) {
		(p.x * self.k + self.x, p.y * self.k + self.y)
	}

	/// Transform that centers `bounds` in a `width` x `height` viewport.
	/// `max_k` caps the zoom on top of the global clamp.
	pub fn fit(bounds: &Bounds, width: f64, height: f64, max_k: Option<f64>) -> Self {
		let usable_w = (width - 2.0 * FIT_MARGIN).max(1.0);
		let usable_h = (height - 2.0 * FIT_MARGIN).max(1.0);
		let (bw, bh) = (bounds.width().max(1.0), bounds.height().max(1.0));
		let mut k = (usable_w / bw).min(usable_h / bh);
		if let Some(cap) = max_k {
			k = k.min(cap);
		}
		let k = clamp_zoom(k);
		let center = bounds.center();
		Self {
			x: width / 2.0 - center.x * k,
			y: height / 2.0 - center.y * k,
			k,
		}
	}

	/// Zooms by `factor` keeping the screen point `(sx, sy)` fixed.
	pub fn zoom_about(&mut self, sx: f64, sy: f64, factor: f64) {
		let anchor = self.screen_to_graph(sx, sy);
		self.k = clamp_zoom(self.k * factor);
		let (ax, ay) = self.graph_to_screen(anchor);
		self.pan_by(sx - ax, sy - ay);
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) {
		self.x += dx;
		self.y += dy;
	}
}
