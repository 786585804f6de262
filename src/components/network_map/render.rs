use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::scene::{Scene, StyledCircle, StyledEdge};
use super::segments::SegmentKind;
use super::style::ShapeStyle;
use super::viewport::ViewTransform;

const BACKGROUND: &str = "#f7f8fa";
const LABEL_COLOR: &str = "#333333";
const BADGE_COLOR: &str = "#d62728";
const PUBLIC_MARKER_COLOR: &str = "#2ca02c";

/// `#rrggbb` as `rgba(..)` with `alpha`; other color syntaxes pass through.
fn with_alpha(color: &str, alpha: f64) -> String {
	let hex = color
		.strip_prefix('#')
		.filter(|h| h.len() == 6 && h.is_ascii());
	let channels = hex.and_then(|h| {
		let channel = |i: usize| u8::from_str_radix(&h[i..i + 2], 16).ok();
		Some((channel(0)?, channel(2)?, channel(4)?))
	});
	match channels {
		Some((r, g, b)) => format!("rgba({r}, {g}, {b}, {alpha})"),
		None => color.to_owned(),
	}
}

fn dash_array(dash: &[f64], k: f64) -> js_sys::Array {
	dash.iter().map(|d| JsValue::from_f64(d / k)).collect()
}

pub fn render(
	scene: &Scene,
	transform: &ViewTransform,
	width: f64,
	height: f64,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
	ctx.save();
	let _ = ctx.translate(transform.x, transform.y);
	let _ = ctx.scale(transform.k, transform.k);
	for group in &scene.groups {
		draw_group(group, transform.k, ctx);
	}
	for edge in &scene.edges {
		draw_edge(edge, transform.k, ctx);
	}
	for node in &scene.nodes {
		draw_node(node, transform.k, ctx);
	}
	ctx.restore();
}

fn stroke_circle(
	x: f64,
	y: f64,
	r: f64,
	style: &ShapeStyle,
	k: f64,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.begin_path();
	let _ = ctx.arc(x, y, r, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&style.fill);
	ctx.fill();
	let _ = ctx.set_line_dash(&dash_array(&style.dash, k));
	ctx.set_stroke_style_str(&style.stroke);
	ctx.set_line_width(style.stroke_width / k);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_group(group: &StyledCircle, k: f64, ctx: &CanvasRenderingContext2d) {
	let (c, style) = (&group.circle, &group.style);
	ctx.set_global_alpha(style.opacity);
	stroke_circle(c.x, c.y, c.r, style, k, ctx);

	if let Some(label) = &style.label {
		ctx.set_fill_style_str(&style.stroke);
		ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(label, c.x, c.y - c.r + 14.0 / k.max(0.5));
	}
	ctx.set_global_alpha(1.0);
}

fn draw_edge(edge: &StyledEdge, k: f64, ctx: &CanvasRenderingContext2d) {
	let (geometry, style) = (&edge.geometry, &edge.style);
	let (start, end) = (geometry.start, geometry.end);
	let length = start.distance(end);
	if length < 0.001 {
		return;
	}
	let (ux, uy) = ((end.x - start.x) / length, (end.y - start.y) / length);
	let arrow_size = (8.0 / k).min(length / 2.0);

	// Hard-edged two-tone gradient: faint where the edge crosses an
	// unrelated group.
	let gradient = ctx.create_linear_gradient(start.x, start.y, end.x, end.y);
	for stop in &style.stops {
		let alpha = match stop.kind {
			SegmentKind::Related => 1.0,
			SegmentKind::Unrelated => style.unrelated_opacity,
		};
		let offset = (stop.offset / 100.0).clamp(0.0, 1.0) as f32;
		let _ = gradient.add_color_stop(offset, &with_alpha(&style.color, alpha));
	}

	ctx.set_global_alpha(style.opacity);
	if style.stops.is_empty() {
		ctx.set_stroke_style_str(&style.color);
	} else {
		#[allow(deprecated)]
		ctx.set_stroke_style(&gradient);
	}
	ctx.set_line_width(style.width / k);
	let _ = ctx.set_line_dash(&dash_array(&style.dash, k));
	ctx.begin_path();
	ctx.move_to(start.x, start.y);
	ctx.line_to(end.x - ux * arrow_size, end.y - uy * arrow_size);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	let (back_x, back_y) = (end.x - ux * arrow_size, end.y - uy * arrow_size);
	let (px, py) = (-uy * arrow_size * 0.5, ux * arrow_size * 0.5);
	ctx.set_fill_style_str(&style.color);
	ctx.begin_path();
	ctx.move_to(end.x, end.y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
	ctx.set_global_alpha(1.0);
}

fn draw_node(node: &StyledCircle, k: f64, ctx: &CanvasRenderingContext2d) {
	let (c, style) = (&node.circle, &node.style);
	let r = c.r * style.scale;
	ctx.set_global_alpha(style.opacity);
	stroke_circle(c.x, c.y, r, style, k, ctx);

	if style.public_marker {
		let (mx, my, mr) = (c.x + r * 0.7, c.y + r * 0.7, r * 0.3);
		ctx.begin_path();
		let _ = ctx.arc(mx, my, mr, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(PUBLIC_MARKER_COLOR);
		ctx.fill();
	}

	if let Some(badge) = &style.badge {
		let (bx, by, br) = (c.x + r * 0.75, c.y - r * 0.75, (r * 0.45).max(6.0 / k));
		ctx.begin_path();
		let _ = ctx.arc(bx, by, br, 0.0, 2.0 * PI);
		ctx.set_fill_style_str(BADGE_COLOR);
		ctx.fill();
		ctx.set_fill_style_str("white");
		ctx.set_font(&format!("bold {}px sans-serif", br * 1.1));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(badge, bx, by + br * 0.4);
	}

	if let Some(label) = &style.label {
		ctx.set_fill_style_str(LABEL_COLOR);
		ctx.set_font(&format!("{}px sans-serif", 10.0 / k.max(0.5)));
		ctx.set_text_align("center");
		let _ = ctx.fill_text(label, c.x, c.y + r + 12.0 / k.max(0.5));
	}
	ctx.set_global_alpha(1.0);
}
