//! Style contributors.
//!
//! Every visual feature is a [`StyleContributor`] registered in a fixed order
//! on the engine. Each contributor refines the style produced by the ones
//! before it and reads only the explicit [`RenderContext`].

use super::filter::{DIMMED_OPACITY, FilterState};
use super::segments::{EdgeGeometry, GradientStop};
use super::selection::{EdgeHighlight, NodeHighlight, SelectionState};
use super::types::{Edge, GroupVariant, Vertex, VertexMap};

const COLORS: &[&str] = &[
	"#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
	"#bcbd22", "#17becf",
];

const LEAF_FILL: &str = "#e8f1fa";
const EDGE_COLOR: &str = "#666666";
const HEAD_COLOR: &str = "#d62728";
const NEIGHBOUR_COLOR: &str = "#ff7f0e";
const DIRECTED_COLOR: &str = "#1f77b4";
/// Opacity of edge stretches crossing an unrelated group.
pub const UNRELATED_OPACITY: f64 = 0.15;

/// Everything a contributor may read while styling one frame.
pub struct RenderContext<'a> {
	pub vertices: &'a VertexMap,
	pub edges: &'a [Edge],
	pub selection: &'a SelectionState,
	pub filter: &'a FilterState,
	/// Current feedback pulse scale; `1.0` when idle.
	pub pulse_scale: f64,
}

/// Resolved style of a circle (leaf node or group boundary).
#[derive(Clone, Debug, PartialEq)]
pub struct ShapeStyle {
	pub fill: String,
	pub stroke: String,
	pub stroke_width: f64,
	pub dash: Vec<f64>,
	pub opacity: f64,
	/// Multiplier on the drawn radius.
	pub scale: f64,
	pub label: Option<String>,
	/// Text drawn in a small badge, e.g. a hidden-descendant count.
	pub badge: Option<String>,
	/// Draws the public address marker.
	pub public_marker: bool,
	pub classes: Vec<&'static str>,
}

impl Default for ShapeStyle {
	fn default() -> Self {
		Self {
			fill: LEAF_FILL.into(),
			stroke: COLORS[0].into(),
			stroke_width: 1.5,
			dash: Vec::new(),
			opacity: 1.0,
			scale: 1.0,
			label: None,
			badge: None,
			public_marker: false,
			classes: Vec::new(),
		}
	}
}

impl ShapeStyle {
	pub fn add_class(&mut self, class: &'static str) {
		if !self.classes.contains(&class) {
			self.classes.push(class);
		}
	}

	#[cfg(test)]
	pub fn has_class(&self, class: &str) -> bool {
		self.classes.contains(&class)
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeStyle {
	pub color: String,
	/// Opacity of the unrelated gradient stretches.
	pub unrelated_opacity: f64,
	pub stops: Vec<GradientStop>,
	pub width: f64,
	pub dash: Vec<f64>,
	pub opacity: f64,
	pub classes: Vec<&'static str>,
}

impl Default for EdgeStyle {
	fn default() -> Self {
		Self {
			color: EDGE_COLOR.into(),
			unrelated_opacity: UNRELATED_OPACITY,
			stops: Vec::new(),
			width: 1.25,
			dash: Vec::new(),
			opacity: 1.0,
			classes: Vec::new(),
		}
	}
}

impl EdgeStyle {
	pub fn add_class(&mut self, class: &'static str) {
		if !self.classes.contains(&class) {
			self.classes.push(class);
		}
	}

	#[cfg(test)]
	pub fn has_class(&self, class: &str) -> bool {
		self.classes.contains(&class)
	}
}

pub trait StyleContributor {
	fn name(&self) -> &'static str;

	/// Leaf nodes and collapsed groups.
	fn style_node(&self, _vertex: &Vertex, _style: &mut ShapeStyle, _ctx: &RenderContext<'_>) {}

	/// Expanded groups drawn as boundaries.
	fn style_group(&self, _vertex: &Vertex, _style: &mut ShapeStyle, _ctx: &RenderContext<'_>) {}

	fn style_edge(&self, _edge: &EdgeGeometry, _style: &mut EdgeStyle, _ctx: &RenderContext<'_>) {}
}

/// The contributors every engine starts with, in application order.
pub fn default_contributors() -> Vec<Box<dyn StyleContributor>> {
	vec![
		Box::new(BaseStyle),
		Box::new(SelectionHighlight),
		Box::new(FilterDimming),
		Box::new(FeedbackPulse),
	]
}

fn variant_color(variant: GroupVariant) -> &'static str {
	match variant {
		GroupVariant::Boundary => "#555555",
		GroupVariant::Network => COLORS[2],
		GroupVariant::Cluster => COLORS[4],
		GroupVariant::Application => COLORS[1],
		GroupVariant::Other => COLORS[7],
	}
}

/// Applies the vertex's own style overrides on top of the defaults.
fn apply_overrides(vertex: &Vertex, style: &mut ShapeStyle) {
	let overrides = &vertex.style;
	if let Some(fill) = &overrides.fill {
		style.fill = fill.clone();
	}
	if let Some(stroke) = &overrides.stroke {
		style.stroke = stroke.clone();
	}
	if let Some(width) = overrides.stroke_width {
		style.stroke_width = width;
	}
	if let Some(dash) = &overrides.dash {
		style.dash = dash.clone();
	}
	if let Some(opacity) = overrides.opacity {
		style.opacity = opacity;
	}
}

/// Kind defaults, per-vertex overrides, collapsed badges, public marker and
/// segment gradient stops.
pub struct BaseStyle;

impl StyleContributor for BaseStyle {
	fn name(&self) -> &'static str {
		"base"
	}

	fn style_node(&self, vertex: &Vertex, style: &mut ShapeStyle, _ctx: &RenderContext<'_>) {
		style.label = vertex.display_label().map(str::to_owned);
		style.public_marker = vertex.has_public_ip();
		if let Some(variant) = vertex.variant() {
			let color = variant_color(variant);
			style.fill = color.into();
			style.stroke = color.into();
			style.stroke_width = 2.0;
			style.add_class("collapsed");
			style.badge = Some(vertex.descendant_count.to_string());
		}
		apply_overrides(vertex, style);
	}

	fn style_group(&self, vertex: &Vertex, style: &mut ShapeStyle, _ctx: &RenderContext<'_>) {
		let variant = vertex.variant().unwrap_or(GroupVariant::Other);
		style.fill = "rgba(0, 0, 0, 0.02)".into();
		style.stroke = variant_color(variant).into();
		style.stroke_width = 1.0;
		style.label = vertex.display_label().map(str::to_owned);
		if variant == GroupVariant::Boundary {
			style.dash = vec![8.0, 4.0];
		}
		apply_overrides(vertex, style);
	}

	fn style_edge(&self, edge: &EdgeGeometry, style: &mut EdgeStyle, _ctx: &RenderContext<'_>) {
		style.stops = edge.stops.clone();
	}
}

/// Head, neighbour and trace highlighting plus application group selection.
pub struct SelectionHighlight;

impl StyleContributor for SelectionHighlight {
	fn name(&self) -> &'static str {
		"selection"
	}

	fn style_node(&self, vertex: &Vertex, style: &mut ShapeStyle, ctx: &RenderContext<'_>) {
		if ctx.selection.is_empty() {
			return;
		}
		match ctx.selection.node_state(&vertex.id, ctx.edges) {
			NodeHighlight::Normal => {}
			NodeHighlight::Connected => {
				style.stroke = NEIGHBOUR_COLOR.into();
				style.stroke_width = 2.5;
				style.add_class("connected");
			}
			NodeHighlight::Head => {
				style.stroke = HEAD_COLOR.into();
				style.stroke_width = 3.5;
				style.add_class("head");
			}
			NodeHighlight::Path => {
				style.stroke = HEAD_COLOR.into();
				style.stroke_width = 3.5;
				style.add_class("path");
			}
		}
		if ctx.selection.group_selected(vertex) {
			style.add_class("selected");
		}
	}

	fn style_group(&self, vertex: &Vertex, style: &mut ShapeStyle, ctx: &RenderContext<'_>) {
		if ctx.selection.group_selected(vertex) {
			style.stroke = NEIGHBOUR_COLOR.into();
			style.stroke_width = 3.0;
			style.add_class("selected");
		}
	}

	fn style_edge(&self, edge: &EdgeGeometry, style: &mut EdgeStyle, ctx: &RenderContext<'_>) {
		match ctx.selection.edge_state(&edge.edge) {
			EdgeHighlight::Normal => {}
			EdgeHighlight::Outbound => {
				style.color = DIRECTED_COLOR.into();
				style.width = 2.0;
				style.add_class("outbound");
			}
			EdgeHighlight::Inbound => {
				style.color = DIRECTED_COLOR.into();
				style.width = 2.0;
				style.dash = vec![6.0, 4.0];
				style.add_class("inbound");
			}
			EdgeHighlight::Path => {
				style.color = HEAD_COLOR.into();
				style.width = 3.0;
				style.add_class("path");
			}
		}
	}
}

/// Fades vertices and edges the external filter rejects. Only touches opacity.
pub struct FilterDimming;

impl StyleContributor for FilterDimming {
	fn name(&self) -> &'static str {
		"filter"
	}

	fn style_node(&self, vertex: &Vertex, style: &mut ShapeStyle, ctx: &RenderContext<'_>) {
		if ctx.filter.is_active() && ctx.filter.is_dimmed(&vertex.id) {
			style.opacity *= DIMMED_OPACITY;
			style.add_class("dimmed");
		}
	}

	fn style_group(&self, vertex: &Vertex, style: &mut ShapeStyle, ctx: &RenderContext<'_>) {
		self.style_node(vertex, style, ctx);
	}

	fn style_edge(&self, edge: &EdgeGeometry, style: &mut EdgeStyle, ctx: &RenderContext<'_>) {
		if ctx.filter.edge_dimmed(&edge.edge) {
			style.opacity *= DIMMED_OPACITY;
			style.add_class("dimmed");
		}
	}
}

/// Scales visible nodes while the filter feedback pulse plays.
pub struct FeedbackPulse;

impl StyleContributor for FeedbackPulse {
	fn name(&self) -> &'static str {
		"pulse"
	}

	fn style_node(&self, vertex: &Vertex, style: &mut ShapeStyle, ctx: &RenderContext<'_>) {
		if ctx.pulse_scale != 1.0 && !ctx.filter.is_dimmed(&vertex.id) {
			style.scale *= ctx.pulse_scale;
		}
	}
}

#[cfg(test)]
mod tests {
	use std::collections::BTreeSet;

	use super::*;
	use crate::components::network_map::geometry::Point;
	use crate::components::network_map::segments::{EdgeSegment, SegmentKind};

	fn style_node(vertex: &Vertex, ctx: &RenderContext<'_>) -> ShapeStyle {
		let mut style = ShapeStyle::default();
		for contributor in default_contributors() {
			contributor.style_node(vertex, &mut style, ctx);
		}
		style
	}

	fn geometry(edge: Edge) -> EdgeGeometry {
		EdgeGeometry {
			edge,
			start: Point::new(0.0, 0.0),
			end: Point::new(10.0, 0.0),
			segments: vec![EdgeSegment {
				start: 0.0,
				end: 1.0,
				kind: SegmentKind::Related,
			}],
			stops: Vec::new(),
		}
	}

	#[test]
	fn dimming_leaves_highlight_untouched() {
		let vertices = VertexMap::new();
		let edges = vec![Edge::new("a", "b")];
		let mut selection = SelectionState::default();
		selection.select_vertex("a", false, &edges);
		let clear = FilterState::default();
		let mut filter = FilterState::default();
		filter.set(BTreeSet::from(["a".to_string()]));
		let a = Vertex::leaf("a");
		let bright = style_node(
			&a,
			&RenderContext {
				vertices: &vertices,
				edges: &edges,
				selection: &selection,
				filter: &clear,
				pulse_scale: 1.0,
			},
		);
		assert!(bright.has_class("head"));

		let dimmed = style_node(
			&a,
			&RenderContext {
				vertices: &vertices,
				edges: &edges,
				selection: &selection,
				filter: &filter,
				pulse_scale: 1.0,
			},
		);
		assert!(dimmed.has_class("head") && dimmed.has_class("dimmed"));
		assert_eq!(dimmed.stroke, bright.stroke);
		assert_eq!(dimmed.stroke_width, bright.stroke_width);
		assert!((dimmed.opacity - bright.opacity * DIMMED_OPACITY).abs() < 1e-12);
	}

	#[test]
	fn collapsed_groups_get_a_badge_and_overrides_win() {
		let vertices = VertexMap::new();
		let selection = SelectionState::default();
		let filter = FilterState::default();
		let ctx = RenderContext {
			vertices: &vertices,
			edges: &[],
			selection: &selection,
			filter: &filter,
			pulse_scale: 1.0,
		};
		let mut app = Vertex::group("app-1", GroupVariant::Application);
		app.collapsed = true;
		app.descendant_count = 7;
		app.style.fill = Some("#000000".into());
		let style = style_node(&app, &ctx);
		assert_eq!(style.badge.as_deref(), Some("7"));
		assert_eq!(style.fill, "#000000");
		assert_eq!(style.stroke, variant_color(GroupVariant::Application));
	}

	#[test]
	fn inbound_edges_are_dashed() {
		let vertices = VertexMap::new();
		let edges = vec![Edge::new("a", "b"), Edge::new("b", "c")];
		let mut selection = SelectionState::default();
		selection.select_vertex("b", false, &edges);
		let filter = FilterState::default();
		let ctx = RenderContext {
			vertices: &vertices,
			edges: &edges,
			selection: &selection,
			filter: &filter,
			pulse_scale: 1.0,
		};
		let mut inbound = EdgeStyle::default();
		let mut outbound = EdgeStyle::default();
		for contributor in default_contributors() {
			contributor.style_edge(&geometry(edges[0].clone()), &mut inbound, &ctx);
			contributor.style_edge(&geometry(edges[1].clone()), &mut outbound, &ctx);
		}
		assert!(inbound.has_class("inbound") && !inbound.dash.is_empty());
		assert!(outbound.has_class("outbound") && outbound.dash.is_empty());
	}

	#[test]
	fn pulse_skips_dimmed_nodes() {
		let vertices = VertexMap::new();
		let selection = SelectionState::default();
		let mut filter = FilterState::default();
		filter.set(BTreeSet::from(["gone".to_string()]));
		let ctx = RenderContext {
			vertices: &vertices,
			edges: &[],
			selection: &selection,
			filter: &filter,
			pulse_scale: 1.2,
		};
		assert_eq!(style_node(&Vertex::leaf("kept"), &ctx).scale, 1.2);
		assert_eq!(style_node(&Vertex::leaf("gone"), &ctx).scale, 1.0);
	}
}
