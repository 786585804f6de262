use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};

/// Default radius of every leaf circle.
pub const NODE_RADIUS: f64 = 16.0;
/// Default spacing between sibling leaves.
pub const NODE_PADDING: f64 = 6.0;
/// Default spacing between sibling groups.
pub const GROUP_PADDING: f64 = 24.0;
/// Default gap between the outer container and the radial ring.
pub const RADIAL_GAP: f64 = 80.0;
pub const CANVAS_WIDTH: f64 = 1200.0;
pub const CANVAS_HEIGHT: f64 = 900.0;

/// Vertices keyed by id. Ordered so every pass over the graph is deterministic.
pub type VertexMap = BTreeMap<String, Vertex>;

/// The kind of container a group vertex models.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GroupVariant {
	Boundary,
	Network,
	Cluster,
	Application,
	Other,
}

impl GroupVariant {
	/// Resolves a variant from a `group_type` value or an id prefix.
	pub fn from_token(token: &str) -> Option<Self> {
		match token.to_ascii_lowercase().as_str() {
			"boundary" | "account" | "region" => Some(Self::Boundary),
			"network" | "vpc" | "subnet" => Some(Self::Network),
			"cluster" => Some(Self::Cluster),
			"app" | "application" => Some(Self::Application),
			_ => None,
		}
	}
}

/// Explicit vertex tag, resolved once at ingestion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VertexKind {
	Leaf,
	Group(GroupVariant),
}

/// Optional per-vertex overrides of the kind-derived rendering defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VertexStyle {
	pub fill: Option<String>,
	pub stroke: Option<String>,
	#[serde(alias = "stroke-width", alias = "strokeWidth")]
	pub stroke_width: Option<f64>,
	#[serde(alias = "stroke-dasharray", alias = "dasharray")]
	pub dash: Option<Vec<f64>>,
	pub opacity: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
	pub id: String,
	pub parent_id: Option<String>,
	pub kind: VertexKind,
	pub children: Vec<String>,
	pub x: f64,
	pub y: f64,
	pub r: f64,
	pub label: Option<String>,
	pub style: VertexStyle,
	/// Opaque domain attributes, never read by layout.
	pub data: Map<String, Value>,
	/// Set on derived views only: the group is rendered as a leaf-like node.
	pub collapsed: bool,
	/// Set on derived views only: number of hidden descendants.
	pub descendant_count: usize,
}

impl Vertex {
	pub fn new(id: impl Into<String>, kind: VertexKind) -> Self {
		Self {
			id: id.into(),
			parent_id: None,
			kind,
			children: Vec::new(),
			x: 0.0,
			y: 0.0,
			r: 0.0,
			label: None,
			style: VertexStyle::default(),
			data: Map::new(),
			collapsed: false,
			descendant_count: 0,
		}
	}

	pub fn leaf(id: impl Into<String>) -> Self {
		Self::new(id, VertexKind::Leaf)
	}

	pub fn group(id: impl Into<String>, variant: GroupVariant) -> Self {
		Self::new(id, VertexKind::Group(variant))
	}

	pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
		self.parent_id = Some(parent_id.into());
		self
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn is_group(&self) -> bool {
		matches!(self.kind, VertexKind::Group(_))
	}

	pub fn variant(&self) -> Option<GroupVariant> {
		match self.kind {
			VertexKind::Group(variant) => Some(variant),
			VertexKind::Leaf => None,
		}
	}

	/// A group drawn as a boundary circle (expanded).
	pub fn is_boundary(&self) -> bool {
		self.is_group() && !self.collapsed
	}

	pub fn center(&self) -> super::geometry::Point {
		super::geometry::Point::new(self.x, self.y)
	}

	pub fn circle(&self) -> super::geometry::Circle {
		super::geometry::Circle::new(self.x, self.y, self.r)
	}

	/// Name used to correlate application groups across containers.
	pub fn group_name(&self) -> &str {
		self.label
			.as_deref()
			.or_else(|| self.data.get("name").and_then(Value::as_str))
			.unwrap_or(&self.id)
	}

	pub fn display_label(&self) -> Option<&str> {
		self.label
			.as_deref()
			.or_else(|| self.data.get("name").and_then(Value::as_str))
	}

	/// Reads the boolean-ish `public_ip` annotation.
	pub fn has_public_ip(&self) -> bool {
		match self.data.get("public_ip") {
			Some(Value::Bool(flag)) => *flag,
			Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
			Some(Value::String(s)) => {
				matches!(s.to_ascii_lowercase().as_str(), "true" | "yes" | "1" | "y")
			}
			_ => false,
		}
	}
}

/// A directed edge between two vertex ids.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
	pub source: String,
	pub target: String,
}

impl Edge {
	pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
		Self {
			source: source.into(),
			target: target.into(),
		}
	}

	#[cfg(test)]
	pub fn touches(&self, id: &str) -> bool {
		self.source == id || self.target == id
	}

	/// True when the edge joins `a` and `b` in either direction.
	pub fn connects(&self, a: &str, b: &str) -> bool {
		(self.source == a && self.target == b) || (self.source == b && self.target == a)
	}
}

/// Layout configuration. Missing fields fall back to the documented defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutOptions {
	pub canvas_width: f64,
	pub canvas_height: f64,
	pub node_radius: f64,
	pub node_padding: f64,
	pub group_padding: f64,
	pub radial_gap: f64,
}

impl Default for LayoutOptions {
	fn default() -> Self {
		Self {
			canvas_width: CANVAS_WIDTH,
			canvas_height: CANVAS_HEIGHT,
			node_radius: NODE_RADIUS,
			node_padding: NODE_PADDING,
			group_padding: GROUP_PADDING,
			radial_gap: RADIAL_GAP,
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn public_ip_flag_accepts_boolean_like_values() {
		let mut vertex = Vertex::leaf("vm-1");
		assert!(!vertex.has_public_ip());

		for value in [json!(true), json!("Yes"), json!("1"), json!(1)] {
			vertex.data.insert("public_ip".into(), value);
			assert!(vertex.has_public_ip());
		}
		for value in [json!(false), json!("no"), json!(0), json!(null)] {
			vertex.data.insert("public_ip".into(), value);
			assert!(!vertex.has_public_ip());
		}
	}

	#[test]
	fn group_name_prefers_label_then_data_name() {
		let mut app = Vertex::group("app-1", GroupVariant::Application);
		assert_eq!(app.group_name(), "app-1");
		app.data.insert("name".into(), json!("billing"));
		assert_eq!(app.group_name(), "billing");
		app.label = Some("Billing".into());
		assert_eq!(app.group_name(), "Billing");
	}

	#[test]
	fn partial_options_fall_back_to_defaults() {
		let options: LayoutOptions =
			serde_json::from_str(r#"{"nodeRadius": 10, "canvasWidth": 640}"#).unwrap();
		assert_eq!(options.node_radius, 10.0);
		assert_eq!(options.canvas_width, 640.0);
		assert_eq!(options.group_padding, GROUP_PADDING);
		assert_eq!(options.canvas_height, CANVAS_HEIGHT);
	}
}
