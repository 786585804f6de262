//! Graph input parsing.

use std::collections::BTreeMap;

use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::{Error, Result};
use super::types::{Edge, GroupVariant, Vertex, VertexMap, VertexStyle};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphInput {
	#[serde(default)]
	pub vertices: BTreeMap<String, VertexInput>,
	#[serde(default)]
	pub edges: Vec<EdgeInput>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct VertexInput {
	#[serde(default, rename = "parentId", alias = "parent_id")]
	pub parent_id: Option<String>,
	#[serde(default, rename = "type")]
	pub kind: Option<String>,
	#[serde(default)]
	pub group_type: Option<String>,
	#[serde(default)]
	pub label: Option<String>,
	#[serde(default)]
	pub style: VertexStyle,
	/// Everything else is kept as opaque domain data.
	#[serde(flatten)]
	pub data: Map<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EdgeInput {
	#[serde(alias = "source")]
	pub start_node: String,
	#[serde(alias = "target")]
	pub end_node: String,
}

/// Validated graph: parent links resolved into children, dangling edges gone.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphModel {
	pub vertices: VertexMap,
	pub edges: Vec<Edge>,
}

impl GraphModel {
	pub fn from_json(json: &str) -> Result<Self> {
		let input: GraphInput = serde_json::from_str(json)?;
		input.into_model()
	}

	/// Links children to their parents and drops edges naming unknown vertices.
	pub fn new(
		vertices: impl IntoIterator<Item = Vertex>,
		edges: impl IntoIterator<Item = Edge>,
	) -> Self {
		let mut vertices: VertexMap = vertices.into_iter().map(|v| (v.id.clone(), v)).collect();

		let links: Vec<(String, String)> = vertices
			.values()
			.filter_map(|v| Some((v.parent_id.clone()?, v.id.clone())))
			.filter(|(parent, child)| parent != child)
			.collect();
		for vertex in vertices.values_mut() {
			vertex.children.clear();
		}
		for (parent, child) in links {
			match vertices.get_mut(&parent) {
				Some(group) if group.is_group() => group.children.push(child),
				// The hierarchy builder reports these.
				_ => {}
			}
		}

		let edges = edges
			.into_iter()
			.filter(|edge| {
				let known =
					vertices.contains_key(&edge.source) && vertices.contains_key(&edge.target);
				if !known {
					warn!(
						"dropping edge {} -> {}: unknown endpoint",
						edge.source, edge.target
					);
				}
				known
			})
			.collect();

		Self { vertices, edges }
	}
}

/// Group variant from an explicit `group_type`, else the id prefix.
fn resolve_variant(id: &str, group_type: Option<&str>) -> GroupVariant {
	group_type
		.and_then(GroupVariant::from_token)
		.or_else(|| id.split('-').next().and_then(GroupVariant::from_token))
		.unwrap_or(GroupVariant::Other)
}

impl GraphInput {
	pub fn into_model(self) -> Result<GraphModel> {
		let mut vertices = Vec::with_capacity(self.vertices.len());
		for (id, input) in self.vertices {
			if id.trim().is_empty() {
				return Err(Error::EmptyVertexId);
			}
			let is_group = input
				.kind
				.as_deref()
				.is_some_and(|kind| kind.eq_ignore_ascii_case("group"));
			let mut vertex = if is_group {
				let variant = resolve_variant(&id, input.group_type.as_deref());
				Vertex::group(id, variant)
			} else {
				Vertex::leaf(id)
			};
			if let Some(parent) = input.parent_id.filter(|p| !p.is_empty()) {
				vertex = vertex.with_parent(parent);
			}
			if let Some(label) = input.label {
				vertex = vertex.with_label(label);
			}

			vertex.data = input.data;
			if let Some(kind) = input.kind {
				vertex.data.insert("type".into(), Value::String(kind));
			}
			if let Some(group_type) = input.group_type {
				vertex.data.insert("group_type".into(), Value::String(group_type));
			}
			vertex.style = input.style;
			vertices.push(vertex);
		}

		let mut edges = Vec::with_capacity(self.edges.len());
		for edge in self.edges {
			if edge.start_node.is_empty() || edge.end_node.is_empty() {
				return Err(Error::EmptyEdgeEndpoint {
					source_id: edge.start_node,
					target_id: edge.end_node,
				});
			}
			edges.push(Edge::new(edge.start_node, edge.end_node));
		}

		let model = GraphModel::new(vertices, edges);
		debug!(
			"ingested {} vertices and {} edges",
			model.vertices.len(),
			model.edges.len()
		);
		Ok(model)
	}
}
