use std::collections::BTreeSet;

use super::types::{Edge, GroupVariant, Vertex, VertexMap};

/// Highlight state of a vertex. Later variants win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum NodeHighlight {
	Normal,
	Connected,
	Head,
	Path,
}

/// Highlight state of an edge. `Inbound` edges are drawn dashed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeHighlight {
	Normal,
	Outbound,
	Inbound,
	Path,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SelectionState {
	pub head: Option<String>,
	pub trace_nodes: BTreeSet<String>,
	pub trace_edges: BTreeSet<Edge>,
	pub selected_applications: BTreeSet<String>,
}

impl SelectionState {
	/// Selects `id`. With `append`, a direct edge between the previous head
	/// and `id` extends the trace; the head moves either way.
	pub fn select_vertex(&mut self, id: &str, append: bool, edges: &[Edge]) {
		if !append {
			self.clear_trace();
		} else if let Some(head) = self.head.as_deref() {
			let hop = edges.iter().find(|edge| edge.connects(head, id)).cloned();
			if let Some(edge) = hop {
				self.trace_nodes.insert(head.to_owned());
				self.trace_nodes.insert(id.to_owned());
				self.trace_edges.insert(edge);
			}
		}
		self.head = Some(id.to_owned());
	}

	/// Background click. Shift keeps everything.
	pub fn click_background(&mut self, append: bool) {
		if append {
			return;
		}
		self.clear_trace();
		self.selected_applications.clear();
	}

	pub fn select_group_by_name(&mut self, name: &str, append: bool) {
		if !append {
			self.selected_applications.clear();
		}
		self.selected_applications.insert(name.to_owned());
	}

	pub fn clear_trace(&mut self) {
		self.head = None;
		self.trace_nodes.clear();
		self.trace_edges.clear();
	}

	/// Drops head and trace entries the current graph no longer contains.
	pub fn retain_known(&mut self, vertices: &VertexMap, edges: &[Edge]) {
		if self.head.as_deref().is_some_and(|head| !vertices.contains_key(head)) {
			self.head = None;
		}
		self.trace_nodes.retain(|id| vertices.contains_key(id));
		self.trace_edges.retain(|edge| edges.contains(edge));
	}

	pub fn is_empty(&self) -> bool {
		self.head.is_none() && self.trace_nodes.is_empty() && self.selected_applications.is_empty()
	}

	pub fn node_state(&self, id: &str, edges: &[Edge]) -> NodeHighlight {
		if self.trace_nodes.contains(id) {
			return NodeHighlight::Path;
		}
		let Some(head) = self.head.as_deref() else {
			return NodeHighlight::Normal;
		};
		if head == id {
			NodeHighlight::Head
		} else if edges.iter().any(|edge| edge.connects(head, id)) {
			NodeHighlight::Connected
		} else {
			NodeHighlight::Normal
		}
	}

	pub fn edge_state(&self, edge: &Edge) -> EdgeHighlight {
		if self.trace_edges.contains(edge) {
			return EdgeHighlight::Path;
		}
		match self.head.as_deref() {
			Some(head) if edge.source == head => EdgeHighlight::Outbound,
			Some(head) if edge.target == head => EdgeHighlight::Inbound,
			_ => EdgeHighlight::Normal,
		}
	}

	/// Whether `vertex` is an application group whose name is selected.
	pub fn group_selected(&self, vertex: &Vertex) -> bool {
		vertex.variant() == Some(GroupVariant::Application)
			&& self.selected_applications.contains(vertex.group_name())
	}
}
