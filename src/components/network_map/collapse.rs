//! Collapse/expand as a pure view transform over the positioned graph.

use std::collections::{BTreeSet, VecDeque};

use log::warn;

use super::types::{Edge, VertexMap};

/// The vertices and edges visible for a given collapsed-group set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CollapsedView {
	pub vertices: VertexMap,
	pub edges: Vec<Edge>,
}

/// Every transitive descendant of `group_id`, found breadth-first with a
/// visited set.
pub fn descendants(vertices: &VertexMap, group_id: &str) -> BTreeSet<String> {
	let mut found = BTreeSet::new();
	let mut queue: VecDeque<&str> = VecDeque::from([group_id]);
	let mut visited: BTreeSet<&str> = BTreeSet::from([group_id]);

	while let Some(id) = queue.pop_front() {
		let Some(vertex) = vertices.get(id) else {
			continue;
		};
		for child in &vertex.children {
			if visited.insert(child.as_str()) {
				found.insert(child.clone());
				queue.push_back(child.as_str());
			}
		}
	}
	found
}

/// Nearest visible vertex on the parent chain of `id`, or `id` itself when
/// the chain is broken or cyclic.
fn visible_ancestor<'a>(
	vertices: &'a VertexMap,
	hidden: &BTreeSet<String>,
	id: &'a str,
) -> &'a str {
	let mut visited: BTreeSet<&str> = BTreeSet::from([id]);
	let mut cursor = id;
	while hidden.contains(cursor) {
		let Some(parent) = vertices.get(cursor).and_then(|v| v.parent_id.as_deref()) else {
			warn!("no visible ancestor for {id}; keeping the endpoint as-is");
			return id;
		};
		if !visited.insert(parent) {
			warn!("parent cycle above {id}; keeping the endpoint as-is");
			return id;
		}
		cursor = parent;
	}
	cursor
}

/// Derives the visible graph for `collapsed`.
///
/// Descendants of collapsed groups are hidden. Each visible collapsed group is
/// re-tagged leaf-like (`collapsed`, `node_radius`, descendant count) and keeps
/// its children list. Hidden edge endpoints move to their nearest visible
/// ancestor; edges that end up as self-loops are dropped and duplicates
/// merged. The source map is never touched, so an empty set reproduces it.
pub fn collapse_view(
	vertices: &VertexMap,
	edges: &[Edge],
	collapsed: &BTreeSet<String>,
	node_radius: f64,
) -> CollapsedView {
	let mut hidden = BTreeSet::new();
	for group_id in collapsed {
		match vertices.get(group_id) {
			Some(vertex) if vertex.is_group() => hidden.extend(descendants(vertices, group_id)),
			Some(_) => warn!("cannot collapse non-group vertex {group_id}"),
			None => warn!("cannot collapse unknown vertex {group_id}"),
		}
	}

	let visible = vertices
		.iter()
		.filter(|(id, _)| !hidden.contains(*id))
		.map(|(id, vertex)| {
			let mut vertex = vertex.clone();
			if vertex.is_group() && collapsed.contains(id) {
				vertex.collapsed = true;
				vertex.r = node_radius;
				vertex.descendant_count = descendants(vertices, id).len();
			}
			(id.clone(), vertex)
		})
		.collect();

	let mut seen = BTreeSet::new();
	let mut visible_edges = Vec::with_capacity(edges.len());
	for edge in edges {
		let source = visible_ancestor(vertices, &hidden, &edge.source);
		let target = visible_ancestor(vertices, &hidden, &edge.target);
		if source == target {
			continue;
		}
		let rewritten = Edge::new(source, target);
		if seen.insert(rewritten.clone()) {
			visible_edges.push(rewritten);
		}
	}

	CollapsedView {
		vertices: visible,
		edges: visible_edges,
	}
}
