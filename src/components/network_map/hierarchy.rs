//! Flat vertex map to packable tree.

use std::collections::{BTreeMap, BTreeSet};

use log::warn;

use super::types::VertexMap;

/// Id of the synthetic root inserted above multiple top-level groups.
pub const VIRTUAL_ROOT_ID: &str = "__virtual_root__";

#[derive(Clone, Debug, PartialEq)]
pub struct HierarchyNode {
	pub id: String,
	pub is_group: bool,
	/// Leaf = 1, group = sum of children.
	pub value: usize,
	pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
	pub fn is_virtual(&self) -> bool {
		self.id == VIRTUAL_ROOT_ID
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Hierarchy {
	/// `None` when nothing is packable.
	pub root: Option<HierarchyNode>,
	/// Parentless leaves, placed on a ring instead of packed.
	pub radial_elements: Vec<String>,
	/// Vertices whose parent reference had to be discarded.
	pub orphans: Vec<String>,
}

impl Hierarchy {
	/// True when the packed root was synthesized over several containers.
	pub fn has_virtual_root(&self) -> bool {
		self.root.as_ref().is_some_and(HierarchyNode::is_virtual)
	}
}

/// Builds the packing tree from parent references.
///
/// Missing, self-referencing or leaf parents are logged and the child is
/// promoted to a root. Vertices caught in a parent cycle are promoted too, so
/// the traversal always terminates.
pub fn build_hierarchy(vertices: &VertexMap) -> Hierarchy {
	let mut children_of: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
	let mut roots: Vec<&str> = Vec::new();
	let mut orphans = Vec::new();

	for (id, vertex) in vertices {
		let Some(parent_id) = vertex.parent_id.as_deref() else {
			roots.push(id);
			continue;
		};
		match vertices.get(parent_id) {
			Some(parent) if parent.is_group() && parent_id != id.as_str() => {
				children_of.entry(parent_id).or_default().push(id);
			}
			Some(_) => {
				warn!("vertex {id} has non-group parent {parent_id}; treating it as a root");
				orphans.push(id.clone());
				roots.push(id);
			}
			None => {
				warn!("vertex {id} references missing parent {parent_id}; treating it as a root");
				orphans.push(id.clone());
				roots.push(id);
			}
		}
	}

	let mut visited: BTreeSet<&str> = BTreeSet::new();
	let mut packable = Vec::new();
	let mut radial_elements = Vec::new();

	for root in roots {
		if vertices[root].is_group() {
			packable.push(build_node(root, vertices, &children_of, &mut visited));
		} else {
			visited.insert(root);
			radial_elements.push(root.to_owned());
		}
	}

	// Anything still unvisited hangs off a parent cycle. Promote groups first
	// so their members stay nested.
	let mut unreached: Vec<&String> = vertices
		.keys()
		.filter(|id| !visited.contains(id.as_str()))
		.collect();
	unreached.sort_by_key(|id| !vertices[id.as_str()].is_group());
	for id in unreached {
		if visited.contains(id.as_str()) {
			continue;
		}
		warn!("vertex {id} is part of a parent cycle; treating it as a root");
		orphans.push(id.clone());
		if vertices[id.as_str()].is_group() {
			packable.push(build_node(id, vertices, &children_of, &mut visited));
		} else {
			visited.insert(id);
			radial_elements.push(id.clone());
		}
	}

	let root = match packable.len() {
		0 => None,
		1 => packable.pop(),
		_ => {
			sort_siblings(&mut packable);
			Some(HierarchyNode {
				id: VIRTUAL_ROOT_ID.to_owned(),
				is_group: true,
				value: packable.iter().map(|node| node.value).sum(),
				children: packable,
			})
		}
	};

	Hierarchy {
		root,
		radial_elements,
		orphans,
	}
}

fn build_node<'a>(
	id: &'a str,
	vertices: &'a VertexMap,
	children_of: &BTreeMap<&'a str, Vec<&'a str>>,
	visited: &mut BTreeSet<&'a str>,
) -> HierarchyNode {
	visited.insert(id);
	let mut children = Vec::new();
	if let Some(child_ids) = children_of.get(id) {
		for &child_id in child_ids {
			if visited.contains(child_id) {
				continue;
			}
			children.push(build_node(child_id, vertices, children_of, visited));
		}
	}
	sort_siblings(&mut children);

	let is_group = vertices.get(id).is_some_and(|v| v.is_group());
	let value = if is_group {
		children.iter().map(|child| child.value).sum()
	} else {
		1
	};

	HierarchyNode {
		id: id.to_owned(),
		is_group,
		value,
		children,
	}
}

fn sort_siblings(nodes: &mut [HierarchyNode]) {
	nodes.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.id.cmp(&b.id)));
}
