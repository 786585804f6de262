//! Circle-pack layout: fixed-radius leaves, padded groups.

use std::collections::BTreeMap;

use log::{debug, warn};

use super::geometry::Circle;
use super::hierarchy::{Hierarchy, HierarchyNode, build_hierarchy};
use super::pack::pack_siblings;
use super::radial::{RadialOutcome, place_radial};
use super::types::{LayoutOptions, VertexMap};

/// Positions keyed by vertex id.
pub type Positions = BTreeMap<String, Circle>;

/// What a layout pass did, for hosts that surface warnings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayoutReport {
	pub packed: usize,
	pub radial: RadialOutcome,
	pub orphans: Vec<String>,
}

struct Packed<'a> {
	node: &'a HierarchyNode,
	/// Relative to the parent center until translated.
	x: f64,
	y: f64,
	r: f64,
	children: Vec<Packed<'a>>,
}

/// Spacing between the children of `node`: group spacing as soon as one
/// child is itself a group.
fn sibling_padding(node: &HierarchyNode, options: &LayoutOptions) -> f64 {
	if node.children.iter().any(|child| child.is_group) {
		options.group_padding
	} else {
		options.node_padding
	}
}

fn pack_node<'a>(node: &'a HierarchyNode, options: &LayoutOptions) -> Packed<'a> {
	if node.children.is_empty() {
		return Packed {
			node,
			x: 0.0,
			y: 0.0,
			r: options.node_radius,
			children: Vec::new(),
		};
	}

	let mut children: Vec<Packed<'a>> = node
		.children
		.iter()
		.map(|child| pack_node(child, options))
		.collect();

	let half_padding = sibling_padding(node, options) / 2.0;
	let mut circles: Vec<Circle> = children
		.iter()
		.map(|child| Circle::new(0.0, 0.0, child.r + half_padding))
		.collect();
	let enclosing = pack_siblings(&mut circles);
	for (child, circle) in children.iter_mut().zip(&circles) {
		child.x = circle.x;
		child.y = circle.y;
	}

	Packed {
		node,
		x: 0.0,
		y: 0.0,
		r: enclosing + half_padding,
		children,
	}
}

fn translate(packed: &Packed<'_>, origin_x: f64, origin_y: f64, out: &mut Positions) {
	let (x, y) = (origin_x + packed.x, origin_y + packed.y);
	if !packed.node.is_virtual() {
		out.insert(packed.node.id.clone(), Circle::new(x, y, packed.r));
	}
	for child in &packed.children {
		translate(child, x, y, out);
	}
}

/// Packs `root` and returns absolute positions.
///
/// The pack is anchored so its bounding square starts at the origin, then a
/// half-icon margin (`node_radius`) is added to every coordinate.
pub fn pack_hierarchy(root: &HierarchyNode, options: &LayoutOptions) -> Positions {
	let packed = pack_node(root, options);
	let margin = options.node_radius;
	let mut positions = Positions::new();
	translate(&packed, packed.r + margin, packed.r + margin, &mut positions);
	positions
}

/// Runs the full layout: hierarchy, pack, radial ring.
pub fn compute_layout(vertices: &VertexMap, options: &LayoutOptions) -> (Positions, LayoutReport) {
	let hierarchy = build_hierarchy(vertices);
	let mut positions = match &hierarchy.root {
		Some(root) => pack_hierarchy(root, options),
		None => Positions::new(),
	};
	let packed = positions.len();
	let radial = place_radial(&mut positions, &hierarchy, options);
	debug!("layout packed {packed} vertices, radial outcome {radial:?}");

	let Hierarchy { orphans, .. } = hierarchy;
	(
		positions,
		LayoutReport {
			packed,
			radial,
			orphans,
		},
	)
}

/// Writes layout output back onto the vertices.
pub fn apply_positions(vertices: &mut VertexMap, positions: &Positions, options: &LayoutOptions) {
	for (id, vertex) in vertices.iter_mut() {
		match positions.get(id) {
			Some(circle) => {
				vertex.x = circle.x;
				vertex.y = circle.y;
				vertex.r = circle.r;
			}
			None => {
				warn!("vertex {id} received no layout position");
				vertex.r = options.node_radius;
			}
		}
	}
}

/// Lays out `vertices` in place.
pub fn layout_vertices(vertices: &mut VertexMap, options: &LayoutOptions) -> LayoutReport {
	let (positions, report) = compute_layout(vertices, options);
	apply_positions(vertices, &positions, options);
	report
}

#[cfg(test)]
mod tests {
	use proptest::prelude::*;

	use super::*;
	use crate::components::network_map::types::{GroupVariant, Vertex};

	fn map(vertices: Vec<Vertex>) -> VertexMap {
		vertices.into_iter().map(|v| (v.id.clone(), v)).collect()
	}

	/// boundary -> clusters -> apps -> leaves, shaped by `shape[c][a]` leaf counts.
	fn nested(shape: &[Vec<usize>]) -> VertexMap {
		let mut vertices = vec![Vertex::group("boundary", GroupVariant::Boundary)];
		for (c, apps) in shape.iter().enumerate() {
			let cluster = format!("cluster-{c}");
			vertices.push(Vertex::group(&cluster, GroupVariant::Cluster).with_parent("boundary"));
			for (a, &leaves) in apps.iter().enumerate() {
				let app = format!("app-{c}-{a}");
				vertices.push(Vertex::group(&app, GroupVariant::Application).with_parent(&cluster));
				for l in 0..leaves {
					vertices.push(Vertex::leaf(format!("leaf-{c}-{a}-{l}")).with_parent(&app));
				}
			}
		}
		map(vertices)
	}

	fn ancestors<'a>(vertices: &'a VertexMap, id: &str) -> Vec<&'a str> {
		let mut out = Vec::new();
		let mut cursor = vertices[id].parent_id.as_deref();
		while let Some(parent) = cursor {
			out.push(parent);
			cursor = vertices[parent].parent_id.as_deref();
		}
		out
	}

	fn assert_contained(vertices: &VertexMap) {
		for vertex in vertices.values() {
			for ancestor in ancestors(vertices, &vertex.id) {
				let group = vertices[ancestor].circle();
				assert!(
					group.contains_circle(&vertex.circle(), 1e-6),
					"{} escapes {}",
					vertex.id,
					ancestor
				);
			}
		}
	}

	/// Siblings keep at least their parent's padding between them.
	fn assert_separated(vertices: &VertexMap, options: &LayoutOptions) {
		for parent in vertices.values().filter(|v| v.is_group()) {
			let siblings: Vec<&Vertex> = vertices
				.values()
				.filter(|v| v.parent_id.as_deref() == Some(parent.id.as_str()))
				.collect();
			let padding = if siblings.iter().any(|v| v.is_group()) {
				options.group_padding
			} else {
				options.node_padding
			};
			for (i, a) in siblings.iter().enumerate() {
				for b in &siblings[i + 1..] {
					let gap = a.center().distance(b.center()) - a.r - b.r;
					assert!(
						gap >= padding - 1e-3,
						"{} and {} in {} are {gap} apart",
						a.id,
						b.id,
						parent.id
					);
				}
			}
		}
	}

	#[test]
	fn leaves_share_the_configured_radius() {
		let mut vertices = nested(&[vec![1, 7], vec![3], vec![12, 2, 1]]);
		let options = LayoutOptions::default();
		layout_vertices(&mut vertices, &options);
		for vertex in vertices.values().filter(|v| !v.is_group()) {
			assert_eq!(vertex.r, options.node_radius, "{}", vertex.id);
		}
	}

	#[test]
	fn groups_contain_all_descendants() {
		let mut vertices = nested(&[vec![4, 1], vec![9, 9, 2], vec![1]]);
		layout_vertices(&mut vertices, &LayoutOptions::default());
		assert_contained(&vertices);
	}

	#[test]
	fn padding_depends_on_the_kind_of_siblings() {
		let options = LayoutOptions {
			node_padding: 4.0,
			group_padding: 40.0,
			..LayoutOptions::default()
		};
		let mut vertices = nested(&[vec![2], vec![2]]);
		layout_vertices(&mut vertices, &options);

		let leaf_gap = vertices["leaf-0-0-0"]
			.center()
			.distance(vertices["leaf-0-0-1"].center())
			- 2.0 * options.node_radius;
		assert!((leaf_gap - options.node_padding).abs() < 1e-6, "leaf gap {leaf_gap}");

		let c0 = vertices["cluster-0"].circle();
		let c1 = vertices["cluster-1"].circle();
		let group_gap = c0.center().distance(c1.center()) - c0.r - c1.r;
		assert!((group_gap - options.group_padding).abs() < 1e-6, "group gap {group_gap}");
	}

	#[test]
	fn sibling_groups_never_overlap() {
		let options = LayoutOptions::default();
		let mut vertices = nested(&[vec![6, 1, 3], vec![2], vec![9, 4], vec![1, 1, 1, 1]]);
		layout_vertices(&mut vertices, &options);
		assert_separated(&vertices, &options);
	}

	#[test]
	fn layout_lies_on_a_non_negative_canvas() {
		let mut vertices = nested(&[vec![3, 3], vec![5]]);
		let options = LayoutOptions::default();
		layout_vertices(&mut vertices, &options);
		let root = &vertices["boundary"];
		assert!((root.x - (root.r + options.node_radius)).abs() < 1e-9);
		for vertex in vertices.values() {
			assert!(vertex.x - vertex.r >= 0.0 && vertex.y - vertex.r >= 0.0);
		}
	}

	#[test]
	fn empty_group_is_sized_like_a_leaf() {
		let mut vertices = map(vec![
			Vertex::group("net", GroupVariant::Network),
			Vertex::group("empty", GroupVariant::Application).with_parent("net"),
		]);
		let options = LayoutOptions::default();
		layout_vertices(&mut vertices, &options);
		assert_eq!(vertices["empty"].r, options.node_radius);
	}

	proptest! {
		#[test]
		fn containment_holds_for_arbitrary_shapes(
			shape in prop::collection::vec(prop::collection::vec(0usize..8, 1..4), 1..5)
		) {
			let mut vertices = nested(&shape);
			layout_vertices(&mut vertices, &LayoutOptions::default());
			assert_contained(&vertices);
		}

		#[test]
		fn padding_holds_for_arbitrary_shapes(
			shape in prop::collection::vec(prop::collection::vec(0usize..8, 1..4), 1..5)
		) {
			let options = LayoutOptions::default();
			let mut vertices = nested(&shape);
			layout_vertices(&mut vertices, &options);
			assert_separated(&vertices, &options);
		}
	}
}
