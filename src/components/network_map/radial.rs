//! Ring placement for parentless leaves around the packed container.

use std::f64::consts::{FRAC_PI_2, TAU};

use log::warn;

use super::geometry::{Bounds, Circle};
use super::hierarchy::Hierarchy;
use super::layout::Positions;
use super::types::LayoutOptions;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RadialOutcome {
	/// No radial elements.
	#[default]
	NotNeeded,
	Placed { count: usize, ring_radius: f64 },
	/// More than one top-level container; no anchor to ring around.
	SkippedAmbiguousAnchor { containers: usize },
}

/// Recenters the packed layout on the canvas and places the radial elements
/// evenly on a ring around the outer container, starting at the top.
pub fn place_radial(
	positions: &mut Positions,
	hierarchy: &Hierarchy,
	options: &LayoutOptions,
) -> RadialOutcome {
	let elements = &hierarchy.radial_elements;
	if elements.is_empty() {
		return RadialOutcome::NotNeeded;
	}

	let center_x = options.canvas_width / 2.0;
	let center_y = options.canvas_height / 2.0;

	if hierarchy.has_virtual_root() {
		let containers = hierarchy.root.as_ref().map_or(0, |root| root.children.len());
		warn!(
			"{containers} top-level containers; lining up {} radial elements above them",
			elements.len()
		);
		line_up(positions, elements, options);
		return RadialOutcome::SkippedAmbiguousAnchor { containers };
	}

	let ring_radius = match &hierarchy.root {
		Some(root) => {
			let Some(container) = positions.get(&root.id).copied() else {
				warn!("outer container {} has no position; skipping radial placement", root.id);
				line_up(positions, elements, options);
				return RadialOutcome::SkippedAmbiguousAnchor { containers: 0 };
			};
			let (dx, dy) = (center_x - container.x, center_y - container.y);
			for circle in positions.values_mut() {
				circle.x += dx;
				circle.y += dy;
			}
			container.r + options.radial_gap
		}
		None => options.radial_gap,
	};

	let count = elements.len();
	for (i, id) in elements.iter().enumerate() {
		let angle = -FRAC_PI_2 + TAU * i as f64 / count as f64;
		positions.insert(
			id.clone(),
			Circle::new(
				center_x + ring_radius * angle.cos(),
				center_y + ring_radius * angle.sin(),
				options.node_radius,
			),
		);
	}

	RadialOutcome::Placed { count, ring_radius }
}

/// Fallback without an anchor: a centered row `radial_gap` above the packed
/// content, so nothing lands on top of it.
fn line_up(positions: &mut Positions, elements: &[String], options: &LayoutOptions) {
	let bounds = Bounds::of_circles(positions.values());
	let (center_x, top) = match &bounds {
		Some(b) => (b.center().x, b.min_y),
		None => (options.canvas_width / 2.0, options.canvas_height / 2.0),
	};
	let y = top - options.radial_gap;
	let spacing = 3.0 * options.node_radius;
	let first = center_x - spacing * (elements.len() as f64 - 1.0) / 2.0;
	for (i, id) in elements.iter().enumerate() {
		positions.insert(
			id.clone(),
			Circle::new(first + spacing * i as f64, y, options.node_radius),
		);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_map::layout::layout_vertices;
	use crate::components::network_map::types::{GroupVariant, Vertex, VertexMap};

	fn map(vertices: Vec<Vertex>) -> VertexMap {
		vertices.into_iter().map(|v| (v.id.clone(), v)).collect()
	}

	#[test]
	fn radial_elements_ring_the_centered_container() {
		let mut vertices = map(vec![
			Vertex::group("vpc", GroupVariant::Network),
			Vertex::leaf("a").with_parent("vpc"),
			Vertex::leaf("b").with_parent("vpc"),
			Vertex::leaf("internet"),
			Vertex::leaf("partner"),
			Vertex::leaf("saas"),
			Vertex::leaf("vpn"),
		]);
		let options = LayoutOptions::default();
		let report = layout_vertices(&mut vertices, &options);

		let container = vertices["vpc"].circle();
		assert!((container.x - options.canvas_width / 2.0).abs() < 1e-9);
		assert!((container.y - options.canvas_height / 2.0).abs() < 1e-9);

		let expected_ring = container.r + options.radial_gap;
		assert_eq!(
			report.radial,
			RadialOutcome::Placed {
				count: 4,
				ring_radius: expected_ring
			}
		);
		for id in ["internet", "partner", "saas", "vpn"] {
			let d = vertices[id].center().distance(container.center());
			assert!((d - expected_ring).abs() < 1e-9, "{id} at {d}");
			assert_eq!(vertices[id].r, options.node_radius);
		}
		// First element sits straight above the container.
		assert!((vertices["internet"].x - container.x).abs() < 1e-9);
		assert!(vertices["internet"].y < container.y);
	}

	#[test]
	fn packed_members_move_with_the_container() {
		let mut vertices = map(vec![
			Vertex::group("vpc", GroupVariant::Network),
			Vertex::leaf("a").with_parent("vpc"),
			Vertex::leaf("internet"),
		]);
		layout_vertices(&mut vertices, &LayoutOptions::default());
		assert!(vertices["vpc"].circle().contains_circle(&vertices["a"].circle(), 1e-6));
	}

	#[test]
	fn ambiguous_anchor_skips_radial_placement() {
		let mut vertices = map(vec![
			Vertex::group("east", GroupVariant::Boundary),
			Vertex::group("west", GroupVariant::Boundary),
			Vertex::leaf("a").with_parent("east"),
			Vertex::leaf("b").with_parent("west"),
			Vertex::leaf("internet"),
		]);
		let options = LayoutOptions::default();
		let report = layout_vertices(&mut vertices, &options);
		assert_eq!(
			report.radial,
			RadialOutcome::SkippedAmbiguousAnchor { containers: 2 }
		);
		assert_eq!(vertices["internet"].r, options.node_radius);
		// The packed layout still renders.
		assert!(vertices["east"].r > options.node_radius);
		// The element sits above the packed content instead of on top of it.
		let internet = vertices["internet"].circle();
		for id in ["east", "west", "a", "b"] {
			let c = vertices[id].circle();
			assert!(internet.y + internet.r < c.y - c.r, "internet overlaps {id}");
		}
	}

	#[test]
	fn lined_up_elements_do_not_overlap_each_other() {
		let mut vertices = map(vec![
			Vertex::group("east", GroupVariant::Boundary),
			Vertex::group("west", GroupVariant::Boundary),
			Vertex::leaf("a").with_parent("east"),
			Vertex::leaf("b").with_parent("west"),
			Vertex::leaf("internet"),
			Vertex::leaf("partner"),
			Vertex::leaf("saas"),
		]);
		let options = LayoutOptions::default();
		layout_vertices(&mut vertices, &options);
		let row: Vec<_> = ["internet", "partner", "saas"]
			.iter()
			.map(|id| vertices[*id].circle())
			.collect();
		for pair in row.windows(2) {
			assert!(pair[0].center().distance(pair[1].center()) >= 2.0 * options.node_radius);
			assert_eq!(pair[0].y, pair[1].y);
		}
	}

	#[test]
	fn without_packed_content_the_ring_centers_on_the_canvas() {
		let mut vertices = map(vec![Vertex::leaf("x"), Vertex::leaf("y")]);
		let options = LayoutOptions::default();
		layout_vertices(&mut vertices, &options);
		let center = (options.canvas_width / 2.0, options.canvas_height / 2.0);
		for id in ["x", "y"] {
			let d = (vertices[id].x - center.0).hypot(vertices[id].y - center.1);
			assert!((d - options.radial_gap).abs() < 1e-9);
		}
	}
}
