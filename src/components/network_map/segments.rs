//! Occlusion-aware edge segmentation.
//!
//! An edge is split wherever it crosses a group boundary. Stretches that run
//! through a group unrelated to either endpoint are drawn faint, the rest
//! solid, so an edge fades through foreign clusters instead of being clipped.

use std::collections::BTreeSet;

use super::geometry::{Circle, Point, line_circle_intersections, point_in_circle, shorten};
use super::types::{Edge, Vertex, VertexMap};

/// Split points closer than this (in edge parameter space) are merged.
pub const SPLIT_EPSILON: f64 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentKind {
	Related,
	Unrelated,
}

/// A stretch of an edge between parameters `start` and `end` in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSegment {
	pub start: f64,
	pub end: f64,
	pub kind: SegmentKind,
}

/// Gradient stop; `offset` is a percentage of the edge length.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientStop {
	pub offset: f64,
	pub kind: SegmentKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeGeometry {
	pub edge: Edge,
	/// Line start, on the source's circle boundary.
	pub start: Point,
	/// Line end, on the target's circle boundary.
	pub end: Point,
	pub segments: Vec<EdgeSegment>,
	pub stops: Vec<GradientStop>,
}

#[cfg(test)]
impl EdgeGeometry {
	pub fn unrelated_segments(&self) -> usize {
		self.segments
			.iter()
			.filter(|s| s.kind == SegmentKind::Unrelated)
			.count()
	}
}

/// Every ancestor group of `id`, walked with a visited set.
pub fn ancestor_groups(vertices: &VertexMap, id: &str) -> BTreeSet<String> {
	let mut out = BTreeSet::new();
	let mut cursor = vertices.get(id).and_then(|v| v.parent_id.as_deref());
	while let Some(parent) = cursor {
		if !out.insert(parent.to_owned()) {
			break;
		}
		cursor = vertices.get(parent).and_then(|v| v.parent_id.as_deref());
	}
	out
}

/// Groups an edge belongs to: the ancestors of both endpoints.
pub fn home_groups(vertices: &VertexMap, edge: &Edge) -> BTreeSet<String> {
	let mut home = ancestor_groups(vertices, &edge.source);
	home.extend(ancestor_groups(vertices, &edge.target));
	home
}

/// Group circles currently drawn as boundaries.
pub fn boundary_circles(vertices: &VertexMap) -> Vec<(&str, Circle)> {
	vertices
		.values()
		.filter(|v| v.is_boundary())
		.map(|v| (v.id.as_str(), v.circle()))
		.collect()
}

/// Splits `[0, 1]` at `splits` and classifies each piece by its midpoint.
/// Neighbouring pieces of the same kind are merged.
pub fn classify(
	start: Point,
	end: Point,
	mut splits: Vec<f64>,
	foreign: &[Circle],
) -> Vec<EdgeSegment> {
	splits.push(0.0);
	splits.push(1.0);
	splits.retain(|t| t.is_finite());
	splits.sort_by(f64::total_cmp);
	splits.dedup_by(|a, b| (*a - *b).abs() < SPLIT_EPSILON);

	let mut segments: Vec<EdgeSegment> = Vec::new();
	for pair in splits.windows(2) {
		let [t0, t1] = [pair[0], pair[1]];
		let mid = start.lerp(end, (t0 + t1) / 2.0);
		let kind = if foreign.iter().any(|c| point_in_circle(mid, c, 0.0)) {
			SegmentKind::Unrelated
		} else {
			SegmentKind::Related
		};
		match segments.last_mut() {
			Some(last) if last.kind == kind => last.end = t1,
			_ => segments.push(EdgeSegment {
				start: t0,
				end: t1,
				kind,
			}),
		}
	}

	if segments.is_empty() {
		segments.push(EdgeSegment {
			start: 0.0,
			end: 1.0,
			kind: SegmentKind::Related,
		});
	}
	segments
}

/// Two stops per segment, as percentages, for a hard-edged two-tone gradient.
pub fn gradient_stops(segments: &[EdgeSegment]) -> Vec<GradientStop> {
	segments
		.iter()
		.flat_map(|s| {
			[
				GradientStop {
					offset: s.start * 100.0,
					kind: s.kind,
				},
				GradientStop {
					offset: s.end * 100.0,
					kind: s.kind,
				},
			]
		})
		.collect()
}

fn unsplit(edge: &Edge, start: Point, end: Point) -> EdgeGeometry {
	let segments = vec![EdgeSegment {
		start: 0.0,
		end: 1.0,
		kind: SegmentKind::Related,
	}];
	EdgeGeometry {
		edge: edge.clone(),
		start,
		end,
		stops: gradient_stops(&segments),
		segments,
	}
}

/// Geometry for one edge; `None` when an endpoint is not in `vertices`.
pub fn segment_edge(
	vertices: &VertexMap,
	boundaries: &[(&str, Circle)],
	edge: &Edge,
) -> Option<EdgeGeometry> {
	let source: &Vertex = vertices.get(&edge.source)?;
	let target: &Vertex = vertices.get(&edge.target)?;

	let Some((start, end)) = shorten(source.center(), target.center(), source.r, target.r) else {
		return Some(unsplit(edge, source.center(), target.center()));
	};

	let home = home_groups(vertices, edge);
	let mut splits = Vec::new();
	let mut foreign = Vec::new();
	for (id, circle) in boundaries {
		if *id == edge.source || *id == edge.target {
			continue;
		}
		splits.extend(line_circle_intersections(start, end, circle));
		if !home.contains(*id) {
			foreign.push(*circle);
		}
	}

	let segments = classify(start, end, splits, &foreign);
	Some(EdgeGeometry {
		edge: edge.clone(),
		start,
		end,
		stops: gradient_stops(&segments),
		segments,
	})
}

/// Geometry for every edge whose endpoints are present.
pub fn segment_edges(vertices: &VertexMap, edges: &[Edge]) -> Vec<EdgeGeometry> {
	let boundaries = boundary_circles(vertices);
	edges
		.iter()
		.filter_map(|edge| {
			let geometry = segment_edge(vertices, &boundaries, edge);
			if geometry.is_none() {
				log::warn!("edge {} -> {} has a missing endpoint", edge.source, edge.target);
			}
			geometry
		})
		.collect()
}
