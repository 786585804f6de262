use super::geometry::Circle;
use super::segments::EdgeGeometry;
use super::style::{EdgeStyle, RenderContext, ShapeStyle, StyleContributor};

#[derive(Clone, Debug, PartialEq)]
pub struct StyledCircle {
	pub id: String,
	pub circle: Circle,
	pub style: ShapeStyle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StyledEdge {
	pub geometry: EdgeGeometry,
	pub style: EdgeStyle,
}

/// A fully styled frame in draw order: groups (outermost first), edges, nodes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
	pub groups: Vec<StyledCircle>,
	pub edges: Vec<StyledEdge>,
	pub nodes: Vec<StyledCircle>,
}

#[cfg(test)]
impl Scene {
	pub fn node(&self, id: &str) -> Option<&StyledCircle> {
		self.nodes.iter().find(|n| n.id == id)
	}

	pub fn group(&self, id: &str) -> Option<&StyledCircle> {
		self.groups.iter().find(|g| g.id == id)
	}
}

/// Runs every contributor over the visible vertices in `ctx` and `geometry`.
pub fn build_scene(
	geometry: &[EdgeGeometry],
	contributors: &[Box<dyn StyleContributor>],
	ctx: &RenderContext<'_>,
) -> Scene {
	let mut scene = Scene::default();

	for vertex in ctx.vertices.values() {
		let mut style = ShapeStyle::default();
		let styled = if vertex.is_boundary() {
			for contributor in contributors {
				contributor.style_group(vertex, &mut style, ctx);
			}
			&mut scene.groups
		} else {
			for contributor in contributors {
				contributor.style_node(vertex, &mut style, ctx);
			}
			&mut scene.nodes
		};
		styled.push(StyledCircle {
			id: vertex.id.clone(),
			circle: vertex.circle(),
			style,
		});
	}
	scene.groups.sort_by(|a, b| b.circle.r.total_cmp(&a.circle.r));

	scene.edges = geometry
		.iter()
		.map(|edge| {
			let mut style = EdgeStyle::default();
			for contributor in contributors {
				contributor.style_edge(edge, &mut style, ctx);
			}
			StyledEdge {
				geometry: edge.clone(),
				style,
			}
		})
		.collect();

	scene
}
