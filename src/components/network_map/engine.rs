//! The interaction engine: owns the positioned graph and all feature state,
//! and turns commands into scenes and events.

use std::collections::BTreeSet;

use log::{debug, info, warn};
use serde_json::{Map, Value};

use super::collapse::{CollapsedView, collapse_view, descendants};
use super::drag::{CLICK_SLOP, DragState, IdleScheduler, PanState};
use super::filter::{FilterChange, FilterState, Pulse};
use super::geometry::{Bounds, Point};
use super::ingest::GraphModel;
use super::layout::{LayoutReport, layout_vertices};
use super::scene::{Scene, build_scene};
use super::segments::{EdgeGeometry, segment_edges};
use super::selection::SelectionState;
use super::style::{RenderContext, StyleContributor, default_contributors};
use super::types::{Edge, GroupVariant, LayoutOptions, VertexMap};
use super::viewport::{FILTER_ZOOM_CAP, ViewTransform};

/// Notifications for the host, collected until [`MapEngine::drain_events`].
#[derive(Clone, Debug, PartialEq)]
pub enum EngineEvent {
	VertexClicked { id: String, data: Map<String, Value> },
	RenderComplete { vertices: usize, edges: usize },
	ZoomChanged { k: f64 },
}

/// Commands a host issues to a mounted map. See [`MapEngine::apply`].
#[derive(Clone, Debug, PartialEq)]
pub enum MapCommand {
	SelectVertex { id: String, append: bool },
	SelectGroupByName { name: String, append: bool },
	ClickBackground { append: bool },
	ToggleCollapse(String),
	CollapseAll,
	ExpandAll,
	ResetView,
	ZoomBy(f64),
	PanBy { dx: f64, dy: f64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum IdleTask {
	Resegment,
}

pub struct MapEngine {
	options: LayoutOptions,
	/// Authoritative positioned graph.
	model: GraphModel,
	report: LayoutReport,
	collapsed: BTreeSet<String>,
	view: CollapsedView,
	geometry: Vec<EdgeGeometry>,
	geometry_revision: u64,
	selection: SelectionState,
	filter: FilterState,
	pulse: Pulse,
	transform: ViewTransform,
	width: f64,
	height: f64,
	drag: DragState,
	pan: PanState,
	idle: IdleScheduler<IdleTask>,
	contributors: Vec<Box<dyn StyleContributor>>,
	events: Vec<EngineEvent>,
}

impl MapEngine {
	pub fn new(options: LayoutOptions) -> Self {
		let contributors = default_contributors();
		debug!(
			"style contributors: {}",
			contributors
				.iter()
				.map(|c| c.name())
				.collect::<Vec<_>>()
				.join(", ")
		);
		Self {
			width: options.canvas_width,
			height: options.canvas_height,
			options,
			model: GraphModel::default(),
			report: LayoutReport::default(),
			collapsed: BTreeSet::new(),
			view: CollapsedView::default(),
			geometry: Vec::new(),
			geometry_revision: 0,
			selection: SelectionState::default(),
			filter: FilterState::default(),
			pulse: Pulse::default(),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			idle: IdleScheduler::default(),
			contributors,
			events: Vec::new(),
		}
	}

	/// Full data refresh: lays the graph out and fits the view to it.
	pub fn load(&mut self, mut model: GraphModel) -> &LayoutReport {
		self.idle.cancel();
		self.drag = DragState::default();
		self.report = layout_vertices(&mut model.vertices, &self.options);

		self.collapsed
			.retain(|id| model.vertices.get(id).is_some_and(|v| v.is_group()));
		self.selection.retain_known(&model.vertices, &model.edges);

		info!(
			"loaded {} vertices and {} edges",
			model.vertices.len(),
			model.edges.len()
		);
		self.model = model;
		self.refresh_view();
		self.reset_view();
		&self.report
	}

	/// Every vertex with its layout position, hidden ones included.
	pub fn model(&self) -> &GraphModel {
		&self.model
	}

	/// The vertices currently visible.
	pub fn vertices(&self) -> &VertexMap {
		&self.view.vertices
	}

	pub fn edges(&self) -> &[Edge] {
		&self.view.edges
	}

	pub fn geometry(&self) -> &[EdgeGeometry] {
		&self.geometry
	}

	/// Bumped every time edge geometry is recomputed.
	pub fn geometry_revision(&self) -> u64 {
		self.geometry_revision
	}

	pub fn selection(&self) -> &SelectionState {
		&self.selection
	}

	pub fn filter(&self) -> &FilterState {
		&self.filter
	}

	pub fn collapsed(&self) -> &BTreeSet<String> {
		&self.collapsed
	}

	pub fn transform(&self) -> ViewTransform {
		self.transform
	}

	pub fn size(&self) -> (f64, f64) {
		(self.width, self.height)
	}

	pub fn is_dragging(&self) -> bool {
		self.drag.active
	}

	pub fn drain_events(&mut self) -> Vec<EngineEvent> {
		std::mem::take(&mut self.events)
	}

	/// Runs a host command. Returns whether anything changed.
	pub fn apply(&mut self, command: MapCommand) -> bool {
		debug!("command {command:?}");
		match command {
			MapCommand::SelectVertex { id, append } => self.select_vertex(&id, append),
			MapCommand::SelectGroupByName { name, append } => {
				self.select_group_by_name(&name, append)
			}
			MapCommand::ClickBackground { append } => self.click_background(append),
			MapCommand::ToggleCollapse(id) => self.toggle_collapse(&id),
			MapCommand::CollapseAll => self.collapse_all(),
			MapCommand::ExpandAll => self.expand_all(),
			MapCommand::ResetView => self.reset_view(),
			MapCommand::ZoomBy(factor) => self.zoom_by(factor),
			MapCommand::PanBy { dx, dy } => self.pan_by(dx, dy),
		}
	}

	fn refresh_view(&mut self) {
		self.view = collapse_view(
			&self.model.vertices,
			&self.model.edges,
			&self.collapsed,
			self.options.node_radius,
		);
		self.resegment();
	}

	fn resegment(&mut self) {
		self.geometry = segment_edges(&self.view.vertices, &self.view.edges);
		self.geometry_revision += 1;
		debug!(
			"segmented {} edges (revision {})",
			self.geometry.len(),
			self.geometry_revision
		);
	}

	fn set_transform(&mut self, transform: ViewTransform) {
		let zoomed = transform.k != self.transform.k;
		self.transform = transform;
		if zoomed {
			self.events.push(EngineEvent::ZoomChanged { k: transform.k });
		}
	}

	// Selection

	pub fn select_vertex(&mut self, id: &str, append: bool) -> bool {
		let Some(vertex) = self.view.vertices.get(id) else {
			warn!("select_vertex: unknown or hidden vertex {id}");
			return false;
		};
		let data = vertex.data.clone();
		self.selection.select_vertex(id, append, &self.view.edges);
		self.events.push(EngineEvent::VertexClicked {
			id: id.to_owned(),
			data,
		});
		true
	}

	pub fn select_group_by_name(&mut self, name: &str, append: bool) -> bool {
		let known = self.model.vertices.values().any(|v| {
			v.variant() == Some(GroupVariant::Application) && v.group_name() == name
		});
		if !known {
			warn!("select_group_by_name: no application group named {name}");
			return false;
		}
		self.selection.select_group_by_name(name, append);
		true
	}

	pub fn click_background(&mut self, append: bool) -> bool {
		self.selection.click_background(append);
		true
	}

	/// Pointer click at a screen position: expanded application groups select
	/// by name, other vertices select themselves, and empty space (inside
	/// plain containers too) clears.
	pub fn click_at(&mut self, sx: f64, sy: f64, append: bool) -> bool {
		let Some(id) = self.target_at(sx, sy) else {
			return self.click_background(append);
		};
		let by_name = self
			.view
			.vertices
			.get(&id)
			.and_then(|v| v.is_boundary().then(|| v.group_name().to_owned()));
		match by_name {
			Some(name) => self.select_group_by_name(&name, append),
			None => self.select_vertex(&id, append),
		}
	}

	// Filter

	/// Replaces the filtered-out set. `now` is wall-clock seconds.
	pub fn set_filtered_out(&mut self, ids: impl IntoIterator<Item = String>, now: f64) -> bool {
		match self.filter.set(ids.into_iter().collect()) {
			FilterChange::Unchanged => false,
			FilterChange::Cleared => {
				self.reset_view();
				true
			}
			FilterChange::Narrowed => {
				let remaining = Bounds::of_circles(
					self.view
						.vertices
						.values()
						.filter(|v| !self.filter.is_dimmed(&v.id))
						.map(|v| v.circle())
						.collect::<Vec<_>>()
						.iter(),
				);
				match remaining {
					Some(bounds) => {
						let cap = self.transform.k * FILTER_ZOOM_CAP;
						let fitted =
							ViewTransform::fit(&bounds, self.width, self.height, Some(cap));
						self.set_transform(fitted);
						self.pulse.start(now);
					}
					None => debug!("filter hides every visible vertex; keeping the view"),
				}
				true
			}
		}
	}

	// Collapse

	pub fn toggle_collapse(&mut self, id: &str) -> bool {
		if !self.model.vertices.get(id).is_some_and(|v| v.is_group()) {
			warn!("toggle_collapse: {id} is not a known group");
			return false;
		}
		if !self.collapsed.remove(id) {
			self.collapsed.insert(id.to_owned());
		}
		self.refresh_view();
		true
	}

	/// Collapses every innermost group, leaving the container structure open.
	pub fn collapse_all(&mut self) -> bool {
		let innermost: BTreeSet<String> = self
			.model
			.vertices
			.values()
			.filter(|v| v.is_group())
			.filter(|v| {
				!v.children
					.iter()
					.any(|c| self.model.vertices.get(c).is_some_and(|c| c.is_group()))
			})
			.map(|v| v.id.clone())
			.collect();
		if innermost == self.collapsed {
			return false;
		}
		self.collapsed = innermost;
		self.refresh_view();
		true
	}

	pub fn expand_all(&mut self) -> bool {
		if self.collapsed.is_empty() {
			return false;
		}
		self.collapsed.clear();
		self.refresh_view();
		true
	}

	// Viewport

	/// Fits every visible vertex.
	pub fn reset_view(&mut self) -> bool {
		let bounds = Bounds::of_circles(
			self.view
				.vertices
				.values()
				.map(|v| v.circle())
				.collect::<Vec<_>>()
				.iter(),
		);
		let fitted = match bounds {
			Some(bounds) => ViewTransform::fit(&bounds, self.width, self.height, None),
			None => ViewTransform::default(),
		};
		self.set_transform(fitted);
		true
	}

	/// Zooms about the canvas center.
	pub fn zoom_by(&mut self, factor: f64) -> bool {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor)
	}

	/// Zooms about a screen point, e.g. the cursor.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64) -> bool {
		if !factor.is_finite() || factor <= 0.0 {
			warn!("zoom: ignoring factor {factor}");
			return false;
		}
		let mut transform = self.transform;
		transform.zoom_about(sx, sy, factor);
		self.set_transform(transform);
		true
	}

	pub fn pan_by(&mut self, dx: f64, dy: f64) -> bool {
		self.transform.pan_by(dx, dy);
		true
	}

	pub fn begin_pan(&mut self, sx: f64, sy: f64) {
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
	}

	pub fn pan_to(&mut self, sx: f64, sy: f64) -> bool {
		if !self.pan.active {
			return false;
		}
		self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
		self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		true
	}

	pub fn end_pan(&mut self) {
		self.pan.active = false;
	}

	pub fn resize(&mut self, width: f64, height: f64) -> bool {
		if width <= 0.0 || height <= 0.0 {
			warn!("resize: ignoring {width}x{height}");
			return false;
		}
		self.width = width;
		self.height = height;
		true
	}

	// Drag

	pub fn begin_drag(&mut self, id: &str, sx: f64, sy: f64) -> bool {
		let Some(vertex) = self.view.vertices.get(id) else {
			warn!("begin_drag: unknown or hidden vertex {id}");
			return false;
		};
		self.drag = DragState {
			active: true,
			vertex: Some(id.to_owned()),
			press: (sx, sy),
			start: self.transform.screen_to_graph(sx, sy),
			vertex_start: vertex.center(),
			moved: false,
		};
		true
	}

	/// Moves the dragged vertex, and a group's descendants with it, right
	/// away; edge geometry follows on the next idle tick. Nothing moves until
	/// the pointer leaves the click slop around the press point.
	pub fn drag_to(&mut self, sx: f64, sy: f64) -> bool {
		let Some(id) = self.drag.vertex.clone().filter(|_| self.drag.active) else {
			return false;
		};
		let (px, py) = self.drag.press;
		if !self.drag.moved && (sx - px).hypot(sy - py) < CLICK_SLOP {
			return false;
		}
		let pointer = self.transform.screen_to_graph(sx, sy);
		let target = Point::new(
			self.drag.vertex_start.x + pointer.x - self.drag.start.x,
			self.drag.vertex_start.y + pointer.y - self.drag.start.y,
		);
		let Some(current) = self.model.vertices.get(&id).map(|v| v.center()) else {
			return false;
		};
		let (dx, dy) = (target.x - current.x, target.y - current.y);

		let mut moved = descendants(&self.model.vertices, &id);
		moved.insert(id);
		for vertex_id in &moved {
			for map in [&mut self.model.vertices, &mut self.view.vertices] {
				if let Some(vertex) = map.get_mut(vertex_id) {
					vertex.x += dx;
					vertex.y += dy;
				}
			}
		}

		self.drag.moved = true;
		self.idle.schedule(IdleTask::Resegment);
		true
	}

	/// Ends the drag and reconciles edge geometry synchronously. Returns
	/// whether anything moved.
	pub fn end_drag(&mut self) -> bool {
		if !self.drag.active {
			return false;
		}
		let moved = self.drag.moved;
		self.drag = DragState::default();
		self.idle.cancel();
		if moved {
			self.resegment();
		}
		moved
	}

	/// Runs the pending idle task, if it is still current.
	pub fn run_idle_tasks(&mut self) -> bool {
		match self.idle.take_ready() {
			Some(IdleTask::Resegment) => {
				self.resegment();
				true
			}
			None => false,
		}
	}

	// Frames

	/// Styles the current state into a scene. `now` is wall-clock seconds.
	pub fn frame(&mut self, now: f64) -> Scene {
		self.pulse.settle(now);
		let ctx = RenderContext {
			vertices: &self.view.vertices,
			edges: &self.view.edges,
			selection: &self.selection,
			filter: &self.filter,
			pulse_scale: self.pulse.scale(now),
		};
		let scene = build_scene(&self.geometry, &self.contributors, &ctx);
		self.events.push(EngineEvent::RenderComplete {
			vertices: scene.nodes.len() + scene.groups.len(),
			edges: scene.edges.len(),
		});
		scene
	}

	/// Whether frames still change without input.
	pub fn is_animating(&self, now: f64) -> bool {
		self.pulse.is_running(now) || self.idle.has_pending()
	}

	/// What a pointer at a screen position interacts with. Expanded containers
	/// other than application groups count as background.
	pub fn target_at(&self, sx: f64, sy: f64) -> Option<String> {
		let id = self.vertex_at(sx, sy)?;
		let vertex = self.view.vertices.get(&id)?;
		let background =
			vertex.is_boundary() && vertex.variant() != Some(GroupVariant::Application);
		(!background).then_some(id)
	}

	/// Topmost visible vertex under a screen point: the smallest circle that
	/// contains it.
	pub fn vertex_at(&self, sx: f64, sy: f64) -> Option<String> {
		let p = self.transform.screen_to_graph(sx, sy);
		self.view
			.vertices
			.values()
			.filter(|v| v.circle().contains_point(p, 0.0))
			.min_by(|a, b| a.r.total_cmp(&b.r))
			.map(|v| v.id.clone())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::network_map::types::{GroupVariant, Vertex};

	fn engine() -> MapEngine {
		let vertices = vec![
			Vertex::group("vpc", GroupVariant::Network),
			Vertex::group("app-api", GroupVariant::Application)
				.with_parent("vpc")
				.with_label("api"),
			Vertex::group("app-db", GroupVariant::Application)
				.with_parent("vpc")
				.with_label("db"),
			Vertex::leaf("web").with_parent("app-api"),
			Vertex::leaf("worker").with_parent("app-api"),
			Vertex::leaf("pg").with_parent("app-db"),
			Vertex::leaf("internet"),
		];
		let edges = vec![
			Edge::new("internet", "web"),
			Edge::new("web", "pg"),
			Edge::new("worker", "pg"),
		];
		let mut engine = MapEngine::new(LayoutOptions::default());
		engine.load(GraphModel::new(vertices, edges));
		engine.drain_events();
		engine
	}

	fn screen_of(engine: &MapEngine, id: &str) -> (f64, f64) {
		engine.transform().graph_to_screen(engine.vertices()[id].center())
	}

	#[test]
	fn rapid_drag_moves_commit_only_the_final_geometry() {
		let mut engine = engine();
		let before = engine.geometry_revision();
		let (sx, sy) = screen_of(&engine, "web");

		assert!(engine.begin_drag("web", sx, sy));
		for step in 1..=3 {
			let offset = f64::from(step) * 20.0;
			assert!(engine.drag_to(sx + offset, sy + offset));
		}
		// Vertex positions follow immediately, geometry does not.
		assert_eq!(engine.geometry_revision(), before);

		assert!(engine.run_idle_tasks());
		assert!(!engine.run_idle_tasks());
		assert_eq!(engine.geometry_revision(), before + 1);

		let web = engine.vertices()["web"].clone();
		let k = engine.transform().k;
		let expected = Point::new(
			engine.model().vertices["web"].x,
			engine.model().vertices["web"].y,
		);
		assert_eq!(web.center(), expected);
		let edge = engine
			.geometry()
			.iter()
			.find(|g| g.edge == Edge::new("web", "pg"))
			.unwrap();
		assert!((edge.start.distance(web.center()) - web.r).abs() < 1e-9);
		let (fx, fy) = screen_of(&engine, "web");
		assert!((fx - (sx + 60.0)).abs() < 1e-6 && (fy - (sy + 60.0)).abs() < 1e-6, "zoom {k}");

		assert!(engine.end_drag());
		assert_eq!(engine.geometry_revision(), before + 2);
	}

	#[test]
	fn drag_end_reconciles_without_an_idle_tick() {
		let mut engine = engine();
		let (sx, sy) = screen_of(&engine, "pg");
		engine.begin_drag("pg", sx, sy);
		engine.drag_to(sx + 5.0, sy);
		engine.drag_to(sx + 9.0, sy);
		assert!(engine.end_drag());
		assert!(!engine.run_idle_tasks());
		let pg = engine.vertices()["pg"].center();
		let edge = engine
			.geometry()
			.iter()
			.find(|g| g.edge == Edge::new("web", "pg"))
			.unwrap();
		assert!((edge.end.distance(pg) - engine.vertices()["pg"].r).abs() < 1e-9);
	}

	#[test]
	fn dragging_a_group_carries_its_members() {
		let mut engine = engine();
		let web_before = engine.vertices()["web"].center();
		let (sx, sy) = screen_of(&engine, "app-api");
		engine.begin_drag("app-api", sx, sy);
		engine.drag_to(sx + 30.0, sy);
		engine.end_drag();
		let k = engine.transform().k;
		let web_after = engine.vertices()["web"].center();
		assert!((web_after.x - web_before.x - 30.0 / k).abs() < 1e-9);
		assert_eq!(web_after.y, web_before.y);
	}

	#[test]
	fn unknown_ids_are_rejected() {
		let mut engine = engine();
		let revision = engine.geometry_revision();
		assert!(!engine.select_vertex("ghost", false));
		assert!(!engine.toggle_collapse("ghost"));
		assert!(!engine.toggle_collapse("web"));
		assert!(!engine.begin_drag("ghost", 0.0, 0.0));
		assert!(!engine.select_group_by_name("nope", false));
		assert!(engine.selection().is_empty());
		assert_eq!(engine.geometry_revision(), revision);
		assert!(engine.drain_events().is_empty());
	}

	#[test]
	fn selecting_emits_a_click_event() {
		let mut engine = engine();
		assert!(engine.select_vertex("web", false));
		let events = engine.drain_events();
		assert!(matches!(&events[..], [EngineEvent::VertexClicked { id, .. }] if id == "web"));
		assert!(engine.drain_events().is_empty());
	}

	#[test]
	fn clicking_an_application_boundary_selects_its_name() {
		let mut engine = engine();
		let group = engine.vertices()["app-db"].clone();
		// A point inside app-db but away from its only leaf.
		let inside = Point::new(group.x, group.y + group.r - 2.0);
		let (sx, sy) = engine.transform().graph_to_screen(inside);
		assert_eq!(engine.vertex_at(sx, sy).as_deref(), Some("app-db"));
		assert!(engine.click_at(sx, sy, false));
		assert!(engine.selection().selected_applications.contains("db"));
		assert!(engine.selection().head.is_none());
	}

	#[test]
	fn collapse_round_trip_restores_the_view() {
		let mut engine = engine();
		let vertices = engine.vertices().clone();
		let edges = engine.edges().to_vec();

		assert!(engine.toggle_collapse("app-api"));
		assert!(!engine.vertices().contains_key("web"));
		assert!(engine.edges().contains(&Edge::new("internet", "app-api")));
		assert!(engine.edges().contains(&Edge::new("app-api", "pg")));

		assert!(engine.toggle_collapse("app-api"));
		assert_eq!(engine.vertices(), &vertices);
		assert_eq!(engine.edges(), &edges[..]);
	}

	#[test]
	fn collapse_all_folds_innermost_groups() {
		let mut engine = engine();
		assert!(engine.collapse_all());
		let collapsed: Vec<_> = engine.collapsed().iter().map(String::as_str).collect();
		assert_eq!(collapsed, vec!["app-api", "app-db"]);
		assert_eq!(
			engine.edges(),
			&[Edge::new("internet", "app-api"), Edge::new("app-api", "app-db")]
		);
		assert!(engine.expand_all());
		assert!(!engine.expand_all());
	}

	#[test]
	fn filter_fits_the_remaining_vertices_and_pulses() {
		let mut engine = engine();
		let k0 = engine.transform().k;
		let hidden = ["internet", "web", "worker", "app-api"].map(String::from);
		assert!(engine.set_filtered_out(hidden.clone(), 100.0));
		assert!(engine.transform().k <= k0 * FILTER_ZOOM_CAP + 1e-9);
		assert!(engine.transform().k > k0);
		assert!(engine.is_animating(100.1));
		assert!(matches!(
			engine.drain_events().last(),
			Some(EngineEvent::ZoomChanged { .. })
		));

		let scene = engine.frame(100.0 + 0.175);
		assert!(scene.node("pg").unwrap().style.scale > 1.0);
		assert!(scene.node("web").unwrap().style.has_class("dimmed"));

		assert!(!engine.set_filtered_out(hidden, 101.0));
		assert!(engine.set_filtered_out(Vec::new(), 102.0));
		assert!((engine.transform().k - k0).abs() < 1e-9);
	}

	#[test]
	fn zoom_is_clamped_and_reported() {
		let mut engine = engine();
		assert!(engine.zoom_by(1e6));
		assert_eq!(engine.transform().k, 10.0);
		assert!(!engine.zoom_by(0.0));
		assert!(matches!(
			engine.drain_events()[..],
			[EngineEvent::ZoomChanged { k }] if k == 10.0
		));
	}

	#[test]
	fn frames_report_what_was_drawn() {
		let mut engine = engine();
		let scene = engine.frame(0.0);
		assert_eq!(scene.groups.len(), 3);
		assert_eq!(scene.nodes.len(), 4);
		assert_eq!(
			engine.drain_events(),
			vec![EngineEvent::RenderComplete {
				vertices: 7,
				edges: 3
			}]
		);
	}

	#[test]
	fn background_click_clears_selection() {
		let mut engine = engine();
		engine.select_vertex("web", false);
		assert!(engine.select_group_by_name("api", true));
		assert!(engine.click_at(-1.0e6, -1.0e6, false));
		assert!(engine.selection().is_empty());
	}

	#[test]
	fn pointer_jitter_below_the_click_slop_is_not_a_drag() {
		let mut engine = engine();
		let before = engine.vertices()["web"].center();
		let (sx, sy) = screen_of(&engine, "web");
		assert!(engine.begin_drag("web", sx, sy));
		assert!(!engine.drag_to(sx + 1.0, sy));
		assert!(!engine.drag_to(sx + 1.0, sy + 2.0));
		assert_eq!(engine.vertices()["web"].center(), before);
		assert!(!engine.end_drag());
		assert!(engine.click_at(sx + 1.0, sy, false));
		assert_eq!(engine.selection().head.as_deref(), Some("web"));
	}

	#[test]
	fn clicks_on_empty_container_space_clear_the_selection() {
		let mut engine = engine();
		engine.select_vertex("web", false);
		let vpc = engine.vertices()["vpc"].clone();
		let (sx, sy) = engine
			.transform()
			.graph_to_screen(Point::new(vpc.x, vpc.y + vpc.r - 2.0));
		assert_eq!(engine.vertex_at(sx, sy).as_deref(), Some("vpc"));
		assert_eq!(engine.target_at(sx, sy), None);
		engine.drain_events();

		assert!(engine.click_at(sx, sy, false));
		assert!(engine.selection().is_empty());
		assert!(engine.drain_events().is_empty());
	}

	#[test]
	fn a_filtered_path_vertex_stays_highlighted_and_dimmed() {
		let mut engine = engine();
		engine.select_vertex("web", false);
		engine.select_vertex("pg", true);
		assert!(engine.set_filtered_out(["pg".to_string()], 10.0));

		let scene = engine.frame(20.0);
		let pg = scene.node("pg").unwrap();
		assert_eq!(pg.style.classes, vec!["path", "dimmed"]);
		assert!(pg.style.opacity < 1.0);
		let web = scene.node("web").unwrap();
		assert!(web.style.has_class("path") && !web.style.has_class("dimmed"));
		let edge = scene
			.edges
			.iter()
			.find(|e| e.geometry.edge == Edge::new("web", "pg"))
			.unwrap();
		assert!(edge.style.has_class("path") && edge.style.has_class("dimmed"));
	}

	#[test]
	fn reloading_prunes_the_trace_to_surviving_vertices() {
		let mut engine = engine();
		engine.select_vertex("internet", false);
		engine.select_vertex("web", true);
		engine.select_vertex("pg", true);
		assert_eq!(engine.selection().trace_nodes.len(), 3);

		let mut model = engine.model().clone();
		model.vertices.remove("internet");
		model.edges.retain(|e| !e.touches("internet"));
		engine.load(model);

		let selection = engine.selection();
		assert_eq!(selection.head.as_deref(), Some("pg"));
		let path: Vec<_> = selection.trace_nodes.iter().map(String::as_str).collect();
		assert_eq!(path, vec!["pg", "web"]);
		assert_eq!(
			selection.trace_edges.iter().collect::<Vec<_>>(),
			vec![&Edge::new("web", "pg")]
		);
	}

	#[test]
	fn host_commands_reach_the_engine() {
		let mut engine = engine();
		assert!(engine.apply(MapCommand::CollapseAll));
		assert_eq!(engine.collapsed().len(), 2);
		assert!(!engine.apply(MapCommand::CollapseAll));
		assert!(engine.apply(MapCommand::ExpandAll));
		assert!(engine.collapsed().is_empty());
		assert!(engine.apply(MapCommand::ToggleCollapse("app-db".into())));
		assert!(!engine.vertices().contains_key("pg"));

		assert!(engine.apply(MapCommand::SelectGroupByName {
			name: "api".into(),
			append: false,
		}));
		assert!(engine.selection().selected_applications.contains("api"));
		assert!(!engine.apply(MapCommand::SelectVertex {
			id: "pg".into(),
			append: false,
		}));

		let k0 = engine.transform().k;
		assert!(engine.apply(MapCommand::ZoomBy(2.0)));
		assert!((engine.transform().k - (2.0 * k0).min(10.0)).abs() < 1e-9);
		let x0 = engine.transform().x;
		assert!(engine.apply(MapCommand::PanBy { dx: 10.0, dy: -5.0 }));
		assert!((engine.transform().x - x0 - 10.0).abs() < 1e-9);
		assert!(engine.apply(MapCommand::ResetView));
		assert!((engine.transform().k - k0).abs() < 1e-9);
		assert!(matches!(
			engine.drain_events()[..],
			[EngineEvent::ZoomChanged { .. }, EngineEvent::ZoomChanged { .. }]
		));
	}
}
