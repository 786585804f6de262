use leptos::prelude::*;
use serde_json::{Map, Value, json};

use crate::components::network_map::{EngineEvent, GraphModel, MapCommand, NetworkMapCanvas};

const RESOURCE_KINDS: &[&str] = &["instance", "database", "cache", "queue"];

/// Generate a sample network as graph JSON: one boundary, two networks,
/// clusters of applications with a handful of resources each, and a few
/// external peers.
fn generate_sample_network(clusters: usize) -> String {
	let mut vertices = Map::new();
	let mut edges = Vec::new();
	let mut resources: Vec<String> = Vec::new();

	vertices.insert(
		"boundary-prod".into(),
		json!({"type": "group", "label": "Production"}),
	);
	for (n, network) in ["vpc-core", "vpc-edge"].into_iter().enumerate() {
		vertices.insert(
			network.into(),
			json!({"type": "group", "parentId": "boundary-prod", "label": network}),
		);
		for c in 0..clusters {
			let cluster = format!("cluster-{n}-{c}");
			vertices.insert(cluster.clone(), json!({"type": "group", "parentId": network}));
			for a in 0..(1 + c % 3) {
				let app = format!("app-{n}-{c}-{a}");
				// Application names repeat across clusters so group selection spans them.
				let name = ["billing", "search", "auth"][(c + a) % 3];
				vertices.insert(
					app.clone(),
					json!({
						"type": "group",
						"group_type": "application",
						"parentId": cluster,
						"label": name,
					}),
				);
				let count = 1 + (rand_simple(n * 100 + c * 10 + a) * 5.0) as usize;
				for r in 0..count {
					let id = format!("res-{n}-{c}-{a}-{r}");
					let kind = RESOURCE_KINDS[(c + a + r) % RESOURCE_KINDS.len()];
					let mut resource = json!({
						"type": kind,
						"parentId": app,
						"name": format!("{kind}-{r}"),
					});
					if n == 1 && r == 0 {
						resource["public_ip"] = json!("yes");
					}
					vertices.insert(id.clone(), resource);
					resources.push(id);
				}
			}
		}
	}

	for external in ["internet", "partner-api", "saas-crm"] {
		vertices.insert(external.into(), json!({"label": external}));
	}

	let mut link = |source: &str, target: &str| {
		edges.push(json!({"start_node": source, "end_node": target}));
	};
	for (i, id) in resources.iter().enumerate().skip(1) {
		let target = (rand_simple(i) * i as f64) as usize;
		link(id.as_str(), resources[target].as_str());
	}
	if let Some(entry) = resources.iter().find(|id| id.starts_with("res-1-")) {
		link("internet", entry.as_str());
	}
	if let Some(first) = resources.first() {
		link(first.as_str(), "saas-crm");
		link("partner-api", first.as_str());
	}

	json!({"vertices": Value::Object(vertices), "edges": edges}).to_string()
}

/// Simple pseudo-random number generator (deterministic for consistency).
fn rand_simple(seed: usize) -> f64 {
	let x = ((seed + 1) * 9301 + 49297) % 233280;
	(x as f64) / 233280.0
}

fn database_ids(model: &GraphModel) -> Vec<String> {
	model
		.vertices
		.values()
		.filter(|v| v.data.get("type").and_then(Value::as_str) == Some("database"))
		.map(|v| v.id.clone())
		.collect()
}

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	let graph = GraphModel::from_json(&generate_sample_network(4));

	let (hide_databases, set_hide_databases) = signal(false);
	let (command, set_command) = signal(None::<MapCommand>);
	let (last_event, set_last_event) = signal(String::from("Click a node to inspect it."));
	let on_event = Callback::new(move |event: EngineEvent| {
		if let EngineEvent::VertexClicked { id, data } = event {
			set_last_event.set(format!("{id}: {}", Value::Object(data)));
		}
	});
	let send = move |cmd: MapCommand| {
		move |_: leptos::ev::MouseEvent| set_command.set(Some(cmd.clone()))
	};
	let select_billing = send(MapCommand::SelectGroupByName {
		name: "billing".into(),
		append: false,
	});

	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			{graph
				.map(|model| {
					let databases = database_ids(&model);
					let graph_data = Signal::stored(model);
					let filtered_out = Signal::derive(move || {
						if hide_databases.get() { databases.clone() } else { Vec::new() }
					});
					view! {
						<div class="fullscreen-graph">
							<NetworkMapCanvas
								data=graph_data
								filtered_out=filtered_out
								commands=command
								on_event=on_event
								fullscreen=true
							/>
							<div class="graph-overlay">
								<h1>"Network Map"</h1>
								<p class="subtitle">
									"Click to select, shift-click to trace a path. Double-click a group to collapse it. Drag to move, scroll to zoom."
								</p>
								<button on:click=move |_| {
									set_hide_databases.update(|hide| *hide = !*hide)
								}>
									{move || {
										if hide_databases.get() { "Show databases" } else { "Dim databases" }
									}}
								</button>
								<button on:click=send(MapCommand::CollapseAll)>"Collapse all"</button>
								<button on:click=send(MapCommand::ExpandAll)>"Expand all"</button>
								<button on:click=send(MapCommand::ResetView)>"Reset view"</button>
								<button on:click=send(MapCommand::ZoomBy(1.25))>"+"</button>
								<button on:click=send(MapCommand::ZoomBy(0.8))>"-"</button>
								<button on:click=select_billing>"Select billing"</button>
								<p class="inspector">{move || last_event.get()}</p>
							</div>
						</div>
					}
				})}
		</ErrorBoundary>
	}
}
