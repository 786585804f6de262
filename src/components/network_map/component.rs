use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use log::error;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::drag::CLICK_SLOP;
use super::engine::{EngineEvent, MapCommand, MapEngine};
use super::ingest::GraphModel;
use super::radial::RadialOutcome;
use super::render;
use super::types::LayoutOptions;

fn now_seconds() -> f64 {
	js_sys::Date::now() / 1000.0
}

fn window_size(window: &Window) -> (f64, f64) {
	let read = |v: Result<JsValue, JsValue>, fallback| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(read(window.inner_width(), 800.0), read(window.inner_height(), 600.0))
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Hands queued engine events to the host without holding the engine borrow.
fn dispatch(engine: &RefCell<MapEngine>, on_event: Option<Callback<EngineEvent>>) {
	let events = engine.borrow_mut().drain_events();
	if let Some(callback) = on_event {
		for event in events {
			callback.run(event);
		}
	}
}

#[component]
pub fn NetworkMapCanvas(
	#[prop(into)] data: Signal<GraphModel>,
	/// Vertex ids the host's filter rejects; they are dimmed.
	#[prop(optional, into)]
	filtered_out: Option<Signal<Vec<String>>>,
	/// Latest host command; each update is applied once.
	#[prop(optional, into)]
	commands: Option<Signal<Option<MapCommand>>>,
	#[prop(optional)] on_event: Option<Callback<EngineEvent>>,
	#[prop(optional)] options: LayoutOptions,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let engine = Rc::new(RefCell::new(MapEngine::new(options)));
	let dirty = Rc::new(Cell::new(true));
	let press = Rc::new(Cell::new((0.0, 0.0)));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));

	let (engine_data, dirty_data) = (engine.clone(), dirty.clone());
	Effect::new(move |_| {
		let model = data.get();
		let report = engine_data.borrow_mut().load(model).clone();
		log::info!("map ready: {} packed vertices", report.packed);
		match report.radial {
			RadialOutcome::Placed { count, ring_radius } => {
				log::debug!("{count} external vertices on a ring of radius {ring_radius:.1}")
			}
			RadialOutcome::SkippedAmbiguousAnchor { containers } => {
				log::info!("{containers} top-level containers; externals lined up")
			}
			RadialOutcome::NotNeeded => {}
		}
		if !report.orphans.is_empty() {
			log::warn!("{} vertices had invalid parents", report.orphans.len());
		}
		dirty_data.set(true);
		dispatch(&engine_data, on_event);
	});

	if let Some(filtered_out) = filtered_out {
		let (engine_filter, dirty_filter) = (engine.clone(), dirty.clone());
		Effect::new(move |_| {
			let ids = filtered_out.get();
			if engine_filter.borrow_mut().set_filtered_out(ids, now_seconds()) {
				dirty_filter.set(true);
			}
			dispatch(&engine_filter, on_event);
		});
	}

	if let Some(commands) = commands {
		let (engine_cmd, dirty_cmd) = (engine.clone(), dirty.clone());
		Effect::new(move |_| {
			let Some(command) = commands.get() else {
				return;
			};
			if engine_cmd.borrow_mut().apply(command) {
				dirty_cmd.set(true);
			}
			dispatch(&engine_cmd, on_event);
		});
	}

	let (engine_init, dirty_init, animate_init, resize_cb_init) =
		(engine.clone(), dirty.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if animate_init.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window; the network map cannot draw");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);
		engine_init.borrow_mut().resize(w, h);
		engine_init.borrow_mut().reset_view();

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("canvas has no 2d context");
			return;
		};

		if fullscreen {
			let (engine_resize, dirty_resize, canvas_resize) =
				(engine_init.clone(), dirty_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = window_size(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				engine_resize.borrow_mut().resize(nw, nh);
				dirty_resize.set(true);
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (engine_anim, dirty_anim, animate_inner) =
			(engine_init.clone(), dirty_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = now_seconds();
			{
				let mut e = engine_anim.borrow_mut();
				let resegmented = e.run_idle_tasks();
				if dirty_anim.replace(false) || resegmented || e.is_animating(now) {
					let scene = e.frame(now);
					let (cw, ch) = e.size();
					render::render(&scene, &e.transform(), cw, ch, &ctx);
				}
			}
			dispatch(&engine_anim, on_event);
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let (engine_md, dirty_md, press_md) = (engine.clone(), dirty.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		press_md.set((x, y));
		let mut e = engine_md.borrow_mut();
		match e.target_at(x, y) {
			Some(id) => {
				e.begin_drag(&id, x, y);
			}
			None => e.begin_pan(x, y),
		}
		dirty_md.set(true);
	};

	let (engine_mm, dirty_mm) = (engine.clone(), dirty.clone());
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut e = engine_mm.borrow_mut();
		if e.drag_to(x, y) || e.pan_to(x, y) {
			dirty_mm.set(true);
		}
	};

	let (engine_mu, dirty_mu, press_mu) = (engine.clone(), dirty.clone(), press.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let (px, py) = press_mu.get();
		let is_click = (x - px).hypot(y - py) < CLICK_SLOP;
		{
			let mut e = engine_mu.borrow_mut();
			let dragged = e.is_dragging() && e.end_drag();
			e.end_pan();
			if is_click && !dragged {
				e.click_at(x, y, ev.shift_key());
			}
		}
		dirty_mu.set(true);
		dispatch(&engine_mu, on_event);
	};

	let (engine_dc, dirty_dc) = (engine.clone(), dirty.clone());
	let on_dblclick = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let mut e = engine_dc.borrow_mut();
		let group = e
			.vertex_at(x, y)
			.filter(|id| e.model().vertices.get(id).is_some_and(|v| v.is_group()));
		if let Some(id) = group {
			e.toggle_collapse(&id);
			dirty_dc.set(true);
		}
	};

	let (engine_ml, dirty_ml) = (engine.clone(), dirty.clone());
	let on_mouseleave = move |_: MouseEvent| {
		let mut e = engine_ml.borrow_mut();
		e.end_drag();
		e.end_pan();
		dirty_ml.set(true);
	};

	let (engine_wh, dirty_wh) = (engine.clone(), dirty.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		engine_wh.borrow_mut().zoom_at(x, y, factor);
		dirty_wh.set(true);
		dispatch(&engine_wh, on_event);
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="network-map-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:dblclick=on_dblclick
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
