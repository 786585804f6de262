//! External filter dimming and the feedback pulse played on filter changes.

use std::collections::BTreeSet;
use std::f64::consts::PI;

use super::types::Edge;

/// Opacity multiplier applied to filtered vertices and edges.
pub const DIMMED_OPACITY: f64 = 0.15;

pub const PULSE_COUNT: u32 = 2;
/// Seconds per pulse.
pub const PULSE_PERIOD: f64 = 0.35;
/// Peak extra scale at the top of a pulse.
pub const PULSE_AMPLITUDE: f64 = 0.25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterChange {
	Unchanged,
	/// The filter now hides nothing.
	Cleared,
	/// The filter hides a new, non-empty set.
	Narrowed,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
	pub filtered_out: BTreeSet<String>,
}

impl FilterState {
	pub fn set(&mut self, ids: BTreeSet<String>) -> FilterChange {
		if ids == self.filtered_out {
			return FilterChange::Unchanged;
		}
		self.filtered_out = ids;
		if self.filtered_out.is_empty() {
			FilterChange::Cleared
		} else {
			FilterChange::Narrowed
		}
	}

	pub fn is_active(&self) -> bool {
		!self.filtered_out.is_empty()
	}

	pub fn is_dimmed(&self, id: &str) -> bool {
		self.filtered_out.contains(id)
	}

	pub fn edge_dimmed(&self, edge: &Edge) -> bool {
		self.is_dimmed(&edge.source) || self.is_dimmed(&edge.target)
	}
}

/// Time-based scale animation. Times are wall-clock seconds from the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pulse {
	started_at: Option<f64>,
}

impl Pulse {
	pub fn start(&mut self, now: f64) {
		self.started_at = Some(now);
	}

	pub fn duration() -> f64 {
		PULSE_PERIOD * f64::from(PULSE_COUNT)
	}

	pub fn is_running(&self, now: f64) -> bool {
		self.started_at
			.is_some_and(|start| now >= start && now - start < Self::duration())
	}

	/// Scale factor at `now`: `1.0` outside the animation.
	pub fn scale(&self, now: f64) -> f64 {
		let Some(start) = self.started_at else {
			return 1.0;
		};
		let elapsed = now - start;
		if !(0.0..Self::duration()).contains(&elapsed) {
			return 1.0;
		}
		let phase = (elapsed % PULSE_PERIOD) / PULSE_PERIOD;
		1.0 + PULSE_AMPLITUDE * (phase * PI).sin()
	}

	/// Drops a finished animation.
	pub fn settle(&mut self, now: f64) {
		if self.started_at.is_some() && !self.is_running(now) {
			self.started_at = None;
		}
	}
}
