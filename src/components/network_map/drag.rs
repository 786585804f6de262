use std::cell::Cell;
use std::rc::Rc;

use super::geometry::Point;

/// Presses that travel less than this many screen pixels count as clicks.
pub const CLICK_SLOP: f64 = 3.0;

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub vertex: Option<String>,
	/// Screen position of the press.
	pub press: (f64, f64),
	/// Graph-space pointer position at drag start.
	pub start: Point,
	pub vertex_start: Point,
	/// Set once the pointer actually moved, to tell a drag from a click.
	pub moved: bool,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Cancellation token shared between a scheduled task and its scheduler.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
	pub fn cancel(&self) {
		self.0.set(true);
	}

	pub fn is_cancelled(&self) -> bool {
		self.0.get()
	}
}

/// Defers work to the next idle tick. Scheduling supersedes (cancels) the
/// pending task; the token is checked again when the task is resumed.
#[derive(Debug)]
pub struct IdleScheduler<T> {
	pending: Option<(CancelToken, T)>,
}

impl<T> Default for IdleScheduler<T> {
	fn default() -> Self {
		Self { pending: None }
	}
}

impl<T> IdleScheduler<T> {
	pub fn schedule(&mut self, task: T) -> CancelToken {
		self.cancel();
		let token = CancelToken::default();
		self.pending = Some((token.clone(), task));
		token
	}

	pub fn cancel(&mut self) {
		if let Some((token, _)) = self.pending.take() {
			token.cancel();
		}
	}

	pub fn has_pending(&self) -> bool {
		self.pending
			.as_ref()
			.is_some_and(|(token, _)| !token.is_cancelled())
	}

	/// Hands out the pending task unless it was cancelled meanwhile.
	pub fn take_ready(&mut self) -> Option<T> {
		let (token, task) = self.pending.take()?;
		(!token.is_cancelled()).then_some(task)
	}
}
