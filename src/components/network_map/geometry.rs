//! Plane geometry shared by the layout and edge stages.

/// Distances below this are treated as zero.
pub const EPSILON: f64 = 1e-9;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
	pub x: f64,
	pub y: f64,
}

impl Point {
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}

	pub fn distance(self, other: Point) -> f64 {
		(other.x - self.x).hypot(other.y - self.y)
	}

	/// Point at parameter `t` along the segment `self -> other`.
	pub fn lerp(self, other: Point, t: f64) -> Point {
		Point::new(
			self.x + (other.x - self.x) * t,
			self.y + (other.y - self.y) * t,
		)
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Circle {
	pub x: f64,
	pub y: f64,
	pub r: f64,
}

impl Circle {
	pub const fn new(x: f64, y: f64, r: f64) -> Self {
		Self { x, y, r }
	}

	pub fn center(&self) -> Point {
		Point::new(self.x, self.y)
	}

	/// Strictly inside, with `tolerance` shaved off the radius.
	pub fn contains_point(&self, p: Point, tolerance: f64) -> bool {
		point_in_circle(p, self, tolerance)
	}

	/// Whether `other` lies entirely within this circle.
	#[cfg(test)]
	pub fn contains_circle(&self, other: &Circle, tolerance: f64) -> bool {
		self.center().distance(other.center()) + other.r <= self.r + tolerance
	}
}

pub fn point_in_circle(p: Point, circle: &Circle, tolerance: f64) -> bool {
	let r = circle.r - tolerance;
	if r <= 0.0 {
		return false;
	}
	let (dx, dy) = (p.x - circle.x, p.y - circle.y);
	dx * dx + dy * dy < r * r
}

/// Parameters `t` in `[0, 1]` where the segment `a -> b` crosses the circle.
///
/// Returns nothing for a zero-length segment, a miss (negative discriminant),
/// or a tangent touch.
pub fn line_circle_intersections(a: Point, b: Point, circle: &Circle) -> Vec<f64> {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let qa = dx * dx + dy * dy;
	if qa < EPSILON {
		return Vec::new();
	}

	let (fx, fy) = (a.x - circle.x, a.y - circle.y);
	let qb = 2.0 * (fx * dx + fy * dy);
	let qc = fx * fx + fy * fy - circle.r * circle.r;
	let discriminant = qb * qb - 4.0 * qa * qc;
	if discriminant <= 0.0 {
		return Vec::new();
	}

	let root = discriminant.sqrt();
	[(-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)]
		.into_iter()
		.filter(|t| (0.0..=1.0).contains(t))
		.collect()
}

/// Trims `start_trim` off the front and `end_trim` off the back of `a -> b`.
///
/// `None` when the trims consume the whole segment.
pub fn shorten(a: Point, b: Point, start_trim: f64, end_trim: f64) -> Option<(Point, Point)> {
	let length = a.distance(b);
	if length < EPSILON || start_trim + end_trim >= length {
		return None;
	}
	let (ux, uy) = ((b.x - a.x) / length, (b.y - a.y) / length);
	Some((
		Point::new(a.x + ux * start_trim, a.y + uy * start_trim),
		Point::new(b.x - ux * end_trim, b.y - uy * end_trim),
	))
}

/// Axis-aligned bounds of a set of circles.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
	pub min_x: f64,
	pub min_y: f64,
	pub max_x: f64,
	pub max_y: f64,
}

impl Bounds {
	pub fn of_circles<'a>(circles: impl IntoIterator<Item = &'a Circle>) -> Option<Self> {
		circles.into_iter().fold(None, |acc, c| {
			let b = Bounds {
				min_x: c.x - c.r,
				min_y: c.y - c.r,
				max_x: c.x + c.r,
				max_y: c.y + c.r,
			};
			Some(match acc {
				None => b,
				Some(acc) => Bounds {
					min_x: acc.min_x.min(b.min_x),
					min_y: acc.min_y.min(b.min_y),
					max_x: acc.max_x.max(b.max_x),
					max_y: acc.max_y.max(b.max_y),
				},
			})
		})
	}

	pub fn width(&self) -> f64 {
		self.max_x - self.min_x
	}

	pub fn height(&self) -> f64 {
		self.max_y - self.min_y
	}

	pub fn center(&self) -> Point {
		Point::new(
			(self.min_x + self.max_x) / 2.0,
			(self.min_y + self.max_y) / 2.0,
		)
	}
}
