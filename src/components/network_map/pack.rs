//! Front-chain sibling packing and minimum enclosing circles.
//!
//! Siblings are placed one at a time tangent to two circles of the current
//! front chain, choosing the pair closest to the centroid. The enclosing
//! circle of the final chain is found with an incremental move-to-front
//! basis search.

use super::geometry::Circle;

const INTERSECT_TOLERANCE: f64 = 1e-6;

/// Packs `circles` in place, centered on the origin, and returns the radius
/// of the enclosing circle. Radii are left untouched.
pub fn pack_siblings(circles: &mut [Circle]) -> f64 {
	let n = circles.len();
	if n == 0 {
		return 0.0;
	}

	circles[0].x = 0.0;
	circles[0].y = 0.0;
	if n == 1 {
		return circles[0].r;
	}

	circles[0].x = -circles[1].r;
	circles[1].x = circles[0].r;
	circles[1].y = 0.0;
	if n == 2 {
		return circles[0].r + circles[1].r;
	}

	let (first, second) = (circles[0], circles[1]);
	place(&second, &first, &mut circles[2]);

	// Front chain as a circular doubly linked list over circle indices.
	let mut next = vec![usize::MAX; n];
	let mut prev = vec![usize::MAX; n];
	let (mut a, mut b) = (0usize, 1usize);
	next[0] = 1;
	prev[1] = 0;
	next[1] = 2;
	prev[2] = 1;
	next[2] = 0;
	prev[0] = 2;

	let mut i = 3;
	'pack: while i < n {
		let (ca, cb) = (circles[a], circles[b]);
		place(&ca, &cb, &mut circles[i]);
		let c = circles[i];

		// Closest intersecting circle on the chain, measured along the chain.
		let (mut j, mut k) = (next[b], prev[a]);
		let (mut sj, mut sk) = (circles[b].r, circles[a].r);
		loop {
			if sj <= sk {
				if intersects(&circles[j], &c) {
					b = j;
					next[a] = b;
					prev[b] = a;
					continue 'pack;
				}
				sj += circles[j].r;
				j = next[j];
			} else {
				if intersects(&circles[k], &c) {
					a = k;
					next[a] = b;
					prev[b] = a;
					continue 'pack;
				}
				sk += circles[k].r;
				k = prev[k];
			}
			if j == next[k] {
				break;
			}
		}

		// Insert i between a and b.
		prev[i] = a;
		next[i] = b;
		next[a] = i;
		prev[b] = i;
		b = i;

		// New closest pair to the centroid.
		let mut best = score(circles, &next, a);
		let mut cursor = next[i];
		while cursor != b {
			let candidate = score(circles, &next, cursor);
			if candidate < best {
				a = cursor;
				best = candidate;
			}
			cursor = next[cursor];
		}
		b = next[a];
		i += 1;
	}

	let mut chain = vec![circles[b]];
	let mut cursor = next[b];
	while cursor != b {
		chain.push(circles[cursor]);
		cursor = next[cursor];
	}
	let enclosing = enclose(&chain);

	for circle in circles.iter_mut() {
		circle.x -= enclosing.x;
		circle.y -= enclosing.y;
	}

	// The basis search is exact up to rounding; widen to the true hull.
	circles
		.iter()
		.map(|c| c.x.hypot(c.y) + c.r)
		.fold(enclosing.r, f64::max)
}

/// Places `c` tangent to both `a` and `b`.
fn place(b: &Circle, a: &Circle, c: &mut Circle) {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let d2 = dx * dx + dy * dy;
	if d2 > 0.0 {
		let a2 = (a.r + c.r).powi(2);
		let b2 = (b.r + c.r).powi(2);
		if a2 > b2 {
			let x = (d2 + b2 - a2) / (2.0 * d2);
			let y = (b2 / d2 - x * x).max(0.0).sqrt();
			c.x = b.x - x * dx - y * dy;
			c.y = b.y - x * dy + y * dx;
		} else {
			let x = (d2 + a2 - b2) / (2.0 * d2);
			let y = (a2 / d2 - x * x).max(0.0).sqrt();
			c.x = a.x + x * dx - y * dy;
			c.y = a.y + x * dy + y * dx;
		}
	} else {
		c.x = a.x + c.r;
		c.y = a.y;
	}
}

fn intersects(a: &Circle, b: &Circle) -> bool {
	let dr = a.r + b.r - INTERSECT_TOLERANCE;
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn score(circles: &[Circle], next: &[usize], node: usize) -> f64 {
	let a = circles[node];
	let b = circles[next[node]];
	let ab = a.r + b.r;
	let dx = (a.x * b.r + b.x * a.r) / ab;
	let dy = (a.y * b.r + b.y * a.r) / ab;
	dx * dx + dy * dy
}

/// Smallest circle enclosing every circle in `circles`.
pub fn enclose(circles: &[Circle]) -> Circle {
	let mut basis: Vec<Circle> = Vec::new();
	let mut enclosing: Option<Circle> = None;
	let mut i = 0;
	while i < circles.len() {
		let p = circles[i];
		if enclosing.is_some_and(|e| encloses_weak(&e, &p)) {
			i += 1;
			continue;
		}
		basis = extend_basis(&basis, p);
		enclosing = Some(enclose_basis(&basis));
		i = 0;
	}
	enclosing.unwrap_or_default()
}

fn extend_basis(basis: &[Circle], p: Circle) -> Vec<Circle> {
	if encloses_weak_all(&p, basis) {
		return vec![p];
	}

	for &bi in basis {
		if encloses_not(&p, &bi) && encloses_weak_all(&enclose_basis2(&bi, &p), basis) {
			return vec![bi, p];
		}
	}

	for (i, &bi) in basis.iter().enumerate() {
		for &bj in &basis[i + 1..] {
			if encloses_not(&enclose_basis2(&bi, &bj), &p)
				&& encloses_not(&enclose_basis2(&bi, &p), &bj)
				&& encloses_not(&enclose_basis2(&bj, &p), &bi)
				&& encloses_weak_all(&enclose_basis3(&bi, &bj, &p), basis)
			{
				return vec![bi, bj, p];
			}
		}
	}

	// Only reachable through rounding; keep the new circle plus the widest
	// member so the search still makes progress.
	log::debug!("enclosing basis search fell back for circle r={}", p.r);
	let widest = basis
		.iter()
		.copied()
		.max_by(|a, b| a.r.total_cmp(&b.r))
		.unwrap_or(p);
	vec![widest, p]
}

fn encloses_not(a: &Circle, b: &Circle) -> bool {
	let dr = a.r - b.r;
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	dr < 0.0 || dr * dr < dx * dx + dy * dy
}

fn encloses_weak(a: &Circle, b: &Circle) -> bool {
	let dr = a.r - b.r + a.r.max(b.r).max(1.0) * 1e-9;
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	dr > 0.0 && dr * dr > dx * dx + dy * dy
}

fn encloses_weak_all(a: &Circle, basis: &[Circle]) -> bool {
	basis.iter().all(|b| encloses_weak(a, b))
}

fn enclose_basis(basis: &[Circle]) -> Circle {
	match basis {
		[a] => *a,
		[a, b] => enclose_basis2(a, b),
		[a, b, c] => enclose_basis3(a, b, c),
		_ => Circle::default(),
	}
}

fn enclose_basis2(a: &Circle, b: &Circle) -> Circle {
	let (x21, y21, r21) = (b.x - a.x, b.y - a.y, b.r - a.r);
	let l = x21.hypot(y21);
	if l == 0.0 {
		return Circle::new(a.x, a.y, a.r.max(b.r));
	}
	Circle::new(
		(a.x + b.x + x21 / l * r21) / 2.0,
		(a.y + b.y + y21 / l * r21) / 2.0,
		(l + a.r + b.r) / 2.0,
	)
}

fn enclose_basis3(a: &Circle, b: &Circle, c: &Circle) -> Circle {
	let (x1, y1, r1) = (a.x, a.y, a.r);
	let (x2, y2, r2) = (b.x, b.y, b.r);
	let (x3, y3, r3) = (c.x, c.y, c.r);
	let a2 = x1 - x2;
	let a3 = x1 - x3;
	let b2 = y1 - y2;
	let b3 = y1 - y3;
	let c2 = r2 - r1;
	let c3 = r3 - r1;
	let d1 = x1 * x1 + y1 * y1 - r1 * r1;
	let d2 = d1 - x2 * x2 - y2 * y2 + r2 * r2;
	let d3 = d1 - x3 * x3 - y3 * y3 + r3 * r3;
	let ab = a3 * b2 - a2 * b3;
	if ab == 0.0 {
		// Collinear centers; the pair spanning the furthest is the answer.
		let candidates = [
			enclose_basis2(a, b),
			enclose_basis2(a, c),
			enclose_basis2(b, c),
		];
		return candidates
			.into_iter()
			.max_by(|p, q| p.r.total_cmp(&q.r))
			.unwrap_or(*a);
	}
	let xa = (b2 * d3 - b3 * d2) / (ab * 2.0) - x1;
	let xb = (b3 * c2 - b2 * c3) / ab;
	let ya = (a3 * d2 - a2 * d3) / (ab * 2.0) - y1;
	let yb = (a2 * c3 - a3 * c2) / ab;
	let qa = xb * xb + yb * yb - 1.0;
	let qb = 2.0 * (r1 + xa * xb + ya * yb);
	let qc = xa * xa + ya * ya - r1 * r1;
	let r = -(if qa.abs() > 1e-6 {
		(qb + (qb * qb - 4.0 * qa * qc).max(0.0).sqrt()) / (2.0 * qa)
	} else {
		qc / qb
	});
	Circle::new(x1 + xa + xb * r, y1 + ya + yb * r, r)
}
