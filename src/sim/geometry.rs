//! Shape tests used by collision resolution and target selection
//!
//! Everything here is a pure function over points, so the resolver can stay a
//! flat list of "does this shape absorb the hit" checks.

use glam::Vec2;

/// Strict point-in-circle test
#[inline]
pub fn in_circle(p: Vec2, center: Vec2, radius: f32) -> bool {
    (p - center).length() < radius
}

/// Point inside an axis-aligned ellipse
#[inline]
pub fn in_ellipse(p: Vec2, center: Vec2, rx: f32, ry: f32) -> bool {
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let d = p - center;
    (d.x / rx).powi(2) + (d.y / ry).powi(2) <= 1.0
}

/// Axis-aligned box given by its center and half extents
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center: Vec2,
    pub half: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self {
            center,
            half: size * 0.5,
        }
    }

    /// Grow the box on every side
    pub fn inflate(self, by: f32) -> Self {
        Self {
            center: self.center,
            half: self.half + Vec2::splat(by),
        }
    }

    pub fn contains(&self, p: Vec2) -> bool {
        let d = (p - self.center).abs();
        d.x <= self.half.x && d.y <= self.half.y
    }
}

/// Point on a quadratic Bézier curve
#[inline]
pub fn quad_bezier(p0: Vec2, p1: Vec2, p2: Vec2, t: f32) -> Vec2 {
    let u = 1.0 - t;
    p0 * (u * u) + p1 * (2.0 * u * t) + p2 * (t * t)
}

/// Shield dome over a ground base
///
/// The outline is a quadratic Bézier from `(cx - r, base_y)` over a control
/// point at `(cx, base_y - 2h)` to `(cx + r, base_y)`, which peaks at `h` above
/// the base line. It is flatter than a circle of radius `r`, so a point can be
/// inside `r` of the center and still miss the dome.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dome {
    pub center_x: f32,
    pub base_y: f32,
    pub radius: f32,
    pub height: f32,
}

impl Dome {
    /// Height of the dome outline at horizontal position `x`, or None outside
    /// the span
    pub fn surface_y(&self, x: f32) -> Option<f32> {
        let left = self.center_x - self.radius;
        let right = self.center_x + self.radius;
        if x < left || x > right || self.radius <= 0.0 {
            return None;
        }
        // x(t) is linear in t for a symmetric control point
        let t = (x - left) / (2.0 * self.radius);
        let p0 = Vec2::new(left, self.base_y);
        let p1 = Vec2::new(self.center_x, self.base_y - 2.0 * self.height);
        let p2 = Vec2::new(right, self.base_y);
        Some(quad_bezier(p0, p1, p2, t).y)
    }

    /// Whether a point lies under the dome (y grows downward)
    pub fn contains(&self, p: Vec2) -> bool {
        match self.surface_y(p.x) {
            Some(y) => p.y >= y,
            None => false,
        }
    }
}

/// Index of the point nearest to `from`, if any
pub fn nearest<I>(from: Vec2, candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = (usize, Vec2)>,
{
    candidates
        .into_iter()
        .min_by(|a, b| {
            a.1.distance_squared(from)
                .partial_cmp(&b.1.distance_squared(from))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(i, _)| i)
}
