//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::vertex::{Vertex, fade};
use crate::sim::geometry::Dome;

/// Fading ribbon along a trail (newest point first)
pub fn trail(points: &[Vec2], width: f32, color: [f32; 4]) -> Vec<Vertex> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut vertices = Vec::with_capacity(points.len() * 6);
    let len = points.len() as f32;

    for i in 0..points.len() - 1 {
        let p1 = points[i];
        let p2 = points[i + 1];

        // Older points are thinner and more transparent
        let t1 = i as f32 / len;
        let t2 = (i + 1) as f32 / len;
        let color1 = fade(color, 1.0 - t1);
        let color2 = fade(color, 1.0 - t2);
        let width1 = width * (1.0 - t1 * 0.7);
        let width2 = width * (1.0 - t2 * 0.7);

        let dir = (p2 - p1).normalize_or_zero();
        let perp = Vec2::new(-dir.y, dir.x);

        let v1a = p1 + perp * width1;
        let v1b = p1 - perp * width1;
        let v2a = p2 + perp * width2;
        let v2b = p2 - perp * width2;

        vertices.push(Vertex::new(v1a.x, v1a.y, color1));
        vertices.push(Vertex::new(v1b.x, v1b.y, color1));
        vertices.push(Vertex::new(v2a.x, v2a.y, color2));

        vertices.push(Vertex::new(v2a.x, v2a.y, color2));
        vertices.push(Vertex::new(v1b.x, v1b.y, color1));
        vertices.push(Vertex::new(v2b.x, v2b.y, color2));
    }

    vertices
}

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Elliptical band; `thickness` is measured inward from the outer radii
pub fn ellipse_ring(
    center: Vec2,
    radii: Vec2,
    thickness: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);
    let inner_radii = (radii - Vec2::splat(thickness)).max(Vec2::ZERO);
    let at = |r: Vec2, theta: f32| center + Vec2::new(r.x * theta.cos(), r.y * theta.sin());

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        let inner1 = at(inner_radii, theta1);
        let outer1 = at(radii, theta1);
        let inner2 = at(inner_radii, theta2);
        let outer2 = at(radii, theta2);

        vertices.push(Vertex::new(inner1.x, inner1.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(inner2.x, inner2.y, color));

        vertices.push(Vertex::new(inner2.x, inner2.y, color));
        vertices.push(Vertex::new(outer1.x, outer1.y, color));
        vertices.push(Vertex::new(outer2.x, outer2.y, color));
    }

    vertices
}

/// Generate vertices for a ring (hollow circle)
pub fn ring(
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) -> Vec<Vertex> {
    ellipse_ring(
        center,
        Vec2::splat(outer_radius),
        outer_radius - inner_radius,
        color,
        segments,
    )
}

/// Axis-aligned filled rectangle around `center`
pub fn rect(center: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let h = size * 0.5;
    let (l, r, t, b) = (center.x - h.x, center.x + h.x, center.y - h.y, center.y + h.y);
    vec![
        Vertex::new(l, t, color),
        Vertex::new(r, t, color),
        Vertex::new(l, b, color),
        Vertex::new(l, b, color),
        Vertex::new(r, t, color),
        Vertex::new(r, b, color),
    ]
}

/// Filled shield dome: a fan from the base line up to the Bézier outline
pub fn dome(dome: &Dome, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 6) as usize);
    let left = dome.center_x - dome.radius;
    let step = 2.0 * dome.radius / segments as f32;

    for i in 0..segments {
        let x1 = left + i as f32 * step;
        let x2 = (x1 + step).min(left + 2.0 * dome.radius);
        let (Some(y1), Some(y2)) = (dome.surface_y(x1), dome.surface_y(x2)) else {
            continue;
        };
        let base = dome.base_y;

        vertices.push(Vertex::new(x1, base, color));
        vertices.push(Vertex::new(x1, y1, color));
        vertices.push(Vertex::new(x2, y2, color));

        vertices.push(Vertex::new(x1, base, color));
        vertices.push(Vertex::new(x2, y2, color));
        vertices.push(Vertex::new(x2, base, color));
    }

    vertices
}
