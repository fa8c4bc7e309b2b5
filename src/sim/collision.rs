//! Stateless collision primitives shared by every obstacle kind.
//!
//! One reflection law across all collidable shapes: every test reports a unit
//! normal pointing from the obstacle toward the ball plus a penetration
//! depth, which `Ball::reflect` consumes unchanged. Degenerate geometry
//! (zero-length segments, exact center overlap) resolves to documented
//! fallback normals instead of dividing by zero.

use glam::Vec2;

/// Below this squared length a segment is treated as a point and a distance
/// as an exact overlap.
const DEGENERATE_EPSILON: f32 = 1e-4;

/// A resolved contact: unit normal (obstacle toward ball) and overlap depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub normal: Vec2,
    pub penetration: f32,
}

/// Closest point to `point` on the segment `a`..`b`. A degenerate segment
/// collapses to `a`.
pub fn closest_point_on_segment(a: Vec2, b: Vec2, point: Vec2) -> Vec2 {
    let seg = b - a;
    let len_sq = seg.length_squared();
    if len_sq < DEGENERATE_EPSILON {
        return a;
    }
    let t = ((point - a).dot(seg) / len_sq).clamp(0.0, 1.0);
    a + seg * t
}

/// Distance from `point` to the segment `a`..`b`
pub fn point_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    (point - closest_point_on_segment(a, b, point)).length()
}

/// Is `point` inside the circle?
#[inline]
pub fn point_in_circle(point: Vec2, center: Vec2, radius: f32) -> bool {
    (point - center).length_squared() <= radius * radius
}

/// Check a circle against a line segment.
///
/// Projects the circle center onto the segment with the parameter clamped to
/// [0, 1], so the endpoints act as caps rather than extending to an infinite
/// line. When the center sits exactly on the segment there is no direction to
/// push along; the fallback normal is the segment's left perpendicular with
/// full-radius penetration. Callers whose segment bounds an interior (polygon
/// edges) must re-orient that fallback with [`orient_away_from`] so the ball
/// is never reflected into the shape.
pub fn circle_vs_segment(a: Vec2, b: Vec2, center: Vec2, radius: f32) -> Option<Hit> {
    let closest = closest_point_on_segment(a, b, center);
    let offset = center - closest;
    let dist = offset.length();
    if dist >= radius {
        return None;
    }
    if dist * dist < DEGENERATE_EPSILON {
        let seg = b - a;
        let normal = if seg.length_squared() < DEGENERATE_EPSILON {
            Vec2::X
        } else {
            Vec2::new(-seg.y, seg.x).normalize()
        };
        return Some(Hit {
            normal,
            penetration: radius,
        });
    }
    Some(Hit {
        normal: offset / dist,
        penetration: radius - dist,
    })
}

/// Check circle `a` (the ball) against circle `b` (the obstacle). The normal
/// points from `b` toward `a`; exact center overlap pushes along +X.
pub fn circle_vs_circle(
    center_a: Vec2,
    radius_a: f32,
    center_b: Vec2,
    radius_b: f32,
) -> Option<Hit> {
    let offset = center_a - center_b;
    let dist = offset.length();
    let reach = radius_a + radius_b;
    if dist >= reach {
        return None;
    }
    if dist * dist < DEGENERATE_EPSILON {
        return Some(Hit {
            normal: Vec2::X,
            penetration: reach,
        });
    }
    Some(Hit {
        normal: offset / dist,
        penetration: reach - dist,
    })
}

/// Flip `normal` if it points toward `interior`, judged at the contact
/// position `at`. Used to orient fallback normals away from a shape's own
/// center.
pub fn orient_away_from(normal: Vec2, at: Vec2, interior: Vec2) -> Vec2 {
    if normal.dot(at - interior) < 0.0 {
        -normal
    } else {
        normal
    }
}
