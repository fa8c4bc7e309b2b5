//! Obstacle kinds and the round-scoped obstacle registry.
//!
//! Every kind exposes the same two capabilities: a per-tick update hook and a
//! collision test against a circle. The registry keeps all obstacles in one
//! flat list grouped by kind rank, so a single forward scan reproduces the
//! fixed check priority (spinners, deflectors, points, morphs, grows).
//!
//! Obstacles never reference the ball or each other; they are owned by the
//! round and cleared with it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{
    Hit, circle_vs_circle, circle_vs_segment, orient_away_from, point_in_circle,
};
use crate::consts::PULSATE_RATE;
use crate::{unit_from_angle, wrap_angle};

pub type ObstacleId = u32;

/// What an obstacle wants after its update hook ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fate {
    Alive,
    /// Remove this obstacle from the registry (grow decay only)
    Expired,
}

/// Vertices of a regular N-gon: `center + size * (cos θᵢ, sin θᵢ)` with
/// `θᵢ = base_angle + i·2π/N`
pub fn polygon_vertices(center: Vec2, sides: u32, size: f32, base_angle: f32) -> Vec<Vec2> {
    let step = std::f32::consts::TAU / sides as f32;
    (0..sides)
        .map(|i| center + unit_from_angle(base_angle + i as f32 * step) * size)
        .collect()
}

/// First polygon edge overlapping the circle, wrapping consecutive vertex
/// pairs. Fallback normals are re-oriented away from the polygon center so an
/// exactly-on-edge ball is never reflected into the shape.
fn polygon_vs_circle(vertices: &[Vec2], center: Vec2, pos: Vec2, radius: f32) -> Option<Hit> {
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        if let Some(hit) = circle_vs_segment(a, b, pos, radius) {
            let normal = orient_away_from(hit.normal, pos, center);
            return Some(Hit { normal, ..hit });
        }
    }
    None
}

/// A static line-segment wall placed by the player. Immutable once placed;
/// cleared only on round reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deflector {
    pub center: Vec2,
    /// Orientation in radians
    pub angle: f32,
    pub length: f32,
}

impl Deflector {
    pub fn new(center: Vec2, angle: f32, length: f32) -> Self {
        debug_assert!(length > 0.0, "deflector with non-positive length");
        Self {
            center,
            angle,
            length,
        }
    }

    /// Segment spanning `a` to `b`, as spawned by connect mode
    pub fn from_endpoints(a: Vec2, b: Vec2) -> Self {
        let span = b - a;
        Self {
            center: (a + b) / 2.0,
            angle: span.y.atan2(span.x),
            length: span.length(),
        }
    }

    pub fn endpoints(&self) -> (Vec2, Vec2) {
        let half = unit_from_angle(self.angle) * (self.length / 2.0);
        (self.center - half, self.center + half)
    }

    pub fn collide_circle(&self, pos: Vec2, radius: f32) -> Option<Hit> {
        let (a, b) = self.endpoints();
        // A bare segment has no interior; either perpendicular separates.
        circle_vs_segment(a, b, pos, radius)
    }
}

/// A rotating regular polygon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spinner {
    pub center: Vec2,
    pub sides: u32,
    /// Circumradius
    pub size: f32,
    /// Current rotation, radians in [0, 2π)
    pub angle: f32,
    /// Signed, degrees per second
    pub rotation_speed: f32,
}

impl Spinner {
    pub fn new(center: Vec2, sides: u32, size: f32, rotation_speed: f32) -> Self {
        debug_assert!(sides >= 3, "polygon needs at least 3 sides");
        debug_assert!(size > 0.0, "spinner with non-positive size");
        Self {
            center,
            sides,
            size,
            angle: 0.0,
            rotation_speed,
        }
    }

    pub fn rotate(&mut self, dt: f32) {
        self.angle = wrap_angle(self.angle + self.rotation_speed.to_radians() * dt);
    }

    pub fn vertices(&self) -> Vec<Vec2> {
        polygon_vertices(self.center, self.sides, self.size, self.angle)
    }

    pub fn collide_circle(&self, pos: Vec2, radius: f32) -> Option<Hit> {
        polygon_vs_circle(&self.vertices(), self.center, pos, radius)
    }
}

/// A spinner that cycles through a list of side counts on a fixed interval
/// and may pulsate its radius sinusoidally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Morph {
    pub center: Vec2,
    /// Side counts cycled through in order; never empty
    pub shapes: Vec<u32>,
    pub shape_index: usize,
    /// Base circumradius (pulsation scales around this)
    pub size: f32,
    pub angle: f32,
    /// Signed, degrees per second
    pub rotation_speed: f32,
    /// Seconds between shape changes
    pub morph_interval: f32,
    morph_timer: f32,
    pub pulsate: bool,
    pub pulsate_amount: f32,
    pulsate_phase: f32,
}

impl Morph {
    pub fn new(
        center: Vec2,
        shapes: Vec<u32>,
        size: f32,
        rotation_speed: f32,
        morph_interval: f32,
        pulsate: bool,
        pulsate_amount: f32,
    ) -> Self {
        debug_assert!(size > 0.0, "morph with non-positive size");
        let shapes = if shapes.is_empty() { vec![4] } else { shapes };
        Self {
            center,
            shapes,
            shape_index: 0,
            size,
            angle: 0.0,
            rotation_speed,
            morph_interval: morph_interval.max(0.05),
            morph_timer: 0.0,
            pulsate,
            pulsate_amount,
            pulsate_phase: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.angle = wrap_angle(self.angle + self.rotation_speed.to_radians() * dt);
        self.morph_timer += dt;
        while self.morph_timer >= self.morph_interval {
            self.morph_timer -= self.morph_interval;
            self.shape_index = (self.shape_index + 1) % self.shapes.len();
        }
        if self.pulsate {
            self.pulsate_phase += PULSATE_RATE * dt;
        }
    }

    /// Side count of the current shape
    pub fn sides(&self) -> u32 {
        self.shapes[self.shape_index]
    }

    /// Circumradius after pulsation
    pub fn effective_size(&self) -> f32 {
        if self.pulsate {
            self.size * (1.0 + self.pulsate_phase.sin() * self.pulsate_amount)
        } else {
            self.size
        }
    }

    pub fn vertices(&self) -> Vec<Vec2> {
        polygon_vertices(self.center, self.sides(), self.effective_size(), self.angle)
    }

    pub fn collide_circle(&self, pos: Vec2, radius: f32) -> Option<Hit> {
        polygon_vs_circle(&self.vertices(), self.center, pos, radius)
    }
}

/// A circle that enlarges when hit again and optionally decays away
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grow {
    pub center: Vec2,
    /// Current radius
    pub size: f32,
    pub max_size: f32,
    /// Fractional enlargement applied per absorbed hit
    pub growth_per_hit: f32,
    /// Radius lost per second; zero disables decay
    pub decay_rate: f32,
}

impl Grow {
    pub fn new(center: Vec2, size: f32, max_size: f32, growth_per_hit: f32, decay_rate: f32) -> Self {
        debug_assert!(size > 0.0, "grow obstacle with non-positive size");
        Self {
            center,
            size: size.min(max_size),
            max_size,
            growth_per_hit,
            decay_rate,
        }
    }

    /// Absorb a hit landing inside the current radius: grow, capped at
    /// `max_size`. Returns whether the hit was absorbed.
    pub fn try_grow(&mut self, hit: Vec2) -> bool {
        if !point_in_circle(hit, self.center, self.size) {
            return false;
        }
        self.size = (self.size * (1.0 + self.growth_per_hit)).min(self.max_size);
        true
    }

    pub fn update(&mut self, dt: f32) -> Fate {
        self.size -= self.decay_rate * dt;
        if self.size <= 0.0 {
            Fate::Expired
        } else {
            Fate::Alive
        }
    }

    pub fn collide_circle(&self, pos: Vec2, radius: f32) -> Option<Hit> {
        circle_vs_circle(pos, radius, self.center, self.size)
    }
}

/// A static circular marker; also the dot vertex used by connect mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PointMark {
    pub center: Vec2,
    pub radius: f32,
}

impl PointMark {
    pub fn new(center: Vec2, radius: f32) -> Self {
        debug_assert!(radius > 0.0, "point marker with non-positive radius");
        Self { center, radius }
    }

    pub fn collide_circle(&self, pos: Vec2, radius: f32) -> Option<Hit> {
        circle_vs_circle(pos, radius, self.center, self.radius)
    }
}

/// The five obstacle kinds behind one uniform capability
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Obstacle {
    Spinner(Spinner),
    Deflector(Deflector),
    Point(PointMark),
    Morph(Morph),
    Grow(Grow),
}

impl Obstacle {
    /// Scan priority group; lower ranks are checked first. Matches the legacy
    /// check order: spinners, deflectors, points, morphs, grows.
    pub fn kind_rank(&self) -> u8 {
        match self {
            Obstacle::Spinner(_) => 0,
            Obstacle::Deflector(_) => 1,
            Obstacle::Point(_) => 2,
            Obstacle::Morph(_) => 3,
            Obstacle::Grow(_) => 4,
        }
    }

    /// Per-tick hook; a no-op for deflectors and points
    pub fn update(&mut self, dt: f32) -> Fate {
        match self {
            Obstacle::Spinner(s) => {
                s.rotate(dt);
                Fate::Alive
            }
            Obstacle::Morph(m) => {
                m.update(dt);
                Fate::Alive
            }
            Obstacle::Grow(g) => g.update(dt),
            Obstacle::Deflector(_) | Obstacle::Point(_) => Fate::Alive,
        }
    }

    pub fn collide_circle(&self, pos: Vec2, radius: f32) -> Option<Hit> {
        match self {
            Obstacle::Spinner(s) => s.collide_circle(pos, radius),
            Obstacle::Deflector(d) => d.collide_circle(pos, radius),
            Obstacle::Point(p) => p.collide_circle(pos, radius),
            Obstacle::Morph(m) => m.collide_circle(pos, radius),
            Obstacle::Grow(g) => g.collide_circle(pos, radius),
        }
    }
}

/// An obstacle with its round-scoped id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placed {
    pub id: ObstacleId,
    pub obstacle: Obstacle,
}

/// Round-scoped obstacle collection.
///
/// The list stays grouped by kind rank (stable within a rank), so one forward
/// pass both preserves the legacy check priority and keeps iteration
/// deterministic. No spatial index: counts stay in the tens, an O(n) scan per
/// tick is fine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObstacleSet {
    placed: Vec<Placed>,
    next_id: ObstacleId,
}

impl ObstacleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, obstacle: Obstacle) -> ObstacleId {
        let id = self.next_id;
        self.next_id += 1;
        let rank = obstacle.kind_rank();
        let at = self
            .placed
            .partition_point(|p| p.obstacle.kind_rank() <= rank);
        self.placed.insert(at, Placed { id, obstacle });
        id
    }

    pub fn remove(&mut self, id: ObstacleId) -> bool {
        let before = self.placed.len();
        self.placed.retain(|p| p.id != id);
        self.placed.len() != before
    }

    pub fn get(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.placed.iter().find(|p| p.id == id).map(|p| &p.obstacle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placed> {
        self.placed.iter()
    }

    pub fn len(&self) -> usize {
        self.placed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    pub fn deflector_count(&self) -> usize {
        self.placed
            .iter()
            .filter(|p| matches!(p.obstacle, Obstacle::Deflector(_)))
            .count()
    }

    /// Enlarge the first grow obstacle containing `hit`, if any. Checked
    /// before the dispatcher spawns anything, so repeated hits enlarge an
    /// existing obstacle instead of stacking duplicates.
    pub fn try_grow(&mut self, hit: Vec2) -> Option<ObstacleId> {
        for p in &mut self.placed {
            if let Obstacle::Grow(g) = &mut p.obstacle {
                if g.try_grow(hit) {
                    return Some(p.id);
                }
            }
        }
        None
    }

    /// First obstacle overlapping the circle, in check-priority order
    pub fn first_collision(&self, pos: Vec2, radius: f32) -> Option<(ObstacleId, Hit)> {
        for p in &self.placed {
            if let Some(hit) = p.obstacle.collide_circle(pos, radius) {
                return Some((p.id, hit));
            }
        }
        None
    }

    /// Run every update hook and drop expired obstacles
    pub fn update(&mut self, dt: f32) {
        self.placed.retain_mut(|p| {
            let fate = p.obstacle.update(dt);
            if fate == Fate::Expired {
                log::debug!("obstacle {} decayed away", p.id);
            }
            fate == Fate::Alive
        });
    }
}
