//! Hit-mode dispatch: turning player hits into obstacles.
//!
//! Levels define an ordered (or shuffled) list of hit modes. Each resolved
//! hit consumes the mode under the cursor, samples its parameters from the
//! round RNG, and spawns or mutates obstacles. Every config field falls back
//! to a built-in default, so a level that omits keys degrades to the stock
//! appearance for that mode instead of failing mid-round.

use glam::Vec2;
use rand::Rng;
use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use super::obstacle::{
    Deflector, Grow, Morph, Obstacle, ObstacleId, ObstacleSet, PointMark, Spinner,
};
use crate::consts::*;

/// A scalar mode parameter: a fixed value, or a `[lo, hi]` range sampled
/// uniformly per hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    Fixed(f32),
    Range([f32; 2]),
}

impl Param {
    pub fn resolve(&self, rng: &mut Pcg32) -> f32 {
        match *self {
            Param::Fixed(v) => v,
            Param::Range([lo, hi]) => {
                if hi > lo {
                    rng.random_range(lo..hi)
                } else {
                    lo
                }
            }
        }
    }
}

/// How a deflector picks its orientation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Aim {
    /// Fixed or sampled angle, degrees
    Angle(Param),
    /// Along hit − ball, so the wall faces the ball's current position
    #[default]
    AtBall,
    /// Along hit − previous connect dot; falls back to `AtBall` when no dot
    /// has been placed yet
    Chain,
}

/// Map a shape name to a polygon side count. Unknown names degrade to a
/// square.
pub fn shape_sides(name: &str) -> u32 {
    match name {
        "triangle" => 3,
        "square" => 4,
        "pentagon" => 5,
        "hexagon" => 6,
        "heptagon" => 7,
        "octagon" => 8,
        other => {
            log::debug!("unknown shape name {other:?}, using square");
            4
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeflectorConfig {
    pub length: Param,
    pub aim: Aim,
}

impl Default for DeflectorConfig {
    fn default() -> Self {
        Self {
            length: Param::Fixed(DEFLECTOR_LENGTH),
            aim: Aim::AtBall,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinnerConfig {
    pub shape: String,
    pub size: Param,
    /// Degrees per second; the sign is re-rolled per spawn
    pub rotation_speed: Param,
}

impl Default for SpinnerConfig {
    fn default() -> Self {
        Self {
            shape: "triangle".into(),
            size: Param::Fixed(SPINNER_SIZE),
            rotation_speed: Param::Fixed(SPINNER_ROTATION_DEG),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PointConfig {
    pub radius: Param,
}

impl Default for PointConfig {
    fn default() -> Self {
        Self {
            radius: Param::Fixed(POINT_RADIUS),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectConfig {
    /// Maximum dot-to-hit distance that still links into a wall
    pub threshold: f32,
    pub dot_radius: Param,
}

impl Default for ConnectConfig {
    fn default() -> Self {
        Self {
            threshold: CONNECT_THRESHOLD,
            dot_radius: Param::Fixed(POINT_RADIUS),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    pub shapes: Vec<String>,
    pub size: Param,
    pub rotation_speed: Param,
    /// Seconds between shape changes
    pub interval: Param,
    pub pulsate: bool,
    pub pulsate_amount: f32,
}

impl Default for MorphConfig {
    fn default() -> Self {
        Self {
            shapes: vec!["triangle".into(), "square".into(), "hexagon".into()],
            size: Param::Fixed(SPINNER_SIZE),
            rotation_speed: Param::Fixed(SPINNER_ROTATION_DEG),
            interval: Param::Fixed(MORPH_INTERVAL),
            pulsate: false,
            pulsate_amount: PULSATE_AMOUNT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowConfig {
    /// Initial radius
    pub size: Param,
    pub growth_per_hit: f32,
    pub max_size: f32,
    pub decay_rate: f32,
}

impl Default for GrowConfig {
    fn default() -> Self {
        Self {
            size: Param::Fixed(GROW_INITIAL_SIZE),
            growth_per_hit: GROW_PER_HIT,
            max_size: GROW_MAX_SIZE,
            decay_rate: GROW_DECAY_RATE,
        }
    }
}

/// One entry of a level's hit-mode sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HitModeSpec {
    Deflector(DeflectorConfig),
    Spinner(SpinnerConfig),
    Point(PointConfig),
    Connect(ConnectConfig),
    Morph(MorphConfig),
    Grow(GrowConfig),
}

/// Cursor policy when the sequence wraps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SequenceOrder {
    #[default]
    Sequential,
    /// Reshuffled on every wrap
    Shuffled,
}

/// What a dispatched hit actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The hit landed inside an existing grow obstacle and enlarged it
    /// (pre-empts the mode sequence; the cursor does not advance)
    Grew(ObstacleId),
    Spawned(ObstacleId),
    /// Connect linked dot → hit into a new wall
    Chained { wall: ObstacleId, dot: ObstacleId },
    /// Connect found no dot in range and registered the hit as one
    DotPlaced(ObstacleId),
    /// Deflector cap reached; the hit had no effect
    CapReached,
    /// The level defines no hit modes
    NoModes,
}

/// Per-round hit-mode state. Owned by the round instance, never module
/// state, so concurrent rounds cannot interfere.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    modes: Vec<HitModeSpec>,
    order: SequenceOrder,
    cursor: usize,
    max_deflectors: Option<usize>,
    /// Unconsumed connect dots: marker obstacle id + position
    dots: Vec<(ObstacleId, Vec2)>,
    last_dot: Option<Vec2>,
}

impl Dispatcher {
    pub fn new(
        mut modes: Vec<HitModeSpec>,
        order: SequenceOrder,
        max_deflectors: Option<usize>,
        rng: &mut Pcg32,
    ) -> Self {
        if order == SequenceOrder::Shuffled {
            modes.shuffle(rng);
        }
        Self {
            modes,
            order,
            cursor: 0,
            max_deflectors,
            dots: Vec::new(),
            last_dot: None,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Live connect dots, oldest first
    pub fn dots(&self) -> &[(ObstacleId, Vec2)] {
        &self.dots
    }

    /// Resolve one player hit against the obstacle set
    pub fn dispatch(
        &mut self,
        hit: Vec2,
        ball_pos: Vec2,
        set: &mut ObstacleSet,
        rng: &mut Pcg32,
    ) -> DispatchOutcome {
        // Growing an existing obstacle always pre-empts spawning a new one,
        // regardless of the current sequence position.
        if let Some(id) = set.try_grow(hit) {
            log::debug!("hit absorbed by grow obstacle {id}");
            return DispatchOutcome::Grew(id);
        }
        if self.modes.is_empty() {
            return DispatchOutcome::NoModes;
        }

        let spec = self.modes[self.cursor].clone();
        self.advance(rng);

        match spec {
            HitModeSpec::Deflector(cfg) => {
                let angle = self.resolve_aim(&cfg.aim, hit, ball_pos, rng);
                let length = cfg.length.resolve(rng).max(1.0);
                match self.spawn_deflector(set, Deflector::new(hit, angle, length)) {
                    Some(id) => DispatchOutcome::Spawned(id),
                    None => DispatchOutcome::CapReached,
                }
            }
            HitModeSpec::Spinner(cfg) => {
                let sides = shape_sides(&cfg.shape);
                let size = cfg.size.resolve(rng).max(1.0);
                let mut speed = cfg.rotation_speed.resolve(rng);
                // Half the spawns rotate the other way
                if rng.random_bool(0.5) {
                    speed = -speed;
                }
                let id = set.insert(Obstacle::Spinner(Spinner::new(hit, sides, size, speed)));
                DispatchOutcome::Spawned(id)
            }
            HitModeSpec::Point(cfg) => {
                let radius = cfg.radius.resolve(rng).max(1.0);
                let id = set.insert(Obstacle::Point(PointMark::new(hit, radius)));
                DispatchOutcome::Spawned(id)
            }
            HitModeSpec::Connect(cfg) => self.dispatch_connect(&cfg, hit, set, rng),
            HitModeSpec::Morph(cfg) => {
                let shapes: Vec<u32> = if cfg.shapes.is_empty() {
                    vec![3, 4, 6]
                } else {
                    cfg.shapes.iter().map(|s| shape_sides(s)).collect()
                };
                let size = cfg.size.resolve(rng).max(1.0);
                let speed = cfg.rotation_speed.resolve(rng);
                let interval = cfg.interval.resolve(rng);
                let id = set.insert(Obstacle::Morph(Morph::new(
                    hit,
                    shapes,
                    size,
                    speed,
                    interval,
                    cfg.pulsate,
                    cfg.pulsate_amount,
                )));
                DispatchOutcome::Spawned(id)
            }
            HitModeSpec::Grow(cfg) => {
                let size = cfg.size.resolve(rng).max(1.0);
                let id = set.insert(Obstacle::Grow(Grow::new(
                    hit,
                    size,
                    cfg.max_size,
                    cfg.growth_per_hit,
                    cfg.decay_rate,
                )));
                DispatchOutcome::Spawned(id)
            }
        }
    }

    fn advance(&mut self, rng: &mut Pcg32) {
        self.cursor += 1;
        if self.cursor >= self.modes.len() {
            self.cursor = 0;
            if self.order == SequenceOrder::Shuffled {
                self.modes.shuffle(rng);
            }
        }
    }

    fn resolve_aim(&self, aim: &Aim, hit: Vec2, ball_pos: Vec2, rng: &mut Pcg32) -> f32 {
        match aim {
            Aim::Angle(p) => p.resolve(rng).to_radians(),
            Aim::AtBall => {
                let span = hit - ball_pos;
                if span.length_squared() < 1e-6 {
                    rng.random_range(0.0..TAU)
                } else {
                    span.y.atan2(span.x)
                }
            }
            Aim::Chain => match self.last_dot {
                Some(prev) if (hit - prev).length_squared() > 1e-6 => {
                    let span = hit - prev;
                    span.y.atan2(span.x)
                }
                _ => self.resolve_aim(&Aim::AtBall, hit, ball_pos, rng),
            },
        }
    }

    /// Spawn a deflector unless the level's cap is already reached. The cap
    /// counts every live deflector, connect walls included.
    fn spawn_deflector(&self, set: &mut ObstacleSet, deflector: Deflector) -> Option<ObstacleId> {
        if let Some(cap) = self.max_deflectors {
            if set.deflector_count() >= cap {
                log::debug!("deflector cap {cap} reached, hit dropped");
                return None;
            }
        }
        Some(set.insert(Obstacle::Deflector(deflector)))
    }

    fn dispatch_connect(
        &mut self,
        cfg: &ConnectConfig,
        hit: Vec2,
        set: &mut ObstacleSet,
        rng: &mut Pcg32,
    ) -> DispatchOutcome {
        let nearest = self
            .dots
            .iter()
            .enumerate()
            .map(|(i, &(id, pos))| (i, id, pos, pos.distance(hit)))
            .filter(|&(_, _, _, dist)| dist <= cfg.threshold)
            .min_by(|a, b| a.3.partial_cmp(&b.3).unwrap_or(std::cmp::Ordering::Equal));

        if let Some((idx, dot_id, dot_pos, _)) = nearest {
            if let Some(wall) = self.spawn_deflector(set, Deflector::from_endpoints(dot_pos, hit)) {
                let _ = self.dots.remove(idx);
                let _ = set.remove(dot_id);
                let marker = self.place_dot(cfg, hit, set, rng);
                return DispatchOutcome::Chained { wall, dot: marker };
            }
            // Cap reached: the wall is dropped but the hit still registers
            // as a dot so the chain can continue later.
        }
        let marker = self.place_dot(cfg, hit, set, rng);
        DispatchOutcome::DotPlaced(marker)
    }

    fn place_dot(
        &mut self,
        cfg: &ConnectConfig,
        hit: Vec2,
        set: &mut ObstacleSet,
        rng: &mut Pcg32,
    ) -> ObstacleId {
        let radius = cfg.dot_radius.resolve(rng).max(1.0);
        let marker = set.insert(Obstacle::Point(PointMark::new(hit, radius)));
        self.dots.push((marker, hit));
        self.last_dot = Some(hit);
        marker
    }
}
