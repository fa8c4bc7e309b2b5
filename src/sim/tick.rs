//! Round state and the per-tick orchestration loop.
//!
//! One `update(dt)` call per rendered frame: body integration, boundary/gap
//! test, at most one obstacle collision resolution, then per-obstacle update
//! hooks. Input hits are applied by the caller during the same frame's input
//! pass via [`Round::player_hit`]. Everything is synchronous; a retrieval
//! pause is just the caller setting the pause flag (or not calling in).

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::ball::Ball;
use super::boundary::{Boundary, Contact, Edge};
use super::collision::point_in_circle;
use super::dispatch::{DispatchOutcome, Dispatcher, shape_sides};
use super::obstacle::{Obstacle, ObstacleSet, Spinner};
use crate::level::LevelConfig;
use crate::unit_from_angle;

/// Terminal result of a round. Elapsed seconds are the score either way.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Outcome {
    /// The ball slipped through a gap: loss
    Escaped { elapsed: f32, edge: Edge },
    /// The containment held for the whole round: win
    TimeLimitReached { elapsed: f32 },
}

/// One containment round. Owns its ball, boundary, obstacles and dispatcher
/// exclusively; reset means constructing a fresh round.
#[derive(Debug, Clone)]
pub struct Round {
    ball: Ball,
    boundary: Boundary,
    obstacles: ObstacleSet,
    dispatcher: Dispatcher,
    rng: Pcg32,
    elapsed: f32,
    time_limit: f32,
    speed_penalty: f32,
    paused: bool,
    outcome: Option<Outcome>,
}

impl Round {
    /// Build a round from a level the caller has already validated
    pub fn new(level: &LevelConfig, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let start = level
            .ball
            .start
            .map(Vec2::from)
            .unwrap_or_else(|| Vec2::new(level.width / 2.0, level.height / 2.0));
        let dir_deg = level
            .ball
            .direction_deg
            .unwrap_or_else(|| rng.random_range(0.0..360.0));
        let ball = Ball::new(
            start,
            unit_from_angle(dir_deg.to_radians()),
            level.ball.speed,
            level.ball.radius,
        );

        let boundary = Boundary::new(level.width, level.height, level.gaps.clone());

        let mut obstacles = ObstacleSet::new();
        for placement in &level.spinners {
            let _ = obstacles.insert(Obstacle::Spinner(Spinner::new(
                Vec2::from(placement.pos),
                shape_sides(&placement.shape),
                placement.size.max(1.0),
                placement.rotation_speed,
            )));
        }

        let dispatcher = Dispatcher::new(
            level.hit_modes.clone(),
            level.order,
            level.max_deflectors,
            &mut rng,
        );

        log::info!(
            "round started: {}x{} field, {} gaps, {} initial spinners, {} hit modes, seed {seed}",
            level.width,
            level.height,
            boundary.gaps().len(),
            obstacles.len(),
            level.hit_modes.len(),
        );

        Self {
            ball,
            boundary,
            obstacles,
            dispatcher,
            rng,
            elapsed: 0.0,
            time_limit: level.time_limit,
            speed_penalty: level.speed_penalty,
            paused: false,
            outcome: None,
        }
    }

    pub fn ball(&self) -> &Ball {
        &self.ball
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn obstacles(&self) -> &ObstacleSet {
        &self.obstacles
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Retrieval pause: while set, hits are ignored and `update` is a no-op
    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Apply one player hit. A hit landing on the ball itself applies the
    /// direct-hit speed penalty before the dispatcher resolves it. Returns
    /// `None` while the round is paused or finished.
    pub fn player_hit(&mut self, hit: Vec2) -> Option<DispatchOutcome> {
        if self.paused || self.outcome.is_some() {
            return None;
        }
        if point_in_circle(hit, self.ball.pos, self.ball.radius) {
            self.ball.apply_speed_penalty(self.speed_penalty);
            log::debug!(
                "direct hit on the ball, speed multiplier now {:.2}",
                self.ball.speed_multiplier()
            );
        }
        Some(
            self.dispatcher
                .dispatch(hit, self.ball.pos, &mut self.obstacles, &mut self.rng),
        )
    }

    /// Advance the round by one fixed timestep
    pub fn update(&mut self, dt: f32) {
        if self.paused || self.outcome.is_some() {
            return;
        }

        self.ball.integrate(dt);

        // Walls and gaps have check priority over obstacles; a wall bounce
        // consumes this tick's single resolution slot.
        match self.boundary.resolve(&mut self.ball) {
            Some(Contact::Escaped(edge)) => {
                self.outcome = Some(Outcome::Escaped {
                    elapsed: self.elapsed,
                    edge,
                });
                log::info!(
                    "ball escaped through the {edge:?} edge after {:.1}s",
                    self.elapsed
                );
                return;
            }
            Some(Contact::Bounced(_)) => {}
            None => {
                // First contact in check order wins; the rest of the scan is
                // skipped. A ball wedged between two obstacles therefore
                // resolves one contact per tick - kept for parity with the
                // original engine, which had the same limitation.
                if let Some((_, hit)) = self
                    .obstacles
                    .first_collision(self.ball.pos, self.ball.radius)
                {
                    self.ball.reflect(hit.normal, hit.penetration);
                }
            }
        }

        self.obstacles.update(dt);

        self.elapsed += dt;
        if self.elapsed >= self.time_limit {
            self.outcome = Some(Outcome::TimeLimitReached {
                elapsed: self.elapsed,
            });
            log::info!(
                "containment held for {:.1}s ({} bounces)",
                self.elapsed,
                self.ball.bounce_count
            );
        }
    }

    /// Owned, serializable copy of everything a renderer needs, taken once
    /// per frame after `update`. Live state is never handed out mutably.
    pub fn snapshot(&self) -> RoundSnapshot {
        let obstacles = self
            .obstacles
            .iter()
            .map(|p| match &p.obstacle {
                Obstacle::Deflector(d) => {
                    let (start, end) = d.endpoints();
                    ObstacleSnapshot::Segment {
                        id: p.id,
                        start,
                        end,
                    }
                }
                Obstacle::Spinner(s) => ObstacleSnapshot::Polygon {
                    id: p.id,
                    center: s.center,
                    vertices: s.vertices(),
                    rotation: s.angle,
                },
                Obstacle::Morph(m) => ObstacleSnapshot::Polygon {
                    id: p.id,
                    center: m.center,
                    vertices: m.vertices(),
                    rotation: m.angle,
                },
                Obstacle::Grow(g) => ObstacleSnapshot::Circle {
                    id: p.id,
                    center: g.center,
                    radius: g.size,
                },
                Obstacle::Point(pt) => ObstacleSnapshot::Circle {
                    id: p.id,
                    center: pt.center,
                    radius: pt.radius,
                },
            })
            .collect();

        RoundSnapshot {
            ball: BallSnapshot {
                pos: self.ball.pos,
                dir: self.ball.vel.normalize_or_zero(),
                speed: self.ball.speed(),
                radius: self.ball.radius,
                bounce_count: self.ball.bounce_count,
            },
            obstacles,
            elapsed: self.elapsed,
            outcome: self.outcome,
        }
    }
}

/// Read-only ball state for rendering/HUD
#[derive(Debug, Clone, Serialize)]
pub struct BallSnapshot {
    pub pos: Vec2,
    pub dir: Vec2,
    pub speed: f32,
    pub radius: f32,
    pub bounce_count: u32,
}

/// Read-only obstacle geometry for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum ObstacleSnapshot {
    Segment { id: u32, start: Vec2, end: Vec2 },
    Polygon {
        id: u32,
        center: Vec2,
        vertices: Vec<Vec2>,
        rotation: f32,
    },
    Circle { id: u32, center: Vec2, radius: f32 },
}

/// Everything a frame needs to draw, decoupled from live state
#[derive(Debug, Clone, Serialize)]
pub struct RoundSnapshot {
    pub ball: BallSnapshot,
    pub obstacles: Vec<ObstacleSnapshot>,
    pub elapsed: f32,
    pub outcome: Option<Outcome>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::level::{BallConfig, LevelConfig};
    use crate::sim::boundary::Gap;
    use crate::sim::dispatch::{HitModeSpec, PointConfig};
    use crate::sim::obstacle::Deflector;
    use std::f32::consts::FRAC_PI_2;

    fn solid_level(speed: f32, radius: f32) -> LevelConfig {
        LevelConfig {
            ball: BallConfig {
                start: Some([400.0, 300.0]),
                direction_deg: Some(0.0),
                speed,
                radius,
            },
            ..LevelConfig::default()
        }
    }

    #[test]
    fn test_deflector_reflects_ball_head_on() {
        // Ball at (400,300) r=20 moving +x at 100 toward a vertical wall at
        // x=410 spanning y in [280,320].
        let level = solid_level(100.0, 20.0);
        let mut round = Round::new(&level, 1);
        let _ = round.obstacles.insert(Obstacle::Deflector(Deflector::new(
            Vec2::new(410.0, 300.0),
            FRAC_PI_2,
            40.0,
        )));

        round.update(SIM_DT);

        let ball = round.ball();
        assert!(ball.vel.x < 0.0);
        assert!(ball.vel.y.abs() < 1e-4);
        assert!((ball.speed() - 100.0).abs() < 1e-3);
        // Push-out separated the shapes
        assert!(ball.pos.x <= 410.0 - 20.0 - 1.0 + 1e-3);
        assert_eq!(ball.bounce_count, 1);
    }

    #[test]
    fn test_escape_finishes_round() {
        let mut level = solid_level(200.0, 10.0);
        level.gaps = vec![Gap {
            edge: crate::sim::Edge::Top,
            start_fraction: 0.4,
            width: 160.0,
        }];
        // Straight up through the middle of the gap
        level.ball.direction_deg = Some(270.0);
        let mut round = Round::new(&level, 1);

        for _ in 0..10_000 {
            round.update(SIM_DT);
            if round.outcome().is_some() {
                break;
            }
        }
        match round.outcome() {
            Some(Outcome::Escaped { edge, elapsed }) => {
                assert_eq!(edge, crate::sim::Edge::Top);
                assert!(elapsed > 0.0);
            }
            other => panic!("expected escape, got {other:?}"),
        }

        // Finished rounds are inert
        let elapsed = round.elapsed();
        round.update(SIM_DT);
        assert_eq!(round.elapsed(), elapsed);
        assert!(round.player_hit(Vec2::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_solid_round_ends_on_timer() {
        let mut level = solid_level(200.0, 10.0);
        level.time_limit = 0.5;
        let mut round = Round::new(&level, 3);

        for _ in 0..((0.6 / SIM_DT) as usize) {
            round.update(SIM_DT);
        }
        assert!(matches!(
            round.outcome(),
            Some(Outcome::TimeLimitReached { .. })
        ));
    }

    #[test]
    fn test_direct_hit_applies_penalty_then_dispatches() {
        let mut level = solid_level(200.0, 20.0);
        level.hit_modes = vec![HitModeSpec::Point(PointConfig::default())];
        let mut round = Round::new(&level, 5);

        let outcome = round.player_hit(Vec2::new(400.0, 300.0)).unwrap();
        assert!(matches!(outcome, DispatchOutcome::Spawned(_)));
        assert!((round.ball().speed_multiplier() - 1.25).abs() < 1e-5);
        assert!((round.ball().speed() - 250.0).abs() < 1e-3);

        // A miss leaves the multiplier alone
        let _ = round.player_hit(Vec2::new(100.0, 100.0)).unwrap();
        assert!((round.ball().speed_multiplier() - 1.25).abs() < 1e-5);
    }

    #[test]
    fn test_pause_gates_hits_and_updates() {
        let mut level = solid_level(200.0, 10.0);
        level.hit_modes = vec![HitModeSpec::Point(PointConfig::default())];
        let mut round = Round::new(&level, 8);

        round.set_paused(true);
        assert!(round.player_hit(Vec2::new(100.0, 100.0)).is_none());
        round.update(SIM_DT);
        assert_eq!(round.elapsed(), 0.0);
        assert!(round.obstacles().is_empty());

        round.set_paused(false);
        assert!(round.player_hit(Vec2::new(100.0, 100.0)).is_some());
        round.update(SIM_DT);
        assert!(round.elapsed() > 0.0);
    }

    #[test]
    fn test_wall_bounce_consumes_collision_slot() {
        // Ball touching the top wall AND an obstacle: only the wall resolves
        // this tick.
        let level = solid_level(100.0, 10.0);
        let mut round = Round::new(&level, 2);
        round.ball.pos = Vec2::new(400.0, 9.0);
        round.ball.vel = Vec2::new(0.0, -1.0);
        let _ = round.obstacles.insert(Obstacle::Deflector(Deflector::new(
            Vec2::new(400.0, 15.0),
            0.0,
            60.0,
        )));

        round.update(SIM_DT);
        // One bounce only (the wall), and velocity now points down
        assert_eq!(round.ball().bounce_count, 1);
        assert!(round.ball().vel.y > 0.0);
    }

    #[test]
    fn test_initial_spinners_spawned_from_level() {
        let mut level = solid_level(200.0, 10.0);
        level.spinners = vec![crate::level::SpinnerPlacement {
            pos: [200.0, 200.0],
            shape: "pentagon".into(),
            size: 35.0,
            rotation_speed: -60.0,
        }];
        let round = Round::new(&level, 4);
        assert_eq!(round.obstacles().len(), 1);
        let snap = round.snapshot();
        match &snap.obstacles[0] {
            ObstacleSnapshot::Polygon { vertices, .. } => assert_eq!(vertices.len(), 5),
            other => panic!("expected polygon snapshot, got {other:?}"),
        }
    }

    #[test]
    fn test_snapshot_is_serializable_and_detached() {
        let mut level = solid_level(200.0, 10.0);
        level.hit_modes = vec![HitModeSpec::Point(PointConfig::default())];
        let mut round = Round::new(&level, 9);
        let _ = round.player_hit(Vec2::new(120.0, 80.0));
        round.update(SIM_DT);

        let snap = round.snapshot();
        assert_eq!(snap.obstacles.len(), 1);
        assert!(snap.outcome.is_none());
        assert!((snap.ball.dir.length() - 1.0).abs() < 1e-4);

        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"circle\""));

        // Mutating the round afterwards does not touch the snapshot
        round.update(SIM_DT);
        assert!(snap.elapsed < round.elapsed());
    }

    #[test]
    fn test_same_seed_same_round() {
        let mut level = solid_level(200.0, 10.0);
        level.ball.direction_deg = None; // sampled from the seed
        level.hit_modes = vec![HitModeSpec::Point(PointConfig::default())];

        let mut a = Round::new(&level, 42);
        let mut b = Round::new(&level, 42);
        for i in 0..200 {
            if i % 50 == 0 {
                let _ = a.player_hit(Vec2::new(100.0 + i as f32, 200.0));
                let _ = b.player_hit(Vec2::new(100.0 + i as f32, 200.0));
            }
            a.update(SIM_DT);
            b.update(SIM_DT);
        }
        assert_eq!(a.ball().pos, b.ball().pos);
        assert_eq!(a.ball().vel, b.ball().vel);
    }
}
