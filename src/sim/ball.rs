//! The kinetic body: the ball the player is trying to keep penned in.
//!
//! Velocity carries direction only; actual movement speed is
//! `base_speed * speed_multiplier`, so direct-hit penalties compound without
//! touching the bounce math.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::SEPARATION_EPSILON;

/// The ball. One per round, reset by constructing a fresh round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    /// Direction carrier; only its orientation matters.
    pub vel: Vec2,
    pub radius: f32,
    base_speed: f32,
    /// Accumulates on direct-hit penalties, never decreases.
    speed_multiplier: f32,
    /// Lifetime bounce counter, telemetry only.
    pub bounce_count: u32,
}

impl Ball {
    /// A live ball must have positive speed and radius and a real direction;
    /// level validation rejects configs that would violate this before a
    /// round is constructed.
    pub fn new(pos: Vec2, dir: Vec2, base_speed: f32, radius: f32) -> Self {
        debug_assert!(base_speed > 0.0, "ball spawned with non-positive speed");
        debug_assert!(radius > 0.0, "ball spawned with non-positive radius");
        debug_assert!(
            dir.length_squared() > 0.0,
            "ball spawned with degenerate direction"
        );
        Self {
            pos,
            vel: dir.normalize_or_zero(),
            radius,
            base_speed,
            speed_multiplier: 1.0,
            bounce_count: 0,
        }
    }

    /// Actual movement speed in field units per second
    #[inline]
    pub fn speed(&self) -> f32 {
        self.base_speed * self.speed_multiplier
    }

    #[inline]
    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    /// Advance position along the current direction. No-op for a degenerate
    /// (zero) velocity.
    pub fn integrate(&mut self, dt: f32) {
        let dir = self.vel.normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }
        self.pos += dir * self.speed() * dt;
    }

    /// Reflect off a surface. `normal` must be unit length and point from the
    /// obstacle toward the ball.
    ///
    /// Velocity changes only while the ball moves into the surface
    /// (`v·n < 0`); a departing ball keeps its direction so the same contact
    /// is not resolved twice while penetration clears. Push-out applies either
    /// way so the shapes always end up separated.
    pub fn reflect(&mut self, normal: Vec2, push_out: f32) {
        let approach = self.vel.dot(normal);
        if approach < 0.0 {
            self.vel -= 2.0 * approach * normal;
            self.bounce_count += 1;
        }
        self.pos += normal * (push_out + SEPARATION_EPSILON);
    }

    /// Direct player hit: the ball gets permanently faster this round.
    pub fn apply_speed_penalty(&mut self, multiplier: f32) {
        self.speed_multiplier *= multiplier;
    }

    /// Sign flip on the x axis, for bounces off the left/right walls.
    pub fn bounce_horizontal(&mut self) {
        self.vel.x = -self.vel.x;
        self.bounce_count += 1;
    }

    /// Sign flip on the y axis, for bounces off the top/bottom walls.
    pub fn bounce_vertical(&mut self) {
        self.vel.y = -self.vel.y;
        self.bounce_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit_from_angle;
    use proptest::prelude::*;
    use std::f32::consts::TAU;

    #[test]
    fn test_integrate_moves_along_direction() {
        let mut ball = Ball::new(Vec2::new(100.0, 100.0), Vec2::X, 200.0, 8.0);
        ball.integrate(0.5);
        assert!((ball.pos - Vec2::new(200.0, 100.0)).length() < 1e-3);
    }

    #[test]
    fn test_integrate_ignores_zero_velocity() {
        let mut ball = Ball::new(Vec2::ZERO, Vec2::X, 200.0, 8.0);
        ball.vel = Vec2::ZERO;
        ball.integrate(1.0);
        assert_eq!(ball.pos, Vec2::ZERO);
    }

    #[test]
    fn test_reflect_flips_approaching_velocity() {
        let mut ball = Ball::new(Vec2::ZERO, Vec2::X, 100.0, 8.0);
        // Wall to the right, normal pointing back at the ball
        ball.reflect(Vec2::NEG_X, 2.0);
        assert!((ball.vel - Vec2::NEG_X).length() < 1e-6);
        assert_eq!(ball.bounce_count, 1);
        // Push-out moved the ball away from the surface
        assert!(ball.pos.x < 0.0);
    }

    #[test]
    fn test_reflect_departing_keeps_velocity() {
        let mut ball = Ball::new(Vec2::ZERO, Vec2::X, 100.0, 8.0);
        // Ball already moving away from the surface: direction untouched,
        // push-out still applied.
        ball.reflect(Vec2::X, 3.0);
        assert!((ball.vel - Vec2::X).length() < 1e-6);
        assert_eq!(ball.bounce_count, 0);
        assert!(ball.pos.x > 3.0 - 1e-3);
    }

    #[test]
    fn test_speed_penalty_compounds() {
        let mut ball = Ball::new(Vec2::ZERO, Vec2::X, 200.0, 8.0);
        ball.apply_speed_penalty(1.25);
        ball.apply_speed_penalty(1.25);
        assert!((ball.speed() - 200.0 * 1.5625).abs() < 1e-3);
    }

    #[test]
    fn test_axis_bounces() {
        let mut ball = Ball::new(Vec2::ZERO, Vec2::new(1.0, 1.0), 100.0, 8.0);
        let before = ball.vel;
        ball.bounce_horizontal();
        assert_eq!(ball.vel.x, -before.x);
        assert_eq!(ball.vel.y, before.y);
        ball.bounce_vertical();
        assert_eq!(ball.vel.y, -before.y);
        assert_eq!(ball.bounce_count, 2);
    }

    proptest! {
        /// v' = v - 2(v·n)n must mirror the approach component and preserve
        /// the speed, for any incoming direction actually moving into the
        /// surface.
        #[test]
        fn reflection_law(
            vx in -500.0f32..500.0,
            vy in -500.0f32..500.0,
            normal_angle in 0.0f32..TAU,
        ) {
            let vel = Vec2::new(vx, vy);
            prop_assume!(vel.length() > 1.0);
            let normal = unit_from_angle(normal_angle);
            prop_assume!(vel.dot(normal) < -1e-3);

            let mut ball = Ball::new(Vec2::ZERO, vel, vel.length(), 8.0);
            ball.vel = vel;
            let approach = vel.dot(normal);
            ball.reflect(normal, 0.0);

            prop_assert!((ball.vel.dot(normal) - (-approach)).abs() < 1e-2);
            prop_assert!((ball.vel.length() - vel.length()).abs() < 1e-2);
        }

        /// The multiplier is non-decreasing and scales by exactly the
        /// configured factor per direct hit.
        #[test]
        fn speed_penalty_monotonic(factors in proptest::collection::vec(1.0f32..2.0, 0..16)) {
            let mut ball = Ball::new(Vec2::ZERO, Vec2::X, 200.0, 8.0);
            let mut expected = 1.0f32;
            for f in factors {
                let before = ball.speed_multiplier();
                ball.apply_speed_penalty(f);
                expected *= f;
                prop_assert!(ball.speed_multiplier() >= before);
                prop_assert!((ball.speed_multiplier() - expected).abs() < expected * 1e-4);
            }
        }
    }
}
