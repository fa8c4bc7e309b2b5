//! Corral - a containment arcade game engine
//!
//! The ball bounces inside a rectangular field whose edges are punctuated by
//! escape gaps. Player hits spawn obstacles that deflect the ball; a direct
//! hit on the ball makes it permanently faster. The round ends when the ball
//! slips through a gap (loss) or the clock runs out (win).
//!
//! Core modules:
//! - `sim`: deterministic simulation (ball physics, obstacles, hit dispatch)
//! - `level`: normalized level configuration consumed from an external loader
//!
//! The engine is headless: rendering, audio and UI live in collaborating
//! crates and read state only through [`sim::RoundSnapshot`].

pub mod level;
pub mod sim;

pub use level::{LevelConfig, LevelError};
pub use sim::{Outcome, Round, RoundSnapshot};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz for smooth physics)
    pub const SIM_DT: f32 = 1.0 / 120.0;

    /// Play field defaults
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    pub const BALL_START_SPEED: f32 = 220.0;
    /// Direct-hit speed penalty (multiplicative, permanent for the round)
    pub const SPEED_PENALTY: f32 = 1.25;
    /// Separation added on top of penetration push-out after a reflection
    pub const SEPARATION_EPSILON: f32 = 1.0;

    /// Round defaults
    pub const TIME_LIMIT: f32 = 60.0;

    /// Obstacle defaults, used when a level omits mode parameters
    pub const DEFLECTOR_LENGTH: f32 = 80.0;
    pub const SPINNER_SIZE: f32 = 40.0;
    pub const SPINNER_ROTATION_DEG: f32 = 90.0;
    pub const POINT_RADIUS: f32 = 6.0;
    pub const CONNECT_THRESHOLD: f32 = 120.0;
    pub const MORPH_INTERVAL: f32 = 2.0;
    /// Pulsate phase advance rate (radians/second)
    pub const PULSATE_RATE: f32 = 3.0;
    pub const PULSATE_AMOUNT: f32 = 0.25;
    pub const GROW_INITIAL_SIZE: f32 = 25.0;
    pub const GROW_PER_HIT: f32 = 0.3;
    pub const GROW_MAX_SIZE: f32 = 120.0;
    pub const GROW_DECAY_RATE: f32 = 2.0;
}

/// Wrap an angle to [0, 2π)
#[inline]
pub fn wrap_angle(mut angle: f32) -> f32 {
    use std::f32::consts::TAU;
    while angle >= TAU {
        angle -= TAU;
    }
    while angle < 0.0 {
        angle += TAU;
    }
    angle
}

/// Unit vector pointing at `angle` radians
#[inline]
pub fn unit_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{PI, TAU};

    #[test]
    fn test_wrap_angle() {
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-6);
        assert!((wrap_angle(-PI) - PI).abs() < 1e-6);
        assert_eq!(wrap_angle(0.0), 0.0);
        assert!(wrap_angle(3.0 * TAU + 1.0) < TAU);
    }

    #[test]
    fn test_unit_from_angle() {
        let v = unit_from_angle(0.0);
        assert!((v - Vec2::X).length() < 1e-6);
        let v = unit_from_angle(PI / 2.0);
        assert!((v - Vec2::Y).length() < 1e-6);
    }
}
