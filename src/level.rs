//! Normalized level configuration consumed from an external loader.
//!
//! Every field is serde-defaulted: a level that omits optional keys degrades
//! to the built-in constants instead of failing to load. The only hard
//! failures are physical precondition violations (non-positive field size,
//! ball speed or radius, time limit), surfaced by [`LevelConfig::validate`]
//! before a round is constructed rather than deep inside the tick loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::boundary::Gap;
use crate::sim::dispatch::{HitModeSpec, SequenceOrder};

/// Precondition violations caught at the configuration boundary
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("play field dimensions must be positive (got {width}x{height})")]
    InvalidField { width: f32, height: f32 },
    #[error("ball speed must be positive (got {0})")]
    InvalidSpeed(f32),
    #[error("ball radius must be positive (got {0})")]
    InvalidRadius(f32),
    #[error("round time limit must be positive (got {0})")]
    InvalidTimeLimit(f32),
}

/// Ball spawn parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    /// Spawn position; field center when omitted
    pub start: Option<[f32; 2]>,
    /// Launch direction in degrees; sampled per round when omitted
    pub direction_deg: Option<f32>,
    pub speed: f32,
    pub radius: f32,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            start: None,
            direction_deg: None,
            speed: BALL_START_SPEED,
            radius: BALL_RADIUS,
        }
    }
}

/// An initial spinner placed before the round starts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpinnerPlacement {
    pub pos: [f32; 2],
    pub shape: String,
    pub size: f32,
    /// Degrees per second, signed
    pub rotation_speed: f32,
}

impl Default for SpinnerPlacement {
    fn default() -> Self {
        Self {
            pos: [FIELD_WIDTH / 2.0, FIELD_HEIGHT / 2.0],
            shape: "triangle".into(),
            size: SPINNER_SIZE,
            rotation_speed: SPINNER_ROTATION_DEG,
        }
    }
}

/// A complete normalized level
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    pub width: f32,
    pub height: f32,
    pub ball: BallConfig,
    /// Escape gaps; an empty list means solid walls and a timer-only round
    pub gaps: Vec<Gap>,
    pub spinners: Vec<SpinnerPlacement>,
    pub hit_modes: Vec<HitModeSpec>,
    pub order: SequenceOrder,
    /// Cap on live deflectors, enforced at dispatch time; unlimited when
    /// omitted
    pub max_deflectors: Option<usize>,
    /// Seconds the player must survive to win
    pub time_limit: f32,
    /// Multiplier applied to the ball on each direct hit
    pub speed_penalty: f32,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            ball: BallConfig::default(),
            gaps: Vec::new(),
            spinners: Vec::new(),
            hit_modes: Vec::new(),
            order: SequenceOrder::Sequential,
            max_deflectors: None,
            time_limit: TIME_LIMIT,
            speed_penalty: SPEED_PENALTY,
        }
    }
}

impl LevelConfig {
    /// Fail fast on physically inconsistent configuration. Gap fractions are
    /// clamped by the boundary instead of rejected.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return Err(LevelError::InvalidField {
                width: self.width,
                height: self.height,
            });
        }
        if self.ball.speed <= 0.0 {
            return Err(LevelError::InvalidSpeed(self.ball.speed));
        }
        if self.ball.radius <= 0.0 {
            return Err(LevelError::InvalidRadius(self.ball.radius));
        }
        if self.time_limit <= 0.0 {
            return Err(LevelError::InvalidTimeLimit(self.time_limit));
        }
        Ok(())
    }
}
