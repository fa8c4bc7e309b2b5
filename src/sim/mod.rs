//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-driven fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! A round owns its ball, obstacles and dispatcher exclusively; resetting a
//! round means constructing a fresh [`Round`], never mutating shared state.

pub mod ball;
pub mod boundary;
pub mod collision;
pub mod dispatch;
pub mod obstacle;
pub mod tick;

pub use ball::Ball;
pub use boundary::{Boundary, Contact, Edge, Gap};
pub use collision::{Hit, circle_vs_circle, circle_vs_segment, point_in_circle};
pub use dispatch::{Aim, DispatchOutcome, Dispatcher, HitModeSpec, Param, SequenceOrder};
pub use obstacle::{Obstacle, ObstacleId, ObstacleSet};
pub use tick::{BallSnapshot, ObstacleSnapshot, Outcome, Round, RoundSnapshot};
