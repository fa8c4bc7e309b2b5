//! Play-field boundary: four axis-aligned edges punctuated by escape gaps.
//!
//! The field spans x ∈ [0, width], y ∈ [0, height] with y growing downward
//! (screen convention). A ball whose leading edge crosses an edge either
//! bounces (axis flip + clamp, walls are always axis-aligned) or escapes if
//! its position along the edge lies inside a gap. A level with no gaps is a
//! solid pen: the round can only end on the timer.

use serde::{Deserialize, Serialize};

use super::ball::Ball;

/// One of the four field edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    Top,
    Bottom,
    Right,
    Left,
}

/// An opening in one edge through which the ball can escape. Immutable for
/// the round.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Gap {
    pub edge: Edge,
    /// Normalized start offset along the edge, in [0, 1]
    #[serde(default)]
    pub start_fraction: f32,
    /// Opening width in field units
    #[serde(default)]
    pub width: f32,
}

/// What a boundary contact resolved to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contact {
    Bounced(Edge),
    Escaped(Edge),
}

/// The four field edges and their gaps
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boundary {
    pub width: f32,
    pub height: f32,
    gaps: Vec<Gap>,
}

impl Boundary {
    pub fn new(width: f32, height: f32, mut gaps: Vec<Gap>) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "degenerate play field");
        for gap in &mut gaps {
            gap.start_fraction = gap.start_fraction.clamp(0.0, 1.0);
            gap.width = gap.width.max(0.0);
        }
        Self {
            width,
            height,
            gaps,
        }
    }

    /// Solid pen with no escape ("dynamic mode")
    pub fn solid(width: f32, height: f32) -> Self {
        Self::new(width, height, Vec::new())
    }

    pub fn is_solid(&self) -> bool {
        self.gaps.is_empty()
    }

    pub fn gaps(&self) -> &[Gap] {
        &self.gaps
    }

    fn edge_length(&self, edge: Edge) -> f32 {
        match edge {
            Edge::Top | Edge::Bottom => self.width,
            Edge::Left | Edge::Right => self.height,
        }
    }

    /// Is the coordinate along `edge` inside one of its gaps?
    pub fn in_gap(&self, edge: Edge, along: f32) -> bool {
        let len = self.edge_length(edge);
        self.gaps.iter().filter(|g| g.edge == edge).any(|g| {
            let start = g.start_fraction * len;
            along >= start && along <= start + g.width
        })
    }

    /// Classify and resolve the ball's boundary contact, if any.
    ///
    /// At most one edge resolves per call; a corner contact resolves the
    /// first edge in top/bottom/right/left order and the other one next tick,
    /// same single-contact policy as the obstacle scan. A bounce mutates the
    /// ball (axis flip + clamp back inside); an escape leaves it untouched
    /// for the round to finish on.
    pub fn resolve(&self, ball: &mut Ball) -> Option<Contact> {
        if ball.pos.y - ball.radius < 0.0 {
            return Some(self.resolve_edge(ball, Edge::Top));
        }
        if ball.pos.y + ball.radius > self.height {
            return Some(self.resolve_edge(ball, Edge::Bottom));
        }
        if ball.pos.x + ball.radius > self.width {
            return Some(self.resolve_edge(ball, Edge::Right));
        }
        if ball.pos.x - ball.radius < 0.0 {
            return Some(self.resolve_edge(ball, Edge::Left));
        }
        None
    }

    fn resolve_edge(&self, ball: &mut Ball, edge: Edge) -> Contact {
        let along = match edge {
            Edge::Top | Edge::Bottom => ball.pos.x,
            Edge::Left | Edge::Right => ball.pos.y,
        };
        if self.in_gap(edge, along) {
            return Contact::Escaped(edge);
        }
        match edge {
            Edge::Top => {
                ball.bounce_vertical();
                ball.pos.y = ball.radius;
            }
            Edge::Bottom => {
                ball.bounce_vertical();
                ball.pos.y = self.height - ball.radius;
            }
            Edge::Right => {
                ball.bounce_horizontal();
                ball.pos.x = self.width - ball.radius;
            }
            Edge::Left => {
                ball.bounce_horizontal();
                ball.pos.x = ball.radius;
            }
        }
        Contact::Bounced(edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn ball_at(pos: Vec2, vel: Vec2) -> Ball {
        let mut ball = Ball::new(pos, Vec2::X, 200.0, 10.0);
        ball.vel = vel;
        ball
    }

    fn top_gap_boundary() -> Boundary {
        // Single gap on the top edge covering normalized [0.4, 0.6] of an
        // 800-wide field: pixel range [320, 480].
        Boundary::new(
            800.0,
            600.0,
            vec![Gap {
                edge: Edge::Top,
                start_fraction: 0.4,
                width: 160.0,
            }],
        )
    }

    #[test]
    fn test_escape_through_top_gap() {
        let boundary = top_gap_boundary();
        let mut ball = ball_at(Vec2::new(400.0, 5.0), Vec2::new(0.0, -1.0));
        let contact = boundary.resolve(&mut ball);
        assert_eq!(contact, Some(Contact::Escaped(Edge::Top)));
        // Escape leaves the ball untouched
        assert_eq!(ball.vel, Vec2::new(0.0, -1.0));
    }

    #[test]
    fn test_bounce_outside_gap_flips_y() {
        let boundary = top_gap_boundary();
        // Normalized x = 0.1: solid wall
        let mut ball = ball_at(Vec2::new(80.0, 5.0), Vec2::new(0.3, -1.0));
        let contact = boundary.resolve(&mut ball);
        assert_eq!(contact, Some(Contact::Bounced(Edge::Top)));
        assert!(ball.vel.y > 0.0);
        assert_eq!(ball.vel.x, 0.3);
        assert_eq!(ball.pos.y, ball.radius);
    }

    #[test]
    fn test_gap_exclusivity_along_top_edge() {
        // For a contact exactly on the edge, escape XOR bounce must hold at
        // every position along it.
        let boundary = top_gap_boundary();
        let mut x = 0.0;
        while x <= 800.0 {
            let mut ball = ball_at(Vec2::new(x, 5.0), Vec2::new(0.0, -1.0));
            let contact = boundary.resolve(&mut ball).expect("leading edge crossed");
            let escaped = contact == Contact::Escaped(Edge::Top);
            let bounced = contact == Contact::Bounced(Edge::Top);
            assert!(escaped ^ bounced, "at x={x}");
            assert_eq!(escaped, (320.0..=480.0).contains(&x), "at x={x}");
            x += 2.5;
        }
    }

    #[test]
    fn test_solid_mode_never_escapes() {
        let boundary = Boundary::solid(800.0, 600.0);
        assert!(boundary.is_solid());
        for pos in [
            Vec2::new(400.0, 5.0),
            Vec2::new(400.0, 595.0),
            Vec2::new(5.0, 300.0),
            Vec2::new(795.0, 300.0),
        ] {
            let mut ball = ball_at(pos, Vec2::new(1.0, 1.0));
            match boundary.resolve(&mut ball) {
                Some(Contact::Bounced(_)) => {}
                other => panic!("expected bounce, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_side_walls_flip_x() {
        let boundary = Boundary::solid(800.0, 600.0);
        let mut ball = ball_at(Vec2::new(795.0, 300.0), Vec2::new(1.0, 0.2));
        assert_eq!(
            boundary.resolve(&mut ball),
            Some(Contact::Bounced(Edge::Right))
        );
        assert!(ball.vel.x < 0.0);
        assert_eq!(ball.pos.x, 800.0 - ball.radius);

        let mut ball = ball_at(Vec2::new(5.0, 300.0), Vec2::new(-1.0, 0.2));
        assert_eq!(
            boundary.resolve(&mut ball),
            Some(Contact::Bounced(Edge::Left))
        );
        assert!(ball.vel.x > 0.0);
    }

    #[test]
    fn test_gap_fractions_clamped() {
        let boundary = Boundary::new(
            100.0,
            100.0,
            vec![Gap {
                edge: Edge::Top,
                start_fraction: 1.7,
                width: -5.0,
            }],
        );
        let gap = boundary.gaps()[0];
        assert_eq!(gap.start_fraction, 1.0);
        assert_eq!(gap.width, 0.0);
    }

    #[test]
    fn test_no_contact_inside_field() {
        let boundary = Boundary::solid(800.0, 600.0);
        let mut ball = ball_at(Vec2::new(400.0, 300.0), Vec2::X);
        assert_eq!(boundary.resolve(&mut ball), None);
    }
}
