//! Corral headless demo driver.
//!
//! Plays one seeded round without a renderer: loads a level from a JSON file
//! given as the first argument (built-in demo level otherwise, optional seed
//! as the second argument), fires a scripted hit twice a second, and reports
//! the outcome.

use rand::Rng;

use corral::consts::SIM_DT;
use corral::{LevelConfig, Outcome, Round};

/// Built-in level: two escape gaps, a starter spinner, the full mode rotation
fn demo_level() -> LevelConfig {
    serde_json::from_str(
        r#"{
            "gaps": [
                {"edge": "top", "start_fraction": 0.4, "width": 160.0},
                {"edge": "bottom", "start_fraction": 0.1, "width": 120.0}
            ],
            "spinners": [
                {"pos": [400.0, 200.0], "shape": "triangle", "size": 40.0, "rotation_speed": 120.0}
            ],
            "hit_modes": [
                {"mode": "deflector", "length": [60.0, 110.0]},
                {"mode": "spinner", "shape": "square", "size": [25.0, 45.0]},
                {"mode": "connect"},
                {"mode": "morph", "pulsate": true},
                {"mode": "grow"},
                {"mode": "point"}
            ],
            "max_deflectors": 12,
            "time_limit": 45.0
        }"#,
    )
    .expect("built-in demo level is valid")
}

fn load_level() -> LevelConfig {
    let Some(path) = std::env::args().nth(1) else {
        log::info!("no level file given, using the built-in demo level");
        return demo_level();
    };
    match std::fs::read_to_string(&path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(level) => level,
            Err(e) => {
                log::warn!("level file {path} did not parse ({e}), using the demo level");
                demo_level()
            }
        },
        Err(e) => {
            log::warn!("could not read {path} ({e}), using the demo level");
            demo_level()
        }
    }
}

fn main() {
    env_logger::init();

    let level = load_level();
    if let Err(e) = level.validate() {
        log::error!("invalid level: {e}");
        std::process::exit(1);
    }

    let seed: u64 = std::env::args()
        .nth(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| rand::rng().random());
    let mut round = Round::new(&level, seed);

    // The demo player fires at a point just ahead of the ball twice a second.
    let hit_period = (0.5 / SIM_DT) as u32;
    let mut tick = 0u32;
    while round.outcome().is_none() {
        if tick % hit_period == 0 {
            let snap = round.snapshot();
            let target = snap.ball.pos + snap.ball.dir * 60.0;
            if let Some(outcome) = round.player_hit(target) {
                log::debug!("hit at ({:.0},{:.0}): {outcome:?}", target.x, target.y);
            }
        }
        round.update(SIM_DT);
        tick += 1;
    }

    match round.outcome().expect("loop exits on an outcome") {
        Outcome::Escaped { elapsed, edge } => {
            println!("escaped through the {edge:?} edge - contained for {elapsed:.1}s");
        }
        Outcome::TimeLimitReached { elapsed } => {
            println!("containment held - survived the full {elapsed:.1}s");
        }
    }
}
