use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use glam::DVec2;
use rand::Rng;

use crate::net::InputState;

const MIN_TURN_MS: u64 = 400;
const MAX_TURN_MS: u64 = 2000;
const ORBIT_RADIUS: f64 = 120.0;
const ORBIT_PERIOD: Duration = Duration::from_secs(4);

/// Headless driver: wanders in random directions and aims its gaze at a point
/// circling its own position.
pub struct WanderBot {
    input: InputState,
    next_turn: Option<Instant>,
    started: Instant,
}

impl WanderBot {
    pub fn new(now: Instant) -> Self {
        Self {
            input: InputState::default(),
            next_turn: None,
            started: now,
        }
    }

    /// Picks a new heading once the current one has run its course.
    /// Returns whether the heading changed.
    pub fn update<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Instant) -> bool {
        if self.next_turn.is_some_and(|turn| now < turn) {
            return false;
        }

        let dx = rng.gen_range(-1..=1);
        let dy = rng.gen_range(-1..=1);
        self.input = InputState::from_direction(dx, dy);
        self.next_turn = Some(now + Duration::from_millis(rng.gen_range(MIN_TURN_MS..=MAX_TURN_MS)));
        true
    }

    pub fn input(&self) -> InputState {
        self.input
    }

    pub fn look_target(&self, center: DVec2, now: Instant) -> DVec2 {
        let elapsed = now.saturating_duration_since(self.started).as_secs_f64();
        let angle = TAU * elapsed / ORBIT_PERIOD.as_secs_f64();
        center + DVec2::from_angle(angle) * ORBIT_RADIUS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_heading_holds_until_turn() {
        let mut rng = StdRng::seed_from_u64(3);
        let t0 = Instant::now();
        let mut bot = WanderBot::new(t0);

        assert!(bot.update(&mut rng, t0));
        let heading = bot.input();
        assert!(!bot.update(&mut rng, t0 + Duration::from_millis(MIN_TURN_MS - 1)));
        assert_eq!(bot.input(), heading);
        assert!(bot.update(&mut rng, t0 + Duration::from_millis(MAX_TURN_MS)));
    }

    #[test]
    fn test_look_target_orbits_center() {
        let t0 = Instant::now();
        let bot = WanderBot::new(t0);
        let center = DVec2::new(100.0, 100.0);

        let start = bot.look_target(center, t0);
        assert!((start - DVec2::new(220.0, 100.0)).length() < 1e-9);

        let quarter = bot.look_target(center, t0 + ORBIT_PERIOD / 4);
        assert!((quarter - DVec2::new(100.0, 220.0)).length() < 1e-6);

        for ms in (0..4000).step_by(250) {
            let target = bot.look_target(center, t0 + Duration::from_millis(ms));
            assert!((target.distance(center) - ORBIT_RADIUS).abs() < 1e-9);
        }
    }
}
