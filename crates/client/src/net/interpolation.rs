use std::time::{Duration, Instant};

use glam::DVec2;

use crate::net::state::ClientEntityView;

pub const DEFAULT_INTERPOLATION_DELAY_MS: f64 = 100.0;

/// Blends from an entity's previous sample to its current one over a fixed delay.
#[derive(Debug, Clone, Copy)]
pub struct Interpolator {
    delay: Duration,
}

impl Default for Interpolator {
    fn default() -> Self {
        Self::new(Duration::from_secs_f64(DEFAULT_INTERPOLATION_DELAY_MS / 1000.0))
    }
}

impl Interpolator {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn position_for(&self, view: &ClientEntityView, now: Instant) -> DVec2 {
        let current = view.current.position.as_dvec2();
        let Some(previous) = view.previous else {
            return current;
        };

        let delay = self.delay.as_secs_f64();
        if delay <= 0.0 {
            return current;
        }

        let elapsed = now.saturating_duration_since(previous.time).as_secs_f64();
        let t = (elapsed / delay).clamp(0.0, 1.0);
        previous.position.as_dvec2().lerp(current, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::state::Sample;
    use glam::IVec2;
    use lookout::{EntityId, Facing};

    fn view(prev: Option<(IVec2, Instant)>, cur: (IVec2, Instant)) -> ClientEntityView {
        ClientEntityView {
            id: EntityId(1),
            current: Sample {
                position: cur.0,
                time: cur.1,
            },
            previous: prev.map(|(position, time)| Sample { position, time }),
            facing: Facing::Right,
            gaze_angles: Vec::new(),
        }
    }

    #[test]
    fn test_without_previous_returns_current() {
        let now = Instant::now();
        let v = view(None, (IVec2::new(10, 20), now));
        assert_eq!(
            Interpolator::default().position_for(&v, now + Duration::from_millis(5)),
            DVec2::new(10.0, 20.0)
        );
    }

    #[test]
    fn test_lerp_over_delay() {
        let t0 = Instant::now();
        let t1 = t0 + Duration::from_millis(16);
        let v = view(Some((IVec2::new(0, 0), t0)), (IVec2::new(100, -40), t1));
        let interp = Interpolator::default();

        assert_eq!(interp.position_for(&v, t0), DVec2::new(0.0, 0.0));

        let half = interp.position_for(&v, t0 + Duration::from_millis(50));
        assert!((half.x - 50.0).abs() < 1e-9);
        assert!((half.y + 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_clamps_past_delay() {
        let t0 = Instant::now();
        let v = view(Some((IVec2::new(0, 0), t0)), (IVec2::new(8, 8), t0));
        let interp = Interpolator::default();
        assert_eq!(
            interp.position_for(&v, t0 + Duration::from_secs(3)),
            DVec2::new(8.0, 8.0)
        );
    }

    #[test]
    fn test_zero_delay_snaps() {
        let t0 = Instant::now();
        let v = view(Some((IVec2::new(0, 0), t0)), (IVec2::new(8, 8), t0));
        let interp = Interpolator::new(Duration::ZERO);
        assert_eq!(interp.position_for(&v, t0), DVec2::new(8.0, 8.0));
    }
}
