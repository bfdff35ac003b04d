/// Held directions, sampled once per input tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputState {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl InputState {
    pub fn from_direction(dx: i32, dy: i32) -> Self {
        Self {
            left: dx < 0,
            right: dx > 0,
            up: dy < 0,
            down: dy > 0,
        }
    }

    /// Move delta for one tick, or `None` when nothing is held.
    pub fn to_move(&self, speed: i32) -> Option<(i32, i32)> {
        let dx = (self.right as i32 - self.left as i32) * speed;
        let dy = (self.down as i32 - self.up as i32) * speed;
        (dx != 0 || dy != 0).then_some((dx, dy))
    }
}
