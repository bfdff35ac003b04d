use std::fmt;
use std::sync::Arc;

use glam::{DVec2, IVec2};
use serde::{Deserialize, Serialize};

use crate::skin::Skin;

/// Wire-sized entity identifier. The snapshot format reserves a single byte for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u8);

impl EntityId {
    pub fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Horizontal orientation. `Left` mirrors both the skin geometry and the gaze angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// Facing implied by a horizontal move, or `None` when the move has no horizontal part.
    pub fn from_delta(dx: i32) -> Option<Self> {
        match dx.signum() {
            1 => Some(Self::Right),
            -1 => Some(Self::Left),
            _ => None,
        }
    }

    pub fn sign(self) -> i32 {
        match self {
            Self::Right => 1,
            Self::Left => -1,
        }
    }

    /// Mirrors a horizontal offset measured from the skin centre.
    #[inline]
    pub fn mirror_x(self, offset_x: f64) -> f64 {
        match self {
            Self::Right => offset_x,
            Self::Left => -offset_x,
        }
    }

    /// Reflects an angle about the vertical axis when facing left.
    #[inline]
    pub fn reflect_angle(self, angle: f64) -> f64 {
        match self {
            Self::Right => angle,
            Self::Left => std::f64::consts::PI - angle,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub position: IVec2,
    pub facing: Facing,
    pub skin: Arc<Skin>,
    pub look_target: DVec2,
}

impl Entity {
    pub fn new(id: EntityId, position: IVec2, skin: Arc<Skin>) -> Self {
        Self {
            id,
            position,
            facing: Facing::Right,
            skin,
            look_target: position.as_dvec2(),
        }
    }

    pub fn apply_move(&mut self, dx: i32, dy: i32) {
        self.position = IVec2::new(
            self.position.x.saturating_add(dx),
            self.position.y.saturating_add(dy),
        );
        if let Some(facing) = Facing::from_delta(dx) {
            self.facing = facing;
        }
    }
}
