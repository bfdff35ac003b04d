use std::collections::BTreeMap;
use std::time::Instant;

use glam::{DVec2, IVec2};

use lookout::{EntityId, EntityRecord, Facing};

use crate::net::interpolation::Interpolator;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub position: IVec2,
    pub time: Instant,
}

/// The client's view of one entity across the last two snapshots that included it.
#[derive(Debug, Clone)]
pub struct ClientEntityView {
    pub id: EntityId,
    pub current: Sample,
    pub previous: Option<Sample>,
    pub facing: Facing,
    pub gaze_angles: Vec<f64>,
}

/// Handshake data for the entity this client controls.
#[derive(Debug, Clone)]
pub struct OwnEntity {
    pub id: EntityId,
    pub skin_name: String,
    pub skin: String,
}

#[derive(Debug, Default)]
pub struct ClientStateStore {
    own: Option<OwnEntity>,
    entities: BTreeMap<EntityId, ClientEntityView>,
    interpolator: Interpolator,
    snapshots_applied: u64,
}

impl ClientStateStore {
    pub fn new(interpolator: Interpolator) -> Self {
        Self {
            interpolator,
            ..Default::default()
        }
    }

    pub fn set_own(&mut self, own: OwnEntity) {
        self.own = Some(own);
    }

    pub fn own(&self) -> Option<&OwnEntity> {
        self.own.as_ref()
    }

    pub fn own_id(&self) -> Option<EntityId> {
        self.own.as_ref().map(|own| own.id)
    }

    /// Replaces the known set with the entities in `records`.
    ///
    /// Entities seen before keep their old current sample as `previous`;
    /// entities missing from `records` are dropped.
    pub fn apply_snapshot(&mut self, records: Vec<EntityRecord>, now: Instant) {
        let mut next = BTreeMap::new();

        for record in records {
            let sample = Sample {
                position: IVec2::new(record.x, record.y),
                time: now,
            };
            let view = match self.entities.remove(&record.id) {
                Some(mut view) => {
                    view.previous = Some(view.current);
                    view.current = sample;
                    view.facing = record.facing;
                    view.gaze_angles = record.gaze_angles;
                    view
                }
                None => ClientEntityView {
                    id: record.id,
                    current: sample,
                    previous: None,
                    facing: record.facing,
                    gaze_angles: record.gaze_angles,
                },
            };
            next.insert(record.id, view);
        }

        self.entities = next;
        self.snapshots_applied += 1;
    }

    pub fn get(&self, id: EntityId) -> Option<&ClientEntityView> {
        self.entities.get(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn snapshots_applied(&self) -> u64 {
        self.snapshots_applied
    }

    pub fn position_of(&self, id: EntityId, now: Instant) -> Option<DVec2> {
        self.entities
            .get(&id)
            .map(|view| self.interpolator.position_for(view, now))
    }

    /// Interpolated position of this client's own entity, or the origin if it
    /// is not in view yet.
    pub fn camera(&self, now: Instant) -> DVec2 {
        self.own_id()
            .and_then(|id| self.position_of(id, now))
            .unwrap_or(DVec2::ZERO)
    }
}
