use std::collections::BTreeSet;

use glam::IVec2;

use crate::cull::ViewportCuller;
use crate::entity::EntityId;
use crate::gaze;
use crate::net::EntityRecord;
use crate::net::codec::encode_record;
use crate::registry::EntityRegistry;
use crate::skin::{SkinGeometryCache, SkinLibrary};

/// Everything a broadcast tick needs, owned in one place.
#[derive(Debug)]
pub struct World {
    tick: u64,
    registry: EntityRegistry,
    culler: ViewportCuller,
    geometry: SkinGeometryCache,
    /// Entities already reported as outside the wire range.
    unencodable: BTreeSet<EntityId>,
}

impl World {
    pub fn new(skins: SkinLibrary, culler: ViewportCuller) -> Self {
        Self::with_registry(EntityRegistry::new(skins), culler)
    }

    pub fn with_registry(registry: EntityRegistry, culler: ViewportCuller) -> Self {
        Self {
            tick: 0,
            registry,
            culler,
            geometry: SkinGeometryCache::new(),
            unencodable: BTreeSet::new(),
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut EntityRegistry {
        &mut self.registry
    }

    pub fn culler(&self) -> &ViewportCuller {
        &self.culler
    }

    pub fn geometry(&self) -> &SkinGeometryCache {
        &self.geometry
    }

    pub fn position_of(&self, id: EntityId) -> Option<IVec2> {
        self.registry.get(id).map(|e| e.position)
    }

    /// Records for everything `recipient` can see, in registry order.
    ///
    /// Each visible entity's gaze is aimed at its own look target. Returns
    /// `None` when the recipient has no entity.
    pub fn snapshot_for(&mut self, recipient: EntityId) -> Option<Vec<EntityRecord>> {
        let viewer = self.registry.get(recipient)?;
        let visible = self.culler.visible_to(viewer, self.registry.iter());

        let records = visible
            .into_iter()
            .map(|entity| {
                let circles = self.geometry.geometry_for(&entity.skin.content);
                EntityRecord {
                    id: entity.id,
                    x: entity.position.x,
                    y: entity.position.y,
                    facing: entity.facing,
                    gaze_angles: gaze::angles_for(entity, &circles, entity.look_target),
                }
            })
            .collect();

        Some(records)
    }

    /// Encoded snapshot for `recipient`.
    ///
    /// Records that fall outside the wire limits are left out; the rest of the
    /// frame is still produced. Each entity is warned about once until it is
    /// back in range.
    pub fn frame_for(&mut self, recipient: EntityId) -> Option<Vec<u8>> {
        let records = self.snapshot_for(recipient)?;

        let mut frame = Vec::with_capacity(records.iter().map(EntityRecord::encoded_len).sum());
        for record in &records {
            match encode_record(record, &mut frame) {
                Ok(()) => {
                    self.unencodable.remove(&record.id);
                }
                Err(e) => {
                    if self.unencodable.insert(record.id) {
                        log::warn!("Omitting entity {} from frames: {}", record.id, e);
                    } else {
                        log::debug!(
                            "Omitting entity {} from frame for {}: {}",
                            record.id,
                            recipient,
                            e
                        );
                    }
                }
            }
        }
        Some(frame)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::net::decode_frame;
    use crate::skin::Skin;

    const ONE_EYE: &str = r#"<path inkscape:label="eye_circle" sodipodi:type="arc" sodipodi:cx="85" sodipodi:cy="60" sodipodi:rx="5" sodipodi:ry="5"/>"#;

    fn world() -> World {
        let skins = SkinLibrary::new(vec![Skin::new("one.svg", ONE_EYE)]).unwrap();
        let registry = EntityRegistry::with_rng(skins, StdRng::seed_from_u64(3));
        World::with_registry(registry, ViewportCuller::default())
    }

    #[test]
    fn unknown_recipient_has_no_frame() {
        let mut world = world();
        assert!(world.frame_for(EntityId(1)).is_none());
    }

    #[test]
    fn snapshot_includes_gaze_per_entity() {
        let mut world = world();
        let id = world.registry_mut().create().unwrap();
        world
            .registry_mut()
            .set_look_target(id, glam::DVec2::new(500.0, 100.0));

        let records = world.snapshot_for(id).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].gaze_angles.len(), 1);
        assert!(records[0].gaze_angles[0].abs() < 1e-9);
    }

    #[test]
    fn geometry_is_shared_across_entities() {
        let mut world = world();
        let a = world.registry_mut().create().unwrap();
        world.registry_mut().create().unwrap();

        world.snapshot_for(a).unwrap();
        world.snapshot_for(a).unwrap();
        assert_eq!(world.geometry().len(), 1);
    }

    #[test]
    fn unencodable_entity_is_omitted() {
        let mut world = world();
        let a = world.registry_mut().create().unwrap();
        let b = world.registry_mut().create().unwrap();
        if let Some(entity) = world.registry_mut().get_mut(b) {
            entity.position = IVec2::new(65_900, 100);
        }
        // Pull the viewer along so `b` is inside its window.
        world.registry_mut().apply_move(a, 64_900, 0);

        let records = decode_frame(&world.frame_for(a).unwrap()).unwrap();
        let ids: Vec<EntityId> = records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a]);
    }

    #[test]
    fn unencodable_entity_is_reported_once() {
        let mut world = world();
        let a = world.registry_mut().create().unwrap();
        let b = world.registry_mut().create().unwrap();
        world.registry_mut().apply_move(a, 64_900, 0);
        if let Some(entity) = world.registry_mut().get_mut(b) {
            entity.position = IVec2::new(65_900, 100);
        }

        world.frame_for(a).unwrap();
        world.frame_for(b).unwrap();
        assert_eq!(world.unencodable.iter().copied().collect::<Vec<_>>(), vec![b]);

        // Back in range: the next excursion is reported again.
        if let Some(entity) = world.registry_mut().get_mut(b) {
            entity.position = IVec2::new(65_000, 100);
        }
        let records = decode_frame(&world.frame_for(a).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert!(world.unencodable.is_empty());
    }
}
