use std::collections::BTreeMap;

use glam::{DVec2, IVec2};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::entity::{Entity, EntityId};
use crate::skin::SkinLibrary;

pub const DEFAULT_SPAWN: IVec2 = IVec2::new(100, 100);

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("entity ids exhausted: the wire format carries at most {max} ids", max = u8::MAX)]
    IdsExhausted,
}

/// Authoritative entity state, keyed by id and iterated in ascending id order.
///
/// Ids come from a counter that starts at 1 and is never rewound, so an id is
/// never handed out twice during the life of the registry. Mutations on an
/// unknown id are ignored: a command can race with the disconnect that removed
/// its entity.
#[derive(Debug)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
    next_id: u16,
    spawn: IVec2,
    skins: SkinLibrary,
    rng: StdRng,
}

impl EntityRegistry {
    pub fn new(skins: SkinLibrary) -> Self {
        Self::with_rng(skins, StdRng::from_entropy())
    }

    pub fn with_rng(skins: SkinLibrary, rng: StdRng) -> Self {
        Self {
            entities: BTreeMap::new(),
            next_id: 1,
            spawn: DEFAULT_SPAWN,
            skins,
            rng,
        }
    }

    pub fn with_spawn(mut self, spawn: IVec2) -> Self {
        self.spawn = spawn;
        self
    }

    pub fn skins(&self) -> &SkinLibrary {
        &self.skins
    }

    pub fn create(&mut self) -> Result<EntityId, RegistryError> {
        let raw = u8::try_from(self.next_id).map_err(|_| RegistryError::IdsExhausted)?;
        self.next_id += 1;

        let id = EntityId(raw);
        let skin = self.skins.choose(&mut self.rng);
        log::debug!("Created entity {} with skin {}", id, skin.name);
        self.entities.insert(id, Entity::new(id, self.spawn, skin));
        Ok(id)
    }

    pub fn apply_move(&mut self, id: EntityId, dx: i32, dy: i32) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.apply_move(dx, dy);
        }
    }

    pub fn set_look_target(&mut self, id: EntityId, target: DVec2) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.look_target = target;
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Facing;
    use crate::skin::Skin;

    fn registry() -> EntityRegistry {
        let skins = SkinLibrary::new(vec![Skin::new("only.svg", "<svg/>")]).unwrap();
        EntityRegistry::with_rng(skins, StdRng::seed_from_u64(1))
    }

    #[test]
    fn create_initialises_entity() {
        let mut registry = registry();
        let id = registry.create().unwrap();
        assert_eq!(id, EntityId(1));

        let entity = registry.get(id).unwrap();
        assert_eq!(entity.position, DEFAULT_SPAWN);
        assert_eq!(entity.facing, Facing::Right);
        assert_eq!(entity.look_target, DVec2::new(100.0, 100.0));
        assert_eq!(entity.skin.name, "only.svg");
    }

    #[test]
    fn ids_are_not_reused() {
        let mut registry = registry();
        let a = registry.create().unwrap();
        registry.remove(a);
        let b = registry.create().unwrap();
        assert_ne!(a, b);
        assert_eq!(b, EntityId(2));
    }

    #[test]
    fn ids_past_wire_range_are_refused() {
        let mut registry = registry();
        for expected in 1..=255u8 {
            assert_eq!(registry.create().unwrap(), EntityId(expected));
        }
        assert!(matches!(registry.create(), Err(RegistryError::IdsExhausted)));
        assert_eq!(registry.len(), 255);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut registry = registry();
        registry.apply_move(EntityId(9), 1, 1);
        registry.set_look_target(EntityId(9), DVec2::ONE);
        assert!(registry.remove(EntityId(9)).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn move_and_look() {
        let mut registry = registry().with_spawn(IVec2::new(0, 0));
        let id = registry.create().unwrap();

        registry.apply_move(id, -4, 2);
        registry.set_look_target(id, DVec2::new(-50.0, 3.5));

        let entity = registry.get(id).unwrap();
        assert_eq!(entity.position, IVec2::new(-4, 2));
        assert_eq!(entity.facing, Facing::Left);
        assert_eq!(entity.look_target, DVec2::new(-50.0, 3.5));
    }

    #[test]
    fn iterates_in_id_order() {
        let mut registry = registry();
        for _ in 0..5 {
            registry.create().unwrap();
        }
        registry.remove(EntityId(3));
        let ids: Vec<u8> = registry.iter().map(|e| e.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 4, 5]);
    }
}
