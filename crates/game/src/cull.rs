use crate::entity::Entity;

pub const DEFAULT_VIEWPORT_WIDTH: u32 = 800;
pub const DEFAULT_VIEWPORT_HEIGHT: u32 = 500;
pub const DEFAULT_CULL_MARGIN: f64 = 1.2;

/// Selects the entities a recipient can plausibly see.
///
/// The window is centred on the recipient and reaches `viewport * margin` in
/// each direction. Edges are inclusive and the recipient is always part of its
/// own result. Each call walks every entity once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportCuller {
    half_width: f64,
    half_height: f64,
}

impl Default for ViewportCuller {
    fn default() -> Self {
        Self::new(
            DEFAULT_VIEWPORT_WIDTH,
            DEFAULT_VIEWPORT_HEIGHT,
            DEFAULT_CULL_MARGIN,
        )
    }
}

impl ViewportCuller {
    pub fn new(viewport_width: u32, viewport_height: u32, margin: f64) -> Self {
        Self {
            half_width: viewport_width as f64 * margin,
            half_height: viewport_height as f64 * margin,
        }
    }

    pub fn half_extents(&self) -> (f64, f64) {
        (self.half_width, self.half_height)
    }

    pub fn contains(&self, recipient: &Entity, candidate: &Entity) -> bool {
        let cx = recipient.position.x as f64;
        let cy = recipient.position.y as f64;
        let x = candidate.position.x as f64;
        let y = candidate.position.y as f64;

        x >= cx - self.half_width
            && x <= cx + self.half_width
            && y >= cy - self.half_height
            && y <= cy + self.half_height
    }

    pub fn visible_to<'a, I>(&self, recipient: &Entity, entities: I) -> Vec<&'a Entity>
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        entities
            .into_iter()
            .filter(|candidate| self.contains(recipient, candidate))
            .collect()
    }
}
