use std::path::PathBuf;
use std::time::Duration;

use glam::IVec2;
use lookout::ViewportCuller;
use lookout::cull::{DEFAULT_CULL_MARGIN, DEFAULT_VIEWPORT_HEIGHT, DEFAULT_VIEWPORT_WIDTH};
use lookout::registry::DEFAULT_SPAWN;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub tick_rate: u32,
    pub max_clients: usize,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub cull_margin: f64,
    pub spawn: IVec2,
    pub skins_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            tick_rate: lookout::DEFAULT_TICK_RATE,
            max_clients: 64,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            cull_margin: DEFAULT_CULL_MARGIN,
            spawn: DEFAULT_SPAWN,
            skins_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate.max(1) as f64)
    }

    pub fn culler(&self) -> ViewportCuller {
        ViewportCuller::new(self.viewport_width, self.viewport_height, self.cull_margin)
    }
}
