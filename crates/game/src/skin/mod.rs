mod cache;
mod geometry;
mod library;

use std::path::PathBuf;
use std::sync::Arc;

pub use cache::SkinGeometryCache;
pub use geometry::{GazeCircle, GeometryParser, SvgGeometryParser};
pub use library::SkinLibrary;

/// A named vector description. The content is opaque apart from its gaze circles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skin {
    pub name: String,
    pub content: Arc<str>,
}

impl Skin {
    pub fn new(name: impl Into<String>, content: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SkinError {
    #[error("skin library is empty")]
    Empty,
    #[error("skin {0} is not valid UTF-8")]
    NotUtf8(String),
    #[error("failed to read {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}
