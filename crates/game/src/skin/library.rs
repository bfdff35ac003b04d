//! The fixed set of skins entities are dressed in.
//!
//! The default set is compiled into the crate with `rust-embed`; servers may
//! point at a directory of `.svg` files instead.

use std::path::Path;
use std::sync::Arc;

use rand::Rng;
use rand::seq::SliceRandom;
use rust_embed::Embed;

use super::{Skin, SkinError};

#[derive(Embed)]
#[folder = "skins/"]
struct EmbeddedSkins;

#[derive(Debug, Clone)]
pub struct SkinLibrary {
    skins: Vec<Arc<Skin>>,
}

impl SkinLibrary {
    /// Builds a library from explicit skins. Fails when `skins` is empty.
    pub fn new(skins: Vec<Skin>) -> Result<Self, SkinError> {
        if skins.is_empty() {
            return Err(SkinError::Empty);
        }
        Ok(Self {
            skins: skins.into_iter().map(Arc::new).collect(),
        })
    }

    /// The skins shipped with the crate, sorted by name.
    pub fn embedded() -> Result<Self, SkinError> {
        let mut names: Vec<String> = EmbeddedSkins::iter().map(|p| p.into_owned()).collect();
        names.sort();

        let mut skins = Vec::with_capacity(names.len());
        for name in names {
            let Some(file) = EmbeddedSkins::get(&name) else {
                continue;
            };
            let content = String::from_utf8(file.data.into_owned())
                .map_err(|_| SkinError::NotUtf8(name.clone()))?;
            skins.push(Skin::new(name, content));
        }

        Self::new(skins)
    }

    /// Loads every `.svg` file in `dir`, sorted by file name.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, SkinError> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| SkinError::Io(dir.to_path_buf(), e))? {
            let path = entry.map_err(|e| SkinError::Io(dir.to_path_buf(), e))?.path();
            if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("svg")) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut skins = Vec::with_capacity(paths.len());
        for path in paths {
            let content =
                std::fs::read_to_string(&path).map_err(|e| SkinError::Io(path.clone(), e))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            log::debug!("Loaded skin {} ({} bytes)", name, content.len());
            skins.push(Skin::new(name, content));
        }

        Self::new(skins)
    }

    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Arc<Skin> {
        // `new` rejects empty libraries.
        self.skins
            .choose(rng)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.skins[0]))
    }

    pub fn get(&self, name: &str) -> Option<Arc<Skin>> {
        self.skins.iter().find(|s| s.name == name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Skin>> {
        self.skins.iter()
    }

    pub fn len(&self) -> usize {
        self.skins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skins.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::skin::SvgGeometryParser;
    use crate::skin::geometry::GeometryParser;

    #[test]
    fn embedded_library_has_both_skins() {
        let library = SkinLibrary::embedded().unwrap();
        let names: Vec<&str> = library.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["standard issue.svg", "watcher.svg"]);
    }

    #[test]
    fn embedded_skins_carry_gaze_circles() {
        let library = SkinLibrary::embedded().unwrap();
        let watcher = library.get("watcher.svg").unwrap();
        let standard = library.get("standard issue.svg").unwrap();

        assert_eq!(SvgGeometryParser.parse(&watcher.content).len(), 1);
        let circles = SvgGeometryParser.parse(&standard.content);
        assert_eq!(circles.len(), 2);
        assert!(circles.iter().any(|c| c.rotation != 0.0));
    }

    #[test]
    fn empty_library_is_rejected() {
        assert!(matches!(SkinLibrary::new(Vec::new()), Err(SkinError::Empty)));
    }

    #[test]
    fn choose_picks_from_the_set() {
        let library =
            SkinLibrary::new(vec![Skin::new("a.svg", "<a/>"), Skin::new("b.svg", "<b/>")])
                .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..16 {
            let skin = library.choose(&mut rng);
            assert!(skin.name == "a.svg" || skin.name == "b.svg");
        }
    }
}
