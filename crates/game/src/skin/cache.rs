use std::collections::HashMap;
use std::sync::Arc;

use super::geometry::{GazeCircle, GeometryParser, SvgGeometryParser};

/// Parsed gaze geometry keyed by exact skin content.
///
/// Entries are created on first lookup and never change afterwards, so every
/// entity sharing a skin shares one `Arc`.
#[derive(Debug)]
pub struct SkinGeometryCache<P = SvgGeometryParser> {
    parser: P,
    entries: HashMap<Arc<str>, Arc<[GazeCircle]>>,
}

impl Default for SkinGeometryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl SkinGeometryCache {
    pub fn new() -> Self {
        Self::with_parser(SvgGeometryParser)
    }
}

impl<P: GeometryParser> SkinGeometryCache<P> {
    pub fn with_parser(parser: P) -> Self {
        Self {
            parser,
            entries: HashMap::new(),
        }
    }

    pub fn geometry_for(&mut self, content: &Arc<str>) -> Arc<[GazeCircle]> {
        if let Some(circles) = self.entries.get(content) {
            return Arc::clone(circles);
        }

        let parsed = self.parser.parse(content);
        let total = parsed.len();
        let circles: Arc<[GazeCircle]> = parsed.into_iter().filter(GazeCircle::is_usable).collect();
        if circles.len() < total {
            log::warn!(
                "Dropped {} unusable gaze circle(s) from skin geometry",
                total - circles.len()
            );
        }

        self.entries.insert(Arc::clone(content), Arc::clone(&circles));
        circles
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Default)]
    struct CountingParser {
        calls: Cell<usize>,
    }

    impl GeometryParser for CountingParser {
        fn parse(&self, content: &str) -> Vec<GazeCircle> {
            self.calls.set(self.calls.get() + 1);
            SvgGeometryParser.parse(content)
        }
    }

    const EYE: &str = r#"<path inkscape:label="eye_circle" sodipodi:type="arc" sodipodi:cx="85" sodipodi:cy="60" sodipodi:rx="5" sodipodi:ry="5"/>"#;

    #[test]
    fn identical_content_is_parsed_once() {
        let mut cache = SkinGeometryCache::with_parser(CountingParser::default());

        let first: Arc<str> = Arc::from(EYE);
        // A distinct allocation with the same text must still hit the cache.
        let second: Arc<str> = Arc::from(String::from(EYE));

        let a = cache.geometry_for(&first);
        let b = cache.geometry_for(&second);

        assert_eq!(cache.parser().calls.get(), 1);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn distinct_content_parses_separately() {
        let mut cache = SkinGeometryCache::with_parser(CountingParser::default());
        cache.geometry_for(&Arc::from(EYE));
        cache.geometry_for(&Arc::from("<svg/>"));
        assert_eq!(cache.parser().calls.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn unusable_circles_are_filtered() {
        let svg = format!(
            "{EYE}<path inkscape:label=\"eye_circle\" sodipodi:type=\"arc\" sodipodi:cx=\"1\"/>"
        );
        let mut cache = SkinGeometryCache::new();
        let circles = cache.geometry_for(&Arc::from(svg));
        assert_eq!(circles.len(), 1);
        assert!(circles.iter().all(GazeCircle::is_usable));
    }
}
