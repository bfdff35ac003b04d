use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

const GAZE_LABEL: &str = "eye_circle";
const ARC_TYPE: &str = "arc";

static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"));
static PATH_ELEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<path\b((?:[^>"']|"[^"]*"|'[^']*')*)>"#).expect("path element regex is valid")
});
static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][\w:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute regex is valid")
});
static ROTATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"rotate\(\s*([-+]?[\d.]+(?:[eE][-+]?\d+)?)\s*\)").expect("rotate regex is valid")
});

/// An eye socket in skin-local coordinates. `rotation` is in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeCircle {
    pub cx: f64,
    pub cy: f64,
    pub rx: f64,
    pub ry: f64,
    pub rotation: f64,
}

impl GazeCircle {
    pub fn new(cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        Self {
            cx,
            cy,
            rx,
            ry,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, rotation: f64) -> Self {
        self.rotation = rotation;
        self
    }

    /// False when any field failed to parse.
    pub fn is_usable(&self) -> bool {
        [self.cx, self.cy, self.rx, self.ry, self.rotation]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Extracts gaze circles from a skin description.
pub trait GeometryParser {
    fn parse(&self, content: &str) -> Vec<GazeCircle>;
}

/// Reads Inkscape arc annotations out of SVG markup.
///
/// Only `<path>` elements labelled `eye_circle` with `sodipodi:type="arc"` are
/// considered. Missing or malformed numbers come back as NaN so that callers can
/// drop the circle without losing the rest of the skin.
#[derive(Debug, Default, Clone, Copy)]
pub struct SvgGeometryParser;

impl GeometryParser for SvgGeometryParser {
    fn parse(&self, content: &str) -> Vec<GazeCircle> {
        let content = COMMENT.replace_all(content, "");
        PATH_ELEMENT
            .captures_iter(&content)
            .filter_map(|element| {
                let attrs = attributes(element.get(1)?.as_str());
                if attrs.get("inkscape:label") != Some(&GAZE_LABEL)
                    || attrs.get("sodipodi:type") != Some(&ARC_TYPE)
                {
                    return None;
                }

                let number = |name: &str| {
                    attrs
                        .get(name)
                        .and_then(|v| v.trim().parse::<f64>().ok())
                        .unwrap_or(f64::NAN)
                };

                let rotation = attrs
                    .get("transform")
                    .map(|t| rotation_radians(t))
                    .unwrap_or(0.0);

                Some(
                    GazeCircle::new(
                        number("sodipodi:cx"),
                        number("sodipodi:cy"),
                        number("sodipodi:rx"),
                        number("sodipodi:ry"),
                    )
                    .with_rotation(rotation),
                )
            })
            .collect()
    }
}

fn attributes(raw: &str) -> HashMap<&str, &str> {
    ATTRIBUTE
        .captures_iter(raw)
        .filter_map(|c| {
            let name = c.get(1)?.as_str();
            let value = c.get(2).or_else(|| c.get(3))?.as_str();
            Some((name, value))
        })
        .collect()
}

fn rotation_radians(transform: &str) -> f64 {
    match ROTATE.captures(transform) {
        Some(c) => c[1]
            .parse::<f64>()
            .map(f64::to_radians)
            .unwrap_or(f64::NAN),
        None => 0.0,
    }
}
