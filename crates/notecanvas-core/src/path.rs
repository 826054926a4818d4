//! Stroke path construction and the SVG path encoding used on disk.

use kurbo::{BezPath, PathEl, Point};
use std::fmt::Write;

/// Build a renderable path from an ordered list of content-space points.
///
/// Returns `None` for fewer than two points: a single touch is not a stroke.
pub fn build_path(points: &[Point]) -> Option<BezPath> {
    let (first, rest) = points.split_first()?;
    if rest.is_empty() {
        return None;
    }

    let mut path = BezPath::new();
    path.move_to(*first);
    for point in rest {
        path.line_to(*point);
    }
    Some(path)
}

/// Encode points as an SVG path string (`M x y L x y ...`).
pub fn points_to_svg(points: &[Point]) -> String {
    let mut out = String::new();
    for (i, point) in points.iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        if i > 0 {
            out.push(' ');
        }
        // Writing into a String cannot fail.
        let _ = write!(out, "{} {} {}", command, point.x, point.y);
    }
    out
}

/// Encode a path built by [`build_path`] as an SVG path string.
///
/// Curve segments are flattened to their end points.
pub fn path_to_svg(path: &BezPath) -> String {
    points_to_svg(&path_points(path))
}

/// End points of every segment in a path, in order.
pub fn path_points(path: &BezPath) -> Vec<Point> {
    path.elements()
        .iter()
        .filter_map(|el| match *el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => Some(p),
            PathEl::QuadTo(_, p) => Some(p),
            PathEl::CurveTo(_, _, p) => Some(p),
            PathEl::ClosePath => None,
        })
        .collect()
}

/// Serde adapter storing a [`BezPath`] as its SVG string.
///
/// An unreadable string deserializes to an empty path; strokes are rebuilt
/// from their point list after load.
pub(crate) mod svg_string {
    use super::path_to_svg;
    use kurbo::BezPath;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(path: &BezPath, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&path_to_svg(path))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BezPath, D::Error> {
        let data = String::deserialize(deserializer)?;
        if data.trim().is_empty() {
            return Ok(BezPath::new());
        }
        Ok(BezPath::from_svg(&data).unwrap_or_else(|e| {
            log::warn!("Dropping unreadable stroke path: {}", e);
            BezPath::new()
        }))
    }
}
