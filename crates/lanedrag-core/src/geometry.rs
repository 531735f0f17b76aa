//! Nearest-element heuristics and boundary clamping.
//!
//! Everything in here is pure: it takes rectangles and points, never touches
//! the document, and is cheap enough to run on every pointer move.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Basis used when comparing an element's center against the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Compare x coordinates.
    Horizontal,
    /// Compare y coordinates.
    #[default]
    Vertical,
}

impl Axis {
    /// Pick the horizontal axis when `horizontal` is set.
    pub fn from_flag(horizontal: bool) -> Self {
        if horizontal {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    /// Component of `point` along this axis.
    pub fn of(self, point: Point) -> f64 {
        match self {
            Axis::Horizontal => point.x,
            Axis::Vertical => point.y,
        }
    }
}

/// Signed distance from the center of `rect` to `point` along `axis`.
///
/// Positive means the point lies after the center. Looking at the center is
/// enough unless elements overlap.
pub fn axis_distance(rect: Rect, point: Point, axis: Axis) -> f64 {
    axis.of(point) - axis.of(rect.center())
}

/// Result of a nearest-element scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<T> {
    /// Closest candidate, `None` when there were no candidates.
    pub element: Option<T>,
    /// Absolute distance to the closest candidate (`f64::INFINITY` if none).
    pub distance: f64,
    /// Whether the point lies before the candidate's center.
    pub before: Option<bool>,
}

impl<T> Nearest<T> {
    /// The result of scanning an empty candidate set.
    pub fn none() -> Self {
        Self {
            element: None,
            distance: f64::INFINITY,
            before: None,
        }
    }
}

/// Find the candidate whose center is closest to `point` along `axis`.
///
/// Ties go to the first candidate encountered.
pub fn nearest<T, I>(candidates: I, point: Point, axis: Axis) -> Nearest<T>
where
    I: IntoIterator<Item = (T, Rect)>,
{
    let mut info = Nearest::none();
    for (element, rect) in candidates {
        let signed = axis_distance(rect, point, axis);
        let distance = signed.abs();
        if distance < info.distance {
            info = Nearest {
                element: Some(element),
                distance,
                before: Some(signed < 0.0),
            };
        }
    }
    info
}

/// Clamp the top-left corner of `rect` so the box stays inside `bounds`.
///
/// Each axis is handled on its own. On an axis where the box is larger than
/// the bounds the original coordinate is returned, since no position would
/// satisfy the constraint.
pub fn clamp_within(rect: Rect, bounds: Rect) -> Point {
    Point::new(
        clamp_axis(rect.x0, rect.width(), bounds.x0, bounds.width()),
        clamp_axis(rect.y0, rect.height(), bounds.y0, bounds.height()),
    )
}

fn clamp_axis(start: f64, size: f64, origin: f64, extent: f64) -> f64 {
    if size > extent {
        return start;
    }
    start.clamp(origin, origin + extent - size)
}
