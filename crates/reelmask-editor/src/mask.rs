//! Polygon masks drawn over a frame.

use reelmask_core::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a mask within a store.
pub type MaskId = Uuid;

/// Color given to masks committed from a stroke.
pub const DEFAULT_MASK_COLOR: &str = "red";

/// Fewest points a stored mask may have.
pub const MIN_MASK_POINTS: usize = 3;

/// Per-axis distance within which a pointer grabs a mask vertex.
pub const HIT_RADIUS: f32 = 10.0;

/// A closed polygon mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MaskRecord")]
pub struct Mask {
    /// Unique mask ID
    pub id: MaskId,
    /// Polygon vertices in frame-pixel space
    points: Vec<Point>,
    /// Display color (CSS-style name or hex)
    pub color: String,
}

/// Serialized form, checked before it becomes a [`Mask`].
#[derive(Deserialize)]
struct MaskRecord {
    id: MaskId,
    points: Vec<Point>,
    color: String,
}

impl TryFrom<MaskRecord> for Mask {
    type Error = String;

    fn try_from(record: MaskRecord) -> Result<Self, Self::Error> {
        if record.points.len() < MIN_MASK_POINTS {
            return Err(format!(
                "mask {} has {} points, at least {MIN_MASK_POINTS} required",
                record.id,
                record.points.len()
            ));
        }
        Ok(Self {
            id: record.id,
            points: record.points,
            color: record.color,
        })
    }
}

impl Mask {
    /// Create a mask with a fresh ID. Returns `None` for fewer than three points.
    pub fn new(points: Vec<Point>, color: impl Into<String>) -> Option<Self> {
        if points.len() < MIN_MASK_POINTS {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            points,
            color: color.into(),
        })
    }

    /// Rectangle mask covering `rect`, corners clockwise from top-left.
    pub fn from_rect(rect: Rect, color: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: rect.corners().to_vec(),
            color: color.into(),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Replace the outline. Ignored (returns false) for fewer than three points.
    pub fn set_points(&mut self, points: Vec<Point>) -> bool {
        if points.len() < MIN_MASK_POINTS {
            return false;
        }
        self.points = points;
        true
    }

    /// Move every vertex by `delta`.
    pub fn translate(&mut self, delta: Point) {
        for p in &mut self.points {
            *p += delta;
        }
    }

    /// Whether `point` is within [`HIT_RADIUS`] of any vertex on both axes.
    pub fn hit_vertex(&self, point: Point) -> bool {
        self.points.iter().any(|p| {
            let d = (*p - point).abs();
            d.x < HIT_RADIUS && d.y < HIT_RADIUS
        })
    }

    /// Even-odd point-in-polygon test.
    pub fn contains(&self, point: Point) -> bool {
        let n = self.points.len();
        let mut inside = false;

        for i in 0..n {
            let p0 = self.points[i];
            let p1 = self.points[(i + 1) % n];

            // Ray casting: count horizontal ray crossings
            if (p0.y <= point.y && p1.y > point.y) || (p1.y <= point.y && p0.y > point.y) {
                let t = (point.y - p0.y) / (p1.y - p0.y);
                let x_intersect = p0.x + t * (p1.x - p0.x);
                if point.x < x_intersect {
                    inside = !inside;
                }
            }
        }

        inside
    }

    /// Axis-aligned bounds of the outline.
    pub fn bounding_box(&self) -> Rect {
        Rect::bounding(&self.points).unwrap_or_default()
    }
}
