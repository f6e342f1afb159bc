//! Mask collection and pointer gesture handling for one frame.

use crate::mask::{Mask, MaskId, DEFAULT_MASK_COLOR, MIN_MASK_POINTS};
use crate::tool::EditorTool;
use reelmask_ai::FrameResult;
use reelmask_core::Point;
use tracing::debug;

/// Pointer gesture in progress.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    /// Collecting points for a new mask.
    Drawing { points: Vec<Point> },
    /// Moving a mask; `anchor` is the last pointer position applied.
    Dragging { mask_id: MaskId, anchor: Point },
}

/// Partial update to a mask. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskPatch {
    pub points: Option<Vec<Point>>,
    pub color: Option<String>,
}

/// Masks of one frame plus the gesture being performed on them.
///
/// Single-writer: callers feed pointer events in order from one thread.
#[derive(Debug, Clone, Default)]
pub struct MaskStore {
    masks: Vec<Mask>,
    selected: Option<MaskId>,
    gesture: Gesture,
}

impl MaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed one rectangle mask per detection box of `frame`.
    pub fn from_detections(frame: &FrameResult) -> Self {
        let masks = frame
            .detections
            .iter()
            .map(|d| Mask::from_rect(d.bbox, DEFAULT_MASK_COLOR))
            .collect();
        Self {
            masks,
            ..Self::default()
        }
    }

    /// Masks in creation order.
    pub fn masks(&self) -> &[Mask] {
        &self.masks
    }

    pub fn get(&self, id: MaskId) -> Option<&Mask> {
        self.masks.iter().find(|m| m.id == id)
    }

    pub fn selected(&self) -> Option<MaskId> {
        self.selected
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Add an existing mask.
    pub fn insert(&mut self, mask: Mask) -> MaskId {
        let id = mask.id;
        self.masks.push(mask);
        id
    }

    /// First mask with a vertex within the hit radius of `point`.
    pub fn hit_test(&self, point: Point) -> Option<MaskId> {
        self.masks.iter().find(|m| m.hit_vertex(point)).map(|m| m.id)
    }

    /// Press: grab the mask under `point`, or start a new stroke there.
    pub fn begin_stroke(&mut self, point: Point) {
        match self.hit_test(point) {
            Some(mask_id) => self.begin_drag(mask_id, point),
            None => {
                self.selected = None;
                self.gesture = Gesture::Drawing {
                    points: vec![point],
                };
            }
        }
    }

    /// Pointer motion during a press: appends to the stroke being drawn or
    /// moves the grabbed mask.
    pub fn extend_stroke(&mut self, point: Point) {
        match &mut self.gesture {
            Gesture::Drawing { points } => points.push(point),
            Gesture::Dragging { .. } => self.drag_to(point),
            Gesture::Idle => {}
        }
    }

    /// Move the dragged mask by the pointer delta since the last event.
    pub fn drag_to(&mut self, point: Point) {
        let Gesture::Dragging { mask_id, anchor } = &mut self.gesture else {
            return;
        };
        let delta = point - *anchor;
        *anchor = point;
        let mask_id = *mask_id;
        if let Some(mask) = self.masks.iter_mut().find(|m| m.id == mask_id) {
            mask.translate(delta);
        }
    }

    /// Pointer motion, dispatched on the current gesture.
    pub fn pointer_move(&mut self, point: Point) {
        self.extend_stroke(point);
    }

    /// Release. Returns the id of the mask committed from the stroke, if any.
    ///
    /// Strokes with fewer than three points are discarded. The selection
    /// survives the end of a drag.
    pub fn end_stroke(&mut self) -> Option<MaskId> {
        match std::mem::take(&mut self.gesture) {
            Gesture::Drawing { points } => {
                let point_count = points.len();
                let mask = Mask::new(points, DEFAULT_MASK_COLOR);
                match mask {
                    Some(mask) => {
                        debug!(mask = %mask.id, points = point_count, "Mask committed");
                        Some(self.insert(mask))
                    }
                    None => {
                        debug!(
                            points = point_count,
                            min = MIN_MASK_POINTS,
                            "Stroke discarded"
                        );
                        None
                    }
                }
            }
            Gesture::Dragging { .. } | Gesture::Idle => None,
        }
    }

    /// Press with a specific tool.
    ///
    /// `Move` only grabs existing masks; `Erase` deletes the mask under the
    /// pointer, matched by vertex or by polygon interior.
    pub fn pointer_down(&mut self, tool: EditorTool, point: Point) {
        match tool {
            EditorTool::Draw => self.begin_stroke(point),
            EditorTool::Move => match self.hit_test(point) {
                Some(mask_id) => self.begin_drag(mask_id, point),
                None => {
                    self.selected = None;
                    self.gesture = Gesture::Idle;
                }
            },
            EditorTool::Erase => {
                self.gesture = Gesture::Idle;
                let target = self
                    .hit_test(point)
                    .or_else(|| self.masks.iter().find(|m| m.contains(point)).map(|m| m.id));
                if let Some(id) = target {
                    self.delete(id);
                }
            }
        }
    }

    /// Remove a mask. No-op if absent.
    pub fn delete(&mut self, id: MaskId) {
        let before = self.masks.len();
        self.masks.retain(|m| m.id != id);
        if self.masks.len() == before {
            return;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        if matches!(self.gesture, Gesture::Dragging { mask_id, .. } if mask_id == id) {
            self.gesture = Gesture::Idle;
        }
        debug!(mask = %id, "Mask deleted");
    }

    /// Merge `patch` into a mask. No-op if absent; a points patch with fewer
    /// than three points is ignored while the color still applies.
    pub fn update(&mut self, id: MaskId, patch: MaskPatch) {
        let Some(mask) = self.masks.iter_mut().find(|m| m.id == id) else {
            return;
        };
        if let Some(points) = patch.points {
            if !mask.set_points(points) {
                debug!(mask = %id, "Ignoring outline with too few points");
            }
        }
        if let Some(color) = patch.color {
            mask.color = color;
        }
    }

    fn begin_drag(&mut self, mask_id: MaskId, point: Point) {
        self.selected = Some(mask_id);
        self.gesture = Gesture::Dragging {
            mask_id,
            anchor: point,
        };
    }
}
