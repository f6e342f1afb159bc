//! Integration tests for editing masks on sampled frames.
//!
//! Exercises reelmask-ai frame results flowing into reelmask-editor.

use crate::support::{engine_with, ScriptedLoader};
use reelmask_core::{PixelBuffer, Point, Rect};
use reelmask_editor::{EditorTool, MaskPatch, MaskStore};
use std::sync::Arc;

#[tokio::test]
async fn detections_seed_editable_masks() {
    let engine = engine_with(Arc::new(ScriptedLoader::new()));
    let frame = engine
        .process_frame(PixelBuffer::solid(128, 72, [0, 0, 0, 255]), 0)
        .await;
    assert_eq!(frame.detections.len(), 1);

    let mut store = MaskStore::from_detections(&frame);
    assert_eq!(store.masks().len(), 1);
    let id = store.masks()[0].id;
    assert_eq!(store.masks()[0].bounding_box(), Rect::new(0.0, 10.0, 40.0, 40.0));

    // Grab the top-left corner and move the box right by 20
    store.begin_stroke(Point::new(2.0, 12.0));
    store.pointer_move(Point::new(22.0, 12.0));
    assert!(store.end_stroke().is_none());
    assert_eq!(store.get(id).unwrap().bounding_box(), Rect::new(20.0, 10.0, 40.0, 40.0));

    store.update(
        id,
        MaskPatch {
            color: Some("yellow".into()),
            ..MaskPatch::default()
        },
    );
    assert_eq!(store.get(id).unwrap().color, "yellow");
}

#[test]
fn draw_then_erase_session() {
    let mut store = MaskStore::new();

    store.pointer_down(EditorTool::Draw, Point::new(100.0, 100.0));
    store.pointer_move(Point::new(200.0, 100.0));
    store.pointer_move(Point::new(150.0, 180.0));
    let drawn = store.end_stroke().unwrap();

    // Pressing inside the triangle with Draw starts a new stroke (no vertex hit)
    store.pointer_down(EditorTool::Draw, Point::new(150.0, 130.0));
    store.pointer_move(Point::new(151.0, 131.0));
    assert!(store.end_stroke().is_none());
    assert_eq!(store.masks().len(), 1);

    store.pointer_down(EditorTool::Erase, Point::new(150.0, 130.0));
    assert!(store.get(drawn).is_none());
    assert!(store.masks().is_empty());
}
