//! Integration tests for the sampling pipeline.
//!
//! Exercises reelmask-media sources feeding the reelmask-ai sampler and
//! engine end to end.

use crate::support::{engine_with, ScriptedLoader};
use reelmask_ai::{
    CancelToken, EngineConfig, ExtractionOutcome, FrameSampler, InferenceEngine, ModelHandle,
    ModelStatus, SampleStep, UnavailableLoader,
};
use reelmask_core::{MemoryClass, PixelBuffer, Resolution};
use reelmask_media::PatternSource;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

// ── Grid & ordering ────────────────────────────────────────────

#[tokio::test]
async fn one_second_clip_yields_thirty_ordered_frames() {
    let loader = Arc::new(ScriptedLoader::new());
    let engine = engine_with(loader.clone());
    let sampler = FrameSampler::new(&engine);

    let mut extraction = sampler.extract(
        PatternSource::new(640, 360, 1.0),
        MemoryClass::Small,
        CancelToken::new(),
    );
    let ExtractionOutcome::Completed(video) = extraction.collect().await.unwrap() else {
        panic!("expected completion");
    };

    assert_eq!(video.frames.len(), 30);
    assert_eq!(video.resolution, Resolution::new(320, 180));
    for (i, pair) in video.frames.windows(2).enumerate() {
        let gap = pair[1].timestamp - pair[0].timestamp;
        assert!((gap - 1.0 / 30.0).abs() < 1e-9, "gap {gap} after frame {i}");
    }
    assert!(video.frames.iter().all(|f| f.timestamp < 1.0));
    assert_eq!(video.frames[29].id, "frame-0.967");

    // Low-confidence record is dropped on every frame
    assert!(video.frames.iter().all(|f| f.detections.len() == 1));
    assert_eq!(loader.loads.load(Ordering::SeqCst), 1);
    assert_eq!(loader.runs.load(Ordering::SeqCst), 30);
}

#[tokio::test]
async fn fractional_duration_rounds_up() {
    let engine = engine_with(Arc::new(UnavailableLoader));
    let sampler = FrameSampler::new(&engine);
    let mut extraction = sampler.extract(
        PatternSource::new(64, 64, 2.5),
        MemoryClass::Large,
        CancelToken::new(),
    );
    assert_eq!(extraction.total_frames(), 75);

    let ExtractionOutcome::Completed(video) = extraction.collect().await.unwrap() else {
        panic!("expected completion");
    };
    assert_eq!(video.frames.len(), 75);
    assert!(video.frames.iter().all(|f| f.detections.is_empty()));
    assert!(video.frames.iter().all(|f| !f.thumbnail.is_empty()));
}

// ── Cancellation ───────────────────────────────────────────────

#[tokio::test]
async fn cancel_midway_keeps_delivered_frames() {
    let engine = engine_with(Arc::new(ScriptedLoader::new()));
    let sampler = FrameSampler::new(&engine);
    let cancel = CancelToken::new();
    let mut extraction =
        sampler.extract(PatternSource::new(64, 64, 1.0), MemoryClass::Medium, cancel.clone());

    let mut delivered = 0;
    while let SampleStep::Frame(_) = extraction.next().await.unwrap() {
        delivered += 1;
        if delivered == 10 {
            cancel.cancel();
        }
    }

    assert_eq!(delivered, 10);
    assert_eq!(extraction.source().seek_count(), 10);
    assert_eq!(extraction.source().release_count(), 1);
}

// ── Cache & shared model ───────────────────────────────────────

#[tokio::test]
async fn sampled_frames_are_cached_until_next_extraction() {
    let loader = Arc::new(ScriptedLoader::new());
    let engine = engine_with(loader.clone());
    let sampler = FrameSampler::new(&engine);

    let mut first = sampler.extract(
        PatternSource::new(64, 64, 0.2),
        MemoryClass::Large,
        CancelToken::new(),
    );
    let ExtractionOutcome::Completed(video) = first.collect().await.unwrap() else {
        panic!("expected completion");
    };
    drop(first);
    assert_eq!(engine.cache_len(), 6);

    let again = engine.process_frame(PixelBuffer::new(64, 64), 4).await;
    assert!(Arc::ptr_eq(&again, &video.frames[4]));
    assert_eq!(loader.runs.load(Ordering::SeqCst), 6);

    let _second = sampler.extract(
        PatternSource::new(64, 64, 0.2),
        MemoryClass::Large,
        CancelToken::new(),
    );
    assert_eq!(engine.cache_len(), 0);
}

#[tokio::test]
async fn parallel_extractions_share_one_model_load() {
    let mut loader = ScriptedLoader::new();
    loader.delay = Duration::from_millis(20);
    let loads = loader.loads.clone();
    let loader = Arc::new(loader);

    let config = EngineConfig::default();
    let model = Arc::new(ModelHandle::new("/shared/model.onnx"));
    let a = Arc::new(InferenceEngine::with_model(
        config.clone(),
        model.clone(),
        loader.clone(),
    ));
    let b = Arc::new(InferenceEngine::with_model(config, model.clone(), loader));

    let run = |engine: Arc<InferenceEngine>| async move {
        let sampler = FrameSampler::new(&engine);
        let mut extraction = sampler.extract(
            PatternSource::new(32, 32, 0.2),
            MemoryClass::Large,
            CancelToken::new(),
        );
        match extraction.collect().await.unwrap() {
            ExtractionOutcome::Completed(video) => video.frames.len(),
            ExtractionOutcome::Cancelled(_) => 0,
        }
    };

    let (frames_a, frames_b) = tokio::join!(run(a), run(b));
    assert_eq!(frames_a, 6);
    assert_eq!(frames_b, 6);
    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert_eq!(model.status(), ModelStatus::Ready);
}
