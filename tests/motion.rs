use std::time::Duration;

use heuristic_vision::ingest::ExtractConfig;
use heuristic_vision::motion::{ActivityGrid, MotionTracker};
use heuristic_vision::{
    BoundingBox, FrameExtractor, IndexedFrame, PixelBuffer, Vision, VisionConfig,
};

const BACKGROUND: [u8; 3] = [40, 40, 40];

fn frame_with_blocks(blocks: &[(u32, u32, u32)]) -> PixelBuffer {
    PixelBuffer::from_fn(64, 64, |x, y| {
        let lit = blocks
            .iter()
            .any(|&(bx, by, size)| (bx..bx + size).contains(&x) && (by..by + size).contains(&y));
        if lit {
            [220, 220, 220]
        } else {
            BACKGROUND
        }
    })
}

#[test]
fn changed_block_is_a_single_region() {
    let frames = IndexedFrame::sequence(vec![
        frame_with_blocks(&[]),
        frame_with_blocks(&[(16, 16, 32)]),
    ]);
    let motion: Vec<_> = MotionTracker::default().track(frames).collect();

    assert_eq!(motion.len(), 2);
    assert_eq!(motion[0].frame_index, 0);
    assert!(motion[0].regions.is_empty());
    assert_eq!(motion[1].frame_index, 1);
    assert_eq!(motion[1].regions.len(), 1);
    assert_eq!(
        motion[1].regions[0].bbox,
        BoundingBox {
            x1: 16,
            y1: 16,
            x2: 48,
            y2: 48
        }
    );
    assert_eq!(motion[1].regions[0].bbox.width(), 32);
    assert_eq!(motion[1].regions[0].bbox.height(), 32);
    assert!((motion[1].regions[0].score - 0.2).abs() < 1e-6);
}

#[test]
fn n_frames_yield_n_elements() {
    let buffers: Vec<_> = (0..7)
        .map(|i| frame_with_blocks(&[(i * 8, 0, 16)]))
        .collect();
    let motion: Vec<_> = MotionTracker::default()
        .track(IndexedFrame::sequence(buffers))
        .collect();

    assert_eq!(motion.len(), 7);
    assert!(motion[0].regions.is_empty());
    assert_eq!(
        motion.iter().map(|m| m.frame_index).collect::<Vec<_>>(),
        (0..7).collect::<Vec<_>>()
    );
}

#[test]
fn diagonal_blocks_stay_separate() {
    let prev = frame_with_blocks(&[]);
    let curr = frame_with_blocks(&[(0, 0, 16), (16, 16, 16)]);

    let grid = ActivityGrid::diff(&prev, &curr, 16, 2, 30.0);
    assert_eq!(grid.blobs().len(), 2);

    let regions = MotionTracker::default().regions(&prev, &curr);
    assert_eq!(regions.len(), 2);
    assert!(regions.iter().all(|r| (r.score - 0.05).abs() < 1e-6));
}

#[test]
fn regions_are_bounded_and_scored() {
    let prev = PixelBuffer::from_fn(100, 70, |x, y| [(x * 2) as u8, (y * 3) as u8, 0]);
    let curr = PixelBuffer::from_fn(100, 70, |x, y| [(y * 2) as u8, (x * 3) as u8, 90]);

    let frame = BoundingBox {
        x1: 0,
        y1: 0,
        x2: 99,
        y2: 69,
    };
    for region in MotionTracker::default().regions(&prev, &curr) {
        assert!(region.bbox.x1 <= region.bbox.x2 && region.bbox.y1 <= region.bbox.y2);
        assert!(frame.contains_box(&region.bbox), "{:?} outside 100x70", region.bbox);
        assert!((0.0..=1.0).contains(&region.score));
    }
}

#[test]
fn tracking_is_deterministic() {
    let buffers = || {
        IndexedFrame::sequence(vec![
            frame_with_blocks(&[(0, 0, 16)]),
            frame_with_blocks(&[(16, 0, 32), (0, 48, 16)]),
            frame_with_blocks(&[]),
        ])
    };
    let tracker = MotionTracker::default();
    let first: Vec<_> = tracker.track(buffers()).collect();
    let second: Vec<_> = tracker.track(buffers()).collect();

    assert_eq!(first, second);
}

#[test]
fn vision_tracks_in_memory_frames() {
    let vision = Vision::from_config(VisionConfig::default()).unwrap();
    let frames = IndexedFrame::sequence(vec![
        frame_with_blocks(&[]),
        frame_with_blocks(&[(16, 16, 32)]),
        frame_with_blocks(&[(16, 16, 32)]),
    ]);
    let motion: Vec<_> = vision.track_frames(frames).collect();

    assert_eq!(motion.len(), 3);
    assert_eq!(motion[1].regions.len(), 1);
    assert!(motion[2].regions.is_empty());
}

#[test]
fn null_driver_tracks_without_regions() {
    let config = VisionConfig {
        driver: "null".to_string(),
        ..VisionConfig::default()
    };
    let vision = Vision::from_config(config).unwrap();
    let frames = IndexedFrame::sequence(vec![
        frame_with_blocks(&[]),
        frame_with_blocks(&[(16, 16, 32)]),
    ]);
    let motion: Vec<_> = vision.track_frames(frames).collect();

    assert_eq!(motion.len(), 2);
    assert!(motion.iter().all(|m| m.regions.is_empty()));
}

#[test]
fn missing_video_tracks_nothing() {
    let vision = Vision::from_config(VisionConfig::default()).unwrap();
    let motion: Vec<_> = vision.track("/no/such/clip.mp4").unwrap().collect();

    assert!(motion.is_empty());
}

#[test]
fn unavailable_ffmpeg_yields_empty_track() {
    let video = tempfile::NamedTempFile::new().unwrap();
    let mut config = VisionConfig::default();
    config.ffmpeg.binary = "vision-test-missing-ffmpeg".to_string();
    config.ffmpeg.timeout = Duration::from_secs(2);
    let vision = Vision::from_config(config).unwrap();

    let motion: Vec<_> = vision.track(video.path()).unwrap().collect();
    assert!(motion.is_empty());
}

#[test]
fn extractor_follows_config() {
    let mut config = VisionConfig::default();
    config.motion.fps = 4.0;
    config.motion.scale = 160;
    let extractor = FrameExtractor::new(ExtractConfig::from_config(&config));

    assert_eq!(extractor.config().fps, 4.0);
    assert_eq!(extractor.config().scale, 160);
    assert_eq!(extractor.config().timeout, Duration::from_secs(60));
}
