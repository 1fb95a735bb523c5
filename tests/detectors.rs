use heuristic_vision::codec;
use heuristic_vision::{
    BoundingBox, Detection, ObjectClass, PixelBuffer, Vision, VisionConfig, VisionError,
};

const NEUTRAL: [u8; 3] = [128, 128, 128];
const SKIN: [u8; 3] = [150, 100, 60];

fn vision() -> Vision {
    Vision::from_config(VisionConfig::default()).expect("default vision")
}

fn square_on(size: u32, lo: u32, hi: u32, inside: [u8; 3], outside: [u8; 3]) -> PixelBuffer {
    PixelBuffer::from_fn(size, size, |x, y| {
        if (lo..hi).contains(&x) && (lo..hi).contains(&y) {
            inside
        } else {
            outside
        }
    })
}

/// Mixed scene with colored patches, a bright block and a skin patch.
fn busy_scene() -> PixelBuffer {
    PixelBuffer::from_fn(317, 211, |x, y| match (x / 50, y / 50) {
        (0, 0) => [220, 30, 30],
        (1, 0) => [30, 30, 220],
        (2, 0) => [30, 220, 30],
        (3, _) | (4, _) => [240, 240, 240],
        (0, 2) | (1, 2) | (0, 3) | (1, 3) => SKIN,
        _ => [(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8],
    })
}

fn assert_within(detections: &[Detection], width: u32, height: u32) {
    let frame = BoundingBox {
        x1: 0,
        y1: 0,
        x2: width - 1,
        y2: height - 1,
    };
    for d in detections {
        let b = d.bbox;
        assert!(b.x1 <= b.x2 && b.y1 <= b.y2, "{:?} inverted", b);
        assert!(frame.contains_box(&b), "{:?} outside {}x{}", b, width, height);
        assert!((0.0..=1.0).contains(&d.score), "score {} out of range", d.score);
    }
}

#[test]
fn red_square_is_reported_inside_its_area() {
    let image = square_on(200, 50, 150, [255, 0, 0], NEUTRAL);
    let objects = vision().detect_objects(&image).unwrap();

    let reds: Vec<_> = objects
        .iter()
        .filter(|d| d.label == ObjectClass::Red)
        .collect();
    assert!(!reds.is_empty());
    let area = BoundingBox {
        x1: 30,
        y1: 30,
        x2: 170,
        y2: 170,
    };
    for red in reds {
        assert!(area.contains_box(&red.bbox), "{:?} outside the square", red.bbox);
    }
    assert!(objects.iter().all(|d| d.label == ObjectClass::Red));
}

#[test]
fn labels_serialize_as_display_names() {
    let image = square_on(200, 50, 150, [255, 0, 0], NEUTRAL);
    let objects = vision().detect_objects(&image).unwrap();
    let json = serde_json::to_value(&objects[0]).unwrap();

    assert_eq!(json["label"], "Red Object");
    assert!(json["bbox"]["x1"].is_u64());
}

#[test]
fn dark_image_has_no_faces() {
    let dark = PixelBuffer::filled(200, 200, [10, 10, 10]);
    assert!(vision().detect_faces(&dark).unwrap().is_empty());
}

#[test]
fn skin_patch_is_one_face() {
    let image = square_on(240, 80, 160, SKIN, [0, 0, 0]);
    let faces = vision().detect_faces(&image).unwrap();

    assert_eq!(faces.len(), 1);
    assert_eq!(faces[0].label, ObjectClass::Face);
    assert_eq!(
        faces[0].bbox,
        BoundingBox {
            x1: 80,
            y1: 80,
            x2: 160,
            y2: 160
        }
    );
}

#[test]
fn centered_face_gives_neutral_pose() {
    let image = square_on(240, 80, 160, SKIN, [0, 0, 0]);
    let pose = vision().estimate_pose(&image).unwrap();

    let rotation = pose.rotation.expect("rotation");
    let translation = pose.translation.expect("translation");
    assert!(rotation.x.abs() < 1e-6 && rotation.y.abs() < 1e-6);
    assert_eq!(rotation.z, 0.0);
    assert!(translation.x.abs() < 1e-6 && translation.y.abs() < 1e-6);
    assert_eq!(translation.z, 1.0);
}

#[test]
fn empty_scene_gives_empty_pose() {
    let pose = vision()
        .estimate_pose(&PixelBuffer::filled(120, 120, [0, 0, 0]))
        .unwrap();
    assert!(pose.is_empty());
    assert_eq!(serde_json::to_string(&pose).unwrap(), "{}");
}

#[test]
fn every_box_stays_inside_the_image() {
    let image = busy_scene();
    let v = vision();
    let objects = v.detect_objects(&image).unwrap();
    let faces = v.detect_faces(&image).unwrap();

    assert!(objects.iter().any(|d| d.label == ObjectClass::Red));
    assert!(objects.iter().any(|d| d.label == ObjectClass::Rectangular));
    assert!(!faces.is_empty());
    assert_within(&objects, image.width(), image.height());
    assert_within(&faces, image.width(), image.height());
}

#[test]
fn objects_include_faces_after_colors_and_shapes() {
    let image = busy_scene();
    let v = vision();
    let objects = v.detect_objects(&image).unwrap();
    let faces = v.detect_faces(&image).unwrap();

    let tail = &objects[objects.len() - faces.len()..];
    assert_eq!(tail, faces.as_slice());
}

#[test]
fn repeated_calls_are_identical() {
    let image = busy_scene();
    let v = vision();

    assert_eq!(v.detect_objects(&image).unwrap(), v.detect_objects(&image).unwrap());
    assert_eq!(v.detect_faces(&image).unwrap(), v.detect_faces(&image).unwrap());
    assert_eq!(v.estimate_pose(&image).unwrap(), v.estimate_pose(&image).unwrap());
}

#[test]
fn buffers_smaller_than_the_stride_yield_nothing() {
    let v = vision();
    for (w, h) in [(0, 0), (1, 1), (15, 15), (19, 200)] {
        let tiny = PixelBuffer::filled(w, h, [255, 0, 0]);
        assert!(v.detect_objects(&tiny).unwrap().is_empty(), "{}x{}", w, h);
        assert!(v.detect_faces(&tiny).unwrap().is_empty(), "{}x{}", w, h);
        assert!(v.estimate_pose(&tiny).unwrap().is_empty(), "{}x{}", w, h);
    }
}

#[test]
fn path_and_buffer_inputs_agree() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.png");
    let image = busy_scene();
    codec::encode(&image, &path, 90).unwrap();

    let v = vision();
    assert_eq!(
        v.detect_objects(&path).unwrap(),
        v.detect_objects(&image).unwrap()
    );
}

#[test]
fn missing_and_garbage_inputs_fail() {
    let dir = tempfile::tempdir().unwrap();
    let v = vision();

    let missing = dir.path().join("missing.png");
    let err = v.detect_objects(&missing).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VisionError>(),
        Some(VisionError::NotFound { .. })
    ));

    let garbage = dir.path().join("garbage.jpg");
    std::fs::write(&garbage, b"definitely not an image").unwrap();
    let err = v.detect_faces(&garbage).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<VisionError>(),
        Some(VisionError::UnsupportedFormat { .. })
    ));
}

#[test]
fn null_driver_reports_no_signal() {
    let config = VisionConfig {
        driver: "null".to_string(),
        ..VisionConfig::default()
    };
    let v = Vision::from_config(config).unwrap();
    let image = busy_scene();

    assert!(v.detect_objects(&image).unwrap().is_empty());
    assert!(v.detect_faces(&image).unwrap().is_empty());
    assert!(v.estimate_pose(&image).unwrap().is_empty());
}
