//! Frame-pipeline tests against stub detectors.

use anyhow::anyhow;
use image::{ImageBuffer, Rgb};

use rusty_iris::pipeline::{FaceLandmarker, IrisDetector, IrisPipeline};
use rusty_iris::types::{BoundingBox, EyeLandmarks, FaceResult};

struct FixedFaces {
    faces: usize,
    left: BoundingBox,
    right: BoundingBox,
}

impl FaceLandmarker for FixedFaces {
    fn detect(&mut self, _frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> anyhow::Result<Vec<FaceResult>> {
        Ok(vec![FaceResult::default(); self.faces])
    }

    fn eye_bounding_boxes(&self, _face: &FaceResult) -> (BoundingBox, BoundingBox) {
        (self.left, self.right)
    }
}

/// Returns a fixed raw landmark set in 64x64 model space.
struct StubIris {
    iris: Vec<[f32; 3]>,
    fail: bool,
}

impl StubIris {
    fn centered() -> Self {
        Self {
            iris: vec![[32.0, 32.0, 1.0]; 5],
            fail: false,
        }
    }

    fn spread() -> Self {
        Self {
            iris: vec![
                [32.0, 32.0, 1.0],
                [22.0, 32.0, 1.0],
                [42.0, 32.0, 1.0],
                [32.0, 22.0, 1.0],
                [32.0, 42.0, 1.0],
            ],
            fail: false,
        }
    }
}

impl IrisDetector for StubIris {
    fn input_shape(&self) -> (u32, u32) {
        (64, 64)
    }

    fn detect(&mut self, eye_image: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> anyhow::Result<EyeLandmarks> {
        if self.fail {
            return Err(anyhow!("model exploded"));
        }
        assert!(
            eye_image.width() > 0 && eye_image.height() > 0,
            "pipeline must never hand an empty crop to the detector"
        );
        Ok(EyeLandmarks {
            eye_contour: vec![[0.0, 0.0, 0.0]; 71],
            iris: self.iris.clone(),
        })
    }
}

fn frame(w: u32, h: u32) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
    ImageBuffer::from_pixel(w, h, Rgb([50, 50, 50]))
}

#[test]
fn tracks_both_eyes_of_one_face() {
    let faces = FixedFaces {
        faces: 1,
        left: BoundingBox::new(10, 10, 30, 30),
        right: BoundingBox::new(60, 10, 80, 30),
    };
    let mut pipeline = IrisPipeline::new(Box::new(faces), Box::new(StubIris::centered()));

    let tracks = pipeline.process(&frame(100, 100)).unwrap();
    assert_eq!(tracks.len(), 1);

    // Model-space center of a 20x20 box at (10, 10): floor(32 * 20/64) + 10.
    let left = tracks[0].left.as_ref().unwrap();
    assert!(left.points.iter().all(|p| (p.x, p.y) == (20, 20)));
    assert_eq!((left.circle.cx, left.circle.cy, left.circle.radius), (20, 20, 0));

    let right = tracks[0].right.as_ref().unwrap();
    assert_eq!((right.circle.cx, right.circle.cy, right.circle.radius), (70, 20, 0));
}

#[test]
fn fits_circle_around_spread_landmarks() {
    let faces = FixedFaces {
        faces: 1,
        left: BoundingBox::new(0, 0, 64, 64),
        right: BoundingBox::new(0, 0, 64, 64),
    };
    let mut pipeline = IrisPipeline::new(Box::new(faces), Box::new(StubIris::spread()));

    let tracks = pipeline.process(&frame(64, 64)).unwrap();
    let eye = tracks[0].left.as_ref().unwrap();

    // Box matches model space 1:1, so the boundary points sit 10 px out.
    assert_eq!((eye.circle.cx, eye.circle.cy), (32, 32));
    assert_eq!(eye.circle.radius, 10);
}

#[test]
fn eye_outside_frame_is_skipped_not_fatal() {
    let faces = FixedFaces {
        faces: 1,
        left: BoundingBox::new(-5, -5, 5, 5),
        right: BoundingBox::new(150, 150, 170, 170),
    };
    let mut pipeline = IrisPipeline::new(Box::new(faces), Box::new(StubIris::centered()));

    let tracks = pipeline.process(&frame(100, 100)).unwrap();

    // Left clamps to (0,0,5,5) and still tracks; right clamps away entirely.
    assert!(tracks[0].left.is_some());
    assert!(tracks[0].right.is_none());
}

#[test]
fn detector_failure_blanks_both_eyes() {
    let faces = FixedFaces {
        faces: 1,
        left: BoundingBox::new(10, 10, 30, 30),
        right: BoundingBox::new(60, 10, 80, 30),
    };
    let iris = StubIris {
        iris: Vec::new(),
        fail: true,
    };
    let mut pipeline = IrisPipeline::new(Box::new(faces), Box::new(iris));

    let tracks = pipeline.process(&frame(100, 100)).unwrap();
    assert!(tracks[0].left.is_none());
    assert!(tracks[0].right.is_none());
}

#[test]
fn reports_one_track_per_face() {
    let faces = FixedFaces {
        faces: 3,
        left: BoundingBox::new(10, 10, 30, 30),
        right: BoundingBox::new(60, 10, 80, 30),
    };
    let mut pipeline = IrisPipeline::new(Box::new(faces), Box::new(StubIris::centered()));

    let tracks = pipeline.process(&frame(100, 100)).unwrap();
    assert_eq!(tracks.len(), 3);
}
