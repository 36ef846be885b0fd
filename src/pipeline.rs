//! Per-eye and per-frame iris tracking.
//!
//! The model handles are passed in behind traits so the pipeline can be run
//! against stub detectors in tests. Processing is synchronous and
//! frame-at-a-time; nothing is carried over between frames.

use image::{ImageBuffer, Rgb};

use crate::error::{Result, TrackError};
use crate::geometry;
use crate::types::{BoundingBox, Circle, EyeLandmarks, FaceResult, IrisPoint};

/// Number of iris landmarks a successful detection yields.
pub const IRIS_POINT_COUNT: usize = 5;

/// Face landmark collaborator: finds faces and derives per-eye regions.
pub trait FaceLandmarker {
    fn detect(&mut self, frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> anyhow::Result<Vec<FaceResult>>;
    fn eye_bounding_boxes(&self, face: &FaceResult) -> (BoundingBox, BoundingBox);
}

/// Iris landmark collaborator: fixed input space, raw landmarks per crop.
pub trait IrisDetector {
    /// Coordinate space the detector's outputs are expressed in. Constant
    /// for the lifetime of the model.
    fn input_shape(&self) -> (u32, u32);
    fn detect(&mut self, eye_image: &ImageBuffer<Rgb<u8>, Vec<u8>>)
        -> anyhow::Result<EyeLandmarks>;
}

/// One eye's result: the 5 frame-space iris points and their circumscribed
/// circle.
#[derive(Debug, Clone)]
pub struct TrackedEye {
    pub points: Vec<IrisPoint>,
    pub circle: Circle,
}

/// Per-face output of one frame. An eye that failed detection is `None` and
/// simply isn't drawn.
#[derive(Debug, Clone)]
pub struct FaceTrack {
    pub left_bbox: BoundingBox,
    pub right_bbox: BoundingBox,
    pub left: Option<TrackedEye>,
    pub right: Option<TrackedEye>,
}

/// Clamp -> crop -> detect -> remap -> fit for a single eye.
///
/// The crop is an independent buffer, so the caller is free to draw onto the
/// frame while results are still in flight. Errors cover the degenerate
/// region, a failed detector call, and a malformed landmark count; no points
/// are ever fabricated.
pub fn track_eye(
    frame: &ImageBuffer<Rgb<u8>, Vec<u8>>,
    eye_bbox: BoundingBox,
    detector: &mut dyn IrisDetector,
) -> Result<TrackedEye> {
    let bbox = geometry::clamp_region(eye_bbox, frame.width(), frame.height());
    if bbox.is_empty() {
        return Err(TrackError::InvalidRegion { bbox });
    }

    let crop = geometry::crop_region(frame, bbox);
    let landmarks = detector.detect(&crop)?;
    if landmarks.iris.len() != IRIS_POINT_COUNT {
        return Err(TrackError::MalformedLandmarks {
            expected: IRIS_POINT_COUNT,
            got: landmarks.iris.len(),
        });
    }

    let points = geometry::project_iris_points(bbox, &landmarks.iris, detector.input_shape());
    let circle = geometry::min_enclosing_circle(&points)?;

    Ok(TrackedEye { points, circle })
}

/// Frame pipeline: runs the per-eye pipeline for both eyes of every detected
/// face, in detector order.
pub struct IrisPipeline {
    faces: Box<dyn FaceLandmarker>,
    iris: Box<dyn IrisDetector>,
    log_failures: bool,
}

impl IrisPipeline {
    pub fn new(faces: Box<dyn FaceLandmarker>, iris: Box<dyn IrisDetector>) -> Self {
        Self {
            faces,
            iris,
            log_failures: false,
        }
    }

    pub fn with_failure_logging(mut self, enabled: bool) -> Self {
        self.log_failures = enabled;
        self
    }

    /// A face-detector error aborts the frame; per-eye failures only blank
    /// that eye's slot.
    pub fn process(
        &mut self,
        frame: &ImageBuffer<Rgb<u8>, Vec<u8>>,
    ) -> anyhow::Result<Vec<FaceTrack>> {
        let faces = self.faces.detect(frame)?;

        let mut tracks = Vec::with_capacity(faces.len());
        for face in &faces {
            let (left_bbox, right_bbox) = self.faces.eye_bounding_boxes(face);

            let left = self.track_one(frame, left_bbox, "left");
            let right = self.track_one(frame, right_bbox, "right");

            tracks.push(FaceTrack {
                left_bbox,
                right_bbox,
                left,
                right,
            });
        }
        Ok(tracks)
    }

    fn track_one(
        &mut self,
        frame: &ImageBuffer<Rgb<u8>, Vec<u8>>,
        bbox: BoundingBox,
        side: &str,
    ) -> Option<TrackedEye> {
        match track_eye(frame, bbox, self.iris.as_mut()) {
            Ok(eye) => Some(eye),
            Err(err) => {
                if self.log_failures {
                    eprintln!("[Iris] {} eye skipped: {}", side, err);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubIris {
        iris: Vec<[f32; 3]>,
    }

    impl StubIris {
        fn centered() -> Self {
            Self {
                iris: vec![[32.0, 32.0, 0.0]; 5],
            }
        }
    }

    impl IrisDetector for StubIris {
        fn input_shape(&self) -> (u32, u32) {
            (64, 64)
        }

        fn detect(
            &mut self,
            eye_image: &ImageBuffer<Rgb<u8>, Vec<u8>>,
        ) -> anyhow::Result<EyeLandmarks> {
            assert!(eye_image.width() > 0 && eye_image.height() > 0);
            Ok(EyeLandmarks {
                eye_contour: vec![[0.0, 0.0, 0.0]; 71],
                iris: self.iris.clone(),
            })
        }
    }

    fn frame(w: u32, h: u32) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
        ImageBuffer::from_pixel(w, h, Rgb([128, 128, 128]))
    }

    #[test]
    fn eye_tracks_to_box_center() {
        let frame = frame(100, 100);
        let mut stub = StubIris::centered();

        // 20x20 box, model-space center: every point lands on (20, 20).
        let eye = track_eye(&frame, BoundingBox::new(10, 10, 30, 30), &mut stub).unwrap();
        assert_eq!(eye.points, vec![IrisPoint::new(20, 20); 5]);
        assert_eq!((eye.circle.cx, eye.circle.cy, eye.circle.radius), (20, 20, 0));
    }

    #[test]
    fn out_of_frame_box_is_clamped_not_fatal() {
        let frame = frame(100, 100);
        let mut stub = StubIris::centered();

        let eye = track_eye(&frame, BoundingBox::new(-5, -5, 5, 5), &mut stub).unwrap();
        // Clamped to (0,0,5,5): scale 5/64, floor(32 * 5/64) = 2.
        assert_eq!(eye.points, vec![IrisPoint::new(2, 2); 5]);
    }

    #[test]
    fn fully_outside_box_reports_invalid_region() {
        let frame = frame(100, 100);
        let mut stub = StubIris::centered();

        let err = track_eye(&frame, BoundingBox::new(120, 120, 140, 140), &mut stub).unwrap_err();
        assert!(matches!(err, TrackError::InvalidRegion { .. }));
    }

    #[test]
    fn short_landmark_list_reports_malformed() {
        let frame = frame(100, 100);
        let mut stub = StubIris {
            iris: vec![[32.0, 32.0, 0.0]; 3],
        };

        let err = track_eye(&frame, BoundingBox::new(10, 10, 30, 30), &mut stub).unwrap_err();
        assert!(matches!(
            err,
            TrackError::MalformedLandmarks { expected: 5, got: 3 }
        ));
    }
}
