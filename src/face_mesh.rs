use anyhow::Result;
use image::{imageops::FilterType, ImageBuffer, Rgb};
use ort::session::{builder::GraphOptimizationLevel, Session};

use crate::pipeline::FaceLandmarker;
use crate::types::{BoundingBox, FaceResult};

const DETECTOR_WIDTH: u32 = 320;
const DETECTOR_HEIGHT: u32 = 240;
const MESH_SIZE: u32 = 192;
const MESH_POINTS: usize = 468;
const NMS_IOU: f32 = 0.3;

// Mesh indices ringing each eye (MediaPipe numbering).
const LEFT_EYE_INDICES: [usize; 8] = [33, 133, 160, 159, 158, 144, 145, 153];
const RIGHT_EYE_INDICES: [usize; 8] = [362, 263, 387, 386, 385, 373, 374, 380];

// Expansion of the tight landmark box into the loose square framing the iris
// model expects around an eye.
const EYE_BOX_SCALE: f32 = 2.3;

#[derive(Debug, Clone, Copy)]
struct Candidate {
    x: f32,
    y: f32,
    w: f32,
    h: f32,
    score: f32,
}

impl Candidate {
    fn iou(&self, other: &Candidate) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = (self.x + self.w).min(other.x + other.w);
        let y2 = (self.y + self.h).min(other.y + other.h);

        let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.w * self.h + other.w * other.h - inter;
        if union <= 0.0 {
            return 0.0;
        }
        inter / union
    }
}

/// UltraFace detector plus 468-point face mesh, both ONNX sessions.
///
/// `detect` reports every face above the score threshold (NMS-deduplicated,
/// capped at `max_faces`); `eye_bounding_boxes` derives the two eye regions
/// from a face's mesh landmarks.
pub struct FaceMesh {
    detector: Session,
    mesh: Session,
    anchors: Vec<(f32, f32, f32, f32)>, // cx, cy, w, h
    score_threshold: f32,
    max_faces: usize,
}

impl FaceMesh {
    pub fn new(
        detector_path: &str,
        mesh_path: &str,
        score_threshold: f32,
        max_faces: usize,
    ) -> Result<Self> {
        println!("Loading Face Detector from {}...", detector_path);
        let detector = Self::build_session(detector_path)?;
        println!("Loading Face Mesh from {}...", mesh_path);
        let mesh = Self::build_session(mesh_path)?;

        let anchors = generate_anchors(DETECTOR_WIDTH as usize, DETECTOR_HEIGHT as usize);

        Ok(Self {
            detector,
            mesh,
            anchors,
            score_threshold,
            max_faces: max_faces.max(1),
        })
    }

    fn build_session(path: &str) -> Result<Session> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .with_execution_providers([
                ort::execution_providers::CoreMLExecutionProvider::default().build(),
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])?
            .commit_from_file(path)?;
        Ok(session)
    }

    /// Runs UltraFace and returns the surviving face boxes in frame pixels.
    fn detect_faces(&mut self, frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<Vec<Candidate>> {
        let resized =
            image::imageops::resize(frame, DETECTOR_WIDTH, DETECTOR_HEIGHT, FilterType::Triangle);

        // NCHW, (pixel - 127) / 128
        let width = DETECTOR_WIDTH as usize;
        let height = DETECTOR_HEIGHT as usize;
        let mut input_data = Vec::with_capacity(3 * height * width);
        for c in 0..3 {
            for y in 0..height {
                for x in 0..width {
                    let p = resized.get_pixel(x as u32, y as u32)[c];
                    input_data.push((p as f32 - 127.0) / 128.0);
                }
            }
        }

        let input = ort::value::Tensor::from_array((vec![1, 3, 240, 320], input_data))?;
        let outputs = self.detector.run(ort::inputs![input])?;

        let (_scores_shape, scores_data) = outputs["scores"].try_extract_tensor::<f32>()?;
        let (_boxes_shape, boxes_data) = outputs["boxes"].try_extract_tensor::<f32>()?;

        let mut candidates =
            decode_candidates(&self.anchors, scores_data, boxes_data, self.score_threshold);

        // Highest score first, then greedy IoU suppression.
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));
        let mut kept: Vec<Candidate> = Vec::new();
        for cand in candidates {
            if kept.len() >= self.max_faces {
                break;
            }
            if kept.iter().all(|k| k.iou(&cand) < NMS_IOU) {
                kept.push(cand);
            }
        }

        // Scale from detector space back to the frame.
        let sx = frame.width() as f32 / DETECTOR_WIDTH as f32;
        let sy = frame.height() as f32 / DETECTOR_HEIGHT as f32;
        for cand in &mut kept {
            cand.x *= sx;
            cand.y *= sy;
            cand.w *= sx;
            cand.h *= sy;
        }

        Ok(kept)
    }

    /// Runs the mesh model on one face crop and maps the landmarks back into
    /// frame coordinates.
    fn mesh_landmarks(
        &mut self,
        frame: &ImageBuffer<Rgb<u8>, Vec<u8>>,
        face: Candidate,
    ) -> Result<Option<FaceResult>> {
        // Expand the ROI slightly for mesh context.
        let pad_w = face.w * 0.25;
        let pad_h = face.h * 0.25;
        let mut x = face.x - pad_w / 2.0;
        let mut y = face.y - pad_h / 2.0;
        let mut w = face.w + pad_w;
        let mut h = face.h + pad_h;

        if x < 0.0 {
            x = 0.0;
        }
        if y < 0.0 {
            y = 0.0;
        }
        if x + w > frame.width() as f32 {
            w = frame.width() as f32 - x;
        }
        if y + h > frame.height() as f32 {
            h = frame.height() as f32 - y;
        }
        if w <= 0.0 || h <= 0.0 {
            return Ok(None);
        }

        let crop =
            image::imageops::crop_imm(frame, x as u32, y as u32, w as u32, h as u32).to_image();
        let scale_x = w / MESH_SIZE as f32;
        let scale_y = h / MESH_SIZE as f32;

        let resized = image::imageops::resize(&crop, MESH_SIZE, MESH_SIZE, FilterType::Triangle);

        // NHWC, normalized to [-1, 1]
        let mut input_data = Vec::with_capacity((MESH_SIZE * MESH_SIZE * 3) as usize);
        for py in 0..MESH_SIZE {
            for px in 0..MESH_SIZE {
                let pixel = resized.get_pixel(px, py);
                input_data.push(pixel[0] as f32 / 127.5 - 1.0);
                input_data.push(pixel[1] as f32 / 127.5 - 1.0);
                input_data.push(pixel[2] as f32 / 127.5 - 1.0);
            }
        }

        let input = ort::value::Tensor::from_array((vec![1, 192, 192, 3], input_data))?;
        let outputs = self.mesh.run(ort::inputs![input])?;

        let (_output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        if output_data.len() < MESH_POINTS * 3 {
            return Ok(None);
        }

        let mut landmarks = Vec::with_capacity(MESH_POINTS);
        for i in 0..MESH_POINTS {
            let mx = output_data[i * 3];
            let my = output_data[i * 3 + 1];
            // Mesh local (0..192) -> crop -> full frame
            landmarks.push((x + mx * scale_x, y + my * scale_y));
        }

        Ok(Some(FaceResult { landmarks }))
    }

    fn eye_box(face: &FaceResult, indices: &[usize]) -> BoundingBox {
        let mut min_x = f32::MAX;
        let mut min_y = f32::MAX;
        let mut max_x = f32::MIN;
        let mut max_y = f32::MIN;
        let mut found = false;

        for &i in indices {
            if let Some(&(px, py)) = face.landmarks.get(i) {
                min_x = min_x.min(px);
                min_y = min_y.min(py);
                max_x = max_x.max(px);
                max_y = max_y.max(py);
                found = true;
            }
        }
        if !found {
            return BoundingBox::new(0, 0, 0, 0);
        }

        let cx = (min_x + max_x) / 2.0;
        let cy = (min_y + max_y) / 2.0;
        let size = (max_x - min_x).max(max_y - min_y) * EYE_BOX_SCALE;
        let half = size / 2.0;

        BoundingBox::new(
            (cx - half).round() as i32,
            (cy - half).round() as i32,
            (cx + half).round() as i32,
            (cy + half).round() as i32,
        )
    }
}

impl FaceLandmarker for FaceMesh {
    fn detect(&mut self, frame: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<Vec<FaceResult>> {
        let rects = self.detect_faces(frame)?;
        let mut faces = Vec::with_capacity(rects.len());
        for rect in rects {
            if let Some(face) = self.mesh_landmarks(frame, rect)? {
                faces.push(face);
            }
        }
        Ok(faces)
    }

    fn eye_bounding_boxes(&self, face: &FaceResult) -> (BoundingBox, BoundingBox) {
        (
            Self::eye_box(face, &LEFT_EYE_INDICES),
            Self::eye_box(face, &RIGHT_EYE_INDICES),
        )
    }
}

fn decode_candidates(
    anchors: &[(f32, f32, f32, f32)],
    scores_raw: &[f32],
    boxes_raw: &[f32],
    threshold: f32,
) -> Vec<Candidate> {
    // UltraFace variances
    let center_variance = 0.1;
    let size_variance = 0.2;

    let mut candidates = Vec::new();
    for (i, &(ax, ay, aw, ah)) in anchors.iter().enumerate() {
        let score = scores_raw[i * 2 + 1];
        if score <= threshold {
            continue;
        }

        let cx_enc = boxes_raw[i * 4];
        let cy_enc = boxes_raw[i * 4 + 1];
        let w_enc = boxes_raw[i * 4 + 2];
        let h_enc = boxes_raw[i * 4 + 3];

        let cx = cx_enc * center_variance * aw + ax;
        let cy = cy_enc * center_variance * ah + ay;
        let w = (w_enc * size_variance).exp() * aw;
        let h = (h_enc * size_variance).exp() * ah;

        candidates.push(Candidate {
            x: (cx - w / 2.0) * DETECTOR_WIDTH as f32,
            y: (cy - h / 2.0) * DETECTOR_HEIGHT as f32,
            w: w * DETECTOR_WIDTH as f32,
            h: h * DETECTOR_HEIGHT as f32,
            score,
        });
    }
    candidates
}

fn generate_anchors(width: usize, height: usize) -> Vec<(f32, f32, f32, f32)> {
    // UltraFace config
    let shrinkage_list = [8, 16, 32, 64];
    let min_boxes = [
        vec![10.0, 16.0, 24.0],
        vec![32.0, 48.0],
        vec![64.0, 96.0],
        vec![128.0, 192.0, 256.0],
    ];
    let mut anchors = Vec::new();

    let w = width as f32;
    let h = height as f32;

    for (i, &shrinkage) in shrinkage_list.iter().enumerate() {
        let feature_h = (height as f32 / shrinkage as f32).ceil() as usize;
        let feature_w = (width as f32 / shrinkage as f32).ceil() as usize;

        for v in 0..feature_h {
            for u in 0..feature_w {
                let cx = (u as f32 * shrinkage as f32 + shrinkage as f32 / 2.0) / w;
                let cy = (v as f32 * shrinkage as f32 + shrinkage as f32 / 2.0) / h;

                for &min_box in &min_boxes[i] {
                    anchors.push((cx, cy, min_box / w, min_box / h));
                }
            }
        }
    }
    anchors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_count_matches_ultraface_320x240() {
        // 40x30 + 20x15 + 10x8 + 5x4 cells, 3/2/2/3 boxes each
        let anchors = generate_anchors(320, 240);
        assert_eq!(anchors.len(), 40 * 30 * 3 + 20 * 15 * 2 + 10 * 8 * 2 + 5 * 4 * 3);
    }

    #[test]
    fn eye_box_is_square_and_centered() {
        let mut landmarks = vec![(0.0, 0.0); 468];
        for &i in &LEFT_EYE_INDICES {
            landmarks[i] = (100.0, 100.0);
        }
        landmarks[33] = (90.0, 95.0);
        landmarks[133] = (110.0, 105.0);

        let face = FaceResult { landmarks };
        let bbox = FaceMesh::eye_box(&face, &LEFT_EYE_INDICES);

        assert_eq!(bbox.width(), bbox.height());
        assert_eq!((bbox.x1 + bbox.x2) / 2, 100);
        assert_eq!((bbox.y1 + bbox.y2) / 2, 100);
        assert!(bbox.width() > 20); // wider than the raw landmark spread
    }

    #[test]
    fn iou_of_disjoint_boxes_is_zero() {
        let a = Candidate { x: 0.0, y: 0.0, w: 10.0, h: 10.0, score: 0.9 };
        let b = Candidate { x: 20.0, y: 20.0, w: 10.0, h: 10.0, score: 0.8 };
        assert_eq!(a.iou(&b), 0.0);
        assert!(a.iou(&a) > 0.99);
    }
}
