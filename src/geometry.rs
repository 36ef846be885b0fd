//! Coordinate transforms and circle fitting for the iris pipeline.
//!
//! Everything here is a pure function of its inputs. No state is carried
//! between frames; per-frame outputs are fully independent.

use image::{ImageBuffer, Rgb};

use crate::error::{Result, TrackError};
use crate::types::{BoundingBox, Circle, IrisPoint};

/// Bounds an eye box to the frame extent.
///
/// Corners are clamped into `[0, width] x [0, height]`. The box may collapse
/// to zero area if it lies entirely outside the frame; callers must tolerate
/// the resulting empty crop. Idempotent.
pub fn clamp_region(bbox: BoundingBox, frame_width: u32, frame_height: u32) -> BoundingBox {
    let w = frame_width as i32;
    let h = frame_height as i32;
    BoundingBox {
        x1: bbox.x1.clamp(0, w),
        y1: bbox.y1.clamp(0, h),
        x2: bbox.x2.clamp(0, w),
        y2: bbox.y2.clamp(0, h),
    }
}

/// Copies the pixel rectangle `[y1:y2, x1:x2]` out of the frame.
///
/// The crop must be an independent buffer: the caller keeps drawing onto the
/// full frame while the crop is fed to the detector, so aliasing the source
/// would corrupt the detector input. `bbox` must already be clamped.
pub fn crop_region(
    frame: &ImageBuffer<Rgb<u8>, Vec<u8>>,
    bbox: BoundingBox,
) -> ImageBuffer<Rgb<u8>, Vec<u8>> {
    let w = bbox.width().max(0) as u32;
    let h = bbox.height().max(0) as u32;
    image::imageops::crop_imm(frame, bbox.x1 as u32, bbox.y1 as u32, w, h).to_image()
}

/// Maps raw iris landmarks from model input space into frame-absolute pixels.
///
/// `raw` holds (x, y, z) triples in the detector's fixed `input_shape`
/// coordinate system. Coordinates are scaled by crop-size / input-size,
/// floored, then shifted by the box origin. Floor (not round) is load-bearing
/// for pixel-exact output; do not swap it for rounding. A zero-area box
/// collapses every point to `(x1, y1)`, which is accepted.
pub fn project_iris_points(
    bbox: BoundingBox,
    raw: &[[f32; 3]],
    input_shape: (u32, u32),
) -> Vec<IrisPoint> {
    let scale_x = bbox.width() as f32 / input_shape.0 as f32;
    let scale_y = bbox.height() as f32 / input_shape.1 as f32;

    raw.iter()
        .map(|lm| {
            let px = (lm[0] * scale_x).floor() as i32 + bbox.x1;
            let py = (lm[1] * scale_y).floor() as i32 + bbox.y1;
            IrisPoint::new(px, py)
        })
        .collect()
}

const EPS: f64 = 1e-7;

/// Fits the minimal enclosing circle over a non-empty point set.
///
/// Incremental Welzl-style construction: exact for duplicates, collinear
/// runs, and the three-support case. The center rounds to the nearest pixel,
/// the radius floors, matching the truncation used by the remapper.
pub fn min_enclosing_circle(points: &[IrisPoint]) -> Result<Circle> {
    if points.is_empty() {
        return Err(TrackError::EmptyPointSet);
    }

    let pts: Vec<(f64, f64)> = points.iter().map(|p| (p.x as f64, p.y as f64)).collect();
    let (cx, cy, r) = enclosing_circle(&pts);
    Ok(Circle {
        cx: cx.round() as i32,
        cy: cy.round() as i32,
        radius: r.floor() as i32,
    })
}

// Exact fit, before pixel rounding.
fn enclosing_circle(pts: &[(f64, f64)]) -> (f64, f64, f64) {
    let mut circle = (pts[0].0, pts[0].1, 0.0);
    for i in 1..pts.len() {
        if !contains(circle, pts[i]) {
            circle = with_boundary_point(&pts[..i], pts[i]);
        }
    }
    circle
}

// Smallest circle over pts with p on the boundary.
fn with_boundary_point(pts: &[(f64, f64)], p: (f64, f64)) -> (f64, f64, f64) {
    let mut circle = (p.0, p.1, 0.0);
    for j in 0..pts.len() {
        if !contains(circle, pts[j]) {
            circle = with_boundary_pair(&pts[..j], p, pts[j]);
        }
    }
    circle
}

// Smallest circle over pts with both p and q on the boundary.
fn with_boundary_pair(pts: &[(f64, f64)], p: (f64, f64), q: (f64, f64)) -> (f64, f64, f64) {
    let mut circle = circle_from_pair(p, q);
    for k in 0..pts.len() {
        if !contains(circle, pts[k]) {
            circle = circle_from_triple(p, q, pts[k]);
        }
    }
    circle
}

fn contains(circle: (f64, f64, f64), p: (f64, f64)) -> bool {
    let dx = p.0 - circle.0;
    let dy = p.1 - circle.1;
    (dx * dx + dy * dy).sqrt() <= circle.2 + EPS
}

fn circle_from_pair(a: (f64, f64), b: (f64, f64)) -> (f64, f64, f64) {
    let cx = (a.0 + b.0) / 2.0;
    let cy = (a.1 + b.1) / 2.0;
    let r = ((a.0 - b.0).hypot(a.1 - b.1)) / 2.0;
    (cx, cy, r)
}

fn circle_from_triple(a: (f64, f64), b: (f64, f64), c: (f64, f64)) -> (f64, f64, f64) {
    // Circumcenter via the perpendicular-bisector determinant.
    let d = 2.0 * (a.0 * (b.1 - c.1) + b.0 * (c.1 - a.1) + c.0 * (a.1 - b.1));
    if d.abs() < EPS {
        // Collinear: the smallest of the pairwise diameter circles that
        // still covers the third point.
        let candidates = [
            (circle_from_pair(a, b), c),
            (circle_from_pair(a, c), b),
            (circle_from_pair(b, c), a),
        ];
        let mut best: Option<(f64, f64, f64)> = None;
        for (circle, other) in candidates {
            if contains(circle, other) {
                match best {
                    Some(current) if current.2 <= circle.2 => {}
                    _ => best = Some(circle),
                }
            }
        }
        // One of the pairs always spans the collinear run.
        return best.unwrap_or_else(|| circle_from_pair(a, b));
    }

    let a2 = a.0 * a.0 + a.1 * a.1;
    let b2 = b.0 * b.0 + b.1 * b.1;
    let c2 = c.0 * c.0 + c.1 * c.1;
    let ux = (a2 * (b.1 - c.1) + b2 * (c.1 - a.1) + c2 * (a.1 - b.1)) / d;
    let uy = (a2 * (c.0 - b.0) + b2 * (a.0 - c.0) + c2 * (b.0 - a.0)) / d;
    let r = (a.0 - ux).hypot(a.1 - uy);
    (ux, uy, r)
}
