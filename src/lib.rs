//! Real-time webcam iris tracking.
//!
//! Faces come from an UltraFace detector, eye regions from a 468-point face
//! mesh, and iris landmarks from the MediaPipe iris model, all driven through
//! ONNX Runtime. The geometry core ([`geometry`], [`pipeline`]) is pure:
//! clamp the eye box, copy the crop, remap the raw landmarks into frame
//! pixels, fit the minimal enclosing circle. Model I/O sits behind the
//! [`pipeline::FaceLandmarker`] and [`pipeline::IrisDetector`] traits so the
//! pipeline can run against stub detectors in tests.

pub mod args;
pub mod camera;
pub mod config;
pub mod draw;
pub mod error;
pub mod face_mesh;
pub mod font;
pub mod fps;
pub mod geometry;
pub mod iris;
pub mod output;
pub mod pipeline;
pub mod ttf;
pub mod types;
