use anyhow::{anyhow, Result};
use image::{imageops::FilterType, ImageBuffer, Rgb};
use ort::session::{builder::GraphOptimizationLevel, Session};

use crate::pipeline::IrisDetector;
use crate::types::EyeLandmarks;

// MediaPipe iris model geometry. Outputs are expressed in the 64x64 input
// space regardless of the crop size actually fed in.
const INPUT_WIDTH: u32 = 64;
const INPUT_HEIGHT: u32 = 64;
const CONTOUR_POINTS: usize = 71;
const IRIS_POINTS: usize = 5;

pub struct IrisLandmark {
    session: Session,
}

impl IrisLandmark {
    pub fn new(model_path: &str) -> Result<Self> {
        println!("Loading Iris Landmark from {}...", model_path);
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .with_execution_providers([
                ort::execution_providers::CoreMLExecutionProvider::default().build(),
                ort::execution_providers::CPUExecutionProvider::default().build(),
            ])?
            .commit_from_file(model_path)?;

        Ok(Self { session })
    }

    fn run(&mut self, eye_image: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<EyeLandmarks> {
        if eye_image.width() == 0 || eye_image.height() == 0 {
            return Err(anyhow!("empty eye crop"));
        }

        let resized =
            image::imageops::resize(eye_image, INPUT_WIDTH, INPUT_HEIGHT, FilterType::Triangle);

        // NHWC, normalized to [-1, 1]
        let mut input_data = Vec::with_capacity((INPUT_WIDTH * INPUT_HEIGHT * 3) as usize);
        for y in 0..INPUT_HEIGHT {
            for x in 0..INPUT_WIDTH {
                let pixel = resized.get_pixel(x, y);
                input_data.push(pixel[0] as f32 / 127.5 - 1.0);
                input_data.push(pixel[1] as f32 / 127.5 - 1.0);
                input_data.push(pixel[2] as f32 / 127.5 - 1.0);
            }
        }

        let shape = vec![1, 64, 64, 3];
        let input = ort::value::Tensor::from_array((shape, input_data))?;
        let outputs = self.session.run(ort::inputs![input])?;

        // Output 0: 71 eye-contour triples. Output 1: 5 iris triples.
        let (_contour_shape, contour_data) = outputs[0].try_extract_tensor::<f32>()?;
        let (_iris_shape, iris_data) = outputs[1].try_extract_tensor::<f32>()?;

        if contour_data.len() < CONTOUR_POINTS * 3 || iris_data.len() < IRIS_POINTS * 3 {
            return Err(anyhow!(
                "unexpected iris model output lengths: {} contour / {} iris",
                contour_data.len(),
                iris_data.len()
            ));
        }

        let eye_contour = contour_data
            .chunks(3)
            .take(CONTOUR_POINTS)
            .map(|c| [c[0], c[1], c[2]])
            .collect();
        let iris = iris_data
            .chunks(3)
            .take(IRIS_POINTS)
            .map(|c| [c[0], c[1], c[2]])
            .collect();

        Ok(EyeLandmarks { eye_contour, iris })
    }
}

impl IrisDetector for IrisLandmark {
    fn input_shape(&self) -> (u32, u32) {
        (INPUT_WIDTH, INPUT_HEIGHT)
    }

    fn detect(&mut self, eye_image: &ImageBuffer<Rgb<u8>, Vec<u8>>) -> Result<EyeLandmarks> {
        self.run(eye_image)
    }
}
