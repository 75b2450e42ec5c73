use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::Array4;
use ort::{session::Session, value::Value};

/// One tracked facial point, normalized to [0,1] relative to the frame
/// dimensions. `z` is carried through from the mesh but not used by the
/// compositor.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Landmark count of the face-mesh graph.
pub const MESH_POINTS: usize = 468;

/// Per-frame detector output: zero or more faces, each an ordered landmark
/// array indexed by the mesh's fixed numbering.
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub faces: Vec<Vec<Landmark>>,
}

/// Boundary to the external face tracker. The engine only assumes it yields
/// normalized landmark arrays; it never assumes one result per camera frame.
pub trait LandmarkDetector {
    fn detect(&mut self, frame: &RgbImage) -> Result<Detection>;
}

/// MediaPipe face-mesh graph run through onnxruntime.
pub struct FaceMeshNet {
    session: Session,
    min_confidence: f32,
}

/// Fixed input resolution of the face-mesh graph.
const MESH_INPUT: u32 = 192;

impl FaceMeshNet {
    pub fn load(model: &Path, min_confidence: f32) -> Result<Self> {
        Ok(Self {
            session: crate::model::face_mesh_session(model)?,
            min_confidence,
        })
    }
}

impl LandmarkDetector for FaceMeshNet {
    fn detect(&mut self, frame: &RgbImage) -> Result<Detection> {
        let (orig_width, orig_height) = frame.dimensions();

        // Letterbox into the square model input to avoid distortion.
        let max_dim = orig_width.max(orig_height);
        let scale = MESH_INPUT as f32 / max_dim as f32;
        let new_width = ((orig_width as f32 * scale) as u32).max(1);
        let new_height = ((orig_height as f32 * scale) as u32).max(1);
        let offset_x = (MESH_INPUT - new_width) / 2;
        let offset_y = (MESH_INPUT - new_height) / 2;

        let resized = image::imageops::resize(
            frame,
            new_width,
            new_height,
            image::imageops::FilterType::Triangle,
        );
        let mut canvas = RgbImage::new(MESH_INPUT, MESH_INPUT);
        image::imageops::overlay(&mut canvas, &resized, offset_x as i64, offset_y as i64);

        // NHWC float input in [0,1]; the canvas buffer is already in that order.
        let input_data: Vec<f32> = canvas.as_raw().iter().map(|&v| v as f32 / 255.0).collect();
        let input_array = Array4::from_shape_vec(
            (1, MESH_INPUT as usize, MESH_INPUT as usize, 3),
            input_data,
        )?;
        let input_tensor = Value::from_array(input_array)?;

        let outputs = self
            .session
            .run(ort::inputs![input_tensor])
            .context("face mesh inference")?;

        // The graph emits a coordinate tensor (points * 3 floats, in input
        // pixel scale) and a single-element confidence logit; identify them by
        // size rather than by name.
        let mut coords: Option<Vec<f32>> = None;
        let mut score: Option<f32> = None;
        for (_name, output) in outputs.iter() {
            let (_shape, data) = output.try_extract_tensor::<f32>()?;
            if data.len() >= MESH_POINTS * 3 && data.len() % 3 == 0 {
                coords = Some(data.to_vec());
            } else if data.len() == 1 {
                score = Some(sigmoid(data[0]));
            }
        }
        let coords = coords.ok_or_else(|| anyhow::anyhow!("no landmark tensor in model output"))?;

        if score.unwrap_or(1.0) < self.min_confidence {
            return Ok(Detection::default());
        }

        // Undo the letterboxing: canvas pixels back to frame-normalized space.
        let span_x = new_width as f32;
        let span_y = new_height as f32;
        let face = coords
            .chunks_exact(3)
            .map(|p| Landmark {
                x: (p[0] - offset_x as f32) / span_x,
                y: (p[1] - offset_y as f32) / span_y,
                z: p[2] / MESH_INPUT as f32,
            })
            .collect();

        Ok(Detection { faces: vec![face] })
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
