use std::path::PathBuf;

use anyhow::{Context, Result};
use image::RgbImage;

use crate::camera::Camera;
use crate::compositor::render_frame;
use crate::detector::{Detection, FaceMeshNet, LandmarkDetector};
use crate::export;
use crate::params::ParamChannel;

/// Resources the pipeline acquires when it starts.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub camera: String,
    pub width: u32,
    pub height: u32,
    pub model: PathBuf,
    pub min_confidence: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            camera: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            model: PathBuf::from("models/face_mesh.onnx"),
            min_confidence: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    /// Acquiring the detector model and camera. A failed start leaves the
    /// pipeline here; it never reaches `Streaming` without both resources.
    Initializing,
    Streaming,
    Stopped,
}

/// The per-session try-on pipeline: owns the render surface, the camera, and
/// the detector, and turns each detection result into one composited frame.
///
/// One instance exists per camera session; selection changes go through the
/// [`ParamChannel`] and never recreate the pipeline. Draw cycles take `&mut
/// self` for their full synchronous extent, so zone draws of different frames
/// can never interleave on the surface.
pub struct TryOnPipeline {
    config: PipelineConfig,
    state: PipelineState,
    surface: RgbImage,
    params: ParamChannel,
    camera: Option<Camera>,
    detector: Option<Box<dyn LandmarkDetector>>,
}

impl TryOnPipeline {
    pub fn new(config: PipelineConfig, params: ParamChannel) -> Self {
        let surface = RgbImage::new(config.width, config.height);
        Self {
            config,
            state: PipelineState::Idle,
            surface,
            params,
            camera: None,
            detector: None,
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Handle for UI-side parameter writes.
    pub fn params(&self) -> ParamChannel {
        self.params.clone()
    }

    /// The render surface as of the last completed draw.
    pub fn surface(&self) -> &RgbImage {
        &self.surface
    }

    /// Acquire the detector and camera and enter `Streaming`. Either resource
    /// failing is fatal to the session start and keeps the pipeline out of
    /// `Streaming`.
    pub fn start(&mut self) -> Result<()> {
        self.state = PipelineState::Initializing;
        let detector = FaceMeshNet::load(&self.config.model, self.config.min_confidence)
            .context("initializing face tracker")?;
        self.start_with(Box::new(detector))
    }

    /// Start with a caller-supplied detector implementation.
    pub fn start_with(&mut self, detector: Box<dyn LandmarkDetector>) -> Result<()> {
        self.state = PipelineState::Initializing;
        let camera = Camera::open(&self.config.camera, self.config.width, self.config.height)
            .context("initializing camera")?;
        self.camera = Some(camera);
        self.detector = Some(detector);
        self.state = PipelineState::Streaming;
        log::info!("try-on pipeline streaming");
        Ok(())
    }

    /// One streaming iteration: capture a frame, run the detector, composite.
    /// Returns whether a face was rendered. Frames the detector drops or
    /// rejects still show the camera passthrough.
    pub fn step(&mut self) -> Result<bool> {
        if self.state != PipelineState::Streaming {
            anyhow::bail!("pipeline is not streaming");
        }
        let (Some(camera), Some(detector)) = (self.camera.as_mut(), self.detector.as_mut())
        else {
            anyhow::bail!("pipeline is not streaming");
        };
        let frame = camera.frame().context("capturing frame")?;
        let result = detector.detect(&frame).context("tracking face")?;
        let faces = result.faces.len();
        self.present(&frame, &result);
        Ok(faces > 0)
    }

    /// Compose one detection result onto the surface. Only the first detected
    /// face is used; with none, the surface is the bare passthrough.
    pub fn present(&mut self, frame: &RgbImage, result: &Detection) {
        let selection = self.params.snapshot();
        let face = result.faces.first().map(|f| f.as_slice());
        render_frame(&mut self.surface, frame, face, &selection);
    }

    /// Encode the surface exactly as last rendered.
    pub fn screenshot(&self) -> Result<Vec<u8>> {
        export::encode_png(&self.surface)
    }

    /// Detach from the camera and detector. Idempotent; dropping the camera
    /// releases the device handle.
    pub fn stop(&mut self) {
        if self.camera.take().is_some() {
            log::info!("camera released");
        }
        self.detector = None;
        self.state = PipelineState::Stopped;
    }
}

impl Drop for TryOnPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_is_idempotent() {
        let mut pipeline = TryOnPipeline::new(PipelineConfig::default(), ParamChannel::default());
        assert_eq!(pipeline.state(), PipelineState::Idle);
        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
        pipeline.stop();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
    }

    #[test]
    fn step_requires_streaming() {
        let mut pipeline = TryOnPipeline::new(PipelineConfig::default(), ParamChannel::default());
        assert!(pipeline.step().is_err());
        pipeline.stop();
        assert!(pipeline.step().is_err());
    }

    #[test]
    fn surface_matches_configured_size() {
        let config = PipelineConfig {
            width: 320,
            height: 240,
            ..PipelineConfig::default()
        };
        let pipeline = TryOnPipeline::new(config, ParamChannel::default());
        assert_eq!(pipeline.surface().dimensions(), (320, 240));
    }
}
