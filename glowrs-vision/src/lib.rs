pub mod camera;
pub mod color;
pub mod compositor;
pub mod detector;
pub mod export;
pub mod model;
pub mod params;
pub mod pipeline;
pub mod zones;

// Re-export commonly used types
pub use color::{resolve_color, ColorError, Rgba, Shade};
pub use detector::{Detection, FaceMeshNet, Landmark, LandmarkDetector, MESH_POINTS};
pub use params::{BrowApplicator, CosmeticSelection, ParamChannel};
pub use pipeline::{PipelineConfig, PipelineState, TryOnPipeline};
pub use zones::{Zone, ZoneGroup};
