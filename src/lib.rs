pub mod catalog;
pub mod config;
pub mod storage;

// Re-export vision types for convenience
pub use glowrs_vision::{
    compositor, params, pipeline, zones, CosmeticSelection, ParamChannel, PipelineConfig, Shade,
    TryOnPipeline, ZoneGroup,
};
