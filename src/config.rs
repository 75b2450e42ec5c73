use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub static CONFIG_PATH: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("GLOWRS_CONFIG_PATH").unwrap_or("/usr/local/etc/glowrs/config.toml"))
});

pub static LOOK_STORE_PREFIX: Lazy<&'static Path> = Lazy::new(|| {
    Path::new(option_env!("GLOWRS_LOOK_STORE_PREFIX").unwrap_or("/usr/local/etc/glowrs"))
});

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub camera: String,
    pub width: u32,
    pub height: u32,
    pub model: PathBuf,
    pub min_confidence: f32,
    pub export_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let export_dir = directories::UserDirs::new()
            .and_then(|dirs| dirs.picture_dir().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            camera: "/dev/video0".to_string(),
            width: 640,
            height: 480,
            model: PathBuf::from("models/face_mesh.onnx"),
            min_confidence: 0.5,
            export_dir,
        }
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let path = path.unwrap_or(&CONFIG_PATH);
    if !path.exists() {
        return Ok(Config::default());
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading config at {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config {}", path.display()))
}

pub fn save_config(cfg: &Config, path: Option<&Path>) -> Result<()> {
    let path = path.unwrap_or(&CONFIG_PATH);
    let data = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, data)?;
    Ok(())
}
