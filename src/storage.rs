use crate::config::LOOK_STORE_PREFIX;
use anyhow::{Context, Result};
use glowrs_vision::{BrowApplicator, CosmeticSelection, Shade};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One zone group's saved choice; the shade is kept as its descriptor string
/// so records stay readable across versions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneChoice {
    pub shade: String,
    pub intensity: f32,
}

/// A persisted cosmetic selection ("look").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookRecord {
    pub id: String,
    pub name: String,
    pub lips: ZoneChoice,
    pub cheeks: ZoneChoice,
    pub brows: ZoneChoice,
    pub brow_pencil: bool,
    pub contour: ZoneChoice,
    pub foundation: ZoneChoice,
}

impl LookRecord {
    pub fn from_selection(name: &str, selection: &CosmeticSelection) -> Self {
        let choice = |params: &glowrs_vision::params::ZoneParams| ZoneChoice {
            shade: params.shade.hex(),
            intensity: params.intensity,
        };
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            lips: choice(&selection.lips),
            cheeks: choice(&selection.cheeks),
            brows: choice(&selection.brows),
            brow_pencil: selection.brow_applicator == BrowApplicator::Pencil,
            contour: choice(&selection.contour),
            foundation: choice(&selection.foundation),
        }
    }

    /// Rebuild the selection, re-validating every stored shade.
    pub fn to_selection(&self) -> Result<CosmeticSelection> {
        let params = |choice: &ZoneChoice| -> Result<glowrs_vision::params::ZoneParams> {
            Ok(glowrs_vision::params::ZoneParams {
                shade: Shade::parse(&choice.shade)
                    .with_context(|| format!("look {:?}", self.name))?,
                intensity: choice.intensity.clamp(0.0, 1.0),
            })
        };
        Ok(CosmeticSelection {
            lips: params(&self.lips)?,
            cheeks: params(&self.cheeks)?,
            brows: params(&self.brows)?,
            contour: params(&self.contour)?,
            foundation: params(&self.foundation)?,
            brow_applicator: if self.brow_pencil {
                BrowApplicator::Pencil
            } else {
                BrowApplicator::Soft
            },
            visible: true,
        })
    }
}

fn store_file(prefix: Option<&Path>) -> PathBuf {
    prefix.unwrap_or(&LOOK_STORE_PREFIX).join("looks.bin")
}

pub fn load_records(prefix: Option<&Path>) -> Result<Vec<LookRecord>> {
    let file = store_file(prefix);
    if !file.exists() {
        return Ok(vec![]);
    }
    let data = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
    Ok(postcard::from_bytes(&data)?)
}

pub fn save_record(prefix: Option<&Path>, record: LookRecord) -> Result<()> {
    let file = store_file(prefix);
    if let Some(parent) = file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut records = load_records(prefix)?;
    // Saving under an existing name replaces that look.
    records.retain(|r| r.name != record.name);
    records.push(record);
    let data = postcard::to_allocvec(&records)?;
    std::fs::write(&file, data)?;
    Ok(())
}

pub fn find_record(prefix: Option<&Path>, name: &str) -> Result<Option<LookRecord>> {
    Ok(load_records(prefix)?.into_iter().find(|r| r.name == name))
}

pub fn purge(prefix: Option<&Path>) -> Result<()> {
    let file = store_file(prefix);
    if file.exists() {
        std::fs::remove_file(&file).with_context(|| format!("removing {}", file.display()))?;
    }
    Ok(())
}
