use std::sync::{Arc, Mutex};

use crate::color::{ColorError, Shade};
use crate::zones::{Zone, ZoneGroup};

// Base opacities per zone, tuned for visual realism at typical webcam
// exposure. Foundation is the most visible base wash; cheeks and contour stay
// the most subtle.
pub const LIP_OPACITY: f32 = 0.25;
pub const CHEEK_OPACITY: f32 = 0.045;
pub const BROW_PENCIL_OPACITY: f32 = 0.3;
pub const BROW_SOFT_OPACITY: f32 = 0.2;
pub const CONTOUR_OPACITY: f32 = 0.05;
pub const FOUNDATION_OPACITY: f32 = 0.09;

/// Pencil applicators draw at a higher base opacity than powders and gels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowApplicator {
    Pencil,
    Soft,
}

impl BrowApplicator {
    pub fn from_product(name: &str) -> Self {
        if name.contains("Pencil") {
            BrowApplicator::Pencil
        } else {
            BrowApplicator::Soft
        }
    }
}

/// Shade and intensity for one zone group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneParams {
    pub shade: Shade,
    pub intensity: f32,
}

impl ZoneParams {
    fn new(shade: Shade) -> Self {
        Self {
            shade,
            intensity: 1.0,
        }
    }
}

/// The full cosmetic selection read once per rendered frame.
#[derive(Debug, Clone, PartialEq)]
pub struct CosmeticSelection {
    pub lips: ZoneParams,
    pub cheeks: ZoneParams,
    pub brows: ZoneParams,
    pub contour: ZoneParams,
    pub foundation: ZoneParams,
    pub brow_applicator: BrowApplicator,
    /// When false the frame is the bare camera passthrough.
    pub visible: bool,
}

impl Default for CosmeticSelection {
    fn default() -> Self {
        let tint = |r, g, b| ZoneParams::new(Shade::Tint { r, g, b });
        Self {
            lips: tint(0xE3, 0x36, 0x38),
            cheeks: tint(0xF7, 0x97, 0x6C),
            brows: tint(0x6D, 0x4F, 0x3A),
            contour: tint(0xA2, 0x64, 0x4F),
            foundation: tint(0xF7, 0xE3, 0xCF),
            brow_applicator: BrowApplicator::Pencil,
            visible: true,
        }
    }
}

impl CosmeticSelection {
    /// A selection with every zone cleared; rendering it is a passthrough.
    pub fn bare() -> Self {
        let clear = ZoneParams::new(Shade::Clear);
        Self {
            lips: clear,
            cheeks: clear,
            brows: clear,
            contour: clear,
            foundation: clear,
            ..Self::default()
        }
    }

    pub fn params_for(&self, group: ZoneGroup) -> &ZoneParams {
        match group {
            ZoneGroup::Lips => &self.lips,
            ZoneGroup::Cheeks => &self.cheeks,
            ZoneGroup::Brows => &self.brows,
            ZoneGroup::Contour => &self.contour,
            ZoneGroup::Foundation => &self.foundation,
        }
    }

    fn params_mut(&mut self, group: ZoneGroup) -> &mut ZoneParams {
        match group {
            ZoneGroup::Lips => &mut self.lips,
            ZoneGroup::Cheeks => &mut self.cheeks,
            ZoneGroup::Brows => &mut self.brows,
            ZoneGroup::Contour => &mut self.contour,
            ZoneGroup::Foundation => &mut self.foundation,
        }
    }

    fn base_opacity(&self, zone: Zone) -> f32 {
        match zone.group() {
            ZoneGroup::Lips => LIP_OPACITY,
            ZoneGroup::Cheeks => CHEEK_OPACITY,
            ZoneGroup::Brows => match self.brow_applicator {
                BrowApplicator::Pencil => BROW_PENCIL_OPACITY,
                BrowApplicator::Soft => BROW_SOFT_OPACITY,
            },
            ZoneGroup::Contour => CONTOUR_OPACITY,
            ZoneGroup::Foundation => FOUNDATION_OPACITY,
        }
    }

    /// Effective draw alpha for one zone: base opacity scaled by the group's
    /// intensity.
    pub fn alpha_for(&self, zone: Zone) -> f32 {
        self.base_opacity(zone) * self.params_for(zone.group()).intensity
    }
}

/// Latest cosmetic selection, shared between the UI side (writers) and the
/// frame pipeline (one snapshot per frame). Updates replace whole fields
/// under the lock; a reader never observes a half-written selection, and a
/// change lands on the next frame at the latest.
#[derive(Clone, Default)]
pub struct ParamChannel {
    inner: Arc<Mutex<CosmeticSelection>>,
}

impl ParamChannel {
    pub fn new(selection: CosmeticSelection) -> Self {
        Self {
            inner: Arc::new(Mutex::new(selection)),
        }
    }

    pub fn snapshot(&self) -> CosmeticSelection {
        self.lock().clone()
    }

    /// Replace the entire selection in one step.
    pub fn replace(&self, selection: CosmeticSelection) {
        *self.lock() = selection;
    }

    /// Set a zone group's shade from a raw descriptor. Malformed descriptors
    /// are rejected here so the render path never sees them.
    pub fn set_zone_color(&self, group: ZoneGroup, shade: &str) -> Result<(), ColorError> {
        let shade = Shade::parse(shade)?;
        self.lock().params_mut(group).shade = shade;
        Ok(())
    }

    pub fn set_zone_intensity(&self, group: ZoneGroup, intensity: f32) {
        self.lock().params_mut(group).intensity = intensity.clamp(0.0, 1.0);
    }

    pub fn set_visibility(&self, visible: bool) {
        self.lock().visible = visible;
    }

    pub fn set_brow_product(&self, product: &str) {
        self.lock().brow_applicator = BrowApplicator::from_product(product);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CosmeticSelection> {
        // A poisoned lock only means a writer panicked mid-assignment of
        // plain Copy fields; the data is still usable.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
