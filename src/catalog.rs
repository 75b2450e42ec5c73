use std::collections::BTreeMap;

use anyhow::{Context, Result};
use glowrs_vision::{Shade, ZoneGroup};
use serde::Deserialize;

/// Scraped product catalog, embedded at compile time.
pub static CATALOG_JSON: &str = include_str!("../data/shades.json");

type RawShades = BTreeMap<String, String>;
type RawProducts = BTreeMap<String, RawShades>;
type RawFinishes = BTreeMap<String, RawProducts>;

#[derive(Debug, Deserialize)]
struct RawCatalog {
    lips: RawFinishes,
    cheeks: RawFinishes,
    brows: RawProducts,
    contour: RawProducts,
    foundation: RawProducts,
}

pub type ShadeMap = BTreeMap<String, Shade>;
pub type ProductMap = BTreeMap<String, ShadeMap>;
pub type FinishMap = BTreeMap<String, ProductMap>;

/// The shade catalog with every color validated up front. Lips and cheeks are
/// keyed finish → product → shade; brows, contour, and foundation have no
/// finish tier. A lookup of any combination that exists can never yield an
/// unparseable color at runtime.
pub struct Catalog {
    lips: FinishMap,
    cheeks: FinishMap,
    brows: ProductMap,
    contour: ProductMap,
    foundation: ProductMap,
}

impl Catalog {
    pub fn load_default() -> Result<Self> {
        Self::parse(CATALOG_JSON)
    }

    pub fn parse(json: &str) -> Result<Self> {
        let raw: RawCatalog = serde_json::from_str(json).context("parsing shade catalog")?;
        Ok(Self {
            lips: validate_finishes("lips", raw.lips)?,
            cheeks: validate_finishes("cheeks", raw.cheeks)?,
            brows: validate_products("brows", raw.brows)?,
            contour: validate_products("contour", raw.contour)?,
            foundation: validate_products("foundation", raw.foundation)?,
        })
    }

    /// Finish tiers for a group; empty for groups without one.
    pub fn finishes(&self, group: ZoneGroup) -> Vec<&str> {
        match group {
            ZoneGroup::Lips => self.lips.keys().map(String::as_str).collect(),
            ZoneGroup::Cheeks => self.cheeks.keys().map(String::as_str).collect(),
            _ => Vec::new(),
        }
    }

    pub fn products(&self, group: ZoneGroup, finish: Option<&str>) -> Vec<&str> {
        match group {
            ZoneGroup::Lips => finish
                .and_then(|f| self.lips.get(f))
                .map(product_names)
                .unwrap_or_default(),
            ZoneGroup::Cheeks => finish
                .and_then(|f| self.cheeks.get(f))
                .map(product_names)
                .unwrap_or_default(),
            ZoneGroup::Brows => product_names(&self.brows),
            ZoneGroup::Contour => product_names(&self.contour),
            ZoneGroup::Foundation => product_names(&self.foundation),
        }
    }

    /// The ordered shade map of one product, if the combination exists.
    pub fn shades(
        &self,
        group: ZoneGroup,
        finish: Option<&str>,
        product: &str,
    ) -> Option<&ShadeMap> {
        match group {
            ZoneGroup::Lips => self.lips.get(finish?)?.get(product),
            ZoneGroup::Cheeks => self.cheeks.get(finish?)?.get(product),
            ZoneGroup::Brows => self.brows.get(product),
            ZoneGroup::Contour => self.contour.get(product),
            ZoneGroup::Foundation => self.foundation.get(product),
        }
    }
}

fn product_names(map: &ProductMap) -> Vec<&str> {
    map.keys().map(String::as_str).collect()
}

fn validate_shades(zone: &str, product: &str, raw: RawShades) -> Result<ShadeMap> {
    raw.into_iter()
        .map(|(name, hex)| {
            let shade = Shade::parse(&hex)
                .with_context(|| format!("catalog entry {zone} / {product} / {name}"))?;
            Ok((name, shade))
        })
        .collect()
}

fn validate_products(zone: &str, raw: RawProducts) -> Result<ProductMap> {
    raw.into_iter()
        .map(|(product, shades)| {
            let validated = validate_shades(zone, &product, shades)?;
            Ok((product, validated))
        })
        .collect()
}

fn validate_finishes(zone: &str, raw: RawFinishes) -> Result<FinishMap> {
    raw.into_iter()
        .map(|(finish, products)| {
            let validated = validate_products(zone, products)?;
            Ok((finish, validated))
        })
        .collect()
}
