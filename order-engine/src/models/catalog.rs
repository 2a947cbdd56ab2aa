//! Garment measurement catalog and standard outfits.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use std::path::Path;

use crate::error::EngineError;

/// Measurement field names taken for one garment type, in sheet order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarmentDefinition {
    pub garment_type: String,
    pub fields: Vec<String>,
}

/// Named bundle of garment types, e.g. "Three Piece Suit".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardOutfit {
    pub name: String,
    pub garment_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementCatalog {
    pub garments: Vec<GarmentDefinition>,
    #[serde(default)]
    pub outfits: Vec<StandardOutfit>,
}

fn garment(garment_type: &str, fields: &[&str]) -> GarmentDefinition {
    GarmentDefinition {
        garment_type: garment_type.to_string(),
        fields: fields.iter().map(|f| f.to_string()).collect(),
    }
}

fn outfit(name: &str, garment_types: &[&str]) -> StandardOutfit {
    StandardOutfit {
        name: name.to_string(),
        garment_types: garment_types.iter().map(|g| g.to_string()).collect(),
    }
}

static BUILTIN_CATALOG: Lazy<MeasurementCatalog> = Lazy::new(|| MeasurementCatalog {
    garments: vec![
        garment(
            "Shirt",
            &["Length", "Chest", "Waist", "Seat", "Shoulder", "Sleeve", "Collar", "Cuff"],
        ),
        garment(
            "Pant",
            &["Length", "Waist", "Seat", "Thigh", "Knee", "Bottom", "Crotch"],
        ),
        garment(
            "Kurta",
            &["Length", "Chest", "Waist", "Seat", "Shoulder", "Sleeve", "Neck", "Armhole"],
        ),
        garment("Pajama", &["Length", "Waist", "Seat", "Thigh", "Bottom"]),
        garment(
            "Coat",
            &["Length", "Chest", "Waist", "Seat", "Shoulder", "Sleeve", "Neck"],
        ),
        garment(
            "Waistcoat",
            &["Length", "Chest", "Waist", "Seat", "Shoulder", "Neck"],
        ),
        garment(
            "Blouse",
            &[
                "Length",
                "Bust",
                "Waist",
                "Shoulder",
                "Sleeve",
                "Armhole",
                "Front Neck",
                "Back Neck",
            ],
        ),
        garment("Salwar", &["Length", "Waist", "Seat", "Knee", "Bottom"]),
    ],
    outfits: vec![
        outfit("Formal", &["Shirt", "Pant"]),
        outfit("Two Piece Suit", &["Coat", "Pant"]),
        outfit("Three Piece Suit", &["Coat", "Waistcoat", "Pant"]),
        outfit("Kurta Pajama", &["Kurta", "Pajama"]),
        outfit("Salwar Suit", &["Kurta", "Salwar"]),
    ],
});

impl MeasurementCatalog {
    /// Catalog shipped with the engine, used when none is configured.
    pub fn builtin() -> &'static MeasurementCatalog {
        &BUILTIN_CATALOG
    }

    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let catalog: MeasurementCatalog = serde_json::from_str(json).map_err(AppError::from)?;
        catalog.check()?;
        Ok(catalog)
    }

    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path).map_err(AppError::from)?;
        let catalog = Self::from_json(&json)?;
        tracing::info!(
            path = %path.display(),
            garments = catalog.garments.len(),
            outfits = catalog.outfits.len(),
            "Measurement catalog loaded"
        );
        Ok(catalog)
    }

    /// Garment lookup ignores ASCII case.
    pub fn garment(&self, garment_type: &str) -> Option<&GarmentDefinition> {
        self.garments
            .iter()
            .find(|g| g.garment_type.eq_ignore_ascii_case(garment_type))
    }

    pub fn fields_for(&self, garment_type: &str) -> Option<&[String]> {
        self.garment(garment_type).map(|g| g.fields.as_slice())
    }

    pub fn outfit(&self, name: &str) -> Option<&StandardOutfit> {
        self.outfits
            .iter()
            .find(|o| o.name.eq_ignore_ascii_case(name))
    }

    /// Every outfit must reference garments the catalog defines.
    fn check(&self) -> Result<(), EngineError> {
        for garment in &self.garments {
            if garment.garment_type.trim().is_empty() {
                return Err(EngineError::validation(
                    "garment_type",
                    "garment type must not be empty",
                ));
            }
        }
        for outfit in &self.outfits {
            if let Some(missing) = outfit
                .garment_types
                .iter()
                .find(|g| self.garment(g).is_none())
            {
                return Err(EngineError::UnknownGarmentType(missing.clone()));
            }
        }
        Ok(())
    }
}
