//! DigiSheet domain: sheet models, formula engines, and reference data.
//!
//! Nothing in this crate performs I/O. Storage, files, and the tab host live
//! in `digisheet-engine`.

pub mod types;

pub mod document;
pub mod error;
pub mod ids;
pub mod qualities;
pub mod sheets;
pub mod special_orders;

pub use error::DomainError;
pub use ids::TabId;
pub use types::{FieldValue, NumberField, LEAF_LIMIT};

pub use sheets::{
    ComputedValues, FieldKind, FormulaEngine, FormulaRevision, HealthBand, HealthBar, OutputKey,
    SheetField, SheetKind, SheetModel,
};

pub use sheets::digimon::{
    DigimonEngine, DigimonField, DigimonSheet, QualityEntry, QualityType, Size, Stage,
};
pub use sheets::tamer::{AttributeKey, TamerEngine, TamerField, TamerSheet};

pub use document::{
    export_filename, import_bundle, BundleImport, BundleSheet, DocumentError, SheetBundle,
    SheetDocument,
};
pub use qualities::{LibraryQuality, QualityCatalog, QualityManifest};
pub use special_orders::{available_orders, retain_earned, SpecialOrder, SPECIAL_ORDERS};
