//! Catalog domain: asset store, kit manifests, catalog mutations and validation.

pub mod asset;
pub mod catalog;
pub mod layout;
pub mod manifest;
pub mod resolve;
pub mod validation;

pub use asset::{AssetStore, ContentKind, TemplateKind};
pub use catalog::{AddReport, BatchOutcome, Catalog, CreateReport, KitSummary, MatchMode, RemoveReport};
pub use layout::CatalogPaths;
pub use manifest::{KitContents, KitDir, KitManifest};
pub use resolve::{ResolvedItem, Strategy};
pub use validation::{KitValidation, ValidationSummary, validate_all, validate_kit};
