//! Disease catalog: the read-only knowledge base the matcher runs against.

mod store;
mod types;

pub use store::{Catalog, CatalogError, CatalogStats};
pub use types::{
    DiseaseRecord, NutritionAdvice, Severity, Species, SpeciesScope, DEFAULT_SEVERITY_SCORE,
};
