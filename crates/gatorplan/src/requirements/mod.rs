//! Degree requirement and prerequisite resolution.
//!
//! The catalog and prerequisite map are parsed once at startup and shared
//! read-only. Everything else in this module is pure and synchronous; the only
//! non-determinism is the random source handed to
//! [`RecommendationSelector::recommend`].

mod config;
mod eligibility;
mod error;
mod normalize;
mod prereq;
mod processor;
mod types;

pub use config::{CollegeRequirements, PrerequisiteMap, RequirementCatalog};
pub use error::CatalogError;
pub use normalize::{normalize, normalize_and_dedupe};
pub use processor::{RecommendLimits, RecommendationSelector};
pub use types::*;

use std::path::Path;
use std::sync::Arc;

/// Loads the catalogs from `dir` when given, otherwise the builtin data, and
/// wraps them in a shared selector.
pub fn load_selector(dir: Option<&Path>) -> Result<RecommendationSelector, CatalogError> {
    let (catalog, prerequisites) = match dir {
        Some(dir) => (
            RequirementCatalog::load_from_directory(dir)?,
            PrerequisiteMap::load_from_directory(dir)?,
        ),
        None => (RequirementCatalog::builtin()?, PrerequisiteMap::builtin()?),
    };

    tracing::info!(
        colleges = catalog.len(),
        prerequisites = prerequisites.len(),
        "Requirement data ready"
    );
    Ok(RecommendationSelector::new(
        Arc::new(catalog),
        Arc::new(prerequisites),
    ))
}
