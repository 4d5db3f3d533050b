//! Course display information scraped from the UF catalog.
//!
//! Purely informational: nothing here feeds eligibility or recommendation.

mod cache;
mod client;
mod error;
mod parser;
mod types;

pub use cache::{CacheStats, CircuitBreaker, CourseInfoCache};
pub use client::{CatalogClient, CatalogClientConfig, HttpFetcher, PageFetcher};
pub use error::CatalogInfoError;
pub use parser::{format_instructor, parse_catalog_page, parse_syllabus_page};
pub use types::{CourseInfo, InfoSource, SyllabusEntry};
