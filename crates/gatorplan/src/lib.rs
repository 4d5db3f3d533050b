//! Degree requirement resolution and course recommendations for UF students.
//!
//! The [`requirements`] engine is pure and synchronous. Around it sit a
//! best-effort catalog scraper ([`catalog_info`]), a SQLite student store
//! ([`db`]) and the axum HTTP surface ([`server`]).

pub mod catalog_info;
pub mod config;
pub mod db;
pub mod requirements;
pub mod server;
pub mod types;
