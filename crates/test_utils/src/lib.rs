//! Shared test support for the scoring workspace
//!
//! - `fixtures`: canned applications and claims for the built-in factor table
//! - `builders`: `SubjectBuilder` for subjects with only the fields a test needs
//! - `assertions`: score, ordering and money assertions with readable failures
//! - `generators`: proptest strategies for partial subjects
//!
//! Subjects are plain `serde_json::Value`s and this crate does not depend on
//! `domain_scoring`, so the domain crate can take it as a dev-dependency.

pub mod assertions;
pub mod builders;
pub mod fixtures;
pub mod generators;

pub use assertions::*;
pub use builders::*;
pub use fixtures::*;
pub use generators::*;
