//! Core Kernel - Foundational value types for the scoring engine
//!
//! This crate provides the building blocks shared by the decision core and
//! its callers:
//! - `Score`, a unit-interval newtype used for every factor and composite score
//! - Money types with precise decimal arithmetic for amounts and settlements
//! - `Rate`, a decimal fraction used for premium loadings

pub mod money;
pub mod score;
pub mod error;

pub use money::{Money, Currency, Rate};
pub use score::Score;
pub use error::CoreError;
