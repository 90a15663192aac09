//! Banded classification of composite scores
//!
//! Both risk tiers and decision statuses are picked by walking an ordered
//! list of bands from the highest threshold down. Validation at load time
//! guarantees the list ends in a catch-all band starting at zero, which makes
//! [`Bands::classify`] total.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::Score;

use crate::error::ConfigurationError;

fn inclusive_default() -> bool {
    true
}

/// One classification band
///
/// With `inclusive` set the band admits scores `>= lower`, otherwise only
/// scores `> lower`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band<T> {
    pub label: T,
    pub lower: f64,
    #[serde(default = "inclusive_default")]
    pub inclusive: bool,
}

impl<T> Band<T> {
    /// Band admitting scores at or above `lower`
    pub fn at_least(label: T, lower: f64) -> Self {
        Self {
            label,
            lower,
            inclusive: true,
        }
    }

    /// Band admitting scores strictly above `lower`
    pub fn above(label: T, lower: f64) -> Self {
        Self {
            label,
            lower,
            inclusive: false,
        }
    }

    fn admits(&self, score: Score) -> bool {
        let value = score.value();
        if self.inclusive {
            value >= self.lower
        } else {
            value > self.lower
        }
    }
}

/// A validated, exhaustive list of bands
#[derive(Debug, Clone, PartialEq)]
pub struct Bands<T> {
    bands: Vec<Band<T>>,
    floor: T,
}

impl<T: Copy + fmt::Debug> Bands<T> {
    /// Validates bands ordered from the highest threshold down
    ///
    /// Thresholds must lie in `[0, 1]` and strictly descend, and the last
    /// band must be inclusive at zero so every score is covered.
    pub fn new(bands: Vec<Band<T>>) -> Result<Self, ConfigurationError> {
        let Some(last) = bands.last() else {
            return Err(ConfigurationError::invalid_bands("at least one band is required"));
        };
        if last.lower != 0.0 || !last.inclusive {
            return Err(ConfigurationError::invalid_bands(format!(
                "final band {:?} must be inclusive at 0",
                last.label
            )));
        }
        if let Some(band) = bands.iter().find(|band| !Score::is_unit(band.lower)) {
            return Err(ConfigurationError::invalid_bands(format!(
                "band {:?} threshold {} is outside [0, 1]",
                band.label, band.lower
            )));
        }
        if let Some(pair) = bands.windows(2).find(|pair| pair[0].lower <= pair[1].lower) {
            return Err(ConfigurationError::invalid_bands(format!(
                "band {:?} at {} does not descend from {:?} at {}",
                pair[1].label, pair[1].lower, pair[0].label, pair[0].lower
            )));
        }
        let floor = last.label;
        Ok(Self { bands, floor })
    }

    /// Returns the label of the first band admitting the score
    pub fn classify(&self, score: Score) -> T {
        self.bands
            .iter()
            .find(|band| band.admits(score))
            .map_or(self.floor, |band| band.label)
    }

    /// Returns the bands, highest threshold first
    pub fn bands(&self) -> &[Band<T>] {
        &self.bands
    }
}

/// Discrete risk classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        };
        write!(f, "{label}")
    }
}

impl RiskTier {
    /// Default tiers: HIGH from 0.7, MEDIUM from 0.4, LOW below
    pub fn default_bands() -> Vec<Band<RiskTier>> {
        vec![
            Band::at_least(RiskTier::High, 0.7),
            Band::at_least(RiskTier::Medium, 0.4),
            Band::at_least(RiskTier::Low, 0.0),
        ]
    }
}
