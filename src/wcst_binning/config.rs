//! Binning configuration
//!
//! The feature vocabulary and the choice fixation offset belong to the
//! experiment, not to this crate, so they travel with every call inside
//! [`EncodeConfig`] instead of living in globals.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::wcst_core::{
    validate_bin_size, EncodeError, EncodeResult, Validatable, COL_FEEDBACK_ONSET,
};

/// Default bin width in milliseconds
pub const DEFAULT_BIN_SIZE: f64 = 50.0;

/// Default time between choice fixation and feedback onset in milliseconds
pub const DEFAULT_CHOICE_FIXATION_TIME: f64 = 800.0;

/// Card features of the Wisconsin Card Sorting Task: colors, shapes, patterns
pub const WCST_FEATURES: [&str; 12] = [
    "CYAN", "GREEN", "MAGENTA", "YELLOW", "CIRCLE", "SQUARE", "STAR", "TRIANGLE", "ESCHER",
    "POLKADOT", "RIPPLE", "SWIRL",
];

/// Configuration for behavioural and spike binning
///
/// # Example
///
/// ```rust
/// use wcst_encode::wcst_binning::EncodeConfig;
///
/// let config = EncodeConfig::new()
///     .with_bin_size(20.0)
///     .with_choice_fixation_time(500.0);
/// assert_eq!(config.features.len(), 12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodeConfig {
    /// Bin width, in the same time unit as the input tables
    pub bin_size: f64,

    /// Recognised feature labels; one indicator column each, in this order
    pub features: Vec<String>,

    /// Offset subtracted from feedback onset to locate the moment of choice
    pub choice_fixation_time: f64,
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            bin_size: DEFAULT_BIN_SIZE,
            features: WCST_FEATURES.iter().map(|f| f.to_string()).collect(),
            choice_fixation_time: DEFAULT_CHOICE_FIXATION_TIME,
        }
    }
}

impl EncodeConfig {
    /// Create a configuration with the WCST defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bin_size(mut self, bin_size: f64) -> Self {
        self.bin_size = bin_size;
        self
    }

    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_choice_fixation_time(mut self, choice_fixation_time: f64) -> Self {
        self.choice_fixation_time = choice_fixation_time;
        self
    }
}

impl Validatable for EncodeConfig {
    fn validate(&self) -> EncodeResult<()> {
        validate_bin_size(self.bin_size)?;

        if !self.choice_fixation_time.is_finite() || self.choice_fixation_time < 0.0 {
            return Err(EncodeError::InvalidConfig(format!(
                "choice_fixation_time must be >= 0, got {}",
                self.choice_fixation_time
            )));
        }

        let mut seen = HashSet::new();
        for feature in &self.features {
            if feature == "CORRECT" || feature == "INCORRECT" || feature == "bin_idx" {
                return Err(EncodeError::InvalidConfig(format!(
                    "feature name {} is reserved",
                    feature
                )));
            }
            if !seen.insert(feature.as_str()) {
                return Err(EncodeError::InvalidConfig(format!(
                    "feature {} is listed twice",
                    feature
                )));
            }
        }

        Ok(())
    }
}

/// Window around a per-trial event
///
/// Both offsets extend the window outwards from the event and must be
/// non-negative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalConfig {
    /// Name of the event column to align on
    pub event: String,
    /// Time before the event to include
    pub pre_interval: f64,
    /// Time after the event to include
    pub post_interval: f64,
    pub bin_size: f64,
}

impl Default for IntervalConfig {
    fn default() -> Self {
        Self {
            event: COL_FEEDBACK_ONSET.to_string(),
            pre_interval: 0.0,
            post_interval: 0.0,
            bin_size: DEFAULT_BIN_SIZE,
        }
    }
}

impl IntervalConfig {
    /// Window of `pre_interval` before and `post_interval` after `event`
    pub fn new(event: impl Into<String>, pre_interval: f64, post_interval: f64) -> Self {
        Self {
            event: event.into(),
            pre_interval,
            post_interval,
            ..Self::default()
        }
    }

    pub fn with_bin_size(mut self, bin_size: f64) -> Self {
        self.bin_size = bin_size;
        self
    }
}

impl Validatable for IntervalConfig {
    fn validate(&self) -> EncodeResult<()> {
        validate_bin_size(self.bin_size)?;

        let offsets_valid = self.pre_interval.is_finite()
            && self.post_interval.is_finite()
            && self.pre_interval >= 0.0
            && self.post_interval >= 0.0;
        if !offsets_valid {
            return Err(EncodeError::InvalidConfig(format!(
                "Neither pre_interval: {} or post_interval: {} should be negative",
                self.pre_interval, self.post_interval
            )));
        }

        if self.event.is_empty() {
            return Err(EncodeError::InvalidConfig(
                "event column name must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EncodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.bin_size, 50.0);
        assert_eq!(config.features[0], "CYAN");
    }

    #[test]
    fn test_duplicate_feature_rejected() {
        let config = EncodeConfig::new().with_features(["CYAN", "STAR", "CYAN"]);
        assert!(matches!(
            config.validate(),
            Err(EncodeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_reserved_feature_rejected() {
        let config = EncodeConfig::new().with_features(["CORRECT"]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_bin_size_rejected() {
        assert!(EncodeConfig::new().with_bin_size(0.0).validate().is_err());
        assert!(IntervalConfig::new("FeedbackOnset", 10.0, 10.0)
            .with_bin_size(-5.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_interval_offsets() {
        assert!(IntervalConfig::new("FeedbackOnset", 0.0, 0.0).validate().is_ok());
        assert!(IntervalConfig::new("FeedbackOnset", 100.0, 200.0).validate().is_ok());
        assert!(IntervalConfig::new("FeedbackOnset", -10.0, 200.0).validate().is_err());
        assert!(IntervalConfig::new("FeedbackOnset", 100.0, -1.0).validate().is_err());
    }

    #[test]
    fn test_config_from_json_uses_defaults() {
        let config: EncodeConfig =
            serde_json::from_str(r#"{"bin_size": 25.0, "features": ["CYAN", "STAR"]}"#).unwrap();
        assert_eq!(config.bin_size, 25.0);
        assert_eq!(config.features, vec!["CYAN", "STAR"]);
        assert_eq!(config.choice_fixation_time, DEFAULT_CHOICE_FIXATION_TIME);
    }
}
