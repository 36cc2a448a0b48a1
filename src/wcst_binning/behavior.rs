//! One-hot binning of trial events
//!
//! Each trial marks two bins: the chosen card's color, shape and pattern in the
//! bin holding the moment of choice (feedback onset minus the choice fixation
//! time), and `CORRECT` or `INCORRECT` in the bin holding feedback onset.

use std::collections::HashMap;

use polars::prelude::*;
use tracing::{debug, instrument};

use crate::wcst_binning::EncodeConfig;
use crate::wcst_core::{
    bin_index, check_bin_count, trials_from_dataframe, EncodeError, EncodeResult, Response,
    TrialRecord, Validatable, COL_BIN_IDX,
};

/// Bin a trial table into one indicator column per feature plus outcome columns
///
/// Columns, in order: every configured feature, `CORRECT`, `INCORRECT`,
/// `bin_idx`. Indicators are `Float32` and zero in every bin no trial touched.
///
/// # Errors
/// * `UnknownResponse` for a `Response` other than `Correct`/`Incorrect`
/// * `MissingColumn` when the trial table lacks a required column
/// * see [`bin_behavior`] for the rest
pub fn behavior_by_bins(df: &DataFrame, config: &EncodeConfig) -> EncodeResult<DataFrame> {
    let trials = trials_from_dataframe(df)?;
    bin_behavior(&trials, config)
}

/// Bin typed trial records; see [`behavior_by_bins`]
///
/// The table spans `ceil(max(trial_end) / bin_size)` bins, extended when a
/// marked bin would fall past that end.
///
/// # Errors
/// * `EmptyInput` if `trials` is empty
/// * `UnknownFeature` if a chosen label is not in `config.features`
/// * `InvalidInput` for non-finite times, a choice time before zero, or a
///   chosen item index with no item
#[instrument(skip(trials, config), fields(trials = trials.len(), bin_size = config.bin_size))]
pub fn bin_behavior(trials: &[TrialRecord], config: &EncodeConfig) -> EncodeResult<DataFrame> {
    config.validate()?;

    if trials.is_empty() {
        return Err(EncodeError::EmptyInput("trial table".to_string()));
    }

    let feature_index: HashMap<&str, usize> = config
        .features
        .iter()
        .enumerate()
        .map(|(i, feature)| (feature.as_str(), i))
        .collect();
    let n_features = config.features.len();
    let outcome_column = |response: Response| match response {
        Response::Correct => n_features,
        Response::Incorrect => n_features + 1,
    };

    let mut marks: Vec<(usize, usize)> = Vec::with_capacity(trials.len() * 4);
    let mut max_end = 0.0f64;

    for trial in trials {
        if !trial.feedback_onset.is_finite() || !trial.trial_end.is_finite() {
            return Err(EncodeError::InvalidInput(format!(
                "trial {} has non-finite event times",
                trial.trial_number
            )));
        }

        let item = trial.chosen_item()?;
        let chosen_time = trial.feedback_onset - config.choice_fixation_time;
        if chosen_time < 0.0 {
            return Err(EncodeError::InvalidInput(format!(
                "trial {} has choice time {} before recording start",
                trial.trial_number, chosen_time
            )));
        }

        let chosen_bin = bin_index(chosen_time, config.bin_size) as usize;
        for label in item.labels() {
            let column = feature_index
                .get(label)
                .copied()
                .ok_or_else(|| EncodeError::UnknownFeature(label.to_string()))?;
            marks.push((chosen_bin, column));
        }

        let feedback_bin = bin_index(trial.feedback_onset, config.bin_size) as usize;
        marks.push((feedback_bin, outcome_column(trial.response)));

        max_end = max_end.max(trial.trial_end);
    }

    let covered_bins = (max_end / config.bin_size).ceil() as usize;
    let marked_bins = marks
        .iter()
        .map(|&(bin, _)| bin.saturating_add(1))
        .max()
        .unwrap_or(0);
    let n_bins = covered_bins.max(marked_bins);
    check_bin_count(n_bins)?;

    let mut indicators = vec![vec![0.0f32; n_bins]; n_features + 2];
    for (bin, column) in marks {
        indicators[column][bin] = 1.0;
    }

    let names = config
        .features
        .iter()
        .map(String::as_str)
        .chain([Response::Correct.column_name(), Response::Incorrect.column_name()]);

    let mut columns: Vec<Column> = names
        .zip(indicators)
        .map(|(name, values)| Series::new(name.into(), values).into())
        .collect();
    columns.push(Series::new(COL_BIN_IDX.into(), (0..n_bins as i64).collect::<Vec<i64>>()).into());

    debug!(bins = n_bins, features = n_features, "Binned behaviour");

    Ok(DataFrame::new(columns)?)
}
