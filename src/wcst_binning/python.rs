//! Python bindings for the binning module
//!
//! All functions take and return Polars DataFrames so they slot into existing
//! pandas/polars analysis notebooks.

use polars::prelude::*;
use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use super::{EncodeConfig, IntervalConfig};

/// Bin a trial table into one-hot feature and outcome indicators
///
/// Args:
///     beh: DataFrame with TrialNumber, Item{n}Color/Shape/Pattern, ItemChosen,
///         Response, FeedbackOnset and TrialEnd columns
///     bin_size: bin width in milliseconds
///     features: recognised feature labels (default: the 12 WCST features)
///     choice_fixation_time: offset from feedback onset back to choice (ms)
///
/// Returns:
///     DataFrame with one Float32 column per feature, CORRECT, INCORRECT, bin_idx
#[pyfunction]
#[pyo3(name = "behavior_by_bins")]
#[pyo3(signature = (beh, bin_size=50.0, features=None, choice_fixation_time=None))]
pub fn behavior_by_bins_py(
    beh: PyDataFrame,
    bin_size: f64,
    features: Option<Vec<String>>,
    choice_fixation_time: Option<f64>,
) -> PyResult<PyDataFrame> {
    let df: DataFrame = beh.into();

    let mut config = EncodeConfig::new().with_bin_size(bin_size);
    if let Some(features) = features {
        config = config.with_features(features);
    }
    if let Some(choice_fixation_time) = choice_fixation_time {
        config = config.with_choice_fixation_time(choice_fixation_time);
    }

    Ok(PyDataFrame(super::behavior_by_bins(&df, &config)?))
}

/// Count spikes per unit in fixed-width bins
///
/// Args:
///     spike_times: DataFrame with UnitID and SpikeTime columns
///     bin_size: bin width in milliseconds
///
/// Returns:
///     DataFrame with bin_idx and unit_<id> columns
#[pyfunction]
#[pyo3(name = "spikes_by_bins")]
#[pyo3(signature = (spike_times, bin_size=50.0))]
pub fn spikes_by_bins_py(spike_times: PyDataFrame, bin_size: f64) -> PyResult<PyDataFrame> {
    let df: DataFrame = spike_times.into();
    Ok(PyDataFrame(super::spikes_by_bins(&df, bin_size)?))
}

/// Per trial, find the time interval and bins surrounding an event
///
/// Args:
///     behavioral_data: DataFrame with TrialNumber and the `event` column
///     event: name of the event column to align around
///     pre_interval: time before the event to include, must be >= 0
///     post_interval: time after the event to include, must be >= 0
///     bin_size: bin width in milliseconds
///
/// Returns:
///     DataFrame with TrialNumber, IntervalStartTime, IntervalEndTime,
///     IntervalStartBin, IntervalEndBin
#[pyfunction]
#[pyo3(name = "trial_intervals")]
#[pyo3(signature = (behavioral_data, event="FeedbackOnset", pre_interval=0.0, post_interval=0.0, bin_size=50.0))]
pub fn trial_intervals_py(
    behavioral_data: PyDataFrame,
    event: &str,
    pre_interval: f64,
    post_interval: f64,
    bin_size: f64,
) -> PyResult<PyDataFrame> {
    let df: DataFrame = behavioral_data.into();
    let config = IntervalConfig::new(event, pre_interval, post_interval).with_bin_size(bin_size);
    Ok(PyDataFrame(super::trial_intervals(&df, &config)?))
}

/// All bins of all intervals, concatenated in trial order
#[pyfunction]
#[pyo3(name = "interval_bins")]
pub fn interval_bins_py(intervals: PyDataFrame) -> PyResult<Vec<i64>> {
    let df: DataFrame = intervals.into();
    Ok(super::interval_bins(&df)?)
}

/// Keep rows of a binned table whose bin_idx is in `bins`
#[pyfunction]
#[pyo3(name = "select_bins")]
pub fn select_bins_py(df: PyDataFrame, bins: Vec<i64>) -> PyResult<PyDataFrame> {
    let df: DataFrame = df.into();
    Ok(PyDataFrame(super::select_bins(&df, &bins)?))
}
