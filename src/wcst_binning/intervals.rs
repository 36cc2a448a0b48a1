//! Event-centred trial intervals and their bins
//!
//! An interval covers `[event - pre_interval, event + post_interval]` in time
//! and `[start_bin, end_bin)` in bin space. [`interval_bins`] flattens those
//! bin ranges so a binned table can be cut down to the trials of interest with
//! [`select_bins`].

use std::collections::HashSet;

use polars::prelude::*;
use tracing::{debug, instrument};

use crate::wcst_binning::IntervalConfig;
use crate::wcst_core::{
    bin_index, column_f64, column_i64, required, EncodeError, EncodeResult, Validatable,
    COL_BIN_IDX, COL_TRIAL_NUMBER,
};

pub const COL_INTERVAL_START_TIME: &str = "IntervalStartTime";
pub const COL_INTERVAL_END_TIME: &str = "IntervalEndTime";
pub const COL_INTERVAL_START_BIN: &str = "IntervalStartBin";
pub const COL_INTERVAL_END_BIN: &str = "IntervalEndBin";

/// Time window and bin range of one trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialInterval {
    pub trial_number: i64,
    pub start_time: f64,
    pub end_time: f64,
    pub start_bin: i64,
    pub end_bin: i64,
}

impl TrialInterval {
    /// Bins in `[start_bin, end_bin)`
    pub fn bins(&self) -> std::ops::Range<i64> {
        self.start_bin..self.end_bin
    }
}

/// Compute intervals from `(trial_number, event_time)` pairs
#[instrument(skip(events), fields(trials = events.len()))]
pub fn intervals_from_events(
    events: &[(i64, f64)],
    config: &IntervalConfig,
) -> EncodeResult<Vec<TrialInterval>> {
    config.validate()?;

    if events.is_empty() {
        return Err(EncodeError::EmptyInput("trial table".to_string()));
    }

    events
        .iter()
        .map(|&(trial_number, event_time)| {
            if !event_time.is_finite() {
                return Err(EncodeError::InvalidInput(format!(
                    "trial {} has non-finite {} {}",
                    trial_number, config.event, event_time
                )));
            }
            let start_time = event_time - config.pre_interval;
            let end_time = event_time + config.post_interval;
            Ok(TrialInterval {
                trial_number,
                start_time,
                end_time,
                start_bin: bin_index(start_time, config.bin_size),
                end_bin: bin_index(end_time, config.bin_size),
            })
        })
        .collect()
}

/// Per trial, find the time window and bins surrounding `config.event`
///
/// `df` must contain `TrialNumber` and the event column. Returns one row per
/// trial with `TrialNumber`, `IntervalStartTime`, `IntervalEndTime`,
/// `IntervalStartBin` and `IntervalEndBin`.
///
/// # Errors
/// * `InvalidConfig` if either offset is negative, checked before any data is read
/// * `MissingColumn` if `TrialNumber` or the event column is absent
/// * `EmptyInput` if `df` has no rows
///
/// # Example
///
/// ```rust
/// use polars::prelude::*;
/// use wcst_encode::wcst_binning::{trial_intervals, IntervalConfig};
///
/// let trials = df! {
///     "TrialNumber" => [0i64],
///     "FeedbackOnset" => [1000.0f64],
/// }?;
/// let config = IntervalConfig::new("FeedbackOnset", 100.0, 200.0).with_bin_size(50.0);
/// let intervals = trial_intervals(&trials, &config)?;
/// assert_eq!(intervals.column("IntervalStartBin")?.i64()?.get(0), Some(18));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn trial_intervals(df: &DataFrame, config: &IntervalConfig) -> EncodeResult<DataFrame> {
    config.validate()?;

    let trial_numbers = column_i64(df, COL_TRIAL_NUMBER)?;
    let event_times = column_f64(df, &config.event)?;

    let events = trial_numbers
        .into_iter()
        .zip(event_times)
        .enumerate()
        .map(|(row, (trial, time))| {
            Ok((
                required(trial, COL_TRIAL_NUMBER, row)?,
                required(time, &config.event, row)?,
            ))
        })
        .collect::<EncodeResult<Vec<_>>>()?;

    let intervals = intervals_from_events(&events, config)?;
    intervals_to_dataframe(&intervals)
}

/// Build the interval table for typed intervals
pub fn intervals_to_dataframe(intervals: &[TrialInterval]) -> EncodeResult<DataFrame> {
    let df = df! {
        COL_TRIAL_NUMBER => intervals.iter().map(|i| i.trial_number).collect::<Vec<_>>(),
        COL_INTERVAL_START_TIME => intervals.iter().map(|i| i.start_time).collect::<Vec<_>>(),
        COL_INTERVAL_END_TIME => intervals.iter().map(|i| i.end_time).collect::<Vec<_>>(),
        COL_INTERVAL_START_BIN => intervals.iter().map(|i| i.start_bin).collect::<Vec<_>>(),
        COL_INTERVAL_END_BIN => intervals.iter().map(|i| i.end_bin).collect::<Vec<_>>(),
    }?;
    Ok(df)
}

/// All bins covered by all intervals, concatenated in trial order
///
/// `intervals` needs `IntervalStartBin` and `IntervalEndBin`; an empty table or
/// a row whose end precedes its start is rejected.
#[instrument(skip(intervals), fields(trials = intervals.height()))]
pub fn interval_bins(intervals: &DataFrame) -> EncodeResult<Vec<i64>> {
    let starts = column_i64(intervals, COL_INTERVAL_START_BIN)?;
    let ends = column_i64(intervals, COL_INTERVAL_END_BIN)?;
    if intervals.height() == 0 {
        return Err(EncodeError::EmptyInput("interval table".to_string()));
    }

    let mut bins = Vec::new();
    for (row, (start, end)) in starts.into_iter().zip(ends).enumerate() {
        let start = required(start, COL_INTERVAL_START_BIN, row)?;
        let end = required(end, COL_INTERVAL_END_BIN, row)?;
        if end < start {
            return Err(EncodeError::InvalidInput(format!(
                "interval in row {} ends at bin {} before it starts at bin {}",
                row, end, start
            )));
        }
        bins.extend(start..end);
    }

    debug!(bins = bins.len(), "Expanded interval bins");
    Ok(bins)
}

/// Keep the rows of a binned table whose `bin_idx` is in `bins`
///
/// Row order of `df` is preserved; duplicates in `bins` have no effect.
pub fn select_bins(df: &DataFrame, bins: &[i64]) -> EncodeResult<DataFrame> {
    let wanted: HashSet<i64> = bins.iter().copied().collect();
    let mask: BooleanChunked = column_i64(df, COL_BIN_IDX)?
        .into_iter()
        .map(|bin| bin.is_some_and(|bin| wanted.contains(&bin)))
        .collect();
    Ok(df.filter(&mask)?)
}
