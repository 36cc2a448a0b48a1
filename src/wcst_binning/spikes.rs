//! Per-unit spike counts per bin

use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::{debug, instrument};

use crate::wcst_core::{
    bin_index, check_bin_count, spikes_from_dataframe, validate_bin_size, EncodeError,
    EncodeResult, SpikeRecord, COL_BIN_IDX,
};

/// Column name for a unit's spike counts
pub fn unit_column(unit_id: i64) -> String {
    format!("unit_{}", unit_id)
}

/// Count spikes per unit in fixed-width bins
///
/// Returns `bin_idx` followed by one `UInt32` column `unit_<id>` per distinct
/// `UnitID`, in ascending id order. All units share the bin range
/// `0 ..= floor(max(SpikeTime) / bin_size)`; bins are half-open.
pub fn spikes_by_bins(df: &DataFrame, bin_size: f64) -> EncodeResult<DataFrame> {
    let spikes = spikes_from_dataframe(df)?;
    bin_spikes(&spikes, bin_size)
}

/// Bin typed spike records; see [`spikes_by_bins`]
#[instrument(skip(spikes), fields(spikes = spikes.len()))]
pub fn bin_spikes(spikes: &[SpikeRecord], bin_size: f64) -> EncodeResult<DataFrame> {
    validate_bin_size(bin_size)?;

    if spikes.is_empty() {
        return Err(EncodeError::EmptyInput("spike table".to_string()));
    }

    let mut max_bin = 0i64;
    for spike in spikes {
        if !spike.spike_time.is_finite() || spike.spike_time < 0.0 {
            return Err(EncodeError::InvalidInput(format!(
                "unit {} has invalid spike time {}",
                spike.unit_id, spike.spike_time
            )));
        }
        max_bin = max_bin.max(bin_index(spike.spike_time, bin_size));
    }
    let n_bins = (max_bin as usize).saturating_add(1);
    check_bin_count(n_bins)?;

    let mut counts: BTreeMap<i64, Vec<u32>> = BTreeMap::new();
    for spike in spikes {
        let bin = bin_index(spike.spike_time, bin_size) as usize;
        counts
            .entry(spike.unit_id)
            .or_insert_with(|| vec![0; n_bins])[bin] += 1;
    }

    debug!(bins = n_bins, units = counts.len(), "Binned spikes");

    let mut columns: Vec<Column> = Vec::with_capacity(counts.len() + 1);
    columns.push(Series::new(COL_BIN_IDX.into(), (0..n_bins as i64).collect::<Vec<i64>>()).into());
    for (unit_id, unit_counts) in counts {
        columns.push(Series::new(unit_column(unit_id).into(), unit_counts).into());
    }

    Ok(DataFrame::new(columns)?)
}
