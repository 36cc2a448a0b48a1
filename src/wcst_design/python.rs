//! Python bindings for design matrix construction

use polars::prelude::*;
use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use super::DesignConfig;

/// Reformat binned data as a lagged design matrix
///
/// Args:
///     spikes_by_bins: DataFrame with bin_idx and unit_* columns
///     beh_by_bins: DataFrame with bin_idx and behavioural columns
///     columns: columns to lag, present in either table
///     tau_pre: number of bins to look into the past
///     tau_post: number of bins to look into the future
///
/// Returns:
///     DataFrame with <column>_<tau> columns and bin_idx; missing shifts are null
#[pyfunction]
#[pyo3(name = "design_matrix")]
pub fn design_matrix_py(
    spikes_by_bins: PyDataFrame,
    beh_by_bins: PyDataFrame,
    columns: Vec<String>,
    tau_pre: usize,
    tau_post: usize,
) -> PyResult<PyDataFrame> {
    let spikes: DataFrame = spikes_by_bins.into();
    let behavior: DataFrame = beh_by_bins.into();
    let config = DesignConfig::new(columns, tau_pre, tau_post);
    Ok(PyDataFrame(super::design_matrix(&spikes, &behavior, &config)?))
}
