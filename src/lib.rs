// Core modules
pub mod tracing_config;
pub mod wcst_binning;
pub mod wcst_core;
pub mod wcst_design;

// Re-export core types for easier usage
pub use wcst_binning::{
    behavior_by_bins, interval_bins, spikes_by_bins, trial_intervals, EncodeConfig,
    IntervalConfig,
};
pub use wcst_core::{EncodeError, EncodeResult, SpikeRecord, TrialRecord};
pub use wcst_design::{design_matrix, DesignConfig};

#[cfg(feature = "python")]
use pyo3::prelude::*;
#[cfg(feature = "python")]
use pyo3::wrap_pyfunction;

/// A Python module implemented in Rust for binning trial events and spike
/// trains into lagged design matrices
#[cfg(feature = "python")]
#[pymodule]
fn wcst_encode(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let py = m.py();

    m.add_function(wrap_pyfunction!(version, m)?)?;

    // Register wcst_binning module as "binning" in Python
    let binning_submodule = PyModule::new(py, "binning")?;
    binning_submodule.add_function(wrap_pyfunction!(
        wcst_binning::python::behavior_by_bins_py,
        &binning_submodule
    )?)?;
    binning_submodule.add_function(wrap_pyfunction!(
        wcst_binning::python::spikes_by_bins_py,
        &binning_submodule
    )?)?;
    binning_submodule.add_function(wrap_pyfunction!(
        wcst_binning::python::trial_intervals_py,
        &binning_submodule
    )?)?;
    binning_submodule.add_function(wrap_pyfunction!(
        wcst_binning::python::interval_bins_py,
        &binning_submodule
    )?)?;
    binning_submodule.add_function(wrap_pyfunction!(
        wcst_binning::python::select_bins_py,
        &binning_submodule
    )?)?;
    m.add_submodule(&binning_submodule)?;

    // Register wcst_design module as "design" in Python
    let design_submodule = PyModule::new(py, "design")?;
    design_submodule.add_function(wrap_pyfunction!(
        wcst_design::python::design_matrix_py,
        &design_submodule
    )?)?;
    m.add_submodule(&design_submodule)?;

    // Register tracing_config module as "tracing_config" in Python
    let tracing_submodule = PyModule::new(py, "tracing_config")?;
    tracing_submodule.add_function(wrap_pyfunction!(
        tracing_config::python::init_py,
        &tracing_submodule
    )?)?;
    tracing_submodule.add_function(wrap_pyfunction!(
        tracing_config::python::init_debug_py,
        &tracing_submodule
    )?)?;
    tracing_submodule.add_function(wrap_pyfunction!(
        tracing_config::python::init_with_filter_py,
        &tracing_submodule
    )?)?;
    m.add_submodule(&tracing_submodule)?;

    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}

/// Returns the version of the library
#[cfg(feature = "python")]
#[pyfunction]
fn version() -> PyResult<String> {
    Ok(env!("CARGO_PKG_VERSION").to_string())
}

/// Returns the version of the library (non-Python version)
#[cfg(not(feature = "python"))]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
