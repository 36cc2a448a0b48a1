//! Tracing configuration and initialization for wcst_encode
//!
//! Every transform is instrumented with the `tracing` crate; nothing is printed
//! until the caller installs a subscriber. These helpers install one.

use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

/// Initialize tracing with default configuration
///
/// - Logs to stderr in compact format
/// - Respects the RUST_LOG environment variable
/// - Default level: INFO for wcst_encode, WARN for everything else
///
/// # Examples
///
/// ```rust,no_run
/// use wcst_encode::tracing_config;
///
/// tracing_config::init();
/// // RUST_LOG=wcst_encode=debug shows per-transform bin and row counts
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,wcst_encode=info"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .with(filter)
        .init();
}

/// Initialize tracing with debug output, file names and line numbers
pub fn init_debug() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,wcst_encode=debug"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .pretty()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .with(filter)
        .init();
}

/// Initialize tracing with a custom EnvFilter string
///
/// # Examples
///
/// ```rust,no_run
/// use wcst_encode::tracing_config;
///
/// tracing_config::init_with_filter("wcst_encode::wcst_design=debug");
/// ```
pub fn init_with_filter(filter: &str) {
    let filter = EnvFilter::new(filter);

    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(true))
        .with(filter)
        .init();
}

/// Initialize tracing for tests
///
/// Output goes through the test writer so it is captured per test. Safe to
/// call from several tests; only the first call installs the subscriber.
pub fn init_test() {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false).with_test_writer())
        .with(EnvFilter::new("warn,wcst_encode=debug"))
        .try_init();
}

/// Python bindings for tracing configuration
#[cfg(feature = "python")]
pub mod python {
    use pyo3::prelude::*;

    /// Initialize tracing with default configuration from Python
    #[pyfunction]
    #[pyo3(name = "init")]
    pub fn init_py() -> PyResult<()> {
        crate::tracing_config::init();
        Ok(())
    }

    /// Initialize tracing with debug configuration from Python
    #[pyfunction]
    #[pyo3(name = "init_debug")]
    pub fn init_debug_py() -> PyResult<()> {
        crate::tracing_config::init_debug();
        Ok(())
    }

    /// Initialize tracing with custom filter from Python
    #[pyfunction]
    #[pyo3(name = "init_with_filter")]
    pub fn init_with_filter_py(filter: &str) -> PyResult<()> {
        crate::tracing_config::init_with_filter(filter);
        Ok(())
    }
}
