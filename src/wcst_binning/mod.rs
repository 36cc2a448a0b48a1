//! Time binning of behavioural events and spike trains
//!
//! This module turns irregularly timed, pre-recorded tables into fixed-width
//! bin tables that share a `bin_idx` key:
//!
//! - **Behaviour**: one-hot indicators for the chosen card's features at the
//!   moment of choice, and for the trial outcome at feedback onset
//! - **Spikes**: per-unit spike counts over half-open bins
//! - **Intervals**: per-trial windows around an event, and the flat list of
//!   bins they cover
//!
//! Bin `k` covers `[k * bin_size, (k + 1) * bin_size)`; see
//! [`crate::wcst_core::bin_index`].
//!
//! # Usage
//!
//! ```rust
//! use wcst_encode::wcst_binning::{bin_spikes, EncodeConfig};
//! use wcst_encode::wcst_core::SpikeRecord;
//!
//! let spikes = vec![
//!     SpikeRecord::new(7, 10.0),
//!     SpikeRecord::new(7, 60.0),
//!     SpikeRecord::new(7, 65.0),
//! ];
//! let binned = bin_spikes(&spikes, EncodeConfig::default().bin_size)?;
//! assert_eq!(binned.height(), 2);
//! # Ok::<(), wcst_encode::wcst_core::EncodeError>(())
//! ```

pub mod behavior;
pub mod config;
pub mod intervals;
#[cfg(feature = "python")]
pub mod python;
pub mod spikes;

pub use behavior::{behavior_by_bins, bin_behavior};
pub use config::{
    EncodeConfig, IntervalConfig, DEFAULT_BIN_SIZE, DEFAULT_CHOICE_FIXATION_TIME, WCST_FEATURES,
};
pub use intervals::{
    interval_bins, intervals_from_events, intervals_to_dataframe, select_bins, trial_intervals,
    TrialInterval,
};
pub use spikes::{bin_spikes, spikes_by_bins, unit_column};
