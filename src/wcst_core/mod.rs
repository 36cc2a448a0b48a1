//! Core record types, bin arithmetic and error handling
//!
//! Every transform in this crate consumes either typed records ([`TrialRecord`],
//! [`SpikeRecord`]) or Polars DataFrames carrying the same columns. This module
//! owns the conversion between the two so that column lookup failures surface as
//! a single [`EncodeError::MissingColumn`] regardless of which transform asked.

use std::fmt;
use std::str::FromStr;

use polars::prelude::*;

// Column names shared by the behavioural and spike tables
pub const COL_TRIAL_NUMBER: &str = "TrialNumber";
pub const COL_ITEM_CHOSEN: &str = "ItemChosen";
pub const COL_RESPONSE: &str = "Response";
pub const COL_FEEDBACK_ONSET: &str = "FeedbackOnset";
pub const COL_TRIAL_END: &str = "TrialEnd";
pub const COL_UNIT_ID: &str = "UnitID";
pub const COL_SPIKE_TIME: &str = "SpikeTime";
pub const COL_BIN_IDX: &str = "bin_idx";

/// Result type for encoding operations
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors raised while binning or aligning tables
///
/// All variants are fatal: transforms stop at the first malformed value and
/// return no partial result.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid input data: {0}")]
    InvalidInput(String),

    #[error("Empty input: {0} has no rows")]
    EmptyInput(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Column {0} is present in both tables")]
    DuplicateColumn(String),

    #[error("{0} is undefined")]
    UnknownResponse(String),

    #[error("Unknown feature: {0} is not in the configured feature list")]
    UnknownFeature(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

#[cfg(feature = "python")]
impl From<EncodeError> for pyo3::PyErr {
    fn from(error: EncodeError) -> Self {
        match error {
            EncodeError::MissingColumn(_) => {
                pyo3::exceptions::PyKeyError::new_err(error.to_string())
            }
            EncodeError::Polars(_) => pyo3::exceptions::PyRuntimeError::new_err(error.to_string()),
            _ => pyo3::exceptions::PyValueError::new_err(error.to_string()),
        }
    }
}

/// Trait for configurations that can be validated before a transform runs
pub trait Validatable {
    /// Validate this configuration
    fn validate(&self) -> EncodeResult<()>;
}

/// Bin index for timestamp `t` given a bin width: `floor(t / bin_size)`
pub fn bin_index(t: f64, bin_size: f64) -> i64 {
    (t / bin_size).floor() as i64
}

/// Largest number of bins a binned table may span
pub const MAX_BINS: usize = 100_000_000;

/// Reject bin counts past [`MAX_BINS`] before anything is allocated
pub fn check_bin_count(n_bins: usize) -> EncodeResult<()> {
    if n_bins > MAX_BINS {
        return Err(EncodeError::InvalidInput(format!(
            "{} bins exceeds the limit of {}",
            n_bins, MAX_BINS
        )));
    }
    Ok(())
}

/// Reject bin widths that would make `bin_index` meaningless
pub fn validate_bin_size(bin_size: f64) -> EncodeResult<()> {
    if !bin_size.is_finite() || bin_size <= 0.0 {
        return Err(EncodeError::InvalidConfig(format!(
            "bin_size must be a positive finite number, got {}",
            bin_size
        )));
    }
    Ok(())
}

/// Outcome of a trial as reported in the `Response` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Response {
    Correct,
    Incorrect,
}

impl Response {
    /// Indicator column name in the binned behaviour table
    pub fn column_name(&self) -> &'static str {
        match self {
            Response::Correct => "CORRECT",
            Response::Incorrect => "INCORRECT",
        }
    }
}

impl FromStr for Response {
    type Err = EncodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Correct" => Ok(Response::Correct),
            "Incorrect" => Ok(Response::Incorrect),
            other => Err(EncodeError::UnknownResponse(other.to_string())),
        }
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::Correct => write!(f, "Correct"),
            Response::Incorrect => write!(f, "Incorrect"),
        }
    }
}

/// Feature labels of one card on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFeatures {
    pub color: String,
    pub shape: String,
    pub pattern: String,
}

impl ItemFeatures {
    pub fn new(
        color: impl Into<String>,
        shape: impl Into<String>,
        pattern: impl Into<String>,
    ) -> Self {
        Self {
            color: color.into(),
            shape: shape.into(),
            pattern: pattern.into(),
        }
    }

    /// Labels in color, shape, pattern order
    pub fn labels(&self) -> [&str; 3] {
        [&self.color, &self.shape, &self.pattern]
    }
}

/// One behavioural trial
#[derive(Debug, Clone, PartialEq)]
pub struct TrialRecord {
    pub trial_number: i64,
    pub items: Vec<ItemFeatures>,
    pub item_chosen: usize,
    pub response: Response,
    pub feedback_onset: f64,
    pub trial_end: f64,
}

impl TrialRecord {
    /// Features of the chosen item
    pub fn chosen_item(&self) -> EncodeResult<&ItemFeatures> {
        self.items.get(self.item_chosen).ok_or_else(|| {
            EncodeError::InvalidInput(format!(
                "trial {} chose item {} but only {} items are defined",
                self.trial_number,
                self.item_chosen,
                self.items.len()
            ))
        })
    }
}

/// One detected spike
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeRecord {
    pub unit_id: i64,
    pub spike_time: f64,
}

impl SpikeRecord {
    pub fn new(unit_id: i64, spike_time: f64) -> Self {
        Self {
            unit_id,
            spike_time,
        }
    }
}

fn lookup<'a>(df: &'a DataFrame, name: &str) -> EncodeResult<&'a Column> {
    df.column(name)
        .map_err(|_| EncodeError::MissingColumn(name.to_string()))
}

/// Whether `df` has a column called `name`
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Read a numeric column as `f64`, casting integer columns
pub fn column_f64(df: &DataFrame, name: &str) -> EncodeResult<Vec<Option<f64>>> {
    let column = lookup(df, name)?.cast(&DataType::Float64)?;
    Ok(column.f64()?.into_iter().collect())
}

/// Read a numeric column as `i64`, casting float columns
pub fn column_i64(df: &DataFrame, name: &str) -> EncodeResult<Vec<Option<i64>>> {
    let column = lookup(df, name)?.cast(&DataType::Int64)?;
    Ok(column.i64()?.into_iter().collect())
}

/// Read a column as strings
pub fn column_str(df: &DataFrame, name: &str) -> EncodeResult<Vec<Option<String>>> {
    let column = lookup(df, name)?.cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Unwrap a cell, reporting the row and column of a null
pub fn required<T>(value: Option<T>, column: &str, row: usize) -> EncodeResult<T> {
    value.ok_or_else(|| EncodeError::InvalidInput(format!("null {} in row {}", column, row)))
}

fn item_columns(n: usize) -> [String; 3] {
    [
        format!("Item{n}Color"),
        format!("Item{n}Shape"),
        format!("Item{n}Pattern"),
    ]
}

/// Parse a trial table into typed records
///
/// Items are discovered from `Item{n}Color` columns starting at `n = 0`.
pub fn trials_from_dataframe(df: &DataFrame) -> EncodeResult<Vec<TrialRecord>> {
    if df.height() == 0 {
        return Err(EncodeError::EmptyInput("trial table".to_string()));
    }

    let mut item_count = 0;
    while has_column(df, &item_columns(item_count)[0]) {
        item_count += 1;
    }
    if item_count == 0 {
        return Err(EncodeError::MissingColumn(item_columns(0)[0].clone()));
    }

    let mut item_labels = Vec::with_capacity(item_count);
    for n in 0..item_count {
        let [color, shape, pattern] = item_columns(n);
        item_labels.push((
            column_str(df, &color)?,
            column_str(df, &shape)?,
            column_str(df, &pattern)?,
            [color, shape, pattern],
        ));
    }

    let trial_numbers = column_i64(df, COL_TRIAL_NUMBER)?;
    let chosen = column_i64(df, COL_ITEM_CHOSEN)?;
    let responses = column_str(df, COL_RESPONSE)?;
    let feedback = column_f64(df, COL_FEEDBACK_ONSET)?;
    let trial_ends = column_f64(df, COL_TRIAL_END)?;

    let mut trials = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let mut items = Vec::with_capacity(item_count);
        for (colors, shapes, patterns, names) in &item_labels {
            items.push(ItemFeatures {
                color: required(colors[row].clone(), &names[0], row)?,
                shape: required(shapes[row].clone(), &names[1], row)?,
                pattern: required(patterns[row].clone(), &names[2], row)?,
            });
        }

        let item_chosen = required(chosen[row], COL_ITEM_CHOSEN, row)?;
        let item_chosen = usize::try_from(item_chosen).map_err(|_| {
            EncodeError::InvalidInput(format!("negative ItemChosen {} in row {}", item_chosen, row))
        })?;

        let response: Response = required(responses[row].as_deref(), COL_RESPONSE, row)?.parse()?;

        trials.push(TrialRecord {
            trial_number: required(trial_numbers[row], COL_TRIAL_NUMBER, row)?,
            items,
            item_chosen,
            response,
            feedback_onset: required(feedback[row], COL_FEEDBACK_ONSET, row)?,
            trial_end: required(trial_ends[row], COL_TRIAL_END, row)?,
        });
    }

    Ok(trials)
}

/// Parse a spike table into typed records
pub fn spikes_from_dataframe(df: &DataFrame) -> EncodeResult<Vec<SpikeRecord>> {
    if df.height() == 0 {
        return Err(EncodeError::EmptyInput("spike table".to_string()));
    }

    let units = column_i64(df, COL_UNIT_ID)?;
    let times = column_f64(df, COL_SPIKE_TIME)?;

    units
        .into_iter()
        .zip(times)
        .enumerate()
        .map(|(row, (unit, time))| {
            Ok(SpikeRecord {
                unit_id: required(unit, COL_UNIT_ID, row)?,
                spike_time: required(time, COL_SPIKE_TIME, row)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trial_frame(response: &str) -> DataFrame {
        df! {
            "TrialNumber" => [1i64, 2],
            "Item0Color" => ["CYAN", "GREEN"],
            "Item0Shape" => ["STAR", "CIRCLE"],
            "Item0Pattern" => ["RIPPLE", "SWIRL"],
            "Item1Color" => ["YELLOW", "MAGENTA"],
            "Item1Shape" => ["SQUARE", "TRIANGLE"],
            "Item1Pattern" => ["ESCHER", "POLKADOT"],
            "ItemChosen" => [1.0f64, 0.0],
            "Response" => ["Correct", response],
            "FeedbackOnset" => [1500i64, 3500],
            "TrialEnd" => [2000.0f64, 4000.0],
        }
        .unwrap()
    }

    #[test]
    fn test_bin_index_floors() {
        assert_eq!(bin_index(0.0, 50.0), 0);
        assert_eq!(bin_index(49.9, 50.0), 0);
        assert_eq!(bin_index(50.0, 50.0), 1);
        assert_eq!(bin_index(400.0, 50.0), 8);
        assert_eq!(bin_index(-10.0, 50.0), -1);
    }

    #[test]
    fn test_validate_bin_size() {
        assert!(validate_bin_size(50.0).is_ok());
        assert!(validate_bin_size(0.0).is_err());
        assert!(validate_bin_size(-1.0).is_err());
        assert!(validate_bin_size(f64::NAN).is_err());
    }

    #[test]
    fn test_check_bin_count() {
        assert!(check_bin_count(0).is_ok());
        assert!(check_bin_count(MAX_BINS).is_ok());
        assert!(matches!(
            check_bin_count(MAX_BINS + 1),
            Err(EncodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_response_parsing() {
        assert_eq!("Correct".parse::<Response>().unwrap(), Response::Correct);
        assert_eq!("Incorrect".parse::<Response>().unwrap(), Response::Incorrect);
        let err = "Timeout".parse::<Response>().unwrap_err();
        assert!(matches!(err, EncodeError::UnknownResponse(ref s) if s == "Timeout"));
        assert_eq!(err.to_string(), "Timeout is undefined");
    }

    #[test]
    fn test_trials_from_dataframe() {
        let trials = trials_from_dataframe(&trial_frame("Incorrect")).unwrap();
        assert_eq!(trials.len(), 2);
        assert_eq!(trials[0].items.len(), 2);
        assert_eq!(trials[0].item_chosen, 1);
        assert_eq!(trials[0].feedback_onset, 1500.0);
        assert_eq!(
            trials[0].chosen_item().unwrap(),
            &ItemFeatures::new("YELLOW", "SQUARE", "ESCHER")
        );
        assert_eq!(trials[1].response, Response::Incorrect);
        assert_eq!(trials[1].trial_end, 4000.0);
    }

    #[test]
    fn test_trials_unknown_response() {
        let result = trials_from_dataframe(&trial_frame("Skipped"));
        assert!(matches!(result, Err(EncodeError::UnknownResponse(_))));
    }

    #[test]
    fn test_trials_missing_column() {
        let df = trial_frame("Correct").drop("TrialEnd").unwrap();
        let result = trials_from_dataframe(&df);
        assert!(matches!(result, Err(EncodeError::MissingColumn(ref c)) if c == "TrialEnd"));
    }

    #[test]
    fn test_chosen_item_out_of_range() {
        let trial = TrialRecord {
            trial_number: 7,
            items: vec![ItemFeatures::new("CYAN", "STAR", "RIPPLE")],
            item_chosen: 3,
            response: Response::Correct,
            feedback_onset: 100.0,
            trial_end: 200.0,
        };
        assert!(matches!(
            trial.chosen_item(),
            Err(EncodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_spikes_from_dataframe() {
        let df = df! {
            "UnitID" => [0i64, 3, 3],
            "SpikeTime" => [10.0f64, 60.0, 65.0],
        }
        .unwrap();
        let spikes = spikes_from_dataframe(&df).unwrap();
        assert_eq!(spikes[1], SpikeRecord::new(3, 60.0));
    }

    #[test]
    fn test_empty_spike_table() {
        let df = df! {
            "UnitID" => Vec::<i64>::new(),
            "SpikeTime" => Vec::<f64>::new(),
        }
        .unwrap();
        assert!(matches!(
            spikes_from_dataframe(&df),
            Err(EncodeError::EmptyInput(_))
        ));
    }
}
