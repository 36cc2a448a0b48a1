/*!
Design Matrix Module

Aligns binned spike and behaviour tables on `bin_idx` and expands selected
columns into time-lagged copies for regression-style analysis.

For lag offsets `tau` in `[-tau_pre, tau_post)` every requested column `x`
produces a column `x_<tau>` whose value at bin `i` is `x` at bin `i + tau`.
Negative offsets look into the past, positive offsets pull future values back
to the current bin. Offsets that land on a bin missing from the joined table
are null.

## Output layout
- Rows: bins present in both inputs, ascending
- Columns: offsets ascending, requested columns in request order within each
  offset, then `bin_idx`
- Lag columns are `Float64`
*/

#[cfg(feature = "python")]
pub mod python;

use std::collections::{HashMap, HashSet};

use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::wcst_core::{
    column_f64, column_i64, has_column, required, EncodeError, EncodeResult, Validatable,
    COL_BIN_IDX,
};

/// Which columns to lag and over how many bins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignConfig {
    /// Columns to lag, taken from either input table
    pub columns: Vec<String>,
    /// Number of bins to look into the past
    pub tau_pre: usize,
    /// Number of bins to look into the future (exclusive)
    pub tau_post: usize,
}

impl DesignConfig {
    pub fn new<I, S>(columns: I, tau_pre: usize, tau_post: usize) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            tau_pre,
            tau_post,
        }
    }

    /// Lag offsets in ascending order
    pub fn taus(&self) -> std::ops::Range<i64> {
        -(self.tau_pre as i64)..self.tau_post as i64
    }
}

impl Validatable for DesignConfig {
    fn validate(&self) -> EncodeResult<()> {
        if self.columns.is_empty() {
            return Err(EncodeError::InvalidConfig(
                "at least one column must be requested".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.columns {
            if column == COL_BIN_IDX {
                return Err(EncodeError::InvalidConfig(format!(
                    "{} is the join key and cannot be lagged",
                    COL_BIN_IDX
                )));
            }
            if !seen.insert(column.as_str()) {
                return Err(EncodeError::InvalidConfig(format!(
                    "column {} is requested twice",
                    column
                )));
            }
        }

        Ok(())
    }
}

/// Name of the lagged copy of `column` at offset `tau`
pub fn lag_column_name(column: &str, tau: i64) -> String {
    format!("{}_{}", column, tau)
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

/// Inner join of the two binned tables on `bin_idx`, sorted by bin
#[instrument(skip(spikes, behavior))]
pub fn join_bins(spikes: &DataFrame, behavior: &DataFrame) -> EncodeResult<DataFrame> {
    for df in [spikes, behavior] {
        if !has_column(df, COL_BIN_IDX) {
            return Err(EncodeError::MissingColumn(COL_BIN_IDX.to_string()));
        }
    }

    for name in column_names(spikes) {
        if name != COL_BIN_IDX && has_column(behavior, &name) {
            return Err(EncodeError::DuplicateColumn(name));
        }
    }

    let joint = spikes
        .clone()
        .lazy()
        .with_column(col(COL_BIN_IDX).cast(DataType::Int64))
        .join(
            behavior
                .clone()
                .lazy()
                .with_column(col(COL_BIN_IDX).cast(DataType::Int64)),
            [col(COL_BIN_IDX)],
            [col(COL_BIN_IDX)],
            JoinArgs::new(JoinType::Inner),
        )
        .sort([COL_BIN_IDX], SortMultipleOptions::default())
        .collect()?;

    debug!(
        spike_bins = spikes.height(),
        behavior_bins = behavior.height(),
        joint_bins = joint.height(),
        "Joined binned tables"
    );

    Ok(joint)
}

/// Build the lagged design matrix from binned spike and behaviour tables
///
/// # Arguments
/// * `spikes` - `bin_idx` plus `unit_*` count columns
/// * `behavior` - `bin_idx` plus behavioural indicator columns
/// * `config` - columns to lag and the lag window
///
/// # Errors
/// * `MissingColumn` if a requested column is in neither table, or a table lacks `bin_idx`
/// * `DuplicateColumn` if a non-key column name appears in both tables
/// * `InvalidInput` if a table repeats a `bin_idx`
/// * `EmptyInput` if the tables share no bins, including when either is empty
///
/// # Example
///
/// ```rust
/// use polars::prelude::*;
/// use wcst_encode::wcst_design::{design_matrix, DesignConfig};
///
/// let spikes = df! { "bin_idx" => [0i64, 1, 2], "unit_0" => [1u32, 0, 3] }?;
/// let behavior = df! { "bin_idx" => [0i64, 1, 2], "CORRECT" => [0.0f32, 1.0, 0.0] }?;
/// let design = design_matrix(&spikes, &behavior, &DesignConfig::new(["unit_0"], 1, 1))?;
/// let names: Vec<String> = design.get_column_names().iter().map(|n| n.to_string()).collect();
/// assert_eq!(names, ["unit_0_-1", "unit_0_0", "bin_idx"]);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[instrument(skip(spikes, behavior, config), fields(columns = config.columns.len(), tau_pre = config.tau_pre, tau_post = config.tau_post))]
pub fn design_matrix(
    spikes: &DataFrame,
    behavior: &DataFrame,
    config: &DesignConfig,
) -> EncodeResult<DataFrame> {
    config.validate()?;

    for column in &config.columns {
        if !has_column(spikes, column) && !has_column(behavior, column) {
            return Err(EncodeError::MissingColumn(column.clone()));
        }
    }

    let joint = join_bins(spikes, behavior)?;
    if joint.height() == 0 {
        return Err(EncodeError::EmptyInput(
            "spike and behaviour tables share no bins".to_string(),
        ));
    }

    let bins = column_i64(&joint, COL_BIN_IDX)?
        .into_iter()
        .enumerate()
        .map(|(row, bin)| required(bin, COL_BIN_IDX, row))
        .collect::<EncodeResult<Vec<i64>>>()?;

    let mut row_of = HashMap::with_capacity(bins.len());
    for (row, &bin) in bins.iter().enumerate() {
        if row_of.insert(bin, row).is_some() {
            return Err(EncodeError::InvalidInput(format!(
                "bin {} appears more than once",
                bin
            )));
        }
    }

    let sources = config
        .columns
        .iter()
        .map(|name| Ok((name.as_str(), column_f64(&joint, name)?)))
        .collect::<EncodeResult<Vec<_>>>()?;

    let mut columns: Vec<Column> = Vec::with_capacity(sources.len() * config.taus().count() + 1);
    for tau in config.taus() {
        for (name, values) in &sources {
            let lagged: Vec<Option<f64>> = bins
                .iter()
                .map(|&bin| row_of.get(&(bin + tau)).and_then(|&row| values[row]))
                .collect();
            columns.push(Series::new(lag_column_name(name, tau).into(), lagged).into());
        }
    }
    columns.push(Series::new(COL_BIN_IDX.into(), bins).into());

    debug!(rows = joint.height(), columns = columns.len(), "Built design matrix");

    Ok(DataFrame::new(columns)?)
}

/// Dense matrix of every non-`bin_idx` column, nulls as `NaN`
///
/// Rows follow the table order; columns follow the table's column order.
pub fn design_matrix_to_array(design: &DataFrame) -> EncodeResult<Array2<f64>> {
    let names: Vec<String> = column_names(design)
        .into_iter()
        .filter(|name| name != COL_BIN_IDX)
        .collect();

    let mut matrix = Array2::from_elem((design.height(), names.len()), f64::NAN);
    for (j, name) in names.iter().enumerate() {
        for (i, value) in column_f64(design, name)?.into_iter().enumerate() {
            if let Some(value) = value {
                matrix[[i, j]] = value;
            }
        }
    }

    Ok(matrix)
}
