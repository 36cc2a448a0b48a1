use polars::prelude::*;
use wcst_encode::wcst_binning::{bin_behavior, bin_spikes, EncodeConfig};
use wcst_encode::wcst_core::{EncodeError, ItemFeatures, Response, SpikeRecord, TrialRecord};
use wcst_encode::wcst_design::{design_matrix, design_matrix_to_array, DesignConfig};

fn lagged(df: &DataFrame, name: &str) -> Vec<Option<f64>> {
    df.column(name).unwrap().f64().unwrap().into_iter().collect()
}

fn bins(df: &DataFrame) -> Vec<i64> {
    df.column("bin_idx")
        .unwrap()
        .i64()
        .unwrap()
        .into_no_null_iter()
        .collect()
}

fn names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect()
}

#[test]
fn test_inner_join_keeps_shared_bins() {
    let spikes = df! {
        "bin_idx" => [0i64, 1, 2, 3, 4, 5],
        "unit_0" => [0u32, 1, 2, 3, 4, 5],
    }
    .unwrap();
    let behavior = df! {
        "bin_idx" => [2i64, 3, 4, 5, 6, 7],
        "CORRECT" => [0.0f32, 1.0, 0.0, 0.0, 1.0, 0.0],
    }
    .unwrap();

    let design = design_matrix(&spikes, &behavior, &DesignConfig::new(["unit_0"], 0, 1)).unwrap();
    assert_eq!(bins(&design), vec![2, 3, 4, 5]);
    assert_eq!(
        lagged(&design, "unit_0_0"),
        vec![Some(2.0), Some(3.0), Some(4.0), Some(5.0)]
    );
}

#[test]
fn test_lags_shift_within_joined_range() {
    let spikes = df! {
        "bin_idx" => [0i64, 1, 2, 3],
        "unit_0" => [10u32, 11, 12, 13],
    }
    .unwrap();
    let behavior = df! {
        "bin_idx" => [0i64, 1, 2, 3],
        "CORRECT" => [0.0f32, 0.0, 1.0, 0.0],
    }
    .unwrap();

    let config = DesignConfig::new(["unit_0", "CORRECT"], 2, 2);
    let design = design_matrix(&spikes, &behavior, &config).unwrap();

    assert_eq!(
        names(&design),
        vec![
            "unit_0_-2",
            "CORRECT_-2",
            "unit_0_-1",
            "CORRECT_-1",
            "unit_0_0",
            "CORRECT_0",
            "unit_0_1",
            "CORRECT_1",
            "bin_idx",
        ]
    );

    assert_eq!(
        lagged(&design, "unit_0_-2"),
        vec![None, None, Some(10.0), Some(11.0)]
    );
    assert_eq!(
        lagged(&design, "unit_0_-1"),
        vec![None, Some(10.0), Some(11.0), Some(12.0)]
    );
    assert_eq!(
        lagged(&design, "unit_0_1"),
        vec![Some(11.0), Some(12.0), Some(13.0), None]
    );
    assert_eq!(
        lagged(&design, "CORRECT_1"),
        vec![Some(0.0), Some(1.0), Some(0.0), None]
    );
}

#[test]
fn test_unsorted_inputs_are_ordered_by_bin() {
    let spikes = df! {
        "bin_idx" => [3i64, 1, 2, 0],
        "unit_0" => [13u32, 11, 12, 10],
    }
    .unwrap();
    let behavior = df! {
        "bin_idx" => [0i64, 1, 2, 3],
        "CORRECT" => [0.0f32, 0.0, 1.0, 0.0],
    }
    .unwrap();

    let design = design_matrix(&spikes, &behavior, &DesignConfig::new(["unit_0"], 1, 1)).unwrap();
    assert_eq!(bins(&design), vec![0, 1, 2, 3]);
    assert_eq!(
        lagged(&design, "unit_0_-1"),
        vec![None, Some(10.0), Some(11.0), Some(12.0)]
    );
}

#[test]
fn test_no_shared_bins() {
    let spikes = df! { "bin_idx" => [0i64, 1, 2], "unit_0" => [1u32, 2, 3] }.unwrap();
    let behavior = df! { "bin_idx" => [10i64, 11], "CORRECT" => [0.0f32, 1.0] }.unwrap();
    let config = DesignConfig::new(["unit_0", "CORRECT"], 1, 1);
    assert!(matches!(
        design_matrix(&spikes, &behavior, &config),
        Err(EncodeError::EmptyInput(_))
    ));

    let empty = df! { "bin_idx" => Vec::<i64>::new(), "CORRECT" => Vec::<f32>::new() }.unwrap();
    assert!(matches!(
        design_matrix(&spikes, &empty, &config),
        Err(EncodeError::EmptyInput(_))
    ));
}

#[test]
fn test_missing_requested_column() {
    let spikes = df! { "bin_idx" => [0i64], "unit_0" => [1u32] }.unwrap();
    let behavior = df! { "bin_idx" => [0i64], "CORRECT" => [1.0f32] }.unwrap();
    let result = design_matrix(&spikes, &behavior, &DesignConfig::new(["unit_9"], 1, 1));
    assert!(matches!(result, Err(EncodeError::MissingColumn(ref c)) if c == "unit_9"));
}

#[test]
fn test_end_to_end_pipeline() {
    let trials = vec![TrialRecord {
        trial_number: 0,
        items: vec![
            ItemFeatures::new("CYAN", "STAR", "RIPPLE"),
            ItemFeatures::new("GREEN", "CIRCLE", "SWIRL"),
        ],
        item_chosen: 1,
        response: Response::Correct,
        feedback_onset: 500.0,
        trial_end: 600.0,
    }];
    let config = EncodeConfig::new().with_choice_fixation_time(100.0);
    let behavior = bin_behavior(&trials, &config).unwrap();

    let spikes = bin_spikes(
        &[
            SpikeRecord::new(0, 20.0),
            SpikeRecord::new(0, 455.0),
            SpikeRecord::new(0, 480.0),
            SpikeRecord::new(1, 999.0),
        ],
        config.bin_size,
    )
    .unwrap();

    // behaviour covers bins 0..12, spikes cover 0..=19
    let design = design_matrix(
        &spikes,
        &behavior,
        &DesignConfig::new(["unit_0", "CORRECT", "GREEN"], 1, 2),
    )
    .unwrap();
    assert_eq!(design.height(), 12);

    let correct_next = lagged(&design, "CORRECT_1");
    assert_eq!(correct_next[9], Some(1.0));
    assert_eq!(correct_next[11], None);

    let green_prev = lagged(&design, "GREEN_-1");
    assert_eq!(green_prev[9], Some(1.0));
    assert_eq!(green_prev[0], None);

    assert_eq!(lagged(&design, "unit_0_0")[9], Some(2.0));

    let matrix = design_matrix_to_array(&design).unwrap();
    assert_eq!(matrix.dim(), (12, 9));
    assert!(matrix[[0, 0]].is_nan());
}

#[test]
fn test_design_matrix_is_idempotent() {
    let spikes = df! { "bin_idx" => [0i64, 1, 2], "unit_0" => [1u32, 2, 3] }.unwrap();
    let behavior = df! { "bin_idx" => [0i64, 1, 2], "CORRECT" => [0.0f32, 1.0, 0.0] }.unwrap();
    let config = DesignConfig::new(["unit_0", "CORRECT"], 1, 2);

    let first = design_matrix(&spikes, &behavior, &config).unwrap();
    let second = design_matrix(&spikes, &behavior, &config).unwrap();
    assert!(first.equals_missing(&second));
}
