use super::*;

fn refs() -> Vec<PathBuf> {
    ["a_3.jpg", "b_1.jpg", "c_2.jpg", "d_1.jpg"]
        .iter()
        .map(PathBuf::from)
        .collect()
}

fn digit_metric(_: &Path, reference: &Path) -> TracemarkResult<f64> {
    let stem = reference.file_stem().and_then(|s| s.to_str()).unwrap_or("");
    let digit = stem.rsplit('_').next().unwrap_or("0");
    digit
        .parse::<f64>()
        .map_err(|e| TracemarkError::validation(e.to_string()))
}

#[test]
fn lower_is_closer_picks_first_minimum() {
    let m = identify(
        Path::new("x.jpg"),
        &refs(),
        &digit_metric,
        ScoreOrder::LowerIsCloser,
    )
    .unwrap();
    assert_eq!(m.index, 1);
    assert_eq!(m.reference, PathBuf::from("b_1.jpg"));
    assert_eq!(m.score, 1.0);
}

#[test]
fn higher_is_closer_picks_maximum() {
    let m = identify(
        Path::new("x.jpg"),
        &refs(),
        &digit_metric,
        ScoreOrder::HigherIsCloser,
    )
    .unwrap();
    assert_eq!(m.index, 0);
}

#[test]
fn empty_references_and_nan_scores_are_rejected() {
    assert!(identify(Path::new("x"), &[], &digit_metric, ScoreOrder::default()).is_err());
    let nan = |_: &Path, _: &Path| -> TracemarkResult<f64> { Ok(f64::NAN) };
    assert!(identify(Path::new("x"), &refs(), &nan, ScoreOrder::default()).is_err());
}

#[test]
fn metric_errors_propagate() {
    let failing = |_: &Path, _: &Path| -> TracemarkResult<f64> {
        Err(TracemarkError::format("unreadable"))
    };
    assert!(matches!(
        identify(Path::new("x"), &refs(), &failing, ScoreOrder::default()),
        Err(TracemarkError::Format(_))
    ));
}
