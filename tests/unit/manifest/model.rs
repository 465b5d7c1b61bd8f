use super::*;

fn sample() -> Manifest {
    Manifest {
        created_at: Utc::now(),
        handler: HANDLER.to_string(),
        input: vec![SourceRef::video("in.mp4")],
        length: 10,
        resolution: Resolution::rgb(64, 48),
        font: FontSpec { size: 4 },
        alpha: 120,
        ciphers: vec!["あ1b".to_string(), "2c3".to_string()],
        positions: vec![1, 4, 9],
        locations: vec![vec![(10, 12)], vec![(20, 20), (30, 16)], vec![(8, 8)]],
    }
}

#[test]
fn json_roundtrip_is_lossless() {
    let m = sample();
    let mut buf = Vec::new();
    m.to_writer(&mut buf).unwrap();
    let text = String::from_utf8(buf.clone()).unwrap();
    assert!(text.contains("あ1b"));
    assert!(text.contains("\"resolution\": [\n    48,\n    64,\n    3\n  ]"));
    let de = Manifest::from_reader(buf.as_slice()).unwrap();
    assert_eq!(de, m);
}

#[test]
fn file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("conf.json");
    let m = sample();
    m.write_path(&path).unwrap();
    assert_eq!(Manifest::from_path(&path).unwrap(), m);
    assert!(matches!(
        Manifest::from_path(dir.path().join("missing.json")),
        Err(TracemarkError::Other(_))
    ));
}

#[test]
fn malformed_json_is_serde_error() {
    assert!(matches!(
        Manifest::from_reader("{\"length\": 3".as_bytes()),
        Err(TracemarkError::Serde(_))
    ));
}

#[test]
fn validate_accepts_sample() {
    sample().validate().unwrap();
}

#[test]
fn validate_rejects_unsorted_or_duplicate_positions() {
    let mut m = sample();
    m.positions = vec![1, 1, 9];
    assert!(m.validate().is_err());
    m.positions = vec![4, 1, 9];
    assert!(m.validate().is_err());
}

#[test]
fn validate_rejects_out_of_range_position() {
    let mut m = sample();
    m.positions = vec![1, 4, 10];
    assert!(m.validate().is_err());
}

#[test]
fn validate_rejects_misaligned_fields() {
    let mut m = sample();
    m.locations.pop();
    assert!(m.validate().is_err());

    let mut m = sample();
    m.locations[1].clear();
    assert!(m.validate().is_err());

    let mut m = sample();
    m.ciphers[1] = "22".to_string();
    assert!(m.validate().is_err());
}

#[test]
fn lookups() {
    let m = sample();
    assert_eq!(m.position_rank(4), Some(1));
    assert_eq!(m.position_rank(5), None);
    assert_eq!(m.max_duplicates(), 2);
    assert_eq!(m.cipher(1).unwrap(), "2c3");
    assert!(matches!(m.cipher(2), Err(TracemarkError::Validation(_))));
}
