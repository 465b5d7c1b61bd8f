use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        TracemarkError::format("x")
            .to_string()
            .contains("format error:")
    );
    assert!(
        TracemarkError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(TracemarkError::codec("x").to_string().contains("codec error:"));
    assert!(
        TracemarkError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn size_error_names_both_dimensions() {
    let err = TracemarkError::Size {
        secret: (5, 6),
        cover: (4, 4),
    };
    let s = err.to_string();
    assert!(s.contains("5x6"));
    assert!(s.contains("4x4"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = TracemarkError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
