use mpp_core::errors::ErrorInfo;
use mpp_core::MppError;

#[test]
fn errors_round_trip_through_json() {
    let err = MppError::Feature(
        ErrorInfo::new("non-finite-value", "feature produced NaN")
            .with_context("feature", "mean-intensity")
            .with_hint("check the channel normalization"),
    );
    let json = serde_json::to_string(&err).unwrap();
    let restored: MppError = serde_json::from_str(&json).unwrap();
    assert_eq!(err, restored);
    assert!(restored.is_recoverable());
}

#[test]
fn display_includes_code_context_and_hint() {
    let err = MppError::Raster(
        ErrorInfo::new("missing-channel", "channel index out of range")
            .with_context("channel", "4")
            .with_hint("stacks are zero-indexed"),
    );
    let text = err.to_string();
    assert!(text.contains("raster error"));
    assert!(text.contains("missing-channel"));
    assert!(text.contains("channel=4"));
    assert!(text.contains("zero-indexed"));
}

#[test]
fn proposal_errors_are_not_recoverable() {
    let err = MppError::Proposal(ErrorInfo::new("corrupt-configuration", "duplicate ids"));
    assert!(!err.is_recoverable());
}
