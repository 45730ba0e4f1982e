use pretty_assertions::assert_eq;

use super::*;

fn err(code: ErrorCode, at: u32, msg: &str) -> Diagnostic {
    Diagnostic::error(code)
        .with_message(msg)
        .with_label(Span::new(at, at + 1), "here")
}

#[test]
fn flush_sorts_by_primary_span() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig::unlimited());
    queue.add(err(ErrorCode::E2002, 40, "b"));
    queue.add(err(ErrorCode::E2001, 5, "a"));
    queue.add(Diagnostic::warning(ErrorCode::E3006).with_message("no span"));

    let out = queue.flush();
    let codes: Vec<_> = out.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E2001, ErrorCode::E2002, ErrorCode::E3006]);
    assert_eq!(queue.error_count(), 0);
}

#[test]
fn deduplicates_identical_reports() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.add(err(ErrorCode::E2001, 1, "unknown type `T`")));
    assert!(!queue.add(err(ErrorCode::E2001, 1, "unknown type `T`")));
    assert!(queue.add(err(ErrorCode::E2001, 9, "unknown type `T`")));
    assert_eq!(queue.error_count(), 2);
}

#[test]
fn error_limit_drops_extra_errors_but_keeps_warnings() {
    let mut queue = DiagnosticQueue::with_config(DiagnosticConfig {
        error_limit: 2,
        deduplicate: false,
    });
    assert!(queue.add(err(ErrorCode::E2002, 1, "x")));
    assert!(queue.add(err(ErrorCode::E2002, 2, "x")));
    assert!(queue.limit_reached());
    assert!(!queue.add(err(ErrorCode::E2002, 3, "x")));
    assert!(queue.add(Diagnostic::warning(ErrorCode::E3006).with_message("w")));
    assert_eq!(queue.error_count(), 2);
    assert_eq!(queue.warning_count(), 1);
}

#[test]
fn has_errors_tracks_emitted_errors() {
    let mut queue = DiagnosticQueue::new();
    assert!(queue.has_errors().is_none());
    let _proof = queue.emit_error(err(ErrorCode::E4001, 0, "division by zero"));
    assert!(queue.has_errors().is_some());
}

#[test]
fn internal_error_uses_e9001() {
    let diag = internal_error("broken invariant", Span::new(1, 2));
    assert_eq!(diag.code, ErrorCode::E9001);
    assert!(diag.is_error());
}
