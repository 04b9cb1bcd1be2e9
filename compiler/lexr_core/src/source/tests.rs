use super::*;

// === Construction ===

#[test]
fn empty_source() {
    let source = Source::from("");
    assert!(source.is_empty());
    assert_eq!(source.len(), 0);
    assert_eq!(source.name(), None);
    assert_eq!(source.display_name(), "<input>");
}

#[test]
fn named_source() {
    let source = Source::named("grammar.pp", "a b");
    assert_eq!(source.name(), Some("grammar.pp"));
    assert_eq!(source.display_name(), "grammar.pp");
    assert_eq!(source.as_bytes(), b"a b");
}

#[test]
fn raw_bytes_are_kept_verbatim() {
    let source = Source::new(vec![0xFF, 0x00, b'a']);
    assert_eq!(source.as_bytes(), &[0xFF, 0x00, b'a']);
}

// === Excerpts ===

#[test]
fn excerpt_in_and_out_of_bounds() {
    let source = Source::from("hello");
    assert_eq!(source.excerpt(1, 3), Some(&b"el"[..]));
    assert_eq!(source.excerpt(3, 9), None);
}

// === Line/Column ===

#[test]
fn line_col_single_line() {
    let source = Source::from("abc");
    assert_eq!(source.line_col(0), (1, 1));
    assert_eq!(source.line_col(2), (1, 3));
}

#[test]
fn line_col_multi_line() {
    let source = Source::from("ab\ncd\n\nef");
    assert_eq!(source.line_col(3), (2, 1));
    assert_eq!(source.line_col(4), (2, 2));
    assert_eq!(source.line_col(6), (3, 1));
    assert_eq!(source.line_col(8), (4, 2));
}

#[test]
fn line_col_clamps_past_end() {
    let source = Source::from("a\nb");
    assert_eq!(source.line_col(100), (2, 2));
}
