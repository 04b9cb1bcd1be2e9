use super::*;
use crate::RuleId;

fn token(id: RuleId, channel: Channel, value: &str) -> Token<'_> {
    Token::new(id, channel, value.as_bytes(), 0)
}

// === Channels ===

#[test]
fn named_default_token() {
    let printer = PrettyPrinter::default();
    let t = token(RuleId::from("T_NUMBER"), Channel::Default, "42");
    assert_eq!(printer.print(&t), "\"42\" (T_NUMBER)");
}

#[test]
fn index_token_prints_value_only() {
    let printer = PrettyPrinter::default();
    let t = token(RuleId::from(3), Channel::Default, "+");
    assert_eq!(printer.print(&t), "\"+\"");
}

#[test]
fn unknown_token() {
    let printer = PrettyPrinter::default();
    let t = token(RuleId::unknown(), Channel::Unknown, "#$");
    assert_eq!(printer.print(&t), "\"#$\" (unknown)");
}

#[test]
fn custom_channel_token() {
    let printer = PrettyPrinter::default();
    let named = token(RuleId::from("T_DOC"), Channel::custom("docs"), "/// x");
    assert_eq!(printer.print(&named), "\"/// x\" (T_DOC of docs)");
    let unnamed = token(RuleId::from(1), Channel::custom("docs"), "x");
    assert_eq!(printer.print(&unnamed), "\"x\" (of docs)");
}

#[test]
fn end_of_input() {
    let printer = PrettyPrinter::default();
    assert_eq!(printer.print(&Token::end_of_input(5)), "end of input");
}

// === Values ===

#[test]
fn whitespace_is_collapsed_and_controls_escaped() {
    let printer = PrettyPrinter::default();
    let t = token(RuleId::from(0), Channel::Default, "a \t  b\nc\0");
    assert_eq!(printer.print_value(&t), "\"a b\\nc\\0\"");
}

#[test]
fn quotes_are_escaped() {
    let printer = PrettyPrinter::default();
    let t = token(RuleId::from(0), Channel::Default, "say \"hi\"");
    assert_eq!(printer.print_value(&t), "\"say \\\"hi\\\"\"");
}

#[test]
fn long_values_are_shortened() {
    let printer = PrettyPrinter::default();
    let long = "x".repeat(50);
    let t = token(RuleId::from(0), Channel::Default, &long);
    let expected = format!("\"{}…\" (20+)", "x".repeat(30));
    assert_eq!(printer.print_value(&t), expected);
}

#[test]
fn values_just_over_the_limit_are_kept() {
    // 33 chars: shortening would not save anything over the suffix length.
    let printer = PrettyPrinter::default();
    let value = "y".repeat(33);
    let t = token(RuleId::from(0), Channel::Default, &value);
    assert_eq!(printer.print_value(&t), format!("\"{value}\""));
}
