use super::*;
use crate::error::{ConfigErrorKind, TransitionErrorKind};
use crate::handler::OnUnknownToken;
use pretty_assertions::assert_eq;

fn summary(tokens: &[Token<'_>]) -> Vec<(String, usize, String)> {
    tokens
        .iter()
        .map(|t| (t.id().to_string(), t.offset(), t.text().into_owned()))
        .collect()
}

fn triple(rule: &str, offset: usize, text: &str) -> (String, usize, String) {
    (rule.to_owned(), offset, text.to_owned())
}

/// `<% ... %>` templates: text outside, a tiny expression language inside.
fn template() -> Multistate {
    let outside = LexerState::with_rules("default", [("OPEN", "<%"), ("TEXT", "[^<]+|<")])
        .transition("OPEN", "embedded");
    let inside = LexerState::with_rules(
        "embedded",
        [("CLOSE", "%>"), ("BODY", "[a-z]+"), ("WS", r"\s+")],
    )
    .hide(["WS"])
    .transition("CLOSE", "default");
    Multistate::new(vec![outside, inside], None, LexerConfig::default()).unwrap()
}

fn config_error(result: Result<Multistate, LexError>) -> ConfigErrorKind {
    match result.unwrap_err() {
        LexError::Configuration(err) => err.kind,
        other => panic!("expected Configuration, got {other:?}"),
    }
}

// === Transitions ===

#[test]
fn switches_states_around_embedded_code() {
    let source = Source::from("a<%x%>b");
    let tokens = template().lex_all(&source, 0, None).unwrap();
    assert_eq!(
        summary(&tokens),
        vec![
            triple("TEXT", 0, "a"),
            triple("OPEN", 1, "<%"),
            triple("BODY", 3, "x"),
            triple("CLOSE", 4, "%>"),
            triple("TEXT", 6, "b"),
            triple("T_EOI", 7, ""),
        ]
    );
}

#[test]
fn trigger_token_is_emitted_before_switch() {
    let source = Source::from("<%x%>");
    let lexer = template();
    let mut stream = lexer.lex(&source, 0, None).unwrap();
    assert_eq!(stream.current_state(), "default");
    let open = stream.next().unwrap().unwrap();
    assert_eq!(open.id(), &lexr_core::RuleId::from("OPEN"));
    assert_eq!(stream.current_state(), "embedded");
}

#[test]
fn explicit_initial_state() {
    let outside = LexerState::with_rules("default", [("OPEN", "<%")]).transition("OPEN", "embedded");
    let inside = LexerState::with_rules("embedded", [("BODY", "[a-z]+")]);
    let lexer = Multistate::new(vec![outside, inside], Some("embedded"), LexerConfig::default())
        .unwrap();
    assert_eq!(lexer.initial_state(), "embedded");

    let source = Source::from("abc");
    let tokens = lexer.lex_all(&source, 0, None).unwrap();
    assert_eq!(
        summary(&tokens),
        vec![triple("BODY", 0, "abc"), triple("T_EOI", 3, "")]
    );
}

#[test]
fn unknown_input_in_a_state_follows_policy() {
    let source = Source::from("<%#%>");
    let err = template().lex_all(&source, 0, None).unwrap_err();
    assert!(matches!(err, LexError::Unrecognized(_)));

    let config = LexerConfig::default().with_on_unknown(OnUnknownToken::Skip);
    let outside = LexerState::with_rules("default", [("OPEN", "<%")]).transition("OPEN", "embedded");
    let inside = LexerState::with_rules("embedded", [("CLOSE", "%>")]).transition("CLOSE", "default");
    let lexer = Multistate::new(vec![outside, inside], None, config).unwrap();
    let tokens = lexer.lex_all(&source, 0, None).unwrap();
    assert_eq!(
        summary(&tokens),
        vec![
            triple("OPEN", 0, "<%"),
            triple("CLOSE", 3, "%>"),
            triple("T_EOI", 5, ""),
        ]
    );
}

#[test]
fn max_length_applies_to_every_state() {
    let source = Source::from("a<%xyz%>");
    let tokens = template().lex_all(&source, 0, Some(5)).unwrap();
    assert_eq!(
        summary(&tokens),
        vec![
            triple("TEXT", 0, "a"),
            triple("OPEN", 1, "<%"),
            triple("BODY", 3, "xy"),
            triple("T_EOI", 5, ""),
        ]
    );
}

#[test]
fn offset_beyond_max_length_ends_at_the_limit() {
    let source = Source::from("abc<%x%>");
    let tokens = template().lex_all(&source, 6, Some(2)).unwrap();
    assert_eq!(summary(&tokens), vec![triple("T_EOI", 2, "")]);
}

// === Endless Recursion ===

#[test]
fn zero_width_self_transition_is_detected() {
    let looping = LexerState::with_rules("default", [("LOOP", "")]).transition("LOOP", "default");
    let lexer = Multistate::new(vec![looping], None, LexerConfig::default()).unwrap();
    let source = Source::from("x");
    let mut stream = lexer.lex(&source, 0, None).unwrap();

    // The trigger token is yielded before the failure.
    let trigger = stream.next().unwrap().unwrap();
    assert_eq!((trigger.offset(), trigger.len()), (0, 0));

    match stream.next().unwrap() {
        Err(LexError::Transition(err)) => {
            assert_eq!(err.kind, TransitionErrorKind::EndlessRecursion);
            assert_eq!(&*err.state, "default");
            assert!(err
                .to_string()
                .starts_with("An unsolvable infinite lexer state transitions was found at #default"));
        }
        other => panic!("expected Transition, got {other:?}"),
    }
    assert!(stream.next().is_none());
}

#[test]
fn zero_width_ping_pong_is_detected() {
    let a = LexerState::with_rules("a", [("TO_B", "")]).transition("TO_B", "b");
    let b = LexerState::with_rules("b", [("TO_A", "")]).transition("TO_A", "a");
    let lexer = Multistate::new(vec![a, b], None, LexerConfig::default()).unwrap();
    let source = Source::from("x");
    let results: Vec<_> = lexer.lex(&source, 0, None).unwrap().collect();
    assert_eq!(results.len(), 3);
    match results.last().unwrap() {
        Err(LexError::Transition(err)) => {
            assert_eq!(err.kind, TransitionErrorKind::EndlessRecursion);
            assert_eq!(&*err.state, "a");
        }
        other => panic!("expected Transition, got {other:?}"),
    }
}

#[test]
fn reentering_a_state_at_a_new_offset_is_fine() {
    let source = Source::from("<%a%><%b%>");
    let tokens = template().lex_all(&source, 0, None).unwrap();
    assert_eq!(tokens.len(), 7);
}

// === Construction ===

#[test]
fn no_states() {
    assert_eq!(
        config_error(Multistate::new(Vec::new(), None, LexerConfig::default())),
        ConfigErrorKind::EmptyStates
    );
}

#[test]
fn no_transitions() {
    let state = LexerState::with_rules("default", [("N", r"\d+")]);
    assert_eq!(
        config_error(Multistate::new(vec![state], None, LexerConfig::default())),
        ConfigErrorKind::EmptyTransitions
    );
}

#[test]
fn duplicate_states() {
    let a = LexerState::with_rules("a", [("X", "x")]).transition("X", "a");
    let again = LexerState::with_rules("a", [("Y", "y")]);
    assert_eq!(
        config_error(Multistate::new(vec![a, again], None, LexerConfig::default())),
        ConfigErrorKind::DuplicateState
    );
}

#[test]
fn unknown_initial_state() {
    let a = LexerState::with_rules("a", [("X", "x")]).transition("X", "a");
    let err = Multistate::new(vec![a], Some("missing"), LexerConfig::default()).unwrap_err();
    assert_eq!(err.to_string(), "Unrecognized token state #missing");
}

#[test]
fn unknown_target_state() {
    let a = LexerState::with_rules("a", [("X", "x")]).transition("X", "nowhere");
    assert_eq!(
        config_error(Multistate::new(vec![a], None, LexerConfig::default())),
        ConfigErrorKind::UndefinedTargetState
    );
}

#[test]
fn invalid_state_tables() {
    let a = LexerState::with_rules("a", [("X", "x")])
        .transition("X", "a")
        .hide(["WS"]);
    assert_eq!(
        config_error(Multistate::new(vec![a], None, LexerConfig::default())),
        ConfigErrorKind::UndefinedRule
    );
}

#[test]
fn validation_compiles_every_state() {
    let a = LexerState::with_rules("a", [("X", "x")]).transition("X", "b");
    let b = LexerState::with_rules("b", [("BROKEN", "[")]);
    let config = LexerConfig::default().with_validation(true);
    let err = Multistate::new(vec![a, b], None, config).unwrap_err();
    assert!(matches!(err, LexError::Compilation(_)));
}

#[test]
fn precompiled_states() {
    let lexer = template();
    let states: Vec<_> = ["default", "embedded"]
        .into_iter()
        .map(|name| {
            let state = lexer.state(name).unwrap().clone();
            let matcher = Arc::new(
                crate::compiler::PatternCompiler::default()
                    .compile(state.rules())
                    .unwrap(),
            );
            (state, matcher)
        })
        .collect();
    let shared = Multistate::precompiled(states, None, LexerConfig::default()).unwrap();

    let source = Source::from("a<%x%>b");
    assert_eq!(
        shared.lex_all(&source, 0, None).unwrap(),
        lexer.lex_all(&source, 0, None).unwrap()
    );
}
