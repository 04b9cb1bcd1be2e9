//! End-to-end lexing scenarios.
//!
//! Each test drives the public API the way a parser front end would:
//! build a lexer, lex a source, inspect the emitted tokens or the error.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use lexr::{
    Channel, IncludeFilter, LexError, Lexer, LexerConfig, LexerState, Multistate,
    OnUnknownToken, RuleId, Source, Token, TokenStreamExt, TransitionErrorKind,
};

/// `(rule, offset, len, text)` for compact assertions.
fn summary(tokens: &[Token<'_>]) -> Vec<(String, usize, usize, String)> {
    lexr::init_tracing();
    tokens
        .iter()
        .map(|t| (t.id().to_string(), t.offset(), t.len(), t.text().into_owned()))
        .collect()
}

fn tok(rule: &str, offset: usize, len: usize, text: &str) -> (String, usize, usize, String) {
    (rule.to_owned(), offset, len, text.to_owned())
}

// =============================================================================
// Single State
// =============================================================================

mod single_state {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn hidden_whitespace_between_numbers() {
        let lexer = Lexer::new([("WS", r"\s+"), ("NUM", r"\d+")], ["WS"]).unwrap();
        let source = Source::from("23 42");
        let tokens = lexer.lex_all(&source, 0, None).unwrap();
        assert_eq!(
            summary(&tokens),
            vec![
                tok("NUM", 0, 2, "23"),
                tok("NUM", 3, 2, "42"),
                tok("T_EOI", 5, 0, ""),
            ]
        );
    }

    #[test]
    fn priority_beats_length() {
        let lexer = Lexer::new([("A", "a"), ("B", "ab")], ["A"; 0]).unwrap();
        let source = Source::from("ab");
        let mut stream = lexer.lex(&source, 0, None).unwrap();

        let first = stream.next().unwrap().unwrap();
        assert_eq!(first.id(), &RuleId::from("A"));
        assert_eq!(first.value(), b"a");
        assert_eq!(first.channel(), &Channel::Default);

        match stream.next().unwrap() {
            Err(LexError::Unrecognized(err)) => {
                assert_eq!(err.token.value(), b"b");
                assert_eq!(err.token.offset(), 1);
            }
            other => panic!("expected Unrecognized, got {other:?}"),
        }
    }

    #[test]
    fn unknown_run_is_one_token() {
        let config = LexerConfig::default().with_on_unknown(OnUnknownToken::Return);
        let lexer = Lexer::with_config([("WORD", "[a-z]+")], ["WORD"; 0], config).unwrap();
        let source = Source::from("#$xyz");
        let tokens = lexer.lex_all(&source, 0, None).unwrap();
        assert_eq!(
            summary(&tokens),
            vec![
                tok("T_UNKNOWN", 0, 2, "#$"),
                tok("WORD", 2, 3, "xyz"),
                tok("T_EOI", 5, 0, ""),
            ]
        );
        assert!(tokens[0].channel().is_unknown());
    }

    #[test]
    fn skipped_unknown_input() {
        let config = LexerConfig::default().with_on_unknown(OnUnknownToken::Skip);
        let lexer = Lexer::with_config([("L", "[a-z]")], ["L"; 0], config).unwrap();
        let source = Source::from("a#b");
        let tokens = lexer.lex_all(&source, 0, None).unwrap();
        assert_eq!(
            summary(&tokens),
            vec![tok("L", 0, 1, "a"), tok("L", 2, 1, "b"), tok("T_EOI", 3, 0, "")]
        );
    }

    #[test]
    fn composite_range() {
        let config = LexerConfig::default().with_composite(true);
        let lexer = Lexer::with_config([("RANGE", r"(\d+)-(\d+)")], ["RANGE"; 0], config).unwrap();
        let source = Source::from("12-34");
        let tokens = lexer.lex_all(&source, 0, None).unwrap();

        let range = &tokens[0];
        assert_eq!(range.span(), 0..5);
        assert!(range.is_composite());
        let children: Vec<_> = range
            .children()
            .iter()
            .map(|(index, child)| (*index, child.offset(), child.len(), child.text().into_owned()))
            .collect();
        assert_eq!(
            children,
            vec![(0, 0, 2, "12".to_owned()), (1, 3, 2, "34".to_owned())]
        );
    }

    #[test]
    fn unknown_error_reports_position() {
        let lexer = Lexer::new([("WORD", "[a-z]+"), ("NL", "\n")], ["NL"]).unwrap();
        let source = Source::named("words.txt", "abc\nde ?!");
        let err = lexer.lex_all(&source, 0, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Syntax error, unrecognized \" ?!\" (unknown) in words.txt:2:3"
        );
    }

    #[test]
    fn non_ascii_input_keeps_byte_offsets() {
        let lexer = Lexer::new([("WORD", r"\w+"), ("WS", " ")], ["WS"]).unwrap();
        let source = Source::from("héllo wörld");
        let tokens = lexer.lex_all(&source, 0, None).unwrap();
        assert_eq!(
            summary(&tokens),
            vec![
                tok("WORD", 0, 6, "héllo"),
                tok("WORD", 7, 6, "wörld"),
                tok("T_EOI", 13, 0, ""),
            ]
        );
    }

    #[test]
    fn pipeline_stage_filters_tokens() {
        let lexer = Lexer::new([("NUM", r"\d+"), ("OP", r"[+*]"), ("WS", " ")], ["WS"]).unwrap();
        let source = Source::from("1 + 2 * 3");
        let only_numbers = IncludeFilter::new(["NUM"]);
        let values: Vec<_> = lexer
            .lex(&source, 0, None)
            .unwrap()
            .through(&only_numbers, lexer.context(&source))
            .map(|token| token.unwrap().text().into_owned())
            .collect();
        assert_eq!(values, vec!["1", "2", "3"]);
    }

    #[test]
    fn lexer_is_shareable_across_threads() {
        let lexer = Lexer::new([("NUM", r"\d+"), ("WS", r"\s+")], ["WS"]).unwrap();
        std::thread::scope(|scope| {
            for input in ["1 2", "3 4 5"] {
                let lexer = &lexer;
                scope.spawn(move || {
                    let source = Source::from(input);
                    let tokens = lexer.lex_all(&source, 0, None).unwrap();
                    assert_eq!(tokens.last().unwrap(), &Token::end_of_input(input.len()));
                });
            }
        });
    }
}

// =============================================================================
// Multiple States
// =============================================================================

mod multi_state {
    use super::*;
    use pretty_assertions::assert_eq;

    fn template() -> Multistate {
        let outside = LexerState::with_rules("default", [("OPEN", "<%")]).transition("OPEN", "embedded");
        let inside = LexerState::with_rules("embedded", [("BODY", "[a-z]+"), ("CLOSE", "%>")])
            .transition("CLOSE", "default");
        Multistate::new(vec![outside, inside], None, LexerConfig::default()).unwrap()
    }

    #[test]
    fn embedded_section() {
        let source = Source::from("<%x%>");
        let tokens = template().lex_all(&source, 0, None).unwrap();
        assert_eq!(
            summary(&tokens),
            vec![
                tok("OPEN", 0, 2, "<%"),
                tok("BODY", 2, 1, "x"),
                tok("CLOSE", 3, 2, "%>"),
                tok("T_EOI", 5, 0, ""),
            ]
        );
    }

    #[test]
    fn endless_transition_is_an_error() {
        let state = LexerState::with_rules("default", [("NOTHING", ""), ("X", "x")])
            .transition("NOTHING", "default");
        let lexer = Multistate::new(vec![state], None, LexerConfig::default()).unwrap();
        let source = Source::from("x");
        let err = lexer.lex_all(&source, 0, None).unwrap_err();
        match err {
            LexError::Transition(err) => {
                assert_eq!(err.kind, TransitionErrorKind::EndlessRecursion);
                assert_eq!(err.token.unwrap().offset(), 0);
            }
            other => panic!("expected Transition, got {other:?}"),
        }
    }
}
