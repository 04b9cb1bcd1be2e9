//! Lexer error types.
//!
//! Four families, all unified under [`LexError`]:
//!
//! - [`CompilationError`]: a rule table that cannot be compiled (malformed
//!   pattern, empty or reserved rule name). Raised at construction in
//!   validation mode, otherwise on first use.
//! - [`StateConfigurationError`]: an inconsistent lexer configuration or
//!   invalid call arguments. Always raised before any scanning happens.
//! - [`UnrecognizedTokenError`]: an unknown input run, raised by the default
//!   unknown-token policy. Carries the whole merged run, not one byte.
//! - [`TransitionError`]: an invalid state reached at run time or an
//!   endless transition cycle. Carries the offending state and token.
//!
//! Every type is `Clone + Eq` so a cached compilation failure can be replayed
//! on each `lex()` call.

use std::sync::Arc;

use lexr_core::{Channel, RuleId, Source, Token, TokenPrinter};

/// Any failure surfaced by the engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error(transparent)]
    Compilation(#[from] CompilationError),
    #[error(transparent)]
    Configuration(#[from] StateConfigurationError),
    #[error(transparent)]
    Unrecognized(#[from] UnrecognizedTokenError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}

// === Compilation ===

/// A rule table that cannot be compiled into a matcher.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}{}", in_rule(.rule.as_ref()))]
pub struct CompilationError {
    /// The offending rule, when the failure can be attributed to one.
    pub rule: Option<RuleId>,
    pub message: String,
}

fn in_rule(rule: Option<&RuleId>) -> String {
    rule.map(|rule| format!(" in {rule} token definition"))
        .unwrap_or_default()
}

impl CompilationError {
    pub fn empty_name(pattern: &str) -> Self {
        CompilationError {
            rule: None,
            message: format!(
                "Token name defined by \"{}\" must not be empty",
                pattern.replace('"', "\\\"")
            ),
        }
    }

    pub fn reserved_name(rule: &RuleId) -> Self {
        CompilationError {
            rule: Some(rule.clone()),
            message: "Token name is reserved by the lexer".to_owned(),
        }
    }

    pub fn duplicate_rule(rule: &RuleId) -> Self {
        CompilationError {
            rule: Some(rule.clone()),
            message: "Token is defined more than once".to_owned(),
        }
    }

    pub fn invalid_pattern(rule: &RuleId, error: &regex_syntax::Error) -> Self {
        CompilationError {
            rule: Some(rule.clone()),
            message: capitalize(&error.to_string()),
        }
    }

    /// Failure to build a single rule's standalone scanner.
    pub fn rule_build(rule: &RuleId, message: impl std::fmt::Display) -> Self {
        CompilationError {
            rule: Some(rule.clone()),
            message: capitalize(&message.to_string()),
        }
    }

    /// A named group of `rule` reuses a name already taken by another
    /// rule's group or by a rule marker.
    pub fn group_name_clash(rule: &RuleId, name: &str) -> Self {
        CompilationError {
            rule: Some(rule.clone()),
            message: format!("Capture group name {name} is already in use"),
        }
    }

    /// Failure of the combined matcher that no single rule explains
    /// (size limits, internal inconsistencies).
    pub fn combined(message: impl std::fmt::Display) -> Self {
        CompilationError {
            rule: None,
            message: capitalize(&message.to_string()),
        }
    }

    /// Like [`CompilationError::combined`], keeping every cause of the
    /// build failure in the message.
    pub fn combined_build(error: &regex_automata::meta::BuildError) -> Self {
        let mut message = error.to_string();
        let mut cause = std::error::Error::source(error);
        while let Some(err) = cause {
            message.push_str(": ");
            message.push_str(&err.to_string());
            cause = err.source();
        }
        Self::combined(message)
    }
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// === Configuration ===

/// What kind of configuration problem was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigErrorKind {
    /// A multistate lexer was built without any state.
    EmptyStates,
    /// A multistate lexer was built without any transition.
    EmptyTransitions,
    /// Two states share a name.
    DuplicateState,
    /// The requested initial state does not exist.
    InvalidInitialState,
    /// A transition targets a state that does not exist.
    UndefinedTargetState,
    /// A hidden set, channel map or transition names an undefined rule.
    UndefinedRule,
    /// A rule was mapped onto the unknown or end-of-input channel.
    ReservedChannel,
    /// A precompiled matcher does not match the state's rule table.
    MatcherMismatch,
    /// `lex()` was called with an offset past the end of the source.
    InvalidOffset,
    /// `lex()` was called with a zero maximum length.
    InvalidMaxLength,
}

/// An inconsistent lexer configuration or invalid call arguments.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct StateConfigurationError {
    pub kind: ConfigErrorKind,
    pub detail: String,
}

impl StateConfigurationError {
    fn new(kind: ConfigErrorKind, detail: String) -> Self {
        StateConfigurationError { kind, detail }
    }

    pub fn empty_states() -> Self {
        Self::new(
            ConfigErrorKind::EmptyStates,
            "No state defined for the selected multistate lexer".to_owned(),
        )
    }

    pub fn empty_transitions() -> Self {
        Self::new(
            ConfigErrorKind::EmptyTransitions,
            "No state transition defined for the multistate lexer".to_owned(),
        )
    }

    pub fn duplicate_state(state: &str) -> Self {
        Self::new(
            ConfigErrorKind::DuplicateState,
            format!("State #{state} is defined more than once"),
        )
    }

    pub fn invalid_initial_state(state: &str) -> Self {
        Self::new(
            ConfigErrorKind::InvalidInitialState,
            format!("Unrecognized token state #{state}"),
        )
    }

    pub fn undefined_target_state(state: &str, rule: &RuleId, target: &str) -> Self {
        Self::new(
            ConfigErrorKind::UndefinedTargetState,
            format!("Token {rule} of state #{state} transitions to undefined state #{target}"),
        )
    }

    /// `role` names the table that referenced the rule (`hidden`, `channel`,
    /// `transition`).
    pub fn undefined_rule(state: &str, rule: &RuleId, role: &str) -> Self {
        Self::new(
            ConfigErrorKind::UndefinedRule,
            format!("The {role} token {rule} is not defined in state #{state}"),
        )
    }

    pub fn reserved_channel(state: &str, rule: &RuleId, channel: &Channel) -> Self {
        Self::new(
            ConfigErrorKind::ReservedChannel,
            format!("Token {rule} of state #{state} cannot be assigned to the reserved {channel} channel"),
        )
    }

    pub fn matcher_mismatch(state: &str) -> Self {
        Self::new(
            ConfigErrorKind::MatcherMismatch,
            format!("The precompiled matcher of state #{state} was built from different rules"),
        )
    }

    pub fn invalid_offset(offset: usize, len: usize) -> Self {
        Self::new(
            ConfigErrorKind::InvalidOffset,
            format!("Offset {offset} is out of bounds of a {len} byte source"),
        )
    }

    pub fn invalid_max_length() -> Self {
        Self::new(
            ConfigErrorKind::InvalidMaxLength,
            "Maximum length must be greater than zero".to_owned(),
        )
    }
}

// === Lexical ===

/// An unknown input run rejected by the unknown-token policy.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Syntax error, unrecognized {rendered} in {source_name}:{line}:{column}")]
pub struct UnrecognizedTokenError {
    /// The merged unknown run.
    pub token: Token<'static>,
    pub source_name: String,
    pub line: usize,
    pub column: usize,
    /// The token as rendered by the configured printer.
    pub rendered: String,
}

impl UnrecognizedTokenError {
    pub fn from_token(source: &Source, token: &Token<'_>, printer: &dyn TokenPrinter) -> Self {
        let (line, column) = source.line_col(token.offset());
        UnrecognizedTokenError {
            token: token.clone().into_owned(),
            source_name: source.display_name().to_owned(),
            line,
            column,
            rendered: printer.print(token),
        }
    }
}

// === Control Flow ===

/// What went wrong while switching states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TransitionErrorKind {
    /// The target state does not exist.
    InvalidState,
    /// The target state would be re-entered at the offset it was last
    /// entered at, so lexing would never advance.
    EndlessRecursion,
}

/// A fatal state-machine failure at run time.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransitionError {
    pub kind: TransitionErrorKind,
    /// The state the lexer tried to enter.
    pub state: Arc<str>,
    /// The token that triggered the transition, if any.
    pub token: Option<Token<'static>>,
    pub source_name: String,
    pub message: String,
}

impl TransitionError {
    pub fn invalid_state(
        source: &Source,
        state: Arc<str>,
        token: Option<&Token<'_>>,
        printer: &dyn TokenPrinter,
    ) -> Self {
        let mut message = format!("Cannot change lexer state to #{state} because this state is invalid");
        if let Some(token) = token {
            message.push_str(&after_token(source, token, printer));
        }
        TransitionError {
            kind: TransitionErrorKind::InvalidState,
            state,
            token: token.map(|token| token.clone().into_owned()),
            source_name: source.display_name().to_owned(),
            message,
        }
    }

    pub fn endless_recursion(
        source: &Source,
        state: Arc<str>,
        token: &Token<'_>,
        printer: &dyn TokenPrinter,
    ) -> Self {
        let message = format!(
            "An unsolvable infinite lexer state transitions was found at #{state}{}",
            after_token(source, token, printer)
        );
        TransitionError {
            kind: TransitionErrorKind::EndlessRecursion,
            state,
            token: Some(token.clone().into_owned()),
            source_name: source.display_name().to_owned(),
            message,
        }
    }
}

fn after_token(source: &Source, token: &Token<'_>, printer: &dyn TokenPrinter) -> String {
    let (line, column) = source.line_col(token.offset());
    format!(
        " after {} in {}:{line}:{column}",
        printer.print(token),
        source.display_name()
    )
}
