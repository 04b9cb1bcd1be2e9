//! Lexer configuration.
//!
//! [`CompileOptions`] controls how rule tables become a matcher;
//! [`LexerConfig`] adds the channel policies and the diagnostics printer.
//! Both are plain values with sensible defaults; lexers clone what they
//! need at construction and never observe later changes.

use std::sync::Arc;

use lexr_core::{PrettyPrinter, TokenPrinter};

use crate::aliases::DEFAULT_ALIAS_PREFIX;
use crate::handler::{OnEndOfInput, OnHiddenToken, OnUnknownToken, TokenHandler};

/// Options of the pattern compiler.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompileOptions {
    /// Compile eagerly at construction and run a trial match, so malformed
    /// rules fail the constructor instead of the first `lex()` call.
    pub validate: bool,
    /// Attach sub-group children to tokens whose rule has capture groups.
    pub composite: bool,
    /// `^` and `$` match at line boundaries.
    pub multi_line: bool,
    /// `.` matches `\n`.
    pub dot_matches_new_line: bool,
    pub case_insensitive: bool,
    /// Unicode-aware classes (`\w`, `\d`, `.`) in rule patterns.
    pub unicode: bool,
    /// Prefix of synthetic marker names.
    pub alias_prefix: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        CompileOptions {
            validate: cfg!(debug_assertions),
            composite: false,
            multi_line: true,
            dot_matches_new_line: true,
            case_insensitive: false,
            unicode: true,
            alias_prefix: DEFAULT_ALIAS_PREFIX.to_owned(),
        }
    }
}

/// Full lexer configuration.
#[derive(Clone, Debug)]
pub struct LexerConfig {
    pub compile: CompileOptions,
    /// Applied to `Hidden`-channel tokens. Default: drop.
    pub on_hidden: Arc<dyn TokenHandler>,
    /// Applied once per merged unknown run. Default: fail.
    pub on_unknown: Arc<dyn TokenHandler>,
    /// Applied to the end-of-input token. Default: keep.
    pub on_end_of_input: Arc<dyn TokenHandler>,
    /// Renders tokens inside error messages.
    pub printer: Arc<dyn TokenPrinter>,
}

impl Default for LexerConfig {
    fn default() -> Self {
        LexerConfig {
            compile: CompileOptions::default(),
            on_hidden: Arc::new(OnHiddenToken::default()),
            on_unknown: Arc::new(OnUnknownToken::default()),
            on_end_of_input: Arc::new(OnEndOfInput::default()),
            printer: Arc::new(PrettyPrinter::default()),
        }
    }
}

impl LexerConfig {
    #[must_use]
    pub fn with_compile_options(mut self, compile: CompileOptions) -> Self {
        self.compile = compile;
        self
    }

    #[must_use]
    pub fn with_on_hidden(mut self, handler: impl TokenHandler + 'static) -> Self {
        self.on_hidden = Arc::new(handler);
        self
    }

    #[must_use]
    pub fn with_on_unknown(mut self, handler: impl TokenHandler + 'static) -> Self {
        self.on_unknown = Arc::new(handler);
        self
    }

    #[must_use]
    pub fn with_on_end_of_input(mut self, handler: impl TokenHandler + 'static) -> Self {
        self.on_end_of_input = Arc::new(handler);
        self
    }

    #[must_use]
    pub fn with_printer(mut self, printer: impl TokenPrinter + 'static) -> Self {
        self.printer = Arc::new(printer);
        self
    }

    /// Shorthand for toggling composite-token assembly.
    #[must_use]
    pub fn with_composite(mut self, composite: bool) -> Self {
        self.compile.composite = composite;
        self
    }

    /// Shorthand for toggling eager validation.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.compile.validate = validate;
        self
    }
}
