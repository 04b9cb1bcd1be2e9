//! Single-state lexer.
//!
//! [`Lexer`] bundles one [`LexerState`] with a [`LexerConfig`]: the rules
//! are compiled once (eagerly when validation is on, otherwise on the first
//! `lex()` call) and every call scans the buffer and runs the tokens through
//! the channel policies.

use std::sync::Arc;
use std::vec;

use lexr_core::{RuleId, Source, Token};

use crate::compiler::CompiledMatcher;
use crate::config::LexerConfig;
use crate::error::{LexError, StateConfigurationError};
use crate::executor::Executor;
use crate::handler::HandlerContext;
use crate::policy::PolicyStream;
use crate::state::{LexerState, DEFAULT_STATE};

/// Lazy token stream produced by [`Lexer::lex`].
pub type TokenStream<'lx, 'src> = PolicyStream<'lx, 'src, vec::IntoIter<Token<'src>>>;

/// A lexer with a single rule table.
#[derive(Debug)]
pub struct Lexer {
    executor: Executor,
    config: LexerConfig,
}

impl Lexer {
    /// Build a lexer from an ordered rule table and a list of hidden rules,
    /// with the default configuration.
    ///
    /// ```
    /// use lexr::{Lexer, Source};
    ///
    /// let lexer = Lexer::new([("T_NUMBER", r"\d+"), ("T_WS", r"\s+")], ["T_WS"]).unwrap();
    /// let source = Source::from("23 42");
    /// let names: Vec<_> = lexer
    ///     .lex(&source, 0, None)
    ///     .unwrap()
    ///     .map(|token| token.unwrap().id().to_string())
    ///     .collect();
    /// assert_eq!(names, ["T_NUMBER", "T_NUMBER", "T_EOI"]);
    /// ```
    pub fn new<I, R, P, H, HR>(rules: I, hidden: H) -> Result<Self, LexError>
    where
        I: IntoIterator<Item = (R, P)>,
        R: Into<RuleId>,
        P: Into<String>,
        H: IntoIterator<Item = HR>,
        HR: Into<RuleId>,
    {
        Self::with_config(rules, hidden, LexerConfig::default())
    }

    /// Like [`Lexer::new`], with an explicit configuration.
    pub fn with_config<I, R, P, H, HR>(
        rules: I,
        hidden: H,
        config: LexerConfig,
    ) -> Result<Self, LexError>
    where
        I: IntoIterator<Item = (R, P)>,
        R: Into<RuleId>,
        P: Into<String>,
        H: IntoIterator<Item = HR>,
        HR: Into<RuleId>,
    {
        let state = LexerState::with_rules(DEFAULT_STATE, rules).hide(hidden);
        Self::from_state(state, config)
    }

    /// Build a lexer from a fully configured state (custom channels, etc.).
    pub fn from_state(state: LexerState, config: LexerConfig) -> Result<Self, LexError> {
        state.validate()?;
        let executor = Executor::new(state, config.compile.clone());
        if config.compile.validate {
            executor.validate()?;
        }
        Ok(Lexer { executor, config })
    }

    /// Build a lexer around a matcher compiled earlier from the same rules.
    pub fn precompiled(
        state: LexerState,
        matcher: Arc<CompiledMatcher>,
        config: LexerConfig,
    ) -> Result<Self, LexError> {
        state.validate()?;
        check_matcher(&state, &matcher)?;
        let executor = Executor::with_matcher(state, config.compile.clone(), matcher);
        Ok(Lexer { executor, config })
    }

    #[inline]
    pub fn state(&self) -> &LexerState {
        self.executor.state()
    }

    #[inline]
    pub fn config(&self) -> &LexerConfig {
        &self.config
    }

    /// The compiled matcher, compiling it if needed. Can be shared with
    /// other lexers through [`Lexer::precompiled`].
    pub fn matcher(&self) -> Result<Arc<CompiledMatcher>, LexError> {
        Ok(Arc::clone(self.executor.matcher()?))
    }

    /// Handler context for stages applied on top of this lexer's streams.
    pub fn context<'a>(&'a self, source: &'a Source) -> HandlerContext<'a> {
        HandlerContext {
            source,
            printer: &*self.config.printer,
        }
    }

    /// Tokenize `source` starting at `offset`.
    ///
    /// `max_length` limits the scan to the first `max_length` bytes of the
    /// buffer (not bytes after `offset`). Tokens are produced lazily, and
    /// the last one is the end-of-input token unless its policy drops it.
    ///
    /// # Errors
    ///
    /// Fails up front on an out-of-range `offset`, a zero `max_length`, or
    /// a rule table that does not compile. Policy errors are reported
    /// through the stream.
    pub fn lex<'lx, 'src>(
        &'lx self,
        source: &'src Source,
        offset: usize,
        max_length: Option<usize>,
    ) -> Result<TokenStream<'lx, 'src>, LexError> {
        check_bounds(source, offset, max_length)?;
        let raw = self.executor.run(source, offset, max_length)?;
        let start = scan_start(offset, max_length);
        Ok(PolicyStream::new(raw.into_iter(), source, &self.config, start))
    }

    /// Tokenize eagerly, stopping at the first error.
    pub fn lex_all<'src>(
        &self,
        source: &'src Source,
        offset: usize,
        max_length: Option<usize>,
    ) -> Result<Vec<Token<'src>>, LexError> {
        self.lex(source, offset, max_length)?.collect()
    }
}

/// Reject arguments no scan can satisfy.
pub(crate) fn check_bounds(
    source: &Source,
    offset: usize,
    max_length: Option<usize>,
) -> Result<(), StateConfigurationError> {
    if offset > source.len() {
        return Err(StateConfigurationError::invalid_offset(offset, source.len()));
    }
    if max_length == Some(0) {
        return Err(StateConfigurationError::invalid_max_length());
    }
    Ok(())
}

/// Where the scanned region starts: `offset`, or the end of the truncated
/// buffer when `max_length` cuts it off before `offset`.
pub(crate) fn scan_start(offset: usize, max_length: Option<usize>) -> usize {
    max_length.map_or(offset, |max| offset.min(max))
}

/// A precompiled matcher must come from the same ordered rule table.
pub(crate) fn check_matcher(
    state: &LexerState,
    matcher: &CompiledMatcher,
) -> Result<(), StateConfigurationError> {
    let same = matcher.rule_count() == state.rules().len()
        && matcher
            .rule_ids()
            .zip(state.rules())
            .all(|(id, rule)| *id == rule.id);
    if same {
        Ok(())
    } else {
        Err(StateConfigurationError::matcher_mismatch(state.name()))
    }
}
