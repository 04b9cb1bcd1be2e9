//! Single-state executor.
//!
//! Drives the compiled matcher over a buffer: one anchored match per
//! position, each match becomes a raw token, the cursor advances by the
//! match length. No policies are applied here; unknown input shows up as
//! one-byte `Unknown`-channel tokens and hidden rules as `Hidden` tokens.
//!
//! The matcher is compiled on first use and cached, including a failed
//! compilation, so every later call reports the same error.

use std::sync::{Arc, OnceLock};

use lexr_core::{Channel, RuleId, Source, Token};
use tracing::trace;

use crate::compiler::{CompiledMatcher, Fired, PatternCompiler, RawMatch};
use crate::config::CompileOptions;
use crate::error::{CompilationError, LexError};
use crate::state::LexerState;

/// Runs one [`LexerState`] over a buffer.
#[derive(Debug)]
pub struct Executor {
    state: LexerState,
    options: CompileOptions,
    matcher: OnceLock<Result<Arc<CompiledMatcher>, CompilationError>>,
}

impl Executor {
    pub fn new(state: LexerState, options: CompileOptions) -> Self {
        Executor {
            state,
            options,
            matcher: OnceLock::new(),
        }
    }

    /// Executor over an already compiled matcher.
    ///
    /// The caller guarantees `matcher` was compiled from `state`'s rules.
    pub fn with_matcher(
        state: LexerState,
        options: CompileOptions,
        matcher: Arc<CompiledMatcher>,
    ) -> Self {
        Executor {
            state,
            options,
            matcher: OnceLock::from(Ok(matcher)),
        }
    }

    #[inline]
    pub fn state(&self) -> &LexerState {
        &self.state
    }

    #[inline]
    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// The compiled matcher, compiling it on first use.
    pub fn matcher(&self) -> Result<&Arc<CompiledMatcher>, CompilationError> {
        self.matcher
            .get_or_init(|| {
                PatternCompiler::new(self.options.clone())
                    .compile(self.state.rules())
                    .map(Arc::new)
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// Compile now and trial-run the matcher.
    pub fn validate(&self) -> Result<(), CompilationError> {
        self.matcher()?.validate()
    }

    /// Scan `source` from `offset`, looking at most at the first
    /// `max_length` bytes of the buffer.
    ///
    /// The returned tokens are contiguous: each starts where the previous
    /// one ended, the first at `offset`.
    #[tracing::instrument(level = "debug", skip(self, source), fields(state = %self.state.name()))]
    pub fn run<'src>(
        &self,
        source: &'src Source,
        offset: usize,
        max_length: Option<usize>,
    ) -> Result<Vec<Token<'src>>, LexError> {
        let matcher = self.matcher()?;
        let bytes = source.as_bytes();
        let end = max_length.map_or(bytes.len(), |max| max.min(bytes.len()));
        let haystack = &bytes[..end];
        let composite = self.options.composite;

        let mut caps = matcher.create_captures();
        let mut tokens = Vec::new();
        let mut cursor = offset;
        let mut after_empty = false;

        while cursor < end {
            let found = if after_empty {
                matcher.match_non_empty_at(haystack, cursor, composite)?
            } else {
                matcher.match_at(haystack, cursor, &mut caps, composite)
            };
            let Some(found) = found else {
                break;
            };

            let token = self.make_token(matcher, haystack, found);
            trace!(rule = %token.id(), offset = token.offset(), len = token.len(), "match");
            after_empty = token.is_empty();
            cursor = token.end();
            tokens.push(token);
        }

        Ok(tokens)
    }

    fn make_token<'src>(
        &self,
        matcher: &CompiledMatcher,
        haystack: &'src [u8],
        found: RawMatch,
    ) -> Token<'src> {
        let RawMatch {
            fired,
            span,
            groups,
        } = found;
        let (id, channel) = match fired {
            Fired::Unknown => (matcher.unknown_id().clone(), Channel::Unknown),
            Fired::Rule(index) => {
                let id = matcher.rule_id(index).clone();
                let channel = self.state.classify(&id);
                (id, channel)
            }
        };

        let value = &haystack[span.clone()];
        if groups.is_empty() {
            return Token::new(id, channel, value, span.start);
        }

        // Children are located by the first occurrence of their text inside
        // the parent, not by the group's own position.
        let children = groups
            .into_iter()
            .filter(|(_, _, range)| !range.is_empty())
            .map(|(index, name, range)| {
                let text = &haystack[range.clone()];
                let relative =
                    memchr::memmem::find(value, text).unwrap_or(range.start - span.start);
                let child_id = name.map_or(RuleId::Index(index), RuleId::Name);
                (
                    index,
                    Token::new(child_id, channel.clone(), text, span.start + relative),
                )
            })
            .collect();
        Token::composite(id, channel, value, span.start, children)
    }
}
