//! Token handlers.
//!
//! A handler decides what happens to one token: keep it (possibly
//! replaced), drop it, or fail. The policy layer calls one handler per
//! channel (hidden, unknown, end of input); pipeline stages
//! ([`crate::TokenStreamExt::through`]) apply arbitrary handlers to a whole
//! stream.

use std::fmt;

use lexr_core::{RuleId, Source, Token, TokenPrinter};
use rustc_hash::FxHashSet;

use crate::error::{LexError, UnrecognizedTokenError};

/// What a handler can see besides the token itself.
#[derive(Clone, Copy)]
pub struct HandlerContext<'a> {
    pub source: &'a Source,
    pub printer: &'a dyn TokenPrinter,
}

impl fmt::Debug for HandlerContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("source", &self.source.display_name())
            .finish_non_exhaustive()
    }
}

/// Decides the fate of a token.
///
/// `Ok(Some(token))` keeps a token, `Ok(None)` drops it, `Err` aborts the
/// stream.
pub trait TokenHandler: Send + Sync + fmt::Debug {
    fn handle<'src>(
        &self,
        cx: HandlerContext<'_>,
        token: Token<'src>,
    ) -> Result<Option<Token<'src>>, LexError>;
}

// === Channel Policies ===

/// Policy for hidden-channel tokens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnHiddenToken {
    #[default]
    Skip,
    Return,
}

impl TokenHandler for OnHiddenToken {
    fn handle<'src>(
        &self,
        _cx: HandlerContext<'_>,
        token: Token<'src>,
    ) -> Result<Option<Token<'src>>, LexError> {
        Ok(match self {
            OnHiddenToken::Skip => None,
            OnHiddenToken::Return => Some(token),
        })
    }
}

/// Policy for merged unknown runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnUnknownToken {
    /// Fail with [`UnrecognizedTokenError`].
    #[default]
    Throw,
    /// Keep the run as an `Unknown`-channel token (error-tolerant consumers).
    Return,
    /// Drop the run.
    Skip,
}

impl TokenHandler for OnUnknownToken {
    fn handle<'src>(
        &self,
        cx: HandlerContext<'_>,
        token: Token<'src>,
    ) -> Result<Option<Token<'src>>, LexError> {
        match self {
            OnUnknownToken::Throw => {
                Err(UnrecognizedTokenError::from_token(cx.source, &token, cx.printer).into())
            }
            OnUnknownToken::Return => Ok(Some(token)),
            OnUnknownToken::Skip => Ok(None),
        }
    }
}

/// Policy for the synthesized end-of-input token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OnEndOfInput {
    #[default]
    Return,
    Skip,
}

impl TokenHandler for OnEndOfInput {
    fn handle<'src>(
        &self,
        _cx: HandlerContext<'_>,
        token: Token<'src>,
    ) -> Result<Option<Token<'src>>, LexError> {
        Ok(match self {
            OnEndOfInput::Return => Some(token),
            OnEndOfInput::Skip => None,
        })
    }
}

// === General Handlers ===

/// Keeps every token.
#[derive(Clone, Copy, Debug, Default)]
pub struct Passthrough;

impl TokenHandler for Passthrough {
    fn handle<'src>(
        &self,
        _cx: HandlerContext<'_>,
        token: Token<'src>,
    ) -> Result<Option<Token<'src>>, LexError> {
        Ok(Some(token))
    }
}

/// Drops every token.
#[derive(Clone, Copy, Debug, Default)]
pub struct SkipAll;

impl TokenHandler for SkipAll {
    fn handle<'src>(
        &self,
        _cx: HandlerContext<'_>,
        _token: Token<'src>,
    ) -> Result<Option<Token<'src>>, LexError> {
        Ok(None)
    }
}

/// Keeps only tokens produced by the listed rules.
#[derive(Clone, Debug, Default)]
pub struct IncludeFilter {
    allowed: FxHashSet<RuleId>,
}

impl IncludeFilter {
    pub fn new<I, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RuleId>,
    {
        IncludeFilter {
            allowed: rules.into_iter().map(Into::into).collect(),
        }
    }
}

impl TokenHandler for IncludeFilter {
    fn handle<'src>(
        &self,
        _cx: HandlerContext<'_>,
        token: Token<'src>,
    ) -> Result<Option<Token<'src>>, LexError> {
        Ok(self.allowed.contains(token.id()).then_some(token))
    }
}

/// Drops tokens produced by the listed rules.
#[derive(Clone, Debug, Default)]
pub struct ExcludeFilter {
    excluded: FxHashSet<RuleId>,
}

impl ExcludeFilter {
    pub fn new<I, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RuleId>,
    {
        ExcludeFilter {
            excluded: rules.into_iter().map(Into::into).collect(),
        }
    }
}

impl TokenHandler for ExcludeFilter {
    fn handle<'src>(
        &self,
        _cx: HandlerContext<'_>,
        token: Token<'src>,
    ) -> Result<Option<Token<'src>>, LexError> {
        Ok((!self.excluded.contains(token.id())).then_some(token))
    }
}
