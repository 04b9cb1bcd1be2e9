//! Channel and unknown-input policies.
//!
//! [`PolicyStream`] sits between the executor and the consumer:
//!
//! - consecutive `Unknown` tokens are merged into one token spanning the
//!   whole run, and the unknown policy is consulted once per run;
//! - `Hidden` tokens go through the hidden policy;
//! - every other token passes unchanged;
//! - when the raw tokens run out, an end-of-input token is synthesized at
//!   the end of the scanned region and given to the end-of-input policy.
//!
//! The stream is lazy: a policy error surfaces exactly when the offending
//! token would have been produced, and nothing is yielded after it.

use lexr_core::{Channel, RuleId, Source, Token};
use tracing::debug;

use crate::config::LexerConfig;
use crate::error::LexError;
use crate::handler::{HandlerContext, TokenHandler};

/// A pending run of unknown input: `(id, start, end)`.
type UnknownRun = (RuleId, usize, usize);

/// Applies a [`LexerConfig`]'s policies to a raw token sequence.
pub struct PolicyStream<'cfg, 'src, I> {
    raw: I,
    source: &'src Source,
    config: &'cfg LexerConfig,
    /// End of the last raw token seen.
    cursor: usize,
    run: Option<UnknownRun>,
    /// Token that ended an unknown run, replayed after the run is flushed.
    stashed: Option<Token<'src>>,
    end_of_input_done: bool,
    finished: bool,
}

impl<'cfg, 'src, I> PolicyStream<'cfg, 'src, I>
where
    I: Iterator<Item = Token<'src>>,
{
    /// Wrap `raw`, a contiguous token sequence starting at `start`.
    pub fn new(raw: I, source: &'src Source, config: &'cfg LexerConfig, start: usize) -> Self {
        PolicyStream {
            raw,
            source,
            config,
            cursor: start,
            run: None,
            stashed: None,
            end_of_input_done: false,
            finished: false,
        }
    }

    #[inline]
    pub fn source(&self) -> &'src Source {
        self.source
    }

    fn apply(
        &self,
        handler: &dyn TokenHandler,
        token: Token<'src>,
    ) -> Result<Option<Token<'src>>, LexError> {
        let cx = HandlerContext {
            source: self.source,
            printer: &*self.config.printer,
        };
        handler.handle(cx, token)
    }

    fn absorb(&mut self, token: &Token<'src>) {
        match &mut self.run {
            Some((_, _, end)) => *end = token.end(),
            None => self.run = Some((token.id().clone(), token.offset(), token.end())),
        }
    }

    /// Flush the pending unknown run as a single token.
    fn take_run(&mut self) -> Option<Token<'src>> {
        let (id, start, end) = self.run.take()?;
        debug!(offset = start, len = end - start, "unknown input");
        let bytes: &'src [u8] = &self.source.as_bytes()[start..end];
        Some(Token::new(id, Channel::Unknown, bytes, start))
    }
}

impl<'src, I> Iterator for PolicyStream<'_, 'src, I>
where
    I: Iterator<Item = Token<'src>>,
{
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.finished {
                return None;
            }

            let config = self.config;
            let result = match self.stashed.take().or_else(|| self.raw.next()) {
                Some(token) => {
                    self.cursor = self.cursor.max(token.end());
                    if token.channel().is_unknown() {
                        self.absorb(&token);
                        continue;
                    }
                    if let Some(run) = self.take_run() {
                        self.stashed = Some(token);
                        self.apply(&*config.on_unknown, run)
                    } else if token.channel().is_hidden() {
                        self.apply(&*config.on_hidden, token)
                    } else {
                        Ok(Some(token))
                    }
                }
                None => {
                    if let Some(run) = self.take_run() {
                        self.apply(&*config.on_unknown, run)
                    } else if self.end_of_input_done {
                        self.finished = true;
                        return None;
                    } else {
                        self.end_of_input_done = true;
                        self.apply(&*config.on_end_of_input, Token::end_of_input(self.cursor))
                    }
                }
            };

            match result {
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => {}
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
    }
}

impl<'src, I> std::iter::FusedIterator for PolicyStream<'_, 'src, I> where
    I: Iterator<Item = Token<'src>>
{
}

impl<I> std::fmt::Debug for PolicyStream<'_, '_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyStream")
            .field("source", &self.source.display_name())
            .field("cursor", &self.cursor)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
