//! Composable post-processing stages.
//!
//! Any fallible token stream can be run through further [`TokenHandler`]s,
//! e.g. to filter by rule or to rewrite tokens before a parser sees them.
//! Errors from upstream pass through untouched; a stage's own error ends
//! the stream.

use lexr_core::Token;

use crate::error::LexError;
use crate::handler::{HandlerContext, TokenHandler};

/// Adapter returned by [`TokenStreamExt::through`].
#[derive(Debug)]
pub struct Through<'h, I> {
    inner: I,
    handler: &'h dyn TokenHandler,
    cx: HandlerContext<'h>,
    finished: bool,
}

impl<'h, 'src, I> Iterator for Through<'h, I>
where
    I: Iterator<Item = Result<Token<'src>, LexError>>,
{
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            let token = match self.inner.next()? {
                Ok(token) => token,
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            };
            match self.handler.handle(self.cx, token) {
                Ok(Some(token)) => return Some(Ok(token)),
                Ok(None) => {}
                Err(err) => {
                    self.finished = true;
                    return Some(Err(err));
                }
            }
        }
        None
    }
}

/// Extension methods for token streams.
pub trait TokenStreamExt<'src>: Iterator<Item = Result<Token<'src>, LexError>> + Sized {
    /// Apply `handler` to every token of the stream.
    fn through<'h>(
        self,
        handler: &'h dyn TokenHandler,
        cx: HandlerContext<'h>,
    ) -> Through<'h, Self> {
        Through {
            inner: self,
            handler,
            cx,
            finished: false,
        }
    }
}

impl<'src, I> TokenStreamExt<'src> for I where
    I: Iterator<Item = Result<Token<'src>, LexError>>
{
}
