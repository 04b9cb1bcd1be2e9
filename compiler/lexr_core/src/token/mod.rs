//! Lexer tokens.
//!
//! A [`Token`] is an immutable, classified slice of the source buffer. The
//! value borrows from the source whenever possible (`Cow::Borrowed`) and
//! can be detached with [`Token::into_owned`] when it has to outlive the
//! buffer, e.g. inside an error.
//!
//! # Composite Tokens
//!
//! When a rule's pattern contains capture groups, the engine may attach one
//! child token per non-empty sub-group. Children are keyed by their 0-based
//! group index and always lie inside the parent's byte range.

use std::borrow::Cow;
use std::ops::Range;

use crate::{Channel, RuleId};

/// A token produced by one `lex()` call.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Token<'src> {
    id: RuleId,
    channel: Channel,
    value: Cow<'src, [u8]>,
    offset: usize,
    /// `(group index, child)` pairs ordered by group index.
    children: Vec<(u32, Token<'src>)>,
}

impl<'src> Token<'src> {
    /// Create a plain (non-composite) token.
    pub fn new(
        id: RuleId,
        channel: Channel,
        value: impl Into<Cow<'src, [u8]>>,
        offset: usize,
    ) -> Self {
        Token {
            id,
            channel,
            value: value.into(),
            offset,
            children: Vec::new(),
        }
    }

    /// Create a composite token from its sub-group children.
    ///
    /// Children are sorted by group index; callers must only pass children
    /// whose ranges lie inside `offset..offset + value.len()`.
    pub fn composite(
        id: RuleId,
        channel: Channel,
        value: impl Into<Cow<'src, [u8]>>,
        offset: usize,
        mut children: Vec<(u32, Token<'src>)>,
    ) -> Self {
        children.sort_by_key(|(index, _)| *index);
        let token = Token {
            id,
            channel,
            value: value.into(),
            offset,
            children,
        };
        debug_assert!(token
            .children
            .iter()
            .all(|(_, child)| child.offset >= token.offset && child.end() <= token.end()));
        token
    }

    /// The synthesized end-of-input token at `offset`.
    pub fn end_of_input(offset: usize) -> Self {
        Token::new(
            RuleId::end_of_input(),
            Channel::EndOfInput,
            Cow::Borrowed(&[][..]),
            offset,
        )
    }

    /// Rule identifier that produced this token.
    #[inline]
    pub fn id(&self) -> &RuleId {
        &self.id
    }

    /// Rule name, for named rules.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        self.id.as_name()
    }

    #[inline]
    pub fn channel(&self) -> &Channel {
        &self.channel
    }

    /// Raw matched bytes.
    #[inline]
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Matched bytes decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.value)
    }

    /// Byte offset of the first byte of this token in the source.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Byte offset one past the last byte of this token.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.value.len()
    }

    /// Byte range of this token in the source.
    #[inline]
    pub fn span(&self) -> Range<usize> {
        self.offset..self.end()
    }

    /// Whether sub-group children are attached.
    #[inline]
    pub fn is_composite(&self) -> bool {
        !self.children.is_empty()
    }

    /// All `(group index, child)` pairs, ordered by group index.
    #[inline]
    pub fn children(&self) -> &[(u32, Token<'src>)] {
        &self.children
    }

    /// Child token for the 0-based sub-group `index`, if that group matched
    /// non-empty text.
    pub fn child(&self, index: u32) -> Option<&Token<'src>> {
        self.children
            .binary_search_by_key(&index, |(group, _)| *group)
            .ok()
            .map(|pos| &self.children[pos].1)
    }

    /// Detach from the source buffer.
    pub fn into_owned(self) -> Token<'static> {
        Token {
            id: self.id,
            channel: self.channel,
            value: Cow::Owned(self.value.into_owned()),
            offset: self.offset,
            children: self
                .children
                .into_iter()
                .map(|(index, child)| (index, child.into_owned()))
                .collect(),
        }
    }
}
