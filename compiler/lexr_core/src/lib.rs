//! Core value types for the lexr engine.
//!
//! This crate holds everything a token consumer needs without depending on
//! the regex machinery in `lexr`:
//!
//! - [`RuleId`]: the caller's identifier for a rule (name or integer)
//! - [`Channel`]: the role of a token (default, hidden, unknown, end of input, custom)
//! - [`Token`]: an immutable classified slice of the source, optionally composite
//! - [`Source`]: the byte buffer being lexed plus a display name
//! - [`TokenPrinter`] / [`PrettyPrinter`]: human-readable token rendering for diagnostics
//!
//! Offsets and lengths are always byte positions, never character counts, so
//! excerpting the source by a token's range is always correct.

mod channel;
mod printer;
mod rule_id;
mod source;
mod token;

pub use channel::Channel;
pub use printer::{PrettyPrinter, TokenPrinter};
pub use rule_id::RuleId;
pub use source::Source;
pub use token::Token;
