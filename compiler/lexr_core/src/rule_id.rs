//! Rule identifiers.

use std::fmt;
use std::sync::Arc;

/// Identifier of a lexer rule, as supplied by the caller.
///
/// Rules are keyed either by a name (`"T_NUMBER"`) or by an integer
/// (`42`). Integer identifiers are never valid dispatch markers, so the
/// pattern compiler always aliases them.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuleId {
    /// A named rule.
    Name(Arc<str>),
    /// An integer-keyed rule (also used for composite sub-group children).
    Index(u32),
}

impl RuleId {
    /// Reserved name of the catch-all rule that consumes unrecognized input.
    pub const UNKNOWN_NAME: &'static str = "T_UNKNOWN";

    /// Reserved name of the synthesized end-of-input token.
    pub const END_OF_INPUT_NAME: &'static str = "T_EOI";

    /// Create a named identifier.
    pub fn name(name: impl Into<Arc<str>>) -> Self {
        RuleId::Name(name.into())
    }

    /// Identifier of unknown-input tokens.
    pub fn unknown() -> Self {
        RuleId::Name(Arc::from(Self::UNKNOWN_NAME))
    }

    /// Identifier of the end-of-input token.
    pub fn end_of_input() -> Self {
        RuleId::Name(Arc::from(Self::END_OF_INPUT_NAME))
    }

    /// The name, if this is a named identifier.
    #[inline]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            RuleId::Name(name) => Some(name),
            RuleId::Index(_) => None,
        }
    }

    /// Whether this identifier is one of the engine's reserved names.
    pub fn is_reserved(&self) -> bool {
        matches!(
            self.as_name(),
            Some(Self::UNKNOWN_NAME | Self::END_OF_INPUT_NAME)
        )
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleId::Name(name) => f.write_str(name),
            RuleId::Index(index) => write!(f, "#{index}"),
        }
    }
}

impl From<&str> for RuleId {
    fn from(name: &str) -> Self {
        RuleId::Name(Arc::from(name))
    }
}

impl From<String> for RuleId {
    fn from(name: String) -> Self {
        RuleId::Name(Arc::from(name))
    }
}

impl From<Arc<str>> for RuleId {
    fn from(name: Arc<str>) -> Self {
        RuleId::Name(name)
    }
}

impl From<u32> for RuleId {
    fn from(index: u32) -> Self {
        RuleId::Index(index)
    }
}
