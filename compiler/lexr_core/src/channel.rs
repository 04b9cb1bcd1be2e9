//! Token channels.

use std::fmt;
use std::sync::Arc;

/// Role of a token in the output stream.
///
/// `Hidden` tokens are structurally valid but dropped by default;
/// `Unknown` marks input no rule recognized; `EndOfInput` is the single
/// terminal marker of a stream.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Channel {
    #[default]
    Default,
    Hidden,
    Unknown,
    EndOfInput,
    /// A caller-defined channel (e.g. `"comments"`, `"doc"`).
    Custom(Arc<str>),
}

impl Channel {
    /// Create a custom channel.
    pub fn custom(name: impl Into<Arc<str>>) -> Self {
        Channel::Custom(name.into())
    }

    /// Channel name as used in diagnostics.
    pub fn as_str(&self) -> &str {
        match self {
            Channel::Default => "default",
            Channel::Hidden => "hidden",
            Channel::Unknown => "unknown",
            Channel::EndOfInput => "eoi",
            Channel::Custom(name) => name,
        }
    }

    #[inline]
    pub fn is_unknown(&self) -> bool {
        matches!(self, Channel::Unknown)
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        matches!(self, Channel::Hidden)
    }

    #[inline]
    pub fn is_end_of_input(&self) -> bool {
        matches!(self, Channel::EndOfInput)
    }

    /// Whether this is one of the built-in channels (not `Custom`).
    #[inline]
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Channel::Custom(_))
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
