//! Rule tables and lexer states.
//!
//! A [`LexerState`] is everything one state of the lexer knows: its ordered
//! rules, which of them are hidden, which go to custom channels, and which
//! ones switch to another state. States are immutable once handed to a
//! lexer.

use std::sync::Arc;

use lexr_core::{Channel, RuleId};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::StateConfigurationError;

/// Name of the state used by single-state lexers.
pub const DEFAULT_STATE: &str = "default";

/// One rule of a state.
///
/// `ordinal` is the declaration position. When several rules match at the
/// same offset, the smallest ordinal wins regardless of match length.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenDefinition {
    pub id: RuleId,
    pub pattern: String,
    pub ordinal: u32,
}

/// A named lexer configuration: rules plus channel and transition tables.
#[derive(Clone, Debug)]
pub struct LexerState {
    name: Arc<str>,
    rules: Vec<TokenDefinition>,
    hidden: FxHashSet<RuleId>,
    channels: FxHashMap<RuleId, Channel>,
    transitions: FxHashMap<RuleId, Arc<str>>,
}

impl LexerState {
    /// Create an empty state.
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        LexerState {
            name: name.into(),
            rules: Vec::new(),
            hidden: FxHashSet::default(),
            channels: FxHashMap::default(),
            transitions: FxHashMap::default(),
        }
    }

    /// Create a state from an ordered `(id, pattern)` table.
    pub fn with_rules<I, R, P>(name: impl Into<Arc<str>>, rules: I) -> Self
    where
        I: IntoIterator<Item = (R, P)>,
        R: Into<RuleId>,
        P: Into<String>,
    {
        rules
            .into_iter()
            .fold(Self::new(name), |state, (id, pattern)| state.rule(id, pattern))
    }

    /// Append a rule with the next ordinal.
    #[must_use]
    pub fn rule(mut self, id: impl Into<RuleId>, pattern: impl Into<String>) -> Self {
        let ordinal = u32::try_from(self.rules.len()).unwrap_or(u32::MAX);
        self.rules.push(TokenDefinition {
            id: id.into(),
            pattern: pattern.into(),
            ordinal,
        });
        self
    }

    /// Mark rules as hidden.
    #[must_use]
    pub fn hide<I, R>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RuleId>,
    {
        self.hidden.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Route a rule's tokens to a channel other than `Default`.
    #[must_use]
    pub fn channel(mut self, id: impl Into<RuleId>, channel: Channel) -> Self {
        self.channels.insert(id.into(), channel);
        self
    }

    /// Switch to `target` after a token of rule `id`.
    #[must_use]
    pub fn transition(mut self, id: impl Into<RuleId>, target: impl Into<Arc<str>>) -> Self {
        self.transitions.insert(id.into(), target.into());
        self
    }

    #[inline]
    pub fn name(&self) -> &Arc<str> {
        &self.name
    }

    #[inline]
    pub fn rules(&self) -> &[TokenDefinition] {
        &self.rules
    }

    pub fn is_hidden(&self, id: &RuleId) -> bool {
        self.hidden.contains(id)
    }

    /// Channel of tokens produced by rule `id`.
    ///
    /// The hidden set wins over the channel map.
    pub fn classify(&self, id: &RuleId) -> Channel {
        if self.hidden.contains(id) {
            return Channel::Hidden;
        }
        self.channels.get(id).cloned().unwrap_or_default()
    }

    /// Target state after a token of rule `id`, if any.
    #[inline]
    pub fn next_state(&self, id: &RuleId) -> Option<&Arc<str>> {
        self.transitions.get(id)
    }

    pub fn transitions(&self) -> impl Iterator<Item = (&RuleId, &Arc<str>)> {
        self.transitions.iter()
    }

    pub fn has_transitions(&self) -> bool {
        !self.transitions.is_empty()
    }

    /// Check that every table only references declared rules.
    ///
    /// Transition targets are checked by the multistate lexer, which knows
    /// the other states.
    pub fn validate(&self) -> Result<(), StateConfigurationError> {
        let declared: FxHashSet<&RuleId> = self.rules.iter().map(|rule| &rule.id).collect();
        let undefined = |role: &str, id: &RuleId| {
            if declared.contains(id) {
                Ok(())
            } else {
                Err(StateConfigurationError::undefined_rule(&self.name, id, role))
            }
        };

        for id in sorted(self.hidden.iter()) {
            undefined("hidden", id)?;
        }
        for id in sorted(self.channels.keys()) {
            undefined("channel", id)?;
            let channel = &self.channels[id];
            if channel.is_unknown() || channel.is_end_of_input() {
                return Err(StateConfigurationError::reserved_channel(
                    &self.name, id, channel,
                ));
            }
        }
        for id in sorted(self.transitions.keys()) {
            undefined("transition", id)?;
        }
        Ok(())
    }
}

/// Deterministic iteration order for error reporting.
fn sorted<'a>(ids: impl Iterator<Item = &'a RuleId>) -> Vec<&'a RuleId> {
    let mut ids: Vec<_> = ids.collect();
    ids.sort();
    ids
}
