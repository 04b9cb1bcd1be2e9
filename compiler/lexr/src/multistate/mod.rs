//! Multi-state lexer.
//!
//! Several [`LexerState`]s, each with its own rules, plus per-state
//! transition tables: after a token whose rule has a transition, lexing
//! restarts in the target state right after that token. Any buffered
//! output of the old state is discarded.
//!
//! A per-call ledger records the offset at which each state was last
//! entered. Entering a state again at that same offset would repeat the
//! exact same scan forever, so it is reported as
//! [`TransitionErrorKind::EndlessRecursion`](crate::error::TransitionErrorKind)
//! instead.

use std::sync::Arc;

use lexr_core::{Source, Token};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::compiler::CompiledMatcher;
use crate::config::LexerConfig;
use crate::error::{LexError, StateConfigurationError, TransitionError};
use crate::executor::Executor;
use crate::lexer::{check_bounds, check_matcher, scan_start, TokenStream};
use crate::policy::PolicyStream;
use crate::state::LexerState;

/// A lexer that switches between rule tables.
#[derive(Debug)]
pub struct Multistate {
    states: Vec<Executor>,
    index: FxHashMap<Arc<str>, usize>,
    initial: Arc<str>,
    config: LexerConfig,
}

impl Multistate {
    /// Build a multi-state lexer.
    ///
    /// `initial` defaults to the first state.
    ///
    /// # Errors
    ///
    /// Fails when there are no states, no transitions at all, duplicate
    /// state names, an unknown initial or target state, a state whose
    /// tables reference undeclared rules, or (with validation on) a rule
    /// table that does not compile.
    #[tracing::instrument(level = "debug", skip_all, fields(states = states.len()))]
    pub fn new(
        states: Vec<LexerState>,
        initial: Option<&str>,
        config: LexerConfig,
    ) -> Result<Self, LexError> {
        let executors = states
            .into_iter()
            .map(|state| Executor::new(state, config.compile.clone()))
            .collect();
        let lexer = Self::assemble(executors, initial, config)?;
        if lexer.config.compile.validate {
            for executor in &lexer.states {
                executor.validate()?;
            }
        }
        Ok(lexer)
    }

    /// Build a multi-state lexer from states with matchers compiled earlier.
    pub fn precompiled(
        states: Vec<(LexerState, Arc<CompiledMatcher>)>,
        initial: Option<&str>,
        config: LexerConfig,
    ) -> Result<Self, LexError> {
        let executors = states
            .into_iter()
            .map(|(state, matcher)| {
                check_matcher(&state, &matcher)?;
                Ok(Executor::with_matcher(state, config.compile.clone(), matcher))
            })
            .collect::<Result<Vec<_>, StateConfigurationError>>()?;
        Ok(Self::assemble(executors, initial, config)?)
    }

    fn assemble(
        states: Vec<Executor>,
        initial: Option<&str>,
        config: LexerConfig,
    ) -> Result<Self, StateConfigurationError> {
        if states.is_empty() {
            return Err(StateConfigurationError::empty_states());
        }
        if !states.iter().any(|executor| executor.state().has_transitions()) {
            return Err(StateConfigurationError::empty_transitions());
        }

        let mut index = FxHashMap::default();
        for (position, executor) in states.iter().enumerate() {
            let name = executor.state().name();
            if index.insert(Arc::clone(name), position).is_some() {
                return Err(StateConfigurationError::duplicate_state(name));
            }
        }

        for executor in &states {
            let state = executor.state();
            state.validate()?;
            let mut transitions: Vec<_> = state.transitions().collect();
            transitions.sort();
            for (rule, target) in transitions {
                if !index.contains_key(target) {
                    return Err(StateConfigurationError::undefined_target_state(
                        state.name(),
                        rule,
                        target,
                    ));
                }
            }
        }

        let initial = match initial {
            Some(name) => index
                .get_key_value(name)
                .map(|(name, _)| Arc::clone(name))
                .ok_or_else(|| StateConfigurationError::invalid_initial_state(name))?,
            None => Arc::clone(states[0].state().name()),
        };

        Ok(Multistate {
            states,
            index,
            initial,
            config,
        })
    }

    #[inline]
    pub fn initial_state(&self) -> &str {
        &self.initial
    }

    pub fn state(&self, name: &str) -> Option<&LexerState> {
        self.index
            .get(name)
            .map(|&position| self.states[position].state())
    }

    #[inline]
    pub fn config(&self) -> &LexerConfig {
        &self.config
    }

    /// Tokenize `source` from `offset`, starting in the initial state.
    ///
    /// Arguments are checked as in [`crate::Lexer::lex`].
    pub fn lex<'lx, 'src>(
        &'lx self,
        source: &'src Source,
        offset: usize,
        max_length: Option<usize>,
    ) -> Result<MultistateStream<'lx, 'src>, LexError> {
        check_bounds(source, offset, max_length)?;
        Ok(MultistateStream {
            lexer: self,
            source,
            max_length,
            ledger: FxHashMap::default(),
            state: Arc::clone(&self.initial),
            offset,
            current: None,
            pending: None,
            finished: false,
        })
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

/// Lazy token stream produced by [`Multistate::lex`].
pub struct MultistateStream<'lx, 'src> {
    lexer: &'lx Multistate,
    source: &'src Source,
    max_length: Option<usize>,
    /// Offset at which each state was last entered during this call.
    ledger: FxHashMap<Arc<str>, usize>,
    state: Arc<str>,
    offset: usize,
    /// Policy stream of the active state, with that state's position.
    current: Option<(usize, TokenStream<'lx, 'src>)>,
    /// Error to report after the token that caused it.
    pending: Option<LexError>,
    finished: bool,
}

impl<'src> MultistateStream<'_, 'src> {
    /// Name of the active state.
    pub fn current_state(&self) -> &str {
        &self.state
    }

    fn enter(&mut self) -> Result<(), LexError> {
        let printer = &*self.lexer.config.printer;
        let Some(&position) = self.lexer.index.get(&self.state) else {
            let state = Arc::clone(&self.state);
            return Err(TransitionError::invalid_state(self.source, state, None, printer).into());
        };
        self.ledger.insert(Arc::clone(&self.state), self.offset);

        let executor = &self.lexer.states[position];
        let raw = executor.run(self.source, self.offset, self.max_length)?;
        let stream = PolicyStream::new(
            raw.into_iter(),
            self.source,
            &self.lexer.config,
            scan_start(self.offset, self.max_length),
        );
        self.current = Some((position, stream));
        Ok(())
    }

    /// Decide what follows `token`: a state switch, an error to report
    /// next, or nothing.
    fn follow(&mut self, position: usize, token: &Token<'src>) {
        let Some(target) = self.lexer.states[position].state().next_state(token.id()) else {
            return;
        };
        let printer = &*self.lexer.config.printer;
        let resume = token.end();

        if !self.lexer.index.contains_key(target) {
            let err = TransitionError::invalid_state(
                self.source,
                Arc::clone(target),
                Some(token),
                printer,
            );
            self.pending = Some(err.into());
            return;
        }
        if self.ledger.get(target) == Some(&resume) {
            let err =
                TransitionError::endless_recursion(self.source, Arc::clone(target), token, printer);
            self.pending = Some(err.into());
            return;
        }

        debug!(from = %self.state, to = %target, offset = resume, "state transition");
        self.state = Arc::clone(target);
        self.offset = resume;
        self.current = None;
    }
}

impl<'src> Iterator for MultistateStream<'_, 'src> {
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if let Some(err) = self.pending.take() {
            self.finished = true;
            return Some(Err(err));
        }

        if self.current.is_none() {
            if let Err(err) = self.enter() {
                self.finished = true;
                return Some(Err(err));
            }
        }
        let (position, stream) = self.current.as_mut()?;
        let position = *position;

        match stream.next() {
            None => {
                self.finished = true;
                None
            }
            Some(Err(err)) => {
                self.finished = true;
                Some(Err(err))
            }
            Some(Ok(token)) => {
                if token.channel().is_end_of_input() {
                    self.finished = true;
                } else {
                    self.follow(position, &token);
                }
                Some(Ok(token))
            }
        }
    }
}

impl std::iter::FusedIterator for MultistateStream<'_, '_> {}

impl std::fmt::Debug for MultistateStream<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultistateStream")
            .field("state", &self.state)
            .field("offset", &self.offset)
            .field("ledger", &self.ledger)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
