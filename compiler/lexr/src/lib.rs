//! Regex-driven lexer engine.
//!
//! Rules are `(identifier, pattern)` pairs tried in declaration order. The
//! engine compiles a rule table into one anchored matcher and turns a byte
//! buffer into a stream of classified [`Token`]s.
//!
//! # Architecture
//!
//! ```text
//! rules ──► PatternCompiler ──► CompiledMatcher
//!                                     │
//! Source ──► Executor (raw tokens) ──► PolicyStream (merge unknown,
//!                                     │   hidden / EOI policies)
//!                                     ▼
//!                         Lexer / Multistate streams ──► stages
//! ```
//!
//! - [`compiler`]: rule table to combined matcher, marker aliasing
//! - [`executor`]: anchored scan producing contiguous raw tokens
//! - [`policy`]: unknown-run merging and channel policies
//! - [`Lexer`]: single-state facade
//! - [`Multistate`]: state transitions with endless-loop detection
//! - [`stages`]: extra handlers applied on top of any token stream
//!
//! # Tracing
//!
//! The engine logs through `tracing`: compilation at `debug`, every match
//! at `trace`. Call [`init_tracing`] and set `RUST_LOG=lexr=debug` (or
//! `trace`) to see it.

use std::sync::Once;

pub mod aliases;
pub mod compiler;
mod config;
pub mod error;
pub mod executor;
pub mod handler;
mod lexer;
mod multistate;
pub mod policy;
pub mod stages;
pub mod state;

pub use compiler::{CompiledMatcher, PatternCompiler};
pub use config::{CompileOptions, LexerConfig};
pub use error::{
    CompilationError, ConfigErrorKind, LexError, StateConfigurationError, TransitionError,
    TransitionErrorKind, UnrecognizedTokenError,
};
pub use handler::{
    ExcludeFilter, HandlerContext, IncludeFilter, OnEndOfInput, OnHiddenToken, OnUnknownToken,
    Passthrough, SkipAll, TokenHandler,
};
pub use lexer::{Lexer, TokenStream};
pub use lexr_core::{Channel, PrettyPrinter, RuleId, Source, Token, TokenPrinter};
pub use multistate::{Multistate, MultistateStream};
pub use stages::{Through, TokenStreamExt};
pub use state::{LexerState, TokenDefinition, DEFAULT_STATE};

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing when `RUST_LOG` is unset or invalid, or when the process
/// already has a global subscriber. Safe to call from every test.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_default_env() else {
            return;
        };
        let installed = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_test_writer())
            .with(filter)
            .try_init();
        if installed.is_ok() {
            tracing::debug!("tracing initialized");
        }
    });
}
