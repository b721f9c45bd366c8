//! `chameleon_compiler`: compiles a Greibach Normal Form grammar into a
//! self-contained C module that generates, mutates, and (optionally) parses
//! byte strings belonging to the grammar's language.
//!
//! The pipeline is four stages, one module each:
//!
//! 1. [`grammar`] — the validated in-memory grammar IR (`Grammar`).
//! 2. [`normalize`] — checks Greibach Normal Form and produces the
//!    emission-ready IR (`NormalizedGrammar`), plus non-fatal diagnostics.
//! 3. [`translator`] — the normalized IR's types (`Symbol`, `RuleSet`,
//!    `StepType`, ...), consumed directly by the emitter's templates.
//! 4. [`emit`] — renders a `NormalizedGrammar` to a C header/source pair.
//!
//! [`config`] loads a grammar from the on-disk JSON description format; a
//! grammar built programmatically via [`grammar::GrammarBuilder`] skips it
//! entirely.

pub mod config;
pub mod emit;
pub mod error;
pub mod grammar;
pub mod normalize;
pub mod translator;

pub use config::{load_grammar_file, LoadError};
pub use emit::{CodeEmitter, EmitOptions, EmittedModule};
pub use error::{GrammarError, GrammarWarning};
pub use grammar::{Grammar, GrammarBuilder};
pub use normalize::normalize;
pub use translator::NormalizedGrammar;
