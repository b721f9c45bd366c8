//! Error and warning types produced by grammar construction and normalization.
//!
//! There is no source-file location to attach to these errors (the grammar
//! arrives as an already-parsed object, see spec §6), so each variant below
//! carries the non-terminal name it was discovered in as a plain `String`
//! field rather than through a separate location wrapper.

use std::fmt::{self, Display};

/// Fatal errors discovered while validating a [`crate::grammar::Grammar`] or
/// while normalizing it to Greibach Normal Form. The compiler refuses to emit
/// when any of these occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// A rule referenced a terminal id with no corresponding declaration.
    UnknownTerminal {
        /// The dangling id.
        id: u32,
        /// Name of the non-terminal the offending rule belongs to.
        context: String,
    },
    /// A rule referenced a number-set id with no corresponding declaration.
    UnknownNumberSet {
        /// The dangling id.
        id: u32,
        /// Name of the non-terminal the offending rule belongs to.
        context: String,
    },
    /// A rule referenced a non-terminal id with no corresponding declaration.
    UnknownNonTerminal {
        /// The dangling id.
        id: u32,
        /// Name of the non-terminal the offending rule belongs to, or a
        /// description of the reference site (e.g. the grammar entry point).
        context: String,
    },
    /// A number set was declared with no ranges at all.
    ZeroWidthNumberSet {
        /// Id of the offending number set.
        id: u32,
    },
    /// A rule did not begin with a terminal or number set, violating Greibach
    /// Normal Form.
    NotInGnf {
        /// Non-terminal the offending rule belongs to.
        non_terminal: String,
        /// Index of the offending rule within that non-terminal's rule list.
        rule_index: usize,
    },
    /// A non-terminal was declared with no rules at all. Every non-terminal
    /// must have at least one production (possibly empty) to be a legal
    /// dispatch target.
    NoRules {
        /// Name of the offending non-terminal.
        non_terminal: String,
    },
    /// A rule consists of a single terminal whose byte blob is empty. This
    /// would be indistinguishable from the dedicated "no symbols at all"
    /// encoding the emitter uses for truly empty rules, so it is rejected
    /// rather than silently folded into that case.
    EmptyTerminalBlob {
        /// Id of the offending terminal.
        id: u32,
        /// Non-terminal the offending rule belongs to.
        non_terminal: String,
    },
}

impl Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownTerminal { id, context } => {
                write!(f, "unknown terminal id {} referenced in `{}`", id, context)
            }
            Self::UnknownNumberSet { id, context } => {
                write!(f, "unknown number-set id {} referenced in `{}`", id, context)
            }
            Self::UnknownNonTerminal { id, context } => {
                write!(f, "unknown non-terminal id {} referenced in `{}`", id, context)
            }
            Self::ZeroWidthNumberSet { id } => {
                write!(f, "number set {} has no ranges and cannot be drawn from", id)
            }
            Self::NoRules { non_terminal } => {
                write!(f, "non-terminal `{}` has no rules at all", non_terminal)
            }
            Self::NotInGnf {
                non_terminal,
                rule_index,
            } => write!(
                f,
                "rule {} of `{}` does not begin with a terminal or number set (not in GNF)",
                rule_index, non_terminal
            ),
            Self::EmptyTerminalBlob { id, non_terminal } => write!(
                f,
                "terminal {} referenced alone in `{}` has an empty byte blob",
                id, non_terminal
            ),
        }
    }
}

impl std::error::Error for GrammarError {}

/// Non-fatal diagnostics discovered while normalizing a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarWarning {
    /// A non-terminal is never referenced from the entry point's derivation
    /// tree. It is still emitted (so cross-references remain valid), but it
    /// can never be reached by `generate`.
    UnreachableNonTerminal {
        /// Name of the unreachable non-terminal.
        name: String,
    },
}

impl Display for GrammarWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnreachableNonTerminal { name } => {
                write!(f, "non-terminal `{}` is unreachable from the entry point", name)
            }
        }
    }
}
