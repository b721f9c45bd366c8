//! Grammar description file format: the on-disk JSON shape `chameleonc` reads,
//! and its conversion into a validated [`crate::grammar::Grammar`].
//!
//! Modeled as a thin serde layer over [`crate::grammar::GrammarBuilder`] rather
//! than a second parallel representation: every field here maps onto exactly
//! one builder call, so there is nowhere for the two to drift apart.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::GrammarError;
use crate::grammar::{Grammar, GrammarBuilder, NonTermId, NumberRange, Symbol, Width};

/// Top-level shape of a grammar description file (see spec.md §6 for the
/// wire contract this mirrors).
#[derive(Debug, Deserialize)]
pub struct GrammarFile {
    /// Name of the entry non-terminal.
    pub entry: String,
    /// Terminal byte blobs, referenced by index from `number_sets` is not
    /// applicable — terminals are referenced from `rules` by index into this
    /// list.
    #[serde(default)]
    pub terminals: Vec<TerminalSpec>,
    /// Number sets, referenced from `rules` by index into this list.
    #[serde(default)]
    pub number_sets: Vec<NumberSetSpec>,
    /// Non-terminals, in declaration order. `entry` must name one of these.
    pub non_terminals: Vec<NonTerminalSpec>,
}

/// A terminal byte blob, given either as a UTF-8 string or raw bytes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum TerminalSpec {
    /// `"a"` — interpreted as its UTF-8 bytes.
    Text(String),
    /// `[97]` — raw byte values.
    Bytes(Vec<u8>),
}

impl TerminalSpec {
    fn into_bytes(self) -> Vec<u8> {
        match self {
            TerminalSpec::Text(s) => s.into_bytes(),
            TerminalSpec::Bytes(b) => b,
        }
    }
}

/// A number set: a width class and one or more inclusive ranges.
#[derive(Debug, Deserialize)]
pub struct NumberSetSpec {
    /// `1`, `2`, `4`, or `8` bytes.
    pub width: u32,
    /// Inclusive `[start, end]` ranges, tried in order when more than one is
    /// given.
    pub ranges: Vec<RangeSpec>,
}

/// One inclusive range within a [`NumberSetSpec`].
#[derive(Debug, Deserialize)]
pub struct RangeSpec {
    /// Inclusive lower bound.
    pub start: u64,
    /// Inclusive upper bound.
    pub end: u64,
}

/// One non-terminal: a name and its production rules.
#[derive(Debug, Deserialize)]
pub struct NonTerminalSpec {
    /// Name used for diagnostics, emitted comments, and as the `entry` value.
    pub name: String,
    /// Rules, tried in this order at dispatch time.
    pub rules: Vec<Vec<SymbolSpec>>,
}

/// One symbol on the right-hand side of a rule.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SymbolSpec {
    /// Index into the file's `terminals` list.
    Terminal {
        /// Index into `terminals`.
        id: usize,
    },
    /// Index into the file's `number_sets` list.
    NumberSet {
        /// Index into `number_sets`.
        id: usize,
    },
    /// Name of another (or the same) non-terminal.
    NonTerminal {
        /// Name of the referenced non-terminal.
        name: String,
    },
}

/// Error produced while loading or converting a grammar description file.
#[derive(Debug)]
pub enum LoadError {
    /// Reading the file from disk failed.
    Io(std::io::Error),
    /// The file's contents were not valid JSON for this schema.
    Json(serde_json::Error),
    /// A number set declared a width other than 1, 2, 4, or 8.
    InvalidWidth {
        /// The offending width value.
        width: u32,
    },
    /// A number set range had `start > end`.
    InvalidRange {
        /// The offending lower bound.
        start: u64,
        /// The offending upper bound.
        end: u64,
    },
    /// A rule referenced a non-terminal name that was never declared.
    UnknownNonTerminalName {
        /// The dangling name.
        name: String,
    },
    /// `entry` named a non-terminal that was never declared.
    UnknownEntry {
        /// The dangling entry name.
        name: String,
    },
    /// Cross-reference validation failed once the grammar was assembled.
    Grammar(GrammarError),
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadError::Io(e) => write!(f, "failed to read grammar file: {}", e),
            LoadError::Json(e) => write!(f, "failed to parse grammar file: {}", e),
            LoadError::InvalidWidth { width } => {
                write!(f, "number set has invalid width {} (expected 1, 2, 4, or 8)", width)
            }
            LoadError::InvalidRange { start, end } => {
                write!(f, "number set range [{}, {}] has start > end", start, end)
            }
            LoadError::UnknownNonTerminalName { name } => {
                write!(f, "rule references undeclared non-terminal `{}`", name)
            }
            LoadError::UnknownEntry { name } => {
                write!(f, "entry `{}` is not a declared non-terminal", name)
            }
            LoadError::Grammar(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for LoadError {}

impl From<GrammarError> for LoadError {
    fn from(e: GrammarError) -> Self {
        LoadError::Grammar(e)
    }
}

fn width_from_bytes(width: u32) -> Result<Width, LoadError> {
    match width {
        1 => Ok(Width::One),
        2 => Ok(Width::Two),
        4 => Ok(Width::Four),
        8 => Ok(Width::Eight),
        other => Err(LoadError::InvalidWidth { width: other }),
    }
}

/// Load and validate a grammar description file from disk.
pub fn load_grammar_file(path: impl AsRef<Path>) -> Result<Grammar, LoadError> {
    let text = fs::read_to_string(path).map_err(LoadError::Io)?;
    let file: GrammarFile = serde_json::from_str(&text).map_err(LoadError::Json)?;
    build_grammar(file)
}

/// Convert an already-parsed [`GrammarFile`] into a validated [`Grammar`].
/// Split out from [`load_grammar_file`] so tests can exercise the conversion
/// without touching the filesystem.
pub fn build_grammar(file: GrammarFile) -> Result<Grammar, LoadError> {
    let mut builder = GrammarBuilder::new();

    let mut name_to_id: std::collections::HashMap<String, NonTermId> = std::collections::HashMap::new();
    for nt in &file.non_terminals {
        let id = builder.non_terminal(&nt.name);
        name_to_id.insert(nt.name.clone(), id);
    }

    for terminal in file.terminals {
        builder.terminal(terminal.into_bytes());
    }

    for set in file.number_sets {
        let width = width_from_bytes(set.width)?;
        let ranges = set
            .ranges
            .iter()
            .map(|r| {
                NumberRange::try_new(r.start, r.end).ok_or(LoadError::InvalidRange {
                    start: r.start,
                    end: r.end,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        builder.number_set(ranges, width);
    }

    for nt in &file.non_terminals {
        let id = name_to_id[&nt.name];
        for rule in &nt.rules {
            let mut symbols = Vec::with_capacity(rule.len());
            for symbol in rule {
                symbols.push(match symbol {
                    SymbolSpec::Terminal { id } => Symbol::Terminal(*id as u32),
                    SymbolSpec::NumberSet { id } => Symbol::NumberSet(*id as u32),
                    SymbolSpec::NonTerminal { name } => {
                        let target = name_to_id
                            .get(name)
                            .copied()
                            .ok_or_else(|| LoadError::UnknownNonTerminalName { name: name.clone() })?;
                        Symbol::NonTerminal(target)
                    }
                });
            }
            builder.add_rule(id, symbols);
        }
    }

    let entry = name_to_id
        .get(&file.entry)
        .copied()
        .ok_or_else(|| LoadError::UnknownEntry { name: file.entry.clone() })?;

    Ok(builder.build(entry)?)
}
