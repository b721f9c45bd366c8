//! In-memory representation of a context-free grammar in (or close to) Greibach
//! Normal Form, plus validation of the references between its parts.
//!
//! Modeled after a context-free grammar representation: terminals, non-terminals
//! and productions are declared up front and cross-checked by a fallible
//! constructor. Unlike a textbook CFG, symbol order inside a rule and rule order
//! inside a non-terminal are both significant here (the compiler must emit
//! deterministic, first-rule-wins dispatch), so rules are kept in `Vec`s rather
//! than hash sets.

use std::collections::HashMap;
use std::fmt;

use crate::error::GrammarError;

/// Identifier of a non-terminal. Dense and stable once a [`Grammar`] is built.
pub type NonTermId = u32;
/// Identifier of a terminal byte-literal.
pub type TerminalId = u32;
/// Identifier of a number set.
pub type NumberSetId = u32;

/// Width class of a number set, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Width {
    /// 1 byte (`uint8_t`)
    One,
    /// 2 bytes (`uint16_t`)
    Two,
    /// 4 bytes (`uint32_t`)
    Four,
    /// 8 bytes (`uint64_t`)
    Eight,
}

impl Width {
    /// The C type used to store a value of this width in emitted code.
    pub fn c_type(self) -> &'static str {
        match self {
            Width::One => "uint8_t",
            Width::Two => "uint16_t",
            Width::Four => "uint32_t",
            Width::Eight => "uint64_t",
        }
    }
}

/// An inclusive range of integers a number set may draw from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberRange {
    start: u64,
    end: u64,
}

impl NumberRange {
    /// Construct an inclusive range from a caller that has already checked
    /// `start <= end` (e.g. a grammar built programmatically in-process).
    /// Panics otherwise — use [`Self::try_new`] when the bounds come from an
    /// untrusted source such as a grammar description file.
    pub fn new(start: u64, end: u64) -> Self {
        Self::try_new(start, end).expect("number range must not be empty")
    }

    /// Construct an inclusive range, rejecting `start > end` instead of
    /// panicking. This is the constructor to use at a system boundary (spec
    /// §6/§7) where the bounds are deserialized from an external grammar
    /// description file rather than built up in-process.
    pub fn try_new(start: u64, end: u64) -> Option<Self> {
        if start <= end {
            Some(Self { start, end })
        } else {
            None
        }
    }

    /// Inclusive lower bound.
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Inclusive upper bound.
    pub fn end(&self) -> u64 {
        self.end
    }
}

/// A terminal that emits an integer drawn from a union of inclusive ranges, at
/// a fixed byte width, in native byte order.
#[derive(Debug, Clone)]
pub struct NumberSet {
    ranges: Vec<NumberRange>,
    width: Width,
}

impl NumberSet {
    /// Construct a number set from a non-empty list of ranges and a width class.
    pub fn new(ranges: Vec<NumberRange>, width: Width) -> Self {
        Self { ranges, width }
    }

    /// The ranges this set draws from, in declaration order.
    pub fn ranges(&self) -> &[NumberRange] {
        &self.ranges
    }

    /// The width class of this set.
    pub fn width(&self) -> Width {
        self.width
    }
}

/// One symbol in the right-hand side of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A byte-literal terminal, identified by id.
    Terminal(TerminalId),
    /// A number-set terminal, identified by id.
    NumberSet(NumberSetId),
    /// A reference to another (or the same) non-terminal.
    NonTerminal(NonTermId),
}

impl Symbol {
    /// True for [`Symbol::Terminal`] and [`Symbol::NumberSet`].
    pub fn is_terminal_like(self) -> bool {
        !matches!(self, Symbol::NonTerminal(_))
    }
}

/// One production rule: an ordered sequence of symbols. An empty rule produces
/// no bytes.
pub type Rule = Vec<Symbol>;

/// All production rules belonging to a single non-terminal, plus its name.
#[derive(Debug, Clone)]
pub struct NonTerminalDef {
    name: String,
    rules: Vec<Rule>,
}

impl NonTerminalDef {
    /// Declare a non-terminal with its rules, in the order they should be
    /// tried during dispatch.
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// The non-terminal's name, used for diagnostics and emitted comments.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rules, in declaration order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }
}

/// A validated, cross-referenced context-free grammar.
///
/// Construction (`Grammar::new`) checks that every symbol referenced by a rule
/// resolves to a declared terminal, number set, or non-terminal, and that the
/// designated entry non-terminal exists. It does *not* check Greibach Normal
/// Form or reachability — that is the [`crate::normalize`] stage's job, since
/// those are properties of the grammar as a whole rather than of individual
/// references.
#[derive(Debug, Clone)]
pub struct Grammar {
    entry: NonTermId,
    non_terminals: Vec<NonTerminalDef>,
    terminals: Vec<Vec<u8>>,
    number_sets: Vec<NumberSet>,
}

impl Grammar {
    /// Validate and construct a grammar from its parts. Non-terminal ids index
    /// `non_terminals`, terminal ids index `terminals`, number-set ids index
    /// `number_sets`.
    pub fn new(
        entry: NonTermId,
        non_terminals: Vec<NonTerminalDef>,
        terminals: Vec<Vec<u8>>,
        number_sets: Vec<NumberSet>,
    ) -> Result<Self, GrammarError> {
        if entry as usize >= non_terminals.len() {
            return Err(GrammarError::UnknownNonTerminal {
                id: entry,
                context: "grammar entry point".to_owned(),
            });
        }

        for (nt_id, def) in non_terminals.iter().enumerate() {
            if def.rules.is_empty() {
                return Err(GrammarError::NoRules {
                    non_terminal: def.name.clone(),
                });
            }
            for rule in &def.rules {
                for symbol in rule {
                    match *symbol {
                        Symbol::Terminal(id) => {
                            if id as usize >= terminals.len() {
                                return Err(GrammarError::UnknownTerminal {
                                    id,
                                    context: def.name.clone(),
                                });
                            }
                        }
                        Symbol::NumberSet(id) => {
                            if id as usize >= number_sets.len() {
                                return Err(GrammarError::UnknownNumberSet {
                                    id,
                                    context: def.name.clone(),
                                });
                            }
                            if number_sets[id as usize].ranges.is_empty() {
                                return Err(GrammarError::ZeroWidthNumberSet { id });
                            }
                        }
                        Symbol::NonTerminal(id) => {
                            if id as usize >= non_terminals.len() {
                                return Err(GrammarError::UnknownNonTerminal {
                                    id,
                                    context: def.name.clone(),
                                });
                            }
                        }
                    }
                }
            }
            let _ = nt_id;
        }

        Ok(Self {
            entry,
            non_terminals,
            terminals,
            number_sets,
        })
    }

    /// Id of the designated entry non-terminal.
    pub fn entry(&self) -> NonTermId {
        self.entry
    }

    /// All non-terminals, indexed by [`NonTermId`].
    pub fn non_terminals(&self) -> &[NonTerminalDef] {
        &self.non_terminals
    }

    /// All terminal byte blobs, indexed by [`TerminalId`].
    pub fn terminals(&self) -> &[Vec<u8>] {
        &self.terminals
    }

    /// All number sets, indexed by [`NumberSetId`].
    pub fn number_sets(&self) -> &[NumberSet] {
        &self.number_sets
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, def) in self.non_terminals.iter().enumerate() {
            for rule in &def.rules {
                write!(f, "{} ->", def.name)?;
                if rule.is_empty() {
                    write!(f, " epsilon")?;
                }
                for symbol in rule {
                    match *symbol {
                        Symbol::Terminal(t) => write!(f, " {:?}", self.terminals[t as usize])?,
                        Symbol::NumberSet(n) => write!(f, " <numberset {}>", n)?,
                        Symbol::NonTerminal(n) => {
                            write!(f, " {}", self.non_terminals[n as usize].name)?
                        }
                    }
                }
                writeln!(f)?;
            }
            let _ = id;
        }
        Ok(())
    }
}

/// Convenience builder for constructing a [`Grammar`] by name rather than by
/// pre-assigned integer id. Ids are handed out in first-seen order, matching
/// the Normalizer's own id-assignment rule (see [`crate::normalize`]) so that a
/// grammar built this way and then normalized keeps the same ids throughout.
#[derive(Debug, Default)]
pub struct GrammarBuilder {
    non_terminals: Vec<NonTerminalDef>,
    non_terminal_ids: HashMap<String, NonTermId>,
    terminals: Vec<Vec<u8>>,
    terminal_ids: HashMap<Vec<u8>, TerminalId>,
    number_sets: Vec<NumberSet>,
}

impl GrammarBuilder {
    /// Start an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the id for a non-terminal name.
    pub fn non_terminal(&mut self, name: &str) -> NonTermId {
        if let Some(&id) = self.non_terminal_ids.get(name) {
            return id;
        }
        let id = self.non_terminals.len() as NonTermId;
        self.non_terminals.push(NonTerminalDef::new(name, Vec::new()));
        self.non_terminal_ids.insert(name.to_owned(), id);
        id
    }

    /// Get or create the id for a terminal byte blob.
    pub fn terminal(&mut self, bytes: impl Into<Vec<u8>>) -> TerminalId {
        let bytes = bytes.into();
        if let Some(&id) = self.terminal_ids.get(&bytes) {
            return id;
        }
        let id = self.terminals.len() as TerminalId;
        self.terminal_ids.insert(bytes.clone(), id);
        self.terminals.push(bytes);
        id
    }

    /// Declare a new number set, returning its id.
    pub fn number_set(&mut self, ranges: Vec<NumberRange>, width: Width) -> NumberSetId {
        let id = self.number_sets.len() as NumberSetId;
        self.number_sets.push(NumberSet::new(ranges, width));
        id
    }

    /// Append a rule to a non-terminal (which must already have been named via
    /// [`Self::non_terminal`]).
    pub fn add_rule(&mut self, nt: NonTermId, rule: Rule) {
        self.non_terminals[nt as usize].rules.push(rule);
    }

    /// Finish building, validating cross-references and returning the grammar.
    pub fn build(self, entry: NonTermId) -> Result<Grammar, GrammarError> {
        Grammar::new(entry, self.non_terminals, self.terminals, self.number_sets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grammar() -> (GrammarBuilder, NonTermId, NonTermId) {
        let mut b = GrammarBuilder::new();
        let s = b.non_terminal("S");
        let a = b.non_terminal("A");
        (b, s, a)
    }

    #[test]
    fn accepts_a_wellformed_grammar() {
        let (mut b, s, a) = small_grammar();
        let t_a = b.terminal(b"a");
        b.add_rule(s, vec![Symbol::Terminal(t_a), Symbol::NonTerminal(a)]);
        b.add_rule(a, vec![]);
        let g = b.build(s).unwrap();
        assert_eq!(g.entry(), s);
        assert_eq!(g.non_terminals().len(), 2);
    }

    #[test]
    fn rejects_unknown_non_terminal_reference() {
        let (mut b, s, _a) = small_grammar();
        let t_a = b.terminal(b"a");
        // Reference non-terminal id 5, which was never declared.
        b.add_rule(s, vec![Symbol::Terminal(t_a), Symbol::NonTerminal(5)]);
        let err = b.build(s).unwrap_err();
        assert!(matches!(err, GrammarError::UnknownNonTerminal { id: 5, .. }));
    }

    #[test]
    fn rejects_unknown_terminal_reference() {
        let (mut b, s, _a) = small_grammar();
        b.add_rule(s, vec![Symbol::Terminal(42)]);
        let err = b.build(s).unwrap_err();
        assert!(matches!(err, GrammarError::UnknownTerminal { id: 42, .. }));
    }

    #[test]
    fn rejects_zero_width_number_set() {
        let (mut b, s, _a) = small_grammar();
        let empty_set = b.number_set(vec![], Width::One);
        b.add_rule(s, vec![Symbol::NumberSet(empty_set)]);
        let err = b.build(s).unwrap_err();
        assert!(matches!(err, GrammarError::ZeroWidthNumberSet { .. }));
    }

    #[test]
    fn rejects_unknown_entry_point() {
        let (b, _s, _a) = small_grammar();
        let err = b.build(99).unwrap_err();
        assert!(matches!(err, GrammarError::UnknownNonTerminal { id: 99, .. }));
    }

    #[test]
    fn rejects_non_terminal_with_no_rules_at_all() {
        let mut b = GrammarBuilder::new();
        let s = b.non_terminal("S");
        let _unused = b.non_terminal("Unused"); // declared, never given a rule
        b.add_rule(s, vec![]);
        let err = b.build(s).unwrap_err();
        assert!(matches!(err, GrammarError::NoRules { ref non_terminal } if non_terminal == "Unused"));
    }

    #[test]
    fn builder_deduplicates_terminals_by_bytes() {
        let mut b = GrammarBuilder::new();
        let t1 = b.terminal(b"x");
        let t2 = b.terminal(b"x");
        assert_eq!(t1, t2);
    }
}
