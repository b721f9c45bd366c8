//! The normalized, emission-ready form of a grammar.
//!
//! This is the type the [`crate::emit`] templates actually walk. It differs
//! from [`crate::grammar::Grammar`] in three ways: ids are guaranteed dense and
//! GNF-valid, every non-terminal carries precomputed dispatch metadata (rule
//! count class, triangular eligibility, which symbol kinds it contains), and
//! terminal/number-set symbols are distinguished at the type level the way the
//! emitted templates need to `match` on them. Named `translator` because this
//! is the module the emitted source itself is conceptually "translated" out
//! of — the templates under `templates/` refer to these exact shapes.

use crate::grammar::{self, NonTermId, NumberSetId, TerminalId, Width};

/// One symbol on the right-hand side of a normalized rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    /// A terminal (byte-literal or number-set).
    Terminal(Terminal),
    /// A reference to another (or the same) non-terminal.
    NonTerminal(NonTermId),
}

/// The two kinds of terminal a normalized rule can start with or contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    /// A fixed byte-literal, identified by id into the terminal constant pool.
    Bytes(TerminalId),
    /// A number set, identified by id into the number-set table.
    Numberset(NumberSetId),
}

/// The smallest unsigned integer type that can hold any rule index across
/// every non-terminal in the grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StepType {
    /// `uint8_t`, holds rule indices up to 255.
    U8,
    /// `uint16_t`.
    U16,
    /// `uint32_t`.
    U32,
    /// `uint64_t`.
    U64,
}

impl StepType {
    /// Choose the narrowest step type that can hold any valid rule index,
    /// given the largest rule count of any non-terminal in the grammar.
    ///
    /// A non-terminal with `k` rules has valid indices `0..k`, so the type
    /// must satisfy `2^(8*width) > max_num_of_rules - 1`, i.e.
    /// `2^(8*width) >= max_num_of_rules`. `max_num_of_rules == 0` (the grammar
    /// has no dispatching non-terminals at all) trivially fits in the
    /// narrowest type.
    pub fn for_max_rules(max_num_of_rules: usize) -> Self {
        let needs = max_num_of_rules.max(1) as u128;
        if needs <= (1u128 << 8) {
            StepType::U8
        } else if needs <= (1u128 << 16) {
            StepType::U16
        } else if needs <= (1u128 << 32) {
            StepType::U32
        } else {
            StepType::U64
        }
    }

    /// The emitted C type alias.
    pub fn c_type(self) -> &'static str {
        match self {
            StepType::U8 => "uint8_t",
            StepType::U16 => "uint16_t",
            StepType::U32 => "uint32_t",
            StepType::U64 => "uint64_t",
        }
    }
}

/// A number set as seen by the emitter: its ranges, verbatim from the grammar,
/// plus the width class used to size its inline generator function.
#[derive(Debug, Clone)]
pub struct NumberSetInfo {
    ranges: Vec<grammar::NumberRange>,
    width: Width,
}

impl NumberSetInfo {
    fn from_grammar(ns: &grammar::NumberSet) -> Self {
        Self {
            ranges: ns.ranges().to_vec(),
            width: ns.width(),
        }
    }

    /// The ranges this set draws from, in declaration order.
    pub fn ranges(&self) -> &[grammar::NumberRange] {
        &self.ranges
    }

    /// The width class (and therefore C type) of this set.
    pub fn width(&self) -> Width {
        self.width
    }
}

/// All production rules of one non-terminal, plus precomputed dispatch
/// metadata used both to pick a template branch and to decide triangular vs.
/// uniform random dispatch.
#[derive(Debug, Clone)]
pub struct RuleSet {
    nonterm: NonTermId,
    rules: Vec<Vec<Symbol>>,
    has_terminals: bool,
    has_nonterminals: bool,
    is_triangular: bool,
}

impl RuleSet {
    /// Construct a rule set from its precomputed dispatch metadata. Used only
    /// by [`crate::normalize`], which is what actually computes these flags.
    pub(crate) fn new(
        nonterm: NonTermId,
        rules: Vec<Vec<Symbol>>,
        has_terminals: bool,
        has_nonterminals: bool,
        is_triangular: bool,
    ) -> Self {
        Self {
            nonterm,
            rules,
            has_terminals,
            has_nonterminals,
            is_triangular,
        }
    }

    /// Id of the non-terminal these rules belong to.
    pub fn nonterm(&self) -> NonTermId {
        self.nonterm
    }

    /// Rules, in the exact order they must be tried at dispatch time.
    pub fn rules(&self) -> &[Vec<Symbol>] {
        &self.rules
    }

    /// True iff any rule here contains at least one terminal or number-set
    /// symbol.
    pub fn has_terminals(&self) -> bool {
        self.has_terminals
    }

    /// True iff any rule here contains at least one non-terminal reference.
    pub fn has_nonterminals(&self) -> bool {
        self.has_nonterminals
    }

    /// True iff this non-terminal has exactly one rule and that rule is
    /// empty — the "no symbols at all" case that only advances `*step`.
    pub fn has_no_symbols(&self) -> bool {
        self.rules.len() <= 1 && self.rules.first().is_some_and(|r| r.is_empty())
    }

    /// True iff this non-terminal dispatches over more than one rule (and
    /// therefore needs a runtime choice, as opposed to being inlined).
    pub fn is_dispatching(&self) -> bool {
        self.rules.len() > 1
    }

    /// True iff, when dispatching, rule choice should be weighted via the
    /// triangular table rather than uniform. The table weights the *highest*
    /// rule index most heavily (see [`NormalizedGrammar::triangular_table`]),
    /// so grammar authors who want a GNF-terminating alternative favored
    /// should put it last in the non-terminal's rule list, not first.
    pub fn is_triangular(&self) -> bool {
        self.is_triangular
    }
}

/// The normalized, GNF-valid, id-dense grammar consumed by the emitter and its
/// templates.
#[derive(Debug, Clone)]
pub struct NormalizedGrammar {
    entry: NonTermId,
    names: Vec<String>,
    terminals: Vec<Vec<u8>>,
    numbersets: Vec<NumberSetInfo>,
    rule_sets: Vec<RuleSet>,
    max_num_of_rules: usize,
    step_type: StepType,
}

impl NormalizedGrammar {
    pub(crate) fn new(
        entry: NonTermId,
        names: Vec<String>,
        terminals: Vec<Vec<u8>>,
        numbersets_src: &[grammar::NumberSet],
        rule_sets: Vec<RuleSet>,
    ) -> Self {
        let max_num_of_rules = rule_sets.iter().map(|r| r.rules.len()).max().unwrap_or(0);
        let numbersets = numbersets_src.iter().map(NumberSetInfo::from_grammar).collect();
        Self {
            entry,
            names,
            terminals,
            numbersets,
            rule_sets,
            max_num_of_rules,
            step_type: StepType::for_max_rules(max_num_of_rules),
        }
    }

    /// Id of the entry non-terminal.
    pub fn entry(&self) -> NonTermId {
        self.entry
    }

    /// Printable name of a non-terminal.
    pub fn nonterminal(&self, id: NonTermId) -> &str {
        &self.names[id as usize]
    }

    /// Terminal byte blobs, in id order.
    pub fn terminals(&self) -> impl Iterator<Item = (TerminalId, &[u8])> {
        self.terminals
            .iter()
            .enumerate()
            .map(|(id, bytes)| (id as TerminalId, bytes.as_slice()))
    }

    /// Number sets, in id order.
    pub fn numbersets(&self) -> impl Iterator<Item = (NumberSetId, &NumberSetInfo)> {
        self.numbersets
            .iter()
            .enumerate()
            .map(|(id, ns)| (id as NumberSetId, ns))
    }

    /// Look up a single number set by id.
    pub fn numberset(&self, id: NumberSetId) -> &NumberSetInfo {
        &self.numbersets[id as usize]
    }

    /// All rule sets, one per non-terminal, in id order.
    pub fn rule_sets(&self) -> &[RuleSet] {
        &self.rule_sets
    }

    /// `max_num_of_rules`: the largest rule count of any non-terminal, used
    /// to size the triangular lookup table.
    pub fn max_num_of_rules(&self) -> usize {
        self.max_num_of_rules
    }

    /// The chosen step type for this grammar's walk entries.
    pub fn step_type(&self) -> StepType {
        self.step_type
    }

    /// Build the triangular lookup table: a flattened list of rows, row `i`
    /// (1-indexed, for `i` in `1..=max_num_of_rules`) containing `i` copies of
    /// `i - 1`. `TRIANGULAR_RANDOM(n)` indexes into this with
    /// `internal_random() % (n*(n+1)/2)`, which lands in row `n`'s span with
    /// probability proportional to the row's length — so for a `k`-rule
    /// dispatch point, rule index `k - 1` gets the largest single share (`k`
    /// out of `k*(k+1)/2`) and rule 0 the smallest (`1` out of
    /// `k*(k+1)/2`). Grammar authors wanting GNF termination bias should put
    /// the terminating alternative last in a non-terminal's rule list.
    pub fn triangular_table(&self) -> Vec<u64> {
        let mut table = Vec::new();
        for i in 1..=self.max_num_of_rules {
            table.extend(std::iter::repeat((i - 1) as u64).take(i));
        }
        table
    }
}
