//! Normalizes a [`crate::grammar::Grammar`] into a
//! [`crate::translator::NormalizedGrammar`]: validates Greibach Normal Form,
//! flags unreachable non-terminals, and precomputes the dispatch metadata the
//! emitter needs (rule-count class, triangular eligibility, symbol-kind
//! flags, the chosen step type).

use std::collections::{HashSet, VecDeque};

use log::{debug, trace, warn};

use crate::error::{GrammarError, GrammarWarning};
use crate::grammar::{Grammar, NonTermId, Symbol as GSymbol};
use crate::translator::{NormalizedGrammar, RuleSet, Symbol, Terminal};

/// Validate and normalize a grammar, returning the emission-ready IR plus any
/// non-fatal diagnostics (currently: unreachable non-terminals).
///
/// Fails with [`GrammarError`] if the grammar is not in Greibach Normal Form
/// or contains a terminal whose byte blob is empty in a rule with no other
/// symbols (spec §4.1, §7 channel 1). [`crate::grammar::Grammar::new`] has
/// already checked that every symbol reference resolves, so this stage does
/// not repeat that check.
pub fn normalize(grammar: &Grammar) -> Result<(NormalizedGrammar, Vec<GrammarWarning>), GrammarError> {
    validate_gnf(grammar)?;
    validate_terminal_blobs(grammar)?;

    let tail_graph = build_tail_graph(grammar);
    let reachable = reachable_non_terminals(grammar, &tail_graph);

    let mut warnings = Vec::new();
    for (id, def) in grammar.non_terminals().iter().enumerate() {
        if !reachable.contains(&(id as NonTermId)) {
            warn!("non-terminal `{}` is unreachable from the entry point", def.name());
            warnings.push(GrammarWarning::UnreachableNonTerminal {
                name: def.name().to_owned(),
            });
        }
    }

    let mut rule_sets = Vec::with_capacity(grammar.non_terminals().len());
    for (id, def) in grammar.non_terminals().iter().enumerate() {
        let id = id as NonTermId;
        let rules: Vec<Vec<Symbol>> = def
            .rules()
            .iter()
            .map(|r| r.iter().map(translate_symbol).collect())
            .collect();

        let has_terminals = rules.iter().any(|r| r.iter().any(|s| matches!(s, Symbol::Terminal(_))));
        let has_nonterminals = rules
            .iter()
            .any(|r| r.iter().any(|s| matches!(s, Symbol::NonTerminal(_))));
        let is_triangular = rules.len() >= 2 && self_reaches(&tail_graph, id);

        trace!(
            "non-terminal `{}`: {} rule(s), triangular={}",
            def.name(),
            rules.len(),
            is_triangular
        );

        rule_sets.push(RuleSet::new(id, rules, has_terminals, has_nonterminals, is_triangular));
    }

    let names = grammar.non_terminals().iter().map(|d| d.name().to_owned()).collect();
    debug!(
        "normalized grammar: {} non-terminal(s), {} terminal(s), {} number set(s)",
        grammar.non_terminals().len(),
        grammar.terminals().len(),
        grammar.number_sets().len()
    );

    let normalized = NormalizedGrammar::new(
        grammar.entry(),
        names,
        grammar.terminals().to_vec(),
        grammar.number_sets(),
        rule_sets,
    );

    Ok((normalized, warnings))
}

fn translate_symbol(s: &GSymbol) -> Symbol {
    match *s {
        GSymbol::Terminal(id) => Symbol::Terminal(Terminal::Bytes(id)),
        GSymbol::NumberSet(id) => Symbol::Terminal(Terminal::Numberset(id)),
        GSymbol::NonTerminal(id) => Symbol::NonTerminal(id),
    }
}

/// Every rule must either be empty or begin with a terminal/number-set
/// symbol — a leading non-terminal reference violates Greibach Normal Form.
fn validate_gnf(grammar: &Grammar) -> Result<(), GrammarError> {
    for def in grammar.non_terminals() {
        for (rule_index, rule) in def.rules().iter().enumerate() {
            if let Some(GSymbol::NonTerminal(_)) = rule.first() {
                return Err(GrammarError::NotInGnf {
                    non_terminal: def.name().to_owned(),
                    rule_index,
                });
            }
        }
    }
    Ok(())
}

/// A rule consisting of exactly one terminal whose byte blob is empty can't
/// be told apart from the dedicated empty-rule encoding.
fn validate_terminal_blobs(grammar: &Grammar) -> Result<(), GrammarError> {
    for def in grammar.non_terminals() {
        for rule in def.rules() {
            if let [GSymbol::Terminal(id)] = rule.as_slice() {
                if grammar.terminals()[*id as usize].is_empty() {
                    return Err(GrammarError::EmptyTerminalBlob {
                        id: *id,
                        non_terminal: def.name().to_owned(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Edge `n -> m` iff some rule of `n` references `m` anywhere after the
/// leading symbol (the rule's "tail"). This is the graph triangular
/// eligibility and reachability-of-self are both computed over.
fn build_tail_graph(grammar: &Grammar) -> Vec<Vec<NonTermId>> {
    let mut graph = vec![Vec::new(); grammar.non_terminals().len()];
    for (id, def) in grammar.non_terminals().iter().enumerate() {
        for rule in def.rules() {
            for symbol in rule.iter().skip(1) {
                if let GSymbol::NonTerminal(target) = symbol {
                    graph[id].push(*target);
                }
            }
        }
    }
    graph
}

/// True iff `start` can reach itself via one or more edges of `graph`
/// (i.e. there is a non-trivial cycle through `start`).
fn self_reaches(graph: &[Vec<NonTermId>], start: NonTermId) -> bool {
    let mut queue: VecDeque<NonTermId> = graph[start as usize].iter().copied().collect();
    let mut seen: HashSet<NonTermId> = queue.iter().copied().collect();
    while let Some(n) = queue.pop_front() {
        if n == start {
            return true;
        }
        for &next in &graph[n as usize] {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    false
}

/// All non-terminals reachable from the entry point by following both
/// leading symbols and tail references (i.e. the full derivation graph, not
/// just the tail graph used for triangular eligibility).
fn reachable_non_terminals(grammar: &Grammar, tail_graph: &[Vec<NonTermId>]) -> HashSet<NonTermId> {
    let mut seen = HashSet::new();
    let mut queue = VecDeque::new();
    seen.insert(grammar.entry());
    queue.push_back(grammar.entry());

    while let Some(id) = queue.pop_front() {
        // Leading symbols are always terminal/number-set under GNF, so the
        // only non-terminal references to follow are in the tail.
        let mut neighbors: Vec<NonTermId> = tail_graph[id as usize].clone();
        neighbors.sort_unstable();
        neighbors.dedup();
        for next in neighbors {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{GrammarBuilder, Symbol, Width};

    #[test]
    fn rejects_leading_nonterminal() {
        let mut b = GrammarBuilder::new();
        let s = b.non_terminal("S");
        let a = b.non_terminal("A");
        b.add_rule(s, vec![Symbol::NonTerminal(a)]);
        b.add_rule(a, vec![]);
        let g = b.build(s).unwrap();

        let err = normalize(&g).unwrap_err();
        assert!(matches!(err, GrammarError::NotInGnf { rule_index: 0, .. }));
    }

    #[test]
    fn warns_on_unreachable_non_terminal() {
        let mut b = GrammarBuilder::new();
        let s = b.non_terminal("S");
        let dead = b.non_terminal("Dead");
        let t_a = b.terminal(b"a");
        b.add_rule(s, vec![Symbol::Terminal(t_a)]);
        b.add_rule(dead, vec![]);
        let g = b.build(s).unwrap();

        let (_normalized, warnings) = normalize(&g).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            GrammarWarning::UnreachableNonTerminal { name } if name == "Dead"
        ));
    }

    #[test]
    fn self_recursive_nonterminal_with_two_rules_is_triangular() {
        // S -> 'a' S | epsilon
        let mut b = GrammarBuilder::new();
        let s = b.non_terminal("S");
        let t_a = b.terminal(b"a");
        b.add_rule(s, vec![Symbol::Terminal(t_a), Symbol::NonTerminal(s)]);
        b.add_rule(s, vec![]);
        let g = b.build(s).unwrap();

        let (normalized, _warnings) = normalize(&g).unwrap();
        assert!(normalized.rule_sets()[s as usize].is_triangular());
    }

    #[test]
    fn non_recursive_multi_rule_nonterminal_is_not_triangular() {
        // S -> 'a' | 'b'
        let mut b = GrammarBuilder::new();
        let s = b.non_terminal("S");
        let t_a = b.terminal(b"a");
        let t_b = b.terminal(b"b");
        b.add_rule(s, vec![Symbol::Terminal(t_a)]);
        b.add_rule(s, vec![Symbol::Terminal(t_b)]);
        let g = b.build(s).unwrap();

        let (normalized, _warnings) = normalize(&g).unwrap();
        assert!(!normalized.rule_sets()[s as usize].is_triangular());
    }

    #[test]
    fn single_rule_nonterminal_is_never_triangular_even_if_recursive() {
        // S -> 'a' S (only one rule: not a dispatch point at all)
        let mut b = GrammarBuilder::new();
        let s = b.non_terminal("S");
        let t_a = b.terminal(b"a");
        b.add_rule(s, vec![Symbol::Terminal(t_a), Symbol::NonTerminal(s)]);
        let g = b.build(s).unwrap();

        let (normalized, _warnings) = normalize(&g).unwrap();
        assert!(!normalized.rule_sets()[s as usize].is_triangular());
    }

    #[test]
    fn rejects_single_empty_byte_terminal_rule() {
        let mut b = GrammarBuilder::new();
        let s = b.non_terminal("S");
        let empty_term = b.terminal(Vec::new());
        b.add_rule(s, vec![Symbol::Terminal(empty_term)]);
        let g = b.build(s).unwrap();

        let err = normalize(&g).unwrap_err();
        assert!(matches!(err, GrammarError::EmptyTerminalBlob { .. }));
    }

    #[test]
    fn zero_width_number_set_rejected_at_build_time() {
        let mut b = GrammarBuilder::new();
        let s = b.non_terminal("S");
        let ns = b.number_set(vec![], Width::One);
        b.add_rule(s, vec![Symbol::NumberSet(ns)]);
        assert!(b.build(s).is_err());
    }
}
