//! Exercises the literal scenarios this compiler is expected to satisfy.
//!
//! These run the pipeline (`Grammar` -> `normalize` -> `CodeEmitter`) and
//! check the properties that are actually observable without a C toolchain:
//! normalized metadata (triangular eligibility, step type, rule-count class)
//! and the shape of the emitted text. Properties that require executing the
//! emitted C (determinism, Chi-squared histograms over a million draws,
//! linking two translation units) are checked indirectly here by asserting
//! the generated source has the structure those properties depend on.

use chameleon_compiler::emit::{CodeEmitter, EmitOptions};
use chameleon_compiler::grammar::{GrammarBuilder, NumberRange, Symbol, Width};
use chameleon_compiler::normalize;

/// Scenario 1: `S -> 'a' S | epsilon`. Two rules, self-recursive tail, so the
/// dispatch point is triangular; the step type is the narrowest that holds
/// rule index 0 or 1.
#[test]
fn scenario_1_single_rule_grammar_is_triangular_and_emits_dispatch() {
    let mut b = GrammarBuilder::new();
    let s = b.non_terminal("S");
    let t_a = b.terminal(b"a");
    b.add_rule(s, vec![Symbol::Terminal(t_a), Symbol::NonTerminal(s)]);
    b.add_rule(s, vec![]);
    let grammar = b.build(s).unwrap();

    let (normalized, warnings) = normalize(&grammar).unwrap();
    assert!(warnings.is_empty());
    assert!(normalized.rule_sets()[s as usize].is_triangular());
    assert_eq!(normalized.max_num_of_rules(), 2);

    let module = CodeEmitter::emit(&normalized, &EmitOptions::default()).unwrap();
    // k=2 rules -> TRIANGULAR_RANDOM(k*(k+1)/2) = TRIANGULAR_RANDOM(3).
    assert!(module.source.contains("TRIANGULAR_RANDOM(3)"));
    assert!(module.source.contains(&format!("_mutate_nonterm_{}", s)));
    assert!(module.header.contains("chameleon_mutate"));
}

/// Scenario 2 (abridged): a JSON-like grammar — an object containing one
/// string-valued key — normalizes and emits without needing any non-GNF
/// rewriting, and every literal punctuation byte shows up as its own
/// terminal constant.
#[test]
fn scenario_2_json_like_grammar_emits_structural_punctuation() {
    let mut b = GrammarBuilder::new();
    let value = b.non_terminal("Value");
    let brace_open = b.terminal(b"{\"k\":\"");
    let brace_close = b.terminal(b"\"}");
    b.add_rule(value, vec![Symbol::Terminal(brace_open), Symbol::Terminal(brace_close)]);
    let grammar = b.build(value).unwrap();

    let (normalized, _warnings) = normalize(&grammar).unwrap();
    let module = CodeEmitter::emit(&normalized, &EmitOptions::default()).unwrap();
    assert!(module.source.contains("TERMINAL_0"));
    assert!(module.source.contains("TERMINAL_1"));
    // A single, non-dispatching rule is inlined, not switched on.
    assert!(!module.source.contains("switch (rule)"));
}

/// Scenario 3: a number set over two disjoint ranges emits the switch-based
/// generator (more than one range) with both ranges present, plus its
/// `_match` helper used by `_parse`.
#[test]
fn scenario_3_number_set_with_disjoint_ranges_emits_both_arms() {
    let mut b = GrammarBuilder::new();
    let n = b.non_terminal("N");
    let ns = b.number_set(
        vec![NumberRange::new(0, 3), NumberRange::new(10, 13)],
        Width::One,
    );
    b.add_rule(n, vec![Symbol::NumberSet(ns)]);
    let grammar = b.build(n).unwrap();

    let (normalized, _warnings) = normalize(&grammar).unwrap();
    let module = CodeEmitter::emit(&normalized, &EmitOptions::default()).unwrap();
    assert!(module.source.contains("case 0:"));
    assert!(module.source.contains("case 1:"));
    assert!(module.source.contains("0ULL + (internal_random() % (3ULL - 0ULL + 1))"));
    assert!(module.source.contains("10ULL + (internal_random() % (13ULL - 10ULL + 1))"));
    assert!(module.source.contains("_numberset_0_match"));
}

/// Scenario 4: a grammar whose only rule is empty never touches `output` at
/// all and only advances the step counter.
#[test]
fn scenario_4_empty_grammar_only_advances_step() {
    let mut b = GrammarBuilder::new();
    let s = b.non_terminal("S");
    b.add_rule(s, vec![]);
    let grammar = b.build(s).unwrap();

    let (normalized, _warnings) = normalize(&grammar).unwrap();
    assert!(normalized.rule_sets()[s as usize].has_no_symbols());

    let module = CodeEmitter::emit(&normalized, &EmitOptions::default()).unwrap();
    assert!(module.source.contains("(void) output;"));
    assert!(module.source.contains("(void) output_length;"));
}

/// Scenario 5: truncation is signaled by returning the caller's remaining
/// capacity, not a sentinel like 0 or -1 — every terminal/number-set write
/// checks `sizeof(...) > output_length` and returns `output_length` itself.
#[test]
fn scenario_5_truncation_returns_remaining_capacity_not_a_sentinel() {
    let mut b = GrammarBuilder::new();
    let s = b.non_terminal("S");
    let t_a = b.terminal(b"aaaa");
    b.add_rule(s, vec![Symbol::Terminal(t_a)]);
    let grammar = b.build(s).unwrap();

    let (normalized, _warnings) = normalize(&grammar).unwrap();
    let module = CodeEmitter::emit(&normalized, &EmitOptions::default()).unwrap();
    assert!(module.source.contains("if (UNLIKELY(sizeof(TERMINAL_0) > output_length)) {"));
    assert!(module.source.contains("return output_length;"));
}

/// Scenario 6: two modules emitted with distinct prefixes share no exported
/// name, and every internal helper is `static`, so linking both translation
/// units together cannot collide.
#[test]
fn scenario_6_distinct_prefixes_avoid_symbol_collisions() {
    let mut b = GrammarBuilder::new();
    let s = b.non_terminal("S");
    let t_a = b.terminal(b"a");
    b.add_rule(s, vec![Symbol::Terminal(t_a)]);
    let grammar = b.build(s).unwrap();
    let (normalized, _warnings) = normalize(&grammar).unwrap();

    let left = CodeEmitter::emit(
        &normalized,
        &EmitOptions {
            prefix: "left".to_owned(),
            thread_safe: true,
            ..Default::default()
        },
    )
    .unwrap();
    let right = CodeEmitter::emit(
        &normalized,
        &EmitOptions {
            prefix: "right".to_owned(),
            thread_safe: true,
            ..Default::default()
        },
    )
    .unwrap();

    for exported in ["_seed", "_init", "_destroy", "_generate", "_mutate", "_parse"] {
        assert!(left.source.contains(&format!("left{}", exported)));
        assert!(right.source.contains(&format!("right{}", exported)));
    }
    assert!(left.source.contains("THREAD_LOCAL uint64_t rand_state"));
    assert!(left.source.contains("#define CHAMELEON_THREAD_SAFE"));

    // Every non-ABI helper stays `static`, so both translation units can be
    // linked into the same binary without a multiple-definition error.
    for declaration in [
        "static size_t _mutate_nonterm_0(",
        "static uint64_t internal_random(void)",
        "static const unsigned char TERMINAL_0[",
    ] {
        assert!(
            left.source.contains(declaration),
            "expected `{}` in emitted source:\n{}",
            declaration,
            left.source
        );
    }
}
