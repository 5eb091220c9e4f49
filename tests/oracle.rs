//! Compare the pipeline against `regex-automata` on every short input.

use once_cell::sync::Lazy;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use regex_automata::meta::Regex;
use thompson_dfa::{Dfa, Nfa, StepEvent, Token};

static TEST_SETUP: Lazy<bool> = Lazy::new(|| {
    setup();
    true
});

fn test_setup() {
    assert!(*TEST_SETUP);
}

fn setup() {
    let subscriber = tracing_subscriber::fmt()
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::CLOSE)
        .with_test_writer()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

const ALPHABET: [char; 3] = ['a', 'b', 'c'];

/// Render postfix tokens as an anchored regex for the oracle.
fn to_regex(postfix: &[Token]) -> String {
    let mut stack: Vec<String> = Vec::new();
    for token in postfix {
        let rendered = match token {
            Token::Literal(c) => c.to_string(),
            Token::Concat => {
                let b = stack.pop().unwrap();
                let a = stack.pop().unwrap();
                format!("(?:{})(?:{})", a, b)
            }
            Token::Alternate => {
                let b = stack.pop().unwrap();
                let a = stack.pop().unwrap();
                format!("(?:{}|{})", a, b)
            }
            Token::Star => format!("(?:{})*", stack.pop().unwrap()),
            Token::Plus => format!("(?:{})+", stack.pop().unwrap()),
            Token::Optional => format!("(?:{})?", stack.pop().unwrap()),
        };
        stack.push(rendered);
    }
    assert_eq!(stack.len(), 1);
    format!("^(?:{})$", stack[0])
}

/// Every string over `ALPHABET` up to `max_len` symbols.
fn words(max_len: usize) -> Vec<String> {
    let mut words = vec![String::new()];
    let mut frontier = vec![String::new()];
    for _ in 0..max_len {
        frontier = frontier
            .iter()
            .flat_map(|w| ALPHABET.iter().map(move |c| format!("{}{}", w, c)))
            .collect();
        words.extend(frontier.iter().cloned());
    }
    words
}

static LONG_WORDS: Lazy<Vec<String>> = Lazy::new(|| words(5));
static SHORT_WORDS: Lazy<Vec<String>> = Lazy::new(|| words(4));

static FIXED: [&str; 12] = [
    "ab.", "ab|", "ab.*", "ab.?", "ab.+", "ab|*", "ab.*c.", "abc|*.", "abb.+.c.", "a**", "a?*b.",
    "ab|c|+",
];

fn fixed() -> impl Iterator<Item = Vec<Token>> {
    FIXED.iter().map(|p| thompson_dfa::tokenize_postfix(p))
}

fn binary(mut left: Vec<Token>, right: Vec<Token>, operator: Token) -> Vec<Token> {
    left.extend(right);
    left.push(operator);
    left
}

fn unary(mut operand: Vec<Token>, operator: Token) -> Vec<Token> {
    operand.push(operator);
    operand
}

/// Well-formed postfix token streams over `ALPHABET`.
fn postfix() -> impl Strategy<Value = Vec<Token>> {
    let literal = prop::sample::select(ALPHABET.to_vec()).prop_map(|c| vec![Token::Literal(c)]);
    literal.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(a, b)| binary(a, b, Token::Concat)),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| binary(a, b, Token::Alternate)),
            inner.clone().prop_map(|a| unary(a, Token::Star)),
            inner.clone().prop_map(|a| unary(a, Token::Plus)),
            inner.prop_map(|a| unary(a, Token::Optional)),
        ]
    })
}

fn render(postfix: &[Token]) -> String {
    postfix.iter().map(Token::to_string).collect()
}

fn agrees_with_regex_automata(postfix: &[Token]) -> Result<(), TestCaseError> {
    let pattern = to_regex(postfix);
    let oracle = Regex::new(&pattern).unwrap();
    let dfa = Dfa::from_nfa(&Nfa::from_postfix(postfix).unwrap());
    let minimal = dfa.minimize();
    prop_assert!(dfa.is_deterministic(), "{}", pattern);
    prop_assert!(minimal.is_deterministic(), "{}", pattern);
    prop_assert!(minimal.num_states() <= dfa.num_states(), "{}", pattern);
    for input in LONG_WORDS.iter() {
        let expected = oracle.is_match(input.as_str());
        prop_assert_eq!(dfa.accepts(input), expected, "{} on {:?}", pattern, input);
        prop_assert_eq!(minimal.accepts(input), expected, "{} on {:?}", pattern, input);
    }
    Ok(())
}

fn minimizes_idempotently(postfix: &[Token]) -> Result<(), TestCaseError> {
    let minimal = Dfa::from_nfa(&Nfa::from_postfix(postfix).unwrap()).minimize();
    prop_assert!(minimal.is_isomorphic(&minimal.minimize()), "{}", render(postfix));
    Ok(())
}

fn reachable_states_survive(postfix: &[Token]) -> Result<(), TestCaseError> {
    let dfa = Dfa::from_nfa(&Nfa::from_postfix(postfix).unwrap());
    let minimal = dfa.minimize();
    // any path into the original DFA has a counterpart that agrees on
    // acceptance of every suffix
    for prefix in SHORT_WORDS.iter() {
        let Some(original) = dfa.state_sequence(prefix) else {
            continue;
        };
        let merged = minimal.state_sequence(prefix);
        prop_assert!(merged.is_some(), "{} lost {:?}", render(postfix), prefix);
        let from = *original.last().unwrap();
        let to = *merged.unwrap().last().unwrap();
        prop_assert_eq!(dfa.is_accepting(from), minimal.is_accepting(to));
    }
    Ok(())
}

fn trace_lengths_match_input(postfix: &[Token]) -> Result<(), TestCaseError> {
    let dfa = Dfa::from_nfa(&Nfa::from_postfix(postfix).unwrap()).minimize();
    for input in SHORT_WORDS.iter() {
        let run = dfa.simulate(input);
        let len = input.chars().count();
        match run.trace.last().map(|s| s.event) {
            Some(StepEvent::DeadEnd { position, .. }) => {
                prop_assert!(!run.accepted);
                prop_assert_eq!(run.trace.len(), position + 2);
            }
            Some(StepEvent::Accepted) => {
                prop_assert!(run.accepted);
                prop_assert_eq!(run.trace.len(), len + 2);
            }
            Some(StepEvent::Rejected) => {
                prop_assert!(!run.accepted);
                prop_assert_eq!(run.trace.len(), len + 2);
            }
            other => prop_assert!(false, "unexpected final step {:?}", other),
        }
        prop_assert_eq!(run.accepted, dfa.accepts(input));
    }
    Ok(())
}

#[test]
fn fixed_cases_agree_with_regex_automata() {
    test_setup();
    for postfix in fixed() {
        agrees_with_regex_automata(&postfix).unwrap();
        minimizes_idempotently(&postfix).unwrap();
        reachable_states_survive(&postfix).unwrap();
        trace_lengths_match_input(&postfix).unwrap();
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn pipeline_agrees_with_regex_automata(postfix in postfix()) {
        test_setup();
        agrees_with_regex_automata(&postfix)?;
    }

    #[test]
    fn minimization_is_idempotent(postfix in postfix()) {
        test_setup();
        minimizes_idempotently(&postfix)?;
    }

    #[test]
    fn every_reachable_state_survives_minimization(postfix in postfix()) {
        test_setup();
        reachable_states_survive(&postfix)?;
    }

    #[test]
    fn trace_lengths(postfix in postfix()) {
        test_setup();
        trace_lengths_match_input(&postfix)?;
    }
}
