//! Brzozowski minimization: reverse and determinize, twice.

use rayon::prelude::*;
use tracing::debug;

use crate::dfa::Dfa;
use crate::nfa::{Label, Nfa};

/// Reverse every edge of `dfa` into an NFA.
///
/// The DFA start becomes the only accepting state and every accepting DFA
/// state becomes a start state. State ids carry over unchanged.
pub fn invert(dfa: &Dfa) -> Nfa {
    let mut nfa = Nfa::empty();
    nfa.ensure_state(dfa.num_states().saturating_sub(1) as u32);

    let mut canonical_start = dfa.start();
    for state in dfa.states() {
        if state.is_accepting() {
            nfa.add_start_state(state.id());
            canonical_start = state.id();
        }
    }
    nfa.set_start(canonical_start);
    nfa.set_end(dfa.start());
    nfa.set_accepting(dfa.start());

    for state in dfa.states() {
        for (&symbol, &target) in state.transitions() {
            // targets outside the state table are synthesized by the arena
            nfa.add_transition(target, Label::Symbol(symbol), state.id());
        }
    }
    nfa
}

/// The minimal DFA accepting the same language as `dfa`.
#[tracing::instrument(skip_all, fields(states = dfa.num_states()))]
pub fn minimize(dfa: &Dfa) -> Dfa {
    let reversed = Dfa::from_nfa(&invert(dfa));
    let minimal = Dfa::from_nfa(&invert(&reversed));
    debug!(
        before = dfa.num_states(),
        reversed = reversed.num_states(),
        after = minimal.num_states(),
        "minimized DFA"
    );
    minimal
}

/// Minimize independent DFAs in parallel, keeping their order.
pub fn minimize_all(dfas: &[Dfa]) -> Vec<Dfa> {
    dfas.par_iter().map(minimize).collect()
}

impl Dfa {
    pub fn minimize(&self) -> Dfa {
        minimize(self)
    }
}
