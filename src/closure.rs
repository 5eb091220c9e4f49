//! Epsilon closure and reachable alphabet over an [`Nfa`].

use std::collections::BTreeSet;

use rustc_hash::FxHashSet as HashSet;

use crate::nfa::{Label, Nfa, StateId, StateSet};
use crate::token::Symbol;

impl Nfa {
    /// Every state reachable from `states` through zero or more epsilon edges.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = states.clone();
        let mut stack: Vec<StateId> = states.iter().copied().collect();

        while let Some(current) = stack.pop() {
            let Some(state) = self.state(current) else {
                continue;
            };
            for &next in state.successors(Label::Epsilon) {
                if closure.insert(next) {
                    stack.push(next);
                }
            }
        }
        closure
    }

    /// Direct successors of `states` on `symbol`, epsilon closed.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: Symbol) -> StateSet {
        let reached: StateSet = states
            .iter()
            .filter_map(|&id| self.state(id))
            .flat_map(|state| state.successors(Label::Symbol(symbol)))
            .copied()
            .collect();
        self.epsilon_closure(&reached)
    }

    /// Sorted non-epsilon symbols on edges reachable from the canonical start
    /// and every start state.
    pub fn alphabet(&self) -> BTreeSet<Symbol> {
        let mut alphabet = BTreeSet::new();
        let mut visited: HashSet<StateId> = HashSet::default();
        let mut stack: Vec<StateId> = vec![self.start()];
        stack.extend(self.start_states().iter().copied());

        while let Some(current) = stack.pop() {
            if !visited.insert(current) {
                continue;
            }
            let Some(state) = self.state(current) else {
                continue;
            };
            for (label, targets) in state.transitions() {
                if let Label::Symbol(c) = label {
                    alphabet.insert(*c);
                }
                stack.extend(targets.iter().filter(|t| !visited.contains(*t)));
            }
        }
        alphabet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closure_follows_epsilon_chains() {
        // 0 -ε-> 1 -ε-> 2, 2 -a-> 3
        let mut nfa = Nfa::empty();
        nfa.add_epsilon(0, 1);
        nfa.add_epsilon(1, 2);
        nfa.add_transition(2, Label::Symbol('a'), 3);
        nfa.add_start_state(0);

        let closure = nfa.epsilon_closure(&StateSet::from([0]));
        assert_eq!(closure, StateSet::from([0, 1, 2]));
        assert_eq!(nfa.epsilon_closure(&StateSet::from([3])), StateSet::from([3]));
        assert!(nfa.epsilon_closure(&StateSet::new()).is_empty());
    }

    #[test]
    fn closure_terminates_on_epsilon_cycles() {
        // 0 -ε-> 1 -ε-> 2 -ε-> 0, and a self loop on 1
        let mut nfa = Nfa::empty();
        nfa.add_epsilon(0, 1);
        nfa.add_epsilon(1, 2);
        nfa.add_epsilon(2, 0);
        nfa.add_epsilon(1, 1);
        nfa.add_start_state(0);

        for seed in 0..3 {
            let closure = nfa.epsilon_closure(&StateSet::from([seed]));
            assert_eq!(closure, StateSet::from([0, 1, 2]));
        }
    }

    #[test]
    fn closure_of_unknown_state_is_itself() {
        let nfa = Nfa::from_postfix_str("a").unwrap();
        assert_eq!(nfa.epsilon_closure(&StateSet::from([42])), StateSet::from([42]));
    }

    #[test]
    fn move_on_symbol_closes_result() {
        // 0 -a-> 1, 0 -a-> 2, 1 -ε-> 3
        let mut nfa = Nfa::empty();
        nfa.add_transition(0, Label::Symbol('a'), 1);
        nfa.add_transition(0, Label::Symbol('a'), 2);
        nfa.add_epsilon(1, 3);

        let reached = nfa.move_on_symbol(&StateSet::from([0]), 'a');
        assert_eq!(reached, StateSet::from([1, 2, 3]));
        assert!(nfa.move_on_symbol(&StateSet::from([0]), 'b').is_empty());
    }

    #[test]
    fn alphabet_is_sorted_and_skips_epsilon() {
        let nfa = Nfa::from_postfix_str("cb|a.*").unwrap();
        let alphabet: Vec<char> = nfa.alphabet().into_iter().collect();
        assert_eq!(alphabet, vec!['a', 'b', 'c']);
    }

    #[test]
    fn alphabet_uses_start_states() {
        // canonical start 0 reaches nothing; start state 2 reaches 'z'
        let mut nfa = Nfa::empty();
        nfa.add_state();
        nfa.add_transition(1, Label::Symbol('y'), 0);
        nfa.add_transition(2, Label::Symbol('z'), 1);
        nfa.add_start_state(2);

        let alphabet: Vec<char> = nfa.alphabet().into_iter().collect();
        assert_eq!(alphabet, vec!['y', 'z']);
    }
}
