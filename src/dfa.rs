//! Subset construction of a DFA from an [`Nfa`].

use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::convert::Infallible;

use bincode::{config, Decode, Encode};
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};
use tracing::{debug, trace};

use crate::nfa::{Nfa, StateId, StateSet};
use crate::token::Symbol;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct DfaState {
    id: StateId,
    nfa_states: StateSet,
    transitions: BTreeMap<Symbol, StateId>,
    accepting: bool,
}

impl DfaState {
    fn new(id: StateId, nfa_states: StateSet, accepting: bool) -> Self {
        Self {
            id,
            nfa_states,
            transitions: BTreeMap::new(),
            accepting,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    /// The epsilon-closed NFA states this state stands for. Empty for states
    /// added by hand.
    pub fn nfa_states(&self) -> &StateSet {
        &self.nfa_states
    }

    pub fn transitions(&self) -> &BTreeMap<Symbol, StateId> {
        &self.transitions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Dfa {
    start: StateId,
    states: Vec<DfaState>,
    alphabet: BTreeSet<Symbol>,
}

impl Dfa {
    /// A DFA holding a single non-accepting start state `0`.
    pub fn new() -> Self {
        Self {
            start: 0,
            states: vec![DfaState::new(0, StateSet::new(), false)],
            alphabet: BTreeSet::new(),
        }
    }

    /// Determinize `nfa` with the subset construction.
    #[tracing::instrument(skip_all, fields(nfa_states = nfa.num_states()))]
    pub fn from_nfa(nfa: &Nfa) -> Self {
        match subset_construction::<Infallible>(nfa, |_| Ok(())) {
            Ok(dfa) => dfa,
            Err(never) => match never {},
        }
    }

    /// Like [`Dfa::from_nfa`], failing once more than `limit` states exist.
    #[tracing::instrument(skip_all, fields(nfa_states = nfa.num_states(), limit = limit))]
    pub fn from_nfa_with_limit(nfa: &Nfa, limit: usize) -> Result<Self> {
        subset_construction(nfa, |count| {
            if count > limit {
                Err(Error::StateLimitExceeded(limit))
            } else {
                Ok(())
            }
        })
    }

    pub fn add_state(&mut self, accepting: bool) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(DfaState::new(id, StateSet::new(), accepting));
        id
    }

    pub fn set_start(&mut self, state: StateId) -> Result<()> {
        self.check_state(state)?;
        self.start = state;
        Ok(())
    }

    pub fn set_accepting(&mut self, state: StateId, accepting: bool) -> Result<()> {
        self.check_state(state)?;
        self.states[state as usize].accepting = accepting;
        Ok(())
    }

    /// Add `source -symbol-> target`. Re-adding the same edge is a no-op; a
    /// second target for the same symbol is rejected.
    pub fn add_transition(
        &mut self,
        source: StateId,
        symbol: Symbol,
        target: StateId,
    ) -> Result<()> {
        self.check_state(source)?;
        self.check_state(target)?;
        let transitions = &mut self.states[source as usize].transitions;
        match transitions.get(&symbol) {
            Some(&existing) if existing != target => Err(Error::NonDeterministicTransition {
                state: source,
                symbol,
                existing,
            }),
            _ => {
                transitions.insert(symbol, target);
                self.alphabet.insert(symbol);
                Ok(())
            }
        }
    }

    fn check_state(&self, state: StateId) -> Result<()> {
        if (state as usize) < self.states.len() {
            Ok(())
        } else {
            Err(Error::InvalidState(state))
        }
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn num_transitions(&self) -> usize {
        self.states.iter().map(|s| s.transitions.len()).sum()
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> Option<&DfaState> {
        self.states.get(id as usize)
    }

    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.state(id).is_some_and(DfaState::is_accepting)
    }

    pub fn accepting_states(&self) -> Vec<StateId> {
        self.states
            .iter()
            .filter(|s| s.accepting)
            .map(|s| s.id)
            .collect()
    }

    pub fn next_state(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        self.state(state)?.transitions.get(&symbol).copied()
    }

    /// States visited while reading `input` from the start, including the
    /// start itself. `None` as soon as a symbol has no transition.
    pub fn state_sequence(&self, input: &str) -> Option<Vec<StateId>> {
        let mut state = self.start;
        let mut seq = vec![state];
        for symbol in input.chars() {
            state = self.next_state(state, symbol)?;
            seq.push(state);
        }
        Some(seq)
    }

    pub fn accepts(&self, input: &str) -> bool {
        self.state_sequence(input)
            .and_then(|seq| seq.last().copied())
            .is_some_and(|last| self.is_accepting(last))
    }

    /// Structural check: ids match positions, the start exists, and every
    /// edge points at an existing state on an alphabet symbol.
    pub fn is_deterministic(&self) -> bool {
        self.validate().is_ok()
    }

    /// Like [`Dfa::is_deterministic`], naming the first offending state or edge.
    pub fn validate(&self) -> Result<()> {
        self.check_state(self.start)?;
        for (index, state) in self.states.iter().enumerate() {
            if state.id as usize != index {
                return Err(Error::MisnumberedState { index, id: state.id });
            }
            for (&symbol, &target) in &state.transitions {
                if !self.alphabet.contains(&symbol) {
                    return Err(Error::SymbolOutsideAlphabet {
                        state: state.id,
                        symbol,
                    });
                }
                if self.state(target).is_none() {
                    return Err(Error::DanglingTransition {
                        state: state.id,
                        symbol,
                        target,
                    });
                }
            }
        }
        Ok(())
    }

    /// Whether `other` has the same shape up to renaming of state ids.
    ///
    /// Both DFAs are walked breadth first from their starts, so states that
    /// are unreachable from the start make the comparison fail.
    pub fn is_isomorphic(&self, other: &Dfa) -> bool {
        if self.num_states() != other.num_states() || self.alphabet != other.alphabet {
            return false;
        }
        let mut mapping: HashMap<StateId, StateId> = HashMap::default();
        let mut reverse: HashMap<StateId, StateId> = HashMap::default();
        let mut queue = VecDeque::from([(self.start, other.start)]);
        mapping.insert(self.start, other.start);
        reverse.insert(other.start, self.start);

        while let Some((a, b)) = queue.pop_front() {
            let (Some(left), Some(right)) = (self.state(a), other.state(b)) else {
                return false;
            };
            if left.accepting != right.accepting
                || left.transitions.len() != right.transitions.len()
            {
                return false;
            }
            for (symbol, &next_left) in &left.transitions {
                let Some(&next_right) = right.transitions.get(symbol) else {
                    return false;
                };
                match (mapping.get(&next_left), reverse.get(&next_right)) {
                    (Some(&mapped), _) if mapped != next_right => return false,
                    (_, Some(&mapped)) if mapped != next_left => return false,
                    (Some(_), Some(_)) => {}
                    _ => {
                        mapping.insert(next_left, next_right);
                        reverse.insert(next_right, next_left);
                        queue.push_back((next_left, next_right));
                    }
                }
            }
        }
        mapping.len() == self.num_states()
    }

    pub fn to_binary(&self) -> Result<Vec<u8>> {
        Ok(bincode::encode_to_vec(self, config::standard())?)
    }

    pub fn from_binary(binary_data: &[u8]) -> Result<Self> {
        let (dfa, _): (Dfa, usize) = bincode::decode_from_slice(binary_data, config::standard())?;
        dfa.validate()?;
        Ok(dfa)
    }
}

impl Default for Dfa {
    fn default() -> Self {
        Self::new()
    }
}

/// Powerset construction. `admit` is called with the state count before each
/// new state is allocated and may abort the construction.
fn subset_construction<E>(
    nfa: &Nfa,
    mut admit: impl FnMut(usize) -> Result<(), E>,
) -> Result<Dfa, E> {
    let alphabet = nfa.alphabet();
    let initial = nfa.epsilon_closure(nfa.start_states());

    admit(1)?;
    let mut dfa = Dfa {
        start: 0,
        states: vec![DfaState::new(
            0,
            initial.clone(),
            nfa.contains_accepting(&initial),
        )],
        alphabet: alphabet.clone(),
    };
    let mut index: HashMap<StateSet, StateId> = HashMap::default();
    index.insert(initial, 0);
    let mut queue: VecDeque<StateId> = VecDeque::from([0]);
    let mut processed: HashSet<StateId> = HashSet::default();

    while let Some(current) = queue.pop_front() {
        if !processed.insert(current) {
            continue;
        }
        let current_set = dfa.states[current as usize].nfa_states.clone();
        for &symbol in &alphabet {
            let next_set = nfa.move_on_symbol(&current_set, symbol);
            if next_set.is_empty() {
                continue;
            }
            let next = match index.get(&next_set) {
                Some(&id) => id,
                None => {
                    admit(dfa.states.len() + 1)?;
                    let id = dfa.states.len() as StateId;
                    let accepting = nfa.contains_accepting(&next_set);
                    trace!(id, accepting, nfa_states = ?next_set, "allocated DFA state");
                    dfa.states.push(DfaState::new(id, next_set.clone(), accepting));
                    index.insert(next_set, id);
                    queue.push_back(id);
                    id
                }
            };
            dfa.states[current as usize].transitions.insert(symbol, next);
        }
    }
    debug!(
        states = dfa.num_states(),
        transitions = dfa.num_transitions(),
        "built DFA"
    );
    Ok(dfa)
}

impl std::fmt::Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "DFA starting at {} with transitions:", self.start)?;
        for state in &self.states {
            let marker = if state.accepting { " (accepting)" } else { "" };
            writeln!(f, "{:?}{} -> {:?}", state.id, marker, state.transitions)?;
        }
        Ok(())
    }
}
