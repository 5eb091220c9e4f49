//! Thompson construction of an NFA from a postfix regex.

use std::collections::{BTreeMap, BTreeSet};

use bincode::{Decode, Encode};
use tracing::debug;

use crate::token::{tokenize_postfix, Symbol, Token};
use crate::{Error, Result};

pub type StateId = u32;
pub type StateSet = BTreeSet<StateId>;

/// Transition label. `Epsilon` orders before every symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Encode, Decode)]
pub enum Label {
    Epsilon,
    Symbol(Symbol),
}

impl std::fmt::Display for Label {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Label::Epsilon => write!(f, "ε"),
            Label::Symbol(c) => write!(f, "{}", c),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct NfaState {
    id: StateId,
    transitions: BTreeMap<Label, Vec<StateId>>,
    accepting: bool,
}

impl NfaState {
    fn new(id: StateId) -> Self {
        Self {
            id,
            transitions: BTreeMap::new(),
            accepting: false,
        }
    }

    pub fn id(&self) -> StateId {
        self.id
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn transitions(&self) -> &BTreeMap<Label, Vec<StateId>> {
        &self.transitions
    }

    /// Successors on `label`, in the order the edges were added.
    pub fn successors(&self, label: Label) -> &[StateId] {
        self.transitions
            .get(&label)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy)]
struct Fragment {
    start: StateId,
    end: StateId,
}

/// An NFA whose states live in an arena indexed by their id.
///
/// `start_states` holds the canonical start after Thompson construction and
/// every former accepting state after a DFA has been inverted.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Nfa {
    states: Vec<NfaState>,
    start: StateId,
    end: StateId,
    start_states: StateSet,
}

impl Nfa {
    pub(crate) fn empty() -> Self {
        Self {
            states: Vec::new(),
            start: 0,
            end: 0,
            start_states: StateSet::new(),
        }
    }

    /// Build an NFA from postfix tokens with Thompson's construction.
    #[tracing::instrument(skip_all, fields(tokens = postfix.len()))]
    pub fn from_postfix(postfix: &[Token]) -> Result<Self> {
        if postfix.is_empty() {
            return Err(Error::EmptyPostfix);
        }
        let mut nfa = Nfa::empty();
        let mut stack: Vec<Fragment> = Vec::with_capacity(postfix.len());

        for (position, &token) in postfix.iter().enumerate() {
            let fragment = match token {
                Token::Literal(c) => {
                    let start = nfa.add_state();
                    let end = nfa.add_state();
                    nfa.add_transition(start, Label::Symbol(c), end);
                    Fragment { start, end }
                }
                Token::Concat => {
                    let b = pop_operand(&mut stack, token, position)?;
                    let a = pop_operand(&mut stack, token, position)?;
                    nfa.add_epsilon(a.end, b.start);
                    Fragment {
                        start: a.start,
                        end: b.end,
                    }
                }
                Token::Alternate => {
                    let b = pop_operand(&mut stack, token, position)?;
                    let a = pop_operand(&mut stack, token, position)?;
                    let start = nfa.add_state();
                    let end = nfa.add_state();
                    nfa.add_epsilon(start, a.start);
                    nfa.add_epsilon(start, b.start);
                    nfa.add_epsilon(a.end, end);
                    nfa.add_epsilon(b.end, end);
                    Fragment { start, end }
                }
                Token::Optional => {
                    let inner = pop_operand(&mut stack, token, position)?;
                    let start = nfa.add_state();
                    let end = nfa.add_state();
                    nfa.add_epsilon(start, inner.start);
                    nfa.add_epsilon(start, end);
                    nfa.add_epsilon(inner.end, end);
                    Fragment { start, end }
                }
                Token::Star => {
                    let inner = pop_operand(&mut stack, token, position)?;
                    let start = nfa.add_state();
                    let end = nfa.add_state();
                    nfa.add_epsilon(start, inner.start);
                    nfa.add_epsilon(start, end);
                    nfa.add_epsilon(inner.end, inner.start);
                    nfa.add_epsilon(inner.end, end);
                    Fragment { start, end }
                }
                Token::Plus => {
                    let inner = pop_operand(&mut stack, token, position)?;
                    let start = nfa.add_state();
                    let end = nfa.add_state();
                    nfa.add_epsilon(start, inner.start);
                    nfa.add_epsilon(inner.end, inner.start);
                    nfa.add_epsilon(inner.end, end);
                    Fragment { start, end }
                }
            };
            stack.push(fragment);
        }

        let fragment = match stack.as_slice() {
            [fragment] => *fragment,
            _ => return Err(Error::DanglingFragments { count: stack.len() }),
        };
        nfa.start = fragment.start;
        nfa.end = fragment.end;
        nfa.start_states.insert(fragment.start);
        nfa.set_accepting(fragment.end);
        debug!(
            states = nfa.num_states(),
            start = nfa.start,
            end = nfa.end,
            "built NFA"
        );
        Ok(nfa)
    }

    /// Tokenize `postfix` one character per token and build the NFA.
    pub fn from_postfix_str(postfix: &str) -> Result<Self> {
        Self::from_postfix(&tokenize_postfix(postfix))
    }

    pub(crate) fn add_state(&mut self) -> StateId {
        let id = self.states.len() as StateId;
        self.states.push(NfaState::new(id));
        id
    }

    /// Grow the arena so that `state` exists.
    pub(crate) fn ensure_state(&mut self, state: StateId) {
        while self.states.len() <= state as usize {
            self.add_state();
        }
    }

    pub(crate) fn add_transition(&mut self, source: StateId, label: Label, target: StateId) {
        self.ensure_state(source);
        self.ensure_state(target);
        self.states[source as usize]
            .transitions
            .entry(label)
            .or_default()
            .push(target);
    }

    pub(crate) fn add_epsilon(&mut self, source: StateId, target: StateId) {
        self.add_transition(source, Label::Epsilon, target);
    }

    pub(crate) fn set_accepting(&mut self, state: StateId) {
        self.ensure_state(state);
        self.states[state as usize].accepting = true;
    }

    pub(crate) fn set_start(&mut self, state: StateId) {
        self.ensure_state(state);
        self.start = state;
    }

    pub(crate) fn set_end(&mut self, state: StateId) {
        self.ensure_state(state);
        self.end = state;
    }

    pub(crate) fn add_start_state(&mut self, state: StateId) {
        self.ensure_state(state);
        self.start_states.insert(state);
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn end(&self) -> StateId {
        self.end
    }

    pub fn start_states(&self) -> &StateSet {
        &self.start_states
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> Option<&NfaState> {
        self.states.get(id as usize)
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.state(id).is_some_and(NfaState::is_accepting)
    }

    /// Whether any state of `states` is accepting.
    pub fn contains_accepting(&self, states: &StateSet) -> bool {
        states.iter().any(|&id| self.is_accepting(id))
    }
}

fn pop_operand(stack: &mut Vec<Fragment>, operator: Token, position: usize) -> Result<Fragment> {
    stack
        .pop()
        .ok_or(Error::MissingOperand { operator, position })
}

impl std::fmt::Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "NFA with start {} and end {}, start states {:?}:",
            self.start, self.end, self.start_states
        )?;
        for state in &self.states {
            for (label, targets) in &state.transitions {
                writeln!(f, "{} -{}-> {:?}", state.id, label, targets)?;
            }
        }
        Ok(())
    }
}
