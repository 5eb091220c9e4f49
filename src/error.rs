//! The Errors that may occur within the crate.

use thiserror::Error;

use crate::token::Token;

pub type Result<T, E = crate::Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    // Construction contract errors
    #[error("Postfix expression is empty")]
    EmptyPostfix,
    #[error("Operator {operator} at position {position} is missing an operand")]
    MissingOperand { operator: Token, position: usize },
    #[error("Postfix expression left {count} unconnected fragments")]
    DanglingFragments { count: usize },
    #[error("Invalid state: {0}")]
    InvalidState(u32),
    #[error("State {state} already has a transition on {symbol:?} to {existing}")]
    NonDeterministicTransition {
        state: u32,
        symbol: char,
        existing: u32,
    },
    #[error("Subset construction exceeded the limit of {0} states")]
    StateLimitExceeded(usize),
    // Structural errors in a decoded automaton
    #[error("State at index {index} carries id {id}")]
    MisnumberedState { index: usize, id: u32 },
    #[error("State {state} has a transition on {symbol:?} to missing state {target}")]
    DanglingTransition { state: u32, symbol: char, target: u32 },
    #[error("State {state} has a transition on {symbol:?} outside the alphabet")]
    SymbolOutsideAlphabet { state: u32, symbol: char },
    // Serialization errors
    #[error("Failed to encode automaton: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("Failed to decode automaton: {0}")]
    Decode(#[from] bincode::error::DecodeError),
}

impl Error {
    /// Whether the error stems from a malformed postfix token stream.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::EmptyPostfix | Self::MissingOperand { .. } | Self::DanglingFragments { .. }
        )
    }
}

#[cfg(feature = "python-bindings")]
impl From<Error> for pyo3::PyErr {
    fn from(e: Error) -> Self {
        use pyo3::exceptions::PyValueError;
        use pyo3::PyErr;
        PyErr::new::<PyValueError, _>(e.to_string())
    }
}
