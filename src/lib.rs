//! # Thompson_DFA
//!
//! `thompson_dfa` builds an NFA from a postfix regex with Thompson's
//! construction, determinizes it with the subset construction, minimizes the
//! result with Brzozowski's algorithm and simulates it step by step.
//!
//! ```
//! use thompson_dfa::{Dfa, Nfa};
//!
//! let nfa = Nfa::from_postfix_str("ab|").unwrap();
//! let dfa = Dfa::from_nfa(&nfa).minimize();
//! assert_eq!(dfa.num_states(), 2);
//!
//! let run = dfa.simulate("b");
//! assert!(run.accepted);
//! assert_eq!(run.trace.len(), 3);
//! ```

pub mod builder;
pub mod closure;
pub mod dfa;
pub mod error;
pub mod minimize;
pub mod nfa;
pub mod simulate;
pub mod token;

pub use builder::{Builder, Config};
pub use dfa::{Dfa, DfaState};
pub use error::{Error, Result};
pub use minimize::{minimize, minimize_all};
pub use nfa::{Label, Nfa, NfaState, StateId, StateSet};
pub use simulate::{simulate, Simulation, StepEvent, TraceStep};
pub use token::{tokenize_postfix, Symbol, Token};

#[cfg(feature = "python-bindings")]
mod python_bindings;
