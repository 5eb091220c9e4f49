//! Configurable pipeline from postfix tokens to a (minimal) DFA.
//!
//! ```
//! use thompson_dfa::Dfa;
//!
//! let dfa = Dfa::builder()
//!     .configure(Dfa::config().minimize(true))
//!     .build_postfix("ab.*")
//!     .unwrap();
//! assert_eq!(dfa.num_states(), 2);
//! assert!(dfa.accepts("abab"));
//! ```

use crate::dfa::Dfa;
use crate::nfa::Nfa;
use crate::token::{tokenize_postfix, Token};
use crate::Result;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Config {
    minimize: bool,
    state_limit: Option<usize>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run Brzozowski minimization after the subset construction.
    pub fn minimize(mut self, yes: bool) -> Self {
        self.minimize = yes;
        self
    }

    /// Abort the subset construction once it needs more than `limit` states.
    /// The limit applies to every determinization pass, including the ones
    /// run by the minimizer.
    pub fn state_limit(mut self, limit: Option<usize>) -> Self {
        self.state_limit = limit;
        self
    }

    pub fn get_minimize(&self) -> bool {
        self.minimize
    }

    pub fn get_state_limit(&self) -> Option<usize> {
        self.state_limit
    }
}

#[derive(Debug, Clone, Default)]
pub struct Builder {
    config: Config,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn configure(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    pub fn build_postfix(&self, postfix: &str) -> Result<Dfa> {
        self.build_from_tokens(&tokenize_postfix(postfix))
    }

    pub fn build_from_tokens(&self, postfix: &[Token]) -> Result<Dfa> {
        self.build_from_nfa(&Nfa::from_postfix(postfix)?)
    }

    #[tracing::instrument(skip_all, fields(config = ?self.config))]
    pub fn build_from_nfa(&self, nfa: &Nfa) -> Result<Dfa> {
        let dfa = self.determinize(nfa)?;
        if !self.config.minimize {
            return Ok(dfa);
        }
        let reversed = self.determinize(&crate::minimize::invert(&dfa))?;
        self.determinize(&crate::minimize::invert(&reversed))
    }

    fn determinize(&self, nfa: &Nfa) -> Result<Dfa> {
        match self.config.state_limit {
            Some(limit) => Dfa::from_nfa_with_limit(nfa, limit),
            None => Ok(Dfa::from_nfa(nfa)),
        }
    }
}

impl Dfa {
    pub fn builder() -> Builder {
        Builder::new()
    }

    pub fn config() -> Config {
        Config::new()
    }
}
