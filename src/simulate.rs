//! Step-by-step simulation of a [`Dfa`] over an input string.

use tracing::trace;

use crate::dfa::Dfa;
use crate::nfa::StateId;
use crate::token::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepEvent {
    Start,
    /// `symbol` at `position` (0-based) was read and the DFA moved. Rendered
    /// as the 1-based step number, like [`StepEvent::DeadEnd`].
    Consumed { symbol: Symbol, position: usize },
    /// No transition for `symbol` at `position`; the run stops here.
    DeadEnd { symbol: Symbol, position: usize },
    Accepted,
    Rejected,
}

impl std::fmt::Display for StepEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StepEvent::Start => write!(f, "Start"),
            StepEvent::Consumed { symbol, position } => {
                write!(f, "Step {}: Symbol '{}'", position + 1, symbol)
            }
            StepEvent::DeadEnd { symbol, position } => write!(
                f,
                "Step {}: No transition for symbol '{}'",
                position + 1,
                symbol
            ),
            StepEvent::Accepted => write!(f, "Accepted"),
            StepEvent::Rejected => write!(f, "Rejected"),
        }
    }
}

/// One trace entry: the state the DFA is in after `event`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceStep {
    pub state: StateId,
    pub event: StepEvent,
}

impl TraceStep {
    pub fn description(&self) -> String {
        self.event.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Simulation {
    pub trace: Vec<TraceStep>,
    pub accepted: bool,
}

impl Simulation {
    pub fn into_parts(self) -> (Vec<TraceStep>, bool) {
        (self.trace, self.accepted)
    }

    /// Where the run stopped.
    pub fn final_state(&self) -> Option<StateId> {
        self.trace.last().map(|step| step.state)
    }
}

/// Run `dfa` over `input`, recording every step.
#[tracing::instrument(skip(dfa))]
pub fn simulate(dfa: &Dfa, input: &str) -> Simulation {
    let mut state = dfa.start();
    let mut trace = vec![TraceStep {
        state,
        event: StepEvent::Start,
    }];

    for (position, symbol) in input.chars().enumerate() {
        match dfa.next_state(state, symbol) {
            Some(next) => {
                trace!(from = state, to = next, %symbol, position, "consumed symbol");
                state = next;
                trace.push(TraceStep {
                    state,
                    event: StepEvent::Consumed { symbol, position },
                });
            }
            None => {
                trace!(state, %symbol, position, "dead end");
                trace.push(TraceStep {
                    state,
                    event: StepEvent::DeadEnd { symbol, position },
                });
                return Simulation {
                    trace,
                    accepted: false,
                };
            }
        }
    }

    let accepted = dfa.is_accepting(state);
    trace.push(TraceStep {
        state,
        event: if accepted {
            StepEvent::Accepted
        } else {
            StepEvent::Rejected
        },
    });
    Simulation { trace, accepted }
}

impl Dfa {
    pub fn simulate(&self, input: &str) -> Simulation {
        simulate(self, input)
    }
}
