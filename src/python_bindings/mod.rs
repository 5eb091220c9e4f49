//! Provides tools and interfaces to integrate the crate's functionality with Python.

use std::sync::Arc;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyDict;
use rustc_hash::FxHashMap as HashMap;

use crate::dfa::Dfa;
use crate::minimize::minimize_all;
use crate::nfa::StateId;

#[pyclass(name = "PostfixDFA", module = "thompson_dfa.thompson_dfa_rs")]
#[derive(Clone, Debug, PartialEq)]
pub struct PyPostfixDFA(Arc<Dfa>);

#[pymethods]
impl PyPostfixDFA {
    #[new]
    #[pyo3(signature = (postfix, minimize = true))]
    fn __new__(py: Python<'_>, postfix: &str, minimize: bool) -> PyResult<Self> {
        py.allow_threads(|| {
            Dfa::builder()
                .configure(Dfa::config().minimize(minimize))
                .build_postfix(postfix)
                .map(|x| PyPostfixDFA(Arc::new(x)))
                .map_err(Into::into)
        })
    }

    fn minimize(&self, py: Python<'_>) -> Self {
        py.allow_threads(|| PyPostfixDFA(Arc::new(self.0.minimize())))
    }

    fn get_initial_state(&self) -> StateId {
        self.0.start()
    }

    fn is_final_state(&self, state: StateId) -> bool {
        self.0.is_accepting(state)
    }

    fn get_final_states(&self) -> Vec<StateId> {
        self.0.accepting_states()
    }

    fn get_alphabet(&self) -> Vec<char> {
        self.0.alphabet().iter().copied().collect()
    }

    fn get_transitions(&self) -> HashMap<StateId, HashMap<char, StateId>> {
        self.0
            .states()
            .iter()
            .map(|s| (s.id(), s.transitions().iter().map(|(&c, &t)| (c, t)).collect()))
            .collect()
    }

    fn get_next_state(&self, state: StateId, symbol: char) -> Option<StateId> {
        self.0.next_state(state, symbol)
    }

    fn get_state_sequence(&self, input: &str) -> Option<Vec<StateId>> {
        self.0.state_sequence(input)
    }

    fn accepts(&self, input: &str) -> bool {
        self.0.accepts(input)
    }

    /// Returns `([(state, description), ...], accepted)`.
    fn simulate(&self, input: &str) -> (Vec<(StateId, String)>, bool) {
        let (trace, accepted) = self.0.simulate(input).into_parts();
        let steps = trace
            .iter()
            .map(|step| (step.state, step.description()))
            .collect();
        (steps, accepted)
    }

    fn __repr__(&self) -> String {
        format!("{:#?}", self.0)
    }

    fn __str__(&self) -> String {
        format!("{}", self.0)
    }

    fn __eq__(&self, other: &PyPostfixDFA) -> bool {
        *self.0 == *other.0
    }

    fn __deepcopy__(&self, _py: Python<'_>, _memo: Py<PyDict>) -> Self {
        PyPostfixDFA(Arc::new((*self.0).clone()))
    }

    fn __reduce__(&self) -> PyResult<(PyObject, (Vec<u8>,))> {
        Python::with_gil(|py| {
            let cls = PyModule::import(py, "thompson_dfa.thompson_dfa_rs")?.getattr("PostfixDFA")?;
            let binary_data: Vec<u8> = self.0.to_binary().map_err(|e| {
                PyErr::new::<PyValueError, _>(format!("Serialization of PostfixDFA failed: {}", e))
            })?;
            Ok((cls.getattr("from_binary")?.unbind(), (binary_data,)))
        })
    }

    #[staticmethod]
    fn from_binary(binary_data: Vec<u8>) -> PyResult<Self> {
        let dfa = Dfa::from_binary(&binary_data[..]).map_err(|e| {
            PyErr::new::<PyValueError, _>(format!("Deserialization of PostfixDFA failed: {}", e))
        })?;
        Ok(PyPostfixDFA(Arc::new(dfa)))
    }
}

/// Minimize several DFAs on the rayon pool.
#[pyfunction(name = "minimize_all")]
fn py_minimize_all(py: Python<'_>, dfas: Vec<PyPostfixDFA>) -> Vec<PyPostfixDFA> {
    py.allow_threads(|| {
        let owned: Vec<Dfa> = dfas.iter().map(|d| (*d.0).clone()).collect();
        minimize_all(&owned)
            .into_iter()
            .map(|d| PyPostfixDFA(Arc::new(d)))
            .collect()
    })
}

#[pymodule]
fn thompson_dfa_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<PyPostfixDFA>()?;
    m.add_function(wrap_pyfunction!(py_minimize_all, m)?)?;

    Ok(())
}
