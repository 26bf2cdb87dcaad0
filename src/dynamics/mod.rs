//! The [`State`] value type and the oracle traits that connect the algorithms
//! in this crate to an actual Boolean network.
//!
//! The crate never evaluates update functions itself. A network is anything
//! implementing [`NetworkDynamics`], i.e. a total, deterministic successor
//! function over fixed-length Boolean states. Perturbation experiments are
//! similarly abstracted behind [`Perturbation`]: the algorithms only observe
//! the state before and after a perturbation, never how it was produced.
//!
//! [`FnDynamics`] adapts a plain closure into a network, which is convenient
//! for examples and small hand-written systems:
//!
//! ```rust
//! use biodivine_algo_bn_atm::dynamics::{FnDynamics, NetworkDynamics, State};
//!
//! // A two-node network where every state decays towards 00.
//! let network = FnDynamics::new(2, |state: &State| {
//!     State::from_index(state.index().saturating_sub(1), 2)
//! });
//!
//! let state = State::from_index(3, 2);
//! assert_eq!(network.step(&state), State::from_index(2, 2));
//! ```

use rand::Rng;
use rand::rngs::StdRng;
use std::fmt::{Display, Formatter};

/// A fixed-length Boolean state of a network.
///
/// States are immutable values: algorithms clone them freely and never share
/// ownership. Node `0` is the most significant bit of the integer encoding,
/// so a three-node state `110` has [`State::index`] `6`.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct State {
    bits: Vec<bool>,
}

impl State {
    /// Create a state from explicit node values.
    pub fn new(bits: Vec<bool>) -> State {
        State { bits }
    }

    /// A state of the given length with every node inactive.
    pub fn zeroes(len: usize) -> State {
        State {
            bits: vec![false; len],
        }
    }

    /// Decode a state from its integer encoding (node `0` is the most
    /// significant bit).
    pub fn from_index(index: usize, len: usize) -> State {
        let mut bits = vec![false; len];
        for (node, bit) in bits.iter_mut().enumerate() {
            *bit = (index >> (len - 1 - node)) & 1 == 1;
        }
        State { bits }
    }

    /// Sample a state where every node is independently active with
    /// probability `activation_probability`.
    pub fn random(len: usize, activation_probability: f64, rng: &mut StdRng) -> State {
        let bits = (0..len)
            .map(|_| rng.random_bool(activation_probability))
            .collect();
        State { bits }
    }

    /// The number of nodes in the state.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True if the state has no nodes.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// The value of the given node.
    pub fn get(&self, node: usize) -> bool {
        self.bits[node]
    }

    /// Overwrite the value of the given node.
    pub fn set(&mut self, node: usize, value: bool) {
        self.bits[node] = value;
    }

    /// Negate the value of the given node.
    pub fn flip(&mut self, node: usize) {
        self.bits[node] = !self.bits[node];
    }

    /// All node values, node `0` first.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// The integer encoding of the state (node `0` is the most significant
    /// bit). Only meaningful while the state fits into a machine word.
    pub fn index(&self) -> usize {
        debug_assert!(self.bits.len() < usize::BITS as usize);
        self.bits
            .iter()
            .fold(0usize, |acc, &bit| (acc << 1) | usize::from(bit))
    }
}

impl Display for State {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for &bit in &self.bits {
            write!(f, "{}", if bit { '1' } else { '0' })?;
        }
        Ok(())
    }
}

/// The dynamics oracle: a total, deterministic successor function over the
/// states of a fixed-size network.
pub trait NetworkDynamics {
    /// The number of nodes every well-formed state of this network has.
    fn node_count(&self) -> usize;

    /// The successor of the given state.
    fn step(&self, state: &State) -> State;
}

impl<N: NetworkDynamics> NetworkDynamics for &N {
    fn node_count(&self) -> usize {
        N::node_count(self)
    }

    fn step(&self, state: &State) -> State {
        N::step(self, state)
    }
}

/// The perturbation oracle: produce a new state from `state` by some
/// domain-specific intervention (typically an edit followed by a number of
/// free-running dynamics steps).
///
/// Implementations must be deterministic given the random stream drawn from
/// `rng`; the algorithms in this crate never inspect what the perturbation
/// did beyond the returned state.
pub trait Perturbation<N: NetworkDynamics> {
    /// Perturb `state` and let the network relax, returning the final state.
    fn perturb(&self, network: &N, state: &State, rng: &mut StdRng) -> State;
}

/// A [`NetworkDynamics`] implementation backed by a plain closure.
#[derive(Clone)]
pub struct FnDynamics<F> {
    nodes: usize,
    update: F,
}

impl<F> FnDynamics<F>
where
    F: Fn(&State) -> State,
{
    /// Wrap `update` as the successor function of a network with `nodes`
    /// nodes.
    pub fn new(nodes: usize, update: F) -> FnDynamics<F> {
        FnDynamics { nodes, update }
    }
}

impl<F> NetworkDynamics for FnDynamics<F>
where
    F: Fn(&State) -> State,
{
    fn node_count(&self) -> usize {
        self.nodes
    }

    fn step(&self, state: &State) -> State {
        (self.update)(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_integer_round_trip() {
        for index in 0..16usize {
            let state = State::from_index(index, 4);
            assert_eq!(state.index(), index);
        }
    }

    #[test]
    fn state_displays_as_binary_string() {
        let state = State::from_index(6, 3);
        assert_eq!(state.to_string(), "110");
        assert!(state.get(0));
        assert!(state.get(1));
        assert!(!state.get(2));
    }

    #[test]
    fn state_edits() {
        let mut state = State::zeroes(3);
        state.set(1, true);
        assert_eq!(state.to_string(), "010");
        state.flip(1);
        state.flip(2);
        assert_eq!(state.to_string(), "001");
    }

    #[test]
    fn fn_dynamics_applies_closure() {
        let network = FnDynamics::new(3, |state: &State| {
            State::from_index((state.index() + 1) % 8, 3)
        });
        assert_eq!(network.node_count(), 3);
        let successor = network.step(&State::from_index(7, 3));
        assert_eq!(successor, State::from_index(0, 3));
    }
}
