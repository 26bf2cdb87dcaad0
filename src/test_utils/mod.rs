//! Small deterministic networks and perturbations for tests, described by
//! explicit transition tables instead of update functions.

use crate::dynamics::{NetworkDynamics, Perturbation, State};
use rand::rngs::StdRng;

/// Initialize env_logger for tests. Safe to call multiple times.
pub fn init_logger() {
    let _ = env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Trace)
        .is_test(true)
        .try_init();
}

/// A network whose successor function is an explicit lookup table over state
/// indices (`successor[s]` is the integer encoding of the successor of `s`).
#[derive(Clone)]
pub struct TableNetwork {
    nodes: usize,
    successor: Vec<usize>,
}

impl TableNetwork {
    /// Create a network from a full successor table; the table must have one
    /// entry per state.
    pub fn new(nodes: usize, successor: Vec<usize>) -> TableNetwork {
        assert_eq!(successor.len(), 1 << nodes);
        TableNetwork { nodes, successor }
    }

    /// Create a network from explicit `(from, to)` transitions; states not
    /// mentioned are fixed points.
    pub fn from_transitions(nodes: usize, transitions: &[(usize, usize)]) -> TableNetwork {
        let mut successor: Vec<usize> = (0..1usize << nodes).collect();
        for &(from, to) in transitions {
            successor[from] = to;
        }
        TableNetwork { nodes, successor }
    }
}

impl NetworkDynamics for TableNetwork {
    fn node_count(&self) -> usize {
        self.nodes
    }

    fn step(&self, state: &State) -> State {
        State::from_index(self.successor[state.index()], self.nodes)
    }
}

/// A deterministic perturbation that maps state indices through an explicit
/// table, ignoring the RNG entirely. States not mentioned stay unchanged.
#[derive(Clone)]
pub struct TablePerturbation {
    nodes: usize,
    target: Vec<usize>,
}

impl TablePerturbation {
    /// Create a perturbation from explicit `(from, to)` pairs.
    pub fn from_pairs(nodes: usize, pairs: &[(usize, usize)]) -> TablePerturbation {
        let mut target: Vec<usize> = (0..1usize << nodes).collect();
        for &(from, to) in pairs {
            target[from] = to;
        }
        TablePerturbation { nodes, target }
    }
}

impl<N: NetworkDynamics> Perturbation<N> for TablePerturbation {
    fn perturb(&self, _network: &N, state: &State, _rng: &mut StdRng) -> State {
        State::from_index(self.target[state.index()], self.nodes)
    }
}

/// A three-node network with a fixed point `000` and a two-state cycle
/// `{110, 111}`:
///
/// ```text
/// 011 → 001 → 000 ↺        100 → 110 ⇄ 111
///       010 → 000           101 → 111
/// ```
pub fn two_attractor_network() -> TableNetwork {
    TableNetwork::from_transitions(
        3,
        &[
            (0b000, 0b000),
            (0b001, 0b000),
            (0b010, 0b000),
            (0b011, 0b001),
            (0b100, 0b110),
            (0b101, 0b111),
            (0b110, 0b111),
            (0b111, 0b110),
        ],
    )
}
