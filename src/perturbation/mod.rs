//! Ready-made perturbation operators.
//!
//! Each operator picks a random set of target nodes, applies its edit to the
//! current state, lets the network advance one step, and repeats this for a
//! number of steps drawn uniformly from its duration range. The returned
//! state is whatever the network reached when the perturbation wore off; the
//! caller then resolves which attractor that state belongs to.
//!
//! - [`FlipPerturbation`]: negates the target nodes at every perturbed step.
//! - [`ReassignPerturbation`]: overwrites the target nodes with freshly drawn
//!   random values (held fixed for the whole perturbation).
//! - [`KnockPerturbation`]: forces one set of nodes active (knock-in) and a
//!   disjoint set inactive (knock-out), each for its own duration.

use crate::dynamics::{NetworkDynamics, Perturbation, State};
use rand::Rng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Draw a random subset of `amount` node indices out of `node_count`.
fn random_nodes(node_count: usize, amount: usize, rng: &mut StdRng) -> Vec<usize> {
    let mut nodes: Vec<usize> = (0..node_count).collect();
    nodes.shuffle(rng);
    nodes.truncate(amount.min(node_count));
    nodes
}

/// Negate a random subset of nodes at every perturbed step.
#[derive(Clone, Debug)]
pub struct FlipPerturbation {
    /// How many nodes are flipped.
    pub nodes_to_perturb: usize,
    /// Minimum number of perturbed steps.
    pub min_duration: usize,
    /// Maximum number of perturbed steps.
    pub max_duration: usize,
}

impl FlipPerturbation {
    /// Flip `nodes_to_perturb` random nodes for exactly one step.
    pub fn new(nodes_to_perturb: usize) -> FlipPerturbation {
        FlipPerturbation {
            nodes_to_perturb,
            min_duration: 1,
            max_duration: 1,
        }
    }

    /// Set the duration range (swapped if given in the wrong order).
    pub fn with_duration(mut self, min: usize, max: usize) -> FlipPerturbation {
        (self.min_duration, self.max_duration) = if min <= max { (min, max) } else { (max, min) };
        self
    }
}

impl<N: NetworkDynamics> Perturbation<N> for FlipPerturbation {
    fn perturb(&self, network: &N, state: &State, rng: &mut StdRng) -> State {
        let times = rng.random_range(self.min_duration..=self.max_duration);
        let targets = random_nodes(network.node_count(), self.nodes_to_perturb, rng);
        let mut current = state.clone();
        for _ in 0..times {
            for &node in &targets {
                current.flip(node);
            }
            current = network.step(&current);
        }
        current
    }
}

/// Overwrite a random subset of nodes with random values at every perturbed
/// step. The values are drawn once per perturbation and held fixed.
#[derive(Clone, Debug)]
pub struct ReassignPerturbation {
    /// How many nodes are overwritten.
    pub nodes_to_perturb: usize,
    /// Minimum number of perturbed steps.
    pub min_duration: usize,
    /// Maximum number of perturbed steps.
    pub max_duration: usize,
}

impl ReassignPerturbation {
    /// Overwrite `nodes_to_perturb` random nodes for exactly one step.
    pub fn new(nodes_to_perturb: usize) -> ReassignPerturbation {
        ReassignPerturbation {
            nodes_to_perturb,
            min_duration: 1,
            max_duration: 1,
        }
    }

    /// Set the duration range (swapped if given in the wrong order).
    pub fn with_duration(mut self, min: usize, max: usize) -> ReassignPerturbation {
        (self.min_duration, self.max_duration) = if min <= max { (min, max) } else { (max, min) };
        self
    }
}

impl<N: NetworkDynamics> Perturbation<N> for ReassignPerturbation {
    fn perturb(&self, network: &N, state: &State, rng: &mut StdRng) -> State {
        let times = rng.random_range(self.min_duration..=self.max_duration);
        let targets = random_nodes(network.node_count(), self.nodes_to_perturb, rng);
        let values: Vec<bool> = targets.iter().map(|_| rng.random_bool(0.5)).collect();
        let mut current = state.clone();
        for _ in 0..times {
            for (&node, &value) in targets.iter().zip(&values) {
                current.set(node, value);
            }
            current = network.step(&current);
        }
        current
    }
}

/// Force random disjoint node sets active (knock-in) and inactive
/// (knock-out), each for its own duration; the dynamics run until the longer
/// of the two durations has passed.
#[derive(Clone, Debug)]
pub struct KnockPerturbation {
    /// How many nodes are forced active.
    pub knock_in_nodes: usize,
    /// How many nodes are forced inactive.
    pub knock_out_nodes: usize,
    /// Duration range of the knock-in, in steps.
    pub min_knock_in_duration: usize,
    /// Duration range of the knock-in, in steps.
    pub max_knock_in_duration: usize,
    /// Duration range of the knock-out, in steps.
    pub min_knock_out_duration: usize,
    /// Duration range of the knock-out, in steps.
    pub max_knock_out_duration: usize,
}

impl KnockPerturbation {
    /// Knock `knock_in_nodes` in and `knock_out_nodes` out for exactly one
    /// step each.
    pub fn new(knock_in_nodes: usize, knock_out_nodes: usize) -> KnockPerturbation {
        KnockPerturbation {
            knock_in_nodes,
            knock_out_nodes,
            min_knock_in_duration: 1,
            max_knock_in_duration: 1,
            min_knock_out_duration: 1,
            max_knock_out_duration: 1,
        }
    }

    /// Set the knock-in duration range (swapped if given in the wrong order).
    pub fn with_knock_in_duration(mut self, min: usize, max: usize) -> KnockPerturbation {
        (self.min_knock_in_duration, self.max_knock_in_duration) =
            if min <= max { (min, max) } else { (max, min) };
        self
    }

    /// Set the knock-out duration range (swapped if given in the wrong
    /// order).
    pub fn with_knock_out_duration(mut self, min: usize, max: usize) -> KnockPerturbation {
        (self.min_knock_out_duration, self.max_knock_out_duration) =
            if min <= max { (min, max) } else { (max, min) };
        self
    }
}

impl<N: NetworkDynamics> Perturbation<N> for KnockPerturbation {
    fn perturb(&self, network: &N, state: &State, rng: &mut StdRng) -> State {
        let knock_in_times = rng.random_range(self.min_knock_in_duration..=self.max_knock_in_duration);
        let knock_out_times =
            rng.random_range(self.min_knock_out_duration..=self.max_knock_out_duration);
        let targets = random_nodes(
            network.node_count(),
            self.knock_in_nodes + self.knock_out_nodes,
            rng,
        );
        let (knock_in, knock_out) = targets.split_at(self.knock_in_nodes.min(targets.len()));

        let mut current = state.clone();
        for time in 0..knock_in_times.max(knock_out_times) {
            if time < knock_in_times {
                for &node in knock_in {
                    current.set(node, true);
                }
            }
            if time < knock_out_times {
                for &node in knock_out {
                    current.set(node, false);
                }
            }
            current = network.step(&current);
        }
        current
    }
}
