use crate::dynamics::{NetworkDynamics, Perturbation};

/// A configuration object for attractor transition matrix construction.
#[derive(Clone)]
pub struct AtmConfig<N, P> {
    /// The network whose attractors are being perturbed.
    pub network: N,
    /// The perturbation oracle applied to sampled member states.
    pub perturbation: P,
    /// How many independent perturbation trials run for every selected
    /// source state (default `1`).
    pub experiments_per_state: usize,
    /// The fraction of each attractor's member states used as perturbation
    /// sources. Values outside `[0, 1]` are clamped; at least one member
    /// state is always selected per attractor.
    pub states_ratio: f64,
}

impl<N: NetworkDynamics, P: Perturbation<N>> AtmConfig<N, P> {
    /// Create a new instance of [`AtmConfig`] that perturbs every member
    /// state once.
    pub fn new(network: N, perturbation: P) -> AtmConfig<N, P> {
        AtmConfig {
            network,
            perturbation,
            experiments_per_state: 1,
            states_ratio: 1.0,
        }
    }

    /// Set the number of perturbation trials per source state.
    pub fn with_experiments(mut self, experiments_per_state: usize) -> AtmConfig<N, P> {
        self.experiments_per_state = experiments_per_state;
        self
    }

    /// Set the fraction of member states perturbed per attractor.
    pub fn with_states_ratio(mut self, states_ratio: f64) -> AtmConfig<N, P> {
        self.states_ratio = states_ratio;
        self
    }

    /// The configured ratio clamped into `[0, 1]`.
    pub fn clamped_ratio(&self) -> f64 {
        self.states_ratio.clamp(0.0, 1.0)
    }
}
