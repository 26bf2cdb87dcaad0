use crate::dynamics::NetworkDynamics;

/// A configuration object for attractor indexing algorithms.
#[derive(Clone)]
pub struct IndexingConfig<N> {
    /// The network whose dynamics are explored.
    pub network: N,
    /// How many random seed states partial indexing explores (ignored by the
    /// exhaustive strategy, which always seeds every state).
    pub seed_count: usize,
    /// Bound on the number of states a single walk may visit before it is
    /// abandoned as "attractor not found" (partial strategy only; `None`
    /// lets every walk run to absorption).
    pub cutoff: Option<usize>,
    /// Probability that a node is active in a sampled seed state
    /// (default `0.5`).
    pub activation_probability: f64,
    /// Fixed seed for the sampling RNG; `None` draws one from the operating
    /// system. Mostly useful for reproducible runs.
    pub rng_seed: Option<u64>,
}

impl<N: NetworkDynamics> IndexingConfig<N> {
    /// Create a new instance of [`IndexingConfig`] for the given network.
    pub fn new(network: N) -> IndexingConfig<N> {
        IndexingConfig {
            network,
            seed_count: 0,
            cutoff: None,
            activation_probability: 0.5,
            rng_seed: None,
        }
    }

    /// Configure partial sampling: the number of random seeds to explore and
    /// the walk cutoff.
    pub fn with_sampling(mut self, seed_count: usize, cutoff: usize) -> IndexingConfig<N> {
        self.seed_count = seed_count;
        self.cutoff = Some(cutoff);
        self
    }

    /// Fix the RNG seed used for sampling.
    pub fn with_rng_seed(mut self, seed: u64) -> IndexingConfig<N> {
        self.rng_seed = Some(seed);
        self
    }
}

impl<N: NetworkDynamics> From<N> for IndexingConfig<N> {
    fn from(value: N) -> Self {
        IndexingConfig::new(value)
    }
}
