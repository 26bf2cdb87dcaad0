//! Explicit-state attractor discovery for Boolean networks.
//!
//! This module builds an [`AttractorIndex`]: a memoized map from network
//! states to the attractor they eventually fall into, together with the
//! per-attractor cycle metadata (cycle length, longest proven transient,
//! oscillation ratio) that downstream analyses need.
//!
//! # Strategies
//!
//! - [`ExhaustiveIndexing`]: walks every one of the `2^n` states once, with
//!   dense `O(1)` memo tables. Exact, but only feasible for small networks.
//! - [`PartialIndexing`]: walks a configured number of random seed states,
//!   with hash-based memo tables and a cutoff on walk length. Walks that
//!   exceed the cutoff are counted as "not found" and their seed is dropped;
//!   this is a sampling artifact, not an error.
//!
//! Both strategies share the same absorption rule: a walk either closes on
//! itself (a new attractor is born from the cycle suffix) or runs into an
//! already indexed state (the walk is absorbed into that attractor and its
//! transient bound is raised if the walk proves a longer path).
//!
//! # Example
//!
//! ```rust
//! use biodivine_algo_bn_atm::attractor::{ExhaustiveIndexing, ExhaustiveState, IndexingConfig};
//! use biodivine_algo_bn_atm::dynamics::{FnDynamics, State};
//! use computation_process::{Computable, Stateful};
//!
//! // A three-node network where every state decays towards 000.
//! let network = FnDynamics::new(3, |state: &State| {
//!     State::from_index(state.index().saturating_sub(1), 3)
//! });
//!
//! let config = IndexingConfig::new(network);
//! let initial = ExhaustiveState::from(&config);
//! let mut search = ExhaustiveIndexing::configure(config, initial);
//! let index = search.compute().unwrap();
//!
//! assert_eq!(index.attractor_count(), 1);
//! assert_eq!(index.basin_sizes(), vec![8]);
//! ```

mod exhaustive;
mod index;
mod indexing_config;
mod partial;


use computation_process::Computation;
pub use exhaustive::{ExhaustiveState, ExhaustiveStep};
pub use index::{Attractor, AttractorId, AttractorIndex, AttractorNotFound};
pub use indexing_config::IndexingConfig;
pub use partial::{PartialState, PartialStep};

/// Index the whole state space of a network (all `2^n` seed states).
pub type ExhaustiveIndexing<N> =
    Computation<IndexingConfig<N>, ExhaustiveState, AttractorIndex, ExhaustiveStep>;

/// Index a network from randomly sampled seed states with a walk cutoff.
pub type PartialIndexing<N> =
    Computation<IndexingConfig<N>, PartialState, AttractorIndex, PartialStep>;
