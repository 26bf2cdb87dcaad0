//! Construction of attractor transition matrices (ATMs).
//!
//! An ATM records, for every known attractor, where the system relaxes to
//! after a perturbation of one of the attractor's member states. Counts are
//! accumulated by repeated perturbation experiments and finally normalized
//! into per-row probability distributions ([`Atm`]); rows without any
//! observed hit become the uniform distribution.
//!
//! The matrix grows while it is being built: whenever a perturbation lands in
//! a previously unseen attractor, the count matrix is extended by a zero row
//! and column ([`AtmCounts::grow_by_one`]) and the new attractor's own member
//! states are scheduled for perturbation as well.
//!
//! # Example
//!
//! ```rust
//! use biodivine_algo_bn_atm::atm::{AtmComputation, AtmConfig, AtmState};
//! use biodivine_algo_bn_atm::attractor::{ExhaustiveIndexing, ExhaustiveState, IndexingConfig};
//! use biodivine_algo_bn_atm::dynamics::{FnDynamics, State};
//! use biodivine_algo_bn_atm::perturbation::FlipPerturbation;
//! use computation_process::{Computable, Stateful};
//!
//! let network = FnDynamics::new(3, |state: &State| {
//!     State::from_index(state.index().saturating_sub(1), 3)
//! });
//!
//! // Index the attractors first.
//! let config = IndexingConfig::new(network.clone());
//! let initial = ExhaustiveState::from(&config);
//! let index = ExhaustiveIndexing::configure(config, initial)
//!     .compute()
//!     .unwrap();
//!
//! // Then accumulate perturbation statistics on top of the index.
//! let config = AtmConfig::new(network, FlipPerturbation::new(1)).with_experiments(10);
//! let mut build = AtmComputation::configure(config, AtmState::with_rng_seed(index, 1));
//! let atm = build.compute().unwrap();
//!
//! for row in atm.probabilities() {
//!     assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! }
//! ```

mod atm_config;
mod builder;
mod matrix;

#[cfg(test)]
mod tests;

pub use atm_config::AtmConfig;
pub use builder::{AtmBuilderStep, AtmState};
use computation_process::Computation;
pub use matrix::{Atm, AtmCounts};

/// Build a normalized [`Atm`] by repeated perturbation experiments against an
/// attractor index.
pub type AtmComputation<N, P> = Computation<AtmConfig<N, P>, AtmState, Atm, AtmBuilderStep>;
