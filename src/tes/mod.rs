//! Threshold ergodic sets (TES), the nested cluster trees they form, and the
//! search for threshold sequences reproducing a target tree.
//!
//! Raising a threshold on an attractor transition matrix removes weak
//! transitions; the attractors then fall apart into clusters that are
//! mutually reachable and closed under the remaining transitions. Sweeping an
//! ascending threshold sequence therefore carves a hierarchy out of the
//! matrix: the [`TesTree`]. Comparing that hierarchy against an externally
//! supplied differentiation tree — exactly, by minimum edit distance, or by
//! level histograms — and searching the threshold space for the best fit is
//! what [`DeltaSearch`] does.
//!
//! # Example
//!
//! ```rust
//! use biodivine_algo_bn_atm::atm::AtmCounts;
//! use biodivine_algo_bn_atm::tes::{DeltaSearch, DeltaSearchConfig, DeltaSearchState, TesTree};
//! use computation_process::{Computable, Stateful};
//!
//! // Two attractors dominated by their self-loops.
//! let atm = AtmCounts::from_rows(vec![vec![9, 1], vec![1, 9]]).normalize();
//!
//! // At threshold zero everything is one cluster; at 0.5 the cross
//! // transitions disappear and the cluster splits in two.
//! let tree = TesTree::build(atm.probabilities(), &[0.0, 0.5]).unwrap();
//! assert_eq!(tree.depth(), 1);
//! assert_eq!(tree.root().child_count(), 2);
//!
//! // The search recovers a threshold sequence reproducing the same shape.
//! let target = TesTree::from_levels(&[(0, 0, 0), (1, 1, 0), (1, 2, 0)]).unwrap();
//! let config = DeltaSearchConfig::new(atm, target);
//! let state = DeltaSearchState::try_new(&config).unwrap();
//! let fit = DeltaSearch::configure(config, state).compute().unwrap();
//! assert_eq!(fit.unwrap().distance, 0);
//! ```

mod compare;
mod delta_search;
mod tes;
mod tree;

#[cfg(test)]
mod tests;

use computation_process::Computation;
pub use delta_search::{
    ComparisonMetric, DeltaFit, DeltaSearchConfig, DeltaSearchError, DeltaSearchState,
    DeltaSearchStep, ThresholdCandidates,
};
pub use tes::Tes;
pub use tree::{TesTree, TesTreeError, TesTreeNode};

/// Enumerate ascending threshold sequences over a transition matrix and
/// return the one whose TES tree best fits a target tree.
pub type DeltaSearch =
    Computation<DeltaSearchConfig, DeltaSearchState, Option<DeltaFit>, DeltaSearchStep>;
