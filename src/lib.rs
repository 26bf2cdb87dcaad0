//! Explicit-state algorithms for analysing how perturbations move a Boolean
//! network between its attractors.
//!
//! The crate covers three connected problems:
//!
//!  - **Attractor indexing** ([`attractor`]): walk the network dynamics from
//!    seed states, detect cycles, and build a memoized map from any visited
//!    state to its attractor (exhaustively over all `2^n` states, or from
//!    random samples with a step cutoff).
//!  - **Attractor transition matrices** ([`atm`]): repeatedly perturb states
//!    inside each known attractor, resolve where the system relaxes to, and
//!    accumulate the transition frequencies into a growable matrix that is
//!    finally normalized into per-row probability distributions.
//!  - **TES trees** ([`tes`]): carve a nested hierarchy of threshold ergodic
//!    sets out of the matrix using an ascending threshold sequence, and
//!    compare it against an externally supplied differentiation tree
//!    (exact isomorphism, minimum edit distance, or level histograms),
//!    including a driver that searches the threshold space for the best fit.
//!
//! The network itself stays behind the [`dynamics::NetworkDynamics`] and
//! [`dynamics::Perturbation`] traits: the algorithms only ever ask for the
//! successor of a state, or for a perturbed copy of it. Ready-made
//! perturbation operators (flips, random reassignments, knock-in/knock-out)
//! live in [`perturbation`].
//!
//! Long-running algorithms are implemented as step operators polled through
//! [`computation_process::Computation`], so callers can suspend, inspect, or
//! abandon them between steps.

#[cfg(test)]
mod test_utils;

pub mod atm;
pub mod attractor;
pub mod dynamics;
pub mod perturbation;
pub mod tes;

use crate::attractor::AttractorIndex;

/// A utility method for printing useful metadata of an attractor index.
fn log_index(index: &AttractorIndex) -> String {
    format!(
        "attractors={}; memoized states={}",
        index.attractor_count(),
        index.memoized_states()
    )
}
