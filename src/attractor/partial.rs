use crate::attractor::{AttractorIndex, IndexingConfig};
use crate::dynamics::{NetworkDynamics, State};
use crate::log_index;
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// State of the partial indexing computation: a fixed number of random seed
/// states, each walked to absorption (or abandoned at the cutoff).
pub struct PartialState {
    index: AttractorIndex,
    remaining_seeds: usize,
    rng: StdRng,
}

/// Step implementation for partial attractor indexing. One random seed state
/// is resolved per step.
pub struct PartialStep;

impl<N: NetworkDynamics> From<&IndexingConfig<N>> for PartialState {
    fn from(config: &IndexingConfig<N>) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        PartialState {
            index: AttractorIndex::sparse(config.network.node_count(), config.cutoff),
            remaining_seeds: config.seed_count,
            rng,
        }
    }
}

impl<N: NetworkDynamics> ComputationStep<IndexingConfig<N>, PartialState, AttractorIndex>
    for PartialStep
{
    fn step(context: &IndexingConfig<N>, state: &mut PartialState) -> Completable<AttractorIndex> {
        if state.remaining_seeds == 0 {
            info!(
                "Partial indexing finished ({}; not found={}).",
                log_index(&state.index),
                state.index.not_found()
            );
            return Ok(state.index.clone());
        }
        state.remaining_seeds -= 1;

        let seed = State::random(
            context.network.node_count(),
            context.activation_probability,
            &mut state.rng,
        );
        // A cutoff failure is recorded by the index itself; the seed is
        // simply dropped and sampling continues.
        let _ = state.index.attractor_of(&context.network, &seed);
        Err(Suspended)
    }
}
