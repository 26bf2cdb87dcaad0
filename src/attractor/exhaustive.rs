use crate::attractor::{AttractorIndex, IndexingConfig};
use crate::dynamics::{NetworkDynamics, State};
use crate::log_index;
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::info;

/// State of the exhaustive indexing computation: every state `0..2^n` is
/// walked to absorption exactly once, in increasing integer order.
pub struct ExhaustiveState {
    index: AttractorIndex,
    next_seed: usize,
}

/// Step implementation for exhaustive attractor indexing. One seed state is
/// resolved per step.
pub struct ExhaustiveStep;

impl<N: NetworkDynamics> From<&IndexingConfig<N>> for ExhaustiveState {
    fn from(config: &IndexingConfig<N>) -> Self {
        ExhaustiveState {
            index: AttractorIndex::dense(config.network.node_count()),
            next_seed: 0,
        }
    }
}

impl<N: NetworkDynamics> ComputationStep<IndexingConfig<N>, ExhaustiveState, AttractorIndex>
    for ExhaustiveStep
{
    fn step(
        context: &IndexingConfig<N>,
        state: &mut ExhaustiveState,
    ) -> Completable<AttractorIndex> {
        let nodes = context.network.node_count();
        let state_count = 1usize << nodes;
        if state.next_seed >= state_count {
            info!("Exhaustive indexing finished ({}).", log_index(&state.index));
            return Ok(state.index.clone());
        }

        let seed = State::from_index(state.next_seed, nodes);
        state.next_seed += 1;
        if state.index.lookup(&seed).is_none() {
            // An unbounded walk always terminates in an attractor.
            let _ = state.index.absorb_walk(&context.network, seed, None);
        }
        Err(Suspended)
    }
}
