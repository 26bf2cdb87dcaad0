use crate::atm::{Atm, AtmConfig, AtmCounts};
use crate::attractor::{AttractorId, AttractorIndex};
use crate::dynamics::{NetworkDynamics, Perturbation, State};
use crate::log_index;
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// State of the matrix construction: the attractor index being sampled
/// against (which keeps growing as perturbation discovers new attractors),
/// the count matrix, and the position inside the experiment loops.
pub struct AtmState {
    index: AttractorIndex,
    counts: AtmCounts,
    current_row: usize,
    /// Member states selected for `current_row`; `None` until the row's
    /// selection has been drawn.
    sources: Option<Vec<State>>,
    next_source: usize,
    rng: StdRng,
}

/// Step implementation for ATM construction. One step either prepares the
/// source-state selection of the next attractor or runs all experiments of a
/// single source state.
pub struct AtmBuilderStep;

impl AtmState {
    /// Start a matrix construction over the attractors of `index`.
    pub fn new(index: AttractorIndex) -> AtmState {
        AtmState::with_rng(index, StdRng::from_os_rng())
    }

    /// Start a matrix construction with a fixed RNG seed (reproducible
    /// state selection and perturbations).
    pub fn with_rng_seed(index: AttractorIndex, seed: u64) -> AtmState {
        AtmState::with_rng(index, StdRng::seed_from_u64(seed))
    }

    fn with_rng(index: AttractorIndex, rng: StdRng) -> AtmState {
        let counts = AtmCounts::new(index.attractor_count());
        AtmState {
            index,
            counts,
            current_row: 0,
            sources: None,
            next_source: 0,
            rng,
        }
    }

    /// The attractor index, including attractors discovered during the
    /// construction itself.
    pub fn index(&self) -> &AttractorIndex {
        &self.index
    }
}

impl From<AttractorIndex> for AtmState {
    fn from(value: AttractorIndex) -> Self {
        AtmState::new(value)
    }
}

impl<N: NetworkDynamics, P: Perturbation<N>> ComputationStep<AtmConfig<N, P>, AtmState, Atm>
    for AtmBuilderStep
{
    fn step(context: &AtmConfig<N, P>, state: &mut AtmState) -> Completable<Atm> {
        // Attractors discovered by earlier steps extend the matrix before
        // anything else happens; the loop below then also visits their rows.
        while state.counts.dim() < state.index.attractor_count() {
            state.counts = state.counts.grow_by_one();
        }

        if state.current_row >= state.counts.dim() {
            info!(
                "ATM construction finished over {} attractors ({}).",
                state.counts.dim(),
                log_index(&state.index)
            );
            return Ok(state.counts.normalize());
        }

        let source = match &state.sources {
            None => {
                // Select the member states perturbed for this row: a random
                // permutation prefix of the attractor's cycle.
                let id = AttractorId(state.current_row);
                let mut members = state.index.states_of(&context.network, id);
                members.shuffle(&mut state.rng);
                let selected = ((context.clamped_ratio() * members.len() as f64).floor() as usize)
                    .clamp(1, members.len());
                members.truncate(selected);
                debug!(
                    "Perturbing {} member state(s) of attractor {}.",
                    members.len(),
                    state.current_row
                );
                state.sources = Some(members);
                state.next_source = 0;
                return Err(Suspended);
            }
            Some(sources) => {
                if state.next_source >= sources.len() {
                    state.current_row += 1;
                    state.sources = None;
                    return Err(Suspended);
                }
                sources[state.next_source].clone()
            }
        };
        state.next_source += 1;

        for _ in 0..context.experiments_per_state {
            let perturbed =
                context
                    .perturbation
                    .perturb(&context.network, &source, &mut state.rng);
            // Unresolved destinations (sampling cutoff) are dropped; the
            // index itself keeps count of them.
            let Some(destination) = state.index.attractor_of(&context.network, &perturbed) else {
                continue;
            };
            while state.counts.dim() <= destination.to_index() {
                state.counts = state.counts.grow_by_one();
            }
            state.counts.increment(state.current_row, destination.to_index());
        }
        Err(Suspended)
    }
}
