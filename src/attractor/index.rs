use crate::dynamics::{NetworkDynamics, State};
use log::{debug, info, trace};
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

/// Identifier of an attractor within one [`AttractorIndex`].
///
/// Ids are assigned in discovery order and double as row/column positions in
/// the transition matrices built on top of the index.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttractorId(pub(crate) usize);

impl AttractorId {
    /// The position of this attractor in discovery order.
    pub fn to_index(self) -> usize {
        self.0
    }
}

/// One discovered attractor: a cycle of states the dynamics settles into.
///
/// Only the canonical representative is stored; the full cycle is recomputed
/// on demand by [`AttractorIndex::states_of`].
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Attractor {
    representative: State,
    cycle_length: usize,
    transient: usize,
    oscillation: f64,
}

impl Attractor {
    /// The first-discovered state of the cycle. Walking the dynamics from
    /// here visits the whole cycle and returns to this state.
    pub fn representative(&self) -> &State {
        &self.representative
    }

    /// The number of states in the cycle.
    pub fn cycle_length(&self) -> usize {
        self.cycle_length
    }

    /// The longest proven number of steps from any indexed state outside the
    /// cycle until the cycle is entered. Only ever adjusted upward as new
    /// walks are absorbed.
    pub fn transient(&self) -> usize {
        self.transient
    }

    /// The fraction of nodes whose value is not constant across the cycle.
    pub fn oscillation(&self) -> f64 {
        self.oscillation
    }
}

/// Raised when a bounded walk exceeds its cutoff before reaching a known
/// attractor or closing a new cycle.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AttractorNotFound;

impl Display for AttractorNotFound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "No attractor found within the configured cutoff")
    }
}

impl std::error::Error for AttractorNotFound {}

/// The memo tables of an index: visited state to attractor id, and visited
/// state to the number of steps until its walk enters the cycle.
#[derive(Clone, Debug)]
enum Memo {
    /// Tables indexed by the integer encoding of a state; used when the whole
    /// `2^n` state space is materialized.
    Dense {
        attractor: Vec<Option<AttractorId>>,
        steps: Vec<usize>,
    },
    /// Hash tables over visited states only; used with sampled exploration.
    Sparse {
        attractor: HashMap<State, AttractorId>,
        steps: HashMap<State, usize>,
    },
}

/// A memoized map from network states to their attractors.
///
/// The index is grown by absorbing walks of the dynamics: every state a walk
/// visits is recorded, either into a newly born attractor (when the walk
/// closes a cycle) or into the attractor the walk runs into (when it reaches
/// an already indexed state). The set of known attractors only ever grows.
///
/// Indexes are plain values: [`Clone`] produces a fully independent deep copy
/// so that a caller can branch an exploration without sharing state.
#[derive(Clone, Debug)]
pub struct AttractorIndex {
    node_count: usize,
    memo: Memo,
    attractors: Vec<Attractor>,
    cutoff: Option<usize>,
    memoized: usize,
    not_found: usize,
}

impl AttractorIndex {
    /// An empty index with dense memo tables over all `2^n` states.
    ///
    /// # Panics
    ///
    /// Panics if `node_count` does not fit the machine word, i.e. when the
    /// state space cannot be addressed by `usize`.
    pub fn dense(node_count: usize) -> AttractorIndex {
        assert!(
            node_count < usize::BITS as usize,
            "Dense indexing requires an addressable state space ({node_count} nodes given)"
        );
        let state_count = 1usize << node_count;
        AttractorIndex {
            node_count,
            memo: Memo::Dense {
                attractor: vec![None; state_count],
                steps: vec![0; state_count],
            },
            attractors: Vec::new(),
            cutoff: None,
            memoized: 0,
            not_found: 0,
        }
    }

    /// An empty index with sparse memo tables and an optional walk cutoff.
    ///
    /// With a cutoff, unresolved lookups abandon their walk after visiting
    /// `cutoff` states and are counted in [`AttractorIndex::not_found`].
    pub fn sparse(node_count: usize, cutoff: Option<usize>) -> AttractorIndex {
        AttractorIndex {
            node_count,
            memo: Memo::Sparse {
                attractor: HashMap::new(),
                steps: HashMap::new(),
            },
            attractors: Vec::new(),
            cutoff,
            memoized: 0,
            not_found: 0,
        }
    }

    /// The number of nodes of the indexed network.
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// The walk cutoff of this index, if any.
    pub fn cutoff(&self) -> Option<usize> {
        self.cutoff
    }

    /// All attractors discovered so far, in discovery order.
    pub fn attractors(&self) -> &[Attractor] {
        &self.attractors
    }

    /// The attractor with the given id.
    pub fn attractor(&self, id: AttractorId) -> &Attractor {
        &self.attractors[id.0]
    }

    /// The number of attractors discovered so far.
    pub fn attractor_count(&self) -> usize {
        self.attractors.len()
    }

    /// Ids of all attractors discovered so far, in discovery order.
    pub fn ids(&self) -> impl Iterator<Item = AttractorId> + '_ {
        (0..self.attractors.len()).map(AttractorId)
    }

    /// The number of states recorded in the memo tables.
    pub fn memoized_states(&self) -> usize {
        self.memoized
    }

    /// How many lookups abandoned their walk because of the cutoff.
    pub fn not_found(&self) -> usize {
        self.not_found
    }

    /// Memoized lookup without exploration: the attractor of `state` if it
    /// has already been indexed.
    pub fn lookup(&self, state: &State) -> Option<AttractorId> {
        match &self.memo {
            Memo::Dense { attractor, .. } => attractor.get(state.index()).copied().flatten(),
            Memo::Sparse { attractor, .. } => attractor.get(state).copied(),
        }
    }

    /// The recorded number of steps from `state` until its walk enters the
    /// cycle of its attractor (zero for cycle members).
    pub fn steps_to_cycle(&self, state: &State) -> Option<usize> {
        match &self.memo {
            Memo::Dense { attractor, steps } => attractor
                .get(state.index())
                .copied()
                .flatten()
                .map(|_| steps[state.index()]),
            Memo::Sparse { steps, .. } => steps.get(state).copied(),
        }
    }

    /// The attractor of `state`, walking the dynamics if the state has not
    /// been indexed yet.
    ///
    /// With a cutoff configured, a walk that exceeds it is abandoned: the
    /// failure is counted in [`AttractorIndex::not_found`] and `None` is
    /// returned. Without a cutoff this always succeeds.
    pub fn attractor_of<N: NetworkDynamics>(
        &mut self,
        network: &N,
        state: &State,
    ) -> Option<AttractorId> {
        if let Some(id) = self.lookup(state) {
            return Some(id);
        }
        match self.absorb_walk(network, state.clone(), self.cutoff) {
            Ok(id) => Some(id),
            Err(AttractorNotFound) => {
                self.not_found += 1;
                trace!("Walk from {state} abandoned (cutoff reached).");
                None
            }
        }
    }

    /// The ordered cycle of the given attractor, starting from its
    /// representative. The cycle is recomputed by re-simulating the dynamics,
    /// so the sequence is restartable from any of its members.
    pub fn states_of<N: NetworkDynamics>(&self, network: &N, id: AttractorId) -> Vec<State> {
        let attractor = &self.attractors[id.0];
        let mut states = Vec::with_capacity(attractor.cycle_length);
        let mut current = attractor.representative.clone();
        loop {
            states.push(current.clone());
            current = network.step(&current);
            if current == attractor.representative {
                return states;
            }
        }
    }

    /// The number of indexed states absorbed by each attractor, in discovery
    /// order. In a dense index these are exact basin sizes; in a sparse index
    /// they cover the sampled portion of each basin.
    pub fn basin_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0usize; self.attractors.len()];
        match &self.memo {
            Memo::Dense { attractor, .. } => {
                for id in attractor.iter().flatten() {
                    sizes[id.0] += 1;
                }
            }
            Memo::Sparse { attractor, .. } => {
                for id in attractor.values() {
                    sizes[id.0] += 1;
                }
            }
        }
        sizes
    }

    /// The longest proven transient of each attractor, in discovery order.
    pub fn transient_lengths(&self) -> Vec<usize> {
        self.attractors.iter().map(Attractor::transient).collect()
    }

    /// The mean oscillation ratio over all attractors (zero when no attractor
    /// is known yet).
    pub fn mean_oscillation(&self) -> f64 {
        if self.attractors.is_empty() {
            return 0.0;
        }
        let total: f64 = self.attractors.iter().map(Attractor::oscillation).sum();
        total / self.attractors.len() as f64
    }

    /// Render the member states of every attractor, one line per attractor,
    /// each state as a binary string terminated by `;`. This is the listing
    /// format consumed by external reporting tools.
    pub fn states_csv<N: NetworkDynamics>(&self, network: &N) -> String {
        let mut out = String::new();
        for id in self.ids() {
            for state in self.states_of(network, id) {
                out.push_str(&state.to_string());
                out.push(';');
            }
            out.push('\n');
        }
        out
    }

    /// Walk the dynamics from `seed` until the walk either closes a new cycle
    /// or reaches an already indexed state, recording every visited state.
    /// With a cutoff, walks visiting more than `cutoff` states fail.
    ///
    /// The caller must ensure `seed` is not indexed yet.
    pub(crate) fn absorb_walk<N: NetworkDynamics>(
        &mut self,
        network: &N,
        seed: State,
        cutoff: Option<usize>,
    ) -> Result<AttractorId, AttractorNotFound> {
        let mut walk: Vec<State> = Vec::new();
        let mut walk_position: HashMap<State, usize> = HashMap::new();
        let mut current = seed;
        loop {
            if let Some(limit) = cutoff {
                if walk.len() >= limit {
                    return Err(AttractorNotFound);
                }
            }
            walk_position.insert(current.clone(), walk.len());
            walk.push(current.clone());

            let next = network.step(&current);
            if let Some(&cycle_start) = walk_position.get(&next) {
                // The walk closed on itself: a new attractor is born whose
                // cycle is the suffix of the walk starting at `next`.
                let id = self.insert_attractor(&walk[cycle_start..]);
                for (position, state) in walk.iter().enumerate() {
                    self.record(state.clone(), id, cycle_start.saturating_sub(position));
                }
                self.raise_transient(id, cycle_start);
                debug!(
                    "Walk of {} states closed a new cycle (attractor {}).",
                    walk.len(),
                    id.0
                );
                return Ok(id);
            }
            if let Some(id) = self.lookup(&next) {
                // The walk ran into indexed territory and is absorbed whole.
                let steps_from_hit = self.steps_to_cycle(&next).unwrap_or(0);
                let walk_len = walk.len();
                for (position, state) in walk.iter().enumerate() {
                    self.record(state.clone(), id, (walk_len - position) + steps_from_hit);
                }
                self.raise_transient(id, walk_len + steps_from_hit);
                debug!(
                    "Walk of {} states absorbed into attractor {}.",
                    walk.len(),
                    id.0
                );
                return Ok(id);
            }
            current = next;
        }
    }

    /// Register a newly discovered cycle and return its id.
    fn insert_attractor(&mut self, cycle: &[State]) -> AttractorId {
        let id = AttractorId(self.attractors.len());
        let attractor = Attractor {
            representative: cycle[0].clone(),
            cycle_length: cycle.len(),
            transient: 0,
            oscillation: oscillation_ratio(cycle),
        };
        info!(
            "Discovered attractor {} (cycle length {}, oscillation {:.3}).",
            id.0, attractor.cycle_length, attractor.oscillation
        );
        self.attractors.push(attractor);
        id
    }

    /// Record one state in the memo tables. The state must not be recorded
    /// yet: a state maps to exactly one attractor forever.
    fn record(&mut self, state: State, id: AttractorId, steps_to_cycle: usize) {
        debug_assert_eq!(state.len(), self.node_count);
        match &mut self.memo {
            Memo::Dense { attractor, steps } => {
                let index = state.index();
                debug_assert!(attractor[index].is_none());
                attractor[index] = Some(id);
                steps[index] = steps_to_cycle;
            }
            Memo::Sparse { attractor, steps } => {
                debug_assert!(!attractor.contains_key(&state));
                steps.insert(state.clone(), steps_to_cycle);
                attractor.insert(state, id);
            }
        }
        self.memoized += 1;
    }

    /// Raise the recorded transient of an attractor to `candidate` if it
    /// proves a longer path into the cycle.
    fn raise_transient(&mut self, id: AttractorId, candidate: usize) {
        let attractor = &mut self.attractors[id.0];
        if candidate > attractor.transient {
            attractor.transient = candidate;
        }
    }
}

/// The fraction of node positions whose value changes somewhere along the
/// cycle.
fn oscillation_ratio(cycle: &[State]) -> f64 {
    let nodes = cycle[0].len();
    if nodes == 0 {
        return 0.0;
    }
    let mut oscillating = 0usize;
    for node in 0..nodes {
        let first = cycle[0].get(node);
        if cycle.iter().any(|state| state.get(node) != first) {
            oscillating += 1;
        }
    }
    oscillating as f64 / nodes as f64
}
