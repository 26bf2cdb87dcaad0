use crate::atm::Atm;
use crate::tes::TesTree;
use computation_process::Incomplete::Suspended;
use computation_process::{Completable, ComputationStep};
use log::{debug, info};
use std::fmt::{Display, Formatter};

/// The tree-similarity metric a delta search scores candidates with.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ComparisonMetric {
    /// Stop at the first candidate whose tree matches the target exactly
    /// (up to child reordering).
    Exact,
    /// Track the minimum [`TesTree::distance`]; stop early at distance zero.
    MinDistance,
    /// Track the minimum [`TesTree::histogram_distance`]; stop early at
    /// distance zero.
    Histogram,
}

/// Where a delta search takes its candidate thresholds from.
#[derive(Clone, Debug, Default)]
pub enum ThresholdCandidates {
    /// The distinct positive entries of the transition matrix.
    #[default]
    MatrixEntries,
    /// A fixed arithmetic grid `start, start + step, ...` up to (excluding)
    /// `end`.
    Grid { start: f64, end: f64, step: f64 },
}

/// Raised when a delta search cannot start at all.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeltaSearchError {
    /// The target tree is deeper than the number of distinct candidate
    /// thresholds, so no delta sequence can reach its depth.
    NotEnoughThresholds { required: usize, available: usize },
}

impl Display for DeltaSearchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DeltaSearchError::NotEnoughThresholds {
                required,
                available,
            } => {
                write!(
                    f,
                    "The target tree needs {required} thresholds but only {available} candidates exist"
                )
            }
        }
    }
}

impl std::error::Error for DeltaSearchError {}

/// A configuration object for the delta search driver.
#[derive(Clone)]
pub struct DeltaSearchConfig {
    /// The normalized transition matrix the trees are carved from.
    pub atm: Atm,
    /// The externally supplied differentiation tree to reproduce.
    pub target: TesTree,
    /// How candidate trees are scored.
    pub metric: ComparisonMetric,
    /// Where candidate thresholds come from.
    pub candidates: ThresholdCandidates,
}

impl DeltaSearchConfig {
    /// Create a new instance of [`DeltaSearchConfig`] searching for an exact
    /// match over the matrix's own entries.
    pub fn new(atm: Atm, target: TesTree) -> DeltaSearchConfig {
        DeltaSearchConfig {
            atm,
            target,
            metric: ComparisonMetric::Exact,
            candidates: ThresholdCandidates::MatrixEntries,
        }
    }

    /// Set the scoring metric.
    pub fn with_metric(mut self, metric: ComparisonMetric) -> DeltaSearchConfig {
        self.metric = metric;
        self
    }

    /// Set the candidate threshold source.
    pub fn with_candidates(mut self, candidates: ThresholdCandidates) -> DeltaSearchConfig {
        self.candidates = candidates;
        self
    }
}

/// The best threshold sequence a delta search found.
#[derive(Clone, Debug, PartialEq)]
pub struct DeltaFit {
    /// One threshold per tree level; index `0` is the implicit root
    /// threshold `0.0`.
    pub deltas: Vec<f64>,
    /// The score of the sequence under the configured metric (zero for an
    /// exact match).
    pub distance: usize,
}

/// State of a delta search: the sorted candidate thresholds, a cursor over
/// ascending k-subsets of them, and the best fit so far.
pub struct DeltaSearchState {
    values: Vec<f64>,
    depth: usize,
    /// Indices of the current candidate combination; `None` once all
    /// combinations have been evaluated.
    cursor: Option<Vec<usize>>,
    best: Option<DeltaFit>,
    evaluated: usize,
}

impl DeltaSearchState {
    /// Prepare a search for the given configuration.
    ///
    /// Fails immediately with [`DeltaSearchError::NotEnoughThresholds`] when
    /// the target tree is deeper than the candidate pool.
    pub fn try_new(config: &DeltaSearchConfig) -> Result<DeltaSearchState, DeltaSearchError> {
        let values = match &config.candidates {
            ThresholdCandidates::MatrixEntries => config.atm.distinct_positive_entries(),
            ThresholdCandidates::Grid { start, end, step } => {
                let mut values = Vec::new();
                let mut value = *start;
                while value < *end {
                    values.push(value);
                    value += step;
                }
                values
            }
        };
        let depth = config.target.depth();
        if depth > values.len() {
            return Err(DeltaSearchError::NotEnoughThresholds {
                required: depth,
                available: values.len(),
            });
        }
        Ok(DeltaSearchState {
            values,
            depth,
            cursor: Some((0..depth).collect()),
            best: None,
            evaluated: 0,
        })
    }

    /// The sorted candidate thresholds the search enumerates.
    pub fn candidates(&self) -> &[f64] {
        &self.values
    }

    /// How many delta sequences have been evaluated so far.
    pub fn evaluated(&self) -> usize {
        self.evaluated
    }

    /// The best fit found so far.
    pub fn best(&self) -> Option<&DeltaFit> {
        self.best.as_ref()
    }
}

/// Step implementation for the delta search: one candidate sequence is built
/// and scored per step.
pub struct DeltaSearchStep;

impl ComputationStep<DeltaSearchConfig, DeltaSearchState, Option<DeltaFit>> for DeltaSearchStep {
    fn step(
        context: &DeltaSearchConfig,
        state: &mut DeltaSearchState,
    ) -> Completable<Option<DeltaFit>> {
        let Some(combination) = &state.cursor else {
            info!(
                "Delta search exhausted after {} candidates (best distance: {:?}).",
                state.evaluated,
                state.best.as_ref().map(|fit| fit.distance)
            );
            return Ok(state.best.clone());
        };

        let mut deltas = Vec::with_capacity(state.depth + 1);
        deltas.push(0.0);
        deltas.extend(combination.iter().map(|&position| state.values[position]));

        let mut next = combination.clone();
        state.cursor = advance_combination(&mut next, state.values.len()).then_some(next);
        state.evaluated += 1;

        let tree = match TesTree::build(context.atm.probabilities(), &deltas) {
            Ok(tree) => tree,
            Err(error) => {
                // Structurally invalid candidates are skipped, not fatal.
                debug!("Candidate {deltas:?} rejected: {error}");
                return Err(Suspended);
            }
        };

        let score = match context.metric {
            ComparisonMetric::Exact => tree.matches(&context.target).then_some(0),
            ComparisonMetric::MinDistance => Some(tree.distance(&context.target)),
            ComparisonMetric::Histogram => Some(tree.histogram_distance(&context.target)),
        };
        match score {
            None => Err(Suspended),
            Some(0) => {
                info!(
                    "Delta sequence {deltas:?} reproduces the target tree ({} candidates tried).",
                    state.evaluated
                );
                state.best = Some(DeltaFit {
                    deltas,
                    distance: 0,
                });
                Ok(state.best.clone())
            }
            Some(distance) => {
                if state
                    .best
                    .as_ref()
                    .is_none_or(|current| distance < current.distance)
                {
                    debug!("Candidate {deltas:?} improves the distance to {distance}.");
                    state.best = Some(DeltaFit { deltas, distance });
                }
                Err(Suspended)
            }
        }
    }
}

/// Advance an ascending k-subset of `0..pool` to its successor in place;
/// returns `false` once the last combination has been reached.
fn advance_combination(combination: &mut [usize], pool: usize) -> bool {
    let k = combination.len();
    let mut position = k;
    while position > 0 {
        position -= 1;
        if combination[position] < pool - (k - position) {
            combination[position] += 1;
            for follow in (position + 1)..k {
                combination[follow] = combination[follow - 1] + 1;
            }
            return true;
        }
    }
    false
}
