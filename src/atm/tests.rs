use crate::atm::{AtmComputation, AtmConfig, AtmCounts, AtmState};
use crate::attractor::{AttractorIndex, ExhaustiveIndexing, ExhaustiveState, IndexingConfig};
use crate::dynamics::State;
use crate::test_utils::{TableNetwork, TablePerturbation, init_logger, two_attractor_network};
use cancel_this::Cancellable;
use computation_process::{Computable, Stateful};

fn index_of(network: &TableNetwork) -> Cancellable<AttractorIndex> {
    let config = IndexingConfig::new(network.clone());
    let initial = ExhaustiveState::from(&config);
    ExhaustiveIndexing::configure(config, initial).compute()
}

#[test]
fn growth_preserves_existing_counts() {
    let mut counts = AtmCounts::new(2);
    counts.increment(0, 1);
    counts.increment(0, 1);
    counts.increment(1, 0);

    let grown = counts.grow_by_one();
    assert_eq!(grown.dim(), 3);
    for from in 0..2 {
        for to in 0..2 {
            assert_eq!(grown.entry(from, to), counts.entry(from, to));
        }
    }
    for position in 0..3 {
        assert_eq!(grown.entry(2, position), 0);
        assert_eq!(grown.entry(position, 2), 0);
    }
}

#[test]
fn normalized_rows_sum_to_one() {
    let counts = AtmCounts::from_rows(vec![vec![3, 1, 0], vec![0, 0, 0], vec![2, 2, 4]]);
    let atm = counts.normalize();

    for row in atm.probabilities() {
        assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }
    // The row without observations becomes uniform.
    assert_eq!(atm.row(1), &[1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]);
    assert_eq!(atm.row_totals(), &[4, 0, 8]);
}

#[test]
fn denormalization_inverts_normalization() {
    let counts = AtmCounts::from_rows(vec![vec![3, 1], vec![0, 0]]);
    let atm = counts.normalize();
    let raw = atm.denormalized();

    assert!((raw[0][0] - 3.0).abs() < 1e-9);
    assert!((raw[0][1] - 1.0).abs() < 1e-9);
    // A zero-total row is scaled by the attractor count, turning its uniform
    // entries into ones.
    assert!((raw[1][0] - 1.0).abs() < 1e-9);
    assert!((raw[1][1] - 1.0).abs() < 1e-9);
}

#[test]
fn thresholding_is_non_destructive() {
    let atm = AtmCounts::from_rows(vec![vec![9, 1], vec![1, 9]]).normalize();
    let cut = atm.thresholded(0.5);

    assert_eq!(cut[0], vec![0.9, 0.0]);
    assert_eq!(cut[1], vec![0.0, 0.9]);
    // The original matrix still carries the weak transitions.
    assert_eq!(atm.row(0), &[0.9, 0.1]);
}

#[test]
fn distinct_entries_are_sorted_and_deduplicated() {
    let atm = AtmCounts::from_rows(vec![vec![9, 1], vec![1, 9]]).normalize();
    assert_eq!(atm.distinct_positive_entries(), vec![0.1, 0.9]);
}

#[test]
fn csv_is_row_major() {
    let atm = AtmCounts::from_rows(vec![vec![1, 1], vec![0, 2]]).normalize();
    assert_eq!(atm.to_csv(), "0.5,0.5\n0,1");
}

#[test]
fn experiments_accumulate_into_rows() -> Cancellable<()> {
    init_logger();
    let network = two_attractor_network();
    let index = index_of(&network)?;

    // Perturbations always kick the system into the other basin.
    let perturbation = TablePerturbation::from_pairs(
        3,
        &[(0b000, 0b100), (0b110, 0b001), (0b111, 0b001)],
    );
    let config = AtmConfig::new(network.clone(), perturbation).with_experiments(5);
    let mut build = AtmComputation::configure(config, AtmState::with_rng_seed(index, 3));
    let atm = build.compute()?;

    assert_eq!(atm.dim(), 2);
    assert_eq!(atm.row(0), &[0.0, 1.0]);
    assert_eq!(atm.row(1), &[1.0, 0.0]);
    // One source state in the fixed point, two in the cycle.
    assert_eq!(atm.row_totals(), &[5, 10]);
    Ok(())
}

#[test]
fn self_transitions_dominate_without_perturbation_effect() -> Cancellable<()> {
    init_logger();
    let network = two_attractor_network();
    let index = index_of(&network)?;

    // The identity perturbation leaves every state inside its own basin.
    let perturbation = TablePerturbation::from_pairs(3, &[]);
    let config = AtmConfig::new(network.clone(), perturbation).with_experiments(4);
    let mut build = AtmComputation::configure(config, AtmState::with_rng_seed(index, 3));
    let atm = build.compute()?;

    assert_eq!(atm.row(0), &[1.0, 0.0]);
    assert_eq!(atm.row(1), &[0.0, 1.0]);
    Ok(())
}

#[test]
fn matrix_grows_when_perturbation_discovers_an_attractor() {
    init_logger();
    let network = two_attractor_network();

    // Start from a sparse index that only knows the fixed point.
    let mut index = AttractorIndex::sparse(3, None);
    let _ = index.attractor_of(&network, &State::from_index(0b000, 3));
    assert_eq!(index.attractor_count(), 1);

    let perturbation = TablePerturbation::from_pairs(
        3,
        &[(0b000, 0b100), (0b110, 0b010), (0b111, 0b010)],
    );
    let config = AtmConfig::new(network.clone(), perturbation).with_experiments(2);
    let mut build = AtmComputation::configure(config, AtmState::with_rng_seed(index, 3));
    let atm = build.compute().unwrap();

    // The cycle was discovered mid-build, the matrix grew, and the new row
    // was itself perturbed.
    assert_eq!(atm.dim(), 2);
    assert_eq!(atm.row(0), &[0.0, 1.0]);
    assert_eq!(atm.row(1), &[1.0, 0.0]);
    assert_eq!(atm.row_totals(), &[2, 4]);
}

#[test]
fn states_ratio_is_clamped_and_keeps_one_source() -> Cancellable<()> {
    init_logger();
    let network = two_attractor_network();

    let perturbation = TablePerturbation::from_pairs(3, &[]);
    let config = AtmConfig::new(network.clone(), perturbation).with_states_ratio(-3.0);
    assert_eq!(config.clamped_ratio(), 0.0);

    // Even with ratio zero, one member state per attractor is perturbed.
    let index = index_of(&network)?;
    let mut build = AtmComputation::configure(config, AtmState::with_rng_seed(index, 3));
    let atm = build.compute()?;
    assert_eq!(atm.row_totals(), &[1, 1]);
    Ok(())
}

#[cfg(feature = "serde")]
#[test]
fn atm_serialization_round_trip() {
    let atm = AtmCounts::from_rows(vec![vec![3, 1], vec![0, 0]]).normalize();
    let json = serde_json::to_string(&atm).unwrap();
    let restored: crate::atm::Atm = serde_json::from_str(&json).unwrap();
    assert_eq!(atm, restored);
}
