use crate::atm::AtmCounts;
use crate::attractor::AttractorId;
use crate::tes::{
    ComparisonMetric, DeltaSearch, DeltaSearchConfig, DeltaSearchError, DeltaSearchState, TesTree,
    TesTreeError, ThresholdCandidates,
};
use crate::test_utils::init_logger;
use cancel_this::Cancellable;
use computation_process::{Computable, Stateful};

/// A ten-node tree: `0 → [1 → [3 → [4], 7 → [8, 9]], 2 → [5 → [6]]]`.
fn sample_tree() -> TesTree {
    TesTree::from_levels(&[
        (0, 0, 0),
        (1, 1, 0),
        (1, 2, 0),
        (2, 3, 1),
        (3, 4, 3),
        (2, 5, 2),
        (3, 6, 5),
        (2, 7, 1),
        (3, 8, 7),
        (3, 9, 7),
    ])
    .unwrap()
}

/// The same shape as [`sample_tree`] with the subtrees arranged differently:
/// `0 → [1 → [3 → [6]], 2 → [4 → [7, 8], 5 → [9]]]`.
fn rearranged_tree() -> TesTree {
    TesTree::from_levels(&[
        (0, 0, 0),
        (1, 1, 0),
        (1, 2, 0),
        (2, 3, 1),
        (2, 4, 2),
        (2, 5, 2),
        (3, 6, 3),
        (3, 7, 4),
        (3, 8, 4),
        (3, 9, 5),
    ])
    .unwrap()
}

// ========== Tree construction ==========

#[test]
fn full_cycle_collapses_into_one_tes() {
    init_logger();
    // Three attractors in a cycle are all mutually reachable at threshold
    // zero.
    let matrix = vec![
        vec![0.0, 1.0, 0.0],
        vec![0.0, 0.0, 1.0],
        vec![1.0, 0.0, 0.0],
    ];
    let tree = TesTree::build(&matrix, &[0.0]).unwrap();

    assert_eq!(tree.depth(), 0);
    assert_eq!(tree.node_count(), 1);
    let tes = tree.root().tes().unwrap();
    assert_eq!(
        tes.attractors(),
        &[AttractorId(0), AttractorId(1), AttractorId(2)]
    );
}

#[test]
fn dominant_self_loops_split_at_a_high_threshold() {
    init_logger();
    let atm = AtmCounts::from_rows(vec![vec![9, 1], vec![1, 9]]).normalize();

    // Starting directly at 0.5 leaves two clusters and no single root.
    assert_eq!(
        TesTree::build(atm.probabilities(), &[0.5]),
        Err(TesTreeError::NotATree { clusters: 2 })
    );

    // A root threshold of zero merges them first; the next level splits.
    let tree = TesTree::build(atm.probabilities(), &[0.0, 0.5]).unwrap();
    assert_eq!(tree.depth(), 1);
    assert_eq!(tree.root().id(), 0);
    let children = tree.root().children();
    assert_eq!(children.len(), 2);
    assert_eq!(children[0].id(), 1);
    assert_eq!(children[0].tes().unwrap().attractors(), &[AttractorId(0)]);
    assert_eq!(children[1].tes().unwrap().attractors(), &[AttractorId(1)]);
}

#[test]
fn leaking_clusters_are_silently_dropped() {
    init_logger();
    // Attractor 0 only feeds attractor 1 and can never be returned to, so it
    // is not part of any closed cluster.
    let matrix = vec![vec![0.0, 1.0], vec![0.0, 1.0]];
    let tree = TesTree::build(&matrix, &[0.0]).unwrap();

    let tes = tree.root().tes().unwrap();
    assert_eq!(tes.attractors(), &[AttractorId(1)]);
    assert!(!tes.contains(AttractorId(0)));
}

#[test]
fn empty_threshold_sequences_are_rejected() {
    let matrix = vec![vec![1.0]];
    assert_eq!(
        TesTree::build(&matrix, &[]),
        Err(TesTreeError::EmptyDeltas)
    );
}

#[test]
fn node_listing_requires_a_root_first() {
    assert_eq!(
        TesTree::from_levels(&[(1, 1, 0)]),
        Err(TesTreeError::MissingRoot)
    );
    assert_eq!(
        TesTree::from_levels(&[(0, 0, 0), (2, 5, 9)]),
        Err(TesTreeError::NodeNotFound { level: 1, id: 9 })
    );
}

#[test]
fn tree_accessors_report_shape() {
    let tree = sample_tree();
    assert_eq!(tree.depth(), 3);
    assert_eq!(tree.node_count(), 10);
    assert_eq!(tree.leaf_count(), 4);
    assert_eq!(tree.edges().len(), 9);
    assert_eq!(tree.root().descendant_count(), 9);
}

// ========== Comparison metrics ==========

#[test]
fn every_metric_is_reflexive() {
    let tree = sample_tree();
    assert!(tree.matches(&tree.clone()));
    assert_eq!(tree.distance(&tree.clone()), 0);
    assert_eq!(tree.histogram_distance(&tree.clone()), 0);
}

#[test]
fn rearranged_children_still_match() {
    let tree = sample_tree();
    let other = rearranged_tree();
    assert!(tree.matches(&other));
    assert_eq!(tree.distance(&other), 0);
    assert_eq!(tree.histogram_distance(&other), 0);
}

#[test]
fn depth_mismatch_fails_exact_matching() {
    let tree = sample_tree();
    let lone_root = TesTree::with_root(0);
    assert!(!tree.matches(&lone_root));
    assert!(!lone_root.matches(&tree));
}

#[test]
fn childless_nodes_pay_for_the_whole_other_subtree() {
    let tree = sample_tree();
    let lone_root = TesTree::with_root(0);
    assert_eq!(lone_root.distance(&tree), 9);
    assert_eq!(tree.distance(&lone_root), 9);
}

#[test]
fn surplus_children_cost_their_subtrees() {
    let wide = TesTree::from_levels(&[(0, 0, 0), (1, 1, 0), (1, 2, 0)]).unwrap();
    let narrow = TesTree::from_levels(&[(0, 0, 0), (1, 1, 0)]).unwrap();
    assert_eq!(wide.distance(&narrow), 1);
    assert_eq!(narrow.distance(&wide), 1);
    assert!(!wide.matches(&narrow));
}

#[test]
fn histograms_accumulate_per_level_mismatches() {
    let wide = TesTree::from_levels(&[(0, 0, 0), (1, 1, 0), (1, 2, 0)]).unwrap();
    let narrow = TesTree::from_levels(&[(0, 0, 0), (1, 1, 0)]).unwrap();
    // Level zero: {2 children: 1} vs {1 child: 1} = 2; level one: one extra
    // leaf = 1.
    assert_eq!(wide.histogram_distance(&narrow), 3);
}

// ========== Delta search ==========

#[test]
fn trivial_sequence_is_found_on_a_single_cluster() -> Cancellable<()> {
    init_logger();
    let atm = AtmCounts::from_rows(vec![vec![1]]).normalize();
    let target = TesTree::build(atm.probabilities(), &[0.0]).unwrap();

    let config = DeltaSearchConfig::new(atm, target);
    let state = DeltaSearchState::try_new(&config).unwrap();
    let fit = DeltaSearch::configure(config, state).compute()?.unwrap();

    assert_eq!(fit.deltas, vec![0.0]);
    assert_eq!(fit.distance, 0);
    Ok(())
}

#[test]
fn exact_search_recovers_the_splitting_threshold() -> Cancellable<()> {
    init_logger();
    let atm = AtmCounts::from_rows(vec![vec![9, 1], vec![1, 9]]).normalize();
    let target = TesTree::from_levels(&[(0, 0, 0), (1, 1, 0), (1, 2, 0)]).unwrap();

    let config = DeltaSearchConfig::new(atm, target);
    let state = DeltaSearchState::try_new(&config).unwrap();
    assert_eq!(state.candidates(), &[0.1, 0.9]);
    let fit = DeltaSearch::configure(config, state).compute()?.unwrap();

    assert_eq!(fit.deltas, vec![0.0, 0.9]);
    assert_eq!(fit.distance, 0);
    Ok(())
}

#[test]
fn exact_search_without_a_match_returns_none() -> Cancellable<()> {
    init_logger();
    let atm = AtmCounts::from_rows(vec![vec![9, 1], vec![1, 9]]).normalize();
    // No threshold sequence of depth one produces three children here.
    let target =
        TesTree::from_levels(&[(0, 0, 0), (1, 1, 0), (1, 2, 0), (1, 3, 0)]).unwrap();

    let config = DeltaSearchConfig::new(atm, target);
    let state = DeltaSearchState::try_new(&config).unwrap();
    let fit = DeltaSearch::configure(config, state).compute()?;
    assert!(fit.is_none());
    Ok(())
}

#[test]
fn distance_search_tracks_the_best_candidate() -> Cancellable<()> {
    init_logger();
    let atm = AtmCounts::from_rows(vec![vec![9, 1], vec![1, 9]]).normalize();
    let target =
        TesTree::from_levels(&[(0, 0, 0), (1, 1, 0), (1, 2, 0), (1, 3, 0)]).unwrap();

    let config =
        DeltaSearchConfig::new(atm, target).with_metric(ComparisonMetric::MinDistance);
    let state = DeltaSearchState::try_new(&config).unwrap();
    let fit = DeltaSearch::configure(config, state).compute()?.unwrap();

    // Splitting at 0.9 yields two of the three requested children; the third
    // stays missing.
    assert_eq!(fit.deltas, vec![0.0, 0.9]);
    assert_eq!(fit.distance, 1);
    Ok(())
}

#[test]
fn distance_search_exits_early_on_a_perfect_candidate() -> Cancellable<()> {
    init_logger();
    let atm = AtmCounts::from_rows(vec![vec![9, 1], vec![1, 9]]).normalize();
    let target = TesTree::from_levels(&[(0, 0, 0), (1, 1, 0), (1, 2, 0)]).unwrap();

    let config = DeltaSearchConfig::new(atm, target).with_metric(ComparisonMetric::Histogram);
    let state = DeltaSearchState::try_new(&config).unwrap();
    let fit = DeltaSearch::configure(config, state).compute()?.unwrap();

    assert_eq!(fit.distance, 0);
    assert_eq!(fit.deltas, vec![0.0, 0.9]);
    Ok(())
}

#[test]
fn deep_targets_need_enough_candidates() {
    init_logger();
    let atm = AtmCounts::from_rows(vec![vec![1]]).normalize();
    let target = TesTree::from_levels(&[(0, 0, 0), (1, 1, 0), (2, 2, 1)]).unwrap();

    let config = DeltaSearchConfig::new(atm, target);
    match DeltaSearchState::try_new(&config) {
        Err(error) => assert_eq!(
            error,
            DeltaSearchError::NotEnoughThresholds {
                required: 2,
                available: 1,
            }
        ),
        Ok(_) => panic!("A two-level target cannot be searched with one candidate"),
    }
}

#[test]
fn grid_candidates_enumerate_the_configured_range() {
    init_logger();
    let atm = AtmCounts::from_rows(vec![vec![1]]).normalize();
    let target = TesTree::build(atm.probabilities(), &[0.0]).unwrap();

    let config = DeltaSearchConfig::new(atm, target).with_candidates(ThresholdCandidates::Grid {
        start: 0.01,
        end: 0.05,
        step: 0.01,
    });
    let state = DeltaSearchState::try_new(&config).unwrap();
    assert_eq!(state.candidates().len(), 4);
}

#[cfg(feature = "serde")]
#[test]
fn tree_serialization_round_trip() {
    let tree = sample_tree();
    let json = serde_json::to_string(&tree).unwrap();
    let restored: TesTree = serde_json::from_str(&json).unwrap();
    assert_eq!(tree, restored);
}
