use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap, HashSet};

use armory_config::SearchConfig;
use armory_core::{Category, DesiredAbilities, EquipmentPiece, Jewel, JewelId, PieceId, Skill, SkillId};
use armory_test::{brute_force, hunter_catalog, Loadout, RandomCatalog, ATTACK, GUARD};

use super::*;
use crate::combination::SlotSource;

const X: SkillId = SkillId(1);

fn run(catalog: &Catalog, request: &SearchRequest, config: &SearchConfig) -> SearchReport {
    Solver::new(catalog, request, config).unwrap().run().unwrap()
}

fn loadout(result: &SearchResult) -> Loadout {
    Loadout {
        pieces: *result.combination.pieces(),
        charm: result.combination.charm(),
    }
}

fn loadouts(report: &SearchReport) -> BTreeSet<Loadout> {
    report.results.iter().map(loadout).collect()
}

fn compare_keys(criteria: &[RankingCriterion], a: &[i64], b: &[i64]) -> Ordering {
    criteria
        .iter()
        .zip(a.iter().zip(b))
        .map(|(c, (&a, &b))| c.order.compare(a, b))
        .find(|o| o.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Every result meets every target with jewels that fit distinct slots.
fn assert_sound(catalog: &Catalog, request: &SearchRequest, report: &SearchReport) {
    for result in &report.results {
        let combination = &result.combination;
        assert!(result.is_match);
        for ability in request.desired().iter() {
            assert!(
                combination.level_of(catalog, ability.skill) >= ability.level,
                "{combination:?} misses {}",
                ability.skill
            );
        }

        let slots = combination.slot_refs(catalog, request.extra_slots());
        let mut used = HashSet::new();
        let mut per_jewel: HashMap<JewelId, u32> = HashMap::new();
        for placement in combination.jewels().placements() {
            let jewel = catalog.jewel(placement.jewel).unwrap();
            assert!(slots.contains(&placement.slot));
            assert!(jewel.fits(placement.slot.size));
            assert!(used.insert(placement.slot), "slot used twice");
            *per_jewel.entry(jewel.id).or_default() += 1;
        }
        for (jewel, &count) in &per_jewel {
            if let Some(&limit) = request.jewel_limits().get(jewel) {
                assert!(count <= limit);
            }
        }
    }
}

fn single_skill_catalog(pieces: Vec<EquipmentPiece>, jewels: Vec<Jewel>) -> Catalog {
    let mut builder = Catalog::builder();
    builder.add_skill(Skill::new(X.0, "Attack Boost", 7));
    for piece in pieces {
        builder.add_piece(piece);
    }
    for jewel in jewels {
        builder.add_jewel(jewel);
    }
    builder.build().unwrap()
}

#[test]
fn test_only_combinations_with_the_granting_piece_match() {
    let catalog = single_skill_catalog(
        vec![
            EquipmentPiece::new(1, "A", Category::Head).with_ability(X, 2),
            EquipmentPiece::new(2, "B", Category::Head),
        ],
        vec![],
    );
    let request = SearchRequest::new(DesiredAbilities::new().with(X, 2));

    for config in [SearchConfig::default(), SearchConfig::default().with_pruning(false)] {
        let report = run(&catalog, &request, &config);
        assert_eq!(report.status, SearchStatus::Completed);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].combination.piece(Category::Head), Some(PieceId(1)));
        assert!(report.results[0].combination.jewels().is_empty());
        assert_eq!(report.statistics.candidates_irrelevant, 1);
    }
}

#[test]
fn test_jewel_closes_deficit_in_large_enough_slot() {
    let jewel = Jewel::new(1, "Attack Jewel+", 2, X, 2);
    let catalog = single_skill_catalog(
        vec![EquipmentPiece::new(1, "Helm", Category::Head)
            .with_slots([2])
            .with_ability(X, 1)],
        vec![jewel.clone()],
    );
    let request = SearchRequest::new(DesiredAbilities::new().with(X, 3));

    let report = run(&catalog, &request, &SearchConfig::default());
    assert_eq!(report.results.len(), 1);
    let placements = report.results[0].combination.jewels().placements();
    assert_eq!(placements.len(), 1);
    assert_eq!(placements[0].jewel, JewelId(1));
    assert_eq!(placements[0].slot.source, SlotSource::Armor(Category::Head));
    assert_sound(&catalog, &request, &report);

    let catalog = single_skill_catalog(
        vec![EquipmentPiece::new(1, "Helm", Category::Head)
            .with_slots([1])
            .with_ability(X, 1)],
        vec![jewel],
    );
    let report = run(&catalog, &request, &SearchConfig::default());
    assert!(report.is_no_match());
    assert!(!report.is_cancelled());
}

#[test]
fn test_extra_slots_hold_jewels() {
    let catalog = single_skill_catalog(vec![], vec![Jewel::new(1, "Attack Jewel", 1, X, 1)]);
    let desired = DesiredAbilities::new().with(X, 2);

    let request = SearchRequest::new(desired.clone());
    assert!(run(&catalog, &request, &SearchConfig::default()).is_no_match());

    let request = SearchRequest::new(desired).with_extra_slots(SlotCounts::from_sizes(&[1, 1]));
    let report = run(&catalog, &request, &SearchConfig::default());
    assert_eq!(report.results.len(), 1);
    let jewels = report.results[0].combination.jewels();
    assert_eq!(jewels.len(), 2);
    assert!(jewels
        .placements()
        .iter()
        .all(|p| p.slot.source == SlotSource::Extra));
    assert_eq!(jewels.grouped(), vec![(JewelId(1), 2)]);
}

#[test]
fn test_jewel_limit_is_respected() {
    let catalog = single_skill_catalog(vec![], vec![Jewel::new(1, "Attack Jewel", 1, X, 1)]);
    let request = SearchRequest::new(DesiredAbilities::new().with(X, 2))
        .with_extra_slots(SlotCounts::from_sizes(&[1, 1]))
        .with_jewel_limit(JewelId(1), 1);

    assert!(run(&catalog, &request, &SearchConfig::default()).is_no_match());
}

#[test]
fn test_matches_brute_force_without_pruning() {
    for seed in 0..12 {
        let shape = RandomCatalog::small(seed);
        let catalog = shape.generate();
        let request = SearchRequest::new(shape.desired(seed));
        let config = SearchConfig::default().with_pruning(false);

        let report = run(&catalog, &request, &config);
        let expected: BTreeSet<Loadout> =
            brute_force(&catalog, request.desired(), &[], &HashMap::new())
                .into_iter()
                .collect();

        assert_eq!(loadouts(&report), expected, "seed {seed}");
        assert_eq!(report.results.len(), expected.len(), "seed {seed}");
        assert_sound(&catalog, &request, &report);
    }
}

#[test]
fn test_bound_pruning_loses_no_match() {
    for seed in 20..32 {
        let shape = RandomCatalog::small(seed);
        let catalog = shape.generate();
        let request = SearchRequest::new(shape.desired(seed))
            .with_extra_slots(SlotCounts::from_sizes(&[2]));
        let mut config = SearchConfig::default().with_pruning(false);
        config.pruning.bound = true;

        let report = run(&catalog, &request, &config);
        let expected: BTreeSet<Loadout> =
            brute_force(&catalog, request.desired(), &[2], &HashMap::new())
                .into_iter()
                .collect();

        assert_eq!(loadouts(&report), expected, "seed {seed}");
    }
}

#[test]
fn test_jewel_limits_and_extra_slots_match_brute_force() {
    const EXTRA: [&[u8]; 4] = [&[], &[1, 3], &[2, 2, 4], &[4]];

    for seed in 100..124 {
        let shape = RandomCatalog::small(seed);
        let catalog = shape.generate();
        let extra = EXTRA[seed as usize % EXTRA.len()];
        let request = SearchRequest::new(shape.desired(seed))
            .with_extra_slots(SlotCounts::from_sizes(extra))
            .with_jewel_limit(JewelId(seed as u32 % 5 + 1), (seed % 2) as u32)
            .with_jewel_limit(JewelId((seed as u32 + 2) % 5 + 1), 1);

        let expected: BTreeSet<Loadout> =
            brute_force(&catalog, request.desired(), extra, request.jewel_limits())
                .into_iter()
                .collect();

        let unpruned = run(&catalog, &request, &SearchConfig::default().with_pruning(false));
        assert_eq!(loadouts(&unpruned), expected, "seed {seed}");
        assert_sound(&catalog, &request, &unpruned);

        let pruned = run(&catalog, &request, &SearchConfig::default());
        assert!(loadouts(&pruned).is_subset(&expected), "seed {seed}");
        assert_eq!(pruned.results.is_empty(), expected.is_empty(), "seed {seed}");
        assert_sound(&catalog, &request, &pruned);
    }
}

#[test]
fn test_full_pruning_keeps_best_ranked_match() {
    for seed in 40..56 {
        let shape = RandomCatalog::small(seed);
        let catalog = shape.generate();
        let request = SearchRequest::new(shape.desired(seed));
        let config = SearchConfig::default();
        let criteria = config.ranking_criteria().unwrap();

        let report = run(&catalog, &request, &config);
        assert_sound(&catalog, &request, &report);

        let oracle = brute_force(&catalog, request.desired(), &[], &HashMap::new());
        let all: BTreeSet<Loadout> = oracle.iter().copied().collect();
        assert!(loadouts(&report).is_subset(&all), "seed {seed}");

        let ranker = ResultRanker::new(criteria.clone());
        let best = oracle
            .iter()
            .map(|l| ranker.keys(&catalog, &Combination::new(l.pieces, l.charm, JewelAssignment::new())))
            .min_by(|a, b| compare_keys(&criteria, a, b));

        match best {
            None => assert!(report.is_no_match(), "seed {seed}"),
            Some(best) => {
                assert!(!report.results.is_empty(), "seed {seed}");
                assert_eq!(
                    compare_keys(&criteria, &report.results[0].keys, &best),
                    Ordering::Equal,
                    "seed {seed}"
                );
            }
        }
    }
}

#[test]
fn test_results_are_ranked_and_deterministic() {
    let catalog = hunter_catalog();
    let request = SearchRequest::new(DesiredAbilities::new().with(ATTACK, 3).with(GUARD, 1));
    let config = SearchConfig::default().with_pruning(false);
    let criteria = config.ranking_criteria().unwrap();

    let first = run(&catalog, &request, &config);
    let second = run(&catalog, &request, &config);

    assert!(first.results.len() > 1);
    for pair in first.results.windows(2) {
        match compare_keys(&criteria, &pair[0].keys, &pair[1].keys) {
            Ordering::Less => {}
            Ordering::Equal => assert!(pair[0].discovery_index < pair[1].discovery_index),
            Ordering::Greater => panic!("results out of order"),
        }
    }
    let order = |r: &SearchReport| r.results.iter().map(loadout).collect::<Vec<_>>();
    assert_eq!(order(&first), order(&second));
}

#[test]
fn test_pre_cancelled_search_is_cancelled_not_unmatched() {
    let catalog = hunter_catalog();
    let request = SearchRequest::new(DesiredAbilities::new().with(ATTACK, 1));
    let handle = CancellationHandle::new();
    handle.cancel();

    let mut solver = Solver::new(&catalog, &request, &SearchConfig::default())
        .unwrap()
        .with_cancellation(handle);
    let report = solver.run().unwrap();

    assert_eq!(report.status, SearchStatus::Cancelled);
    assert!(report.results.is_empty());
    assert!(!report.is_no_match());
    assert_eq!(solver.state(), SolverState::Cancelled);
}

#[test]
fn test_cancel_during_search_stops_early() {
    let catalog = hunter_catalog();
    let request = SearchRequest::new(DesiredAbilities::new().with(ATTACK, 1))
        .with_extra_slots(SlotCounts::from_sizes(&[1]));
    let config = SearchConfig::default()
        .with_pruning(false)
        .with_progress_interval(1);
    let handle = CancellationHandle::new();
    let trigger = handle.clone();

    let mut solver = Solver::new(&catalog, &request, &config)
        .unwrap()
        .with_cancellation(handle)
        .with_progress(move |event: &SearchEvent| {
            if matches!(event, SearchEvent::Progress { .. }) {
                trigger.cancel();
            }
        });
    let report = solver.run().unwrap();

    assert!(report.is_cancelled());
    // The innermost layer (four head choices) finishes before the stop is seen.
    assert!(report.statistics.combinations_evaluated <= 4);
    assert!(report.statistics.search_space > 4);
    assert_sound(&catalog, &request, &report);
}

#[test]
fn test_second_run_is_invalid_state() {
    let catalog = hunter_catalog();
    let request = SearchRequest::new(DesiredAbilities::new().with(GUARD, 1));
    let mut solver = Solver::new(&catalog, &request, &SearchConfig::default()).unwrap();

    assert_eq!(solver.state(), SolverState::Idle);
    solver.run().unwrap();
    assert_eq!(solver.state(), SolverState::Completed);
    assert!(matches!(solver.run(), Err(ArmoryError::InvalidState(_))));
}

#[test]
fn test_invalid_configuration_is_rejected_before_search() {
    let catalog = hunter_catalog();
    let request = SearchRequest::new(DesiredAbilities::new().with(ATTACK, 1));

    let config = SearchConfig::default().with_criteria(["luck"]);
    assert!(matches!(
        Solver::new(&catalog, &request, &config),
        Err(ArmoryError::InvalidConfiguration(_))
    ));

    let empty = SearchRequest::new(DesiredAbilities::new());
    assert!(matches!(
        Solver::new(&catalog, &empty, &SearchConfig::default()),
        Err(ArmoryError::InvalidConfiguration(_))
    ));

    let unknown_jewel = request.clone().with_jewel_limit(JewelId(99), 1);
    assert!(matches!(
        Solver::new(&catalog, &unknown_jewel, &SearchConfig::default()),
        Err(ArmoryError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_max_results_truncates() {
    let catalog = hunter_catalog();
    let request = SearchRequest::new(DesiredAbilities::new().with(ATTACK, 1))
        .with_extra_slots(SlotCounts::from_sizes(&[1]));

    let config = SearchConfig::default().with_pruning(false).with_max_results(5);
    let report = run(&catalog, &request, &config);
    assert_eq!(report.status, SearchStatus::Completed);
    assert_eq!(report.results.len(), 5);
    assert!(report.statistics.truncated);

    let config = SearchConfig::default().with_pruning(false).with_max_results(10_000);
    let report = run(&catalog, &request, &config);
    assert_eq!(report.results.len(), 972);
    assert!(!report.statistics.truncated);
}

#[test]
fn test_zero_result_limit_is_invalid() {
    let catalog = hunter_catalog();
    let request = SearchRequest::new(DesiredAbilities::new().with(ATTACK, 1));
    let config = SearchConfig::default().with_max_results(0);

    assert!(matches!(
        Solver::new(&catalog, &request, &config),
        Err(ArmoryError::InvalidConfiguration(_))
    ));
}

#[test]
fn test_progress_events_are_ordered() {
    let catalog = hunter_catalog();
    let request = SearchRequest::new(DesiredAbilities::new().with(ATTACK, 2));
    let config = SearchConfig::default()
        .with_pruning(false)
        .with_progress_interval(100);

    let mut events = Vec::new();
    let report = {
        let mut solver = Solver::new(&catalog, &request, &config)
            .unwrap()
            .with_progress(|event: &SearchEvent| events.push(event.clone()));
        solver.run().unwrap()
    };

    assert!(matches!(
        events.first(),
        Some(SearchEvent::Started { search_space: 972, .. })
    ));
    assert!(matches!(
        events.last(),
        Some(SearchEvent::Finished {
            status: SearchStatus::Completed,
            explored: 972,
            ..
        })
    ));

    let progress: Vec<u64> = events
        .iter()
        .filter_map(|e| match e {
            SearchEvent::Progress { explored, .. } => Some(*explored),
            _ => None,
        })
        .collect();
    assert_eq!(progress, (1..=9).map(|n| n * 100).collect::<Vec<_>>());
    assert_eq!(report.statistics.combinations_evaluated, 972);
}
