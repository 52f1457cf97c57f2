//! Depth-first loadout search.
//!
//! The solver walks the cross product of loadout parts (five armor
//! categories and the charm), fewest candidates first. Every complete
//! combination is judged by the jewel fitter; matches are kept, everything
//! else is dropped on the spot.
//!
//! Three prunings cut the tree, each switchable through `[pruning]`:
//! static dominance in the candidate filter, dominance restricted to the
//! abilities a partial combination has not yet satisfied, and an optimistic
//! bound that gives up on a branch when even the best remaining pieces plus
//! a jewel in every remaining slot cannot reach some target.

use std::collections::HashMap;
use std::rc::Rc;

use armory_config::{PruningConfig, SearchConfig};
use armory_core::{
    ArmoryError, Catalog, RankingCriterion, Result, SlotCounts, SortOrder, CATEGORY_COUNT,
};
use tracing::{debug, info, trace, warn};

use crate::cancel::CancellationHandle;
use crate::candidate::{non_dominated, Candidate, CandidateFilter, Choice, LoadoutPart};
use crate::combination::{Combination, JewelAssignment};
use crate::event::{ProgressSink, SearchEvent};
use crate::index::{AbilityIndex, EntityRef, Levels, Relevance};
use crate::jewel::JewelFitter;
use crate::ranker::ResultRanker;
use crate::request::{SearchReport, SearchRequest, SearchResult, SearchStatus};
use crate::statistics::SearchStatistics;

/// Lifecycle of a [`Solver`]. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverState {
    Idle,
    Running,
    Completed,
    Cancelled,
}

/// One search over one catalog snapshot.
///
/// A solver runs once. Starting another search means building a new solver
/// with a fresh cancellation handle.
///
/// # Example
///
/// ```
/// use armory_config::SearchConfig;
/// use armory_core::{Catalog, Category, DesiredAbilities, EquipmentPiece, Skill, SkillId};
/// use armory_search::{SearchRequest, SearchStatus, Solver};
///
/// let catalog = Catalog::builder()
///     .skill(Skill::new(1, "Attack Boost", 7))
///     .piece(EquipmentPiece::new(1, "Helm", Category::Head).with_ability(SkillId(1), 2))
///     .build()
///     .unwrap();
/// let request = SearchRequest::new(DesiredAbilities::new().with(SkillId(1), 2));
///
/// let mut solver = Solver::new(&catalog, &request, &SearchConfig::default()).unwrap();
/// let report = solver.run().unwrap();
///
/// assert_eq!(report.status, SearchStatus::Completed);
/// assert_eq!(report.results.len(), 1);
/// ```
pub struct Solver<'a> {
    catalog: &'a Catalog,
    request: &'a SearchRequest,
    criteria: Vec<RankingCriterion>,
    pruning: PruningConfig,
    progress_interval: u64,
    max_results: Option<usize>,
    cancel: CancellationHandle,
    sink: Option<Box<dyn ProgressSink + 'a>>,
    state: SolverState,
}

impl std::fmt::Debug for Solver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Solver")
            .field("criteria", &self.criteria)
            .field("pruning", &self.pruning)
            .field("state", &self.state)
            .finish()
    }
}

impl<'a> Solver<'a> {
    /// Validates the request and configuration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` for an invalid desired set, unknown or
    /// repeated ranking criteria, a zero result limit, or limits on unknown
    /// jewels.
    pub fn new(
        catalog: &'a Catalog,
        request: &'a SearchRequest,
        config: &SearchConfig,
    ) -> Result<Self> {
        request.validate(catalog)?;
        config.validate()?;
        let criteria = config.ranking_criteria()?;
        Ok(Self {
            catalog,
            request,
            criteria,
            pruning: config.pruning,
            progress_interval: config.progress.interval,
            max_results: config.max_results,
            cancel: CancellationHandle::new(),
            sink: None,
            state: SolverState::Idle,
        })
    }

    /// Uses `handle` instead of the solver's own cancellation handle.
    pub fn with_cancellation(mut self, handle: CancellationHandle) -> Self {
        self.cancel = handle;
        self
    }

    pub fn with_progress(mut self, sink: impl ProgressSink + 'a) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn cancellation_handle(&self) -> CancellationHandle {
        self.cancel.clone()
    }

    pub fn state(&self) -> SolverState {
        self.state
    }

    /// Runs the search to completion or cancellation.
    ///
    /// # Errors
    ///
    /// Returns `InvalidState` when the solver has already run.
    pub fn run(&mut self) -> Result<SearchReport> {
        if self.state != SolverState::Idle {
            return Err(ArmoryError::InvalidState(format!(
                "solver is {:?}; start a new search instead",
                self.state
            )));
        }
        self.state = SolverState::Running;

        let mut statistics = SearchStatistics::default();
        statistics.start();

        let catalog = self.catalog;
        let index = AbilityIndex::build(catalog, self.request.desired());
        let filter = CandidateFilter::new(catalog, &index, &self.criteria, self.pruning.dominance);
        let fitter = JewelFitter::new(catalog, &index, self.request.jewel_limits());
        let ranker = ResultRanker::new(self.criteria.clone());

        for (position, skill) in index.skills().iter().enumerate() {
            debug!(
                event = "ability_sources",
                skill = %skill,
                contributors = index.contributors(position).len(),
            );
        }

        let mut layers: Vec<Layer> = LoadoutPart::ALL
            .iter()
            .map(|&part| {
                let total = match part {
                    LoadoutPart::Armor(category) => catalog.pieces(category).len() + 1,
                    LoadoutPart::Charm => catalog.charms().len() + 1,
                };
                let candidates = filter.candidates(part);
                let irrelevant = irrelevant_entries(catalog, &index, part);
                debug!(
                    event = "candidates",
                    part = %part,
                    total = total,
                    irrelevant = irrelevant,
                    kept = candidates.len(),
                );
                statistics.candidates_total += total;
                statistics.candidates_irrelevant += irrelevant;
                statistics.candidates_kept += candidates.len();
                Layer { part, candidates }
            })
            .collect();
        layers.sort_by_key(|layer| layer.candidates.len());

        let counts: Vec<usize> = layers.iter().map(|l| l.candidates.len()).collect();
        statistics.search_space = counts
            .iter()
            .fold(1u128, |acc, &n| acc.saturating_mul(n as u128));

        info!(
            event = "search_start",
            abilities = index.len(),
            candidates = statistics.candidates_kept,
            search_space = %statistics.search_space,
        );

        let mut sink = self.sink.take();
        if let Some(sink) = sink.as_deref_mut() {
            sink.on_event(&SearchEvent::Started {
                candidates: counts,
                search_space: statistics.search_space,
            });
        }

        let incremental =
            self.pruning.incremental && filter.dominance_enabled() && index.len() <= 64;
        let bounds = Bounds::new(&layers, &index, &fitter, self.request.extra_slots());

        let mut search = Search {
            catalog,
            extra: self.request.extra_slots(),
            targets: index.targets(),
            fitter: &fitter,
            ranker: &ranker,
            layers: &layers,
            orders: filter.orders(),
            bounds: self.pruning.bound.then_some(&bounds),
            incremental,
            survivors: vec![HashMap::new(); layers.len()],
            chosen: vec![0; layers.len()],
            cancel: &self.cancel,
            sink: sink.as_deref_mut().map(|s| s as &mut dyn ProgressSink),
            progress_interval: self.progress_interval,
            max_results: self.max_results,
            statistics,
            results: Vec::new(),
            cancelled: false,
            stopped: false,
        };

        let root: Levels = Levels::from_elem(0, index.len());
        if self.cancel.is_cancelled() {
            search.cancelled = true;
        } else {
            search.descend(0, &root, SlotCounts::new());
        }

        let cancelled = search.cancelled;
        let mut statistics = search.statistics;
        let results = ranker.rank(search.results);
        statistics.finish();

        let status = if cancelled {
            self.state = SolverState::Cancelled;
            SearchStatus::Cancelled
        } else {
            self.state = SolverState::Completed;
            SearchStatus::Completed
        };

        let elapsed = statistics.elapsed();
        info!(
            event = "search_end",
            status = status.as_str(),
            combinations = statistics.combinations_evaluated,
            matches = statistics.matches,
            duration_ms = elapsed.as_millis() as u64,
            speed = statistics.combinations_per_second(),
            truncated = statistics.truncated,
        );
        if let Some(sink) = sink.as_deref_mut() {
            sink.on_event(&SearchEvent::Finished {
                status,
                explored: statistics.combinations_evaluated,
                matches: statistics.matches,
                elapsed,
            });
        }

        Ok(SearchReport {
            status,
            results,
            statistics,
        })
    }
}

struct Layer {
    part: LoadoutPart,
    candidates: Vec<Candidate>,
}

/// Optimistic reachability data, per depth.
struct Bounds {
    /// Best capped level per ability over the layers from each depth on.
    levels: Vec<Levels>,
    /// Most slots the layers from each depth on can add.
    slots: Vec<u32>,
    jewel_max: Levels,
    extra_slots: u32,
}

impl Bounds {
    fn new(layers: &[Layer], index: &AbilityIndex, fitter: &JewelFitter, extra: &SlotCounts) -> Self {
        let abilities = index.len();
        let mut levels = vec![Levels::from_elem(0, abilities); layers.len() + 1];
        let mut slots = vec![0u32; layers.len() + 1];

        for depth in (0..layers.len()).rev() {
            let candidates = &layers[depth].candidates;
            let mut best = levels[depth + 1].clone();
            for (position, level) in best.iter_mut().enumerate() {
                *level += candidates
                    .iter()
                    .map(|c| c.levels[position])
                    .max()
                    .unwrap_or(0);
            }
            levels[depth] = best;
            slots[depth] = slots[depth + 1]
                + candidates
                    .iter()
                    .map(|c| c.slots.total())
                    .max()
                    .unwrap_or(0);
        }

        Self {
            levels,
            slots,
            jewel_max: (0..abilities).map(|p| fitter.max_level(p)).collect(),
            extra_slots: extra.total(),
        }
    }

    /// False when no completion of the partial combination can match.
    fn reachable(&self, depth: usize, targets: &[u32], levels: &[u32], slots: &SlotCounts) -> bool {
        let mut jewels_needed = 0u32;
        for (position, &target) in targets.iter().enumerate() {
            let best = levels[position] + self.levels[depth][position];
            if best >= target {
                continue;
            }
            let per_jewel = self.jewel_max[position];
            if per_jewel == 0 {
                return false;
            }
            jewels_needed += (target - best).div_ceil(per_jewel);
        }
        jewels_needed <= slots.total() + self.slots[depth] + self.extra_slots
    }
}

struct Search<'s> {
    catalog: &'s Catalog,
    extra: &'s SlotCounts,
    targets: &'s [u32],
    fitter: &'s JewelFitter,
    ranker: &'s ResultRanker,
    layers: &'s [Layer],
    orders: &'s [SortOrder],
    bounds: Option<&'s Bounds>,
    incremental: bool,
    /// Per depth: surviving candidate positions per unsatisfied-ability mask.
    survivors: Vec<HashMap<u64, Rc<[usize]>>>,
    chosen: Vec<usize>,
    cancel: &'s CancellationHandle,
    sink: Option<&'s mut dyn ProgressSink>,
    progress_interval: u64,
    max_results: Option<usize>,
    statistics: SearchStatistics,
    results: Vec<SearchResult>,
    cancelled: bool,
    stopped: bool,
}

impl Search<'_> {
    fn descend(&mut self, depth: usize, levels: &Levels, slots: SlotCounts) {
        let layers = self.layers;
        if depth == layers.len() {
            self.evaluate(levels, slots);
            return;
        }
        if let Some(bounds) = self.bounds {
            if !bounds.reachable(depth, self.targets, levels, &slots) {
                self.statistics.pruned_by_bound += 1;
                return;
            }
        }
        self.statistics.record_node();

        let candidates = &layers[depth].candidates;
        let survivors = self.survivors_at(depth, levels);
        let is_last = depth + 1 == layers.len();

        for &position in survivors.iter() {
            if !is_last && self.cancel.is_cancelled() {
                self.cancelled = true;
                self.stopped = true;
            }
            if self.stopped {
                return;
            }
            let candidate = &candidates[position];
            let next: Levels = levels
                .iter()
                .zip(&candidate.levels)
                .zip(self.targets)
                .map(|((&have, &adds), &target)| (have + adds).min(target))
                .collect();
            let mut next_slots = slots;
            next_slots.add(&candidate.slots);

            self.chosen[depth] = position;
            self.descend(depth + 1, &next, next_slots);
        }
    }

    /// Candidates at `depth` not dominated on the abilities still missing.
    fn survivors_at(&mut self, depth: usize, levels: &Levels) -> Rc<[usize]> {
        let count = self.layers[depth].candidates.len();
        let mut mask = 0u64;
        if self.incremental {
            for (position, (&have, &target)) in levels.iter().zip(self.targets).enumerate() {
                if have < target {
                    mask |= 1 << position;
                }
            }
        }
        let all_missing = self.targets.len() >= 64 || mask == (1u64 << self.targets.len()) - 1;
        if !self.incremental || all_missing {
            return (0..count).collect();
        }

        let layers = self.layers;
        let orders = self.orders;
        let survivors = self.survivors[depth]
            .entry(mask)
            .or_insert_with(|| {
                non_dominated(&layers[depth].candidates, orders, |p| mask & (1 << p) != 0).into()
            })
            .clone();
        self.statistics.pruned_by_dominance += (count - survivors.len()) as u64;
        survivors
    }

    fn evaluate(&mut self, levels: &Levels, slots: SlotCounts) {
        self.statistics.record_leaf();
        let explored = self.statistics.combinations_evaluated;
        if self.progress_interval > 0 && explored % self.progress_interval == 0 {
            self.report_progress();
        }

        let deficit: Levels = self
            .targets
            .iter()
            .zip(levels)
            .map(|(&target, &have)| target.saturating_sub(have))
            .collect();

        let jewels = if deficit.iter().all(|&d| d == 0) {
            Vec::new()
        } else {
            self.statistics.record_fit();
            let mut budget = slots;
            budget.add(self.extra);
            match self.fitter.fit(&deficit, &budget) {
                Some(jewels) => jewels,
                None => return,
            }
        };

        if let Some(limit) = self.max_results {
            if self.results.len() >= limit {
                self.statistics.truncated = true;
                self.stopped = true;
                return;
            }
        }

        let combination = self.combination();
        let slot_refs = combination.slot_refs(self.catalog, self.extra);
        let Some(assignment) = JewelAssignment::place(self.catalog, &jewels, &slot_refs) else {
            warn!(event = "placement_failed", jewels = jewels.len(), slots = slot_refs.len());
            return;
        };
        let combination = combination.with_jewels(assignment);
        let keys = self.ranker.keys(self.catalog, &combination);

        trace!(event = "match", discovery_index = self.statistics.matches, jewels = jewels.len());
        self.results.push(SearchResult {
            combination,
            is_match: true,
            keys,
            discovery_index: self.statistics.matches,
        });
        self.statistics.record_match();
    }

    fn combination(&self) -> Combination {
        let mut pieces = [None; CATEGORY_COUNT];
        let mut charm = None;
        for (layer, &position) in self.layers.iter().zip(&self.chosen) {
            let Choice::Item(item) = layer.candidates[position].choice else {
                continue;
            };
            match layer.part {
                LoadoutPart::Armor(category) => {
                    pieces[category.index()] = Some(self.catalog.pieces(category)[item].id);
                }
                LoadoutPart::Charm => charm = Some(self.catalog.charms()[item].id),
            }
        }
        Combination::new(pieces, charm, JewelAssignment::new())
    }

    fn report_progress(&mut self) {
        let explored = self.statistics.combinations_evaluated;
        let elapsed = self.statistics.elapsed();
        debug!(
            event = "search_progress",
            combinations = explored,
            matches = self.statistics.matches,
            duration_ms = elapsed.as_millis() as u64,
        );
        if let Some(sink) = self.sink.as_deref_mut() {
            sink.on_event(&SearchEvent::Progress {
                explored,
                matches: self.statistics.matches,
                elapsed,
            });
        }
    }
}

/// Entries of `part` that grant none of the desired abilities.
fn irrelevant_entries(catalog: &Catalog, index: &AbilityIndex, part: LoadoutPart) -> usize {
    let entities: Vec<EntityRef> = match part {
        LoadoutPart::Armor(category) => (0..catalog.pieces(category).len())
            .map(|i| EntityRef::Piece(category, i))
            .collect(),
        LoadoutPart::Charm => (0..catalog.charms().len()).map(EntityRef::Charm).collect(),
    };
    entities
        .into_iter()
        .filter(|&entity| index.relevance(entity, catalog) == Relevance::Irrelevant)
        .count()
}

#[cfg(test)]
#[path = "solver_tests.rs"]
mod tests;
