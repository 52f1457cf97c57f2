//! Jewel fitting.
//!
//! Decides whether catalog jewels placed into a slot budget can close a
//! deficit vector. Abilities are handled one at a time: for each, the fitter
//! enumerates jewel multisets reaching the deficit, cheapest slot first, and
//! commits the slot demand. When a later ability cannot be served from what
//! is left, it backtracks to the next multiset of the most recently
//! committed ability. Failed `(ability, committed demand)` states are
//! remembered for the rest of the call, which bounds the work by the number
//! of distinct slot profiles rather than the number of multisets.
//!
//! Feasibility of a demand against the budget is the sorted-pairwise check
//! of [`SlotCounts::covers`], so the order in which jewels are committed
//! never matters for the final placement.

use std::collections::{HashMap, HashSet};

use armory_core::{Catalog, JewelId, SlotCounts};
use tracing::trace;

use crate::index::AbilityIndex;

#[derive(Debug, Clone, Copy)]
struct JewelOption {
    /// Catalog position.
    jewel: usize,
    size: u8,
    level: u32,
    limit: Option<u32>,
}

/// Closes ability deficits with jewels.
#[derive(Debug, Clone)]
pub struct JewelFitter {
    /// Per desired ability: usable jewels, cheapest slot first.
    options: Vec<Vec<JewelOption>>,
}

impl JewelFitter {
    /// Builds the per-ability jewel alternatives.
    ///
    /// `limits` caps how many of a jewel may be used; a limit of zero makes
    /// the jewel unavailable. A jewel that needs no smaller slot and grants
    /// no more than an unlimited alternative is never tried.
    pub fn new(catalog: &Catalog, index: &AbilityIndex, limits: &HashMap<JewelId, u32>) -> Self {
        let options = (0..index.len())
            .map(|position| {
                let usable: Vec<JewelOption> = index
                    .jewels_for(position)
                    .iter()
                    .map(|&i| {
                        let jewel = &catalog.jewels()[i];
                        JewelOption {
                            jewel: i,
                            size: jewel.slot_size,
                            level: jewel.ability.level,
                            limit: limits.get(&jewel.id).copied(),
                        }
                    })
                    .filter(|option| option.limit != Some(0))
                    .collect();
                drop_dominated(usable)
            })
            .collect();
        Self { options }
    }

    /// Number of usable alternatives for the ability at `position`.
    pub fn alternatives(&self, position: usize) -> usize {
        self.options.get(position).map_or(0, Vec::len)
    }

    /// Largest level a single jewel grants toward the ability at `position`.
    pub fn max_level(&self, position: usize) -> u32 {
        self.options
            .get(position)
            .and_then(|options| options.iter().map(|o| o.level).max())
            .unwrap_or(0)
    }

    /// Finds jewels closing every deficit within `budget`.
    ///
    /// Returns catalog positions of the chosen jewels, empty when nothing is
    /// missing, or `None` when no assignment exists.
    pub fn fit(&self, deficit: &[u32], budget: &SlotCounts) -> Option<Vec<usize>> {
        let needs: Vec<(usize, u32)> = deficit
            .iter()
            .enumerate()
            .filter(|&(_, &need)| need > 0)
            .map(|(position, &need)| (position, need))
            .collect();
        if needs.is_empty() {
            return Some(Vec::new());
        }
        if needs.iter().any(|&(position, _)| self.alternatives(position) == 0) {
            return None;
        }
        // One jewel per slot and at most `max_level` per jewel.
        let lower_bound: u32 = needs
            .iter()
            .map(|&(position, need)| need.div_ceil(self.max_level(position)))
            .sum();
        if lower_bound > budget.total() {
            return None;
        }

        let mut search = FitSearch {
            fitter: self,
            needs: &needs,
            budget,
            failed: HashSet::new(),
            chosen: Vec::new(),
        };
        if search.ability(0, SlotCounts::new()) {
            Some(search.chosen)
        } else {
            trace!(
                event = "fit_failed",
                abilities = needs.len(),
                states = search.failed.len(),
            );
            None
        }
    }
}

/// Keeps jewels no unlimited alternative dominates. Input order is kept.
fn drop_dominated(options: Vec<JewelOption>) -> Vec<JewelOption> {
    options
        .iter()
        .enumerate()
        .filter(|&(i, option)| {
            !options.iter().enumerate().any(|(j, other)| {
                j != i
                    && other.limit.is_none()
                    && other.size <= option.size
                    && other.level >= option.level
                    && (other.size < option.size || other.level > option.level || j < i)
            })
        })
        .map(|(_, option)| *option)
        .collect()
}

struct FitSearch<'a> {
    fitter: &'a JewelFitter,
    needs: &'a [(usize, u32)],
    budget: &'a SlotCounts,
    failed: HashSet<(usize, SlotCounts)>,
    chosen: Vec<usize>,
}

impl FitSearch<'_> {
    /// Serves the `k`-th positive deficit and every one after it.
    fn ability(&mut self, k: usize, committed: SlotCounts) -> bool {
        if k == self.needs.len() {
            return true;
        }
        if self.failed.contains(&(k, committed)) {
            return false;
        }
        let (position, need) = self.needs[k];
        let mut used = vec![0u32; self.fitter.options[position].len()];
        if self.pick(k, position, committed, need, 0, &mut used) {
            return true;
        }
        self.failed.insert((k, committed));
        false
    }

    /// Extends the current multiset with alternatives from `start` onward.
    fn pick(
        &mut self,
        k: usize,
        position: usize,
        demand: SlotCounts,
        remaining: u32,
        start: usize,
        used: &mut [u32],
    ) -> bool {
        if remaining == 0 {
            return self.ability(k + 1, demand);
        }
        let fitter = self.fitter;
        let options = &fitter.options[position];
        for o in start..options.len() {
            let option = options[o];
            if option.limit.is_some_and(|limit| used[o] >= limit) {
                continue;
            }
            let mut next = demand;
            next.push(option.size);
            if !self.budget.covers(&next) {
                // Later alternatives need slots at least as large.
                break;
            }
            used[o] += 1;
            self.chosen.push(option.jewel);
            if self.pick(
                k,
                position,
                next,
                remaining.saturating_sub(option.level),
                o,
                used,
            ) {
                return true;
            }
            self.chosen.pop();
            used[o] -= 1;
        }
        false
    }
}

#[cfg(test)]
#[path = "jewel_tests.rs"]
mod tests;
