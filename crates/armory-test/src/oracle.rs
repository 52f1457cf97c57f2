//! Exhaustive reference search.
//!
//! Enumerates every combination of one piece or nothing per category and
//! one charm or nothing, and decides jewel feasibility by forward
//! reachability over individual slots. Nothing here shares code with the
//! search engine, so the two can be checked against each other.

use std::collections::{HashMap, HashSet};

use armory_core::{
    Catalog, Category, CharmId, DesiredAbilities, Equippable, JewelId, PieceId, SkillId,
    CATEGORY_COUNT,
};

/// Armor and charm part of a combination, without jewels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Loadout {
    pub pieces: [Option<PieceId>; CATEGORY_COUNT],
    pub charm: Option<CharmId>,
}

/// Every loadout whose armor, charm and some jewel placement meet all
/// desired levels.
///
/// `extra` lists additional slot sizes available to jewels and `limits`
/// caps how many copies of a jewel may be placed.
pub fn brute_force(
    catalog: &Catalog,
    desired: &DesiredAbilities,
    extra: &[u8],
    limits: &HashMap<JewelId, u32>,
) -> Vec<Loadout> {
    let targets: Vec<(SkillId, u32)> = desired.iter().map(|a| (a.skill, a.level)).collect();
    let mut found = Vec::new();
    let mut pieces = [None; CATEGORY_COUNT];
    enumerate(catalog, &targets, extra, limits, 0, &mut pieces, &mut found);
    found
}

fn enumerate(
    catalog: &Catalog,
    targets: &[(SkillId, u32)],
    extra: &[u8],
    limits: &HashMap<JewelId, u32>,
    depth: usize,
    pieces: &mut [Option<PieceId>; CATEGORY_COUNT],
    found: &mut Vec<Loadout>,
) {
    if depth < CATEGORY_COUNT {
        let category = Category::ALL[depth];
        let options = std::iter::once(None)
            .chain(catalog.pieces(category).iter().map(|p| Some(p.id)));
        for option in options {
            pieces[depth] = option;
            enumerate(catalog, targets, extra, limits, depth + 1, pieces, found);
        }
        pieces[depth] = None;
        return;
    }

    let charms = std::iter::once(None).chain(catalog.charms().iter().map(|c| Some(c.id)));
    for charm in charms {
        let loadout = Loadout {
            pieces: *pieces,
            charm,
        };
        if is_feasible(catalog, targets, extra, limits, &loadout) {
            found.push(loadout);
        }
    }
}

fn is_feasible(
    catalog: &Catalog,
    targets: &[(SkillId, u32)],
    extra: &[u8],
    limits: &HashMap<JewelId, u32>,
    loadout: &Loadout,
) -> bool {
    let mut items: Vec<&dyn Equippable> = Vec::new();
    for id in loadout.pieces.iter().flatten() {
        if let Some(piece) = catalog.piece(*id) {
            items.push(piece);
        }
    }
    if let Some(charm) = loadout.charm.and_then(|id| catalog.charm(id)) {
        items.push(charm);
    }

    let start: Vec<u32> = targets
        .iter()
        .map(|&(skill, target)| items.iter().map(|i| i.level_of(skill)).sum::<u32>().min(target))
        .collect();

    let mut slots: Vec<u8> = items.iter().flat_map(|i| i.slots().iter().copied()).collect();
    slots.extend_from_slice(extra);

    let jewels: Vec<_> = catalog
        .jewels()
        .iter()
        .filter_map(|j| {
            targets
                .iter()
                .position(|&(skill, _)| skill == j.ability.skill)
                .map(|pos| (j, pos))
        })
        .collect();

    // State: capped levels plus copies used of each jewel.
    let mut states: HashSet<(Vec<u32>, Vec<u32>)> = HashSet::new();
    states.insert((start, vec![0; jewels.len()]));

    for &slot in &slots {
        let mut next = states.clone();
        for (levels, used) in &states {
            for (n, (jewel, pos)) in jewels.iter().enumerate() {
                if !jewel.fits(slot) {
                    continue;
                }
                if limits.get(&jewel.id).is_some_and(|&cap| used[n] >= cap) {
                    continue;
                }
                let mut levels = levels.clone();
                levels[*pos] = (levels[*pos] + jewel.ability.level).min(targets[*pos].1);
                let mut used = used.clone();
                used[n] += 1;
                next.insert((levels, used));
            }
        }
        states = next;
    }

    states.iter().any(|(levels, _)| {
        levels
            .iter()
            .zip(targets)
            .all(|(&level, &(_, target))| level >= target)
    })
}
