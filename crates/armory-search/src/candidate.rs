//! Candidate lists and dominance pruning.
//!
//! A candidate is one choice for a loadout part (a piece, the charm, or
//! nothing) reduced to what the search needs: levels toward the desired
//! abilities capped at their targets, gem slots, and ranking keys.
//!
//! `a` dominates `b` when `a` is at least as good on every compared level,
//! covers `b`'s slots (sorted pairwise), is at least as good on every ranking
//! key in that key's direction, and differs from `b` somewhere. Equal
//! candidates never dominate each other, so dropping dominated candidates
//! keeps at least one dominator of every dropped candidate.

use std::fmt;

use armory_core::{Catalog, Category, Equippable, RankingCriterion, SlotCounts, SortOrder};
use smallvec::SmallVec;

use crate::index::{project, AbilityIndex, Levels};

/// One position of the cross product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadoutPart {
    Armor(Category),
    Charm,
}

impl LoadoutPart {
    pub const ALL: [LoadoutPart; 6] = [
        LoadoutPart::Armor(Category::Head),
        LoadoutPart::Armor(Category::Chest),
        LoadoutPart::Armor(Category::Gloves),
        LoadoutPart::Armor(Category::Waist),
        LoadoutPart::Armor(Category::Legs),
        LoadoutPart::Charm,
    ];
}

impl fmt::Display for LoadoutPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadoutPart::Armor(category) => write!(f, "{category}"),
            LoadoutPart::Charm => f.write_str("charm"),
        }
    }
}

/// What a candidate selects for its part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Choice {
    /// Nothing equipped.
    Empty,
    /// Catalog position within the part's list.
    Item(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub choice: Choice,
    /// Levels toward each desired ability, capped at the target.
    pub levels: Levels,
    pub slots: SlotCounts,
    /// Per configured ranking criterion.
    pub keys: SmallVec<[i64; 4]>,
}

impl Candidate {
    fn empty(abilities: usize, criteria: usize) -> Self {
        Self {
            choice: Choice::Empty,
            levels: SmallVec::from_elem(0, abilities),
            slots: SlotCounts::new(),
            keys: SmallVec::from_elem(0, criteria),
        }
    }

    fn from_item<E: Equippable>(
        choice: Choice,
        item: &E,
        index: &AbilityIndex,
        criteria: &[RankingCriterion],
    ) -> Self {
        let mut levels = project(index.skills(), item);
        for (level, &target) in levels.iter_mut().zip(index.targets()) {
            *level = (*level).min(target);
        }
        Self {
            choice,
            levels,
            slots: item.slot_counts(),
            keys: criteria
                .iter()
                .map(|c| item.criterion_value(c.key).unwrap_or(0))
                .collect(),
        }
    }

    pub fn is_empty_choice(&self) -> bool {
        self.choice == Choice::Empty
    }

    /// Dominance restricted to the levels selected by `compared`.
    pub fn dominates(
        &self,
        other: &Candidate,
        orders: &[SortOrder],
        compared: impl Fn(usize) -> bool,
    ) -> bool {
        let mut strictly_better = false;

        for (position, (&mine, &theirs)) in self.levels.iter().zip(&other.levels).enumerate() {
            if !compared(position) {
                continue;
            }
            if mine < theirs {
                return false;
            }
            strictly_better |= mine > theirs;
        }

        if !self.slots.covers(&other.slots) {
            return false;
        }
        strictly_better |= self.slots != other.slots;

        for ((&mine, &theirs), &order) in self.keys.iter().zip(&other.keys).zip(orders) {
            if !order.at_least_as_good(mine, theirs) {
                return false;
            }
            strictly_better |= mine != theirs;
        }

        strictly_better
    }
}

/// Positions of the candidates no other candidate dominates.
///
/// The empty choice is always kept.
pub fn non_dominated(
    candidates: &[Candidate],
    orders: &[SortOrder],
    compared: impl Fn(usize) -> bool + Copy,
) -> Vec<usize> {
    (0..candidates.len())
        .filter(|&i| {
            let candidate = &candidates[i];
            candidate.is_empty_choice()
                || !candidates
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != i && other.dominates(candidate, orders, compared))
        })
        .collect()
}

/// Builds the candidate list of every loadout part.
#[derive(Debug)]
pub struct CandidateFilter<'a> {
    catalog: &'a Catalog,
    index: &'a AbilityIndex,
    criteria: &'a [RankingCriterion],
    orders: Vec<SortOrder>,
    dominance: bool,
}

impl<'a> CandidateFilter<'a> {
    /// Dominance pruning is only applied when `dominance` is requested and
    /// every criterion decomposes per piece.
    pub fn new(
        catalog: &'a Catalog,
        index: &'a AbilityIndex,
        criteria: &'a [RankingCriterion],
        dominance: bool,
    ) -> Self {
        let decomposable = criteria.iter().all(|c| c.key.is_piece_decomposable());
        Self {
            catalog,
            index,
            criteria,
            orders: criteria.iter().map(|c| c.order).collect(),
            dominance: dominance && decomposable,
        }
    }

    pub fn dominance_enabled(&self) -> bool {
        self.dominance
    }

    pub fn orders(&self) -> &[SortOrder] {
        &self.orders
    }

    /// Every item of `part` in catalog order, followed by the empty choice.
    pub fn all_candidates(&self, part: LoadoutPart) -> Vec<Candidate> {
        let mut candidates: Vec<Candidate> = match part {
            LoadoutPart::Armor(category) => self
                .catalog
                .pieces(category)
                .iter()
                .enumerate()
                .map(|(i, piece)| {
                    Candidate::from_item(Choice::Item(i), piece, self.index, self.criteria)
                })
                .collect(),
            LoadoutPart::Charm => self
                .catalog
                .charms()
                .iter()
                .enumerate()
                .map(|(i, charm)| {
                    Candidate::from_item(Choice::Item(i), charm, self.index, self.criteria)
                })
                .collect(),
        };
        candidates.push(Candidate::empty(self.index.len(), self.criteria.len()));
        candidates
    }

    /// The candidates worth searching for `part`, in catalog order with the
    /// empty choice last.
    pub fn candidates(&self, part: LoadoutPart) -> Vec<Candidate> {
        let all = self.all_candidates(part);
        if !self.dominance {
            return all;
        }
        let keep = non_dominated(&all, &self.orders, |_| true);
        let mut all: Vec<Option<Candidate>> = all.into_iter().map(Some).collect();
        keep.into_iter().filter_map(|i| all[i].take()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_core::{
        CriterionKey, DesiredAbilities, Defense, EquipmentPiece, Resistances, Skill, SkillId,
    };

    fn catalog() -> Catalog {
        Catalog::builder()
            .skill(Skill::new(1, "Attack", 7))
            .skill(Skill::new(2, "Guard", 5))
            // Strictly better than "Plain" on ability and equal elsewhere.
            .piece(EquipmentPiece::new(1, "Strong", Category::Head).with_ability(SkillId(1), 2))
            .piece(EquipmentPiece::new(2, "Plain", Category::Head).with_ability(SkillId(1), 1))
            // Same ability as "Plain" but a slot: not dominated.
            .piece(
                EquipmentPiece::new(3, "Slotted", Category::Head)
                    .with_slots([1])
                    .with_ability(SkillId(1), 1),
            )
            // Irrelevant, but more defense than anything.
            .piece(EquipmentPiece::new(4, "Tank", Category::Head).with_defense(Defense::flat(50)))
            // Twin of "Strong".
            .piece(EquipmentPiece::new(5, "Strong II", Category::Head).with_ability(SkillId(1), 2))
            .piece(
                EquipmentPiece::new(6, "Chilly", Category::Legs).with_resistances(Resistances {
                    ice: -2,
                    ..Resistances::default()
                }),
            )
            .build()
            .unwrap()
    }

    fn names(catalog: &Catalog, category: Category, candidates: &[Candidate]) -> Vec<String> {
        candidates
            .iter()
            .map(|c| match c.choice {
                Choice::Item(i) => catalog.pieces(category)[i].name.clone(),
                Choice::Empty => "-".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_dominated_pieces_are_dropped() {
        let catalog = catalog();
        let desired = DesiredAbilities::new().with(SkillId(1), 2);
        let index = AbilityIndex::build(&catalog, &desired);
        let criteria = vec![RankingCriterion::natural(CriterionKey::BaseDefense)];
        let filter = CandidateFilter::new(&catalog, &index, &criteria, true);

        let head = filter.candidates(LoadoutPart::Armor(Category::Head));
        assert_eq!(
            names(&catalog, Category::Head, &head),
            vec!["Strong", "Slotted", "Tank", "Strong II", "-"]
        );
    }

    #[test]
    fn test_levels_are_capped_at_target() {
        let catalog = catalog();
        let desired = DesiredAbilities::new().with(SkillId(1), 1);
        let index = AbilityIndex::build(&catalog, &desired);
        let criteria: Vec<RankingCriterion> = Vec::new();
        let filter = CandidateFilter::new(&catalog, &index, &criteria, true);

        // With a target of 1 the extra level of "Strong" is worthless, so the
        // slotted piece dominates it.
        let head = filter.candidates(LoadoutPart::Armor(Category::Head));
        assert_eq!(names(&catalog, Category::Head, &head), vec!["Slotted", "-"]);
    }

    #[test]
    fn test_empty_choice_always_present() {
        let catalog = catalog();
        let desired = DesiredAbilities::new().with(SkillId(2), 1);
        let index = AbilityIndex::build(&catalog, &desired);
        let criteria = vec![RankingCriterion::natural(CriterionKey::IceResistance)];
        let filter = CandidateFilter::new(&catalog, &index, &criteria, true);

        // The empty choice dominates a piece that only lowers resistance.
        let legs = filter.candidates(LoadoutPart::Armor(Category::Legs));
        assert_eq!(legs.len(), 1);
        assert!(legs[0].is_empty_choice());

        let charm = filter.candidates(LoadoutPart::Charm);
        assert_eq!(charm.len(), 1);
    }

    #[test]
    fn test_non_decomposable_criterion_disables_dominance() {
        let catalog = catalog();
        let desired = DesiredAbilities::new().with(SkillId(1), 2);
        let index = AbilityIndex::build(&catalog, &desired);
        let criteria = vec![RankingCriterion::natural(CriterionKey::JewelCount)];
        let filter = CandidateFilter::new(&catalog, &index, &criteria, true);

        assert!(!filter.dominance_enabled());
        assert_eq!(filter.candidates(LoadoutPart::Armor(Category::Head)).len(), 6);
    }

    #[test]
    fn test_dominance_on_selected_levels() {
        let orders: [SortOrder; 0] = [];
        let a = Candidate {
            choice: Choice::Item(0),
            levels: SmallVec::from_slice(&[0, 3]),
            slots: SlotCounts::new(),
            keys: SmallVec::new(),
        };
        let b = Candidate {
            choice: Choice::Item(1),
            levels: SmallVec::from_slice(&[2, 1]),
            slots: SlotCounts::new(),
            keys: SmallVec::new(),
        };

        assert!(!a.dominates(&b, &orders, |_| true));
        assert!(a.dominates(&b, &orders, |p| p == 1));
        assert!(!b.dominates(&a, &orders, |p| p == 1));
    }
}
