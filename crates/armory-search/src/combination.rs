//! Combinations and jewel assignments.

use std::fmt;

use armory_core::{
    Catalog, Category, CharmId, CriterionKey, Equippable, JewelId, PieceId, SkillId, SlotCounts,
    CATEGORY_COUNT,
};

/// Where a physical gem slot comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotSource {
    Armor(Category),
    Charm,
    /// Slots supplied with the request (weapon slots).
    Extra,
}

impl fmt::Display for SlotSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlotSource::Armor(category) => write!(f, "{category}"),
            SlotSource::Charm => f.write_str("charm"),
            SlotSource::Extra => f.write_str("extra"),
        }
    }
}

/// One physical gem slot: its source, position on the source, and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotRef {
    pub source: SlotSource,
    pub index: usize,
    pub size: u8,
}

/// A jewel placed into a physical slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JewelPlacement {
    pub jewel: JewelId,
    pub slot: SlotRef,
}

/// Jewels mapped to distinct physical slots that can hold them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JewelAssignment {
    placements: Vec<JewelPlacement>,
}

impl JewelAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs jewels with slots, largest jewel with largest slot.
    ///
    /// `jewels` are catalog positions. Returns `None` when the slots cannot
    /// hold the jewels.
    pub fn place(catalog: &Catalog, jewels: &[usize], slots: &[SlotRef]) -> Option<Self> {
        if jewels.len() > slots.len() {
            return None;
        }
        let mut ordered: Vec<_> = jewels.iter().map(|&i| &catalog.jewels()[i]).collect();
        ordered.sort_by(|a, b| b.slot_size.cmp(&a.slot_size));
        let mut free = slots.to_vec();
        free.sort_by(|a, b| b.size.cmp(&a.size));

        let mut placements = Vec::with_capacity(ordered.len());
        for (jewel, slot) in ordered.into_iter().zip(free) {
            if !jewel.fits(slot.size) {
                return None;
            }
            placements.push(JewelPlacement {
                jewel: jewel.id,
                slot,
            });
        }
        Some(Self { placements })
    }

    pub fn placements(&self) -> &[JewelPlacement] {
        &self.placements
    }

    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// `(jewel, count)` pairs in order of first placement.
    pub fn grouped(&self) -> Vec<(JewelId, usize)> {
        let mut groups: Vec<(JewelId, usize)> = Vec::new();
        for placement in &self.placements {
            match groups.iter_mut().find(|(id, _)| *id == placement.jewel) {
                Some((_, count)) => *count += 1,
                None => groups.push((placement.jewel, 1)),
            }
        }
        groups
    }

    pub fn level_of(&self, catalog: &Catalog, skill: SkillId) -> u32 {
        self.placements
            .iter()
            .filter_map(|p| catalog.jewel(p.jewel))
            .filter(|jewel| jewel.ability.skill == skill)
            .map(|jewel| jewel.ability.level)
            .sum()
    }
}

/// One piece (or nothing) per category, an optional charm, and jewels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combination {
    pieces: [Option<PieceId>; CATEGORY_COUNT],
    charm: Option<CharmId>,
    jewels: JewelAssignment,
}

impl Combination {
    pub fn new(
        pieces: [Option<PieceId>; CATEGORY_COUNT],
        charm: Option<CharmId>,
        jewels: JewelAssignment,
    ) -> Self {
        Self {
            pieces,
            charm,
            jewels,
        }
    }

    pub fn piece(&self, category: Category) -> Option<PieceId> {
        self.pieces[category.index()]
    }

    pub fn pieces(&self) -> &[Option<PieceId>; CATEGORY_COUNT] {
        &self.pieces
    }

    pub fn charm(&self) -> Option<CharmId> {
        self.charm
    }

    pub fn jewels(&self) -> &JewelAssignment {
        &self.jewels
    }

    /// Equipped pieces and charm, resolved against the catalog.
    pub fn equipped<'c>(&self, catalog: &'c Catalog) -> Vec<&'c dyn Equippable> {
        let mut items: Vec<&'c dyn Equippable> = self
            .pieces
            .iter()
            .flatten()
            .filter_map(|&id| catalog.piece(id))
            .map(|piece| piece as &dyn Equippable)
            .collect();
        if let Some(charm) = self.charm.and_then(|id| catalog.charm(id)) {
            items.push(charm);
        }
        items
    }

    /// Total level toward `skill` from equipment, charm and jewels.
    pub fn level_of(&self, catalog: &Catalog, skill: SkillId) -> u32 {
        let worn: u32 = self
            .equipped(catalog)
            .iter()
            .map(|item| item.level_of(skill))
            .sum();
        worn + self.jewels.level_of(catalog, skill)
    }

    /// Gem slots of the equipped pieces and charm.
    pub fn slot_counts(&self, catalog: &Catalog) -> SlotCounts {
        let mut counts = SlotCounts::new();
        for item in self.equipped(catalog) {
            counts.add(&item.slot_counts());
        }
        counts
    }

    /// Every physical slot: equipment first, then `extra`.
    pub fn slot_refs(&self, catalog: &Catalog, extra: &SlotCounts) -> Vec<SlotRef> {
        let mut slots = Vec::new();
        for category in Category::ALL {
            if let Some(piece) = self.piece(category).and_then(|id| catalog.piece(id)) {
                push_slots(&mut slots, SlotSource::Armor(category), &piece.slots);
            }
        }
        if let Some(charm) = self.charm.and_then(|id| catalog.charm(id)) {
            push_slots(&mut slots, SlotSource::Charm, &charm.slots);
        }
        push_slots(&mut slots, SlotSource::Extra, &extra.sizes_descending());
        slots
    }

    pub fn criterion_value(&self, catalog: &Catalog, key: CriterionKey) -> i64 {
        if key == CriterionKey::JewelCount {
            return self.jewels.len() as i64;
        }
        self.equipped(catalog)
            .iter()
            .filter_map(|item| item.criterion_value(key))
            .sum()
    }

    pub(crate) fn with_jewels(mut self, jewels: JewelAssignment) -> Self {
        self.jewels = jewels;
        self
    }
}

fn push_slots(slots: &mut Vec<SlotRef>, source: SlotSource, sizes: &[u8]) {
    for (index, &size) in sizes.iter().enumerate() {
        slots.push(SlotRef {
            source,
            index,
            size,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_core::{Charm, Defense, EquipmentPiece, Jewel, Skill};

    fn catalog() -> Catalog {
        Catalog::builder()
            .skill(Skill::new(1, "Attack", 7))
            .piece(
                EquipmentPiece::new(1, "Helm", Category::Head)
                    .with_slots([1, 3])
                    .with_defense(Defense::flat(10))
                    .with_ability(SkillId(1), 1),
            )
            .charm(Charm::new(1, "Charm").with_slots([2]).with_ability(SkillId(1), 1))
            .jewel(Jewel::new(1, "Small", 1, SkillId(1), 1))
            .jewel(Jewel::new(2, "Large", 3, SkillId(1), 3))
            .build()
            .unwrap()
    }

    #[test]
    fn test_place_pairs_largest_first() {
        let catalog = catalog();
        let slots = vec![
            SlotRef { source: SlotSource::Armor(Category::Head), index: 0, size: 1 },
            SlotRef { source: SlotSource::Armor(Category::Head), index: 1, size: 3 },
            SlotRef { source: SlotSource::Extra, index: 0, size: 2 },
        ];

        let assignment = JewelAssignment::place(&catalog, &[0, 1, 0], &slots).unwrap();
        let sizes: Vec<u8> = assignment.placements().iter().map(|p| p.slot.size).collect();
        assert_eq!(sizes, vec![3, 2, 1]);
        assert_eq!(assignment.placements()[0].jewel, JewelId(2));
        assert_eq!(assignment.grouped(), vec![(JewelId(2), 1), (JewelId(1), 2)]);

        assert!(JewelAssignment::place(&catalog, &[1, 1], &slots).is_none());
    }

    #[test]
    fn test_combination_totals() {
        let catalog = catalog();
        let mut pieces = [None; CATEGORY_COUNT];
        pieces[Category::Head.index()] = Some(PieceId(1));
        let base = Combination::new(pieces, Some(CharmId(1)), JewelAssignment::new());

        let slots = base.slot_refs(&catalog, &SlotCounts::from_sizes(&[4]));
        assert_eq!(slots.len(), 4);
        assert_eq!(slots[3].source, SlotSource::Extra);

        let jewels = JewelAssignment::place(&catalog, &[1], &slots).unwrap();
        let combination = base.with_jewels(jewels);

        assert_eq!(combination.level_of(&catalog, SkillId(1)), 5);
        assert_eq!(combination.slot_counts(&catalog).total(), 3);
        assert_eq!(combination.criterion_value(&catalog, CriterionKey::BaseDefense), 10);
        assert_eq!(combination.criterion_value(&catalog, CriterionKey::SlotSizeCube), 1 + 27 + 8);
        assert_eq!(combination.criterion_value(&catalog, CriterionKey::JewelCount), 1);
    }
}
