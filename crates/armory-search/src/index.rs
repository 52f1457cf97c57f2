//! Per-search ability index.
//!
//! Projects every catalog entity onto the desired abilities once, so the rest
//! of the search works on small level vectors instead of ability lists.

use armory_core::{Catalog, Category, DesiredAbilities, Equippable, SkillId, CATEGORY_COUNT};
use smallvec::SmallVec;

/// Levels toward each desired ability, in desired-set order.
pub type Levels = SmallVec<[u32; 8]>;

/// A catalog entity addressed by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Piece(Category, usize),
    Charm(usize),
    Jewel(usize),
}

/// How much an entity contributes toward the desired abilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relevance {
    Irrelevant,
    /// Sum of levels contributed across all desired abilities.
    Contributes(u32),
}

/// Projection of the catalog onto one desired-ability set.
#[derive(Debug, Clone)]
pub struct AbilityIndex {
    skills: Vec<SkillId>,
    targets: Levels,
    pieces: [Vec<Levels>; CATEGORY_COUNT],
    charms: Vec<Levels>,
    /// Desired position of each jewel's skill, `None` when irrelevant.
    jewel_positions: Vec<Option<usize>>,
    /// Per desired ability: jewel positions ordered by slot size, then
    /// catalog order.
    jewels_by_ability: Vec<Vec<usize>>,
    contributors: Vec<Vec<EntityRef>>,
}

impl AbilityIndex {
    pub fn build(catalog: &Catalog, desired: &DesiredAbilities) -> Self {
        let skills: Vec<SkillId> = desired.skills().collect();
        let targets: Levels = desired.iter().map(|a| a.level).collect();
        let pieces = Category::ALL.map(|category| {
            catalog
                .pieces(category)
                .iter()
                .map(|piece| project(&skills, piece))
                .collect::<Vec<_>>()
        });
        let charms: Vec<Levels> = catalog.charms().iter().map(|c| project(&skills, c)).collect();

        let jewel_positions: Vec<Option<usize>> = catalog
            .jewels()
            .iter()
            .map(|jewel| skills.iter().position(|&s| s == jewel.ability.skill))
            .collect();

        let mut jewels_by_ability = vec![Vec::new(); skills.len()];
        for (index, position) in jewel_positions.iter().enumerate() {
            if let Some(position) = *position {
                jewels_by_ability[position].push(index);
            }
        }
        for list in &mut jewels_by_ability {
            // Stable: equal sizes keep catalog order.
            list.sort_by_key(|&index| catalog.jewels()[index].slot_size);
        }

        let mut contributors = vec![Vec::new(); skills.len()];
        for category in Category::ALL {
            for (index, levels) in pieces[category.index()].iter().enumerate() {
                push_contributor(&mut contributors, levels, EntityRef::Piece(category, index));
            }
        }
        for (index, levels) in charms.iter().enumerate() {
            push_contributor(&mut contributors, levels, EntityRef::Charm(index));
        }
        for (index, position) in jewel_positions.iter().enumerate() {
            if let Some(position) = *position {
                contributors[position].push(EntityRef::Jewel(index));
            }
        }

        Self {
            skills,
            targets,
            pieces,
            charms,
            jewel_positions,
            jewels_by_ability,
            contributors,
        }
    }

    /// Number of desired abilities.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    pub fn skills(&self) -> &[SkillId] {
        &self.skills
    }

    pub fn targets(&self) -> &[u32] {
        &self.targets
    }

    pub fn piece_levels(&self, category: Category, index: usize) -> &[u32] {
        &self.pieces[category.index()][index]
    }

    pub fn charm_levels(&self, index: usize) -> &[u32] {
        &self.charms[index]
    }

    /// Desired position of the ability a jewel grants.
    pub fn jewel_position(&self, index: usize) -> Option<usize> {
        self.jewel_positions[index]
    }

    /// Jewels granting the ability at `position`, cheapest slot first.
    pub fn jewels_for(&self, position: usize) -> &[usize] {
        &self.jewels_by_ability[position]
    }

    /// Every entity contributing toward the ability at `position`.
    pub fn contributors(&self, position: usize) -> &[EntityRef] {
        &self.contributors[position]
    }

    pub fn relevance(&self, entity: EntityRef, catalog: &Catalog) -> Relevance {
        let total = match entity {
            EntityRef::Piece(category, index) => self.piece_levels(category, index).iter().sum(),
            EntityRef::Charm(index) => self.charm_levels(index).iter().sum(),
            EntityRef::Jewel(index) => match self.jewel_positions[index] {
                Some(_) => catalog.jewels()[index].ability.level,
                None => 0,
            },
        };
        if total == 0 {
            Relevance::Irrelevant
        } else {
            Relevance::Contributes(total)
        }
    }
}

/// Levels `item` grants toward each of `skills`.
pub fn project<E: Equippable>(skills: &[SkillId], item: &E) -> Levels {
    skills.iter().map(|&skill| item.level_of(skill)).collect()
}

fn push_contributor(contributors: &mut [Vec<EntityRef>], levels: &[u32], entity: EntityRef) {
    for (position, &level) in levels.iter().enumerate() {
        if level > 0 {
            contributors[position].push(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armory_core::{Charm, EquipmentPiece, Jewel, Skill};

    fn catalog() -> Catalog {
        Catalog::builder()
            .skill(Skill::new(1, "Attack", 7))
            .skill(Skill::new(2, "Guard", 5))
            .skill(Skill::new(3, "Speed", 3))
            .piece(EquipmentPiece::new(1, "Helm A", Category::Head).with_ability(SkillId(1), 2))
            .piece(EquipmentPiece::new(2, "Helm B", Category::Head).with_ability(SkillId(3), 1))
            .charm(Charm::new(1, "Charm").with_ability(SkillId(2), 1))
            .jewel(Jewel::new(1, "Attack L", 3, SkillId(1), 3))
            .jewel(Jewel::new(2, "Attack S", 1, SkillId(1), 1))
            .jewel(Jewel::new(3, "Attack S2", 1, SkillId(1), 1))
            .jewel(Jewel::new(4, "Speed", 1, SkillId(3), 1))
            .build()
            .unwrap()
    }

    #[test]
    fn test_projection_and_relevance() {
        let catalog = catalog();
        let desired = DesiredAbilities::new().with(SkillId(2), 1).with(SkillId(1), 3);
        let index = AbilityIndex::build(&catalog, &desired);

        assert_eq!(index.skills(), &[SkillId(1), SkillId(2)]);
        assert_eq!(index.targets(), &[3, 1]);
        assert_eq!(index.piece_levels(Category::Head, 0), &[2, 0]);
        assert_eq!(index.charm_levels(0), &[0, 1]);
        assert_eq!(
            index.relevance(EntityRef::Piece(Category::Head, 1), &catalog),
            Relevance::Irrelevant
        );
        assert_eq!(
            index.relevance(EntityRef::Jewel(0), &catalog),
            Relevance::Contributes(3)
        );
        assert_eq!(index.relevance(EntityRef::Jewel(3), &catalog), Relevance::Irrelevant);
    }

    #[test]
    fn test_jewels_ordered_by_size_then_catalog() {
        let catalog = catalog();
        let desired = DesiredAbilities::new().with(SkillId(1), 3);
        let index = AbilityIndex::build(&catalog, &desired);

        assert_eq!(index.jewels_for(0), &[1, 2, 0]);
        assert_eq!(index.jewel_position(3), None);
        assert_eq!(
            index.contributors(0),
            &[
                EntityRef::Piece(Category::Head, 0),
                EntityRef::Jewel(0),
                EntityRef::Jewel(1),
                EntityRef::Jewel(2),
            ]
        );
    }
}
