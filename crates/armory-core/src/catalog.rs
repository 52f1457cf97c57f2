//! Immutable catalog snapshot.
//!
//! The catalog holds every skill definition, armor piece (grouped by
//! category), charm and jewel. It is built once through [`CatalogBuilder`],
//! validated, and then shared read-only by every search.

use std::collections::{HashMap, HashSet};

use crate::equipment::{Category, Charm, CharmId, EquipmentPiece, Jewel, JewelId, PieceId, CATEGORY_COUNT};
use crate::error::{ArmoryError, Result};
use crate::skill::{AbilityContribution, Skill, SkillId};
use crate::slot::is_valid_slot_size;

/// Read-only snapshot of all equipment data.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    skills: Vec<Skill>,
    pieces: [Vec<EquipmentPiece>; CATEGORY_COUNT],
    charms: Vec<Charm>,
    jewels: Vec<Jewel>,
    skill_index: HashMap<SkillId, usize>,
    piece_index: HashMap<PieceId, (Category, usize)>,
    charm_index: HashMap<CharmId, usize>,
    jewel_index: HashMap<JewelId, usize>,
}

impl Catalog {
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::new()
    }

    pub fn skills(&self) -> &[Skill] {
        &self.skills
    }

    pub fn skill(&self, id: SkillId) -> Option<&Skill> {
        self.skill_index.get(&id).map(|&i| &self.skills[i])
    }

    /// Pieces of one category, in catalog order.
    pub fn pieces(&self, category: Category) -> &[EquipmentPiece] {
        &self.pieces[category.index()]
    }

    pub fn piece(&self, id: PieceId) -> Option<&EquipmentPiece> {
        self.piece_index
            .get(&id)
            .map(|&(category, i)| &self.pieces[category.index()][i])
    }

    pub fn piece_count(&self) -> usize {
        self.pieces.iter().map(Vec::len).sum()
    }

    pub fn charms(&self) -> &[Charm] {
        &self.charms
    }

    pub fn charm(&self, id: CharmId) -> Option<&Charm> {
        self.charm_index.get(&id).map(|&i| &self.charms[i])
    }

    pub fn jewels(&self) -> &[Jewel] {
        &self.jewels
    }

    pub fn jewel(&self, id: JewelId) -> Option<&Jewel> {
        self.jewel_index.get(&id).map(|&i| &self.jewels[i])
    }
}

/// Collects catalog entries and validates them into a [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    skills: Vec<Skill>,
    pieces: Vec<EquipmentPiece>,
    charms: Vec<Charm>,
    jewels: Vec<Jewel>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skill(mut self, skill: Skill) -> Self {
        self.skills.push(skill);
        self
    }

    pub fn piece(mut self, piece: EquipmentPiece) -> Self {
        self.pieces.push(piece);
        self
    }

    pub fn charm(mut self, charm: Charm) -> Self {
        self.charms.push(charm);
        self
    }

    pub fn jewel(mut self, jewel: Jewel) -> Self {
        self.jewels.push(jewel);
        self
    }

    pub fn add_skill(&mut self, skill: Skill) {
        self.skills.push(skill);
    }

    pub fn add_piece(&mut self, piece: EquipmentPiece) {
        self.pieces.push(piece);
    }

    pub fn add_charm(&mut self, charm: Charm) {
        self.charms.push(charm);
    }

    pub fn add_jewel(&mut self, jewel: Jewel) {
        self.jewels.push(jewel);
    }

    /// Validates all entries and builds the catalog.
    ///
    /// Repeated contributions to one skill on a single item are summed and
    /// zero-level contributions are dropped.
    ///
    /// # Errors
    ///
    /// Returns `ArmoryError::Catalog` for duplicate ids, invalid slot sizes,
    /// or contributions to undefined skills.
    pub fn build(self) -> Result<Catalog> {
        let mut catalog = Catalog::default();

        for skill in self.skills {
            if skill.max_level == 0 {
                return Err(ArmoryError::catalog(format!(
                    "skill '{}' has a maximum level of zero",
                    skill.name
                )));
            }
            if catalog.skill_index.insert(skill.id, catalog.skills.len()).is_some() {
                return Err(ArmoryError::catalog(format!("duplicate {}", skill.id)));
            }
            catalog.skills.push(skill);
        }

        for mut piece in self.pieces {
            check_slots(&piece.name, &piece.slots)?;
            piece.abilities = normalize_abilities(&catalog, &piece.name, &piece.abilities)?;
            let bucket = &mut catalog.pieces[piece.category.index()];
            if catalog
                .piece_index
                .insert(piece.id, (piece.category, bucket.len()))
                .is_some()
            {
                return Err(ArmoryError::catalog(format!(
                    "duplicate piece id {}",
                    piece.id.0
                )));
            }
            bucket.push(piece);
        }

        for mut charm in self.charms {
            check_slots(&charm.name, &charm.slots)?;
            charm.abilities = normalize_abilities(&catalog, &charm.name, &charm.abilities)?;
            if catalog.charm_index.insert(charm.id, catalog.charms.len()).is_some() {
                return Err(ArmoryError::catalog(format!(
                    "duplicate charm id {}",
                    charm.id.0
                )));
            }
            catalog.charms.push(charm);
        }

        for jewel in self.jewels {
            if !is_valid_slot_size(jewel.slot_size) {
                return Err(ArmoryError::catalog(format!(
                    "jewel '{}' requires invalid slot size {}",
                    jewel.name, jewel.slot_size
                )));
            }
            if catalog.skill(jewel.ability.skill).is_none() {
                return Err(ArmoryError::catalog(format!(
                    "jewel '{}' grants undefined {}",
                    jewel.name, jewel.ability.skill
                )));
            }
            if jewel.ability.level == 0 {
                return Err(ArmoryError::catalog(format!(
                    "jewel '{}' grants no levels",
                    jewel.name
                )));
            }
            if catalog.jewel_index.insert(jewel.id, catalog.jewels.len()).is_some() {
                return Err(ArmoryError::catalog(format!(
                    "duplicate jewel id {}",
                    jewel.id.0
                )));
            }
            catalog.jewels.push(jewel);
        }

        Ok(catalog)
    }
}

fn check_slots(name: &str, slots: &[u8]) -> Result<()> {
    match slots.iter().find(|&&size| !is_valid_slot_size(size)) {
        Some(size) => Err(ArmoryError::catalog(format!(
            "'{name}' has invalid slot size {size}"
        ))),
        None => Ok(()),
    }
}

fn normalize_abilities(
    catalog: &Catalog,
    owner: &str,
    abilities: &[AbilityContribution],
) -> Result<Vec<AbilityContribution>> {
    let mut merged: Vec<AbilityContribution> = Vec::with_capacity(abilities.len());
    let mut seen = HashSet::new();
    for ability in abilities {
        if catalog.skill(ability.skill).is_none() {
            return Err(ArmoryError::catalog(format!(
                "'{owner}' grants undefined {}",
                ability.skill
            )));
        }
        if ability.level == 0 {
            continue;
        }
        if seen.insert(ability.skill) {
            merged.push(*ability);
        } else if let Some(existing) = merged.iter_mut().find(|a| a.skill == ability.skill) {
            existing.level += ability.level;
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills() -> CatalogBuilder {
        Catalog::builder()
            .skill(Skill::new(1, "Attack Boost", 7))
            .skill(Skill::new(2, "Critical Eye", 7))
    }

    #[test]
    fn test_lookup_by_id_and_category() {
        let catalog = skills()
            .piece(EquipmentPiece::new(10, "Helm", Category::Head).with_slots([1]))
            .piece(EquipmentPiece::new(11, "Mail", Category::Chest))
            .charm(Charm::new(1, "Charm").with_ability(SkillId(1), 1))
            .jewel(Jewel::new(5, "Attack Jewel", 1, SkillId(1), 1))
            .build()
            .unwrap();

        assert_eq!(catalog.pieces(Category::Head).len(), 1);
        assert_eq!(catalog.pieces(Category::Legs).len(), 0);
        assert_eq!(catalog.piece(PieceId(11)).unwrap().name, "Mail");
        assert_eq!(catalog.piece_count(), 2);
        assert_eq!(catalog.charm(CharmId(1)).unwrap().name, "Charm");
        assert_eq!(catalog.jewel(JewelId(5)).unwrap().name, "Attack Jewel");
        assert!(catalog.jewel(JewelId(6)).is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = skills()
            .piece(EquipmentPiece::new(1, "A", Category::Head))
            .piece(EquipmentPiece::new(1, "B", Category::Legs))
            .build();
        assert!(matches!(result, Err(ArmoryError::Catalog(_))));
    }

    #[test]
    fn test_invalid_slot_size_rejected() {
        let result = skills()
            .piece(EquipmentPiece::new(1, "A", Category::Head).with_slots([5]))
            .build();
        assert!(result.is_err());

        let result = skills()
            .jewel(Jewel::new(1, "Big", 0, SkillId(1), 1))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_undefined_skill_rejected() {
        let result = skills()
            .piece(EquipmentPiece::new(1, "A", Category::Head).with_ability(SkillId(3), 1))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_contributions_are_merged() {
        let catalog = skills()
            .piece(
                EquipmentPiece::new(1, "A", Category::Head)
                    .with_ability(SkillId(1), 1)
                    .with_ability(SkillId(2), 0)
                    .with_ability(SkillId(1), 2),
            )
            .build()
            .unwrap();

        let piece = catalog.piece(PieceId(1)).unwrap();
        assert_eq!(piece.abilities, vec![AbilityContribution::new(SkillId(1), 3)]);
    }
}
