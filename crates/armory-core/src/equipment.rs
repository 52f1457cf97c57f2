//! Equipment pieces, charms and jewels.

use std::fmt;
use std::str::FromStr;

use crate::criterion::CriterionKey;
use crate::error::ArmoryError;
use crate::skill::{AbilityContribution, SkillId};
use crate::slot::SlotCounts;

/// Number of armor slot categories.
pub const CATEGORY_COUNT: usize = 5;

/// Armor slot category. Exactly one piece (or nothing) is worn per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    Head,
    Chest,
    Gloves,
    Waist,
    Legs,
}

impl Category {
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::Head,
        Category::Chest,
        Category::Gloves,
        Category::Waist,
        Category::Legs,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Category::Head => "head",
            Category::Chest => "chest",
            Category::Gloves => "gloves",
            Category::Waist => "waist",
            Category::Legs => "legs",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = ArmoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "head" | "helm" => Ok(Category::Head),
            "chest" | "body" => Ok(Category::Chest),
            "gloves" | "arms" => Ok(Category::Gloves),
            "waist" => Ok(Category::Waist),
            "legs" => Ok(Category::Legs),
            other => Err(ArmoryError::catalog(format!(
                "unknown armor category '{other}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PieceId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CharmId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JewelId(pub u32);

/// Defense values of a piece.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Defense {
    pub base: i32,
    pub max: i32,
    pub augmented: i32,
}

impl Defense {
    pub fn flat(value: i32) -> Self {
        Self {
            base: value,
            max: value,
            augmented: value,
        }
    }
}

/// Elemental resistances of a piece.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resistances {
    pub fire: i32,
    pub water: i32,
    pub thunder: i32,
    pub ice: i32,
    pub dragon: i32,
}

/// Anything that can be worn: armor pieces and charms.
///
/// Secondary attributes are consumed only by ranking and dominance, never by
/// feasibility.
pub trait Equippable {
    fn display_name(&self) -> &str;

    fn slots(&self) -> &[u8];

    fn abilities(&self) -> &[AbilityContribution];

    fn defense(&self) -> Defense {
        Defense::default()
    }

    fn resistances(&self) -> Resistances {
        Resistances::default()
    }

    fn slot_counts(&self) -> SlotCounts {
        SlotCounts::from_sizes(self.slots())
    }

    /// Level granted toward `skill`, zero if none.
    fn level_of(&self, skill: SkillId) -> u32 {
        self.abilities()
            .iter()
            .filter(|a| a.skill == skill)
            .map(|a| a.level)
            .sum()
    }

    /// Value this item adds to a per-piece decomposable criterion.
    ///
    /// Returns `None` for criteria that depend on the whole combination.
    fn criterion_value(&self, key: CriterionKey) -> Option<i64> {
        let defense = self.defense();
        let res = self.resistances();
        let value = match key {
            CriterionKey::BaseDefense => i64::from(defense.base),
            CriterionKey::MaxDefense => i64::from(defense.max),
            CriterionKey::AugmentedDefense => i64::from(defense.augmented),
            CriterionKey::FireResistance => i64::from(res.fire),
            CriterionKey::WaterResistance => i64::from(res.water),
            CriterionKey::ThunderResistance => i64::from(res.thunder),
            CriterionKey::IceResistance => i64::from(res.ice),
            CriterionKey::DragonResistance => i64::from(res.dragon),
            CriterionKey::SlotSizeCube => self.slot_counts().size_cube(),
            CriterionKey::SlotCount => i64::from(self.slot_counts().total()),
            CriterionKey::JewelCount => return None,
        };
        Some(value)
    }
}

/// An armor piece belonging to exactly one category.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquipmentPiece {
    pub id: PieceId,
    pub name: String,
    pub category: Category,
    pub defense: Defense,
    pub resistances: Resistances,
    pub slots: Vec<u8>,
    pub abilities: Vec<AbilityContribution>,
}

impl EquipmentPiece {
    pub fn new(id: u32, name: impl Into<String>, category: Category) -> Self {
        Self {
            id: PieceId(id),
            name: name.into(),
            category,
            defense: Defense::default(),
            resistances: Resistances::default(),
            slots: Vec::new(),
            abilities: Vec::new(),
        }
    }

    pub fn with_slots(mut self, slots: impl Into<Vec<u8>>) -> Self {
        self.slots = slots.into();
        self
    }

    pub fn with_ability(mut self, skill: SkillId, level: u32) -> Self {
        self.abilities.push(AbilityContribution::new(skill, level));
        self
    }

    pub fn with_defense(mut self, defense: Defense) -> Self {
        self.defense = defense;
        self
    }

    pub fn with_resistances(mut self, resistances: Resistances) -> Self {
        self.resistances = resistances;
        self
    }
}

impl Equippable for EquipmentPiece {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn slots(&self) -> &[u8] {
        &self.slots
    }

    fn abilities(&self) -> &[AbilityContribution] {
        &self.abilities
    }

    fn defense(&self) -> Defense {
        self.defense
    }

    fn resistances(&self) -> Resistances {
        self.resistances
    }
}

/// An optional extra item; behaves like one more category with "none" allowed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Charm {
    pub id: CharmId,
    pub name: String,
    pub slots: Vec<u8>,
    pub abilities: Vec<AbilityContribution>,
}

impl Charm {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: CharmId(id),
            name: name.into(),
            slots: Vec::new(),
            abilities: Vec::new(),
        }
    }

    pub fn with_slots(mut self, slots: impl Into<Vec<u8>>) -> Self {
        self.slots = slots.into();
        self
    }

    pub fn with_ability(mut self, skill: SkillId, level: u32) -> Self {
        self.abilities.push(AbilityContribution::new(skill, level));
        self
    }
}

impl Equippable for Charm {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn slots(&self) -> &[u8] {
        &self.slots
    }

    fn abilities(&self) -> &[AbilityContribution] {
        &self.abilities
    }
}

/// A decoration occupying one gem slot of at least `slot_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Jewel {
    pub id: JewelId,
    pub name: String,
    pub slot_size: u8,
    pub ability: AbilityContribution,
}

impl Jewel {
    pub fn new(id: u32, name: impl Into<String>, slot_size: u8, skill: SkillId, level: u32) -> Self {
        Self {
            id: JewelId(id),
            name: name.into(),
            slot_size,
            ability: AbilityContribution::new(skill, level),
        }
    }

    /// Returns true if this jewel can be placed in a slot of `slot_size`.
    pub fn fits(&self, slot_size: u8) -> bool {
        slot_size >= self.slot_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_and_index() {
        assert_eq!("Head".parse::<Category>().unwrap(), Category::Head);
        assert_eq!(" arms ".parse::<Category>().unwrap(), Category::Gloves);
        assert!("weapon".parse::<Category>().is_err());
        for (i, category) in Category::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_level_of_sums_repeated_skills() {
        let piece = EquipmentPiece::new(1, "Helm", Category::Head)
            .with_ability(SkillId(1), 1)
            .with_ability(SkillId(1), 2)
            .with_ability(SkillId(2), 1);
        assert_eq!(piece.level_of(SkillId(1)), 3);
        assert_eq!(piece.level_of(SkillId(9)), 0);
    }

    #[test]
    fn test_criterion_values() {
        let piece = EquipmentPiece::new(1, "Mail", Category::Chest)
            .with_slots([2, 1])
            .with_defense(Defense {
                base: 60,
                max: 80,
                augmented: 100,
            })
            .with_resistances(Resistances {
                dragon: -3,
                ..Resistances::default()
            });

        assert_eq!(piece.criterion_value(CriterionKey::BaseDefense), Some(60));
        assert_eq!(piece.criterion_value(CriterionKey::DragonResistance), Some(-3));
        assert_eq!(piece.criterion_value(CriterionKey::SlotSizeCube), Some(9));
        assert_eq!(piece.criterion_value(CriterionKey::SlotCount), Some(2));
        assert_eq!(piece.criterion_value(CriterionKey::JewelCount), None);

        let charm = Charm::new(1, "Charm");
        assert_eq!(charm.criterion_value(CriterionKey::MaxDefense), Some(0));
    }

    #[test]
    fn test_jewel_fits_equal_or_larger_slot() {
        let jewel = Jewel::new(1, "Attack Jewel", 2, SkillId(1), 1);
        assert!(!jewel.fits(1));
        assert!(jewel.fits(2));
        assert!(jewel.fits(4));
    }
}
