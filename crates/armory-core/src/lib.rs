//! Armory Core - shared types for loadout search
//!
//! This crate provides the data model every other Armory crate consumes:
//! - Skills, ability contributions and the desired-ability set
//! - Armor pieces, charms and jewels with their gem slots
//! - The immutable [`Catalog`] snapshot
//! - Ranking criterion identifiers
//! - The [`ArmoryError`] type

pub mod catalog;
pub mod criterion;
pub mod equipment;
pub mod error;
pub mod skill;
pub mod slot;

pub use catalog::{Catalog, CatalogBuilder};
pub use criterion::{CriterionKey, RankingCriterion, SortOrder};
pub use equipment::{
    Category, Charm, CharmId, Defense, Equippable, EquipmentPiece, Jewel, JewelId, PieceId,
    Resistances, CATEGORY_COUNT,
};
pub use error::{ArmoryError, Result};
pub use skill::{Ability, AbilityContribution, DesiredAbilities, Skill, SkillId};
pub use slot::{is_valid_slot_size, SlotCounts, MAX_SLOT_SIZE};
