//! Catalog record types and their conversion into catalog entries.

use std::collections::HashSet;

use armory_core::{
    is_valid_slot_size, AbilityContribution, Catalog, Category, Charm, Defense, EquipmentPiece,
    Jewel, Resistances, Skill, SkillId,
};

use crate::binding::{FieldBinding, TableRecord};
use crate::loader::LoadReport;
use crate::warning::IngestWarning;

/// A skill definition row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkillRecord {
    pub id: i32,
    pub name: String,
    pub max_level: i32,
    pub description: String,
}

impl TableRecord for SkillRecord {
    fn bindings() -> Vec<FieldBinding<Self>> {
        vec![
            FieldBinding::<Self>::integer("id", |r, v| r.id = v).names(&["id", "skill_id"]),
            FieldBinding::<Self>::text("name", |r, v| r.name = v).names(&["name_en", "name"]),
            FieldBinding::<Self>::integer("max_level", |r, v| r.max_level = v)
                .names(&["max_level", "levels"]),
            FieldBinding::<Self>::text("description", |r, v| r.description = v).hidden(),
        ]
    }
}

/// An armor piece row. Slot columns hold a size, or 0 for no slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArmorRecord {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub defense_base: i32,
    pub defense_max: i32,
    pub defense_augmented: i32,
    pub fire: i32,
    pub water: i32,
    pub thunder: i32,
    pub ice: i32,
    pub dragon: i32,
    pub slot1: i32,
    pub slot2: i32,
    pub slot3: i32,
    pub skill1: i32,
    pub skill1_level: i32,
    pub skill2: i32,
    pub skill2_level: i32,
    pub description: String,
}

impl TableRecord for ArmorRecord {
    fn bindings() -> Vec<FieldBinding<Self>> {
        vec![
            FieldBinding::<Self>::integer("id", |r, v| r.id = v),
            FieldBinding::<Self>::text("name", |r, v| r.name = v).names(&["name_en", "name"]),
            FieldBinding::<Self>::text("category", |r, v| r.category = v)
                .names(&["type", "category"]),
            FieldBinding::<Self>::integer("defense_base", |r, v| r.defense_base = v)
                .names(&["defense_base", "defense"]),
            FieldBinding::<Self>::integer("defense_max", |r, v| r.defense_max = v),
            FieldBinding::<Self>::integer("defense_augmented", |r, v| r.defense_augmented = v)
                .names(&["defense_augment_max", "defense_augmented"]),
            FieldBinding::<Self>::integer("fire", |r, v| r.fire = v)
                .names(&["defense_fire", "fire"]),
            FieldBinding::<Self>::integer("water", |r, v| r.water = v)
                .names(&["defense_water", "water"]),
            FieldBinding::<Self>::integer("thunder", |r, v| r.thunder = v)
                .names(&["defense_thunder", "thunder"]),
            FieldBinding::<Self>::integer("ice", |r, v| r.ice = v).names(&["defense_ice", "ice"]),
            FieldBinding::<Self>::integer("dragon", |r, v| r.dragon = v)
                .names(&["defense_dragon", "dragon"]),
            FieldBinding::<Self>::integer("slot1", |r, v| r.slot1 = v).names(&["slot_1", "slot1"]),
            FieldBinding::<Self>::integer("slot2", |r, v| r.slot2 = v).names(&["slot_2", "slot2"]),
            FieldBinding::<Self>::integer("slot3", |r, v| r.slot3 = v).names(&["slot_3", "slot3"]),
            FieldBinding::<Self>::integer("skill1", |r, v| r.skill1 = v),
            FieldBinding::<Self>::integer("skill1_level", |r, v| r.skill1_level = v)
                .names(&["skill1_pts", "skill1_level"]),
            FieldBinding::<Self>::integer("skill2", |r, v| r.skill2 = v),
            FieldBinding::<Self>::integer("skill2_level", |r, v| r.skill2_level = v)
                .names(&["skill2_pts", "skill2_level"]),
            FieldBinding::<Self>::text("description", |r, v| r.description = v).hidden(),
        ]
    }
}

/// A charm row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharmRecord {
    pub id: i32,
    pub name: String,
    pub slot1: i32,
    pub slot2: i32,
    pub skill1: i32,
    pub skill1_level: i32,
    pub skill2: i32,
    pub skill2_level: i32,
}

impl TableRecord for CharmRecord {
    fn bindings() -> Vec<FieldBinding<Self>> {
        vec![
            FieldBinding::<Self>::integer("id", |r, v| r.id = v),
            FieldBinding::<Self>::text("name", |r, v| r.name = v).names(&["name_en", "name"]),
            FieldBinding::<Self>::integer("slot1", |r, v| r.slot1 = v).names(&["slot_1", "slot1"]),
            FieldBinding::<Self>::integer("slot2", |r, v| r.slot2 = v).names(&["slot_2", "slot2"]),
            FieldBinding::<Self>::integer("skill1", |r, v| r.skill1 = v),
            FieldBinding::<Self>::integer("skill1_level", |r, v| r.skill1_level = v)
                .names(&["skill1_pts", "skill1_level"]),
            FieldBinding::<Self>::integer("skill2", |r, v| r.skill2 = v),
            FieldBinding::<Self>::integer("skill2_level", |r, v| r.skill2_level = v)
                .names(&["skill2_pts", "skill2_level"]),
        ]
    }
}

/// A jewel (decoration) row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JewelRecord {
    pub id: i32,
    pub name: String,
    pub slot_size: i32,
    pub skill: i32,
    pub skill_level: i32,
}

impl TableRecord for JewelRecord {
    fn bindings() -> Vec<FieldBinding<Self>> {
        vec![
            FieldBinding::<Self>::integer("id", |r, v| r.id = v),
            FieldBinding::<Self>::text("name", |r, v| r.name = v).names(&["name_en", "name"]),
            FieldBinding::<Self>::integer("slot_size", |r, v| r.slot_size = v)
                .names(&["slot", "slot_size", "size"]),
            FieldBinding::<Self>::integer("skill", |r, v| r.skill = v).names(&["skill", "skill_id"]),
            FieldBinding::<Self>::integer("skill_level", |r, v| r.skill_level = v)
                .names(&["skill_pts", "skill_level"]),
        ]
    }
}

fn non_negative(line: usize, what: &str, value: i32) -> Result<u32, IngestWarning> {
    u32::try_from(value).map_err(|_| IngestWarning::InvalidValue {
        line,
        message: format!("{what} must not be negative (got {value})"),
    })
}

fn slot_size(line: usize, size: i32) -> Result<u8, IngestWarning> {
    u8::try_from(size)
        .ok()
        .filter(|&size| is_valid_slot_size(size))
        .ok_or_else(|| IngestWarning::InvalidValue {
            line,
            message: format!("slot size {size} is out of range"),
        })
}

/// Slot columns hold 0 for "no slot".
fn slot_sizes(line: usize, raw: &[i32]) -> Result<Vec<u8>, IngestWarning> {
    raw.iter()
        .filter(|&&size| size != 0)
        .map(|&size| slot_size(line, size))
        .collect()
}

fn skill_pairs(pairs: &[(i32, i32)]) -> impl Iterator<Item = (SkillId, u32)> + '_ {
    pairs
        .iter()
        .filter(|&&(skill, level)| skill > 0 && level > 0)
        .map(|&(skill, level)| (SkillId(skill as u32), level as u32))
}

impl SkillRecord {
    pub fn into_skill(self, line: usize) -> Result<Skill, IngestWarning> {
        let id = non_negative(line, "skill id", self.id)?;
        let max_level = non_negative(line, "max level", self.max_level)?;
        if max_level == 0 {
            return Err(IngestWarning::InvalidValue {
                line,
                message: format!("skill '{}' has a maximum level of zero", self.name),
            });
        }
        Ok(Skill::new(id, self.name, max_level))
    }
}

impl ArmorRecord {
    pub fn into_piece(self, line: usize) -> Result<EquipmentPiece, IngestWarning> {
        let id = non_negative(line, "armor id", self.id)?;
        let category: Category =
            self.category
                .parse()
                .map_err(|err: armory_core::ArmoryError| IngestWarning::InvalidValue {
                    line,
                    message: err.to_string(),
                })?;
        let slots = slot_sizes(line, &[self.slot1, self.slot2, self.slot3])?;

        let mut piece = EquipmentPiece::new(id, self.name, category)
            .with_slots(slots)
            .with_defense(Defense {
                base: self.defense_base,
                max: self.defense_max.max(self.defense_base),
                augmented: self.defense_augmented.max(self.defense_max),
            })
            .with_resistances(Resistances {
                fire: self.fire,
                water: self.water,
                thunder: self.thunder,
                ice: self.ice,
                dragon: self.dragon,
            });
        for (skill, level) in skill_pairs(&[
            (self.skill1, self.skill1_level),
            (self.skill2, self.skill2_level),
        ]) {
            piece = piece.with_ability(skill, level);
        }
        Ok(piece)
    }
}

impl CharmRecord {
    pub fn into_charm(self, line: usize) -> Result<Charm, IngestWarning> {
        let id = non_negative(line, "charm id", self.id)?;
        let slots = slot_sizes(line, &[self.slot1, self.slot2])?;
        let mut charm = Charm::new(id, self.name).with_slots(slots);
        for (skill, level) in skill_pairs(&[
            (self.skill1, self.skill1_level),
            (self.skill2, self.skill2_level),
        ]) {
            charm = charm.with_ability(skill, level);
        }
        Ok(charm)
    }
}

impl JewelRecord {
    pub fn into_jewel(self, line: usize) -> Result<Jewel, IngestWarning> {
        let id = non_negative(line, "jewel id", self.id)?;
        let skill = non_negative(line, "jewel skill", self.skill)?;
        let level = non_negative(line, "jewel level", self.skill_level)?;
        if level == 0 {
            return Err(IngestWarning::InvalidValue {
                line,
                message: format!("jewel '{}' grants no levels", self.name),
            });
        }
        let size = slot_size(line, self.slot_size)?;
        Ok(Jewel::new(id, self.name, size, SkillId(skill), level))
    }
}

/// Collects loaded tables into a catalog.
///
/// Rows that cannot be converted, that repeat an id, or that grant a skill
/// missing from the skill table are skipped with an `InvalidValue` warning;
/// every other row is kept. Tables may be added in any order.
#[derive(Debug, Default)]
pub struct CatalogAssembler {
    skills: Vec<(usize, Skill)>,
    pieces: Vec<(usize, EquipmentPiece)>,
    charms: Vec<(usize, Charm)>,
    jewels: Vec<(usize, Jewel)>,
    warnings: Vec<IngestWarning>,
}

impl CatalogAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skills(&mut self, report: LoadReport<SkillRecord>) -> &mut Self {
        self.warnings.extend(report.warnings);
        for (line, record) in numbered(report.records) {
            match record.into_skill(line) {
                Ok(skill) => self.skills.push((line, skill)),
                Err(warning) => self.reject(warning),
            }
        }
        self
    }

    pub fn armor(&mut self, report: LoadReport<ArmorRecord>) -> &mut Self {
        self.warnings.extend(report.warnings);
        for (line, record) in numbered(report.records) {
            match record.into_piece(line) {
                Ok(piece) => self.pieces.push((line, piece)),
                Err(warning) => self.reject(warning),
            }
        }
        self
    }

    pub fn charms(&mut self, report: LoadReport<CharmRecord>) -> &mut Self {
        self.warnings.extend(report.warnings);
        for (line, record) in numbered(report.records) {
            match record.into_charm(line) {
                Ok(charm) => self.charms.push((line, charm)),
                Err(warning) => self.reject(warning),
            }
        }
        self
    }

    pub fn jewels(&mut self, report: LoadReport<JewelRecord>) -> &mut Self {
        self.warnings.extend(report.warnings);
        for (line, record) in numbered(report.records) {
            match record.into_jewel(line) {
                Ok(jewel) => self.jewels.push((line, jewel)),
                Err(warning) => self.reject(warning),
            }
        }
        self
    }

    fn reject(&mut self, warning: IngestWarning) {
        tracing::warn!(%warning, "skipping catalog row");
        self.warnings.push(warning);
    }

    /// Cross-checks the collected rows and builds the catalog.
    ///
    /// The first row with a given id wins.
    ///
    /// # Errors
    ///
    /// Propagates `CatalogBuilder::build` failures. Every row it would
    /// reject has already been skipped here, so this only fails on a broken
    /// catalog invariant.
    pub fn finish(mut self) -> armory_core::Result<(Catalog, Vec<IngestWarning>)> {
        let mut builder = Catalog::builder();

        let mut known = HashSet::new();
        for (line, skill) in std::mem::take(&mut self.skills) {
            if known.insert(skill.id) {
                builder.add_skill(skill);
            } else {
                self.reject(duplicate(line, "skill", skill.id.0));
            }
        }

        let mut ids = HashSet::new();
        for (line, piece) in std::mem::take(&mut self.pieces) {
            let checked = unique(line, "armor", piece.id.0, &mut ids)
                .and_then(|()| defined(line, &piece.name, &piece.abilities, &known));
            match checked {
                Ok(()) => builder.add_piece(piece),
                Err(warning) => self.reject(warning),
            }
        }

        let mut ids = HashSet::new();
        for (line, charm) in std::mem::take(&mut self.charms) {
            let checked = unique(line, "charm", charm.id.0, &mut ids)
                .and_then(|()| defined(line, &charm.name, &charm.abilities, &known));
            match checked {
                Ok(()) => builder.add_charm(charm),
                Err(warning) => self.reject(warning),
            }
        }

        let mut ids = HashSet::new();
        for (line, jewel) in std::mem::take(&mut self.jewels) {
            let checked = unique(line, "jewel", jewel.id.0, &mut ids)
                .and_then(|()| defined(line, &jewel.name, &[jewel.ability], &known));
            match checked {
                Ok(()) => builder.add_jewel(jewel),
                Err(warning) => self.reject(warning),
            }
        }

        let catalog = builder.build()?;
        Ok((catalog, self.warnings))
    }
}

/// Pairs records with their line number; line 1 is the header.
fn numbered<R>(records: Vec<R>) -> impl Iterator<Item = (usize, R)> {
    records
        .into_iter()
        .enumerate()
        .map(|(offset, record)| (offset + 2, record))
}

fn duplicate(line: usize, kind: &str, id: u32) -> IngestWarning {
    IngestWarning::InvalidValue {
        line,
        message: format!("duplicate {kind} id {id}"),
    }
}

fn unique(line: usize, kind: &str, id: u32, seen: &mut HashSet<u32>) -> Result<(), IngestWarning> {
    if seen.insert(id) {
        Ok(())
    } else {
        Err(duplicate(line, kind, id))
    }
}

fn defined(
    line: usize,
    owner: &str,
    abilities: &[AbilityContribution],
    known: &HashSet<SkillId>,
) -> Result<(), IngestWarning> {
    match abilities.iter().find(|a| !known.contains(&a.skill)) {
        Some(ability) => Err(IngestWarning::InvalidValue {
            line,
            message: format!("'{owner}' grants undefined {}", ability.skill),
        }),
        None => Ok(()),
    }
}
