//! Skills, ability contributions and the desired-ability set.

use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::Catalog;
use crate::error::{ArmoryError, Result};

/// Identity of a skill. Two abilities are "the same ability" when their
/// skill ids are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillId(pub u32);

impl fmt::Display for SkillId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skill#{}", self.0)
    }
}

/// A named game effect with discrete levels `1..=max_level`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skill {
    pub id: SkillId,
    pub name: String,
    pub max_level: u32,
}

impl Skill {
    pub fn new(id: u32, name: impl Into<String>, max_level: u32) -> Self {
        Self {
            id: SkillId(id),
            name: name.into(),
            max_level,
        }
    }
}

/// A (skill, level) pair granted by a piece, charm or jewel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbilityContribution {
    pub skill: SkillId,
    pub level: u32,
}

impl AbilityContribution {
    pub fn new(skill: SkillId, level: u32) -> Self {
        Self { skill, level }
    }
}

/// A requested skill level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ability {
    pub skill: SkillId,
    pub level: u32,
}

impl Ability {
    pub fn new(skill: SkillId, level: u32) -> Self {
        Self { skill, level }
    }
}

/// The set of target abilities for one search.
///
/// Keyed by skill identity; requesting the same skill twice keeps the higher
/// level. Iteration order is ascending skill id, which is also the position
/// of each skill in every per-search level vector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesiredAbilities {
    targets: BTreeMap<SkillId, u32>,
}

impl DesiredAbilities {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a target, max-merging with any existing target for the skill.
    pub fn insert(&mut self, ability: Ability) {
        let entry = self.targets.entry(ability.skill).or_insert(0);
        *entry = (*entry).max(ability.level);
    }

    pub fn with(mut self, skill: SkillId, level: u32) -> Self {
        self.insert(Ability::new(skill, level));
        self
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn level(&self, skill: SkillId) -> Option<u32> {
        self.targets.get(&skill).copied()
    }

    /// Position of `skill` in the ordered target list.
    pub fn position(&self, skill: SkillId) -> Option<usize> {
        self.targets.keys().position(|&s| s == skill)
    }

    pub fn iter(&self) -> impl Iterator<Item = Ability> + '_ {
        self.targets
            .iter()
            .map(|(&skill, &level)| Ability::new(skill, level))
    }

    pub fn skills(&self) -> impl Iterator<Item = SkillId> + '_ {
        self.targets.keys().copied()
    }

    /// Checks the set against the catalog's skill definitions.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` when the set is empty, a level is zero,
    /// a skill is unknown, or a level exceeds the skill's maximum.
    pub fn validate(&self, catalog: &Catalog) -> Result<()> {
        if self.targets.is_empty() {
            return Err(ArmoryError::invalid_configuration(
                "at least one desired ability is required",
            ));
        }
        for (&skill, &level) in &self.targets {
            let Some(definition) = catalog.skill(skill) else {
                return Err(ArmoryError::invalid_configuration(format!(
                    "desired {skill} is not defined in the catalog"
                )));
            };
            if level == 0 {
                return Err(ArmoryError::invalid_configuration(format!(
                    "desired level for '{}' must be at least 1",
                    definition.name
                )));
            }
            if level > definition.max_level {
                return Err(ArmoryError::invalid_configuration(format!(
                    "desired level {level} for '{}' exceeds its maximum {}",
                    definition.name, definition.max_level
                )));
            }
        }
        Ok(())
    }
}

impl FromIterator<Ability> for DesiredAbilities {
    fn from_iter<I: IntoIterator<Item = Ability>>(iter: I) -> Self {
        let mut desired = DesiredAbilities::new();
        for ability in iter {
            desired.insert(ability);
        }
        desired
    }
}

impl Extend<Ability> for DesiredAbilities {
    fn extend<I: IntoIterator<Item = Ability>>(&mut self, iter: I) {
        for ability in iter {
            self.insert(ability);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_skills_keep_highest_level() {
        let desired: DesiredAbilities = [
            Ability::new(SkillId(3), 1),
            Ability::new(SkillId(3), 4),
            Ability::new(SkillId(3), 2),
        ]
        .into_iter()
        .collect();

        assert_eq!(desired.len(), 1);
        assert_eq!(desired.level(SkillId(3)), Some(4));
    }

    #[test]
    fn test_iteration_is_ordered_by_skill() {
        let desired = DesiredAbilities::new()
            .with(SkillId(9), 1)
            .with(SkillId(2), 3)
            .with(SkillId(5), 2);

        let skills: Vec<_> = desired.skills().collect();
        assert_eq!(skills, vec![SkillId(2), SkillId(5), SkillId(9)]);
        assert_eq!(desired.position(SkillId(5)), Some(1));
        assert_eq!(desired.position(SkillId(7)), None);
    }

    #[test]
    fn test_validate_rejects_empty_and_out_of_range() {
        let catalog = Catalog::builder()
            .skill(Skill::new(1, "Attack Boost", 7))
            .build()
            .unwrap();

        let empty = DesiredAbilities::new();
        assert!(matches!(
            empty.validate(&catalog),
            Err(ArmoryError::InvalidConfiguration(_))
        ));

        let too_high = DesiredAbilities::new().with(SkillId(1), 8);
        assert!(too_high.validate(&catalog).is_err());

        let unknown = DesiredAbilities::new().with(SkillId(2), 1);
        assert!(unknown.validate(&catalog).is_err());

        let zero = DesiredAbilities::new().with(SkillId(1), 0);
        assert!(zero.validate(&catalog).is_err());

        let ok = DesiredAbilities::new().with(SkillId(1), 7);
        assert!(ok.validate(&catalog).is_ok());
    }
}
