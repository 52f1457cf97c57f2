//! Ranking criteria identifiers.
//!
//! A criterion names a numeric key extracted from a combination and a sort
//! direction. Criteria are parsed from strings of the form `name`,
//! `name:asc` or `name:desc`.

use std::fmt;
use std::str::FromStr;

use crate::error::ArmoryError;

/// Sort direction of a ranking criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// Orders two key values so that the preferred one compares `Less`.
    pub fn compare(self, a: i64, b: i64) -> std::cmp::Ordering {
        match self {
            SortOrder::Ascending => a.cmp(&b),
            SortOrder::Descending => b.cmp(&a),
        }
    }

    /// Returns true if `a` is at least as good as `b` under this order.
    pub fn at_least_as_good(self, a: i64, b: i64) -> bool {
        match self {
            SortOrder::Ascending => a <= b,
            SortOrder::Descending => a >= b,
        }
    }
}

/// Numeric key a combination can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CriterionKey {
    BaseDefense,
    MaxDefense,
    AugmentedDefense,
    FireResistance,
    WaterResistance,
    ThunderResistance,
    IceResistance,
    DragonResistance,
    /// Sum of `size^3` over every gem slot of the combination.
    SlotSizeCube,
    SlotCount,
    /// Number of jewels placed. Depends on the fitter's assignment.
    JewelCount,
}

impl CriterionKey {
    pub const ALL: [CriterionKey; 11] = [
        CriterionKey::BaseDefense,
        CriterionKey::MaxDefense,
        CriterionKey::AugmentedDefense,
        CriterionKey::FireResistance,
        CriterionKey::WaterResistance,
        CriterionKey::ThunderResistance,
        CriterionKey::IceResistance,
        CriterionKey::DragonResistance,
        CriterionKey::SlotSizeCube,
        CriterionKey::SlotCount,
        CriterionKey::JewelCount,
    ];

    pub fn name(self) -> &'static str {
        match self {
            CriterionKey::BaseDefense => "base_defense",
            CriterionKey::MaxDefense => "max_defense",
            CriterionKey::AugmentedDefense => "augmented_defense",
            CriterionKey::FireResistance => "fire_resistance",
            CriterionKey::WaterResistance => "water_resistance",
            CriterionKey::ThunderResistance => "thunder_resistance",
            CriterionKey::IceResistance => "ice_resistance",
            CriterionKey::DragonResistance => "dragon_resistance",
            CriterionKey::SlotSizeCube => "slot_size_cube",
            CriterionKey::SlotCount => "slot_count",
            CriterionKey::JewelCount => "jewel_count",
        }
    }

    pub fn default_order(self) -> SortOrder {
        match self {
            CriterionKey::JewelCount => SortOrder::Ascending,
            _ => SortOrder::Descending,
        }
    }

    /// True when the combination value is the sum of per-item values, so the
    /// criterion can take part in piece dominance.
    pub fn is_piece_decomposable(self) -> bool {
        !matches!(self, CriterionKey::JewelCount)
    }
}

impl fmt::Display for CriterionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CriterionKey {
    type Err = ArmoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CriterionKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| {
                ArmoryError::invalid_configuration(format!("unknown ranking criterion '{s}'"))
            })
    }
}

/// A ranking key paired with its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RankingCriterion {
    pub key: CriterionKey,
    pub order: SortOrder,
}

impl RankingCriterion {
    pub fn new(key: CriterionKey, order: SortOrder) -> Self {
        Self { key, order }
    }

    /// The criterion with its natural direction.
    pub fn natural(key: CriterionKey) -> Self {
        Self::new(key, key.default_order())
    }

    /// The default ranking: base defense, dragon resistance, slot size cube.
    pub fn defaults() -> Vec<RankingCriterion> {
        vec![
            RankingCriterion::natural(CriterionKey::BaseDefense),
            RankingCriterion::natural(CriterionKey::DragonResistance),
            RankingCriterion::natural(CriterionKey::SlotSizeCube),
        ]
    }
}

impl fmt::Display for RankingCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.order {
            SortOrder::Ascending => "asc",
            SortOrder::Descending => "desc",
        };
        write!(f, "{}:{}", self.key, order)
    }
}

impl FromStr for RankingCriterion {
    type Err = ArmoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, order) = match s.split_once(':') {
            Some((name, order)) => (name.trim(), Some(order.trim())),
            None => (s, None),
        };
        let key: CriterionKey = name.parse()?;
        let order = match order {
            None => key.default_order(),
            Some("asc") | Some("ascending") => SortOrder::Ascending,
            Some("desc") | Some("descending") => SortOrder::Descending,
            Some(other) => {
                return Err(ArmoryError::invalid_configuration(format!(
                    "unknown sort order '{other}' for criterion '{name}'"
                )))
            }
        };
        Ok(RankingCriterion::new(key, order))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_order() {
        let c: RankingCriterion = "base_defense".parse().unwrap();
        assert_eq!(c.order, SortOrder::Descending);

        let c: RankingCriterion = "jewel_count".parse().unwrap();
        assert_eq!(c.order, SortOrder::Ascending);

        let c: RankingCriterion = "fire_resistance:asc".parse().unwrap();
        assert_eq!(c.key, CriterionKey::FireResistance);
        assert_eq!(c.order, SortOrder::Ascending);
    }

    #[test]
    fn test_unknown_criterion_is_invalid_configuration() {
        let err = "luck".parse::<RankingCriterion>().unwrap_err();
        assert!(matches!(err, ArmoryError::InvalidConfiguration(_)));

        let err = "base_defense:sideways".parse::<RankingCriterion>().unwrap_err();
        assert!(matches!(err, ArmoryError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_display_round_trips_names() {
        for key in CriterionKey::ALL {
            let criterion = RankingCriterion::natural(key);
            let parsed: RankingCriterion = criterion.to_string().parse().unwrap();
            assert_eq!(parsed, criterion);
        }
    }

    #[test]
    fn test_sort_order_compare() {
        use std::cmp::Ordering;
        assert_eq!(SortOrder::Descending.compare(5, 3), Ordering::Less);
        assert_eq!(SortOrder::Ascending.compare(5, 3), Ordering::Greater);
        assert!(SortOrder::Ascending.at_least_as_good(2, 2));
        assert!(!SortOrder::Descending.at_least_as_good(1, 2));
    }
}
