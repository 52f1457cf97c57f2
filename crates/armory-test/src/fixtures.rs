//! Hand-written catalogs.

use armory_core::{
    Catalog, Category, Charm, Defense, EquipmentPiece, Jewel, Resistances, Skill, SkillId,
};

pub const ATTACK: SkillId = SkillId(1);
pub const GUARD: SkillId = SkillId(2);
pub const EVADE: SkillId = SkillId(3);

/// A small but complete catalog: three skills, a few pieces per category,
/// two charms and five jewels.
pub fn hunter_catalog() -> Catalog {
    Catalog::builder()
        .skill(Skill::new(ATTACK.0, "Attack Boost", 7))
        .skill(Skill::new(GUARD.0, "Guard", 5))
        .skill(Skill::new(EVADE.0, "Evade Window", 5))
        .piece(
            EquipmentPiece::new(101, "Bone Helm", Category::Head)
                .with_slots([1])
                .with_defense(Defense { base: 20, max: 34, augmented: 50 })
                .with_ability(ATTACK, 1),
        )
        .piece(
            EquipmentPiece::new(102, "Iron Helm", Category::Head)
                .with_defense(Defense::flat(24))
                .with_ability(GUARD, 1),
        )
        .piece(
            EquipmentPiece::new(103, "Leather Cap", Category::Head)
                .with_slots([2, 1])
                .with_defense(Defense::flat(12)),
        )
        .piece(
            EquipmentPiece::new(201, "Bone Mail", Category::Chest)
                .with_slots([2])
                .with_defense(Defense::flat(22))
                .with_ability(ATTACK, 2),
        )
        .piece(
            EquipmentPiece::new(202, "Iron Mail", Category::Chest)
                .with_defense(Defense::flat(28))
                .with_resistances(Resistances { dragon: 2, ..Resistances::default() })
                .with_ability(GUARD, 2),
        )
        .piece(
            EquipmentPiece::new(301, "Bone Vambraces", Category::Gloves)
                .with_slots([1, 1])
                .with_defense(Defense::flat(18))
                .with_ability(EVADE, 1),
        )
        .piece(
            EquipmentPiece::new(302, "Iron Gauntlets", Category::Gloves)
                .with_defense(Defense::flat(26))
                .with_ability(GUARD, 1),
        )
        .piece(
            EquipmentPiece::new(401, "Bone Coil", Category::Waist)
                .with_slots([3])
                .with_defense(Defense::flat(16)),
        )
        .piece(
            EquipmentPiece::new(402, "Iron Belt", Category::Waist)
                .with_defense(Defense::flat(24))
                .with_resistances(Resistances { dragon: -1, fire: 2, ..Resistances::default() })
                .with_ability(ATTACK, 1),
        )
        .piece(
            EquipmentPiece::new(501, "Bone Greaves", Category::Legs)
                .with_slots([2, 2])
                .with_defense(Defense::flat(20))
                .with_ability(EVADE, 1),
        )
        .piece(
            EquipmentPiece::new(502, "Iron Greaves", Category::Legs)
                .with_defense(Defense::flat(26))
                .with_ability(ATTACK, 1)
                .with_ability(GUARD, 1),
        )
        .charm(Charm::new(1, "Attack Charm").with_ability(ATTACK, 2))
        .charm(Charm::new(2, "Guard Charm").with_slots([1]).with_ability(GUARD, 1))
        .jewel(Jewel::new(1, "Attack Jewel", 1, ATTACK, 1))
        .jewel(Jewel::new(2, "Attack Jewel+", 3, ATTACK, 2))
        .jewel(Jewel::new(3, "Guard Jewel", 2, GUARD, 1))
        .jewel(Jewel::new(4, "Evade Jewel", 1, EVADE, 1))
        .jewel(Jewel::new(5, "Sturdy Jewel", 4, GUARD, 3))
        .build()
        .expect("fixture catalog is valid")
}
