//! Seeded random catalogs.

use armory_core::{
    Ability, Catalog, Category, Charm, Defense, DesiredAbilities, EquipmentPiece, Jewel,
    Resistances, Skill, SkillId, MAX_SLOT_SIZE,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Shape of a generated catalog. Generation is fully determined by `seed`.
#[derive(Debug, Clone)]
pub struct RandomCatalog {
    pub seed: u64,
    pub skills: u32,
    pub max_level: u32,
    pub pieces_per_category: usize,
    pub charms: usize,
    pub jewels: usize,
    pub max_slots: usize,
}

impl RandomCatalog {
    /// Small enough for exhaustive checking.
    pub fn small(seed: u64) -> Self {
        Self {
            seed,
            skills: 3,
            max_level: 4,
            pieces_per_category: 3,
            charms: 2,
            jewels: 5,
            max_slots: 2,
        }
    }

    pub fn generate(&self) -> Catalog {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut builder = Catalog::builder();

        for id in 1..=self.skills {
            builder.add_skill(Skill::new(id, format!("Skill {id}"), self.max_level));
        }

        let mut next_id = 1;
        for category in Category::ALL {
            for n in 0..self.pieces_per_category {
                let mut piece = EquipmentPiece::new(next_id, format!("{category} {n}"), category)
                    .with_slots(self.slots(&mut rng))
                    .with_defense(Defense::flat(rng.random_range(0..40)))
                    .with_resistances(Resistances {
                        fire: rng.random_range(-3..=3),
                        dragon: rng.random_range(-3..=3),
                        ..Resistances::default()
                    });
                for (skill, level) in self.abilities(&mut rng) {
                    piece = piece.with_ability(skill, level);
                }
                builder.add_piece(piece);
                next_id += 1;
            }
        }

        for n in 0..self.charms {
            let mut charm = Charm::new(n as u32 + 1, format!("Charm {n}"))
                .with_slots(self.slots(&mut rng));
            for (skill, level) in self.abilities(&mut rng) {
                charm = charm.with_ability(skill, level);
            }
            builder.add_charm(charm);
        }

        for n in 0..self.jewels {
            let skill = SkillId(rng.random_range(1..=self.skills));
            let size = rng.random_range(1..=MAX_SLOT_SIZE);
            let level = rng.random_range(1..=2);
            builder.add_jewel(Jewel::new(n as u32 + 1, format!("Jewel {n}"), size, skill, level));
        }

        builder.build().expect("generated catalog is valid")
    }

    /// A desired set over one to all skills, levels within the maximum.
    pub fn desired(&self, salt: u64) -> DesiredAbilities {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed ^ salt.rotate_left(17));
        let count = rng.random_range(1..=self.skills);
        (1..=count)
            .map(|_| {
                Ability::new(
                    SkillId(rng.random_range(1..=self.skills)),
                    rng.random_range(1..=self.max_level),
                )
            })
            .collect()
    }

    fn slots(&self, rng: &mut ChaCha8Rng) -> Vec<u8> {
        let count = rng.random_range(0..=self.max_slots);
        (0..count).map(|_| rng.random_range(1..=MAX_SLOT_SIZE)).collect()
    }

    fn abilities(&self, rng: &mut ChaCha8Rng) -> Vec<(SkillId, u32)> {
        let count = rng.random_range(0..=2);
        (0..count)
            .map(|_| (SkillId(rng.random_range(1..=self.skills)), rng.random_range(1..=2)))
            .collect()
    }
}
