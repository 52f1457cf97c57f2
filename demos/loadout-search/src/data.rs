//! Sample catalog tables.

use armory::{
    load_table, ArmorRecord, Catalog, CatalogAssembler, CharmRecord, IngestWarning, JewelRecord,
    Result, SkillRecord,
};

const SKILLS: &str = include_str!("../data/skills.csv");
const ARMOR: &str = include_str!("../data/armor.csv");
const CHARMS: &str = include_str!("../data/charms.csv");
const JEWELS: &str = include_str!("../data/jewels.csv");

/// Splits comma separated text into rows. The sample tables hold no quoted
/// fields.
fn rows(text: &str) -> Vec<Vec<&str>> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.split(',').collect())
        .collect()
}

/// Assembles the bundled sample catalog.
pub fn sample_catalog() -> Result<(Catalog, Vec<IngestWarning>)> {
    let mut assembler = CatalogAssembler::new();
    assembler
        .skills(load_table::<SkillRecord, _, _>(&rows(SKILLS)))
        .armor(load_table::<ArmorRecord, _, _>(&rows(ARMOR)))
        .charms(load_table::<CharmRecord, _, _>(&rows(CHARMS)))
        .jewels(load_table::<JewelRecord, _, _>(&rows(JEWELS)));
    assembler.finish()
}
