//! Armory - equipment loadout search
//!
//! Finds every combination of armor pieces, charm and jewels that reaches a
//! set of desired ability levels, ranked by configurable criteria.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use armory::prelude::*;
//!
//! let catalog = Catalog::builder()
//!     .skill(Skill::new(1, "Attack Boost", 7))
//!     .piece(EquipmentPiece::new(1, "Bone Helm", Category::Head).with_slots([1]))
//!     .jewel(Jewel::new(1, "Attack Jewel", 1, SkillId(1), 1))
//!     .build()
//!     .unwrap();
//!
//! let request = SearchRequest::new(DesiredAbilities::new().with(SkillId(1), 1));
//! let report = run_search_with(Arc::new(catalog), request, SearchConfig::default()).unwrap();
//!
//! assert_eq!(report.results.len(), 1);
//! assert_eq!(report.results[0].combination.jewels().len(), 1);
//! ```

// Catalog model
pub use armory_core::{
    Ability, AbilityContribution, ArmoryError, Catalog, CatalogBuilder, Category, Charm, CharmId,
    CriterionKey, Defense, DesiredAbilities, EquipmentPiece, Equippable, Jewel, JewelId, PieceId,
    RankingCriterion, Resistances, Result, Skill, SkillId, SlotCounts, SortOrder, MAX_SLOT_SIZE,
};

// Configuration
pub use armory_config::{
    ConfigError, ProgressConfig, PruningConfig, RankingConfig, SearchConfig, TerminationConfig,
};

// Ingestion
pub use armory_ingest::{
    load_table, ArmorRecord, CatalogAssembler, CharmRecord, IngestWarning, JewelRecord,
    LoadReport, SkillRecord,
};

// Search
pub use armory_search::{
    CancellationHandle, Combination, JewelAssignment, JewelPlacement, LoggingSink, ProgressSink,
    SearchEvent, SearchJob, SearchManager, SearchReport, SearchRequest, SearchResult,
    SearchStatistics, SearchStatus, SlotSource, Solver,
};

#[cfg(feature = "console")]
pub mod console;

mod search;
pub use search::{run_search, run_search_with, CONFIG_FILE};

pub mod prelude {
    pub use super::{run_search, run_search_with};
    pub use super::{
        Catalog, Category, Charm, DesiredAbilities, EquipmentPiece, Jewel, Skill, SkillId,
    };
    pub use super::{SearchConfig, SearchReport, SearchRequest, SearchStatus};
}
