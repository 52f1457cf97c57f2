//! Armory Ingest - tabular catalog loading
//!
//! Maps rows of string fields onto typed records through declarative
//! [`FieldBinding`] tables, then converts the records into catalog entries.
//!
//! Problems never abort a batch. Missing columns, short rows and unparseable
//! integers are reported as [`IngestWarning`]s and the affected field keeps
//! its default value.
//!
//! ```
//! use armory_ingest::{load_table, JewelRecord};
//!
//! let report = load_table::<JewelRecord, _, _>(&[
//!     vec!["id", "name", "slot", "skill", "skill_pts"],
//!     vec!["1", "Attack Jewel", "1", "1", "x"],
//! ]);
//!
//! assert_eq!(report.records[0].name, "Attack Jewel");
//! assert_eq!(report.records[0].skill_level, 0);
//! assert_eq!(report.warnings.len(), 1);
//! ```

pub mod binding;
pub mod loader;
pub mod records;
pub mod warning;

pub use binding::{FieldBinding, FieldSetter, TableRecord};
pub use loader::{load_table, LoadReport, LoadedRecord, RecordLoader};
pub use records::{ArmorRecord, CatalogAssembler, CharmRecord, JewelRecord, SkillRecord};
pub use warning::IngestWarning;
