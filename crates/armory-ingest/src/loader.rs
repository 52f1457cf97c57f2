//! Row-to-record loader.

use std::collections::HashMap;
use std::fmt;

use tracing::warn;

use crate::binding::{FieldBinding, FieldSetter, TableRecord};
use crate::warning::IngestWarning;

/// A record populated from one row, with the warnings raised for it.
#[derive(Debug, Clone)]
pub struct LoadedRecord<T> {
    pub record: T,
    pub warnings: Vec<IngestWarning>,
}

/// Every record of a table plus all warnings, header warnings first.
#[derive(Debug, Clone)]
pub struct LoadReport<T> {
    pub records: Vec<T>,
    pub warnings: Vec<IngestWarning>,
}

impl<T> LoadReport<T> {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

struct BoundField<T> {
    binding: FieldBinding<T>,
    column: Option<usize>,
}

/// Populates [`TableRecord`]s from rows sharing one header.
///
/// Column lookup is case-sensitive and exact. When the header repeats a
/// column name the first occurrence is used. For each field, the first of
/// its header names present in the header wins.
pub struct RecordLoader<T: TableRecord> {
    fields: Vec<BoundField<T>>,
    header_warnings: Vec<IngestWarning>,
}

impl<T: TableRecord> fmt::Debug for RecordLoader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordLoader")
            .field("fields", &self.fields.len())
            .field("header_warnings", &self.header_warnings)
            .finish()
    }
}

impl<T: TableRecord> RecordLoader<T> {
    /// Resolves every visible binding of `T` against `header`.
    pub fn new<S: AsRef<str>>(header: &[S]) -> Self {
        let mut columns: HashMap<&str, usize> = HashMap::new();
        for (index, name) in header.iter().enumerate() {
            columns.entry(name.as_ref()).or_insert(index);
        }

        let mut fields = Vec::new();
        let mut header_warnings = Vec::new();

        for binding in T::bindings() {
            if binding.is_hidden() {
                continue;
            }
            let names = binding.header_names();
            let column = names.iter().find_map(|name| columns.get(name).copied());
            if column.is_none() {
                let warning = IngestWarning::MissingColumn {
                    field: binding.field(),
                    names,
                };
                warn!(%warning, "ingestion warning");
                header_warnings.push(warning);
            }
            fields.push(BoundField { binding, column });
        }

        Self {
            fields,
            header_warnings,
        }
    }

    /// Warnings raised while resolving the header.
    pub fn header_warnings(&self) -> &[IngestWarning] {
        &self.header_warnings
    }

    /// Populates one record. `line` is used only in diagnostics.
    pub fn load_record<S: AsRef<str>>(&self, row: &[S], line: usize) -> LoadedRecord<T> {
        let mut record = T::default();
        let mut warnings = Vec::new();

        for bound in &self.fields {
            let Some(index) = bound.column else {
                continue;
            };
            let field = bound.binding.field();
            let Some(raw) = row.get(index) else {
                warnings.push(IngestWarning::ShortRow {
                    line,
                    field,
                    index,
                    len: row.len(),
                });
                continue;
            };
            let raw = raw.as_ref();

            match bound.binding.setter() {
                FieldSetter::Integer(set) => match raw.trim().parse::<i32>() {
                    Ok(value) => set(&mut record, value),
                    Err(_) => warnings.push(IngestWarning::InvalidInteger {
                        line,
                        field,
                        value: raw.to_string(),
                    }),
                },
                FieldSetter::Text(set) => set(&mut record, raw.to_string()),
            }
        }

        for warning in &warnings {
            warn!(%warning, "ingestion warning");
        }

        LoadedRecord { record, warnings }
    }

    /// Populates a record per row. Rows are numbered from 2 (the header is
    /// line 1).
    pub fn load_all<I, R, S>(&self, rows: I) -> LoadReport<T>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut records = Vec::new();
        let mut warnings = self.header_warnings.clone();

        for (offset, row) in rows.into_iter().enumerate() {
            let loaded = self.load_record(row.as_ref(), offset + 2);
            records.push(loaded.record);
            warnings.extend(loaded.warnings);
        }

        LoadReport { records, warnings }
    }
}

/// Loads a whole table whose first row is the header.
pub fn load_table<T, R, S>(table: &[R]) -> LoadReport<T>
where
    T: TableRecord,
    R: AsRef<[S]>,
    S: AsRef<str>,
{
    match table.split_first() {
        Some((header, rows)) => RecordLoader::<T>::new(header.as_ref()).load_all(rows),
        None => LoadReport {
            records: Vec::new(),
            warnings: Vec::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Row {
        id: i32,
        name: String,
        defense: i32,
        notes: String,
    }

    impl TableRecord for Row {
        fn bindings() -> Vec<FieldBinding<Self>> {
            vec![
                FieldBinding::<Self>::integer("id", |r, v| r.id = v),
                FieldBinding::<Self>::text("name", |r, v| r.name = v).names(&["name_en", "name"]),
                FieldBinding::<Self>::integer("defense", |r, v| r.defense = v)
                    .names(&["defense_base", "defense"]),
                FieldBinding::<Self>::text("notes", |r, v| r.notes = v).hidden(),
            ]
        }
    }

    #[test]
    fn test_populates_by_alias() {
        let loader = RecordLoader::<Row>::new(&["id", "name", "defense", "notes"]);
        let loaded = loader.load_record(&["7", "Leather Helm", "12", "secret"], 2);

        assert!(loaded.warnings.is_empty());
        assert_eq!(
            loaded.record,
            Row {
                id: 7,
                name: "Leather Helm".into(),
                defense: 12,
                notes: String::new(),
            }
        );
    }

    #[test]
    fn test_first_alias_present_wins() {
        let loader = RecordLoader::<Row>::new(&["name", "id", "name_en", "defense"]);
        let loaded = loader.load_record(&["Kabuto", "1", "Helm", "3"], 2);
        assert_eq!(loaded.record.name, "Helm");
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let loader = RecordLoader::<Row>::new(&["ID", "name", "defense"]);
        assert_eq!(loader.header_warnings().len(), 1);
        assert!(matches!(
            loader.header_warnings()[0],
            IngestWarning::MissingColumn { field: "id", .. }
        ));
    }

    #[test]
    fn test_unparseable_integer_keeps_default_and_other_fields() {
        let loader = RecordLoader::<Row>::new(&["id", "name", "defense"]);
        let loaded = loader.load_record(&["abc", "Bone Helm", "20"], 5);

        assert_eq!(loaded.record.id, 0);
        assert_eq!(loaded.record.name, "Bone Helm");
        assert_eq!(loaded.record.defense, 20);
        assert_eq!(
            loaded.warnings,
            vec![IngestWarning::InvalidInteger {
                line: 5,
                field: "id",
                value: "abc".into(),
            }]
        );
    }

    #[test]
    fn test_short_row_is_reported() {
        let loader = RecordLoader::<Row>::new(&["id", "name", "defense"]);
        let loaded = loader.load_record(&["3", "Short"], 9);

        assert_eq!(loaded.record.id, 3);
        assert_eq!(loaded.record.name, "Short");
        assert!(matches!(
            loaded.warnings.as_slice(),
            [IngestWarning::ShortRow {
                line: 9,
                field: "defense",
                index: 2,
                len: 2
            }]
        ));
    }

    #[test]
    fn test_duplicate_header_uses_first_column() {
        let loader = RecordLoader::<Row>::new(&["id", "id", "name", "defense"]);
        let loaded = loader.load_record(&["1", "2", "x", "0"], 2);
        assert_eq!(loaded.record.id, 1);
    }

    #[test]
    fn test_load_table_numbers_lines_after_header() {
        let table = vec![
            vec!["id", "name", "defense"],
            vec!["1", "A", "x"],
            vec!["2", "B", "4"],
        ];
        let report = load_table::<Row, _, _>(&table);

        assert_eq!(report.records.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].line(), Some(2));
        assert!(!report.is_clean());
    }
}
