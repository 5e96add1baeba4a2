//! Normalized schema model produced by the extractor.

use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    /// Canonical SQL text of the declared type; only used as a label.
    pub data_type: String,
    pub primary: bool,
    pub not_null: bool,
    pub unique: bool,
    /// True when this column declares an inline `REFERENCES`.
    pub references: bool,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            primary: false,
            not_null: false,
            unique: false,
            references: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A directed foreign-key relationship `from_table(from_columns) -> to_table(to_columns)`.
///
/// An empty `to_columns` means the referenced columns were not spelled out
/// (or were identical to `from_columns`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub from_table: String,
    pub to_table: String,
    pub from_columns: Vec<String>,
    pub to_columns: Vec<String>,
}

/// Position of a column inside [`SqlSchema::tables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnLocation {
    pub table: usize,
    pub column: usize,
}

/// Registry key for a column: `"table.column"`.
pub fn column_key(table: &str, column: &str) -> String {
    format!("{table}.{column}")
}

/// Discovered SQL schema
#[derive(Debug, Clone, Default)]
pub struct SqlSchema {
    pub tables: Vec<Table>,
    pub references: Vec<Reference>,
    /// `"table.column"` -> owning column.
    pub columns: HashMap<String, ColumnLocation>,
    /// Columns that only participate in a multi-column unique/primary key.
    pub complex_unique_keys: BTreeSet<String>,
}

impl SqlSchema {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    pub fn column(&self, table: &str, column: &str) -> Option<&Column> {
        let loc = self.columns.get(&column_key(table, column))?;
        self.tables.get(loc.table)?.columns.get(loc.column)
    }

    pub fn is_complex_unique(&self, table: &str, column: &str) -> bool {
        self.complex_unique_keys
            .contains(&column_key(table, column))
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.references.is_empty()
    }
}
