//! Crow's-foot cardinality of foreign-key endpoints.
//!
//! An endpoint is *required* when every participating column is `PRIMARY KEY`
//! or `NOT NULL`, and *unique* when every participating column is primary or
//! unique without being part of a composite key.

use crate::model::{column_key, Reference, SqlSchema};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    /// Required and unique.
    ExactlyOne,
    /// Required, not unique.
    OneOrMore,
    /// Optional and unique.
    ZeroOrOne,
    /// Optional, not unique.
    ZeroOrMore,
}

impl Cardinality {
    pub fn from_flags(flags: EndpointFlags) -> Self {
        match (flags.not_null_all, flags.unique_all) {
            (true, true) => Self::ExactlyOne,
            (true, false) => Self::OneOrMore,
            (false, true) => Self::ZeroOrOne,
            (false, false) => Self::ZeroOrMore,
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Self::ExactlyOne | Self::OneOrMore)
    }

    pub fn is_unique(self) -> bool {
        matches!(self, Self::ExactlyOne | Self::ZeroOrOne)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExactlyOne => "exactly-one",
            Self::OneOrMore => "one-or-more",
            Self::ZeroOrOne => "zero-or-one",
            Self::ZeroOrMore => "zero-or-more",
        }
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointFlags {
    pub not_null_all: bool,
    pub unique_all: bool,
}

/// Fold the flags of `columns` in `table`.
///
/// Columns missing from the registry count as nullable and non-unique. An
/// empty column list is vacuously required and unique.
pub fn endpoint_flags<S: AsRef<str>>(schema: &SqlSchema, table: &str, columns: &[S]) -> EndpointFlags {
    let mut flags = EndpointFlags {
        not_null_all: true,
        unique_all: true,
    };

    for name in columns {
        let name = name.as_ref();
        let Some(column) = schema.column(table, name) else {
            tracing::warn!(
                column = %column_key(table, name),
                "reference endpoint column is not declared; treating it as nullable and non-unique"
            );
            flags.not_null_all = false;
            flags.unique_all = false;
            continue;
        };

        flags.not_null_all &= column.primary || column.not_null;
        flags.unique_all &=
            (column.primary || column.unique) && !schema.is_complex_unique(table, name);
    }

    flags
}

pub fn resolve_endpoint<S: AsRef<str>>(schema: &SqlSchema, table: &str, columns: &[S]) -> Cardinality {
    Cardinality::from_flags(endpoint_flags(schema, table, columns))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelationshipCardinality {
    pub from: Cardinality,
    pub to: Cardinality,
}

/// Resolve both endpoints of `reference`.
///
/// When the referenced columns are implied (`to_columns` empty), the
/// referencing column names are looked up in the referenced table.
pub fn resolve_reference(schema: &SqlSchema, reference: &Reference) -> RelationshipCardinality {
    let to_columns = if reference.to_columns.is_empty() {
        reference.from_columns.as_slice()
    } else {
        reference.to_columns.as_slice()
    };

    RelationshipCardinality {
        from: resolve_endpoint(schema, &reference.from_table, reference.from_columns.as_slice()),
        to: resolve_endpoint(schema, &reference.to_table, to_columns),
    }
}
