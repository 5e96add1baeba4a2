//! Drops DDL statements that do not contribute to the schema shape
//! (ownership, extensions, sequences, triggers) before parsing.
//!
//! Statements are split naively on `;`; a `;` inside a string literal splits
//! the statement too.

use regex::RegexSet;
use std::sync::OnceLock;

pub const STATEMENT_SEPARATOR: &str = ";";

const FILTER_PATTERNS: &[&str] = &[
    "owner to",
    "create extension",
    "create or replace extension",
    "comment on extension",
    "create sequence",
    "create or replace sequence",
    "alter sequence",
    "create trigger",
    "create or replace trigger",
];

fn filter_set() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        // `filter_patterns_compile` pins this; an empty set would keep everything.
        RegexSet::new(FILTER_PATTERNS).unwrap_or_else(|_| RegexSet::empty())
    })
}

/// SQL text that survived filtering, ready for the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilteredSql {
    pub sql: String,
    pub kept: usize,
    pub dropped: usize,
}

/// Lower-case every statement and drop those matching a filter pattern.
pub fn filter_statements(sql: &str) -> FilteredSql {
    let set = filter_set();
    let mut kept = Vec::new();
    let mut dropped = 0;

    for statement in sql.split(STATEMENT_SEPARATOR) {
        let statement = statement.to_lowercase();
        if set.is_match(&statement) {
            dropped += 1;
            continue;
        }
        kept.push(statement);
    }

    FilteredSql {
        kept: kept.iter().filter(|s| !s.trim().is_empty()).count(),
        sql: kept.join(STATEMENT_SEPARATOR),
        dropped,
    }
}
