//! Owned diagram description: one node per table, one edge per reference.

use serde::{Deserialize, Serialize};
use sqlerd_ingest_sql::Cardinality;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    pub nodes: Vec<TableNode>,
    pub edges: Vec<RelationEdge>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNode {
    pub name: String,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub data_type: String,
    /// Comma-joined `NOTNULL`, `UNQ`, `PK`, `FK` markers; `None` when empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationEdge {
    pub from_table: String,
    pub to_table: String,
    pub label: String,
    pub source_arrowhead: Cardinality,
    pub target_arrowhead: Cardinality,
}

impl RelationEdge {
    /// Connection key in `from <-> to` form.
    pub fn key(&self) -> String {
        format!("{} <-> {}", self.from_table, self.to_table)
    }
}

impl Diagram {
    pub fn node(&self, name: &str) -> Option<&TableNode> {
        self.nodes.iter().find(|n| n.name == name)
    }
}
