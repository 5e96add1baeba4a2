//! Projects a schema and its resolved cardinalities onto diagram records.

use crate::model::{Diagram, Field, RelationEdge, TableNode};
use sqlerd_ingest_sql::{resolve_reference, Column, Reference, SqlSchema};

pub fn project(schema: &SqlSchema) -> Diagram {
    let nodes = schema
        .tables
        .iter()
        .map(|t| TableNode {
            name: t.name.clone(),
            fields: t
                .columns
                .iter()
                .map(|c| Field {
                    name: c.name.clone(),
                    data_type: c.data_type.clone(),
                    constraint: constraint_annotation(c),
                })
                .collect(),
        })
        .collect();

    let edges = schema
        .references
        .iter()
        .map(|r| {
            let card = resolve_reference(schema, r);
            RelationEdge {
                from_table: r.from_table.clone(),
                to_table: r.to_table.clone(),
                label: edge_label(r),
                source_arrowhead: card.from,
                target_arrowhead: card.to,
            }
        })
        .collect();

    Diagram { nodes, edges }
}

/// `NOTNULL`, `UNQ`, `PK`, `FK` in that order; `PK` suppresses the first two.
pub fn constraint_annotation(column: &Column) -> Option<String> {
    let mut constraints = Vec::new();
    if column.not_null && !column.primary {
        constraints.push("NOTNULL");
    }
    if column.unique && !column.primary {
        constraints.push("UNQ");
    }
    if column.primary {
        constraints.push("PK");
    }
    if column.references {
        constraints.push("FK");
    }

    if constraints.is_empty() {
        None
    } else {
        Some(constraints.join(", "))
    }
}

pub fn edge_label(reference: &Reference) -> String {
    let from = reference.from_columns.join(", ");
    if reference.to_columns.is_empty() {
        from
    } else {
        format!("{from}: {}", reference.to_columns.join(", "))
    }
}
