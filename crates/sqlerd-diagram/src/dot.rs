//! Graphviz DOT serialization.
//!
//! Tables become HTML-like `<TABLE>` labels (one row per column: name, type,
//! constraint markers). Relationship edges are drawn with `dir=both` so the
//! tail carries the referencing side's marker and the head the referenced
//! side's.

use crate::model::{Diagram, TableNode};
use crate::theme::Theme;
use sqlerd_ingest_sql::Cardinality;

/// Crow's-foot arrow for an endpoint; the first shape sits against the node.
pub fn arrow_shape(cardinality: Cardinality) -> &'static str {
    match cardinality {
        Cardinality::ExactlyOne => "teetee",
        Cardinality::OneOrMore => "crowtee",
        Cardinality::ZeroOrOne => "teeodot",
        Cardinality::ZeroOrMore => "crowodot",
    }
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn table_label(node: &TableNode, theme: Theme) -> String {
    let p = theme.palette();
    let mut label = String::new();
    label.push_str(&format!(
        "<TABLE BORDER=\"1\" CELLBORDER=\"0\" CELLSPACING=\"0\" CELLPADDING=\"4\" COLOR=\"{}\">",
        p.border
    ));
    label.push_str(&format!(
        "<TR><TD COLSPAN=\"3\" BGCOLOR=\"{}\"><FONT COLOR=\"#ffffff\"><B>{}</B></FONT></TD></TR>",
        p.header,
        html_escape(&node.name)
    ));
    for field in &node.fields {
        label.push_str(&format!(
            "<TR><TD ALIGN=\"LEFT\">{}</TD><TD ALIGN=\"LEFT\">{}</TD><TD ALIGN=\"LEFT\">{}</TD></TR>",
            html_escape(&field.name),
            html_escape(&field.data_type),
            html_escape(field.constraint.as_deref().unwrap_or(""))
        ));
    }
    label.push_str("</TABLE>");
    label
}

pub fn render_dot(diagram: &Diagram, theme: Theme) -> String {
    let p = theme.palette();

    let mut out = String::new();
    out.push_str("digraph sqlerd {\n");
    out.push_str(&format!(
        "  graph [rankdir=LR, bgcolor=\"{}\", fontname=\"Helvetica\"];\n",
        p.background
    ));
    out.push_str(&format!(
        "  node [shape=plaintext, fontname=\"Helvetica\", fontcolor=\"{}\"];\n",
        p.foreground
    ));
    out.push_str(&format!(
        "  edge [fontname=\"Helvetica\", color=\"{}\", fontcolor=\"{}\", dir=both];\n\n",
        p.edge, p.foreground
    ));

    for node in &diagram.nodes {
        out.push_str(&format!(
            "  \"{}\" [label=<{}>];\n",
            dot_escape(&node.name),
            table_label(node, theme)
        ));
    }

    if !diagram.edges.is_empty() {
        out.push('\n');
    }
    for edge in &diagram.edges {
        out.push_str(&format!(
            "  \"{}\" -> \"{}\" [label=\"{}\", arrowtail={}, arrowhead={}];\n",
            dot_escape(&edge.from_table),
            dot_escape(&edge.to_table),
            dot_escape(&edge.label),
            arrow_shape(edge.source_arrowhead),
            arrow_shape(edge.target_arrowhead)
        ));
    }

    out.push_str("}\n");
    out
}
