//! D2 script serialization (`sql_table` shapes, crow's-foot arrowheads).

use crate::model::Diagram;
use crate::theme::Theme;
use sqlerd_ingest_sql::Cardinality;

pub fn arrowhead_shape(cardinality: Cardinality) -> &'static str {
    match cardinality {
        Cardinality::ExactlyOne => "cf-one-required",
        Cardinality::OneOrMore => "cf-many-required",
        Cardinality::ZeroOrOne => "cf-one",
        Cardinality::ZeroOrMore => "cf-many",
    }
}

/// Keys D2 reads as attributes when unquoted. A column named `label` must be
/// quoted or it relabels the table instead of adding a row.
const D2_RESERVED_KEYWORDS: &[&str] = &[
    "label",
    "shape",
    "style",
    "icon",
    "tooltip",
    "link",
    "near",
    "width",
    "height",
    "top",
    "left",
    "constraint",
    "class",
    "classes",
    "direction",
    "vars",
    "layers",
    "scenarios",
    "steps",
];

fn is_bare_key(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !D2_RESERVED_KEYWORDS
            .iter()
            .any(|kw| kw.eq_ignore_ascii_case(s))
}

fn key(s: &str) -> String {
    if is_bare_key(s) {
        s.to_string()
    } else {
        quote(s)
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

pub fn render_d2(diagram: &Diagram, theme: Theme) -> String {
    let mut out = String::new();
    out.push_str("vars: {\n  d2-config: {\n");
    out.push_str(&format!("    theme-id: {}\n", theme.d2_theme_id()));
    out.push_str("  }\n}\n");

    for node in &diagram.nodes {
        out.push_str(&format!("\n{}: {{\n", key(&node.name)));
        out.push_str("  shape: sql_table\n");
        for field in &node.fields {
            out.push_str(&format!("  {}: {}", key(&field.name), quote(&field.data_type)));
            if let Some(c) = &field.constraint {
                out.push_str(&format!(" {{constraint: {}}}", quote(c)));
            }
            out.push('\n');
        }
        out.push_str("}\n");
    }

    for edge in &diagram.edges {
        out.push_str(&format!(
            "\n{} <-> {}: {} {{\n",
            key(&edge.from_table),
            key(&edge.to_table),
            quote(&edge.label)
        ));
        out.push_str(&format!(
            "  source-arrowhead.shape: {}\n",
            arrowhead_shape(edge.source_arrowhead)
        ));
        out.push_str(&format!(
            "  target-arrowhead.shape: {}\n",
            arrowhead_shape(edge.target_arrowhead)
        ));
        out.push_str("}\n");
    }

    out
}
