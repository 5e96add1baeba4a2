//! Diagram projection and rendering for sqlerd.
//!
//! A [`SqlSchema`](sqlerd_ingest_sql::SqlSchema) is projected into an owned
//! [`Diagram`] description (tables, fields, relationship edges with
//! crow's-foot endpoint markers). The description is then serialized for an
//! external layout engine and compiled to an image:
//! - Graphviz DOT (`dot -Tsvg`)
//! - D2 (`d2 - -`)
//! - JSON (the description itself, for custom frontends)

pub mod d2;
pub mod dot;
pub mod error;
pub mod model;
pub mod project;
pub mod render;
pub mod theme;

pub use error::DiagramError;
pub use model::{Diagram, Field, RelationEdge, TableNode};
pub use project::{constraint_annotation, edge_label, project};
pub use render::{
    compile_source, render_image, render_json, resolve_renderer_bin, Engine, RenderOptions,
};
pub use theme::{Palette, Theme};
