//! schemashift — structural migration engine for infrastructure-as-code
//! configuration and state across provider schema versions.
//!
//! The crate is the generic, resource-agnostic core: a registry dispatching
//! per-resource migrators, a config-side rewriter over the block tree, a
//! state-side rewriter over the JSON attribute tree, and the structural
//! primitives both sides compose. Per-resource rule sets live outside the
//! crate and implement [`migrator::Migrator`].

pub mod ast;
pub mod config;
pub mod error;
pub mod fmt;
pub mod migrator;
pub mod parser;
pub mod pipeline;
pub mod registry;
pub mod state;

pub use parser::parse_document;

pub mod prelude {
    pub use crate::ast::{Attribute, Block, Body, BodyItem, Document, Expr};
    pub use crate::config::{ConfigOutcome, ConfigRewriter};
    pub use crate::error::{Diagnostic, MigrateError, Severity};
    pub use crate::migrator::{Context, Migrator, MovedBlock, TransformResult};
    pub use crate::parser::parse_document;
    pub use crate::pipeline::{MigrationOutcome, Pipeline};
    pub use crate::registry::Registry;
    pub use crate::state::{StateOutcome, StateRewriter};
}
