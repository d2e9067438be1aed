//! The per-resource migrator contract.
//!
//! Each resource kind ships one plain value implementing [`Migrator`];
//! the engine owns dispatch, splicing and error recovery. Migrators are
//! registered in a [`crate::registry::Registry`] keyed by
//! (kind, from-version, to-version).

use serde::Serialize;
use serde_json::Value;

use crate::ast::{Block, Body, Document, Expr};
use crate::error::{Diagnostic, MigrateError};

/// Capability contract implemented by every resource-kind migrator.
///
/// All methods except the two transforms have defaults, so a minimal
/// migrator implements `can_handle` plus whichever sides it rewrites.
pub trait Migrator: Send + Sync {
    /// Authoritative kind claim, including deprecated aliases. Consulted to
    /// confirm a registry hit when alias keys make dispatch ambiguous.
    fn can_handle(&self, kind: &str) -> bool;

    /// Pure text rewrite applied before structural parsing. Identity by
    /// default; used only for lexical changes not expressible as tree edits.
    fn preprocess(&self, src: &str) -> String {
        src.to_string()
    }

    /// Rewrite one resource block. The body may be mutated in place;
    /// returned sibling blocks (moved markers, split resources) are spliced
    /// into the document by the engine.
    fn transform_config(
        &self,
        ctx: &mut Context<'_>,
        block: &mut Block,
    ) -> Result<TransformResult, MigrateError> {
        let _ = (ctx, block);
        Ok(TransformResult::keep())
    }

    /// Rewrite one state instance. The engine always passes a single
    /// instance object; [`crate::state::instances_mut`] lets an
    /// implementation also accept a whole-resource shape from test
    /// harnesses.
    fn transform_state(
        &self,
        ctx: &mut Context<'_>,
        instance: Value,
        resource_path: &str,
        resource_name: &str,
    ) -> Result<Value, MigrateError> {
        let _ = (ctx, resource_path, resource_name);
        Ok(instance)
    }

    /// Declared resource-kind rename (old kind → new kind), applied by the
    /// engine to the stored state `type` field.
    fn renamed_kind(&self, kind: &str) -> Option<&str> {
        let _ = kind;
        None
    }

    /// When true, state migration is delegated to the runtime upgrade hook
    /// triggered by the kind rename; the engine applies no attribute
    /// rewriting beyond the rename itself.
    fn provider_owns_state(&self) -> bool {
        false
    }

    /// `schema_version` written into an instance after a state transform.
    fn target_schema_version(&self) -> u64 {
        0
    }
}

/// Outcome of a config-side transform.
///
/// Zero blocks with `remove_original` deletes the resource; more than one
/// implements a one-to-many split.
#[derive(Debug, Clone, Default)]
pub struct TransformResult {
    pub blocks: Vec<Block>,
    pub remove_original: bool,
}

impl TransformResult {
    /// Keep the (possibly mutated-in-place) original block.
    pub fn keep() -> Self {
        Self::default()
    }

    /// Keep the original and add sibling blocks after it.
    pub fn emit(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            remove_original: false,
        }
    }

    /// Replace the original with the given blocks at the same position.
    pub fn replace(blocks: Vec<Block>) -> Self {
        Self {
            blocks,
            remove_original: true,
        }
    }

    /// Delete the resource outright.
    pub fn remove() -> Self {
        Self {
            blocks: Vec::new(),
            remove_original: true,
        }
    }
}

/// An (old address, new address) pair recorded for every resource-kind
/// rename; addresses are unquoted `type.name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovedBlock {
    pub from: String,
    pub to: String,
}

impl MovedBlock {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Read a `moved { from = ..; to = .. }` marker block back into a pair.
    pub fn from_block(block: &Block) -> Option<Self> {
        if block.block_type != "moved" {
            return None;
        }
        let addr = |name: &str| -> Option<String> {
            match &block.body.attr(name)?.expr {
                Expr::Raw(s) => Some(s.clone()),
                Expr::Str(s) => Some(s.clone()),
                _ => None,
            }
        };
        Some(Self {
            from: addr("from")?,
            to: addr("to")?,
        })
    }
}

/// Request-scoped context handed to every transform call.
///
/// Built once per document pass and passed by reference; carries the
/// parallel tree the current side cannot see (prior state for config-side
/// lookups, the already-rewritten config for state-side lookups) plus the
/// diagnostics accumulator.
pub struct Context<'a> {
    prior_state: Option<&'a Value>,
    rewritten_config: Option<&'a Document>,
    resource_name: String,
    resource_address: String,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Context<'a> {
    pub fn new() -> Self {
        Self {
            prior_state: None,
            rewritten_config: None,
            resource_name: String::new(),
            resource_address: String::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn with_prior_state(mut self, state: Option<&'a Value>) -> Self {
        self.prior_state = state;
        self
    }

    pub fn with_rewritten_config(mut self, config: Option<&'a Document>) -> Self {
        self.rewritten_config = config;
        self
    }

    pub(crate) fn enter_resource(&mut self, name: &str, address: &str) {
        self.resource_name = name.to_string();
        self.resource_address = address.to_string();
    }

    /// Name label of the resource currently being transformed.
    pub fn resource_name(&self) -> &str {
        &self.resource_name
    }

    /// `type.name` address of the resource currently being transformed.
    pub fn resource_address(&self) -> &str {
        &self.resource_address
    }

    /// Prior (pre-migration) state document, when the driver supplied one.
    pub fn prior_state(&self) -> Option<&'a Value> {
        self.prior_state
    }

    /// The already-rewritten configuration, available during the state pass.
    pub fn rewritten_config(&self) -> Option<&'a Document> {
        self.rewritten_config
    }

    /// Body of the rewritten config block for the current resource, the
    /// input to the empty-to-null decision.
    pub fn config_body(&self, kind: &str) -> Option<&'a Body> {
        self.rewritten_config?
            .resource(kind, &self.resource_name)
            .map(|b| &b.body)
    }

    /// Record a non-fatal diagnostic against the current resource.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::warning(self.resource_address.clone(), message));
    }

    pub(crate) fn error(&mut self, address: &str, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(address.to_string(), message));
    }

    pub(crate) fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}

impl Default for Context<'_> {
    fn default() -> Self {
        Self::new()
    }
}
