//! Config rewriter: preprocess → parse → per-resource transform → splice →
//! canonical re-serialization.
//!
//! Resource blocks are processed strictly in source order because splicing
//! shifts the positions later lookups depend on. A migrator error aborts
//! only its own resource; siblings already rewritten are retained and the
//! document result is marked failed.

pub mod edit;

use serde_json::Value;
use tracing::{debug, warn};

use crate::ast::Document;
use crate::error::{Diagnostic, MigrateError};
use crate::fmt::format_document;
use crate::migrator::{Context, MovedBlock};
use crate::parser::parse_document;
use crate::registry::Registry;

/// Result of one config-document pass.
#[derive(Debug)]
pub struct ConfigOutcome {
    /// Canonically re-serialized document text.
    pub text: String,
    /// The rewritten tree, kept for the state pass's config lookups.
    pub document: Document,
    /// Every address rename recorded via an emitted `moved` block.
    pub moved: Vec<MovedBlock>,
    /// Per-resource errors and warnings, in processing order.
    pub diagnostics: Vec<Diagnostic>,
}

impl ConfigOutcome {
    /// True when any resource's transform failed.
    pub fn is_failed(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub struct ConfigRewriter<'r> {
    registry: &'r Registry,
    from_version: u64,
    to_version: u64,
}

impl<'r> ConfigRewriter<'r> {
    pub fn new(registry: &'r Registry, from_version: u64, to_version: u64) -> Self {
        Self {
            registry,
            from_version,
            to_version,
        }
    }

    /// Rewrite a whole config document. `prior_state` is the parsed
    /// pre-migration state document, made available for config-side lookups.
    pub fn rewrite(
        &self,
        src: &str,
        prior_state: Option<&Value>,
    ) -> Result<ConfigOutcome, MigrateError> {
        // Lexical preprocessing: pure string rewrites, identity by default.
        let mut text = src.to_string();
        for migrator in self.registry.migrators(self.from_version, self.to_version) {
            text = migrator.preprocess(&text);
        }

        // One parse for the whole document; failure is fatal.
        let mut doc = parse_document(&text)?;

        let mut ctx = Context::new().with_prior_state(prior_state);
        let mut moved: Vec<MovedBlock> = Vec::new();

        let mut i = 0;
        while i < doc.blocks.len() {
            if !doc.blocks[i].is_resource() {
                i += 1;
                continue;
            }
            let kind = doc.blocks[i].labels[0].clone();
            let Some(migrator) =
                self.registry
                    .lookup(&kind, self.from_version, self.to_version)
            else {
                i += 1;
                continue;
            };
            let name = doc.blocks[i].labels[1].clone();
            let address = doc.blocks[i].address();
            ctx.enter_resource(&name, &address);
            debug!(resource = %address, "rewriting config block");

            match migrator.transform_config(&mut ctx, &mut doc.blocks[i]) {
                Ok(result) => {
                    for block in &result.blocks {
                        if let Some(mv) = MovedBlock::from_block(block) {
                            moved.push(mv);
                        }
                    }
                    if result.remove_original {
                        doc.blocks.remove(i);
                        let inserted = result.blocks.len();
                        for (offset, block) in result.blocks.into_iter().enumerate() {
                            doc.blocks.insert(i + offset, block);
                        }
                        // Replacement blocks are already migrated; skip them.
                        i += inserted;
                    } else {
                        let inserted = result.blocks.len();
                        for (offset, block) in result.blocks.into_iter().enumerate() {
                            doc.blocks.insert(i + 1 + offset, block);
                        }
                        i += 1 + inserted;
                    }
                }
                Err(err) => {
                    // Recoverable at document granularity: keep the block as
                    // already mutated, record the failure, continue.
                    warn!(resource = %address, error = %err, "config transform failed");
                    ctx.error(&address, err.to_string());
                    i += 1;
                }
            }
        }

        let text = format_document(&doc).map_err(|e| {
            MigrateError::resource("<serialize>", e.to_string())
        })?;
        Ok(ConfigOutcome {
            text,
            document: doc,
            moved,
            diagnostics: ctx.take_diagnostics(),
        })
    }
}
