//! State rewriter: dispatch per (resource, instance), splice results back,
//! pass everything else through with key order preserved.
//!
//! Dispatch is always single-instance; [`instances_mut`] exists so migrator
//! implementations can also accept the whole-resource shape some test
//! harnesses hand them. A resource whose migrator delegates state migration
//! to the provider (`provider_owns_state`) gets only the kind rename.

pub mod edit;
pub mod nullify;

use serde_json::Value;
use tracing::{debug, warn};

use crate::ast::Document;
use crate::error::{Diagnostic, MigrateError};
use crate::migrator::Context;
use crate::registry::Registry;

/// Result of one state-document pass.
#[derive(Debug)]
pub struct StateOutcome {
    /// Pretty-printed rewritten state document.
    pub text: String,
    /// The rewritten JSON tree.
    pub json: Value,
    /// Per-instance errors and warnings, in processing order.
    pub diagnostics: Vec<Diagnostic>,
}

impl StateOutcome {
    pub fn is_failed(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

pub struct StateRewriter<'r> {
    registry: &'r Registry,
    from_version: u64,
    to_version: u64,
}

impl<'r> StateRewriter<'r> {
    pub fn new(registry: &'r Registry, from_version: u64, to_version: u64) -> Self {
        Self {
            registry,
            from_version,
            to_version,
        }
    }

    /// Rewrite a whole state document. `rewritten_config` is the parallel
    /// config tree produced by the config pass, consulted for the
    /// empty-to-null decision.
    pub fn rewrite(
        &self,
        src: &str,
        rewritten_config: Option<&Document>,
    ) -> Result<StateOutcome, MigrateError> {
        let mut root: Value = serde_json::from_str(src)?;
        let mut ctx = Context::new().with_rewritten_config(rewritten_config);

        if let Some(Value::Array(resources)) = root.get_mut("resources") {
            for (res_index, resource) in resources.iter_mut().enumerate() {
                self.rewrite_resource(&mut ctx, resource, res_index);
            }
        }

        let text = serde_json::to_string_pretty(&root)?;
        Ok(StateOutcome {
            text,
            json: root,
            diagnostics: ctx.take_diagnostics(),
        })
    }

    fn rewrite_resource(&self, ctx: &mut Context<'_>, resource: &mut Value, res_index: usize) {
        let Some(kind) = resource.get("type").and_then(Value::as_str) else {
            return;
        };
        let kind = kind.to_string();
        let Some(migrator) = self
            .registry
            .lookup(&kind, self.from_version, self.to_version)
        else {
            return;
        };
        let name = resource
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        // Declared kind renames apply to the stored type regardless of who
        // owns the attribute migration.
        if let Some(renamed) = migrator.renamed_kind(&kind) {
            let renamed = renamed.to_string();
            if let Some(slot) = resource.get_mut("type") {
                *slot = Value::String(renamed);
            }
        }

        if migrator.provider_owns_state() {
            // Attribute rewriting is the provider's upgrade hook's job.
            debug!(resource = %format!("{}.{}", kind, name), "state delegated to provider");
            return;
        }

        let address = format!("{}.{}", kind, name);
        let Some(Value::Array(instances)) = resource.get_mut("instances") else {
            return;
        };
        for (inst_index, instance) in instances.iter_mut().enumerate() {
            let path = format!("resources[{}].instances[{}]", res_index, inst_index);
            ctx.enter_resource(&name, &address);

            // No attributes is not an error; the schema version is still
            // normalized and the instance passes through otherwise unchanged.
            if instance.get("attributes").is_none() {
                set_schema_version(instance, migrator.target_schema_version());
                continue;
            }

            debug!(resource = %address, path = %path, "rewriting state instance");
            match migrator.transform_state(ctx, instance.clone(), &path, &name) {
                Ok(mut rewritten) => {
                    set_schema_version(&mut rewritten, migrator.target_schema_version());
                    *instance = rewritten;
                }
                Err(err) => {
                    warn!(resource = %address, path = %path, error = %err, "state transform failed");
                    ctx.error(&address, err.to_string());
                }
            }
        }
    }
}

/// Normalize the `schema_version` tag on an instance object.
pub fn set_schema_version(instance: &mut Value, version: u64) {
    if let Value::Object(map) = instance {
        match map.get_mut("schema_version") {
            Some(slot) => *slot = Value::from(version),
            None => {
                map.insert("schema_version".to_string(), Value::from(version));
            }
        }
    }
}

/// Both dispatch shapes a migrator may be handed: the engine always passes
/// a single instance object, while test harnesses may pass a whole resource
/// with an `instances` array. Returns the instance objects either way.
pub fn instances_mut(value: &mut Value) -> Vec<&mut Value> {
    let is_resource_shape =
        matches!(value, Value::Object(map) if map.contains_key("instances"));
    if is_resource_shape {
        match value.get_mut("instances") {
            Some(Value::Array(items)) => items.iter_mut().collect(),
            _ => Vec::new(),
        }
    } else {
        vec![value]
    }
}

/// The `attributes` object of an instance, when present.
pub fn attributes_mut(instance: &mut Value) -> Option<&mut Value> {
    instance.get_mut("attributes")
}
