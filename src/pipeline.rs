//! Orchestrator: one migration pass over a config/state document pair.
//!
//! Thin by design — sequencing only. Within a pair processing is strictly
//! ordered (splicing shifts positions later lookups depend on); across
//! independent pairs the registry is the only shared state, so a driver may
//! fan a batch out over a worker pool with no extra locking.

use serde_json::Value;

use crate::config::ConfigRewriter;
use crate::error::{Diagnostic, MigrateError};
use crate::migrator::MovedBlock;
use crate::registry::Registry;
use crate::state::StateRewriter;

pub struct Pipeline {
    registry: Registry,
    from_version: u64,
    to_version: u64,
}

/// Combined result of the config pass and the optional state pass.
#[derive(Debug)]
pub struct MigrationOutcome {
    /// Rewritten, canonically formatted config text.
    pub config: String,
    /// Rewritten state JSON text, when a state document was supplied.
    pub state: Option<String>,
    /// Address renames recorded during the config pass.
    pub moved: Vec<MovedBlock>,
    /// Diagnostics from both passes, config first.
    pub diagnostics: Vec<Diagnostic>,
}

impl MigrationOutcome {
    /// True when any resource's transform failed on either side.
    pub fn is_failed(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }
}

impl Pipeline {
    pub fn new(registry: Registry, from_version: u64, to_version: u64) -> Self {
        Self {
            registry,
            from_version,
            to_version,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Run one migration pass: preprocess → parse → per-resource transform →
    /// serialize, config side first, then the state side consulting the
    /// rewritten config.
    pub fn migrate(
        &self,
        config_src: &str,
        state_src: Option<&str>,
    ) -> Result<MigrationOutcome, MigrateError> {
        let prior_state: Option<Value> = state_src
            .map(serde_json::from_str)
            .transpose()?;

        let config = ConfigRewriter::new(&self.registry, self.from_version, self.to_version)
            .rewrite(config_src, prior_state.as_ref())?;

        let mut diagnostics = config.diagnostics;
        let state = match state_src {
            Some(src) => {
                let outcome =
                    StateRewriter::new(&self.registry, self.from_version, self.to_version)
                        .rewrite(src, Some(&config.document))?;
                diagnostics.extend(outcome.diagnostics);
                Some(outcome.text)
            }
            None => None,
        };

        Ok(MigrationOutcome {
            config: config.text,
            state,
            moved: config.moved,
            diagnostics,
        })
    }
}
