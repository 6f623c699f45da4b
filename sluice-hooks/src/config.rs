//! JSON configuration for hook bindings.
//!
//! ## Example configuration
//!
//! ```json
//! {
//!   "disableAllHooks": false,
//!   "verificationPolicy": "remove",
//!   "hooks": {
//!     "onTraffic": [
//!       {
//!         "priority": 10,
//!         "command": "/etc/sluice/hooks/audit.sh",
//!         "timeout": 5
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! Hook map keys are the wire names of the hook types. The registry itself
//! resolves slot collisions by replace-and-warn, but the loader refuses
//! duplicate priorities up front so a collision can never be configured into
//! the gateway silently.

use std::collections::HashMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::error::HookError;
use crate::types::HookType;
use crate::types::Policy;
use crate::types::Priority;

/// Root configuration for the `hooks.json` file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HooksConfig {
    /// Global kill switch for all hooks.
    #[serde(default)]
    pub disable_all_hooks: bool,

    /// Verification policy applied by the gateway when it dispatches hook
    /// chains built from this file.
    #[serde(default)]
    pub verification_policy: Policy,

    /// Hook bindings by hook-type wire name.
    #[serde(default)]
    pub hooks: HashMap<String, Vec<HookBinding>>,
}

/// A single command binding within a hook type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookBinding {
    /// Position in the chain. Smaller runs first.
    pub priority: Priority,

    /// Shell command invoked with the payload on stdin.
    pub command: String,

    /// Deadline in seconds (default: 10).
    #[serde(default = "default_timeout_secs")]
    pub timeout: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl HooksConfig {
    /// Check if hooks are globally disabled.
    pub fn is_disabled(&self) -> bool {
        self.disable_all_hooks
    }

    /// Total number of bindings across all hook types.
    pub fn binding_count(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }

    /// Validate the document: every key must name a known hook type, every
    /// binding needs a command, and priorities must be unique per type.
    pub fn validate(&self) -> Result<(), HookError> {
        for (name, bindings) in &self.hooks {
            let _: HookType = name.parse()?;

            let mut priorities = HashSet::new();
            for binding in bindings {
                if binding.command.trim().is_empty() {
                    return Err(HookError::ConfigError(format!(
                        "hook `{name}` at priority {} has an empty command",
                        binding.priority
                    )));
                }
                if !priorities.insert(binding.priority) {
                    return Err(HookError::ConfigError(format!(
                        "hook `{name}` binds priority {} more than once",
                        binding.priority
                    )));
                }
            }
        }
        Ok(())
    }

    /// Iterate over the bindings with their parsed hook types.
    ///
    /// Skips entries whose key does not name a hook type; run
    /// [`HooksConfig::validate`] first to reject those.
    pub fn bindings(&self) -> impl Iterator<Item = (HookType, &HookBinding)> {
        self.hooks.iter().flat_map(|(name, bindings)| {
            name.parse::<HookType>()
                .into_iter()
                .flat_map(move |hook_type| bindings.iter().map(move |binding| (hook_type, binding)))
        })
    }
}
