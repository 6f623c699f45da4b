//! Loading hook configuration and materializing registries from it.
//!
//! Configuration is resolved in priority order:
//! 1. Gateway: `{root}/.sluice/hooks.json`
//! 2. User: `~/.sluice/hooks.json`
//!
//! A missing file is an empty configuration, not an error.

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use crate::command::CommandHook;
use crate::config::HooksConfig;
use crate::error::HookError;
use crate::registry::HookRegistry;

/// Default hooks configuration filename.
pub const HOOKS_JSON_FILENAME: &str = "hooks.json";

/// Configuration directory relative to the gateway root or the user's home.
pub const HOOKS_CONFIG_DIR: &str = ".sluice";

/// Load the hooks configuration for a gateway rooted at `root`.
pub fn load_hooks_config(root: &Path) -> Result<HooksConfig, HookError> {
    let gateway_path = gateway_hooks_path(root);
    if gateway_path.exists() {
        debug!(path = %gateway_path.display(), "loading gateway hooks config");
        return load_from_file(&gateway_path);
    }

    if let Some(user_path) = user_hooks_path() {
        if user_path.exists() {
            debug!(path = %user_path.display(), "loading user hooks config");
            return load_from_file(&user_path);
        }
    }

    debug!("no hooks.json found, using empty configuration");
    Ok(HooksConfig::default())
}

/// Load and validate a hooks configuration from a specific file.
pub fn load_from_file(path: &Path) -> Result<HooksConfig, HookError> {
    let contents = std::fs::read_to_string(path).map_err(|err| {
        warn!(path = %path.display(), error = %err, "failed to read hooks config");
        HookError::ConfigError(format!("failed to read {}: {err}", path.display()))
    })?;

    let config: HooksConfig = serde_json::from_str(&contents).map_err(|err| {
        warn!(path = %path.display(), error = %err, "failed to parse hooks config");
        HookError::ConfigError(format!("failed to parse {}: {err}", path.display()))
    })?;

    config.validate()?;
    Ok(config)
}

/// Materialize a registry of command hooks from a validated configuration.
///
/// A disabled configuration yields an empty registry.
pub fn build_registry(config: &HooksConfig) -> Arc<HookRegistry> {
    let registry = Arc::new(HookRegistry::new());
    if config.is_disabled() {
        debug!("hooks are globally disabled");
        return registry;
    }

    for (hook_type, binding) in config.bindings() {
        let hook = CommandHook::new(&binding.command)
            .with_timeout(Duration::from_secs(binding.timeout))
            .into_hook();
        registry.add(hook_type, binding.priority, hook);
    }
    registry
}

/// The gateway-level hooks config path.
pub fn gateway_hooks_path(root: &Path) -> PathBuf {
    root.join(HOOKS_CONFIG_DIR).join(HOOKS_JSON_FILENAME)
}

/// The user-level hooks config path.
pub fn user_hooks_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(HOOKS_CONFIG_DIR).join(HOOKS_JSON_FILENAME))
}
