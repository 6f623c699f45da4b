//! Hook dispatcher - orchestrates chained hook execution.
//!
//! Callbacks registered for a hook type run sequentially in ascending
//! priority order. The first callback receives the encoded entry payload;
//! every later callback receives the previous callback's output. Each step's
//! output is checked for shape compatibility against the entry payload, and
//! the verification policy decides what happens on a mismatch:
//!
//! - `PassDown`: adopt the output anyway, so cooperating callbacks may extend
//!   the payload schema
//! - `Ignore`: drop the output and keep the prior chain value
//! - `Abort`: stop the chain and return the prior value as success
//! - `Remove`: drop the output and delete the registration after the chain
//!   completes
//!
//! Callback errors and panics are logged and folded into the policy path;
//! they are never returned to the host. A run only fails before the chain
//! starts: a missing cancellation scope or a payload that cannot be encoded.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use anyhow::anyhow;
use futures::FutureExt;
use serde_json::Map;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::error;

use crate::error::HookError;
use crate::payload;
use crate::payload::Fields;
use crate::registry::HookRegistry;
use crate::types::HookType;
use crate::types::InvokeOptions;
use crate::types::Policy;
use crate::types::Priority;
use crate::verify::shape_compatible;

/// Dispatches payloads through the hook chains of a shared registry.
pub struct HookDispatcher {
    registry: Arc<HookRegistry>,
}

impl HookDispatcher {
    pub fn new(registry: Arc<HookRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher runs against.
    pub fn registry(&self) -> &HookRegistry {
        &self.registry
    }

    /// Run the hook chain for `hook_type`, threading `args` through every
    /// registered callback.
    ///
    /// `scope` is the caller's cancellation scope; each callback is handed a
    /// child token that is cancelled when this call returns. A `None` scope
    /// fails with [`HookError::NilContext`] before any side effect.
    ///
    /// The returned map is never the raw output of a misbehaving callback:
    /// under every policy except `PassDown`, outputs that fail shape
    /// verification are discarded in favor of the prior chain value.
    pub async fn run(
        &self,
        scope: Option<&CancellationToken>,
        args: Fields,
        hook_type: HookType,
        policy: Policy,
        opts: InvokeOptions,
    ) -> Result<Fields, HookError> {
        let Some(parent) = scope else {
            return Err(HookError::NilContext);
        };
        let scope = parent.child_token();
        let _scope_guard = scope.clone().drop_guard();

        let params = payload::encode(&args)?;

        // The chain runs against this snapshot: registrations added while the
        // chain is in flight do not join it, and scheduled removals do not
        // disturb it.
        let chain = self.registry.snapshot(hook_type);
        if chain.is_empty() {
            return Ok(args);
        }

        let mut return_val = Value::Object(Map::new());
        let mut remove_list: Vec<Priority> = Vec::new();

        for (idx, (priority, hook)) in chain.iter().enumerate() {
            let input = if idx == 0 {
                params.clone()
            } else {
                return_val.clone()
            };

            let outcome = AssertUnwindSafe(hook(scope.clone(), input, opts.clone()))
                .catch_unwind()
                .await;
            let (result, err) = match outcome {
                Ok(Ok(value)) => (value, None),
                Ok(Err(err)) => (Value::Null, Some(err)),
                Err(panic) => (Value::Null, Some(anyhow!(panic_message(panic)))),
            };

            if shape_compatible(&params, &result) || policy == Policy::PassDown {
                return_val = result;
                continue;
            }

            // The callback's output is discarded from here on, whatever the
            // policy decides about the chain and the registration.
            let failure = err
                .map(|err| err.to_string())
                .unwrap_or_else(|| "payload shape mismatch".to_string());
            match policy {
                Policy::Ignore => {
                    error!(
                        hook_type = %hook_type,
                        priority,
                        error = %failure,
                        "hook returned an incompatible payload, ignoring"
                    );
                    if idx == 0 {
                        return_val = params.clone();
                    }
                }
                Policy::Abort => {
                    error!(
                        hook_type = %hook_type,
                        priority,
                        error = %failure,
                        "hook returned an incompatible payload, aborting"
                    );
                    // The callback's error is discarded: Abort terminates the
                    // chain but still reports success to the host.
                    if idx == 0 {
                        return Ok(args);
                    }
                    return Ok(payload::decode(&return_val));
                }
                Policy::Remove => {
                    error!(
                        hook_type = %hook_type,
                        priority,
                        error = %failure,
                        "hook returned an incompatible payload, removing"
                    );
                    remove_list.push(*priority);
                    if idx == 0 {
                        return_val = params.clone();
                    }
                }
                Policy::PassDown => {}
            }
        }

        // Registry mutation is deferred to keep the snapshot untouched while
        // the chain runs.
        for priority in remove_list {
            self.registry.remove(hook_type, priority);
        }

        Ok(payload::decode(&return_val))
    }
}

fn panic_message(panic: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        format!("hook panicked: {message}")
    } else if let Some(message) = panic.downcast_ref::<String>() {
        format!("hook panicked: {message}")
    } else {
        "hook panicked".to_string()
    }
}
