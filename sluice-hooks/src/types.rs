//! Core vocabulary of the hook dispatch engine.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::error::HookError;

/// Lifecycle and data-plane events at which hooks are dispatched.
///
/// The engine treats the type as an opaque registry key; the gateway decides
/// when each event fires. A type with no registrations yields the identity
/// transformation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum HookType {
    // Startup hooks, fired while the gateway assembles itself.
    OnConfigLoaded,
    OnNewLogger,
    OnNewPool,
    OnNewProxy,
    OnNewServer,
    OnSignal,
    // Server hooks.
    OnRun,
    OnBooting,
    OnBooted,
    OnOpening,
    OnOpened,
    OnClosing,
    OnClosed,
    OnTraffic,
    OnIngressTraffic,
    OnEgressTraffic,
    OnShutdown,
    OnTick,
    // Pool hooks.
    OnNewClient,
}

impl HookType {
    /// Every hook type, in firing order over a gateway's lifetime.
    pub const ALL: [HookType; 19] = [
        HookType::OnConfigLoaded,
        HookType::OnNewLogger,
        HookType::OnNewPool,
        HookType::OnNewProxy,
        HookType::OnNewServer,
        HookType::OnSignal,
        HookType::OnRun,
        HookType::OnBooting,
        HookType::OnBooted,
        HookType::OnOpening,
        HookType::OnOpened,
        HookType::OnClosing,
        HookType::OnClosed,
        HookType::OnTraffic,
        HookType::OnIngressTraffic,
        HookType::OnEgressTraffic,
        HookType::OnShutdown,
        HookType::OnTick,
        HookType::OnNewClient,
    ];

    /// The name this hook type carries in configuration files and on the
    /// plugin wire.
    pub fn wire_name(&self) -> &'static str {
        match self {
            HookType::OnConfigLoaded => "onConfigLoaded",
            HookType::OnNewLogger => "onNewLogger",
            HookType::OnNewPool => "onNewPool",
            HookType::OnNewProxy => "onNewProxy",
            HookType::OnNewServer => "onNewServer",
            HookType::OnSignal => "onSignal",
            HookType::OnRun => "onRun",
            HookType::OnBooting => "onBooting",
            HookType::OnBooted => "onBooted",
            HookType::OnOpening => "onOpening",
            HookType::OnOpened => "onOpened",
            HookType::OnClosing => "onClosing",
            HookType::OnClosed => "onClosed",
            HookType::OnTraffic => "onTraffic",
            HookType::OnIngressTraffic => "onIngressTraffic",
            HookType::OnEgressTraffic => "onEgressTraffic",
            HookType::OnShutdown => "onShutdown",
            HookType::OnTick => "onTick",
            HookType::OnNewClient => "onNewClient",
        }
    }
}

impl fmt::Display for HookType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for HookType {
    type Err = HookError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        HookType::ALL
            .iter()
            .find(|hook_type| hook_type.wire_name() == value)
            .copied()
            .ok_or_else(|| HookError::ConfigError(format!("unknown hook type `{value}`")))
    }
}

/// Ordering of callbacks within one hook type. Smaller runs first.
pub type Priority = i32;

/// Per-invocation strategy for callbacks whose output fails verification.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Policy {
    /// Adopt the output regardless, letting cooperating callbacks extend the
    /// payload schema.
    #[default]
    PassDown,
    /// Drop the output, log, and continue with the prior chain value.
    Ignore,
    /// Stop the chain and return the prior chain value as success.
    Abort,
    /// Drop the output and delete the registration once the chain completes.
    Remove,
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::PassDown => write!(f, "passDown"),
            Policy::Ignore => write!(f, "ignore"),
            Policy::Abort => write!(f, "abort"),
            Policy::Remove => write!(f, "remove"),
        }
    }
}

/// Transport hints handed through to every callback invocation.
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Deadline override for a single invocation. Transports fall back to
    /// their own default when unset.
    pub timeout: Option<Duration>,
    /// Per-call metadata exposed to the callback transport.
    pub metadata: HashMap<String, String>,
}

impl InvokeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The opaque invocable stored per (hook type, priority) slot.
///
/// A callback receives the run's cancellation scope, the structured payload,
/// and the invocation options. `Ok(Value::Null)` is the null payload;
/// `Err(_)` is treated by the dispatcher as a null payload paired with an
/// error. The engine owns neither the callback's lifetime nor its transport.
pub type HookFn = Arc<
    dyn Fn(CancellationToken, Value, InvokeOptions) -> BoxFuture<'static, anyhow::Result<Value>>
        + Send
        + Sync,
>;

/// Wrap an async closure into a [`HookFn`].
pub fn hook_fn<F, Fut>(func: F) -> HookFn
where
    F: Fn(CancellationToken, Value, InvokeOptions) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = anyhow::Result<Value>> + Send + 'static,
{
    Arc::new(move |scope, payload, opts| Box::pin(func(scope, payload, opts)))
}
