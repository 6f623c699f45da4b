//! Hook dispatch engine for the Sluice gateway runtime.
//!
//! Out-of-process plugins observe and transform the gateway's lifecycle and
//! data-plane events through hooks. A plugin registers a callback against a
//! hook type with a priority; when the gateway reaches that hook point, the
//! dispatcher threads the event payload through every registered callback in
//! ascending priority order and applies a verification policy to outputs
//! that diverge from the expected shape.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sluice_hooks::{HookDispatcher, HookRegistry, HookType, Policy, hook_fn};
//!
//! let registry = Arc::new(HookRegistry::new());
//! registry.add(
//!     HookType::OnIngressTraffic,
//!     0,
//!     hook_fn(|_scope, payload, _opts| async move {
//!         println!("ingress: {payload}");
//!         Ok(payload)
//!     }),
//! );
//!
//! let dispatcher = HookDispatcher::new(registry);
//! let result = dispatcher
//!     .run(Some(&scope), args, HookType::OnIngressTraffic, Policy::Ignore, opts)
//!     .await?;
//! ```

pub mod command;
pub mod config;
mod dispatcher;
mod error;
pub mod loader;
mod payload;
mod registry;
mod types;
mod verify;

pub use command::CommandHook;
pub use config::HookBinding;
pub use config::HooksConfig;
pub use dispatcher::HookDispatcher;
pub use error::HookError;
pub use payload::FieldValue;
pub use payload::Fields;
pub use registry::HookRegistry;
pub use types::HookFn;
pub use types::HookType;
pub use types::InvokeOptions;
pub use types::Policy;
pub use types::Priority;
pub use types::hook_fn;
pub use verify::shape_compatible;
