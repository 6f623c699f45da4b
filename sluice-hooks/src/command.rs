//! Shell-command transport for hook callbacks.
//!
//! The engine stores opaque invocables and assumes nothing about how a
//! callback reaches its plugin. This module provides the one transport that
//! ships in-tree: a hook backed by a shell command.
//!
//! ## Invocation flow
//!
//! 1. Spawn the command through `sh -c`
//! 2. Write the structured payload as JSON to stdin, then close it
//! 3. Race completion against the cancellation scope and the deadline
//! 4. Exit code 0 with JSON on stdout is the transformed payload; empty
//!    stdout is the null payload; anything else is a callback error
//!
//! Callback errors are not transport errors: the dispatcher folds them into
//! whatever verification policy the run was started with.
//!
//! Invocation metadata is exported to the command as `SLUICE_HOOK_*`
//! environment variables, and `InvokeOptions::timeout` overrides the hook's
//! configured deadline for a single call.

use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::HookError;
use crate::types::HookFn;
use crate::types::InvokeOptions;

/// A hook callback backed by a shell command speaking JSON over stdio.
#[derive(Debug, Clone)]
pub struct CommandHook {
    command: String,
    timeout: Duration,
}

impl CommandHook {
    /// Deadline applied when neither the configuration nor the invocation
    /// options override it.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured command line.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Convert this command into a registrable [`HookFn`].
    pub fn into_hook(self) -> HookFn {
        Arc::new(move |scope, payload, opts| {
            let hook = self.clone();
            Box::pin(async move { hook.invoke(scope, payload, opts).await })
        })
    }

    async fn invoke(
        &self,
        scope: CancellationToken,
        payload: Value,
        opts: InvokeOptions,
    ) -> anyhow::Result<Value> {
        let timeout = opts.timeout.unwrap_or(self.timeout);
        debug!(command = %self.command, timeout_secs = timeout.as_secs_f64(), "invoking command hook");

        let mut command = Command::new("sh");
        command
            .args(["-c", &self.command])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &opts.metadata {
            command.env(format!("SLUICE_HOOK_{}", key.to_uppercase()), value);
        }

        let mut child = command.spawn().map_err(HookError::SpawnFailed)?;

        let input = serde_json::to_string(&payload)?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(HookError::SpawnFailed)?;
            // Close stdin so the command sees EOF.
            drop(stdin);
        }

        let wait = child.wait_with_output();
        tokio::pin!(wait);

        let output = tokio::select! {
            _ = scope.cancelled() => {
                return Err(HookError::Cancelled.into());
            }
            result = tokio::time::timeout(timeout, &mut wait) => {
                match result {
                    Ok(Ok(output)) => output,
                    Ok(Err(err)) => return Err(HookError::SpawnFailed(err).into()),
                    Err(_) => return Err(HookError::Timeout.into()),
                }
            }
        };

        let exit_code = output.status.code().unwrap_or(1);
        if exit_code != 0 {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow::anyhow!(
                "hook command exited with code {exit_code}: {}",
                stderr.trim()
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stdout = stdout.trim();
        if stdout.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(stdout)
            .map_err(|err| HookError::ParseFailed(err.to_string()).into())
    }
}
