// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution with timeouts.

use std::process::Output;
use std::time::Duration;

use tokio::process::Command;

/// Timeout for `docker build`. Builds pull base layers and can take minutes.
pub const IMAGE_BUILD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Timeout for `docker push`.
pub const IMAGE_PUSH_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Run a command to completion, killing it if it outlives `timeout`.
///
/// `label` names the command in error messages.
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    label: &str,
) -> Result<Output, String> {
    cmd.kill_on_drop(true);
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(e)) => Err(format!("{} could not be executed: {}", label, e)),
        Err(_) => Err(format!("{} timed out after {}s", label, timeout.as_secs())),
    }
}

/// Split captured stdout and stderr into log lines, stdout first.
pub fn output_lines(output: &Output) -> Vec<String> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .chain(String::from_utf8_lossy(&output.stderr).lines())
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
