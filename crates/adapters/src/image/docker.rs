// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Docker CLI build engine.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use super::{BuildLog, ImageAssembler, ImageBuild, ImageError};
use crate::subprocess::{output_lines, run_with_timeout, IMAGE_BUILD_TIMEOUT, IMAGE_PUSH_TIMEOUT};

/// Name of the recipe file inside the build context.
const RECIPE_FILE: &str = "Dockerfile";

/// Diagnostic lines kept in a build or push error.
const DIAGNOSTIC_LINES: usize = 20;

/// [`ImageAssembler`] driving the `docker` CLI.
///
/// Each build gets a fresh temporary context directory holding only the
/// recipe; it is removed when the build returns.
#[derive(Debug, Clone)]
pub struct DockerAssembler {
    program: String,
    build_timeout: Duration,
    push_timeout: Duration,
}

impl Default for DockerAssembler {
    fn default() -> Self {
        Self::new("docker")
    }
}

impl DockerAssembler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            build_timeout: IMAGE_BUILD_TIMEOUT,
            push_timeout: IMAGE_PUSH_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, build: Duration, push: Duration) -> Self {
        self.build_timeout = build;
        self.push_timeout = push;
        self
    }

    fn build_command(&self, build: &ImageBuild, context: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("build").arg("--tag").arg(&build.tag);
        for (key, value) in &build.labels {
            cmd.arg("--label").arg(format!("{}={}", key, value));
        }
        cmd.arg(context);
        cmd
    }

    async fn run(
        &self,
        cmd: Command,
        timeout: Duration,
        label: &str,
    ) -> Result<(bool, BuildLog), ImageError> {
        let output = run_with_timeout(cmd, timeout, label).await.map_err(ImageError::Engine)?;
        Ok((output.status.success(), BuildLog::new(output_lines(&output))))
    }
}

#[async_trait]
impl ImageAssembler for DockerAssembler {
    async fn build(&self, build: &ImageBuild) -> Result<BuildLog, ImageError> {
        let context = tempfile::Builder::new().prefix("tb-build-").tempdir()?;
        tokio::fs::write(context.path().join(RECIPE_FILE), &build.recipe).await?;

        tracing::info!(tag = %build.tag, labels = build.labels.len(), "docker build");
        let cmd = self.build_command(build, context.path());
        let (ok, log) = self.run(cmd, self.build_timeout, "docker build").await?;
        if !ok {
            return Err(ImageError::BuildFailed {
                tag: build.tag.clone(),
                diagnostics: log.summary(DIAGNOSTIC_LINES),
            });
        }
        Ok(log)
    }

    async fn push(&self, tag: &str) -> Result<BuildLog, ImageError> {
        tracing::info!(%tag, "docker push");
        let mut cmd = Command::new(&self.program);
        cmd.arg("push").arg(tag);
        let (ok, log) = self.run(cmd, self.push_timeout, "docker push").await?;
        if !ok {
            return Err(ImageError::PushFailed {
                tag: tag.to_string(),
                diagnostics: log.summary(DIAGNOSTIC_LINES),
            });
        }
        Ok(log)
    }
}

#[cfg(test)]
#[path = "docker_tests.rs"]
mod tests;
