// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Train image assembly: recipe rendering, build and push.

mod docker;
mod recipe;

pub use docker::DockerAssembler;
pub use recipe::{render_recipe, RESULTS_DIR, TRAIN_DIR};

use std::collections::BTreeMap;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the container build engine
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("preparing build context: {0}")]
    Context(#[from] std::io::Error),
    #[error("build engine unavailable: {0}")]
    Engine(String),
    #[error("building {tag} failed: {diagnostics}")]
    BuildFailed { tag: String, diagnostics: String },
    #[error("pushing {tag} failed: {diagnostics}")]
    PushFailed { tag: String, diagnostics: String },
}

/// One image to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBuild {
    /// Rendered recipe, see [`render_recipe`]
    pub recipe: String,
    /// Fully qualified tag, `{registry}/{namespace}/{train}:base`
    pub tag: String,
    pub labels: BTreeMap<String, String>,
}

/// Log lines captured from the build engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildLog {
    pub lines: Vec<String>,
}

impl BuildLog {
    pub fn new(lines: Vec<String>) -> Self {
        Self { lines }
    }

    /// The last `n` lines, newline-joined.
    pub fn summary(&self, n: usize) -> String {
        let start = self.lines.len().saturating_sub(n);
        self.lines[start..].join("\n")
    }

    pub fn extend(&mut self, other: BuildLog) {
        self.lines.extend(other.lines);
    }
}

/// Adapter for the container build engine
#[async_trait]
pub trait ImageAssembler: Clone + Send + Sync + 'static {
    /// Render the build recipe for a train.
    fn render_recipe(
        &self,
        base_image: &str,
        command: &str,
        args: Option<&[String]>,
        entrypoint: &str,
    ) -> String {
        render_recipe(base_image, command, args, entrypoint)
    }

    /// Build the image described by `build`, returning the engine's log.
    async fn build(&self, build: &ImageBuild) -> Result<BuildLog, ImageError>;

    /// Push a previously built tag to its registry.
    async fn push(&self, tag: &str) -> Result<BuildLog, ImageError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BuildGate, FakeImageAssembler};

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
