// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recording build engine for tests.

#![cfg_attr(coverage_nightly, coverage(off))]

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::{BuildLog, ImageAssembler, ImageBuild, ImageError};

/// Pauses builds until released, so tests can act while a build is in flight.
#[derive(Default)]
pub struct BuildGate {
    entered: Notify,
    release: Notify,
}

impl BuildGate {
    /// Wait until a build has reached the gate.
    pub async fn entered(&self) {
        self.entered.notified().await;
    }

    /// Let one held build continue.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[derive(Default)]
struct FakeImageState {
    builds: Vec<ImageBuild>,
    pushes: Vec<String>,
    build_error: Option<String>,
    push_error: Option<String>,
    gate: Option<Arc<BuildGate>>,
}

/// Fake image assembler. Clones share state.
#[derive(Clone, Default)]
pub struct FakeImageAssembler {
    inner: Arc<Mutex<FakeImageState>>,
}

impl FakeImageAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every build fail with `diagnostics`
    pub fn fail_build(&self, diagnostics: &str) {
        self.inner.lock().build_error = Some(diagnostics.to_string());
    }

    /// Make every push fail with `diagnostics`
    pub fn fail_push(&self, diagnostics: &str) {
        self.inner.lock().push_error = Some(diagnostics.to_string());
    }

    /// Hold subsequent builds at a gate until released.
    pub fn hold(&self) -> Arc<BuildGate> {
        let gate = Arc::new(BuildGate::default());
        self.inner.lock().gate = Some(Arc::clone(&gate));
        gate
    }

    pub fn builds(&self) -> Vec<ImageBuild> {
        self.inner.lock().builds.clone()
    }

    pub fn pushes(&self) -> Vec<String> {
        self.inner.lock().pushes.clone()
    }
}

#[async_trait]
impl ImageAssembler for FakeImageAssembler {
    async fn build(&self, build: &ImageBuild) -> Result<BuildLog, ImageError> {
        let gate = {
            let mut state = self.inner.lock();
            state.builds.push(build.clone());
            state.gate.clone()
        };
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        let state = self.inner.lock();
        if let Some(diagnostics) = &state.build_error {
            return Err(ImageError::BuildFailed {
                tag: build.tag.clone(),
                diagnostics: diagnostics.clone(),
            });
        }
        Ok(BuildLog::new(vec![
            "Step 1/3 : FROM base".to_string(),
            format!("Successfully tagged {}", build.tag),
        ]))
    }

    async fn push(&self, tag: &str) -> Result<BuildLog, ImageError> {
        let mut state = self.inner.lock();
        if let Some(diagnostics) = &state.push_error {
            return Err(ImageError::PushFailed {
                tag: tag.to_string(),
                diagnostics: diagnostics.clone(),
            });
        }
        state.pushes.push(tag.to_string());
        Ok(BuildLog::new(vec![format!("{}: digest: sha256:0000 size: 1234", tag)]))
    }
}
