//! In-process build pipeline
//!
//! A minimal [`CompilerHooks`] host: it creates one [`Compilation`] per run,
//! fires the "this compilation" callbacks in registration order, then runs the
//! tapped process-assets handlers in stage order.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{EmitFileError, Result};
use crate::host::{AssetMap, Compilation, CompilerHooks, CompilerPlugin, ThisCompilationCallback};

/// Input of a single pipeline run
#[derive(Debug, Clone, Default)]
pub struct BuildInput {
    /// Content hash handed to name functions
    pub hash: Option<String>,
    /// Assets present before processing starts
    pub assets: AssetMap,
}

impl BuildInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_assets(mut self, assets: AssetMap) -> Self {
        self.assets = assets;
        self
    }
}

/// Host that runs plugins over an in-memory asset map
pub struct BuildPipeline {
    output_path: Option<PathBuf>,
    this_compilation: Vec<(Cow<'static, str>, ThisCompilationCallback)>,
}

impl BuildPipeline {
    pub fn new() -> Self {
        Self {
            output_path: None,
            this_compilation: Vec::new(),
        }
    }

    /// Output directory reported to compilations
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn with_plugin(mut self, plugin: &dyn CompilerPlugin) -> Self {
        self.apply(plugin);
        self
    }

    pub fn apply(&mut self, plugin: &dyn CompilerPlugin) {
        debug!(plugin = %plugin.name(), "applying plugin");
        plugin.apply(self);
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    /// Number of registered "this compilation" callbacks
    pub fn tapped_count(&self) -> usize {
        self.this_compilation.len()
    }

    /// Run one compilation and return the final asset map
    pub async fn run(&self, input: BuildInput) -> Result<AssetMap> {
        let mut compilation = Compilation::new(input.hash, self.output_path.clone(), input.assets);

        for (name, callback) in &self.this_compilation {
            callback(&mut compilation)
                .map_err(|e| EmitFileError::compilation(name.to_string(), e))?;
        }

        debug!(
            handlers = compilation.pending_handlers(),
            "running process assets stages"
        );
        compilation.process_assets().await?;

        Ok(compilation.into_assets())
    }
}

impl Default for BuildPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CompilerHooks for BuildPipeline {
    fn tap_this_compilation(&mut self, name: Cow<'static, str>, callback: ThisCompilationCallback) {
        debug!(plugin = %name, "tapped this compilation");
        self.this_compilation.push((name, callback));
    }
}
