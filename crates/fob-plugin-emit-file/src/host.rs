//! Host capability interface
//!
//! The emit-file plugin never talks to a concrete bundler directly. It is
//! written against this small surface:
//!
//! - [`CompilerHooks`]: register a callback that runs when a compilation is created
//! - [`Compilation`]: read the build hash, output path and current assets, tap a
//!   handler at an asset-processing [`Stage`], and emit assets
//!
//! Any host that can provide these (the in-process [`BuildPipeline`], the
//! Rolldown adapter) can run the plugin.
//!
//! [`BuildPipeline`]: crate::pipeline::BuildPipeline

use futures::future::BoxFuture;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::{EmitFileError, Result};
use crate::stage::Stage;

/// Current assets of a compilation, keyed by output-relative path
pub type AssetMap = IndexMap<String, RawSource>;

/// Callback fired when a compilation is created
pub type ThisCompilationCallback =
    Arc<dyn Fn(&mut Compilation) -> anyhow::Result<()> + Send + Sync>;

/// One-shot handler run when the pipeline reaches its stage
pub type ProcessAssetsHandler = Box<
    dyn for<'a> FnOnce(&'a mut Compilation) -> BoxFuture<'a, anyhow::Result<()>> + Send,
>;

/// Raw, uninterpreted asset content
#[derive(Clone, PartialEq, Eq, Default)]
pub struct RawSource {
    bytes: Vec<u8>,
}

impl RawSource {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Content as text, if it is valid UTF-8
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Convert into a `String`, handing the bytes back if they are not UTF-8
    pub fn into_text(self) -> std::result::Result<String, Vec<u8>> {
        String::from_utf8(self.bytes).map_err(|e| e.into_bytes())
    }
}

impl fmt::Debug for RawSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_str() {
            Some(text) => f.debug_tuple("RawSource").field(&text).finish(),
            None => f
                .debug_tuple("RawSource")
                .field(&format_args!("{} bytes", self.bytes.len()))
                .finish(),
        }
    }
}

impl From<Vec<u8>> for RawSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<String> for RawSource {
    fn from(text: String) -> Self {
        Self {
            bytes: text.into_bytes(),
        }
    }
}

impl From<&str> for RawSource {
    fn from(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
        }
    }
}

/// Where a process-assets handler participates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TapOptions {
    /// Name of the plugin registering the handler
    pub name: Cow<'static, str>,
    /// Stage the handler runs at
    pub stage: Stage,
}

impl TapOptions {
    pub fn new(name: impl Into<Cow<'static, str>>, stage: Stage) -> Self {
        Self {
            name: name.into(),
            stage,
        }
    }
}

struct TappedHandler {
    options: TapOptions,
    handler: ProcessAssetsHandler,
}

/// A single build's state as seen by plugins
pub struct Compilation {
    hash: Option<String>,
    output_path: Option<PathBuf>,
    assets: AssetMap,
    handlers: Vec<TappedHandler>,
}

impl Compilation {
    pub fn new(hash: Option<String>, output_path: Option<PathBuf>, assets: AssetMap) -> Self {
        Self {
            hash,
            output_path,
            assets,
            handlers: Vec::new(),
        }
    }

    /// Content hash of this build, if the host provides one
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Configured output directory, if any
    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn assets(&self) -> &AssetMap {
        &self.assets
    }

    /// Register `source` under `filename`, replacing any existing asset
    ///
    /// Returns the replaced asset, if there was one.
    pub fn emit_asset(
        &mut self,
        filename: impl Into<String>,
        source: RawSource,
    ) -> Option<RawSource> {
        self.assets.insert(filename.into(), source)
    }

    /// Register a handler for the asset-processing stage in `options`
    ///
    /// Handlers must be tapped before [`Compilation::process_assets`] runs.
    pub fn tap_process_assets<F>(&mut self, options: TapOptions, handler: F)
    where
        F: for<'a> FnOnce(&'a mut Compilation) -> BoxFuture<'a, anyhow::Result<()>>
            + Send
            + 'static,
    {
        debug!(plugin = %options.name, stage = %options.stage, "tapped process assets");
        self.handlers.push(TappedHandler {
            options,
            handler: Box::new(handler),
        });
    }

    /// Number of handlers waiting to run
    pub fn pending_handlers(&self) -> usize {
        self.handlers.len()
    }

    /// Run all tapped handlers in stage order
    ///
    /// Handlers at the same stage run in registration order. Each handler is
    /// awaited before the next one starts; the first error aborts processing.
    pub async fn process_assets(&mut self) -> Result<()> {
        let mut handlers = std::mem::take(&mut self.handlers);
        handlers.sort_by_key(|tapped| tapped.options.stage.value());

        for TappedHandler { options, handler } in handlers {
            debug!(plugin = %options.name, stage = %options.stage, "processing assets");
            handler(&mut *self)
                .await
                .map_err(|e| EmitFileError::stage(options.name.to_string(), options.stage, e))?;
        }

        Ok(())
    }

    pub fn into_assets(self) -> AssetMap {
        self.assets
    }
}

impl fmt::Debug for Compilation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Compilation")
            .field("hash", &self.hash)
            .field("output_path", &self.output_path)
            .field("assets", &self.assets.keys().collect::<Vec<_>>())
            .field("pending_handlers", &self.handlers.len())
            .finish()
    }
}

/// Compiler-level hook registration
pub trait CompilerHooks {
    /// Register a callback fired whenever a compilation is created
    fn tap_this_compilation(&mut self, name: Cow<'static, str>, callback: ThisCompilationCallback);
}

/// A plugin that attaches itself to a compiler
pub trait CompilerPlugin: Send + Sync {
    fn name(&self) -> Cow<'static, str>;

    fn apply(&self, compiler: &mut dyn CompilerHooks);
}
