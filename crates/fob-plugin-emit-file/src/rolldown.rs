//! Rolldown integration
//!
//! Rolldown has no staged asset-processing pipeline, so the whole pipeline is
//! replayed inside the `generate_bundle` hook:
//!
//! ```text
//! bundle outputs → AssetMap + build hash → BuildPipeline (stage order) → bundle outputs
//! ```
//!
//! Chunk and asset filenames in the bundle are already relative to the output
//! directory. Names are resolved against Rolldown's output directory (`dir`, or
//! the parent of `file`, under the bundler's `cwd`) unless
//! [`EmitFilePlugin::with_output_dir`] overrides it.

use rolldown_common::{Output, OutputAsset, StrOrBytes};
use rolldown_plugin::{HookGenerateBundleArgs, HookNoopReturn, HookUsage, Plugin, PluginContext};
use sha2::{Digest, Sha256};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::host::{AssetMap, RawSource};
use crate::pipeline::{BuildInput, BuildPipeline};
use crate::plugin::{EmitFilePlugin, PLUGIN_NAME};

impl EmitFilePlugin {
    /// Run the plugin against a Rolldown bundle written to `output_dir`,
    /// adding or replacing outputs
    pub async fn emit_into_bundle(
        &self,
        bundle: &mut Vec<Output>,
        output_dir: &Path,
    ) -> Result<()> {
        if self.is_disabled() {
            return Ok(());
        }

        let before = bundle_assets(bundle);
        let hash = bundle_hash(&before);

        let after = BuildPipeline::new()
            .with_output_path(output_dir)
            .with_plugin(self)
            .run(BuildInput::new().with_hash(hash).with_assets(before.clone()))
            .await?;

        for (filename, source) in after {
            if before.get(&filename) == Some(&source) {
                continue;
            }
            debug!(file = %filename, "writing emitted file into bundle");
            upsert_asset(bundle, filename, source);
        }

        Ok(())
    }
}

impl Plugin for EmitFilePlugin {
    fn name(&self) -> Cow<'static, str> {
        PLUGIN_NAME.into()
    }

    fn register_hook_usage(&self) -> HookUsage {
        if self.is_disabled() {
            HookUsage::empty()
        } else {
            HookUsage::GenerateBundle
        }
    }

    fn generate_bundle(
        &self,
        ctx: &PluginContext,
        args: &mut HookGenerateBundleArgs<'_>,
    ) -> impl std::future::Future<Output = HookNoopReturn> + Send {
        let plugin = self.clone();
        let options = ctx.options();
        let bundler_dir = options
            .dir
            .as_deref()
            .map(Path::new)
            .or_else(|| options.file.as_deref().and_then(|file| Path::new(file).parent()));
        let output_dir = output_dir_for(&options.cwd, self.output_dir(), bundler_dir);

        async move {
            plugin.emit_into_bundle(&mut args.bundle, &output_dir).await?;
            Ok(())
        }
    }
}

/// Absolute output directory: the plugin override if set, otherwise the
/// bundler's own, resolved against the bundler's `cwd`
fn output_dir_for(cwd: &Path, configured: Option<&Path>, bundler_dir: Option<&Path>) -> PathBuf {
    match configured.or(bundler_dir) {
        Some(dir) => cwd.join(dir),
        None => cwd.to_path_buf(),
    }
}

/// Snapshot of every output in the bundle, in bundle order
fn bundle_assets(bundle: &[Output]) -> AssetMap {
    bundle
        .iter()
        .map(|output| match output {
            Output::Chunk(chunk) => (
                chunk.filename.to_string(),
                RawSource::from(chunk.code.as_bytes().to_vec()),
            ),
            Output::Asset(asset) => {
                let source = match &asset.source {
                    StrOrBytes::Str(s) => RawSource::from(s.as_bytes().to_vec()),
                    StrOrBytes::Bytes(b) => RawSource::from(b.clone()),
                };
                (asset.filename.to_string(), source)
            }
        })
        .collect()
}

/// Hex SHA-256 over all output names and contents
fn bundle_hash(assets: &AssetMap) -> String {
    let mut hasher = Sha256::new();
    for (filename, source) in assets {
        hasher.update(filename.as_bytes());
        hasher.update([0u8]);
        hasher.update(source.as_bytes());
        hasher.update([0u8]);
    }
    format!("{:x}", hasher.finalize())
}

fn upsert_asset(bundle: &mut Vec<Output>, filename: String, source: RawSource) {
    let source: StrOrBytes = match source.into_text() {
        Ok(text) => text.into(),
        Err(bytes) => bytes.into(),
    };
    let output = Output::Asset(Arc::new(OutputAsset {
        names: vec![],
        original_file_names: vec![],
        filename: filename.clone().into(),
        source,
    }));

    let existing = bundle.iter().position(|output| match output {
        Output::Chunk(chunk) => chunk.filename.as_str() == filename,
        Output::Asset(asset) => asset.filename.as_str() == filename,
    });

    match existing {
        Some(index) => bundle[index] = output,
        None => bundle.push(output),
    }
}
