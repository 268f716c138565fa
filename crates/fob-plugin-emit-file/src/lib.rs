//! Bundler plugin that emits an arbitrary file into the build output
//!
//! The plugin writes one file, raw content or JSON, into the output asset map
//! at a chosen asset-processing stage. Names can be derived from the build
//! hash; content can be derived (asynchronously) from the assets already
//! produced by the build.
//!
//! ## Architecture
//!
//! ```text
//! EmitFileOptions → emit_file() → EmitFilePlugin
//!                                   ├─ CompilerPlugin (BuildPipeline or any CompilerHooks host)
//!                                   └─ rolldown_plugin::Plugin (generate_bundle)
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fob_plugin_emit_file::{
//!     emit_file, emit_json_file, BuildInput, BuildPipeline, Content, EmitFileOptions,
//!     JsonFileOptions, Stage,
//! };
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let manifest = emit_file(
//!     EmitFileOptions::new(
//!         "manifest.txt",
//!         Content::from_fn(|assets| {
//!             let names: Vec<&str> = assets.keys().map(String::as_str).collect();
//!             Content::from(names.join("\n"))
//!         }),
//!     )
//!     .with_stage(Stage::Summarize),
//! );
//! let version = emit_json_file(JsonFileOptions::new("version.json", json!({ "version": "1.0.0" })))?;
//!
//! let assets = BuildPipeline::new()
//!     .with_output_path("dist")
//!     .with_plugin(&manifest)
//!     .with_plugin(&version)
//!     .run(BuildInput::new().with_hash("abc123"))
//!     .await?;
//! assert!(assets.contains_key("version.json"));
//! # Ok(())
//! # }
//! ```
//!
//! The same plugin can be handed to Rolldown as a `SharedPluginable`
//! (`Arc::new(plugin)`); it then runs in the `generate_bundle` hook.

pub mod config;
pub mod content;
pub mod error;
pub mod host;
pub mod json;
pub mod path;
pub mod pipeline;
pub mod plugin;
mod rolldown;
pub mod stage;

pub use config::EmitFileConfig;
pub use content::{Content, ContentFn};
pub use error::{EmitFileError, Result};
pub use host::{
    AssetMap, Compilation, CompilerHooks, CompilerPlugin, ProcessAssetsHandler, RawSource,
    TapOptions, ThisCompilationCallback,
};
pub use json::{emit_json_file, to_json_string, JsonFileOptions, DEFAULT_SPACE};
pub use path::resolve_output_path;
pub use pipeline::{BuildInput, BuildPipeline};
pub use plugin::{emit_file, EmitFileOptions, EmitFilePlugin, FileName, NameFn, PLUGIN_NAME};
pub use stage::Stage;
