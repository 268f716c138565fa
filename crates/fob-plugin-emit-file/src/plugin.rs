//! The emit-file plugin
//!
//! ## How It Works
//!
//! 1. `apply` taps the compiler's "this compilation" hook (unless disabled)
//! 2. When a compilation starts, the file name is resolved against the build
//!    hash and the output directory
//! 3. A process-assets handler is tapped at the configured [`Stage`]
//! 4. At that stage the content is resolved and emitted, replacing any asset
//!    already at that path

use std::borrow::Cow;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::content::Content;
use crate::host::{Compilation, CompilerHooks, CompilerPlugin, TapOptions};
use crate::path::resolve_output_path;
use crate::stage::Stage;

/// Name under which the plugin registers its hooks
pub const PLUGIN_NAME: &str = "fob-emit-file";

/// Function deriving a file name from the build hash
pub type NameFn = Arc<dyn Fn(Option<&str>) -> anyhow::Result<String> + Send + Sync>;

/// Destination name of the emitted file
#[derive(Clone)]
pub enum FileName {
    /// Fixed name, relative to the output directory or absolute
    Literal(String),
    /// Name computed from the build hash
    Derived(NameFn),
}

impl FileName {
    /// Name computed from the build hash
    ///
    /// # Example
    ///
    /// ```rust
    /// use fob_plugin_emit_file::FileName;
    ///
    /// let name = FileName::from_fn(|hash| format!("manifest.{}.json", hash.unwrap_or("dev")));
    /// assert_eq!(name.resolve(Some("abc")).unwrap(), "manifest.abc.json");
    /// ```
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(Option<&str>) -> String + Send + Sync + 'static,
    {
        Self::try_from_fn(move |hash| Ok(f(hash)))
    }

    /// Name computed from the build hash by a fallible function
    pub fn try_from_fn<F>(f: F) -> Self
    where
        F: Fn(Option<&str>) -> anyhow::Result<String> + Send + Sync + 'static,
    {
        Self::Derived(Arc::new(f))
    }

    pub fn resolve(&self, hash: Option<&str>) -> anyhow::Result<String> {
        match self {
            FileName::Literal(name) => Ok(name.clone()),
            FileName::Derived(f) => f(hash),
        }
    }
}

impl fmt::Debug for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileName::Literal(name) => f.debug_tuple("Literal").field(name).finish(),
            FileName::Derived(_) => f.write_str("Derived(<fn>)"),
        }
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileName::Literal(name) => f.write_str(name),
            FileName::Derived(_) => f.write_str("<derived name>"),
        }
    }
}

impl From<String> for FileName {
    fn from(name: String) -> Self {
        FileName::Literal(name)
    }
}

impl From<&str> for FileName {
    fn from(name: &str) -> Self {
        FileName::Literal(name.to_string())
    }
}

/// Configuration for [`EmitFilePlugin`]
#[derive(Debug, Clone)]
pub struct EmitFileOptions {
    /// Skip all hook registration
    pub disabled: bool,
    /// Destination file name
    pub name: FileName,
    /// What to write
    pub content: Content,
    /// Asset-processing stage the file is emitted at
    pub stage: Stage,
}

impl EmitFileOptions {
    /// Options emitting `content` as `name` at the default stage
    pub fn new(name: impl Into<FileName>, content: impl Into<Content>) -> Self {
        Self {
            disabled: false,
            name: name.into(),
            content: content.into(),
            stage: Stage::default(),
        }
    }

    pub fn with_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// Plugin that emits a single file into the build output
///
/// Works with any [`CompilerHooks`] host and, through the Rolldown adapter,
/// as a regular Rolldown plugin.
#[derive(Debug, Clone)]
pub struct EmitFilePlugin {
    options: Arc<EmitFileOptions>,
    /// Output directory used when the host does not report one (Rolldown)
    output_dir: Option<PathBuf>,
}

impl EmitFilePlugin {
    pub fn new(options: EmitFileOptions) -> Self {
        Self {
            options: Arc::new(options),
            output_dir: None,
        }
    }

    /// Override the output directory names are resolved against when running
    /// inside Rolldown (relative paths are taken from the bundler's `cwd`)
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn options(&self) -> &EmitFileOptions {
        &self.options
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    pub fn is_disabled(&self) -> bool {
        self.options.disabled
    }

    /// Resolve the destination and tap the emitting handler
    fn on_compilation(
        options: &Arc<EmitFileOptions>,
        compilation: &mut Compilation,
    ) -> anyhow::Result<()> {
        let base = compilation.output_path().unwrap_or(Path::new(""));
        let file_name = options.name.resolve(compilation.hash())?;
        let file_path = resolve_output_path(base, &file_name)?;

        debug!(file = %file_path, stage = %options.stage, "registering emitted file");

        let options = Arc::clone(options);
        compilation.tap_process_assets(
            TapOptions::new(PLUGIN_NAME, options.stage),
            move |compilation| {
                Box::pin(async move {
                    match options.content.resolve(compilation.assets()).await? {
                        Some(source) => {
                            info!(file = %file_path, bytes = source.len(), "emitted file");
                            compilation.emit_asset(file_path, source);
                        }
                        None => {
                            debug!(file = %file_path, "content resolved to nothing, skipping");
                        }
                    }
                    Ok(())
                })
            },
        );

        Ok(())
    }
}

impl CompilerPlugin for EmitFilePlugin {
    fn name(&self) -> Cow<'static, str> {
        PLUGIN_NAME.into()
    }

    fn apply(&self, compiler: &mut dyn CompilerHooks) {
        if self.options.disabled {
            debug!(name = %self.options.name, "emit file disabled, not registering");
            return;
        }

        let options = Arc::clone(&self.options);
        compiler.tap_this_compilation(
            PLUGIN_NAME.into(),
            Arc::new(move |compilation: &mut Compilation| {
                Self::on_compilation(&options, compilation)
            }),
        );
    }
}

/// Create an emit-file plugin
///
/// # Example
///
/// ```rust
/// use fob_plugin_emit_file::{emit_file, EmitFileOptions, Stage};
///
/// let plugin = emit_file(
///     EmitFileOptions::new("robots.txt", "User-agent: *\nDisallow:\n")
///         .with_stage(Stage::Summarize),
/// );
/// assert!(!plugin.is_disabled());
/// ```
pub fn emit_file(options: EmitFileOptions) -> EmitFilePlugin {
    EmitFilePlugin::new(options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults() {
        let options = EmitFileOptions::new("out.txt", "hello");
        assert!(!options.disabled);
        assert_eq!(options.stage, Stage::Additional);
        assert_eq!(options.name.resolve(None).unwrap(), "out.txt");
    }

    #[test]
    fn test_name_from_hash() {
        let name = FileName::from_fn(|hash| format!("{}.txt", hash.unwrap_or("none")));
        assert_eq!(name.resolve(Some("f00d")).unwrap(), "f00d.txt");
        assert_eq!(name.resolve(None).unwrap(), "none.txt");
        assert_eq!(name.to_string(), "<derived name>");
    }

    #[test]
    fn test_fallible_name() {
        let name = FileName::try_from_fn(|hash| {
            hash.map(|h| format!("{h}.txt"))
                .ok_or_else(|| anyhow::anyhow!("no hash"))
        });
        assert!(name.resolve(None).is_err());
    }

    #[test]
    fn test_plugin_name() {
        let plugin = emit_file(EmitFileOptions::new("a", "b"));
        assert_eq!(CompilerPlugin::name(&plugin), "fob-emit-file");
    }
}
