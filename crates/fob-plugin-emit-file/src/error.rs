//! Error types for the emit-file plugin

use miette::Diagnostic;
use thiserror::Error;

use crate::stage::Stage;

/// Result type alias for emit-file operations
pub type Result<T> = std::result::Result<T, EmitFileError>;

/// Errors that can occur while configuring or running the emit-file plugin
#[derive(Error, Debug, Diagnostic)]
pub enum EmitFileError {
    /// Stage name did not match any known asset-processing stage
    #[error("Unknown asset processing stage '{name}'")]
    #[diagnostic(
        code(fob::emit_file::unknown_stage),
        help("Use one of: additional, pre_process, derived, additions, optimize, optimize_count, optimize_compatibility, optimize_size, dev_tooling, optimize_inline, summarize, optimize_hash, optimize_transfer, analyse, report")
    )]
    UnknownStage { name: String },

    /// JSON content could not be serialized
    #[error("Failed to serialize JSON content for '{name}': {source}")]
    #[diagnostic(code(fob::emit_file::json))]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A "this compilation" callback failed (e.g. the name function errored)
    #[error("Plugin '{plugin}' failed while setting up the compilation")]
    #[diagnostic(code(fob::emit_file::compilation))]
    Compilation {
        plugin: String,
        #[source]
        source: anyhow::Error,
    },

    /// A process-assets handler failed (e.g. the content function errored)
    #[error("Plugin '{plugin}' failed at stage '{stage}'")]
    #[diagnostic(code(fob::emit_file::stage))]
    Stage {
        plugin: String,
        stage: Stage,
        #[source]
        source: anyhow::Error,
    },

    /// Current working directory was needed to resolve an absolute name
    #[error("Failed to determine the current directory: {source}")]
    #[diagnostic(code(fob::emit_file::current_dir))]
    CurrentDir {
        #[source]
        source: std::io::Error,
    },
}

impl EmitFileError {
    pub fn unknown_stage(name: impl Into<String>) -> Self {
        Self::UnknownStage { name: name.into() }
    }

    pub fn json(name: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            name: name.into(),
            source,
        }
    }

    pub fn compilation(plugin: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Compilation {
            plugin: plugin.into(),
            source,
        }
    }

    pub fn stage(plugin: impl Into<String>, stage: Stage, source: anyhow::Error) -> Self {
        Self::Stage {
            plugin: plugin.into(),
            stage,
            source,
        }
    }

    pub fn current_dir(source: std::io::Error) -> Self {
        Self::CurrentDir { source }
    }
}
