//! Declarative configuration
//!
//! Config files cannot carry functions, so this form only covers literal
//! names and literal (text or JSON) content.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::json::{emit_json_file, JsonFileOptions};
use crate::plugin::{emit_file, EmitFileOptions, EmitFilePlugin};
use crate::stage::Stage;

/// Serializable emit-file configuration
///
/// ```json
/// { "name": "version.json", "json": { "version": "1.2.0" }, "stage": "summarize" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmitFileConfig {
    /// Destination file name
    pub name: String,

    /// Text content, used when `json` is not set
    #[serde(default)]
    pub content: String,

    /// JSON content; takes precedence over `content`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json: Option<serde_json::Value>,

    /// Indentation width for `json`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space: Option<usize>,

    #[serde(default)]
    pub stage: Stage,

    #[serde(default)]
    pub disabled: bool,
}

impl EmitFileConfig {
    pub fn into_plugin(self) -> Result<EmitFilePlugin> {
        match self.json {
            Some(value) => emit_json_file(JsonFileOptions {
                disabled: self.disabled,
                name: self.name.into(),
                content: value,
                stage: self.stage,
                space: self.space,
            }),
            None => Ok(emit_file(
                EmitFileOptions::new(self.name, self.content)
                    .with_stage(self.stage)
                    .with_disabled(self.disabled),
            )),
        }
    }
}
