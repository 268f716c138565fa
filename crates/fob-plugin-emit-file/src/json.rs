//! JSON convenience wrapper around [`emit_file`]

use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter, Serializer};
use std::io;

use crate::error::{EmitFileError, Result};
use crate::plugin::{emit_file, EmitFileOptions, EmitFilePlugin, FileName};
use crate::stage::Stage;

/// Default indentation width for emitted JSON
pub const DEFAULT_SPACE: usize = 2;

/// Indentation is capped at ten spaces, matching `JSON.stringify`
const MAX_SPACE: usize = 10;

/// Configuration for [`emit_json_file`]
#[derive(Debug, Clone)]
pub struct JsonFileOptions<T> {
    pub disabled: bool,
    pub name: FileName,
    /// Value serialized into the file
    pub content: T,
    pub stage: Stage,
    /// Indentation width; `None` means [`DEFAULT_SPACE`], `Some(0)` is compact
    pub space: Option<usize>,
}

impl<T: Serialize> JsonFileOptions<T> {
    pub fn new(name: impl Into<FileName>, content: T) -> Self {
        Self {
            disabled: false,
            name: name.into(),
            content,
            stage: Stage::default(),
            space: None,
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

    pub fn with_space(mut self, space: usize) -> Self {
        self.space = Some(space);
        self
    }
}

/// Serialize `value` with `space` spaces of indentation
///
/// A width of zero produces compact output. Whole-number floats are written
/// without a fraction (`1.0` becomes `1`), as `JSON.stringify` does; floats
/// of magnitude `1e21` and above keep Rust's exponent notation (`1e21`, not
/// `1e+21`).
pub fn to_json_string<T>(value: &T, space: usize) -> serde_json::Result<String>
where
    T: Serialize + ?Sized,
{
    let space = space.min(MAX_SPACE);
    let mut out = Vec::new();

    if space == 0 {
        write_json(&mut out, value, JsNumbers(CompactFormatter))?;
    } else {
        let indent = " ".repeat(space);
        write_json(
            &mut out,
            value,
            JsNumbers(PrettyFormatter::with_indent(indent.as_bytes())),
        )?;
    }

    String::from_utf8(out)
        .map_err(|e| serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn write_json<T, F>(out: &mut Vec<u8>, value: &T, formatter: F) -> serde_json::Result<()>
where
    T: Serialize + ?Sized,
    F: Formatter,
{
    let mut serializer = Serializer::with_formatter(out, formatter);
    value.serialize(&mut serializer)
}

/// Formatter wrapper printing whole-number floats the way JavaScript does
struct JsNumbers<F>(F);

/// Largest magnitude `Number.prototype.toString` prints without an exponent
const JS_EXPONENT_THRESHOLD: f64 = 1e21;

impl<F: Formatter> Formatter for JsNumbers<F> {
    fn write_f64<W>(&mut self, writer: &mut W, value: f64) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if value.fract() == 0.0 && value.abs() < JS_EXPONENT_THRESHOLD {
            // -0.0 truncates to 0, matching JSON.stringify(-0)
            writer.write_all((value as i128).to_string().as_bytes())
        } else {
            self.0.write_f64(writer, value)
        }
    }

    fn write_f32<W>(&mut self, writer: &mut W, value: f32) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if value.fract() == 0.0 && f64::from(value).abs() < JS_EXPONENT_THRESHOLD {
            self.write_f64(writer, f64::from(value))
        } else {
            self.0.write_f32(writer, value)
        }
    }

    fn begin_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_array(writer)
    }

    fn end_array<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.end_array(writer)
    }

    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.end_array_value(writer)
    }

    fn begin_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_object(writer)
    }

    fn end_object<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.end_object(writer)
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_object_key(writer, first)
    }

    fn end_object_key<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.end_object_key(writer)
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.0.end_object_value(writer)
    }
}

/// Create an emit-file plugin whose content is `options.content` as JSON
///
/// The value is serialized once, up front; `disabled`, `name` and `stage`
/// are forwarded unchanged.
///
/// # Example
///
/// ```rust
/// use fob_plugin_emit_file::{emit_json_file, JsonFileOptions};
/// use serde_json::json;
///
/// let plugin = emit_json_file(JsonFileOptions::new("data.json", json!({ "a": 1 }))).unwrap();
/// assert!(!plugin.is_disabled());
/// ```
pub fn emit_json_file<T: Serialize>(options: JsonFileOptions<T>) -> Result<EmitFilePlugin> {
    let space = options.space.unwrap_or(DEFAULT_SPACE);
    let content = to_json_string(&options.content, space)
        .map_err(|e| EmitFileError::json(options.name.to_string(), e))?;

    Ok(emit_file(EmitFileOptions {
        disabled: options.disabled,
        name: options.name,
        content: content.into(),
        stage: options.stage,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    #[test]
    fn test_default_indentation_matches_json_stringify() {
        let text = to_json_string(&json!({ "a": 1 }), DEFAULT_SPACE).unwrap();
        assert_eq!(text, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_custom_indentation() {
        let text = to_json_string(&json!({ "list": [1, 2] }), 4).unwrap();
        assert_eq!(text, "{\n    \"list\": [\n        1,\n        2\n    ]\n}");
    }

    #[test]
    fn test_zero_space_is_compact() {
        let text = to_json_string(&json!({ "a": [1, 2] }), 0).unwrap();
        assert_eq!(text, "{\"a\":[1,2]}");
    }

    #[test]
    fn test_space_is_capped() {
        let text = to_json_string(&json!({ "a": 1 }), 40).unwrap();
        assert_eq!(text, format!("{{\n{}\"a\": 1\n}}", " ".repeat(10)));
    }

    #[test]
    fn test_whole_number_floats_print_like_integers() {
        let value = json!({ "a": 1.0, "b": -0.0, "c": 2.5, "d": [3.0f32, 0.5f32] });
        let text = to_json_string(&value, 0).unwrap();
        assert_eq!(text, r#"{"a":1,"b":0,"c":2.5,"d":[3,0.5]}"#);
    }

    #[test]
    fn test_whole_number_floats_in_pretty_output() {
        let text = to_json_string(&json!({ "version": 2.0 }), DEFAULT_SPACE).unwrap();
        assert_eq!(text, "{\n  \"version\": 2\n}");
    }

    #[test]
    fn test_non_ascii_text_is_preserved() {
        let text = to_json_string(&json!({ "title": "Grüße, 世界" }), 0).unwrap();
        assert_eq!(text, "{\"title\":\"Grüße, 世界\"}");
    }

    #[test]
    fn test_serialization_error_is_reported() {
        // Non-string map keys cannot be represented in JSON
        let mut map = BTreeMap::new();
        map.insert(vec![1u8], 1);
        let err = emit_json_file(JsonFileOptions::new("bad.json", map)).unwrap_err();
        assert!(matches!(err, EmitFileError::Json { ref name, .. } if name == "bad.json"));
    }

    #[test]
    fn test_forwards_options() {
        let plugin = emit_json_file(
            JsonFileOptions::new("data.json", json!(null))
                .with_stage(Stage::Report)
                .with_disabled(true),
        )
        .unwrap();
        assert!(plugin.is_disabled());
        assert_eq!(plugin.options().stage, Stage::Report);
        assert!(matches!(plugin.options().name, FileName::Literal(ref n) if n == "data.json"));
    }
}
