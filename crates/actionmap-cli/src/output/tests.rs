// Tests for output formatting
//
// These tests verify transform results, key listings and validation
// reports across the supported output formats.

use super::*;
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

fn writer(format: OutputFormat, quiet: bool, verbose: u8) -> (OutputWriter, SharedBuffer) {
    let buffer = SharedBuffer::default();
    let output = OutputWriter::with_writer(format, false, quiet, verbose, Box::new(buffer.clone()));
    (output, buffer)
}

fn sample_errors() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.push(ValidationError::new(
        "has an invalid directive: @merge",
        &["user".to_string()],
    ));
    errors.push(ValidationError::new(
        "must be a string",
        &["items".to_string(), "@path".to_string()],
    ));
    errors
}

#[test]
fn test_result_json_is_compact() {
    let (mut output, buffer) = writer(OutputFormat::Json, false, 0);
    output.result(Some(&json!({"a": 1, "b": [true]}))).unwrap();
    assert_eq!(buffer.contents(), "{\"a\":1,\"b\":[true]}\n");
}

#[test]
fn test_result_preserves_key_order() {
    let (mut output, buffer) = writer(OutputFormat::Json, false, 0);
    output.result(Some(&json!({"z": 1, "a": 2}))).unwrap();
    assert_eq!(buffer.contents(), "{\"z\":1,\"a\":2}\n");
}

#[test]
fn test_absent_result() {
    let (mut output, buffer) = writer(OutputFormat::Human, false, 0);
    output.result(None).unwrap();
    assert_eq!(buffer.contents(), "(no output)\n");

    let (mut output, buffer) = writer(OutputFormat::Json, false, 0);
    output.result(None).unwrap();
    assert_eq!(buffer.contents(), "null\n");
}

#[test]
fn test_result_yaml() {
    let (mut output, buffer) = writer(OutputFormat::Yaml, false, 0);
    output.result(Some(&json!({"name": "Ada"}))).unwrap();
    assert_eq!(buffer.contents(), "name: Ada\n");
}

#[test]
fn test_keys_human_one_per_line() {
    let (mut output, buffer) = writer(OutputFormat::Human, false, 0);
    output
        .keys(&["$.userId".to_string(), "$.properties.email".to_string()])
        .unwrap();
    assert_eq!(buffer.contents(), "$.userId\n$.properties.email\n");
}

#[test]
fn test_no_keys_writes_nothing_for_humans() {
    let (mut output, buffer) = writer(OutputFormat::Human, false, 0);
    output.keys(&[]).unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut output, buffer) = writer(OutputFormat::Json, false, 0);
    output.keys(&[]).unwrap();
    assert_eq!(buffer.contents(), "[]\n");
}

#[test]
fn test_report_human() {
    let report = ValidationReport::new(Path::new("mapping.json"), &sample_errors());
    let formatted = OutputFormat::Human.format_report(&report).unwrap();

    assert!(formatted.starts_with("❌ mapping.json - 2 problem(s)"));
    assert!(formatted.contains("1. /user has an invalid directive: @merge"));
    assert!(formatted.contains("2. /items/@path must be a string"));
}

#[test]
fn test_report_valid() {
    let report = ValidationReport::new(Path::new("mapping.json"), &ValidationErrors::new());
    assert!(report.valid);
    assert_eq!(
        OutputFormat::Human.format_report(&report).unwrap(),
        "✅ mapping.json is a valid mapping"
    );
}

#[test]
fn test_report_json() {
    let report = ValidationReport::new(Path::new("m.yaml"), &sample_errors());
    let formatted = OutputFormat::Json.format_report(&report).unwrap();
    let parsed: Value = serde_json::from_str(&formatted).unwrap();

    assert_eq!(parsed["valid"], json!(false));
    assert_eq!(parsed["problems"][1]["location"], json!("/items/@path"));
    assert_eq!(parsed["problems"][1]["message"], json!("must be a string"));
}

#[test]
fn test_quiet_suppresses_messages() {
    let (mut output, buffer) = writer(OutputFormat::Human, true, 0);
    output.info("loading").unwrap();
    output.success("done").unwrap();
    assert_eq!(buffer.contents(), "");

    output.warning("careful").unwrap();
    assert_eq!(buffer.contents(), "WARNING: careful\n");
}

#[test]
fn test_messages_hidden_for_machine_formats() {
    let (mut output, buffer) = writer(OutputFormat::Json, false, 2);
    output.info("loading").unwrap();
    output.warning("careful").unwrap();
    output.debug("details").unwrap();
    assert_eq!(buffer.contents(), "");
}

#[test]
fn test_debug_requires_verbosity() {
    let (mut output, buffer) = writer(OutputFormat::Human, false, 0);
    output.debug("hidden").unwrap();
    assert_eq!(buffer.contents(), "");

    let (mut output, buffer) = writer(OutputFormat::Human, false, 1);
    output.debug("shown").unwrap();
    assert_eq!(buffer.contents(), "DEBUG: shown\n");
}

#[test]
fn test_save_result_uses_pretty_json_for_humans() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.json");
    let (mut output, buffer) = writer(OutputFormat::Human, false, 0);

    output.save_result(&path, Some(&json!({"a": 1}))).unwrap();

    let saved = std::fs::read_to_string(&path).unwrap();
    assert_eq!(saved, "{\n  \"a\": 1\n}\n");
    assert!(buffer.contents().contains("Output saved to"));
}
