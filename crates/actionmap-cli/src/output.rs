//! Output formatting and writing utilities
//!
//! This module provides utilities for formatting and writing output
//! in various formats (JSON, YAML, human-readable) for transform results,
//! key listings and mapping validation reports.

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::logging::redaction;
use actionmap_core::{ValidationError, ValidationErrors};
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, trace};

/// Serializable view of a validation run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub file: String,
    pub valid: bool,
    pub problems: Vec<Problem>,
}

/// One authoring problem, located in the mapping
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Problem {
    pub location: String,
    pub message: String,
}

impl From<&ValidationError> for Problem {
    fn from(error: &ValidationError) -> Self {
        Self {
            location: error.location(),
            message: error.message.clone(),
        }
    }
}

impl ValidationReport {
    pub fn new(file: &Path, errors: &ValidationErrors) -> Self {
        Self {
            file: file.display().to_string(),
            valid: errors.is_empty(),
            problems: errors.iter().map(Problem::from).collect(),
        }
    }
}

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a transform result; `None` is an absent result
    fn format_result(&self, result: Option<&Value>) -> Result<String>;

    /// Format a list of payload keys
    fn format_keys(&self, keys: &[String]) -> Result<String>;

    /// Format a validation report
    fn format_report(&self, report: &ValidationReport) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_result(&self, result: Option<&Value>) -> Result<String> {
        match (self, result) {
            (OutputFormat::Human, None) => Ok("(no output)".to_string()),
            (_, None) => self.format(&Value::Null),
            (_, Some(value)) => self.format(value),
        }
    }

    fn format_keys(&self, keys: &[String]) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(keys.join("\n")),
            _ => self.format(&keys),
        }
    }

    fn format_report(&self, report: &ValidationReport) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_report_human(report)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    verbose: u8,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, verbose: u8) -> Self {
        Self::with_writer(format, use_color, quiet, verbose, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        verbose: u8,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            verbose,
            writer,
        }
    }

    /// Write raw output
    pub fn write(&mut self, content: &str) -> Result<()> {
        write!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        debug!("Output info: {}", message);

        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write debug information if verbose mode is enabled
    pub fn debug(&mut self, message: &str) -> Result<()> {
        if self.verbose == 0 || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "DEBUG:".dimmed(), message.dimmed()))
        } else {
            self.writeln(&format!("DEBUG: {}", message))
        }
    }

    /// Write a transform result
    pub fn result(&mut self, result: Option<&Value>) -> Result<()> {
        if let Some(value) = result {
            trace!(
                "Outputting result: {}",
                serde_json::to_string(&redaction::redacted(value))
                    .unwrap_or_else(|_| "[failed to serialize]".to_string())
            );
        }

        let formatted = self.format.format_result(result)?;
        self.emit(&formatted)
    }

    /// Write a list of payload keys
    pub fn keys(&mut self, keys: &[String]) -> Result<()> {
        let formatted = self.format.format_keys(keys)?;
        if formatted.is_empty() {
            return Ok(());
        }
        self.emit(&formatted)
    }

    /// Write a validation report
    pub fn report(&mut self, report: &ValidationReport) -> Result<()> {
        let formatted = self.format.format_report(report)?;
        let formatted = if self.use_color && self.format == OutputFormat::Human {
            colorize_report(&formatted, report.valid)
        } else {
            formatted
        };
        self.emit(&formatted)
    }

    /// Save a transform result to a file in the configured format
    pub fn save_result(&mut self, path: &Path, result: Option<&Value>) -> Result<()> {
        let format = match self.format {
            OutputFormat::Human => OutputFormat::JsonPretty,
            other => other,
        };
        let mut formatted = format.format_result(result)?;
        if !formatted.ends_with('\n') {
            formatted.push('\n');
        }
        std::fs::write(path, formatted)?;
        debug!(path = %path.display(), "Result saved");
        self.success(&format!("✓ Output saved to {}", path.display()))
    }

    fn emit(&mut self, formatted: &str) -> Result<()> {
        // YAML output already ends with a newline
        if formatted.ends_with('\n') {
            self.write(formatted)
        } else {
            self.writeln(formatted)
        }
    }
}

/// Format a validation report for human reading
fn format_report_human(report: &ValidationReport) -> String {
    if report.valid {
        return format!("✅ {} is a valid mapping", report.file);
    }

    let mut output = format!(
        "❌ {} - {} problem(s)\n",
        report.file,
        report.problems.len()
    );
    for (i, problem) in report.problems.iter().enumerate() {
        output.push_str(&format!("{}. {} {}\n", i + 1, problem.location, problem.message));
    }
    output
}

fn colorize_report(formatted: &str, valid: bool) -> String {
    if valid {
        formatted.green().to_string()
    } else {
        let mut lines = formatted.lines();
        let mut output = match lines.next() {
            Some(headline) => headline.red().bold().to_string(),
            None => String::new(),
        };
        for line in lines {
            output.push('\n');
            output.push_str(line);
        }
        output.push('\n');
        output
    }
}
