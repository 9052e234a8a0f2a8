//! Validate command handler

use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::{OutputWriter, ValidationReport};
use actionmap_core::{Error as CoreError, Mapping, StrictMode};
use tracing::{info, instrument};

use super::utils::read_document;

/// Handle the validate command
///
/// A strict run fails when the mapping has problems. A lenient run reports
/// the same problems and succeeds.
#[instrument(skip(config, output), fields(mapping = %args.mapping.display()))]
pub fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("validate_command", &args.mapping.display().to_string());
    output.info(&format!("Validating mapping: {}", args.mapping.display()))?;

    let document = read_document(&args.mapping)?;

    // Compile leniently so every problem is collected as a diagnostic
    let mut engine = config.engine.clone();
    engine.strict_mode = StrictMode::Lenient;

    let problems = match Mapping::compile_with(&document, &engine) {
        Ok(mapping) => mapping.diagnostics().clone(),
        Err(CoreError::InvalidMapping(errors)) => errors,
        Err(other) => return Err(other.into()),
    };
    info!(problems = problems.len(), "Validation finished");

    output.report(&ValidationReport::new(&args.mapping, &problems))?;

    if problems.is_empty() || args.lenient {
        Ok(())
    } else {
        Err(Error::Invalid {
            path: args.mapping.clone(),
            count: problems.len(),
        })
    }
}

