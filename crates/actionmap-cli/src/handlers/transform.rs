//! Transform command handler

use crate::cli::TransformArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use actionmap_core::Mapping;
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::utils::{engine_config, read_document};

/// Handle the transform command
#[instrument(skip(config, output), fields(
    mapping = %args.mapping.display(),
    payload = %args.payload.display()
))]
pub fn handle_transform(args: TransformArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("transform_command", &args.mapping.display().to_string());
    info!("Starting transform");

    let engine = engine_config(config, args.lenient, args.no_escape);

    let mapping = {
        let _compile_timer = Timer::new("mapping_compile");
        let document = read_document(&args.mapping)?;
        Mapping::compile_with(&document, &engine)?
    };

    for problem in mapping.diagnostics().iter() {
        warn!(location = %problem.location(), "{}", problem.message);
        output.warning(&format!("{} {} (kept as literal)", problem.location(), problem.message))?;
    }

    output.debug(&format!("Mapping reads {} key(s)", mapping.keys().len()))?;

    let payload = read_document(&args.payload)?;

    let result = {
        let _transform_timer = Timer::new("mapping_transform");
        if args.require_object {
            Some(Value::Object(mapping.transform_object(&payload)?))
        } else {
            mapping.transform(&payload)?
        }
    };
    debug!(absent = result.is_none(), "Transform finished");

    match &args.output_file {
        Some(path) => output.save_result(path, result.as_ref()),
        None => output.result(result.as_ref()),
    }
}
