//! Evaluate command handler

use crate::cli::EvaluateArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use actionmap_core::fieldmap::{spread_nested_object, Object};
use actionmap_core::{map_event, Error as CoreError, FieldMap};
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::utils::{engine_config, read_document};

/// Handle the evaluate command
#[instrument(skip(config, output), fields(
    field_map = %args.field_map.display(),
    payload = %args.payload.display()
))]
pub fn handle_evaluate(args: EvaluateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("evaluate_command", &args.field_map.display().to_string());
    info!("Starting field map evaluation");

    let engine = engine_config(config, args.lenient, false);

    let field_map = {
        let _load_timer = Timer::new("field_map_loading");
        let document = read_document(&args.field_map)?;
        FieldMap::from_value(&document, &engine)?
    };
    debug!(fields = field_map.len(), "Field map loaded");
    output.debug(&format!("Field map has {} top-level field(s)", field_map.len()))?;

    let mut payload = read_document(&args.payload)?;

    if let Some(key) = &args.spread {
        let object: &Object = payload
            .as_object()
            .ok_or_else(|| CoreError::invalid_payload(&payload))?;
        debug!(key = %key, "Spreading nested object");
        payload = Value::Object(spread_nested_object(object, key));
    }

    let result = {
        let _evaluate_timer = Timer::new("field_map_evaluate");
        map_event(&field_map, &payload)?
    };
    let result = Value::Object(result);

    match &args.output_file {
        Some(path) => output.save_result(path, Some(&result)),
        None => output.result(Some(&result)),
    }
}
