//! Keys command handler

use crate::cli::KeysArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use actionmap_core::{get_field_value_keys, FieldMap};
use std::collections::HashSet;
use tracing::{debug, instrument};

use super::utils::read_document;

/// Handle the keys command
#[instrument(skip(config, output), fields(mapping = %args.mapping.display()))]
pub fn handle_keys(args: KeysArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let document = read_document(&args.mapping)?;

    let keys = if args.field_map {
        FieldMap::from_value(&document, &config.engine)?.referenced_keys()
    } else {
        get_field_value_keys(&document)
    };
    debug!(count = keys.len(), "Keys collected");

    let keys = if args.unique { dedup(keys) } else { keys };
    output.keys(&keys)
}

/// Drop repeated keys, keeping the first occurrence of each
fn dedup(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|key| seen.insert(key.clone())).collect()
}
