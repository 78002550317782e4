//! Command implementations.

use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};

use sip_assemble::Assembler;
use sip_model::FrozenReport;
use sip_standards::{BuilderConfig, SchemaRegistry};
use sip_validate::SchemaCache;

use crate::cli::BuildArgs;

/// Run one build against the environment configuration.
pub fn run_build(args: &BuildArgs) -> Result<FrozenReport> {
    let config = BuilderConfig::from_env().context("load configuration")?;
    let cache = Arc::new(SchemaCache::new());
    let assembler = Assembler::new(&config, cache).context("initialize assembler")?;

    let output_root = args
        .output_root
        .clone()
        .unwrap_or_else(|| config.output_root.clone());
    let report = assembler.build(&args.ip_dir, &output_root);

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&report).context("serialize report")?;
        std::fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(report)
}

/// Print the configured schema registry.
pub fn run_schemas() -> Result<()> {
    let config = BuilderConfig::from_env().context("load configuration")?;
    let registry = SchemaRegistry::from_config(&config);

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(["document", "schema", "version", "location", "role", "mandatory"]);
    for kind in registry.configured_kinds() {
        for reference in registry.resolve(kind) {
            table.add_row([
                kind.as_str().to_string(),
                reference.name.clone(),
                reference.version.clone(),
                reference.location.clone(),
                if reference.fallback {
                    "fallback".to_string()
                } else {
                    "primary".to_string()
                },
                if registry.is_mandatory(kind) {
                    "yes".to_string()
                } else {
                    "no".to_string()
                },
            ]);
        }
    }
    println!("{table}");
    Ok(())
}
