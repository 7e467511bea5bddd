use std::env;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::JSONSchema;
use segment_runtime::{export_schema, ExportDocument};

const SCHEMA_PATH: &str = "segment_runtime/schemas/export_document.schema.json";

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = env::args().skip(1);
    match args.next().as_deref() {
        Some("export-schema") => {
            let out = args.next().map(PathBuf::from).unwrap_or_else(|| PathBuf::from(SCHEMA_PATH));
            write_schema(&out)
        }
        Some("validate-exports") => {
            let pattern = args.next().ok_or("validate-exports needs a glob pattern")?;
            validate_exports(&pattern)
        }
        Some("help") | None => {
            print_usage();
            Ok(())
        }
        Some(cmd) => {
            eprintln!("Unknown xtask '{cmd}'.");
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: cargo xtask export-schema [OUT]");
    eprintln!("       cargo xtask validate-exports <GLOB>");
    eprintln!("       cargo xtask help");
}

fn schema_value() -> Result<serde_json::Value, Box<dyn Error>> {
    Ok(serde_json::to_value(export_schema())?)
}

fn write_schema(out: &Path) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = out.parent() {
        fs::create_dir_all(parent)?;
    }
    let text = serde_json::to_string_pretty(&schema_value()?)?;
    fs::write(out, text + "\n")?;
    println!("Wrote export schema to {}", out.display());
    Ok(())
}

/// Checks each matching file against the JSON schema, then against the
/// import rules (prime positions only, no duplicates, valid date).
fn validate_exports(pattern: &str) -> Result<(), Box<dyn Error>> {
    let schema = schema_value()?;
    let compiled = JSONSchema::compile(&schema).map_err(|err| format!("invalid schema: {err}"))?;

    let mut checked = 0usize;
    let mut failures = 0usize;
    for entry in glob::glob(pattern)? {
        let path = entry?;
        checked += 1;
        let contents = fs::read_to_string(&path)?;
        let instance: serde_json::Value = match serde_json::from_str(&contents) {
            Ok(value) => value,
            Err(err) => {
                eprintln!("{}: not JSON: {err}", path.display());
                failures += 1;
                continue;
            }
        };

        let schema_errors: Vec<String> = match compiled.validate(&instance) {
            Ok(()) => Vec::new(),
            Err(errors) => errors
                .map(|err| format!("{}: {err}", err.instance_path))
                .collect(),
        };
        if !schema_errors.is_empty() {
            failures += 1;
            for message in schema_errors {
                eprintln!("{}: {message}", path.display());
            }
            continue;
        }

        if let Err(err) = ExportDocument::parse_str(&contents) {
            failures += 1;
            for message in err.errors() {
                eprintln!("{}: {message}", path.display());
            }
            continue;
        }
        println!("{}: ok", path.display());
    }

    if checked == 0 {
        return Err(format!("no files match '{pattern}'").into());
    }
    if failures > 0 {
        return Err(format!("{failures} of {checked} export files failed validation").into());
    }
    println!("Validated {checked} export files");
    Ok(())
}
