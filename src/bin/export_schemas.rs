//! Schema Export Binary
//!
//! Writes the JSON Schema of each entity's wire form, one file per kind.

use anyhow::Context;
use clap::Parser;
use rememerme_cards::application::schema::wire_schema;
use rememerme_cards::domain::entities::EntityKind;
use std::path::PathBuf;

/// Export wire JSON Schemas.
#[derive(Debug, Parser)]
#[command(name = "export_schemas", version, about)]
struct Args {
    /// Output directory.
    #[arg(long, short, default_value = "schemas")]
    out_dir: PathBuf,

    /// Entity kinds to export (default: all).
    #[arg(long = "kind", short, value_parser = parse_kind)]
    kinds: Vec<EntityKind>,

    /// Print to stdout instead of writing files.
    #[arg(long)]
    stdout: bool,
}

fn parse_kind(raw: &str) -> Result<EntityKind, String> {
    raw.parse().map_err(|e| format!("{e}"))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let kinds = if args.kinds.is_empty() {
        EntityKind::ALL.to_vec()
    } else {
        args.kinds
    };

    if !args.stdout {
        std::fs::create_dir_all(&args.out_dir)
            .with_context(|| format!("creating {}", args.out_dir.display()))?;
    }

    for kind in kinds {
        let schema = wire_schema(kind.descriptor());
        let json = serde_json::to_string_pretty(&schema)?;
        if args.stdout {
            println!("{json}");
            continue;
        }
        let path = args.out_dir.join(format!("{}.schema.json", kind.path_segment()));
        std::fs::write(&path, json + "\n")
            .with_context(|| format!("writing {}", path.display()))?;
        println!("wrote {}", path.display());
    }
    Ok(())
}
