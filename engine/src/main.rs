//! Tableport CLI - import and export tabular CSV data
//!
//! # Main Commands
//!
//! ```bash
//! tableport serve                       # Start HTTP server (port 3001)
//! tableport parse orders.csv            # Parse CSV to JSON records
//! tableport export records.json         # Write records back to CSV
//! tableport profile list                # Manage saved mapping profiles
//! ```
//!
//! # Debug Commands (for development)
//!
//! ```bash
//! tableport headers orders.csv          # Show detected headers + metadata
//! tableport normalize "1.234,56"        # Run one value through the normalizer
//! ```

use clap::{Parser, Subcommand};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tableport::{
    export_file, import_file, normalize_columns, normalize_numeric, parse_file_auto,
    FieldMapping, ProfileRegistry,
};

#[derive(Parser)]
#[command(name = "tableport")]
#[command(about = "Tolerant CSV import/export with locale-aware normalization", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a CSV file and output JSON records
    Parse {
        /// Input CSV file
        input: PathBuf,

        /// Columns to numeric-normalize, comma-separated
        #[arg(short, long)]
        normalize: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show detected headers and file metadata
    Headers {
        /// Input CSV file
        input: PathBuf,
    },

    /// Normalize one raw value
    Normalize {
        /// Raw value, e.g. "1.234,56" or "₫ 50,000"
        value: String,
    },

    /// Export JSON records to a CSV file
    Export {
        /// Input JSON file (array of records)
        input: PathBuf,

        /// Field mapping JSON file (key/label pairs, order = column order)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Output filename (default: input stem; .csv appended if missing)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: TABLEPORT_PORT or 3001)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage saved mapping profiles
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
}

#[derive(Subcommand)]
enum ProfileAction {
    /// List all stored profiles
    List,

    /// Show details of a profile
    Show {
        /// Profile ID
        id: String,
    },

    /// Import a mapping JSON file as a profile
    Import {
        /// Mapping JSON file to import
        file: PathBuf,
        /// Name for the profile
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Delete a profile
    Delete {
        /// Profile ID
        id: String,
    },

    /// Find profiles compatible with a CSV file's headers
    Match {
        /// Input CSV file
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Parse { input, normalize, output } => {
            cmd_parse(&input, normalize.as_deref(), output.as_deref()).await
        }

        Commands::Headers { input } => cmd_headers(&input),

        Commands::Normalize { value } => cmd_normalize(&value),

        Commands::Export { input, mapping, output } => {
            cmd_export(&input, mapping.as_deref(), output.as_deref()).await
        }

        Commands::Serve { port } => cmd_serve(port).await,

        Commands::Profile { action } => cmd_profile(action),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_parse(
    input: &Path,
    normalize: Option<&str>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📄 Parsing CSV: {}", input.display());

    let mut outcome = import_file(input).await?;

    eprintln!("   Encoding: {}", outcome.info.encoding);
    eprintln!("   Delimiter: '{}'", outcome.info.delimiter.display());
    eprintln!("   Columns: {}", outcome.headers.join(", "));
    if !outcome.warnings.is_empty() {
        eprintln!("   ⚠️  {} warnings", outcome.warnings.len());
    }

    if let Some(columns) = normalize {
        let columns: Vec<String> = columns
            .split(',')
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        normalize_columns(&mut outcome.records, &columns);
        eprintln!("   Normalized columns: {}", columns.join(", "));
    }

    eprintln!("✅ Parsed {} records", outcome.records.len());

    let json = serde_json::to_string_pretty(&outcome.records)?;
    write_output(&json, output)?;

    Ok(())
}

fn cmd_headers(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let result = parse_file_auto(input)?;

    eprintln!("📄 {}", input.display());
    eprintln!("   Encoding: {}", result.encoding);
    eprintln!("   Delimiter: '{}'", result.delimiter.display());
    eprintln!("   Rows: {}", result.table.records.len());

    for (i, header) in result.table.headers.iter().enumerate() {
        println!("[{:2}] {}", i + 1, header);
    }

    Ok(())
}

fn cmd_normalize(value: &str) -> Result<(), Box<dyn std::error::Error>> {
    let normalized = normalize_numeric(value);
    println!("{}", serde_json::to_string(&normalized)?);
    Ok(())
}

async fn cmd_export(
    input: &Path,
    mapping_path: Option<&Path>,
    output: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("📦 Exporting: {}", input.display());

    let content = fs::read_to_string(input)?;
    let records: Vec<Value> = serde_json::from_str(&content)?;
    eprintln!("   {} records", records.len());

    let mapping = match mapping_path {
        Some(path) => Some(FieldMapping::from_json(&fs::read_to_string(path)?)?),
        None => None,
    };

    let filename = match output {
        Some(name) => name.to_string(),
        None => input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("export")
            .to_string(),
    };

    match export_file(&records, mapping.as_ref(), &filename).await? {
        Some(path) => eprintln!("💾 Written to: {}", path.display()),
        None => eprintln!("⚠️  Nothing to export"),
    }

    Ok(())
}

async fn cmd_serve(port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let port = port
        .or_else(|| {
            std::env::var("TABLEPORT_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
        })
        .unwrap_or(3001);

    tableport::server::start_server(port).await
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}

fn cmd_profile(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut registry = ProfileRegistry::new();

    match action {
        ProfileAction::List => {
            let profiles = registry.list();
            if profiles.is_empty() {
                eprintln!("📋 No profiles stored yet.");
                eprintln!("   Use 'tableport profile import <file>' to add one.");
                return Ok(());
            }

            eprintln!("📋 Stored profiles ({}):\n", profiles.len());
            for p in profiles {
                println!("  📄 {} ({})", p.name, p.id);
                println!("     Columns: {}", p.columns.join(", "));
                println!("     Uses: {}", p.use_count);
                if let Some(ref last) = p.last_used {
                    println!("     Last used: {}", last);
                }
                println!();
            }
        }

        ProfileAction::Show { id } => match registry.get(&id) {
            Some(p) => {
                println!("📄 Profile: {} ({})\n", p.name, p.id);
                println!("Columns: {}", p.columns.join(", "));
                println!("Created: {}", p.created_at);
                println!("Uses: {}", p.use_count);
                println!("\nMapping:");
                println!("{}", p.mapping.to_json()?);
            }
            None => {
                return Err(format!("Profile not found: {}", id).into());
            }
        },

        ProfileAction::Import { file, name } => {
            eprintln!("📥 Importing profile from: {}", file.display());
            let id = registry.import(&file, name.as_deref())?;
            eprintln!("✅ Profile saved with ID: {}", id);
        }

        ProfileAction::Delete { id } => {
            registry.delete(&id)?;
            eprintln!("🗑️  Profile deleted: {}", id);
        }

        ProfileAction::Match { input } => {
            let result = parse_file_auto(&input)?;
            eprintln!("📄 Headers: {}", result.table.headers.join(", "));

            let compatible = registry.find_compatible(&result.table.headers);
            if compatible.is_empty() {
                eprintln!("📋 No compatible profiles found.");
            } else {
                eprintln!("📋 Compatible profiles:\n");
                for (p, score) in compatible {
                    println!("  📄 {} ({}) - {:.0}% match", p.name, p.id, score * 100.0);
                }
            }
        }
    }

    Ok(())
}
