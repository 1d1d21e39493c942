use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use serde::Deserialize;
use tracing_subscriber::EnvFilter;

use fieldgen_common::config::{self, UnsupportedMemberPolicy};
use fieldgen_common::{Diagnostic, ObjectTypeExtensionInfo};
use fieldgen_compiler::Compiler;

/// Fieldgen resolver compiler.
///
/// Plans dispatch functions for object-type extension descriptors and
/// writes the resulting dispatch manifest.
#[derive(Parser)]
#[command(
    name = "fieldgenc",
    version,
    about,
    long_about = "Fieldgen resolver compiler.\n\nReads object-type extension descriptors (JSON) and writes a dispatch\nmanifest describing the generated resolvers and initializers.\n\nExamples:\n  fieldgenc schema.json                    Compile to schema.manifest.json\n  fieldgenc schema.json -o out.json        Compile to custom output path\n  fieldgenc schema.json --check            Check for errors only\n  fieldgenc schema.json --emit-manifest    Print manifest JSON to stdout"
)]
struct Cli {
    /// Input descriptor file: one extension object or an array of them.
    input: PathBuf,

    /// Output file path (default: <input>.manifest.json).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Check for errors without writing a manifest.
    #[arg(long)]
    check: bool,

    /// Suppress warning output.
    #[arg(short, long)]
    quiet: bool,

    /// Emit manifest JSON to stdout instead of writing to file.
    #[arg(long = "emit-manifest")]
    emit_manifest: bool,

    /// What to do with members that cannot become resolvers
    /// (overrides Fieldgen.toml).
    #[arg(long, value_name = "POLICY", value_parser = parse_policy)]
    unsupported: Option<UnsupportedMemberPolicy>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DescriptorInput {
    Many(Vec<ObjectTypeExtensionInfo>),
    One(ObjectTypeExtensionInfo),
}

impl DescriptorInput {
    fn into_vec(self) -> Vec<ObjectTypeExtensionInfo> {
        match self {
            DescriptorInput::Many(exts) => exts,
            DescriptorInput::One(ext) => vec![ext],
        }
    }
}

fn parse_policy(s: &str) -> Result<UnsupportedMemberPolicy, String> {
    UnsupportedMemberPolicy::parse(s)
        .ok_or_else(|| format!("unknown policy '{}' (expected skip, warn or error)", s))
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("FIELDGEN_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let source = match fs::read_to_string(&cli.input) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: could not read '{}': {}", cli.input.display(), e);
            process::exit(1);
        }
    };

    let file_name = cli
        .input
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();

    // Fieldgen.toml next to the input or in any parent directory.
    let abs_input = fs::canonicalize(&cli.input).unwrap_or_else(|_| cli.input.clone());
    let mut settings = match config::find_and_load_config(&abs_input) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    if let Some(policy) = cli.unsupported {
        settings.unsupported_members = policy;
    }
    tracing::debug!(?settings, "loaded configuration");

    let extensions = match serde_json::from_str::<DescriptorInput>(&source) {
        Ok(input) => input.into_vec(),
        Err(e) => {
            eprintln!("error: invalid descriptors in '{}': {}", file_name, e);
            process::exit(1);
        }
    };

    let (manifest, diagnostics) = Compiler::with_config(&settings).manifest(&extensions);

    if diagnostics.has_errors() {
        for diag in diagnostics.diagnostics() {
            print_diagnostic(diag, &file_name);
        }
        process::exit(1);
    }

    if !cli.quiet {
        for diag in diagnostics.diagnostics() {
            print_diagnostic(diag, &file_name);
        }
    }

    if cli.check {
        println!("No errors found.");
        return;
    }

    let rendered = if settings.pretty {
        serde_json::to_string_pretty(&manifest)
    } else {
        serde_json::to_string(&manifest)
    };
    let json = match rendered {
        Ok(j) => j,
        Err(e) => {
            eprintln!("error: failed to serialize manifest: {}", e);
            process::exit(1);
        }
    };

    if cli.emit_manifest {
        println!("{}", json);
        return;
    }

    let output_path = cli.output.unwrap_or_else(|| default_output(&cli.input));
    match fs::write(&output_path, &json) {
        Ok(()) => {
            println!(
                "Compiled {} -> {} ({} resolvers, {} bytes)",
                cli.input.display(),
                output_path.display(),
                manifest.resolver_count(),
                json.len()
            );
        }
        Err(e) => {
            eprintln!("error: could not write '{}': {}", output_path.display(), e);
            process::exit(1);
        }
    }
}

fn default_output(input: &Path) -> PathBuf {
    input.with_extension("manifest.json")
}

fn print_diagnostic(diag: &Diagnostic, file_name: &str) {
    eprintln!("{}: {}", file_name, diag);
    if let Some(ref suggestion) = diag.suggestion {
        eprintln!("  = help: {}", suggestion);
    }
}
