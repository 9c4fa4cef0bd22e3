mod report;
mod schema;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::{fs, path::PathBuf};
use tracing_subscriber::{EnvFilter, fmt};

use crate::report::{DispatchOptions, ParseReport};
use crate::schema::{CommandSchema, DEFAULT_SCHEMA_NAME};

#[derive(Parser)]
#[command(name = "argweave")]
#[command(version, about = "Parse argv tokens against a declared command schema", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter argweave.json schema
    Init(InitArgs),

    /// Parse tokens against a schema and print the bound values
    Parse(ParseArgs),

    /// Validate a schema and print it in normalized form
    Schema(SchemaArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,

    /// Root command name (default: directory name)
    #[arg(short, long)]
    name: Option<String>,
}

#[derive(Parser)]
struct ParseArgs {
    /// Path to argweave.json schema
    #[arg(short, long, default_value = DEFAULT_SCHEMA_NAME, value_name = "FILE")]
    schema: PathBuf,

    /// Reject unknown keywords and excess positionals
    #[arg(long)]
    strict: bool,

    /// Fail when a required argument is not bound
    #[arg(long)]
    check_required: bool,

    /// Only output JSON (no human-readable output)
    #[arg(long)]
    json: bool,

    /// Tokens to parse (put them after `--`)
    #[arg(value_name = "TOKENS", trailing_var_arg = true, allow_hyphen_values = true)]
    tokens: Vec<String>,
}

#[derive(Parser)]
struct SchemaArgs {
    /// Path to argweave.json schema
    #[arg(short, long, default_value = DEFAULT_SCHEMA_NAME, value_name = "FILE")]
    schema: PathBuf,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Parse(args) => parse_command(args),
        Commands::Schema(args) => schema_command(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let schema_path = schema::write_default_schema(&dir, args.name.as_deref())?;

    eprintln!("Created: {}", schema_path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {DEFAULT_SCHEMA_NAME} to declare your arguments");
    eprintln!("  2. Run: argweave parse -- rot input.txt -rot 5");

    Ok(())
}

fn parse_command(args: ParseArgs) -> Result<()> {
    tracing::debug!("executing parse command");

    let schema = CommandSchema::from_file(&args.schema)?;
    let opts = DispatchOptions {
        strict: args.strict,
    };
    let report = report::dispatch(&schema.command, args.tokens, opts)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report)?;
    }

    if args.check_required {
        let missing: Vec<String> = report
            .missing()
            .map(|(command, arg)| format!("{command}: {arg}"))
            .collect();
        if !missing.is_empty() {
            bail!("missing required arguments ({})", missing.join(", "));
        }
    }

    Ok(())
}

fn print_report(report: &ParseReport) -> Result<()> {
    eprintln!();
    eprintln!("=== Parse Results ===");
    for command in &report.commands {
        eprintln!("Command: {}", command.command);
        for (name, value) in &command.values {
            let marker = if command.defaulted.contains(name) {
                " (default)"
            } else {
                ""
            };
            eprintln!("  {name} = {}{marker}", serde_json::to_string(value)?);
        }
        for name in &command.missing {
            eprintln!("  {name}: MISSING");
        }
    }

    if report.leftover.is_empty() {
        eprintln!("OK: All tokens were consumed");
    } else {
        eprintln!(
            "Note: {} token(s) not consumed: {}",
            report.leftover.len(),
            report.leftover.join(" ")
        );
    }
    Ok(())
}

fn schema_command(args: SchemaArgs) -> Result<()> {
    tracing::debug!("executing schema command");

    let schema = CommandSchema::from_file(&args.schema)?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
