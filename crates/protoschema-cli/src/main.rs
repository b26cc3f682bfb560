mod config;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::{ColoredString, Colorize};
use protoschema_core::{
    canonicalize, fingerprint, parse, CompatibilityChecker, DiffKind, File, NodeDiff, ToProto,
};
use tracing_subscriber::EnvFilter;

use config::GateConfig;

/// Compatible, valid, no differences
const EXIT_OK: i32 = 0;
/// Breaking change, invalid schema, or differences found
const EXIT_FAILED: i32 = 1;
/// Usage, I/O, configuration or parse error
const EXIT_ERROR: i32 = 2;

/// protoschema: proto3 schema compatibility gate
///
/// With two schema files, checks that AFTER can replace BEFORE without
/// breaking existing readers and writers.
#[derive(Parser)]
#[command(
    name = "protoschema",
    version,
    about,
    long_about = None,
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Previous schema version
    before: Option<PathBuf>,

    /// Candidate schema version
    after: Option<PathBuf>,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args)]
struct GlobalArgs {
    /// Configuration file (default: ./protoschema.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Suppress stdout; report through the exit code only
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Additionally allow a diff kind, e.g. `enum_added` (repeatable)
    #[arg(long = "allow", value_name = "KIND", global = true)]
    allow: Vec<DiffKind>,

    /// Treat every difference as breaking
    #[arg(long, global = true)]
    strict: bool,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that AFTER is a compatible successor of BEFORE
    Check {
        /// Previous schema version
        before: PathBuf,
        /// Candidate schema version
        after: PathBuf,
    },

    /// Validate a schema file (syntax)
    Validate {
        /// Path to .proto file
        file: PathBuf,
    },

    /// Format a schema to standard style, keeping comments and order
    Fmt {
        /// Path to .proto file
        file: PathBuf,
        /// Rewrite the file in place
        #[arg(long)]
        write: bool,
    },

    /// Print the canonical form of a schema
    Normalize {
        /// Path to .proto file
        file: PathBuf,
    },

    /// Compute the semantic fingerprint (SHA-256) of a schema
    Hash {
        /// Path to .proto file
        file: PathBuf,
    },

    /// Structural diff between two schemas
    Diff {
        /// First .proto file
        file_a: PathBuf,
        /// Second .proto file
        file_b: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let exit_code = match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            EXIT_ERROR
        }
    };
    process::exit(exit_code);
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    let global = cli.global;
    let config = GateConfig::load_from(global.config.as_deref()).context("failed to load configuration")?;
    if global.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    match cli.command {
        Some(Commands::Check { before, after }) => cmd_check(&global, &config, &before, &after),
        Some(Commands::Validate { file }) => cmd_validate(&global, &file),
        Some(Commands::Fmt { file, write }) => cmd_fmt(&global, &file, write),
        Some(Commands::Normalize { file }) => cmd_normalize(&global, &file),
        Some(Commands::Hash { file }) => cmd_hash(&global, &file),
        Some(Commands::Diff { file_a, file_b }) => cmd_diff(&global, &file_a, &file_b),
        Some(Commands::Version) => {
            println!(
                "protoschema {} (protoschema-core {})",
                env!("CARGO_PKG_VERSION"),
                protoschema_core::VERSION
            );
            Ok(EXIT_OK)
        }
        None => match (cli.before, cli.after) {
            (Some(before), Some(after)) => cmd_check(&global, &config, &before, &after),
            _ => anyhow::bail!("expected BEFORE and AFTER schema paths, or a subcommand (see --help)"),
        },
    }
}

// ── Helpers ───────────────────────────────────────────────

fn read_source(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn load_schema(path: &Path) -> Result<File> {
    let text = read_source(path)?;
    parse(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `+` additions, `-` removals, `~` changes
fn marker(kind: DiffKind) -> ColoredString {
    let name = kind.as_str();
    if name.ends_with("_added") {
        "+".green()
    } else if name.ends_with("_removed") {
        "-".red()
    } else {
        "~".yellow()
    }
}

fn print_diffs(diffs: &[NodeDiff]) {
    for diff in diffs {
        println!("  {} {}", marker(diff.kind), diff);
    }
}

// ── Commands ──────────────────────────────────────────────

fn cmd_check(global: &GlobalArgs, config: &GateConfig, before: &Path, after: &Path) -> Result<i32> {
    let before_file = load_schema(before)?;
    let after_file = load_schema(after)?;

    let checker = if global.strict {
        CompatibilityChecker::strict()
    } else {
        config.checker(&global.allow)
    };
    let report = checker.report(&before_file, &after_file);
    let code = if report.is_compatible() { EXIT_OK } else { EXIT_FAILED };

    if global.quiet {
        return Ok(code);
    }
    if global.json {
        print_json(&serde_json::json!({
            "before": before.display().to_string(),
            "after": after.display().to_string(),
            "compatible": report.is_compatible(),
            "allowed_kinds": checker.allowed().collect::<Vec<_>>(),
            "violations": report.violations,
            "allowed": report.allowed,
        }))?;
        return Ok(code);
    }

    if report.is_compatible() {
        println!(
            "{} {} is compatible with {} ({} allowed change(s))",
            "✓".green(),
            after.display(),
            before.display(),
            report.allowed.len()
        );
        print_diffs(&report.allowed);
    } else {
        println!(
            "{} {} breaks {}: {} violation(s)",
            "✗".red(),
            after.display(),
            before.display(),
            report.violations.len()
        );
        for violation in &report.violations {
            println!("  {} {}", "error".red().bold(), violation);
        }
        for allowed in &report.allowed {
            println!("  {} {}", "allowed".green(), allowed);
        }
    }
    Ok(code)
}

fn cmd_validate(global: &GlobalArgs, path: &Path) -> Result<i32> {
    let text = read_source(path)?;
    let outcome = parse(&text);

    if global.json {
        let value = match &outcome {
            Ok(file) => serde_json::json!({
                "file": path.display().to_string(),
                "valid": true,
                "imports": file.import_paths(),
                "declarations": file.nodes.iter().filter(|n| !n.is_comment()).count(),
            }),
            Err(err) => serde_json::json!({
                "file": path.display().to_string(),
                "valid": false,
                "error": err.to_string(),
                "line": err.span().map(|s| s.line),
                "column": err.span().map(|s| s.column),
            }),
        };
        if !global.quiet {
            print_json(&value)?;
        }
        return Ok(if outcome.is_ok() { EXIT_OK } else { EXIT_FAILED });
    }

    match outcome {
        Ok(_) => {
            if !global.quiet {
                println!("{} {}: valid", "✓".green(), path.display());
            }
            Ok(EXIT_OK)
        }
        Err(err) => {
            eprintln!("{} {}: {}", "✗ error:".red(), path.display(), err);
            Ok(EXIT_FAILED)
        }
    }
}

fn cmd_fmt(global: &GlobalArgs, path: &Path, write: bool) -> Result<i32> {
    let formatted = load_schema(path)?.serialize();
    if write {
        fs::write(path, &formatted).with_context(|| format!("failed to write {}", path.display()))?;
        if !global.quiet {
            println!("{} formatted {}", "✓".green(), path.display());
        }
    } else if !global.quiet {
        print!("{}", formatted);
    }
    Ok(EXIT_OK)
}

fn cmd_normalize(global: &GlobalArgs, path: &Path) -> Result<i32> {
    let text = read_source(path)?;
    let canonical = canonicalize(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    if !global.quiet {
        print!("{}", canonical);
    }
    Ok(EXIT_OK)
}

fn cmd_hash(global: &GlobalArgs, path: &Path) -> Result<i32> {
    let hash = fingerprint(&load_schema(path)?);
    if !global.quiet {
        println!("{}", hash);
    }
    Ok(EXIT_OK)
}

fn cmd_diff(global: &GlobalArgs, path_a: &Path, path_b: &Path) -> Result<i32> {
    let diffs = load_schema(path_a)?.diff(&load_schema(path_b)?);
    let code = if diffs.is_empty() { EXIT_OK } else { EXIT_FAILED };

    if global.quiet {
        return Ok(code);
    }
    if global.json {
        print_json(&serde_json::json!({
            "a": path_a.display().to_string(),
            "b": path_b.display().to_string(),
            "identical": diffs.is_empty(),
            "diffs": diffs,
        }))?;
        return Ok(code);
    }

    if diffs.is_empty() {
        println!("{} schemas are structurally identical", "✓".green());
    } else {
        println!("--- {}", path_a.display());
        println!("+++ {}", path_b.display());
        print_diffs(&diffs);
    }
    Ok(code)
}
