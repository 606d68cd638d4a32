//! Command-line interface for `json-delta-core`.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use json_delta_core::policy::Policy;
use json_delta_core::textdiff::TextDiffConfig;
use json_delta_core::Operation;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

const VERSION_BANNER: &str = concat!("json-delta version ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Parser)]
#[command(
    name = "json-delta",
    about = "Diff, patch, and transform JSON documents.",
    version = VERSION_BANNER,
    disable_help_subcommand = true,
    disable_version_flag = true
)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue)]
    version: bool,

    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Computes the operation that transforms `a` into `b`.
    Diff {
        /// Path to the before document.
        a: PathBuf,
        /// Path to the after document.
        b: PathBuf,
    },
    /// Applies an operation (as produced by `diff`) to a value.
    Patch {
        /// Path to the value to patch.
        value: PathBuf,
        /// Path to the operation JSON.
        operation: PathBuf,
    },
    /// Rebases a local operation against a concurrently-applied one.
    Transform {
        /// Path to the value both operations were diffed from.
        base: PathBuf,
        /// Path to the operation to rebase.
        local: PathBuf,
        /// Path to the operation that was already applied.
        remote: PathBuf,
    },
}

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = canonicalize_args(std::env::args_os());
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    if cli.version {
        println!("{VERSION_BANNER}");
        return Ok(());
    }

    let Some(command) = cli.command else {
        anyhow::bail!("no subcommand given; try `json-delta --help`");
    };

    let cfg = TextDiffConfig::default();
    match command {
        Command::Diff { a, b } => run_diff(&a, &b, &cfg),
        Command::Patch { value, operation } => run_patch(&value, &operation, &cfg),
        Command::Transform { base, local, remote } => run_transform(&base, &local, &remote, &cfg),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn read_json(path: &PathBuf) -> Result<Value> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {} as JSON", path.display()))
}

fn run_diff(a: &PathBuf, b: &PathBuf, cfg: &TextDiffConfig) -> Result<()> {
    let a = read_json(a)?;
    let b = read_json(b)?;
    let op = json_delta_core::diff(&a, &b, &Policy::new(), cfg);
    print_operation(op.as_ref())
}

fn run_patch(value: &PathBuf, operation: &PathBuf, cfg: &TextDiffConfig) -> Result<()> {
    let value = read_json(value)?;
    let op: Operation = serde_json::from_value(read_json(operation)?).context("parsing operation")?;
    let patched = json_delta_core::apply_diff(&value, &op, cfg)?;
    println!("{}", serde_json::to_string_pretty(&patched)?);
    Ok(())
}

fn run_transform(base: &PathBuf, local: &PathBuf, remote: &PathBuf, cfg: &TextDiffConfig) -> Result<()> {
    let base = read_json(base)?;
    let local: Operation = serde_json::from_value(read_json(local)?).context("parsing local operation")?;
    let remote: Operation = serde_json::from_value(read_json(remote)?).context("parsing remote operation")?;
    let rebased = json_delta_core::transform(Some(&base), &local, &remote, cfg);
    print_operation(rebased.as_ref())
}

fn print_operation(op: Option<&Operation>) -> Result<()> {
    match op {
        Some(op) => println!("{}", serde_json::to_string_pretty(op)?),
        None => println!("null"),
    }
    Ok(())
}

fn canonicalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut canonicalized = Vec::new();
    for (idx, arg) in args.into_iter().enumerate() {
        if idx == 0 {
            canonicalized.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("-help") => canonicalized.push(OsString::from("--help")),
            Some("-version") => canonicalized.push(OsString::from("--version")),
            _ => canonicalized.push(arg),
        }
    }
    canonicalized
}
