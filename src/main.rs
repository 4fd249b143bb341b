use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use argbind::config::Config;
use argbind::logging::init_tracing;
use argbind::manifest::load_specification;
use argbind::spec::{ArgValue, Entry, NamedArgs, Specification};

/// Bind call values against a command spec and print the argument vector.
#[derive(Debug, Parser)]
#[command(name = "argbind", version, about)]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bind values and print the resulting tokens
    Bind {
        /// Spec name (looked up in the spec dirs) or path to a manifest
        spec: String,

        /// Named options as a JSON object, e.g. '{"force": true}'
        #[arg(long, short = 'o')]
        options: Option<String>,

        /// Positional values as a JSON array (instead of plain strings)
        #[arg(long, conflicts_with = "positionals")]
        args_json: Option<String>,

        /// Print tokens, resolved values and execution options as JSON
        #[arg(long)]
        json: bool,

        /// Positional values, passed as strings (may start with '-')
        #[arg(allow_hyphen_values = true)]
        positionals: Vec<String>,
    },
    /// List the entries of a spec in output order
    Show {
        /// Spec name or path to a manifest
        spec: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading config")?;
    init_tracing(&config.logging.level);

    match cli.command {
        Command::Bind {
            spec,
            options,
            args_json,
            json,
            positionals,
        } => {
            let spec = load(&config, &spec)?;
            let named = parse_named(options.as_deref())?;
            let positionals = parse_positionals(args_json.as_deref(), positionals)?;
            let bound = spec.bind(&positionals, &named)?;

            if json {
                let execution = bound.execution_options()?;
                let out = json!({
                    "tokens": bound.tokens(),
                    "options": to_json_map(bound.options()),
                    "operands": to_json_map(bound.operands()),
                    "execution": execution,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                for token in bound.tokens() {
                    println!("{}", token);
                }
            }
        }
        Command::Show { spec } => {
            let spec = load(&config, &spec)?;
            for line in describe(&spec) {
                println!("{}", line);
            }
        }
    }
    Ok(())
}

fn load(config: &Config, name: &str) -> Result<Specification> {
    let path = config.resolve_spec(name)?;
    load_specification(&path).with_context(|| format!("loading spec '{}'", path.display()))
}

fn to_json_map<'a>(
    values: impl Iterator<Item = (&'a str, &'a ArgValue)>,
) -> serde_json::Map<String, serde_json::Value> {
    values.map(|(k, v)| (k.to_string(), json!(v))).collect()
}

fn parse_named(raw: Option<&str>) -> Result<NamedArgs> {
    match raw {
        Some(text) => serde_json::from_str(text).context("--options must be a JSON object"),
        None => Ok(NamedArgs::new()),
    }
}

fn parse_positionals(raw: Option<&str>, plain: Vec<String>) -> Result<Vec<ArgValue>> {
    match raw {
        Some(text) => serde_json::from_str(text).context("--args-json must be a JSON array"),
        None => Ok(plain.into_iter().map(ArgValue::from).collect()),
    }
}

/// One line per entry: kind, names and rendered flag.
fn describe(spec: &Specification) -> Vec<String> {
    spec.entries()
        .iter()
        .map(|entry| match entry {
            Entry::Literal(token) => format!("literal   {}", token),
            Entry::Option(def) => {
                let mut line = format!("option    {} ({})", def.names.join(", "), def.kind.label());
                if !matches!(def.kind, argbind::spec::OptionKind::Metadata) {
                    line.push_str(&format!(" -> {}", def.flag));
                }
                if def.required {
                    line.push_str(" [required]");
                }
                line
            }
            Entry::Operand(def) => {
                let mut line = format!("operand   {}", def.name);
                if def.repeatable {
                    line.push_str("...");
                }
                if def.required {
                    line.push_str(" [required]");
                }
                if let Some(default) = &def.default {
                    line.push_str(&format!(" (default {})", default));
                }
                line
            }
        })
        .collect()
}
