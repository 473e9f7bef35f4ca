//! Holiday Sync CLI
//!
//! Entry point for the `holiday-sync` command-line tool.

use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};
use holiday_sync::config::{LoadOptions, OutputFormat, Settings};
use holiday_sync::selection::{pick_source_and_targets, resolve_by_name, PromptPicker};
use holiday_sync::{
    extract, logging, ConfigStore, DirectoryStore, ExitCode, FailurePolicy, HolidaySubgraph,
    PropagationDriver, PropagationError, RunSummary,
};
use serde_json::{json, Map, Value};

#[derive(Parser)]
#[command(name = "holiday-sync")]
#[command(about = "Propagate holiday routing between tenant configurations", version)]
struct Cli {
    /// Path to a config file (default: ./holiday-sync.toml if present)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// Directory holding one <id>.json file per configuration instance
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Log debug detail to stderr
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Copy holiday rules, schedules and call flows from a source to targets
    Propagate(PropagateArgs),

    /// List configuration instances in the store
    List,

    /// Show the holiday configuration of one instance
    Inspect {
        /// Exact instance name
        name: String,
    },
}

#[derive(Args)]
struct PropagateArgs {
    /// Exact name of the source instance
    #[arg(long, conflicts_with = "interactive", required_unless_present = "interactive")]
    source_name: Option<String>,

    /// Exact names of the target instances (comma-separated)
    #[arg(
        long,
        value_delimiter = ',',
        conflicts_with = "interactive",
        required_unless_present = "interactive"
    )]
    target_names: Vec<String>,

    /// Choose source and targets from a numbered list
    #[arg(long)]
    interactive: bool,

    /// Replace holiday rules and same-named call flows on targets (default: true)
    #[arg(long, value_name = "BOOL", num_args = 0..=1, default_missing_value = "true")]
    overwrite_target_holidays: Option<bool>,

    /// Compute and print the changes without writing anything
    #[arg(long, alias = "dry-run")]
    simulate: bool,

    /// What to do after a target fails: continue or abort
    #[arg(long, value_name = "POLICY")]
    on_failure: Option<FailurePolicy>,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let overrides = cli_overrides(&cli);
    let settings = match Settings::load(&LoadOptions::standard(cli.config.clone(), overrides)) {
        Ok((settings, sources)) => {
            for source in &sources {
                tracing::info!(layer = %source, "configuration layer applied");
            }
            settings
        }
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(ExitCode::Usage.as_i32());
        }
    };
    let store = DirectoryStore::new(settings.store.path.clone());

    let code = match cli.command {
        Commands::Propagate(args) => run_propagate(&settings, store, args),
        Commands::List => run_list(&settings, &store),
        Commands::Inspect { name } => run_inspect(&settings, &store, &name),
    };
    process::exit(code.as_i32());
}

fn cli_overrides(cli: &Cli) -> Value {
    let mut overrides = Map::new();
    if let Some(ref path) = cli.store {
        overrides.insert("store".to_string(), json!({ "path": path }));
    }
    if cli.json {
        overrides.insert("output".to_string(), json!("json"));
    }
    if let Commands::Propagate(ref args) = cli.command {
        if let Some(overwrite) = args.overwrite_target_holidays {
            overrides.insert("overwrite_target_holidays".to_string(), json!(overwrite));
        }
        if let Some(policy) = args.on_failure {
            overrides.insert("on_target_failure".to_string(), json!(policy));
        }
    }
    Value::Object(overrides)
}

fn fail(e: &PropagationError) -> ExitCode {
    eprintln!("Error: {}", e);
    e.exit_code()
}

fn run_propagate(settings: &Settings, store: DirectoryStore, args: PropagateArgs) -> ExitCode {
    let options = settings.propagation_options(args.simulate);
    let mut driver = PropagationDriver::new(store, options);

    let result = if args.interactive {
        pick_interactively(driver.store()).and_then(|(source, targets)| driver.run(&source, &targets))
    } else {
        match args.source_name {
            Some(ref source) => driver.run_by_names(source, &args.target_names),
            None => Err(PropagationError::Selection("--source-name is required".to_string())),
        }
    };

    match result {
        Ok(summary) => {
            print_summary(settings.output, &summary);
            summary.exit_code_enum()
        }
        Err(e) => fail(&e),
    }
}

fn pick_interactively(store: &DirectoryStore) -> Result<(String, Vec<String>), PropagationError> {
    let summaries = store.list_all()?;
    let stdin = io::stdin();
    let mut picker = PromptPicker::new(BufReader::new(stdin.lock()), io::stderr());
    pick_source_and_targets(&mut picker, &summaries)
}

fn print_summary(output: OutputFormat, summary: &RunSummary) {
    match output {
        OutputFormat::Json => match summary.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing output: {}", e),
        },
        OutputFormat::Human => {
            if summary.simulate {
                println!("Simulation only: nothing was written.");
            }
            println!("Source: {} ({})", summary.source_name, summary.source_id);
            println!("{}", summary.to_human());
        }
    }
}

fn run_list(settings: &Settings, store: &DirectoryStore) -> ExitCode {
    let summaries = match store.list_all() {
        Ok(s) => s,
        Err(e) => return fail(&PropagationError::from(e)),
    };

    match settings.output {
        OutputFormat::Json => match serde_json::to_string_pretty(&summaries) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                return ExitCode::Usage;
            }
        },
        OutputFormat::Human => {
            if summaries.is_empty() {
                println!("No configuration instances in {}.", store.root().display());
            } else {
                println!("Configuration instances ({} total):\n", summaries.len());
                for s in &summaries {
                    println!("  {} ({})", s.name, s.id);
                }
            }
        }
    }
    ExitCode::Success
}

fn run_inspect(settings: &Settings, store: &DirectoryStore, name: &str) -> ExitCode {
    let subgraph = store
        .list_all()
        .map_err(PropagationError::from)
        .and_then(|all| resolve_by_name(&all, name).map(|s| s.id.clone()))
        .and_then(|id| {
            store.fetch(&id).map_err(|source| PropagationError::Fetch { id, source })
        })
        .and_then(|instance| extract(&instance));

    let subgraph = match subgraph {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    match settings.output {
        OutputFormat::Json => match serde_json::to_string_pretty(&subgraph) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                return ExitCode::Usage;
            }
        },
        OutputFormat::Human => print_subgraph(name, &subgraph),
    }
    ExitCode::Success
}

fn print_subgraph(name: &str, subgraph: &HolidaySubgraph) {
    println!("Holiday configuration of {} ({}):\n", name, subgraph.source_id);
    println!("  Rules: {}", subgraph.rule_count());
    for rule in &subgraph.rules {
        println!("    schedule {} -> content block {}", rule.schedule_id, rule.content_block_id);
    }
    println!("  Schedules (shared by id): {}", subgraph.schedules.len());
    for schedule in &subgraph.schedules {
        println!("    {} ({})", schedule.name, schedule.id);
    }
    println!("  Content blocks (cloned): {}", subgraph.content_blocks.len());
    for block in &subgraph.content_blocks {
        println!("    {} ({})", block.name, block.id);
    }
}
