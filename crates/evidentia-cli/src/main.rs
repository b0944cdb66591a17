//! Evidentia CLI - Command-line interface for the evidence registry.

use clap::Parser;
use evidentia_cli::commands::{self, Context};
use evidentia_cli::{Cli, Command, Config, Formatter};
use evidentia_store::RegistryStore;
use tracing_subscriber::EnvFilter;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();
}

fn run() -> evidentia_cli::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    // Determine output format
    let format = cli
        .format
        .map(Into::into)
        .unwrap_or(config.output.format);

    // Determine color setting
    let color_enabled = !cli.no_color && config.output.color;
    let formatter = Formatter::new(format, color_enabled);

    let store_path = cli.store.clone().unwrap_or_else(|| config.store.path.clone());
    let backend = match cli.backend {
        Some(backend) => Some(backend.into()),
        None => config.backend()?,
    };
    let mut store = RegistryStore::open(&store_path, backend)?;

    let ctx = Context {
        config: &config,
        formatter: &formatter,
        today: chrono::Local::now().date_naive(),
    };

    match cli.command {
        Command::Init => {
            let config_path = match cli.config.clone() {
                Some(path) => Some(path),
                None => Config::default_path().ok(),
            };
            commands::execute_init(&mut store, config_path.as_deref(), &ctx)
        }
        Command::Import(args) => commands::execute_import(args, &mut store, &ctx),
        Command::ImportRefs(args) => commands::execute_import_refs(args, &mut store, &ctx),
        Command::Query(args) => commands::execute_query(args, &store, &ctx),
        Command::Summary => commands::execute_summary(&store, &ctx),
        Command::ExportSummary(args) => commands::execute_export_summary(args, &store, &ctx),
        Command::ExportRefs(args) => commands::execute_export_refs(args, &store, &ctx),
        Command::Stale => commands::execute_stale(&store, &ctx),
        Command::Gaps(args) => commands::execute_gaps(args, &store, &ctx),
        Command::Supersede(args) => commands::execute_supersede(args, &mut store, &ctx),
        Command::Retract(args) => commands::execute_retract(args, &mut store, &ctx),
        Command::Reverify(args) => commands::execute_reverify(args, &mut store, &ctx),
        Command::EnrichAll => commands::execute_enrich_all(&store, &ctx),
        Command::Add => commands::execute_add(&mut store, config.resolver()?, &ctx),
        Command::Stats => commands::execute_stats(&store, &ctx),
        Command::VerifyDois(args) => {
            commands::execute_verify_dois(args, &store, config.resolver()?, &ctx).map(|_| ())
        }
    }
}
