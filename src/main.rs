//! kube-event-relay - Kubernetes event relay
//!
//! Streams Kubernetes events and pod health notifications to an incoming
//! chat webhook.

use clap::Parser;
use kube_event_relay::cli::args::{generate_completions, Cli, Commands, WatchArgs};
use kube_event_relay::commands::{load_settings, run_audit, run_watch};
use kube_event_relay::error::{AppError, ClusterError, ConfigError};

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG still wins over the verbose flag
    let default_level = if cli.verbose { "info,kube_event_relay=debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .init();

    // Run the appropriate command
    let result = run(&cli);

    if let Err(e) = result {
        log::error!("{}", e);
        print_error(&e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    let default_watch = WatchArgs::default();

    match &cli.command {
        None => {
            let settings = load_settings(cli, !cli.dry_run)?;
            run_watch(&default_watch, &settings, cli.format, cli.dry_run)
        }

        Some(Commands::Watch(args)) => {
            let settings = load_settings(cli, !cli.dry_run)?;
            run_watch(args, &settings, cli.format, cli.dry_run)
        }

        Some(Commands::Audit) => {
            let settings = load_settings(cli, false)?;
            run_audit(&settings, cli.format)
        }

        Some(Commands::Completions { shell }) => {
            generate_completions(*shell);
            Ok(())
        }
    }
}

fn print_error(err: &AppError) {
    eprintln!("Error: {}", err);

    // Print helpful hints for common errors
    match err {
        AppError::Config(ConfigError::MissingField(field)) if field.contains("webhook") => {
            eprintln!();
            eprintln!("Hint: Set K8S_EVENTS_STREAMER_INCOMING_WEB_HOOK_URL or pass --webhook-url.");
            eprintln!("      Use --dry-run to print notifications instead.");
        }
        AppError::Config(ConfigError::FileNotFound(_)) => {
            eprintln!();
            eprintln!("Hint: Check the --config path or K8S_EVENTS_STREAMER_CONFIG.");
        }
        AppError::Cluster(ClusterError::Connect(_)) => {
            eprintln!();
            eprintln!("Hint: Make sure a kubeconfig is available or the relay runs in-cluster");
            eprintln!("      with a service account allowed to list and watch events and pods.");
        }
        _ => {}
    }
}
