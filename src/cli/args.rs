//! CLI argument definitions using clap derive
//!
//! Defines all command-line arguments and subcommands. Every relay setting
//! can also come from a `K8S_EVENTS_STREAMER_*` environment variable.

use clap::{ArgAction, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// Kubernetes event relay
///
/// Streams cluster events and pod health to an incoming chat webhook.
#[derive(Parser, Debug)]
#[command(name = "kube-event-relay")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(
        short,
        long,
        global = true,
        env = "K8S_EVENTS_STREAMER_DEBUG",
        action = ArgAction::SetTrue,
        value_parser = parse_present
    )]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "K8S_EVENTS_STREAMER_CONFIG")]
    pub config: Option<String>,

    /// Namespace to watch (empty for all namespaces)
    #[arg(short, long, global = true, env = "K8S_EVENTS_STREAMER_NAMESPACE")]
    pub namespace: Option<String>,

    /// Whitespace-separated event reasons to ignore
    #[arg(long, global = true, env = "K8S_EVENTS_STREAMER_LIST_OF_REASONS_TO_SKIP")]
    pub skip_reasons: Option<String>,

    /// Ignore SuccessfulDelete events
    #[arg(
        long,
        global = true,
        env = "K8S_EVENTS_STREAMER_SKIP_DELETE_EVENTS",
        action = ArgAction::SetTrue,
        value_parser = parse_enabled
    )]
    pub skip_delete_events: bool,

    /// Mention text added to warning notifications
    #[arg(long, global = true, env = "K8S_EVENTS_STREAMER_USERS_TO_NOTIFY")]
    pub users_to_notify: Option<String>,

    /// Incoming webhook URL
    #[arg(long, global = true, env = "K8S_EVENTS_STREAMER_INCOMING_WEB_HOOK_URL")]
    pub webhook_url: Option<String>,

    /// Print notifications to stdout instead of posting them
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream events and audit pod health (default)
    Watch(WatchArgs),

    /// Run one pod health audit and print the result
    Audit,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Arguments for the watch command
#[derive(Parser, Debug, Default)]
pub struct WatchArgs {
    /// Stop after one watch session instead of running forever
    #[arg(long)]
    pub once: bool,
}

/// Output format
#[derive(ValueEnum, Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format for machine parsing
    Json,
    /// Compact single-line format
    Compact,
}

/// Switch that is on only for a case-insensitive `true`
fn parse_enabled(value: &str) -> Result<bool, String> {
    Ok(value.trim().eq_ignore_ascii_case("true"))
}

/// Switch that is on for any non-empty value
fn parse_present(value: &str) -> Result<bool, String> {
    Ok(!value.trim().is_empty())
}

/// Generate shell completions and print to stdout
pub fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests that touch the process environment must not interleave
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn parse_audit_with_env(name: &str, value: &str) -> Cli {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        std::env::set_var(name, value);
        let result = Cli::try_parse_from(["kube-event-relay", "audit"]);
        std::env::remove_var(name);
        result.unwrap()
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parse_without_subcommand() {
        let args = Cli::try_parse_from(["kube-event-relay"]).unwrap();
        assert!(args.command.is_none());
        assert!(!args.dry_run);
    }

    #[test]
    fn test_cli_parse_verbose() {
        let args = Cli::try_parse_from(["kube-event-relay", "-v", "audit"]).unwrap();
        assert!(args.verbose);
        assert!(matches!(args.command, Some(Commands::Audit)));
    }

    #[test]
    fn test_cli_parse_watch_once() {
        let args = Cli::try_parse_from(["kube-event-relay", "watch", "--once", "--dry-run"]).unwrap();
        assert!(args.dry_run);
        match args.command {
            Some(Commands::Watch(watch)) => assert!(watch.once),
            other => panic!("Expected Watch command, got {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_global_settings_after_subcommand() {
        let args = Cli::try_parse_from([
            "kube-event-relay",
            "watch",
            "--namespace",
            "prod",
            "--skip-reasons",
            "Pulled Created",
            "--skip-delete-events",
            "--users-to-notify",
            "@oncall",
            "--webhook-url",
            "https://hooks.example.com/x",
        ])
        .unwrap();

        assert_eq!(args.namespace.as_deref(), Some("prod"));
        assert_eq!(args.skip_reasons.as_deref(), Some("Pulled Created"));
        assert!(args.skip_delete_events);
        assert_eq!(args.users_to_notify.as_deref(), Some("@oncall"));
        assert_eq!(args.webhook_url.as_deref(), Some("https://hooks.example.com/x"));
    }

    #[test]
    fn test_cli_rejects_unknown_format() {
        let result = Cli::try_parse_from(["kube-event-relay", "--format", "yaml", "audit"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_enabled() {
        assert!(parse_enabled("true").unwrap());
        assert!(parse_enabled("True").unwrap());
        assert!(parse_enabled(" TRUE ").unwrap());
        assert!(!parse_enabled("").unwrap());
        assert!(!parse_enabled("yes").unwrap());
        assert!(!parse_enabled("1").unwrap());
        assert!(!parse_enabled("false").unwrap());
    }

    #[test]
    fn test_parse_present() {
        assert!(parse_present("1").unwrap());
        assert!(parse_present("true").unwrap());
        assert!(parse_present("anything").unwrap());
        assert!(!parse_present("").unwrap());
        assert!(!parse_present("  ").unwrap());
    }

    #[test]
    fn test_skip_delete_env_values_never_fail() {
        let name = "K8S_EVENTS_STREAMER_SKIP_DELETE_EVENTS";
        assert!(parse_audit_with_env(name, "True").skip_delete_events);
        assert!(parse_audit_with_env(name, "true").skip_delete_events);
        assert!(!parse_audit_with_env(name, "").skip_delete_events);
        assert!(!parse_audit_with_env(name, "yes").skip_delete_events);
        assert!(!parse_audit_with_env(name, "False").skip_delete_events);
    }

    #[test]
    fn test_debug_env_any_value_enables_verbose() {
        let name = "K8S_EVENTS_STREAMER_DEBUG";
        assert!(parse_audit_with_env(name, "1").verbose);
        assert!(parse_audit_with_env(name, "yes").verbose);
        assert!(!parse_audit_with_env(name, "").verbose);
    }

    #[test]
    fn test_skip_delete_flag_without_env() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let args = Cli::try_parse_from(["kube-event-relay", "--skip-delete-events", "audit"]).unwrap();
        assert!(args.skip_delete_events);
    }
}
