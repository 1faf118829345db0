//! Command handlers
//!
//! Each command handler orchestrates the execution of a CLI command.

pub mod audit;
pub mod watch;

pub use audit::run_audit;
pub use watch::run_watch;

use crate::cli::Cli;
use crate::config::{ConfigBuilder, Settings};
use crate::error::Result;

/// Merge the config file with CLI/environment overrides.
///
/// The webhook URL is only required when notifications will be posted.
pub fn load_settings(cli: &Cli, require_webhook: bool) -> Result<Settings> {
    let builder = ConfigBuilder::new()
        .with_file(cli.config.as_deref())?
        .with_namespace(cli.namespace.clone())
        .with_skip_reasons(cli.skip_reasons.clone())
        .with_skip_delete_events(cli.skip_delete_events.then_some(true))
        .with_users_to_notify(cli.users_to_notify.clone())
        .with_webhook_url(cli.webhook_url.clone());

    let settings = if require_webhook {
        builder.build()?
    } else {
        builder.build_local()?
    };
    Ok(settings)
}
