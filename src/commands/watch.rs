//! Watch command implementation
//!
//! Connects to the cluster and runs the event watch loop.

use crate::cli::args::{OutputFormat, WatchArgs};
use crate::cli::output::{print_output, SessionSummary};
use crate::cluster::KubeCluster;
use crate::config::Settings;
use crate::error::{ConfigError, Result};
use crate::events::{EventClassifier, EventDispatcher};
use crate::notify::{redact_url, ConsoleNotifier, Notifier, WebhookNotifier};
use crate::services::{SystemClock, WatchLoop};

/// Execute the watch command
pub fn run_watch(
    args: &WatchArgs,
    settings: &Settings,
    format: OutputFormat,
    dry_run: bool,
) -> Result<()> {
    log::info!("Starting event relay");
    log::info!("  Scope: {}", settings.scope);
    log::info!("  Reasons to skip: {}", settings.skip_reasons);
    log::info!(
        "  Users to notify: {}",
        settings.notify_targets.as_deref().unwrap_or("-")
    );
    log::info!(
        "  Health check interval: {:?}",
        settings.health_check_interval
    );
    log::info!("  Session timeout: {:?}", settings.session_timeout);

    let notifier = build_notifier(settings, dry_run)?;
    let cluster = KubeCluster::connect()?;

    let dispatcher = EventDispatcher::new(
        settings.skip_reasons.clone(),
        EventClassifier::new(settings.notify_targets.clone()),
    );
    let max_sessions = args.once.then_some(1);
    let clock = SystemClock;

    let mut watch = WatchLoop::new(
        settings.watch_loop_config(max_sessions),
        &cluster,
        &*notifier,
        dispatcher,
        &clock,
    );
    watch.run();

    // Only reached with --once
    let summary = SessionSummary::new(watch.last_stats(), watch.health());
    print_output(&summary, format)?;
    Ok(())
}

fn build_notifier(settings: &Settings, dry_run: bool) -> Result<Box<dyn Notifier>> {
    if dry_run {
        log::info!("  Dry run: notifications are printed to stdout");
        return Ok(Box::new(ConsoleNotifier));
    }

    let url = settings
        .webhook_url
        .as_deref()
        .ok_or_else(|| ConfigError::MissingField("notify.webhook_url".to_string()))?;
    log::info!("  Webhook: {}", redact_url(url));
    Ok(Box::new(WebhookNotifier::new(url)?))
}
