//! `acme-dns-renew` entry point
//!
//! Renews every certificate of the domain list that is about to expire,
//! answering certbot's DNS-01 challenges through Cloudflare, then exports the
//! new files, runs post-renewal hooks and mails a report.
//!
//! Meant to be run from cron or a systemd timer. Exit status: `0` when no
//! entry failed, `1` when at least one did, `2` when the run could not start.

mod adapters;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use acme_dns_core::acme::CertbotClient;
use acme_dns_core::services::{
    BatchService, ExportService, HookService, RenewalContext, RenewalService, ReportService,
};
use acme_dns_core::types::parse_domain_list;
use acme_dns_core::AppConfig;
use acme_dns_provider::create_provider;
use adapters::SmtpNotifier;
use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG_PATH: &str = "/etc/acme-dns-orchestrator/config.json";

const EXIT_ENTRY_FAILED: u8 = 1;
const EXIT_STARTUP_FAILED: u8 = 2;

#[derive(Debug, Parser)]
#[command(name = "acme-dns-renew", version, about = "Renew expiring certificates via DNS-01")]
struct Cli {
    /// Configuration file
    #[arg(long, env = "ACME_DNS_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Domain list file, overrides `domain_list_path` of the configuration
    #[arg(long)]
    domain_list: Option<PathBuf>,

    /// Do not send any mail
    #[arg(long)]
    no_notify: bool,

    /// Write the batch report as JSON to this file
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr, stdout stays free for cron mail
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(EXIT_ENTRY_FAILED),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_STARTUP_FAILED)
        }
    }
}

/// Run one batch. Returns whether any entry failed; errors mean nothing ran.
async fn run(cli: Cli) -> anyhow::Result<bool> {
    tracing::info!("Loading configuration from {}", cli.config.display());
    let config = AppConfig::load(&cli.config).context("failed to load configuration")?;

    let list_path = cli
        .domain_list
        .unwrap_or_else(|| config.domain_list_path.clone());
    let content = std::fs::read_to_string(&list_path)
        .with_context(|| format!("failed to read domain list {}", list_path.display()))?;
    let requests = parse_domain_list(&content)
        .with_context(|| format!("invalid domain list {}", list_path.display()))?;
    if requests.is_empty() {
        tracing::warn!("Domain list {} is empty", list_path.display());
        return Ok(false);
    }
    tracing::info!("{} certificate(s) in {}", requests.len(), list_path.display());

    let provider = create_provider(config.provider_credentials()?, &config.provider_options())
        .context("failed to create DNS provider")?;
    let acme_client = Arc::new(CertbotClient::new(config.certbot_options()));
    let ctx = Arc::new(RenewalContext::new(acme_client, provider));

    let batch = BatchService::new(
        RenewalService::new(ctx, config.renewal_settings()),
        ExportService::new(config.export_settings()),
        HookService::new(config.post_scripts_dir.clone()),
        config.renewal_window(),
    );
    let report = batch.run(&requests).await;

    if let Some(path) = &cli.report {
        let written = report
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|json| std::fs::write(path, json).map_err(anyhow::Error::from));
        match written {
            Ok(()) => tracing::info!("Batch report written to {}", path.display()),
            Err(e) => tracing::error!("Failed to write batch report {}: {e:#}", path.display()),
        }
    }

    match (&config.notification, cli.no_notify) {
        (Some(notification), false) => {
            let notifier = Arc::new(SmtpNotifier::new(notification.clone()));
            let failures = ReportService::new(notifier).notify(&report).await;
            if failures > 0 {
                tracing::warn!("{failures} notification(s) could not be delivered");
            }
        }
        (Some(_), true) => tracing::info!("Notifications disabled by --no-notify"),
        (None, _) => tracing::debug!("No notification section configured"),
    }

    for alert in report.cleanup_alerts() {
        tracing::warn!(
            "Leftover challenge record {} (id {}) must be deleted manually: {}",
            alert.record.name,
            alert.record.record_id,
            alert.error
        );
    }

    Ok(report.has_failures())
}
