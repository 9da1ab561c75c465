//! `run` subcommand: execute a campaign from a record file.

use std::path::PathBuf;

use clap::Args;
use outreach_campaign::{CampaignSettings, CancelToken, ColumnMapping, FileRecordSource, Orchestrator};
use outreach_core::AppConfig;
use outreach_writer::DEFAULT_PURPOSE;

#[derive(Debug, Args)]
pub struct RunArgs {
    /// JSON or YAML file with a `values` range: header row, then prospects
    #[arg(long)]
    pub records: PathBuf,
    /// Free-text intent guiding message generation
    #[arg(long, default_value = DEFAULT_PURPOSE)]
    pub purpose: String,
    /// Header of the email column
    #[arg(long, default_value = "email")]
    pub email_column: String,
    /// Header of the company name column
    #[arg(long, default_value = "company")]
    pub company_column: String,
    /// Header of the website column
    #[arg(long, default_value = "website")]
    pub website_column: String,
    /// Simultaneous fetch/generate units (overrides OUTREACH_MAX_CONCURRENT_UNITS)
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Sends per second (overrides OUTREACH_SEND_RATE_PER_SEC)
    #[arg(long)]
    pub rate: Option<f64>,
    /// Token bucket capacity (overrides OUTREACH_SEND_BURST)
    #[arg(long)]
    pub burst: Option<u32>,
    /// Also write the JSON report to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl RunArgs {
    pub(crate) fn mapping(&self) -> ColumnMapping {
        ColumnMapping {
            email: self.email_column.clone(),
            company: self.company_column.clone(),
            website: self.website_column.clone(),
        }
    }

    pub(crate) fn settings(&self, config: &AppConfig) -> CampaignSettings {
        let mut settings = CampaignSettings::from_config(config);
        if let Some(concurrency) = self.concurrency {
            settings.concurrency_limit = concurrency;
        }
        if let Some(rate) = self.rate {
            settings.send_rate_limit = rate;
        }
        if let Some(burst) = self.burst {
            settings.burst = burst;
        }
        settings
    }
}

/// Runs the campaign, printing the JSON report to stdout. Ctrl-C cancels
/// the run; the report still accounts for every record.
///
/// # Errors
///
/// Returns an error for run-level failures (missing credential, unreadable
/// record file, invalid settings) or if the report cannot be written.
pub(crate) async fn run_campaign(
    orchestrator: &Orchestrator,
    config: &AppConfig,
    args: &RunArgs,
) -> anyhow::Result<()> {
    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling campaign");
            on_interrupt.cancel();
        }
    });

    let result = orchestrator
        .execute_from_source(
            &FileRecordSource,
            &args.records.to_string_lossy(),
            &args.mapping(),
            &args.purpose,
            &args.settings(config),
            &cancel,
        )
        .await;
    interrupt.abort();
    let report = result?;

    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = &args.output {
        tokio::fs::write(path, &json).await?;
        tracing::info!(path = %path.display(), "report written");
    }
    println!("{json}");
    Ok(())
}
