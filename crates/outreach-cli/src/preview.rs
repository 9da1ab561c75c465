use clap::Args;
use outreach_campaign::{CampaignSettings, Orchestrator};
use outreach_core::{AppConfig, ProspectRecord};
use outreach_writer::DEFAULT_PURPOSE;

#[derive(Debug, Args)]
pub struct PreviewArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub company: String,
    #[arg(long)]
    pub website: String,
    /// Free-text intent guiding message generation
    #[arg(long, default_value = DEFAULT_PURPOSE)]
    pub purpose: String,
}

/// Prints the generated message for one prospect as JSON. Nothing is sent.
///
/// # Errors
///
/// Returns an error for an invalid prospect record or unusable settings.
pub(crate) async fn run_preview(
    orchestrator: &Orchestrator,
    config: &AppConfig,
    args: &PreviewArgs,
) -> anyhow::Result<()> {
    let prospect = ProspectRecord::new(&args.email, &args.company, &args.website);
    let preview = orchestrator
        .preview(&prospect, &args.purpose, &CampaignSettings::from_config(config))
        .await?;

    let json = serde_json::json!({
        "extraction_status": preview.extraction_status,
        "generation_status": preview.message.status,
        "to": preview.message.record.email,
        "subject": preview.message.subject,
        "body": preview.message.body,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
