//! The `zirave symptoms`, `zirave image`, `zirave advice` and `zirave status`
//! commands.

use anyhow::Context;
use clap::Args;
use std::path::PathBuf;
use zirave_core::{Config, ConfigError, DiagnosisService, Response};

/// Arguments for the `symptoms` command.
#[derive(Args, Debug)]
pub struct SymptomsArgs {
    /// Plant type (e.g., "tomato")
    #[arg(short, long)]
    pub plant: String,

    /// Observed symptoms, in order
    #[arg(required = false)]
    pub symptoms: Vec<String>,

    /// Where the plant is grown
    #[arg(short, long)]
    pub location: Option<String>,

    /// Current season
    #[arg(short, long)]
    pub season: Option<String>,
}

/// Arguments for the `image` command.
#[derive(Args, Debug)]
pub struct ImageArgs {
    /// Photo of the plant
    pub path: PathBuf,

    /// Expected plant type
    #[arg(short, long)]
    pub plant: Option<String>,
}

/// Arguments for the `advice` command.
#[derive(Args, Debug)]
pub struct AdviceArgs {
    /// The question to ask
    pub question: String,

    /// Extra context for the question
    #[arg(short, long)]
    pub context: Option<String>,
}

/// Execute the symptoms command.
pub async fn symptoms(args: SymptomsArgs, config: &Config) -> anyhow::Result<()> {
    let service = DiagnosisService::new(config)?;
    let resp = service
        .analyze_symptoms(
            &args.plant,
            &args.symptoms,
            args.location.as_deref(),
            args.season.as_deref(),
        )
        .await;
    print_response(&resp)
}

/// Execute the image command.
pub async fn image(args: ImageArgs, config: &Config) -> anyhow::Result<()> {
    let service = DiagnosisService::new(config)?;
    let path = expand_path(&args.path);
    let bytes = tokio::fs::read(&path)
        .await
        .with_context(|| format!("Failed to read image: {}", path.display()))?;
    tracing::debug!("Read {} bytes from {}", bytes.len(), path.display());

    let resp = service.analyze_image(&bytes, args.plant.as_deref()).await;
    print_response(&resp)
}

/// Execute the advice command.
pub async fn advice(args: AdviceArgs, config: &Config) -> anyhow::Result<()> {
    let service = DiagnosisService::new(config)?;
    let resp = service
        .get_agricultural_advice(&args.question, args.context.as_deref())
        .await;
    print_response(&resp)
}

/// Execute the status command.
pub async fn status(config: &Config) -> anyhow::Result<()> {
    let available = match DiagnosisService::new(config) {
        Ok(service) => service.is_available(),
        Err(ConfigError::MissingCredential { var }) => {
            tracing::info!("No credential configured ({var} is unset)");
            false
        }
        Err(e) => return Err(e.into()),
    };
    let status = serde_json::json!({
        "available": available,
        "text_model": config.gemini.text_model,
        "vision_model": config.gemini.vision_label,
        "version": zirave_core::VERSION,
    });
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

fn print_response(resp: &Response) -> anyhow::Result<()> {
    if let Some(err) = resp.error() {
        tracing::warn!("{err}");
    }
    println!("{}", serde_json::to_string_pretty(resp)?);
    Ok(())
}

fn expand_path(path: &std::path::Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&path_str).into_owned())
}
