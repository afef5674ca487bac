//! `agent-metadata publish`: upload binaries, then push and sign the release index.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::app::AppContext;
use crate::application::services::publish::{
    PublicationOutcome, PublishFailure, PublishRequest, publish_release,
};
use crate::application::services::retry::RetryExecutor;
use crate::commands::{OciArgs, non_blank};
use crate::domain::registry::parse_registry_url;
use crate::domain::retry::RetryPolicy;
use crate::infra::fs::LocalFs;
use crate::infra::inputs::parse_version;
use crate::infra::registry::OciRegistryClient;
use crate::infra::registry::auth::Credentials;
use crate::infra::signing::HttpSigningClient;
use crate::infra::sleep::TokioSleeper;
use crate::output::json::{format_error, format_value};

/// Operation name used in retry errors ("failed Signing after N attempts").
const SIGNING_OPERATION: &str = "Signing";

/// Arguments for the publish command.
#[derive(Args)]
pub struct PublishArgs {
    #[command(flatten)]
    pub oci: OciArgs,

    /// Release version (semver); the index tag
    #[arg(long = "agent-version", env = "INPUT_VERSION", default_value = "")]
    pub agent_version: String,

    /// Signing service base URL
    #[arg(long, env = "INPUT_SIGNING_URL")]
    pub signing_url: Option<String>,

    /// Bearer token for the signing service
    #[arg(long, env = "INPUT_SIGNING_TOKEN", hide_env_values = true)]
    pub signing_token: Option<String>,

    /// Signing service client identifier
    #[arg(long, env = "INPUT_SIGNING_CLIENT_ID")]
    pub signing_client_id: Option<String>,

    /// Maximum signing attempts
    #[arg(long, default_value_t = 3)]
    pub signing_attempts: u32,

    /// Base delay between signing attempts, in seconds (grows linearly)
    #[arg(long, default_value_t = 2)]
    pub signing_retry_delay_secs: u64,

    /// Wall-clock limit for each registry push, in seconds
    #[arg(long, default_value_t = 600)]
    pub push_timeout_secs: u64,
}

/// Run `agent-metadata publish`.
///
/// # Errors
///
/// Returns an error if inputs are invalid or any pipeline stage fails.
pub async fn run(app: &AppContext, args: PublishArgs) -> Result<()> {
    let config = args.oci.oci_config()?;
    if !config.is_enabled() {
        tracing::info!("INPUT_OCI_REGISTRY not set, skipping binary publication");
        return render_disabled(app);
    }
    let version = parse_version(&args.agent_version)?;

    let signing_url = non_blank(args.signing_url.as_deref())
        .context("INPUT_SIGNING_URL is required when OCI publishing is enabled")?;
    let signing_token = non_blank(args.signing_token.as_deref())
        .context("INPUT_SIGNING_TOKEN is required when OCI publishing is enabled")?;
    let client_id = non_blank(args.signing_client_id.as_deref())
        .context("INPUT_SIGNING_CLIENT_ID is required when OCI publishing is enabled")?;

    let target = parse_registry_url(&config.registry).context("invalid INPUT_OCI_REGISTRY")?;
    let registry = OciRegistryClient::new(
        target,
        Credentials::from_parts(&config.username, &config.password),
        Duration::from_secs(args.push_timeout_secs),
    )?;
    let signer = HttpSigningClient::new(signing_url, signing_token)?;
    let sleeper = TokioSleeper;
    let retry = RetryExecutor::new(
        RetryPolicy::new(
            SIGNING_OPERATION,
            args.signing_attempts,
            Duration::from_secs(args.signing_retry_delay_secs),
        ),
        &sleeper,
        app.cancel.clone(),
    );
    let reporter = app.terminal_reporter();
    let request = PublishRequest {
        config,
        workspace: args.oci.workspace.clone(),
        version,
        client_id: client_id.to_string(),
    };

    let outcome = tokio::select! {
        biased;
        () = app.cancel.cancelled() => bail!("publication cancelled"),
        outcome = publish_release(&registry, &signer, &LocalFs, &retry, &reporter, &request) => outcome,
    };

    match outcome {
        Ok(PublicationOutcome::Published(report)) => {
            if app.is_json() {
                println!("{}", format_value(&report)?);
            } else {
                app.human().render_report(&report);
            }
            Ok(())
        }
        Ok(PublicationOutcome::Disabled) => render_disabled(app),
        Err(failure) => Err(render_failure(app, failure)),
    }
}

fn render_disabled(app: &AppContext) -> Result<()> {
    if app.is_json() {
        println!(
            "{}",
            format_value(&serde_json::json!({ "published": false, "results": [] }))?
        );
    } else {
        app.output
            .info("No OCI registry configured; skipping binary publication.");
    }
    Ok(())
}

/// Print whatever per-artifact detail exists, then hand the error back for exit-code handling.
fn render_failure(app: &AppContext, failure: PublishFailure) -> anyhow::Error {
    if app.is_json() {
        match format_error(
            &failure.error.to_string(),
            failure.error.code(),
            &failure.results,
        ) {
            Ok(out) => println!("{out}"),
            Err(e) => return e,
        }
    } else {
        app.human().render_results(&failure.results);
    }
    failure.into()
}
