//! `agent-metadata validate`: declaration and path checks only, no network.

use anyhow::Result;
use clap::Args;

use crate::app::AppContext;
use crate::application::services::publish::PublishFailure;
use crate::application::services::upload::validate_artifacts;
use crate::commands::OciArgs;
use crate::domain::error::PublishError;
use crate::domain::registry::parse_registry_url;
use crate::infra::fs::LocalFs;
use crate::output::json::{format_error, format_value};

/// Arguments for the validate command.
#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub oci: OciArgs,
}

/// Run `agent-metadata validate`.
///
/// # Errors
///
/// Returns an error if the configuration or any artifact path is invalid.
pub fn run(app: &AppContext, args: &ValidateArgs) -> Result<()> {
    let config = args.oci.oci_config()?;
    if !config.is_enabled() {
        if app.is_json() {
            println!("{}", format_value(&serde_json::json!({ "enabled": false, "valid": true }))?);
        } else {
            app.output
                .info("No OCI registry configured; nothing to validate.");
        }
        return Ok(());
    }

    let checked = config
        .validate()
        .map_err(PublishError::from)
        .and_then(|()| parse_registry_url(&config.registry).map_err(PublishError::from))
        .and_then(|_| {
            validate_artifacts(&LocalFs, &config.artifacts, &args.oci.workspace)
                .map_err(|failures| PublishError::Validation { failures })
        });

    match checked {
        Ok(paths) => {
            tracing::debug!(artifacts = paths.len(), "all artifact paths valid");
            if app.is_json() {
                println!(
                    "{}",
                    format_value(&serde_json::json!({
                        "enabled": true,
                        "valid": true,
                        "artifacts": config.artifacts,
                    }))?
                );
            } else {
                app.human().render_validated(&config.artifacts);
            }
            Ok(())
        }
        Err(e) => {
            if app.is_json() {
                println!("{}", format_error(&e.to_string(), e.code(), &[])?);
            }
            Err(PublishFailure {
                error: e,
                results: Vec::new(),
            }
            .into())
        }
    }
}
