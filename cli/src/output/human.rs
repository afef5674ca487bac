//! Human-readable terminal renderer.

use agent_metadata_common::{ArtifactDefinition, ArtifactUploadResult};
use owo_colors::OwoColorize as _;

use crate::application::services::publish::PublicationReport;
use crate::output::OutputContext;

/// Renders domain types as human-readable terminal output using `OutputContext`.
pub struct HumanRenderer<'a> {
    ctx: &'a OutputContext,
}

impl<'a> HumanRenderer<'a> {
    /// Create a new `HumanRenderer` wrapping the given output context.
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }

    /// Render a successful publication.
    pub fn render_report(&self, report: &PublicationReport) {
        if self.ctx.quiet {
            return;
        }
        println!();
        self.ctx.header("Published:");
        self.ctx.kv(
            "Index:",
            &format!("{}/{}:{}", report.registry, report.repository, report.tag),
        );
        self.ctx.kv(
            "Digest:",
            &report.index_digest.style(self.ctx.styles.digest).to_string(),
        );
        self.render_results(&report.results);
    }

    /// One line per artifact: platform, outcome, digest or error.
    pub fn render_results(&self, results: &[ArtifactUploadResult]) {
        if self.ctx.quiet || results.is_empty() {
            return;
        }
        println!();
        self.ctx.header("Artifacts:");
        for result in results {
            let label = format!("{} ({}/{})", result.name, result.os, result.arch);
            if !result.uploaded {
                self.ctx.warn(&format!("{label}: {}", result.error));
            } else if result.signed {
                self.ctx
                    .success(&format!("{label}: {} [signed]", short_digest(&result.digest)));
            } else if result.signing_error.is_empty() {
                self.ctx
                    .success(&format!("{label}: {}", short_digest(&result.digest)));
            } else {
                self.ctx.warn(&format!(
                    "{label}: {} [unsigned: {}]",
                    short_digest(&result.digest),
                    result.signing_error
                ));
            }
        }
    }

    /// Render the declarations that passed validation.
    pub fn render_validated(&self, artifacts: &[ArtifactDefinition]) {
        if self.ctx.quiet {
            return;
        }
        for artifact in artifacts {
            self.ctx.success(&format!(
                "{} ({}/{}, {}): {}",
                artifact.name, artifact.os, artifact.arch, artifact.format, artifact.path
            ));
        }
    }
}

/// `sha256:` plus the first 12 hex characters.
#[must_use]
pub fn short_digest(digest: &str) -> &str {
    match digest.split_once(':') {
        Some((algorithm, encoded)) if encoded.len() > 12 => &digest[..algorithm.len() + 1 + 12],
        _ => digest,
    }
}
