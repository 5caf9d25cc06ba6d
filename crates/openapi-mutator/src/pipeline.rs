//! The fetch, parse, mutate, write sequence

use tracing::info;

use crate::config::UpdateConfig;
use crate::document::Document;
use crate::error::Result;
use crate::fetcher::SpecFetcher;
use crate::security::{apply_security_mutations, SecurityReport};
use crate::servers::{apply_server_mutations, ServerReport};
use crate::writer::write_document;

/// Combined outcome of the mutation stages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MutationReport {
    pub servers: ServerReport,
    pub security: SecurityReport,
}

/// Apply server then security edits to an already parsed document
pub fn mutate_document(doc: &mut Document, config: &UpdateConfig) -> MutationReport {
    let servers = apply_server_mutations(doc, &config.servers);
    let security = apply_security_mutations(doc, &config.security);

    MutationReport { servers, security }
}

/// Run one full update. Nothing is written unless every earlier stage succeeds.
pub async fn run(config: &UpdateConfig) -> Result<MutationReport> {
    let fetcher = SpecFetcher::new(config.fetch_timeout)?;
    let content = fetcher.fetch(&config.source_url).await?;

    let mut doc = Document::parse(&content)?;
    let report = mutate_document(&mut doc, config);

    write_document(&doc, &config.output_path).await?;

    info!(
        "Update complete: {} server(s), bearer scheme added: {}",
        report.servers.final_count, report.security.bearer_scheme_added
    );
    Ok(report)
}
