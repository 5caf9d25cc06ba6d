//! Rewriting the document's `servers` list

use indexmap::IndexSet;
use serde_yaml::Value;
use tracing::{debug, info, warn};

use crate::document::Document;
use crate::types::{server_url, ServerEntry, BLOCKED_SERVER_URL};

const SERVERS_KEY: &str = "servers";

/// Requested changes to the server list
#[derive(Debug, Clone, Default)]
pub struct ServerOverrides {
    /// Overwrites the list outright when non-empty
    pub replacement: Vec<ServerEntry>,
    /// Appended when their url is not present yet
    pub additions: Vec<ServerEntry>,
    /// Drop the existing list before replacement/additions
    pub clear_existing: bool,
}

/// What [`apply_server_mutations`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerReport {
    pub cleared: usize,
    pub replaced: usize,
    pub appended: usize,
    pub skipped_duplicates: usize,
    pub dropped_malformed: usize,
    pub blocked_removed: usize,
    /// Length of the list written back
    pub final_count: usize,
}

/// Produce the final `servers` list.
///
/// Order of application: clear, replace, append (deduplicated by url against
/// the list as it stands), then drop malformed entries and the blocked url.
/// The result is always written back as a sequence.
pub fn apply_server_mutations(doc: &mut Document, overrides: &ServerOverrides) -> ServerReport {
    let mut report = ServerReport::default();

    let mut servers = match doc.root_mut().get_mut(SERVERS_KEY) {
        Some(Value::Sequence(seq)) => std::mem::take(seq),
        Some(other) => {
            warn!("Ignoring servers field that is not a list: {:?}", other);
            Vec::new()
        }
        None => Vec::new(),
    };

    if overrides.clear_existing {
        if !servers.is_empty() {
            info!("Clearing {} existing server(s) due to ST2138_REMOVE_URLS", servers.len());
        }
        report.cleared = servers.len();
        servers.clear();
    }

    if !overrides.replacement.is_empty() {
        servers = overrides
            .replacement
            .iter()
            .map(ServerEntry::to_value)
            .collect();
        report.replaced = servers.len();
        info!("Replaced servers with {} entries from ST2138_URLS", report.replaced);
    }

    if !overrides.additions.is_empty() {
        let mut seen: IndexSet<String> = servers
            .iter()
            .filter_map(server_url)
            .map(str::to_string)
            .collect();

        for server in &overrides.additions {
            if seen.insert(server.url.clone()) {
                servers.push(server.to_value());
                report.appended += 1;
            } else {
                debug!("Skipping duplicate server {}", server.url);
                report.skipped_duplicates += 1;
            }
        }

        if report.appended > 0 {
            info!("Appended {} server(s) from ST2138_ADD_URLS", report.appended);
        }
    }

    let before = servers.len();
    servers.retain(|entry| server_url(entry).is_some());
    report.dropped_malformed = before - servers.len();
    if report.dropped_malformed > 0 {
        warn!(
            "Dropped {} server entr{} without a url",
            report.dropped_malformed,
            if report.dropped_malformed == 1 { "y" } else { "ies" }
        );
    }

    let before = servers.len();
    servers.retain(|entry| server_url(entry) != Some(BLOCKED_SERVER_URL));
    report.blocked_removed = before - servers.len();
    if report.blocked_removed > 0 {
        info!("Removed blocked server {}", BLOCKED_SERVER_URL);
    }

    report.final_count = servers.len();
    doc.root_mut()
        .insert(Value::from(SERVERS_KEY), Value::Sequence(servers));

    report
}
