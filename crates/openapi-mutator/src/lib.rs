//! # openapi-mutator
//!
//! Downloads an OpenAPI document and rewrites its `servers` list and
//! security declarations before writing it back out as YAML.
//!
//! Every stage is an ordinary function over a [`Document`], so the mutation
//! rules can be exercised without a network or the process environment.

mod types;
mod config;
mod document;
mod fetcher;
mod servers;
mod security;
mod writer;
mod pipeline;
mod error;

pub use types::*;
pub use config::{
    decode_server_list, is_truthy, ConfigInputs, UpdateConfig, ADD_BEARER_VAR, ADD_SERVERS_VAR,
    FETCH_TIMEOUT_VAR, OUTPUT_PATH_VAR, REMOVE_SECURITY_VAR, REMOVE_SERVERS_VAR,
    REPLACE_SERVERS_VAR, SOURCE_URL_VAR,
};
pub use document::Document;
pub use fetcher::SpecFetcher;
pub use servers::{apply_server_mutations, ServerOverrides, ServerReport};
pub use security::{
    apply_security_mutations, inject_bearer_auth, remove_security, SecurityOptions,
    SecurityReport,
};
pub use writer::write_document;
pub use pipeline::{mutate_document, run, MutationReport};
pub use error::{Result, UpdateError, USAGE_EXIT_CODE};
