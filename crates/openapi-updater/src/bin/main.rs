//! openapi-updater - downloads the ST2138 OpenAPI document, rewrites its
//! servers and security sections, and publishes it as YAML.
//!
//! Meant to run once per invocation from a scheduler. Every setting can come
//! from the environment or a flag; the exit code tells the caller which stage
//! failed.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};

use openapi_mutator::{
    run, ConfigInputs, UpdateConfig, ADD_BEARER_VAR, ADD_SERVERS_VAR, FETCH_TIMEOUT_VAR,
    OUTPUT_PATH_VAR, REMOVE_SECURITY_VAR, REMOVE_SERVERS_VAR, REPLACE_SERVERS_VAR,
    SOURCE_URL_VAR, USAGE_EXIT_CODE,
};

/// Fetch and mutate an OpenAPI document
#[derive(Parser, Debug)]
#[command(name = "openapi-updater")]
#[command(version)]
#[command(about = "Download an OpenAPI document, rewrite servers and security, write YAML")]
struct Args {
    /// Where to download the document from
    #[arg(long, env = SOURCE_URL_VAR)]
    source_url: Option<String>,

    /// Where to write the resulting YAML
    #[arg(long, env = OUTPUT_PATH_VAR)]
    output_path: Option<PathBuf>,

    /// Seconds allowed for the download
    #[arg(long, env = FETCH_TIMEOUT_VAR)]
    fetch_timeout_secs: Option<u64>,

    /// JSON array of {url, name} objects replacing the server list
    #[arg(long, env = REPLACE_SERVERS_VAR)]
    servers: Option<String>,

    /// JSON array of {url, name} objects appended to the server list
    #[arg(long, env = ADD_SERVERS_VAR)]
    add_servers: Option<String>,

    /// Clear existing servers before replacing/adding (1/true/yes/on)
    #[arg(long, env = REMOVE_SERVERS_VAR)]
    remove_servers: Option<String>,

    /// Drop global security and components.securitySchemes (1/true/yes/on)
    #[arg(long, env = REMOVE_SECURITY_VAR)]
    remove_security: Option<String>,

    /// Inject a BearerAuth scheme and global requirement (1/true/yes/on)
    #[arg(long, env = ADD_BEARER_VAR)]
    add_bearer: Option<String>,
}

impl From<Args> for ConfigInputs {
    fn from(args: Args) -> Self {
        ConfigInputs {
            source_url: args.source_url,
            output_path: args.output_path,
            fetch_timeout_secs: args.fetch_timeout_secs,
            servers: args.servers,
            add_servers: args.add_servers,
            remove_servers: args.remove_servers,
            remove_security: args.remove_security,
            add_bearer: args.add_bearer,
        }
    }
}

/// Help and version output are requests, not failures
fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if is_informational(&e) => e.exit(),
        Err(e) => {
            error!("Invalid arguments: {}", e);
            return ExitCode::from(USAGE_EXIT_CODE);
        }
    };

    let config = match UpdateConfig::try_from(ConfigInputs::from(args)) {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    match run(&config).await {
        Ok(_) => {
            info!("Wrote {}", config.output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Update failed: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every flag spelled out, so values set in the environment never leak in
    fn parse_with(overrides: &[(&str, &str)]) -> Result<Args, clap::Error> {
        let mut flags = vec![
            ("--source-url", "http://localhost:8080/openapi.yaml"),
            ("--output-path", "/tmp/out.yaml"),
            ("--fetch-timeout-secs", "30"),
            ("--servers", "[]"),
            ("--add-servers", "[]"),
            ("--remove-servers", "false"),
            ("--remove-security", "false"),
            ("--add-bearer", "false"),
        ];
        for (flag, value) in overrides {
            if let Some(slot) = flags.iter_mut().find(|(name, _)| name == flag) {
                slot.1 = *value;
            }
        }

        let argv = std::iter::once("openapi-updater")
            .chain(flags.iter().flat_map(|(flag, value)| [*flag, *value]));
        Args::try_parse_from(argv)
    }

    #[test]
    fn test_args_from_flags() {
        let args = parse_with(&[
            ("--servers", r#"[{"url": "https://a.example"}]"#),
            ("--add-bearer", "true"),
        ])
        .unwrap();

        let config = UpdateConfig::try_from(ConfigInputs::from(args)).unwrap();

        assert_eq!(config.source_url, "http://localhost:8080/openapi.yaml");
        assert_eq!(config.output_path, PathBuf::from("/tmp/out.yaml"));
        assert_eq!(config.servers.replacement.len(), 1);
        assert!(config.servers.additions.is_empty());
        assert!(config.security.add_bearer);
        assert!(!config.security.remove_existing);
    }

    #[test]
    fn test_invalid_server_flag_maps_to_input_exit_code() {
        let args = parse_with(&[("--add-servers", "{not json")]).unwrap();

        let err = UpdateConfig::try_from(ConfigInputs::from(args)).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_bad_timeout_is_a_usage_error() {
        let err = parse_with(&[("--fetch-timeout-secs", "abc")]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::ValueValidation);
        assert!(!is_informational(&err));
        assert_ne!(USAGE_EXIT_CODE, 2);
    }

    #[test]
    fn test_unknown_flag_is_a_usage_error() {
        let err = Args::try_parse_from(["openapi-updater", "--no-such-flag"]).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::UnknownArgument);
        assert!(!is_informational(&err));
    }

    #[test]
    fn test_help_and_version_are_informational() {
        for flag in ["--help", "--version"] {
            let err = Args::try_parse_from(["openapi-updater", flag]).unwrap_err();
            assert!(is_informational(&err), "{flag} gave {:?}", err.kind());
        }
    }
}
