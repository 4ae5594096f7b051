//! groupsync: add members of an Entra ID group that are missing from a
//! Netskope SCIM group.

mod config;
mod error;
mod logging;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use groupsync_entra::{DirectoryClient, GraphClient, RateLimitConfig, TokenCache};
use groupsync_reconcile::{
    AlwaysConfirm, Confirm, ReconcileOptions, Reconciler, RunReport, ScimTarget,
};
use groupsync_scim::{GroupPatcher, ScimClient, ScimGroupClient};
use tracing::{debug, info, warn};

use config::{AppConfig, Overrides};
use error::{check_report, CliError, CliResult};
use logging::{init_logging, LogFormat, DEFAULT_LOG_FILTER};

/// Add Entra ID group members that are missing from a Netskope group
#[derive(Parser, Debug)]
#[command(name = "groupsync")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Entra ID group display name (overrides ENTRA_GROUP_NAME)
    #[arg(long, value_name = "NAME")]
    entra_group: Option<String>,

    /// Netskope group display name (overrides NETSKOPE_GROUP_NAME)
    #[arg(long, value_name = "NAME")]
    netskope_group: Option<String>,

    /// Resolve missing users but do not modify the Netskope group
    #[arg(long)]
    dry_run: bool,

    /// Ask before sending the membership update
    #[arg(long)]
    confirm: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, value_name = "PATH")]
    env_file: Option<PathBuf>,

    /// Log output format (overrides LOG_FORMAT)
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,
}

/// Interactive approval on the terminal.
struct PromptConfirm;

impl Confirm for PromptConfirm {
    fn confirm(&self, group_name: &str, count: usize) -> bool {
        let prompt = format!("Add {} user(s) to Netskope group '{}'?", count, group_name);
        match dialoguer::Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(e) => {
                warn!(error = %e, "Confirmation prompt failed, treating as declined");
                false
            }
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.print();
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path).map_err(|e| {
                CliError::Config(format!("cannot load {}: {}", path.display(), e))
            })?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let overrides = Overrides {
        entra_group: cli.entra_group.clone(),
        netskope_group: cli.netskope_group.clone(),
        log_format: cli.log_format,
    };
    let config = AppConfig::from_env(&overrides)?;
    init_logging(config.log_format, DEFAULT_LOG_FILTER);
    debug!(scim_url = %config.netskope.scim_url, "Configuration loaded");

    let report = reconcile(&config, &cli).await?;

    if cli.json {
        output::print_json(&report)?;
    } else {
        output::print_report(&report);
    }

    check_report(&report)
}

async fn reconcile(config: &AppConfig, cli: &Cli) -> CliResult<RunReport> {
    let timeout = Duration::from_secs(config.http_timeout_secs);

    // Entra ID
    let entra_config = config.entra_config()?;
    let token_http = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CliError::Internal(format!("failed to build HTTP client: {}", e)))?;
    let tokens = TokenCache::new(
        config.entra_credentials(),
        entra_config.cloud_environment.clone(),
        entra_config.tenant_id.clone(),
        token_http,
    );
    let graph = GraphClient::new(
        Arc::new(tokens),
        entra_config.cloud_environment.clone(),
        entra_config.api_version.clone(),
        timeout,
    )
    .and_then(|graph| {
        graph.with_rate_limit_config(RateLimitConfig {
            max_retries: config.max_retries,
            ..RateLimitConfig::default()
        })
    })
    .map_err(|e| CliError::Config(e.to_string()))?;
    let source = DirectoryClient::new(graph, &entra_config);

    // Netskope SCIM
    let scim = ScimClient::new(&config.scim_config()).map_err(|e| CliError::Config(e.to_string()))?;
    let target = ScimTarget::new(
        ScimGroupClient::new(scim.clone()).with_page_size(config.netskope.page_size),
        GroupPatcher::new(scim),
    );

    let options = ReconcileOptions {
        dry_run: cli.dry_run,
    };
    let reconciler = Reconciler::new(source, target, options);
    let groups = config.groups();
    info!(
        entra_group = %groups.source_group,
        netskope_group = %groups.target_group,
        dry_run = cli.dry_run,
        "Starting reconciliation"
    );

    let report = if cli.confirm {
        reconciler.run(&groups, &PromptConfirm).await?
    } else {
        reconciler.run(&groups, &AlwaysConfirm).await?
    };
    Ok(report)
}
