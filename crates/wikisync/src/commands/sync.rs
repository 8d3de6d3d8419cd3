//! `wikisync sync` command implementation.

use std::path::PathBuf;

use clap::Args;
use wikisync_config::{CliSettings, Config};
use wikisync_confluence::{ConfluenceClient, ContentApi, DryRunApi};
use wikisync_sync::{SyncReport, Synchronizer};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the sync command.
#[derive(Args)]
pub(crate) struct SyncArgs {
    /// Directory with the documents (overrides config).
    source_dir: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover wikisync.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Read from Confluence but only report the writes that would be made.
    #[arg(long)]
    dry_run: bool,

    /// Stop at the first document that fails.
    #[arg(long)]
    fail_fast: bool,

    /// Number of worker threads for leaf pages (overrides config).
    #[arg(short, long)]
    workers: Option<usize>,

    /// Minimum number of filename segments, 2 or 3 (overrides config).
    #[arg(long)]
    min_depth: Option<usize>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl SyncArgs {
    /// Execute the sync command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid, the run is aborted, or
    /// any document failed.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source_dir: self.source_dir.clone(),
            continue_on_error: self.fail_fast.then_some(false),
            workers: self.workers,
            min_depth: self.min_depth,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let client = ConfluenceClient::from_config(&config.confluence);
        tracing::info!(
            config = ?config.config_path,
            workers = config.sync_resolved.workers,
            continue_on_error = config.sync_resolved.continue_on_error,
            dry_run = self.dry_run,
            "Loaded configuration"
        );

        output.info(&format!(
            "Synchronizing {} to space {} at {}",
            config.sync_resolved.source_dir.display(),
            config.confluence.space_key,
            config.confluence.base_url
        ));

        let report = if self.dry_run {
            let api = DryRunApi::new(client);
            let report = run(&api, &config)?;
            output.highlight(&format!(
                "\n[DRY RUN] No changes made; {} write(s) planned.",
                api.planned_writes()
            ));
            report
        } else {
            run(&client, &config)?
        };

        output.report(&report);

        let failed = report.failed();
        report.into_result()?;
        if failed > 0 {
            return Err(CliError::DocumentsFailed(failed));
        }
        Ok(())
    }
}

fn run<A: ContentApi>(api: &A, config: &Config) -> Result<SyncReport, CliError> {
    Ok(Synchronizer::new(api, config).run()?)
}
