//! Run command implementation
//!
//! This module implements the `run` command: connect to the configured
//! store, make sure the database and container exist, then loop over the
//! interactive menu until the operator exits or a shutdown signal arrives.

use crate::adapters::database::create_document_store;
use crate::cli::menu::{build_command, MenuAction, PromptError, Prompter};
use crate::config::{load_config, StoreTarget, WorkloadConfig};
use crate::core::OperationHarness;
use crate::domain::{HarnessError, PartitionKeyValue};
use crate::generator::{PartitionStrategy, PersonGenerator};
use clap::{Args, ValueEnum};
use std::str::FromStr;
use std::time::Duration;
use tokio::io::{AsyncBufRead, BufReader};
use tokio::sync::watch;

/// Pause between menu iterations
const ITERATION_PAUSE: Duration = Duration::from_secs(1);

/// Partition key assignment for generated writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum StrategyArg {
    /// Spread keys over `workload.partition_key_values`
    #[default]
    Distributed,
    /// Pin every key to `workload.hot_partition_key`
    Hot,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Override the store target (cosmosdb or memory)
    #[arg(long, value_parser = StoreTarget::from_str)]
    pub store: Option<StoreTarget>,

    /// Seed generated field values for reproducible data
    #[arg(long)]
    pub seed: Option<u64>,

    /// Partition key strategy for write and bulk actions
    #[arg(long, value_enum, default_value_t = StrategyArg::Distributed)]
    pub partition_strategy: StrategyArg,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        let mut config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Error: {e}");
                return Ok(2);
            }
        };

        if let Some(store) = self.store {
            tracing::info!(store = ?store, "Overriding store target from CLI");
            config.store_target = store;
            if let Err(e) = config.validate() {
                eprintln!("Error: invalid configuration: {e}");
                return Ok(2);
            }
        }

        let strategy = match self.strategy(&config.workload) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error: {e}");
                return Ok(2);
            }
        };

        let store = match create_document_store(&config) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create document store");
                eprintln!("Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let harness = OperationHarness::new(store, shutdown_signal.clone());
        if let Err(e) = harness.prepare().await {
            tracing::error!(error = %e, "Failed to prepare database and container");
            eprintln!("Error: {e}");
            return Ok(4);
        }

        let mut generator = PersonGenerator::new(strategy);
        if let Some(seed) = self.seed {
            generator = generator.with_seed(seed);
        }

        println!(
            "Connected to {} store. Database and container are ready.",
            harness.store().backend_name()
        );

        let stdin = BufReader::new(tokio::io::stdin());
        let mut prompter = Prompter::new(stdin, true);
        let executed = run_menu(
            &harness,
            &mut generator,
            &mut prompter,
            &config.workload,
            shutdown_signal,
            ITERATION_PAUSE,
        )
        .await;

        tracing::info!(commands = executed, "Harness stopped");
        println!("Goodbye.");
        Ok(0)
    }

    fn strategy(&self, workload: &WorkloadConfig) -> Result<PartitionStrategy, String> {
        match self.partition_strategy {
            StrategyArg::Distributed => {
                PartitionStrategy::distributed(workload.partition_key_values.iter().cloned())
            }
            StrategyArg::Hot => Ok(PartitionStrategy::hot(PartitionKeyValue::new(
                workload.hot_partition_key.clone(),
            )?)),
        }
    }
}

/// Map a startup error to its process exit code
fn exit_code_for(err: &HarnessError) -> i32 {
    match err {
        HarnessError::Configuration(_) => 2,
        HarnessError::StoreConnection(_) | HarnessError::Store(_) => 4,
        _ => 5,
    }
}

/// Drive the menu until exit, end of input, or shutdown
///
/// Returns the number of commands executed.
pub async fn run_menu<R: AsyncBufRead + Unpin>(
    harness: &OperationHarness,
    generator: &mut PersonGenerator,
    prompter: &mut Prompter<R>,
    workload: &WorkloadConfig,
    mut shutdown: watch::Receiver<bool>,
    pause: Duration,
) -> usize {
    let mut executed = 0;

    loop {
        if *shutdown.borrow() {
            tracing::info!("Shutdown requested, leaving menu");
            break;
        }

        prompter.show(&MenuAction::render());
        let answer = tokio::select! {
            _ = shutdown.changed() => break,
            answer = prompter.ask("> ") => answer,
        };

        let line = match answer {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::error!(error = %e, "Failed to read menu selection");
                break;
            }
        };

        let action = match MenuAction::from_str(&line) {
            Ok(action) => action,
            Err(e) => {
                tracing::error!(input = %line, "Invalid menu selection");
                prompter.show(&e);
                continue;
            }
        };

        let command = match build_command(action, prompter, workload).await {
            Ok(Some(command)) => command,
            Ok(None) | Err(PromptError::EndOfInput) => break,
            Err(PromptError::Invalid(msg)) => {
                tracing::error!(action = %action, error = %msg, "Invalid input");
                prompter.show(&msg);
                continue;
            }
        };

        let report = command.execute(harness, generator).await;
        println!("{}", report.summary());
        executed += 1;

        tokio::select! {
            _ = tokio::time::sleep(pause) => {}
            _ = shutdown.changed() => {}
        }
    }

    executed
}
