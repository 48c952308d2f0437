//! `namelock simulate`: contending workers on one named lock.

use crate::config::{LockOptions, LockOptionsPatch, OverflowStrategy, QueueLimit, RegistryConfig};
use crate::constants::SIMULATION_DEADLINE;
use crate::registry::LockRegistry;
use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Arguments of `namelock simulate`.
#[derive(Args, Debug)]
pub struct SimulateCommand {
    /// Lock name the workers contend for
    #[arg(long, default_value = "demo")]
    name: String,

    /// Number of contending workers
    #[arg(short, long, default_value_t = 5)]
    workers: usize,

    /// How long each worker holds the lock, in milliseconds
    #[arg(long, default_value_t = 50)]
    hold_ms: u64,

    /// Give up waiting after this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Maximum queued waiters (positive integer or "unbounded")
    #[arg(long)]
    max_queue_size: Option<QueueLimit>,

    /// Overflow strategy: this, first or last
    #[arg(long)]
    strategy: Option<OverflowStrategy>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Outcome of a simulation run.
#[derive(Debug, Serialize)]
pub struct SimulationReport {
    /// Lock name
    pub name: String,
    /// Options in effect during the run
    pub options: LockOptions,
    /// Workers that ran, in the order they held the lock
    pub ran: Vec<usize>,
    /// Workers dropped by timeout or overflow eviction
    pub dropped: Vec<usize>,
    /// Wall time of the whole run in milliseconds
    pub elapsed_ms: u128,
}

impl SimulateCommand {
    /// Run the simulation and print the report.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        if self.workers == 0 {
            anyhow::bail!("--workers must be at least 1");
        }

        let config = RegistryConfig::load_with_optional(config_path).await?;
        let registry = LockRegistry::with_config(config)?;

        let mut patch = LockOptionsPatch::new();
        if let Some(limit) = self.max_queue_size {
            patch = patch.max_queue_size(limit);
        }
        if let Some(strategy) = self.strategy {
            patch = patch.overflow_strategy(strategy);
        }
        let options = registry.set_options(&self.name, patch)?;

        let report = self.run(&registry, options).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            self.print(&report);
        }
        Ok(())
    }

    async fn run(&self, registry: &LockRegistry, options: LockOptions) -> Result<SimulationReport> {
        let hold = Duration::from_millis(self.hold_ms);
        let timeout = self.timeout_ms.map(Duration::from_millis);
        let (done, mut finished) = mpsc::unbounded_channel();
        let started = Instant::now();

        tracing::info!("Starting {} workers on lock '{}'", self.workers, self.name);
        for worker in 0..self.workers {
            let done = done.clone();
            registry.lock(
                &self.name,
                move |guard| {
                    tokio::spawn(async move {
                        tokio::time::sleep(hold).await;
                        guard.release();
                        let _ = done.send(worker);
                    });
                },
                timeout,
            )?;
        }
        // Dropped waiters release their sender once purged from the queue
        drop(done);

        let budget = hold.saturating_mul(u32::try_from(self.workers).unwrap_or(u32::MAX));
        let deadline = SIMULATION_DEADLINE.max(budget.saturating_mul(2));
        let mut ran = Vec::new();
        tokio::time::timeout(deadline, async {
            while let Some(worker) = finished.recv().await {
                ran.push(worker);
            }
        })
        .await
        .context("Simulation did not settle before the deadline")?;

        let dropped = (0..self.workers).filter(|w| !ran.contains(w)).collect();
        Ok(SimulationReport {
            name: self.name.clone(),
            options,
            ran,
            dropped,
            elapsed_ms: started.elapsed().as_millis(),
        })
    }

    fn print(&self, report: &SimulationReport) {
        let timeout = self.timeout_ms.map_or_else(|| "none".to_string(), |ms| format!("{ms}ms"));
        println!(
            "{} {} workers on lock '{}' (hold {}ms, timeout {}, max_queue_size {}, overflow {})",
            "Simulating".bold(),
            self.workers,
            report.name,
            self.hold_ms,
            timeout,
            report.options.max_queue_size,
            report.options.overflow_strategy
        );

        for worker in &report.ran {
            println!("  {} worker {worker} ran", "✓".green());
        }
        for worker in &report.dropped {
            println!("  {} worker {worker} dropped", "✗".red());
        }

        println!(
            "\nRan {}/{} workers in {}ms",
            report.ran.len().to_string().bold(),
            self.workers,
            report.elapsed_ms
        );
    }
}
