//! Run orchestrator.
//!
//! Processes every configured category in turn: validate, fetch, rank,
//! export. A failing category is recorded and the run moves on.

use crate::category::Category;
use crate::error::Result;
use crate::exporter;
use crate::fetcher::MediaSource;
use crate::ranker;
use chrono::{DateTime, Utc};
use shared::{CategoryConfig, OutputPaths, PagingConfig, RankingCriterion};
use std::path::PathBuf;
use tracing::{error, info};

/// Process exit status when every category succeeded
pub const EXIT_SUCCESS: u8 = 0;
/// Process exit status when at least one category failed
pub const EXIT_CATEGORY_FAILED: u8 = 1;
/// Process exit status when the run could not start
pub const EXIT_STARTUP_FAILED: u8 = 2;

/// Everything a run needs, passed explicitly to each step
pub struct RunContext<S> {
    /// Where records come from
    pub source: S,
    /// Paging applied to every category
    pub paging: PagingConfig,
    /// Where CSV files go
    pub paths: OutputPaths,
}

/// A successfully exported category
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub rows: usize,
    pub criterion: RankingCriterion,
}

/// Result of one category
#[derive(Debug)]
pub struct CategoryOutcome {
    pub name: String,
    pub result: Result<ExportSummary>,
}

/// Result of a whole run, outcomes in config order
#[derive(Debug)]
pub struct RunReport {
    pub outcomes: Vec<CategoryOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &ExportSummary)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().map(|s| (o.name.as_str(), s)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &crate::error::Error)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.name.as_str(), e)))
    }

    /// True when every category was exported
    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Exit status for the process that ran this report
    pub fn exit_status(&self) -> u8 {
        if self.is_success() {
            EXIT_SUCCESS
        } else {
            EXIT_CATEGORY_FAILED
        }
    }

    pub fn total_rows(&self) -> usize {
        self.succeeded().map(|(_, s)| s.rows).sum()
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Runs categories against a media source
pub struct RankingRunner<S: MediaSource> {
    context: RunContext<S>,
}

impl<S: MediaSource> RankingRunner<S> {
    pub fn new(context: RunContext<S>) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &RunContext<S> {
        &self.context
    }

    /// Run every category, sequentially and in order
    pub async fn run(&mut self, categories: &[CategoryConfig]) -> RunReport {
        let started_at = Utc::now();
        info!(categories = categories.len(), output = %self.context.paths.root().display(), "Starting ranking run");

        let mut outcomes = Vec::with_capacity(categories.len());

        for (idx, config) in categories.iter().enumerate() {
            info!(
                progress = format!("{}/{}", idx + 1, categories.len()),
                category = %config.name,
                "Processing category"
            );

            let result = self.run_category(config).await;
            if let Err(e) = &result {
                error!(
                    category = %config.name,
                    kind = e.kind(),
                    error = %e,
                    "Category failed"
                );
            }

            outcomes.push(CategoryOutcome {
                name: config.name.clone(),
                result,
            });
        }

        let report = RunReport {
            outcomes,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            succeeded = report.succeeded().count(),
            failed = report.failed().count(),
            rows = report.total_rows(),
            elapsed_ms = report.elapsed().num_milliseconds(),
            "Ranking run complete"
        );

        report
    }

    async fn run_category(&mut self, config: &CategoryConfig) -> Result<ExportSummary> {
        let category = Category::from_config(config)?;

        let records = self
            .context
            .source
            .fetch(&category.filter, &category.criterion, self.context.paging)
            .await?;

        let list = ranker::rank_list(&category.name, records, category.criterion);
        let path = self.context.paths.csv_file(&category.name);
        let rows = exporter::export(&list, &path)?;

        Ok(ExportSummary {
            path,
            rows,
            criterion: category.criterion,
        })
    }
}
