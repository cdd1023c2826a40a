//! Sequential batch over the configured year × month × parameter grid.
//!
//! Requests are built and submitted one at a time. The year directory is
//! passed explicitly into each retrieval as part of the target path.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use crate::client::Retrieve;
use crate::config::{BatchConfig, ErrorPolicy};
use crate::directory::DirectoryManager;
use crate::error::Result;
use crate::request::RequestBuilder;

/// Grid coordinate of one request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestKey {
    pub year: i32,
    pub month: u32,
    pub parameter: String,
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02} {}", self.year, self.month, self.parameter)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub key: RequestKey,
    pub target: PathBuf,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failed {
    pub key: RequestKey,
    pub error: String,
}

/// What happened to every request of a batch.
#[derive(Debug, Clone)]
pub struct BatchReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub total: usize,
    pub completed: Vec<Completed>,
    pub failed: Vec<Failed>,
    /// Set when the batch stopped before the end of the grid.
    pub aborted: Option<String>,
}

impl BatchReport {
    fn new(total: usize) -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            total,
            completed: Vec::new(),
            failed: Vec::new(),
            aborted: None,
        }
    }

    /// Requests never submitted because the batch was aborted.
    pub fn not_attempted(&self) -> usize {
        self.total - self.completed.len() - self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.aborted.is_none()
    }

    pub fn bytes(&self) -> u64 {
        self.completed.iter().map(|c| c.size_bytes).sum()
    }
}

impl fmt::Display for BatchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} of {} requests completed ({} bytes), {} failed, {} not attempted in {}s",
            self.completed.len(),
            self.total,
            self.bytes(),
            self.failed.len(),
            self.not_attempted(),
            (self.finished_at - self.started_at).num_seconds()
        )?;
        for failed in &self.failed {
            writeln!(f, "  failed {}: {}", failed.key, failed.error)?;
        }
        if let Some(reason) = &self.aborted {
            writeln!(f, "  aborted: {reason}")?;
        }
        Ok(())
    }
}

/// Run the whole grid described by `config` through `client`.
///
/// Configuration errors are returned before any request is issued. Failures
/// after that are recorded in the report; whether the batch keeps going
/// depends on `config.on_error`. A year directory that cannot be created
/// always aborts.
pub fn run<R: Retrieve + ?Sized>(config: &BatchConfig, client: &R) -> Result<BatchReport> {
    config.validate()?;

    let builder = RequestBuilder::new(config.archive);
    let dataset = config.archive.dataset();
    let mut dirs = DirectoryManager::new(&config.output_root);
    let mut report = BatchReport::new(config.request_count());

    info!(
        archive = %config.archive,
        years = ?config.years,
        months = ?config.months,
        parameters = ?config.parameters,
        requests = report.total,
        "starting batch"
    );

    'grid: for year in config.years() {
        let dir = match dirs.ensure_year(year) {
            Ok(dir) => dir,
            Err(e) => {
                error!(year, "{e}");
                report.aborted = Some(e.to_string());
                break 'grid;
            }
        };
        if dir.created {
            info!(path = %dir.path.display(), "created year directory");
        }

        for month in config.months() {
            for code in &config.parameters {
                let key = RequestKey {
                    year,
                    month,
                    parameter: code.clone(),
                };

                let outcome = builder.build(year, month, code).and_then(|request| {
                    if !request.date_range.is_gregorian() {
                        warn!(
                            %key,
                            date = %request.date_range.end(),
                            "date range ends on a day the Gregorian calendar does not have"
                        );
                    }
                    let target = request.target_in(&dir.path);
                    info!(%key, target = %target.display(), "retrieving");
                    client.retrieve(dataset, &request.payload, &target)
                });

                match outcome {
                    Ok(retrieved) => {
                        info!(%key, bytes = retrieved.size_bytes, "retrieved");
                        report.completed.push(Completed {
                            key,
                            target: retrieved.target,
                            size_bytes: retrieved.size_bytes,
                        });
                    }
                    Err(e) => {
                        error!(%key, "retrieval failed: {e}");
                        report.failed.push(Failed {
                            key: key.clone(),
                            error: e.to_string(),
                        });
                        if config.on_error == ErrorPolicy::Abort {
                            report.aborted = Some(format!("request {key} failed"));
                            break 'grid;
                        }
                    }
                }
            }
        }
    }

    report.finished_at = Utc::now();
    info!(
        completed = report.completed.len(),
        failed = report.failed.len(),
        not_attempted = report.not_attempted(),
        "batch finished"
    );
    Ok(report)
}
