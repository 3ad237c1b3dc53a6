//! Batch execution: many independent canvas jobs, run in parallel.
//!
//! A batch file is a JSON array of jobs. Each job names its operation in an
//! `op` tag, its input and output paths, and any operation fields it wants to
//! set; unset fields fall back to `canvas.toml` and then to built-in defaults.
//!
//! ```json
//! [
//!   {"op": "extend", "input": "a.jpg", "output": "a-tall.jpg", "desired_height": 1600},
//!   {"op": "crop", "input": "b.png", "output": "b-story.jpg", "crop_x": 100, "scale": 0.8},
//!   {"op": "matte", "input": "c.jpg", "output": "c-framed.png", "padding": 8, "color": "#f4f4f4"}
//! ]
//! ```
//!
//! ## Parallel Processing
//!
//! Jobs share nothing, so they run on the global [rayon](https://docs.rs/rayon)
//! pool (sized from `[processing] max_processes`). Progress events go over an
//! `mpsc` channel as each job finishes; completion order is not job order.
//! A failing job is reported and skipped, never fatal to the rest.

use crate::config::CanvasConfig;
use crate::imaging::params::{CropRequest, ExtendRequest, MatteRequest};
use crate::imaging::{CanvasError, CanvasOp, ImageBackend, OpReport, ValidationError, run};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// One entry of a batch file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub op: JobOp,
}

/// Operation fields of a job, tagged by `op`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum JobOp {
    Extend(ExtendRequest),
    Crop(CropRequest),
    Matte(MatteRequest),
}

impl JobOp {
    /// Fill unset fields from config, then validate.
    pub fn resolve(self, config: &CanvasConfig) -> Result<CanvasOp, ValidationError> {
        Ok(match self {
            Self::Extend(req) => CanvasOp::Extend(config.fill_extend(req).validate()?),
            Self::Crop(req) => CanvasOp::Crop(config.fill_crop(req).validate()?),
            Self::Matte(req) => CanvasOp::Matte(config.fill_matte(req).validate()?),
        })
    }
}

/// Progress event, one per finished job.
#[derive(Debug, Clone)]
pub enum BatchEvent {
    Completed {
        /// 1-based position in the batch file.
        index: usize,
        total: usize,
        job: Job,
        report: OpReport,
    },
    Failed {
        index: usize,
        total: usize,
        job: Job,
        error: String,
    },
}

/// A job that did not produce output.
#[derive(Debug, Clone, PartialEq)]
pub struct JobFailure {
    pub index: usize,
    pub input: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub succeeded: usize,
    /// Failures in batch-file order.
    pub failures: Vec<JobFailure>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Parse a batch file.
pub fn load_jobs(path: &Path) -> Result<Vec<Job>, BatchError> {
    let content = std::fs::read_to_string(path)?;
    let jobs: Vec<Job> = serde_json::from_str(&content)?;
    Ok(jobs)
}

fn run_job(backend: &impl ImageBackend, job: &Job, config: &CanvasConfig) -> Result<OpReport, CanvasError> {
    let op = job.op.clone().resolve(config)?;
    run(backend, &job.input, &job.output, &op, config.quality())
}

/// Run every job; returns once all have finished.
///
/// When `progress` is given, a [`BatchEvent`] is sent as each job finishes.
pub fn run_batch(
    backend: &impl ImageBackend,
    jobs: &[Job],
    config: &CanvasConfig,
    progress: Option<Sender<BatchEvent>>,
) -> BatchSummary {
    let total = jobs.len();
    log::debug!("running {total} batch jobs");

    let results: Vec<Result<OpReport, String>> = jobs
        .par_iter()
        .enumerate()
        .map_with(progress, |progress, (i, job)| {
            let index = i + 1;
            let result = run_job(backend, job, config).map_err(|e| e.to_string());
            if let Some(tx) = progress {
                let event = match &result {
                    Ok(report) => BatchEvent::Completed {
                        index,
                        total,
                        job: job.clone(),
                        report: report.clone(),
                    },
                    Err(error) => BatchEvent::Failed {
                        index,
                        total,
                        job: job.clone(),
                        error: error.clone(),
                    },
                };
                // The printer may have gone away; the summary still reports everything.
                tx.send(event).ok();
            }
            result
        })
        .collect();

    let mut summary = BatchSummary::default();
    for (i, (job, result)) in jobs.iter().zip(results).enumerate() {
        match result {
            Ok(_) => summary.succeeded += 1,
            Err(error) => summary.failures.push(JobFailure {
                index: i + 1,
                input: job.input.clone(),
                error,
            }),
        }
    }
    summary
}
