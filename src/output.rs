//! CLI output formatting for every command.
//!
//! # Output Format
//!
//! ## extend
//!
//! ```text
//! Resized to requested dimensions with aspect ratio preserved: 1080x1350
//! Saved (thr=243) to out/shoe.jpg
//! ```
//!
//! ## crop
//!
//! ```text
//! Image cropped successfully: out/shoe-story.jpg
//! Original size: 3000x2000
//! Crop area: 500,0 2000x2000
//! Scale factor: 0.5
//! Output size: 1080x1920
//! ```
//!
//! ## matte
//!
//! ```text
//! Matte created successfully: out/shoe-framed.png
//! ```
//!
//! ## probe
//!
//! ```text
//! shoe.jpg
//!     Size: 3000x2000
//!     Threshold: 243 (auto)
//!     Foreground: rows 410-1580 (1171 rows)
//! ```
//!
//! ## batch
//!
//! ```text
//! [2/3] extend shoe.jpg → out/shoe.jpg
//!     Saved (thr=243) to out/shoe.jpg
//! [1/3] matte bag.jpg FAILED
//!     could not read input image bag.jpg: IO error: No such file or directory (os error 2)
//!
//! Batch complete: 2 succeeded, 1 failed
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability. Format functions are pure: no I/O, no side effects. `main`
//! does the printing.

use crate::batch::{BatchEvent, BatchSummary, JobOp};
use crate::imaging::OpReport;
use crate::imaging::crop::CropReport;
use crate::imaging::extend::{ExtendReport, FinalFit};
use crate::imaging::operations::ProbeReport;
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dims((w, h): (u32, u32)) -> String {
    format!("{w}x{h}")
}

// ============================================================================
// Single operations
// ============================================================================

/// Summary of a finished extension.
pub fn format_extend_report(
    report: &ExtendReport,
    output: &Path,
    requested: Option<(u32, u32)>,
) -> Vec<String> {
    let mut lines = Vec::new();
    match (report.final_fit, requested) {
        (Some(FinalFit::Centered { .. }), Some(size)) => lines.push(format!(
            "Resized to requested dimensions with aspect ratio preserved: {}",
            dims(size)
        )),
        (Some(FinalFit::Stretched), Some(size)) => lines.push(format!(
            "Resized to requested dimensions (fallback): {}",
            dims(size)
        )),
        _ => {}
    }
    lines.push(format!(
        "Saved (thr={}) to {}",
        report.threshold.value,
        output.display()
    ));
    lines
}

/// Summary of a finished crop-scale-center.
pub fn format_crop_report(report: &CropReport, output: &Path) -> Vec<String> {
    let crop = report.crop;
    vec![
        format!("Image cropped successfully: {}", output.display()),
        format!("Original size: {}", dims(report.original)),
        format!(
            "Crop area: {},{} {}x{}",
            crop.x, crop.y, crop.width, crop.height
        ),
        format!("Scale factor: {}", report.scale),
        format!("Output size: {}", dims(report.output)),
    ]
}

/// Summary of a finished matte.
pub fn format_matte_report(output: &Path) -> Vec<String> {
    vec![format!("Matte created successfully: {}", output.display())]
}

/// Summary lines for any finished operation.
pub fn format_report(
    report: &OpReport,
    output: &Path,
    requested: Option<(u32, u32)>,
) -> Vec<String> {
    match report {
        OpReport::Extend(r) => format_extend_report(r, output, requested),
        OpReport::Crop(r) => format_crop_report(r, output),
        OpReport::Matte(_) => format_matte_report(output),
    }
}

// ============================================================================
// Probe
// ============================================================================

/// Diagnostic view of an image's threshold and foreground rows.
pub fn format_probe(input: &Path, report: &ProbeReport) -> Vec<String> {
    let mut lines = vec![
        input.display().to_string(),
        format!("{}Size: {}", indent(1), dims(report.dimensions)),
        format!(
            "{}Threshold: {} ({})",
            indent(1),
            report.threshold.value,
            report.threshold.source
        ),
    ];
    lines.push(match report.bounds {
        Some(b) => format!(
            "{}Foreground: rows {}-{} ({} rows)",
            indent(1),
            b.top,
            b.bottom,
            b.height()
        ),
        None => format!("{}Foreground: not found (try lowering threshold)", indent(1)),
    });
    lines
}

// ============================================================================
// Batch
// ============================================================================

/// Format a single batch progress event as display lines.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Completed {
            index,
            total,
            job,
            report,
        } => {
            let mut lines = vec![format!(
                "[{index}/{total}] {} {} → {}",
                job_op_name(&job.op),
                job.input.display(),
                job.output.display()
            )];
            let requested = match &job.op {
                JobOp::Extend(req) => req
                    .requested_width
                    .zip(req.requested_height)
                    .and_then(|(w, h)| Some((u32::try_from(w).ok()?, u32::try_from(h).ok()?))),
                _ => None,
            };
            lines.extend(
                format_report(report, &job.output, requested)
                    .into_iter()
                    .map(|l| format!("{}{l}", indent(1))),
            );
            lines
        }
        BatchEvent::Failed {
            index,
            total,
            job,
            error,
        } => vec![
            format!(
                "[{index}/{total}] {} {} FAILED",
                job_op_name(&job.op),
                job.input.display()
            ),
            format!("{}{error}", indent(1)),
        ],
    }
}

fn job_op_name(op: &JobOp) -> &'static str {
    match op {
        JobOp::Extend(_) => "extend",
        JobOp::Crop(_) => "crop",
        JobOp::Matte(_) => "matte",
    }
}

/// Closing summary of a batch run; failures are repeated in file order.
pub fn format_batch_summary(summary: &BatchSummary) -> Vec<String> {
    let mut lines = vec![
        String::new(),
        format!(
            "Batch complete: {} succeeded, {} failed",
            summary.succeeded,
            summary.failures.len()
        ),
    ];
    for failure in &summary.failures {
        lines.push(format!(
            "{}#{} {}: {}",
            indent(1),
            failure.index,
            failure.input.display(),
            failure.error
        ));
    }
    lines
}
