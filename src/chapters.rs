//! The chapter extractor: one artifact per range, named by range position.

use crate::error::{FailureKind, Result, SplitError};
use crate::page_range::ChapterRange;
use crate::pdf::PdfDocument;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

pub const DEFAULT_PREFIX: &str = "chapter";

/// What to do with the remaining ranges once one of them fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    #[default]
    FailFast,
    Continue,
}

#[derive(Debug, Clone)]
pub struct SplitOptions {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub policy: ErrorPolicy,
    /// Replace artifacts that already exist instead of failing
    pub overwrite: bool,
    /// Number of ranges processed at once by [`split_concurrent`]
    pub jobs: usize,
}

impl Default for SplitOptions {
    fn default() -> Self {
        SplitOptions {
            output_dir: PathBuf::from("."),
            prefix: DEFAULT_PREFIX.to_string(),
            policy: ErrorPolicy::FailFast,
            overwrite: false,
            jobs: 1,
        }
    }
}

impl SplitOptions {
    /// Artifact path for the range at 1-based `index`
    pub fn artifact_path(&self, index: usize) -> PathBuf {
        self.output_dir.join(format!("{}_{}.pdf", self.prefix, index))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RangeOutcome {
    Written { pages: u32 },
    Failed { kind: FailureKind, message: String },
    Skipped,
}

impl RangeOutcome {
    fn from_result(result: Result<u32>) -> Self {
        match result {
            Ok(pages) => RangeOutcome::Written { pages },
            Err(e) => RangeOutcome::Failed {
                kind: e.kind(),
                message: e.to_string(),
            },
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, RangeOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeReport {
    /// 1-based position in the range table
    pub index: usize,
    pub range: ChapterRange,
    pub artifact: PathBuf,
    #[serde(flatten)]
    pub outcome: RangeOutcome,
}

/// Result of a whole run, one entry per range in table order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitReport {
    pub source: PathBuf,
    pub total_pages: u32,
    pub ranges: Vec<RangeReport>,
}

impl SplitReport {
    pub fn succeeded(&self) -> usize {
        self.count(|o| matches!(o, RangeOutcome::Written { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(RangeOutcome::is_failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RangeOutcome::Skipped))
    }

    pub fn is_success(&self) -> bool {
        self.succeeded() == self.ranges.len()
    }

    fn count(&self, f: impl Fn(&RangeOutcome) -> bool) -> usize {
        self.ranges.iter().filter(|r| f(&r.outcome)).count()
    }
}

/// Planned artifact for one range, produced without writing anything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePlan {
    pub index: usize,
    pub range: ChapterRange,
    pub artifact: PathBuf,
    /// Resolved page count, when the range is valid
    pub pages: Option<u32>,
    pub error: Option<String>,
    /// Whether a file already sits at the artifact path
    pub exists: bool,
}

/// Validate every range against `source` and report what a split would write.
pub fn plan(source: &PdfDocument, ranges: &[ChapterRange], options: &SplitOptions) -> Vec<RangePlan> {
    let total = source.page_count();
    ranges
        .iter()
        .enumerate()
        .map(|(i, range)| {
            let index = i + 1;
            let artifact = options.artifact_path(index);
            let (pages, error) = match range.resolve(index, total) {
                Ok((start, end)) => (Some(end - start + 1), None),
                Err(e) => (None, Some(e.to_string())),
            };
            RangePlan {
                index,
                range: range.clone(),
                exists: artifact.exists(),
                artifact,
                pages,
                error,
            }
        })
        .collect()
}

/// Split `source` into one artifact per range, sequentially.
///
/// Per-range failures are recorded in the report. An `Err` is returned only
/// when nothing can be attempted at all: an empty range list or an output
/// directory that cannot be created.
pub fn split(source: &PdfDocument, ranges: &[ChapterRange], options: &SplitOptions) -> Result<SplitReport> {
    prepare(ranges, options)?;

    let mut halted = false;
    let mut reports = Vec::with_capacity(ranges.len());

    for (i, range) in ranges.iter().enumerate() {
        let index = i + 1;
        let outcome = if halted {
            RangeOutcome::Skipped
        } else {
            extract_one(source, index, range, options)
        };
        if outcome.is_failed() && options.policy == ErrorPolicy::FailFast {
            halted = true;
        }
        reports.push(RangeReport {
            index,
            range: range.clone(),
            artifact: options.artifact_path(index),
            outcome,
        });
    }

    Ok(finish(source, reports))
}

/// Like [`split`], but runs up to `options.jobs` ranges at once on the
/// blocking pool. The source is shared read-only between all of them.
///
/// Under [`ErrorPolicy::FailFast`] no range is started after a failure has
/// been observed; ranges already in flight still complete.
pub async fn split_concurrent(
    source: Arc<PdfDocument>,
    ranges: Vec<ChapterRange>,
    options: SplitOptions,
) -> Result<SplitReport> {
    prepare(&ranges, &options)?;

    let options = Arc::new(options);
    let semaphore = Arc::new(Semaphore::new(options.jobs.max(1)));
    let failed = Arc::new(AtomicBool::new(false));
    let mut outcomes: Vec<RangeOutcome> = vec![RangeOutcome::Skipped; ranges.len()];
    let mut tasks = JoinSet::new();

    for (i, range) in ranges.iter().enumerate() {
        let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
            break;
        };
        if options.policy == ErrorPolicy::FailFast && failed.load(Ordering::SeqCst) {
            break;
        }

        let source = Arc::clone(&source);
        let options = Arc::clone(&options);
        let failed = Arc::clone(&failed);
        let range = range.clone();
        tasks.spawn_blocking(move || {
            let _permit = permit;
            let outcome = extract_one(&source, i + 1, &range, &options);
            if outcome.is_failed() {
                failed.store(true, Ordering::SeqCst);
            }
            (i, outcome)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((i, outcome)) => outcomes[i] = outcome,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => log::warn!("range task cancelled: {}", e),
        }
    }

    let reports = ranges
        .into_iter()
        .zip(outcomes)
        .enumerate()
        .map(|(i, (range, outcome))| RangeReport {
            index: i + 1,
            artifact: options.artifact_path(i + 1),
            range,
            outcome,
        })
        .collect();

    Ok(finish(&source, reports))
}

fn prepare(ranges: &[ChapterRange], options: &SplitOptions) -> Result<()> {
    if ranges.is_empty() {
        return Err(SplitError::InvalidTable("no chapter ranges given".to_string()));
    }
    std::fs::create_dir_all(&options.output_dir)
        .map_err(|e| SplitError::io(&options.output_dir, e))
}

fn finish(source: &PdfDocument, ranges: Vec<RangeReport>) -> SplitReport {
    let report = SplitReport {
        source: source.path.clone(),
        total_pages: source.page_count(),
        ranges,
    };
    log::info!(
        "{}: {} succeeded, {} failed, {} skipped",
        report.source.display(),
        report.succeeded(),
        report.failed(),
        report.skipped()
    );
    report
}

fn extract_one(
    source: &PdfDocument,
    index: usize,
    range: &ChapterRange,
    options: &SplitOptions,
) -> RangeOutcome {
    let result = write_range(source, index, range, options);
    if let Err(e) = &result {
        log::warn!("skipping range {}: {}", range, e);
    }
    RangeOutcome::from_result(result)
}

fn write_range(
    source: &PdfDocument,
    index: usize,
    range: &ChapterRange,
    options: &SplitOptions,
) -> Result<u32> {
    let (start, end) = range.resolve(index, source.page_count())?;
    let artifact = options.artifact_path(index);

    let mut chapter = source.extract_range(start, end)?;
    PdfDocument::save_atomic(&mut chapter, &artifact, options.overwrite)?;

    let pages = end - start + 1;
    log::info!(
        "wrote {} ({} page(s), source pages {}-{})",
        artifact.display(),
        pages,
        start,
        end
    );
    Ok(pages)
}
