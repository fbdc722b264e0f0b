use super::{load_table, pick_prefix};
use crate::chapters::{self, ErrorPolicy, RangeOutcome, SplitOptions, SplitReport};
use crate::cli::RangeSource;
use crate::pdf::PdfDocument;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

pub struct SplitArgs {
    pub path: PathBuf,
    pub source: RangeSource,
    pub output_dir: PathBuf,
    pub prefix: Option<String>,
    pub keep_going: bool,
    pub force: bool,
    pub jobs: usize,
    pub json: bool,
}

pub async fn run(args: SplitArgs) -> Result<()> {
    let table = load_table(&args.source)?;
    let doc = PdfDocument::open(&args.path)?;

    let options = SplitOptions {
        output_dir: args.output_dir,
        prefix: pick_prefix(args.prefix, &table),
        policy: if args.keep_going {
            ErrorPolicy::Continue
        } else {
            ErrorPolicy::FailFast
        },
        overwrite: args.force,
        jobs: args.jobs.max(1),
    };

    let report = if options.jobs > 1 {
        chapters::split_concurrent(Arc::new(doc), table.chapters, options).await?
    } else {
        chapters::split(&doc, &table.chapters, &options)?
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} range(s) were not written",
            report.ranges.len() - report.succeeded(),
            report.ranges.len()
        );
    }

    Ok(())
}

fn print_report(report: &SplitReport) {
    println!(
        "Source: {} ({} pages)",
        report.source.display(),
        report.total_pages
    );

    for r in &report.ranges {
        match &r.outcome {
            RangeOutcome::Written { pages } => println!(
                "  #{} {} -> {} ({} page(s))",
                r.index,
                r.range,
                r.artifact.display(),
                pages
            ),
            RangeOutcome::Failed { message, .. } => {
                eprintln!("  #{} {} FAILED: {}", r.index, r.range, message)
            }
            RangeOutcome::Skipped => println!("  #{} {} skipped", r.index, r.range),
        }
    }

    println!(
        "\n{} succeeded, {} failed, {} skipped",
        report.succeeded(),
        report.failed(),
        report.skipped()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::write_sample;

    fn args(path: PathBuf, ranges: &str, output_dir: PathBuf) -> SplitArgs {
        SplitArgs {
            path,
            source: RangeSource {
                ranges: Some(ranges.to_string()),
                table: None,
            },
            output_dir,
            prefix: None,
            keep_going: false,
            force: false,
            jobs: 1,
            json: false,
        }
    }

    #[tokio::test]
    async fn test_run_writes_chapters() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "book.pdf", 10);
        let out = dir.path().join("out");

        run(args(path, "1-3,4-10", out.clone())).await.unwrap();
        assert!(out.join("chapter_1.pdf").exists());
        assert!(out.join("chapter_2.pdf").exists());
    }

    #[tokio::test]
    async fn test_run_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "book.pdf", 5);
        let out = dir.path().join("out");

        let err = run(args(path, "3-7", out.clone())).await.unwrap_err();
        assert!(err.to_string().contains("1 of 1"));
        assert!(!out.join("chapter_1.pdf").exists());
    }

    #[tokio::test]
    async fn test_run_uses_table_prefix_and_jobs() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "book.pdf", 6);
        let table = dir.path().join("chapters.toml");
        std::fs::write(
            &table,
            "prefix = \"part\"\nchapter = [[1, 2], [3, 4], [5, \"end\"]]\n",
        )
        .unwrap();
        let out = dir.path().join("out");

        let mut split_args = args(path, "", out.clone());
        split_args.source = RangeSource {
            ranges: None,
            table: Some(table),
        };
        split_args.jobs = 2;
        run(split_args).await.unwrap();

        for n in 1..=3 {
            assert!(out.join(format!("part_{}.pdf", n)).exists());
        }
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        std::fs::write(&path, b"").unwrap();

        let err = run(args(path, "1-1", dir.path().join("out")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid source"));
    }
}
