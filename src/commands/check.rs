use super::{load_table, pick_prefix};
use crate::chapters::{self, SplitOptions};
use crate::cli::RangeSource;
use crate::pdf::PdfDocument;
use anyhow::Result;
use std::path::Path;

pub fn run<P: AsRef<Path>>(
    path: P,
    source: &RangeSource,
    output_dir: P,
    prefix: Option<String>,
    json: bool,
) -> Result<()> {
    let table = load_table(source)?;
    let doc = PdfDocument::open(&path)?;

    let options = SplitOptions {
        output_dir: output_dir.as_ref().to_path_buf(),
        prefix: pick_prefix(prefix, &table),
        ..Default::default()
    };
    let plans = chapters::plan(&doc, &table.chapters, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&plans)?);
    } else {
        println!("Source: {} ({} pages)", path.as_ref().display(), doc.page_count());
        for p in &plans {
            match (&p.pages, &p.error) {
                (Some(pages), _) => println!(
                    "  #{} {} -> {} ({} page(s)){}",
                    p.index,
                    p.range,
                    p.artifact.display(),
                    pages,
                    if p.exists { " [exists]" } else { "" }
                ),
                (None, Some(error)) => eprintln!("  #{} {} INVALID: {}", p.index, p.range, error),
                (None, None) => {}
            }
        }
    }

    let invalid = plans.iter().filter(|p| p.error.is_some()).count();
    if invalid > 0 {
        anyhow::bail!("{} of {} range(s) are invalid", invalid, plans.len());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::fixtures::write_sample;

    fn ranges(s: &str) -> RangeSource {
        RangeSource {
            ranges: Some(s.to_string()),
            table: None,
        }
    }

    #[test]
    fn test_check_accepts_valid_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "book.pdf", 10);
        let out = dir.path().join("out");

        run(&path, &ranges("1-3,4-end"), &out, None, false).unwrap();
        assert!(!out.exists());
    }

    #[test]
    fn test_check_rejects_out_of_bounds() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_sample(dir.path(), "book.pdf", 5);
        let out = dir.path().join("out");

        let err = run(&path, &ranges("1-2,3-7"), &out, None, true).unwrap_err();
        assert!(err.to_string().contains("1 of 2"));
    }
}
