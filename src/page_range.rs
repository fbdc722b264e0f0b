use crate::error::{Result, SplitError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One endpoint of a chapter range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPageRef", into = "RawPageRef")]
pub enum PageRef {
    Number(u32),
    End,
}

impl PageRef {
    fn resolve(self, total_pages: u32) -> u32 {
        match self {
            PageRef::Number(n) => n,
            PageRef::End => total_pages,
        }
    }
}

impl fmt::Display for PageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageRef::Number(n) => write!(f, "{}", n),
            PageRef::End => f.write_str("end"),
        }
    }
}

// Tables write endpoints either as integers or as the keyword "end".
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawPageRef {
    Number(u32),
    Keyword(String),
}

impl TryFrom<RawPageRef> for PageRef {
    type Error = String;

    fn try_from(raw: RawPageRef) -> std::result::Result<Self, Self::Error> {
        match raw {
            RawPageRef::Number(n) => Ok(PageRef::Number(n)),
            RawPageRef::Keyword(s) => parse_page_ref(&s).map_err(|e| e.to_string()),
        }
    }
}

impl From<PageRef> for RawPageRef {
    fn from(page: PageRef) -> Self {
        match page {
            PageRef::Number(n) => RawPageRef::Number(n),
            PageRef::End => RawPageRef::Keyword("end".to_string()),
        }
    }
}

/// A contiguous, 1-based, inclusive span of pages that becomes one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub start: PageRef,
    pub end: PageRef,
}

impl ChapterRange {
    #[cfg(test)]
    pub fn new(start: u32, end: u32) -> Self {
        ChapterRange {
            title: None,
            start: PageRef::Number(start),
            end: PageRef::Number(end),
        }
    }

    /// Parse a range specification like "3-20", "7" or "907-end"
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SplitError::InvalidTable("empty page range".to_string()));
        }

        if let Some(dash_pos) = s.find('-') {
            // "-5" is not a range
            if dash_pos == 0 {
                return Err(SplitError::InvalidTable(format!("invalid page range: {}", s)));
            }

            let start = parse_page_ref(&s[..dash_pos])?;
            let end = parse_page_ref(&s[dash_pos + 1..])?;
            Ok(ChapterRange {
                title: None,
                start,
                end,
            })
        } else {
            let page = parse_page_ref(s)?;
            Ok(ChapterRange {
                title: None,
                start: page,
                end: page,
            })
        }
    }

    /// Resolve against a document of `total_pages` pages, enforcing
    /// `1 <= start <= end <= total_pages`. `index` is the 1-based position
    /// of this range in its table and is only used for error reporting.
    pub fn resolve(&self, index: usize, total_pages: u32) -> Result<(u32, u32)> {
        let start = self.start.resolve(total_pages);
        let end = self.end.resolve(total_pages);

        if start == 0 || start > end || end > total_pages {
            return Err(SplitError::RangeOutOfBounds {
                index,
                start,
                end,
                total: total_pages,
            });
        }

        Ok((start, end))
    }
}

impl fmt::Display for ChapterRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)?;
        if let Some(title) = &self.title {
            write!(f, " ({})", title)?;
        }
        Ok(())
    }
}

fn parse_page_ref(s: &str) -> Result<PageRef> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("end") {
        Ok(PageRef::End)
    } else {
        s.parse::<u32>()
            .map(PageRef::Number)
            .map_err(|_| SplitError::InvalidTable(format!("invalid page number: {}", s)))
    }
}

/// Parse a comma-separated list of chapter ranges like "3-20,21-76,907-end"
pub fn parse_chapter_ranges(s: &str) -> Result<Vec<ChapterRange>> {
    s.split(',').map(ChapterRange::parse).collect()
}
