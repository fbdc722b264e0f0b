//! Range tables: the externally supplied list of chapters to cut.
//!
//! A table comes from an inline string (`"3-20,21-76"`) or from a TOML or
//! JSON file. Both file formats accept the same shape:
//!
//! ```toml
//! prefix = "chapter"
//!
//! [[chapter]]
//! title = "The Python Data Model"
//! start = 3
//! end = 20
//! ```
//!
//! Entries may also be written as `[start, end]` pairs or as range strings,
//! and a JSON file may be a bare array of entries.

use crate::error::{Result, SplitError};
use crate::page_range::{parse_chapter_ranges, ChapterRange, PageRef};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeTable {
    /// Artifact name prefix requested by the table, if any
    pub prefix: Option<String>,
    pub chapters: Vec<ChapterRange>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableFile {
    List(Vec<RangeEntry>),
    Table {
        #[serde(default)]
        prefix: Option<String>,
        #[serde(default, rename = "chapter", alias = "chapters")]
        chapters: Vec<RangeEntry>,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RangeEntry {
    Pair(PageRef, PageRef),
    Spec(String),
    Range(ChapterRange),
}

impl RangeEntry {
    fn into_range(self) -> Result<ChapterRange> {
        match self {
            RangeEntry::Pair(start, end) => Ok(ChapterRange {
                title: None,
                start,
                end,
            }),
            RangeEntry::Spec(s) => ChapterRange::parse(&s),
            RangeEntry::Range(range) => Ok(range),
        }
    }
}

impl TableFile {
    fn into_table(self) -> Result<RangeTable> {
        let (prefix, entries) = match self {
            TableFile::List(entries) => (None, entries),
            TableFile::Table { prefix, chapters } => (prefix, chapters),
        };

        let chapters = entries
            .into_iter()
            .map(RangeEntry::into_range)
            .collect::<Result<Vec<_>>>()?;

        RangeTable { prefix, chapters }.non_empty()
    }
}

impl RangeTable {
    /// Parse an inline, comma-separated range list
    pub fn from_inline(s: &str) -> Result<Self> {
        RangeTable {
            prefix: None,
            chapters: parse_chapter_ranges(s)?,
        }
        .non_empty()
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        let file: TableFile =
            toml::from_str(s).map_err(|e| SplitError::InvalidTable(e.to_string()))?;
        file.into_table()
    }

    pub fn from_json(s: &str) -> Result<Self> {
        let file: TableFile =
            serde_json::from_str(s).map_err(|e| SplitError::InvalidTable(e.to_string()))?;
        file.into_table()
    }

    /// Load a table file, picking the format from its extension
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            SplitError::InvalidTable(format!("cannot read {}: {}", path.display(), e))
        })?;

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("toml") => Self::from_toml(&text),
            Some("json") => Self::from_json(&text),
            _ => Self::from_toml(&text).or_else(|_| Self::from_json(&text)),
        }
    }

    fn non_empty(self) -> Result<Self> {
        if self.chapters.is_empty() {
            return Err(SplitError::InvalidTable("no chapter ranges given".to_string()));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline() {
        let table = RangeTable::from_inline("3-20,21-76").unwrap();
        assert_eq!(table.prefix, None);
        assert_eq!(
            table.chapters,
            vec![ChapterRange::new(3, 20), ChapterRange::new(21, 76)]
        );
    }

    #[test]
    fn test_toml_tables() {
        let table = RangeTable::from_toml(
            r#"
            prefix = "fluent"

            [[chapter]]
            title = "The Python Data Model"
            start = 3
            end = 20

            [[chapter]]
            start = 907
            end = "end"
            "#,
        )
        .unwrap();

        assert_eq!(table.prefix.as_deref(), Some("fluent"));
        assert_eq!(table.chapters.len(), 2);
        assert_eq!(
            table.chapters[0].title.as_deref(),
            Some("The Python Data Model")
        );
        assert_eq!(table.chapters[1].start, PageRef::Number(907));
        assert_eq!(table.chapters[1].end, PageRef::End);
    }

    #[test]
    fn test_toml_pairs_and_strings() {
        let table = RangeTable::from_toml(r#"chapter = [[1, 3], "4-end"]"#).unwrap();
        assert_eq!(table.chapters[0], ChapterRange::new(1, 3));
        assert_eq!(table.chapters[1].end, PageRef::End);
    }

    #[test]
    fn test_json_bare_list() {
        let table =
            RangeTable::from_json(r#"[[1, 3], {"start": 4, "end": 10, "title": "Two"}]"#).unwrap();
        assert_eq!(table.chapters[0], ChapterRange::new(1, 3));
        assert_eq!(table.chapters[1].title.as_deref(), Some("Two"));
        assert_eq!(table.chapters[1].resolve(2, 10).unwrap(), (4, 10));
    }

    #[test]
    fn test_json_object() {
        let table = RangeTable::from_json(r#"{"prefix": "part", "chapters": ["2-2"]}"#).unwrap();
        assert_eq!(table.prefix.as_deref(), Some("part"));
        assert_eq!(table.chapters, vec![ChapterRange::new(2, 2)]);
    }

    #[test]
    fn test_empty_table_is_rejected() {
        assert!(matches!(
            RangeTable::from_json("[]"),
            Err(SplitError::InvalidTable(_))
        ));
        assert!(RangeTable::from_toml("prefix = \"x\"").is_err());
    }

    #[test]
    fn test_bad_keyword_is_rejected() {
        assert!(RangeTable::from_json(r#"[[1, "last"]]"#).is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("chapters.toml");
        std::fs::write(&toml_path, "chapter = [[1, 2]]").unwrap();
        assert_eq!(RangeTable::load(&toml_path).unwrap().chapters.len(), 1);

        let other = dir.path().join("chapters.txt");
        std::fs::write(&other, r#"[[1, 2], [3, 4]]"#).unwrap();
        assert_eq!(RangeTable::load(&other).unwrap().chapters.len(), 2);

        assert!(RangeTable::load(dir.path().join("missing.toml")).is_err());
    }
}
