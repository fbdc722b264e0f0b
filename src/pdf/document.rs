use crate::error::{Result, SplitError};
use lopdf::{Document, Object, ObjectId};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A loaded, read-only source document.
pub struct PdfDocument {
    pub doc: Document,
    pub path: PathBuf,
}

impl PdfDocument {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let doc = Document::load(&path).map_err(|e| SplitError::InvalidSource {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::from_document(doc, path)
    }

    /// Wrap an already parsed document. Documents without pages are rejected.
    pub fn from_document(doc: Document, path: PathBuf) -> Result<Self> {
        let pdf = PdfDocument { doc, path };
        if pdf.page_count() == 0 {
            return Err(SplitError::InvalidSource {
                path: pdf.path,
                reason: "document has no pages".to_string(),
            });
        }
        Ok(pdf)
    }

    pub fn page_count(&self) -> u32 {
        self.doc.get_pages().len() as u32
    }

    /// Get 1-indexed page object IDs
    pub fn page_ids(&self) -> Vec<(u32, ObjectId)> {
        // get_pages is a BTreeMap, already ordered by page number
        self.doc.get_pages().into_iter().collect()
    }

    /// Copy pages `start..=end` (1-based) into a new document.
    ///
    /// The source is cloned and every page outside the range is deleted,
    /// so kept pages retain their resources and inherited attributes.
    /// Bookmarks and page labels describe the whole book and are dropped,
    /// and objects that are no longer reachable are pruned.
    pub fn extract_range(&self, start: u32, end: u32) -> Result<Document> {
        let total = self.page_count();
        if start == 0 || start > end || end > total {
            return Err(SplitError::RangeOutOfBounds {
                index: 0,
                start,
                end,
                total,
            });
        }

        let mut new_doc = self.doc.clone();

        let pages_to_delete: Vec<u32> = self
            .page_ids()
            .into_iter()
            .map(|(num, _)| num)
            .filter(|num| *num < start || *num > end)
            .collect();

        if !pages_to_delete.is_empty() {
            new_doc.delete_pages(&pages_to_delete);
        }

        let root = new_doc.trailer.get(b"Root").and_then(Object::as_reference);
        if let Ok(root_id) = root {
            if let Ok(catalog) = new_doc.get_dictionary_mut(root_id) {
                catalog.remove(b"Outlines");
                catalog.remove(b"PageLabels");
            }
        }

        let pruned = new_doc.prune_objects();
        log::debug!(
            "pages {}-{} of {}: pruned {} unreachable object(s)",
            start,
            end,
            self.path.display(),
            pruned.len()
        );

        Ok(new_doc)
    }

    /// Save `doc` so that `path` either holds the complete document or is
    /// untouched.
    ///
    /// The document is written to a temporary file next to `path`, synced,
    /// and then renamed into place. Unless `overwrite` is set, an existing
    /// file at `path` is an error.
    pub fn save_atomic<P: AsRef<Path>>(doc: &mut Document, path: P, overwrite: bool) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        if !overwrite && path.exists() {
            return Err(SplitError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::AlreadyExists, "file already exists"),
            ));
        }

        let mut tmp = tempfile::Builder::new()
            .prefix(".chapsplit-")
            .suffix(".part")
            .tempfile_in(dir)
            .map_err(|e| SplitError::io(path, e))?;

        doc.save_to(&mut tmp)
            .map_err(|e| SplitError::io(path, std::io::Error::other(e.to_string())))?;
        tmp.flush().map_err(|e| SplitError::io(path, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| SplitError::io(path, e))?;

        let persisted = if overwrite {
            tmp.persist(path)
        } else {
            tmp.persist_noclobber(path)
        };
        persisted.map_err(|e| SplitError::io(path, e.error))?;

        Ok(())
    }
}
