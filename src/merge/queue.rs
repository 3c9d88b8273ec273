//! Ordered list of documents waiting to be merged.

use std::path::{Path, PathBuf};

use crate::error::{Result, SheetPdfError};
use crate::validation::has_pdf_extension;

/// One queued document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Unique within the queue's lifetime, never reused.
    pub id: u64,
    /// File to read at merge time.
    pub path: PathBuf,
    /// Name shown to the user.
    pub name: String,
    /// Size in bytes when queued.
    pub size: u64,
}

impl QueueEntry {
    /// Size in kibibytes with two decimals, e.g. `"12.50 KB"`.
    pub fn size_label(&self) -> String {
        format!("{:.2} KB", self.size as f64 / 1024.0)
    }
}

/// Documents to merge, in output order.
///
/// Reordering is by adjacent swap. Moves past either end are ignored.
#[derive(Debug, Clone, Default)]
pub struct MergeQueue {
    entries: Vec<QueueEntry>,
    next_id: u64,
}

impl MergeQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a document and return its id.
    pub fn push(&mut self, path: impl Into<PathBuf>, size: u64) -> u64 {
        let path = path.into();
        let id = self.next_id;
        self.next_id += 1;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.entries.push(QueueEntry {
            id,
            path,
            name,
            size,
        });
        id
    }

    /// Queue every PDF among `paths`, reading sizes from disk.
    ///
    /// Files without a `.pdf` extension are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`SheetPdfError::InvalidInputFormat`] when none of the paths
    /// is a PDF, or an I/O error when a PDF's metadata cannot be read.
    pub async fn add_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> Result<Vec<u64>> {
        let (valid, skipped): (Vec<&Path>, Vec<&Path>) = paths
            .iter()
            .map(AsRef::<Path>::as_ref)
            .partition(|p| has_pdf_extension(p));

        for path in &skipped {
            log::warn!("Skipping non-PDF file: {}", path.display());
        }

        if valid.is_empty() {
            let Some(first) = skipped.first() else {
                return Ok(Vec::new());
            };
            return Err(SheetPdfError::invalid_input_format(
                first.to_path_buf(),
                "Please upload valid PDF files",
            ));
        }

        let mut sized = Vec::with_capacity(valid.len());
        for path in valid {
            let metadata = tokio::fs::metadata(path).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    SheetPdfError::file_not_found(path.to_path_buf())
                } else {
                    SheetPdfError::FileNotAccessible {
                        path: path.to_path_buf(),
                        source: e,
                    }
                }
            })?;
            sized.push((path, metadata.len()));
        }

        Ok(sized
            .into_iter()
            .map(|(path, size)| self.push(path, size))
            .collect())
    }

    /// Remove the entry with `id`. Unknown ids are ignored.
    pub fn remove(&mut self, id: u64) -> Option<QueueEntry> {
        let index = self.entries.iter().position(|e| e.id == id)?;
        Some(self.entries.remove(index))
    }

    /// Swap the entry at `index` with the one before it.
    ///
    /// Returns `false` and leaves the queue untouched at the top or out of
    /// range.
    pub fn move_up(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.entries.len() {
            return false;
        }
        self.entries.swap(index, index - 1);
        true
    }

    /// Swap the entry at `index` with the one after it.
    pub fn move_down(&mut self, index: usize) -> bool {
        if index + 1 >= self.entries.len() {
            return false;
        }
        self.entries.swap(index, index + 1);
        true
    }

    /// Drop every entry. Ids keep counting up.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries in merge order.
    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    /// Paths in merge order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.entries.iter().map(|e| e.path.clone()).collect()
    }

    /// Number of queued documents.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn names(queue: &MergeQueue) -> Vec<&str> {
        queue.entries().iter().map(|e| e.name.as_str()).collect()
    }

    fn abc() -> MergeQueue {
        let mut queue = MergeQueue::new();
        queue.push("a.pdf", 1);
        queue.push("b.pdf", 1);
        queue.push("c.pdf", 1);
        queue
    }

    #[rstest]
    #[case(0, 0, "0.00 KB")]
    #[case(512, 0, "0.50 KB")]
    #[case(12800, 0, "12.50 KB")]
    #[case(1_048_576, 0, "1024.00 KB")]
    fn test_size_label(#[case] size: u64, #[case] id: u64, #[case] expected: &str) {
        let entry = QueueEntry {
            id,
            path: PathBuf::from("x.pdf"),
            name: "x.pdf".into(),
            size,
        };
        assert_eq!(entry.size_label(), expected);
    }

    #[test]
    fn test_ids_are_unique_after_removal() {
        let mut queue = abc();
        let removed = queue.remove(1).unwrap();
        assert_eq!(removed.name, "b.pdf");
        let id = queue.push("d.pdf", 1);
        assert_eq!(id, 3);
        queue.clear();
        assert_eq!(queue.push("e.pdf", 1), 4);
    }

    #[test]
    fn test_remove_unknown_id() {
        let mut queue = abc();
        assert!(queue.remove(42).is_none());
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_remove_keeps_order_of_the_rest() {
        let mut queue = abc();
        let removed = queue.remove(1).unwrap();
        assert_eq!(removed.id, 1);
        assert!(queue.remove(1).is_none());
        assert_eq!(names(&queue), vec!["a.pdf", "c.pdf"]);
        assert_eq!(queue.entries().iter().map(|e| e.id).collect::<Vec<_>>(), vec![0, 2]);

        assert!(queue.remove(0).is_some());
        assert!(queue.remove(2).is_some());
        assert!(queue.is_empty());
        assert_eq!(queue.push("d.pdf", 1), 3);
    }

    #[test]
    fn test_move_up_and_down() {
        let mut queue = abc();
        assert!(queue.move_up(2));
        assert_eq!(names(&queue), vec!["a.pdf", "c.pdf", "b.pdf"]);
        assert!(queue.move_down(0));
        assert_eq!(names(&queue), vec!["c.pdf", "a.pdf", "b.pdf"]);
    }

    #[rstest]
    #[case::up_at_top(true, 0)]
    #[case::up_out_of_range(true, 3)]
    #[case::down_at_bottom(false, 2)]
    #[case::down_out_of_range(false, 7)]
    fn test_moves_past_the_ends_are_ignored(#[case] up: bool, #[case] index: usize) {
        let mut queue = abc();
        let moved = if up {
            queue.move_up(index)
        } else {
            queue.move_down(index)
        };
        assert!(!moved);
        assert_eq!(names(&queue), vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[tokio::test]
    async fn test_add_files_skips_non_pdf() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("one.pdf");
        let txt = dir.path().join("notes.txt");
        std::fs::write(&pdf, vec![0u8; 2048]).unwrap();
        std::fs::write(&txt, b"notes").unwrap();

        let mut queue = MergeQueue::new();
        let ids = queue.add_files(&[&pdf, &txt]).await.unwrap();

        assert_eq!(ids, vec![0]);
        assert_eq!(queue.entries()[0].size_label(), "2.00 KB");
    }

    #[tokio::test]
    async fn test_add_files_rejects_only_non_pdf() {
        let mut queue = MergeQueue::new();
        let result = queue.add_files(&["notes.txt"]).await;
        assert!(matches!(result, Err(SheetPdfError::InvalidInputFormat { .. })));
        assert!(queue.is_empty());
    }
}
