//! Core PDF merging implementation.
//!
//! The first document is the base. Every following document is renumbered
//! past the base's highest object id, its objects are moved over, and its
//! pages are appended to the base's root page tree in their original order.
//! Page attributes a moved page inherited from its old page tree are copied
//! onto the page itself so it renders the same under its new parent.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::future::try_join_all;
use lopdf::{Dictionary, Document, Object, ObjectId};
use tokio::task;

use crate::error::{Result, SheetPdfError};
use crate::io::read_file;
use crate::merge::queue::MergeQueue;
use crate::utils::format_file_size;

/// Attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE: [&[u8]; 4] = [b"MediaBox", b"CropBox", b"Resources", b"Rotate"];

/// Guards against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of PDFs merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Time taken to read all inputs.
    pub load_time: Duration,

    /// Total time taken for the merge, reading included.
    pub merge_time: Duration,

    /// Total size of input files.
    pub input_size: u64,

    /// Size of the merged document.
    pub output_size: u64,
}

impl MergeStatistics {
    /// Format input size as human-readable string.
    pub fn format_input_size(&self) -> String {
        format_file_size(self.input_size)
    }

    /// Format output size as human-readable string.
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// Result of a merge operation.
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The merged PDF, serialized.
    pub bytes: Vec<u8>,

    /// Statistics about the merge.
    pub statistics: MergeStatistics,

    /// Paths of files that were merged, in order.
    pub merged_files: Vec<PathBuf>,
}

/// One document handed to [`Merger::merge_documents`].
#[derive(Debug, Clone)]
pub struct MergeInput {
    /// Name used in error messages.
    pub name: String,
    /// Raw PDF bytes.
    pub bytes: Vec<u8>,
}

impl MergeInput {
    /// Wrap named bytes.
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// PDF merger that concatenates documents page by page.
#[derive(Debug, Clone)]
pub struct Merger {
    compress: bool,
}

impl Default for Merger {
    fn default() -> Self {
        Self { compress: true }
    }
}

impl Merger {
    /// Create a new merger with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle stream compression of the output.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Merge every queued document in queue order.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Fewer than two documents are queued
    /// - Any queued file cannot be read
    /// - Any input is not a decodable PDF
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use sheetpdf::merge::{Merger, MergeQueue};
    /// # async fn example(queue: MergeQueue) -> Result<(), Box<dyn std::error::Error>> {
    /// let result = Merger::new().merge_queue(&queue).await?;
    /// println!("Merged {} files into {} pages",
    ///          result.statistics.files_merged,
    ///          result.statistics.total_pages);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn merge_queue(&self, queue: &MergeQueue) -> Result<MergeResult> {
        if queue.len() < 2 {
            return Err(SheetPdfError::NotEnoughDocuments {
                queued: queue.len(),
            });
        }

        let merge_start = Instant::now();
        let load_start = Instant::now();

        let contents = try_join_all(queue.entries().iter().map(|e| read_file(&e.path))).await?;
        let load_time = load_start.elapsed();

        let inputs: Vec<MergeInput> = queue
            .entries()
            .iter()
            .zip(contents)
            .map(|(entry, bytes)| MergeInput::new(entry.name.clone(), bytes))
            .collect();
        let input_size = inputs.iter().map(|i| i.bytes.len() as u64).sum();

        let merger = self.clone();
        let (bytes, total_pages) = task::spawn_blocking(move || {
            let mut document = merger.merge_documents(&inputs)?;
            let total_pages = document.get_pages().len();
            let mut bytes = Vec::new();
            document
                .save_to(&mut bytes)
                .map_err(|e| SheetPdfError::merge_failed(e.to_string()))?;
            Ok::<_, SheetPdfError>((bytes, total_pages))
        })
        .await
        .map_err(|e| SheetPdfError::other(format!("Merge task failed: {e}")))??;

        let statistics = MergeStatistics {
            files_merged: queue.len(),
            total_pages,
            load_time,
            merge_time: merge_start.elapsed(),
            input_size,
            output_size: bytes.len() as u64,
        };

        log::info!(
            "Merged {} file(s) ({}) into {} page(s)",
            statistics.files_merged,
            statistics.format_input_size(),
            statistics.total_pages
        );

        Ok(MergeResult {
            bytes,
            statistics,
            merged_files: queue.paths(),
        })
    }

    /// Merge already-read documents into one.
    ///
    /// # Errors
    ///
    /// Returns [`SheetPdfError::NotEnoughDocuments`] for fewer than two
    /// inputs and [`SheetPdfError::MergeFailed`] when an input cannot be
    /// decoded or has no usable page tree.
    pub fn merge_documents(&self, inputs: &[MergeInput]) -> Result<Document> {
        let [first, rest @ ..] = inputs else {
            return Err(SheetPdfError::NotEnoughDocuments { queued: 0 });
        };
        if rest.is_empty() {
            return Err(SheetPdfError::NotEnoughDocuments { queued: 1 });
        }

        let mut merged = load(first)?;
        let pages_id = root_pages_id(&merged)
            .map_err(|e| SheetPdfError::merge_failed(format!("{}: {e}", first.name)))?;
        let mut max_id = merged.max_id;

        for input in rest {
            let mut doc = load(input)?;

            // Avoid object id collisions by renumbering the incoming document
            doc.renumber_objects_with(max_id + 1);
            max_id = doc.max_id;

            let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
            for &page_id in &page_ids {
                flatten_inherited(&mut doc, page_id, pages_id);
            }
            log::debug!("{}: {} page(s)", input.name, page_ids.len());

            merged.objects.extend(doc.objects);
            add_pages_to_tree(&mut merged, pages_id, &page_ids)?;
        }

        merged.max_id = max_id;
        merged.prune_objects();
        merged.renumber_objects();
        if self.compress {
            merged.compress();
        }

        Ok(merged)
    }
}

fn load(input: &MergeInput) -> Result<Document> {
    Document::load_mem(&input.bytes)
        .map_err(|e| SheetPdfError::merge_failed(format!("{}: {e}", input.name)))
}

fn root_pages_id(doc: &Document) -> lopdf::Result<ObjectId> {
    doc.catalog()?.get(b"Pages")?.as_reference()
}

/// Copy inherited attributes onto the page and point it at `new_parent`.
fn flatten_inherited(doc: &mut Document, page_id: ObjectId, new_parent: ObjectId) {
    let inherited = inherited_attributes(doc, page_id);

    if let Ok(page) = doc.get_object_mut(page_id).and_then(Object::as_dict_mut) {
        for (key, value) in inherited {
            page.set(key, value);
        }
        page.set("Parent", Object::Reference(new_parent));
    }
}

fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Vec<(&'static [u8], Object)> {
    let Ok(page) = doc.get_dictionary(page_id) else {
        return Vec::new();
    };

    let mut missing: Vec<&'static [u8]> = INHERITABLE
        .into_iter()
        .filter(|key| !page.has(key))
        .collect();
    let mut found = Vec::new();
    let mut node: &Dictionary = page;

    for _ in 0..MAX_TREE_DEPTH {
        if missing.is_empty() {
            break;
        }
        let Some(parent) = node
            .get(b"Parent")
            .and_then(Object::as_reference)
            .ok()
            .and_then(|id| doc.get_dictionary(id).ok())
        else {
            break;
        };

        missing.retain(|key| match parent.get(key) {
            Ok(value) => {
                found.push((*key, value.clone()));
                false
            }
            Err(_) => true,
        });
        node = parent;
    }

    found
}

/// Append page references to the root page tree and patch its count.
fn add_pages_to_tree(merged: &mut Document, pages_id: ObjectId, page_ids: &[ObjectId]) -> Result<()> {
    let dict = merged
        .get_object_mut(pages_id)
        .and_then(Object::as_dict_mut)
        .map_err(|e| SheetPdfError::merge_failed(format!("Failed to get pages object: {e}")))?;

    let kids = dict
        .get_mut(b"Kids")
        .and_then(Object::as_array_mut)
        .map_err(|_| SheetPdfError::merge_failed("Pages dictionary missing Kids array"))?;
    kids.extend(page_ids.iter().map(|&id| Object::Reference(id)));

    let current_count = dict.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));

    Ok(())
}
