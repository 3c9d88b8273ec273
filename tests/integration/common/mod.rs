//! Shared helpers for the integration tests.
//!
//! Fixtures are generated into temporary directories rather than checked
//! in, so every test owns its inputs.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{ImageFormat, Rgba, RgbaImage};
use lopdf::content::Content;
use lopdf::{Document, Object, Stream, dictionary};

/// Write `contents` to `dir/name` and return the path.
pub fn write_file(dir: &Path, name: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

/// A PDF with one page per entry; each page's media box is that wide.
///
/// Widths make pages identifiable after a merge.
pub fn pdf_with_page_widths(widths: &[i64]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let kids: Vec<Object> = widths
        .iter()
        .map(|&width| {
            let content_id = doc.add_object(Stream::new(dictionary! {}, vec![]));
            doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), width.into(), 500.into()],
            })
            .into()
        })
        .collect();

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => widths.len() as i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("Failed to save fixture PDF");
    bytes
}

/// Media box width of every page, in page order.
pub fn page_widths(bytes: &[u8]) -> Vec<i64> {
    let doc = Document::load_mem(bytes).expect("Output is not a PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let page = doc.get_dictionary(id).unwrap();
            let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
            media_box[2].as_float().unwrap().round() as i64
        })
        .collect()
}

/// Text drawn on each page, one entry per `Tj`.
pub fn page_texts(bytes: &[u8]) -> Vec<Vec<String>> {
    let doc = Document::load_mem(bytes).expect("Output is not a PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let content = Content::decode(&doc.get_page_content(id).unwrap()).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .filter_map(|op| match op.operands.first() {
                    Some(Object::String(text, _)) => {
                        Some(String::from_utf8_lossy(text).into_owned())
                    }
                    _ => None,
                })
                .collect()
        })
        .collect()
}

/// Number of images painted on each page.
pub fn page_image_counts(bytes: &[u8]) -> Vec<usize> {
    let doc = Document::load_mem(bytes).expect("Output is not a PDF");
    doc.get_pages()
        .into_values()
        .map(|id| {
            let content = Content::decode(&doc.get_page_content(id).unwrap()).unwrap();
            content
                .operations
                .iter()
                .filter(|op| op.operator == "Do")
                .count()
        })
        .collect()
}

/// A small opaque PNG usable as a signature.
pub fn signature_png() -> Vec<u8> {
    let image = RgbaImage::from_pixel(40, 12, Rgba([20, 20, 120, 255]));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, ImageFormat::Png)
        .expect("Failed to encode PNG");
    bytes.into_inner()
}

/// CSV with a header and `rows` numbered worklog lines.
pub fn worklog_csv(rows: usize) -> String {
    let mut csv = String::from("Issue Key,Summary,Status,Assignee,Work Date,Hours,Remark\n");
    for i in 1..=rows {
        csv.push_str(&format!(
            "ABC-{i},Task number {i},Done,Alice,2025-01-{:02},8,\n",
            (i % 28) + 1
        ));
    }
    csv
}
