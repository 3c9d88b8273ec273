//! PDF serialisation of a [`PageLayout`].
//!
//! Text uses the two standard Helvetica faces with WinAnsi encoding, so no
//! font data is embedded. Images become RGB image XObjects shared between
//! pages when the same decoded image is drawn more than once.

use std::collections::HashMap;
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, StringFormat, dictionary};

use crate::error::{Result, SheetPdfError};
use crate::layout::{DrawOp, FontStyle, Page, PageLayout, RasterImage, Rgb, Stroke, mm_to_pt};

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

/// Writes page layouts as PDF documents.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    title: Option<String>,
    compress: bool,
}

impl Default for PdfRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfRenderer {
    /// Renderer with compression on and no title.
    pub fn new() -> Self {
        Self {
            title: None,
            compress: true,
        }
    }

    /// Set the document title stored in the info dictionary.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Toggle stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Build the document in memory.
    pub fn render_document(&self, layout: &PageLayout) -> Result<Document> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular = doc.add_object(font_dictionary("Helvetica"));
        let bold = doc.add_object(font_dictionary("Helvetica-Bold"));

        let size = layout.size();
        let media_box: Vec<Object> = vec![
            0.into(),
            0.into(),
            Object::Real(mm_to_pt(size.width)),
            Object::Real(mm_to_pt(size.height)),
        ];

        let mut images = ImageRegistry::default();
        let mut kids = Vec::with_capacity(layout.page_count());

        for page in layout.pages() {
            let (content, used_images) = encode_page(page, size.height, &mut doc, &mut images)?;
            let content_id = doc.add_object(Stream::new(dictionary! {}, content));

            let mut xobjects = Dictionary::new();
            for (name, id) in used_images {
                xobjects.set(name, id);
            }

            let resources = dictionary! {
                "Font" => dictionary! {
                    REGULAR_FONT => regular,
                    BOLD_FONT => bold,
                },
                "XObject" => xobjects,
            };

            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.clone(),
                "Contents" => content_id,
                "Resources" => resources,
            });
            kids.push(Object::from(page_id));
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info = dictionary! {
            "Producer" => Object::string_literal(concat!("sheetpdf ", env!("CARGO_PKG_VERSION"))),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::String(encode_text(title), StringFormat::Literal));
        }
        let info_id = doc.add_object(info);
        doc.trailer.set("Info", info_id);

        if self.compress {
            doc.compress();
        }

        log::debug!(
            "Rendered {} page(s), {} image(s)",
            layout.page_count(),
            images.len()
        );
        Ok(doc)
    }

    /// Render straight to PDF bytes.
    pub fn render(&self, layout: &PageLayout) -> Result<Vec<u8>> {
        let mut doc = self.render_document(layout)?;
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)
            .map_err(|e| SheetPdfError::render_failed(e.to_string()))?;
        Ok(bytes)
    }
}

fn font_dictionary(base: &str) -> Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Image XObjects added so far, keyed by the shared pixel buffer.
#[derive(Default)]
struct ImageRegistry {
    objects: HashMap<usize, (String, ObjectId)>,
}

impl ImageRegistry {
    fn len(&self) -> usize {
        self.objects.len()
    }

    fn get_or_insert(&mut self, doc: &mut Document, image: &Arc<RasterImage>) -> (String, ObjectId) {
        let key = Arc::as_ptr(image) as usize;
        let next = self.objects.len() + 1;
        self.objects
            .entry(key)
            .or_insert_with(|| {
                let stream = Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => i64::from(image.width),
                        "Height" => i64::from(image.height),
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8,
                    },
                    image.rgb.clone(),
                );
                (format!("Im{next}"), doc.add_object(stream))
            })
            .clone()
    }
}

fn encode_page(
    page: &Page,
    page_height: f32,
    doc: &mut Document,
    images: &mut ImageRegistry,
) -> Result<(Vec<u8>, Vec<(String, ObjectId)>)> {
    let flip = |y: f32| mm_to_pt(page_height - y);
    let mut ops = Vec::new();
    let mut used = Vec::new();

    for op in page.ops() {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                style,
                color,
                text,
            } => {
                let font = match style {
                    FontStyle::Regular => REGULAR_FONT,
                    FontStyle::Bold => BOLD_FONT,
                };
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![font.into(), Object::Real(*size)]));
                ops.push(fill_color(*color));
                ops.push(Operation::new(
                    "Td",
                    vec![Object::Real(mm_to_pt(*x)), Object::Real(flip(*y))],
                ));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(encode_text(text), StringFormat::Literal)],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            DrawOp::Line { from, to, stroke } => {
                ops.push(Operation::new("q", vec![]));
                push_stroke(&mut ops, *stroke);
                ops.push(Operation::new(
                    "m",
                    vec![Object::Real(mm_to_pt(from.0)), Object::Real(flip(from.1))],
                ));
                ops.push(Operation::new(
                    "l",
                    vec![Object::Real(mm_to_pt(to.0)), Object::Real(flip(to.1))],
                ));
                ops.push(Operation::new("S", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
                stroke,
            } => {
                let paint = match (fill, stroke) {
                    (Some(_), Some(_)) => "B",
                    (Some(_), None) => "f",
                    (None, Some(_)) => "S",
                    (None, None) => continue,
                };
                ops.push(Operation::new("q", vec![]));
                if let Some(fill) = fill {
                    ops.push(fill_color(*fill));
                }
                if let Some(stroke) = stroke {
                    push_stroke(&mut ops, *stroke);
                }
                ops.push(Operation::new(
                    "re",
                    vec![
                        Object::Real(mm_to_pt(*x)),
                        Object::Real(flip(y + height)),
                        Object::Real(mm_to_pt(*width)),
                        Object::Real(mm_to_pt(*height)),
                    ],
                ));
                ops.push(Operation::new(paint, vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            DrawOp::Image {
                x,
                y,
                width,
                height,
                image,
            } => {
                let (name, id) = images.get_or_insert(doc, image);
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        Object::Real(mm_to_pt(*width)),
                        0.into(),
                        0.into(),
                        Object::Real(mm_to_pt(*height)),
                        Object::Real(mm_to_pt(*x)),
                        Object::Real(flip(y + height)),
                    ],
                ));
                ops.push(Operation::new("Do", vec![Object::Name(name.clone().into_bytes())]));
                ops.push(Operation::new("Q", vec![]));
                if !used.iter().any(|(n, _)| *n == name) {
                    used.push((name, id));
                }
            }
        }
    }

    let content = Content { operations: ops }
        .encode()
        .map_err(|e| SheetPdfError::render_failed(e.to_string()))?;
    Ok((content, used))
}

fn fill_color(color: Rgb) -> Operation {
    let [r, g, b] = color.unit();
    Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)])
}

fn push_stroke(ops: &mut Vec<Operation>, stroke: Stroke) {
    let [r, g, b] = stroke.color.unit();
    ops.push(Operation::new("w", vec![Object::Real(mm_to_pt(stroke.width))]));
    ops.push(Operation::new(
        "RG",
        vec![Object::Real(r), Object::Real(g), Object::Real(b)],
    ));
}

/// Encode text for a WinAnsi font. Characters the encoding lacks become `?`.
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '\t' => b' ',
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Orientation;
    use crate::layout::PageSize;

    fn page_strings(doc: &Document, page_number: u32) -> Vec<String> {
        let pages = doc.get_pages();
        let page_id = pages[&page_number];
        let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match op.operands.first() {
                Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .collect()
    }

    fn sample_layout() -> PageLayout {
        let mut layout = PageLayout::new(PageSize::a4(Orientation::Portrait));
        layout.page_mut(0).text(20.0, 20.0, 18.0, FontStyle::Bold, "Report");
        layout.page_mut(0).line((10.0, 30.0), (60.0, 30.0), Stroke::RULE);
        layout.page_mut(0).push(DrawOp::Rect {
            x: 10.0,
            y: 40.0,
            width: 30.0,
            height: 7.0,
            fill: Some(Rgb(41, 128, 185)),
            stroke: Some(Stroke::HAIRLINE),
        });
        let second = layout.add_page();
        layout.page_mut(second).text(20.0, 20.0, 8.0, FontStyle::Regular, "Page 2 of 2");
        layout
    }

    #[test]
    fn test_render_round_trips_through_lopdf() {
        let bytes = PdfRenderer::new().render(&sample_layout()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
        assert_eq!(page_strings(&doc, 1), vec!["Report"]);
        assert_eq!(page_strings(&doc, 2), vec!["Page 2 of 2"]);
    }

    #[test]
    fn test_media_box_matches_orientation() {
        let layout = PageLayout::new(PageSize::a4(Orientation::Landscape));
        let doc = PdfRenderer::new().render_document(&layout).unwrap();
        let page_id = doc.get_pages()[&1];
        let page = doc.get_dictionary(page_id).unwrap();
        let media_box = page.get(b"MediaBox").unwrap().as_array().unwrap();
        let width = media_box[2].as_float().unwrap();
        assert!((width - 841.89).abs() < 0.1);
    }

    #[test]
    fn test_shared_image_is_embedded_once() {
        let image = Arc::new(RasterImage {
            width: 2,
            height: 1,
            rgb: vec![0, 0, 0, 255, 255, 255],
        });
        let mut layout = PageLayout::new(PageSize::a4(Orientation::Portrait));
        for _ in 0..2 {
            let page = layout.last_page_mut();
            page.push(DrawOp::Image {
                x: 10.0,
                y: 10.0,
                width: 20.0,
                height: 10.0,
                image: Arc::clone(&image),
            });
            layout.add_page();
        }

        let doc = PdfRenderer::new()
            .with_compression(false)
            .render_document(&layout)
            .unwrap();
        let image_count = doc
            .objects
            .values()
            .filter(|obj| {
                obj.as_stream()
                    .ok()
                    .and_then(|s| s.dict.get(b"Subtype").ok())
                    .and_then(|s| s.as_name().ok())
                    == Some(b"Image".as_slice())
            })
            .count();
        assert_eq!(image_count, 1);
    }

    #[test]
    fn test_title_is_stored() {
        let doc = PdfRenderer::new()
            .with_title("Timesheet Report")
            .render_document(&sample_layout())
            .unwrap();
        let info_id = doc.trailer.get(b"Info").unwrap().as_reference().unwrap();
        let info = doc.get_dictionary(info_id).unwrap();
        assert_eq!(
            info.get(b"Title").unwrap().as_str().unwrap(),
            b"Timesheet Report"
        );
    }

    #[test]
    fn test_encode_text() {
        assert_eq!(encode_text("Café – ok"), b"Caf\xe9 \x96 ok".to_vec());
        assert_eq!(encode_text("日本"), b"??".to_vec());
    }
}
