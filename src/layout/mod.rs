//! Page layout description.
//!
//! The composer does not talk to the PDF library directly. It produces a
//! [`PageLayout`]: a page size plus, for every page, the ordered list of
//! [`DrawOp`]s to paint. Coordinates are millimetres with the origin at the
//! top-left corner of the page and `y` growing downwards, which keeps the
//! cursor arithmetic in the composer readable. The renderer converts to PDF
//! user space.

pub mod composer;
pub mod metrics;
pub mod policy;
pub mod signature;
pub mod table;

use std::sync::Arc;

use crate::config::Orientation;

pub use composer::{ReportComposer, ReportContent};
pub use policy::LayoutPolicy;
pub use signature::RasterImage;

/// Millimetres to PDF points.
pub const MM_TO_PT: f32 = 72.0 / 25.4;

/// Convert millimetres to points.
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * MM_TO_PT
}

/// Convert points to millimetres.
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / MM_TO_PT
}

/// Page dimensions in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    /// Width in mm.
    pub width: f32,
    /// Height in mm.
    pub height: f32,
}

impl PageSize {
    /// A4 for the given orientation.
    pub fn a4(orientation: Orientation) -> Self {
        match orientation {
            Orientation::Portrait => Self {
                width: 210.0,
                height: 297.0,
            },
            Orientation::Landscape => Self {
                width: 297.0,
                height: 210.0,
            },
        }
    }
}

/// RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Black.
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    /// White.
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Components scaled to 0.0..=1.0.
    pub fn unit(self) -> [f32; 3] {
        [
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        ]
    }
}

/// Font weight. Both map to the standard Helvetica faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FontStyle {
    /// Helvetica.
    #[default]
    Regular,
    /// Helvetica-Bold.
    Bold,
}

/// Stroke settings for lines and borders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    /// Line width in mm.
    pub width: f32,
    /// Line colour.
    pub color: Rgb,
}

impl Stroke {
    /// Thin black line.
    pub const HAIRLINE: Stroke = Stroke {
        width: 0.1,
        color: Rgb::BLACK,
    };

    /// Standard signing line.
    pub const RULE: Stroke = Stroke {
        width: 0.2,
        color: Rgb::BLACK,
    };
}

/// One drawing instruction.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// Single line of text; `y` is the baseline.
    Text {
        /// Left edge.
        x: f32,
        /// Baseline.
        y: f32,
        /// Size in points.
        size: f32,
        /// Weight.
        style: FontStyle,
        /// Fill colour.
        color: Rgb,
        /// Content.
        text: String,
    },
    /// Straight line.
    Line {
        /// Start point.
        from: (f32, f32),
        /// End point.
        to: (f32, f32),
        /// Stroke.
        stroke: Stroke,
    },
    /// Rectangle; `y` is the top edge.
    Rect {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Fill, if any.
        fill: Option<Rgb>,
        /// Border, if any.
        stroke: Option<Stroke>,
    },
    /// Raster image; `y` is the top edge.
    Image {
        /// Left edge.
        x: f32,
        /// Top edge.
        y: f32,
        /// Width.
        width: f32,
        /// Height.
        height: f32,
        /// Decoded pixels.
        image: Arc<RasterImage>,
    },
}

/// Draw operations for one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    ops: Vec<DrawOp>,
}

impl Page {
    /// Append an operation.
    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    /// Operations in paint order.
    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Text content of every text operation, in paint order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Whether any text operation has exactly this content.
    pub fn has_text(&self, needle: &str) -> bool {
        self.texts().any(|t| t == needle)
    }

    /// Whether the page draws an image.
    pub fn has_image(&self) -> bool {
        self.ops.iter().any(|op| matches!(op, DrawOp::Image { .. }))
    }

    /// Add a text run.
    pub fn text(&mut self, x: f32, y: f32, size: f32, style: FontStyle, text: impl Into<String>) {
        self.push(DrawOp::Text {
            x,
            y,
            size,
            style,
            color: Rgb::BLACK,
            text: text.into(),
        });
    }

    /// Add a line.
    pub fn line(&mut self, from: (f32, f32), to: (f32, f32), stroke: Stroke) {
        self.push(DrawOp::Line { from, to, stroke });
    }
}

/// Paginated document description.
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    size: PageSize,
    pages: Vec<Page>,
}

impl PageLayout {
    /// Layout with a single empty page.
    pub fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: vec![Page::default()],
        }
    }

    /// Page size shared by every page.
    pub fn size(&self) -> PageSize {
        self.size
    }

    /// Append an empty page and return its index.
    pub fn add_page(&mut self) -> usize {
        self.pages.push(Page::default());
        self.pages.len() - 1
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page by index.
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Mutable page by index. Panics when out of range, like slice indexing.
    pub fn page_mut(&mut self, index: usize) -> &mut Page {
        &mut self.pages[index]
    }

    /// Index of the last page.
    pub fn last_page_index(&self) -> usize {
        self.pages.len() - 1
    }

    /// The last page.
    pub fn last_page_mut(&mut self) -> &mut Page {
        let last = self.last_page_index();
        &mut self.pages[last]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_orientation() {
        assert_eq!(PageSize::a4(Orientation::Portrait).width, 210.0);
        assert_eq!(PageSize::a4(Orientation::Landscape).width, 297.0);
    }

    #[test]
    fn test_unit_conversion_round_trip() {
        assert!((pt_to_mm(mm_to_pt(25.4)) - 25.4).abs() < 1e-4);
        assert!((mm_to_pt(25.4) - 72.0).abs() < 1e-4);
    }

    #[test]
    fn test_add_page() {
        let mut layout = PageLayout::new(PageSize::a4(Orientation::Portrait));
        assert_eq!(layout.page_count(), 1);
        assert_eq!(layout.add_page(), 1);
        layout.last_page_mut().text(10.0, 10.0, 10.0, FontStyle::Bold, "hello");
        assert!(layout.page(1).unwrap().has_text("hello"));
        assert!(!layout.page(0).unwrap().has_text("hello"));
    }

    #[test]
    fn test_rgb_unit() {
        assert_eq!(Rgb::WHITE.unit(), [1.0, 1.0, 1.0]);
        assert_eq!(Rgb::BLACK.unit(), [0.0, 0.0, 0.0]);
    }
}
