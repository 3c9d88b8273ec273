//! Paginated table placement.
//!
//! [`draw_table`] lays a [`TableData`] out across as many pages as it needs,
//! starting at a given page and cursor. The header row is repeated at the
//! top of every continuation page. Cells wrap on word boundaries to fit
//! their column.

use super::metrics::{ascent, line_height, natural_width, text_width, wrap_text};
use super::{DrawOp, FontStyle, PageLayout, Rgb, Stroke};
use crate::table::TableData;

/// Horizontal alignment inside a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    /// Flush left after padding.
    #[default]
    Left,
    /// Centered in the cell.
    Center,
}

/// How column widths are chosen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ColumnWidths {
    /// Natural content widths scaled to span the printable width.
    #[default]
    Auto,
    /// Fixed widths in mm, one per column. Columns beyond the list fall
    /// back to an even share of whatever width remains.
    Fixed(Vec<f32>),
}

/// Visual settings for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStyle {
    /// Body and header font size in points.
    pub font_size: f32,
    /// Padding on every side of a cell, mm.
    pub cell_padding: f32,
    /// Minimum row height, mm.
    pub min_cell_height: f32,
    /// Left page margin, mm.
    pub margin_left: f32,
    /// Right page margin, mm.
    pub margin_right: f32,
    /// Where the table resumes on continuation pages, mm from the top.
    pub page_top: f32,
    /// Rows never extend past `page height - margin_bottom`.
    pub margin_bottom: f32,
    /// Header background.
    pub header_fill: Option<Rgb>,
    /// Header text colour.
    pub header_text: Rgb,
    /// Header alignment.
    pub header_align: Align,
    /// Background for every second body row.
    pub alternate_fill: Option<Rgb>,
    /// Cell borders.
    pub grid: Option<Stroke>,
    /// Column sizing.
    pub widths: ColumnWidths,
}

impl Default for TableStyle {
    fn default() -> Self {
        Self {
            font_size: 8.0,
            cell_padding: 2.0,
            min_cell_height: 7.0,
            margin_left: 14.0,
            margin_right: 14.0,
            page_top: 14.0,
            margin_bottom: 14.0,
            header_fill: Some(Rgb(41, 128, 185)),
            header_text: Rgb::WHITE,
            header_align: Align::Center,
            alternate_fill: Some(Rgb(245, 245, 245)),
            grid: None,
            widths: ColumnWidths::Auto,
        }
    }
}

/// Where a drawn table ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TablePlacement {
    /// Page holding the last row.
    pub last_page: usize,
    /// Bottom edge of the last row, mm from the top.
    pub end_y: f32,
}

struct PreparedRow {
    cells: Vec<Vec<String>>,
    height: f32,
}

impl TableStyle {
    /// Resolve column widths for `data` on a page `page_width` mm wide.
    pub fn column_widths(&self, data: &TableData, page_width: f32) -> Vec<f32> {
        let columns = column_count(data);
        let available = (page_width - self.margin_left - self.margin_right).max(1.0);

        match &self.widths {
            ColumnWidths::Fixed(fixed) if fixed.len() >= columns => fixed[..columns].to_vec(),
            ColumnWidths::Fixed(fixed) => {
                let used: f32 = fixed.iter().sum();
                let rest = columns - fixed.len();
                let share = ((available - used) / rest as f32).max(self.min_column_width());
                fixed
                    .iter()
                    .copied()
                    .chain(std::iter::repeat_n(share, rest))
                    .collect()
            }
            ColumnWidths::Auto => self.auto_widths(data, columns, available),
        }
    }

    fn min_column_width(&self) -> f32 {
        2.0 * self.cell_padding + text_width("W", self.font_size, FontStyle::Regular)
    }

    fn auto_widths(&self, data: &TableData, columns: usize, available: f32) -> Vec<f32> {
        let padding = 2.0 * self.cell_padding;
        let mut natural = vec![0.0_f32; columns];

        for (idx, header) in data.headers.iter().enumerate() {
            natural[idx] = natural[idx].max(natural_width(header, self.font_size, FontStyle::Bold));
        }
        for row in &data.rows {
            for (idx, cell) in row.iter().enumerate().take(columns) {
                natural[idx] =
                    natural[idx].max(natural_width(cell, self.font_size, FontStyle::Regular));
            }
        }

        let natural: Vec<f32> = natural
            .into_iter()
            .map(|w| (w + padding).max(self.min_column_width()))
            .collect();
        let total: f32 = natural.iter().sum();
        if total <= 0.0 {
            return vec![available / columns as f32; columns];
        }

        let scale = available / total;
        natural.into_iter().map(|w| w * scale).collect()
    }

    fn prepare(&self, cells: &[String], widths: &[f32], style: FontStyle) -> PreparedRow {
        let inner = |w: f32| (w - 2.0 * self.cell_padding).max(0.1);
        let cells: Vec<Vec<String>> = widths
            .iter()
            .enumerate()
            .map(|(idx, &w)| {
                let text = cells.get(idx).map(String::as_str).unwrap_or("");
                wrap_text(text, inner(w), self.font_size, style)
            })
            .collect();

        let lines = cells.iter().map(Vec::len).max().unwrap_or(1);
        let height = (lines as f32 * line_height(self.font_size) + 2.0 * self.cell_padding)
            .max(self.min_cell_height);

        PreparedRow { cells, height }
    }
}

fn column_count(data: &TableData) -> usize {
    data.rows
        .iter()
        .map(Vec::len)
        .max()
        .unwrap_or(0)
        .max(data.headers.len())
}

/// Lay out `data` starting on page `start_page` at `start_y`.
///
/// New pages are appended as rows overflow. A table with no columns draws
/// nothing and ends where it started.
pub fn draw_table(
    layout: &mut PageLayout,
    start_page: usize,
    start_y: f32,
    data: &TableData,
    style: &TableStyle,
) -> TablePlacement {
    let columns = column_count(data);
    if columns == 0 {
        return TablePlacement {
            last_page: start_page,
            end_y: start_y,
        };
    }

    let size = layout.size();
    let widths = style.column_widths(data, size.width);
    let limit = size.height - style.margin_bottom;

    let header = (!data.headers.is_empty())
        .then(|| style.prepare(&data.headers, &widths, FontStyle::Bold));
    let header_height = header.as_ref().map_or(0.0, |h| h.height);

    let mut page = start_page;
    let mut y = start_y;

    let first_height = data
        .rows
        .first()
        .map_or(0.0, |row| style.prepare(row, &widths, FontStyle::Regular).height);
    if y + header_height + first_height > limit && y > style.page_top {
        page = next_page(layout, page);
        y = style.page_top;
    }

    if let Some(header) = &header {
        draw_header(layout, page, y, header, &widths, style);
        y += header.height;
    }

    let mut rows_on_page = 0;
    for (idx, row) in data.rows.iter().enumerate() {
        let prepared = style.prepare(row, &widths, FontStyle::Regular);

        if y + prepared.height > limit && rows_on_page > 0 {
            page = next_page(layout, page);
            y = style.page_top;
            rows_on_page = 0;
            if let Some(header) = &header {
                draw_header(layout, page, y, header, &widths, style);
                y += header.height;
            }
        }

        let fill = if idx % 2 == 1 {
            style.alternate_fill
        } else {
            None
        };
        draw_row(
            layout,
            page,
            y,
            &prepared,
            &widths,
            style,
            RowPaint {
                fill,
                text: Rgb::BLACK,
                font: FontStyle::Regular,
                align: Align::Left,
            },
        );
        y += prepared.height;
        rows_on_page += 1;
    }

    log::debug!(
        "Placed {} row(s) over {} page(s)",
        data.rows.len(),
        page - start_page + 1
    );

    TablePlacement {
        last_page: page,
        end_y: y,
    }
}

fn next_page(layout: &mut PageLayout, current: usize) -> usize {
    if current + 1 < layout.page_count() {
        current + 1
    } else {
        layout.add_page()
    }
}

struct RowPaint {
    fill: Option<Rgb>,
    text: Rgb,
    font: FontStyle,
    align: Align,
}

fn draw_header(
    layout: &mut PageLayout,
    page: usize,
    y: f32,
    header: &PreparedRow,
    widths: &[f32],
    style: &TableStyle,
) {
    let paint = RowPaint {
        fill: style.header_fill,
        text: style.header_text,
        font: FontStyle::Bold,
        align: style.header_align,
    };
    draw_row(layout, page, y, header, widths, style, paint);
}

fn draw_row(
    layout: &mut PageLayout,
    page: usize,
    top: f32,
    row: &PreparedRow,
    widths: &[f32],
    style: &TableStyle,
    paint: RowPaint,
) {
    let target = layout.page_mut(page);
    let line = line_height(style.font_size);
    let first_baseline = top + style.cell_padding + ascent(style.font_size);

    let mut x = style.margin_left;
    for (lines, &width) in row.cells.iter().zip(widths) {
        if paint.fill.is_some() || style.grid.is_some() {
            target.push(DrawOp::Rect {
                x,
                y: top,
                width,
                height: row.height,
                fill: paint.fill,
                stroke: style.grid,
            });
        }

        for (i, text) in lines.iter().enumerate().filter(|(_, t)| !t.is_empty()) {
            let text_x = match paint.align {
                Align::Left => x + style.cell_padding,
                Align::Center => {
                    x + (width - text_width(text, style.font_size, paint.font)) / 2.0
                }
            };
            target.push(DrawOp::Text {
                x: text_x,
                y: first_baseline + i as f32 * line,
                size: style.font_size,
                style: paint.font,
                color: paint.text,
                text: text.clone(),
            });
        }

        x += width;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Orientation;
    use crate::layout::PageSize;

    fn data(rows: usize) -> TableData {
        TableData {
            headers: vec!["Name".into(), "Status".into()],
            rows: (0..rows)
                .map(|i| vec![format!("Person {i}"), "Done".into()])
                .collect(),
        }
    }

    fn portrait() -> PageLayout {
        PageLayout::new(PageSize::a4(Orientation::Portrait))
    }

    #[test]
    fn test_auto_widths_span_printable_width() {
        let style = TableStyle::default();
        let widths = style.column_widths(&data(3), 210.0);
        let total: f32 = widths.iter().sum();
        assert!((total - (210.0 - 28.0)).abs() < 1e-3);
    }

    #[test]
    fn test_fixed_widths_are_used() {
        let style = TableStyle {
            widths: ColumnWidths::Fixed(vec![10.0, 20.0]),
            ..Default::default()
        };
        assert_eq!(style.column_widths(&data(1), 297.0), vec![10.0, 20.0]);
    }

    #[test]
    fn test_fixed_widths_fill_extra_columns() {
        let style = TableStyle {
            widths: ColumnWidths::Fixed(vec![50.0]),
            ..Default::default()
        };
        let widths = style.column_widths(&data(1), 210.0);
        assert_eq!(widths.len(), 2);
        assert!((widths[1] - (182.0 - 50.0)).abs() < 1e-3);
    }

    #[test]
    fn test_small_table_stays_on_one_page() {
        let mut layout = portrait();
        let placement = draw_table(&mut layout, 0, 40.0, &data(3), &TableStyle::default());
        assert_eq!(layout.page_count(), 1);
        assert_eq!(placement.last_page, 0);
        // header + 3 single-line rows
        let row = (line_height(8.0) + 4.0).max(7.0);
        assert!((placement.end_y - (40.0 + 4.0 * row)).abs() < 1e-3);
    }

    #[test]
    fn test_long_table_paginates_and_repeats_header() {
        let mut layout = portrait();
        let placement = draw_table(&mut layout, 0, 40.0, &data(80), &TableStyle::default());

        assert!(layout.page_count() > 1);
        assert_eq!(placement.last_page, layout.page_count() - 1);
        for page in layout.pages() {
            assert!(page.has_text("Name"));
        }
        assert!(layout.pages().iter().any(|p| p.has_text("Person 79")));
        assert!(placement.end_y <= 297.0 - 14.0);
    }

    #[test]
    fn test_empty_table_draws_nothing() {
        let mut layout = portrait();
        let placement = draw_table(&mut layout, 0, 30.0, &TableData::default(), &TableStyle::default());
        assert_eq!(placement.end_y, 30.0);
        assert!(layout.pages()[0].ops().is_empty());
    }

    #[test]
    fn test_long_cell_wraps() {
        let mut layout = portrait();
        let table = TableData {
            headers: vec!["A".into(), "B".into()],
            rows: vec![vec!["x".repeat(10), "word ".repeat(200)]],
        };
        let placement = draw_table(&mut layout, 0, 20.0, &table, &TableStyle::default());
        assert!(placement.end_y > 20.0 + 2.0 * (line_height(8.0) + 4.0) + 1.0);
    }

    #[test]
    fn test_alternate_rows_are_shaded() {
        let mut layout = portrait();
        draw_table(&mut layout, 0, 20.0, &data(2), &TableStyle::default());
        let shaded = layout.pages()[0]
            .ops()
            .iter()
            .filter(|op| matches!(op, DrawOp::Rect { fill: Some(Rgb(245, 245, 245)), .. }))
            .count();
        // second body row, both cells
        assert_eq!(shaded, 2);
    }
}
