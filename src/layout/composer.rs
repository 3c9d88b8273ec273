//! Report composition.
//!
//! [`ReportComposer`] turns table content plus user settings into a
//! [`PageLayout`], following a [`LayoutPolicy`]. The sequence is always the
//! same: title block on the first page, the table across as many pages as
//! it needs, then the trailing blocks (declaration boxes, signatures) on the
//! last page, and finally page numbers once the page count is known.

use std::sync::Arc;

use chrono::NaiveDateTime;

use super::metrics::{text_width, wrap_text};
use super::policy::{DeclarationPolicy, LayoutPolicy, SignatureSlot, SlotArrangement};
use super::table::{TablePlacement, draw_table};
use super::{DrawOp, FontStyle, Page, PageLayout, PageSize, RasterImage, Stroke};
use crate::config::{Orientation, PdfConfig};
use crate::table::TableData;

const SIGNATURE_LINE_LENGTH: f32 = 50.0;
const SIGNATURE_IMAGE_HEIGHT: f32 = 12.0;
const CAPTION_SIZE: f32 = 10.0;
const ROLE_LABEL_SIZE: f32 = 8.0;
const COLUMN_SIGNATURE_SIZE: f32 = 8.0;
const FOOTER_SIZE: f32 = 8.0;
const JUSTIFICATION_SIZE: f32 = 8.0;
const STATEMENT_SIZE: f32 = 7.0;

/// Everything a report prints besides the user settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContent {
    /// Table headers and body.
    pub table: TableData,
    /// `"{date}: {remark}"` lines for the justification box.
    pub justifications: Vec<String>,
    /// Timestamp printed in the declaration box.
    pub printed_at: NaiveDateTime,
}

impl ReportContent {
    /// Content with a table only, stamped with the current local time.
    pub fn new(table: TableData) -> Self {
        Self {
            table,
            justifications: Vec::new(),
            printed_at: chrono::Local::now().naive_local(),
        }
    }
}

/// Builds the page layout of one report.
#[derive(Debug)]
pub struct ReportComposer<'a> {
    policy: &'a LayoutPolicy,
    config: &'a PdfConfig,
    size: PageSize,
}

impl<'a> ReportComposer<'a> {
    /// Composer for A4 pages in the given orientation.
    pub fn new(policy: &'a LayoutPolicy, config: &'a PdfConfig, orientation: Orientation) -> Self {
        Self {
            policy,
            config,
            size: PageSize::a4(orientation),
        }
    }

    /// Page size every page uses.
    pub fn page_size(&self) -> PageSize {
        self.size
    }

    /// Lay out the whole report.
    pub fn compose(&self, content: &ReportContent) -> PageLayout {
        let mut layout = PageLayout::new(self.size);

        let cursor = self.draw_header(layout.page_mut(0));
        let table_top = self.policy.header.table_top.unwrap_or(cursor);

        let mut style = self.policy.table.clone();
        style.font_size = self.config.font_size.points();
        let placement = draw_table(&mut layout, 0, table_top, &content.table, &style);

        self.draw_trailer(&mut layout, placement, content);

        if self.policy.page_numbers {
            self.draw_page_numbers(&mut layout);
        }

        log::debug!("Composed report with {} page(s)", layout.page_count());
        layout
    }

    fn draw_header(&self, page: &mut Page) -> f32 {
        let header = &self.policy.header;
        let width = self.size.width;
        let mut y = header.title_y;

        let title = self.config.title().unwrap_or(header.default_title);
        centered(page, width, y, header.title_size, FontStyle::Bold, title);

        if !header.show_details {
            return y + header.title_size / 2.0;
        }

        y += 10.0;
        if let Some(period) = self.config.period() {
            centered(
                page,
                width,
                y,
                12.0,
                FontStyle::Regular,
                &format!("Period: {period}"),
            );
            y += 8.0;
        }

        let margin = self.policy.table.margin_left;
        let signatories = &self.config.signatories;
        if let Some(name) = signatories.employee.name() {
            page.text(margin, y, 10.0, FontStyle::Regular, format!("Employee Name: {name}"));
            y += 6.0;
        }
        if let Some(name) = signatories.team_leader.name() {
            page.text(margin, y, 10.0, FontStyle::Regular, format!("Team Leader: {name}"));
            y += 6.0;
        }

        y + 5.0
    }

    fn draw_trailer(&self, layout: &mut PageLayout, table: TablePlacement, content: &ReportContent) {
        let height = self.size.height;
        let placement = self.policy.placement;

        let declaration = self
            .policy
            .declaration
            .as_ref()
            .map(|policy| (policy, self.declaration_blocks(policy, content)));
        let boxes_height = declaration
            .as_ref()
            .map_or(0.0, |(policy, blocks)| blocks.total_height(policy.gap));
        let clearance = declaration.as_ref().map_or(0.0, |(policy, _)| policy.gap);

        let mut page = layout.last_page_index();
        let mut cursor = table.end_y;

        if !placement.fits_after(cursor + boxes_height, clearance, height) {
            log::debug!("Trailing blocks do not fit below the table, adding a page");
            page = layout.add_page();
            cursor = self.policy.table.page_top;
        }

        if let Some((policy, blocks)) = &declaration {
            (page, cursor) = self.draw_declaration(layout, page, cursor, policy, blocks);
        }

        let top = placement.block_top(cursor, height);
        self.draw_signatures(layout.page_mut(page), top);
    }

    fn declaration_blocks(&self, policy: &DeclarationPolicy, content: &ReportContent) -> DeclarationBlocks {
        let inner = self.size.width - 2.0 * policy.margin - 4.0;

        let mut entries: Vec<&str> = content.justifications.iter().map(String::as_str).collect();
        if let Some(extra) = self.config.justification() {
            entries.push(extra);
        }
        let justification: Vec<String> = entries
            .into_iter()
            .flat_map(|entry| wrap_text(entry, inner, JUSTIFICATION_SIZE, FontStyle::Regular))
            .collect();

        let statement = wrap_text(policy.statement, inner, STATEMENT_SIZE, FontStyle::Regular);
        let printed = format!(
            "{} : {}",
            policy.printed_label,
            content.printed_at.format("%A, %d/%m/%Y %H:%M:%S")
        );

        DeclarationBlocks {
            justification_height: if justification.is_empty() {
                0.0
            } else {
                policy.justification_box(justification.len())
            },
            statement_height: 4.0 + statement.len() as f32 * policy.statement_line + 4.0,
            justification,
            statement,
            printed,
        }
    }

    /// Draw the justification and statement boxes below `cursor`.
    ///
    /// Justification lines that would run into the signatures continue in
    /// another box on the next page. The statement box is never split; it
    /// moves to a new page when it does not fit. Returns the page and cursor
    /// the signatures follow.
    fn draw_declaration(
        &self,
        layout: &mut PageLayout,
        mut page: usize,
        mut cursor: f32,
        policy: &DeclarationPolicy,
        blocks: &DeclarationBlocks,
    ) -> (usize, f32) {
        let height = self.size.height;
        let placement = self.policy.placement;
        let page_top = self.policy.table.page_top;
        let page_bottom = height - self.policy.table.margin_bottom;
        let x = policy.margin;
        let width = self.size.width - 2.0 * policy.margin;
        let tail = policy.gap + blocks.statement_height + policy.gap;

        let mut remaining = blocks.justification.as_slice();
        let mut heading = true;
        while !remaining.is_empty() {
            let y = cursor + policy.gap;
            let all_end = y + policy.justification_box(remaining.len()) + tail;
            let count = if placement.fits_after(all_end, policy.gap, height) {
                remaining.len()
            } else {
                let room = (page_bottom - y - policy.justification_box(0)) / policy.justification_line;
                (room.max(0.0) as usize).min(remaining.len())
            };

            if count == 0 && cursor > page_top {
                page = layout.add_page();
                cursor = page_top;
                continue;
            }

            let (lines, rest) = remaining.split_at(count.max(1));
            let box_height = policy.justification_box(lines.len());
            let target = layout.page_mut(page);
            boxed(target, x, y, width, box_height);
            if heading {
                target.text(
                    x + 2.0,
                    y + 5.0,
                    JUSTIFICATION_SIZE,
                    FontStyle::Bold,
                    policy.justification_heading,
                );
                heading = false;
            }
            for (i, line) in lines.iter().enumerate() {
                let baseline = y + 5.0 + (i + 1) as f32 * policy.justification_line;
                target.text(x + 2.0, baseline, JUSTIFICATION_SIZE, FontStyle::Regular, line.clone());
            }

            cursor = y + box_height;
            remaining = rest;
            if !remaining.is_empty() {
                log::debug!("Justification continues on a new page ({} line(s) left)", remaining.len());
                page = layout.add_page();
                cursor = page_top;
            }
        }

        if !placement.fits_after(cursor + tail, policy.gap, height) {
            page = layout.add_page();
            cursor = page_top;
        }

        let y = cursor + policy.gap;
        let target = layout.page_mut(page);
        boxed(target, x, y, width, blocks.statement_height);
        for (i, line) in blocks.statement.iter().enumerate() {
            let baseline = y + 4.0 + i as f32 * policy.statement_line;
            target.text(x + 2.0, baseline, STATEMENT_SIZE, FontStyle::Regular, line.clone());
        }
        let printed_y = y + 4.0 + blocks.statement.len() as f32 * policy.statement_line + 1.0;
        target.text(x + 2.0, printed_y, STATEMENT_SIZE, FontStyle::Regular, blocks.printed.clone());

        (page, y + blocks.statement_height + policy.gap)
    }

    fn draw_signatures(&self, page: &mut Page, top: f32) {
        let slots = &self.policy.slots;
        let arrangement = self.policy.arrangement;

        for (index, slot) in slots.iter().enumerate() {
            let x = arrangement.slot_x(index, slots.len(), self.size.width);
            let signer = self.config.signatories.get(slot.role);
            let image = signer.image.as_deref().and_then(|bytes| decode_signature(slot, bytes));

            match arrangement {
                SlotArrangement::Lined { .. } => {
                    self.draw_lined_slot(page, x, top, slot, signer.name(), image)
                }
                SlotArrangement::Columns { margin } => {
                    let column = (self.size.width - 2.0 * margin) / slots.len().max(1) as f32;
                    draw_column_slot(page, x, top, column, slot, signer.name(), image)
                }
            }
        }
    }

    fn draw_lined_slot(
        &self,
        page: &mut Page,
        x: f32,
        top: f32,
        slot: &SignatureSlot,
        name: Option<&str>,
        image: Option<Arc<RasterImage>>,
    ) {
        page.text(x, top, CAPTION_SIZE, FontStyle::Regular, slot.caption);

        if let Some(image) = image {
            let (width, height) = image.fit_within(SIGNATURE_LINE_LENGTH, SIGNATURE_IMAGE_HEIGHT);
            page.push(DrawOp::Image {
                x,
                y: top + 14.0 - height,
                width,
                height,
                image,
            });
        }

        page.line(
            (x, top + 15.0),
            (x + SIGNATURE_LINE_LENGTH, top + 15.0),
            Stroke::RULE,
        );
        page.text(
            x,
            top + 20.0,
            CAPTION_SIZE,
            FontStyle::Regular,
            name.unwrap_or(slot.placeholder),
        );
        if let Some((label, offset)) = slot.role_label {
            page.text(x + offset, top + 25.0, ROLE_LABEL_SIZE, FontStyle::Regular, label);
        }
    }

    fn draw_page_numbers(&self, layout: &mut PageLayout) {
        let total = layout.page_count();
        let (x, y) = (self.size.width - 30.0, self.size.height - 10.0);
        for index in 0..total {
            layout.page_mut(index).text(
                x,
                y,
                FOOTER_SIZE,
                FontStyle::Regular,
                format!("Page {} of {total}", index + 1),
            );
        }
    }
}

struct DeclarationBlocks {
    justification: Vec<String>,
    justification_height: f32,
    statement: Vec<String>,
    statement_height: f32,
    printed: String,
}

impl DeclarationBlocks {
    fn total_height(&self, gap: f32) -> f32 {
        let justification = if self.justification.is_empty() {
            0.0
        } else {
            self.justification_height + gap
        };
        gap + justification + self.statement_height + gap
    }
}

fn draw_column_slot(
    page: &mut Page,
    x: f32,
    top: f32,
    column: f32,
    slot: &SignatureSlot,
    name: Option<&str>,
    image: Option<Arc<RasterImage>>,
) {
    page.text(x, top, COLUMN_SIGNATURE_SIZE, FontStyle::Bold, slot.caption);

    if let Some(image) = image {
        let max_width = (column - 10.0).clamp(10.0, SIGNATURE_LINE_LENGTH);
        let (width, height) = image.fit_within(max_width, SIGNATURE_IMAGE_HEIGHT + 1.0);
        page.push(DrawOp::Image {
            x,
            y: top + 16.0 - height,
            width,
            height,
            image,
        });
    }

    page.text(
        x,
        top + 20.0,
        COLUMN_SIGNATURE_SIZE,
        FontStyle::Bold,
        format!("( {} )", name.unwrap_or(slot.placeholder)),
    );
}

fn decode_signature(slot: &SignatureSlot, bytes: &[u8]) -> Option<Arc<RasterImage>> {
    match RasterImage::decode(bytes) {
        Ok(image) => Some(Arc::new(image)),
        Err(e) => {
            log::warn!("Skipping signature image for {:?}: {e}", slot.role);
            None
        }
    }
}

fn centered(page: &mut Page, page_width: f32, y: f32, size: f32, style: FontStyle, text: &str) {
    let x = (page_width - text_width(text, size, style)) / 2.0;
    page.text(x, y, size, style, text);
}

fn boxed(page: &mut Page, x: f32, y: f32, width: f32, height: f32) {
    page.push(DrawOp::Rect {
        x,
        y,
        width,
        height,
        fill: None,
        stroke: Some(Stroke::HAIRLINE),
    });
}
