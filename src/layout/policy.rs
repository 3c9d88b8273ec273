//! Per-report layout decisions.
//!
//! A [`LayoutPolicy`] is plain data: it describes where the title goes, how
//! the table looks, where the signature block sits and which slots it has.
//! The composer interprets it. Report variants differ only in the policy
//! value they carry.

use super::table::{Align, ColumnWidths, TableStyle};
use super::{Rgb, Stroke};
use crate::config::SignatoryRole;

/// Statement printed in the attendance declaration box.
pub const ATTENDANCE_DECLARATION: &str = "Dengan ini saya menyatakan dengan sebenarnya bahwa \
seluruh data dan informasi yang saya sampaikan dalam dokumen ini adalah benar dan dapat \
dipertanggung jawabkan. Apabila ditemukan data yang tidak valid atau palsu, saya bersedia \
menerima sanksi sesuai dengan peraturan yang berlaku.";

/// Column widths of the attendance register, in mm.
pub const ATTENDANCE_COLUMN_WIDTHS: [f32; 10] =
    [10.0, 20.0, 40.0, 25.0, 45.0, 15.0, 15.0, 15.0, 15.0, 60.0];

/// Title block at the top of the first page.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderStyle {
    /// Title used when the user gives none.
    pub default_title: &'static str,
    /// Title size in points.
    pub title_size: f32,
    /// Title baseline, mm from the top.
    pub title_y: f32,
    /// Print the period and signatory name lines under the title.
    pub show_details: bool,
    /// Fixed table start. `None` starts the table after the header block.
    pub table_top: Option<f32>,
}

/// Vertical placement of the signature block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignaturePlacement {
    /// Follows the table: `min(table_end + gap, page_height - bottom_reserve)`.
    FollowTable {
        /// Distance below the table, mm.
        gap: f32,
        /// Space the block keeps free at the page bottom, mm.
        bottom_reserve: f32,
    },
    /// Fixed distance from the page bottom.
    PinnedBottom {
        /// Block top is `page_height - offset`, mm.
        offset: f32,
    },
}

impl SignaturePlacement {
    /// Top of the block for a table ending at `table_end`.
    pub fn block_top(self, table_end: f32, page_height: f32) -> f32 {
        match self {
            Self::FollowTable {
                gap,
                bottom_reserve,
            } => (table_end + gap).min(page_height - bottom_reserve),
            Self::PinnedBottom { offset } => page_height - offset,
        }
    }

    /// Whether a block placed after content ending at `end` keeps at least
    /// `clearance` mm between the two.
    pub fn fits_after(self, end: f32, clearance: f32, page_height: f32) -> bool {
        self.block_top(end, page_height) >= end + clearance
    }
}

/// How the slots are spread across the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SlotArrangement {
    /// First slot at `left_x`, the last at `page_width - right_inset`, each
    /// with a signing line and a role caption.
    Lined {
        /// Left slot x, mm.
        left_x: f32,
        /// Right slot distance from the right edge, mm.
        right_inset: f32,
    },
    /// Equal columns between the margins, names printed as `( NAME )`.
    Columns {
        /// Left and right margin, mm.
        margin: f32,
    },
}

impl SlotArrangement {
    /// X position of slot `index` out of `count`.
    pub fn slot_x(self, index: usize, count: usize, page_width: f32) -> f32 {
        match self {
            Self::Lined {
                left_x,
                right_inset,
            } => {
                if index == 0 || count < 2 {
                    left_x
                } else {
                    let right = page_width - right_inset;
                    left_x + (right - left_x) * index as f32 / (count - 1) as f32
                }
            }
            Self::Columns { margin } => {
                let column = (page_width - 2.0 * margin) / count.max(1) as f32;
                margin + column * index as f32
            }
        }
    }
}

/// One signature slot.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureSlot {
    /// Whose name and image fill the slot.
    pub role: SignatoryRole,
    /// Caption above the slot.
    pub caption: &'static str,
    /// Printed when no name is set.
    pub placeholder: &'static str,
    /// Small caption under the name, with its x offset in mm.
    pub role_label: Option<(&'static str, f32)>,
}

/// Justification and declaration boxes printed before the signatures.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationPolicy {
    /// Heading of the justification box.
    pub justification_heading: &'static str,
    /// Fixed statement text.
    pub statement: &'static str,
    /// Label before the print timestamp.
    pub printed_label: &'static str,
    /// Left and right margin, mm.
    pub margin: f32,
    /// Space between consecutive sections, mm.
    pub gap: f32,
    /// Height of one justification line, mm.
    pub justification_line: f32,
    /// Height of one statement line, mm.
    pub statement_line: f32,
}

impl DeclarationPolicy {
    /// Height of a justification box holding `lines` lines.
    pub fn justification_box(&self, lines: usize) -> f32 {
        5.0 + lines as f32 * self.justification_line + 3.0
    }
}

/// Full description of one report variant's layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPolicy {
    /// Title block.
    pub header: HeaderStyle,
    /// Table look. The font size is replaced by the user's setting.
    pub table: TableStyle,
    /// Print `Page X of Y` on every page.
    pub page_numbers: bool,
    /// Signature block placement.
    pub placement: SignaturePlacement,
    /// Signature slot positions.
    pub arrangement: SlotArrangement,
    /// Slots, left to right.
    pub slots: Vec<SignatureSlot>,
    /// Optional justification and declaration boxes.
    pub declaration: Option<DeclarationPolicy>,
}

impl LayoutPolicy {
    /// Timesheet layout: centered title with period and names, blue header
    /// row, zebra rows, page numbers, two lined signature slots following
    /// the table.
    pub fn timesheet(default_title: &'static str) -> Self {
        Self {
            header: HeaderStyle {
                default_title,
                title_size: 18.0,
                title_y: 20.0,
                show_details: true,
                table_top: None,
            },
            table: TableStyle::default(),
            page_numbers: true,
            placement: SignaturePlacement::FollowTable {
                gap: 20.0,
                bottom_reserve: 50.0,
            },
            arrangement: SlotArrangement::Lined {
                left_x: 40.0,
                right_inset: 80.0,
            },
            slots: vec![
                SignatureSlot {
                    role: SignatoryRole::Employee,
                    caption: "Prepared by:",
                    placeholder: "_________________",
                    role_label: Some(("Employee", 10.0)),
                },
                SignatureSlot {
                    role: SignatoryRole::TeamLeader,
                    caption: "Approved by:",
                    placeholder: "_________________",
                    role_label: Some(("Team Leader", 8.0)),
                },
            ],
            declaration: None,
        }
    }

    /// Attendance register layout: plain gridded table with fixed widths,
    /// justification and declaration boxes, three signature columns pinned
    /// near the page bottom.
    pub fn attendance_register() -> Self {
        Self {
            header: HeaderStyle {
                default_title: "Attendance Report",
                title_size: 16.0,
                title_y: 15.0,
                show_details: false,
                table_top: Some(22.0),
            },
            table: TableStyle {
                font_size: 7.0,
                cell_padding: 1.5,
                min_cell_height: 0.0,
                margin_left: 10.0,
                margin_right: 10.0,
                page_top: 10.0,
                margin_bottom: 10.0,
                header_fill: Some(Rgb::WHITE),
                header_text: Rgb::BLACK,
                header_align: Align::Left,
                alternate_fill: None,
                grid: Some(Stroke::HAIRLINE),
                widths: ColumnWidths::Fixed(ATTENDANCE_COLUMN_WIDTHS.to_vec()),
            },
            page_numbers: false,
            placement: SignaturePlacement::PinnedBottom { offset: 40.0 },
            arrangement: SlotArrangement::Columns { margin: 10.0 },
            slots: vec![
                SignatureSlot {
                    role: SignatoryRole::Employee,
                    caption: "Tanda Tangan Pegawai,",
                    placeholder: "EMPLOYEE NAME",
                    role_label: None,
                },
                SignatureSlot {
                    role: SignatoryRole::Checker,
                    caption: "Diperiksa Oleh :",
                    placeholder: "CHECKER NAME",
                    role_label: None,
                },
                SignatureSlot {
                    role: SignatoryRole::Approver,
                    caption: "Disetujui Oleh :",
                    placeholder: "APPROVER NAME",
                    role_label: None,
                },
            ],
            declaration: Some(DeclarationPolicy {
                justification_heading: "Justifikasi :",
                statement: ATTENDANCE_DECLARATION,
                printed_label: "Tanggal Cetak",
                margin: 10.0,
                gap: 3.0,
                justification_line: 4.0,
                statement_line: 3.0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(40.0, 60.0)]
    #[case(230.0, 247.0)]
    #[case(280.0, 247.0)]
    fn test_follow_table_block_top(#[case] table_end: f32, #[case] expected: f32) {
        let placement = SignaturePlacement::FollowTable {
            gap: 20.0,
            bottom_reserve: 50.0,
        };
        assert_eq!(placement.block_top(table_end, 297.0), expected);
    }

    #[test]
    fn test_follow_table_fits() {
        let placement = SignaturePlacement::FollowTable {
            gap: 20.0,
            bottom_reserve: 50.0,
        };
        assert!(placement.fits_after(240.0, 0.0, 297.0));
        assert!(!placement.fits_after(260.0, 0.0, 297.0));
        assert!(!placement.fits_after(245.0, 3.0, 297.0));

        let pinned = SignaturePlacement::PinnedBottom { offset: 40.0 };
        assert!(pinned.fits_after(167.0, 3.0, 210.0));
        assert!(!pinned.fits_after(168.0, 3.0, 210.0));
    }

    #[test]
    fn test_pinned_ignores_table() {
        let placement = SignaturePlacement::PinnedBottom { offset: 40.0 };
        assert_eq!(placement.block_top(10.0, 210.0), 170.0);
        assert_eq!(placement.block_top(100.0, 210.0), 170.0);
    }

    #[test]
    fn test_lined_slots() {
        let arrangement = SlotArrangement::Lined {
            left_x: 40.0,
            right_inset: 80.0,
        };
        assert_eq!(arrangement.slot_x(0, 2, 297.0), 40.0);
        assert_eq!(arrangement.slot_x(1, 2, 297.0), 217.0);
    }

    #[test]
    fn test_column_slots() {
        let arrangement = SlotArrangement::Columns { margin: 10.0 };
        let width = (297.0 - 20.0) / 3.0;
        assert_eq!(arrangement.slot_x(0, 3, 297.0), 10.0);
        assert!((arrangement.slot_x(2, 3, 297.0) - (10.0 + 2.0 * width)).abs() < 1e-4);
    }

    #[test]
    fn test_attendance_widths_fit_landscape() {
        let total: f32 = ATTENDANCE_COLUMN_WIDTHS.iter().sum();
        assert!(total <= 297.0 - 20.0);
    }
}
