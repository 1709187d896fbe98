//! Minimal table renderer on top of `lopdf`.
//!
//! Text uses the standard Helvetica fonts with WinAnsi encoding, so no font
//! files are embedded. Rows that do not fit on the remaining page space start
//! a new page; a row taller than a whole page is split between its wrapped
//! lines and continues on the following pages.

use crate::core::report::{Align, PageLayout, ReportCell, ReportTable};
use crate::utils::error::{CatalogError, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, StringFormat};

const REGULAR_FONT: &[u8] = b"F1";
const BOLD_FONT: &[u8] = b"F2";
const LINE_SPACING: f32 = 1.25;

/// Helvetica advance widths (1/1000 em) for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

fn char_width(ch: char, bold: bool) -> f32 {
    let code = ch as u32;
    let base = if (32..=126).contains(&code) {
        HELVETICA_WIDTHS[(code - 32) as usize] as f32
    } else {
        556.0
    };
    // Helvetica-Bold runs a little wider; close enough for wrapping.
    if bold {
        base * 1.07
    } else {
        base
    }
}

pub(crate) fn text_width(text: &str, font_size: f32, bold: bool) -> f32 {
    text.chars().map(|c| char_width(c, bold)).sum::<f32>() * font_size / 1000.0
}

/// Greedy word wrap. Words wider than `max_width` are split by character.
pub(crate) fn wrap_text(text: &str, max_width: f32, font_size: f32, bold: bool) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{} {}", current, word)
        };

        if text_width(&candidate, font_size, bold) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }

        if text_width(word, font_size, bold) <= max_width {
            current = word.to_string();
        } else {
            for ch in word.chars() {
                current.push(ch);
                if text_width(&current, font_size, bold) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::replace(&mut current, ch.to_string()));
                }
            }
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Encodes text for a WinAnsi font; characters outside the code page become `?`.
pub(crate) fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| match ch {
            '\u{20}'..='\u{7e}' => ch as u8,
            '\u{a0}'..='\u{ff}' => ch as u32 as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

fn real(value: f32) -> Object {
    value.into()
}

struct Geometry {
    table_left: f32,
    column_width: f32,
    top: f32,
    bottom: f32,
    padding: f32,
    font_size: f32,
    leading: f32,
}

impl Geometry {
    fn new(page: &PageLayout, column_count: usize) -> Self {
        let available = page.width - page.margin_left - page.margin_right;
        let table_width = available * page.table_width_percentage / 100.0;
        Self {
            table_left: page.margin_left + (available - table_width) / 2.0,
            column_width: table_width / column_count.max(1) as f32,
            top: page.height - page.margin_top,
            bottom: page.margin_bottom,
            padding: page.cell_padding,
            font_size: page.font_size,
            leading: page.font_size * LINE_SPACING,
        }
    }

    fn row_height(&self, line_count: usize) -> f32 {
        line_count as f32 * self.leading + 2.0 * self.padding
    }

    /// Text lines a row starting at `y` can hold before reaching the bottom margin.
    fn lines_fitting(&self, y: f32) -> usize {
        let room = (y - self.bottom - 2.0 * self.padding) / self.leading;
        if room < 1.0 {
            0
        } else {
            room.floor() as usize
        }
    }
}

struct PlacedCell<'a> {
    cell: &'a ReportCell,
    x: f32,
    width: f32,
    lines: Vec<String>,
}

/// Wraps every cell of a row; returns the cells and the row's line count.
fn place_row<'a>(cells: &'a [ReportCell], geometry: &Geometry) -> (Vec<PlacedCell<'a>>, usize) {
    let mut placed = Vec::with_capacity(cells.len());
    let mut x = geometry.table_left;
    let mut max_lines = 1;

    for cell in cells {
        let width = geometry.column_width * cell.colspan.max(1) as f32;
        let lines = wrap_text(
            &cell.text,
            width - 2.0 * geometry.padding,
            geometry.font_size,
            cell.bold,
        );
        max_lines = max_lines.max(lines.len());
        placed.push(PlacedCell { cell, x, width, lines });
        x += width;
    }

    (placed, max_lines)
}

/// Draws lines `first..first + count` of a placed row with its top edge at `y_top`.
fn draw_row(
    ops: &mut Vec<Operation>,
    placed: &[PlacedCell<'_>],
    first: usize,
    count: usize,
    y_top: f32,
    geometry: &Geometry,
) {
    let height = geometry.row_height(count);
    for cell in placed {
        ops.push(Operation::new(
            "re",
            vec![real(cell.x), real(y_top - height), real(cell.width), real(height)],
        ));
        ops.push(Operation::new("S", vec![]));

        let font = if cell.cell.bold { BOLD_FONT } else { REGULAR_FONT };
        for (i, line) in cell.lines.iter().skip(first).take(count).enumerate() {
            if line.is_empty() {
                continue;
            }
            let x = match cell.cell.align {
                Align::Left => cell.x + geometry.padding,
                Align::Center => {
                    let line_width = text_width(line, geometry.font_size, cell.cell.bold);
                    cell.x + (cell.width - line_width) / 2.0
                }
            };
            let baseline = y_top - geometry.padding - geometry.font_size - i as f32 * geometry.leading;

            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![Object::Name(font.to_vec()), real(geometry.font_size)],
            ));
            ops.push(Operation::new("Td", vec![real(x), real(baseline)]));
            ops.push(Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(line), StringFormat::Literal)],
            ));
            ops.push(Operation::new("ET", vec![]));
        }
    }
}

/// Splits the table into per-page content operations.
fn paginate(table: &ReportTable, page: &PageLayout) -> Vec<Vec<Operation>> {
    let geometry = Geometry::new(page, table.column_count);
    let start_page = || vec![Operation::new("w", vec![real(page.border_width)])];

    let mut pages = Vec::new();
    let mut ops = start_page();
    let mut y = geometry.top;
    let mut rows_on_page = 0usize;
    let full_page = geometry.lines_fitting(geometry.top).max(1);

    for row in &table.rows {
        let (placed, line_count) = place_row(&row.cells, &geometry);
        let mut first = 0;

        while first < line_count {
            let remaining = line_count - first;
            let fits = geometry.lines_fitting(y);

            // Keep a row whole when a fresh page can hold it; split it otherwise.
            if rows_on_page > 0 && fits < remaining && (fits == 0 || remaining <= full_page) {
                pages.push(std::mem::replace(&mut ops, start_page()));
                y = geometry.top;
                rows_on_page = 0;
                continue;
            }

            let count = remaining.min(fits.max(1));
            draw_row(&mut ops, &placed, first, count, y, &geometry);
            y -= geometry.row_height(count);
            rows_on_page += 1;
            first += count;

            if first < line_count {
                pages.push(std::mem::replace(&mut ops, start_page()));
                y = geometry.top;
                rows_on_page = 0;
            }
        }
    }

    pages.push(ops);
    pages
}

fn render_err(e: impl std::fmt::Display) -> CatalogError {
    CatalogError::Render {
        message: e.to_string(),
    }
}

fn add_font(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Renders the table into a finished PDF document.
///
/// The output buffer is owned by this call and handed back only once the
/// document has been fully written; on failure it is dropped with the error.
pub fn render(table: &ReportTable, page: &PageLayout, title: &str) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = add_font(&mut doc, "Helvetica");
    let bold_id = add_font(&mut doc, "Helvetica-Bold");
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular_id,
            "F2" => bold_id,
        },
    });

    let mut kids = Vec::new();
    for operations in paginate(table, page) {
        let content = Content { operations };
        let stream = lopdf::Stream::new(dictionary! {}, content.encode().map_err(render_err)?);
        let content_id = doc.add_object(stream);
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => Object::Array(kids),
        "Count" => Object::Integer(page_count),
        "Resources" => resources_id,
        "MediaBox" => Object::Array(vec![real(0.0), real(0.0), real(page.width), real(page.height)]),
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(encode_win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal("cartelera"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).map_err(render_err)?;

    tracing::debug!(pages = page_count, "serialized PDF document");
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::report::{ReportCell, ReportRow};

    fn table_with_rows(count: usize) -> ReportTable {
        let mut rows = vec![
            ReportRow {
                cells: vec![ReportCell::banner("Banner")],
            },
            ReportRow {
                cells: ["Title", "Release Date", "Genre", "Ticket Price"]
                    .iter()
                    .map(|h| ReportCell::plain(*h))
                    .collect(),
            },
        ];
        for i in 0..count {
            rows.push(ReportRow {
                cells: vec![
                    ReportCell::plain(format!("Movie {}", i)),
                    ReportCell::plain("01/01/2020"),
                    ReportCell::plain("Drama"),
                    ReportCell::plain("$5.00"),
                ],
            });
        }
        ReportTable { column_count: 4, rows }
    }

    #[test]
    fn test_wrap_short_text_is_single_line() {
        assert_eq!(wrap_text("Dune", 100.0, 12.0, false), vec!["Dune"]);
        assert_eq!(wrap_text("", 100.0, 12.0, false), vec![""]);
    }

    #[test]
    fn test_wrap_long_text_respects_width() {
        let text = "The Lord of the Rings: The Return of the King";
        let lines = wrap_text(text, 100.0, 12.0, false);

        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| text_width(l, 12.0, false) <= 100.0));
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_oversized_word() {
        let lines = wrap_text("Supercalifragilisticexpialidocious", 40.0, 12.0, false);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "Supercalifragilisticexpialidocious");
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Año 8,50 €"), b"A\xf1o 8,50 \x80".to_vec());
        assert_eq!(encode_win_ansi("映画"), b"??".to_vec());
    }

    #[test]
    fn test_geometry_centers_table() {
        let geometry = Geometry::new(&PageLayout::a4(), 4);
        let available = 595.28 - 20.0;
        let table_width = available * 0.8;

        assert!((geometry.table_left - (10.0 + (available - table_width) / 2.0)).abs() < 0.01);
        assert!((geometry.column_width * 4.0 - table_width).abs() < 0.01);
        assert!((geometry.top - (841.89 - 10.0)).abs() < 0.01);
        assert_eq!(geometry.bottom, 0.0);
    }

    #[test]
    fn test_small_table_fits_one_page() {
        assert_eq!(paginate(&table_with_rows(3), &PageLayout::a4()).len(), 1);
    }

    #[test]
    fn test_large_table_overflows() {
        assert!(paginate(&table_with_rows(200), &PageLayout::a4()).len() > 1);
    }

    fn text_positions(pages: &[Vec<Operation>]) -> Vec<(usize, f32)> {
        let mut positions = Vec::new();
        for (index, ops) in pages.iter().enumerate() {
            for op in ops.iter().filter(|op| op.operator == "Td") {
                positions.push((index, op.operands[1].as_float().unwrap()));
            }
        }
        positions
    }

    #[test]
    fn test_oversize_row_continues_on_next_pages() {
        let title = vec!["Dune"; 1500].join(" ");
        let mut table = table_with_rows(0);
        table.rows.push(ReportRow {
            cells: vec![
                ReportCell::plain(title.clone()),
                ReportCell::plain("10/22/2021"),
                ReportCell::plain("Sci-Fi"),
                ReportCell::plain("$8.50"),
            ],
        });

        let page = PageLayout::a4();
        let geometry = Geometry::new(&page, 4);
        let expected_lines = wrap_text(&title, geometry.column_width - 2.0 * geometry.padding, 12.0, false);
        let pages = paginate(&table, &page);

        assert!(pages.len() > 2);
        let positions = text_positions(&pages);
        assert!(positions.iter().all(|(_, y)| *y >= page.margin_bottom));

        let drawn: Vec<String> = pages
            .iter()
            .flatten()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| match &op.operands[0] {
                Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
                _ => None,
            })
            .filter(|text| text.starts_with("Dune"))
            .collect();
        assert_eq!(drawn, expected_lines);
    }

    #[test]
    fn test_rows_are_not_split_when_a_page_can_hold_them() {
        let pages = paginate(&table_with_rows(200), &PageLayout::a4());
        assert!(pages.len() > 1);

        // Every cell here is one line, so a split row would leave a box without text.
        for ops in &pages {
            let texts = ops.iter().filter(|op| op.operator == "Tj").count();
            let boxes = ops.iter().filter(|op| op.operator == "re").count();
            assert_eq!(texts, boxes);
        }
    }

    #[test]
    fn test_render_produces_pdf() {
        let bytes = render(&table_with_rows(2), &PageLayout::a4(), "Banner").unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }
}
