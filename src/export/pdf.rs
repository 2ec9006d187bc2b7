//! Renders transactions as a PDF report.
//!
//! The report is a US letter document with a title, a summary of the totals
//! and a table of transactions. The table continues on new pages, repeating
//! the header row, when it does not fit on one page.
//!
//! Text is set in the PDF builtin Helvetica fonts, which only cover Latin-1.
//! Other characters are printed as "?".

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};
use printpdf::path::{PaintMode, WindingOrder};

use crate::{
    Error,
    dashboard::dashboard_stats,
    export::csv::{REPORT_COLUMNS, format_report_date},
    transaction::Transaction,
};

const REPORT_TITLE: &str = "Expense Tracker Report";
const LAYER_NAME: &str = "Layer 1";

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN: f32 = 20.0;

const TITLE_FONT_SIZE: f32 = 18.0;
const BODY_FONT_SIZE: f32 = 11.0;
const TABLE_FONT_SIZE: f32 = 9.0;

const SUMMARY_LINE_HEIGHT: f32 = 6.0;
const ROW_HEIGHT: f32 = 7.0;
const CELL_PADDING: f32 = 2.0;
const TEXT_BASELINE_OFFSET: f32 = 5.0;
const GRID_THICKNESS: f32 = 0.5;

/// The top of the table on the first page, below the title and summary.
const FIRST_PAGE_TABLE_TOP: f32 = 222.0;
/// The top of the table on later pages.
const NEXT_PAGE_TABLE_TOP: f32 = PAGE_HEIGHT - MARGIN;

/// Helvetica's average glyph width as a fraction of the font size.
const AVERAGE_CHAR_WIDTH: f32 = 0.5;
const POINTS_TO_MM: f32 = 0.3528;

const HEADER_BACKGROUND: (f32, f32, f32) = (0.5, 0.5, 0.5);
const HEADER_TEXT: (f32, f32, f32) = (0.96, 0.96, 0.96);
const BODY_BACKGROUND: (f32, f32, f32) = (0.96, 0.96, 0.86);
const BODY_TEXT: (f32, f32, f32) = (0.0, 0.0, 0.0);

const COLUMN_WIDTHS: [f32; 5] = [25.0, 22.0, 40.0, 60.0, 28.9];
/// The most characters that fit in each column at [TABLE_FONT_SIZE].
const COLUMN_MAX_CHARS: [usize; 5] = [12, 10, 20, 32, 14];

type TableRow = [String; 5];

/// Write `transactions` as a PDF report.
///
/// # Errors
///
/// Returns an [Error::ExportError] if the fonts could not be loaded or the
/// document could not be serialized.
pub fn render_pdf(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let stats = dashboard_stats(transactions);
    let rows = transactions
        .iter()
        .map(table_row)
        .collect::<Result<Vec<_>, _>>()?;

    let (document, page, layer) = PdfDocument::new(
        REPORT_TITLE,
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        LAYER_NAME,
    );
    let fonts = Fonts::new(&document)?;
    let first_layer = document.get_page(page).get_layer(layer);

    first_layer.use_text(
        REPORT_TITLE,
        TITLE_FONT_SIZE,
        Mm(MARGIN),
        Mm(PAGE_HEIGHT - MARGIN - TITLE_FONT_SIZE * 0.35),
        &fonts.bold,
    );

    let summary = [
        format!("Total Income: {}", format_money(stats.total_income)),
        format!("Total Expenses: {}", format_money(stats.total_expenses)),
        format!("Balance: {}", format_money(stats.balance)),
    ];
    let mut y = PAGE_HEIGHT - MARGIN - 20.0;
    for line in &summary {
        first_layer.use_text(line, BODY_FONT_SIZE, Mm(MARGIN), Mm(y), &fonts.regular);
        y -= SUMMARY_LINE_HEIGHT;
    }

    let mut pages = split_into_pages(&rows).into_iter();
    if let Some(first_page_rows) = pages.next() {
        draw_table(&first_layer, &fonts, FIRST_PAGE_TABLE_TOP, first_page_rows);
    }

    for page_rows in pages {
        let (page, layer) = document.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
        let layer = document.get_page(page).get_layer(layer);
        draw_table(&layer, &fonts, NEXT_PAGE_TABLE_TOP, page_rows);
    }

    document
        .save_to_bytes()
        .map_err(|error| Error::ExportError(format!("could not write PDF: {error:?}")))
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn new(document: &PdfDocumentReference) -> Result<Self, Error> {
        let load = |font| {
            document
                .add_builtin_font(font)
                .map_err(|error| Error::ExportError(format!("could not load font: {error:?}")))
        };

        Ok(Self {
            regular: load(BuiltinFont::Helvetica)?,
            bold: load(BuiltinFont::HelveticaBold)?,
        })
    }
}

fn table_row(transaction: &Transaction) -> Result<TableRow, Error> {
    Ok([
        format_report_date(transaction)?,
        transaction.kind.label().to_owned(),
        transaction.category.clone(),
        transaction.description.clone(),
        format_money(transaction.amount),
    ])
}

fn format_money(amount: f64) -> String {
    format!("${amount:.2}")
}

/// The number of body rows that fit under the header row starting at `table_top`.
fn rows_that_fit(table_top: f32) -> usize {
    let total_rows = ((table_top - MARGIN) / ROW_HEIGHT).floor() as usize;
    total_rows.saturating_sub(1).max(1)
}

/// Split `rows` into the rows shown on each page.
///
/// There is always at least one page, even when there are no rows.
fn split_into_pages(rows: &[TableRow]) -> Vec<&[TableRow]> {
    let first_page_len = rows_that_fit(FIRST_PAGE_TABLE_TOP).min(rows.len());
    let (first_page, rest) = rows.split_at(first_page_len);

    let mut pages = vec![first_page];
    pages.extend(rest.chunks(rows_that_fit(NEXT_PAGE_TABLE_TOP)));
    pages
}

/// The fill and text colours of a table row.
struct RowStyle<'a> {
    font: &'a IndirectFontRef,
    background: (f32, f32, f32),
    text: (f32, f32, f32),
}

fn draw_table(layer: &PdfLayerReference, fonts: &Fonts, table_top: f32, rows: &[TableRow]) {
    let header = REPORT_COLUMNS.map(str::to_owned);
    let header_style = RowStyle {
        font: &fonts.bold,
        background: HEADER_BACKGROUND,
        text: HEADER_TEXT,
    };
    let body_style = RowStyle {
        font: &fonts.regular,
        background: BODY_BACKGROUND,
        text: BODY_TEXT,
    };

    draw_row(layer, &header_style, table_top, &header);

    let mut row_top = table_top - ROW_HEIGHT;
    for row in rows {
        draw_row(layer, &body_style, row_top, row);
        row_top -= ROW_HEIGHT;
    }
}

fn draw_row(layer: &PdfLayerReference, style: &RowStyle, row_top: f32, cells: &TableRow) {
    let row_bottom = row_top - ROW_HEIGHT;
    let row_right = MARGIN + COLUMN_WIDTHS.iter().sum::<f32>();

    layer.set_fill_color(rgb(style.background));
    layer.add_polygon(Polygon {
        rings: vec![outline(MARGIN, row_top, row_right, row_bottom).points],
        mode: PaintMode::Fill,
        winding_order: WindingOrder::NonZero,
    });

    layer.set_fill_color(rgb(style.text));
    layer.set_outline_thickness(GRID_THICKNESS);

    let mut cell_left = MARGIN;
    for ((cell, width), max_chars) in cells.iter().zip(COLUMN_WIDTHS).zip(COLUMN_MAX_CHARS) {
        let text = truncate(&latin1(cell), max_chars);
        let text_left = cell_left + centered_offset(&text, width);

        layer.use_text(
            text,
            TABLE_FONT_SIZE,
            Mm(text_left),
            Mm(row_top - TEXT_BASELINE_OFFSET),
            style.font,
        );
        layer.add_line(outline(cell_left, row_top, cell_left + width, row_bottom));
        cell_left += width;
    }
}

fn rgb((r, g, b): (f32, f32, f32)) -> Color {
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// The distance from the left of a cell `cell_width` wide to the start of
/// `text` so that it sits in the middle of the cell.
///
/// Widths are estimated from the character count since the builtin fonts are
/// used without their metrics.
fn centered_offset(text: &str, cell_width: f32) -> f32 {
    let text_width =
        text.chars().count() as f32 * TABLE_FONT_SIZE * AVERAGE_CHAR_WIDTH * POINTS_TO_MM;

    ((cell_width - text_width) / 2.0).max(CELL_PADDING)
}

/// Replace characters the builtin fonts cannot draw with "?".
fn latin1(text: &str) -> String {
    text.chars()
        .map(|c| if (c as u32) <= 0xFF && !c.is_control() { c } else { '?' })
        .collect()
}

fn outline(left: f32, top: f32, right: f32, bottom: f32) -> Line {
    Line {
        points: vec![
            (Point::new(Mm(left), Mm(top)), false),
            (Point::new(Mm(right), Mm(top)), false),
            (Point::new(Mm(right), Mm(bottom)), false),
            (Point::new(Mm(left), Mm(bottom)), false),
        ],
        is_closed: true,
    }
}

/// Shorten `text` to at most `max_chars` characters, marking cut text with "...".
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_owned();
    }

    let mut truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
