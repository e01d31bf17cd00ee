use std::collections::VecDeque;

use pdf_writer::Content;

use crate::error::Error;
use crate::fonts::DocumentFonts;
use crate::model::{LIGHT_GRAY, Table, TableRow};

use super::ReportDocument;
use super::layout::{TextLine, build_paragraph_lines, line_ascent, render_line};

const BORDER_WIDTH: f32 = 0.5;

/// A row laid out against the column widths, ready to draw.
struct RowLayout<'r> {
    row: &'r TableRow,
    cells: Vec<Vec<TextLine>>,
    height: f32,
}

fn layout_row<'r>(
    row: &'r TableRow,
    col_widths: &[f32],
    padding: f32,
    line_spacing: f32,
    fonts: &DocumentFonts<'_>,
) -> RowLayout<'r> {
    let mut height = 0.0f32;
    let cells: Vec<Vec<TextLine>> = row
        .cells
        .iter()
        .zip(col_widths)
        .map(|(cell, &w)| {
            let lines = build_paragraph_lines(&cell.runs, fonts, (w - 2.0 * padding).max(1.0));
            let text_h: f32 = lines.iter().map(|l| l.height(line_spacing)).sum();
            height = height.max(text_h + 2.0 * padding);
            lines
        })
        .collect();
    RowLayout { row, cells, height }
}

/// Split a row taller than `max_height` into pieces that each fit, cutting
/// every cell between lines. Pieces keep the row's shading and alignment.
fn split_row(layout: RowLayout<'_>, max_height: f32, padding: f32, line_spacing: f32) -> Vec<RowLayout<'_>> {
    if layout.height <= max_height {
        return vec![layout];
    }
    let budget = max_height - 2.0 * padding;
    let row = layout.row;
    let mut remaining: Vec<VecDeque<TextLine>> = layout.cells.into_iter().map(VecDeque::from).collect();
    let mut pieces = Vec::new();
    while remaining.iter().any(|c| !c.is_empty()) {
        let mut height = 0.0f32;
        let cells: Vec<Vec<TextLine>> = remaining
            .iter_mut()
            .map(|lines| {
                let mut taken = Vec::new();
                let mut used = 0.0f32;
                while let Some(h) = lines.front().map(|l| l.height(line_spacing)) {
                    if !taken.is_empty() && used + h > budget {
                        break;
                    }
                    used += h;
                    taken.extend(lines.pop_front());
                }
                height = height.max(used + 2.0 * padding);
                taken
            })
            .collect();
        pieces.push(RowLayout { row, cells, height });
    }
    pieces
}

fn draw_row(
    content: &mut Content,
    links: &mut Vec<super::layout::LinkAnnotation>,
    fonts: &mut DocumentFonts<'_>,
    layout: &RowLayout<'_>,
    col_x: &[f32],
    col_widths: &[f32],
    top: f32,
    padding: f32,
    line_spacing: f32,
    borders: bool,
) {
    let total_w: f32 = col_widths.iter().sum();
    let left = col_x.first().copied().unwrap_or(0.0);
    let bottom = top - layout.height;

    if let Some([r, g, b]) = layout.row.shading {
        content.save_state();
        content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        content.rect(left, bottom, total_w, layout.height);
        content.fill_nonzero();
        content.restore_state();
    }

    for (ci, lines) in layout.cells.iter().enumerate() {
        let alignment = layout.row.cells[ci].alignment;
        let text_x = col_x[ci] + padding;
        let text_w = (col_widths[ci] - 2.0 * padding).max(1.0);
        let mut y = top - padding;
        let last = lines.len().saturating_sub(1);
        for (li, line) in lines.iter().enumerate() {
            let baseline = y - line_ascent(line, fonts);
            render_line(
                content, line, alignment, text_x, text_w, baseline, li == last, links, fonts,
            );
            y -= line.height(line_spacing);
        }
    }

    if borders {
        let [r, g, b] = LIGHT_GRAY;
        content.save_state();
        content.set_line_width(BORDER_WIDTH);
        content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        content.rect(left, bottom, total_w, layout.height);
        for &x in col_x.iter().skip(1) {
            content.move_to(x, top);
            content.line_to(x, bottom);
        }
        content.stroke();
        content.restore_state();
    }
}

impl ReportDocument<'_> {
    /// Draw a table, breaking pages between rows. The header row is repeated
    /// at the top of every continuation page.
    pub fn table(&mut self, table: &Table) -> Result<(), Error> {
        let ncols = table.col_weights.len();
        if ncols == 0 {
            return Err(Error::Pdf("table without columns".into()));
        }
        let weight_sum: f32 = table.col_weights.iter().sum();
        if !(weight_sum > 0.0) || table.col_weights.iter().any(|w| *w < 0.0) {
            return Err(Error::Pdf("table column weights must be positive".into()));
        }
        for row in table.header.iter().chain(&table.rows) {
            if row.cells.len() != ncols {
                return Err(Error::Pdf(format!(
                    "table row has {} cells, expected {ncols}",
                    row.cells.len()
                )));
            }
        }

        let content_w = self.content_width();
        let col_widths: Vec<f32> = table
            .col_weights
            .iter()
            .map(|w| w / weight_sum * content_w)
            .collect();
        let mut col_x = Vec::with_capacity(ncols);
        let mut x = self.profile.margin.left;
        for w in &col_widths {
            col_x.push(x);
            x += w;
        }

        // Cell text is set tighter than body text.
        let line_spacing = self.profile.line_spacing.min(1.2);
        let padding = table.cell_padding;
        let header = table
            .header
            .as_ref()
            .map(|h| layout_row(h, &col_widths, padding, line_spacing, &self.fonts));
        let header_h = header.as_ref().map_or(0.0, |h| h.height);
        // A fresh page holds the header plus at most this much of one row.
        let page_h = self.content_top() - self.content_bottom();
        let max_row_h = (page_h - header_h).max(page_h / 2.0);
        let rows: Vec<RowLayout<'_>> = table
            .rows
            .iter()
            .map(|r| layout_row(r, &col_widths, padding, line_spacing, &self.fonts))
            .flat_map(|r| split_row(r, max_row_h, padding, line_spacing))
            .collect();

        // Header plus the first row stay together.
        let first_h = rows.first().map_or(0.0, |r| r.height);
        self.ensure_space(header_h + first_h);

        let mut header_pending = true;
        for row in &rows {
            let needed = row.height + if header_pending { header_h } else { 0.0 };
            if self.page_has_content && self.cursor_y - needed < self.content_bottom() {
                self.new_page();
                header_pending = true;
            }
            if header_pending {
                if let Some(h) = &header {
                    self.draw_table_row(h, &col_x, &col_widths, padding, line_spacing, table.borders);
                }
                header_pending = false;
            }
            self.draw_table_row(row, &col_x, &col_widths, padding, line_spacing, table.borders);
        }
        if rows.is_empty() {
            if let Some(h) = &header {
                self.draw_table_row(h, &col_x, &col_widths, padding, line_spacing, table.borders);
            }
        }

        self.vertical_space(self.profile.paragraph_spacing);
        Ok(())
    }

    fn draw_table_row(
        &mut self,
        layout: &RowLayout<'_>,
        col_x: &[f32],
        col_widths: &[f32],
        padding: f32,
        line_spacing: f32,
        borders: bool,
    ) {
        let top = self.cursor_y;
        draw_row(
            &mut self.content,
            &mut self.links,
            &mut self.fonts,
            layout,
            col_x,
            col_widths,
            top,
            padding,
            line_spacing,
            borders,
        );
        self.cursor_y -= layout.height;
        self.page_has_content = true;
    }
}
