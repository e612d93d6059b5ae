//! Layout engine: a top-down cursor over the page sequence of one document.
//!
//! Every block is placed by first asking for the vertical space it needs.
//! When that would cross the bottom margin the current page gets its footer,
//! a new page is started, and the cursor and text style are reset. Content
//! is never split mid-line; a row taller than a whole page is split between
//! lines.

pub mod array;
pub mod table;

use crate::assets::ImageAsset;
use crate::canvas::{BLACK, Canvas, Frame, TextStyle};
use crate::config::{Letterhead, PageGeometry};
use crate::error::Error;
use crate::format::{self, NOT_AVAILABLE};
use crate::model::{FieldSpec, FieldType, SpecialHandling, Value};

pub const ACCENT: [u8; 3] = [139, 69, 19];
pub const SECTION_FILL: [u8; 3] = [248, 249, 250];
pub const RULE_GRAY: [u8; 3] = [210, 210, 210];
pub const FOOTER_GRAY: [u8; 3] = [100, 100, 100];

pub const LABEL_STYLE: TextStyle = TextStyle::bold(9.0);
pub const VALUE_STYLE: TextStyle = TextStyle::regular(9.0);
pub const LINE_HEIGHT: f32 = 12.0;
/// Space above the first and below the last line of a row.
pub const ROW_PADDING: f32 = 2.5;
pub const MIN_ROW_HEIGHT: f32 = 16.0;
/// Horizontal inset of text inside a column or cell.
pub const CELL_INSET: f32 = 4.0;
/// Share of the content width taken by the label column.
pub const LABEL_COLUMN_SHARE: f32 = 0.4;
pub const SECTION_HEADER_HEIGHT: f32 = 18.0;
/// A section header is only placed if this much space follows it.
pub const SECTION_MIN_TRAILING: f32 = 2.0 * MIN_ROW_HEIGHT;

const BASELINE_OFFSET: f32 = 9.0;
const CHECKBOX_SIZE: f32 = 8.0;
const LOGO_WIDTH: f32 = 70.0;
const LOGO_MAX_HEIGHT: f32 = 56.0;

/// Vertical position and page number of an in-progress render. Only the
/// layout engine moves it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderCursor {
    y: f32,
    page_number: usize,
}

impl RenderCursor {
    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }
}

/// Result of a finished layout.
#[derive(Debug)]
pub struct LayoutOutput {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    pub page_breaks: usize,
}

fn row_height(lines: usize) -> f32 {
    (lines.max(1) as f32 * LINE_HEIGHT + 2.0 * ROW_PADDING).max(MIN_ROW_HEIGHT)
}

pub struct LayoutEngine<C: Canvas> {
    canvas: C,
    page: PageGeometry,
    cursor: RenderCursor,
    footer: String,
    page_breaks: usize,
}

impl<C: Canvas> LayoutEngine<C> {
    /// Start laying out on the canvas' first page. `footer` is printed
    /// under the page number on every page.
    pub fn new(mut canvas: C, page: PageGeometry, footer: impl Into<String>) -> Self {
        canvas.set_style(TextStyle::default());
        Self {
            canvas,
            page,
            cursor: RenderCursor {
                y: page.margin_top,
                page_number: 1,
            },
            footer: footer.into(),
            page_breaks: 0,
        }
    }

    pub fn cursor(&self) -> RenderCursor {
        self.cursor
    }

    fn content_width(&self) -> f32 {
        self.page.content_width()
    }

    fn at_page_top(&self) -> bool {
        self.cursor.y <= self.page.margin_top + 0.5
    }

    /// Space left above the bottom margin.
    pub fn remaining(&self) -> f32 {
        self.page.content_bottom() - self.cursor.y
    }

    /// Break the page unless `required` points fit below the cursor. Returns
    /// whether a break happened. At the top of a page nothing is gained by
    /// breaking, so oversized blocks are placed there anyway.
    pub fn ensure_space(&mut self, required: f32) -> bool {
        if self.cursor.y + required > self.page.content_bottom() && !self.at_page_top() {
            self.break_page();
            true
        } else {
            false
        }
    }

    pub fn break_page(&mut self) {
        self.draw_footer();
        self.canvas.new_page();
        self.cursor.y = self.page.margin_top;
        self.cursor.page_number += 1;
        self.page_breaks += 1;
        // Nothing drawn last on the previous page may leak its style.
        self.canvas.set_style(TextStyle::default());
        log::debug!("Page break -> page {}", self.cursor.page_number);
    }

    fn draw_footer(&mut self) {
        let style = TextStyle::regular(8.0).with_color(FOOTER_GRAY);
        let center = self.page.width / 2.0;
        let base = self.page.height - self.page.margin_bottom / 2.0;
        let page_label = format!("Page {}", self.cursor.page_number);
        for (text, baseline) in [(page_label.as_str(), base - 5.0), (self.footer.as_str(), base + 5.0)] {
            let w = self.canvas.text_width(text, style);
            self.canvas.set_style(style);
            self.canvas.draw_text(text, center - w / 2.0, baseline);
        }
    }

    /// Move the cursor down without checking for a page break.
    pub fn gap(&mut self, dy: f32) {
        self.cursor.y = (self.cursor.y + dy).min(self.page.content_bottom());
    }

    fn draw_lines(&mut self, lines: &[String], x: f32, top: f32, style: TextStyle) {
        self.canvas.set_style(style);
        for (i, line) in lines.iter().enumerate() {
            let baseline = top + ROW_PADDING + BASELINE_OFFSET + i as f32 * LINE_HEIGHT;
            self.canvas.draw_text(line, x, baseline);
        }
    }

    /// Header: logo (or a text mark when there is none or it fails to draw)
    /// with the letterhead lines to its right, then a rule.
    pub fn place_letterhead(&mut self, logo: Option<&ImageAsset>, letterhead: &Letterhead) {
        let left = self.page.margin_left;
        let top = self.cursor.y;

        let mut logo_bottom = top;
        let drawn = match logo {
            Some(img) => {
                let natural_h = img.height_for_width(LOGO_WIDTH);
                let (w, h) = if natural_h > LOGO_MAX_HEIGHT {
                    (LOGO_WIDTH * LOGO_MAX_HEIGHT / natural_h, LOGO_MAX_HEIGHT)
                } else {
                    (LOGO_WIDTH, natural_h)
                };
                match self.canvas.draw_image(img, Frame::new(left, top, w, h)) {
                    Ok(()) => {
                        logo_bottom = top + h;
                        true
                    }
                    Err(e) => {
                        log::warn!("Logo could not be drawn: {e}; using text mark");
                        false
                    }
                }
            }
            None => false,
        };
        if !drawn {
            let mark = letterhead.company.split_whitespace().next().unwrap_or("LOGO");
            self.canvas.set_style(TextStyle::bold(14.0).with_color(ACCENT));
            self.canvas.draw_text(mark, left, top + 14.0);
            logo_bottom = top + 18.0;
        }

        let text_x = left + LOGO_WIDTH + 10.0;
        let text_w = self.page.width - self.page.margin_right - text_x;
        let company_style = TextStyle::bold(12.0).with_color(ACCENT);
        self.canvas.set_style(company_style);
        self.canvas.draw_text(&letterhead.company, text_x, top + 12.0);
        let mut y = top + 12.0;
        let line_style = TextStyle::regular(8.5);
        for line in &letterhead.lines {
            for wrapped in self.canvas.wrap_text(line, text_w, line_style) {
                y += 10.5;
                self.canvas.set_style(line_style);
                self.canvas.draw_text(&wrapped, text_x, y);
            }
        }
        let bottom = logo_bottom.max(y + 4.0) + 6.0;
        let right = self.page.width - self.page.margin_right;
        self.canvas.stroke_line((left, bottom), (right, bottom), 0.8, ACCENT);
        self.cursor.y = bottom + 14.0;
    }

    /// Upper-cased, centered document title.
    pub fn place_title(&mut self, title: &str) {
        let style = TextStyle::bold(16.0).with_color(ACCENT);
        let text = title.to_uppercase();
        let lines = self.canvas.wrap_text(&text, self.content_width(), style);
        let h = lines.len() as f32 * 20.0;
        self.ensure_space(h + 8.0);
        self.canvas.set_style(style);
        for (i, line) in lines.iter().enumerate() {
            let w = self.canvas.text_width(line, style);
            let x = self.page.margin_left + (self.content_width() - w) / 2.0;
            self.canvas.draw_text(line, x, self.cursor.y + 16.0 + i as f32 * 20.0);
        }
        self.cursor.y += h + 10.0;
    }

    /// Bordered label/value box at the right edge, used for policy facts.
    pub fn place_info_box(&mut self, rows: &[(String, String)]) {
        if rows.is_empty() {
            return;
        }
        let box_w = self.content_width() * 0.45;
        let x = self.page.width - self.page.margin_right - box_w;
        let inner = box_w - 2.0 * CELL_INSET;
        let mut blocks: Vec<(Vec<String>, Vec<String>)> = Vec::new();
        for (label, value) in rows {
            blocks.push((
                self.canvas.wrap_text(label, inner, LABEL_STYLE),
                self.canvas.wrap_text(value, inner, VALUE_STYLE),
            ));
        }
        let lines: usize = blocks.iter().map(|(l, v)| l.len() + v.len()).sum();
        let h = lines as f32 * LINE_HEIGHT + 2.0 * ROW_PADDING + 4.0;
        self.ensure_space(h);
        let top = self.cursor.y;
        self.canvas.stroke_rect(Frame::new(x, top, box_w, h), 0.8, ACCENT);
        let mut y = top + 2.0;
        for (label, value) in &blocks {
            self.draw_lines(label, x + CELL_INSET, y, LABEL_STYLE);
            y += label.len() as f32 * LINE_HEIGHT;
            self.draw_lines(value, x + CELL_INSET, y, VALUE_STYLE);
            y += value.len() as f32 * LINE_HEIGHT;
        }
        self.cursor.y = top + h + 10.0;
    }

    /// Accent-colored heading of a boilerplate block.
    pub fn place_block_heading(&mut self, title: &str) {
        self.ensure_space(16.0 + LINE_HEIGHT);
        self.canvas.set_style(TextStyle::bold(11.0).with_color(ACCENT));
        self.canvas.draw_text(title, self.page.margin_left, self.cursor.y + 11.0);
        self.cursor.y += 16.0;
    }

    /// Full-width wrapped text, broken across pages between lines.
    pub fn place_paragraph(&mut self, text: &str, style: TextStyle) {
        self.place_indented(text, "", 0.0, style);
    }

    fn place_indented(&mut self, text: &str, marker: &str, indent: f32, style: TextStyle) {
        let x = self.page.margin_left + indent;
        let marker_w = if marker.is_empty() {
            0.0
        } else {
            self.canvas.text_width(marker, style) + 3.0
        };
        let width = self.content_width() - indent - marker_w;
        let lines = self.canvas.wrap_text(text, width, style);
        let line_h = style.size * 1.35;
        for (i, line) in lines.iter().enumerate() {
            self.ensure_space(line_h);
            self.canvas.set_style(style);
            let baseline = self.cursor.y + style.size;
            if i == 0 && !marker.is_empty() {
                self.canvas.draw_text(marker, x, baseline);
            }
            self.canvas.draw_text(line, x + marker_w, baseline);
            self.cursor.y += line_h;
        }
    }

    pub fn place_bullets(&mut self, items: &[String], style: TextStyle) {
        for item in items {
            self.place_indented(item, "\u{2022}", 6.0, style);
        }
        self.cursor.y += 4.0;
    }

    pub fn place_numbered(&mut self, items: &[String], style: TextStyle) {
        for (i, item) in items.iter().enumerate() {
            self.place_indented(item, &format!("{}.", i + 1), 0.0, style);
        }
        self.cursor.y += 4.0;
    }

    /// Filled band with the section title. Moves to a new page first unless
    /// the band plus a couple of rows fit.
    pub fn place_section_header(&mut self, title: &str) {
        self.cursor.y += 4.0;
        self.ensure_space(SECTION_HEADER_HEIGHT + SECTION_MIN_TRAILING);
        let top = self.cursor.y;
        let frame = Frame::new(self.page.margin_left, top, self.content_width(), SECTION_HEADER_HEIGHT);
        self.canvas.fill_rect(frame, SECTION_FILL);
        self.canvas
            .stroke_line((frame.x, top + frame.h), (frame.x + frame.w, top + frame.h), 1.0, ACCENT);
        self.canvas.set_style(TextStyle::bold(11.0).with_color(ACCENT));
        self.canvas.draw_text(title, frame.x + CELL_INSET, top + 13.0);
        self.cursor.y = top + SECTION_HEADER_HEIGHT + 4.0;
    }

    /// Bold sub-heading inside a section, e.g. "Director 1".
    pub fn place_subheading(&mut self, text: &str) {
        self.ensure_space(14.0 + MIN_ROW_HEIGHT);
        self.canvas.set_style(TextStyle::bold(10.0).with_color(ACCENT));
        self.canvas.draw_text(text, self.page.margin_left, self.cursor.y + 11.0);
        self.cursor.y += 15.0;
    }

    /// Place one blueprint field: arrays and nested objects get structured
    /// layout, booleans a checkbox pair, everything else a label/value row.
    pub fn place_field(&mut self, field: &FieldSpec, value: Option<&Value>, handling: SpecialHandling) {
        let missing = Value::Null;
        let value = value.unwrap_or(&missing);
        match value {
            Value::Array(items) => array::place_array(self, field, items, handling),
            Value::Object(_) if format::parse_date(value).is_some() => {
                let text = format::format_value(value, FieldType::Date);
                self.place_row(&field.label, &text);
            }
            Value::Object(record) => array::place_object(self, &field.label, record, 0.0),
            _ if field.field_type == FieldType::Array && value.is_blank() => {
                array::place_array(self, field, &[], handling)
            }
            _ => {
                let is_boolean = field.field_type == FieldType::Boolean || matches!(value, Value::Bool(_));
                let choice = match value {
                    Value::Bool(b) => Some(Some(*b)),
                    v if v.is_blank() => Some(None),
                    Value::Text(s) => format::normalize_boolean(s).map(Some),
                    _ => None,
                };
                match choice {
                    Some(selected) if is_boolean => self.place_checkbox_row(&field.label, selected),
                    _ => {
                        let text = format::format_value(value, field.field_type);
                        self.place_row(&field.label, &text);
                    }
                }
            }
        }
    }

    /// Two-column row: bold label in the left 40%, value in the right 60%.
    pub fn place_row(&mut self, label: &str, value: &str) {
        self.place_row_indented(label, value, 0.0);
    }

    pub(crate) fn place_row_indented(&mut self, label: &str, value: &str, indent: f32) {
        let left = self.page.margin_left + indent;
        let width = self.content_width() - indent;
        let label_w = width * LABEL_COLUMN_SHARE;
        let value_w = width - label_w;
        let value = if value.trim().is_empty() { NOT_AVAILABLE } else { value };
        let label_lines = self.canvas.wrap_text(label, label_w - 2.0 * CELL_INSET, LABEL_STYLE);
        let value_lines = self.canvas.wrap_text(value, value_w - 2.0 * CELL_INSET, VALUE_STYLE);
        let total = label_lines.len().max(value_lines.len());

        let full_page = self.page.content_bottom() - self.page.margin_top;
        let mut start = 0;
        while start < total {
            let left_over = total - start;
            let h = row_height(left_over);
            let fit = ((self.remaining() - 2.0 * ROW_PADDING) / LINE_HEIGHT).floor().max(0.0) as usize;
            if h > self.remaining() && !self.at_page_top() && (h <= full_page || fit == 0) {
                self.break_page();
                continue;
            }
            // Taller than a whole page: fill this one, continue on the next.
            let take = if h <= self.remaining() { left_over } else { fit.clamp(1, left_over) };
            let top = self.cursor.y;
            let slice = |lines: &[String]| -> Vec<String> {
                lines.iter().skip(start).take(take).cloned().collect()
            };
            self.draw_lines(&slice(&label_lines), left + CELL_INSET, top, LABEL_STYLE);
            self.draw_lines(&slice(&value_lines), left + label_w + CELL_INSET, top, VALUE_STYLE);
            let row_h = row_height(take);
            self.canvas.stroke_line((left, top + row_h), (left + width, top + row_h), 0.3, RULE_GRAY);
            self.cursor.y = top + row_h;
            start += take;
            if start < total {
                self.break_page();
            }
        }
    }

    /// Label with a Yes/No checkbox pair; the selected box is filled, and
    /// neither is when the value is unknown.
    pub fn place_checkbox_row(&mut self, label: &str, selected: Option<bool>) {
        let left = self.page.margin_left;
        let label_w = self.content_width() * LABEL_COLUMN_SHARE;
        let label_lines = self.canvas.wrap_text(label, label_w - 2.0 * CELL_INSET, LABEL_STYLE);
        let h = row_height(label_lines.len());
        self.ensure_space(h);
        let top = self.cursor.y;
        self.draw_lines(&label_lines, left + CELL_INSET, top, LABEL_STYLE);

        let mut x = left + label_w + CELL_INSET;
        let box_top = top + ROW_PADDING + BASELINE_OFFSET - CHECKBOX_SIZE + 0.5;
        for (option, text) in [(true, "Yes"), (false, "No")] {
            let frame = Frame::new(x, box_top, CHECKBOX_SIZE, CHECKBOX_SIZE);
            if selected == Some(option) {
                self.canvas.fill_rect(frame, BLACK);
            }
            self.canvas.stroke_rect(frame, 0.6, BLACK);
            self.canvas.set_style(VALUE_STYLE);
            self.canvas.draw_text(text, x + CHECKBOX_SIZE + 3.0, top + ROW_PADDING + BASELINE_OFFSET);
            x += CHECKBOX_SIZE + 3.0 + self.canvas.text_width(text, VALUE_STYLE) + 14.0;
        }
        let right = left + self.content_width();
        self.canvas.stroke_line((left, top + h), (right, top + h), 0.3, RULE_GRAY);
        self.cursor.y = top + h;
    }

    /// "Label: ____ value" signature line with an optional date at the right.
    pub fn place_signature_line(&mut self, label: &str, value: &str, date: Option<&str>) {
        self.ensure_space(2.0 * MIN_ROW_HEIGHT);
        let left = self.page.margin_left;
        let right = self.page.width - self.page.margin_right;
        let baseline = self.cursor.y + 18.0;

        self.canvas.set_style(LABEL_STYLE);
        let label_text = format!("{label}:");
        self.canvas.draw_text(&label_text, left, baseline);
        let line_x = left + self.canvas.text_width(&label_text, LABEL_STYLE) + 6.0;
        let line_end = if date.is_some() { right - 150.0 } else { right };
        self.canvas.stroke_line((line_x, baseline + 2.0), (line_end, baseline + 2.0), 0.5, BLACK);
        let fitted = self.canvas.wrap_text(value, line_end - line_x - 4.0, VALUE_STYLE);
        if let Some(first) = fitted.first() {
            self.canvas.set_style(VALUE_STYLE);
            self.canvas.draw_text(first, line_x + 2.0, baseline - 1.0);
        }
        if let Some(date) = date {
            let date_x = right - 140.0;
            self.canvas.set_style(LABEL_STYLE);
            self.canvas.draw_text("Date:", date_x, baseline);
            let dx = date_x + self.canvas.text_width("Date:", LABEL_STYLE) + 6.0;
            self.canvas.stroke_line((dx, baseline + 2.0), (right, baseline + 2.0), 0.5, BLACK);
            self.canvas.set_style(VALUE_STYLE);
            self.canvas.draw_text(date, dx + 2.0, baseline - 1.0);
        }
        self.cursor.y += 2.0 * MIN_ROW_HEIGHT;
    }

    /// Footer of the last page, then serialization.
    pub fn finish(mut self) -> Result<LayoutOutput, Error> {
        self.draw_footer();
        let page_count = self.canvas.page_count();
        let page_breaks = self.page_breaks;
        let bytes = self.canvas.finish()?;
        log::debug!("Layout finished: {page_count} pages, {page_breaks} breaks");
        Ok(LayoutOutput {
            bytes,
            page_count,
            page_breaks,
        })
    }
}
