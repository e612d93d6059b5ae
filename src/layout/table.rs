use crate::canvas::{BLACK, Canvas, Frame, TextStyle, WHITE};

use super::{ACCENT, CELL_INSET, LINE_HEIGHT, LayoutEngine, ROW_PADDING, SECTION_FILL};

pub const MIN_COLUMN_WIDTH: f32 = 40.0;
/// No column may take more than this share of the table width.
pub const MAX_COLUMN_SHARE: f32 = 0.5;
/// Only the first rows are measured when sizing columns.
pub const SAMPLE_ROWS: usize = 10;
const CELL_PADDING: f32 = 2.0 * CELL_INSET;

pub const HEADER_STYLE: TextStyle = TextStyle::bold(8.5).with_color(WHITE);
pub const CELL_STYLE: TextStyle = TextStyle::regular(8.5);
pub const TOTAL_STYLE: TextStyle = TextStyle::bold(8.5);

const BORDER: [u8; 3] = [170, 170, 170];

/// Column widths of one table, summing to the table width.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnWidthPlan {
    widths: Vec<f32>,
    table_width: f32,
    min_width: f32,
    max_width: f32,
}

impl ColumnWidthPlan {
    /// Size columns from the measured header labels and the measured cells
    /// of the sampled rows (widths in points, without padding).
    ///
    /// Each column starts at the widest of its header and sampled cells plus
    /// padding, clamped to `[MIN_COLUMN_WIDTH, MAX_COLUMN_SHARE * width]`.
    /// The widths are then rescaled proportionally to fill the table exactly,
    /// re-clamping any column that the scaling pushes out of bounds. When the
    /// column count makes those bounds infeasible (one column, or so many that
    /// they cannot all get the minimum) the bounds widen to the even share.
    pub fn compute(header_widths: &[f32], sampled_rows: &[Vec<f32>], table_width: f32) -> Self {
        let n = header_widths.len();
        if n == 0 {
            return Self {
                widths: Vec::new(),
                table_width,
                min_width: MIN_COLUMN_WIDTH,
                max_width: table_width * MAX_COLUMN_SHARE,
            };
        }
        let even = table_width / n as f32;
        let min_width = MIN_COLUMN_WIDTH.min(even);
        let max_width = (table_width * MAX_COLUMN_SHARE).max(even);

        let provisional: Vec<f32> = (0..n)
            .map(|col| {
                let content = sampled_rows
                    .iter()
                    .take(SAMPLE_ROWS)
                    .filter_map(|row| row.get(col).copied())
                    .fold(header_widths[col], f32::max);
                (content + CELL_PADDING).clamp(min_width, max_width)
            })
            .collect();

        let widths = normalize(&provisional, table_width, min_width, max_width);
        Self {
            widths,
            table_width,
            min_width,
            max_width,
        }
    }

    pub fn widths(&self) -> &[f32] {
        &self.widths
    }

    pub fn table_width(&self) -> f32 {
        self.table_width
    }

    /// The `[min, max]` every column width lies in.
    pub fn bounds(&self) -> (f32, f32) {
        (self.min_width, self.max_width)
    }
}

/// Proportional rescale to `target`, freezing columns at a bound whenever
/// scaling would cross it and redistributing among the rest.
fn normalize(provisional: &[f32], target: f32, lo: f32, hi: f32) -> Vec<f32> {
    let n = provisional.len();
    let mut widths = provisional.to_vec();
    let mut frozen = vec![false; n];

    for _ in 0..=n {
        let fixed_sum: f32 = (0..n).filter(|&i| frozen[i]).map(|i| widths[i]).sum();
        let free_sum: f32 = (0..n).filter(|&i| !frozen[i]).map(|i| provisional[i]).sum();
        if free_sum <= 0.0 {
            break;
        }
        let factor = (target - fixed_sum) / free_sum;
        let mut clamped_any = false;
        let free: Vec<usize> = (0..n).filter(|&i| !frozen[i]).collect();
        for i in free {
            let w = provisional[i] * factor;
            if w > hi {
                widths[i] = hi;
                frozen[i] = true;
                clamped_any = true;
            } else if w < lo {
                widths[i] = lo;
                frozen[i] = true;
                clamped_any = true;
            } else {
                widths[i] = w;
            }
        }
        if !clamped_any {
            return widths;
        }
    }

    // Every column frozen: spread the residual over columns with headroom.
    let residual = target - widths.iter().sum::<f32>();
    if residual.abs() > f32::EPSILON {
        let room: Vec<usize> = (0..n)
            .filter(|&i| if residual > 0.0 { widths[i] < hi } else { widths[i] > lo })
            .collect();
        let count = room.len().max(1) as f32;
        for i in room {
            widths[i] = (widths[i] + residual / count).clamp(lo, hi);
        }
    }
    widths
}

/// A table ready for layout: header labels and display strings per cell.
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total: Option<Vec<String>>,
}

impl<C: Canvas> LayoutEngine<C> {
    /// Bordered table with a filled header row that is repeated after every
    /// page break, and an optional bold aggregate row.
    pub fn place_table(&mut self, table: &TableData) {
        let width = self.content_width();
        let header_widths: Vec<f32> = table
            .headers
            .iter()
            .map(|h| self.canvas.text_width(h, HEADER_STYLE))
            .collect();
        let sampled: Vec<Vec<f32>> = table
            .rows
            .iter()
            .take(SAMPLE_ROWS)
            .map(|row| row.iter().map(|cell| self.canvas.text_width(cell, CELL_STYLE)).collect())
            .collect();
        let plan = ColumnWidthPlan::compute(&header_widths, &sampled, width);
        log::debug!(
            "Table: {} columns, {} rows, widths {:?}",
            table.headers.len(),
            table.rows.len(),
            plan.widths()
        );

        let header = self.wrap_cells(&table.headers, plan.widths(), HEADER_STYLE);
        let header_h = cells_height(&header);
        self.ensure_space(header_h + LINE_HEIGHT + 2.0 * ROW_PADDING);
        self.draw_table_row(&header, plan.widths(), header_h, HEADER_STYLE, Some(ACCENT));

        let max_h = (self.page.content_bottom() - self.page.margin_top - header_h).max(LINE_HEIGHT);
        let body = table.rows.iter().map(|row| (row, CELL_STYLE, None));
        let total = table.total.iter().map(|row| (row, TOTAL_STYLE, Some(SECTION_FILL)));
        for (row, style, fill) in body.chain(total) {
            let mut cells = self.wrap_cells(row, plan.widths(), style);
            // A row never exceeds one page; overlong cells are cut short.
            let max_lines = ((max_h - 2.0 * ROW_PADDING) / LINE_HEIGHT).floor().max(1.0) as usize;
            for lines in &mut cells {
                if lines.len() > max_lines {
                    lines.truncate(max_lines);
                    if let Some(last) = lines.last_mut() {
                        last.push('\u{2026}');
                    }
                }
            }
            let h = cells_height(&cells);
            if self.ensure_space(h) {
                self.draw_table_row(&header, plan.widths(), header_h, HEADER_STYLE, Some(ACCENT));
            }
            self.draw_table_row(&cells, plan.widths(), h, style, fill);
        }
        self.cursor.y += 8.0;
    }

    fn wrap_cells(&self, cells: &[String], widths: &[f32], style: TextStyle) -> Vec<Vec<String>> {
        widths
            .iter()
            .enumerate()
            .map(|(i, &w)| {
                let text = cells.get(i).map(String::as_str).unwrap_or("");
                self.canvas.wrap_text(text, w - CELL_PADDING, style)
            })
            .collect()
    }

    fn draw_table_row(
        &mut self,
        cells: &[Vec<String>],
        widths: &[f32],
        height: f32,
        style: TextStyle,
        fill: Option<[u8; 3]>,
    ) {
        let top = self.cursor.y;
        let mut x = self.page.margin_left;
        for (lines, &w) in cells.iter().zip(widths) {
            let frame = Frame::new(x, top, w, height);
            if let Some(color) = fill {
                self.canvas.fill_rect(frame, color);
            }
            self.canvas.stroke_rect(frame, 0.5, BORDER);
            self.draw_lines(lines, x + CELL_INSET, top, style);
            x += w;
        }
        self.canvas.set_style(TextStyle::default().with_color(BLACK));
        self.cursor.y = top + height;
    }
}

fn cells_height(cells: &[Vec<String>]) -> f32 {
    let lines = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    lines as f32 * LINE_HEIGHT + 2.0 * ROW_PADDING
}
