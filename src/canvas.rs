//! The page-drawing capability the layout engine renders through.
//!
//! Coordinates are in points with the origin at the top-left corner of the
//! page and `y` growing downwards. Text is positioned by its baseline.

use crate::assets::ImageAsset;
use crate::error::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Weight {
    #[default]
    Regular,
    Bold,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub weight: Weight,
    pub color: [u8; 3],
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 10.0,
            weight: Weight::Regular,
            color: BLACK,
        }
    }
}

impl TextStyle {
    pub const fn regular(size: f32) -> Self {
        Self { size, weight: Weight::Regular, color: BLACK }
    }

    pub const fn bold(size: f32) -> Self {
        Self { size, weight: Weight::Bold, color: BLACK }
    }

    pub const fn with_color(self, color: [u8; 3]) -> Self {
        Self { color, ..self }
    }
}

pub const BLACK: [u8; 3] = [0, 0, 0];
pub const WHITE: [u8; 3] = [255, 255, 255];

/// Axis-aligned rectangle, top-left origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Frame {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }
}

pub trait Canvas {
    /// Style used by subsequent `draw_text` calls.
    fn set_style(&mut self, style: TextStyle);

    /// Advance width of `text` in points when drawn with `style`.
    fn text_width(&self, text: &str, style: TextStyle) -> f32;

    /// Greedy word wrap of `text` into lines no wider than `max_width`.
    /// Explicit newlines are kept; a single word wider than the line is
    /// broken between characters. Always returns at least one line.
    fn wrap_text(&self, text: &str, max_width: f32, style: TextStyle) -> Vec<String> {
        let mut lines: Vec<String> = Vec::new();
        for paragraph in text.split('\n') {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                let candidate = if current.is_empty() {
                    word.to_string()
                } else {
                    format!("{current} {word}")
                };
                if self.text_width(&candidate, style) <= max_width {
                    current = candidate;
                    continue;
                }
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                if self.text_width(word, style) <= max_width {
                    current = word.to_string();
                    continue;
                }
                for ch in word.chars() {
                    let mut next = current.clone();
                    next.push(ch);
                    if !current.is_empty() && self.text_width(&next, style) > max_width {
                        lines.push(std::mem::replace(&mut current, ch.to_string()));
                    } else {
                        current = next;
                    }
                }
            }
            lines.push(current);
        }
        lines
    }

    fn draw_text(&mut self, text: &str, x: f32, baseline: f32);

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: [u8; 3]);

    fn fill_rect(&mut self, frame: Frame, color: [u8; 3]);

    fn stroke_rect(&mut self, frame: Frame, width: f32, color: [u8; 3]);

    fn draw_image(&mut self, image: &ImageAsset, frame: Frame) -> Result<(), Error>;

    fn new_page(&mut self);

    fn page_count(&self) -> usize;

    /// Serialize the document. Consumes the canvas, so it runs once.
    fn finish(self) -> Result<Vec<u8>, Error>
    where
        Self: Sized;
}
