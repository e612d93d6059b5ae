#![allow(dead_code)]

use formdoc_pdf::assets::ImageAsset;
use formdoc_pdf::canvas::{Canvas, Frame, TextStyle, Weight};
use formdoc_pdf::layout::FOOTER_GRAY;
use formdoc_pdf::{Error, RenderConfig, RenderedDocument, SubmissionRecord};

/// Canvas that records every drawing call and serializes them as a
/// tab-separated transcript instead of a PDF. Glyphs have a fixed advance
/// of half the font size (bold slightly wider), so layouts are predictable.
pub struct RecordingCanvas {
    lines: Vec<String>,
    style: TextStyle,
    pages: usize,
    fail_images: bool,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self {
            lines: Vec::new(),
            style: TextStyle::default(),
            pages: 1,
            fail_images: false,
        }
    }

    /// `draw_image` returns an error, as a canvas would for corrupt data.
    pub fn failing_images() -> Self {
        Self {
            fail_images: true,
            ..Self::new()
        }
    }
}

fn color_field(c: [u8; 3]) -> String {
    format!("{},{},{}", c[0], c[1], c[2])
}

fn parse_color(s: &str) -> [u8; 3] {
    let parts: Vec<u8> = s.split(',').map(|p| p.parse().unwrap()).collect();
    [parts[0], parts[1], parts[2]]
}

impl Canvas for RecordingCanvas {
    fn set_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    fn text_width(&self, text: &str, style: TextStyle) -> f32 {
        let factor = match style.weight {
            Weight::Regular => 0.5,
            Weight::Bold => 0.55,
        };
        text.chars().count() as f32 * style.size * factor
    }

    fn draw_text(&mut self, text: &str, x: f32, baseline: f32) {
        let s = self.style;
        self.lines.push(format!(
            "text\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.pages,
            x,
            baseline,
            s.size,
            s.weight == Weight::Bold,
            color_field(s.color),
            text
        ));
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), _width: f32, _color: [u8; 3]) {
        self.lines
            .push(format!("line\t{}\t{}\t{}\t{}\t{}", self.pages, from.0, from.1, to.0, to.1));
    }

    fn fill_rect(&mut self, frame: Frame, color: [u8; 3]) {
        self.lines.push(format!(
            "fill\t{}\t{}\t{}\t{}\t{}\t{}",
            self.pages,
            frame.x,
            frame.y,
            frame.w,
            frame.h,
            color_field(color)
        ));
    }

    fn stroke_rect(&mut self, frame: Frame, _width: f32, _color: [u8; 3]) {
        self.lines.push(format!(
            "rect\t{}\t{}\t{}\t{}\t{}",
            self.pages, frame.x, frame.y, frame.w, frame.h
        ));
    }

    fn draw_image(&mut self, _image: &ImageAsset, frame: Frame) -> Result<(), Error> {
        if self.fail_images {
            return Err(Error::Canvas("image rejected".to_string()));
        }
        self.lines.push(format!(
            "image\t{}\t{}\t{}\t{}\t{}",
            self.pages, frame.x, frame.y, frame.w, frame.h
        ));
        Ok(())
    }

    fn new_page(&mut self) {
        self.pages += 1;
        self.lines.push(format!("page\t{}", self.pages));
    }

    fn page_count(&self) -> usize {
        self.pages
    }

    fn finish(self) -> Result<Vec<u8>, Error> {
        Ok(self.lines.join("\n").into_bytes())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextOp {
    pub page: usize,
    pub x: f32,
    pub baseline: f32,
    pub size: f32,
    pub bold: bool,
    pub color: [u8; 3],
    pub text: String,
}

#[derive(Debug, Default)]
pub struct Transcript {
    pub texts: Vec<TextOp>,
    pub fills: Vec<(usize, Frame, [u8; 3])>,
    pub images: Vec<(usize, Frame)>,
    pub pages: usize,
}

impl Transcript {
    pub fn parse(bytes: &[u8]) -> Self {
        let mut t = Transcript {
            pages: 1,
            ..Default::default()
        };
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        for line in text.lines() {
            let f: Vec<&str> = line.splitn(8, '\t').collect();
            let num = |i: usize| f[i].parse::<f32>().unwrap();
            match f[0] {
                "text" => t.texts.push(TextOp {
                    page: f[1].parse().unwrap(),
                    x: num(2),
                    baseline: num(3),
                    size: num(4),
                    bold: f[5] == "true",
                    color: parse_color(f[6]),
                    text: f[7].to_string(),
                }),
                "fill" => t.fills.push((
                    f[1].parse().unwrap(),
                    Frame::new(num(2), num(3), num(4), num(5)),
                    parse_color(f[6]),
                )),
                "image" => t
                    .images
                    .push((f[1].parse().unwrap(), Frame::new(num(2), num(3), num(4), num(5)))),
                "page" => t.pages = f[1].parse().unwrap(),
                _ => {}
            }
        }
        t
    }

    /// Text drawn in the page body, i.e. everything except footers.
    pub fn body(&self) -> impl Iterator<Item = &TextOp> {
        self.texts.iter().filter(|op| op.color != FOOTER_GRAY)
    }

    pub fn footers(&self) -> impl Iterator<Item = &TextOp> {
        self.texts.iter().filter(|op| op.color == FOOTER_GRAY)
    }

    /// Number of text runs exactly equal to `text`.
    pub fn count(&self, text: &str) -> usize {
        self.texts.iter().filter(|op| op.text == text).count()
    }

    pub fn has(&self, text: &str) -> bool {
        self.count(text) > 0
    }

    /// Whether any text run contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.texts.iter().any(|op| op.text.contains(needle))
    }

    /// Index of the first text run equal to `text`, in drawing order.
    pub fn position(&self, text: &str) -> Option<usize> {
        self.texts.iter().position(|op| op.text == text)
    }

    pub fn find(&self, text: &str) -> Option<&TextOp> {
        self.texts.iter().find(|op| op.text == text)
    }
}

pub fn record(json: serde_json::Value) -> SubmissionRecord {
    SubmissionRecord::from_json_str(&json.to_string()).expect("record json")
}

pub fn render_on(
    record: &SubmissionRecord,
    form_type: Option<&str>,
    config: &RenderConfig,
    canvas: RecordingCanvas,
) -> (RenderedDocument, Transcript) {
    let doc = formdoc_pdf::render_with_canvas(record, form_type, config, canvas).expect("render");
    let transcript = Transcript::parse(&doc.bytes);
    (doc, transcript)
}

pub fn render(record: &SubmissionRecord, form_type: Option<&str>) -> (RenderedDocument, Transcript) {
    render_on(record, form_type, &RenderConfig::default(), RecordingCanvas::new())
}

/// Record with `n` plain text fields, enough to span several pages.
pub fn long_record(n: usize) -> SubmissionRecord {
    let mut rec = SubmissionRecord::new();
    for i in 1..=n {
        rec.insert(format!("detail{i}"), format!("value number {i}"));
    }
    rec
}
