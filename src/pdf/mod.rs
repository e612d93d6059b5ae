//! `Canvas` implementation on top of pdf-writer.
//!
//! Drawing operators go into one content stream per page as they are issued.
//! Raster images are written to the document immediately; fonts, pages and
//! the page tree are written by `finish` once the glyph set is known.

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str};

use crate::assets::{ColorModel, ImageAsset, ImageFormat};
use crate::canvas::{Canvas, Frame, TextStyle};
use crate::config::{FontConfig, PageGeometry};
use crate::error::Error;
use crate::fonts::FontPair;

struct Page {
    content: Content,
    /// Indices into `PdfCanvas::images` drawn on this page.
    images: Vec<usize>,
}

impl Page {
    fn new() -> Self {
        Self {
            content: Content::new(),
            images: Vec::new(),
        }
    }
}

pub struct PdfCanvas {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    page_width: f32,
    page_height: f32,
    pages: Vec<Page>,
    fonts: FontPair,
    style: TextStyle,
    images: Vec<(String, Ref)>,
    t0: std::time::Instant,
}

fn rgb(color: [u8; 3]) -> (f32, f32, f32) {
    let [r, g, b] = color;
    (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

impl PdfCanvas {
    /// A one-page document of the given geometry.
    pub fn new(page: &PageGeometry, fonts: &FontConfig) -> Self {
        let t0 = std::time::Instant::now();
        let fonts = FontPair::load(fonts);
        log::debug!(
            "PdfCanvas: fonts regular={} bold={} ({:.1}ms)",
            if fonts.get(crate::canvas::Weight::Regular).is_embedded() { "embedded" } else { "builtin" },
            if fonts.get(crate::canvas::Weight::Bold).is_embedded() { "embedded" } else { "builtin" },
            t0.elapsed().as_secs_f64() * 1000.0,
        );
        Self {
            pdf: Pdf::new(),
            next_id: 3,
            catalog_id: Ref::new(1),
            pages_id: Ref::new(2),
            page_width: page.width,
            page_height: page.height,
            pages: vec![Page::new()],
            fonts,
            style: TextStyle::default(),
            images: Vec::new(),
            t0,
        }
    }

    fn current(&mut self) -> &mut Page {
        if self.pages.is_empty() {
            self.pages.push(Page::new());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// PDF user space has its origin bottom-left.
    fn flip(&self, y: f32) -> f32 {
        self.page_height - y
    }
}

fn embed_image(pdf: &mut Pdf, img: &ImageAsset, alloc: &mut impl FnMut() -> Ref) -> Result<Ref, Error> {
    let xobj_ref = alloc();
    match img.format {
        ImageFormat::Jpeg => {
            let mut xobj = pdf.image_xobject(xobj_ref, &img.data);
            xobj.filter(Filter::DctDecode);
            xobj.width(img.pixel_width as i32);
            xobj.height(img.pixel_height as i32);
            match img.color {
                ColorModel::Gray => xobj.color_space().device_gray(),
                ColorModel::Rgb => xobj.color_space().device_rgb(),
                ColorModel::Cmyk => {
                    xobj.color_space().device_cmyk();
                    // Adobe CMYK JPEGs store inverted samples.
                    xobj.decode([1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0]);
                }
            }
            xobj.bits_per_component(8);
        }
        ImageFormat::Png => {
            let reader = image::ImageReader::with_format(
                std::io::Cursor::new(&img.data),
                image::ImageFormat::Png,
            );
            let rgba: image::RgbaImage = reader.decode()?.to_rgba8();
            let (w, h) = (rgba.width(), rgba.height());
            let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

            let rgb_data: Vec<u8> = rgba
                .pixels()
                .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
                .collect();
            let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

            let smask_ref = if has_alpha {
                let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
                let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
                let mask_ref = alloc();
                let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
                mask.filter(Filter::FlateDecode);
                mask.width(w as i32);
                mask.height(h as i32);
                mask.color_space().device_gray();
                mask.bits_per_component(8);
                Some(mask_ref)
            } else {
                None
            };

            let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
            xobj.filter(Filter::FlateDecode);
            xobj.width(w as i32);
            xobj.height(h as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
            if let Some(mask_ref) = smask_ref {
                xobj.s_mask(mask_ref);
            }
        }
    }
    Ok(xobj_ref)
}

impl Canvas for PdfCanvas {
    fn set_style(&mut self, style: TextStyle) {
        self.style = style;
    }

    fn text_width(&self, text: &str, style: TextStyle) -> f32 {
        self.fonts.get(style.weight).text_width(text, style.size)
    }

    fn draw_text(&mut self, text: &str, x: f32, baseline: f32) {
        if text.is_empty() {
            return;
        }
        let style = self.style;
        let y = self.flip(baseline);
        let font = self.fonts.get_mut(style.weight);
        let resource_name = font.resource_name;
        let encoded = font.encode(text);
        let (r, g, b) = rgb(style.color);
        let content = &mut self.current().content;
        content.set_fill_rgb(r, g, b);
        content.begin_text();
        content.set_font(Name(resource_name.as_bytes()), style.size);
        content.next_line(x, y);
        content.show(Str(&encoded));
        content.end_text();
    }

    fn stroke_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: [u8; 3]) {
        let (y1, y2) = (self.flip(from.1), self.flip(to.1));
        let (r, g, b) = rgb(color);
        let content = &mut self.current().content;
        content.set_stroke_rgb(r, g, b);
        content.set_line_width(width);
        content.move_to(from.0, y1);
        content.line_to(to.0, y2);
        content.stroke();
    }

    fn fill_rect(&mut self, frame: Frame, color: [u8; 3]) {
        let y = self.flip(frame.y + frame.h);
        let (r, g, b) = rgb(color);
        let content = &mut self.current().content;
        content.set_fill_rgb(r, g, b);
        content.rect(frame.x, y, frame.w, frame.h);
        content.fill_nonzero();
    }

    fn stroke_rect(&mut self, frame: Frame, width: f32, color: [u8; 3]) {
        let y = self.flip(frame.y + frame.h);
        let (r, g, b) = rgb(color);
        let content = &mut self.current().content;
        content.set_stroke_rgb(r, g, b);
        content.set_line_width(width);
        content.rect(frame.x, y, frame.w, frame.h);
        content.stroke();
    }

    fn draw_image(&mut self, image: &ImageAsset, frame: Frame) -> Result<(), Error> {
        let next_id = &mut self.next_id;
        let mut alloc = || {
            let r = Ref::new(*next_id);
            *next_id += 1;
            r
        };
        let xobj_ref = embed_image(&mut self.pdf, image, &mut alloc)?;
        let index = self.images.len();
        let pdf_name = format!("Im{}", index + 1);
        self.images.push((pdf_name.clone(), xobj_ref));

        let y = self.flip(frame.y + frame.h);
        let page = self.current();
        page.images.push(index);
        page.content.save_state();
        page.content.transform([frame.w, 0.0, 0.0, frame.h, frame.x, y]);
        page.content.x_object(Name(pdf_name.as_bytes()));
        page.content.restore_state();
        Ok(())
    }

    fn new_page(&mut self) {
        self.pages.push(Page::new());
    }

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn finish(self) -> Result<Vec<u8>, Error> {
        let t_draw = self.t0.elapsed();
        let PdfCanvas {
            mut pdf,
            mut next_id,
            catalog_id,
            pages_id,
            page_width,
            page_height,
            pages,
            fonts,
            images,
            t0,
            ..
        } = self;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let mut font_pairs: Vec<(&'static str, Ref)> = Vec::new();
        for font in fonts.iter() {
            let font_ref = alloc();
            font.write(&mut pdf, font_ref, &mut alloc)?;
            font_pairs.push((font.resource_name, font_ref));
        }
        let t_fonts = t0.elapsed();

        let n = pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for (i, page_data) in pages.into_iter().enumerate() {
            let raw = page_data.content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);

            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, page_width, page_height))
                .parent(pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            {
                let mut font_dict = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    font_dict.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !page_data.images.is_empty() {
                let mut xobjects = resources.x_objects();
                for &index in &page_data.images {
                    let (name, xobj_ref) = &images[index];
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        let t_assembly = t0.elapsed();
        log::info!(
            "PDF phases: draw={:.1}ms, font_embed={:.1}ms, assembly={:.1}ms, {} pages",
            t_draw.as_secs_f64() * 1000.0,
            (t_fonts - t_draw).as_secs_f64() * 1000.0,
            (t_assembly - t_fonts).as_secs_f64() * 1000.0,
            n,
        );

        Ok(pdf.finish())
    }
}
