use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::canvas::Weight;
use crate::config::FontConfig;
use crate::error::Error;

/// The built-in fonts have no naira glyph.
const NAIRA_FALLBACK: char = 'N';

struct Glyph {
    gid: u16,
    width_1000: f32,
}

/// A TrueType/OpenType face embedded as a subsetted CIDFont. Glyph ids are
/// remapped as text is encoded, so only drawn glyphs end up in the subset.
pub(crate) struct EmbeddedFace {
    ps_name: String,
    data: Mmap,
    face_index: u32,
    glyphs: HashMap<char, Glyph>,
    missing_width: f32,
    ascent: f32,
    descent: f32,
    cap_height: f32,
    bbox: Rect,
    remapper: subsetter::GlyphRemapper,
    /// new gid -> (char, width in 1000-units)
    used: BTreeMap<u16, (char, f32)>,
}

fn font_family_name(face: &Face) -> Option<String> {
    for name in face.names() {
        if name.name_id == ttf_parser::name_id::FAMILY
            && name.is_unicode()
            && let Some(s) = name.to_string()
        {
            return Some(s);
        }
    }
    None
}

impl EmbeddedFace {
    pub(crate) fn open(path: &Path, face_index: u32) -> Result<Self, Error> {
        let file = std::fs::File::open(path).map_err(Error::Io)?;
        let data = unsafe { Mmap::map(&file) }.map_err(Error::Io)?;
        let face = Face::parse(&data, face_index)
            .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;

        let units = face.units_per_em() as f32;
        let to_1000 = |v: f32| v / units * 1000.0;

        let mut glyphs: HashMap<char, Glyph> = HashMap::new();
        if let Some(cmap) = face.tables().cmap {
            for subtable in cmap.subtables {
                if !subtable.is_unicode() {
                    continue;
                }
                subtable.codepoints(|cp| {
                    if let Some(ch) = char::from_u32(cp)
                        && let Some(gid) = subtable.glyph_index(cp)
                    {
                        let width_1000 = face
                            .glyph_hor_advance(gid)
                            .map(|adv| to_1000(adv as f32))
                            .unwrap_or(0.0);
                        glyphs.entry(ch).or_insert(Glyph { gid: gid.0, width_1000 });
                    }
                });
            }
        }
        if glyphs.is_empty() {
            return Err(Error::Font(format!("{}: no Unicode cmap", path.display())));
        }

        let missing_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|adv| to_1000(adv as f32))
            .unwrap_or(500.0);
        let bb = face.global_bounding_box();
        let bbox = Rect::new(
            to_1000(bb.x_min as f32),
            to_1000(bb.y_min as f32),
            to_1000(bb.x_max as f32),
            to_1000(bb.y_max as f32),
        );
        let family = font_family_name(&face).unwrap_or_else(|| "Embedded".to_string());
        let suffix = if face.is_bold() { "-Bold" } else { "" };
        let ps_name = format!("{}{suffix}", family.replace(' ', ""));

        Ok(Self {
            ps_name,
            face_index,
            glyphs,
            missing_width,
            ascent: to_1000(face.ascender() as f32),
            descent: to_1000(face.descender() as f32),
            cap_height: face
                .capital_height()
                .map(|h| to_1000(h as f32))
                .unwrap_or(700.0),
            bbox,
            remapper: subsetter::GlyphRemapper::new(),
            used: BTreeMap::new(),
            data,
        })
    }

    fn char_width_1000(&self, ch: char) -> f32 {
        self.glyphs
            .get(&ch)
            .map(|g| g.width_1000)
            .unwrap_or(self.missing_width)
    }

    /// Big-endian 2-byte glyph ids for an Identity-H content stream.
    fn encode(&mut self, text: &str) -> Vec<u8> {
        let mut out = Vec::with_capacity(text.len() * 2);
        for ch in text.chars() {
            let (gid, width) = match self.glyphs.get(&ch) {
                Some(g) => (g.gid, g.width_1000),
                None => (0, self.missing_width),
            };
            let new_gid = self.remapper.remap(gid);
            self.used.entry(new_gid).or_insert((ch, width));
            out.extend_from_slice(&new_gid.to_be_bytes());
        }
        out
    }

    fn write(&self, pdf: &mut Pdf, font_ref: Ref, alloc: &mut impl FnMut() -> Ref) -> Result<(), Error> {
        let descriptor_ref = alloc();
        let data_ref = alloc();
        let cid_font_ref = alloc();
        let tounicode_ref = alloc();

        let subset_data = subsetter::subset(&self.data, self.face_index, &self.remapper)
            .unwrap_or_else(|e| {
                log::warn!("Font subsetting failed for {}: {e}; embedding full font", self.ps_name);
                self.data.to_vec()
            });
        let data_len = i32::try_from(subset_data.len())
            .map_err(|_| Error::Font(format!("{} is too large to embed", self.ps_name)))?;
        pdf.stream(data_ref, &subset_data)
            .pair(Name(b"Length1"), data_len);

        let ps_name = self.ps_name.as_bytes();
        pdf.font_descriptor(descriptor_ref)
            .name(Name(ps_name))
            .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
            .bbox(self.bbox)
            .italic_angle(0.0)
            .ascent(self.ascent)
            .descent(self.descent)
            .cap_height(self.cap_height)
            .stem_v(80.0)
            .font_file2(data_ref);

        let system_info = || pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        };
        {
            let mut cid = pdf.cid_font(cid_font_ref);
            cid.subtype(pdf_writer::types::CidFontType::Type2);
            cid.base_font(Name(ps_name));
            cid.system_info(system_info());
            cid.font_descriptor(descriptor_ref);
            cid.default_width(0.0);
            cid.cid_to_gid_map_predefined(Name(b"Identity"));
            if !self.used.is_empty() {
                let mut widths = cid.widths();
                for (&gid, &(_, width)) in &self.used {
                    widths.consecutive(gid, [width]);
                }
            }
        }

        let cmap_name = format!("{}-UTF16", self.ps_name);
        let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), system_info());
        for (&gid, &(ch, _)) in &self.used {
            cmap.pair(gid, ch);
        }
        let cmap_data = cmap.finish();
        pdf.stream(tounicode_ref, cmap_data.as_slice());

        pdf.type0_font(font_ref)
            .base_font(Name(ps_name))
            .encoding_predefined(Name(b"Identity-H"))
            .descendant_font(cid_font_ref)
            .to_unicode(tounicode_ref);
        Ok(())
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20A6 => NAIRA_FALLBACK as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi bytes 32..=255.
fn helvetica_widths(weight: Weight) -> Vec<f32> {
    let scale = match weight {
        Weight::Regular => 1.0,
        Weight::Bold => 1.06,
    };
    (32u8..=255u8)
        .map(|b| {
            let w = match b {
                32 => 278.0,                          // space
                33..=47 => 333.0,                     // punctuation
                48..=57 => 556.0,                     // digits
                58..=64 => 333.0,                     // more punctuation
                73 | 74 => 278.0,                     // I J
                77 => 833.0,                          // M
                65..=90 => 667.0,                     // uppercase A-Z
                91..=96 => 333.0,                     // brackets etc.
                102 | 105 | 106 | 108 | 116 => 278.0, // f i j l t
                109 | 119 => 833.0,                   // m w
                97..=122 => 556.0,                    // lowercase a-z
                0x95 => 350.0,                        // bullet
                _ => 556.0,
            };
            w * scale
        })
        .collect()
}

/// One of the standard 14 Helvetica faces, WinAnsi-encoded. Characters
/// outside WinAnsi are dropped.
pub(crate) struct BuiltinFace {
    base_font: &'static str,
    widths_1000: Vec<f32>,
}

impl BuiltinFace {
    fn helvetica(weight: Weight) -> Self {
        let base_font = match weight {
            Weight::Regular => "Helvetica",
            Weight::Bold => "Helvetica-Bold",
        };
        Self {
            base_font,
            widths_1000: helvetica_widths(weight),
        }
    }

    fn char_width_1000(&self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    fn encode(&self, text: &str) -> Vec<u8> {
        text.chars()
            .map(char_to_winansi)
            .filter(|&b| b != 0)
            .collect()
    }
}

pub(crate) enum FontFace {
    Builtin(BuiltinFace),
    Embedded(Box<EmbeddedFace>),
}

/// A font registered on the page resources under `resource_name`.
pub(crate) struct PdfFont {
    pub(crate) resource_name: &'static str,
    face: FontFace,
}

impl PdfFont {
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        match &self.face {
            FontFace::Builtin(f) => f.char_width_1000(ch),
            FontFace::Embedded(f) => f.char_width_1000(ch),
        }
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    /// Bytes for a `Tj` operator in this font's encoding.
    pub(crate) fn encode(&mut self, text: &str) -> Vec<u8> {
        match &mut self.face {
            FontFace::Builtin(f) => f.encode(text),
            FontFace::Embedded(f) => f.encode(text),
        }
    }

    pub(crate) fn write(
        &self,
        pdf: &mut Pdf,
        font_ref: Ref,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<(), Error> {
        match &self.face {
            FontFace::Builtin(f) => {
                pdf.type1_font(font_ref)
                    .base_font(Name(f.base_font.as_bytes()))
                    .encoding_predefined(Name(b"WinAnsiEncoding"));
                Ok(())
            }
            FontFace::Embedded(f) => f.write(pdf, font_ref, alloc),
        }
    }

    pub(crate) fn is_embedded(&self) -> bool {
        matches!(self.face, FontFace::Embedded(_))
    }
}

fn font_directories(extra: &[PathBuf]) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = extra.to_vec();

    #[cfg(target_os = "macos")]
    {
        dirs.extend([
            "/Library/Fonts".into(),
            "/System/Library/Fonts".into(),
            "/System/Library/Fonts/Supplemental".into(),
        ]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join(".local/share/fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Ok(windir) = std::env::var("WINDIR") {
            dirs.push(PathBuf::from(windir).join("Fonts"));
        } else {
            dirs.push("C:\\Windows\\Fonts".into());
        }
    }

    dirs
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
}

fn read_font_style(data: &[u8], face_index: u32) -> Option<(String, bool)> {
    let face = Face::parse(data, face_index).ok()?;
    let family = font_family_name(&face)?;
    Some((family, face.is_bold()))
}

/// Walk the font directories for a face of `family` with the requested
/// weight; a regular face is accepted when no bold one exists.
fn find_font_file(family: &str, bold: bool, extra: &[PathBuf]) -> Option<(PathBuf, u32)> {
    let t0 = std::time::Instant::now();
    let wanted = family.to_lowercase();
    let mut regular_match: Option<(PathBuf, u32)> = None;
    let mut stack = font_directories(extra);
    let mut files_scanned = 0usize;

    while let Some(dir) = stack.pop() {
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            if !is_font_file(&path) {
                continue;
            }
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            files_scanned += 1;
            let face_count = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
            for face_index in 0..face_count {
                let Some((name, is_bold)) = read_font_style(&data, face_index) else {
                    continue;
                };
                if name.to_lowercase() != wanted {
                    continue;
                }
                if is_bold == bold {
                    log::debug!(
                        "Font lookup {family} bold={bold}: {} ({files_scanned} files, {:.1}ms)",
                        path.display(),
                        t0.elapsed().as_secs_f64() * 1000.0
                    );
                    return Some((path, face_index));
                }
                if !is_bold && regular_match.is_none() {
                    regular_match = Some((path.clone(), face_index));
                }
            }
        }
    }
    regular_match
}

fn load_face(config: &FontConfig, weight: Weight) -> Option<EmbeddedFace> {
    let explicit = match weight {
        Weight::Regular => config.regular_path.as_deref(),
        Weight::Bold => config.bold_path.as_deref(),
    };
    if let Some(path) = explicit {
        match EmbeddedFace::open(path, 0) {
            Ok(face) => return Some(face),
            Err(e) => log::warn!("Font {} unusable: {e}", path.display()),
        }
    }
    let family = config.family.as_deref()?;
    let bold = weight == Weight::Bold;
    let Some((path, face_index)) = find_font_file(family, bold, &config.extra_dirs) else {
        log::warn!("Font not found: {family} bold={bold}; using Helvetica");
        return None;
    };
    match EmbeddedFace::open(&path, face_index) {
        Ok(face) => Some(face),
        Err(e) => {
            log::warn!("Font {} unusable: {e}; using Helvetica", path.display());
            None
        }
    }
}

/// Regular and bold fonts of one document.
pub(crate) struct FontPair {
    regular: PdfFont,
    bold: PdfFont,
}

impl FontPair {
    /// Resolve both weights from `config`. Never fails: any weight that
    /// cannot be loaded falls back to built-in Helvetica.
    pub(crate) fn load(config: &FontConfig) -> Self {
        let make = |weight: Weight, resource_name: &'static str| {
            let face = match load_face(config, weight) {
                Some(face) => FontFace::Embedded(Box::new(face)),
                None => FontFace::Builtin(BuiltinFace::helvetica(weight)),
            };
            PdfFont { resource_name, face }
        };
        Self {
            regular: make(Weight::Regular, "F1"),
            bold: make(Weight::Bold, "F2"),
        }
    }

    pub(crate) fn get(&self, weight: Weight) -> &PdfFont {
        match weight {
            Weight::Regular => &self.regular,
            Weight::Bold => &self.bold,
        }
    }

    pub(crate) fn get_mut(&mut self, weight: Weight) -> &mut PdfFont {
        match weight {
            Weight::Regular => &mut self.regular,
            Weight::Bold => &mut self.bold,
        }
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &PdfFont> {
        [&self.regular, &self.bold].into_iter()
    }
}
