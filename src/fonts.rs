use std::collections::BTreeMap;
use std::path::Path;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::error::Error;
use crate::model::FontStyle;

const FONT_FILES: [(FontStyle, &str); 4] = [
    (FontStyle::Regular, "OpenSans-Regular.ttf"),
    (FontStyle::Bold, "OpenSans-Bold.ttf"),
    (FontStyle::Italic, "OpenSans-Italic.ttf"),
    (FontStyle::Light, "OpenSans-Light.ttf"),
];

// Base-14 has no light weight.
const BASE14: [&str; 4] = ["Helvetica", "Helvetica-Bold", "Helvetica-Oblique", "Helvetica"];

struct FontFile {
    name: String,
    data: Mmap,
}

/// The report's four font faces, loaded once and shared by every render.
///
/// A PDF font object belongs to exactly one document, so the library only
/// holds the raw font data; each document registers and subsets its own
/// copy through [`DocumentFonts`].
pub struct FontLibrary {
    files: Option<Vec<FontFile>>,
}

impl FontLibrary {
    /// The Helvetica family every PDF viewer ships with. Nothing is embedded.
    pub fn builtin() -> Self {
        Self { files: None }
    }

    /// Memory-map the OpenSans Regular, Bold, Italic and Light faces from
    /// `dir`. Every face must be present and parseable.
    pub fn from_dir(dir: &Path) -> Result<Self, Error> {
        let mut files = Vec::with_capacity(FONT_FILES.len());
        for (_, file_name) in FONT_FILES {
            let path = dir.join(file_name);
            let file = std::fs::File::open(&path)
                .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
            let data = unsafe { Mmap::map(&file) }
                .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
            let face = Face::parse(&data, 0)
                .map_err(|e| Error::Font(format!("{}: {e}", path.display())))?;
            let name = file_name.trim_end_matches(".ttf").to_string();
            log::debug!(
                "Loaded font {name}: {} glyphs, {} units/em",
                face.number_of_glyphs(),
                face.units_per_em()
            );
            files.push(FontFile { name, data });
        }
        Ok(Self { files: Some(files) })
    }
}

struct EmbeddedFace<'a> {
    name: &'a str,
    data: &'a [u8],
    face: Face<'a>,
    units: f32,
    remapper: subsetter::GlyphRemapper,
    /// remapped gid -> (char, advance in 1000-units)
    used: BTreeMap<u16, (char, f32)>,
}

enum FontKind<'a> {
    Base14 {
        base_font: &'static str,
        widths_1000: Vec<f32>,
    },
    Embedded(Box<EmbeddedFace<'a>>),
}

pub(crate) struct FontEntry<'a> {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    kind: FontKind<'a>,
}

impl FontEntry<'_> {
    /// Width of a single character in 1000-units.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        match &self.kind {
            FontKind::Base14 { widths_1000, .. } => {
                let byte = winansi_or_placeholder(ch);
                if byte >= 32 {
                    widths_1000[(byte - 32) as usize]
                } else {
                    0.0
                }
            }
            FontKind::Embedded(f) => {
                let gid = f.face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
                f.face
                    .glyph_hor_advance(gid)
                    .map(|adv| adv as f32 / f.units * 1000.0)
                    .unwrap_or(0.0)
            }
        }
    }

    pub(crate) fn ascender_ratio(&self) -> f32 {
        match &self.kind {
            FontKind::Base14 { .. } => 0.75,
            FontKind::Embedded(f) => f.face.ascender() as f32 / f.units,
        }
    }

    fn encode(&mut self, text: &str) -> Vec<u8> {
        match &mut self.kind {
            FontKind::Base14 { .. } => to_winansi_bytes(text),
            FontKind::Embedded(f) => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let gid = f.face.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
                    let new_gid = f.remapper.remap(gid.0);
                    if gid.0 != 0 && !f.used.contains_key(&new_gid) {
                        let w = f
                            .face
                            .glyph_hor_advance(gid)
                            .map(|adv| adv as f32 / f.units * 1000.0)
                            .unwrap_or(0.0);
                        f.used.insert(new_gid, (ch, w));
                    }
                    out.push((new_gid >> 8) as u8);
                    out.push((new_gid & 0xFF) as u8);
                }
                out
            }
        }
    }
}

/// Fonts registered with a single output document.
///
/// Glyphs are remapped as text is encoded, so content streams can be written
/// page by page; the subset is cut from the final mapping in [`write`].
///
/// [`write`]: DocumentFonts::write
pub(crate) struct DocumentFonts<'a> {
    entries: Vec<FontEntry<'a>>,
}

impl<'a> DocumentFonts<'a> {
    pub(crate) fn open(
        library: &'a FontLibrary,
        alloc: &mut impl FnMut() -> Ref,
    ) -> Result<Self, Error> {
        let mut entries = Vec::with_capacity(FontStyle::ALL.len());
        for style in FontStyle::ALL {
            let idx = style.index();
            let kind = match &library.files {
                None => FontKind::Base14 {
                    base_font: BASE14[idx],
                    widths_1000: helvetica_widths(style == FontStyle::Bold),
                },
                Some(files) => {
                    let file = &files[idx];
                    let face = Face::parse(&file.data, 0)
                        .map_err(|e| Error::Font(format!("{}: {e}", file.name)))?;
                    let units = face.units_per_em() as f32;
                    FontKind::Embedded(Box::new(EmbeddedFace {
                        name: &file.name,
                        data: &file.data,
                        face,
                        units,
                        remapper: subsetter::GlyphRemapper::new(),
                        used: BTreeMap::new(),
                    }))
                }
            };
            entries.push(FontEntry {
                pdf_name: format!("F{}", idx + 1),
                font_ref: alloc(),
                kind,
            });
        }
        Ok(Self { entries })
    }

    pub(crate) fn entry(&self, style: FontStyle) -> &FontEntry<'a> {
        &self.entries[style.index()]
    }

    pub(crate) fn entries(&self) -> impl Iterator<Item = &FontEntry<'a>> {
        self.entries.iter()
    }

    pub(crate) fn text_width(&self, style: FontStyle, text: &str, font_size: f32) -> f32 {
        let entry = self.entry(style);
        text.chars()
            .map(|ch| entry.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn space_width(&self, style: FontStyle, font_size: f32) -> f32 {
        self.entry(style).char_width_1000(' ') * font_size / 1000.0
    }

    pub(crate) fn encode(&mut self, style: FontStyle, text: &str) -> Vec<u8> {
        self.entries[style.index()].encode(text)
    }

    /// Write the font dictionaries. Consumes the registration: the glyph
    /// mapping is final once the subsets are cut.
    pub(crate) fn write(self, pdf: &mut Pdf, alloc: &mut impl FnMut() -> Ref) {
        for entry in self.entries {
            match entry.kind {
                FontKind::Base14 { base_font, .. } => {
                    pdf.type1_font(entry.font_ref)
                        .base_font(Name(base_font.as_bytes()))
                        .encoding_predefined(Name(b"WinAnsiEncoding"));
                }
                FontKind::Embedded(face) => {
                    let t0 = std::time::Instant::now();
                    let glyphs = face.used.len();
                    let name = face.name;
                    embed_truetype(pdf, entry.font_ref, *face, alloc);
                    log::debug!(
                        "embed font {name}: {glyphs} glyphs → {:.1}ms",
                        t0.elapsed().as_secs_f64() * 1000.0,
                    );
                }
            }
        }
    }
}

/// Map a char to its WinAnsi byte, using '?' for anything outside the code page.
fn winansi_or_placeholder(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007E => c as u8,
        0x00A0..=0x00FF => c as u8,
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
        _ => b'?',
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str encoding.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars().map(winansi_or_placeholder).collect()
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths(bold: bool) -> Vec<f32> {
    let scale = if bold { 1.05 } else { 1.0 };
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => 667.0,                     // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            _ => 556.0,
        })
        .map(|w| w * scale)
        .collect()
}

/// Embed a TrueType face as a CIDFont (Type0 composite) with Identity-H
/// encoding, subset to the glyphs the document encoded.
fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    face: EmbeddedFace<'_>,
    alloc: &mut impl FnMut() -> Ref,
) {
    let EmbeddedFace {
        name,
        data,
        face,
        units,
        remapper,
        used,
    } = face;
    let descriptor_ref = alloc();
    let data_ref = alloc();

    let ascent = face.ascender() as f32 / units * 1000.0;
    let descent = face.descender() as f32 / units * 1000.0;
    let cap_height = face
        .capital_height()
        .map(|h| h as f32 / units * 1000.0)
        .unwrap_or(700.0);

    let bb = face.global_bounding_box();
    let bbox = Rect::new(
        bb.x_min as f32 / units * 1000.0,
        bb.y_min as f32 / units * 1000.0,
        bb.x_max as f32 / units * 1000.0,
        bb.y_max as f32 / units * 1000.0,
    );

    let subset_data = subsetter::subset(data, 0, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {name}: {e}, embedding full font");
        data.to_vec()
    });
    let raw_len = i32::try_from(subset_data.len()).unwrap_or(i32::MAX);
    let compressed = miniz_oxide::deflate::compress_to_vec_zlib(&subset_data, 6);

    pdf.stream(data_ref, &compressed)
        .filter(pdf_writer::Filter::FlateDecode)
        .pair(Name(b"Length1"), raw_len);

    let ps_name = name.replace(' ', "");

    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(bbox)
        .italic_angle(0.0)
        .ascent(ascent)
        .descent(descent)
        .cap_height(cap_height)
        .stem_v(80.0)
        .font_file2(data_ref);

    let cid_font_ref = alloc();
    let system_info = pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info);
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !used.is_empty() {
            let mut w = cid.widths();
            for (&gid, &(_, width)) in &used {
                w.consecutive(gid, [width]);
            }
        }
    }

    let tounicode_ref = alloc();
    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(
        Name(cmap_name.as_bytes()),
        pdf_writer::types::SystemInfo {
            registry: pdf_writer::Str(b"Adobe"),
            ordering: pdf_writer::Str(b"Identity"),
            supplement: 0,
        },
    );
    for (&gid, &(ch, _)) in &used {
        cmap.pair(gid, ch);
    }
    let cmap_data = cmap.finish();
    pdf.stream(tounicode_ref, cmap_data.as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winansi_placeholder_for_unmappable() {
        assert_eq!(to_winansi_bytes("a\u{2022}b"), vec![b'a', 0x95, b'b']);
        assert_eq!(to_winansi_bytes("α"), vec![b'?']);
    }

    #[test]
    fn builtin_registration_measures_text() {
        let library = FontLibrary::builtin();
        let mut next = 1;
        let mut alloc = || {
            let r = Ref::new(next);
            next += 1;
            r
        };
        let fonts = DocumentFonts::open(&library, &mut alloc).expect("builtin fonts");
        let regular = fonts.text_width(FontStyle::Regular, "mm", 10.0);
        let bold = fonts.text_width(FontStyle::Bold, "mm", 10.0);
        assert!((regular - 16.66).abs() < 0.01);
        assert!(bold > regular);
        assert_eq!(fonts.entry(FontStyle::Italic).pdf_name, "F3");
    }
}
