mod layout;
mod table;

use std::collections::HashMap;
use std::time::Instant;

use pdf_writer::types::{ActionType, AnnotationType, PageMode};
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::Error;
use crate::fonts::{DocumentFonts, FontLibrary};
use crate::model::{Alignment, DARK_GRAY, LinkTarget, Paragraph, REPORT_BLUE, Run};
use crate::profile::{HeadingLevel, LayoutProfile, Margins};
use crate::raster::RasterImage;

use layout::{LinkAnnotation, build_paragraph_lines, line_ascent, render_line};

/// Label and page number drawn at the bottom of every page once the
/// document is finished.
#[derive(Clone, Debug)]
pub struct PageFooter {
    pub label: String,
    pub font_size: f32,
}

struct FinishedPage {
    content: Content,
    links: Vec<LinkAnnotation>,
}

struct OutlineEntry {
    title: String,
    destination: String,
    level: u8,
}

/// The serialized report and what went into it.
#[derive(Debug)]
pub struct FinishedDocument {
    pub bytes: Vec<u8>,
    pub pages: usize,
    pub images: usize,
    pub missing_images: usize,
    pub unresolved_links: usize,
}

/// A PDF being composed top to bottom, one flowing page at a time.
///
/// Everything lives in memory until [`finish`](ReportDocument::finish), so a
/// render that fails halfway leaves nothing behind. Links to named
/// destinations are resolved at finish; a table of contents can therefore
/// point at sections that have not been laid out yet.
pub struct ReportDocument<'a> {
    pdf: Pdf,
    next_ref: i32,
    fonts: DocumentFonts<'a>,
    profile: LayoutProfile,
    page_width: f32,
    page_height: f32,
    footer: PageFooter,
    title: String,
    pages: Vec<FinishedPage>,
    content: Content,
    links: Vec<LinkAnnotation>,
    cursor_y: f32,
    page_has_content: bool,
    /// name -> (page index, y of the top of the target)
    destinations: HashMap<String, (usize, f32)>,
    outline: Vec<OutlineEntry>,
    images: Vec<(String, Ref)>,
    missing_images: usize,
}

impl<'a> ReportDocument<'a> {
    pub fn open(
        library: &'a FontLibrary,
        profile: LayoutProfile,
        title: impl Into<String>,
        footer: PageFooter,
    ) -> Result<Self, Error> {
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };
        let fonts = DocumentFonts::open(library, &mut alloc)?;
        let (page_width, page_height) = profile.page_size.dimensions();
        let cursor_y = page_height - profile.margin.top;
        Ok(Self {
            pdf: Pdf::new(),
            next_ref: next_id,
            fonts,
            profile,
            page_width,
            page_height,
            footer,
            title: title.into(),
            pages: Vec::new(),
            content: Content::new(),
            links: Vec::new(),
            cursor_y,
            page_has_content: false,
            destinations: HashMap::new(),
            outline: Vec::new(),
            images: Vec::new(),
            missing_images: 0,
        })
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_ref);
        self.next_ref += 1;
        r
    }

    pub fn profile(&self) -> &LayoutProfile {
        &self.profile
    }

    pub fn content_width(&self) -> f32 {
        self.page_width - self.profile.margin.left - self.profile.margin.right
    }

    fn content_top(&self) -> f32 {
        self.page_height - self.profile.margin.top
    }

    fn content_bottom(&self) -> f32 {
        self.profile.margin.bottom
    }

    /// 1-based number of the page currently being filled.
    pub fn page_number(&self) -> usize {
        self.pages.len() + 1
    }

    pub fn remaining_height(&self) -> f32 {
        self.cursor_y - self.content_bottom()
    }

    /// Close the current page and start a fresh one.
    pub fn new_page(&mut self) {
        let content = std::mem::replace(&mut self.content, Content::new());
        let links = std::mem::take(&mut self.links);
        self.pages.push(FinishedPage { content, links });
        self.cursor_y = self.content_top();
        self.page_has_content = false;
    }

    /// Start a new page unless the current one is still empty.
    pub fn page_break(&mut self) {
        if self.page_has_content {
            self.new_page();
        }
    }

    /// Break the page if less than `height` is left below the cursor.
    pub fn ensure_space(&mut self, height: f32) {
        if self.page_has_content && self.cursor_y - height < self.content_bottom() {
            self.new_page();
        }
    }

    pub fn vertical_space(&mut self, pt: f32) {
        if self.cursor_y - pt < self.content_bottom() {
            self.page_break();
        } else {
            self.cursor_y -= pt;
        }
    }

    /// Register `name` at the cursor. The first registration wins.
    pub fn add_destination(&mut self, name: &str) {
        if self.destinations.contains_key(name) {
            log::debug!("Destination {name} registered twice, keeping the first");
            return;
        }
        self.destinations
            .insert(name.to_string(), (self.pages.len(), self.cursor_y));
    }

    /// Add a bookmark pointing at a named destination. Level 0 entries are
    /// top-level; level 1 entries nest under the preceding level 0 entry.
    pub fn add_outline(&mut self, title: impl Into<String>, destination: impl Into<String>, level: u8) {
        self.outline.push(OutlineEntry {
            title: title.into(),
            destination: destination.into(),
            level,
        });
    }

    pub fn paragraph(&mut self, para: &Paragraph) {
        let left = self.profile.margin.left + para.indent_left;
        let width = (self.content_width() - para.indent_left).max(1.0);
        let line_spacing = self.profile.line_spacing;
        let lines = build_paragraph_lines(&para.runs, &self.fonts, width);

        if self.page_has_content {
            self.cursor_y -= para.space_before;
        }
        if let Some(first) = lines.first() {
            self.ensure_space(first.height(line_spacing));
        }
        if let Some(dest) = &para.destination {
            self.add_destination(dest);
        }

        let last = lines.len().saturating_sub(1);
        for (i, line) in lines.iter().enumerate() {
            let h = line.height(line_spacing);
            self.ensure_space(h);
            let baseline = self.cursor_y - line_ascent(line, &self.fonts);
            render_line(
                &mut self.content,
                line,
                para.alignment,
                left,
                width,
                baseline,
                i == last,
                &mut self.links,
                &mut self.fonts,
            );
            self.cursor_y -= h;
            self.page_has_content = true;
        }
        self.cursor_y -= para.space_after.unwrap_or(self.profile.paragraph_spacing);
    }

    /// A heading kept together with at least two body lines.
    pub fn heading(&mut self, level: HeadingLevel, text: &str, destination: Option<&str>) {
        let size = self.profile.heading_size(level);
        let run = match level {
            HeadingLevel::Title | HeadingLevel::H1 | HeadingLevel::H2 => {
                Run::new(text, size).bold().color(REPORT_BLUE)
            }
            HeadingLevel::H3 | HeadingLevel::H4 => Run::new(text, size).bold(),
        };
        let space_before = if self.page_has_content { size * 0.6 } else { 0.0 };
        let body_line = self.profile.font_size.p * self.profile.line_spacing;
        self.ensure_space(space_before + size * self.profile.line_spacing + 2.0 * body_line);

        let mut para = Paragraph::new(vec![run])
            .space_before(space_before)
            .space_after(size * 0.4);
        if let Some(dest) = destination {
            para = para.destination(dest);
        }
        self.paragraph(&para);
    }

    /// A thin horizontal rule across the content width.
    pub fn rule(&mut self, color: [u8; 3]) {
        self.ensure_space(4.0);
        let [r, g, b] = color;
        let y = self.cursor_y - 2.0;
        let left = self.profile.margin.left;
        let right = self.page_width - self.profile.margin.right;
        self.content.save_state();
        self.content.set_line_width(0.75);
        self.content
            .set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
        self.content.move_to(left, y);
        self.content.line_to(right, y);
        self.content.stroke();
        self.content.restore_state();
        self.cursor_y -= 4.0 + self.profile.paragraph_spacing;
        self.page_has_content = true;
    }

    /// Draw a bitmap centred in the content area, scaled down to fit the
    /// content width and `max_height`. Never scaled up.
    pub fn image(&mut self, img: &RasterImage, max_height: f32) {
        let (w_px, h_px) = img.dimensions();
        if w_px == 0 || h_px == 0 {
            return;
        }
        // 96 dpi
        let natural_w = w_px as f32 * 0.75;
        let natural_h = h_px as f32 * 0.75;
        let max_h = max_height.min(self.content_top() - self.content_bottom());
        let scale = (self.content_width() / natural_w)
            .min(max_h / natural_h)
            .min(1.0);
        let (display_w, display_h) = (natural_w * scale, natural_h * scale);

        self.ensure_space(display_h);
        let pdf_name = self.embed_image(img);
        let x = self.profile.margin.left + (self.content_width() - display_w) / 2.0;
        let y_bottom = self.cursor_y - display_h;
        self.content.save_state();
        self.content
            .transform([display_w, 0.0, 0.0, display_h, x, y_bottom]);
        self.content.x_object(Name(pdf_name.as_bytes()));
        self.content.restore_state();
        self.cursor_y = y_bottom - self.profile.paragraph_spacing;
        self.page_has_content = true;
    }

    /// Note in place of an image that could not be produced.
    pub fn image_unavailable(&mut self, note: &str) {
        self.missing_images += 1;
        let size = self.profile.font_size.p;
        self.paragraph(&Paragraph::new(vec![
            Run::new(note, size).italic().color(DARK_GRAY),
        ]));
    }

    /// Embed as an RGB flate stream, with an alpha soft mask when any pixel
    /// is not fully opaque.
    fn embed_image(&mut self, rgba: &RasterImage) -> String {
        let xobj_ref = self.alloc();
        let pdf_name = format!("Im{}", self.images.len() + 1);
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
            let mask_ref = self.alloc();
            let mut mask = self.pdf.image_xobject(mask_ref, &compressed_alpha);
            mask.filter(Filter::FlateDecode);
            mask.width(w as i32);
            mask.height(h as i32);
            mask.color_space().device_gray();
            mask.bits_per_component(8);
            Some(mask_ref)
        } else {
            None
        };

        let mut xobj = self.pdf.image_xobject(xobj_ref, &compressed_rgb);
        xobj.filter(Filter::FlateDecode);
        xobj.width(w as i32);
        xobj.height(h as i32);
        xobj.color_space().device_rgb();
        xobj.bits_per_component(8);
        if let Some(mask_ref) = smask_ref {
            xobj.s_mask(mask_ref);
        }
        drop(xobj);

        self.images.push((pdf_name.clone(), xobj_ref));
        pdf_name
    }

    /// Close the last page and serialize the document.
    pub fn finish(mut self) -> Result<FinishedDocument, Error> {
        let t0 = Instant::now();
        let open_page = self.pages.len();
        let open_page_targeted = self.destinations.values().any(|&(p, _)| p == open_page);
        if self.page_has_content || open_page_targeted || self.pages.is_empty() {
            self.new_page();
        }

        let total = self.pages.len();
        for (i, page) in self.pages.iter_mut().enumerate() {
            draw_footer(
                &mut page.content,
                &mut self.fonts,
                &self.footer,
                &self.profile.margin,
                self.page_width,
                i + 1,
                total,
            );
        }

        let ReportDocument {
            mut pdf,
            next_ref,
            fonts,
            page_width,
            page_height,
            title,
            pages,
            destinations,
            outline,
            images,
            missing_images,
            ..
        } = self;
        let mut next_id = next_ref;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let n = pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        let mut unresolved_links = 0usize;
        let mut page_annot_refs: Vec<Vec<Ref>> = Vec::with_capacity(n);
        for page in &pages {
            let mut refs = Vec::with_capacity(page.links.len());
            for link in &page.links {
                let goto = match &link.target {
                    LinkTarget::Uri(_) => None,
                    LinkTarget::Destination(name) => match destinations.get(name) {
                        Some(&(page_idx, y)) => Some((page_ids[page_idx], y)),
                        None => {
                            log::warn!("Link to unknown destination {name} dropped");
                            unresolved_links += 1;
                            continue;
                        }
                    },
                };
                let annot_ref = alloc();
                let mut annot = pdf.annotation(annot_ref);
                annot
                    .subtype(AnnotationType::Link)
                    .rect(link.rect)
                    .border(0.0, 0.0, 0.0, None);
                match (&link.target, goto) {
                    (LinkTarget::Uri(uri), _) => {
                        annot
                            .action()
                            .action_type(ActionType::Uri)
                            .uri(Str(uri.as_bytes()));
                    }
                    (LinkTarget::Destination(_), Some((page_ref, y))) => {
                        annot
                            .action()
                            .action_type(ActionType::GoTo)
                            .destination()
                            .page(page_ref)
                            .xyz(0.0, y, None);
                    }
                    (LinkTarget::Destination(_), None) => {}
                }
                refs.push(annot_ref);
            }
            page_annot_refs.push(refs);
        }
        let t_links = t0.elapsed();

        let outline_root = write_outline(&mut pdf, &mut alloc, &outline, &destinations, &page_ids);

        let font_pairs: Vec<(String, Ref)> = fonts
            .entries()
            .map(|e| (e.pdf_name.clone(), e.font_ref))
            .collect();
        fonts.write(&mut pdf, &mut alloc);
        let t_fonts = t0.elapsed();

        for (i, page) in pages.into_iter().enumerate() {
            let raw = page.content.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_ids[i], &compressed)
                .filter(Filter::FlateDecode);
        }

        {
            let mut catalog = pdf.catalog(catalog_id);
            catalog.pages(pages_id);
            if let Some(root) = outline_root {
                catalog.outlines(root);
                catalog.page_mode(PageMode::UseOutlines);
            }
        }
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for i in 0..n {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, page_width, page_height))
                .parent(pages_id)
                .contents(content_ids[i]);
            if !page_annot_refs[i].is_empty() {
                page.annotations(page_annot_refs[i].iter().copied());
            }
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !images.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &images {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        let info_id = alloc();
        pdf.document_info(info_id)
            .title(TextStr(&title))
            .producer(TextStr(concat!("pathway-report ", env!("CARGO_PKG_VERSION"))));

        let bytes = pdf.finish();
        let t_assembly = t0.elapsed();
        log::info!(
            "Assembly phases: links={:.1}ms, font_embed={:.1}ms, pages={:.1}ms ({n} pages, {} images, {} bytes)",
            t_links.as_secs_f64() * 1000.0,
            (t_fonts - t_links).as_secs_f64() * 1000.0,
            (t_assembly - t_fonts).as_secs_f64() * 1000.0,
            images.len(),
            bytes.len(),
        );

        Ok(FinishedDocument {
            bytes,
            pages: n,
            images: images.len(),
            missing_images,
            unresolved_links,
        })
    }
}

/// Rule plus "label ... Page N of M" below the bottom margin.
fn draw_footer(
    content: &mut Content,
    fonts: &mut DocumentFonts<'_>,
    footer: &PageFooter,
    margin: &Margins,
    page_width: f32,
    page_number: usize,
    total_pages: usize,
) {
    let size = footer.font_size;
    let left = margin.left;
    let right = page_width - margin.right;
    let rule_y = margin.bottom * 0.6;
    let baseline = (rule_y - size - 2.0).max(4.0);
    let [r, g, b] = DARK_GRAY;

    content.save_state();
    content.set_line_width(0.5);
    content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
    content.move_to(left, rule_y);
    content.line_to(right, rule_y);
    content.stroke();
    content.restore_state();

    let width = right - left;
    let label = Run::new(footer.label.clone(), size).light().color(DARK_GRAY);
    let number = Run::new(format!("Page {page_number} of {total_pages}"), size).color(DARK_GRAY);
    for (run, alignment) in [(label, Alignment::Left), (number, Alignment::Right)] {
        let lines = build_paragraph_lines(std::slice::from_ref(&run), fonts, width);
        if let Some(line) = lines.first() {
            render_line(content, line, alignment, left, width, baseline, true, &mut Vec::new(), fonts);
        }
    }
}

/// Write the bookmark tree. Entries whose destination was never registered
/// are skipped; returns `None` when nothing is left.
fn write_outline(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    entries: &[OutlineEntry],
    destinations: &HashMap<String, (usize, f32)>,
    page_ids: &[Ref],
) -> Option<Ref> {
    struct Item<'e> {
        id: Ref,
        title: &'e str,
        page: Ref,
        y: f32,
        children: Vec<Item<'e>>,
    }

    let mut tops: Vec<Item<'_>> = Vec::new();
    for entry in entries {
        let Some(&(page_idx, y)) = destinations.get(&entry.destination) else {
            log::warn!("Bookmark '{}' points at unknown destination {}", entry.title, entry.destination);
            continue;
        };
        let item = Item {
            id: alloc(),
            title: &entry.title,
            page: page_ids[page_idx],
            y,
            children: Vec::new(),
        };
        match tops.last_mut() {
            Some(parent) if entry.level > 0 => parent.children.push(item),
            _ => tops.push(item),
        }
    }
    if tops.is_empty() {
        return None;
    }

    let root = alloc();
    let visible: usize = tops.iter().map(|t| 1 + t.children.len()).sum();
    fn write_level(pdf: &mut Pdf, items: &[Item<'_>], parent: Ref) {
        for (i, item) in items.iter().enumerate() {
            let mut node = pdf.outline_item(item.id);
            node.title(TextStr(item.title)).parent(parent);
            if i > 0 {
                node.prev(items[i - 1].id);
            }
            if let Some(next) = items.get(i + 1) {
                node.next(next.id);
            }
            if let (Some(first), Some(last)) = (item.children.first(), item.children.last()) {
                node.first(first.id)
                    .last(last.id)
                    .count(item.children.len() as i32);
            }
            node.dest().page(item.page).xyz(0.0, item.y, None);
        }
    }

    write_level(pdf, &tops, root);
    for top in &tops {
        write_level(pdf, &top.children, top.id);
    }

    if let (Some(first), Some(last)) = (tops.first(), tops.last()) {
        pdf.outline(root)
            .first(first.id)
            .last(last.id)
            .count(visible as i32);
    }
    Some(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer() -> PageFooter {
        PageFooter {
            label: "Report".into(),
            font_size: 8.0,
        }
    }

    #[test]
    fn page_break_on_empty_page_is_a_no_op() {
        let library = FontLibrary::builtin();
        let mut doc = ReportDocument::open(&library, LayoutProfile::default(), "t", footer())
            .expect("open");
        doc.page_break();
        assert_eq!(doc.page_number(), 1);
        doc.paragraph(&Paragraph::new(vec![Run::new("hello", 10.0)]));
        doc.page_break();
        assert_eq!(doc.page_number(), 2);
    }

    #[test]
    fn long_text_flows_onto_new_pages() {
        let library = FontLibrary::builtin();
        let mut doc = ReportDocument::open(&library, LayoutProfile::default(), "t", footer())
            .expect("open");
        let text = "lorem ipsum dolor sit amet ".repeat(2000);
        doc.paragraph(&Paragraph::new(vec![Run::new(text, 10.0)]));
        let finished = doc.finish().expect("finish");
        assert!(finished.pages > 3, "got {} pages", finished.pages);
        assert!(finished.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn forward_links_resolve_and_unknown_ones_are_dropped() {
        let library = FontLibrary::builtin();
        let mut doc = ReportDocument::open(&library, LayoutProfile::default(), "t", footer())
            .expect("open");
        doc.paragraph(&Paragraph::new(vec![
            Run::new("ahead", 10.0).link(LinkTarget::Destination("later".into())),
        ]));
        doc.paragraph(&Paragraph::new(vec![
            Run::new("nowhere", 10.0).link(LinkTarget::Destination("missing".into())),
        ]));
        doc.new_page();
        doc.heading(HeadingLevel::H1, "Later", Some("later"));
        doc.add_outline("Later", "later", 0);
        let finished = doc.finish().expect("finish");
        assert_eq!(finished.pages, 2);
        assert_eq!(finished.unresolved_links, 1);
    }

    #[test]
    fn trailing_empty_page_is_not_emitted() {
        let library = FontLibrary::builtin();
        let mut doc = ReportDocument::open(&library, LayoutProfile::default(), "t", footer())
            .expect("open");
        doc.paragraph(&Paragraph::new(vec![Run::new("only page", 10.0)]));
        doc.page_break();
        let finished = doc.finish().expect("finish");
        assert_eq!(finished.pages, 1);
    }
}
