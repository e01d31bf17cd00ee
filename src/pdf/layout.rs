use pdf_writer::{Content, Name, Rect, Str};

use crate::fonts::DocumentFonts;
use crate::model::{Alignment, FontStyle, LinkTarget, Run};

pub(super) struct WordChunk {
    pub(super) style: FontStyle,
    pub(super) text: String,
    pub(super) font_size: f32,
    pub(super) color: Option<[u8; 3]>,
    pub(super) x_offset: f32, // x relative to line start
    pub(super) width: f32,
    pub(super) link: Option<LinkTarget>,
}

pub(super) struct LinkAnnotation {
    pub(super) rect: Rect,
    pub(super) target: LinkTarget,
}

pub(super) struct TextLine {
    pub(super) chunks: Vec<WordChunk>,
    pub(super) total_width: f32,
    pub(super) font_size: f32,
}

impl TextLine {
    pub(super) fn height(&self, line_spacing: f32) -> f32 {
        self.font_size * line_spacing
    }
}

fn finish_line(chunks: &mut Vec<WordChunk>, fallback_size: f32) -> TextLine {
    let total_width = chunks.last().map(|c| c.x_offset + c.width).unwrap_or(0.0);
    let font_size = chunks
        .iter()
        .map(|c| c.font_size)
        .fold(0.0f32, f32::max);
    TextLine {
        chunks: std::mem::take(chunks),
        total_width,
        font_size: if font_size > 0.0 { font_size } else { fallback_size },
    }
}

/// Split a word wider than `max_width` into pieces that fit.
fn split_long_word(
    word: &str,
    style: FontStyle,
    font_size: f32,
    max_width: f32,
    fonts: &DocumentFonts<'_>,
) -> Vec<(String, f32)> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut current_w = 0.0f32;
    for ch in word.chars() {
        let cw = fonts.entry(style).char_width_1000(ch) * font_size / 1000.0;
        if !current.is_empty() && current_w + cw > max_width {
            pieces.push((std::mem::take(&mut current), current_w));
            current_w = 0.0;
        }
        current.push(ch);
        current_w += cw;
    }
    if !current.is_empty() {
        pieces.push((current, current_w));
    }
    pieces
}

/// Layout runs into wrapped lines.
/// No space is inserted between runs unless the preceding text ended with
/// whitespace or the new run starts with whitespace ("bold" + ", " stays
/// "bold,"). Explicit newlines force a line break.
pub(super) fn build_paragraph_lines(
    runs: &[Run],
    fonts: &DocumentFonts<'_>,
    max_width: f32,
) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    let mut current_chunks: Vec<WordChunk> = Vec::new();
    let mut current_x: f32 = 0.0;
    let mut prev_ended_with_ws = false;
    let mut prev_space_w: f32 = 0.0;
    let fallback_size = runs.first().map_or(10.0, |r| r.font_size);

    for run in runs {
        let space_w = fonts.space_width(run.style, run.font_size);

        for (li, segment) in run.text.split('\n').enumerate() {
            if li > 0 {
                lines.push(finish_line(&mut current_chunks, run.font_size));
                current_x = 0.0;
                prev_ended_with_ws = false;
            }
            let starts_with_ws = segment.starts_with(char::is_whitespace);

            for (i, word) in segment.split_whitespace().enumerate() {
                let ww = fonts.text_width(run.style, word, run.font_size);

                let need_space =
                    !current_chunks.is_empty() && (i > 0 || starts_with_ws || prev_ended_with_ws);
                let effective_space_w = if i > 0 || starts_with_ws {
                    space_w
                } else {
                    prev_space_w
                };
                let proposed_x = if need_space {
                    current_x + effective_space_w
                } else {
                    current_x
                };

                if !current_chunks.is_empty() && proposed_x + ww > max_width {
                    lines.push(finish_line(&mut current_chunks, run.font_size));
                    current_x = 0.0;
                } else {
                    current_x = proposed_x;
                }

                let pieces = if ww > max_width {
                    split_long_word(word, run.style, run.font_size, max_width, fonts)
                } else {
                    vec![(word.to_string(), ww)]
                };
                let last_piece = pieces.len().saturating_sub(1);
                for (pi, (text, width)) in pieces.into_iter().enumerate() {
                    current_chunks.push(WordChunk {
                        style: run.style,
                        text,
                        font_size: run.font_size,
                        color: run.color,
                        x_offset: current_x,
                        width,
                        link: run.link.clone(),
                    });
                    current_x += width;
                    if pi < last_piece {
                        lines.push(finish_line(&mut current_chunks, run.font_size));
                        current_x = 0.0;
                    }
                }
            }
            prev_ended_with_ws = segment.ends_with(char::is_whitespace);
        }
        prev_space_w = space_w;
    }

    if !current_chunks.is_empty() {
        lines.push(finish_line(&mut current_chunks, fallback_size));
    }

    if lines.is_empty() {
        lines.push(TextLine {
            chunks: vec![],
            total_width: 0.0,
            font_size: fallback_size,
        });
    }
    lines
}

/// Render one pre-built line at `baseline_y` applying the alignment.
/// `is_last_line` keeps the last line of a justified paragraph left-aligned.
pub(super) fn render_line(
    content: &mut Content,
    line: &TextLine,
    alignment: Alignment,
    margin_left: f32,
    text_width: f32,
    baseline_y: f32,
    is_last_line: bool,
    links: &mut Vec<LinkAnnotation>,
    fonts: &mut DocumentFonts<'_>,
) {
    if line.chunks.is_empty() {
        return;
    }

    let is_justified = alignment == Alignment::Justify && !is_last_line && line.chunks.len() > 1;

    let line_start_x = match alignment {
        Alignment::Center => margin_left + (text_width - line.total_width) / 2.0,
        Alignment::Right => margin_left + text_width - line.total_width,
        Alignment::Left | Alignment::Justify => margin_left,
    };

    let extra_per_gap = if is_justified {
        (text_width - line.total_width) / (line.chunks.len() - 1) as f32
    } else {
        0.0
    };

    let mut current_color: Option<[u8; 3]> = None;
    let mut cur_font: Option<(FontStyle, f32)> = None;

    content.begin_text();
    let mut td_x = 0.0_f32;
    let mut td_y = 0.0_f32;

    for (chunk_idx, chunk) in line.chunks.iter().enumerate() {
        let x = line_start_x + chunk.x_offset + chunk_idx as f32 * extra_per_gap;

        if chunk.color != current_color {
            if let Some([r, g, b]) = chunk.color {
                content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
            } else {
                content.set_fill_gray(0.0);
            }
            current_color = chunk.color;
        }

        if cur_font != Some((chunk.style, chunk.font_size)) {
            let pdf_name = &fonts.entry(chunk.style).pdf_name;
            content.set_font(Name(pdf_name.as_bytes()), chunk.font_size);
            cur_font = Some((chunk.style, chunk.font_size));
        }

        content.next_line(x - td_x, baseline_y - td_y);
        td_x = x;
        td_y = baseline_y;

        let text_bytes = fonts.encode(chunk.style, &chunk.text);
        content.show(Str(&text_bytes));

        if let Some(ref target) = chunk.link {
            let bottom = baseline_y - chunk.font_size * 0.2;
            let top = baseline_y + chunk.font_size * 0.8;
            let merged = links
                .last_mut()
                .filter(|prev| prev.target == *target && (prev.rect.y1 - bottom).abs() < 1.0);
            if let Some(prev) = merged {
                prev.rect.x2 = x + chunk.width;
            } else {
                links.push(LinkAnnotation {
                    rect: Rect::new(x, bottom, x + chunk.width, top),
                    target: target.clone(),
                });
            }
        }
    }
    content.end_text();

    if current_color.is_some() {
        content.set_fill_gray(0.0);
    }
}

/// Ascent of the tallest chunk, used to place the first baseline below a top edge.
pub(super) fn line_ascent(line: &TextLine, fonts: &DocumentFonts<'_>) -> f32 {
    line.chunks
        .iter()
        .map(|c| c.font_size * fonts.entry(c.style).ascender_ratio())
        .fold(0.0f32, f32::max)
        .max(line.font_size * 0.75)
}
