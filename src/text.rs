use ab_glyph::{point, Font, FontVec, PxScale, ScaleFont};
use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use tiny_skia::{Color, ColorU8, Paint, Pixmap, PremultipliedColorU8, Rect, Transform};
use tracing::{info, warn};

/// Fonts tried when the settings do not name one.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
];

// Segment bits, low to high: top, upper right, lower right, bottom, lower left, upper left, middle.
const DIGIT_SEGMENTS: [u8; 10] = [
    0b0111111, 0b0000110, 0b1011011, 0b1001111, 0b1100110, 0b1101101, 0b1111101, 0b0000111,
    0b1111111, 0b1101111,
];

/// Draws centred text lines: glyph outlines when a font is available, otherwise
/// a seven-segment rendition of the digits (labels and units are dropped).
pub enum TextPainter {
    Glyphs(FontVec),
    Segments,
}

impl TextPainter {
    /// Uses `explicit` if given, else the first system font that loads.
    pub fn load(explicit: Option<&Path>) -> Self {
        let candidates: Vec<PathBuf> = match explicit {
            Some(path) => vec![path.to_path_buf()],
            None => SYSTEM_FONTS.iter().map(PathBuf::from).collect(),
        };
        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            match Self::from_font_bytes(bytes) {
                Ok(painter) => {
                    info!(font = %path.display(), "Loaded display font");
                    return painter;
                }
                Err(err) => warn!(font = %path.display(), %err, "unusable font"),
            }
        }
        warn!("No display font found; showing numeric readouts only");
        TextPainter::Segments
    }

    pub fn from_font_bytes(bytes: Vec<u8>) -> Result<Self> {
        FontVec::try_from_vec(bytes)
            .map(TextPainter::Glyphs)
            .map_err(|e| anyhow!("invalid font: {e}"))
    }

    /// Draws `text` horizontally centred on `center_x`, with its top edge at `top`.
    pub fn draw(
        &self,
        pixmap: &mut Pixmap,
        text: &str,
        center_x: f32,
        top: f32,
        size: f32,
        color: Color,
    ) {
        match self {
            TextPainter::Glyphs(font) => {
                draw_glyphs(font, pixmap, text, center_x, top, size, color)
            }
            TextPainter::Segments => draw_segments(pixmap, text, center_x, top, size, color),
        }
    }
}

fn draw_glyphs(
    font: &FontVec,
    pixmap: &mut Pixmap,
    text: &str,
    center_x: f32,
    top: f32,
    size: f32,
    color: Color,
) {
    let scale = PxScale::from(size);
    let scaled = font.as_scaled(scale);

    let mut width = 0.0;
    let mut prev = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = prev {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        prev = Some(id);
    }

    let baseline = top + scaled.ascent();
    let mut pen_x = center_x - width / 2.0;
    let mut prev = None;
    let rgba = color.to_color_u8();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = prev {
            pen_x += scaled.kern(prev, id);
        }
        let glyph = id.with_scale_and_position(scale, point(pen_x, baseline));
        pen_x += scaled.h_advance(id);
        prev = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let x = bounds.min.x as i32 + gx as i32;
                let y = bounds.min.y as i32 + gy as i32;
                blend(pixmap, x, y, rgba, coverage);
            });
        }
    }
}

/// Mixes `color` over an opaque background pixel.
fn blend(pixmap: &mut Pixmap, x: i32, y: i32, color: ColorU8, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= pixmap.width() || y as u32 >= pixmap.height() {
        return;
    }
    let idx = y as usize * pixmap.width() as usize + x as usize;
    let dst = pixmap.pixels()[idx];
    let a = coverage.clamp(0.0, 1.0);
    let mix = |s: u8, d: u8| (s as f32 * a + d as f32 * (1.0 - a)).round() as u8;
    if let Some(px) = PremultipliedColorU8::from_rgba(
        mix(color.red(), dst.red()),
        mix(color.green(), dst.green()),
        mix(color.blue(), dst.blue()),
        255,
    ) {
        pixmap.pixels_mut()[idx] = px;
    }
}

/// Characters the segment painter can show; everything else is dropped.
fn segment_text(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ' '))
        .collect::<String>()
        .trim()
        .to_string()
}

fn draw_segments(
    pixmap: &mut Pixmap,
    text: &str,
    center_x: f32,
    top: f32,
    size: f32,
    color: Color,
) {
    let text = segment_text(text);
    let digit_w = size * 0.55;
    let t = (size * 0.1).max(1.0);
    let gap = size * 0.2;
    let advance = |c: char| match c {
        '.' => t * 2.0 + gap,
        ' ' => digit_w * 0.6,
        _ => digit_w + gap,
    };
    let width: f32 = text.chars().map(advance).sum::<f32>() - gap;

    let mut paint = Paint::default();
    paint.set_color(color);
    let mut fill = |x: f32, y: f32, w: f32, h: f32| {
        if let Some(rect) = Rect::from_xywh(x, y, w, h) {
            pixmap.fill_rect(rect, &paint, Transform::identity(), None);
        }
    };

    let mut x = center_x - width / 2.0;
    let half = size / 2.0;
    for c in text.chars() {
        let bits = match c {
            '0'..='9' => DIGIT_SEGMENTS[c as usize - '0' as usize],
            '-' => 0b1000000,
            '.' => {
                fill(x, top + size - t, t, t);
                0
            }
            _ => 0,
        };
        let segments = [
            (0, x, top, digit_w, t),
            (1, x + digit_w - t, top, t, half),
            (2, x + digit_w - t, top + half, t, half),
            (3, x, top + size - t, digit_w, t),
            (4, x, top + half, t, half),
            (5, x, top, t, half),
            (6, x, top + half - t / 2.0, digit_w, t),
        ];
        for (bit, sx, sy, sw, sh) in segments {
            if bits & (1 << bit) != 0 {
                fill(sx, sy, sw, sh);
            }
        }
        x += advance(c);
    }
}
