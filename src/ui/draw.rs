//! Software drawing into a `0RGB` pixel buffer.

use std::fs;

use ab_glyph::{Font, FontArc, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use fontdb::{Database, Family, Query, Source};

use crate::image_source::DecodedImage;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn from_rgb(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let b = (hex & 0xFF) as f32 / 255.0;
        Self { r, g, b, a: 1.0 }
    }

    fn rgb(self) -> (f32, f32, f32) {
        (self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            right: left + width,
            bottom: top + height,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    fn inset(&self, by: f32) -> Self {
        Self {
            left: self.left + by,
            top: self.top + by,
            right: self.right - by,
            bottom: self.bottom - by,
        }
    }
}

/// A mutable view over a window-sized pixel buffer.
pub struct Canvas<'a> {
    buffer: &'a mut [u32],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(buffer: &'a mut [u32], width: u32, height: u32) -> Self {
        debug_assert_eq!(buffer.len(), (width as usize) * (height as usize));
        Self {
            buffer,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: Color) {
        let packed = pack_color(color.rgb());
        self.buffer.fill(packed);
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        let x0 = rect.left.max(0.0).floor() as i32;
        let y0 = rect.top.max(0.0).floor() as i32;
        let x1 = rect.right.min(self.width as f32).ceil() as i32;
        let y1 = rect.bottom.min(self.height as f32).ceil() as i32;
        for y in y0.max(0)..y1.min(self.height as i32) {
            for x in x0.max(0)..x1.min(self.width as i32) {
                self.blend_pixel(x as f32, y as f32, color, color.a);
            }
        }
    }

    pub fn rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        if radius <= 0.0 || radius * 2.0 >= rect.width().min(rect.height()) {
            self.fill_rect(rect, color);
            return;
        }
        self.fill_rect(
            Rect {
                left: rect.left + radius,
                right: rect.right - radius,
                ..rect
            },
            color,
        );
        self.fill_rect(
            Rect {
                top: rect.top + radius,
                bottom: rect.bottom - radius,
                ..rect
            },
            color,
        );
        let inner = rect.inset(radius);
        for (cx, cy, sx, sy) in [
            (inner.left, inner.top, -1.0, -1.0),
            (inner.right, inner.top, 1.0, -1.0),
            (inner.left, inner.bottom, -1.0, 1.0),
            (inner.right, inner.bottom, 1.0, 1.0),
        ] {
            self.corner(cx, cy, radius, (sx, sy), color);
        }
    }

    // `quadrant` holds the signs of the offsets that belong to this corner.
    fn corner(&mut self, center_x: f32, center_y: f32, radius: f32, quadrant: (f32, f32), color: Color) {
        let radius_i = radius.ceil() as i32;
        for dy in 1..=radius_i {
            for dx in 1..=radius_i {
                let (fx, fy) = (dx as f32, dy as f32);
                if (fx * fx + fy * fy).sqrt() <= radius {
                    self.blend_pixel(
                        center_x + fx * quadrant.0,
                        center_y + fy * quadrant.1,
                        color,
                        1.0,
                    );
                }
            }
        }
    }

    /// Draw `text` horizontally centered in `rect`, vertically centered on its baseline box.
    pub fn text_centered(&mut self, font: &FontArc, text: &str, size: f32, color: Color, rect: Rect) {
        let scale = PxScale::from(size);
        let scaled = font.as_scaled(scale);
        let text = fit_text(text, font, scale, rect.width() - 8.0);
        let width = measure_text(&text, font, scale);
        let left = rect.left + ((rect.width() - width) * 0.5).max(0.0);
        let text_height = scaled.ascent() - scaled.descent();
        let baseline = rect.top + (rect.height() - text_height) * 0.5 + scaled.ascent();
        self.text(font, &text, color, left, baseline, scale);
    }

    fn text(&mut self, font: &FontArc, text: &str, color: Color, left: f32, baseline: f32, scale: PxScale) {
        let scaled = font.as_scaled(scale);
        let mut cursor_x = left;
        let mut previous = None;
        for ch in text.chars() {
            if ch.is_control() {
                continue;
            }
            let glyph = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                cursor_x += scaled.kern(prev, glyph);
            }
            let advance = scaled.h_advance(glyph);
            let mut positioned = scaled.scaled_glyph(ch);
            positioned.position = point(cursor_x, baseline);
            if let Some(outline) = font.outline_glyph(positioned) {
                let bounds = outline.px_bounds();
                outline.draw(|x, y, coverage| {
                    self.blend_pixel(
                        bounds.min.x + x as f32,
                        bounds.min.y + y as f32,
                        color,
                        coverage,
                    );
                });
            }
            cursor_x += advance;
            previous = Some(glyph);
        }
    }

    /// Copy an RGBA image with its top-left corner at (`left`, `top`), clipped to the canvas.
    pub fn blit(&mut self, image: &DecodedImage, left: i64, top: i64) {
        let expected = (image.width as usize) * (image.height as usize) * 4;
        if image.pixels.len() < expected {
            return;
        }
        for sy in 0..i64::from(image.height) {
            let y = top + sy;
            if y < 0 || y >= i64::from(self.height) {
                continue;
            }
            for sx in 0..i64::from(image.width) {
                let x = left + sx;
                if x < 0 || x >= i64::from(self.width) {
                    continue;
                }
                let src = ((sy * i64::from(image.width) + sx) * 4) as usize;
                let px = &image.pixels[src..src + 4];
                let color = Color {
                    r: f32::from(px[0]) / 255.0,
                    g: f32::from(px[1]) / 255.0,
                    b: f32::from(px[2]) / 255.0,
                    a: f32::from(px[3]) / 255.0,
                };
                self.blend_pixel(x as f32, y as f32, color, 1.0);
            }
        }
    }

    fn blend_pixel(&mut self, x: f32, y: f32, color: Color, coverage: f32) {
        if coverage <= 0.0 {
            return;
        }
        let xi = x.floor() as i32;
        let yi = y.floor() as i32;
        if xi < 0 || yi < 0 || xi >= self.width as i32 || yi >= self.height as i32 {
            return;
        }
        let idx = (yi as u32 * self.width + xi as u32) as usize;
        let src_a = (color.a * coverage).clamp(0.0, 1.0);
        let dst = unpack_color(self.buffer[idx]);
        self.buffer[idx] = pack_color(blend(color.rgb(), dst, src_a));
    }
}

/// Truncate `text` with an ellipsis so it fits in `max_width`.
fn fit_text(text: &str, font: &FontArc, scale: PxScale, max_width: f32) -> String {
    if measure_text(text, font, scale) <= max_width {
        return text.to_string();
    }
    let mut out: String = text.to_string();
    while !out.is_empty() {
        out.pop();
        let candidate = format!("{out}…");
        if measure_text(&candidate, font, scale) <= max_width {
            return candidate;
        }
    }
    String::new()
}

pub fn measure_text(text: &str, font: &FontArc, scale: PxScale) -> f32 {
    let scaled_font = font.as_scaled(scale);
    let mut width = 0.0f32;
    let mut previous = None;
    for ch in text.chars() {
        if ch.is_control() {
            continue;
        }
        let glyph_id = scaled_font.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled_font.kern(prev, glyph_id);
        }
        width += scaled_font.h_advance(glyph_id);
        previous = Some(glyph_id);
    }
    width.max(0.0)
}

fn blend(src: (f32, f32, f32), dst: (f32, f32, f32), alpha: f32) -> (f32, f32, f32) {
    (
        src.0 * alpha + dst.0 * (1.0 - alpha),
        src.1 * alpha + dst.1 * (1.0 - alpha),
        src.2 * alpha + dst.2 * (1.0 - alpha),
    )
}

fn unpack_color(value: u32) -> (f32, f32, f32) {
    let r = ((value >> 16) & 0xFF) as f32 / 255.0;
    let g = ((value >> 8) & 0xFF) as f32 / 255.0;
    let b = (value & 0xFF) as f32 / 255.0;
    (r, g, b)
}

fn pack_color(color: (f32, f32, f32)) -> u32 {
    let r = (color.0.clamp(0.0, 1.0) * 255.0).round() as u32;
    let g = (color.1.clamp(0.0, 1.0) * 255.0).round() as u32;
    let b = (color.2.clamp(0.0, 1.0) * 255.0).round() as u32;
    0xFF00_0000 | (r << 16) | (g << 8) | b
}

/// Find a readable sans-serif system font.
pub fn load_font() -> Result<FontArc> {
    let mut db = Database::new();
    db.load_system_fonts();

    let preferred_families = [
        Family::Name("Helvetica"),
        Family::Name("Inter"),
        Family::Name("Noto Sans"),
        Family::Name("DejaVu Sans"),
        Family::SansSerif,
    ];

    for family in preferred_families {
        if let Some(id) = db.query(&Query {
            families: &[family],
            ..Default::default()
        }) && let Some(font) = load_face(&db, id)?
        {
            return Ok(font);
        }
    }

    for face in db.faces() {
        if let Some(font) = load_face(&db, face.id)? {
            return Ok(font);
        }
    }

    Err(anyhow!("failed to load a system font for the drill window"))
}

fn load_face(db: &Database, id: fontdb::ID) -> Result<Option<FontArc>> {
    let face = db.face(id).context("missing font face in database")?;
    let data = match &face.source {
        Source::Binary(data) => data.as_ref().as_ref().to_vec(),
        Source::File(path) => {
            fs::read(path).with_context(|| format!("failed to read font at {}", path.display()))?
        }
        Source::SharedFile(_, data) => data.as_ref().as_ref().to_vec(),
    };
    // Collections and unsupported outlines are skipped rather than fatal.
    Ok(FontArc::try_from_vec(data).ok())
}
