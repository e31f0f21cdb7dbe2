use ab_glyph::{Font, FontVec, Glyph, PxScale, ScaleFont, point};
use anyhow::{Context, Result, anyhow};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tiny_skia::{Pixmap, PremultipliedColorU8};
use tracing::debug;

/// Fonts tried, in order, when none is configured.
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
];

/// Loads `path`, or the first readable system font when `path` is `None`.
pub fn load_font(path: Option<&Path>) -> Result<FontVec> {
    if let Some(path) = path {
        return read_font(path);
    }
    FONT_CANDIDATES
        .iter()
        .map(PathBuf::from)
        .filter(|p| p.is_file())
        .find_map(|p| read_font(&p).ok())
        .ok_or_else(|| anyhow!("no usable system font found; pass one with --font"))
}

fn read_font(path: &Path) -> Result<FontVec> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading font {}", path.display()))?;
    let font = FontVec::try_from_vec(bytes)
        .map_err(|e| anyhow!("parsing font {}: {e}", path.display()))?;
    debug!(path = %path.display(), "font loaded");
    Ok(font)
}

/// Size and straight-alpha RGBA colour of a text run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub size: f32,
    pub color: [u8; 4],
}

impl TextStyle {
    pub const fn new(size: f32, color: [u8; 4]) -> Self {
        Self { size, color }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TextKey {
    text: String,
    size_bits: u32,
    color: [u8; 4],
}

/// Default entry limit. A session needs a few dozen labels plus one entry
/// per distinct countdown string.
pub const DEFAULT_CACHE_LIMIT: usize = 512;

/// Rasterised text runs, keyed by content and style. Labels repeat every
/// frame, so each is rendered once. The cache is emptied when it reaches
/// its limit.
pub struct TextCache {
    font: FontVec,
    map: HashMap<TextKey, Arc<Pixmap>>,
    limit: usize,
}

impl TextCache {
    pub fn new(font: FontVec) -> Self {
        Self::with_limit(font, DEFAULT_CACHE_LIMIT)
    }

    pub fn with_limit(font: FontVec, limit: usize) -> Self {
        Self {
            font,
            map: HashMap::new(),
            limit: limit.max(1),
        }
    }

    pub fn get_or_render(&mut self, text: &str, style: TextStyle) -> Option<Arc<Pixmap>> {
        let key = TextKey {
            text: text.to_owned(),
            size_bits: style.size.to_bits(),
            color: style.color,
        };
        if let Some(p) = self.map.get(&key) {
            return Some(Arc::clone(p));
        }
        let pm = Arc::new(render_text_pixmap(text, style, &self.font)?);
        if self.map.len() >= self.limit {
            debug!(entries = self.map.len(), "text cache full, clearing");
            self.map.clear();
        }
        self.map.insert(key, Arc::clone(&pm));
        Some(pm)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }
}

/// Lays out `text` on one line and rasterises it into a tight, transparent
/// premultiplied pixmap. `None` when nothing would be drawn.
pub fn render_text_pixmap<F: Font>(text: &str, style: TextStyle, font: &F) -> Option<Pixmap> {
    let scale = PxScale::from(style.size);
    let sf = font.as_scaled(scale);

    // Layout with the baseline at the ascent
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();
    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlines {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }
    if outlines.is_empty() {
        return None;
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;
    let stride = w as usize;
    let dst = pm.pixels_mut();
    let [cr, cg, cb, ca] = style.color;

    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x.floor()) as i64;
            let iy = (y as f32 + b.min.y - min_y.floor()) as i64;
            if ix < 0 || iy < 0 || ix >= w as i64 || iy >= h as i64 {
                return;
            }
            let i = iy as usize * stride + ix as usize;

            // Premultiply by coverage * alpha, then composite over what is
            // already there (glyph boxes can overlap).
            let a = (cov * ca as f32 / 255.0).clamp(0.0, 1.0);
            let sa = (a * 255.0) as u8;
            let bg = dst[i];
            let inv = 1.0 - a;
            let blend = |s: u8, d: u8| {
                ((s as f32 * a) + d as f32 * inv).round().min(255.0) as u8
            };
            let alpha = (sa as f32 + bg.alpha() as f32 * inv).round().min(255.0) as u8;
            let r = blend(cr, bg.red()).min(alpha);
            let g = blend(cg, bg.green()).min(alpha);
            let bl = blend(cb, bg.blue()).min(alpha);
            if let Some(px) = PremultipliedColorU8::from_rgba(r, g, bl, alpha) {
                dst[i] = px;
            }
        });
    }

    Some(pm)
}
