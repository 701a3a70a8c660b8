//! Font resolution with a built-in bitmap fallback

use crate::io::error::{AnnotateError, Result};
use crate::layout::TextMeasure;
use ab_glyph::{FontArc, PxScale};
use font8x8::{BASIC_FONTS, LATIN_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Pixel size of one bitmap glyph cell before scaling
const BITMAP_CELL: u32 = 8;

/// Font used to measure and draw panel text
#[derive(Clone)]
pub enum Typeface {
    /// TrueType/OpenType outlines rendered at `size` pixels
    Outline {
        /// Parsed font
        font: FontArc,
        /// Pixel height
        size: f32,
    },
    /// Built-in 8x8 glyphs enlarged by an integer factor
    Bitmap {
        /// Nominal pixel height used to derive the factor
        size: f32,
    },
}

impl std::fmt::Debug for Typeface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Outline { size, .. } => f.debug_struct("Outline").field("size", size).finish(),
            Self::Bitmap { size } => f.debug_struct("Bitmap").field("size", size).finish(),
        }
    }
}

impl Typeface {
    /// Resolve a font: explicit path first, then system locations, then the bitmap font
    ///
    /// # Errors
    ///
    /// Returns an error only when `font_path` is given and cannot be read or parsed
    pub fn resolve(family: &str, font_path: Option<&Path>, size: f32) -> Result<Self> {
        if let Some(path) = font_path {
            let font = load_font(path)?;
            info!(path = %path.display(), "Loaded configured font");
            return Ok(Self::Outline { font, size });
        }

        for candidate in system_font_candidates(family) {
            if let Ok(font) = load_font(&candidate) {
                debug!(path = %candidate.display(), "Loaded system font");
                return Ok(Self::Outline { font, size });
            }
        }

        info!(family, "No system font found, using built-in bitmap font");
        Ok(Self::bitmap(size))
    }

    /// Built-in bitmap font at `size`
    pub const fn bitmap(size: f32) -> Self {
        Self::Bitmap { size }
    }

    /// Nominal pixel size
    pub const fn size(&self) -> f32 {
        match self {
            Self::Outline { size, .. } | Self::Bitmap { size } => *size,
        }
    }

    /// Same face at another size
    #[must_use]
    pub fn with_size(&self, size: f32) -> Self {
        match self {
            Self::Outline { font, .. } => Self::Outline {
                font: font.clone(),
                size,
            },
            Self::Bitmap { .. } => Self::Bitmap { size },
        }
    }

    /// Draw one line of text with its top-left corner at `(x, y)`
    pub fn draw(&self, canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str) {
        match self {
            Self::Outline { font, size } => {
                draw_text_mut(canvas, color, x, y, PxScale::from(*size), font, text);
            }
            Self::Bitmap { size } => draw_bitmap_text(canvas, color, x, y, text, bitmap_factor(*size)),
        }
    }
}

impl TextMeasure for Typeface {
    fn text_width(&self, text: &str) -> u32 {
        match self {
            Self::Outline { font, size } => text_size(PxScale::from(*size), font, text).0,
            Self::Bitmap { size } => {
                text.chars().count() as u32 * BITMAP_CELL * bitmap_factor(*size)
            }
        }
    }
}

fn load_font(path: &Path) -> Result<FontArc> {
    let data = std::fs::read(path).map_err(|source| AnnotateError::FileSystem {
        path: path.to_path_buf(),
        operation: "read font",
        source,
    })?;
    FontArc::try_from_vec(data).map_err(|e| AnnotateError::Font {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Well-known font file locations for `family` on Windows, macOS and Linux
pub fn system_font_candidates(family: &str) -> Vec<PathBuf> {
    let family = family.trim();
    let mut candidates = Vec::new();

    if !family.is_empty() {
        let lower = family.to_lowercase();
        candidates.push(PathBuf::from(format!("C:/Windows/Fonts/{lower}.ttf")));
        candidates.push(PathBuf::from(format!("C:/Windows/Fonts/{family}.ttf")));
        candidates.push(PathBuf::from(format!(
            "/System/Library/Fonts/Supplemental/{family}.ttf"
        )));
        candidates.push(PathBuf::from(format!("/Library/Fonts/{family}.ttf")));
        candidates.push(PathBuf::from(format!("/usr/share/fonts/truetype/msttcorefonts/{family}.ttf")));
    }

    candidates.push(PathBuf::from(
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    ));
    candidates.push(PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"));
    candidates
}

fn bitmap_factor(size: f32) -> u32 {
    ((size / BITMAP_CELL as f32).round() as u32).max(1)
}

fn draw_bitmap_text(canvas: &mut RgbaImage, color: Rgba<u8>, x: i32, y: i32, text: &str, factor: u32) {
    let step = (BITMAP_CELL * factor) as i32;
    let factor = factor as i32;
    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    let mut cursor_x = x;

    for ch in text.chars() {
        let glyph = BASIC_FONTS
            .get(ch)
            .or_else(|| LATIN_FONTS.get(ch))
            .or_else(|| BASIC_FONTS.get('?'));
        let Some(glyph) = glyph else {
            cursor_x += step;
            continue;
        };

        for (row_idx, &row_bits) in glyph.iter().enumerate() {
            for col_idx in 0..BITMAP_CELL as i32 {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let px = cursor_x + col_idx * factor;
                let py = y + row_idx as i32 * factor;
                for sy in 0..factor {
                    for sx in 0..factor {
                        let (tx, ty) = (px + sx, py + sy);
                        if tx >= 0 && ty >= 0 && tx < width && ty < height {
                            canvas.put_pixel(tx as u32, ty as u32, color);
                        }
                    }
                }
            }
        }
        cursor_x += step;
    }
}
