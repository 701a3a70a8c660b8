//! Reduced-size previews reporting where every element lands

use crate::io::configuration::{PREVIEW_FONT_REDUCTION, PREVIEW_MIN_FONT_SIZE};
use crate::io::error::Result;
use crate::io::image::load_rgba;
use crate::layout::{Layout, LayoutParams, PanelContent, compute_layout};
use crate::render::compose::Compositor;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use std::path::Path;

/// A rendered preview and the layout used to draw it
#[derive(Debug, Clone)]
pub struct Preview {
    /// Preview image with every element drawn
    pub image: RgbaImage,
    /// Element positions in preview coordinates
    pub layout: Layout,
}

/// Largest size with the aspect ratio of `(width, height)` that fits `bounds`
///
/// Images already inside the bounds are left unchanged.
pub fn fit_within(width: u32, height: u32, bounds: (u32, u32)) -> (u32, u32) {
    let (max_w, max_h) = bounds;
    if width <= max_w && height <= max_h {
        return (width, height);
    }
    let ratio = (max_w as f64 / width as f64).min(max_h as f64 / height as f64);
    (
        ((width as f64 * ratio) as u32).max(1),
        ((height as f64 * ratio) as u32).max(1),
    )
}

impl Compositor {
    /// Render a preview of `source` fitted to `max_size`
    pub fn preview_image(
        &self,
        source: &RgbaImage,
        content: &PanelContent,
        max_size: (u32, u32),
    ) -> Preview {
        let (width, height) = fit_within(source.width(), source.height(), max_size);
        let thumbnail = if (width, height) == source.dimensions() {
            source.clone()
        } else {
            imageops::resize(source, width, height, FilterType::Lanczos3)
        };

        let font_size = (self.font_size - PREVIEW_FONT_REDUCTION).max(PREVIEW_MIN_FONT_SIZE);
        let typeface = self.typeface.with_size(font_size);
        let params = LayoutParams::preview(
            self.position,
            self.panel_width.min(max_size.0 / 3),
            font_size,
            self.stamp_scale,
        );
        let stamp = self
            .stamp
            .as_ref()
            .filter(|_| self.stamp_enabled)
            .map(RgbaImage::dimensions);

        let layout = compute_layout(
            thumbnail.dimensions(),
            content,
            stamp,
            &params,
            &self.offsets,
            &typeface,
        );
        let image = self.render(&thumbnail, &layout, &typeface);

        Preview { image, layout }
    }

    /// Load an image and render its preview
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be decoded
    pub fn preview(
        &self,
        path: &Path,
        content: &PanelContent,
        max_size: (u32, u32),
    ) -> Result<Preview> {
        let source = load_rgba(path)?;
        Ok(self.preview_image(&source, content, max_size))
    }
}
