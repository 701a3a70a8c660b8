//! Panel composition: background, source image, text, divider and stamp

use crate::batch::task::ProcessingTask;
use crate::io::error::{AnnotateError, Result};
use crate::io::image::{OutputFormat, load_rgba, save_output};
use crate::io::settings::{FieldSettings, Settings};
use crate::io::spreadsheet::RowData;
use crate::layout::{
    ElementKind, ElementOffsets, Layout, LayoutParams, PanelContent, PanelPosition,
    compute_layout,
};
use crate::render::color::parse_hex_color;
use crate::render::typeface::Typeface;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_line_segment_mut;
use std::path::Path;
use tracing::{debug, warn};

/// Renders annotated images from settings, a typeface and an optional stamp
///
/// A compositor is immutable once built and is shared by every worker thread.
#[derive(Debug, Clone)]
pub struct Compositor {
    pub(crate) fields: Vec<FieldSettings>,
    pub(crate) offsets: ElementOffsets,
    pub(crate) position: PanelPosition,
    pub(crate) panel_width: u32,
    pub(crate) font_size: f32,
    pub(crate) format: OutputFormat,
    pub(crate) background: Rgba<u8>,
    pub(crate) text_color: Rgba<u8>,
    pub(crate) stamp_enabled: bool,
    pub(crate) stamp_scale: f32,
    pub(crate) typeface: Typeface,
    pub(crate) stamp: Option<RgbaImage>,
}

impl Compositor {
    /// Build a compositor, resolving the configured font
    ///
    /// # Errors
    ///
    /// Returns an error if a colour is malformed or an explicit font file is unusable
    pub fn new(settings: &Settings) -> Result<Self> {
        let typeface = Typeface::resolve(
            &settings.output.font_family,
            settings.output.font_path.as_deref(),
            settings.output.font_size,
        )?;
        Self::with_typeface(settings, typeface)
    }

    /// Build a compositor drawing with `typeface`
    ///
    /// # Errors
    ///
    /// Returns an error if a colour is malformed
    pub fn with_typeface(settings: &Settings, typeface: Typeface) -> Result<Self> {
        let output = &settings.output;
        Ok(Self {
            fields: settings.fields.clone(),
            offsets: settings.element_offsets.clone(),
            position: output.position,
            panel_width: output.panel_width,
            font_size: output.font_size,
            format: output.format,
            background: parse_hex_color(&output.background_color)?,
            text_color: parse_hex_color(&output.text_color)?,
            stamp_enabled: settings.stamp.enabled,
            stamp_scale: settings.stamp.scale,
            typeface: typeface.with_size(output.font_size),
            stamp: None,
        })
    }

    /// Load the stamp image, converting it to RGBA
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or cannot be decoded
    pub fn load_stamp(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(AnnotateError::FileSystem {
                path: path.to_path_buf(),
                operation: "open stamp",
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            });
        }
        self.stamp = Some(load_rgba(path)?);
        debug!(path = %path.display(), "Loaded stamp");
        Ok(())
    }

    /// Use an already decoded stamp
    pub fn set_stamp(&mut self, stamp: RgbaImage) {
        self.stamp = Some(stamp);
    }

    /// Whether a stamp will be drawn
    pub const fn draws_stamp(&self) -> bool {
        self.stamp_enabled && self.stamp.is_some()
    }

    /// Output encoding
    pub const fn format(&self) -> OutputFormat {
        self.format
    }

    /// Background colour used for the panel and for flattening
    pub const fn background(&self) -> Rgba<u8> {
        self.background
    }

    /// Typeface used for output text
    pub const fn typeface(&self) -> &Typeface {
        &self.typeface
    }

    /// Panel content for one spreadsheet row
    pub fn content_for(&self, row: &RowData, fixed_texts: &[String]) -> PanelContent {
        PanelContent::from_row(&self.fields, row, fixed_texts)
    }

    fn stamp_dimensions(&self) -> Option<(u32, u32)> {
        self.stamp
            .as_ref()
            .filter(|_| self.stamp_enabled)
            .map(RgbaImage::dimensions)
    }

    /// Layout of a full-size output for an image of `dimensions`
    pub fn layout_for(&self, dimensions: (u32, u32), content: &PanelContent) -> Layout {
        let params = LayoutParams::output(
            self.position,
            self.panel_width,
            self.font_size,
            self.stamp_scale,
        );
        compute_layout(
            dimensions,
            content,
            self.stamp_dimensions(),
            &params,
            &self.offsets,
            &self.typeface,
        )
    }

    /// Compose a full-size annotated image
    pub fn compose(&self, source: &RgbaImage, content: &PanelContent) -> (RgbaImage, Layout) {
        let layout = self.layout_for(source.dimensions(), content);
        let canvas = self.render(source, &layout, &self.typeface);
        (canvas, layout)
    }

    /// Load, annotate and save the image described by `task`
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be decoded or the output cannot be written
    pub fn process_file(&self, task: &ProcessingTask) -> Result<Layout> {
        let source = load_rgba(&task.image_path)?;
        let content = self.content_for(&task.row, &task.fixed_texts);
        let (canvas, layout) = self.compose(&source, &content);

        if layout.overflow {
            warn!(
                file = %task.image_path.display(),
                "Text extends past the panel"
            );
        }

        save_output(&canvas, &task.output_path, self.format, self.background)?;
        Ok(layout)
    }

    /// Paint `layout` onto a fresh canvas
    pub(crate) fn render(&self, source: &RgbaImage, layout: &Layout, typeface: &Typeface) -> RgbaImage {
        let mut canvas =
            RgbaImage::from_pixel(layout.canvas_width, layout.canvas_height, self.background);
        let (origin_x, origin_y) = layout.image_origin;
        imageops::replace(&mut canvas, source, i64::from(origin_x), i64::from(origin_y));

        for element in &layout.elements {
            match &element.kind {
                ElementKind::Text { lines } => {
                    let mut y = element.y;
                    for line in lines {
                        typeface.draw(&mut canvas, self.text_color, element.x, y, line);
                        y += layout.line_height as i32;
                    }
                }
                ElementKind::Divider { x_end } => {
                    draw_line_segment_mut(
                        &mut canvas,
                        (element.x as f32, element.y as f32),
                        (*x_end as f32, element.y as f32),
                        self.text_color,
                    );
                }
                ElementKind::Stamp { width, height } => {
                    if let Some(stamp) = self.stamp.as_ref().filter(|_| self.stamp_enabled) {
                        let scaled = imageops::resize(stamp, *width, *height, FilterType::Lanczos3);
                        imageops::overlay(
                            &mut canvas,
                            &scaled,
                            i64::from(element.x),
                            i64::from(element.y),
                        );
                    }
                }
            }
        }

        canvas
    }
}
