//! Panel geometry and stamp fitting

use crate::io::configuration::{
    LINE_SPACING, PANEL_BOTTOM_RESERVE, PANEL_PADDING, PREVIEW_FIELD_CHARS,
    PREVIEW_LINE_SPACING, PREVIEW_PADDING, PREVIEW_TEXT_CHARS,
};
use crate::layout::PanelPosition;

/// Metrics driving a layout pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    /// Side the panel is attached to
    pub position: PanelPosition,
    /// Width of a left panel in pixels
    pub panel_width: u32,
    /// Vertical advance per text line
    pub line_height: u32,
    /// Inner padding between the panel edge and its content
    pub padding: u32,
    /// Scale applied to the stamp before fitting
    pub stamp_scale: f32,
    /// `(field chars, text chars)` limits when content should be shortened
    pub truncate: Option<(usize, usize)>,
}

impl LayoutParams {
    /// Metrics for full-size output
    pub fn output(position: PanelPosition, panel_width: u32, font_size: f32, stamp_scale: f32) -> Self {
        Self {
            position,
            panel_width,
            line_height: font_size.round().max(1.0) as u32 + LINE_SPACING,
            padding: PANEL_PADDING,
            stamp_scale,
            truncate: None,
        }
    }

    /// Metrics for a preview rendered with `font_size`
    pub fn preview(position: PanelPosition, panel_width: u32, font_size: f32, stamp_scale: f32) -> Self {
        Self {
            position,
            panel_width,
            line_height: font_size.round().max(1.0) as u32 + PREVIEW_LINE_SPACING,
            padding: PREVIEW_PADDING,
            stamp_scale,
            truncate: Some((PREVIEW_FIELD_CHARS, PREVIEW_TEXT_CHARS)),
        }
    }

    /// Width available to text and the stamp for an image `image_width` wide
    pub const fn content_width(&self, image_width: u32) -> u32 {
        let outer = match self.position {
            PanelPosition::Left => self.panel_width,
            PanelPosition::Bottom => image_width,
        };
        let inner = outer.saturating_sub(2 * self.padding);
        if inner == 0 { 1 } else { inner }
    }
}

/// Axis-aligned panel rectangle in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelRect {
    /// Left edge
    pub x: u32,
    /// Top edge
    pub y: u32,
    /// Width
    pub width: u32,
    /// Height
    pub height: u32,
}

impl PanelRect {
    /// Right edge (exclusive)
    pub const fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive)
    pub const fn bottom(&self) -> u32 {
        self.y + self.height
    }
}

/// Canvas size, image origin and panel rectangle for a given content height
///
/// `required` is the content height including the top reserve; the bottom
/// reserve is added here.
pub fn panel_geometry(
    image: (u32, u32),
    required: u32,
    params: &LayoutParams,
) -> ((u32, u32), (u32, u32), PanelRect) {
    let (image_w, image_h) = image;
    let needed = required + PANEL_BOTTOM_RESERVE;

    match params.position {
        PanelPosition::Left => {
            let canvas_h = image_h.max(needed);
            (
                (image_w + params.panel_width, canvas_h),
                (params.panel_width, 0),
                PanelRect {
                    x: 0,
                    y: 0,
                    width: params.panel_width,
                    height: canvas_h,
                },
            )
        }
        PanelPosition::Bottom => (
            (image_w, image_h + needed),
            (0, 0),
            PanelRect {
                x: 0,
                y: image_h,
                width: image_w,
                height: needed,
            },
        ),
    }
}

/// Scale a stamp and shrink it proportionally to fit `max_width`
///
/// Dimensions are truncated like integer pixel sizes and never reach zero.
pub fn fit_stamp(width: u32, height: u32, scale: f32, max_width: u32) -> (u32, u32) {
    let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
    let mut scaled_w = (width as f32 * scale) as u32;
    let mut scaled_h = (height as f32 * scale) as u32;

    if scaled_w > max_width && scaled_w > 0 {
        let ratio = max_width as f32 / scaled_w as f32;
        scaled_h = (scaled_h as f32 * ratio) as u32;
        scaled_w = max_width;
    }

    (scaled_w.max(1), scaled_h.max(1))
}
