//! Element placement: one pass sizes the panel, a second places every element

use crate::io::configuration::{
    DIVIDER_GAP_ABOVE, DIVIDER_GAP_BELOW, PANEL_TOP_RESERVE, STAMP_GAP, STAMP_RESERVE,
};
use crate::layout::panel::{LayoutParams, PanelRect, fit_stamp, panel_geometry};
use crate::layout::wrap::{TextMeasure, wrap_text};
use crate::layout::{
    DIVIDER_ELEMENT, ElementOffsets, FieldStyle, PanelContent, STAMP_ELEMENT, fixed_text_element,
};
use serde::Serialize;

/// What an element draws
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementKind {
    /// Lines of text, one line height apart
    Text {
        /// Wrapped lines in drawing order
        lines: Vec<String>,
    },
    /// Horizontal rule ending at `x_end`
    Divider {
        /// Right end of the rule
        x_end: i32,
    },
    /// Stamp image scaled to the given size
    Stamp {
        /// Scaled stamp width
        width: u32,
        /// Scaled stamp height
        height: u32,
    },
}

/// An element at its final canvas position (offset already applied)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedElement {
    /// Stable element name
    pub name: String,
    /// Left edge
    pub x: i32,
    /// Top edge
    pub y: i32,
    /// Drawing payload
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl PlacedElement {
    /// First text line, when the element is text
    pub fn first_line(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text { lines } => lines.first().map(String::as_str),
            _ => None,
        }
    }
}

/// Full description of an annotated canvas
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Layout {
    /// Canvas width
    pub canvas_width: u32,
    /// Canvas height
    pub canvas_height: u32,
    /// Top-left corner of the pasted source image
    pub image_origin: (u32, u32),
    /// Panel rectangle
    #[serde(skip)]
    pub panel: PanelRect,
    /// Vertical advance between text lines
    pub line_height: u32,
    /// Elements in drawing order
    pub elements: Vec<PlacedElement>,
    /// Whether any text line ends below the panel
    pub overflow: bool,
}

impl Layout {
    /// Element named `name`
    pub fn element(&self, name: &str) -> Option<&PlacedElement> {
        self.elements.iter().find(|element| element.name == name)
    }
}

// Text blocks resolved before geometry is known
struct TextBlock {
    name: String,
    lines: Vec<String>,
}

/// Compute canvas size and element positions for one image
///
/// `stamp` is the unscaled stamp size, when a stamp is drawn. Offsets move
/// elements but never change the panel size or the positions of the
/// elements that follow.
pub fn compute_layout(
    image: (u32, u32),
    content: &PanelContent,
    stamp: Option<(u32, u32)>,
    params: &LayoutParams,
    offsets: &ElementOffsets,
    measure: &impl TextMeasure,
) -> Layout {
    let content = match params.truncate {
        Some((field_chars, text_chars)) => content.truncated(field_chars, text_chars),
        None => content.clone(),
    };
    let wrap_width = params.content_width(image.0);

    let field_blocks: Vec<TextBlock> = content
        .fields
        .iter()
        .map(|field| {
            let text = field.display_text();
            let lines = match field.style {
                FieldStyle::Line => vec![text],
                FieldStyle::Wrapped | FieldStyle::Stacked => wrap_text(&text, wrap_width, measure),
            };
            TextBlock {
                name: field.name.clone(),
                lines,
            }
        })
        .collect();

    let text_blocks: Vec<TextBlock> = content
        .fixed_texts
        .iter()
        .enumerate()
        .filter(|(_, text)| !text.is_empty())
        .map(|(index, text)| TextBlock {
            name: fixed_text_element(index),
            lines: wrap_text(text, wrap_width, measure),
        })
        .collect();

    let stamp_size = stamp.map(|(w, h)| fit_stamp(w, h, params.stamp_scale, wrap_width));

    let line_height = params.line_height;
    let block_height = |blocks: &[TextBlock]| -> u32 {
        blocks
            .iter()
            .map(|block| block.lines.len() as u32 * line_height)
            .sum()
    };

    let mut required = PANEL_TOP_RESERVE;
    required += block_height(&field_blocks);
    required += DIVIDER_GAP_ABOVE + DIVIDER_GAP_BELOW;
    required += block_height(&text_blocks);
    if let Some((_, stamp_h)) = stamp_size {
        required += stamp_h + STAMP_RESERVE;
    }

    let ((canvas_width, canvas_height), image_origin, panel) =
        panel_geometry(image, required, params);

    let offset_of = |name: &str| offsets.get(name).copied().unwrap_or((0, 0));
    let x = (panel.x + params.padding) as i32;
    let mut y = (panel.y + params.padding) as i32;
    let mut elements = Vec::new();
    let mut overflow = false;
    let panel_bottom = panel.bottom() as i32;

    let mut place_text = |block: TextBlock, cursor: &mut i32, placed: &mut Vec<PlacedElement>| {
        let (dx, dy) = offset_of(&block.name);
        let count = block.lines.len() as i32;
        let top = *cursor + dy;
        if top + count * line_height as i32 > panel_bottom {
            overflow = true;
        }
        placed.push(PlacedElement {
            name: block.name,
            x: x + dx,
            y: top,
            kind: ElementKind::Text { lines: block.lines },
        });
        *cursor += count * line_height as i32;
    };

    for block in field_blocks {
        place_text(block, &mut y, &mut elements);
    }

    y += DIVIDER_GAP_ABOVE as i32;
    let (dx, dy) = offset_of(DIVIDER_ELEMENT);
    elements.push(PlacedElement {
        name: DIVIDER_ELEMENT.to_string(),
        x: x + dx,
        y: y + dy,
        kind: ElementKind::Divider {
            x_end: panel.right() as i32 - params.padding as i32 + dx,
        },
    });
    y += DIVIDER_GAP_BELOW as i32;

    for block in text_blocks {
        place_text(block, &mut y, &mut elements);
    }

    if let Some((width, height)) = stamp_size {
        let (dx, dy) = offset_of(STAMP_ELEMENT);
        elements.push(PlacedElement {
            name: STAMP_ELEMENT.to_string(),
            x: x + dx,
            y: y + STAMP_GAP as i32 + dy,
            kind: ElementKind::Stamp { width, height },
        });
    }

    Layout {
        canvas_width,
        canvas_height,
        image_origin,
        panel,
        line_height,
        elements,
        overflow,
    }
}
