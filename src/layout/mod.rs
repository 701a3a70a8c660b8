/// Element placement and the final canvas layout
pub mod elements;
/// Panel geometry and stamp fitting
pub mod panel;
/// Greedy word wrapping against a text measurer
pub mod wrap;

use crate::io::settings::FieldSettings;
use crate::io::spreadsheet::RowData;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use elements::{ElementKind, Layout, PlacedElement, compute_layout};
pub use panel::{LayoutParams, PanelRect, fit_stamp};
pub use wrap::{MonospaceMeasure, TextMeasure, truncate_chars, wrap_text};

/// User offsets keyed by element name, applied as `(dx, dy)` pixels
pub type ElementOffsets = BTreeMap<String, (i32, i32)>;

/// Element name of the divider rule
pub const DIVIDER_ELEMENT: &str = "divider";
/// Element name of the stamp
pub const STAMP_ELEMENT: &str = "stamp";

/// Name of the fixed text element at zero-based `index`
pub fn fixed_text_element(index: usize) -> String {
    format!("text_{}", index + 1)
}

/// Side of the source image the annotation panel is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPosition {
    /// Fixed-width panel left of the image
    #[default]
    Left,
    /// Full-width panel below the image
    Bottom,
}

/// How a field caption and its value are arranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStyle {
    /// `Label: value` on a single line, never wrapped
    #[default]
    Line,
    /// `Label: value` wrapped to the panel width
    Wrapped,
    /// Caption on its own line, value wrapped below it
    Stacked,
}

/// One spreadsheet value to be drawn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBlock {
    /// Element name
    pub name: String,
    /// Caption
    pub label: String,
    /// Cell value
    pub value: String,
    /// Arrangement of caption and value
    pub style: FieldStyle,
}

impl FieldBlock {
    /// Text handed to the wrapper (or drawn as is for [`FieldStyle::Line`])
    pub fn display_text(&self) -> String {
        match self.style {
            FieldStyle::Line | FieldStyle::Wrapped => format!("{}: {}", self.label, self.value),
            FieldStyle::Stacked => format!("{}:\n{}", self.label, self.value),
        }
    }
}

/// Everything drawn on one panel, independent of geometry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelContent {
    /// Spreadsheet fields, in drawing order
    pub fields: Vec<FieldBlock>,
    /// Fixed texts, in drawing order; empty entries keep their index but are skipped
    pub fixed_texts: Vec<String>,
}

impl PanelContent {
    /// Select the enabled, non-empty fields of `row` in configured order
    pub fn from_row(fields: &[FieldSettings], row: &RowData, fixed_texts: &[String]) -> Self {
        let blocks = fields
            .iter()
            .filter(|field| field.enabled)
            .filter_map(|field| {
                let value = row.get(&field.key)?.trim();
                (!value.is_empty()).then(|| FieldBlock {
                    name: field.key.clone(),
                    label: field.label.clone(),
                    value: value.to_string(),
                    style: field.style,
                })
            })
            .collect();

        Self {
            fields: blocks,
            fixed_texts: fixed_texts.to_vec(),
        }
    }

    /// Shorten values for previews
    #[must_use]
    pub fn truncated(&self, field_chars: usize, text_chars: usize) -> Self {
        Self {
            fields: self
                .fields
                .iter()
                .map(|field| FieldBlock {
                    value: truncate_chars(&field.value, field_chars),
                    ..field.clone()
                })
                .collect(),
            fixed_texts: self
                .fixed_texts
                .iter()
                .map(|text| truncate_chars(text, text_chars))
                .collect(),
        }
    }
}
