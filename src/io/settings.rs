//! Persistent user settings stored as JSON and merged over defaults

use crate::io::configuration::{
    APP_DIR_NAME, DEFAULT_AUTO_SAVE_INTERVAL, DEFAULT_POSITION_COLUMN, MAX_AUTO_THREADS,
    MIN_AUTO_THREADS, SETTINGS_FILE_NAME,
};
use crate::io::error::{AnnotateError, Result, WithPath};
use crate::io::image::OutputFormat;
use crate::io::spreadsheet::ColumnMapping;
use crate::layout::{ElementOffsets, FieldStyle, PanelPosition};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Input and output locations remembered between runs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Folder holding the source screenshots
    pub source_folder: Option<PathBuf>,
    /// Folder receiving annotated outputs and the checkpoint
    pub output_folder: Option<PathBuf>,
    /// Workbook with the per-position data
    pub spreadsheet: Option<PathBuf>,
    /// Optional stamp image
    pub stamp_file: Option<PathBuf>,
}

/// One spreadsheet column rendered onto the panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSettings {
    /// Stable element name, also the key used for offsets
    pub key: String,
    /// Caption printed before the value
    pub label: String,
    /// Zero-based spreadsheet column
    pub column: usize,
    /// Whether the field is drawn at all
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// How the caption and value are laid out
    #[serde(default)]
    pub style: FieldStyle,
}

const fn enabled_by_default() -> bool {
    true
}

/// A line of fixed annotation text printed on every image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedText {
    /// Whether the text is drawn
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// The text itself; may contain newlines
    #[serde(default)]
    pub value: String,
}

/// Stamp compositing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StampSettings {
    /// Whether the stamp is composited when a stamp file is configured
    pub enabled: bool,
    /// Scale applied to the stamp before fitting it to the panel
    pub scale: f32,
}

impl Default for StampSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.5,
        }
    }
}

/// Output appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Output encoding
    pub format: OutputFormat,
    /// Side of the image the panel is attached to
    pub position: PanelPosition,
    /// Panel width in pixels (left panels only)
    pub panel_width: u32,
    /// Panel and flattening background colour (`#RRGGBB`)
    pub background_color: String,
    /// Preferred font family, looked up in system font folders
    pub font_family: String,
    /// Explicit font file overriding the family lookup
    pub font_path: Option<PathBuf>,
    /// Font size in pixels
    pub font_size: f32,
    /// Text and divider colour (`#RRGGBB`)
    pub text_color: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            format: OutputFormat::Pdf,
            position: PanelPosition::Left,
            panel_width: 300,
            background_color: "#FFFFFF".to_string(),
            font_family: "Arial".to_string(),
            font_path: None,
            font_size: 12.0,
            text_color: "#000000".to_string(),
        }
    }
}

/// Worker pool and checkpoint tuning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceSettings {
    /// Worker threads; `0` picks a count from the available cores
    pub thread_count: usize,
    /// Whether the checkpoint is saved periodically during a run
    pub auto_save: bool,
    /// Processed files between checkpoint saves
    pub auto_save_interval: usize,
}

impl Default for PerformanceSettings {
    fn default() -> Self {
        Self {
            thread_count: 0,
            auto_save: true,
            auto_save_interval: DEFAULT_AUTO_SAVE_INTERVAL,
        }
    }
}

/// The settings that change what is drawn or where it is written
///
/// Worker pool tuning is left out so a resumed run may use other thread counts.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct OutputFingerprint<'a> {
    /// Input and output locations
    pub paths: &'a PathSettings,
    /// Column holding the position key
    pub position_column: usize,
    /// Drawn fields
    pub fields: &'a [FieldSettings],
    /// Fixed annotation texts
    pub fixed_texts: &'a [FixedText],
    /// Stamp options
    pub stamp: &'a StampSettings,
    /// Output appearance
    pub output: &'a OutputSettings,
    /// Per-element offsets
    pub element_offsets: &'a ElementOffsets,
}

/// Complete settings document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Remembered input and output locations
    pub paths: PathSettings,
    /// Column holding the position key
    pub position_column: usize,
    /// Fields drawn on the panel, in order
    pub fields: Vec<FieldSettings>,
    /// Fixed annotation texts, in order
    pub fixed_texts: Vec<FixedText>,
    /// Stamp options
    pub stamp: StampSettings,
    /// Output appearance
    pub output: OutputSettings,
    /// Worker pool options
    pub performance: PerformanceSettings,
    /// Per-element pixel offsets applied to every image
    pub element_offsets: ElementOffsets,
}

impl Default for Settings {
    fn default() -> Self {
        let field = |key: &str, label: &str, column, enabled, style| FieldSettings {
            key: key.to_string(),
            label: label.to_string(),
            column,
            enabled,
            style,
        };
        let text = |value: &str| FixedText {
            enabled: true,
            value: value.to_string(),
        };

        Self {
            paths: PathSettings::default(),
            position_column: DEFAULT_POSITION_COLUMN,
            fields: vec![
                field("inn", "INN", 22, true, FieldStyle::Line),
                field("kpp", "KPP", 21, true, FieldStyle::Line),
                field("supplier", "Supplier", 19, true, FieldStyle::Stacked),
                field("hyperlink", "Link", 23, false, FieldStyle::Wrapped),
            ],
            fixed_texts: vec![
                text("Price incl. VAT and delivery"),
                text("Quotation of 13.11.2024"),
                text("Warehouse address: St. Petersburg"),
            ],
            stamp: StampSettings::default(),
            output: OutputSettings::default(),
            performance: PerformanceSettings::default(),
            element_offsets: ElementOffsets::default(),
        }
    }
}

impl Settings {
    /// Default settings file location under the platform config directory
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR_NAME)
            .join(SETTINGS_FILE_NAME)
    }

    /// Load settings from `path`, keeping defaults for anything the file omits
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).with_path(path, "read settings")?;
        let loaded: serde_json::Value =
            serde_json::from_str(&text).map_err(|source| AnnotateError::Serialization {
                path: path.to_path_buf(),
                source,
            })?;

        let mut merged = serde_json::to_value(Self::default()).map_err(|source| {
            AnnotateError::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })?;
        deep_merge(&mut merged, loaded);

        serde_json::from_value(merged).map_err(|source| AnnotateError::Serialization {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings, falling back to defaults when the file is unusable
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|error| {
            warn!(%error, "Ignoring unreadable settings file");
            Self::default()
        })
    }

    /// Write the settings to `path` as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the file written
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_path(parent, "create directory")?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|source| AnnotateError::Serialization {
                path: path.to_path_buf(),
                source,
            })?;
        std::fs::write(path, json).with_path(path, "write settings")
    }

    /// Restore every value to its default
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Set the offset of one element
    pub fn set_offset(&mut self, element: &str, dx: i32, dy: i32) {
        self.element_offsets.insert(element.to_string(), (dx, dy));
    }

    /// Drop all element offsets
    pub fn reset_offsets(&mut self) {
        self.element_offsets.clear();
    }

    /// Spreadsheet columns needed to fill every configured field
    pub fn column_mapping(&self) -> ColumnMapping {
        ColumnMapping {
            position: self.position_column,
            fields: self
                .fields
                .iter()
                .map(|field| (field.key.clone(), field.column))
                .collect(),
        }
    }

    /// Output-affecting part of the settings, used to match checkpoints
    pub fn fingerprint(&self) -> OutputFingerprint<'_> {
        OutputFingerprint {
            paths: &self.paths,
            position_column: self.position_column,
            fields: &self.fields,
            fixed_texts: &self.fixed_texts,
            stamp: &self.stamp,
            output: &self.output,
            element_offsets: &self.element_offsets,
        }
    }

    /// Values of the enabled fixed texts, in order
    ///
    /// Disabled texts are dropped before numbering, so `text_1` is always the
    /// first enabled text.
    pub fn enabled_fixed_texts(&self) -> Vec<String> {
        self.fixed_texts
            .iter()
            .filter(|text| text.enabled)
            .map(|text| text.value.clone())
            .collect()
    }

    /// Worker thread count, resolving `0` against the available cores
    pub fn effective_thread_count(&self) -> usize {
        resolve_thread_count(self.performance.thread_count)
    }
}

/// Resolve a requested thread count; `0` means `cores - 1` clamped to `2..=16`
pub fn resolve_thread_count(requested: usize) -> usize {
    if requested > 0 {
        return requested;
    }
    let cores = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
    cores
        .saturating_sub(1)
        .clamp(MIN_AUTO_THREADS, MAX_AUTO_THREADS)
}

// Objects merge key by key; any other value replaces the base
fn deep_merge(base: &mut serde_json::Value, update: serde_json::Value) {
    match (base, update) {
        (serde_json::Value::Object(base_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
