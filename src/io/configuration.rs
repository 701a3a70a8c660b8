//! Layout metrics, runtime defaults and display thresholds

// Panel layout metrics (output mode)
/// Inner padding between the panel edge and its content
pub const PANEL_PADDING: u32 = 10;
/// Space reserved above the first line when sizing a panel
pub const PANEL_TOP_RESERVE: u32 = 20;
/// Space reserved below the last element when sizing a panel
pub const PANEL_BOTTOM_RESERVE: u32 = 20;
/// Extra height added to the font size to obtain the line height
pub const LINE_SPACING: u32 = 8;
/// Gap above the divider rule
pub const DIVIDER_GAP_ABOVE: u32 = 10;
/// Gap below the divider rule
pub const DIVIDER_GAP_BELOW: u32 = 15;
/// Vertical gap between the last text line and the stamp
pub const STAMP_GAP: u32 = 20;
/// Height reserved around the stamp when sizing a panel
pub const STAMP_RESERVE: u32 = 40;

// Preview metrics
/// Inner padding used by previews
pub const PREVIEW_PADDING: u32 = 5;
/// Extra height added to the font size for preview lines
pub const PREVIEW_LINE_SPACING: u32 = 4;
/// Font size reduction applied to previews
pub const PREVIEW_FONT_REDUCTION: f32 = 2.0;
/// Smallest font size a preview may use
pub const PREVIEW_MIN_FONT_SIZE: f32 = 8.0;
/// Default bounding box for preview thumbnails (width, height)
pub const PREVIEW_MAX_SIZE: (u32, u32) = (800, 600);
/// Field values longer than this are truncated in previews
pub const PREVIEW_FIELD_CHARS: usize = 30;
/// Fixed texts longer than this are truncated in previews
pub const PREVIEW_TEXT_CHARS: usize = 35;
/// Marker appended to truncated preview text
pub const ELLIPSIS: &str = "...";

// Spreadsheet layout
/// First data row of the spreadsheet (1-based, as shown in spreadsheet software)
pub const DATA_START_ROW: usize = 11;
/// Default zero-based column holding the position key
pub const DEFAULT_POSITION_COLUMN: usize = 0;

// Output
/// JPEG encoder quality
pub const JPEG_QUALITY: u8 = 95;
/// Name of the checkpoint file inside the output folder
pub const CHECKPOINT_FILE_NAME: &str = ".checkpoint.json";
/// Number of hex characters kept from the settings digest
pub const SETTINGS_HASH_LEN: usize = 12;
/// Directory name under the platform config dir
pub const APP_DIR_NAME: &str = "panelstamp";
/// Settings file name inside the application config dir
pub const SETTINGS_FILE_NAME: &str = "settings.json";

// Worker pool
/// Lower bound for the automatic thread count
pub const MIN_AUTO_THREADS: usize = 2;
/// Upper bound for the automatic thread count
pub const MAX_AUTO_THREADS: usize = 16;
/// Default number of processed files between checkpoint saves
pub const DEFAULT_AUTO_SAVE_INTERVAL: usize = 100;
/// Number of processed files between statistics reports
pub const STATISTICS_INTERVAL: usize = 10;

// Progress bar display settings
/// Number of recently finished files kept on screen
pub const MAX_RECENT_FILE_BARS: usize = 5;
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;
