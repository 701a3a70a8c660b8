//! Tests for layout metrics and runtime defaults

#[cfg(test)]
mod tests {
    use panelstamp::io::configuration::{
        CHECKPOINT_FILE_NAME, DATA_START_ROW, DEFAULT_AUTO_SAVE_INTERVAL, DIVIDER_GAP_ABOVE,
        DIVIDER_GAP_BELOW, MAX_AUTO_THREADS, MAX_RECENT_FILE_BARS, MIN_AUTO_THREADS,
        PANEL_PADDING, PREVIEW_FIELD_CHARS, PREVIEW_MAX_SIZE, PREVIEW_PADDING,
        PREVIEW_TEXT_CHARS, SETTINGS_HASH_LEN,
    };

    // Tests panel and preview paddings
    // Verified by swapping the two paddings
    #[test]
    fn test_padding_values() {
        assert_eq!(PANEL_PADDING, 10);
        assert_eq!(PREVIEW_PADDING, 5);
    }

    // Tests divider spacing adds up to the reserved 25 pixels
    // Verified by changing the gap below the divider
    #[test]
    fn test_divider_spacing() {
        assert_eq!(DIVIDER_GAP_ABOVE + DIVIDER_GAP_BELOW, 25);
    }

    // Tests preview truncation limits and bounds
    // Verified by swapping field and text limits
    #[test]
    fn test_preview_limits() {
        assert_eq!(PREVIEW_FIELD_CHARS, 30);
        assert_eq!(PREVIEW_TEXT_CHARS, 35);
        assert_eq!(PREVIEW_MAX_SIZE, (800, 600));
    }

    // Tests worker pool bounds
    // Verified by raising the lower bound
    #[test]
    fn test_thread_bounds() {
        assert_eq!(MIN_AUTO_THREADS, 2);
        assert_eq!(MAX_AUTO_THREADS, 16);
        assert_eq!(DEFAULT_AUTO_SAVE_INTERVAL, 100);
    }

    // Tests spreadsheet data starts after the header block
    // Verified by starting at the first row
    #[test]
    fn test_data_start_row() {
        assert_eq!(DATA_START_ROW, 11);
    }

    // Tests checkpoint naming and digest length
    // Verified by changing the file name
    #[test]
    fn test_checkpoint_constants() {
        assert_eq!(CHECKPOINT_FILE_NAME, ".checkpoint.json");
        assert_eq!(SETTINGS_HASH_LEN, 12);
        assert_eq!(MAX_RECENT_FILE_BARS, 5);
    }
}
