//! Tests for settings defaults, deep-merge loading and persistence

#[cfg(test)]
mod tests {
    use panelstamp::io::checkpoint::settings_hash;
    use panelstamp::io::image::OutputFormat;
    use panelstamp::io::settings::{Settings, resolve_thread_count};
    use panelstamp::io::spreadsheet::RowData;
    use panelstamp::layout::{
        ElementOffsets, FieldStyle, LayoutParams, MonospaceMeasure, PanelContent, PanelPosition,
        compute_layout,
    };
    use std::fs;

    // Tests default fields, texts and appearance
    // Verified by enabling the hyperlink field by default
    #[test]
    fn test_defaults() {
        let settings = Settings::default();

        let keys: Vec<_> = settings.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["inn", "kpp", "supplier", "hyperlink"]);
        let hyperlink = settings.fields.last().expect("hyperlink field");
        assert!(!hyperlink.enabled);
        assert_eq!(settings.fields.get(2).map(|f| f.style), Some(FieldStyle::Stacked));

        assert_eq!(settings.fixed_texts.len(), 3);
        assert_eq!(settings.output.format, OutputFormat::Pdf);
        assert_eq!(settings.output.position, PanelPosition::Left);
        assert_eq!(settings.output.panel_width, 300);
        assert!((settings.stamp.scale - 1.5).abs() < f32::EPSILON);
        assert!(settings.element_offsets.is_empty());
    }

    // Tests a missing file yields defaults
    // Verified by returning an error for missing files
    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings = Settings::load(&dir.path().join("settings.json")).expect("load");
        assert_eq!(settings, Settings::default());
    }

    // Tests partial files are merged over defaults
    // Verified by replacing whole sections instead of merging
    #[test]
    fn test_load_deep_merges() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{
                "output": { "format": "png", "panel_width": 240 },
                "performance": { "thread_count": 3 },
                "element_offsets": { "stamp": [4, -2] }
            }"#,
        )
        .expect("write");

        let settings = Settings::load(&path).expect("load");

        assert_eq!(settings.output.format, OutputFormat::Png);
        assert_eq!(settings.output.panel_width, 240);
        assert_eq!(settings.output.font_family, "Arial");
        assert_eq!(settings.performance.thread_count, 3);
        assert!(settings.performance.auto_save);
        assert_eq!(settings.element_offsets.get("stamp"), Some(&(4, -2)));
        assert_eq!(settings.fields.len(), 4);
    }

    // Tests corrupt files are reported by load and ignored by load_or_default
    // Verified by silently returning defaults from load
    #[test]
    fn test_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").expect("write");

        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    // Tests save then load returns the same settings
    // Verified by skipping parent directory creation
    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested/panelstamp/settings.json");

        let mut settings = Settings::default();
        settings.output.position = PanelPosition::Bottom;
        settings.set_offset("inn", 12, -5);
        settings.save(&path).expect("save");

        let reloaded = Settings::load(&path).expect("load");
        assert_eq!(reloaded, settings);
    }

    // Tests offsets can be set, replaced and cleared
    // Verified by appending instead of replacing offsets
    #[test]
    fn test_offsets() {
        let mut settings = Settings::default();
        settings.set_offset("text_1", 1, 2);
        settings.set_offset("text_1", 3, 4);
        settings.set_offset("divider", 0, 7);

        assert_eq!(settings.element_offsets.get("text_1"), Some(&(3, 4)));
        assert_eq!(settings.element_offsets.len(), 2);

        settings.reset_offsets();
        assert!(settings.element_offsets.is_empty());
    }

    // Tests reset restores every default
    // Verified by resetting only offsets
    #[test]
    fn test_reset() {
        let mut settings = Settings::default();
        settings.output.font_size = 30.0;
        settings.set_offset("stamp", 1, 1);

        settings.reset();
        assert_eq!(settings, Settings::default());
    }

    // Tests derived column mapping and fixed texts
    // Verified by including disabled texts
    #[test]
    fn test_derived_values() {
        let mut settings = Settings::default();
        settings.position_column = 2;
        if let Some(text) = settings.fixed_texts.get_mut(1) {
            text.enabled = false;
        }

        let mapping = settings.column_mapping();
        assert_eq!(mapping.position, 2);
        assert!(mapping.fields.contains(&("inn".to_string(), 22)));

        let texts = settings.enabled_fixed_texts();
        assert_eq!(texts.len(), 2);
        assert!(!texts.contains(&"Quotation of 13.11.2024".to_string()));
    }

    // Tests thread count resolution
    // Verified by removing the clamp
    #[test]
    fn test_resolve_thread_count() {
        assert_eq!(resolve_thread_count(3), 3);
        let auto = resolve_thread_count(0);
        assert!((2..=16).contains(&auto));

        let mut settings = Settings::default();
        settings.performance.thread_count = 5;
        assert_eq!(settings.effective_thread_count(), 5);
    }

    // Tests worker tuning does not change the output fingerprint
    // Verified by fingerprinting the whole settings document
    #[test]
    fn test_fingerprint_ignores_performance() {
        let settings = Settings::default();
        let base = settings_hash(&settings.fingerprint()).expect("hash");

        let mut tuned = settings.clone();
        tuned.performance.thread_count = 7;
        tuned.performance.auto_save = false;
        tuned.performance.auto_save_interval = 3;
        assert_eq!(settings_hash(&tuned.fingerprint()).expect("hash"), base);

        let mut restyled = settings.clone();
        restyled.output.font_size = 14.0;
        assert_ne!(settings_hash(&restyled.fingerprint()).expect("hash"), base);

        let mut moved = settings;
        moved.set_offset("stamp", 0, 5);
        assert_ne!(settings_hash(&moved.fingerprint()).expect("hash"), base);
    }

    // Tests fixed texts are numbered among the enabled ones
    // Verified by numbering texts by their configured index
    #[test]
    fn test_fixed_text_numbering() {
        let mut settings = Settings::default();
        if let Some(text) = settings.fixed_texts.first_mut() {
            text.enabled = false;
        }

        let texts = settings.enabled_fixed_texts();
        let content = PanelContent::from_row(&settings.fields, &RowData::new(), &texts);
        let layout = compute_layout(
            (400, 300),
            &content,
            None,
            &LayoutParams::output(PanelPosition::Left, 2000, 12.0, 1.0),
            &ElementOffsets::new(),
            &MonospaceMeasure { advance: 10 },
        );

        assert_eq!(
            layout.element("text_1").and_then(|e| e.first_line()),
            Some("Quotation of 13.11.2024")
        );
        assert!(layout.element("text_3").is_none());
    }
}
