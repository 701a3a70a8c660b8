//! Tests for the batch progress display and its recent-file window

#[cfg(test)]
mod tests {
    use panelstamp::batch::{BatchObserver, BatchStatistics, ProcessingResult};
    use panelstamp::io::configuration::MAX_RECENT_FILE_BARS;
    use panelstamp::io::progress::ProgressManager;
    use std::time::Duration;

    fn result(name: &str, success: bool) -> ProcessingResult {
        ProcessingResult {
            file_name: name.to_string(),
            success,
            message: if success { "OK" } else { "decode error" }.to_string(),
            elapsed: Duration::from_millis(120),
        }
    }

    fn statistics(processed: usize, total: usize) -> BatchStatistics {
        BatchStatistics {
            processed,
            total,
            success: processed,
            failed: 0,
            skipped: 0,
            elapsed: 1.0,
            speed: processed as f64,
            remaining: 0.0,
            percent: 0.0,
        }
    }

    // Tests ProgressManager construction and empty batches
    // Verified by adding a panic for zero files
    #[test]
    fn test_progress_manager_empty_batch() {
        let mut pm = ProgressManager::hidden();
        pm.initialize(0);
        pm.finish(&statistics(0, 0), false);
        assert_eq!(pm.position(), 0);
    }

    // Tests default trait implementation
    // Verified by creating different initial states
    #[test]
    fn test_progress_manager_default() {
        let mut pm = ProgressManager::default();
        pm.initialize(2);
        pm.complete_file(&result("1-1.png", true));
        assert_eq!(pm.position(), 1);
    }

    // Tests the batch bar counts every finished file
    // Verified by counting only successes
    #[test]
    fn test_batch_bar_counts_failures() {
        let mut pm = ProgressManager::hidden();
        pm.initialize(3);
        pm.complete_file(&result("a.png", true));
        pm.complete_file(&result("b.png", false));

        assert_eq!(pm.position(), 2);
        let lines: Vec<_> = pm.recent_files().collect();
        assert!(lines.first().is_some_and(|line| line.starts_with("✓ a.png")));
        assert!(lines.get(1).is_some_and(|line| line.contains("decode error")));
    }

    // Tests only the most recent files stay visible
    // Verified by dropping the newest instead of the oldest
    #[test]
    fn test_recent_window_rolls() {
        let mut pm = ProgressManager::hidden();
        let total = MAX_RECENT_FILE_BARS + 3;
        pm.initialize(total);

        for i in 0..total {
            pm.complete_file(&result(&format!("file{i}.png"), true));
        }

        let lines: Vec<_> = pm.recent_files().collect();
        assert_eq!(lines.len(), MAX_RECENT_FILE_BARS);
        assert!(lines.first().is_some_and(|line| line.contains("file3.png")));
        assert!(lines.last().is_some_and(|line| line.contains(&format!("file{}.png", total - 1))));
    }

    // Tests the observer hooks drive the display
    // Verified by ignoring on_file_processed
    #[test]
    fn test_observer_hooks() {
        let mut pm = ProgressManager::hidden();
        pm.on_started(2);
        pm.on_file_processed(&result("a.png", true));
        pm.on_statistics(&statistics(1, 2));
        pm.on_file_processed(&result("b.png", true));
        pm.on_finished(&statistics(2, 2), false);

        assert_eq!(pm.position(), 2);
    }

    // Tests completing without initialization is harmless
    // Verified by unwrapping the batch bar
    #[test]
    fn test_complete_before_initialize() {
        let mut pm = ProgressManager::hidden();
        pm.complete_file(&result("a.png", true));
        pm.set_status("Paused");

        assert_eq!(pm.position(), 0);
        assert_eq!(pm.recent_files().count(), 1);
    }
}
