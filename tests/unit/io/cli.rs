//! Tests for command-line parsing, run overrides, control commands and resume

#[cfg(test)]
mod tests {
    use clap::Parser;
    use panelstamp::AnnotateError;
    use panelstamp::batch::{BatchControl, BatchObserver, ProcessingResult, ProcessingTask};
    use panelstamp::io::checkpoint::CheckpointManager;
    use panelstamp::io::cli::{
        Cli, Command, ControlCommand, FileProcessor, OffsetAction, RunArgs, RunObserver,
        SettingsAction, preview_path_for, resume_or_start,
    };
    use panelstamp::io::image::OutputFormat;
    use panelstamp::io::settings::Settings;
    use panelstamp::io::spreadsheet::RowData;
    use panelstamp::layout::PanelPosition;
    use std::path::{Path, PathBuf};
    use std::time::Duration;

    fn task(name: &str) -> ProcessingTask {
        ProcessingTask {
            image_path: PathBuf::from(format!("/shots/{name}")),
            output_path: PathBuf::from(format!("/out/{name}.pdf")),
            row: RowData::new(),
            fixed_texts: Vec::new(),
        }
    }

    // Tests parsing a run with every override
    // Verified by changing the format parser
    #[test]
    fn test_parse_run_args() {
        let cli = Cli::parse_from([
            "panelstamp",
            "run",
            "--source",
            "shots",
            "--output",
            "out",
            "-x",
            "prices.xlsx",
            "--format",
            "JPEG",
            "--position",
            "bottom",
            "--threads",
            "4",
            "--fresh",
        ]);

        let Command::Run(args) = cli.command else {
            panic!("Expected run command");
        };
        assert_eq!(args.source, Some(PathBuf::from("shots")));
        assert_eq!(args.spreadsheet, Some(PathBuf::from("prices.xlsx")));
        assert_eq!(args.format, Some(OutputFormat::Jpg));
        assert_eq!(args.position, Some(PanelPosition::Bottom));
        assert_eq!(args.threads, Some(4));
        assert!(args.fresh);
        assert!(!args.interactive);
        assert!(!cli.quiet);
    }

    // Tests global flags are accepted after the subcommand
    // Verified by removing the global attribute
    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["panelstamp", "settings", "path", "--quiet", "--settings", "s.json"]);

        assert!(cli.quiet);
        assert_eq!(cli.settings, Some(PathBuf::from("s.json")));
        assert!(matches!(
            cli.command,
            Command::Settings {
                action: SettingsAction::Path
            }
        ));
    }

    // Tests invalid enum values are rejected by the parser
    // Verified by falling back to defaults on unknown values
    #[test]
    fn test_reject_unknown_format() {
        assert!(Cli::try_parse_from(["panelstamp", "run", "--format", "tiff"]).is_err());
        assert!(Cli::try_parse_from(["panelstamp", "run", "--position", "top"]).is_err());
    }

    // Tests offset parsing with negative displacements
    // Verified by removing allow_hyphen_values
    #[test]
    fn test_parse_offset_set() {
        let cli = Cli::parse_from(["panelstamp", "offset", "set", "stamp", "-5", "12"]);

        match cli.command {
            Command::Offset {
                action: OffsetAction::Set { element, dx, dy },
            } => {
                assert_eq!(element, "stamp");
                assert_eq!((dx, dy), (-5, 12));
            }
            other => panic!("Expected offset set, got {other:?}"),
        }
    }

    // Tests preview defaults
    // Verified by changing the default bounds
    #[test]
    fn test_parse_preview_defaults() {
        let cli = Cli::parse_from(["panelstamp", "preview", "1-1.png"]);

        let Command::Preview(args) = cli.command else {
            panic!("Expected preview command");
        };
        assert_eq!(args.image, PathBuf::from("1-1.png"));
        assert_eq!((args.max_width, args.max_height), (800, 600));
        assert!(args.output.is_none());
    }

    // Tests run overrides replace only what was given
    // Verified by overwriting unset values with defaults
    #[test]
    fn test_apply_run_overrides() {
        let mut settings = Settings::default();
        settings.paths.output_folder = Some(PathBuf::from("kept"));

        let args = RunArgs {
            source: Some(PathBuf::from("shots")),
            format: Some(OutputFormat::Png),
            threads: Some(2),
            ..RunArgs::default()
        };
        args.apply_to(&mut settings);

        assert_eq!(settings.paths.source_folder, Some(PathBuf::from("shots")));
        assert_eq!(settings.paths.output_folder, Some(PathBuf::from("kept")));
        assert_eq!(settings.output.format, OutputFormat::Png);
        assert_eq!(settings.output.position, PanelPosition::Left);
        assert_eq!(settings.performance.thread_count, 2);
    }

    // Tests stdin control commands
    // Verified by mapping c to pause
    #[test]
    fn test_control_commands() {
        assert_eq!(ControlCommand::parse("p"), Some(ControlCommand::Pause));
        assert_eq!(ControlCommand::parse(" R \n"), Some(ControlCommand::Resume));
        assert_eq!(ControlCommand::parse("cancel"), Some(ControlCommand::Cancel));
        assert_eq!(ControlCommand::parse("x"), None);

        let control = BatchControl::new();
        ControlCommand::Pause.apply(&control);
        assert!(control.is_paused());
        ControlCommand::Resume.apply(&control);
        assert!(!control.is_paused());
        ControlCommand::Cancel.apply(&control);
        assert!(control.is_cancelled());
    }

    // Tests a fresh start records every task in a new session
    // Verified by skipping session creation
    #[test]
    fn test_resume_or_start_new_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut checkpoint = CheckpointManager::new(dir.path());

        let tasks = resume_or_start(
            &mut checkpoint,
            vec![task("a.png"), task("b.png")],
            "hash".to_string(),
            false,
        )
        .expect("start");

        assert_eq!(tasks.len(), 2);
        assert_eq!(checkpoint.statistics().pending, 2);
    }

    // Tests a matching checkpoint keeps only pending tasks
    // Verified by ignoring the stored session
    #[test]
    fn test_resume_matching_checkpoint() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut first = CheckpointManager::new(dir.path());
        first
            .create_session(
                vec!["a.png".to_string(), "b.png".to_string(), "c.png".to_string()],
                "hash".to_string(),
            )
            .expect("create");
        first.mark_processed("a.png");
        first.mark_failed("c.png", "boom");
        first.save_progress().expect("save");

        let mut checkpoint = CheckpointManager::new(dir.path());
        let tasks = resume_or_start(
            &mut checkpoint,
            vec![task("a.png"), task("b.png"), task("c.png")],
            "hash".to_string(),
            false,
        )
        .expect("resume");

        let names: Vec<_> = tasks.iter().map(ProcessingTask::file_name).collect();
        assert_eq!(names, vec!["b.png".to_string()]);
    }

    // Tests images added after the checkpoint are resumed and recorded
    // Verified by filtering tasks to the stored session files only
    #[test]
    fn test_resume_includes_new_images() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut first = CheckpointManager::new(dir.path());
        first
            .create_session(vec!["a.png".to_string(), "b.png".to_string()], "hash".to_string())
            .expect("create");
        first.mark_processed("a.png");
        first.save_progress().expect("save");

        let mut checkpoint = CheckpointManager::new(dir.path());
        let tasks = resume_or_start(
            &mut checkpoint,
            vec![task("a.png"), task("b.png"), task("d.png")],
            "hash".to_string(),
            false,
        )
        .expect("resume");

        let names: Vec<_> = tasks.iter().map(ProcessingTask::file_name).collect();
        assert_eq!(names, vec!["b.png".to_string(), "d.png".to_string()]);
        assert_eq!(checkpoint.statistics().total, 3);

        let mut reloaded = CheckpointManager::new(dir.path());
        let session = reloaded.load_session().expect("load").expect("session");
        assert_eq!(session.all_files, vec!["a.png", "b.png", "d.png"]);
        assert_eq!(session.processed_files, vec!["a.png"]);
    }

    // Tests changed settings or --fresh start over
    // Verified by resuming regardless of the digest
    #[test]
    fn test_resume_mismatch_and_fresh() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut first = CheckpointManager::new(dir.path());
        first
            .create_session(vec!["a.png".to_string()], "old".to_string())
            .expect("create");
        first.mark_processed("a.png");
        first.save_progress().expect("save");

        let mut checkpoint = CheckpointManager::new(dir.path());
        let tasks = resume_or_start(&mut checkpoint, vec![task("a.png")], "new".to_string(), false)
            .expect("restart");
        assert_eq!(tasks.len(), 1);

        checkpoint.mark_processed("a.png");
        checkpoint.save_progress().expect("save");
        let mut again = CheckpointManager::new(dir.path());
        let tasks = resume_or_start(&mut again, vec![task("a.png")], "new".to_string(), true)
            .expect("fresh");
        assert_eq!(tasks.len(), 1);
    }

    // Tests the run observer marks results and clears the checkpoint on completion
    // Verified by saving instead of clearing when not cancelled
    #[test]
    fn test_run_observer_checkpoint_flow() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut checkpoint = CheckpointManager::new(dir.path());
        checkpoint
            .create_session(vec!["a.png".to_string(), "b.png".to_string()], "h".to_string())
            .expect("create");

        let mut observer = RunObserver::new(checkpoint, None);
        observer.on_file_processed(&ProcessingResult {
            file_name: "a.png".to_string(),
            success: false,
            message: "broken".to_string(),
            elapsed: Duration::ZERO,
        });
        assert_eq!(observer.checkpoint().statistics().failed, 1);

        observer.on_checkpoint();
        assert!(dir.path().join(".checkpoint.json").is_file());

        let stats = panelstamp::batch::BatchStatistics {
            processed: 1,
            total: 2,
            success: 0,
            failed: 1,
            skipped: 0,
            elapsed: 0.1,
            speed: 10.0,
            remaining: 0.0,
            percent: 50.0,
        };
        observer.on_finished(&stats, true);
        assert!(dir.path().join(".checkpoint.json").is_file());

        observer.on_finished(&stats, false);
        assert!(!dir.path().join(".checkpoint.json").exists());
    }

    // Tests run validation reports missing inputs
    // Verified by defaulting the source folder to the current directory
    #[test]
    fn test_run_requires_inputs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings_path = dir.path().join("settings.json");
        let cli = Cli::parse_from([
            "panelstamp",
            "--settings",
            settings_path.to_str().expect("utf-8 path"),
            "--quiet",
            "run",
        ]);
        let processor = FileProcessor::new(cli);

        let missing_source = processor.run_batch(&RunArgs::default());
        assert!(matches!(
            missing_source,
            Err(AnnotateError::InvalidParameter {
                parameter: "source_folder",
                ..
            })
        ));

        let args = RunArgs {
            source: Some(dir.path().to_path_buf()),
            ..RunArgs::default()
        };
        assert!(matches!(
            processor.run_batch(&args),
            Err(AnnotateError::InvalidParameter {
                parameter: "spreadsheet",
                ..
            })
        ));
    }

    // Tests offset and settings commands persist to the chosen file
    // Verified by saving to the default location
    #[test]
    fn test_offset_and_settings_commands() {
        let dir = tempfile::tempdir().expect("tempdir");
        let settings_path = dir.path().join("settings.json");
        let path_arg = settings_path.to_str().expect("utf-8 path");

        let set = Cli::parse_from([
            "panelstamp", "--settings", path_arg, "offset", "set", "inn", "3", "-4",
        ]);
        FileProcessor::new(set).process().expect("offset set");
        let saved = Settings::load(&settings_path).expect("load");
        assert_eq!(saved.element_offsets.get("inn"), Some(&(3, -4)));

        let reset = Cli::parse_from(["panelstamp", "--settings", path_arg, "offset", "reset"]);
        FileProcessor::new(reset).process().expect("offset reset");
        let saved = Settings::load(&settings_path).expect("load");
        assert!(saved.element_offsets.is_empty());

        let restore = Cli::parse_from(["panelstamp", "--settings", path_arg, "settings", "reset"]);
        let processor = FileProcessor::new(restore);
        assert_eq!(processor.settings_path(), settings_path);
        processor.process().expect("settings reset");
        assert_eq!(Settings::load(&settings_path).expect("load"), Settings::default());
    }

    // Tests the default preview location
    // Verified by writing previews to the working directory
    #[test]
    fn test_preview_path_for() {
        assert_eq!(
            preview_path_for(Path::new("/shots/1-1.jpg")),
            PathBuf::from("/shots/1-1_preview.png")
        );
        assert_eq!(
            preview_path_for(Path::new("2-1.png")),
            PathBuf::from("2-1_preview.png")
        );
    }
}
