//! Tests for task planning and output naming

#[cfg(test)]
mod tests {
    use panelstamp::batch::plan_tasks;
    use panelstamp::batch::task::{file_name_of, output_path_for};
    use panelstamp::io::image::OutputFormat;
    use panelstamp::io::spreadsheet::{RowData, SheetIndex};
    use std::path::{Path, PathBuf};

    fn index() -> SheetIndex {
        let row = |supplier: &str| {
            let mut data = RowData::new();
            data.insert("supplier".to_string(), supplier.to_string());
            data
        };
        SheetIndex::from_rows([
            ("1.1".to_string(), row("ACME")),
            ("2-3".to_string(), row("Globex")),
        ])
    }

    // Tests images are paired with rows by stem and the rest skipped
    // Verified by matching on the full file name
    #[test]
    fn test_plan_tasks() {
        let images = vec![
            PathBuf::from("/shots/1-1.png"),
            PathBuf::from("/shots/2-3.jpg"),
            PathBuf::from("/shots/9-9.png"),
        ];
        let texts = vec!["note".to_string()];

        let plan = plan_tasks(&images, &index(), Path::new("/out"), OutputFormat::Pdf, &texts);

        assert_eq!(plan.tasks.len(), 2);
        assert_eq!(plan.skipped, vec![PathBuf::from("/shots/9-9.png")]);

        let first = plan.tasks.first().expect("first task");
        assert_eq!(first.output_path, PathBuf::from("/out/1-1.pdf"));
        assert_eq!(first.row.get("supplier").map(String::as_str), Some("ACME"));
        assert_eq!(first.fixed_texts, texts);
        assert_eq!(first.file_name(), "1-1.png");
    }

    // Tests an empty index skips everything
    // Verified by creating tasks with empty rows
    #[test]
    fn test_plan_without_rows() {
        let images = vec![PathBuf::from("a.png")];
        let plan = plan_tasks(
            &images,
            &SheetIndex::from_rows(Vec::<(String, RowData)>::new()),
            Path::new("out"),
            OutputFormat::Png,
            &[],
        );

        assert!(plan.tasks.is_empty());
        assert_eq!(plan.skipped.len(), 1);
    }

    // Tests output names keep the stem and swap the extension
    // Verified by appending the extension to the full name
    #[test]
    fn test_output_path_for() {
        assert_eq!(
            output_path_for(Path::new("/shots/1-1.jpeg"), Path::new("/out"), OutputFormat::Jpg),
            PathBuf::from("/out/1-1.jpg")
        );
        assert_eq!(
            output_path_for(Path::new("2-1.png"), Path::new("out"), OutputFormat::Png),
            PathBuf::from("out/2-1.png")
        );
    }

    // Tests file names are taken from the last component
    // Verified by returning the whole path
    #[test]
    fn test_file_name_of() {
        assert_eq!(file_name_of(Path::new("/shots/1-1.png")), "1-1.png");
        assert_eq!(file_name_of(Path::new("/")), "");
    }
}
