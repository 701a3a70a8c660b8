//! Work items: one source image paired with its spreadsheet row

use crate::io::image::OutputFormat;
use crate::io::spreadsheet::{RowData, SheetIndex};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// One image to annotate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingTask {
    /// Source screenshot
    pub image_path: PathBuf,
    /// Destination file
    pub output_path: PathBuf,
    /// Spreadsheet values for this image
    pub row: RowData,
    /// Fixed texts drawn below the fields
    pub fixed_texts: Vec<String>,
}

impl ProcessingTask {
    /// File name of the source image, used as the checkpoint key
    pub fn file_name(&self) -> String {
        file_name_of(&self.image_path)
    }
}

/// Outcome of one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessingResult {
    /// File name of the source image
    pub file_name: String,
    /// Whether the output was written
    pub success: bool,
    /// `OK` or the failure description
    pub message: String,
    /// Wall time spent on the task
    pub elapsed: Duration,
}

/// Tasks ready to run and the images left out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPlan {
    /// Images with a matching row
    pub tasks: Vec<ProcessingTask>,
    /// Images without a matching row
    pub skipped: Vec<PathBuf>,
}

/// File name component of `path`, lossily converted
pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .into_owned()
}

/// Output path for `image`: same stem inside `output_dir` with the format's extension
pub fn output_path_for(image: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = image.file_stem().unwrap_or_default().to_string_lossy();
    output_dir.join(format!("{stem}.{}", format.extension()))
}

/// Pair every image with its spreadsheet row; images without one are skipped
pub fn plan_tasks(
    images: &[PathBuf],
    index: &SheetIndex,
    output_dir: &Path,
    format: OutputFormat,
    fixed_texts: &[String],
) -> TaskPlan {
    let mut plan = TaskPlan::default();

    for image in images {
        match index.lookup_for_file(image) {
            Some(row) => plan.tasks.push(ProcessingTask {
                image_path: image.clone(),
                output_path: output_path_for(image, output_dir, format),
                row: row.clone(),
                fixed_texts: fixed_texts.to_vec(),
            }),
            None => {
                info!(file = %image.display(), "Skipping image without spreadsheet row");
                plan.skipped.push(image.clone());
            }
        }
    }

    plan
}
