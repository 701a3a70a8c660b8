//! Error types shared by every stage of the annotation pipeline

use std::fmt;
use std::path::PathBuf;

/// Main error type for all annotation operations
#[derive(Debug)]
pub enum AnnotateError {
    /// Failed to load a source or stamp image from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image decoding error
        source: image::ImageError,
    },

    /// Failed to encode or write an output image
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image encoding error
        source: image::ImageError,
    },

    /// Failed to assemble or write a PDF document
    PdfExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying PDF error
        source: lopdf::Error,
    },

    /// Spreadsheet could not be opened or has no usable data
    Spreadsheet {
        /// Path to the workbook
        path: PathBuf,
        /// Description of what went wrong
        reason: String,
    },

    /// Settings or checkpoint JSON could not be parsed or serialized
    Serialization {
        /// File the JSON belongs to
        path: PathBuf,
        /// Underlying JSON error
        source: serde_json::Error,
    },

    /// A font file exists but cannot be parsed
    Font {
        /// Path to the font file
        path: PathBuf,
        /// Description of the parse failure
        reason: String,
    },

    /// User-supplied parameter failed validation
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Worker pool could not be created
    ThreadPool {
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for AnnotateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::PdfExport { path, source } => {
                write!(f, "Failed to write PDF '{}': {source}", path.display())
            }
            Self::Spreadsheet { path, reason } => {
                write!(f, "Spreadsheet error in '{}': {reason}", path.display())
            }
            Self::Serialization { path, source } => {
                write!(f, "Invalid JSON in '{}': {source}", path.display())
            }
            Self::Font { path, reason } => {
                write!(f, "Unusable font '{}': {reason}", path.display())
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::ThreadPool { reason } => {
                write!(f, "Failed to start worker pool: {reason}")
            }
        }
    }
}

impl std::error::Error for AnnotateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::PdfExport { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for annotation results
pub type Result<T> = std::result::Result<T, AnnotateError>;

impl From<image::ImageError> for AnnotateError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for AnnotateError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

impl From<serde_json::Error> for AnnotateError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<lopdf::Error> for AnnotateError {
    fn from(err: lopdf::Error) -> Self {
        Self::PdfExport {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<calamine::Error> for AnnotateError {
    fn from(err: calamine::Error) -> Self {
        Self::Spreadsheet {
            path: PathBuf::from("<unknown>"),
            reason: err.to_string(),
        }
    }
}

/// Attaches a path and operation name to I/O failures
pub trait WithPath<T> {
    /// Convert an I/O error into a [`AnnotateError::FileSystem`] naming `path`
    ///
    /// # Errors
    ///
    /// Propagates the original error with path context applied
    fn with_path(self, path: &std::path::Path, operation: &'static str) -> Result<T>;
}

impl<T> WithPath<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &std::path::Path, operation: &'static str) -> Result<T> {
        self.map_err(|source| AnnotateError::FileSystem {
            path: path.to_path_buf(),
            operation,
            source,
        })
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> AnnotateError {
    AnnotateError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create a spreadsheet error for `path`
pub fn spreadsheet_error(path: &std::path::Path, reason: &impl ToString) -> AnnotateError {
    AnnotateError::Spreadsheet {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
