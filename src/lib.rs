//! Batch annotation of screenshots with spreadsheet data, fixed text and a stamp
//!
//! Each image is matched to a spreadsheet row by its file stem, placed on a
//! canvas next to a text panel and written out as PNG, JPG or PDF. Batches run
//! on a worker pool that can be paused, cancelled and resumed from a checkpoint.

#![forbid(unsafe_code)]

/// Worker pool, pause/cancel control and batch statistics
pub mod batch;
/// Input/output operations, settings and error handling
pub mod io;
/// Panel geometry, text wrapping and element placement
pub mod layout;
/// Fonts, colours, composition and previews
pub mod render;

pub use io::error::{AnnotateError, Result};
