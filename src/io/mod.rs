/// Resumable session state stored beside the outputs
pub mod checkpoint;
/// Command-line parsing and command dispatch
pub mod cli;
/// Layout metrics, defaults and thresholds
pub mod configuration;
/// Error types and result alias
pub mod error;
/// Image discovery, decoding and output encoding
pub mod image;
/// Terminal progress display
pub mod progress;
/// Persistent user settings
pub mod settings;
/// Spreadsheet rows keyed by position
pub mod spreadsheet;
