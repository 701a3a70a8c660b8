//! Resumable processing state persisted next to the outputs

use crate::io::configuration::{CHECKPOINT_FILE_NAME, SETTINGS_HASH_LEN};
use crate::io::error::{AnnotateError, Result, WithPath};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A file that could not be processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedFile {
    /// File name
    pub file: String,
    /// Failure description
    pub error: String,
    /// When the failure was recorded
    pub timestamp: DateTime<Local>,
}

/// Persisted session state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier, `%Y-%m-%d_%H%M%S`
    pub session_id: String,
    /// When the session was created
    pub started_at: DateTime<Local>,
    /// When progress was last saved
    #[serde(default)]
    pub paused_at: Option<DateTime<Local>>,
    /// Number of files in the session
    pub total_files: usize,
    /// Every file in the session, in processing order
    pub all_files: Vec<String>,
    /// Files written successfully
    #[serde(default)]
    pub processed_files: Vec<String>,
    /// Files that failed
    #[serde(default)]
    pub failed_files: Vec<FailedFile>,
    /// Digest of the settings the session was started with
    pub settings_hash: String,
}

/// Summary counts of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CheckpointStatistics {
    /// Files in the session
    pub total: usize,
    /// Files written successfully
    pub processed: usize,
    /// Files that failed
    pub failed: usize,
    /// Files not yet attempted
    pub pending: usize,
}

/// Reads and writes `.checkpoint.json` inside an output folder
#[derive(Debug, Clone)]
pub struct CheckpointManager {
    path: PathBuf,
    session: Option<Session>,
}

impl CheckpointManager {
    /// Manager for the checkpoint inside `output_dir`
    pub fn new(output_dir: &Path) -> Self {
        Self {
            path: output_dir.join(CHECKPOINT_FILE_NAME),
            session: None,
        }
    }

    /// Location of the checkpoint file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Currently loaded or created session
    pub const fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Whether a checkpoint file exists on disk
    pub fn has_checkpoint(&self) -> bool {
        self.path.is_file()
    }

    /// Start a new session over `files` and write it immediately
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be written
    pub fn create_session(&mut self, files: Vec<String>, settings_hash: String) -> Result<()> {
        let now = Local::now();
        self.session = Some(Session {
            session_id: now.format("%Y-%m-%d_%H%M%S").to_string(),
            started_at: now,
            paused_at: None,
            total_files: files.len(),
            all_files: files,
            processed_files: Vec::new(),
            failed_files: Vec::new(),
            settings_hash,
        });
        self.save()
    }

    /// Load the session stored on disk, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed
    pub fn load_session(&mut self) -> Result<Option<&Session>> {
        if !self.has_checkpoint() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path).with_path(&self.path, "read checkpoint")?;
        let session: Session =
            serde_json::from_str(&text).map_err(|source| AnnotateError::Serialization {
                path: self.path.clone(),
                source,
            })?;
        debug!(session = session.session_id.as_str(), "Loaded checkpoint");
        self.session = Some(session);
        Ok(self.session.as_ref())
    }

    /// Append files missing from the session and save when any were added
    ///
    /// Returns the number of files added; without a session nothing happens.
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be written
    pub fn add_files(&mut self, files: &[String]) -> Result<usize> {
        let Some(session) = &mut self.session else {
            return Ok(0);
        };
        let mut known: HashSet<String> = session.all_files.iter().cloned().collect();
        let mut added = 0;
        for file in files {
            if known.insert(file.clone()) {
                session.all_files.push(file.clone());
                added += 1;
            }
        }
        if added == 0 {
            return Ok(0);
        }
        session.total_files = session.all_files.len();
        self.save()?;
        Ok(added)
    }

    /// Files neither processed nor failed, in session order
    pub fn pending_files(&self) -> Vec<String> {
        let Some(session) = &self.session else {
            return Vec::new();
        };
        let done: HashSet<&str> = session
            .processed_files
            .iter()
            .map(String::as_str)
            .chain(session.failed_files.iter().map(|failed| failed.file.as_str()))
            .collect();
        session
            .all_files
            .iter()
            .filter(|file| !done.contains(file.as_str()))
            .cloned()
            .collect()
    }

    /// Record a successful file
    pub fn mark_processed(&mut self, file: &str) {
        if let Some(session) = &mut self.session {
            session.processed_files.push(file.to_string());
        }
    }

    /// Record a failed file with its error
    pub fn mark_failed(&mut self, file: &str, error: &str) {
        if let Some(session) = &mut self.session {
            session.failed_files.push(FailedFile {
                file: file.to_string(),
                error: error.to_string(),
                timestamp: Local::now(),
            });
        }
    }

    /// Stamp the pause time and write the session
    ///
    /// # Errors
    ///
    /// Returns an error if the checkpoint cannot be written
    pub fn save_progress(&mut self) -> Result<()> {
        if let Some(session) = &mut self.session {
            session.paused_at = Some(Local::now());
        }
        self.save()
    }

    /// Delete the checkpoint file and forget the session
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed
    pub fn clear(&mut self) -> Result<()> {
        self.session = None;
        if self.has_checkpoint() {
            std::fs::remove_file(&self.path).with_path(&self.path, "remove checkpoint")?;
            info!(path = %self.path.display(), "Checkpoint cleared");
        }
        Ok(())
    }

    /// Summary counts of the current session
    pub fn statistics(&self) -> CheckpointStatistics {
        self.session
            .as_ref()
            .map_or_else(CheckpointStatistics::default, |session| {
                CheckpointStatistics {
                    total: session.total_files,
                    processed: session.processed_files.len(),
                    failed: session.failed_files.len(),
                    pending: self.pending_files().len(),
                }
            })
    }

    fn save(&self) -> Result<()> {
        let Some(session) = &self.session else {
            return Ok(());
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).with_path(parent, "create directory")?;
        }
        let json =
            serde_json::to_string_pretty(session).map_err(|source| AnnotateError::Serialization {
                path: self.path.clone(),
                source,
            })?;
        std::fs::write(&self.path, json).with_path(&self.path, "write checkpoint")
    }
}

/// Short digest of any serializable settings value
///
/// Keys are sorted before hashing so equal settings always hash equally.
///
/// # Errors
///
/// Returns an error if the value cannot be serialized to JSON
pub fn settings_hash<T: Serialize>(settings: &T) -> Result<String> {
    // serde_json::Value keeps object keys in a BTreeMap, so this is canonical
    let canonical = serde_json::to_value(settings)?.to_string();
    let digest = Sha256::digest(canonical.as_bytes());

    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{byte:02x}");
    }
    hex.truncate(SETTINGS_HASH_LEN);
    Ok(hex)
}
