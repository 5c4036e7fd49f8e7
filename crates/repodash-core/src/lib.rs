use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod display;
pub mod records;

pub use records::{RecordHandle, RecordSet};

/// Status entry for one discovered repository.
///
/// `path` is the identity key and never changes after creation. The
/// evaluated fields (`branch_ref` through `diverged_from_remote`) are
/// rewritten as one group whenever the repository is (re-)evaluated;
/// `status_message` belongs to whichever action worker wrote it last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepoRecord {
    pub path: PathBuf,
    /// Full ref form, e.g. `refs/heads/main`.
    pub branch_ref: String,
    /// Full hex commit id of the current head.
    pub head_commit: String,
    pub commit_time: DateTime<Utc>,
    /// Raw author identity, usually an email address.
    pub author: String,
    /// Full commit message; display code derives the first line.
    pub message: String,
    pub has_remote: bool,
    pub worktree_dirty: bool,
    /// `Some(true)` when the local head is not an ancestor of the
    /// remote-tracking commit; `None` when there is no remote to compare
    /// against.
    pub diverged_from_remote: Option<bool>,
    pub status_message: Option<String>,
}

impl RepoRecord {
    /// An unevaluated record: path only, everything else at rest.
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            branch_ref: String::new(),
            head_commit: String::new(),
            commit_time: DateTime::UNIX_EPOCH,
            author: String::new(),
            message: String::new(),
            has_remote: false,
            worktree_dirty: false,
            diverged_from_remote: None,
            status_message: None,
        }
    }

    /// Derived sync state. The dirty / diverged distinction stays
    /// observable on the record itself; this is the collapsed view the
    /// rendering layer uses.
    pub fn sync_state(&self) -> SyncState {
        if !self.has_remote {
            return SyncState::Unknown;
        }
        if self.worktree_dirty || self.diverged_from_remote == Some(true) {
            SyncState::OutOfSync
        } else {
            SyncState::Clean
        }
    }

    pub fn is_out_of_sync(&self) -> bool {
        self.sync_state() == SyncState::OutOfSync
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncState {
    Clean,
    OutOfSync,
    Unknown,
}

impl SyncState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncState::Clean => "clean",
            SyncState::OutOfSync => "out-of-sync",
            SyncState::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
