//! Derivations from a [`RepoRecord`](crate::RepoRecord) to its display
//! cells. The table printer and the dashboard share these so both modes
//! show identical columns.

use chrono::{DateTime, Utc};

use crate::{RepoRecord, SyncState};

/// Commit summaries are cut to this many display characters.
pub const SUMMARY_WIDTH: usize = 40;
/// Head commit ids are shown as a prefix of this length.
pub const HASH_WIDTH: usize = 7;

/// Tail segment of a revision name: `refs/heads/main` -> `main`.
pub fn branch_tail(refname: &str) -> &str {
    refname.rsplit('/').next().unwrap_or(refname)
}

/// Fixed-length commit id prefix. Commit ids are hex, so byte indexing
/// is safe; unevaluated records carry an empty id and stay empty.
pub fn short_hash(hash: &str) -> &str {
    &hash[..hash.len().min(HASH_WIDTH)]
}

/// Compressed author identity: local part plus the second-to-last domain
/// label (`jane@example.com` -> `jane example`). Identities without an
/// `@` pass through unchanged; a domain without dots stands alone.
pub fn author_display(identity: &str) -> String {
    match identity.split_once('@') {
        None => identity.to_string(),
        Some((local, domain)) => {
            let labels: Vec<&str> = domain.split('.').collect();
            if labels.len() == 1 {
                domain.to_string()
            } else {
                format!("{} {}", local, labels[labels.len() - 2])
            }
        }
    }
}

pub fn ellipsize(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        return input.to_string();
    }
    if max <= 3 {
        return "...".chars().take(max).collect();
    }
    let prefix: String = input.chars().take(max - 3).collect();
    format!("{prefix}...")
}

/// First line of the commit message, cut to [`SUMMARY_WIDTH`].
pub fn summary_display(message: &str) -> String {
    let first_line = message.lines().next().unwrap_or("");
    ellipsize(first_line, SUMMARY_WIDTH)
}

/// Relative age of a commit, with no cutoff to absolute dates.
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - then).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }
    let days = hours / 24;
    if days < 30 {
        return plural(days, "day");
    }
    let months = days / 30;
    if months < 12 {
        return plural(months, "month");
    }
    plural(days / 365, "year")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{count} {unit}s ago")
    }
}

pub fn sync_marker(state: SyncState) -> &'static str {
    match state {
        SyncState::OutOfSync => "SYNC",
        SyncState::Clean | SyncState::Unknown => "",
    }
}

/// Column cells for one record, minus the index column the callers
/// prepend: marker, path, branch, hash, age, author, summary, status.
pub fn row_cells(record: &RepoRecord, now: DateTime<Utc>) -> Vec<String> {
    vec![
        sync_marker(record.sync_state()).to_string(),
        record.path.display().to_string(),
        branch_tail(&record.branch_ref).to_string(),
        short_hash(&record.head_commit).to_string(),
        relative_time(record.commit_time, now),
        author_display(&record.author),
        summary_display(&record.message),
        record.status_message.clone().unwrap_or_default(),
    ]
}

pub const COLUMN_HEADERS: [&str; 9] = [
    "#", "sync", "path", "branch", "hash", "time", "author", "message", "status",
];
