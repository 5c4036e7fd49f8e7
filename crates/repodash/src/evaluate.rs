use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use git2::{Repository, StatusOptions};
use thiserror::Error;

use repodash_core::display::branch_tail;
use repodash_core::RepoRecord;

/// Why one repository could not be evaluated. Every variant aborts the
/// evaluation of that repository only; the scan as a whole continues.
#[derive(Debug, Error)]
pub enum EvalError {
    #[error("not a git repository: {0}")]
    NotARepository(#[source] git2::Error),
    #[error("repository has no usable head: {0}")]
    NoHead(#[source] git2::Error),
    #[error("cannot resolve remote-tracking revision {revision}: {source}")]
    UnresolvedRemoteRef {
        revision: String,
        #[source]
        source: git2::Error,
    },
    #[error("backend query failed: {0}")]
    Backend(#[from] git2::Error),
}

/// Read-only status evaluation of the repository at `path`.
///
/// Absence of an `origin` remote is not an error: the record comes back
/// with `has_remote = false` and no divergence verdict. A remote that
/// exists but has no branch matching the local head fails with
/// [`EvalError::UnresolvedRemoteRef`].
pub fn evaluate(path: &Path) -> Result<RepoRecord, EvalError> {
    let repo = Repository::open(path).map_err(EvalError::NotARepository)?;
    let head = repo.head().map_err(EvalError::NoHead)?;
    let head_commit = head.peel_to_commit().map_err(EvalError::NoHead)?;

    let mut record = RepoRecord::new(path.to_path_buf());
    record.branch_ref = head.name().unwrap_or("HEAD").to_string();
    record.head_commit = head_commit.id().to_string();
    record.commit_time = commit_time_utc(head_commit.time());
    record.author = head_commit.author().email().unwrap_or("").to_string();
    record.message = head_commit.message().unwrap_or("").to_string();

    if repo.find_remote("origin").is_ok() {
        record.has_remote = true;
        let revision = format!("origin/{}", branch_tail(&record.branch_ref));
        let remote_commit = repo
            .revparse_single(&revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|source| EvalError::UnresolvedRemoteRef { revision, source })?;

        // head == remote counts as "is ancestor": fully in sync.
        let head_oid = head_commit.id();
        let remote_oid = remote_commit.id();
        let is_ancestor =
            head_oid == remote_oid || repo.graph_descendant_of(remote_oid, head_oid)?;
        record.diverged_from_remote = Some(!is_ancestor);
    }

    record.worktree_dirty = worktree_dirty(&repo)?;
    Ok(record)
}

fn worktree_dirty(repo: &Repository) -> Result<bool, git2::Error> {
    let mut options = StatusOptions::new();
    options
        .include_untracked(true)
        .include_ignored(false)
        .include_unmodified(false);
    let statuses = repo.statuses(Some(&mut options))?;
    Ok(!statuses.is_empty())
}

fn commit_time_utc(time: git2::Time) -> DateTime<Utc> {
    Utc.timestamp_opt(time.seconds(), 0)
        .single()
        .unwrap_or(DateTime::UNIX_EPOCH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{commit_file, init_repo, set_tracking_ref};
    use repodash_core::SyncState;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn plain_directory_is_not_a_repository() {
        let tmp = TempDir::new().unwrap();
        let err = evaluate(tmp.path()).unwrap_err();
        assert!(matches!(err, EvalError::NotARepository(_)));
    }

    #[test]
    fn unborn_repository_has_no_head() {
        let tmp = TempDir::new().unwrap();
        Repository::init(tmp.path()).unwrap();
        let err = evaluate(tmp.path()).unwrap_err();
        assert!(matches!(err, EvalError::NoHead(_)));
    }

    #[test]
    fn repository_without_remote_is_unknown() {
        let tmp = TempDir::new().unwrap();
        let repo = init_repo(tmp.path());
        commit_file(&repo, "a.txt", "one", "initial commit");

        let record = evaluate(tmp.path()).unwrap();
        assert!(!record.has_remote);
        assert_eq!(record.diverged_from_remote, None);
        assert_eq!(record.sync_state(), SyncState::Unknown);
        assert_eq!(record.head_commit.len(), 40);
        assert_eq!(record.author, "jane@example.com");
        assert!(record.branch_ref.starts_with("refs/heads/"));
    }

    #[test]
    fn remote_without_matching_branch_is_unresolved() {
        let tmp = TempDir::new().unwrap();
        let repo = init_repo(tmp.path());
        commit_file(&repo, "a.txt", "one", "initial commit");
        repo.remote("origin", "/nowhere/in/particular").unwrap();

        let err = evaluate(tmp.path()).unwrap_err();
        assert!(matches!(err, EvalError::UnresolvedRemoteRef { .. }));
    }

    #[test]
    fn clean_tree_matching_remote_is_clean() {
        let tmp = TempDir::new().unwrap();
        let repo = init_repo(tmp.path());
        let oid = commit_file(&repo, "a.txt", "one", "initial commit");
        repo.remote("origin", "/nowhere/in/particular").unwrap();
        set_tracking_ref(&repo, oid);

        let record = evaluate(tmp.path()).unwrap();
        assert!(record.has_remote);
        assert!(!record.worktree_dirty);
        assert_eq!(record.diverged_from_remote, Some(false));
        assert_eq!(record.sync_state(), SyncState::Clean);
    }

    #[test]
    fn dirty_tree_is_out_of_sync_even_when_ancestor() {
        let tmp = TempDir::new().unwrap();
        let repo = init_repo(tmp.path());
        let oid = commit_file(&repo, "a.txt", "one", "initial commit");
        repo.remote("origin", "/nowhere/in/particular").unwrap();
        set_tracking_ref(&repo, oid);
        fs::write(tmp.path().join("scratch.txt"), "untracked").unwrap();

        let record = evaluate(tmp.path()).unwrap();
        assert!(record.worktree_dirty);
        assert_eq!(record.diverged_from_remote, Some(false));
        assert_eq!(record.sync_state(), SyncState::OutOfSync);
    }

    #[test]
    fn local_commits_ahead_of_remote_diverge() {
        let tmp = TempDir::new().unwrap();
        let repo = init_repo(tmp.path());
        let first = commit_file(&repo, "a.txt", "one", "initial commit");
        repo.remote("origin", "/nowhere/in/particular").unwrap();
        set_tracking_ref(&repo, first);
        commit_file(&repo, "a.txt", "two", "local change");

        let record = evaluate(tmp.path()).unwrap();
        assert!(!record.worktree_dirty);
        assert_eq!(record.diverged_from_remote, Some(true));
        assert_eq!(record.sync_state(), SyncState::OutOfSync);
    }

    #[test]
    fn head_behind_remote_is_still_an_ancestor() {
        let tmp = TempDir::new().unwrap();
        let repo = init_repo(tmp.path());
        let first = commit_file(&repo, "a.txt", "one", "initial commit");
        let second = commit_file(&repo, "a.txt", "two", "follow-up");
        repo.remote("origin", "/nowhere/in/particular").unwrap();
        set_tracking_ref(&repo, second);
        let target = repo.find_object(first, None).unwrap();
        repo.reset(&target, git2::ResetType::Hard, None).unwrap();

        let record = evaluate(tmp.path()).unwrap();
        assert_eq!(record.head_commit, first.to_string());
        assert_eq!(record.diverged_from_remote, Some(false));
        assert_eq!(record.sync_state(), SyncState::Clean);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let repo = init_repo(tmp.path());
        let oid = commit_file(&repo, "a.txt", "one", "initial commit");
        repo.remote("origin", "/nowhere/in/particular").unwrap();
        set_tracking_ref(&repo, oid);

        let first = evaluate(tmp.path()).unwrap();
        let second = evaluate(tmp.path()).unwrap();
        assert_eq!(first, second);
    }
}
