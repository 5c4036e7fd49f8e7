use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Walk `root` looking for `.git` marker directories, at most `max_depth`
/// levels below it. A marker marks its parent as a repository root; the
/// walk never descends into the marker itself, so nested metadata cannot
/// produce phantom roots. Unreadable directories are logged and skipped.
/// Overlapping start directories may yield duplicates; callers
/// de-duplicate. Symlinks are not followed.
pub fn discover(root: &Path, max_depth: usize) -> Vec<PathBuf> {
    let mut found = Vec::new();
    // The start directory itself is always listed, so depth 0 behaves
    // like depth 1.
    let mut walker = WalkDir::new(root).max_depth(max_depth.max(1)).into_iter();
    loop {
        let entry = match walker.next() {
            None => break,
            Some(Ok(entry)) => entry,
            Some(Err(err)) => {
                warn!(error = %err, "skipping unreadable directory");
                continue;
            }
        };
        if entry.file_type().is_dir() && entry.file_name() == ".git" {
            if let Some(parent) = entry.path().parent() {
                debug!(path = %parent.display(), "found repository");
                found.push(parent.to_path_buf());
            }
            walker.skip_current_dir();
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn mkrepo(base: &Path, rel: &str) -> PathBuf {
        let repo = base.join(rel);
        fs::create_dir_all(repo.join(".git")).unwrap();
        repo
    }

    #[test]
    fn finds_start_directory_itself_at_depth_one() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join(".git")).unwrap();
        assert_eq!(discover(tmp.path(), 1), vec![tmp.path().to_path_buf()]);
    }

    #[test]
    fn marker_two_levels_down_needs_depth_two() {
        let tmp = TempDir::new().unwrap();
        let repo = mkrepo(tmp.path(), "alpha");
        assert!(discover(tmp.path(), 1).is_empty());
        assert_eq!(discover(tmp.path(), 2), vec![repo]);
    }

    #[test]
    fn each_extra_level_needs_one_more_depth() {
        let tmp = TempDir::new().unwrap();
        let repo = mkrepo(tmp.path(), "group/alpha");
        assert!(discover(tmp.path(), 2).is_empty());
        assert_eq!(discover(tmp.path(), 3), vec![repo]);
    }

    #[test]
    fn does_not_descend_into_the_marker_directory() {
        let tmp = TempDir::new().unwrap();
        let repo = mkrepo(tmp.path(), "alpha");
        // a nested marker inside .git must not surface .git as a root
        fs::create_dir_all(repo.join(".git/modules/dep/.git")).unwrap();
        assert_eq!(discover(tmp.path(), 10), vec![repo]);
    }

    #[test]
    fn keeps_walking_siblings_and_nested_repos() {
        let tmp = TempDir::new().unwrap();
        let alpha = mkrepo(tmp.path(), "alpha");
        let beta = mkrepo(tmp.path(), "beta");
        let vendored = mkrepo(tmp.path(), "alpha/vendor/dep");
        let mut found = discover(tmp.path(), 4);
        found.sort();
        let mut expected = vec![alpha, beta, vendored];
        expected.sort();
        assert_eq!(found, expected);
    }

    #[test]
    fn plain_files_named_like_the_marker_are_ignored() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("worktree");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(".git"), "gitdir: elsewhere").unwrap();
        assert!(discover(tmp.path(), 3).is_empty());
    }
}
