//! On-disk git fixtures shared by the module tests.

use std::fs;
use std::path::Path;

use git2::{Commit, Oid, Repository, Signature};

pub fn init_repo(path: &Path) -> Repository {
    Repository::init(path).unwrap()
}

/// Write `name` in the worktree, stage it, and commit on HEAD.
pub fn commit_file(repo: &Repository, name: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().expect("fixture repos are non-bare");
    fs::write(workdir.join(name), content).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();

    let signature = Signature::now("Jane Dev", "jane@example.com").unwrap();
    let parent = repo.head().ok().and_then(|head| head.peel_to_commit().ok());
    let parents: Vec<&Commit> = parent.iter().collect();
    repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
        .unwrap()
}

/// Point the `origin` tracking ref for the current branch at `oid`,
/// regardless of the host's default branch name.
pub fn set_tracking_ref(repo: &Repository, oid: Oid) {
    let head = repo.head().unwrap();
    let tail = head
        .name()
        .unwrap()
        .rsplit('/')
        .next()
        .unwrap()
        .to_string();
    repo.reference(
        &format!("refs/remotes/origin/{tail}"),
        oid,
        true,
        "fixture tracking ref",
    )
    .unwrap();
}
