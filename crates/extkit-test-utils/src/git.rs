//! Git repository fixtures built with `git2`.
//!
//! No `git` binary is required, so these work on any CI runner.

use std::path::Path;

use git2::{IndexAddOption, Repository, RepositoryInitOptions, Signature};

/// Initialise `path` as a repository on branch `main` and commit every file
/// currently in it.
///
/// Realism level: **REAL WITH HISTORY**, one commit.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(path: &Path) -> Repository {
    let mut opts = RepositoryInitOptions::new();
    opts.initial_head("main");
    let repo = Repository::init_opts(path, &opts).unwrap_or_else(|e| {
        panic!("commit_all: failed to init repository at {}: {e}", path.display())
    });

    {
        let mut index = repo
            .index()
            .unwrap_or_else(|e| panic!("commit_all: failed to open index: {e}"));
        index
            .add_all(["*"].iter(), IndexAddOption::DEFAULT, None)
            .unwrap_or_else(|e| panic!("commit_all: failed to stage files: {e}"));
        index
            .write()
            .unwrap_or_else(|e| panic!("commit_all: failed to write index: {e}"));
        let tree_id = index
            .write_tree()
            .unwrap_or_else(|e| panic!("commit_all: failed to write tree: {e}"));
        let tree = repo
            .find_tree(tree_id)
            .unwrap_or_else(|e| panic!("commit_all: failed to find tree: {e}"));
        let sig = Signature::now("Test User", "test@test.com")
            .unwrap_or_else(|e| panic!("commit_all: bad signature: {e}"));
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap_or_else(|e| panic!("commit_all: failed to commit: {e}"));
    }

    repo
}

/// Whether a usable `git` binary is on PATH.
pub fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
