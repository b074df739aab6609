//! Throwaway repositories with fixed signatures and timestamps.

#![allow(dead_code)]

use std::path::Path;

use chrono::{DateTime, Utc};
use git2::{Oid, Repository, RepositoryInitOptions, Signature, Time};
use tempfile::TempDir;

pub struct TestRepo {
    pub dir: TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Empty repository whose HEAD points at an unborn `master`.
    pub fn init() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("master");
        let repo = Repository::init_opts(dir.path(), &opts).unwrap();
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn head(&self) -> Option<Oid> {
        self.repo.head().ok().and_then(|h| h.target())
    }

    /// Commit `files` on top of HEAD.
    pub fn commit(
        &self,
        files: &[(&str, &str)],
        message: &str,
        author: &str,
        when: DateTime<Utc>,
    ) -> Oid {
        let parents: Vec<Oid> = self.head().into_iter().collect();
        self.commit_to("HEAD", &parents, files, message, author, when)
    }

    /// Commit `files` with explicit parents, moving `update_ref`.
    pub fn commit_to(
        &self,
        update_ref: &str,
        parents: &[Oid],
        files: &[(&str, &str)],
        message: &str,
        author: &str,
        when: DateTime<Utc>,
    ) -> Oid {
        let mut index = self.repo.index().unwrap();
        for (name, contents) in files {
            let full = self.path().join(name);
            if let Some(parent) = full.parent() {
                std::fs::create_dir_all(parent).unwrap();
            }
            std::fs::write(&full, contents).unwrap();
            index.add_path(Path::new(name)).unwrap();
        }
        index.write().unwrap();
        let tree = self.repo.find_tree(index.write_tree().unwrap()).unwrap();

        let email = format!("{}@example.com", author.to_lowercase().replace(' ', "."));
        let sig = Signature::new(author, &email, &Time::new(when.timestamp(), 0)).unwrap();
        let parents: Vec<git2::Commit> = parents
            .iter()
            .map(|id| self.repo.find_commit(*id).unwrap())
            .collect();
        let parent_refs: Vec<&git2::Commit> = parents.iter().collect();

        self.repo
            .commit(Some(update_ref), &sig, &sig, message, &tree, &parent_refs)
            .unwrap()
    }

    /// Remove `name` from the index and commit on top of HEAD.
    pub fn delete(&self, name: &str, message: &str, author: &str, when: DateTime<Utc>) -> Oid {
        let mut index = self.repo.index().unwrap();
        index.remove_path(Path::new(name)).unwrap();
        index.write().unwrap();
        std::fs::remove_file(self.path().join(name)).unwrap();
        self.commit(&[], message, author, when)
    }

    pub fn branch(&self, name: &str, at: Oid) {
        let commit = self.repo.find_commit(at).unwrap();
        self.repo.branch(name, &commit, false).unwrap();
    }

    /// Local branch `name` as a symbolic ref to branch `target`.
    pub fn alias(&self, name: &str, target: &str) {
        self.repo
            .reference_symbolic(
                &format!("refs/heads/{name}"),
                &format!("refs/heads/{target}"),
                false,
                "alias",
            )
            .unwrap();
    }

    /// Loose branch ref pointing at `id`, which need not exist.
    pub fn dangling_branch(&self, name: &str, id: &str) {
        let path = self.repo.path().join("refs").join("heads").join(name);
        std::fs::write(path, format!("{id}\n")).unwrap();
    }
}
