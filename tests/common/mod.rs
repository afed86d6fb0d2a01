//! Shared fixtures for integration tests
//!
//! Every fixture lives in its own temporary directory: a bare repository
//! acting as the remote, the working copy that gets synced, and a second
//! clone used to publish upstream changes.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Run git in `dir` and return its stdout, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("HOME", dir)
        .output()
        .expect("Failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "Sync Test"]);
    git(dir, &["config", "user.email", "sync-test@example.com"]);
    git(dir, &["config", "pull.rebase", "false"]);
}

/// A remote with one commit on `main` and two clones of it
pub struct GitFixture {
    temp_dir: TempDir,
    /// Bare repository the clones use as `origin`
    pub remote: PathBuf,
    /// Working copy under test
    pub work: PathBuf,
    /// Another clone that pushes changes to `origin`
    pub upstream: PathBuf,
    /// Empty directory used as HOME for git runs
    pub home: PathBuf,
}

impl GitFixture {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let root = temp_dir.path();

        let seed = root.join("seed");
        std::fs::create_dir_all(&seed).unwrap();
        git(&seed, &["init", "--quiet"]);
        git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        configure_identity(&seed);
        std::fs::write(seed.join("README.md"), "# Project\n\nfirst line\n").unwrap();
        std::fs::write(seed.join("notes.txt"), "notes\n").unwrap();
        git(&seed, &["add", "."]);
        git(&seed, &["commit", "--quiet", "-m", "Initial commit"]);

        let remote = root.join("remote.git");
        git(
            root,
            &["clone", "--quiet", "--bare", "seed", "remote.git"],
        );

        let work = root.join("work");
        let upstream = root.join("upstream");
        git(root, &["clone", "--quiet", "remote.git", "work"]);
        git(root, &["clone", "--quiet", "remote.git", "upstream"]);
        configure_identity(&work);
        configure_identity(&upstream);

        let home = root.join("home");
        std::fs::create_dir_all(&home).unwrap();

        Self {
            temp_dir,
            remote,
            work,
            upstream,
            home,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Commit `content` to `file` in `repo`
    pub fn commit(&self, repo: &Path, file: &str, content: &str, message: &str) {
        let path = repo.join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        git(repo, &["add", file]);
        git(repo, &["commit", "--quiet", "-m", message]);
    }

    /// Commit in the upstream clone and push it to the remote
    pub fn publish(&self, file: &str, content: &str, message: &str) {
        self.commit(&self.upstream, file, content, message);
        git(&self.upstream, &["push", "--quiet", "origin", "main"]);
    }

    /// Make the working copy and the remote change the same line differently
    pub fn diverge_with_conflict(&self) {
        self.publish(
            "README.md",
            "# Project\n\nupstream line\n",
            "Upstream edit",
        );
        self.commit(
            &self.work,
            "README.md",
            "# Project\n\nlocal line\n",
            "Local edit",
        );
    }

    pub fn head(&self, repo: &Path) -> String {
        git(repo, &["rev-parse", "HEAD"]).trim().to_string()
    }

    /// Ambient environment handed to the sync in tests
    pub fn ambient(&self) -> Vec<(String, String)> {
        vec![
            ("HOME".to_string(), self.home.display().to_string()),
            ("USER".to_string(), "sync-test".to_string()),
        ]
    }
}

/// A minimal Xcode project with two registered Swift files
pub fn write_project_manifest(dir: &Path) -> PathBuf {
    let project = dir.join("App.xcodeproj");
    std::fs::create_dir_all(&project).unwrap();
    let path = project.join("project.pbxproj");
    std::fs::write(
        &path,
        r#"// !$*UTF8*$!
{
	objects = {
		0A1B2C3D4E5F000000000001 /* AppDelegate.swift */ = {isa = PBXFileReference; path = AppDelegate.swift; sourceTree = "<group>"; };
		0A1B2C3D4E5F000000000002 /* ContentView.swift */ = {isa = PBXFileReference; path = ContentView.swift; sourceTree = "<group>"; };
	};
}
"#,
    )
    .unwrap();
    path
}
