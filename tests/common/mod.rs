//! Real git repositories for integration tests. Requires a `git` executable.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A local "remote" repository that tests clone from.
pub struct Upstream {
    _dir: TempDir,
    path: PathBuf,
}

impl Upstream {
    /// Empty repository at `<tmp>/<name>` with a test identity configured.
    pub fn new(name: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(name);
        fs::create_dir_all(&path).unwrap();

        let upstream = Self { _dir: dir, path };
        upstream.git(&["init", "--quiet"]);
        upstream.git(&["config", "user.email", "test@gpm.example"]);
        upstream.git(&["config", "user.name", "Test User"]);
        upstream.git(&["config", "commit.gpgsign", "false"]);
        upstream.git(&["config", "tag.gpgsign", "false"]);
        upstream
    }

    /// `awesome-component` with one integration and the tags
    /// `v0.8.8`, `v0.9.9`, `v1.0.0`, `v2.0.0beta2`, plus one untagged commit
    /// on top.
    pub fn awesome_component() -> Self {
        let upstream = Self::new("awesome-component");
        for tag in ["v0.8.8", "v0.9.9", "v1.0.0", "v2.0.0beta2"] {
            upstream.write_component("awesome", tag);
            upstream.commit(&format!("Release {}", tag));
            upstream.tag(tag);
        }
        upstream.write_file("README.md", "work in progress\n");
        upstream.commit("Unreleased work");
        upstream
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// URL to clone from.
    pub fn url(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn write_file(&self, relative: &str, contents: &str) {
        let file = self.path.join(relative);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, contents).unwrap();
    }

    pub fn write_component(&self, name: &str, version: &str) {
        self.write_file(
            &format!("custom_components/{}/manifest.json", name),
            &format!(r#"{{"domain": "{}", "version": "{}"}}"#, name, version),
        );
    }

    pub fn commit(&self, message: &str) {
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "--allow-empty", "-m", message]);
    }

    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
    }

    /// Commit a tag points to.
    pub fn rev(&self, reference: &str) -> String {
        self.git(&["rev-parse", &format!("{}^{{commit}}", reference)])
    }

    pub fn head(&self) -> String {
        self.rev("HEAD")
    }

    pub fn git(&self, args: &[&str]) -> String {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.path)
            .output()
            .unwrap_or_else(|e| panic!("failed to run git {:?}: {}", args, e));
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }
}
