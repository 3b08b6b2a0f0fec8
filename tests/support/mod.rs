#![allow(dead_code)]

// Shared fixtures for driving the git-airgap binary against throwaway
// repositories. Requires `git` on PATH.

use std::{
    fs,
    path::{Path, PathBuf},
    process::Output,
};

use assert_cmd::Command;
use tempfile::TempDir;

/// A temp workspace holding `repo/` (source repository on branch `main`),
/// `bundles/`, `logs/` and a `.git-airgap.conf` pointing at them.
pub struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    /// Repository with one commit, config written, `setup` not yet run.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let sandbox = Self { dir };
        let repo = sandbox.repo();
        fs::create_dir_all(&repo).expect("create repo dir");
        run_git(&repo, &["init", "-q", "-b", "main"]);
        run_git(&repo, &["config", "user.name", "Airgap Test"]);
        run_git(&repo, &["config", "user.email", "airgap@example.com"]);
        run_git(&repo, &["config", "commit.gpgsign", "false"]);
        sandbox.commit_file("README.md", "hello\n", "initial commit");

        let config = format!(
            "REPO_PATH=\"{}\"\nBASELINE_VERSION=\"1.0.0\"\nBUNDLE_DIR=\"{}\"\nLOG_DIR=\"{}\"\n",
            repo.display(),
            sandbox.bundles().display(),
            sandbox.logs().display()
        );
        fs::write(sandbox.config_path(), config).expect("write config");
        sandbox
    }

    /// Same as [`Sandbox::new`] with `setup` already run.
    pub fn ready() -> Self {
        let sandbox = Self::new();
        sandbox.cmd().arg("setup").assert().success();
        sandbox
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn repo(&self) -> PathBuf {
        self.root().join("repo")
    }

    pub fn bundles(&self) -> PathBuf {
        self.root().join("bundles")
    }

    pub fn logs(&self) -> PathBuf {
        self.root().join("logs")
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join(".git-airgap.conf")
    }

    /// The binary, run from the sandbox root so the default config is found.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("git-airgap").expect("git-airgap binary");
        cmd.current_dir(self.root()).env_remove("RUST_LOG");
        cmd
    }

    /// Run git in the source repository and return trimmed stdout.
    pub fn git(&self, args: &[&str]) -> String {
        run_git(&self.repo(), args)
    }

    pub fn commit_file(&self, name: &str, contents: &str, message: &str) -> String {
        fs::write(self.repo().join(name), contents).expect("write file");
        self.git(&["add", name]);
        self.git(&["commit", "-q", "-m", message]);
        self.git(&["rev-parse", "HEAD"])
    }

    /// Names of files in the bundle directory, sorted.
    pub fn bundle_files(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(self.bundles()) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Path of the single bundle whose name starts with `prefix`.
    pub fn find_bundle(&self, prefix: &str) -> PathBuf {
        let matches: Vec<_> = self
            .bundle_files()
            .into_iter()
            .filter(|n| n.starts_with(prefix) && n.ends_with(".bundle"))
            .collect();
        assert_eq!(matches.len(), 1, "expected one {prefix}* bundle, got {matches:?}");
        self.bundles().join(&matches[0])
    }
}

/// Run `git` in `dir`, asserting success, returning trimmed stdout.
pub fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Run a generated shell script from `cwd`.
pub fn run_script(script: &Path, cwd: &Path, args: &[&str]) -> Output {
    std::process::Command::new("sh")
        .arg(script)
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("spawn sh")
}

/// `YYYYMMDD_HHMMSS` ids for the next `window` seconds, in both local time
/// and UTC, covering whichever clock the binary ends up reading.
pub fn upcoming_timestamp_ids(window: u64) -> Vec<String> {
    let epoch: u64 = run_date(&["+%s"]).parse().expect("epoch seconds");
    let mut ids = Vec::new();
    for offset in 0..window {
        let at = format!("@{}", epoch + offset);
        for utc in [false, true] {
            let mut args = vec!["-d", at.as_str(), "+%Y%m%d_%H%M%S"];
            if utc {
                args.insert(0, "-u");
            }
            let id = run_date(&args);
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

fn run_date(args: &[&str]) -> String {
    let output = std::process::Command::new("date")
        .args(args)
        .output()
        .expect("spawn date");
    assert!(output.status.success(), "date {args:?} failed");
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
