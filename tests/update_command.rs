use std::fs;

use predicates::prelude::*;

#[path = "support/mod.rs"]
mod support;
use support::{Sandbox, run_git, run_script, upcoming_timestamp_ids};

#[test]
fn fails_without_baseline_tag() {
    let sandbox = Sandbox::ready();

    sandbox
        .cmd()
        .args(["update", "1.0.0"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "ERROR: baseline tag baseline-1.0.0 does not exist",
        ));

    assert!(sandbox.bundle_files().is_empty());
}

#[test]
fn rejects_malformed_or_missing_base_version() {
    let sandbox = Sandbox::ready();
    sandbox.cmd().args(["baseline", "1.0.0"]).assert().success();
    let before = sandbox.bundle_files();

    sandbox
        .cmd()
        .args(["update", "1.0"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR: invalid version '1.0'"));
    sandbox
        .cmd()
        .arg("update")
        .assert()
        .code(1)
        .stdout(predicate::str::contains(
            "ERROR: missing required argument <base_version>",
        ));

    assert_eq!(sandbox.bundle_files(), before);
}

#[test]
fn empty_delta_still_verifies() {
    let sandbox = Sandbox::ready();
    sandbox.cmd().args(["baseline", "1.0.0"]).assert().success();

    sandbox
        .cmd()
        .args(["update", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("commits=0"));

    let bundle = sandbox.find_bundle("update_1.0.0_");
    let name = bundle.file_name().unwrap().to_string_lossy().into_owned();
    let re = predicate::str::is_match(r"^update_1\.0\.0_\d{8}_\d{6}\.bundle$").unwrap();
    assert!(re.eval(&name), "unexpected artifact name {name}");

    let path = bundle.to_str().unwrap();
    sandbox.git(&["bundle", "verify", path]);
    let head = sandbox.git(&["rev-parse", "HEAD"]);
    assert_eq!(
        sandbox.git(&["bundle", "list-heads", path]),
        format!("{head} refs/heads/main")
    );

    sandbox
        .cmd()
        .args(["verify", path])
        .assert()
        .success();

    let stem = name.trim_end_matches(".bundle");
    assert!(sandbox.bundles().join(format!("{stem}_deploy.sh")).is_file());
    assert!(sandbox.bundles().join(format!("{stem}_verify.sh")).is_file());
}

#[test]
fn delta_requires_baseline_and_carries_new_commits() {
    let sandbox = Sandbox::ready();
    sandbox.cmd().args(["baseline", "1.0.0"]).assert().success();
    let base = sandbox.git(&["rev-parse", "HEAD"]);

    sandbox.commit_file("a.txt", "a\n", "add a");
    let tip = sandbox.commit_file("b.txt", "b\n", "add b");

    sandbox
        .cmd()
        .args(["update", "1.0.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("commits=2"));

    let bundle = sandbox.find_bundle("update_1.0.0_");
    let path = bundle.to_str().unwrap();
    assert_eq!(
        sandbox.git(&["bundle", "list-heads", path]),
        format!("{tip} refs/heads/main")
    );

    // The delta cannot be applied without the baseline history.
    let header = fs::read(&bundle).unwrap();
    let header = String::from_utf8_lossy(&header[..header.len().min(512)]).into_owned();
    assert!(header.contains(&format!("-{base}")), "{header}");

    let empty = tempfile::tempdir().unwrap();
    run_git(empty.path(), &["init", "-q"]);
    let status = std::process::Command::new("git")
        .current_dir(empty.path())
        .args(["bundle", "verify", path])
        .output()
        .unwrap()
        .status;
    assert!(!status.success());
}

#[test]
fn deploy_script_requires_destination() {
    let sandbox = Sandbox::ready();
    sandbox.cmd().args(["baseline", "1.0.0"]).assert().success();
    sandbox.cmd().args(["update", "1.0.0"]).assert().success();

    let bundle = sandbox.find_bundle("update_1.0.0_");
    let stem = bundle.file_stem().unwrap().to_string_lossy().into_owned();
    let script = sandbox.bundles().join(format!("{stem}_deploy.sh"));

    let out = run_script(&script, sandbox.root(), &[]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage:"));
}

#[test]
fn deploy_scripts_reproduce_source_tip_on_master() {
    let sandbox = Sandbox::ready();
    sandbox.cmd().args(["baseline", "1.0.0"]).assert().success();

    let target = tempfile::tempdir().unwrap();
    let dest = target.path().join("deployed");
    let dest_str = dest.to_str().unwrap();

    let out = run_script(
        &sandbox.bundles().join("baseline_1.0.0_deploy.sh"),
        target.path(),
        &[dest_str],
    );
    assert!(
        out.status.success(),
        "baseline deploy failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    assert_eq!(run_git(&dest, &["symbolic-ref", "--short", "HEAD"]), "master");
    assert_eq!(
        run_git(&dest, &["rev-parse", "HEAD"]),
        sandbox.git(&["rev-parse", "HEAD"])
    );

    sandbox.commit_file("feature.txt", "feature\n", "add feature");
    let tip = sandbox.commit_file("feature.txt", "feature v2\n", "tweak feature");
    sandbox.cmd().args(["update", "1.0.0"]).assert().success();

    let bundle = sandbox.find_bundle("update_1.0.0_");
    let stem = bundle.file_stem().unwrap().to_string_lossy().into_owned();

    // Verification of a delta runs inside a repository holding the baseline.
    let verified = run_script(
        &sandbox.bundles().join(format!("{stem}_verify.sh")),
        &dest,
        &[],
    );
    assert!(
        verified.status.success(),
        "update verify failed: {}",
        String::from_utf8_lossy(&verified.stderr)
    );

    let out = run_script(
        &sandbox.bundles().join(format!("{stem}_deploy.sh")),
        target.path(),
        &[dest_str],
    );
    assert!(
        out.status.success(),
        "update deploy failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );

    assert_eq!(run_git(&dest, &["symbolic-ref", "--short", "HEAD"]), "master");
    assert_eq!(run_git(&dest, &["rev-parse", "HEAD"]), tip);
    assert_eq!(
        fs::read_to_string(dest.join("feature.txt")).unwrap(),
        "feature v2\n"
    );

    // Rerunning against an up-to-date destination is harmless.
    let again = run_script(
        &sandbox.bundles().join(format!("{stem}_deploy.sh")),
        target.path(),
        &[dest_str],
    );
    assert!(again.status.success());
    assert_eq!(run_git(&dest, &["rev-parse", "HEAD"]), tip);
}

#[test]
fn empty_delta_deploys_onto_baseline() {
    let sandbox = Sandbox::ready();
    sandbox.cmd().args(["baseline", "1.0.0"]).assert().success();
    sandbox.cmd().args(["update", "1.0.0"]).assert().success();

    let target = tempfile::tempdir().unwrap();
    let dest = target.path().join("deployed");
    let dest_str = dest.to_str().unwrap();
    let baseline = run_script(
        &sandbox.bundles().join("baseline_1.0.0_deploy.sh"),
        target.path(),
        &[dest_str],
    );
    assert!(baseline.status.success());

    let bundle = sandbox.find_bundle("update_1.0.0_");
    let stem = bundle.file_stem().unwrap().to_string_lossy().into_owned();
    let update = run_script(
        &sandbox.bundles().join(format!("{stem}_deploy.sh")),
        target.path(),
        &[dest_str],
    );
    assert!(
        update.status.success(),
        "empty update deploy failed: {}",
        String::from_utf8_lossy(&update.stderr)
    );
    assert_eq!(
        run_git(&dest, &["rev-parse", "HEAD"]),
        sandbox.git(&["rev-parse", "HEAD"])
    );
}

#[test]
fn delta_cannot_deploy_into_fresh_directory() {
    let sandbox = Sandbox::ready();
    sandbox.cmd().args(["baseline", "1.0.0"]).assert().success();
    sandbox.commit_file("x.txt", "x\n", "add x");
    sandbox.cmd().args(["update", "1.0.0"]).assert().success();

    let bundle = sandbox.find_bundle("update_1.0.0_");
    let stem = bundle.file_stem().unwrap().to_string_lossy().into_owned();
    let target = tempfile::tempdir().unwrap();
    let dest = target.path().join("fresh");

    let out = run_script(
        &sandbox.bundles().join(format!("{stem}_deploy.sh")),
        target.path(),
        &[dest.to_str().unwrap()],
    );
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("Deployment FAILED"));
}

#[test]
fn extra_arguments_are_ignored() {
    let sandbox = Sandbox::ready();
    sandbox.cmd().args(["baseline", "1.0.0"]).assert().success();
    sandbox.commit_file("x.txt", "x\n", "add x");

    sandbox
        .cmd()
        .args(["update", "1.0.0", "x"])
        .assert()
        .success()
        .stdout(predicate::str::contains("commits=1"));

    sandbox.find_bundle("update_1.0.0_");
}

#[test]
fn same_second_artifact_is_never_overwritten() {
    let sandbox = Sandbox::ready();
    sandbox.cmd().args(["baseline", "1.0.0"]).assert().success();
    sandbox.commit_file("x.txt", "x\n", "add x");

    let taken: Vec<_> = upcoming_timestamp_ids(5)
        .into_iter()
        .map(|id| sandbox.bundles().join(format!("update_1.0.0_{id}.bundle")))
        .collect();
    for path in &taken {
        fs::write(path, b"placeholder").unwrap();
    }
    let before = sandbox.bundle_files();

    sandbox
        .cmd()
        .args(["update", "1.0.0"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("ERROR: artifact already exists"));

    assert_eq!(sandbox.bundle_files(), before);
    for path in &taken {
        assert_eq!(fs::read(path).unwrap(), b"placeholder");
    }
}
