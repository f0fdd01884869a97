use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;

/// Runs the generator with the built-in formatter and returns stdout.
pub fn generate_stdout(args: &[&str]) -> String {
    let output = cargo_bin_cmd!("go-lazy")
        .arg("-formatter=builtin")
        .args(args)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "go-lazy failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

/// Writes an executable `gofmt` stand-in whose body is the given shell script.
#[cfg(unix)]
pub fn create_fake_gofmt(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("gofmt");
    let contents = format!("#!/usr/bin/env bash\nset -euo pipefail\n{body}\n");
    fs::write(&path, contents).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// A gofmt that echoes its input followed by a marker line.
#[cfg(unix)]
pub fn create_marking_gofmt(dir: &Path) -> PathBuf {
    create_fake_gofmt(dir, "cat\necho \"// formatted by fake gofmt\"")
}

/// A gofmt that rejects every input the way the real one reports syntax errors.
#[cfg(unix)]
pub fn create_failing_gofmt(dir: &Path) -> PathBuf {
    create_fake_gofmt(
        dir,
        "cat > /dev/null\necho \"<standard input>:9:4: expected type, found ')'\" >&2\nexit 2",
    )
}

pub fn write_types_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
