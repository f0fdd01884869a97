use std::env;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

use crate::format::FormatError;

pub const GOFMT_ENV: &str = "GO_LAZY_GOFMT";

pub fn resolve_gofmt_bin(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = env::var_os(GOFMT_ENV).filter(|path| !path.is_empty()) {
        let path = PathBuf::from(path);
        if !path.is_file() {
            bail!("{GOFMT_ENV} is set to {}, which is not a file", path.display());
        }
        return Ok(path);
    }

    which::which("gofmt").context("gofmt not found on PATH")
}

/// Pipes `source` through gofmt and returns its stdout.
pub fn run_gofmt(bin: &Path, source: &str, verbose: bool) -> Result<String, FormatError> {
    if verbose {
        eprintln!("Running: {} (stdin, {} bytes)", bin.display(), source.len());
    }

    let spawn_error = |source| FormatError::Spawn {
        bin: bin.to_path_buf(),
        source,
    };

    let mut child = Command::new(bin)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_error)?;

    // gofmt reads all of stdin before it writes anything.
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(source.as_bytes()).map_err(spawn_error)?;
    }

    let output = child.wait_with_output().map_err(spawn_error)?;
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if verbose && !stderr.trim().is_empty() {
        eprintln!("gofmt stderr:\n{}", stderr.trim_end());
    }

    if !output.status.success() {
        return Err(FormatError::Gofmt {
            status: output.status.to_string(),
            stderr: tail_lines(&stderr, 20),
        });
    }

    String::from_utf8(output.stdout).map_err(|_| FormatError::Encoding)
}

fn tail_lines(input: &str, max_lines: usize) -> String {
    let lines: Vec<&str> = input.lines().collect();
    if lines.len() <= max_lines {
        return input.trim_end().to_string();
    }
    let start = lines.len().saturating_sub(max_lines);
    lines[start..].join("\n")
}
